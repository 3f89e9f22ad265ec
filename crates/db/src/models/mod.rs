//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod dossier;
pub mod export;
pub mod export_template;
pub mod groupe_instructeur;
pub mod procedure_presentation;
pub mod status;
