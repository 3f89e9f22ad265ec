//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that take part in a
//! larger transaction accept `&mut PgConnection` instead.

pub mod dossier_repo;
pub mod export_repo;
pub mod export_template_repo;
pub mod groupe_instructeur_repo;
pub mod procedure_presentation_repo;

pub use dossier_repo::{DatasetSelection, DossierRepo};
pub use export_repo::ExportRepo;
pub use export_template_repo::ExportTemplateRepo;
pub use groupe_instructeur_repo::GroupeInstructeurRepo;
pub use procedure_presentation_repo::ProcedurePresentationRepo;
