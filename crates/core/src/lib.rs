//! Pure domain logic for dossier exports.
//!
//! This crate has no database dependency. It provides:
//!
//! - [`columns::Column`] — an immutable description of one reportable
//!   field, with a stable content-derived identifier (`h_id`).
//! - [`schema`] — the field-schema model (`TypeDeChamp`) and the
//!   per-kind column expansion rules.
//! - [`walker`] — `Procedure::columns()`, the deterministic walk that
//!   turns a procedure's active revision and flags into the ordered
//!   column catalog.
//! - [`catalog::ColumnCatalog`] — lookup over the walker output by
//!   label or by `h_id`.
//! - [`presentation::FilteredColumn`] — the persisted (column, filter
//!   value) pair referenced by presentations.
//!
//! Everything here is side-effect free and safe to call from any number
//! of concurrent readers.

pub mod catalog;
pub mod columns;
pub mod error;
pub mod hashing;
pub mod presentation;
pub mod schema;
pub mod types;
pub mod walker;

pub use catalog::ColumnCatalog;
pub use columns::{Column, ColumnTable, ColumnType, ValueColumn};
pub use error::CoreError;
pub use presentation::FilteredColumn;
pub use schema::{Procedure, Revision, TypeDeChamp, TypeDeChampKind};
