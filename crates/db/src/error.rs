use guichet_core::CoreError;

/// Errors surfaced by the repository layer.
///
/// Most repository methods return plain `sqlx::Error`; this enum exists
/// for the paths that also validate input or resolve persisted column
/// references against the current catalog.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid filter value for column {column}: {value}")]
    InvalidFilter { column: String, value: String },
}
