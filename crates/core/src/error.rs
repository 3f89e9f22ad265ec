use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A catalog lookup (by label or `h_id`) matched nothing. A stale
    /// persisted reference must surface as this error, never be
    /// silently dropped.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
