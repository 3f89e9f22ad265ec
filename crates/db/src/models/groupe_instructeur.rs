//! Scope group models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use guichet_core::types::{DbId, Timestamp};

/// A row from the `groupe_instructeurs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupeInstructeur {
    pub id: DbId,
    pub procedure_id: DbId,
    pub label: String,
    pub closed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new groupe instructeur.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupeInstructeur {
    pub procedure_id: DbId,
    pub label: String,
}
