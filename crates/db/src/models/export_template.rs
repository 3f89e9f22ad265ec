//! Export template models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use guichet_core::types::{DbId, Timestamp};

/// A row from the `export_templates` table. A template fixes the
/// artifact layout for a groupe instructeur; its identity takes part in
/// the export fingerprint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExportTemplate {
    pub id: DbId,
    pub groupe_instructeur_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new export template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExportTemplate {
    pub groupe_instructeur_id: DbId,
    pub name: String,
}
