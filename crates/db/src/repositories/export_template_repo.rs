//! Repository for the `export_templates` table.

use sqlx::PgPool;

use guichet_core::types::DbId;

use crate::models::export_template::{CreateExportTemplate, ExportTemplate};

const COLUMNS: &str = "id, groupe_instructeur_id, name, created_at, updated_at";

/// Provides CRUD operations for export templates.
pub struct ExportTemplateRepo;

impl ExportTemplateRepo {
    /// Insert a new export template.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExportTemplate,
    ) -> Result<ExportTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO export_templates (groupe_instructeur_id, name) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExportTemplate>(&query)
            .bind(input.groupe_instructeur_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an export template by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExportTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM export_templates WHERE id = $1");
        sqlx::query_as::<_, ExportTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
