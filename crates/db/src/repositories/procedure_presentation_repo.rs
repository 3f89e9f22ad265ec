//! Repository for the `procedure_presentations` table.

use sqlx::types::Json;
use sqlx::PgPool;

use guichet_core::types::DbId;
use guichet_core::FilteredColumn;

use crate::models::export::ExportStatut;
use crate::models::procedure_presentation::{
    CreateProcedurePresentation, ProcedurePresentation,
};

const COLUMNS: &str = "\
    id, instructeur_id, procedure_id, tous_filters, suivis_filters, \
    traites_filters, created_at, updated_at";

/// Provides persistence for per-(instructeur, procedure) listing
/// customizations.
pub struct ProcedurePresentationRepo;

impl ProcedurePresentationRepo {
    /// Find the presentation for an (instructeur, procedure) pair.
    pub async fn find(
        pool: &PgPool,
        instructeur_id: DbId,
        procedure_id: DbId,
    ) -> Result<Option<ProcedurePresentation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM procedure_presentations \
             WHERE instructeur_id = $1 AND procedure_id = $2"
        );
        sqlx::query_as::<_, ProcedurePresentation>(&query)
            .bind(instructeur_id)
            .bind(procedure_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the presentation, creating an empty one on first
    /// customization.
    pub async fn find_or_create(
        pool: &PgPool,
        input: &CreateProcedurePresentation,
    ) -> Result<ProcedurePresentation, sqlx::Error> {
        if let Some(existing) = Self::find(pool, input.instructeur_id, input.procedure_id).await? {
            return Ok(existing);
        }
        let query = format!(
            "INSERT INTO procedure_presentations (instructeur_id, procedure_id) \
             VALUES ($1, $2) \
             ON CONFLICT (instructeur_id, procedure_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ProcedurePresentation>(&query)
            .bind(input.instructeur_id)
            .bind(input.procedure_id)
            .fetch_optional(pool)
            .await?;
        match inserted {
            Some(presentation) => Ok(presentation),
            // Lost the race; the winner's row is there now.
            None => {
                let existing =
                    Self::find(pool, input.instructeur_id, input.procedure_id).await?;
                existing.ok_or(sqlx::Error::RowNotFound)
            }
        }
    }

    /// Replace the filter set of one named listing.
    pub async fn update_filters(
        pool: &PgPool,
        id: DbId,
        statut: ExportStatut,
        filters: &[FilteredColumn],
    ) -> Result<Option<ProcedurePresentation>, sqlx::Error> {
        let column = match statut {
            ExportStatut::Tous => "tous_filters",
            ExportStatut::Suivis => "suivis_filters",
            ExportStatut::Traites => "traites_filters",
        };
        let query = format!(
            "UPDATE procedure_presentations SET \
                {column} = $2, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProcedurePresentation>(&query)
            .bind(id)
            .bind(Json(filters.to_vec()))
            .fetch_optional(pool)
            .await
    }
}
