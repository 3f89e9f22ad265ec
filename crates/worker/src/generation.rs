//! The compute step of an export job.
//!
//! `compute_with_safe_stale_for_purge` holds a row lock on the export
//! for the whole generation, so the purge sweep (which deletes with
//! `FOR UPDATE SKIP LOCKED`) can never reclaim a record whose
//! generation is in flight. Any failure — dataset resolution or
//! artifact build — commits the pending → failed transition before
//! re-raising, so a record never silently stays pending after its
//! worker saw the error. A crash that commits nothing leaves the row
//! pending for the stuck sweep.

use sqlx::PgPool;

use guichet_core::types::DbId;
use guichet_core::{ColumnCatalog, FilteredColumn};
use guichet_db::models::export::{Export, ExportStatut, TimeSpanType, UserProfile};
use guichet_db::models::status::ExportJobStatus;
use guichet_db::repositories::{DatasetSelection, DossierRepo, ExportRepo};
use guichet_db::DbError;
use guichet_events::{EventBus, ExportEvent, EXPORT_FAILED, EXPORT_GENERATED};

use crate::artifact::{ArtifactBuilder, ArtifactError};

/// Errors surfaced by the compute step.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Artifact build failed: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Export {id} has an unknown {field}")]
    Malformed { id: DbId, field: &'static str },
}

/// One generation order: which export to compute, against which
/// catalog, with the presentation's current filter set.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub export_id: DbId,
    pub catalog: &'a ColumnCatalog,
    pub filters: &'a [FilteredColumn],
}

/// Resolve the dataset, build the artifact, and transition the export.
///
/// Returns the updated row, or `None` when the export disappeared or
/// is already terminal (terminal states never transition; recomputing
/// a generated export is a no-op).
pub async fn compute_with_safe_stale_for_purge(
    pool: &PgPool,
    bus: &EventBus,
    builder: &dyn ArtifactBuilder,
    request: &GenerationRequest<'_>,
) -> Result<Option<Export>, GenerationError> {
    let export_id = request.export_id;
    let scope = ExportRepo::groupe_instructeur_ids(pool, export_id).await?;

    let mut tx = pool.begin().await?;
    let Some(export) = ExportRepo::find_for_update(&mut *tx, export_id).await? else {
        return Ok(None);
    };
    if export.job_status != ExportJobStatus::Pending.id() {
        tracing::debug!(export_id, job_status = export.job_status, "export already computed");
        return Ok(None);
    }

    let outcome = resolve_and_build(pool, builder, request, &export, &scope).await;
    match outcome {
        Ok((dossiers_count, file_path)) => {
            let updated =
                ExportRepo::mark_generated(&mut *tx, export_id, dossiers_count, &file_path)
                    .await?;
            tx.commit().await?;
            tracing::info!(export_id, dossiers_count, "export generated");
            bus.publish(
                ExportEvent::new(EXPORT_GENERATED, export_id).with_payload(serde_json::json!({
                    "dossiers_count": dossiers_count,
                    "file_path": file_path,
                })),
            );
            Ok(updated)
        }
        Err(err) => {
            ExportRepo::mark_failed(&mut *tx, export_id, &err.to_string()).await?;
            tx.commit().await?;
            tracing::error!(export_id, error = %err, "export generation failed");
            bus.publish(
                ExportEvent::new(EXPORT_FAILED, export_id).with_payload(serde_json::json!({
                    "error": err.to_string(),
                })),
            );
            Err(err)
        }
    }
}

async fn resolve_and_build(
    pool: &PgPool,
    builder: &dyn ArtifactBuilder,
    request: &GenerationRequest<'_>,
    export: &Export,
    scope: &[DbId],
) -> Result<(i64, String), GenerationError> {
    let statut = ExportStatut::from_str(&export.statut).ok_or(GenerationError::Malformed {
        id: export.id,
        field: "statut",
    })?;
    let time_span_type =
        TimeSpanType::from_str(&export.time_span_type).ok_or(GenerationError::Malformed {
            id: export.id,
            field: "time_span_type",
        })?;
    let followed_by = match export.user_profile() {
        Some(UserProfile::Instructeur(id)) => Some(id),
        _ => None,
    };

    let selection = DatasetSelection {
        groupe_instructeur_ids: scope,
        statut: Some(statut),
        time_span_type,
        filters: request.filters,
        catalog: request.catalog,
        followed_by,
    };

    let dossiers = DossierRepo::dossiers_for_export(pool, &selection).await?;
    let artifact = builder.build(&dossiers, request.catalog.columns()).await?;
    Ok((dossiers.len() as i64, artifact.file_path))
}
