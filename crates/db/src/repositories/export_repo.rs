//! The export registry: fingerprint deduplication, freshness
//! evaluation and lifecycle queries over the `exports` table.
//!
//! Uses `ExportJobStatus` from `models::status` for all status
//! transitions. The lookup-then-insert of
//! [`ExportRepo::find_or_create_fresh_export`] is serialized per
//! fingerprint with a transaction-scoped advisory lock; the compute
//! path holds a row lock (`find_for_update`) for its whole duration so
//! the purge pass (`FOR UPDATE SKIP LOCKED`) can never reclaim an
//! export whose generation is in flight.

use chrono::Duration;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use guichet_core::types::DbId;

use crate::error::DbError;
use crate::models::export::{CreateExport, Export, ExportRequest};
use crate::models::status::{ExportJobStatus, StatusId};

/// Column list for `exports` queries.
const COLUMNS: &str = "\
    id, user_profile_type, user_profile_id, format, statut, \
    time_span_type, key, job_status, dossiers_count, file_path, \
    error_message, export_template_id, created_at, updated_at";

/// Terminal statuses: generated, failed.
const TERMINAL_STATUSES: [StatusId; 2] = [
    ExportJobStatus::Generated as StatusId,
    ExportJobStatus::Failed as StatusId,
];

/// Provides registry operations for export jobs.
pub struct ExportRepo;

impl ExportRepo {
    /// Insert a new pending export with its scope groups, in one
    /// transaction. Rejects an empty scope before touching the
    /// database.
    pub async fn create(pool: &PgPool, input: &CreateExport) -> Result<Export, DbError> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        let export = Self::insert(&mut *tx, input).await?;
        tx.commit().await?;
        Ok(export)
    }

    /// Find a fresh export matching the request fingerprint, or create
    /// a new pending one.
    ///
    /// "Fresh" means: pending and younger than `generation_timeout`
    /// (not stuck), or generated/failed and younger than `retention`
    /// (not stale). The whole lookup-then-insert runs under a
    /// transaction-scoped advisory lock on the fingerprint, so two
    /// concurrent callers with the same request never create two rows.
    pub async fn find_or_create_fresh_export(
        pool: &PgPool,
        request: &ExportRequest<'_>,
        retention: Duration,
        generation_timeout: Duration,
    ) -> Result<Export, DbError> {
        let key = request.fingerprint();

        let mut tx = pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM exports \
             WHERE key = $1 \
               AND ((job_status = $2 AND updated_at > NOW() - make_interval(secs => $3)) \
                 OR (job_status = ANY($4) AND updated_at > NOW() - make_interval(secs => $5))) \
             ORDER BY updated_at DESC \
             LIMIT 1"
        );
        let existing = sqlx::query_as::<_, Export>(&query)
            .bind(&key)
            .bind(ExportJobStatus::Pending.id())
            .bind(generation_timeout.num_seconds() as f64)
            .bind(TERMINAL_STATUSES.to_vec())
            .bind(retention.num_seconds() as f64)
            .fetch_optional(&mut *tx)
            .await?;

        let export = match existing {
            Some(export) => {
                tracing::debug!(export_id = export.id, key = %key, "export cache hit");
                export
            }
            None => {
                let export = Self::insert(&mut *tx, &request.to_create()).await?;
                tracing::debug!(export_id = export.id, key = %key, "export created");
                export
            }
        };
        tx.commit().await?;
        Ok(export)
    }

    /// Find an export by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Export>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exports WHERE id = $1");
        sqlx::query_as::<_, Export>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Generated/failed exports whose `updated_at` is older than
    /// `threshold` — candidates for artifact reclamation. Pending
    /// exports are excluded regardless of age.
    pub async fn stale(pool: &PgPool, threshold: Duration) -> Result<Vec<Export>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exports \
             WHERE job_status = ANY($1) \
               AND updated_at < NOW() - make_interval(secs => $2) \
             ORDER BY updated_at ASC"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(TERMINAL_STATUSES.to_vec())
            .bind(threshold.num_seconds() as f64)
            .fetch_all(pool)
            .await
    }

    /// Pending exports whose `updated_at` is older than `threshold` —
    /// their generation worker crashed or was lost.
    pub async fn stuck(pool: &PgPool, threshold: Duration) -> Result<Vec<Export>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exports \
             WHERE job_status = $1 \
               AND updated_at < NOW() - make_interval(secs => $2) \
             ORDER BY updated_at ASC"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(ExportJobStatus::Pending.id())
            .bind(threshold.num_seconds() as f64)
            .fetch_all(pool)
            .await
    }

    /// Delete stale exports, skipping any row currently locked by a
    /// compute transaction. Returns the deleted rows.
    pub async fn purge_stale(
        pool: &PgPool,
        threshold: Duration,
    ) -> Result<Vec<Export>, sqlx::Error> {
        let query = format!(
            "DELETE FROM exports \
             WHERE id IN ( \
                 SELECT id FROM exports \
                 WHERE job_status = ANY($1) \
                   AND updated_at < NOW() - make_interval(secs => $2) \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(TERMINAL_STATUSES.to_vec())
            .bind(threshold.num_seconds() as f64)
            .fetch_all(pool)
            .await
    }

    /// Delete stuck pending exports, skipping rows locked by a compute
    /// in flight. The registry recreates the fingerprint on the next
    /// request. Returns the reclaimed rows.
    pub async fn purge_stuck(
        pool: &PgPool,
        threshold: Duration,
    ) -> Result<Vec<Export>, sqlx::Error> {
        let query = format!(
            "DELETE FROM exports \
             WHERE id IN ( \
                 SELECT id FROM exports \
                 WHERE job_status = $1 \
                   AND updated_at < NOW() - make_interval(secs => $2) \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(ExportJobStatus::Pending.id())
            .bind(threshold.num_seconds() as f64)
            .fetch_all(pool)
            .await
    }

    /// Exports whose scope is *exactly* the given group-id set — no
    /// subset or superset match.
    pub async fn by_key(pool: &PgPool, group_ids: &[DbId]) -> Result<Vec<Export>, sqlx::Error> {
        let mut ids = group_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let query = format!(
            "SELECT {COLUMNS} FROM exports \
             WHERE id IN ( \
                 SELECT export_id FROM export_groupe_instructeurs \
                 GROUP BY export_id \
                 HAVING array_agg(groupe_instructeur_id ORDER BY groupe_instructeur_id) = $1 \
             ) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// The distinct exports whose scope intersects the given group
    /// ids. An export matching via several groups appears once.
    pub async fn for_groupe_instructeurs(
        pool: &PgPool,
        group_ids: &[DbId],
    ) -> Result<Vec<Export>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exports \
             WHERE id IN ( \
                 SELECT export_id FROM export_groupe_instructeurs \
                 WHERE groupe_instructeur_id = ANY($1) \
             ) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(group_ids.to_vec())
            .fetch_all(pool)
            .await
    }

    /// Scope group ids of an export, sorted.
    pub async fn groupe_instructeur_ids(
        pool: &PgPool,
        export_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT groupe_instructeur_id FROM export_groupe_instructeurs \
             WHERE export_id = $1 ORDER BY groupe_instructeur_id",
        )
        .bind(export_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Lock an export row for the duration of the surrounding
    /// transaction. The compute path holds this lock while generating,
    /// which is what keeps the purge sweep off the record.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Export>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exports WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Export>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Transition pending → generated, recording the dossier count and
    /// the artifact reference. A terminal row is left untouched.
    pub async fn mark_generated(
        conn: &mut PgConnection,
        id: DbId,
        dossiers_count: i64,
        file_path: &str,
    ) -> Result<Option<Export>, sqlx::Error> {
        let query = format!(
            "UPDATE exports SET \
                job_status = $2, \
                dossiers_count = $3, \
                file_path = $4, \
                updated_at = NOW() \
             WHERE id = $1 AND job_status = $5 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(id)
            .bind(ExportJobStatus::Generated.id())
            .bind(dossiers_count)
            .bind(file_path)
            .bind(ExportJobStatus::Pending.id())
            .fetch_optional(conn)
            .await
    }

    /// Transition pending → failed with the error message. No partial
    /// `dossiers_count` is ever written on this path.
    pub async fn mark_failed(
        conn: &mut PgConnection,
        id: DbId,
        error_message: &str,
    ) -> Result<Option<Export>, sqlx::Error> {
        let query = format!(
            "UPDATE exports SET \
                job_status = $2, \
                error_message = $3, \
                updated_at = NOW() \
             WHERE id = $1 AND job_status = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Export>(&query)
            .bind(id)
            .bind(ExportJobStatus::Failed.id())
            .bind(error_message)
            .bind(ExportJobStatus::Pending.id())
            .fetch_optional(conn)
            .await
    }

    /// Explicit deletion. Join rows to the scope groups cascade; the
    /// groups themselves are untouched.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert(conn: &mut PgConnection, input: &CreateExport) -> Result<Export, DbError> {
        input.validate()?;
        let query = format!(
            "INSERT INTO exports \
                (user_profile_type, user_profile_id, format, statut, \
                 time_span_type, key, job_status, export_template_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let export = sqlx::query_as::<_, Export>(&query)
            .bind(input.user_profile.kind())
            .bind(input.user_profile.id())
            .bind(input.format.as_str())
            .bind(input.statut.as_str())
            .bind(input.time_span_type.as_str())
            .bind(&input.key)
            .bind(ExportJobStatus::Pending.id())
            .bind(input.export_template_id)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query(
            "INSERT INTO export_groupe_instructeurs (export_id, groupe_instructeur_id) \
             SELECT $1, unnest($2::bigint[])",
        )
        .bind(export.id)
        .bind(input.groupe_instructeur_ids.clone())
        .execute(&mut *conn)
        .await?;

        Ok(export)
    }
}
