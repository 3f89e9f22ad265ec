//! Periodic export lifecycle sweep.
//!
//! Runs on a fixed interval until cancelled:
//!
//! - purge pass: deletes generated/failed exports past the retention
//!   window (`FOR UPDATE SKIP LOCKED` — a generation holding its row
//!   lock is skipped and retried next tick);
//! - stuck pass: reclaims pending exports whose worker was lost, so
//!   the registry recreates the fingerprint on the next request.
//!
//! Thresholds and cadence are deployment parameters with compiled
//! defaults.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use guichet_db::repositories::ExportRepo;

/// Default retention of generated/failed exports: 32 hours.
const DEFAULT_RETENTION_HOURS: i64 = 32;

/// Default generation timeout, past which a pending export counts as
/// stuck: 3 hours.
const DEFAULT_GENERATION_TIMEOUT_HOURS: i64 = 3;

/// How often the sweep runs.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600; // 1 hour

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Run the export sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let retention = chrono::Duration::hours(env_i64(
        "EXPORT_RETENTION_HOURS",
        DEFAULT_RETENTION_HOURS,
    ));
    let generation_timeout = chrono::Duration::hours(env_i64(
        "EXPORT_GENERATION_TIMEOUT_HOURS",
        DEFAULT_GENERATION_TIMEOUT_HOURS,
    ));
    let interval_secs = std::env::var("EXPORT_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(
        retention_hours = retention.num_hours(),
        generation_timeout_hours = generation_timeout.num_hours(),
        interval_secs,
        "Export sweep started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Export sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match ExportRepo::purge_stale(&pool, retention).await {
                    Ok(purged) if !purged.is_empty() => {
                        tracing::info!(purged = purged.len(), "Export sweep: purged stale exports");
                    }
                    Ok(_) => {
                        tracing::debug!("Export sweep: no stale exports");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Export sweep: stale purge failed");
                    }
                }

                match ExportRepo::purge_stuck(&pool, generation_timeout).await {
                    Ok(reclaimed) => {
                        for export in &reclaimed {
                            tracing::warn!(
                                export_id = export.id,
                                updated_at = %export.updated_at,
                                "Export sweep: reclaimed stuck pending export"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Export sweep: stuck reclaim failed");
                    }
                }
            }
        }
    }
}
