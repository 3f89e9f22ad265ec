//! Shared fixtures for repository integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use sqlx::PgPool;

use guichet_core::types::DbId;
use guichet_db::models::export::{
    ExportFormat, ExportRequest, ExportStatut, TimeSpanType, UserProfile,
};
use guichet_db::models::groupe_instructeur::CreateGroupeInstructeur;
use guichet_db::repositories::GroupeInstructeurRepo;

pub async fn create_procedure(pool: &PgPool, libelle: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as("INSERT INTO procedures (libelle) VALUES ($1) RETURNING id")
        .bind(libelle)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

pub async fn create_groupe(pool: &PgPool, procedure_id: DbId, label: &str) -> DbId {
    GroupeInstructeurRepo::create(
        pool,
        &CreateGroupeInstructeur {
            procedure_id,
            label: label.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn create_instructeur(pool: &PgPool, email: &str) -> DbId {
    let (id,): (DbId,) =
        sqlx::query_as("INSERT INTO instructeurs (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

pub async fn create_user(pool: &PgPool, email: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

pub fn zip_request<'a>(groupe_ids: Vec<DbId>, instructeur_id: DbId) -> ExportRequest<'a> {
    ExportRequest {
        format: ExportFormat::Zip,
        groupe_instructeur_ids: groupe_ids,
        user_profile: UserProfile::Instructeur(instructeur_id),
        statut: ExportStatut::Tous,
        time_span_type: TimeSpanType::Everything,
        export_template_id: None,
        presentation_filters: None,
    }
}

pub async fn export_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exports")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

/// Age a row by pushing `updated_at` into the past.
pub async fn backdate_export(pool: &PgPool, export_id: DbId, hours: i64) {
    sqlx::query("UPDATE exports SET updated_at = NOW() - make_interval(hours => $2::int) WHERE id = $1")
        .bind(export_id)
        .bind(hours as i32)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn set_job_status(pool: &PgPool, export_id: DbId, job_status: i16) {
    sqlx::query("UPDATE exports SET job_status = $2 WHERE id = $1")
        .bind(export_id)
        .bind(job_status)
        .execute(pool)
        .await
        .unwrap();
}
