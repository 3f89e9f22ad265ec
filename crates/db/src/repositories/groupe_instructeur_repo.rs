//! Repository for the `groupe_instructeurs` table and instructeur
//! membership.

use sqlx::PgPool;

use guichet_core::catalog::GroupeInstructeurOption;
use guichet_core::types::DbId;

use crate::models::groupe_instructeur::{CreateGroupeInstructeur, GroupeInstructeur};

const COLUMNS: &str = "id, procedure_id, label, closed, created_at, updated_at";

/// Provides CRUD and scoping operations for groupe instructeurs.
pub struct GroupeInstructeurRepo;

impl GroupeInstructeurRepo {
    /// Insert a new groupe instructeur.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGroupeInstructeur,
    ) -> Result<GroupeInstructeur, sqlx::Error> {
        let query = format!(
            "INSERT INTO groupe_instructeurs (procedure_id, label) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GroupeInstructeur>(&query)
            .bind(input.procedure_id)
            .bind(&input.label)
            .fetch_one(pool)
            .await
    }

    /// Find a groupe instructeur by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GroupeInstructeur>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groupe_instructeurs WHERE id = $1");
        sqlx::query_as::<_, GroupeInstructeur>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add an instructeur to a group. Idempotent.
    pub async fn add_instructeur(
        pool: &PgPool,
        groupe_instructeur_id: DbId,
        instructeur_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO instructeur_groupe_instructeurs \
                (instructeur_id, groupe_instructeur_id) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(instructeur_id)
        .bind(groupe_instructeur_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The groups of a procedure visible to one instructeur — the
    /// explicit actor context behind the assigned-group column's
    /// option list. No membership means an empty list.
    pub async fn options_visible_to(
        pool: &PgPool,
        instructeur_id: DbId,
        procedure_id: DbId,
    ) -> Result<Vec<GroupeInstructeurOption>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT gi.id, gi.label FROM groupe_instructeurs gi \
             INNER JOIN instructeur_groupe_instructeurs igi \
                ON igi.groupe_instructeur_id = gi.id \
             WHERE igi.instructeur_id = $1 AND gi.procedure_id = $2 \
             ORDER BY gi.label, gi.id",
        )
        .bind(instructeur_id)
        .bind(procedure_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, label)| GroupeInstructeurOption { id, label })
            .collect())
    }
}
