//! Dossier row model — the surface the dataset resolver queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use guichet_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `dossiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dossier {
    pub id: DbId,
    pub procedure_id: DbId,
    pub groupe_instructeur_id: DbId,
    pub user_id: Option<DbId>,
    pub state: StatusId,
    pub archived: bool,
    pub motivation: Option<String>,
    pub user_from_france_connect: bool,
    pub depose_at: Option<Timestamp>,
    pub en_construction_at: Option<Timestamp>,
    pub en_instruction_at: Option<Timestamp>,
    pub processed_at: Option<Timestamp>,
    pub sva_svr_decision_on: Option<NaiveDate>,
    pub last_champ_updated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new dossier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDossier {
    pub procedure_id: DbId,
    pub groupe_instructeur_id: DbId,
    pub user_id: Option<DbId>,
    pub state: StatusId,
}
