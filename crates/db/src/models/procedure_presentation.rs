//! Persisted per-(instructeur, procedure) listing customization.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use guichet_core::types::{DbId, Timestamp};
use guichet_core::FilteredColumn;

use crate::models::export::ExportStatut;

/// A row from the `procedure_presentations` table.
///
/// Each named listing ("tous", "suivis", "traites") carries its own
/// ordered filter set. Created on first customization, mutated by the
/// owning instructeur, never auto-deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProcedurePresentation {
    pub id: DbId,
    pub instructeur_id: DbId,
    pub procedure_id: DbId,
    pub tous_filters: Json<Vec<FilteredColumn>>,
    pub suivis_filters: Json<Vec<FilteredColumn>>,
    pub traites_filters: Json<Vec<FilteredColumn>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProcedurePresentation {
    /// The filter set backing a given export statut.
    pub fn filters_for(&self, statut: ExportStatut) -> &[FilteredColumn] {
        match statut {
            ExportStatut::Tous => &self.tous_filters.0,
            ExportStatut::Suivis => &self.suivis_filters.0,
            ExportStatut::Traites => &self.traites_filters.0,
        }
    }
}

/// DTO for creating a presentation on first customization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProcedurePresentation {
    pub instructeur_id: DbId,
    pub procedure_id: DbId,
}
