//! Field-schema model: procedures, revisions and schema nodes.
//!
//! A [`Procedure`] owns an immutable active [`Revision`]; a revision is
//! an ordered list of [`TypeDeChamp`] nodes. Each node kind carries its
//! own column expansion rule (0, 1 or N produced columns), kept as a
//! closed enum so adding a field kind is a compile-time-checked change.

use serde::{Deserialize, Serialize};

use crate::columns::{Column, ColumnTable, ColumnType, ValueColumn};
use crate::types::DbId;

/// One field definition within a revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeChamp {
    /// Identifier shared by all revisions of the same logical field.
    pub stable_id: DbId,
    /// Display label; not guaranteed unique within a revision.
    pub libelle: String,
    pub kind: TypeDeChampKind,
}

/// Closed set of field kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TypeDeChampKind {
    Text,
    Number,
    Date,
    Checkbox,
    DropDownList,
    /// Two-level drop-down; stores a primary and a secondary value.
    LinkedDropDownList,
    /// Commune picker; stores the name, the INSEE code and the
    /// département.
    Commune,
    Siret,
    /// Association registration number; carries the association's
    /// commune alongside the number itself.
    Rna,
    /// Container repeated by the submitter; contributes its children's
    /// columns, flattened, and none of its own.
    Repetition { children: Vec<TypeDeChamp> },
    /// Presentational only.
    HeaderSection,
    /// Presentational only.
    Explication,
}

impl TypeDeChamp {
    pub fn new(stable_id: DbId, libelle: impl Into<String>, kind: TypeDeChampKind) -> Self {
        Self {
            stable_id,
            libelle: libelle.into(),
            kind,
        }
    }

    /// Expand this node into its reportable columns.
    ///
    /// The `column` key of every produced column is the node's stable
    /// identifier as a string — labels may collide across public and
    /// private scopes, stable identifiers do not.
    pub fn columns(&self, procedure_id: DbId) -> Vec<Column> {
        let key = self.stable_id.to_string();
        match &self.kind {
            TypeDeChampKind::HeaderSection | TypeDeChampKind::Explication => Vec::new(),
            TypeDeChampKind::Repetition { children } => children
                .iter()
                .flat_map(|child| child.columns(procedure_id))
                .collect(),
            TypeDeChampKind::Commune | TypeDeChampKind::Rna => vec![
                Column::new(procedure_id, &self.libelle, ColumnTable::TypeDeChamp, &key),
                Column::new(
                    procedure_id,
                    format!("{} – commune", self.libelle),
                    ColumnTable::TypeDeChamp,
                    &key,
                )
                .with_value_column(ValueColumn::Code),
                Column::new(
                    procedure_id,
                    format!("{} (Département)", self.libelle),
                    ColumnTable::TypeDeChamp,
                    &key,
                )
                .with_value_column(ValueColumn::Departement),
            ],
            TypeDeChampKind::LinkedDropDownList => vec![
                Column::new(
                    procedure_id,
                    format!("{} (Primaire)", self.libelle),
                    ColumnTable::TypeDeChamp,
                    &key,
                )
                .with_type(ColumnType::Enum)
                .with_value_column(ValueColumn::Primary),
                Column::new(
                    procedure_id,
                    format!("{} (Secondaire)", self.libelle),
                    ColumnTable::TypeDeChamp,
                    &key,
                )
                .with_type(ColumnType::Enum)
                .with_value_column(ValueColumn::Secondary),
            ],
            TypeDeChampKind::Number => {
                vec![
                    Column::new(procedure_id, &self.libelle, ColumnTable::TypeDeChamp, &key)
                        .with_type(ColumnType::Number),
                ]
            }
            TypeDeChampKind::Date => {
                vec![
                    Column::new(procedure_id, &self.libelle, ColumnTable::TypeDeChamp, &key)
                        .with_type(ColumnType::Date),
                ]
            }
            TypeDeChampKind::DropDownList => {
                vec![
                    Column::new(procedure_id, &self.libelle, ColumnTable::TypeDeChamp, &key)
                        .with_type(ColumnType::Enum),
                ]
            }
            TypeDeChampKind::Text | TypeDeChampKind::Checkbox | TypeDeChampKind::Siret => {
                vec![Column::new(
                    procedure_id,
                    &self.libelle,
                    ColumnTable::TypeDeChamp,
                    &key,
                )]
            }
        }
    }
}

/// Immutable, versioned snapshot of a procedure's field schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub types_de_champ_public: Vec<TypeDeChamp>,
    pub types_de_champ_private: Vec<TypeDeChamp>,
}

/// The configurable form/workflow definition whose schema revisions
/// generate dossiers. Carries the submitter-mode flags the column walk
/// depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub id: DbId,
    pub libelle: String,
    /// Submitter is a natural person rather than an organization.
    pub for_individual: bool,
    /// "Silence vaut accord" decision-deadline tracking.
    pub sva: bool,
    /// "Silence vaut rejet" decision-deadline tracking.
    pub svr: bool,
    /// Carries the three Chorus budget columns.
    pub chorusable: bool,
    pub active_revision: Revision,
}

impl Procedure {
    pub fn new(id: DbId, libelle: impl Into<String>, active_revision: Revision) -> Self {
        Self {
            id,
            libelle: libelle.into(),
            for_individual: false,
            sva: false,
            svr: false,
            chorusable: false,
            active_revision,
        }
    }
}
