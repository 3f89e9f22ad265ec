//! The reportable-column value object.
//!
//! A [`Column`] describes one field that can appear in an export or a
//! filter UI: where it reads from, its key, its scalar type, and its
//! default visibility. Columns are produced by the schema walker and
//! addressed through [`crate::catalog::ColumnCatalog`].

use serde::{Deserialize, Serialize};

use crate::hashing::sha256_hex;
use crate::types::DbId;

/// Logical source a column reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTable {
    /// The dossier row itself.
    #[serde(rename = "self")]
    SelfTable,
    User,
    Etablissement,
    Individual,
    TypeDeChamp,
    GroupeInstructeur,
    Notifications,
    Avis,
    DossierLabels,
    FollowersInstructeurs,
}

impl ColumnTable {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnTable::SelfTable => "self",
            ColumnTable::User => "user",
            ColumnTable::Etablissement => "etablissement",
            ColumnTable::Individual => "individual",
            ColumnTable::TypeDeChamp => "type_de_champ",
            ColumnTable::GroupeInstructeur => "groupe_instructeur",
            ColumnTable::Notifications => "notifications",
            ColumnTable::Avis => "avis",
            ColumnTable::DossierLabels => "dossier_labels",
            ColumnTable::FollowersInstructeurs => "followers_instructeurs",
        }
    }
}

/// Scalar type of a column, used by the filter UI to pick a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    #[default]
    Text,
    Date,
    Number,
    Enum,
}

/// Which sub-slot of the underlying storage holds the scalar.
///
/// Most columns read the single `Value` slot. Field types that store
/// several facets (commune, linked drop-down) produce one column per
/// facet, each with its own slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    #[default]
    Value,
    Code,
    Departement,
    Primary,
    Secondary,
}

impl ValueColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueColumn::Value => "value",
            ValueColumn::Code => "code",
            ValueColumn::Departement => "departement",
            ValueColumn::Primary => "primary",
            ValueColumn::Secondary => "secondary",
        }
    }
}

/// One reportable field of a procedure.
///
/// Immutable value object. Display `label`s are not guaranteed unique
/// (two schema nodes may share a libellé); the structural triple
/// `(table, column, value_column)` is, and [`Column::h_id`] is derived
/// from it alone so the identifier survives catalog regeneration and
/// label changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub procedure_id: DbId,
    pub label: String,
    pub table: ColumnTable,
    /// Field key. For user-defined fields this is the schema node's
    /// stable numeric identifier as a string, never the label.
    pub column: String,
    #[serde(rename = "type")]
    pub typ: ColumnType,
    pub value_column: ValueColumn,
    /// Shown by default in listings.
    pub displayable: bool,
    /// May appear in the filter UI.
    pub filterable: bool,
}

impl Column {
    /// A displayable, filterable text column reading the `Value` slot.
    pub fn new(
        procedure_id: DbId,
        label: impl Into<String>,
        table: ColumnTable,
        column: impl Into<String>,
    ) -> Self {
        Self {
            procedure_id,
            label: label.into(),
            table,
            column: column.into(),
            typ: ColumnType::Text,
            value_column: ValueColumn::Value,
            displayable: true,
            filterable: true,
        }
    }

    pub fn with_type(mut self, typ: ColumnType) -> Self {
        self.typ = typ;
        self
    }

    pub fn with_value_column(mut self, value_column: ValueColumn) -> Self {
        self.value_column = value_column;
        self
    }

    pub fn not_displayable(mut self) -> Self {
        self.displayable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Stable identifier, unique within one procedure's catalog.
    ///
    /// Derived from the structural keys only — persisted references
    /// (presentation filters) stay valid across label localization and
    /// catalog regeneration.
    pub fn h_id(&self) -> String {
        let key = format!(
            "{}|{}|{}",
            self.table.as_str(),
            self.column,
            self.value_column.as_str()
        );
        sha256_hex(key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_id_ignores_label() {
        let a = Column::new(1, "Date de création", ColumnTable::SelfTable, "created_at");
        let b = Column::new(1, "Created on", ColumnTable::SelfTable, "created_at");
        assert_eq!(a.h_id(), b.h_id());
    }

    #[test]
    fn h_id_distinguishes_facets() {
        let value = Column::new(1, "Ma commune", ColumnTable::TypeDeChamp, "17");
        let code = Column::new(1, "Ma commune – commune", ColumnTable::TypeDeChamp, "17")
            .with_value_column(ValueColumn::Code);
        assert_ne!(value.h_id(), code.h_id());
    }

    #[test]
    fn h_id_distinguishes_tables_with_same_key() {
        let self_email = Column::new(1, "Demandeur", ColumnTable::User, "email");
        let follower_email =
            Column::new(1, "Email instructeur", ColumnTable::FollowersInstructeurs, "email");
        assert_ne!(self_email.h_id(), follower_email.h_id());
    }
}
