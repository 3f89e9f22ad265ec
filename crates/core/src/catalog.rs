//! Lookup over the walker output.
//!
//! The catalog is read-only and actor-independent, with one exception:
//! the option list of the assigned-group column depends on which groups
//! are visible to the requesting actor. That context is passed in
//! explicitly by the caller — the catalog itself never consults ambient
//! session state.

use crate::columns::{Column, ColumnTable};
use crate::error::CoreError;
use crate::types::DbId;

/// A group visible to the requesting actor, as scoped by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupeInstructeurOption {
    pub id: DbId,
    pub label: String,
}

/// Ordered, procedure-scoped column lookup.
#[derive(Debug, Clone)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
}

impl ColumnCatalog {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by display label. Labels may collide; declaration
    /// order is the tie-break.
    pub fn find_by_label(&self, label: &str) -> Result<&Column, CoreError> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .ok_or_else(|| CoreError::ColumnNotFound(label.to_string()))
    }

    /// Find a column by stable identifier.
    pub fn find_by_h_id(&self, h_id: &str) -> Result<&Column, CoreError> {
        self.columns
            .iter()
            .find(|c| c.h_id() == h_id)
            .ok_or_else(|| CoreError::ColumnNotFound(h_id.to_string()))
    }

    /// `(label, id)` pairs for an enum column's select widget.
    ///
    /// Only the assigned-group column has an actor-sensitive option
    /// set; `visible_groups` is that context. Zero visible groups is an
    /// empty list, not an error.
    pub fn options_for_select(
        &self,
        column: &Column,
        visible_groups: &[GroupeInstructeurOption],
    ) -> Vec<(String, DbId)> {
        match column.table {
            ColumnTable::GroupeInstructeur => visible_groups
                .iter()
                .map(|g| (g.label.clone(), g.id))
                .collect(),
            _ => Vec::new(),
        }
    }
}
