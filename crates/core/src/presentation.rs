//! Persisted filter values.
//!
//! A presentation names filter sets ("tous", "suivis", "traites"), each
//! an ordered sequence of [`FilteredColumn`]s. The pair references its
//! column by stable identifier so it survives catalog regeneration;
//! resolution against the current catalog happens at read time and
//! fails loudly on a removed column.

use serde::{Deserialize, Serialize};

use crate::columns::Column;

/// One persisted (column reference, filter value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredColumn {
    pub h_id: String,
    pub filter: String,
}

impl FilteredColumn {
    pub fn new(column: &Column, filter: impl Into<String>) -> Self {
        Self {
            h_id: column.h_id(),
            filter: filter.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{Column, ColumnTable};

    #[test]
    fn references_the_column_by_stable_identifier() {
        let column = Column::new(1, "Date de création", ColumnTable::SelfTable, "created_at");
        let filtered = FilteredColumn::new(&column, "10/12/2021");
        assert_eq!(filtered.h_id, column.h_id());
        assert_eq!(filtered.filter, "10/12/2021");
    }

    #[test]
    fn survives_label_changes() {
        let before = Column::new(1, "Date de création", ColumnTable::SelfTable, "created_at");
        let filtered = FilteredColumn::new(&before, "10/12/2021");
        let renamed = Column::new(1, "Created on", ColumnTable::SelfTable, "created_at");
        assert_eq!(filtered.h_id, renamed.h_id());
    }
}
