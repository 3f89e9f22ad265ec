//! The schema walk: from a procedure's active revision and flags to the
//! ordered column catalog.
//!
//! `Procedure::columns()` is a pure function of the active revision and
//! the submitter-mode flags. Same schema + same flags ⇒ same columns in
//! the same order, with the same `h_id`s.

use crate::catalog::ColumnCatalog;
use crate::columns::{Column, ColumnTable, ColumnType};
use crate::schema::Procedure;

/// Chorus budget column keys, emitted when the procedure is
/// chorus-capable.
pub const CHORUS_COLUMNS: [(&str, &str); 3] = [
    ("Domaine Fonctionnel", "domaine_fonctionnel"),
    ("Référentiel De Programmation", "referentiel_de_programmation"),
    ("Centre De Coût", "centre_de_cout"),
];

impl Procedure {
    /// The ordered catalog of every reportable column of this
    /// procedure.
    pub fn columns(&self) -> Vec<Column> {
        let id = self.id;
        let mut columns = self.fixed_dossier_columns();

        if self.for_individual {
            columns.extend([
                Column::new(id, "Civilité", ColumnTable::Individual, "gender"),
                Column::new(id, "Nom", ColumnTable::Individual, "nom"),
                Column::new(id, "Prénom", ColumnTable::Individual, "prenom"),
            ]);
        }

        if self.sva || self.svr {
            let tag = if self.sva { "SVA" } else { "SVR" };
            columns.extend([
                Column::new(
                    id,
                    format!("Date décision {tag}"),
                    ColumnTable::SelfTable,
                    "sva_svr_decision_on",
                )
                .with_type(ColumnType::Date),
                Column::new(
                    id,
                    format!("Date décision {tag} avant"),
                    ColumnTable::SelfTable,
                    "sva_svr_decision_before",
                )
                .with_type(ColumnType::Date)
                .not_displayable(),
            ]);
        }

        columns.extend([
            Column::new(id, "Demandeur", ColumnTable::User, "email"),
            Column::new(id, "Email instructeur", ColumnTable::FollowersInstructeurs, "email"),
            Column::new(id, "Groupe instructeur", ColumnTable::GroupeInstructeur, "id")
                .with_type(ColumnType::Enum),
            Column::new(id, "Avis oui/non", ColumnTable::Avis, "question_answer")
                .not_filterable(),
            Column::new(id, "France connecté ?", ColumnTable::SelfTable, "user_from_france_connect")
                .not_displayable()
                .not_filterable(),
            Column::new(id, "Labels", ColumnTable::DossierLabels, "label_id"),
        ]);

        if !self.for_individual {
            columns.extend(self.etablissement_columns());
        }

        for tdc in &self.active_revision.types_de_champ_public {
            columns.extend(tdc.columns(id));
        }
        for tdc in &self.active_revision.types_de_champ_private {
            columns.extend(tdc.columns(id));
        }

        if self.chorusable {
            columns.extend(CHORUS_COLUMNS.map(|(label, key)| {
                Column::new(id, label, ColumnTable::SelfTable, key).not_filterable()
            }));
        }

        columns
    }

    /// Build the lookup catalog over [`Procedure::columns`].
    pub fn column_catalog(&self) -> ColumnCatalog {
        ColumnCatalog::new(self.columns())
    }

    /// Fixed dossier attributes, in constant order.
    fn fixed_dossier_columns(&self) -> Vec<Column> {
        let id = self.id;
        vec![
            Column::new(id, "Dossier ID", ColumnTable::SelfTable, "id")
                .with_type(ColumnType::Number),
            Column::new(id, "notifications", ColumnTable::Notifications, "notifications")
                .not_filterable(),
            Column::new(id, "Date de création", ColumnTable::SelfTable, "created_at")
                .with_type(ColumnType::Date),
            Column::new(id, "Mis à jour le", ColumnTable::SelfTable, "updated_at")
                .with_type(ColumnType::Date),
            Column::new(id, "Date de dépot", ColumnTable::SelfTable, "depose_at")
                .with_type(ColumnType::Date),
            Column::new(id, "En construction le", ColumnTable::SelfTable, "en_construction_at")
                .with_type(ColumnType::Date),
            Column::new(id, "En instruction le", ColumnTable::SelfTable, "en_instruction_at")
                .with_type(ColumnType::Date),
            Column::new(id, "Terminé le", ColumnTable::SelfTable, "processed_at")
                .with_type(ColumnType::Date),
            Column::new(id, "Dernier évènement depuis", ColumnTable::SelfTable, "updated_since")
                .with_type(ColumnType::Date)
                .not_displayable(),
            Column::new(id, "Déposé depuis", ColumnTable::SelfTable, "depose_since")
                .with_type(ColumnType::Date)
                .not_displayable(),
            Column::new(id, "En construction depuis", ColumnTable::SelfTable, "en_construction_since")
                .with_type(ColumnType::Date)
                .not_displayable(),
            Column::new(id, "En instruction depuis", ColumnTable::SelfTable, "en_instruction_since")
                .with_type(ColumnType::Date)
                .not_displayable(),
            Column::new(id, "Traité depuis", ColumnTable::SelfTable, "processed_since")
                .with_type(ColumnType::Date)
                .not_displayable(),
            Column::new(id, "Statut", ColumnTable::SelfTable, "state")
                .with_type(ColumnType::Enum)
                .not_displayable(),
            Column::new(id, "Archivé", ColumnTable::SelfTable, "archived")
                .not_displayable()
                .not_filterable(),
            Column::new(id, "Motivation de la décision", ColumnTable::SelfTable, "motivation")
                .not_displayable()
                .not_filterable(),
            Column::new(
                id,
                "Date de dernière modification (usager)",
                ColumnTable::SelfTable,
                "last_champ_updated_at",
            )
            .not_displayable()
            .not_filterable(),
        ]
    }

    /// The organization/establishment block, emitted for non-individual
    /// procedures.
    fn etablissement_columns(&self) -> Vec<Column> {
        let id = self.id;
        vec![
            Column::new(id, "SIREN", ColumnTable::Etablissement, "entreprise_siren"),
            Column::new(id, "Forme juridique", ColumnTable::Etablissement, "entreprise_forme_juridique"),
            Column::new(id, "Nom commercial", ColumnTable::Etablissement, "entreprise_nom_commercial"),
            Column::new(id, "Raison sociale", ColumnTable::Etablissement, "entreprise_raison_sociale"),
            Column::new(id, "SIRET siège social", ColumnTable::Etablissement, "entreprise_siret_siege_social"),
            Column::new(id, "Date de création", ColumnTable::Etablissement, "entreprise_date_creation")
                .with_type(ColumnType::Date),
            Column::new(id, "SIRET", ColumnTable::Etablissement, "siret"),
            Column::new(id, "Libellé NAF", ColumnTable::Etablissement, "libelle_naf"),
            Column::new(id, "Code postal", ColumnTable::Etablissement, "code_postal"),
        ]
    }

    /// Requester-identity columns, as laid out in the export artifact:
    /// the dossier number, the submitter block (individual or
    /// establishment) and, when flagged, the Chorus columns.
    pub fn usager_columns_for_export(&self) -> Vec<Column> {
        self.columns()
            .into_iter()
            .filter(|c| {
                matches!(
                    c.table,
                    ColumnTable::User | ColumnTable::Individual | ColumnTable::Etablissement
                ) || (c.table == ColumnTable::SelfTable
                    && (c.column == "id"
                        || c.column == "user_from_france_connect"
                        || CHORUS_COLUMNS.iter().any(|(_, key)| c.column == *key)))
            })
            .collect()
    }

    /// Dossier-lifecycle columns, as laid out in the export artifact:
    /// everything that is neither requester identity nor a user-defined
    /// field.
    pub fn dossier_columns_for_export(&self) -> Vec<Column> {
        let usager: Vec<String> = self.usager_columns_for_export().iter().map(Column::h_id).collect();
        self.columns()
            .into_iter()
            .filter(|c| c.table != ColumnTable::TypeDeChamp && !usager.contains(&c.h_id()))
            .collect()
    }

    /// User-defined field columns, in declaration order.
    pub fn champ_columns_for_export(&self) -> Vec<Column> {
        self.columns()
            .into_iter()
            .filter(|c| c.table == ColumnTable::TypeDeChamp)
            .collect()
    }
}
