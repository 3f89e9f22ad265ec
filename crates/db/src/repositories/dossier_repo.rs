//! The dataset resolver: from an export's scope, statut and filter set
//! to the query over dossiers.
//!
//! Filter predicates are resolved through the current column catalog —
//! a persisted reference to a removed column surfaces as
//! `CoreError::ColumnNotFound`, never silently drops. Column keys are
//! never user input: they come out of the catalog (walker constants or
//! numeric stable ids), which is what makes splicing them into SQL
//! safe. Filter *values* are always bound.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use guichet_core::types::DbId;
use guichet_core::{Column, ColumnCatalog, ColumnTable, FilteredColumn, ValueColumn};

use crate::error::DbError;
use crate::models::dossier::{CreateDossier, Dossier};
use crate::models::export::{ExportStatut, TimeSpanType};
use crate::models::status::DossierState;

/// Column list for `dossiers` queries, table-qualified for use amid
/// joins.
const COLUMNS: &str = "\
    dossiers.id, dossiers.procedure_id, dossiers.groupe_instructeur_id, \
    dossiers.user_id, dossiers.state, dossiers.archived, \
    dossiers.motivation, dossiers.user_from_france_connect, \
    dossiers.depose_at, dossiers.en_construction_at, \
    dossiers.en_instruction_at, dossiers.processed_at, \
    dossiers.sva_svr_decision_on, dossiers.last_champ_updated_at, \
    dossiers.created_at, dossiers.updated_at";

/// What a report covers: scope groups, a named listing, a time window
/// and the presentation's filter set, resolved against `catalog`.
#[derive(Debug, Clone)]
pub struct DatasetSelection<'a> {
    pub groupe_instructeur_ids: &'a [DbId],
    pub statut: Option<ExportStatut>,
    pub time_span_type: TimeSpanType,
    pub filters: &'a [FilteredColumn],
    pub catalog: &'a ColumnCatalog,
    /// Requesting instructeur; scopes the `suivis` listing to their
    /// follows.
    pub followed_by: Option<DbId>,
}

/// Provides dossier queries for export generation.
pub struct DossierRepo;

impl DossierRepo {
    /// Insert a new dossier. Lifecycle timestamps follow the state.
    pub async fn create(pool: &PgPool, input: &CreateDossier) -> Result<Dossier, sqlx::Error> {
        let query = format!(
            "INSERT INTO dossiers \
                (procedure_id, groupe_instructeur_id, user_id, state, \
                 depose_at, en_construction_at, en_instruction_at, processed_at) \
             VALUES ($1, $2, $3, $4, \
                 CASE WHEN $4 >= $5 THEN NOW() END, \
                 CASE WHEN $4 >= $5 THEN NOW() END, \
                 CASE WHEN $4 >= $6 THEN NOW() END, \
                 CASE WHEN $4 >= $7 THEN NOW() END) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dossier>(&query)
            .bind(input.procedure_id)
            .bind(input.groupe_instructeur_id)
            .bind(input.user_id)
            .bind(input.state)
            .bind(DossierState::EnConstruction.id())
            .bind(DossierState::EnInstruction.id())
            .bind(DossierState::Accepte.id())
            .fetch_one(pool)
            .await
    }

    /// The dossiers an export covers, in id order.
    pub async fn dossiers_for_export(
        pool: &PgPool,
        selection: &DatasetSelection<'_>,
    ) -> Result<Vec<Dossier>, DbError> {
        let mut query = Self::build_query(&format!("SELECT {COLUMNS} FROM dossiers"), selection)?;
        query.push(" ORDER BY dossiers.id");
        let dossiers = query.build_query_as::<Dossier>().fetch_all(pool).await?;
        Ok(dossiers)
    }

    /// How many dossiers an export covers.
    pub async fn count_for_export(
        pool: &PgPool,
        selection: &DatasetSelection<'_>,
    ) -> Result<i64, DbError> {
        let mut query = Self::build_query("SELECT COUNT(*) FROM dossiers", selection)?;
        let count: i64 = query.build_query_scalar().fetch_one(pool).await?;
        Ok(count)
    }

    fn build_query<'a>(
        select: &str,
        selection: &DatasetSelection<'a>,
    ) -> Result<QueryBuilder<'a, Postgres>, DbError> {
        let mut query = QueryBuilder::new(select);

        query.push(" WHERE dossiers.groupe_instructeur_id = ANY(");
        query.push_bind(selection.groupe_instructeur_ids.to_vec());
        query.push(")");

        // Drafts never export.
        query.push(" AND dossiers.state <> ");
        query.push_bind(DossierState::Brouillon.id());

        match selection.statut {
            None | Some(ExportStatut::Tous) => {}
            Some(ExportStatut::Suivis) => {
                query.push(" AND dossiers.state = ANY(");
                query.push_bind(DossierState::EN_COURS.map(DossierState::id).to_vec());
                query.push(")");
                query.push(
                    " AND EXISTS (SELECT 1 FROM follows \
                     WHERE follows.dossier_id = dossiers.id",
                );
                if let Some(instructeur_id) = selection.followed_by {
                    query.push(" AND follows.instructeur_id = ");
                    query.push_bind(instructeur_id);
                }
                query.push(")");
            }
            Some(ExportStatut::Traites) => {
                query.push(" AND dossiers.state = ANY(");
                query.push_bind(DossierState::TERMINES.map(DossierState::id).to_vec());
                query.push(")");
            }
        }

        if selection.time_span_type == TimeSpanType::Monthly {
            query.push(" AND dossiers.depose_at >= NOW() - INTERVAL '30 days'");
        }

        // Group filter values by column: OR within a column, AND
        // across columns.
        let mut grouped: Vec<(&str, Vec<&FilteredColumn>)> = Vec::new();
        for filtered in selection.filters {
            match grouped.iter_mut().find(|(h_id, _)| *h_id == filtered.h_id) {
                Some((_, values)) => values.push(filtered),
                None => grouped.push((&filtered.h_id, vec![filtered])),
            }
        }

        for (h_id, values) in grouped {
            let column = selection.catalog.find_by_h_id(h_id)?;
            if !column.filterable {
                continue;
            }
            query.push(" AND (");
            for (i, filtered) in values.iter().enumerate() {
                if i > 0 {
                    query.push(" OR ");
                }
                push_predicate(&mut query, column, &filtered.filter)?;
            }
            query.push(")");
        }

        Ok(query)
    }
}

fn push_predicate(
    query: &mut QueryBuilder<'_, Postgres>,
    column: &Column,
    value: &str,
) -> Result<(), DbError> {
    match column.table {
        ColumnTable::SelfTable => push_self_predicate(query, column, value),
        ColumnTable::TypeDeChamp => {
            // The key is the node's stable id; the value matches the
            // stored facet.
            let stable_id: DbId = column.column.parse().map_err(|_| invalid(column, value))?;
            let facet = champ_facet(column.value_column);
            query.push(
                "EXISTS (SELECT 1 FROM champs \
                 WHERE champs.dossier_id = dossiers.id \
                   AND champs.stable_id = ",
            );
            query.push_bind(stable_id);
            query.push(format!(" AND champs.{facet} ILIKE "));
            query.push_bind(like(value));
            query.push(")");
            Ok(())
        }
        ColumnTable::User => {
            query.push(
                "EXISTS (SELECT 1 FROM users \
                 WHERE users.id = dossiers.user_id AND users.email ILIKE ",
            );
            query.push_bind(like(value));
            query.push(")");
            Ok(())
        }
        ColumnTable::Individual => {
            let field = match column.column.as_str() {
                "gender" | "nom" | "prenom" => column.column.as_str(),
                _ => return Err(invalid(column, value)),
            };
            query.push(format!(
                "EXISTS (SELECT 1 FROM individuals \
                 WHERE individuals.dossier_id = dossiers.id \
                   AND individuals.{field} ILIKE "
            ));
            query.push_bind(like(value));
            query.push(")");
            Ok(())
        }
        ColumnTable::Etablissement => push_etablissement_predicate(query, column, value),
        ColumnTable::GroupeInstructeur => {
            let id = parse_id(column, value)?;
            query.push("dossiers.groupe_instructeur_id = ");
            query.push_bind(id);
            Ok(())
        }
        ColumnTable::DossierLabels => {
            let id = parse_id(column, value)?;
            query.push(
                "EXISTS (SELECT 1 FROM dossier_labels \
                 WHERE dossier_labels.dossier_id = dossiers.id \
                   AND dossier_labels.label_id = ",
            );
            query.push_bind(id);
            query.push(")");
            Ok(())
        }
        ColumnTable::FollowersInstructeurs => {
            query.push(
                "EXISTS (SELECT 1 FROM follows \
                 INNER JOIN instructeurs ON instructeurs.id = follows.instructeur_id \
                 WHERE follows.dossier_id = dossiers.id AND instructeurs.email ILIKE ",
            );
            query.push_bind(like(value));
            query.push(")");
            Ok(())
        }
        // Not filterable; the caller skipped these already.
        ColumnTable::Notifications | ColumnTable::Avis => {
            query.push("TRUE");
            Ok(())
        }
    }
}

fn push_self_predicate(
    query: &mut QueryBuilder<'_, Postgres>,
    column: &Column,
    value: &str,
) -> Result<(), DbError> {
    match column.column.as_str() {
        "id" => {
            let id = parse_id(column, value)?;
            query.push("dossiers.id = ");
            query.push_bind(id);
        }
        "state" => {
            let state = DossierState::from_str(value).ok_or_else(|| invalid(column, value))?;
            query.push("dossiers.state = ");
            query.push_bind(state.id());
        }
        "archived" => {
            let archived = parse_bool(column, value)?;
            query.push("dossiers.archived = ");
            query.push_bind(archived);
        }
        "user_from_france_connect" => {
            let connected = parse_bool(column, value)?;
            query.push("dossiers.user_from_france_connect = ");
            query.push_bind(connected);
        }
        "motivation" => {
            query.push("dossiers.motivation ILIKE ");
            query.push_bind(like(value));
        }
        "created_at" | "updated_at" | "depose_at" | "en_construction_at"
        | "en_instruction_at" | "processed_at" | "last_champ_updated_at" => {
            let date = parse_date(column, value)?;
            query.push(format!("dossiers.{}::date = ", column.column));
            query.push_bind(date);
        }
        "sva_svr_decision_on" => {
            let date = parse_date(column, value)?;
            query.push("dossiers.sva_svr_decision_on = ");
            query.push_bind(date);
        }
        "sva_svr_decision_before" => {
            let date = parse_date(column, value)?;
            query.push("dossiers.sva_svr_decision_on <= ");
            query.push_bind(date);
        }
        "updated_since" | "depose_since" | "en_construction_since" | "en_instruction_since"
        | "processed_since" => {
            let base = match column.column.as_str() {
                "updated_since" => "updated_at",
                "depose_since" => "depose_at",
                "en_construction_since" => "en_construction_at",
                "en_instruction_since" => "en_instruction_at",
                _ => "processed_at",
            };
            let date = parse_date(column, value)?;
            query.push(format!("dossiers.{base}::date >= "));
            query.push_bind(date);
        }
        _ => return Err(invalid(column, value)),
    }
    Ok(())
}

fn push_etablissement_predicate(
    query: &mut QueryBuilder<'_, Postgres>,
    column: &Column,
    value: &str,
) -> Result<(), DbError> {
    const TEXT_FIELDS: [&str; 8] = [
        "siret",
        "entreprise_siren",
        "entreprise_forme_juridique",
        "entreprise_nom_commercial",
        "entreprise_raison_sociale",
        "entreprise_siret_siege_social",
        "libelle_naf",
        "code_postal",
    ];
    query.push(
        "EXISTS (SELECT 1 FROM etablissements \
         WHERE etablissements.dossier_id = dossiers.id AND ",
    );
    if column.column == "entreprise_date_creation" {
        let date = parse_date(column, value)?;
        query.push("etablissements.entreprise_date_creation = ");
        query.push_bind(date);
    } else if TEXT_FIELDS.contains(&column.column.as_str()) {
        query.push(format!("etablissements.{} ILIKE ", column.column));
        query.push_bind(like(value));
    } else {
        return Err(invalid(column, value));
    }
    query.push(")");
    Ok(())
}

fn champ_facet(value_column: ValueColumn) -> &'static str {
    match value_column {
        ValueColumn::Value => "value",
        ValueColumn::Code => "code",
        ValueColumn::Departement => "departement",
        ValueColumn::Primary => "primary_value",
        ValueColumn::Secondary => "secondary_value",
    }
}

fn like(value: &str) -> String {
    format!("%{value}%")
}

fn parse_id(column: &Column, value: &str) -> Result<DbId, DbError> {
    value.parse().map_err(|_| invalid(column, value))
}

fn parse_bool(column: &Column, value: &str) -> Result<bool, DbError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(column, value)),
    }
}

/// Filter dates arrive as `dd/mm/yyyy` from the filter UI or ISO from
/// the API.
fn parse_date(column: &Column, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| invalid(column, value))
}

fn invalid(column: &Column, value: &str) -> DbError {
    DbError::InvalidFilter {
        column: column.label.clone(),
        value: value.to_string(),
    }
}
