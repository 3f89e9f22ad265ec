//! Integration tests for the dataset resolver and the scoped
//! group-option lookup.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use guichet_core::types::DbId;
use guichet_core::{
    ColumnCatalog, CoreError, FilteredColumn, Procedure, Revision, TypeDeChamp, TypeDeChampKind,
};
use guichet_db::models::dossier::CreateDossier;
use guichet_db::models::export::{ExportStatut, TimeSpanType};
use guichet_db::models::status::DossierState;
use guichet_db::repositories::{DatasetSelection, DossierRepo, GroupeInstructeurRepo};
use guichet_db::DbError;

use common::*;

/// The in-memory procedure whose catalog resolves filters for the
/// seeded rows: one text champ (stable id 99) and one commune champ
/// (stable id 17).
fn procedure_with_champs(procedure_id: DbId) -> Procedure {
    Procedure::new(
        procedure_id,
        "Subvention",
        Revision {
            types_de_champ_public: vec![
                TypeDeChamp::new(99, "Ca va ?", TypeDeChampKind::Text),
                TypeDeChamp::new(17, "Ma commune", TypeDeChampKind::Commune),
            ],
            types_de_champ_private: vec![],
        },
    )
}

struct Fixture {
    procedure_id: DbId,
    groupe_id: DbId,
    catalog: ColumnCatalog,
    brouillon: DbId,
    en_construction: DbId,
    en_instruction: DbId,
    accepte: DbId,
}

async fn seed(pool: &PgPool) -> Fixture {
    let procedure_id = create_procedure(pool, "Subvention").await;
    let groupe_id = create_groupe(pool, procedure_id, "défaut").await;
    let catalog = procedure_with_champs(procedure_id).column_catalog();

    let mut ids = Vec::new();
    for state in [
        DossierState::Brouillon,
        DossierState::EnConstruction,
        DossierState::EnInstruction,
        DossierState::Accepte,
    ] {
        let dossier = DossierRepo::create(
            pool,
            &CreateDossier {
                procedure_id,
                groupe_instructeur_id: groupe_id,
                user_id: None,
                state: state.id(),
            },
        )
        .await
        .unwrap();
        ids.push(dossier.id);
    }

    Fixture {
        procedure_id,
        groupe_id,
        catalog,
        brouillon: ids[0],
        en_construction: ids[1],
        en_instruction: ids[2],
        accepte: ids[3],
    }
}

fn selection<'a>(fixture: &'a Fixture, scope: &'a [DbId]) -> DatasetSelection<'a> {
    DatasetSelection {
        groupe_instructeur_ids: scope,
        statut: None,
        time_span_type: TimeSpanType::Everything,
        filters: &[],
        catalog: &fixture.catalog,
        followed_by: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn excludes_drafts_by_default(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let dossiers = DossierRepo::dossiers_for_export(&pool, &selection(&fixture, &scope))
        .await
        .unwrap();
    let ids: Vec<DbId> = dossiers.iter().map(|d| d.id).collect();

    assert_eq!(
        ids,
        vec![fixture.en_construction, fixture.en_instruction, fixture.accepte]
    );
    assert!(!ids.contains(&fixture.brouillon));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statut_tous_with_state_filter_narrows(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let state_column = fixture.catalog.find_by_label("Statut").unwrap().clone();
    let filters = vec![FilteredColumn::new(&state_column, "en_construction")];
    let mut sel = selection(&fixture, &scope);
    sel.statut = Some(ExportStatut::Tous);
    sel.filters = &filters;

    let dossiers = DossierRepo::dossiers_for_export(&pool, &sel).await.unwrap();
    let ids: Vec<DbId> = dossiers.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![fixture.en_construction]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn several_values_on_one_column_widen(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let state_column = fixture.catalog.find_by_label("Statut").unwrap().clone();
    let filters = vec![
        FilteredColumn::new(&state_column, "en_construction"),
        FilteredColumn::new(&state_column, "accepte"),
    ];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.en_construction, fixture.accepte]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statut_traites_keeps_terminal_states(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let mut sel = selection(&fixture, &scope);
    sel.statut = Some(ExportStatut::Traites);

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.accepte]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statut_suivis_requires_a_follow(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];
    let instructeur_id = create_instructeur(&pool, "camille@exemple.fr").await;

    sqlx::query("INSERT INTO follows (dossier_id, instructeur_id) VALUES ($1, $2)")
        .bind(fixture.en_instruction)
        .bind(instructeur_id)
        .execute(&pool)
        .await
        .unwrap();

    let mut sel = selection(&fixture, &scope);
    sel.statut = Some(ExportStatut::Suivis);
    sel.followed_by = Some(instructeur_id);

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.en_instruction]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn monthly_window_drops_old_submissions(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    sqlx::query("UPDATE dossiers SET depose_at = NOW() - INTERVAL '40 days' WHERE id = $1")
        .bind(fixture.en_construction)
        .execute(&pool)
        .await
        .unwrap();

    let mut sel = selection(&fixture, &scope);
    sel.time_span_type = TimeSpanType::Monthly;

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.en_instruction, fixture.accepte]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn champ_filter_matches_through_the_value_store(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    sqlx::query("INSERT INTO champs (dossier_id, stable_id, value) VALUES ($1, 99, 'tout va bien')")
        .bind(fixture.en_construction)
        .execute(&pool)
        .await
        .unwrap();

    let champ_column = fixture.catalog.find_by_label("Ca va ?").unwrap().clone();
    let filters = vec![FilteredColumn::new(&champ_column, "va bien")];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.en_construction]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn commune_code_facet_filters_on_its_own_slot(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    sqlx::query(
        "INSERT INTO champs (dossier_id, stable_id, value, code, departement) \
         VALUES ($1, 17, 'Paris', '75056', '75')",
    )
    .bind(fixture.accepte)
    .execute(&pool)
    .await
    .unwrap();

    let code_column = fixture
        .catalog
        .find_by_label("Ma commune – commune")
        .unwrap()
        .clone();
    let filters = vec![FilteredColumn::new(&code_column, "75056")];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.accepte]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn requester_email_filter_joins_users(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];
    let alice = create_user(&pool, "alice@exemple.fr").await;

    sqlx::query("UPDATE dossiers SET user_id = $2 WHERE id = $1")
        .bind(fixture.accepte)
        .bind(alice)
        .execute(&pool)
        .await
        .unwrap();

    let demandeur = fixture.catalog.find_by_label("Demandeur").unwrap().clone();
    let filters = vec![FilteredColumn::new(&demandeur, "alice")];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let ids: Vec<DbId> = DossierRepo::dossiers_for_export(&pool, &sel)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![fixture.accepte]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_column_reference_surfaces_not_found(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let filters = vec![FilteredColumn {
        h_id: "deadbeef".to_string(),
        filter: "x".to_string(),
    }];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let result = DossierRepo::dossiers_for_export(&pool, &sel).await;
    assert_matches!(result, Err(DbError::Core(CoreError::ColumnNotFound(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_filterable_columns_are_a_no_op(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];

    let notifications = fixture.catalog.find_by_label("notifications").unwrap().clone();
    let filters = vec![FilteredColumn::new(&notifications, "anything")];
    let mut sel = selection(&fixture, &scope);
    sel.filters = &filters;

    let dossiers = DossierRepo::dossiers_for_export(&pool, &sel).await.unwrap();
    assert_eq!(dossiers.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn count_agrees_with_the_row_set(pool: PgPool) {
    let fixture = seed(&pool).await;
    let scope = [fixture.groupe_id];
    let sel = selection(&fixture, &scope);

    let dossiers = DossierRepo::dossiers_for_export(&pool, &sel).await.unwrap();
    let count = DossierRepo::count_for_export(&pool, &sel).await.unwrap();
    assert_eq!(count, dossiers.len() as i64);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn options_visible_to_scope_by_membership(pool: PgPool) {
    let fixture = seed(&pool).await;
    let second_groupe = create_groupe(&pool, fixture.procedure_id, "Nord").await;
    let member = create_instructeur(&pool, "membre@exemple.fr").await;
    let outsider = create_instructeur(&pool, "autre@exemple.fr").await;

    GroupeInstructeurRepo::add_instructeur(&pool, fixture.groupe_id, member)
        .await
        .unwrap();
    GroupeInstructeurRepo::add_instructeur(&pool, second_groupe, member)
        .await
        .unwrap();

    let options =
        GroupeInstructeurRepo::options_visible_to(&pool, member, fixture.procedure_id)
            .await
            .unwrap();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"défaut"));
    assert!(labels.contains(&"Nord"));

    let none = GroupeInstructeurRepo::options_visible_to(&pool, outsider, fixture.procedure_id)
        .await
        .unwrap();
    assert!(none.is_empty());
}
