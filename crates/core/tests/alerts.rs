mod common;

use common::*;
use sentinelle_core::alert::{
    list_contracts_past_end_date, list_contracts_without_future_visit,
    list_one_off_nearing_completion,
};
use sentinelle_core::dashboard::{dashboard_stats, DashboardSettings};
use sentinelle_core::status::{ContractStatus, InterventionKind, InterventionStatus};
use sentinelle_core::window::{list_current_week, list_due_within, list_overdue};

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forgotten_contract_surfaces_until_a_visit_is_queued() {
    let mut store = InMemoryStore::new();
    let contract = monthly_contract(1);
    store.insert_contract(contract.clone());
    store.seed(with_status(
        queued(&contract, d(2024, 3, 15)),
        InterventionStatus::Done,
    ));

    let today = d(2024, 3, 20);
    let alerts = list_contracts_without_future_visit(&mut store, today)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].contract_id, 1);

    store.seed(queued(&contract, d(2024, 4, 15)));
    assert!(list_contracts_without_future_visit(&mut store, today)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn suspended_contracts_raise_no_alert() {
    let mut store = InMemoryStore::new();
    let mut contract = monthly_contract(1);
    contract.status = ContractStatus::Suspended;
    store.insert_contract(contract);

    assert!(list_contracts_without_future_visit(&mut store, d(2024, 3, 20))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn one_off_with_last_visit_left() {
    let mut store = InMemoryStore::new();
    let almost = one_off_contract(1, 3);
    let busy = one_off_contract(2, 3);
    store.insert_contract(almost.clone());
    store.insert_contract(busy.clone());
    store.seed(with_status(
        queued(&almost, d(2024, 1, 15)),
        InterventionStatus::Done,
    ));
    store.seed(queued(&almost, d(2024, 2, 15)));
    store.seed(queued(&busy, d(2024, 2, 15)));
    store.seed(with_status(
        queued(&busy, d(2024, 3, 15)),
        InterventionStatus::Postponed,
    ));

    let alerts = list_one_off_nearing_completion(&mut store).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].contract_id, 1);
    assert_eq!(alerts[0].client_id, almost.client_id);
}

#[tokio::test]
async fn visits_beyond_end_date_are_reported() {
    let mut store = InMemoryStore::new();
    let contract = monthly_contract(1);
    store.insert_contract(contract.clone());
    store.seed(queued(&contract, d(2024, 6, 15)));
    store.seed(queued(&contract, d(2024, 7, 15)));
    store.seed(with_status(
        queued(&contract, d(2024, 8, 15)),
        InterventionStatus::Scheduled,
    ));

    let alerts = list_contracts_past_end_date(&mut store).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].count, 2);
    assert_eq!(alerts[0].earliest, d(2024, 7, 15));
    assert_eq!(alerts[0].end_date, d(2024, 6, 30));
}

// ---------------------------------------------------------------------------
// Lists and dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn due_overdue_and_current_week_lists() {
    let mut store = InMemoryStore::new();
    let contract = monthly_contract(1);
    store.insert_contract(contract.clone());
    // Wednesday.
    let today = d(2024, 3, 13);
    let overdue = store.seed(queued(&contract, d(2024, 3, 8)));
    let this_week = store.seed(with_status(
        queued(&contract, d(2024, 3, 11)),
        InterventionStatus::Done,
    ));
    let due = store.seed(queued(&contract, d(2024, 3, 16)));
    let scheduled = store.seed(with_status(
        queued(&contract, d(2024, 3, 17)),
        InterventionStatus::Scheduled,
    ));
    store.seed(queued(&contract, d(2024, 3, 25)));

    let ids = |v: Vec<sentinelle_core::model::Intervention>| -> Vec<_> {
        v.into_iter().map(|i| i.id).collect()
    };

    assert_eq!(
        ids(list_due_within(&mut store, 7, today).await.unwrap()),
        vec![due]
    );
    assert_eq!(
        ids(list_overdue(&mut store, today).await.unwrap()),
        vec![overdue]
    );
    assert_eq!(
        ids(list_current_week(&mut store, today).await.unwrap()),
        vec![this_week, due, scheduled]
    );
}

#[tokio::test]
async fn dashboard_counts_everything_at_once() {
    let mut store = InMemoryStore::new();
    let recurring = monthly_contract(1);
    let forgotten = monthly_contract(2);
    let one_off = one_off_contract(3, 2);
    for c in [&recurring, &forgotten, &one_off] {
        store.insert_contract((*c).clone());
    }
    let today = d(2024, 3, 13);

    store.seed(queued(&recurring, d(2024, 3, 1)));
    store.seed(queued(&recurring, d(2024, 3, 15)));
    let mut inspection = queued(&recurring, d(2024, 4, 5));
    inspection.kind = InterventionKind::Inspection;
    store.seed(inspection);
    store.seed(queued(&one_off, d(2024, 3, 30)));

    let stats = dashboard_stats(&mut store, today, &DashboardSettings::default())
        .await
        .unwrap();

    assert_eq!(stats.due_soon_count, 1);
    assert_eq!(stats.overdue_count, 1);
    assert_eq!(stats.upcoming_inspections_30d, 1);
    assert_eq!(stats.contracts_needing_attention_count, 1);
    assert_eq!(stats.one_off_almost_done_count, 1);
}
