mod common;

use common::mocks::FailMode;
use common::{harness, TestHarness};
use medsync::domain::entities::CycleOutcome;
use medsync::domain::value_objects::{LogicalTable, RecordPayload, SyncStatus};
use serde_json::{json, Value};

fn payload(value: Value) -> RecordPayload {
    RecordPayload::new(value).expect("object payload")
}

async fn queue_depth(h: &TestHarness) -> i64 {
    h.engine.diagnostics().await.unwrap().queue_depth
}

#[tokio::test]
async fn offline_create_syncs_on_reconnect() {
    let h = harness().await;

    // Staged while offline: visible immediately, queued for push.
    let record = h
        .engine
        .create_record(
            LogicalTable::Patients,
            payload(json!({"name": "Asha N.", "phone": "0700100200"})),
        )
        .await
        .unwrap();
    assert_eq!(record.sync_status, SyncStatus::PendingCreate);
    assert_eq!(queue_depth(&h).await, 1);
    assert_eq!(h.engine.force_sync().await, CycleOutcome::Offline);
    assert_eq!(h.remote.calls_matching("upsert:"), 0);

    h.engine.set_online(true);
    let outcome = h.engine.force_sync().await;

    let CycleOutcome::Completed { push, .. } = outcome else {
        panic!("expected a completed cycle");
    };
    assert_eq!(push.pushed, 1);
    assert_eq!(h.remote.calls_matching("upsert:patients"), 1);
    assert_eq!(queue_depth(&h).await, 0);

    let synced = h
        .engine
        .get_record(LogicalTable::Patients, &record.local_id)
        .await
        .unwrap()
        .expect("record still present");
    assert_eq!(synced.sync_status, SyncStatus::Synced);
    let remote_id = synced.remote_id.expect("remote id assigned");

    let remote_rows = h.remote.rows("patients");
    assert_eq!(remote_rows.len(), 1);
    assert_eq!(remote_rows[0]["id"], json!(remote_id.as_str()));
    assert_eq!(remote_rows[0]["name"], json!("Asha N."));
    // Bookkeeping fields never reach the remote.
    assert!(remote_rows[0].get("sync_status").is_none());
    assert!(remote_rows[0].get("local_id").is_none());
}

#[tokio::test]
async fn offline_edits_accumulate_and_replay_in_order() {
    let h = harness().await;
    h.engine.set_online(true);

    let record = h
        .engine
        .create_record(LogicalTable::Patients, payload(json!({"name": "Asha"})))
        .await
        .unwrap();
    h.engine.force_sync().await;

    h.engine.set_online(false);
    h.engine
        .update_record(
            LogicalTable::Patients,
            &record.local_id,
            payload(json!({"phone": "0711"})),
        )
        .await
        .unwrap();
    h.engine
        .update_record(
            LogicalTable::Patients,
            &record.local_id,
            payload(json!({"phone": "0722"})),
        )
        .await
        .unwrap();
    assert_eq!(queue_depth(&h).await, 2);

    h.engine.set_online(true);
    h.engine.force_sync().await;

    assert_eq!(queue_depth(&h).await, 0);
    let remote_rows = h.remote.rows("patients");
    assert_eq!(remote_rows.len(), 1);
    assert_eq!(remote_rows[0]["name"], json!("Asha"));
    assert_eq!(remote_rows[0]["phone"], json!("0722"));
}

#[tokio::test]
async fn update_before_first_push_stays_a_single_create() {
    let h = harness().await;

    let record = h
        .engine
        .create_record(LogicalTable::Patients, payload(json!({"name": "Asha"})))
        .await
        .unwrap();
    let updated = h
        .engine
        .update_record(
            LogicalTable::Patients,
            &record.local_id,
            payload(json!({"phone": "0733"})),
        )
        .await
        .unwrap();
    assert_eq!(updated.sync_status, SyncStatus::PendingCreate);

    h.engine.set_online(true);
    h.engine.force_sync().await;

    // Replays of the create converge on one remote row.
    let remote_rows = h.remote.rows("patients");
    assert_eq!(remote_rows.len(), 1);
    assert_eq!(remote_rows[0]["phone"], json!("0733"));
}

#[tokio::test]
async fn delete_of_synced_record_removes_the_remote_row() {
    let h = harness().await;
    h.engine.set_online(true);

    let record = h
        .engine
        .create_record(LogicalTable::Invoices, payload(json!({"amount": 1200})))
        .await
        .unwrap();
    h.engine.force_sync().await;
    assert_eq!(h.remote.rows("billing_entries").len(), 1);

    h.engine
        .delete_record(LogicalTable::Invoices, &record.local_id)
        .await
        .unwrap();
    h.engine.force_sync().await;

    assert!(h.remote.rows("billing_entries").is_empty());
    assert!(h
        .engine
        .get_record(LogicalTable::Invoices, &record.local_id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(queue_depth(&h).await, 0);
}

#[tokio::test]
async fn pull_translates_tables_and_fields() {
    let h = harness().await;
    h.remote.seed_rows(
        "antenatal_visits",
        vec![json!({"id": "v-1", "pregnancy_id": "pg-7", "week": 28})],
    );
    h.engine.set_online(true);

    h.engine.force_sync().await;

    let visits = h.engine.list_records(LogicalTable::Visits).await.unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].sync_status, SyncStatus::Synced);
    assert_eq!(visits[0].payload.as_map()["patient_id"], json!("pg-7"));
    assert!(visits[0].payload.as_map().get("pregnancy_id").is_none());
}

#[tokio::test]
async fn network_failure_keeps_the_mutation_queued() {
    let h = harness().await;
    h.engine.set_online(true);
    h.remote.set_fail_mode(Some(FailMode::Network));

    h.engine
        .create_record(LogicalTable::Patients, payload(json!({"name": "Asha"})))
        .await
        .unwrap();
    let outcome = h.engine.force_sync().await;

    let CycleOutcome::Completed { push, .. } = outcome else {
        panic!("expected a completed cycle");
    };
    assert_eq!(push.failed, 1);
    assert_eq!(queue_depth(&h).await, 1);

    // Recovery on the next attempt once the backoff window is honored;
    // verified at the unit level where the gate can be rewound.
    let snapshot = h.engine.diagnostics().await.unwrap();
    assert!(snapshot.last_errors.contains_key("patients"));
}

#[tokio::test]
async fn auth_failure_interrupts_without_burying() {
    let h = harness().await;
    h.engine.set_online(true);
    h.remote.set_fail_mode(Some(FailMode::Auth));

    h.engine
        .create_record(LogicalTable::Patients, payload(json!({"name": "Asha"})))
        .await
        .unwrap();

    for _ in 0..5 {
        h.engine.force_sync().await;
    }

    let snapshot = h.engine.diagnostics().await.unwrap();
    assert_eq!(snapshot.queue_depth, 1);
    assert!(snapshot.dead_letters.is_empty());

    // A restored session drains the queue as if nothing happened.
    h.remote.set_fail_mode(None);
    h.engine.force_sync().await;
    assert_eq!(queue_depth(&h).await, 0);
}

#[tokio::test]
async fn diagnostics_reflect_engine_state() {
    let h = harness().await;

    h.engine
        .create_record(LogicalTable::Patients, payload(json!({"name": "Asha"})))
        .await
        .unwrap();
    h.engine
        .create_record(LogicalTable::Appointments, payload(json!({"reason": "ANC"})))
        .await
        .unwrap();

    let offline = h.engine.diagnostics().await.unwrap();
    assert!(!offline.is_online);
    assert_eq!(offline.queue_depth, 2);
    assert_eq!(offline.cycles_completed, 0);
    assert!(offline.last_sync_at.is_none());
    let pending = offline
        .status_counts
        .iter()
        .find(|c| c.status == SyncStatus::PendingCreate)
        .map(|c| c.count);
    assert_eq!(pending, Some(2));

    h.engine.set_online(true);
    h.engine.force_sync().await;

    let online = h.engine.diagnostics().await.unwrap();
    assert!(online.is_online);
    assert_eq!(online.queue_depth, 0);
    assert_eq!(online.cycles_completed, 1);
    assert!(online.last_sync_at.is_some());
}
