mod support;

use chrono::Duration;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{headers, method, path, query_param, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::TestConfig;
use slot_cell::store::SlotStore;
use slot_cell::{PaymentMethod, Recurrence, SlotStatus, SupabaseSlotStore};

use support::{anchor_time, open_slot};

async fn store_against(mock_server: &MockServer) -> SupabaseSlotStore {
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    SupabaseSlotStore::new(&config)
}

#[tokio::test]
async fn claim_issues_single_conditional_write() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;

    let patient_id = Uuid::new_v4();
    let mut row = open_slot(Uuid::new_v4(), anchor_time() + Duration::days(1), Recurrence::Weekly);
    row.patient_id = Some(patient_id);
    row.payment_method = Some(PaymentMethod::Cash);
    row.status = SlotStatus::Booked;

    // The availability condition rides in the PATCH itself; there is no
    // separate read in the claim path.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", row.id)))
        .and(query_param("status", "eq.available"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([serde_json::to_value(&row).unwrap()])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let claimed = store
        .claim(row.id, patient_id, PaymentMethod::Cash, SlotStatus::Booked)
        .await
        .unwrap()
        .expect("claim should match the available row");

    assert_eq!(claimed.patient_id, Some(patient_id));
    assert_eq!(claimed.status, SlotStatus::Booked);
}

#[tokio::test]
async fn claim_returns_none_when_condition_misses() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;
    let slot_id = Uuid::new_v4();

    // Empty representation: the row was no longer available
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", slot_id)))
        .and(query_param("status", "eq.available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let claimed = store
        .claim(slot_id, Uuid::new_v4(), PaymentMethod::Cash, SlotStatus::Booked)
        .await
        .unwrap();

    assert!(claimed.is_none());
}

#[tokio::test]
async fn fetch_returns_none_when_missing() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(store.fetch(slot_id).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_scan_filters_open_and_past_for_doctor() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;

    let doctor_id = Uuid::new_v4();
    let row = open_slot(doctor_id, anchor_time() - Duration::days(3), Recurrence::Weekly);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("status", "eq.available"))
        .and(query_param_contains("start_time", "lt."))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([serde_json::to_value(&row).unwrap()])),
        )
        .mount(&mock_server)
        .await;

    let expired = store
        .expired_available(Some(doctor_id), anchor_time())
        .await
        .unwrap();

    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, row.id);
}

#[tokio::test]
async fn batch_update_is_one_upsert() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;

    let first = open_slot(Uuid::new_v4(), anchor_time() + Duration::days(1), Recurrence::Weekly);
    let second = open_slot(Uuid::new_v4(), anchor_time() + Duration::days(2), Recurrence::Weekly);

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointment_slots"))
        .and(headers(
            "Prefer",
            vec!["resolution=merge-duplicates", "return=representation"],
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap(),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    store.update_batch(&[first, second]).await.unwrap();
}

#[tokio::test]
async fn batch_update_skips_write_when_empty() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;

    // No mock mounted: any request would fail the test
    store.update_batch(&[]).await.unwrap();
}

#[tokio::test]
async fn delete_reports_missing_row() {
    let mock_server = MockServer::start().await;
    let store = store_against(&mock_server).await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(!store.delete(slot_id).await.unwrap());
}
