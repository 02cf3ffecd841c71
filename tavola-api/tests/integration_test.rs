use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tavola_api::{app, AppState};
use tavola_catalog::{AvailabilityCache, ResourceRegistry};
use tavola_core::resource::ResourceConfig;
use tavola_store::app_config::BookingRules;
use tavola_store::menu::MenuItem;
use tavola_store::{DayLocks, InMemoryReservationStore, MenuStore};

// Chef's counter: capacity 4, slots 17:00 / 18:30 / 20:00.
fn test_state() -> (AppState, Uuid) {
    let resource = ResourceConfig {
        id: Uuid::new_v4(),
        name: "Chef's counter".to_string(),
        capacity: 4,
        open: "17:00:00".parse().unwrap(),
        close: "22:00:00".parse().unwrap(),
        slot_minutes: 90,
    };
    let resource_id = resource.id;

    let menu = MenuStore::from_items(vec![
        MenuItem {
            id: "tiramisu".to_string(),
            name: "Tiramisu".to_string(),
            description: None,
            price_cents: 950,
            category: "Desserts".to_string(),
            available: true,
        },
        MenuItem {
            id: "risotto".to_string(),
            name: "Saffron risotto".to_string(),
            description: None,
            price_cents: 1900,
            category: "Mains".to_string(),
            available: true,
        },
    ]);

    let (events_tx, _) = tokio::sync::broadcast::channel(16);

    let state = AppState {
        registry: Arc::new(ResourceRegistry::from_configs(vec![resource]).unwrap()),
        reservations: Arc::new(InMemoryReservationStore::new()),
        cache: Arc::new(AvailabilityCache::new()),
        menu: Arc::new(menu),
        locks: Arc::new(DayLocks::new()),
        events_tx,
        rules: BookingRules {
            max_party_size: 10,
            max_days_ahead: 60,
        },
    };

    (state, resource_id)
}

fn tomorrow() -> NaiveDate {
    Utc::now().date_naive() + chrono::Duration::days(1)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn book_body(resource_id: Uuid, date: NaiveDate, slot: &str, party: u32) -> Value {
    json!({
        "resource_id": resource_id,
        "date": date,
        "slot_start": slot,
        "party_size": party,
        "contact": { "name": "Ada Lovelace", "phone": "555-0101" }
    })
}

fn slot_remaining(availability: &Value, slot: &str) -> Option<u64> {
    availability["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["start"] == slot)
        .map(|s| s["remaining"].as_u64().unwrap())
}

#[tokio::test]
async fn test_booking_decrements_availability() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let avail_uri = format!("/v1/resources/{}/availability?date={}", resource_id, date);

    let (status, before) = send(&router, get(&avail_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot_remaining(&before, "18:30:00"), Some(4));

    let (status, created) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "18:30:00", 3)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["party_size"], 3);

    // Cache was invalidated by the write; the recompute must reflect it.
    let (status, after) = send(&router, get(&avail_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot_remaining(&after, "18:30:00"), Some(1));
    assert_eq!(slot_remaining(&after, "17:00:00"), Some(4));
}

#[tokio::test]
async fn test_booking_full_slot_conflicts() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let (status, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 4)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("seats left"));

    // A full slot disappears from the availability listing entirely.
    let avail_uri = format!("/v1/resources/{}/availability?date={}", resource_id, date);
    let (_, availability) = send(&router, get(&avail_uri)).await;
    assert_eq!(slot_remaining(&availability, "17:00:00"), None);
}

#[tokio::test]
async fn test_cancel_restores_capacity_and_is_idempotent() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let (_, created) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "20:00:00", 4)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let avail_uri = format!("/v1/resources/{}/availability?date={}", resource_id, date);
    let (_, availability) = send(&router, get(&avail_uri)).await;
    assert_eq!(slot_remaining(&availability, "20:00:00"), None);

    let cancel_uri = format!("/v1/reservations/{}/cancel", id);
    let (status, _) = send(&router, post_json(&cancel_uri, json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, availability) = send(&router, get(&avail_uri)).await;
    assert_eq!(slot_remaining(&availability, "20:00:00"), Some(4));

    // Second cancel is a no-op
    let (status, _) = send(&router, post_json(&cancel_uri, json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(&router, get(&format!("/v1/reservations/{}", id))).await;
    assert_eq!(fetched["status"], "CANCELLED");
}

#[tokio::test]
async fn test_modify_moves_seats_between_slots() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let (_, created) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, modified) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/modify", id),
            json!({ "slot_start": "20:00:00", "party_size": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(modified["status"], "MODIFIED");
    assert_eq!(modified["slot_start"], "20:00:00");

    let avail_uri = format!("/v1/resources/{}/availability?date={}", resource_id, date);
    let (_, availability) = send(&router, get(&avail_uri)).await;
    // old slot released, new slot full
    assert_eq!(slot_remaining(&availability, "17:00:00"), Some(4));
    assert_eq!(slot_remaining(&availability, "20:00:00"), None);
}

#[tokio::test]
async fn test_modify_rejects_overfull_target() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let (_, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "18:30:00", 3)),
    )
    .await;
    let (_, created) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/modify", id),
            json!({ "slot_start": "18:30:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("seats left"));
}

#[tokio::test]
async fn test_modify_cancelled_reservation_conflicts() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    let (_, created) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    send(
        &router,
        post_json(&format!("/v1/reservations/{}/cancel", id), json!({})),
    )
    .await;

    let (status, _) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/modify", id),
            json!({ "party_size": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_ids_return_not_found() {
    let (state, _resource_id) = test_state();
    let router = app(state);
    let ghost = Uuid::new_v4();

    let (status, _) = send(&router, get(&format!("/v1/reservations/{}", ghost))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        post_json(&format!("/v1/reservations/{}/cancel", ghost), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/modify", ghost),
            json!({ "party_size": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        get(&format!(
            "/v1/resources/{}/availability?date={}",
            ghost,
            tomorrow()
        )),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_validation_rejections() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    // zero party
    let (status, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // party beyond the configured maximum
    let (status, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 11)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // past date
    let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
    let (status, _) = send(
        &router,
        post_json(
            "/v1/reservations",
            book_body(resource_id, yesterday, "17:00:00", 2),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // off the slot grid
    let (status, body) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:45:00", 2)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not a bookable slot"));
}

#[tokio::test]
async fn test_list_reservations_filters() {
    let (state, resource_id) = test_state();
    let router = app(state);
    let date = tomorrow();

    send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "18:30:00", 2)),
    )
    .await;

    let (status, all) = send(&router, get("/v1/reservations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, filtered) = send(
        &router,
        get(&format!(
            "/v1/reservations?resource_id={}&date={}",
            resource_id, date
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_resource_listing() {
    let (state, resource_id) = test_state();
    let router = app(state);

    let (status, resources) = send(&router, get("/v1/resources")).await;
    assert_eq!(status, StatusCode::OK);
    let resources = resources.as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["id"], resource_id.to_string());
    assert_eq!(resources[0]["capacity"], 4);
}

#[tokio::test]
async fn test_menu_endpoints() {
    let (state, _) = test_state();
    let router = app(state);

    let (status, menu) = send(&router, get("/v1/menu")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["items"].as_array().unwrap().len(), 2);
    assert_eq!(menu["categories"], json!(["Desserts", "Mains"]));

    // case-insensitive category lookup
    let (status, desserts) = send(&router, get("/v1/menu/desserts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(desserts.as_array().unwrap().len(), 1);
    assert_eq!(desserts[0]["id"], "tiramisu");

    let (status, _) = send(&router, get("/v1/menu/brunch")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_capacity_invariant_over_mixed_sequence() {
    let (state, resource_id) = test_state();
    let router = app(state.clone());
    let date = tomorrow();

    // Fill 17:00 with 2+2, fail a third, cancel one, rebook.
    let (_, first) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;

    let (status, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let first_id = first["id"].as_str().unwrap();
    send(
        &router,
        post_json(&format!("/v1/reservations/{}/cancel", first_id), json!({})),
    )
    .await;

    let (status, _) = send(
        &router,
        post_json("/v1/reservations", book_body(resource_id, date, "17:00:00", 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Non-cancelled seats in the slot never exceed capacity.
    let day = state
        .reservations
        .list_for_day(resource_id, date)
        .await
        .unwrap();
    let seated: u32 = day
        .iter()
        .filter(|r| r.counts_against_capacity())
        .map(|r| r.party_size)
        .sum();
    assert!(seated <= 4);
}
