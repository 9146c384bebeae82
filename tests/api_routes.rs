//! HTTP surface: status codes, error bodies and JSON shapes.

mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{response_json, saturday, tuesday, TestApp, ADMIN};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use weddingops_web::models::ServiceType;

fn money(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money as string")).expect("decimal")
}

async fn create(app: &TestApp, event_date: chrono::NaiveDate) -> Value {
    let body = json!({
        "client_name": "Casey & Drew",
        "event_date": event_date,
        "selections": {
            "photography": { "package_id": app.seeded.photo_package },
            "dj": { "package_id": app.seeded.dj_package },
        },
    });
    let response = app
        .request(Method::POST, "/api/contracts", Some(body), Some("maria"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

// ==== Health ====

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

// ==== Contracts ====

#[tokio::test]
async fn test_create_contract_returns_priced_contract() {
    let app = TestApp::new().await;
    let body = create(&app, tuesday()).await;

    assert_eq!(body["status"], "pipeline");
    assert_eq!(money(&body["total_cost"]), dec!(1700));
    assert_eq!(money(&body["totals"]["package_discount"]), dec!(100));
    assert_eq!(body["code"].as_str().unwrap().len(), "26-10-01".len());
}

#[tokio::test]
async fn test_create_contract_rejects_blank_client() {
    let app = TestApp::new().await;
    let body = json!({ "client_name": "  ", "event_date": tuesday() });
    let response = app
        .request(Method::POST, "/api/contracts", Some(body), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error_type"], "validation");
    assert_eq!(body["field"], "client_name");
}

#[tokio::test]
async fn test_unknown_contract_is_not_found() {
    let app = TestApp::new().await;
    let uri = format!("/api/contracts/{}", uuid::Uuid::new_v4());
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dead_requires_admin_header() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/status", contract["id"].as_str().unwrap());

    let response = app
        .request(Method::POST, &uri, Some(json!({ "status": "dead" })), Some("maria"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::POST, &uri, Some(json!({ "status": "dead" })), Some(ADMIN))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "dead");

    let selections_uri = format!("/api/contracts/{}/selections", contract["id"].as_str().unwrap());
    let response = app
        .request(Method::PUT, &selections_uri, Some(json!({ "client_name": "Late" })), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_selections_reprices() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/selections", contract["id"].as_str().unwrap());

    let body = json!({
        "selections": {
            "photography": { "package_id": app.seeded.photo_package },
        },
    });
    let response = app.request(Method::PUT, &uri, Some(body), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(money(&response_json(response).await["total_cost"]), dec!(1000));
}

// ==== Pricing ====

#[tokio::test]
async fn test_contract_total_endpoint() {
    let app = TestApp::new().await;
    let contract = app
        .contract(saturday(), app.packages(&[ServiceType::Photography, ServiceType::Videography]))
        .await;

    let uri = format!("/api/contracts/{}/total", contract.id);
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(money(&body["total_cost"]), dec!(2100));
    assert_eq!(money(&body["total_service_cost"]), dec!(2200));
}

#[tokio::test]
async fn test_quote_does_not_save() {
    let app = TestApp::new().await;
    let body = json!({
        "event_date": tuesday(),
        "selections": {
            "photography": { "package_id": app.seeded.photo_package },
            "videography": { "package_id": app.seeded.video_package },
            "dj": { "package_id": app.seeded.dj_package },
        },
    });
    let response = app
        .request(Method::POST, "/api/pricing/quote", Some(body), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(money(&body["total_cost"]), dec!(2850));
    assert!(body["contract_id"].is_null());
}

// ==== Payments ====

#[tokio::test]
async fn test_overpayment_is_conflict() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/payments", contract["id"].as_str().unwrap());

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({ "amount": "500.00", "method": "check" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["contract_status"], "booked");
    assert_eq!(money(&body["ledger"]["balance_due"]), dec!(1200));

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({ "amount": "1300.00", "method": "check" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response_json(response).await["error_type"], "payment_exceeds_balance");
}

#[tokio::test]
async fn test_fractional_cents_rejected() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/payments", contract["id"].as_str().unwrap());

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({ "amount": "10.005", "method": "cash" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["field"], "amount");
}

#[tokio::test]
async fn test_malformed_body_is_json_validation_error() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/payments", contract["id"].as_str().unwrap());

    for body in [
        json!({ "amount": "abc", "method": "check" }),
        json!({ "amount": "50.00", "method": "barter" }),
    ] {
        let response = app.request(Method::POST, &uri, Some(body), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["error_type"], "validation");
        assert_eq!(body["field"], "body");
    }

    let ledger_uri = format!("/api/contracts/{}/ledger", contract["id"].as_str().unwrap());
    let ledger = response_json(app.request(Method::GET, &ledger_uri, None, None).await).await;
    assert_eq!(money(&ledger["ledger"]["amount_paid"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_malformed_path_is_json_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/contracts/not-a-uuid", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["field"], "path");

    let uri = format!("/api/staff/{}/availability/2027-13-40", app.seeded.photographer);
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error_type"], "validation");
}

#[tokio::test]
async fn test_schedule_endpoint_builds_schedule_a() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/schedule", contract["id"].as_str().unwrap());

    let response = app.request(Method::POST, &uri, Some(json!({})), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["schedule_type"], "schedule_a");
    assert_eq!(money(&body["installments"][0]["amount"]), dec!(900));
    assert_eq!(money(&body["installments"][1]["amount"]), dec!(800));
    assert_eq!(body["installments"][1]["due_date"], "2027-04-09");
}

// ==== Staffing ====

#[tokio::test]
async fn test_unknown_role_is_validation_error() {
    let app = TestApp::new().await;
    let contract = create(&app, tuesday()).await;
    let uri = format!("/api/contracts/{}/bookings/florist", contract["id"].as_str().unwrap());

    let response = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "staff_id": app.seeded.photographer })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["field"], "role");
}

#[tokio::test]
async fn test_assign_role_and_read_availability() {
    let app = TestApp::new().await;
    let contract = create(&app, saturday()).await;
    let uri = format!(
        "/api/contracts/{}/bookings/photographer1",
        contract["id"].as_str().unwrap()
    );

    let response = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "staff_id": app.seeded.photographer, "status": "pending" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "pending");

    let uri = format!(
        "/api/staff/{}/availability/{}",
        app.seeded.photographer,
        saturday()
    );
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["available"], false);
}

#[tokio::test]
async fn test_mark_unavailable() {
    let app = TestApp::new().await;
    let uri = format!(
        "/api/staff/{}/availability/{}",
        app.seeded.second_photographer,
        tuesday()
    );

    let response = app
        .request(Method::PUT, &uri, Some(json!({ "unavailable": true })), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["marked_unavailable"], true);
    assert_eq!(body["available"], false);
}
