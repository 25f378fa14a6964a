//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use hearth_core::analytics::AlertLevel;
use hearth_core::db::Database;
use hearth_core::models::{CategoryKind, NewTransaction, YearMonth};
use hearth_core::BudgetEvent;
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    db: Database,
    events: mpsc::Receiver<BudgetEvent>,
}

fn setup_with_config(config: ServerConfig) -> TestApp {
    let db = Database::in_memory().unwrap();
    let (sink, events) = channel(16);
    let app = create_router_with_events(db.clone(), BudgetAnalytics::default(), config, sink);
    TestApp { app, db, events }
}

fn setup_test_app() -> TestApp {
    setup_with_config(ServerConfig {
        require_auth: false,
        ..Default::default()
    })
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One family with Rent, Groceries and Salary
fn seed_family(db: &Database) -> (i64, i64, i64) {
    let family_id = db.upsert_family("Okafor").unwrap();
    let rent = db
        .upsert_category(family_id, "Rent", CategoryKind::Expense)
        .unwrap();
    let groceries = db
        .upsert_category(family_id, "Groceries", CategoryKind::Expense)
        .unwrap();
    db.upsert_category(family_id, "Salary", CategoryKind::Income)
        .unwrap();
    (family_id, rent, groceries)
}

/// Twelve months of rent and groceries ending June 2024
fn seed_history(db: &Database, family_id: i64, rent: i64, groceries: i64) {
    let grocery_amounts = [
        380.0, 410.0, 395.0, 420.0, 450.0, 470.0, 400.0, 390.0, 405.0, 415.0, 425.0, 430.0,
    ];
    let start = YearMonth::new(2023, 7).unwrap();
    for (i, amount) in grocery_amounts.iter().enumerate() {
        let period = start.add_months(i as i32);
        let day = period.first_day();
        db.insert_transaction(
            family_id,
            &NewTransaction {
                category_id: rent,
                date: day,
                amount: 1500.0,
                description: "Rent".to_string(),
                import_hash: format!("rent-{}", period),
            },
        )
        .unwrap();
        db.insert_transaction(
            family_id,
            &NewTransaction {
                category_id: groceries,
                date: day,
                amount: *amount,
                description: "Market".to_string(),
                import_hash: format!("groceries-{}", period),
            },
        )
        .unwrap();
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Family API Tests ==========

#[tokio::test]
async fn test_create_and_get_family() {
    let t = setup_test_app();

    let response = send(
        &t.app,
        "POST",
        "/api/families",
        Some(serde_json::json!({ "name": "  Lindqvist " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    assert_eq!(created["name"], "Lindqvist");
    let id = created["id"].as_i64().unwrap();

    let response = send(&t.app, "GET", &format!("/api/families/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["id"], id);

    let response = send(&t.app, "GET", "/api/families", None).await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_family_is_idempotent() {
    let t = setup_test_app();

    let first = get_body_json(
        send(
            &t.app,
            "POST",
            "/api/families",
            Some(serde_json::json!({ "name": "Okafor" })),
        )
        .await,
    )
    .await;
    let second = get_body_json(
        send(
            &t.app,
            "POST",
            "/api/families",
            Some(serde_json::json!({ "name": "Okafor" })),
        )
        .await,
    )
    .await;

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_blank_family_name_rejected() {
    let t = setup_test_app();

    let response = send(
        &t.app,
        "POST",
        "/api/families",
        Some(serde_json::json!({ "name": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_family_not_found() {
    let t = setup_test_app();

    let response = send(&t.app, "GET", "/api/families/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("999"));
}

// ========== Category API Tests ==========

#[tokio::test]
async fn test_categories_by_kind() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/categories", family_id),
        Some(serde_json::json!({ "name": "Bonus", "kind": "income" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["kind"], "income");

    let response = send(
        &t.app,
        "GET",
        &format!("/api/families/{}/categories?kind=income", family_id),
        None,
    )
    .await;
    let income = get_body_json(response).await;
    assert_eq!(income.as_array().unwrap().len(), 2);

    let response = send(
        &t.app,
        "GET",
        &format!("/api/families/{}/categories", family_id),
        None,
    )
    .await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_categories_reject_unknown_kind() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "GET",
        &format!("/api/families/{}/categories?kind=savings", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_defaults_to_expense() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/categories", family_id),
        Some(serde_json::json!({ "name": "Utilities" })),
    )
    .await;
    assert_eq!(get_body_json(response).await["kind"], "expense");
}

// ========== Transaction API Tests ==========

#[tokio::test]
async fn test_transaction_without_budget() {
    let mut t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/transactions", family_id),
        Some(serde_json::json!({
            "category_id": groceries,
            "date": "2024-06-03",
            "amount": 82.4,
            "description": "Market"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["id"].as_i64().is_some());
    assert!(json["tracking"].is_null());
    assert_eq!(json["events_published"], 0);
    assert!(t.events.try_recv().is_err());
}

#[tokio::test]
async fn test_transaction_over_budget_publishes_event() {
    let mut t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);
    let june = YearMonth::new(2024, 6).unwrap();
    let budget_id = t
        .db
        .upsert_budget(family_id, groceries, june, 400.0)
        .unwrap();

    // June 2024 is complete, so utilization is spend over budget
    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/transactions", family_id),
        Some(serde_json::json!({
            "category_id": groceries,
            "date": "2024-06-20",
            "amount": 460.0,
            "description": "Bulk shop"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["tracking"]["budget_id"], budget_id);
    assert_eq!(json["tracking"]["alert"]["level"], "danger");
    assert_eq!(json["tracking"]["spent"], 460.0);
    assert_eq!(json["events_published"], 1);

    let event = t.events.try_recv().unwrap();
    assert_eq!(event.budget_id, budget_id);
    assert_eq!(event.alert_level, AlertLevel::Danger);
    assert_eq!(event.period, june);
}

#[tokio::test]
async fn test_transaction_under_budget_is_quiet() {
    let mut t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);
    t.db
        .upsert_budget(family_id, groceries, YearMonth::new(2024, 6).unwrap(), 400.0)
        .unwrap();

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/transactions", family_id),
        Some(serde_json::json!({
            "category_id": groceries,
            "date": "2024-06-20",
            "amount": 100.0
        })),
    )
    .await;

    let json = get_body_json(response).await;
    assert_eq!(json["tracking"]["alert"]["level"], "none");
    assert_eq!(json["events_published"], 0);
    assert!(t.events.try_recv().is_err());
}

#[tokio::test]
async fn test_transaction_duplicate_hash() {
    let t = setup_test_app();
    let (family_id, rent, _) = seed_family(&t.db);
    let body = serde_json::json!({
        "category_id": rent,
        "date": "2024-06-01",
        "amount": 1500.0,
        "import_hash": "bank-ref-0042"
    });
    let uri = format!("/api/families/{}/transactions", family_id);

    let first = get_body_json(send(&t.app, "POST", &uri, Some(body.clone())).await).await;
    assert!(first["id"].as_i64().is_some());

    let second = get_body_json(send(&t.app, "POST", &uri, Some(body)).await).await;
    assert!(second["id"].is_null());

    let listed = get_body_json(send(&t.app, "GET", &uri, None).await).await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_transactions_without_key_are_kept_separately() {
    let t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);
    let body = serde_json::json!({
        "category_id": groceries,
        "date": "2024-06-02",
        "amount": 12.5,
        "description": "Bakery"
    });
    let uri = format!("/api/families/{}/transactions", family_id);

    let first = get_body_json(send(&t.app, "POST", &uri, Some(body.clone())).await).await;
    let second = get_body_json(send(&t.app, "POST", &uri, Some(body)).await).await;
    assert!(first["id"].as_i64().is_some());
    assert!(second["id"].as_i64().is_some());
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_transaction_rejects_foreign_category() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);
    let other = t.db.upsert_family("Neighbours").unwrap();
    let foreign = t
        .db
        .upsert_category(other, "Garden", CategoryKind::Expense)
        .unwrap();

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/transactions", family_id),
        Some(serde_json::json!({
            "category_id": foreign,
            "date": "2024-06-01",
            "amount": 20.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_rejects_negative_amount() {
    let t = setup_test_app();
    let (family_id, rent, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "POST",
        &format!("/api/families/{}/transactions", family_id),
        Some(serde_json::json!({
            "category_id": rent,
            "date": "2024-06-01",
            "amount": -5.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_transactions_range() {
    let t = setup_test_app();
    let (family_id, rent, groceries) = seed_family(&t.db);
    seed_history(&t.db, family_id, rent, groceries);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/families/{}/transactions?from=2024-06-01&to=2024-06-30",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(json["total"], 24);
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_budget_lifecycle() {
    let t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);
    let uri = format!("/api/families/{}/budgets", family_id);

    let response = send(
        &t.app,
        "PUT",
        &uri,
        Some(serde_json::json!({
            "category_id": groceries, "year": 2024, "month": 7, "amount": 450.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["category_name"], "Groceries");

    // Second PUT replaces the amount in place
    let response = send(
        &t.app,
        "PUT",
        &uri,
        Some(serde_json::json!({
            "category_id": groceries, "year": 2024, "month": 7, "amount": 500.0
        })),
    )
    .await;
    let updated = get_body_json(response).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["amount"], 500.0);

    let listed = get_body_json(send(&t.app, "GET", &format!("{}?year=2024", uri), None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = send(&t.app, "GET", &format!("/api/budgets/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&t.app, "DELETE", &format!("/api/budgets/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["success"], true);

    let response = send(&t.app, "GET", &format!("/api/budgets/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&t.app, "DELETE", &format!("/api/budgets/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_budget_rejects_invalid_month() {
    let t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);

    let response = send(
        &t.app,
        "PUT",
        &format!("/api/families/{}/budgets", family_id),
        Some(serde_json::json!({
            "category_id": groceries, "year": 2024, "month": 13, "amount": 100.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &t.app,
        "GET",
        &format!("/api/families/{}/budgets?year=2024&month=0", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_budget_rejects_negative_amount() {
    let t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);

    let response = send(
        &t.app,
        "PUT",
        &format!("/api/families/{}/budgets", family_id),
        Some(serde_json::json!({
            "category_id": groceries, "year": 2024, "month": 7, "amount": -1.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Analytics API Tests ==========

#[tokio::test]
async fn test_forecast() {
    let t = setup_test_app();
    let (family_id, rent, groceries) = seed_family(&t.db);
    seed_history(&t.db, family_id, rent, groceries);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/forecast?family_id={}&year=2024&month=7&as_of=2024-07-01",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["target"]["year"], 2024);
    assert_eq!(json["target"]["month"], 7);
    assert_eq!(json["categories"].as_object().unwrap().len(), 2);

    let rent_forecast = &json["categories"][rent.to_string()];
    let predicted = rent_forecast["predicted_amount"].as_f64().unwrap();
    assert!((predicted - 1500.0).abs() < 1e-6);
    assert_eq!(rent_forecast["confidence"], "very_high");

    assert!(json["portfolio"]["total_predicted_spending"].as_f64().unwrap() > 1500.0);
}

#[tokio::test]
async fn test_forecast_defaults_to_next_month() {
    let t = setup_test_app();
    let (family_id, rent, groceries) = seed_family(&t.db);
    seed_history(&t.db, family_id, rent, groceries);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/forecast?family_id={}&as_of=2024-06-15",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["target"]["month"], 7);
}

#[tokio::test]
async fn test_forecast_errors() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/forecast?family_id={}&year=2024&month=13",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &t.app,
        "GET",
        &format!("/api/analytics/forecast?family_id={}&year=2024", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&t.app, "GET", "/api/analytics/forecast?family_id=999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forecast_empty_family() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/forecast?family_id={}&year=2024&month=7",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["categories"].as_object().unwrap().is_empty());
    assert_eq!(json["skipped_categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tracking() {
    let t = setup_test_app();
    let (family_id, rent, groceries) = seed_family(&t.db);
    seed_history(&t.db, family_id, rent, groceries);
    let june = YearMonth::new(2024, 6).unwrap();
    t.db.upsert_budget(family_id, groceries, june, 400.0).unwrap();
    t.db.upsert_budget(family_id, rent, june, 1500.0).unwrap();

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/tracking?family_id={}&year=2024&month=6&as_of={}",
            family_id,
            date(2024, 6, 30)
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let snapshots = json["snapshots"].as_array().unwrap();
    assert_eq!(snapshots.len(), 2);

    // Groceries 430 against 400, rent exactly on budget
    let by_name = |name: &str| {
        snapshots
            .iter()
            .find(|s| s["category_name"] == name)
            .unwrap()
            .clone()
    };
    assert_eq!(by_name("Groceries")["alert"]["level"], "danger");
    assert_eq!(by_name("Rent")["alert"]["level"], "danger");
    assert_eq!(
        json["summary"]["critical_alerts"].as_array().unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_tracking_invalid_month() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/tracking?family_id={}&year=2024&month=13",
            family_id
        ),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_reject_out_of_range_year() {
    let t = setup_test_app();
    let (family_id, rent, groceries) = seed_family(&t.db);
    seed_history(&t.db, family_id, rent, groceries);

    for query in ["year=2147483647&month=12", "year=300000&month=6", "year=0&month=1"] {
        let response = send(
            &t.app,
            "GET",
            &format!("/api/analytics/forecast?family_id={}&{}", family_id, query),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "forecast {}", query);
        let json = get_body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Year"));

        let response = send(
            &t.app,
            "GET",
            &format!("/api/analytics/tracking?family_id={}&{}", family_id, query),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "tracking {}", query);
    }

    // Whole-year tracking validates the year too
    let response = send(
        &t.app,
        "GET",
        &format!("/api/analytics/tracking?family_id={}&year=300000", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &t.app,
        "GET",
        &format!("/api/families/{}/budgets?year=300000", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_empty_total_is_positive_zero() {
    let t = setup_test_app();
    let (family_id, _, _) = seed_family(&t.db);

    let response = send(
        &t.app,
        "GET",
        &format!(
            "/api/analytics/forecast?family_id={}&year=2024&month=7",
            family_id
        ),
        None,
    )
    .await;
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("\"total_predicted_spending\":0.0"));
    assert!(!text.contains("-0.0"));
}

// ========== Alert and Audit API Tests ==========

#[tokio::test]
async fn test_list_budget_alerts() {
    let t = setup_test_app();
    let (family_id, _, groceries) = seed_family(&t.db);
    let june = YearMonth::new(2024, 6).unwrap();
    let budget_id = t
        .db
        .upsert_budget(family_id, groceries, june, 400.0)
        .unwrap();

    t.db.record_budget_alert(&BudgetEvent {
        family_id,
        budget_id,
        category_id: groceries,
        category_name: "Groceries".to_string(),
        period: june,
        alert_level: AlertLevel::Warning,
        utilization_rate: 92.0,
        message: "Approaching budget limit".to_string(),
    })
    .unwrap();

    let response = send(
        &t.app,
        "GET",
        &format!("/api/budget-alerts?family_id={}", family_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["level"], "warning");
    assert_eq!(alerts[0]["budget_id"], budget_id);

    let other = get_body_json(send(&t.app, "GET", "/api/budget-alerts?family_id=999", None).await).await;
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_log_records_writes() {
    let t = setup_test_app();

    send(
        &t.app,
        "POST",
        "/api/families",
        Some(serde_json::json!({ "name": "Okafor" })),
    )
    .await;

    let response = send(&t.app, "GET", "/api/audit", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let entries = json.as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["action"] == "create" && e["entity_type"] == "family"));
    assert!(entries.iter().all(|e| e["actor"] == "local-dev"));
}

// ========== Router Tests ==========

#[tokio::test]
async fn test_unknown_endpoint() {
    let t = setup_test_app();

    let response = send(&t.app, "GET", "/api/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers() {
    let t = setup_test_app();

    let response = send(&t.app, "GET", "/api/families", None).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

// ========== Auth Tests ==========

fn auth_config() -> ServerConfig {
    ServerConfig {
        require_auth: true,
        api_keys: vec!["hearth-test-key".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_auth_required_without_key() {
    let t = setup_with_config(auth_config());

    let response = send(&t.app, "GET", "/api/families", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_rejects_wrong_key() {
    let t = setup_with_config(auth_config());

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/families")
                .header("authorization", "Bearer not-the-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_accepts_bearer_key() {
    let t = setup_with_config(auth_config());

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/families")
                .header("authorization", "Bearer hearth-test-key")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"Okafor"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries = t.db.list_audit_log(10).unwrap();
    assert_eq!(entries[0].actor, "api-key");
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(
        parse_api_keys(" a , ,b,"),
        vec!["a".to_string(), "b".to_string()]
    );
    assert!(parse_api_keys("").is_empty());
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc123".to_string()];
    assert!(validate_api_key("abc123", &keys));
    assert!(!validate_api_key("abc12", &keys));
    assert!(!validate_api_key("abc124", &keys));
    assert!(!validate_api_key("abc123", &[]));
}
