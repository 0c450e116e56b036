//! HTTP-level tests for the `/alerts` endpoints.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    admin_token, body_json, build_test_app, build_test_app_with, create_item, get,
    get_auth, post_json_auth, test_config, token, TestApp,
};
use serde_json::{json, Value};
use stockroom_db::{InMemoryInventoryRepository, InventoryRepository};
use stockroom_notify::{
    AlertChannel, DeliveryError, LocationDigest, LogChannel, NotificationOptions, WebhookChannel,
    WebhookDelivery,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records what it was asked to deliver.
#[derive(Default)]
struct RecordingChannel {
    digests: Mutex<Vec<(String, usize)>>,
    webhook_urls: Mutex<Vec<Option<String>>>,
    fail: bool,
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(
        &self,
        digest: &LocationDigest,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError> {
        self.digests
            .lock()
            .unwrap()
            .push((digest.location.clone(), digest.alerts.len()));
        self.webhook_urls
            .lock()
            .unwrap()
            .push(options.webhook_url.clone());
        if self.fail {
            return Err(DeliveryError::Other("refused".into()));
        }
        Ok(())
    }
}

/// LOW 3/5, CRIT 2/5, OUT 0/5 and OK 6/5 at WH-1; OUT2 0/10 at WH-2.
async fn seed_scenario(app: &TestApp) {
    create_item(&app.router, "LOW", "WH-1", 3, 5).await;
    create_item(&app.router, "CRIT", "WH-1", 2, 5).await;
    create_item(&app.router, "OUT", "WH-1", 0, 5).await;
    create_item(&app.router, "OK", "WH-1", 6, 5).await;
    create_item(&app.router, "OUT2", "WH-2", 0, 10).await;
}

fn skus(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|i| i["sku"].as_str().unwrap())
        .collect()
}

async fn feed(app: &TestApp, query: &str) -> Value {
    let response = get_auth(
        &app.router,
        &format!("/api/v1/alerts/low-stock{query}"),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feed_requires_token() {
    let app = build_test_app();
    let response = get(&app.router, "/api/v1/alerts/low-stock").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn feed_requires_admin_role_or_alert_permission() {
    let app = build_test_app();

    let response = get_auth(
        &app.router,
        "/api/v1/alerts/low-stock",
        &token("staff", &["orders:read"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    for permission in ["alerts:read", "inventory:admin"] {
        let response = get_auth(
            &app.router,
            "/api/v1/alerts/low-stock",
            &token("staff", &[permission]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "permission {permission}");
    }
}

// ---------------------------------------------------------------------------
// Low-stock feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feed_classifies_and_summarises() {
    let app = build_test_app();
    seed_scenario(&app).await;

    let json = feed(&app, "").await;
    assert_eq!(skus(&json["lowStock"]), ["LOW"]);
    assert_eq!(skus(&json["criticalLowStock"]), ["CRIT"]);
    assert_eq!(skus(&json["outOfStock"]), ["OUT", "OUT2"]);
    assert_eq!(json["lowStock"][0]["level"], "low-stock");
    assert_eq!(json["lowStock"][0]["percentOfThreshold"], 60.0);

    let summary = &json["summary"];
    assert_eq!(summary["totalLowStock"], 1);
    assert_eq!(summary["totalCriticalLowStock"], 1);
    assert_eq!(summary["totalOutOfStock"], 2);
    assert_eq!(
        summary["locationBreakdown"],
        json!([
            { "location": "WH-1", "lowStockCount": 1, "criticalCount": 1, "outOfStockCount": 1 },
            { "location": "WH-2", "lowStockCount": 0, "criticalCount": 0, "outOfStockCount": 1 },
        ])
    );
}

#[tokio::test]
async fn feed_filters_apply() {
    let app = build_test_app();
    seed_scenario(&app).await;

    let critical = feed(&app, "?criticalOnly=true").await;
    assert!(critical["lowStock"].as_array().unwrap().is_empty());
    assert_eq!(critical["summary"]["totalCriticalLowStock"], 1);
    assert_eq!(critical["summary"]["totalOutOfStock"], 2);

    let wh2 = feed(&app, "?location=WH-2").await;
    assert_eq!(skus(&wh2["outOfStock"]), ["OUT2"]);
    assert_eq!(wh2["summary"]["totalLowStock"], 0);
    assert_eq!(wh2["summary"]["locationBreakdown"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn feed_days_without_restock_excludes_recent_restocks() {
    let app = build_test_app();
    seed_scenario(&app).await;

    let mut low = app.repo.find_by_sku("LOW", Some("WH-1")).await.unwrap().remove(0);
    low.last_restocked_at = Some(Utc::now() - Duration::days(1));
    app.repo.put(low).unwrap();

    let json = feed(&app, "?daysWithoutRestock=30").await;
    assert!(json["lowStock"].as_array().unwrap().is_empty());
    assert_eq!(skus(&json["criticalLowStock"]), ["CRIT"]);

    let response = get_auth(
        &app.router,
        "/api/v1/alerts/low-stock?daysWithoutRestock=-1",
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inactive_records_are_excluded() {
    let app = build_test_app();
    create_item(&app.router, "GONE", "WH-1", 0, 5).await;
    let response = common::put_json_auth(
        &app.router,
        "/api/v1/inventory/GONE",
        &admin_token(),
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = feed(&app, "").await;
    assert_eq!(json["summary"]["totalOutOfStock"], 0);
}

// ---------------------------------------------------------------------------
// Restock and stale
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restock_is_ordered_by_depletion() {
    let app = build_test_app();
    seed_scenario(&app).await;
    let admin = admin_token();

    let json = body_json(get_auth(&app.router, "/api/v1/alerts/restock", &admin).await).await;
    assert_eq!(skus(&json), ["OUT", "OUT2", "CRIT", "LOW"]);

    let json = body_json(
        get_auth(&app.router, "/api/v1/alerts/restock?criticalOnly=true", &admin).await,
    )
    .await;
    assert_eq!(skus(&json), ["OUT", "OUT2", "CRIT"]);

    let json = body_json(
        get_auth(&app.router, "/api/v1/alerts/restock?locations=WH-2", &admin).await,
    )
    .await;
    assert_eq!(skus(&json), ["OUT2"]);
}

#[tokio::test]
async fn restock_filters_by_product() {
    let app = build_test_app();
    let target = create_item(&app.router, "MINE", "WH-1", 1, 5).await;
    create_item(&app.router, "OTHER", "WH-1", 1, 5).await;
    let product_id = target["productId"].as_str().unwrap();

    let json = body_json(
        get_auth(
            &app.router,
            &format!("/api/v1/alerts/restock?productIds={product_id}"),
            &admin_token(),
        )
        .await,
    )
    .await;
    assert_eq!(skus(&json), ["MINE"]);

    let response = get_auth(
        &app.router,
        "/api/v1/alerts/restock?productIds=not-a-uuid",
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn stale_lists_items_never_or_long_ago_restocked() {
    let app = build_test_app();
    seed_scenario(&app).await;

    let mut ok = app.repo.find_by_sku("OK", None).await.unwrap().remove(0);
    ok.last_restocked_at = Some(Utc::now() - Duration::days(2));
    app.repo.put(ok).unwrap();

    let json = body_json(
        get_auth(&app.router, "/api/v1/alerts/stale?days=7", &admin_token()).await,
    )
    .await;
    assert_eq!(skus(&json), ["LOW", "CRIT", "OUT", "OUT2"]);

    let json = body_json(
        get_auth(&app.router, "/api/v1/alerts/stale?days=1", &admin_token()).await,
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 5);

    let response = get_auth(&app.router, "/api/v1/alerts/stale?days=-3", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_day_counts_are_rejected() {
    let app = build_test_app();
    seed_scenario(&app).await;

    for uri in [
        "/api/v1/alerts/stale?days=200000000000",
        "/api/v1/alerts/low-stock?daysWithoutRestock=200000000000",
    ] {
        let response = get_auth(&app.router, uri, &admin_token()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &admin_token(),
        json!({ "daysWithoutRestock": 200_000_000_000_i64 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Notify
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notify_dispatches_one_digest_per_location() {
    let channel = Arc::new(RecordingChannel::default());
    let app = build_test_app_with(
        test_config(),
        InMemoryInventoryRepository::new(),
        vec![channel.clone()],
    );
    seed_scenario(&app).await;

    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &admin_token(),
        json!({ "webhookUrl": "http://hooks.invalid/stock" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, json!({ "sent": true, "alertCount": 4, "locationCount": 2 }));

    assert_eq!(
        *channel.digests.lock().unwrap(),
        [("WH-1".to_string(), 3), ("WH-2".to_string(), 1)]
    );
    assert!(channel
        .webhook_urls
        .lock()
        .unwrap()
        .iter()
        .all(|u| u.as_deref() == Some("http://hooks.invalid/stock")));
}

#[tokio::test]
async fn notify_with_nothing_to_report_sends_nothing() {
    let channel = Arc::new(RecordingChannel::default());
    let app = build_test_app_with(
        test_config(),
        InMemoryInventoryRepository::new(),
        vec![channel.clone()],
    );
    create_item(&app.router, "FINE", "WH-1", 50, 5).await;

    let json = body_json(
        post_json_auth(
            &app.router,
            "/api/v1/alerts/low-stock/notify",
            &admin_token(),
            json!({}),
        )
        .await,
    )
    .await;
    assert_eq!(json, json!({ "sent": true, "alertCount": 0, "locationCount": 0 }));
    assert!(channel.digests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn notify_reports_failed_delivery() {
    let channel = Arc::new(RecordingChannel {
        fail: true,
        ..Default::default()
    });
    let app = build_test_app_with(
        test_config(),
        InMemoryInventoryRepository::new(),
        vec![channel.clone()],
    );
    create_item(&app.router, "EMPTY", "WH-1", 0, 5).await;

    let json = body_json(
        post_json_auth(
            &app.router,
            "/api/v1/alerts/low-stock/notify",
            &admin_token(),
            json!({ "criticalOnly": true }),
        )
        .await,
    )
    .await;
    assert_eq!(json["sent"], false);
    assert_eq!(json["alertCount"], 1);
}

#[tokio::test]
async fn notify_requires_alert_reader() {
    let app = build_test_app();
    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &token("staff", &[]),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn alert_readers_cannot_redirect_notifications() {
    let channel = Arc::new(RecordingChannel::default());
    let app = build_test_app_with(
        test_config(),
        InMemoryInventoryRepository::new(),
        vec![channel.clone()],
    );
    seed_scenario(&app).await;
    let reader = token("staff", &["alerts:read"]);

    for body in [
        json!({ "webhookUrl": "http://169.254.169.254/latest" }),
        json!({ "emailRecipients": ["someone@example.com"] }),
    ] {
        let response = post_json_auth(
            &app.router,
            "/api/v1/alerts/low-stock/notify",
            &reader,
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
    assert!(channel.digests.lock().unwrap().is_empty());

    // Configured destinations stay available to readers.
    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &reader,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &token("staff", &["inventory:admin"]),
        json!({ "webhookUrl": "http://hooks.invalid/stock" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn unreachable_webhook_reports_failure_within_request_timeout() {
    let config = test_config();
    let webhook = WebhookDelivery::with_deadline(config.alerts.delivery_deadline()).unwrap();
    let app = build_test_app_with(
        config,
        InMemoryInventoryRepository::new(),
        vec![Arc::new(LogChannel), Arc::new(WebhookChannel::new(webhook))],
    );
    for n in 1..=5 {
        create_item(&app.router, &format!("GONE{n}"), &format!("WH-{n}"), 0, 5).await;
    }

    let response = post_json_auth(
        &app.router,
        "/api/v1/alerts/low-stock/notify",
        &admin_token(),
        json!({ "webhookUrl": "http://127.0.0.1:1/hook" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, json!({ "sent": false, "alertCount": 5, "locationCount": 5 }));
}
