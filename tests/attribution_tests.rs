mod common;

use axum::http::StatusCode;
use common::spawn_app;
use cpatrack::entities::{conversions, prelude::*};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::json;

#[tokio::test]
async fn test_offer_lifecycle() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;

    let (status, body) = app
        .post(
            "/api/offers",
            json!({"name": "Loans", "description": "", "payout": 1000, "category": "finance", "advertiser_id": advertiser}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["prepayment_amount"].as_f64(), Some(20_000.0));
    let offer_id = body["offer_id"].as_i64().unwrap();
    assert_eq!(
        body["pixel_code"],
        format!(
            r#"<script src="https://cpasibo.pro/pixel.js" data-offer-id="{offer_id}"></script>"#
        )
    );

    let (_, offer) = app.get(&format!("/api/offers?id={offer_id}")).await;
    assert_eq!(offer["status"], "pending");
    assert_eq!(offer["test_lead_completed"], false);
    assert_eq!(offer["prepayment_paid"], false);
    assert_eq!(offer["advertiser_email"], "adv@example.com");

    // Activation is gated on both flags
    let (status, body) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "activate"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Activation conditions not met");

    app.put("/api/offers", json!({"offer_id": offer_id, "action": "test_lead"}))
        .await;
    let (status, _) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "activate"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, offer) = app.get(&format!("/api/offers?id={offer_id}")).await;
    assert_eq!(offer["status"], "pending");

    let (status, _) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "prepayment"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "activate"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, offer) = app.get(&format!("/api/offers?id={offer_id}")).await;
    assert_eq!(offer["status"], "active");

    // Activating again is a no-op success
    let (status, _) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "activate"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = app.get("/api/offers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"].as_i64(), Some(offer_id));
}

#[tokio::test]
async fn test_offer_validation_and_not_found() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;

    let (status, body) = app
        .post(
            "/api/offers",
            json!({"name": "Cheap", "payout": 499.99, "advertiser_id": advertiser}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid offer data. Minimum payout is 500");

    let (status, body) = app
        .post(
            "/api/offers",
            json!({"name": "Rounds up", "payout": 499.996, "advertiser_id": advertiser}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid offer data. Minimum payout is 500");

    let (status, _) = app
        .post("/api/offers", json!({"name": "   ", "payout": 600, "advertiser_id": advertiser}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/offers", json!({"name": "No owner", "payout": 600}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/offers", json!({"name": "Ghost", "payout": 600, "advertiser_id": 9999}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put("/api/offers", json!({"offer_id": 9999, "action": "activate"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Offer 9999 not found");

    let (status, _) = app
        .put("/api/offers", json!({"offer_id": 9999, "action": "test_lead"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.put("/api/offers", json!({"action": "activate"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "offer_id is required");

    let offer_id = app.create_offer(advertiser, 500.0).await;
    let (status, body) = app
        .put("/api/offers", json!({"offer_id": offer_id, "action": "archive"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action");

    let (status, _) = app.get("/api/offers?id=424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Pending offers are listed only on request
    let (_, active) = app.get("/api/offers").await;
    assert!(active.as_array().unwrap().is_empty());
    let (_, pending) = app.get("/api/offers?status=pending").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_pixel_script() {
    let app = spawn_app().await;
    let (status, content_type, body) = app.get_raw("/api/pixel", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");
    let script = String::from_utf8(body).unwrap();
    assert!(script.contains("data-offer-id"));
    assert!(script.contains("trackConversion"));
    assert_eq!(script, cpatrack::services::pixel::PIXEL_SCRIPT);
}

#[tokio::test]
async fn test_click_then_convert_credits_webmaster() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let webmaster = app.register("wm@example.com", "webmaster").await;
    let offer_id = app.create_active_offer(advertiser, 1000.0).await;

    let (status, content_type, body) = app
        .get_raw(
            &format!("/api/pixel?action=click&offer_id={offer_id}&wm_id={webmaster}&referrer=https%3A%2F%2Fblog.example"),
            &[("x-forwarded-for", "203.0.113.7, 10.0.0.1"), ("user-agent", "test-agent")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "image/gif");
    assert!(body.starts_with(b"GIF89a"));

    let click = app
        .state
        .store()
        .latest_click(offer_id, webmaster)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(click.ip_address, "203.0.113.7");
    assert_eq!(click.user_agent, "test-agent");
    assert_eq!(click.referrer, "https://blog.example");
    assert_eq!(click.utm_source, "cpasibo_pro");
    assert_eq!(click.utm_medium, "cpl");

    assert_eq!(app.convert(offer_id, webmaster).await, StatusCode::OK);

    let conversion = Conversions::find()
        .filter(conversions::Column::OfferId.eq(offer_id))
        .one(&app.state.store().conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversion.click_id, Some(click.id));
    assert_eq!(conversion.payout, 80_000);
    assert_eq!(conversion.commission, 20_000);
    assert_eq!(conversion.status, "approved");

    assert_eq!(app.balance_minor(webmaster).await, 80_000);
}

#[tokio::test]
async fn test_convert_attributes_latest_click() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let webmaster = app.register("wm@example.com", "webmaster").await;
    let offer_id = app.create_active_offer(advertiser, 500.0).await;

    assert_eq!(app.click(offer_id, webmaster).await, StatusCode::OK);
    assert_eq!(app.click(offer_id, webmaster).await, StatusCode::OK);
    assert_eq!(
        app.state
            .store()
            .count_clicks_for(offer_id, webmaster)
            .await
            .unwrap(),
        2
    );

    let latest = app
        .state
        .store()
        .latest_click(offer_id, webmaster)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(app.convert(offer_id, webmaster).await, StatusCode::OK);

    let conversion = Conversions::find()
        .one(&app.state.store().conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversion.click_id, Some(latest.id));
}

#[tokio::test]
async fn test_convert_without_click() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let webmaster = app.register("wm@example.com", "webmaster").await;
    let offer_id = app.create_active_offer(advertiser, 1000.0).await;

    assert_eq!(app.convert(offer_id, webmaster).await, StatusCode::OK);

    let conversion = Conversions::find()
        .one(&app.state.store().conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversion.click_id, None);
    assert_eq!(app.balance_minor(webmaster).await, 80_000);
}

#[tokio::test]
async fn test_pixel_rejections() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let webmaster = app.register("wm@example.com", "webmaster").await;
    let pending = app.create_offer(advertiser, 1000.0).await;
    let active = app.create_active_offer(advertiser, 1000.0).await;

    // Missing or malformed ids
    let (status, content_type, body) = app
        .get_raw(&format!("/api/pixel?action=click&offer_id={active}"), &[])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "image/gif");
    assert!(body.is_empty());

    let (status, _, _) = app
        .get_raw("/api/pixel?action=convert&offer_id=abc&wm_id=1", &[])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Inactive offer and non-webmaster user
    assert_eq!(app.click(pending, webmaster).await, StatusCode::NOT_FOUND);
    assert_eq!(app.click(active, advertiser).await, StatusCode::NOT_FOUND);
    assert_eq!(app.click(active, 9999).await, StatusCode::NOT_FOUND);
    assert_eq!(app.convert(pending, webmaster).await, StatusCode::NOT_FOUND);

    assert_eq!(
        app.state
            .store()
            .count_clicks_for(pending, webmaster)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        app.state
            .store()
            .count_clicks_for(active, advertiser)
            .await
            .unwrap(),
        0
    );
    assert_eq!(app.balance_minor(webmaster).await, 0);

    let (status, _, _) = app.get_raw("/api/pixel?action=explode", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_conversions_do_not_lose_credits() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let webmaster = app.register("wm@example.com", "webmaster").await;
    let offer_id = app.create_active_offer(advertiser, 777.77).await;

    let uri = format!("/api/pixel?action=convert&offer_id={offer_id}&wm_id={webmaster}");
    let mut handles = Vec::new();
    for _ in 0..10 {
        let router = app.router.clone();
        let uri = uri.clone();
        handles.push(tokio::spawn(async move {
            use tower::ServiceExt;
            router
                .oneshot(
                    axum::http::Request::builder()
                        .uri(uri)
                        .body(axum::body::Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap()
                .status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let rows = Conversions::find()
        .order_by_asc(conversions::Column::Id)
        .all(&app.state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows.len(), 10);

    let credited: i64 = rows.iter().map(|c| c.payout).sum();
    for row in &rows {
        // 20% of 77 777 rounds to 15 555
        assert_eq!(row.commission, 15_555);
        assert_eq!(row.payout + row.commission, 77_777);
    }
    assert_eq!(app.balance_minor(webmaster).await, credited);
    assert_eq!(credited, 10 * 62_222);
}
