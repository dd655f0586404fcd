mod common;

use axum::http::StatusCode;
use common::spawn_app;

#[tokio::test]
async fn test_stats_validation() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/stats").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id is required");

    let (status, _) = app.get("/api/stats?user_id=1&period=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/stats?user_id=1&period=month").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/stats?user_id=1&role=auditor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn test_stats_per_role() {
    let app = spawn_app().await;
    let advertiser = app.register("adv@example.com", "advertiser").await;
    let wm_one = app.register("one@example.com", "webmaster").await;
    let wm_two = app.register("two@example.com", "webmaster").await;

    let loans = app.create_active_offer(advertiser, 1000.0).await;
    let cards = app.create_active_offer(advertiser, 500.0).await;
    let _draft = app.create_offer(advertiser, 700.0).await;

    // wm_one: 3 clicks and 2 conversions on loans, 1 click on cards
    for _ in 0..3 {
        assert_eq!(app.click(loans, wm_one).await, StatusCode::OK);
    }
    assert_eq!(app.click(cards, wm_one).await, StatusCode::OK);
    assert_eq!(app.convert(loans, wm_one).await, StatusCode::OK);
    assert_eq!(app.convert(loans, wm_one).await, StatusCode::OK);

    // wm_two: 1 click and 1 conversion on cards
    assert_eq!(app.click(cards, wm_two).await, StatusCode::OK);
    assert_eq!(app.convert(cards, wm_two).await, StatusCode::OK);

    let (status, wm) = app.get(&format!("/api/stats?user_id={wm_one}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wm["total_clicks"], 4);
    assert_eq!(wm["total_conversions"], 2);
    assert_eq!(wm["total_earnings"].as_f64(), Some(1600.0));
    assert_eq!(wm["active_offers"], 2);
    let daily = wm["daily_conversions"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["conversions"], 2);
    let top = wm["top_offers"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["id"].as_i64(), Some(i64::from(loans)));
    // Independent counts: 3 clicks and 2 conversions, not 6 of each
    assert_eq!(top[0]["clicks"], 3);
    assert_eq!(top[0]["conversions"], 2);
    assert_eq!(top[0]["earnings"].as_f64(), Some(1600.0));
    assert_eq!(top[1]["conversions"], 0);

    let (_, adv) = app
        .get(&format!("/api/stats?user_id={advertiser}&role=advertiser&period=7"))
        .await;
    assert_eq!(adv["total_clicks"], 5);
    assert_eq!(adv["total_conversions"], 3);
    // Spend is payout + commission: 2 * 1000 + 500
    assert_eq!(adv["total_spent"].as_f64(), Some(2500.0));
    assert_eq!(adv["active_offers"], 2);
    let offers = adv["offers"].as_array().unwrap();
    assert_eq!(offers.len(), 3);
    let loans_row = offers
        .iter()
        .find(|o| o["id"].as_i64() == Some(i64::from(loans)))
        .unwrap();
    assert_eq!(loans_row["offer_payout"].as_f64(), Some(1000.0));
    assert_eq!(loans_row["clicks"], 3);
    assert_eq!(loans_row["spent"].as_f64(), Some(2000.0));

    let (_, admin) = app.get("/api/stats?user_id=1&role=admin").await;
    assert_eq!(admin["total_clicks"], 5);
    assert_eq!(admin["total_conversions"], 3);
    assert_eq!(admin["total_commission"].as_f64(), Some(500.0));
    assert_eq!(admin["active_offers"], 2);
    let top_wm = admin["top_webmasters"].as_array().unwrap();
    assert_eq!(top_wm.len(), 2);
    assert_eq!(top_wm[0]["email"], "one@example.com");
    assert_eq!(top_wm[0]["conversions"], 2);
    assert_eq!(top_wm[0]["earnings"].as_f64(), Some(1600.0));
    let top_offers = admin["top_offers"].as_array().unwrap();
    assert_eq!(top_offers.len(), 2);
    assert_eq!(top_offers[0]["commission"].as_f64(), Some(400.0));

    // Zero-day window excludes everything recorded so far
    let (_, empty) = app
        .get(&format!("/api/stats?user_id={wm_one}&period=0"))
        .await;
    assert_eq!(empty["total_clicks"], 0);
    assert_eq!(empty["total_conversions"], 0);
}
