mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, TestApp};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn empty_shop_reports_zeroes() {
    let app = TestApp::new().await;

    let response = app.request_admin(Method::GET, "/api/admin/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "total_users": 1,
            "total_orders": 0,
            "pending_orders": 0,
            "paid_orders": 0,
            "revenue": 0.0,
            "category_sales": [],
            "top_products": [],
        })
    );
}

#[tokio::test]
async fn metrics_only_recognize_paid_and_shipped_orders() {
    let app = TestApp::new().await;
    let buyer = app.seed_user("buyer@shop.test", false).await;
    let _other = app.seed_user("other@shop.test", false).await;

    let book = app.seed_product("Rust Book", Some("Books"), 1000).await;
    let mug = app.seed_product("Mug", None, 500).await;
    let poster = app.seed_product("Poster", Some("  "), 200).await;

    let now = Utc::now();
    app.seed_order(Some(buyer.id), "paid", 2500, now, &[(book.id, 2, 1000), (mug.id, 1, 500)])
        .await;
    app.seed_order(Some(buyer.id), "shipped", 600, now, &[(poster.id, 3, 200)])
        .await;
    app.seed_order(Some(buyer.id), "pending", 5000, now, &[(book.id, 5, 1000)])
        .await;
    app.seed_order(Some(buyer.id), "cancelled", 1000, now - Duration::days(1), &[(book.id, 1, 1000)])
        .await;

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;

    assert_eq!(body["total_users"], json!(3));
    assert_eq!(body["total_orders"], json!(4));
    assert_eq!(body["pending_orders"], json!(1));
    assert_eq!(body["paid_orders"], json!(1));
    assert_eq!(body["revenue"], json!(31.0));

    // Mug and the blank-category poster share the uncategorized bucket.
    assert_eq!(
        body["category_sales"],
        json!([
            { "category": "Books", "revenue": 20.0 },
            { "category": "Brak", "revenue": 11.0 },
        ])
    );

    assert_eq!(
        body["top_products"],
        json!([
            { "id": poster.id, "name": "Poster", "quantity": 3, "revenue": 6.0 },
            { "id": book.id, "name": "Rust Book", "quantity": 2, "revenue": 20.0 },
            { "id": mug.id, "name": "Mug", "quantity": 1, "revenue": 5.0 },
        ])
    );
}

#[tokio::test]
async fn revenue_uses_price_at_purchase_not_current_price() {
    let app = TestApp::new().await;
    let lamp = app.seed_product("Lamp", Some("Home"), 4999).await;
    app.seed_order(None, "paid", 9998, Utc::now(), &[(lamp.id, 2, 4999)])
        .await;

    let response = app
        .request_admin(
            Method::PUT,
            &format!("/api/admin/products/{}", lamp.id),
            Some(json!({ "price": 10 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;
    assert_eq!(body["revenue"], json!(99.98));
    assert_eq!(body["category_sales"], json!([{ "category": "Home", "revenue": 99.98 }]));
}

#[tokio::test]
async fn top_products_are_limited_and_ties_break_by_id() {
    let app = TestApp::with_config(|cfg| cfg.top_products_limit = 3).await;

    let mut lines = Vec::new();
    let mut ids = Vec::new();
    for (idx, quantity) in [1, 8, 10, 8, 5].into_iter().enumerate() {
        let product = app
            .seed_product(&format!("Item {idx}"), Some("Misc"), 100)
            .await;
        ids.push(product.id);
        lines.push((product.id, quantity, 100));
    }
    app.seed_order(None, "shipped", 3200, Utc::now(), &lines).await;

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;
    let top = body["top_products"].as_array().expect("top_products array");

    assert_eq!(top.len(), 3);
    let ranked: Vec<(i64, i64)> = top
        .iter()
        .map(|p| (p["id"].as_i64().unwrap(), p["quantity"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        ranked,
        vec![
            (i64::from(ids[2]), 10),
            (i64::from(ids[1]), 8),
            (i64::from(ids[3]), 8),
        ]
    );
}

#[tokio::test]
async fn lines_of_deleted_products_leave_breakdowns_but_not_revenue() {
    let app = TestApp::new().await;
    let kept = app.seed_product("Kept", Some("Garden"), 300).await;
    let gone = app.seed_product("Gone", Some("Garden"), 700).await;
    app.seed_order(None, "paid", 1000, Utc::now(), &[(kept.id, 1, 300), (gone.id, 1, 700)])
        .await;

    let response = app
        .request_admin(Method::DELETE, &format!("/api/admin/products/{}", gone.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;
    assert_eq!(body["revenue"], json!(10.0));
    assert_eq!(body["category_sales"], json!([{ "category": "Garden", "revenue": 3.0 }]));
    assert_eq!(
        body["top_products"],
        json!([{ "id": kept.id, "name": "Kept", "quantity": 1, "revenue": 3.0 }])
    );
}

#[tokio::test]
async fn uncategorized_label_is_configurable() {
    let app = TestApp::with_config(|cfg| cfg.uncategorized_label = "none".to_string()).await;
    let thing = app.seed_product("Thing", None, 150).await;
    app.seed_order(None, "paid", 150, Utc::now(), &[(thing.id, 1, 150)])
        .await;

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;
    assert_eq!(body["category_sales"], json!([{ "category": "none", "revenue": 1.5 }]));
}

#[tokio::test]
async fn top_products_service_honours_caller_limit() {
    let app = TestApp::new().await;

    let mut lines = Vec::new();
    let mut ids = Vec::new();
    for (idx, quantity) in [10, 8, 8, 5, 1].into_iter().enumerate() {
        let product = app
            .seed_product(&format!("Item {idx}"), Some("Misc"), 250)
            .await;
        ids.push(product.id);
        lines.push((product.id, quantity, 250));
    }
    app.seed_order(None, "paid", 8000, Utc::now(), &lines).await;
    // Units of unrecognized orders never count.
    app.seed_order(None, "pending", 2500, Utc::now(), &[(ids[4], 100, 250)])
        .await;

    let metrics = &app.state.services.metrics;

    let top = metrics.top_products(3).await.expect("rank top products");
    let ranked: Vec<(i32, i64)> = top.iter().map(|p| (p.id, p.quantity)).collect();
    assert_eq!(ranked, vec![(ids[0], 10), (ids[1], 8), (ids[2], 8)]);
    assert_eq!(top[0].name, "Item 0");
    assert_eq!(top[0].revenue, Decimal::new(2500, 2));

    let everything = metrics.top_products(50).await.expect("rank top products");
    assert_eq!(everything.len(), 5);
    assert_eq!(everything[4].id, ids[4]);
    assert_eq!(everything[4].quantity, 1);

    assert!(metrics.top_products(0).await.expect("rank top products").is_empty());
}

#[tokio::test]
async fn category_sales_service_groups_in_the_database() {
    let app = TestApp::new().await;
    let novel = app.seed_product("Novel", Some("Books"), 1250).await;
    let atlas = app.seed_product("Atlas", Some("Books"), 999).await;
    let kite = app.seed_product("Kite", Some("Toys"), 500).await;
    let misc = app.seed_product("Misc", Some(""), 300).await;

    app.seed_order(None, "paid", 3499, Utc::now(), &[(novel.id, 2, 1250), (atlas.id, 1, 999)])
        .await;
    app.seed_order(None, "shipped", 1800, Utc::now(), &[(kite.id, 3, 500), (misc.id, 1, 300)])
        .await;
    app.seed_order(None, "cancelled", 5000, Utc::now(), &[(kite.id, 10, 500)])
        .await;

    let sales = app
        .state
        .services
        .metrics
        .category_sales()
        .await
        .expect("aggregate category sales");

    let summary: Vec<(String, Decimal)> = sales.into_iter().map(|c| (c.category, c.revenue)).collect();
    assert_eq!(
        summary,
        vec![
            ("Books".to_string(), Decimal::new(3499, 2)),
            ("Toys".to_string(), Decimal::new(1500, 2)),
            ("Brak".to_string(), Decimal::new(300, 2)),
        ]
    );
}

#[tokio::test]
async fn category_literally_named_like_the_label_is_its_own_row() {
    let app = TestApp::new().await;
    let named = app.seed_product("Named", Some("Brak"), 100).await;
    let unnamed = app.seed_product("Unnamed", None, 200).await;
    app.seed_order(None, "paid", 300, Utc::now(), &[(named.id, 1, 100), (unnamed.id, 1, 200)])
        .await;

    let body = body_json(app.request_admin(Method::GET, "/api/admin/metrics", None).await).await;
    assert_eq!(
        body["category_sales"],
        json!([
            { "category": "Brak", "revenue": 2.0 },
            { "category": "Brak", "revenue": 1.0 },
        ])
    );
}
