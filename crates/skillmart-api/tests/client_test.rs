#![allow(clippy::unwrap_used)]
// Integration tests for `MarketplaceClient` using wiremock.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skillmart_api::types::{CouponCreate, CourseQuery, PaymentIntentRequest};
use skillmart_api::{Credentials, Error, MarketplaceClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MarketplaceClient) {
    let server = MockServer::start().await;
    let client = MarketplaceClient::new(
        &format!("{}/api", server.uri()),
        &Credentials::bearer("tok-123"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn cart_body() -> serde_json::Value {
    json!({
        "_id": "cart1",
        "user": "u1",
        "items": [{
            "courseId": "c1",
            "title": "Rust for Beginners",
            "price": 50,
            "appliedCoupon": { "code": "SAVE20", "discountPercentage": 20 },
            "discountedPrice": 40
        }],
        "subtotal": 50,
        "totalDiscount": 10,
        "total": 40
    })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "name": "Ann", "email": "ann@x.io", "role": "student"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client.me().await.unwrap();
    assert_eq!(me.id, "u1");
    assert!(me.is_active);
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "nope" })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("ann@x.io", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Courses ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_courses_with_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(query_param("level", "beginner"))
        .and(query_param("search", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [{
                "_id": "c1",
                "title": "Rust for Beginners",
                "price": 49.99,
                "level": "beginner",
                "instructor": { "_id": "i1", "name": "Grace" }
            }]
        })))
        .mount(&server)
        .await;

    let query = CourseQuery {
        level: Some("beginner".into()),
        search: Some("rust".into()),
        ..CourseQuery::default()
    };
    let courses = client.list_courses(&query).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].price, Decimal::new(4999, 2));
    assert_eq!(courses[0].instructor.as_ref().unwrap().name(), Some("Grace"));
}

// ── Cart ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_to_cart_sends_course_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_json(json!({ "courseId": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client.add_to_cart("c1").await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total, Decimal::from(40));
    assert_eq!(
        cart.items[0].applied_coupon.as_ref().unwrap().code,
        "SAVE20"
    );
}

#[tokio::test]
async fn test_apply_coupon_error_message_surfaces() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/apply-coupon"))
        .and(body_json(json!({ "courseId": "c1", "couponCode": "OLD10" })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Coupon has expired" })),
        )
        .mount(&server)
        .await;

    let err = client.apply_coupon("c1", "OLD10").await.unwrap_err();
    assert_eq!(err.server_message(), Some("Coupon has expired"));
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_clear_cart() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.clear_cart().await.unwrap();
}

// ── Payment ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_payment_intent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/payment-intent"))
        .and(body_json(json!({
            "amount": 4000,
            "currency": "usd",
            "courseIds": ["c1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clientSecret": "pi_1_secret_2",
            "id": "pi_1"
        })))
        .mount(&server)
        .await;

    let intent = client
        .create_payment_intent(&PaymentIntentRequest {
            amount: 4000,
            currency: "usd".into(),
            course_ids: vec!["c1".into()],
        })
        .await
        .unwrap();
    assert_eq!(intent.client_secret, "pi_1_secret_2");
    assert_eq!(intent.payment_intent_id.as_deref(), Some("pi_1"));
}

// ── Coupons ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_coupon_posts_to_course_scope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/instructors/courses/c1/coupons"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "k1",
            "code": "SPRING25",
            "discountPercentage": 25,
            "maxUses": 100,
            "usedCount": 0,
            "expiryDate": "2030-01-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = CouponCreate {
        code: "SPRING25".into(),
        discount_percentage: 25,
        max_uses: 100,
        expiry_date: "2030-01-01T00:00:00Z".parse().unwrap(),
    };
    let coupon = client.create_coupon("c1", &body).await.unwrap();
    assert_eq!(coupon.id, "k1");
    assert_eq!(coupon.expiry_date.to_rfc3339(), "2030-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_delete_coupon_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/instructors/courses/c1/coupons/k1"))
        .respond_with(ResponseTemplate::new(403).set_body_string(""))
        .mount(&server)
        .await;

    let err = client.delete_coupon("c1", "k1").await.unwrap_err();
    assert!(
        matches!(err, Error::Forbidden { ref message } if message == "insufficient permissions"),
        "got: {err:?}"
    );
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_user_active_patches_status() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/u2/status"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u2", "name": "Bo", "email": "bo@x.io", "role": "instructor", "isActive": false
        })))
        .mount(&server)
        .await;

    let user = client.set_user_active("u2", false).await.unwrap();
    assert!(!user.is_active);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "User not found" })))
        .mount(&server)
        .await;

    let err = client.get_user("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("User not found"));
}

#[tokio::test]
async fn test_user_id_is_percent_encoded_in_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/..%2Fadmin%2Fstats"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_user("../admin/stats").await.unwrap();
    assert!(matches!(
        client.delete_user("..").await,
        Err(Error::InvalidPathSegment { .. })
    ));
}

// ── Admin & recommendations ─────────────────────────────────────────

#[tokio::test]
async fn test_admin_stats_defaults_missing_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalUsers": 12,
            "totalRevenue": 1234.5
        })))
        .mount(&server)
        .await;

    let stats = client.get_admin_stats().await.unwrap();
    assert_eq!(stats.total_users, 12);
    assert_eq!(stats.total_courses, 0);
    assert_eq!(stats.total_revenue, Decimal::new(12345, 1));
}

#[tokio::test]
async fn test_recommendations_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/recommendations/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "courseId": "c2", "score": 0.91 },
            { "courseId": "c3", "score": 0.42, "reason": "Popular in Data" }
        ])))
        .mount(&server)
        .await;

    let recs = client.get_recommendations("u1").await.unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].reason.as_deref(), Some("Popular in Data"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/model/training-status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.get_training_status().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}
