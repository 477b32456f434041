#![allow(clippy::unwrap_used)]
// Session behaviour against a mocked backend: validation before network,
// re-fetch after every mutation, concurrent dashboard reads.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skillmart_core::{
    AuthCredentials, Command, CommandResult, ConnectionState, CoreError, CourseQuery,
    CreateCouponRequest, CreateUserRequest, EntityId, Role, RoleProfile, Session, SessionConfig,
    UserQuery,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer, auth: AuthCredentials) -> SessionConfig {
    SessionConfig::new(format!("{}/api", server.uri()).parse().unwrap()).with_auth(auth)
}

fn token() -> AuthCredentials {
    AuthCredentials::Token(SecretString::from("tok-123".to_owned()))
}

fn student() -> serde_json::Value {
    json!({ "_id": "u1", "name": "Ann", "email": "ann@example.com", "role": "student" })
}

fn cart(course_ids: &[&str]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = course_ids
        .iter()
        .map(|id| json!({ "courseId": id, "title": format!("Course {id}"), "price": 20 }))
        .collect();
    let total = 20 * course_ids.len();
    json!({ "user": "u1", "items": items, "subtotal": total, "totalDiscount": 0, "total": total })
}

async fn connected(server: &MockServer) -> Session {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(student()))
        .mount(server)
        .await;

    let session = Session::new(config(server, token()));
    session.connect().await.unwrap();
    session
}

// ── Connect ─────────────────────────────────────────────────────────

#[tokio::test]
async fn token_connect_loads_profile() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    let me = session.current_user().unwrap();
    assert_eq!(me.role(), Role::Student);
    let state = session.connection_state();
    assert_eq!(*state.borrow(), ConnectionState::Connected);

    session.disconnect().await;
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn slow_backend_reports_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(student())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server, token());
    cfg.timeout = Duration::from_secs(1);
    let session = Session::new(cfg);
    let err = session.connect().await.unwrap_err();
    assert!(
        matches!(err, CoreError::Timeout { timeout_secs: 1 }),
        "got: {err:?}"
    );
    assert_eq!(*session.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn expired_token_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = Session::new(config(&server, token()));
    let err = session.connect().await.unwrap_err();
    assert!(err.is_auth(), "got: {err:?}");
}

#[tokio::test]
async fn credentials_login_issues_token_for_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ann@example.com", "password": "hunter22" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh", "user": student() })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthCredentials::Credentials {
        email: "ann@example.com".into(),
        password: SecretString::from("hunter22".to_owned()),
    };
    let session = Session::new(config(&server, auth));
    session.connect().await.unwrap();

    let issued = session.issued_token().await.unwrap();
    assert_eq!(issued.expose_secret(), "fresh");
    assert!(session.cart().await.unwrap().is_empty());
    session.disconnect().await;
}

// ── Cart ────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_to_cart_refetches_cart() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    // Empty before the add, holding c1 after it.
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&[])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_json(json!({ "courseId": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1"])))
        .expect(1)
        .mount(&server)
        .await;

    let result = session
        .execute(Command::AddToCart {
            course_id: EntityId::from("c1"),
        })
        .await
        .unwrap();
    let CommandResult::Cart(c) = result else {
        panic!("expected cart, got {result:?}");
    };
    assert!(c.contains(&EntityId::from("c1")));
    assert_eq!(session.cart_snapshot().unwrap().len(), 1);
    session.disconnect().await;
}

#[tokio::test]
async fn adding_course_already_in_cart_is_a_no_op() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1", "c1"])))
        .expect(0)
        .mount(&server)
        .await;

    let result = session
        .execute(Command::AddToCart {
            course_id: EntityId::from("c1"),
        })
        .await
        .unwrap();
    let CommandResult::Cart(c) = result else {
        panic!("expected cart, got {result:?}");
    };
    assert_eq!(c.len(), 1);
    session.disconnect().await;
}

#[tokio::test]
async fn toggle_removes_course_already_in_cart() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1"])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1"])))
        .expect(0)
        .mount(&server)
        .await;

    session
        .execute(Command::ToggleCart {
            course_id: EntityId::from("c1"),
        })
        .await
        .unwrap();
    session.disconnect().await;
}

#[tokio::test]
async fn lowercase_coupon_never_reaches_the_server() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    let err = session
        .execute(Command::ApplyCoupon {
            course_id: EntityId::from("c1"),
            code: "save20".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the profile fetch should have run");
    session.disconnect().await;
}

#[tokio::test]
async fn coupon_rejection_shows_server_message() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/cart/apply-coupon"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Coupon usage limit reached" })),
        )
        .mount(&server)
        .await;

    let err = session
        .execute(Command::ApplyCoupon {
            course_id: EntityId::from("c1"),
            code: "SAVE20".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Coupon usage limit reached");
    session.disconnect().await;
}

#[tokio::test]
async fn checkout_charges_server_total_in_cents() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart(&["c1", "c2"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment-intent"))
        .and(body_json(json!({ "amount": 4000, "currency": "usd", "courseIds": ["c1", "c2"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "clientSecret": "pi_1_secret" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = session
        .execute(Command::Checkout {
            currency: "USD".into(),
        })
        .await
        .unwrap();
    let CommandResult::PaymentIntent(intent) = result else {
        panic!("expected payment intent, got {result:?}");
    };
    assert_eq!(intent.amount, Decimal::from(40));
    assert_eq!(intent.client_secret, "pi_1_secret");
    session.disconnect().await;
}

// ── Coupons ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_coupon_refetches_course_coupons() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    let expiry = Utc::now() + TimeDelta::days(30);

    let coupon = json!({
        "_id": "k1",
        "code": "SPRING25",
        "discountPercentage": 25,
        "maxUses": 100,
        "expiryDate": expiry.to_rfc3339()
    });
    Mock::given(method("POST"))
        .and(path("/api/instructors/courses/c1/coupons"))
        .respond_with(ResponseTemplate::new(201).set_body_json(coupon.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/instructors/courses/c1/coupons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "coupons": [coupon] })))
        .expect(1)
        .mount(&server)
        .await;

    let course = EntityId::from("c1");
    session
        .execute(Command::CreateCoupon {
            course_id: course.clone(),
            request: CreateCouponRequest {
                code: "SPRING25".into(),
                discount_percentage: 25,
                max_uses: 100,
                expiry,
            },
        })
        .await
        .unwrap();

    let stored = session.store().coupons_for_course(&course);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].code, "SPRING25");
    let snapshot = session.coupons_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, EntityId::from("k1"));
    session.disconnect().await;
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_replace_their_store_slices() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [
                { "_id": "c1", "title": "Rust", "price": 20 },
                { "_id": "c2", "title": "Tokio", "price": 30 }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/enrollments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "e1", "courseId": "c1", "progress": 40 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [student()] })))
        .mount(&server)
        .await;

    session.courses(&CourseQuery::default()).await.unwrap();
    session.enrollments().await.unwrap();
    session.users(&UserQuery::default()).await.unwrap();

    assert_eq!(session.courses_snapshot().len(), 2);
    assert_eq!(session.enrollments_snapshot().len(), 1);
    let users = session.users_snapshot();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "ann@example.com");
    session.disconnect().await;
}

// ── Admin ───────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_fails_if_any_read_fails() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalUsers": 3 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/analytics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/revenue-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = session.admin_dashboard().await.unwrap_err();
    assert_eq!(err.user_message(), skillmart_core::error::GENERIC_FAILURE);
    session.disconnect().await;
}

#[tokio::test]
async fn dashboard_combines_three_reads() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalUsers": 3 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/analytics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "popularCategories": [{ "_id": "Data", "count": 7 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/revenue-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalRevenue": 99.5 })))
        .mount(&server)
        .await;

    let dashboard = session.admin_dashboard().await.unwrap();
    assert_eq!(dashboard.stats.total_users, 3);
    assert_eq!(dashboard.analytics.popular_categories[0].category, "Data");
    assert_eq!(dashboard.revenue.total_revenue, Decimal::new(995, 1));
    session.disconnect().await;
}

// ── Registration ────────────────────────────────────────────────────

fn signup(profile: RoleProfile) -> CreateUserRequest {
    CreateUserRequest {
        name: "Ann".into(),
        email: "ann@example.com".into(),
        password: SecretString::from("hunter22".to_owned()),
        profile,
    }
}

#[tokio::test]
async fn register_returns_issued_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "name": "Ann",
            "email": "ann@example.com",
            "password": "hunter22",
            "role": "student"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "token": "new-tok", "user": student() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = signup(RoleProfile::Student { education: None });
    let (user, token) = Session::register(&config(&server, AuthCredentials::Anonymous), &request)
        .await
        .unwrap();
    assert_eq!(user.role(), Role::Student);
    assert_eq!(token.expose_secret(), "new-tok");
}

#[tokio::test]
async fn admin_self_registration_never_reaches_the_server() {
    let server = MockServer::start().await;

    let err = Session::register(
        &config(&server, AuthCredentials::Anonymous),
        &signup(RoleProfile::Admin),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
