//! Router tests driving the full request path: session resolution,
//! authorization, storage and response bodies.

use at_core::{ActionType, Email, Role};
use at_db::{Database, NewEmployee};
use at_server::{AttendanceServer, ServerConfig};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Fixture {
    app: Router,
    jane_id: i64,
}

fn fixture_with(db: Database, sso: Option<at_sso::Client>) -> Fixture {
    let jane_id = db
        .find_employee_by_email(&Email::new("jane.doe@example.com").unwrap())
        .unwrap()
        .map(|e| e.id.get())
        .unwrap_or_default();
    let server = AttendanceServer::new(ServerConfig::default(), db, sso);
    Fixture {
        app: server.router(),
        jane_id,
    }
}

fn fixture() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    db.seed_sample_employees().unwrap();
    fixture_with(db, None)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> (String, String) {
    let response = send(
        app,
        post_json("/login", None, &json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["landing"].as_str().unwrap().to_string(),
    )
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let f = fixture();
    let response = send(&f.app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let f = fixture();
    let response = send(&f.app, get("/nonexistent", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_lands_by_role() {
    let f = fixture();
    let (_, landing) = login(&f.app, "jane.doe@example.com", "password123").await;
    assert_eq!(landing, "/dashboard");

    let (_, landing) = login(&f.app, "Admin@Example.com", "adminpass").await;
    assert_eq!(landing, "/admin/users");
}

#[tokio::test]
async fn invalid_credentials_are_rejected() {
    let f = fixture();
    for (email, password) in [
        ("jane.doe@example.com", "wrong"),
        ("nobody@example.com", "password123"),
        ("not-an-email", "password123"),
    ] {
        let response = send(
            &f.app,
            post_json("/login", None, &json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(body_text(response).await, "Invalid credentials");
    }
}

#[tokio::test]
async fn login_drops_the_presented_session() {
    let f = fixture();
    let (old_token, _) = login(&f.app, "jane.doe@example.com", "password123").await;

    let response = send(
        &f.app,
        post_json(
            "/login",
            Some(&old_token),
            &json!({ "email": "jane.doe@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&f.app, get("/dashboard", Some(&old_token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn index_redirects_signed_in_callers() {
    let f = fixture();
    let response = send(&f.app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["login"]["password"], "POST /login");

    let (token, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let response = send(&f.app, get("/", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/users");
}

#[tokio::test]
async fn dashboard_shows_status_from_latest_punch() {
    let f = fixture();
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;

    let response = send(&f.app, get("/dashboard", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["status"], "Not Working");

    for (action, expected) in [
        ("login", "Working"),
        ("break_start", "On Break"),
        ("break_end", "Working"),
        ("logout", "Not Working"),
    ] {
        let response = send(
            &f.app,
            post_json("/attendance", Some(&token), &json!({ "action_type": action })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            format!("{action} marked!")
        );

        let body = body_json(send(&f.app, get("/dashboard", Some(&token))).await).await;
        assert_eq!(body["status"], expected, "after {action}");
    }
}

#[tokio::test]
async fn dashboard_gating() {
    let f = fixture();
    let response = send(&f.app, get("/dashboard", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let response = send(&f.app, get("/dashboard", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/users");
}

#[tokio::test]
async fn anonymous_punch_is_unauthorized() {
    let f = fixture();
    let response = send(
        &f.app,
        post_json("/attendance", None, &json!({ "action_type": "login" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Unauthorized");

    let response = send(
        &f.app,
        post_json(
            "/attendance",
            Some("stale-token"),
            &json!({ "action_type": "login" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let f = fixture();
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    let response = send(
        &f.app,
        post_json("/attendance", Some(&token), &json!({ "action_type": "lunch" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "unknown action type: lunch"
    );

    let log = body_json(send(&f.app, get("/attendance", Some(&token))).await).await;
    assert_eq!(log["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn own_log_reconstructs_durations() {
    let db = Database::open_in_memory().unwrap();
    db.seed_sample_employees().unwrap();
    let jane = db
        .find_employee_by_email(&Email::new("jane.doe@example.com").unwrap())
        .unwrap()
        .unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    for (action, secs) in [
        (ActionType::Login, 0),
        (ActionType::BreakStart, 1800),
        (ActionType::BreakEnd, 2400),
        (ActionType::Logout, 3600),
    ] {
        db.record_punch(jane.id, action, t0 + Duration::seconds(secs))
            .unwrap();
    }
    let f = fixture_with(db, None);
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;

    let response = send(&f.app, get("/attendance", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let log = body_json(response).await;
    assert_eq!(log["name"], "Jane Doe");
    assert_eq!(log["records"].as_array().unwrap().len(), 4);
    assert_eq!(log["summary"]["work"]["seconds"], 3600);
    assert_eq!(log["summary"]["break"]["seconds"], 600);
    assert_eq!(log["summary"]["net"]["hours"], 0);
    assert_eq!(log["summary"]["net"]["minutes"], 50);
    assert_eq!(log["summary"]["status"], "Not Working");

    let response = send(
        &f.app,
        get(
            "/attendance?since=2025-03-03T09:20:00Z&until=2025-03-03T09:45:00Z",
            Some(&token),
        ),
    )
    .await;
    let log = body_json(response).await;
    let actions: Vec<&str> = log["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["action_type"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["break_start", "break_end"]);
    assert_eq!(log["summary"]["break"]["seconds"], 0);
    assert_eq!(log["summary"]["status"], "Not Working");
}

#[tokio::test]
async fn own_log_requires_sign_in() {
    let f = fixture();
    let response = send(&f.app, get("/attendance", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn admin_views_are_admin_only() {
    let f = fixture();

    let response = send(&f.app, get("/admin/users", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (employee, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    let response = send(&f.app, get("/admin/users", Some(&employee))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(
        &f.app,
        get(&format!("/admin/logs/{}", f.jane_id), Some(&employee)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_employees_without_credentials() {
    let f = fixture();
    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;

    let response = send(&f.app, get("/admin/users", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let employees = body.as_array().unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0]["name"], "Jane Doe");
    assert_eq!(employees[0]["role"], "employee");
    assert_eq!(employees[1]["role"], "admin");
    assert!(employees[0].get("password_hash").is_none());
}

#[tokio::test]
async fn admin_reads_employee_log() {
    let f = fixture();
    let (jane, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    send(
        &f.app,
        post_json("/attendance", Some(&jane), &json!({ "action_type": "login" })),
    )
    .await;

    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let response = send(
        &f.app,
        get(&format!("/admin/logs/{}", f.jane_id), Some(&admin)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let log = body_json(response).await;
    assert_eq!(log["name"], "Jane Doe");
    assert_eq!(log["records"].as_array().unwrap().len(), 1);
    assert_eq!(log["summary"]["status"], "Working");
    assert_eq!(log["summary"]["work"]["seconds"], 0);

    let response = send(&f.app, get("/admin/logs/9999", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_can_punch_and_read_own_log() {
    let f = fixture();
    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let response = send(
        &f.app,
        post_json("/attendance", Some(&admin), &json!({ "action_type": "login" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let log = body_json(send(&f.app, get("/attendance", Some(&admin))).await).await;
    assert_eq!(log["name"], "Admin User");
    assert_eq!(log["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn logout_ends_session_and_redirects_to_identity_platform() {
    let f = fixture();
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;

    let response = send(&f.app, get("/logout", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("https://login.microsoftonline.com/common/oauth2/v2.0/logout?"));
    assert!(target.contains("post_logout_redirect_uri=http%3A%2F%2Flocalhost%3A8080%2F"));

    let response = send(&f.app, get("/dashboard", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn sso_login_is_unavailable_without_configuration() {
    let f = fixture();
    let response = send(&f.app, get("/login", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

fn sso_client() -> at_sso::Client {
    at_sso::Client::new(at_sso::SsoConfig {
        client_id: "client-123".into(),
        client_secret: "secret".into(),
        tenant_id: "tenant-abc".into(),
        redirect_path: "/auth/redirect".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn sso_login_redirects_to_authorization_url() {
    let db = Database::open_in_memory().unwrap();
    let f = fixture_with(db, Some(sso_client()));

    let response = send(&f.app, get("/login", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("https://login.microsoftonline.com/tenant-abc/oauth2/v2.0/authorize?"));
    assert!(target.contains("client_id=client-123"));
    assert!(target.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fredirect"));
}

#[tokio::test]
async fn sso_callback_without_code_fails() {
    let db = Database::open_in_memory().unwrap();
    let f = fixture_with(db, Some(sso_client()));

    let response = send(&f.app, get("/auth/redirect", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Authorization failed.");
}

#[tokio::test]
async fn sessions_from_other_employees_do_not_leak() {
    let db = Database::open_in_memory().unwrap();
    db.seed_sample_employees().unwrap();
    db.insert_employee(&NewEmployee {
        name: "Bob".into(),
        email: Email::new("bob@example.com").unwrap(),
        password: Some("hunter2".into()),
        role: Role::Employee,
    })
    .unwrap();
    let f = fixture_with(db, None);

    let (jane, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    let (bob, _) = login(&f.app, "bob@example.com", "hunter2").await;
    send(
        &f.app,
        post_json("/attendance", Some(&jane), &json!({ "action_type": "login" })),
    )
    .await;

    let log = body_json(send(&f.app, get("/attendance", Some(&bob))).await).await;
    assert_eq!(log["name"], "Bob");
    assert_eq!(log["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn windowed_log_reports_current_status() {
    let db = Database::open_in_memory().unwrap();
    db.seed_sample_employees().unwrap();
    let jane = db
        .find_employee_by_email(&Email::new("jane.doe@example.com").unwrap())
        .unwrap()
        .unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    db.record_punch(jane.id, ActionType::Login, t0).unwrap();
    db.record_punch(jane.id, ActionType::Logout, t0 + Duration::hours(1))
        .unwrap();
    let f = fixture_with(db, None);
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;

    let dashboard = body_json(send(&f.app, get("/dashboard", Some(&token))).await).await;
    assert_eq!(dashboard["status"], "Not Working");

    let log = body_json(
        send(
            &f.app,
            get("/attendance?until=2025-03-03T09:30:00Z", Some(&token)),
        )
        .await,
    )
    .await;
    assert_eq!(log["records"].as_array().unwrap().len(), 1);
    assert_eq!(log["summary"]["status"], dashboard["status"]);

    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let uri = format!("/admin/logs/{}?until=2025-03-03T09:30:00Z", f.jane_id);
    let log = body_json(send(&f.app, get(&uri, Some(&admin))).await).await;
    assert_eq!(log["summary"]["status"], "Not Working");
}

#[tokio::test]
async fn anonymous_punch_with_bad_body_is_unauthorized() {
    let f = fixture();
    for body in ["{}", "not json", ""] {
        let request = Request::builder()
            .method("POST")
            .uri("/attendance")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = send(&f.app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "body {body:?}");
        assert_eq!(body_json(response).await, json!({ "message": "Unauthorized" }));
    }
}

#[tokio::test]
async fn signed_in_punch_with_bad_body_is_bad_request() {
    let f = fixture();
    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    let response = send(&f.app, post_json("/attendance", Some(&token), &json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"].is_string());
}

#[tokio::test]
async fn bad_range_is_checked_after_sign_in() {
    let f = fixture();
    for uri in [
        "/attendance?since=yesterday",
        "/admin/logs/1?since=yesterday",
        "/admin/logs/abc",
    ] {
        let response = send(&f.app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/");
    }

    let (token, _) = login(&f.app, "jane.doe@example.com", "password123").await;
    let response = send(&f.app, get("/attendance?since=yesterday", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (admin, _) = login(&f.app, "admin@example.com", "adminpass").await;
    let response = send(&f.app, get("/admin/logs/abc", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
