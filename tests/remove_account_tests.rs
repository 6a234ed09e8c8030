mod common;

use axum::http::{Request, StatusCode, header::COOKIE};
use axum::body::Body;
use common::*;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .expect("failed to build request")
}

async fn json_of(resp: axum::http::Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let body = body_string(resp).await;
    (status, serde_json::from_str(&body).expect("json body"))
}

/// Backend that must not be called at all.
async fn untouchable_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn no_session_is_unauthorized() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = untouchable_backend().await;
    let app = app(&config(&server.uri()));

    let mut browser = Browser::default();
    let resp = browser
        .send(&app, post("/api/remove_account?uid=1&code=abc"))
        .await;
    assert_eq!(
        json_of(resp).await,
        (StatusCode::UNAUTHORIZED, json!({"message": "Unauthorized"}))
    );
}

#[tokio::test]
async fn missing_or_repeated_params_are_bad_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = untouchable_backend().await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    for uri in [
        "/api/remove_account",
        "/api/remove_account?uid=1",
        "/api/remove_account?code=abc",
        "/api/remove_account?uid=&code=abc",
        "/api/remove_account?uid=1&uid=1&code=abc",
    ] {
        let resp = app
            .clone()
            .oneshot(with_cookie("POST", uri, &cookie))
            .await
            .expect("request failed");
        assert_eq!(
            json_of(resp).await,
            (StatusCode::BAD_REQUEST, json!({"message": "Bad Request"})),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn session_without_id_is_bad_request_before_backend() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = untouchable_backend().await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, None, Some("alice"));

    let resp = app
        .oneshot(with_cookie("POST", "/api/remove_account?uid=1&code=abc", &cookie))
        .await
        .expect("request failed");
    assert_eq!(
        json_of(resp).await,
        (StatusCode::BAD_REQUEST, json!({"message": "Bad Request"}))
    );
}

#[tokio::test]
async fn other_users_uid_is_forbidden_for_any_code() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = untouchable_backend().await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    for code in ["abc", "real-looking-code-123", "x"] {
        let uri = format!("/api/remove_account?uid=2&code={code}");
        let resp = app
            .clone()
            .oneshot(with_cookie("POST", &uri, &cookie))
            .await
            .expect("request failed");
        assert_eq!(
            json_of(resp).await,
            (StatusCode::FORBIDDEN, json!({"message": "Forbidden"}))
        );
    }
}

#[tokio::test]
async fn forwards_to_backend_with_api_key() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/remove_account"))
        .and(query_param("uid", "1"))
        .and(query_param("code", "abc"))
        .and(header("x-api-key", BACKEND_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "removed"})))
        .expect(2)
        .mount(&server)
        .await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    for verb in ["POST", "GET"] {
        let resp = app
            .clone()
            .oneshot(with_cookie(verb, "/api/remove_account?uid=1&code=abc", &cookie))
            .await
            .expect("request failed");
        assert_eq!(
            json_of(resp).await,
            (StatusCode::OK, json!({"message": "Success"}))
        );
    }
}

#[tokio::test]
async fn backend_json_message_is_surfaced() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/remove_account"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "account not found"})),
        )
        .mount(&server)
        .await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    let resp = app
        .oneshot(with_cookie("POST", "/api/remove_account?uid=1&code=abc", &cookie))
        .await
        .expect("request failed");
    assert_eq!(
        json_of(resp).await,
        (StatusCode::BAD_REQUEST, json!({"message": "account not found"}))
    );
}

#[tokio::test]
async fn backend_without_json_surfaces_status_text() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/remove_account"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    let resp = app
        .oneshot(with_cookie("POST", "/api/remove_account?uid=1&code=abc", &cookie))
        .await
        .expect("request failed");
    assert_eq!(
        json_of(resp).await,
        (StatusCode::BAD_REQUEST, json!({"message": "Service Unavailable"}))
    );
}

#[tokio::test]
async fn add_account_forwards_code() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_account"))
        .and(query_param("uid", "1"))
        .and(query_param("code", "qr-payload"))
        .and(header("x-api-key", BACKEND_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "added"})))
        .expect(1)
        .mount(&server)
        .await;
    let cfg = config(&server.uri());
    let app = app(&cfg);
    let cookie = session_cookie(&cfg, Some("1"), Some("alice"));

    let resp = app
        .oneshot(with_cookie("POST", "/api/add_account?uid=1&code=qr-payload", &cookie))
        .await
        .expect("request failed");
    assert_eq!(
        json_of(resp).await,
        (StatusCode::OK, json!({"message": "Success"}))
    );
}
