mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use uuid::Uuid;

use campus_fit::auth::{JwtService, UserRole};
use common::{lazy_app, send, TEST_JWT_SECRET};

#[tokio::test]
async fn test_health_check() {
    let app = lazy_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "campus-fit");
}

#[tokio::test]
async fn test_protected_endpoints_require_a_token() {
    let app = lazy_app();

    for uri in [
        "/api/locations/countries",
        "/api/human-resources/contract-types",
        "/api/accounts/students",
        "/api/accounts/users",
        "/api/academics/enrollments",
        "/api/fitness/exercises",
        "/api/fitness/progress",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require a token", uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = lazy_app();
    let request = Request::builder()
        .uri("/api/fitness/routines")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_another_secret() {
    let app = lazy_app();
    let token = JwtService::new("some_other_secret", 1)
        .create_session_token(Uuid::new_v4(), "intruder", UserRole::Admin)
        .unwrap();

    let (status, _) = send(&app, Method::GET, "/api/accounts/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token() {
    let app = lazy_app();
    let token = JwtService::new(TEST_JWT_SECRET, -2)
        .create_session_token(Uuid::new_v4(), "student", UserRole::Student)
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/fitness/exercises", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_fitness_pages_redirect_anonymous_visitors() {
    let app = lazy_app();

    for uri in [
        "/fitness/dashboard",
        "/fitness/routines",
        "/fitness/routines/create",
        "/fitness/exercises/",
        "/fitness/progress/create",
        "/fitness/reports",
        "/fitness/trainer",
        "/fitness/trainer/users/student/progress",
        "/fitness/admin",
        "/fitness/admin/reports/",
    ] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert!(response.status().is_redirection(), "{} should redirect", uri);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}

#[tokio::test]
async fn test_login_form_is_public() {
    let app = lazy_app();
    let request = Request::builder().uri("/login").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_malformed_login_body_is_a_bad_request() {
    let app = lazy_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/accounts/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
