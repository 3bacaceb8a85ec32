//! Integration tests for `AuthApi` against a mocked auth endpoint.

use storefront_supabase::SupabaseClient;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "3f1e2d3c-4b5a-4978-8695-a4b3c2d1e0f9";

fn test_client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(base_url, "anon-key", "service-key", 5, "storefront-test/0.1")
        .expect("client construction should not fail")
}

fn user_json(role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": USER_ID,
        "aud": "authenticated",
        "email": "shopper@example.com",
        "user_metadata": {"role": role}
    })
}

#[tokio::test]
async fn sign_up_accepts_bare_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(header("apikey", "anon-key"))
        .and(body_partial_json(serde_json::json!({
            "email": "shopper@example.com",
            "data": {"role": "customer"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("customer")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let user = client
        .auth()
        .sign_up(
            "shopper@example.com",
            "secret123",
            serde_json::json!({"role": "customer"}),
        )
        .await
        .expect("sign up should succeed");

    assert_eq!(user.id.to_string(), USER_ID);
    assert_eq!(user.role_claim(), Some("customer"));
}

#[tokio::test]
async fn sign_up_unwraps_session_shaped_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "user": user_json("customer")
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let user = client
        .auth()
        .sign_up("shopper@example.com", "secret123", serde_json::json!({}))
        .await
        .expect("sign up should succeed");
    assert_eq!(user.email.as_deref(), Some("shopper@example.com"));
}

#[tokio::test]
async fn sign_up_surfaces_service_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "code": 422,
            "msg": "User already registered"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .auth()
        .sign_up("shopper@example.com", "secret123", serde_json::json!({}))
        .await
        .expect_err("duplicate should fail");
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.to_string(), "User already registered");
}

#[tokio::test]
async fn password_sign_in_returns_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": user_json("admin")
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let session = client
        .auth()
        .sign_in_with_password("shopper@example.com", "secret123")
        .await
        .expect("sign in should succeed");

    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.user.role_claim(), Some("admin"));
}

#[tokio::test]
async fn password_sign_in_rejects_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .auth()
        .sign_in_with_password("shopper@example.com", "wrong")
        .await
        .expect_err("bad credentials should fail");
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[tokio::test]
async fn get_user_sends_caller_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("customer")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let user = client
        .auth()
        .get_user("user-token")
        .await
        .expect("token should resolve");
    assert_eq!(user.id.to_string(), USER_ID);
}

#[tokio::test]
async fn admin_sign_out_uses_service_key_and_global_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(query_param("scope", "global"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .auth()
        .admin_sign_out("user-token")
        .await
        .expect("sign out should succeed");
}

#[tokio::test]
async fn admin_create_user_confirms_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(header("apikey", "service-key"))
        .and(body_partial_json(serde_json::json!({
            "email": "admin@example.com",
            "email_confirm": true,
            "user_metadata": {"role": "admin"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let user = client
        .auth()
        .admin_create_user("admin@example.com", "pw", serde_json::json!({"role": "admin"}))
        .await
        .expect("create should succeed");
    assert_eq!(user.role_claim(), Some("admin"));
}
