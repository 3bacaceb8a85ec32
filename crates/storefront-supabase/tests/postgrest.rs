//! Integration tests for `QueryBuilder` against a mocked PostgREST endpoint.

use serde::Deserialize;
use storefront_supabase::{SupabaseClient, SupabaseError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: i64,
    name: String,
}

fn test_client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(base_url, "anon-key", "service-key", 5, "storefront-test/0.1")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn select_sends_anon_key_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("select", "id,name"))
        .and(query_param("category", "eq.mugs"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": 1, "name": "Mug"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let rows: Vec<Row> = client
        .table("products")
        .select("id, name")
        .eq("category", "mugs")
        .execute()
        .await
        .expect("select should succeed");

    assert_eq!(rows, vec![Row { id: 1, name: "Mug".to_owned() }]);
}

#[tokio::test]
async fn admin_table_uses_service_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let rows: Vec<Row> = client
        .admin_table("products")
        .execute()
        .await
        .expect("select should succeed");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn execute_with_count_reads_content_range_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "2"))
        .and(query_param("limit", "2"))
        .and(query_param("order", "created_at.desc"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "2-3/7")
                .set_body_json(serde_json::json!([
                    {"id": 3, "name": "Lamp"},
                    {"id": 4, "name": "Chair"}
                ])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let (rows, total): (Vec<Row>, u64) = client
        .table("products")
        .order("created_at", false)
        .range(2, 2)
        .execute_with_count()
        .await
        .expect("count query should succeed");

    assert_eq!(rows.len(), 2);
    assert_eq!(total, 7);
}

#[tokio::test]
async fn insert_with_select_requests_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .and(query_param("select", "*"))
        .and(header("prefer", "return=representation"))
        .and(body_json(serde_json::json!({"name": "Vase"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!([{"id": 9, "name": "Vase"}])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let row: Row = client
        .table("products")
        .insert(&serde_json::json!({"name": "Vase"}))
        .expect("serialize")
        .select("*")
        .single()
        .await
        .expect("insert should succeed");

    assert_eq!(row.id, 9);
}

#[tokio::test]
async fn delete_without_select_returns_no_rows() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/cart_items"))
        .and(query_param("user_id", "eq.u1"))
        .and(header("prefer", "return=minimal"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let rows: Vec<serde_json::Value> = client
        .table("cart_items")
        .delete()
        .eq("user_id", "u1")
        .execute()
        .await
        .expect("delete should succeed");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn maybe_single_returns_none_for_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let row: Option<Row> = client
        .table("products")
        .eq("id", 1)
        .maybe_single()
        .await
        .expect("query should succeed");
    assert!(row.is_none());
}

#[tokio::test]
async fn single_rejects_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .table("products")
        .single::<Row>()
        .await
        .expect_err("empty result should fail");
    assert!(matches!(err, SupabaseError::UnexpectedRowCount { rows: 0 }));
}

#[tokio::test]
async fn error_status_surfaces_postgrest_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"products_pkey\"",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .table("products")
        .insert(&serde_json::json!({"name": "Dup"}))
        .expect("serialize")
        .execute::<Row>()
        .await
        .expect_err("conflict should fail");

    assert_eq!(err.status(), Some(409));
    assert_eq!(
        err.to_string(),
        "duplicate key value violates unique constraint \"products_pkey\""
    );
}

#[tokio::test]
async fn health_check_fails_on_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.health_check().await.expect_err("401 should fail");
    assert_eq!(err.status(), Some(401));
}
