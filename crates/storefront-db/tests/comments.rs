//! Comment operations against a mocked PostgREST endpoint.

use storefront_core::Pagination;
use storefront_db::{
    create_comment, delete_comment, list_comments, update_comment, DbError, NewComment,
};
use storefront_supabase::SupabaseClient;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHOR: Uuid = Uuid::from_u128(0x1a);
const STRANGER: Uuid = Uuid::from_u128(0x1b);
const PRODUCT: Uuid = Uuid::from_u128(0x1c);
const COMMENT: Uuid = Uuid::from_u128(0x1d);

fn test_client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(base_url, "anon-key", "service-key", 5, "storefront-test/0.1")
        .expect("client construction should not fail")
}

fn comment_row(content: &str, rating: Option<i16>) -> serde_json::Value {
    serde_json::json!({
        "id": COMMENT,
        "product_id": PRODUCT,
        "user_id": AUTHOR,
        "content": content,
        "rating": rating,
        "created_at": "2025-06-01T09:30:00+00:00",
        "updated_at": "2025-06-01T09:30:00+00:00"
    })
}

async fn mount_owner(server: &MockServer, owner: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/comments"))
        .and(query_param("id", format!("eq.{COMMENT}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"user_id": owner}])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_pages_newest_first_with_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/comments"))
        .and(query_param("product_id", format!("eq.{PRODUCT}")))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/11")
                .set_body_json(serde_json::json!([comment_row("Sturdy", Some(5))])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = list_comments(&client, PRODUCT, Pagination::default())
        .await
        .expect("list should succeed");
    assert_eq!(page.total, 11);
    assert_eq!(page.limit, 10);
    assert_eq!(page.data[0].rating, Some(5));
}

#[tokio::test]
async fn create_requires_existing_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let input = NewComment {
        content: "Great".to_owned(),
        rating: Some(4),
    };
    let err = create_comment(&client, PRODUCT, AUTHOR, &input)
        .await
        .expect_err("missing product should fail");
    assert!(matches!(err, DbError::NotFound(ref m) if m == "Product not found"));
}

#[tokio::test]
async fn create_rejects_out_of_range_rating() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let input = NewComment {
        content: "Great".to_owned(),
        rating: Some(6),
    };
    let err = create_comment(&client, PRODUCT, AUTHOR, &input)
        .await
        .expect_err("rating 6 should fail");
    assert!(matches!(err, DbError::InvalidRequest(_)));
}

#[tokio::test]
async fn create_inserts_for_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": PRODUCT}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/comments"))
        .and(body_partial_json(serde_json::json!([{
            "product_id": PRODUCT,
            "user_id": AUTHOR,
            "content": "Great",
            "rating": 4
        }])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!([comment_row("Great", Some(4))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let input = NewComment {
        content: "Great".to_owned(),
        rating: Some(4),
    };
    let comment = create_comment(&client, PRODUCT, AUTHOR, &input)
        .await
        .expect("create should succeed");
    assert_eq!(comment.user_id, AUTHOR);
}

#[tokio::test]
async fn non_owner_update_is_forbidden_even_with_invalid_patch() {
    let server = MockServer::start().await;
    mount_owner(&server, AUTHOR).await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let patch = serde_json::json!({"content": "", "rating": 42});
    let err = update_comment(&client, COMMENT, STRANGER, &patch)
        .await
        .expect_err("stranger should be refused");
    assert!(
        matches!(err, DbError::Forbidden(ref m) if m == "You can only update your own comments"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn non_owner_update_is_forbidden_even_with_mistyped_body() {
    let server = MockServer::start().await;
    mount_owner(&server, AUTHOR).await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = serde_json::json!({"rating": "five"});
    let err = update_comment(&client, COMMENT, STRANGER, &body)
        .await
        .expect_err("stranger should be refused");
    assert!(matches!(err, DbError::Forbidden(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn owner_with_mistyped_body_is_invalid() {
    let server = MockServer::start().await;
    mount_owner(&server, AUTHOR).await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = serde_json::json!({"rating": "five"});
    let err = update_comment(&client, COMMENT, AUTHOR, &body)
        .await
        .expect_err("mistyped rating should fail");
    assert!(
        matches!(err, DbError::InvalidRequest(ref m) if m.starts_with("Validation failed")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn owner_update_patches_supplied_fields() {
    let server = MockServer::start().await;
    mount_owner(&server, AUTHOR).await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comments"))
        .and(query_param("id", format!("eq.{COMMENT}")))
        .and(body_partial_json(serde_json::json!({"rating": 3})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([comment_row("Fine", Some(3))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let patch = serde_json::json!({"rating": 3});
    let comment = update_comment(&client, COMMENT, AUTHOR, &patch)
        .await
        .expect("owner update should succeed");
    assert_eq!(comment.rating, Some(3));
}

#[tokio::test]
async fn non_owner_delete_is_forbidden() {
    let server = MockServer::start().await;
    mount_owner(&server, AUTHOR).await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = delete_comment(&client, COMMENT, STRANGER)
        .await
        .expect_err("stranger should be refused");
    assert!(matches!(err, DbError::Forbidden(_)));
}

#[tokio::test]
async fn missing_comment_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = delete_comment(&client, COMMENT, AUTHOR)
        .await
        .expect_err("missing comment should fail");
    assert!(matches!(err, DbError::NotFound(ref m) if m == "Comment not found"));
}
