//! Product comments with optional 1–5 ratings.

use serde::{Deserialize, Serialize};
use storefront_core::{validate_rating, Comment, Page, Pagination};
use storefront_supabase::SupabaseClient;
use uuid::Uuid;

use crate::products::ensure_product_exists;
use crate::{ensure_not_blank, now_stamp, DbError, Deleted};

/// Body of `POST /api/products/{productId}/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub rating: Option<i64>,
}

/// Body of `PUT /api/products/{productId}/comments/{commentId}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CommentInsert<'a> {
    product_id: Uuid,
    user_id: Uuid,
    content: &'a str,
    rating: Option<i16>,
}

#[derive(Debug, Deserialize)]
struct CommentOwner {
    user_id: Uuid,
}

/// One page of a product's comments, newest first.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the query fails.
pub async fn list_comments(
    client: &SupabaseClient,
    product_id: Uuid,
    pagination: Pagination,
) -> Result<Page<Comment>, DbError> {
    let (rows, total) = client
        .table("comments")
        .select("*")
        .eq("product_id", product_id)
        .order("created_at", false)
        .range(pagination.offset, pagination.limit)
        .execute_with_count::<Comment>()
        .await?;
    Ok(Page::new(rows, pagination, total))
}

/// # Errors
///
/// - [`DbError::InvalidRequest`] on empty content or a rating outside 1–5.
/// - [`DbError::NotFound`] if the product does not exist.
/// - [`DbError::Supabase`] if a query fails.
pub async fn create_comment(
    client: &SupabaseClient,
    product_id: Uuid,
    user_id: Uuid,
    input: &NewComment,
) -> Result<Comment, DbError> {
    ensure_not_blank("content", Some(&input.content))?;
    let rating = input.rating.map(checked_rating).transpose()?;

    ensure_product_exists(client, product_id).await?;

    let comment = client
        .table("comments")
        .insert(&[CommentInsert {
            product_id,
            user_id,
            content: &input.content,
            rating,
        }])?
        .select("*")
        .single()
        .await?;
    Ok(comment)
}

/// Edits the caller's own comment. `body` is the raw request JSON; it is
/// only read as a [`CommentPatch`] once ownership is established, so a
/// stranger is refused whatever they sent.
///
/// # Errors
///
/// - [`DbError::NotFound`] if the comment does not exist.
/// - [`DbError::Forbidden`] if the caller did not write it.
/// - [`DbError::InvalidRequest`] if `body` is not a patch object, or on
///   empty content or a rating outside 1–5.
/// - [`DbError::Supabase`] if a query fails.
pub async fn update_comment(
    client: &SupabaseClient,
    comment_id: Uuid,
    user_id: Uuid,
    body: &serde_json::Value,
) -> Result<Comment, DbError> {
    ensure_owner(client, comment_id, user_id, "You can only update your own comments").await?;

    let patch = CommentPatch::deserialize(body)
        .map_err(|e| DbError::invalid(format!("Validation failed: {e}")))?;
    ensure_not_blank("content", patch.content.as_deref())?;
    let rating = patch.rating.map(checked_rating).transpose()?;

    let mut columns = serde_json::Map::new();
    columns.insert("updated_at".to_owned(), now_stamp());
    if let Some(content) = patch.content {
        columns.insert("content".to_owned(), content.into());
    }
    if let Some(rating) = rating {
        columns.insert("rating".to_owned(), rating.into());
    }

    let comment = client
        .table("comments")
        .update(&columns)?
        .eq("id", comment_id)
        .select("*")
        .single()
        .await?;
    Ok(comment)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the comment does not exist,
/// [`DbError::Forbidden`] if the caller did not write it, or
/// [`DbError::Supabase`] if a query fails.
pub async fn delete_comment(
    client: &SupabaseClient,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<Deleted, DbError> {
    ensure_owner(client, comment_id, user_id, "You can only delete your own comments").await?;

    client
        .table("comments")
        .delete()
        .eq("id", comment_id)
        .execute::<serde_json::Value>()
        .await?;
    Ok(Deleted::new("Comment deleted successfully", comment_id))
}

async fn ensure_owner(
    client: &SupabaseClient,
    comment_id: Uuid,
    user_id: Uuid,
    denial: &str,
) -> Result<(), DbError> {
    let owner = client
        .table("comments")
        .select("user_id")
        .eq("id", comment_id)
        .maybe_single::<CommentOwner>()
        .await?
        .ok_or_else(|| DbError::not_found("Comment not found"))?;

    if owner.user_id != user_id {
        return Err(DbError::Forbidden(denial.to_owned()));
    }
    Ok(())
}

fn checked_rating(rating: i64) -> Result<i16, DbError> {
    validate_rating(rating).map_err(|e| DbError::invalid(e.to_string()))
}
