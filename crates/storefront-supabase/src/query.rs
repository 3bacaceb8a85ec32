//! PostgREST query builder.
//!
//! Mirrors the subset of the PostgREST URL grammar this service uses:
//! `select` (including embedded relations), `eq` filters, `order`,
//! `offset`/`limit`, and `Prefer: count=exact`. Mutations are expressed by
//! switching the verb with [`QueryBuilder::insert`], [`QueryBuilder::update`],
//! or [`QueryBuilder::delete`].

use reqwest::{header::HeaderValue, Method, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::client::{SupabaseClient, Tier};
use crate::error::SupabaseError;
use crate::types::PostgrestErrorBody;

pub struct QueryBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    tier: Tier,
    method: Method,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    range: Option<(u64, u64)>,
    count_exact: bool,
    body: Option<serde_json::Value>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(client: &'a SupabaseClient, table: &str, tier: Tier) -> Self {
        Self {
            client,
            table: table.to_owned(),
            tier,
            method: Method::GET,
            select: None,
            filters: Vec::new(),
            order: None,
            range: None,
            count_exact: false,
            body: None,
        }
    }

    /// Columns to return. Whitespace is stripped so multi-line embedded
    /// selects can be written readably.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        let compact: String = columns.chars().filter(|c| !c.is_whitespace()).collect();
        self.select = Some(compact);
        self
    }

    /// Adds a `column=eq.value` filter.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    /// Restricts the result to `limit` rows starting at `offset`.
    #[must_use]
    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some((offset, limit));
        self
    }

    /// Asks for the exact total row count; read it with
    /// [`QueryBuilder::execute_with_count`].
    #[must_use]
    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Switches to `POST`, inserting `rows` (an object or an array of objects).
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Serialize`] if `rows` cannot be serialized.
    pub fn insert<T: Serialize + ?Sized>(mut self, rows: &T) -> Result<Self, SupabaseError> {
        self.method = Method::POST;
        self.body = Some(serde_json::to_value(rows).map_err(SupabaseError::Serialize)?);
        Ok(self)
    }

    /// Switches to `PATCH`, applying `patch` to every row matching the filters.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Serialize`] if `patch` cannot be serialized.
    pub fn update<T: Serialize + ?Sized>(mut self, patch: &T) -> Result<Self, SupabaseError> {
        self.method = Method::PATCH;
        self.body = Some(serde_json::to_value(patch).map_err(SupabaseError::Serialize)?);
        Ok(self)
    }

    /// Switches to `DELETE` of every row matching the filters.
    #[must_use]
    pub fn delete(mut self) -> Self {
        self.method = Method::DELETE;
        self
    }

    /// Runs the request and returns all rows.
    ///
    /// Mutations without a [`select`](Self::select) return no rows.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::Api`] on a non-2xx status, carrying the service's message.
    /// - [`SupabaseError::Http`] on network failure.
    /// - [`SupabaseError::Deserialize`] if the rows do not match `T`.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let (rows, _) = self.send::<T>().await?;
        Ok(rows)
    }

    /// Runs the request and returns the rows with the exact total count.
    ///
    /// # Errors
    ///
    /// Same as [`QueryBuilder::execute`].
    pub async fn execute_with_count<T: DeserializeOwned>(
        self,
    ) -> Result<(Vec<T>, u64), SupabaseError> {
        let (rows, total) = self.count_exact().send::<T>().await?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok((rows, total))
    }

    /// Runs the request expecting zero or one row.
    ///
    /// # Errors
    ///
    /// Same as [`QueryBuilder::execute`], plus
    /// [`SupabaseError::UnexpectedRowCount`] when more than one row matches.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, SupabaseError> {
        let mut rows = self.execute::<T>().await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(SupabaseError::UnexpectedRowCount { rows: n }),
        }
    }

    /// Runs the request expecting exactly one row.
    ///
    /// # Errors
    ///
    /// Same as [`QueryBuilder::execute`], plus
    /// [`SupabaseError::UnexpectedRowCount`] when zero or several rows match.
    pub async fn single<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let mut rows = self.execute::<T>().await?;
        if rows.len() == 1 {
            if let Some(row) = rows.pop() {
                return Ok(row);
            }
        }
        Err(SupabaseError::UnexpectedRowCount { rows: rows.len() })
    }

    /// Builds the request URL with percent-encoded query parameters.
    pub(crate) fn build_url(&self) -> Url {
        let mut url = self.client.endpoint(&format!("rest/v1/{}", self.table));
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(select) = &self.select {
                pairs.append_pair("select", select);
            }
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
            if let Some(order) = &self.order {
                pairs.append_pair("order", order);
            }
            if let Some((offset, limit)) = self.range {
                pairs.append_pair("offset", &offset.to_string());
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        // Drop the dangling `?` left when no pairs were appended.
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    /// Value of the `Prefer` header, if any preference applies.
    pub(crate) fn prefer_header(&self) -> Option<String> {
        let mut prefs = Vec::new();
        if self.method != Method::GET {
            prefs.push(if self.select.is_some() {
                "return=representation"
            } else {
                "return=minimal"
            });
        }
        if self.count_exact {
            prefs.push("count=exact");
        }
        (!prefs.is_empty()).then(|| prefs.join(","))
    }

    async fn send<T: DeserializeOwned>(self) -> Result<(Vec<T>, Option<u64>), SupabaseError> {
        let url = self.build_url();
        let mut request = self.client.request(self.method.clone(), url, self.tier);

        if let Some(prefer) = self.prefer_header() {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let total = response
            .headers()
            .get("content-range")
            .and_then(parse_content_range_total);
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<PostgrestErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_owned()))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
            tracing::debug!(
                table = %self.table,
                method = %self.method,
                status = status.as_u16(),
                %message,
                "postgrest request failed"
            );
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok((Vec::new(), total));
        }

        let rows = serde_json::from_str::<Vec<T>>(&text).map_err(|e| SupabaseError::Deserialize {
            context: format!("{} {}", self.method, self.table),
            source: e,
        })?;
        Ok((rows, total))
    }
}

/// Extracts the total from a `Content-Range` header such as `0-9/42` or `*/0`.
pub(crate) fn parse_content_range_total(value: &HeaderValue) -> Option<u64> {
    value
        .to_str()
        .ok()
        .and_then(|v| v.rsplit_once('/'))
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
}
