//! HTTP client for a hosted Supabase project.
//!
//! Wraps one `reqwest::Client` and both project keys. Table access goes
//! through [`QueryBuilder`] (PostgREST under `/rest/v1`), account calls
//! through [`AuthApi`] (GoTrue under `/auth/v1`). The client is cheap to
//! clone and safe to share across requests.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::auth::AuthApi;
use crate::error::SupabaseError;
use crate::query::QueryBuilder;

/// Which project key authorizes a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The public anon key; subject to row-level security.
    Anon,
    /// The service-role key; bypasses row-level security.
    ServiceRole,
}

#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: Url,
    anon_key: String,
    service_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("anon_key", &"[redacted]")
            .field("service_key", &"[redacted]")
            .finish()
    }
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SupabaseError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        service_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SupabaseError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SupabaseError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: parsed,
                anon_key: anon_key.to_owned(),
                service_key: service_key.to_owned(),
            }),
        })
    }

    /// Starts a query against `table` with the anon key.
    #[must_use]
    pub fn table(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table, Tier::Anon)
    }

    /// Starts a query against `table` with the service-role key.
    #[must_use]
    pub fn admin_table(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table, Tier::ServiceRole)
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Verifies the REST endpoint answers with the anon key.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Http`] on network failure or
    /// [`SupabaseError::Api`] on a non-2xx status.
    pub async fn health_check(&self) -> Result<(), SupabaseError> {
        let url = self.endpoint("rest/v1/");
        let response = self.request(reqwest::Method::GET, url, Tier::Anon).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("health check failed")
                .to_string(),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub(crate) fn key(&self, tier: Tier) -> &str {
        match tier {
            Tier::Anon => &self.inner.anon_key,
            Tier::ServiceRole => &self.inner.service_key,
        }
    }

    /// Resolves `path` (no leading slash) against the project base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        {
            let base_path = url.path().trim_end_matches('/').to_owned();
            url.set_path(&format!("{base_path}/{path}"));
        }
        url
    }

    /// A request carrying `apikey` and a bearer `Authorization` for `tier`.
    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        tier: Tier,
    ) -> reqwest::RequestBuilder {
        let key = self.key(tier);
        self.http()
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
