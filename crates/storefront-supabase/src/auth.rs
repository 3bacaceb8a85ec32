//! Account operations against the Supabase auth API (`/auth/v1`).

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::client::{SupabaseClient, Tier};
use crate::error::SupabaseError;
use crate::types::{AuthErrorBody, Session, User};

pub struct AuthApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Registers a new account with `data` stored as user metadata.
    ///
    /// Depending on project settings the service answers either with a bare
    /// user or with a session wrapping one; both are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] with the service's message when the
    /// registration is refused (e.g. the email is already taken).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: Value,
    ) -> Result<User, SupabaseError> {
        let url = self.client.endpoint("auth/v1/signup");
        let response = self
            .client
            .request(Method::POST, url, Tier::Anon)
            .json(&json!({ "email": email, "password": password, "data": data }))
            .send()
            .await?;
        let mut body: Value = read_json(response, "sign up").await?;

        let user = match body.get_mut("user") {
            Some(nested) if nested.is_object() => nested.take(),
            _ => body,
        };
        serde_json::from_value(user).map_err(|e| SupabaseError::Deserialize {
            context: "sign up user".to_owned(),
            source: e,
        })
    }

    /// Exchanges an email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] when the credentials are rejected.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let mut url = self.client.endpoint("auth/v1/token");
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .client
            .request(Method::POST, url, Tier::Anon)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_json(response, "password sign-in").await
    }

    /// Resolves an access token to the account it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] (typically 401/403) when the token is
    /// expired, malformed, or revoked.
    pub async fn get_user(&self, access_token: &str) -> Result<User, SupabaseError> {
        let url = self.client.endpoint("auth/v1/user");
        let response = self
            .client
            .http()
            .get(url)
            .header("apikey", self.client.key(Tier::Anon))
            .bearer_auth(access_token)
            .send()
            .await?;
        read_json(response, "get user").await
    }

    /// Revokes every session of the account owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] when the service refuses the request.
    pub async fn admin_sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let mut url = self.client.endpoint("auth/v1/logout");
        url.query_pairs_mut().append_pair("scope", "global");
        let response = self
            .client
            .http()
            .post(url)
            .header("apikey", self.client.key(Tier::ServiceRole))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// Creates a confirmed account directly, bypassing email verification.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] when the account cannot be created.
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Value,
    ) -> Result<User, SupabaseError> {
        let url = self.client.endpoint("auth/v1/admin/users");
        let response = self
            .client
            .request(Method::POST, url, Tier::ServiceRole)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": user_metadata,
            }))
            .send()
            .await?;
        read_json(response, "admin create user").await
    }
}

async fn check_status(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&text)
        .ok()
        .and_then(AuthErrorBody::into_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("auth request failed").to_owned());
    tracing::debug!(status = status.as_u16(), %message, "auth request failed");
    Err(SupabaseError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, SupabaseError> {
    let text = check_status(response).await?.text().await?;
    serde_json::from_str(&text).map_err(|e| SupabaseError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
