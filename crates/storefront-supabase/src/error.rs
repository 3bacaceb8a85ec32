use thiserror::Error;

/// Errors returned by the Supabase REST and auth client.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. `message` is the
    /// service's own error text, passed through unchanged.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("JSON serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A single-row request matched zero or several rows.
    #[error("JSON object requested, multiple (or no) rows returned ({rows} rows)")]
    UnexpectedRowCount { rows: usize },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl SupabaseError {
    /// HTTP status reported by the service, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            SupabaseError::Api { status, .. } => Some(*status),
            SupabaseError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
