pub mod auth;
pub mod client;
pub mod error;
pub mod query;
pub mod types;

pub use auth::AuthApi;
pub use client::SupabaseClient;
pub use error::SupabaseError;
pub use query::QueryBuilder;
pub use types::{Session, User};
