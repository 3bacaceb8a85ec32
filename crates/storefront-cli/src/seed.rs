//! Account seeding for fresh environments.
//!
//! Accounts are created through the admin API with a confirmed email so they
//! can sign in immediately. A failure for one account is logged and the run
//! moves on to the next.

use clap::Args;
use storefront_core::Role;
use storefront_supabase::SupabaseClient;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Email of the admin account
    #[arg(long, env = "SEED_ADMIN_EMAIL", default_value = "admin@example.com")]
    pub admin_email: String,
    /// Password of the admin account
    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,
    /// Email of the customer account
    #[arg(long, env = "SEED_CUSTOMER_EMAIL", default_value = "test@example.com")]
    pub customer_email: String,
    /// Password of the customer account
    #[arg(long, env = "SEED_CUSTOMER_PASSWORD", hide_env_values = true)]
    pub customer_password: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub attempted: usize,
    pub created: usize,
}

impl SeedArgs {
    fn accounts(&self) -> [(&str, &str, Role); 2] {
        [
            (
                self.admin_email.as_str(),
                self.admin_password.as_str(),
                Role::Admin,
            ),
            (
                self.customer_email.as_str(),
                self.customer_password.as_str(),
                Role::Customer,
            ),
        ]
    }
}

pub async fn seed_users(client: &SupabaseClient, args: &SeedArgs) -> SeedReport {
    let mut report = SeedReport::default();
    for (email, password, role) in args.accounts() {
        report.attempted += 1;
        match storefront_db::seed_user(client, email, password, role).await {
            Ok(user) => {
                report.created += 1;
                tracing::info!(user_id = %user.id, email, %role, "seeded user");
            }
            Err(e) => {
                tracing::error!(email, %role, error = %e, "failed to seed user");
            }
        }
    }
    report
}
