mod seed;

use clap::{Parser, Subcommand};
use storefront_supabase::SupabaseClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the admin and customer accounts
    SeedUsers(seed::SeedArgs),
    /// Probe the REST endpoint with the anon key
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("storefront-cli ready; see --help for commands");
        return Ok(());
    };

    let config = storefront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        &config.supabase_service_key,
        config.http_timeout_secs,
        &config.user_agent,
    )?;

    match command {
        Commands::SeedUsers(args) => {
            let report = seed::seed_users(&client, &args).await;
            println!("seeded {} of {} users", report.created, report.attempted);
        }
        Commands::Health => {
            storefront_db::health_check(&client).await?;
            println!("supabase: ok");
        }
    }

    Ok(())
}
