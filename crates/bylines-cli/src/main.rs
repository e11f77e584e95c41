mod discover;
mod images;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use bylines_core::{AppConfig, DateRange};
use bylines_db::{PgStore, PoolConfig};
use bylines_scraper::BylineClient;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bylines")]
#[command(about = "Harvest journalist bylines, profiles, and headshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the search API day by day and store every credited journalist
    Discover {
        /// First publication day to search (defaults to BYLINES_FROM_DATE)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last publication day to search, inclusive (defaults to BYLINES_TO_DATE)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Download headshots for stored journalists that do not have one yet
    Images,
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check the database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some((command, config)) = command_with_config(Cli::parse(), bylines_core::load_app_config)?
    else {
        println!("bylines: no command given; see --help");
        return Ok(());
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.env.wants_ansi_logs())
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match command {
        Commands::Discover { from, to } => {
            let api_key = config
                .capi_api_key
                .clone()
                .context("CAPI_API_KEY must be set to run discover")?;
            let range = DateRange::new(
                from.unwrap_or(config.from_date),
                to.unwrap_or(config.to_date),
            );
            if range.is_empty() {
                anyhow::bail!("--from {} is after --to {}", range.start, range.end);
            }

            let store = Arc::new(connect_store(&config, true).await?);
            let client = Arc::new(build_client(&config)?);
            let settings = discover::DiscoverSettings {
                search_url: config.search_url.clone(),
                api_key,
                page_size: config.page_size,
                concurrency: config.discovery_concurrency,
                range,
            };
            let summary = discover::run_discover(store, client, settings).await;
            println!(
                "discover finished: {} day(s) ok, {} failed, {} panicked",
                summary.succeeded, summary.failed, summary.panicked
            );
        }
        Commands::Images => {
            let store = Arc::new(connect_store(&config, true).await?);
            let client = Arc::new(build_client(&config)?);
            let summary = images::run_images(
                store,
                client,
                config.image_dir.clone(),
                config.image_concurrency,
            )
            .await?;
            println!(
                "images finished: {} journalist(s) ok, {} failed, {} panicked",
                summary.succeeded, summary.failed, summary.panicked
            );
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let store = connect_store(&config, false).await?;
            let applied = bylines_db::run_migrations(store.pool()).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            let store = connect_store(&config, false).await?;
            bylines_db::ping(store.pool()).await?;
            println!("database reachable");
        }
    }

    Ok(())
}

/// Loads configuration only when there is a command to run, so a bare
/// `bylines` works without `DATABASE_URL`.
fn command_with_config<E>(
    cli: Cli,
    load: impl FnOnce() -> Result<AppConfig, E>,
) -> Result<Option<(Commands, AppConfig)>, E> {
    let Some(command) = cli.command else {
        return Ok(None);
    };
    Ok(Some((command, load()?)))
}

async fn connect_store(config: &AppConfig, migrate: bool) -> anyhow::Result<PgStore> {
    let pool_config = PoolConfig::from_app_config(config);
    let pool = bylines_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to the database")?;
    if migrate {
        let applied = bylines_db::run_migrations(&pool).await?;
        if applied > 0 {
            tracing::info!(applied, "applied pending migrations");
        }
    }
    Ok(PgStore::new(pool))
}

fn build_client(config: &AppConfig) -> anyhow::Result<BylineClient> {
    BylineClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_ms,
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}
