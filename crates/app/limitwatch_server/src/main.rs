//! Limitwatch server binary.
//!
//! Boots the SQLite pool, runs migrations, spawns the background contract
//! checker, and serves the dashboard API.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use limitwatch_core::config::CoreConfig;
use limitwatch_core::notify::{Notify, SlackWebhookNotifier};
use limitwatch_core::scheduler;
use limitwatch_core::sfmc::SfmcClient;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "limitwatch_server", about = "Limitwatch server")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3100)]
    port: u16,

    /// SQLite connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://limitwatch.sqlite3?mode=rwc"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Seconds between check ticks. Overrides `CHECK_INTERVAL_SECS`.
    #[arg(long)]
    check_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,limitwatch_api=debug,limitwatch_core=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let args = Args::parse();

    info!(database_url = %args.database_url, port = args.port, "starting limitwatch_server");

    let pool = SqlitePoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    limitwatch_api::migrate(&pool).await?;

    let mut core_config = CoreConfig::from_env();
    if let Some(secs) = args.check_interval_secs {
        core_config.check_interval = Duration::from_secs(secs);
    }

    let sfmc = SfmcClient::new(&core_config)?;
    let webhook_http = reqwest::Client::builder()
        .timeout(core_config.http_timeout)
        .build()?;
    let notifier: Arc<dyn Notify> = Arc::new(SlackWebhookNotifier::new(
        webhook_http,
        core_config.webhook_url.clone(),
    ));

    info!(
        interval_secs = core_config.check_interval.as_secs(),
        webhook_configured = core_config.webhook_url.is_some(),
        "starting contract check scheduler"
    );
    tokio::spawn(scheduler::run(
        pool.clone(),
        sfmc,
        notifier,
        core_config.check_interval,
    ));

    let api_config = limitwatch_api::config::ApiConfig {
        bind_addr: format!("127.0.0.1:{}", args.port),
        ..limitwatch_api::config::ApiConfig::from_env()
    };

    let state = limitwatch_api::AppState::new(pool, api_config.clone());
    let app = limitwatch_api::router(state);

    let listener = tokio::net::TcpListener::bind(&api_config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "dashboard API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
