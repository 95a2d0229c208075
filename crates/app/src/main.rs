use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use engine::Engine;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "pecunia")]
#[command(about = "Personal finance ledger: wallets, installments and subscription billing")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, env = "PECUNIA_CONFIG", default_value = "settings")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server and, when configured, periodic billing.
    Serve,
    /// Run one billing trigger and exit.
    Bill {
        /// Billing date (YYYY-MM-DD), today in UTC when absent.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Apply pending migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pecunia={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    if let Command::Migrate = cli.command {
        tracing::info!("migrations applied");
        return Ok(());
    }

    let engine = Engine::builder()
        .database(db)
        .retry(settings.retry_policy())
        .catch_up(settings.catch_up()?)
        .build()
        .await?;

    match cli.command {
        Command::Bill { date } => bill_once(&engine, date).await,
        Command::Serve => serve(Arc::new(engine), settings).await,
        Command::Migrate => Ok(()),
    }
}

async fn bill_once(engine: &Engine, date: Option<NaiveDate>) -> AppResult<()> {
    let today = date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = engine.trigger_subscription_billing(today).await?;

    for period in &summary.details {
        println!("{period}");
    }
    for failure in &summary.failures {
        println!("{}: {} ({})", failure.name, failure.error, failure.code);
    }
    println!(
        "{} subscription(s) billed, {} failure(s)",
        summary.processed,
        summary.failures.len()
    );
    Ok(())
}

async fn serve(engine: Arc<Engine>, settings: settings::Settings) -> AppResult<()> {
    let mut tasks = tokio::task::JoinSet::new();

    if let Some(server) = settings.server {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    if let Some(billing) = settings.billing {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            tracing::info!(interval_secs = billing.interval_secs, "Found billing settings...");
            let period = Duration::from_secs(billing.interval_secs.max(1));
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let today = Utc::now().date_naive();
                if let Err(err) = engine.trigger_subscription_billing(today).await {
                    tracing::error!("billing trigger failed: {err}");
                }
            }
        });
    }

    if tasks.is_empty() {
        tracing::warn!("nothing to serve: configure [server] and/or [billing]");
        return Ok(());
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(config: &settings::Database) -> AppResult<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
