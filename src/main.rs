use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use price_drop_watcher::config::LoggingConfig;
use price_drop_watcher::plugins::notifiers::EmailNotifier;
use price_drop_watcher::{
    AppConfig, Catalog, CatalogStore, CycleScheduler, NewTrackedItem, PageFetcher, PriceChecker,
};

const EXAMPLE_URL: &str = "https://www.amazon.in/dp/B082VS5H3Y";
const EXAMPLE_NAME: &str = "Boat Rockerz 255 Pro";

#[derive(Parser)]
#[command(name = "price-drop-watcher", version, about = "Email me when a product gets cheaper")]
struct Cli {
    /// Directory holding default.toml and local.toml
    #[arg(long, default_value = "config")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the catalog until interrupted (the default)
    Run,
    /// Start tracking a product page
    Add {
        url: String,
        target_price: Decimal,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the tracked items
    List,
    /// Run a single scan and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let _guard = init_tracing(&config.logging)?;

    let store = CatalogStore::new(&config.catalog.products_file);
    let mut catalog = store
        .load()
        .await
        .with_context(|| format!("loading catalog {}", store.path().display()))?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Add { url, target_price, name } => {
            let item = store
                .add(&mut catalog, NewTrackedItem::new(url, target_price, name))
                .await?;
            println!("Tracking {} at target {}", item.url, item.target_price);
        }
        Command::List => print_catalog(&catalog, &config.notifications.currency_symbol),
        Command::Check => {
            let mut scheduler = build_scheduler(&config, store, catalog)?;
            scheduler.run_once().await;
        }
        Command::Run => {
            if catalog.is_empty() && config.catalog.seed_example {
                store
                    .add(
                        &mut catalog,
                        NewTrackedItem::new(
                            EXAMPLE_URL,
                            Decimal::from(1000),
                            Some(EXAMPLE_NAME.to_string()),
                        ),
                    )
                    .await?;
            }

            info!("Starting price tracker...");
            let scheduler = build_scheduler(&config, store, catalog)?;
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Shutting down after the current scan...");
                        let _ = shutdown_tx.send(true);
                    }
                    Err(e) => {
                        error!("Unable to listen for shutdown signal: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            });

            let (_, stats) = scheduler.run(shutdown_rx).await;
            info!(
                "Ran {} scans, sent {} alerts, {} undelivered, hit {} errors",
                stats.cycles_completed, stats.alerts_sent, stats.alerts_failed, stats.errors
            );
        }
    }

    Ok(())
}

fn build_scheduler(config: &AppConfig, store: CatalogStore, catalog: Catalog) -> Result<CycleScheduler> {
    let symbol = config.notifications.currency_symbol.clone();
    let fetcher = PageFetcher::from_config(&config.scraper)?;
    let notifier = EmailNotifier::new(config.notifications.smtp.clone(), symbol.clone());
    let checker = PriceChecker::new(Box::new(fetcher), Box::new(notifier), symbol);

    Ok(CycleScheduler::new(
        checker,
        store,
        catalog,
        Duration::from_secs(config.scheduler.check_interval_secs),
    ))
}

/// Log to stdout and to the configured file. The guard must outlive `main`
/// or buffered file output is lost.
fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard> {
    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .context("log_file must name a file")?
        .to_string_lossy()
        .into_owned();

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter)))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

fn print_catalog(catalog: &Catalog, symbol: &str) {
    if catalog.is_empty() {
        println!("No tracked items");
        return;
    }

    for item in catalog.iter() {
        let last_price = item
            .last_price
            .map(|p| format!("{}{}", symbol, p))
            .unwrap_or_else(|| "-".to_string());
        let last_checked = item
            .last_checked
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{}\n  url: {}\n  target: {}{}  last: {}  checked: {}",
            item.display_name(),
            item.url,
            symbol,
            item.target_price,
            last_price,
            last_checked
        );
    }
}
