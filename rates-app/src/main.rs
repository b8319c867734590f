//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the CNB client
//! - Build the provider registry and the exchange rate service
//! - Run one command and print the result as JSON

mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_client::{CnbClient, RetryPolicy};
use rates_hex::{ExchangeRateService, RegistryOptions, build_registry};
use rates_types::CancellationToken;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Daily exchange rates", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Target currency all rates are expressed in
    #[arg(long, short)]
    target: Option<String>,

    /// Currency codes to price (e.g. USD EUR JPY or USD,EUR,JPY)
    #[arg(value_delimiter = ',')]
    codes: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered exchange rate providers
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber; logs go to stderr so stdout stays JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let client = CnbClient::new(&config.cnb_url)
        .with_retry_policy(RetryPolicy::exponential(config.max_retries))
        .with_timeout(config.http_timeout)?;

    let registry = build_registry(
        client,
        RegistryOptions {
            endpoint: config.cnb_url.clone(),
            cache_ttl: config.cache_ttl,
            ..RegistryOptions::default()
        },
    )?;
    let service = ExchangeRateService::new(registry);

    match cli.command {
        Some(Commands::Providers) => {
            println!("{}", serde_json::to_string_pretty(&service.providers())?);
        }
        None => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling request");
                    on_interrupt.cancel();
                }
            });

            let response = service
                .get_exchange_rates(cli.target.as_deref(), &cli.codes, &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
