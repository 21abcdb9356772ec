//! Paystable CLI
//!
//! Terminal checkout widget for a merchant payment backend.

mod commands;
mod config;
mod render;
mod shutdown;

use clap::{Parser, Subcommand};
use config::ConfigLoader;
use paystable_sdk::client::BackendClient;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Paystable - checkout widget for stable-asset payments
#[derive(Parser, Debug)]
#[command(name = "paystable")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./paystable.toml", global = true)]
    config: PathBuf,

    /// Override the merchant backend URL
    #[arg(long, env = "PAYSTABLE_BACKEND_URL", global = true)]
    backend_url: Option<Url>,

    /// Override the number formatting locale (e.g., de-CH)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Format a scaled (x 10^6) amount for display
    Format {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        /// Format as a stable-asset amount (up to 6 fraction digits)
        #[arg(long)]
        asset: bool,
    },
    /// List the merchant's products
    Products,
    /// Pay for one unit of a product
    Checkout {
        /// GTIN of the product
        gtin: String,
        /// Start on the QR code instead of the wallet list
        #[arg(long)]
        qr: bool,
    },
    /// Show the payment status of an order
    Status { order_id: String },
    /// Show an order
    Order { order_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.backend_url, args.locale);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::debug!(backend = %config.backend_url, "Configuration loaded from {:?}", args.config);

    let http = reqwest::Client::builder()
        .timeout(config.flow.request_timeout)
        .build()?;
    let client = BackendClient::new(config.backend_url.clone()).with_http_client(http);

    let result = match args.command {
        Command::Format { amount, asset } => {
            println!("{}", commands::format_amount(amount, asset, &config.locale));
            Ok(())
        }
        Command::Products => commands::products(&client, &config.locale).await,
        Command::Checkout { gtin, qr } => commands::checkout(client, &config, &gtin, qr).await,
        Command::Status { order_id } => commands::status(&client, &order_id).await,
        Command::Order { order_id } => commands::order(&client, &order_id, &config.locale).await,
    };

    result.map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so they do not interleave with rendered output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
