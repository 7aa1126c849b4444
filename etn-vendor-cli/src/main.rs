//! Electroneum vendor CLI
//!
//! Command-line tool for creating payment QR codes, polling for payment
//! confirmation and checking webhook signatures.

use anyhow::Result;
use clap::{Parser, Subcommand};
use etn_vendor::credentials::{ENV_API_KEY, ENV_API_SECRET};
use etn_vendor::VendorCredentials;

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "etn-vendor")]
#[command(about = "Electroneum vendor tools - payment QR codes, polling and webhook signatures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Vendor API key
    #[arg(long, global = true, env = ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Vendor API secret
    #[arg(long, global = true, env = ENV_API_SECRET, hide_env_values = true)]
    api_secret: Option<String>,
}

impl Cli {
    fn credentials(&self) -> VendorCredentials {
        VendorCredentials::new(
            self.api_key.clone().unwrap_or_default(),
            self.api_secret.clone().unwrap_or_default(),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print fresh payment ids
    PaymentId {
        /// How many ids to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Convert a local price and build the payment QR code (fetches rates)
    Qr {
        /// Price in local currency
        #[arg(short, long)]
        amount: String,

        /// Currency code, e.g. GBP
        #[arg(short, long)]
        currency: String,

        /// Outlet id (hex)
        #[arg(short, long)]
        outlet: String,

        /// Payment id to use instead of a generated one
        #[arg(long)]
        payment_id: Option<String>,

        /// Render the QR code in the terminal
        #[arg(long)]
        render: bool,
    },

    /// Build the payment string and QR URL for an amount in ETN (offline)
    Encode {
        /// Amount in ETN
        #[arg(short, long)]
        etn: String,

        /// Outlet id (hex)
        #[arg(short, long)]
        outlet: String,

        /// Payment id to use instead of a generated one
        #[arg(long)]
        payment_id: Option<String>,

        /// Render the QR code in the terminal
        #[arg(long)]
        render: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign a JSON payload with the API secret
    Sign {
        /// JSON payload, `@path` to read a file, or `-` for stdin
        payload: String,
    },

    /// Verify a webhook payload and its ETN-SIGNATURE value
    Verify {
        /// JSON payload, `@path` to read a file, or `-` for stdin
        #[arg(short, long)]
        payload: String,

        /// Hex signature from the ETN-SIGNATURE header
        #[arg(short, long)]
        signature: String,
    },

    /// Ask the poll endpoint whether a payment has arrived
    Poll {
        /// Outlet id (hex)
        #[arg(short, long)]
        outlet: String,

        /// Payment id to check
        #[arg(long)]
        payment_id: String,

        /// Keep polling until the payment arrives
        #[arg(short, long)]
        watch: bool,

        /// Delay between polls when watching
        #[arg(long, default_value_t = 5000)]
        interval_ms: u64,

        /// Give up after this many polls when watching (0 = never)
        #[arg(long, default_value_t = 0)]
        max_attempts: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("etn_vendor_cli=debug,etn_vendor=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("etn_vendor_cli=info,etn_vendor=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let credentials = cli.credentials();

    match cli.command {
        Commands::PaymentId { count } => {
            commands::payment_id::run(count)?;
        }
        Commands::Qr {
            amount,
            currency,
            outlet,
            payment_id,
            render,
        } => {
            commands::encode::create(
                credentials,
                &amount,
                &currency,
                &outlet,
                payment_id.as_deref(),
                render,
            )
            .await?;
        }
        Commands::Encode {
            etn,
            outlet,
            payment_id,
            render,
            json,
        } => {
            commands::encode::offline(&etn, &outlet, payment_id.as_deref(), render, json)?;
        }
        Commands::Sign { payload } => {
            commands::sign::sign(credentials, &payload)?;
        }
        Commands::Verify { payload, signature } => {
            commands::sign::verify(credentials, &payload, &signature)?;
        }
        Commands::Poll {
            outlet,
            payment_id,
            watch,
            interval_ms,
            max_attempts,
        } => {
            let options = commands::poll::PollOptions {
                watch,
                interval_ms,
                max_attempts,
            };
            commands::poll::run(credentials, &outlet, &payment_id, options).await?;
        }
    }

    Ok(())
}
