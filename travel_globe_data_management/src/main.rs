use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_globe_data_management::{DEFAULT_OUTPUT_FILE, config::ImportConfig, import_csv_file, trip_file};
use travel_globe_lib::{
    diagnostics,
    sanitize::sanitize_items,
    share::{share_query, token_from_query},
    token,
};

#[derive(Parser)]
#[command(name = "travel-globe")]
#[command(about = "Import, share and check travel globe trip data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode a CSV of visited places into a trips JSON file
    Import {
        input: PathBuf,
        #[arg(default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
        /// Overrides GEOCODER_ENDPOINT
        #[arg(long)]
        endpoint: Option<String>,
        /// Overrides GEOCODER_DELAY_MS
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Overrides GEOCODER_USER_AGENT
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Compress a trips JSON file into a shareable token
    Compress { trips_file: PathBuf },
    /// Decode a token, or a link carrying one, and print the sanitized trips
    Decode { token: String },
    /// Report problems in a trips JSON file without changing it
    Check { trips_file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,travel_globe_data_management=info,travel_globe_lib=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Import { input, output, endpoint, delay_ms, user_agent } => {
            let mut config = ImportConfig::from_env()?;
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            if let Some(delay_ms) = delay_ms {
                config.delay = std::time::Duration::from_millis(delay_ms);
            }
            if let Some(user_agent) = user_agent {
                config.user_agent = user_agent;
            }

            let report = import_csv_file(&input, &output, &config)
                .await
                .with_context(|| format!("Failed to import {}", input.display()))?;

            if !report.skipped.is_empty() {
                tracing::warn!("Skipped {} rows", report.skipped.len());
            }
            let written = tokio::fs::canonicalize(&output).await.unwrap_or_else(|_| output.clone());
            println!("Wrote {} trips to {}", report.trips.len(), written.display());
        }
        Commands::Compress { trips_file } => {
            let trips = trip_file::read_trip_array(&trips_file)
                .await
                .with_context(|| format!("Failed to load trips from {}", trips_file.display()))?;
            let token = token::encode(&trips)?;

            println!("{token}");
            println!("\nShareable query string:");
            println!("{}", share_query(&token));
        }
        Commands::Decode { token } => {
            let token = if token.contains('=') {
                token_from_query(&token).context("No trips parameter in the given link")?
            } else {
                token
            };
            let items = token::decode(&token)?;
            let trips = sanitize_items(&items);

            let report = diagnostics::report(trips.iter().map(|trip| &trip.trip));
            if report.is_clear() {
                tracing::info!("{report}");
            } else {
                tracing::warn!("{report}");
            }
            println!("{}", serde_json::to_string_pretty(&trips)?);
        }
        Commands::Check { trips_file } => {
            let value = trip_file::read_json(&trips_file)
                .await
                .with_context(|| format!("Failed to load trips from {}", trips_file.display()))?;
            println!("{}", diagnostics::report_values(&value));
        }
    }

    Ok(())
}
