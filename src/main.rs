mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod predictors;

use app::AppContext;
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, GeolocationConfig};
use datasources::GeolocationClient;
use error::Result;
use logic::normalizer::{FIELD_LATITUDE, FIELD_LONGITUDE, REQUIRED_FIELDS};
use logic::RecommendationEngine;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("{}: {}", e.kind(), e);
        if e.is_user_correctable() {
            eprintln!("Required fields: {}", REQUIRED_FIELDS.join(", "));
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("croplens=info"),
        2 => EnvFilter::new("croplens=debug"),
        _ => EnvFilter::new("croplens=trace,reqwest=debug"),
    };

    // stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => {
            Config::setup_interactive()?;
            Ok(())
        }
        Commands::Check => check(cli.config),
        Commands::Locate => {
            let coords = locator(cli.config)?.locate().await?;
            println!("{}", coords);
            Ok(())
        }
        Commands::Recommend {
            fields,
            auto_locate,
            json,
        } => {
            let config = Config::load(cli.config.clone())?;
            let ctx = Arc::new(AppContext::startup(&config)?);
            let engine = RecommendationEngine::new(ctx.clone());

            let mut raw: HashMap<String, String> = fields.into_iter().collect();
            for key in raw.keys().filter(|k| !REQUIRED_FIELDS.contains(&k.as_str())) {
                tracing::warn!(field = %key, "Ignoring unknown field");
            }
            if auto_locate {
                prefill_location(&mut raw, &GeolocationClient::new(config.geolocation)?).await?;
            }

            let result = engine.recommend_today(&raw).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result);
            }

            drop(engine);
            if let Ok(ctx) = Arc::try_unwrap(ctx) {
                ctx.shutdown();
            }
            Ok(())
        }
    }
}

fn check(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("Config OK");
    println!("  imagery:  {} ({})", config.imagery.base_url, config.imagery.collection);
    println!("  weather:  {}", config.weather.base_url);

    let ctx = AppContext::startup(&config)?;
    println!("  crop model:       {}", config.models.crop_path.display());
    println!("  fertilizer model: {}", config.models.fertilizer_path.display());
    println!("Models loaded");
    ctx.shutdown();
    Ok(())
}

/// Geolocation works without a config file, falling back to public defaults
fn locator(config_path: Option<PathBuf>) -> Result<GeolocationClient> {
    let geolocation = match Config::load(config_path) {
        Ok(config) => config.geolocation,
        Err(e) => {
            tracing::debug!(error = %e, "Using default geolocation settings");
            GeolocationConfig::default()
        }
    };
    GeolocationClient::new(geolocation)
}

/// Fill whichever coordinate the caller left out
async fn prefill_location(
    raw: &mut HashMap<String, String>,
    client: &GeolocationClient,
) -> Result<()> {
    if raw.contains_key(FIELD_LATITUDE) && raw.contains_key(FIELD_LONGITUDE) {
        return Ok(());
    }

    let coords = client.locate().await?;
    raw.entry(FIELD_LATITUDE.to_string())
        .or_insert_with(|| coords.latitude.to_string());
    raw.entry(FIELD_LONGITUDE.to_string())
        .or_insert_with(|| coords.longitude.to_string());
    Ok(())
}
