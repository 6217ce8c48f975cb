//! Diagnostic command line: resolve a coordinate, run a region search, or
//! render a placeholder preview, using the same configuration as the editor.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mapnote_core::{Coordinate, MapAnnotation, ResolutionSource};
use mapnote_editor::render_placeholder;
use mapnote_geocoding::{GeocodingCoordinator, LocationSearch, MapboxProvider};
use mapnote_settings::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_DATE"), ")");

#[derive(Debug, Parser)]
#[command(name = "mapnote")]
#[command(version = LONG_VERSION)]
#[command(about = "Address lookup, location search and preview tools for map annotations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Print the address found for a coordinate.
    Resolve {
        #[arg(value_name = "LNG", allow_negative_numbers = true, value_parser = parse_lng)]
        lng: f64,
        #[arg(value_name = "LAT", allow_negative_numbers = true, value_parser = parse_lat)]
        lat: f64,
    },
    /// List suggestions for a place name inside the configured region.
    Search {
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Write the capture fallback image for a pin as PNG.
    Placeholder {
        #[arg(value_name = "OUT")]
        output: PathBuf,
        /// Pin longitude; the search region's center when omitted.
        #[arg(
            value_name = "LNG",
            allow_negative_numbers = true,
            value_parser = parse_lng,
            requires = "lat"
        )]
        lng: Option<f64>,
        #[arg(value_name = "LAT", allow_negative_numbers = true, value_parser = parse_lat)]
        lat: Option<f64>,
    },
}

fn parse_degrees(text: &str, limit: f64) -> Result<f64, String> {
    let value: f64 = text.parse().map_err(|_| format!("not a number: {}", text))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(format!("must be within ±{}", limit));
    }
    Ok(value)
}

fn parse_lng(text: &str) -> Result<f64, String> {
    parse_degrees(text, 180.0)
}

fn parse_lat(text: &str) -> Result<f64, String> {
    parse_degrees(text, 90.0)
}

/// Loads the user's config and applies environment overrides.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load_or_default().context("failed to load configuration")?;
    config.apply_env_overrides();
    Ok(config)
}

/// Runs a command, printing its result to stdout.
pub async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { lng, lat } => {
            let coordinator = GeocodingCoordinator::from_settings(&config.geocoding);
            let resolution = coordinator
                .resolve(Coordinate::new(lng, lat), ResolutionSource::Manual)
                .await;
            println!("{}", serde_json::to_string_pretty(&resolution.address)?);
            if let Some(error) = &resolution.debug.error {
                bail!("address not resolved: {}", error);
            }
        }
        Commands::Search { text } => {
            let query = text.join(" ");
            let provider = MapboxProvider::from_settings(&config.geocoding)?;
            let search = LocationSearch::from_settings(Arc::new(provider), &config.search);
            if !search.accepts(&query) {
                bail!(
                    "query must be at least {} characters",
                    config.search.min_query_len
                );
            }
            for suggestion in search.search(&query).await? {
                println!("{}\t{}", suggestion.center.lat_lng_label(), suggestion.label);
            }
        }
        Commands::Placeholder { output, lng, lat } => {
            let pin = lng.zip(lat).map(|(lng, lat)| Coordinate::new(lng, lat));
            write_placeholder(&output, pin, config)?;
            println!("{}", output.display());
        }
    }
    Ok(())
}

/// Renders the capture fallback for a pin and writes it as PNG. Without a
/// pin, the search region's center is used.
pub fn write_placeholder(
    output: &Path,
    pin: Option<Coordinate>,
    config: &Config,
) -> anyhow::Result<()> {
    let point = pin.unwrap_or_else(|| config.search.region.bounding_box().center());
    let annotation = MapAnnotation::pin(point);
    let image = render_placeholder(
        &annotation,
        config.capture.placeholder_width,
        config.capture.placeholder_height,
    );
    let png = image.encode_png()?;
    std::fs::write(output, png)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote {}x{} placeholder to {}",
        image.width,
        image.height,
        output.display()
    );
    Ok(())
}
