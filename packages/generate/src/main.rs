#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI for the climate map data pipeline.
//!
//! Builds the district map, downloads station readings, derives heat
//! waves and writes the catastrophes and yearly documents consumed by the
//! front-end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use climate_map_cli_utils::IndicatifProgress;
use climate_map_generate::PipelineConfig;
use climate_map_source::progress::ProgressCallback as _;

#[derive(Parser)]
#[command(name = "climate_map_generate", about = "Climate map data pipeline")]
struct Cli {
    /// Pipeline configuration file (defaults apply when omitted)
    #[arg(long, global = true, env = "CLIMATE_MAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the electoral district map and outside mask
    Map,
    /// Download daily readings for every weather station
    Fetch,
    /// Derive the heat-wave registry from downloaded readings
    HeatWaves,
    /// Write `catastrophes.json`
    Catastrophes,
    /// Write the per-year documents
    Yearly,
    /// Run every step in order. Without `--fetch` the existing heat-wave
    /// registry is used as is.
    All {
        /// Also download station readings and rebuild the heat-wave registry
        #[arg(long)]
        fetch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = climate_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Map => {
            let map = climate_map_generate::generate_map(&config)?;
            log::info!("District map built with {} districts", map.len());
        }
        Commands::Fetch => {
            let progress = IndicatifProgress::stations_bar(&multi, "Stations");
            climate_map_generate::fetch_readings(&config, &progress).await?;
        }
        Commands::HeatWaves => {
            let progress = IndicatifProgress::stations_bar(&multi, "Stations");
            climate_map_generate::generate_heat_waves(&config, &progress)?;
        }
        Commands::Catastrophes => {
            climate_map_generate::generate_catastrophes(&config)?;
        }
        Commands::Yearly => {
            let years = climate_map_generate::generate_yearly(&config)?;
            log::info!("{years} years written");
        }
        Commands::All { fetch } => {
            let steps = IndicatifProgress::steps_bar(&multi, "Pipeline", if fetch { 4 } else { 2 });

            steps.set_message("Building district map".to_string());
            climate_map_generate::generate_map(&config)?;
            steps.inc(1);

            if fetch {
                steps.set_message("Downloading readings".to_string());
                let progress = IndicatifProgress::stations_bar(&multi, "Stations");
                climate_map_generate::fetch_readings(&config, &progress).await?;
                steps.inc(1);

                steps.set_message("Deriving heat waves".to_string());
                let progress = IndicatifProgress::stations_bar(&multi, "Stations");
                climate_map_generate::generate_heat_waves(&config, &progress)?;
                steps.inc(1);
            }

            steps.set_message("Writing documents".to_string());
            climate_map_generate::generate_documents(&config)?;
            steps.inc(1);

            steps.finish("Pipeline complete".to_string());
        }
    }

    Ok(())
}
