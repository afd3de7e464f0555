#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the taxi profit toolchain.
//!
//! Runs a single subcommand when one is given, otherwise drops into an
//! interactive menu. Uses `indicatif-log-bridge` (via
//! [`taxi_profit_cli_utils::init_logger`]) so that log lines and progress
//! bars never fight for the terminal.

mod commands;
mod interactive;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use taxi_profit_config::AppConfig;

use crate::commands::Session;

#[derive(Parser)]
#[command(name = "taxi_profit", about = "Taxi zone x hour profit lookup and sampling tool")]
struct Cli {
    /// TOML config file (overrides `TAXI_PROFIT_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Trip file (parquet or CSV) to build the profit table from
    #[arg(long, global = true)]
    trips: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a stratified sample from every raw monthly trip file
    Sample {
        /// Directory holding `<prefix><month>.parquet` files
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Directory to write the sampled files to
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Fraction of rows to keep, between 0 and 1
        #[arg(long)]
        fraction: Option<f64>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Expected profit per trip for one zone and hour
    Lookup {
        /// Pickup zone id
        #[arg(long, allow_negative_numbers = true)]
        zone: i64,
        /// Hour of day (0-23)
        #[arg(long, allow_negative_numbers = true)]
        hour: i64,
    },
    /// Whether to stay or move to a nearby zone for the next hour
    Recommend {
        /// Current zone id
        #[arg(long, allow_negative_numbers = true)]
        zone: i64,
        /// Current hour of day (0-23)
        #[arg(long, allow_negative_numbers = true)]
        hour: i64,
        /// How many zone ids on either side to consider
        #[arg(long)]
        radius: Option<usize>,
    },
    /// Dataset summary, best times, zone comparison, and demand patterns
    Insights {
        /// Zone to profile
        #[arg(long, allow_negative_numbers = true)]
        zone: Option<i64>,
        /// Hour to compare zones at (defaults to the current hour)
        #[arg(long, allow_negative_numbers = true)]
        hour: Option<i64>,
    },
    /// List named zones
    Zones,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = taxi_profit_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(trips) = cli.trips {
        config.paths.trips_file = trips;
    }

    let Some(command) = cli.command else {
        return interactive::run(&multi, config);
    };

    match command {
        Commands::Sample {
            input_dir,
            output_dir,
            fraction,
            seed,
        } => {
            if let Some(dir) = input_dir {
                config.paths.raw_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.paths.sampled_dir = dir;
            }
            if let Some(fraction) = fraction {
                config.sampling.fraction = fraction;
            }
            if let Some(seed) = seed {
                config.sampling.seed = seed;
            }
            config.validate()?;
            commands::sample(&config, &multi, cli.json)?;
        }
        Commands::Lookup { zone, hour } => {
            let session = Session::load(config)?;
            commands::lookup(&session, zone, hour, cli.json)?;
        }
        Commands::Recommend { zone, hour, radius } => {
            if let Some(radius) = radius {
                config.model.neighbor_radius = radius;
            }
            let session = Session::load(config)?;
            commands::recommend(&session, zone, hour, cli.json)?;
        }
        Commands::Insights { zone, hour } => {
            let session = Session::load(config)?;
            commands::insights(&session, zone, hour, cli.json)?;
        }
        Commands::Zones => {
            let zones = commands::load_zones(&config);
            commands::list_zones(&zones, cli.json)?;
        }
    }

    Ok(())
}
