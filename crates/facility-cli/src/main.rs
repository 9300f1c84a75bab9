mod find;
mod surface;

use clap::{Parser, Subcommand};
use facility_core::{GeoPoint, TravelMode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "facility-cli")]
#[command(about = "Find the nearest facility of a category and route to it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Locate, search, rank, and route to the nearest matching facility
    Find {
        /// Origin latitude (overrides `FACILITY_ORIGIN`)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Origin longitude (overrides `FACILITY_ORIGIN`)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Facility category (overrides `FACILITY_CATEGORY`)
        #[arg(long)]
        category: Option<String>,
        /// Travel mode: driving, walking, bicycling, or transit
        #[arg(long, value_parser = parse_travel_mode)]
        mode: Option<TravelMode>,
        /// Route to this candidate id instead of the nearest one
        #[arg(long)]
        select: Option<String>,
    },
    /// List the category profiles the classifier would use
    Categories,
}

fn parse_travel_mode(raw: &str) -> Result<TravelMode, String> {
    TravelMode::parse(raw).ok_or_else(|| {
        format!("unknown travel mode '{raw}'; expected driving, walking, bicycling, or transit")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = facility_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Find {
            lat,
            lng,
            category,
            mode,
            select,
        }) => {
            let origin = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(
                    GeoPoint::new(lat, lng)
                        .ok_or_else(|| anyhow::anyhow!("origin ({lat}, {lng}) is out of range"))?,
                ),
                _ => None,
            };
            let options = find::FindOptions {
                origin,
                category,
                mode,
                select,
            };
            find::run_find(&config, options).await?;
        }
        Some(Commands::Categories) => find::run_categories(&config)?,
        None => println!("facility-cli: run `facility-cli find` or `facility-cli --help`"),
    }

    Ok(())
}
