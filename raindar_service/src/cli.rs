/// Command-line interface parsing for the raindar binary.
///
/// Two subcommands: `serve` runs the HTTP endpoint, `report` runs a single
/// evaluation cycle and prints it to the terminal (or as JSON).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::dashboard::DashboardQuery;
use crate::model::Coordinate;

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("--lat and --lon must be given together")]
    IncompleteCoordinate,

    #[error("coordinate out of range: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

/// Rainfall forecast and flood-point risk for a municipality
#[derive(Parser, Debug)]
#[command(name = "raindar")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one evaluation and print it
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// User latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// User longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Street address, geocoded within the configured municipality
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub address: Option<String>,

    /// Hide hourly buckets below this many millimetres (0 to 20)
    #[arg(long, default_value_t = 0.0)]
    pub min_rain: f64,

    /// Show the occurrence history of one flood point
    #[arg(long, value_name = "NAME")]
    pub point: Option<String>,

    /// Replay a saved forecast response instead of calling the API
    #[arg(long, value_name = "FILE")]
    pub forecast_file: Option<PathBuf>,

    /// Print the view-model as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn query(&self) -> Result<DashboardQuery, CliError> {
        let coordinate = match (self.lat, self.lon) {
            (None, None) => None,
            (Some(latitude), Some(longitude)) => {
                let coordinate = Coordinate::new(latitude, longitude);
                if !coordinate.is_valid() {
                    return Err(CliError::InvalidCoordinate { latitude, longitude });
                }
                Some(coordinate)
            }
            _ => return Err(CliError::IncompleteCoordinate),
        };

        Ok(DashboardQuery {
            coordinate,
            address: self.address.clone(),
            min_rainfall_mm: self.min_rain,
            selected_point: self.point.clone(),
        })
    }
}
