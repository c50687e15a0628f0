//! RainDar - rainfall forecast and flood-point risk service
//!
//! Pulls the municipal 5 day forecast, turns the next 24 hours into a
//! LOW / MEDIUM / HIGH flood risk, and relates it to the historical
//! flooding points listed in the reference table.
//!
//! Usage:
//!   cargo run --release -- serve --port 8080
//!   cargo run --release -- report --lat -21.7921 --lon -48.1789
//!   cargo run --release -- report --address "Rua Voluntários da Pátria, 1500" --json
//!
//! Environment:
//!   OPENWEATHER_API_KEY - forecast API key (without it the forecast is empty)
//!   RUST_LOG            - log filter, defaults to "info"

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use raindar_service::analysis::storm::{StormAlertKind, StormWatch};
use raindar_service::cli::{Cli, Command, ReportArgs};
use raindar_service::config::{self, Config};
use raindar_service::dashboard::{Dashboard, DashboardView, FloodPointsView, ProximityStatus};
use raindar_service::endpoint;
use raindar_service::ingest::WeatherProvider;
use raindar_service::ingest::geocode::NominatimClient;
use raindar_service::ingest::openweather::{OpenWeatherClient, RecordedForecast};
use raindar_service::model::RiskLevel;

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(&format!("Configuration error: {}", e)),
    };

    match cli.command {
        Command::Serve { port } => serve(config, port),
        Command::Report(args) => report(config, &args),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}\n", message);
    std::process::exit(1);
}

fn live_provider(config: &Config) -> OpenWeatherClient {
    if config.forecast.api_key().is_none() {
        eprintln!(
            "⚠️  {} is not set; the forecast will be empty",
            config.forecast.api_key_env
        );
    }
    OpenWeatherClient::new(&config.forecast)
        .unwrap_or_else(|e| fail(&format!("Failed to build forecast client: {}", e)))
}

fn geocoder(config: &Config) -> NominatimClient {
    NominatimClient::new(&config.geocoding)
        .unwrap_or_else(|e| fail(&format!("Failed to build geocoding client: {}", e)))
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

fn serve(config: Config, port: u16) {
    println!("🌧️  RainDar - {}", config.municipality.name);
    println!("============================\n");

    let provider = live_provider(&config);
    let geocoder = geocoder(&config);
    let dashboard = Dashboard::new(config, provider, geocoder)
        .unwrap_or_else(|e| fail(&format!("Configuration error: {}", e)));

    if let Err(e) = endpoint::start_endpoint_server(port, dashboard) {
        fail(&e.to_string());
    }
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

fn report(config: Config, args: &ReportArgs) {
    let query = args.query().unwrap_or_else(|e| fail(&e.to_string()));

    let provider: Box<dyn WeatherProvider> = match &args.forecast_file {
        Some(path) => match RecordedForecast::from_file(path) {
            Ok(recorded) => Box::new(recorded),
            Err(e) => fail(&format!("Failed to read {}: {}", path.display(), e)),
        },
        None => Box::new(live_provider(&config)),
    };
    let geocoder = geocoder(&config);

    let dashboard = Dashboard::new(config, provider, geocoder)
        .unwrap_or_else(|e| fail(&format!("Configuration error: {}", e)));
    let view = dashboard.render(&query, Utc::now());

    if args.json {
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("Failed to serialize report: {}", e)),
        }
    } else {
        print_report(&view);
    }
}

fn risk_icon(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "🔴",
        RiskLevel::Medium => "🟠",
        RiskLevel::Low => "🟢",
    }
}

fn print_report(view: &DashboardView) {
    println!("🌧️  RainDar - {}", view.location);
    println!("   Generated {}\n", view.generated_at.format("%d/%m/%Y %H:%M"));

    // Forecast and risk
    match (view.horizon_rainfall_mm, view.risk) {
        (Some(total), Some(risk)) => {
            println!(
                "{} Flood risk: {} ({:.1} mm in the next {} h)",
                risk_icon(risk),
                risk,
                total,
                view.horizon_hours
            );
        }
        _ if view.forecast_available => {
            println!("⚠️  No forecast inside the next {} h", view.horizon_hours);
        }
        _ => println!("⚠️  Forecast unavailable"),
    }

    if let Some(conditions) = &view.conditions {
        println!(
            "   Now: {:.1} °C, {:.0}% humidity, wind {:.1} km/h, {:.0} hPa",
            conditions.temperature_c, conditions.humidity_pct, conditions.wind_speed_kmh, conditions.pressure_hpa
        );
    }

    if !view.hourly_rainfall.is_empty() {
        println!("\n📈 Rainfall by bucket:");
        for bucket in &view.hourly_rainfall {
            println!("   {}  {:>5.1} mm", bucket.time.format("%d/%m %H:%M"), bucket.rainfall_mm);
        }
    }

    if !view.daily_rainfall.is_empty() {
        println!("\n📅 Daily totals:");
        for day in &view.daily_rainfall {
            println!("   {}  {:>5.1} mm", day.date.format("%d/%m/%Y"), day.rainfall_mm);
        }
    }

    match &view.storm_watch {
        StormWatch::Unavailable => {}
        StormWatch::Clear => println!("\n✓ No storm conditions in the next {} h", view.horizon_hours),
        StormWatch::Detected(alerts) => {
            println!("\n⛈️  Storm conditions detected:");
            for alert in alerts {
                let (label, unit) = match alert.kind {
                    StormAlertKind::HeavyRain => ("heavy rain", "mm"),
                    StormAlertKind::StrongWind => ("strong wind", "km/h"),
                    StormAlertKind::LowPressure => ("low pressure", "hPa"),
                    StormAlertKind::HighHumidity => ("high humidity", "%"),
                };
                println!("   {}  {} ({:.1} {})", alert.time.format("%d/%m %H:%M"), label, alert.value, unit);
            }
        }
    }

    // Flood points
    match &view.flood_points {
        FloodPointsView::Unavailable { reason } => println!("\n⚠️  Flood points unavailable: {}", reason),
        FloodPointsView::Available {
            risk_markers,
            summary,
            selected,
            ..
        } => {
            println!(
                "\n📍 {} monitored points, {} recorded occurrences",
                summary.total_points, summary.total_occurrences
            );
            if let Some(name) = &summary.most_critical {
                println!("   Most critical: {}", name);
            }
            if let Some(markers) = risk_markers {
                for marker in markers {
                    println!("   [{}] {}", marker.color, marker.name);
                }
            }
            if let Some(detail) = selected {
                println!("\n📋 {} ({} occurrences)", detail.name, detail.occurrence_count);
                for year in &detail.occurrences_by_year {
                    println!("   {}: {}", year.year, year.occurrences);
                }
                if !detail.dates.is_empty() {
                    println!("   Dates: {}", detail.dates.join(", "));
                }
            }
        }
    }

    // Nearest point
    match &view.proximity {
        ProximityStatus::NoUserLocation => {}
        ProximityStatus::AddressNotFound { query } => {
            println!("\n❓ Address not found: {}", query);
        }
        ProximityStatus::DataUnavailable { reason } => {
            println!("\n⚠️  Nearest point unavailable: {}", reason);
        }
        ProximityStatus::Found(report) => {
            println!("\n🧭 Nearest flood point: {}", report.nearest);
            println!("   Distance: {:.2} km", report.distance_km);
            match (report.rainfall_mm, report.risk) {
                (Some(rain), Some(risk)) => {
                    println!("   Forecast rain: {:.1} mm, risk {} (city-wide)", rain, risk)
                }
                _ => println!("   Forecast rain: unavailable"),
            }
            println!("   Past occurrences: {}", report.occurrence_count);
            if !report.dates.is_empty() {
                println!("   Dates: {}", report.dates);
            }
        }
    }
    println!();
}
