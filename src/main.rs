// src/main.rs
//! GPS KML Generator - acquire NMEA fixes and emit line/circle KML files

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use gps_kml_generator::gps::receiver::SUPPORTED_BAUD_RATES;
use gps_kml_generator::{
    config::AppConfig,
    coordinator::FixCoordinator,
    error::{KmlGenError, Result},
    geometry, gps, naming,
    gps::{AcquireSpec, GeoPoint, NmeaReceiver, ReadPolicy, ReadScheduler},
    kml::{KmlDocument, StyleSpec},
};

#[derive(Parser)]
#[command(name = "gps-kml-generator", version)]
#[command(about = "Acquire GPS fixes over serial NMEA and emit directional line / circle KML files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available serial ports
    Ports,
    /// Generate a directional line KML from two points
    Line {
        /// Serial port for point 1 (alternative to --point1)
        #[arg(long)]
        port1: Option<String>,
        /// Serial port for point 2 (alternative to --point2)
        #[arg(long)]
        port2: Option<String>,
        /// Manual point 1 as LON,LAT decimal degrees
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point1: Option<GeoPoint>,
        /// Manual point 2 as LON,LAT decimal degrees
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point2: Option<GeoPoint>,
        /// Forward extension in meters
        #[arg(long)]
        length: Option<f64>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Generate a circle KML around a center point
    Circle {
        /// Serial port for the center point (alternative to --center)
        #[arg(long)]
        port: Option<String>,
        /// Manual center as LON,LAT decimal degrees
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        center: Option<GeoPoint>,
        /// Radius in kilometers
        #[arg(long)]
        radius: Option<f64>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print the north-referenced bearing from point 1 to point 2
    Bearing {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point1: GeoPoint,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point2: GeoPoint,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Output directory for the KML file
    #[arg(long)]
    out: Option<PathBuf>,
    /// Baud rate for serial acquisition
    #[arg(long)]
    baud: Option<u32>,
    /// Line color as 8 hex digits (ARGB)
    #[arg(long)]
    color: Option<String>,
    /// Line width, 1-10
    #[arg(long)]
    width: Option<u32>,
    /// Allow distinct devices to read concurrently instead of serializing
    /// all protocol reads
    #[arg(long)]
    concurrent_reads: bool,
}

fn parse_point(s: &str) -> std::result::Result<GeoPoint, String> {
    let mut parts = s.split(',');
    let longitude = parts
        .next()
        .ok_or("expected LON,LAT")?
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude: {}", e))?;
    let latitude = parts
        .next()
        .ok_or("expected LON,LAT")?
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude: {}", e))?;
    if parts.next().is_some() {
        return Err("expected exactly LON,LAT".to_string());
    }
    Ok(GeoPoint::new(longitude, latitude))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_default();

    match cli.command {
        Command::Ports => {
            let ports = gps::ports::enumerate_ports()?;
            if ports.is_empty() {
                println!("No serial ports found.");
            } else {
                println!("Available serial ports:");
                for port in ports {
                    println!("  {}", port);
                }
            }
        }
        Command::Line {
            port1,
            port2,
            point1,
            point2,
            length,
            common,
        } => {
            let style = style_from(&common, &config)?;
            let out_dir = output_dir(&common, &config)?;
            let length = length.unwrap_or(config.line_length_m);
            let scheduler = scheduler_from(&common, &config);

            let (p1, p2) = resolve_pair(
                (port1, point1),
                (port2, point2),
                &common,
                &config,
                scheduler,
            )
            .await?;

            let bearing = geometry::bearing_angle(p1, p2);
            println!("Bearing point 1 -> point 2: {:.2}°", bearing);

            let line = geometry::line_geometry(p1, p2, length)?;
            let path = naming::next_path(&out_dir, "direccional", "kml");
            KmlDocument::for_line(&line, style).write_to(&path)?;
            println!("KML file generated: {}", path.display());
        }
        Command::Circle {
            port,
            center,
            radius,
            common,
        } => {
            let style = style_from(&common, &config)?;
            let out_dir = output_dir(&common, &config)?;
            let radius = radius.unwrap_or(config.radius_km);
            let scheduler = scheduler_from(&common, &config);

            let center = resolve_point(port, center, &common, &config, scheduler).await?;

            let circle = geometry::circle_polygon(center, radius)?;
            let path = naming::next_path(&out_dir, "circle", "kml");
            KmlDocument::for_circle(&circle, style).write_to(&path)?;
            println!("Circle KML file generated: {}", path.display());
        }
        Command::Bearing { point1, point2 } => {
            println!("{:.2}°", geometry::bearing_angle(point1, point2));
        }
    }

    Ok(())
}

fn style_from(common: &CommonArgs, config: &AppConfig) -> Result<StyleSpec> {
    let color = common.color.clone().unwrap_or_else(|| config.line_color.clone());
    let width = common.width.unwrap_or(config.line_width);
    StyleSpec::new(color, width)
}

fn output_dir(common: &CommonArgs, config: &AppConfig) -> Result<PathBuf> {
    common
        .out
        .clone()
        .or_else(|| config.output_dir.clone())
        .ok_or_else(|| {
            KmlGenError::Other("no output directory: pass --out or set it in the config".to_string())
        })
}

fn scheduler_from(common: &CommonArgs, config: &AppConfig) -> Arc<ReadScheduler> {
    let policy = if common.concurrent_reads || !config.serialize_reads {
        ReadPolicy::PerDevice
    } else {
        ReadPolicy::Serialized
    };
    Arc::new(ReadScheduler::new(policy))
}

fn acquire_spec(device: &str, common: &CommonArgs, config: &AppConfig) -> Result<AcquireSpec> {
    let baud = common.baud.unwrap_or(config.baud_rate);
    if !SUPPORTED_BAUD_RATES.contains(&baud) {
        return Err(KmlGenError::Other(format!(
            "unsupported baud rate {} (expected one of {:?})",
            baud, SUPPORTED_BAUD_RATES
        )));
    }
    Ok(AcquireSpec::new(device, baud)
        .with_read_timeout(Duration::from_secs(config.read_timeout_secs)))
}

/// One point from either a manual coordinate or a single-shot acquisition.
async fn resolve_point(
    port: Option<String>,
    manual: Option<GeoPoint>,
    common: &CommonArgs,
    config: &AppConfig,
    scheduler: Arc<ReadScheduler>,
) -> Result<GeoPoint> {
    match (manual, port) {
        (Some(point), _) => Ok(point),
        (None, Some(device)) => {
            let spec = acquire_spec(&device, common, config)?;
            println!("Connecting to GPS on {} at {} baud...", spec.device, spec.baud_rate);
            let mut receiver = NmeaReceiver::new(scheduler);
            let fix = receiver.acquire(&spec).await?;
            println!(
                "Fix acquired from {}: {}, {}",
                fix.source_id, fix.point.longitude, fix.point.latitude
            );
            Ok(fix.point)
        }
        (None, None) => Err(KmlGenError::Other(
            "each point needs either a manual coordinate or a serial port".to_string(),
        )),
    }
}

/// Two points, acquired concurrently when both come from serial ports.
async fn resolve_pair(
    first: (Option<String>, Option<GeoPoint>),
    second: (Option<String>, Option<GeoPoint>),
    common: &CommonArgs,
    config: &AppConfig,
    scheduler: Arc<ReadScheduler>,
) -> Result<(GeoPoint, GeoPoint)> {
    match (first, second) {
        ((Some(device1), None), (Some(device2), None)) => {
            let spec1 = acquire_spec(&device1, common, config)?;
            let spec2 = acquire_spec(&device2, common, config)?;
            println!(
                "Acquiring both points ({} and {})...",
                spec1.device, spec2.device
            );
            let coordinator = FixCoordinator::new(scheduler);
            let (fix1, fix2) = coordinator.acquire_pair(&spec1, &spec2).await?;
            println!(
                "Fix 1 from {}: {}, {}",
                fix1.source_id, fix1.point.longitude, fix1.point.latitude
            );
            println!(
                "Fix 2 from {}: {}, {}",
                fix2.source_id, fix2.point.longitude, fix2.point.latitude
            );
            Ok((fix1.point, fix2.point))
        }
        ((port1, manual1), (port2, manual2)) => {
            let p1 = resolve_point(port1, manual1, common, config, Arc::clone(&scheduler)).await?;
            let p2 = resolve_point(port2, manual2, common, config, scheduler).await?;
            Ok((p1, p2))
        }
    }
}
