//! Marine heatwave and cold spell duration runner.
//!
//! Reads a daily SST grid and the low/high percentile climatologies from JSON
//! grid files and writes:
//! - Warm and cold exceedance flags
//! - Rolling spell durations per spell type
//! - A summary of each duration series

mod io;
mod runner;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spell_common::BoundingBox;
use spell_engine::{LeadInPolicy, SpellType};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use runner::RunPaths;
use settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "spell-runner")]
#[command(about = "Compute marine heatwave and cold spell durations from gridded SST")]
struct Args {
    /// Daily temperature grid (JSON)
    #[arg(long, env = "SPELL_TEMPERATURE")]
    temperature: PathBuf,

    /// Low percentile climatology by day of year (JSON)
    #[arg(long, env = "SPELL_LOW_CLIMATOLOGY")]
    low_climatology: PathBuf,

    /// High percentile climatology by day of year (JSON)
    #[arg(long, env = "SPELL_HIGH_CLIMATOLOGY")]
    high_climatology: PathBuf,

    /// Directory for output files
    #[arg(long, env = "SPELL_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// YAML configuration file
    #[arg(long, env = "SPELL_CONFIG")]
    config: Option<PathBuf>,

    /// Classification window in days (5 or 10)
    #[arg(long)]
    window: Option<usize>,

    /// Lead-in days without a full window: fill or omit
    #[arg(long)]
    lead_in: Option<LeadInPolicy>,

    /// Spell type to compute (repeatable, default: warm and cold)
    #[arg(long = "spell")]
    spells: Vec<SpellType>,

    /// Area of interest as min_lon,min_lat,max_lon,max_lat
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Rows per spatial tile (0 = derive from thread count)
    #[arg(long)]
    tile_rows: Option<usize>,

    /// Disable parallel tile processing
    #[arg(long)]
    sequential: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            window_length: self.window,
            lead_in: self.lead_in,
            spell_types: self.spells.clone(),
            bbox: self.bbox,
            tile_rows: self.tile_rows,
            sequential: self.sequential,
        }
    }

    fn paths(&self) -> RunPaths {
        RunPaths {
            temperature: self.temperature.clone(),
            low_climatology: self.low_climatology.clone(),
            high_climatology: self.high_climatology.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    BoundingBox::from_csv(s).map_err(|e| e.to_string())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    info!("Starting spell runner");

    let config = settings::resolve(args.config.as_deref(), &args.overrides())?;
    let output = runner::run(&args.paths(), config).await?;

    info!(
        days = output.days,
        pixels = output.pixels,
        output_dir = %args.output_dir.display(),
        "Spell durations written"
    );
    for path in &output.written {
        info!(path = %path.display(), "Output");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::try_parse_from([
            "spell-runner",
            "--temperature",
            "sst.json",
            "--low-climatology",
            "p10.json",
            "--high-climatology",
            "p90.json",
            "--window",
            "10",
            "--lead-in",
            "omit",
            "--spell",
            "cold",
            "--bbox=-10.4,44.8,10.4,65.6",
            "--sequential",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(overrides.window_length, Some(10));
        assert_eq!(overrides.lead_in, Some(LeadInPolicy::Omit));
        assert_eq!(overrides.spell_types, vec![SpellType::Cold]);
        assert_eq!(overrides.bbox, Some(BoundingBox::new(-10.4, 44.8, 10.4, 65.6)));
        assert!(overrides.sequential);
        assert_eq!(args.paths().high_climatology, PathBuf::from("p90.json"));
    }

    #[test]
    fn test_args_reject_bad_bbox() {
        let result = Args::try_parse_from([
            "spell-runner",
            "--temperature",
            "sst.json",
            "--low-climatology",
            "p10.json",
            "--high-climatology",
            "p90.json",
            "--bbox",
            "10,0,5,1",
        ]);
        assert!(result.is_err());
    }
}
