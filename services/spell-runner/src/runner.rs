//! One batch run: load inputs, compute on the blocking pool, write outputs.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use spell_engine::{SpellConfig, SpellPipeline};
use tracing::info;

use crate::io;

/// Input and output locations of a run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub temperature: PathBuf,
    pub low_climatology: PathBuf,
    pub high_climatology: PathBuf,
    pub output_dir: PathBuf,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutput {
    pub written: Vec<PathBuf>,
    pub days: usize,
    pub pixels: usize,
}

pub async fn run(paths: &RunPaths, config: SpellConfig) -> Result<RunOutput> {
    let start = Instant::now();
    let pipeline = SpellPipeline::new(config)?;

    let (temperature, low, high) = tokio::try_join!(
        io::read_temperature(&paths.temperature),
        io::read_climatology(&paths.low_climatology),
        io::read_climatology(&paths.high_climatology),
    )?;

    let days = temperature.steps();
    info!(
        days,
        rows = temperature.nrows(),
        cols = temperature.ncols(),
        "Loaded inputs"
    );

    // Flagging and compositing are CPU-bound
    let report = tokio::task::spawn_blocking(move || pipeline.run(&temperature, &low, &high))
        .await
        .context("Spell computation panicked")??;

    let pixels = report
        .durations
        .first()
        .map_or(report.flags.warm.plane_len(), |s| s.series.plane_len());
    let written = io::write_report(&paths.output_dir, &report).await?;

    info!(
        days,
        pixels,
        files = written.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Run complete"
    );
    Ok(RunOutput {
        written,
        days,
        pixels,
    })
}
