//! End-to-end spell detection: flagging followed by rolling composites.

use serde::Serialize;
use spell_common::{ClimatologyGrid, TemperatureGrid};
use tracing::{info, info_span};

use crate::compositor::RollingCompositor;
use crate::config::SpellConfig;
use crate::error::Result;
use crate::flagger::{ExceedanceFlagger, ExceedanceFlags};
use crate::types::{DurationSeries, SpellDuration, SpellType};

/// Runs the flagger once and the compositor for each configured spell type.
#[derive(Debug, Clone)]
pub struct SpellPipeline {
    config: SpellConfig,
}

impl SpellPipeline {
    /// Create a pipeline, rejecting invalid configuration up front.
    pub fn new(config: SpellConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SpellConfig {
        &self.config
    }

    /// Flag `temperature` against the climatologies and composite durations.
    pub fn run(
        &self,
        temperature: &TemperatureGrid,
        low: &ClimatologyGrid,
        high: &ClimatologyGrid,
    ) -> Result<SpellReport> {
        let span = info_span!(
            "spell_pipeline",
            window = self.config.window_length,
            lead_in = %self.config.lead_in
        );
        let _enter = span.enter();

        let flags = match &self.config.bbox {
            Some(bbox) => {
                info!(?bbox, "Clipping grids to area of interest");
                let temperature = temperature.subset_bbox(bbox)?;
                let low = low.subset_bbox(bbox)?;
                let high = high.subset_bbox(bbox)?;
                self.flagger().flag(&temperature, &low, &high)?
            }
            None => self.flagger().flag(temperature, low, high)?,
        };

        let mut durations = Vec::with_capacity(self.config.spell_types.len());
        for &spell in &self.config.spell_types {
            let series = RollingCompositor::new(self.config.window_length, self.config.lead_in)?
                .spell(spell)
                .parallel(self.config.parallel)
                .tile_rows(self.config.tile_rows)
                .run(flags.get(spell))?;
            durations.push(SpellSeries { spell, series });
        }

        info!(series = durations.len(), "Spell pipeline finished");
        Ok(SpellReport { flags, durations })
    }

    fn flagger(&self) -> ExceedanceFlagger {
        ExceedanceFlagger::new().parallel(self.config.parallel)
    }
}

/// Duration series of one spell type.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellSeries {
    pub spell: SpellType,
    pub series: DurationSeries,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellReport {
    pub flags: ExceedanceFlags,
    pub durations: Vec<SpellSeries>,
}

impl SpellReport {
    /// Duration series for a spell type, if it was configured.
    pub fn duration(&self, spell: SpellType) -> Option<&DurationSeries> {
        self.durations
            .iter()
            .find(|s| s.spell == spell)
            .map(|s| &s.series)
    }

    /// Per-series summary statistics.
    pub fn summary(&self) -> Vec<DurationSummary> {
        self.durations
            .iter()
            .map(|s| DurationSummary::of(s.spell, &s.series))
            .collect()
    }
}

/// Summary statistics of a duration series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationSummary {
    pub spell: SpellType,
    pub variable: String,
    /// Time steps in the series.
    pub days: usize,
    /// Cells with a qualified duration, summed over all days.
    pub active_pixel_days: usize,
    /// Lead-in cells without a full window.
    pub no_data_cells: usize,
    pub max_duration: u8,
}

impl DurationSummary {
    pub fn of(spell: SpellType, series: &DurationSeries) -> Self {
        let mut active_pixel_days = 0;
        let mut no_data_cells = 0;
        let mut max_duration = 0;
        for &duration in series.data() {
            match duration {
                SpellDuration::Days(days) => {
                    active_pixel_days += 1;
                    max_duration = max_duration.max(days);
                }
                SpellDuration::NoData => no_data_cells += 1,
                SpellDuration::NotQualified => {}
            }
        }

        Self {
            spell,
            variable: series.variable().to_string(),
            days: series.steps(),
            active_pixel_days,
            no_data_cells,
            max_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpellError;
    use chrono::NaiveDate;
    use spell_common::{daily_range, BoundingBox, DayOfYear, Grid, SpatialAxes};

    fn grids(days: usize) -> (TemperatureGrid, ClimatologyGrid, ClimatologyGrid) {
        let spatial = SpatialAxes::lat_lon(vec![50.0, 49.0], vec![0.0, 1.0]).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, days as u32).unwrap();
        // pixel 0 always warm, pixel 3 always cold, the rest normal
        let temperature = Grid::new(
            "analysed_sst",
            daily_range(end, days),
            spatial.clone(),
            (0..days).flat_map(|_| [20.0, 15.0, 15.0, 10.0]).collect(),
        )
        .unwrap();
        let doys: Vec<DayOfYear> = DayOfYear::all().collect();
        let low = Grid::new("analysed_sst", doys.clone(), spatial.clone(), vec![12.0; 366 * 4]).unwrap();
        let high = Grid::new("analysed_sst", doys, spatial, vec![18.0; 366 * 4]).unwrap();
        (temperature, low, high)
    }

    #[test]
    fn test_pipeline_runs_both_spell_types() {
        let (temperature, low, high) = grids(12);
        let report = SpellPipeline::new(SpellConfig::default())
            .unwrap()
            .run(&temperature, &low, &high)
            .unwrap();

        let warm = report.duration(SpellType::Warm).unwrap();
        let cold = report.duration(SpellType::Cold).unwrap();
        assert_eq!(warm.variable(), "warmspelldur");
        assert_eq!(cold.variable(), "coldspelldur");
        assert_eq!(warm.get(11, 0, 0), Some(&SpellDuration::Days(5)));
        assert_eq!(warm.get(11, 1, 1), Some(&SpellDuration::NotQualified));
        assert_eq!(cold.get(11, 1, 1), Some(&SpellDuration::Days(5)));

        let summary = report.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].active_pixel_days, 8);
        assert_eq!(summary[0].no_data_cells, 16);
        assert_eq!(summary[0].max_duration, 5);
    }

    #[test]
    fn test_pipeline_applies_bbox() {
        let (temperature, low, high) = grids(6);
        let config = SpellConfig {
            spell_types: vec![SpellType::Warm],
            bbox: Some(BoundingBox::new(-0.5, 49.5, 0.5, 50.5)),
            ..SpellConfig::default()
        };
        let report = SpellPipeline::new(config)
            .unwrap()
            .run(&temperature, &low, &high)
            .unwrap();

        let warm = report.duration(SpellType::Warm).unwrap();
        assert_eq!(warm.plane_len(), 1);
        assert_eq!(warm.data()[5], SpellDuration::Days(5));
        assert!(report.duration(SpellType::Cold).is_none());
    }

    #[test]
    fn test_pipeline_rejects_bad_window() {
        let config = SpellConfig {
            window_length: 3,
            ..SpellConfig::default()
        };
        assert_eq!(
            SpellPipeline::new(config).unwrap_err(),
            SpellError::InvalidWindowLength(3)
        );
    }

    #[test]
    fn test_pipeline_rejects_duplicate_spell_types() {
        let config = SpellConfig {
            spell_types: vec![SpellType::Warm, SpellType::Warm],
            ..SpellConfig::default()
        };
        assert!(matches!(
            SpellPipeline::new(config),
            Err(SpellError::Config(_))
        ));
    }
}
