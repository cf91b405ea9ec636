//! JSON grid files.
//!
//! A grid file holds one variable on a leading axis of either calendar dates
//! (`time`) or days of year (`day_of_year`):
//!
//! ```json
//! {
//!   "variable": "analysed_sst",
//!   "kind": "latlon",
//!   "rows": [50.0, 49.0],
//!   "cols": [0.0, 1.0],
//!   "time": ["2021-07-01", "2021-07-02"],
//!   "values": [15.2, null, 14.9, 15.0, 15.1, 15.3, null, 14.8]
//! }
//! ```
//!
//! Values are flat `(lead, row, col)`; `null` marks a missing value.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use spell_common::{
    parse_date, AxisKind, ClimatologyGrid, DayOfYear, Grid, SpatialAxes, TemperatureGrid,
    TimeGrid,
};
use spell_engine::{DurationSeries, ExceedanceFlag, FlagGrid, SpellDuration, SpellReport};
use tracing::{debug, info};

/// On-disk representation of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFile<V = Option<f64>> {
    pub variable: String,
    #[serde(default)]
    pub kind: AxisKind,
    pub rows: Vec<f64>,
    pub cols: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_year: Option<Vec<u16>>,
    pub values: Vec<V>,
}

impl GridFile {
    /// Convert to a daily temperature grid.
    pub fn into_temperature(self) -> Result<TemperatureGrid> {
        let Some(time) = &self.time else {
            bail!("temperature file '{}' has no time axis", self.variable);
        };
        let dates = time
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid time axis in '{}'", self.variable))?;

        let spatial = SpatialAxes::new(self.kind, self.rows, self.cols)?;
        let data = self.values.into_iter().map(to_f32).collect();
        Ok(Grid::new(self.variable, dates, spatial, data)?)
    }

    /// Convert to a day-of-year climatology grid.
    pub fn into_climatology(self) -> Result<ClimatologyGrid> {
        let Some(days) = &self.day_of_year else {
            bail!("climatology file '{}' has no day_of_year axis", self.variable);
        };
        let days = days
            .iter()
            .map(|&d| DayOfYear::new(d))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid day_of_year axis in '{}'", self.variable))?;

        let spatial = SpatialAxes::new(self.kind, self.rows, self.cols)?;
        let data = self.values.into_iter().map(to_f32).collect();
        Ok(Grid::new(self.variable, days, spatial, data)?)
    }
}

impl<V> GridFile<V> {
    /// Encode a daily grid, mapping each cell through `value`.
    pub fn from_time_grid<T>(grid: &TimeGrid<T>, value: impl Fn(&T) -> V) -> Self {
        Self {
            variable: grid.variable().to_string(),
            kind: grid.spatial().kind,
            rows: grid.spatial().rows().to_vec(),
            cols: grid.spatial().cols().to_vec(),
            time: Some(
                grid.labels()
                    .iter()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .collect(),
            ),
            day_of_year: None,
            values: grid.data().iter().map(value).collect(),
        }
    }
}

/// Flags as 1 (flagged), 0 (not flagged) or null (no data).
pub fn encode_flags(flags: &FlagGrid) -> GridFile<Option<u8>> {
    GridFile::from_time_grid(flags, |flag| match flag {
        ExceedanceFlag::Flagged => Some(1),
        ExceedanceFlag::NotFlagged => Some(0),
        ExceedanceFlag::NoData => None,
    })
}

/// Durations as day counts, 0 when not qualified and null for lead-in days.
pub fn encode_durations(series: &DurationSeries) -> GridFile<Option<u8>> {
    GridFile::from_time_grid(series, |duration| match duration {
        SpellDuration::NoData => None,
        SpellDuration::NotQualified => Some(0),
        SpellDuration::Days(days) => Some(*days),
    })
}

fn to_f32(value: Option<f64>) -> f32 {
    value.map_or(f32::NAN, |v| v as f32)
}

/// Read and parse a grid file.
pub async fn read_grid_file(path: &Path) -> Result<GridFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read grid file: {}", path.display()))?;
    let file: GridFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse grid file: {}", path.display()))?;
    debug!(
        path = %path.display(),
        variable = %file.variable,
        values = file.values.len(),
        "Loaded grid file"
    );
    Ok(file)
}

pub async fn read_temperature(path: &Path) -> Result<TemperatureGrid> {
    read_grid_file(path)
        .await?
        .into_temperature()
        .with_context(|| format!("Invalid temperature grid: {}", path.display()))
}

pub async fn read_climatology(path: &Path) -> Result<ClimatologyGrid> {
    read_grid_file(path)
        .await?
        .into_climatology()
        .with_context(|| format!("Invalid climatology grid: {}", path.display()))
}

/// Serialize `value` as pretty JSON to `path`.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write flags, duration series and summary of a run into `output_dir`.
///
/// Returns the written paths.
pub async fn write_report(output_dir: &Path, report: &SpellReport) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = Vec::new();

    for entry in &report.durations {
        let flags_path = output_dir.join(format!("flags_{}.json", entry.spell));
        write_json(&flags_path, &encode_flags(report.flags.get(entry.spell))).await?;
        written.push(flags_path);

        let series_path = output_dir.join(format!("{}.json", entry.series.variable()));
        write_json(&series_path, &encode_durations(&entry.series)).await?;
        written.push(series_path);
    }

    let summary_path = output_dir.join("summary.json");
    write_json(&summary_path, &report.summary()).await?;
    written.push(summary_path);

    info!(
        output_dir = %output_dir.display(),
        files = written.len(),
        "Wrote spell outputs"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TEMPERATURE_JSON: &str = r#"{
        "variable": "analysed_sst",
        "kind": "latlon",
        "rows": [50.0],
        "cols": [0.0, 1.0],
        "time": ["2021-07-01", "2021-07-02T12:00:00Z"],
        "values": [15.5, null, 14.0, 13.5]
    }"#;

    #[test]
    fn test_parse_temperature_file() {
        let file: GridFile = serde_json::from_str(TEMPERATURE_JSON).unwrap();
        let grid = file.into_temperature().unwrap();

        assert_eq!(grid.steps(), 2);
        assert_eq!(grid.labels()[1], NaiveDate::from_ymd_opt(2021, 7, 2).unwrap());
        assert_eq!(grid.spatial().kind, AxisKind::LatLon);
        assert_eq!(grid.get(0, 0, 0), Some(&15.5));
        assert!(grid.get(0, 0, 1).unwrap().is_nan());
    }

    #[test]
    fn test_temperature_requires_time_axis() {
        let json = r#"{"variable": "sst", "rows": [0], "cols": [0], "day_of_year": [1], "values": [1.0]}"#;
        let file: GridFile = serde_json::from_str(json).unwrap();
        assert!(file.into_temperature().is_err());
    }

    #[test]
    fn test_parse_climatology_file() {
        let json = r#"{"variable": "p90", "rows": [0, 1], "cols": [0], "day_of_year": [1, 366], "values": [18.0, 18.5, null, 19.0]}"#;
        let file: GridFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.kind, AxisKind::Index);

        let grid = file.into_climatology().unwrap();
        assert_eq!(grid.position(DayOfYear::new(366).unwrap()), Some(1));
        assert!(grid.get(1, 0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_climatology_rejects_bad_day() {
        let json = r#"{"variable": "p90", "rows": [0], "cols": [0], "day_of_year": [367], "values": [18.0]}"#;
        let file: GridFile = serde_json::from_str(json).unwrap();
        assert!(file.into_climatology().is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let json = r#"{"variable": "sst", "rows": [0], "cols": [0, 1], "time": ["2021-01-01"], "values": [1.0]}"#;
        let file: GridFile = serde_json::from_str(json).unwrap();
        let err = file.into_temperature().unwrap_err();
        assert!(err.to_string().contains("shape"), "{err}");
    }

    #[test]
    fn test_encode_durations() {
        let spatial = SpatialAxes::indexed(1, 3).unwrap();
        let series = Grid::new(
            "warmspelldur",
            vec![NaiveDate::from_ymd_opt(2021, 7, 5).unwrap()],
            spatial,
            vec![
                SpellDuration::NoData,
                SpellDuration::NotQualified,
                SpellDuration::Days(4),
            ],
        )
        .unwrap();

        let file = encode_durations(&series);
        assert_eq!(file.values, vec![None, Some(0), Some(4)]);
        assert_eq!(file.time.as_deref(), Some(&["2021-07-05".to_string()][..]));

        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("day_of_year").is_none());
        assert_eq!(json["values"], serde_json::json!([null, 0, 4]));
    }

    #[test]
    fn test_encode_flags() {
        let spatial = SpatialAxes::indexed(1, 3).unwrap();
        let flags = Grid::new(
            "warm_flags",
            vec![NaiveDate::from_ymd_opt(2021, 7, 5).unwrap()],
            spatial,
            vec![
                ExceedanceFlag::Flagged,
                ExceedanceFlag::NotFlagged,
                ExceedanceFlag::NoData,
            ],
        )
        .unwrap();
        assert_eq!(encode_flags(&flags).values, vec![Some(1), Some(0), None]);
    }

    #[tokio::test]
    async fn test_read_grid_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sst.json");
        tokio::fs::write(&path, TEMPERATURE_JSON).await.unwrap();

        let grid = read_temperature(&path).await.unwrap();
        assert_eq!(grid.variable(), "analysed_sst");

        let missing = read_temperature(&dir.path().join("missing.json")).await;
        assert!(missing.is_err());
    }
}
