//! Test data generators for synthetic sea surface temperature grids.
//!
//! These generators create predictable, verifiable grids that can be used
//! across the test suite.

use chrono::{Duration, NaiveDate};
use spell_common::{ClimatologyGrid, DayOfYear, Grid, SpatialAxes, TemperatureGrid};

use crate::fixtures::{COLD_SST, NORMAL_SST, P10_SST, P90_SST, WARM_SST};

/// Variable name of generated temperature and climatology grids.
pub const SST_VARIABLE: &str = "analysed_sst";

/// `n` consecutive days starting at `start`.
pub fn consecutive_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// Constant climatology over all 366 days of year.
pub fn constant_climatology(spatial: &SpatialAxes, threshold: f32) -> ClimatologyGrid {
    let days: Vec<DayOfYear> = DayOfYear::all().collect();
    let data = vec![threshold; days.len() * spatial.plane_len()];
    Grid::new(SST_VARIABLE, days, spatial.clone(), data)
        .expect("constant climatology has a consistent shape")
}

/// The (low, high) constant climatology pair matching the fixture temperatures.
pub fn fixture_climatologies(spatial: &SpatialAxes) -> (ClimatologyGrid, ClimatologyGrid) {
    (
        constant_climatology(spatial, P10_SST),
        constant_climatology(spatial, P90_SST),
    )
}

/// Build a temperature grid from one daily pattern per pixel.
///
/// Pattern values: `1` warm, `-1` cold, `0` normal, any other value missing
/// (NaN). All patterns must have the same length. Pixels are row-major.
pub fn sst_from_patterns(
    start: NaiveDate,
    spatial: &SpatialAxes,
    patterns: &[Vec<i8>],
) -> TemperatureGrid {
    assert_eq!(
        patterns.len(),
        spatial.plane_len(),
        "one pattern per pixel is required"
    );
    let days = patterns.first().map_or(0, Vec::len);
    assert!(patterns.iter().all(|p| p.len() == days), "patterns must share a length");

    let mut data = Vec::with_capacity(days * patterns.len());
    for day in 0..days {
        for pattern in patterns {
            data.push(match pattern[day] {
                1 => WARM_SST,
                -1 => COLD_SST,
                0 => NORMAL_SST,
                _ => f32::NAN,
            });
        }
    }

    Grid::new(SST_VARIABLE, consecutive_days(start, days), spatial.clone(), data)
        .expect("pattern grid has a consistent shape")
}

/// Single-pixel warm pattern from 0/1 flags.
pub fn warm_pattern(bits: &[u8]) -> Vec<i8> {
    bits.iter().map(|&b| i8::from(b == 1)).collect()
}

/// Deterministic pseudo-random 0/1 sequence (64-bit LCG).
pub fn pseudo_random_bits(seed: u64, n: usize, percent_flagged: u8) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            u8::from(((state >> 33) % 100) < u64::from(percent_flagged))
        })
        .collect()
}

/// Creates a temperature grid with a seasonal cycle.
///
/// Values follow a cosine over the year peaking in mid-August, warmer towards
/// low latitudes (row 0 is the warmest row), ranging roughly 6 to 22 degC.
pub fn seasonal_sst_grid(start: NaiveDate, days: usize, rows: usize, cols: usize) -> TemperatureGrid {
    let spatial = SpatialAxes::indexed(rows, cols).expect("rows and cols must be > 0");
    let labels = consecutive_days(start, days);
    let mut data = Vec::with_capacity(days * rows * cols);
    for date in &labels {
        let doy = f32::from(DayOfYear::of(*date).get());
        let season = ((doy - 227.0) / 365.25 * std::f32::consts::TAU).cos();
        for row in 0..rows {
            let lat_factor = 1.0 - row as f32 / rows.max(1) as f32;
            let base = 10.0 + lat_factor * 6.0;
            for _col in 0..cols {
                data.push(base + season * 6.0);
            }
        }
    }
    Grid::new(SST_VARIABLE, labels, spatial, data).expect("seasonal grid has a consistent shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 1).unwrap()
    }

    #[test]
    fn test_sst_from_patterns_layout() {
        let spatial = SpatialAxes::indexed(1, 2).unwrap();
        let grid = sst_from_patterns(start(), &spatial, &[vec![1, 0, 9], vec![-1, -1, 0]]);
        assert_eq!(grid.steps(), 3);
        assert_eq!(grid.get(0, 0, 0), Some(&WARM_SST));
        assert_eq!(grid.get(0, 0, 1), Some(&COLD_SST));
        assert_eq!(grid.get(1, 0, 0), Some(&NORMAL_SST));
        assert!(grid.get(2, 0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_pseudo_random_bits_deterministic() {
        let a = pseudo_random_bits(7, 200, 60);
        let b = pseudo_random_bits(7, 200, 60);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| v <= 1));
        assert!(a.contains(&0) && a.contains(&1));
        assert!(pseudo_random_bits(1, 50, 0).iter().all(|&v| v == 0));
        assert!(pseudo_random_bits(1, 50, 100).iter().all(|&v| v == 1));
    }

    #[test]
    fn test_seasonal_grid_range() {
        let grid = seasonal_sst_grid(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), 365, 3, 2);
        let max = grid.data().iter().cloned().fold(f32::MIN, f32::max);
        let min = grid.data().iter().cloned().fold(f32::MAX, f32::min);
        assert!(max <= 22.0 && max > 20.0);
        assert!(min >= 5.9 && min < 8.0);
        // mid-August peak in the warmest row
        let aug_15 = grid.position(NaiveDate::from_ymd_opt(2021, 8, 15).unwrap()).unwrap();
        assert_approx_eq!(*grid.get(aug_15, 0, 0).unwrap(), 22.0, 0.01);
    }

    #[test]
    fn test_constant_climatology_covers_leap_day() {
        let spatial = SpatialAxes::indexed(2, 2).unwrap();
        let (low, high) = fixture_climatologies(&spatial);
        assert_eq!(low.steps(), 366);
        assert!(high.position(DayOfYear::new(366).unwrap()).is_some());
        assert_eq!(high.get(0, 1, 1), Some(&P90_SST));
    }
}
