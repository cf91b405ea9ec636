//! Daily exceedance flags from temperature and percentile climatologies.

use spell_common::{ClimatologyGrid, DayOfYear, Grid, TemperatureGrid};
use tracing::{debug, instrument};

use crate::error::{Result, SpellError};
use crate::tiles::TilePlan;
use crate::types::{ExceedanceFlag, FlagGrid, SpellType};

/// Warm and cold flag grids derived from the same temperature grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceedanceFlags {
    pub warm: FlagGrid,
    pub cold: FlagGrid,
}

impl ExceedanceFlags {
    pub fn get(&self, spell: SpellType) -> &FlagGrid {
        match spell {
            SpellType::Warm => &self.warm,
            SpellType::Cold => &self.cold,
        }
    }
}

/// Compares temperature against low/high day-of-year percentile thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ExceedanceFlagger {
    parallel: bool,
}

impl Default for ExceedanceFlagger {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ExceedanceFlagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process day planes on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Flag every (day, row, col) of `temperature`.
    ///
    /// Warm is flagged when temperature exceeds the high threshold, cold when
    /// it falls below the low threshold. A missing temperature or threshold
    /// yields `NoData`. Every temperature day must have a climatology entry
    /// for its day of year in both climatologies.
    #[instrument(skip_all, fields(days = temperature.steps(), rows = temperature.nrows(), cols = temperature.ncols()))]
    pub fn flag(
        &self,
        temperature: &TemperatureGrid,
        low: &ClimatologyGrid,
        high: &ClimatologyGrid,
    ) -> Result<ExceedanceFlags> {
        check_spatial("low", temperature, low)?;
        check_spatial("high", temperature, high)?;

        let thresholds = temperature
            .labels()
            .iter()
            .map(|&date| {
                let doy = DayOfYear::of(date);
                let mismatch = || SpellError::ClimatologyMismatch {
                    date,
                    day_of_year: doy.get(),
                };
                let low_plane = low
                    .position(doy)
                    .and_then(|i| low.plane(i))
                    .ok_or_else(mismatch)?;
                let high_plane = high
                    .position(doy)
                    .and_then(|i| high.plane(i))
                    .ok_or_else(mismatch)?;
                Ok((low_plane, high_plane))
            })
            .collect::<Result<Vec<_>>>()?;

        let plane_len = temperature.plane_len();
        let mut warm = vec![ExceedanceFlag::NoData; temperature.data().len()];
        let mut cold = vec![ExceedanceFlag::NoData; temperature.data().len()];

        {
            // one tile per day
            let plan = TilePlan::new(temperature.steps(), 1, 1, self.parallel);
            let days: Vec<usize> = (0..temperature.steps()).collect();
            let mut warm_days: Vec<&mut [ExceedanceFlag]> = warm.chunks_mut(plane_len).collect();
            let mut cold_days: Vec<&mut [ExceedanceFlag]> = cold.chunks_mut(plane_len).collect();

            plan.for_each_zip(&days, &mut warm_days, &mut cold_days, |day, warm_tile, cold_tile| {
                for ((&d, warm_plane), cold_plane) in day.iter().zip(warm_tile).zip(cold_tile) {
                    let (low_plane, high_plane) = thresholds[d];
                    let temps = &temperature.data()[d * plane_len..(d + 1) * plane_len];
                    flag_plane(temps, high_plane, warm_plane, |t, h| t > h);
                    flag_plane(temps, low_plane, cold_plane, |t, l| t < l);
                }
            });
        }

        let warm = Grid::new(
            SpellType::Warm.flag_variable(),
            temperature.labels().to_vec(),
            temperature.spatial().clone(),
            warm,
        )?;
        let cold = Grid::new(
            SpellType::Cold.flag_variable(),
            temperature.labels().to_vec(),
            temperature.spatial().clone(),
            cold,
        )?;

        debug!(
            warm_flagged = count_flagged(&warm),
            cold_flagged = count_flagged(&cold),
            "Exceedance flags computed"
        );

        Ok(ExceedanceFlags { warm, cold })
    }
}

/// Flag with the default (parallel) flagger.
pub fn flag(
    temperature: &TemperatureGrid,
    low: &ClimatologyGrid,
    high: &ClimatologyGrid,
) -> Result<ExceedanceFlags> {
    ExceedanceFlagger::default().flag(temperature, low, high)
}

fn check_spatial(name: &str, temperature: &TemperatureGrid, climatology: &ClimatologyGrid) -> Result<()> {
    if temperature.same_spatial(climatology) {
        return Ok(());
    }
    Err(SpellError::spatial_mismatch(format!(
        "temperature is {}x{}, {} climatology is {}x{} or has different coordinates",
        temperature.nrows(),
        temperature.ncols(),
        name,
        climatology.nrows(),
        climatology.ncols()
    )))
}

#[inline]
fn flag_plane(
    temps: &[f32],
    thresholds: &[f32],
    out: &mut [ExceedanceFlag],
    exceeds: impl Fn(f32, f32) -> bool,
) {
    for ((&t, &threshold), flag) in temps.iter().zip(thresholds).zip(out.iter_mut()) {
        *flag = if t.is_nan() || threshold.is_nan() {
            ExceedanceFlag::NoData
        } else {
            ExceedanceFlag::from_exceedance(Some(exceeds(t, threshold)))
        };
    }
}

fn count_flagged(grid: &FlagGrid) -> usize {
    grid.data().iter().filter(|f| f.is_flagged()).count()
}
