//! Rolling spell-duration series over a flag time series.
//!
//! Each pixel carries a [`SpellState`] that is advanced one day at a time in
//! chronological order. Within a day, pixels are independent and are processed
//! in spatial tiles, optionally on the rayon pool.

use chrono::NaiveDate;
use spell_common::{is_next_day, Grid};
use tracing::{debug, info, instrument, warn};

use crate::classifier::SpellState;
use crate::error::{Result, SpellError};
use crate::tiles::TilePlan;
use crate::types::{
    DurationSeries, ExceedanceFlag, FlagGrid, LeadInPolicy, SpellDuration, SpellType, WindowLength,
};

/// Variable name used when the flag grid does not name a spell type.
pub const DEFAULT_DURATION_VARIABLE: &str = "spelldur";

/// Drives the classifier across every reference day of a flag series.
#[derive(Debug, Clone)]
pub struct RollingCompositor {
    window: WindowLength,
    lead_in: LeadInPolicy,
    spell: Option<SpellType>,
    parallel: bool,
    tile_rows: usize,
}

impl RollingCompositor {
    /// Fails with `InvalidWindowLength` unless `window_length` is 5 or 10.
    pub fn new(window_length: usize, lead_in: LeadInPolicy) -> Result<Self> {
        Ok(Self {
            window: WindowLength::try_from(window_length)?,
            lead_in,
            spell: None,
            parallel: true,
            tile_rows: 0,
        })
    }

    /// Label the output for a spell type instead of inferring it from the
    /// flag variable name.
    pub fn spell(mut self, spell: SpellType) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rows per spatial tile; 0 derives it from the thread count.
    pub fn tile_rows(mut self, tile_rows: usize) -> Self {
        self.tile_rows = tile_rows;
        self
    }

    pub fn window(&self) -> WindowLength {
        self.window
    }

    pub fn lead_in(&self) -> LeadInPolicy {
        self.lead_in
    }

    /// Compute the duration series of `flags`.
    ///
    /// Output is stamped at each window's reference (last) day. Under
    /// [`LeadInPolicy::Fill`] the first `window - 1` days are `NoData`; under
    /// [`LeadInPolicy::Omit`] they are left out.
    #[instrument(skip_all, fields(window = %self.window, lead_in = %self.lead_in, days = flags.steps()))]
    pub fn run(&self, flags: &FlagGrid) -> Result<DurationSeries> {
        if flags.is_empty() {
            return Err(SpellError::EmptyInput);
        }
        check_daily(flags.labels())?;

        let window = self.window.days();
        let plane_len = flags.plane_len();
        let lead_in_days = (window - 1).min(flags.steps());
        let skipped = match self.lead_in {
            LeadInPolicy::Fill => 0,
            LeadInPolicy::Omit => lead_in_days,
        };
        let out_steps = flags.steps() - skipped;

        if flags.steps() < window {
            warn!(
                required = window,
                available = flags.steps(),
                "Series shorter than window, no day can be classified"
            );
        }

        let plan = TilePlan::new(flags.nrows(), flags.ncols(), self.tile_rows, self.parallel);
        debug!(
            tile_len = plan.tile_len(),
            tiles = plan.tile_count(plane_len),
            parallel = plan.is_parallel(),
            "Tiling flag planes"
        );

        let mut states = vec![SpellState::new(); plane_len];
        let mut durations = vec![SpellDuration::NoData; out_steps * plane_len];
        let mut out_planes = durations.chunks_mut(plane_len);

        for (day, flag_plane) in flags.planes().enumerate() {
            if day < lead_in_days {
                advance(&plan, flag_plane, &mut states);
                if self.lead_in == LeadInPolicy::Fill {
                    // stays NoData
                    out_planes.next();
                }
                continue;
            }

            if let Some(out_plane) = out_planes.next() {
                classify_day(&plan, self.window, flag_plane, &mut states, out_plane);
            }
        }

        let labels = flags.labels()[skipped..].to_vec();
        let series = Grid::new(
            self.variable_for(flags),
            labels,
            flags.spatial().clone(),
            durations,
        )?;

        info!(
            variable = series.variable(),
            steps = series.steps(),
            active_cells = series.data().iter().filter(|d| d.is_active()).count(),
            "Duration series composited"
        );

        Ok(series)
    }

    fn variable_for(&self, flags: &FlagGrid) -> String {
        self.spell
            .or_else(|| spell_from_flag_variable(flags.variable()))
            .map(|spell| spell.variable_name().to_string())
            .unwrap_or_else(|| DEFAULT_DURATION_VARIABLE.to_string())
    }
}

fn spell_from_flag_variable(variable: &str) -> Option<SpellType> {
    SpellType::ALL
        .into_iter()
        .find(|spell| spell.flag_variable() == variable)
}

fn check_daily(labels: &[NaiveDate]) -> Result<()> {
    for pair in labels.windows(2) {
        if !is_next_day(pair[0], pair[1]) {
            return Err(SpellError::NonDailyTimeAxis {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

fn advance(plan: &TilePlan, flags: &[ExceedanceFlag], states: &mut [SpellState]) {
    plan.for_each_pair(flags, states, |flag_tile, state_tile| {
        for (state, &flag) in state_tile.iter_mut().zip(flag_tile) {
            state.push(flag);
        }
    });
}

fn classify_day(
    plan: &TilePlan,
    window: WindowLength,
    flags: &[ExceedanceFlag],
    states: &mut [SpellState],
    out: &mut [SpellDuration],
) {
    plan.for_each_zip(flags, states, out, |flag_tile, state_tile, out_tile| {
        for ((state, &flag), duration) in state_tile.iter_mut().zip(flag_tile).zip(out_tile) {
            state.push(flag);
            *duration = SpellDuration::from_days(state.duration_unchecked(window));
        }
    });
}

/// Composite with the default (parallel) settings.
pub fn composite(
    flags: &FlagGrid,
    window_length: usize,
    lead_in: LeadInPolicy,
) -> Result<DurationSeries> {
    RollingCompositor::new(window_length, lead_in)?.run(flags)
}

/// Warm spell duration series, labelled `warmspelldur`.
pub fn warm_spell_duration(
    flags: &FlagGrid,
    window_length: usize,
    lead_in: LeadInPolicy,
) -> Result<DurationSeries> {
    RollingCompositor::new(window_length, lead_in)?
        .spell(SpellType::Warm)
        .run(flags)
}

/// Cold spell duration series, labelled `coldspelldur`.
pub fn cold_spell_duration(
    flags: &FlagGrid,
    window_length: usize,
    lead_in: LeadInPolicy,
) -> Result<DurationSeries> {
    RollingCompositor::new(window_length, lead_in)?
        .spell(SpellType::Cold)
        .run(flags)
}
