//! Spell duration classification for a single pixel.
//!
//! Two equivalent implementations live here:
//!
//! - [`classify`] rescans the trailing window ending at the reference day.
//! - [`SpellState`] keeps a per-pixel shift register of the last ten flags and
//!   answers the same question in O(1) as each new day arrives.
//!
//! Both treat `NoData` as not flagged.
//!
//! # Rules
//!
//! **5-day window**: the trailing run of flagged days ending on day 5. A run of
//! 3 or more is reported as its length (capped at 5); shorter runs, and runs
//! that ended before day 5, report 0.
//!
//! **10-day window**: days 1-5 must all be flagged (the trigger). If they are,
//! the trailing run over days 5-10 is reported (1-6), or 0 when day 10 is not
//! flagged. Without the trigger the result is 0.

use crate::error::{Result, SpellError};
use crate::types::{ExceedanceFlag, WindowLength};

/// Shortest run the 5-day rule reports.
pub const MIN_SPELL_DAYS: usize = 3;

/// Days 1-5 of the 10-day window that must all be flagged.
const TRIGGER_DAYS: usize = 5;

/// Classify the trailing window of `window_length` flags ending at the last
/// element of `flags` (the reference day).
///
/// Fails with `InvalidWindowLength` for lengths other than 5 or 10 and with
/// `InsufficientHistory` when `flags` is shorter than the window.
pub fn classify(flags: &[ExceedanceFlag], window_length: usize) -> Result<u8> {
    let window = WindowLength::try_from(window_length)?;
    classify_window(flags, window)
}

/// [`classify`] with an already validated window.
pub fn classify_window(flags: &[ExceedanceFlag], window: WindowLength) -> Result<u8> {
    let len = window.days();
    if flags.len() < len {
        return Err(SpellError::InsufficientHistory {
            required: len,
            available: flags.len(),
        });
    }

    let window_flags = &flags[flags.len() - len..];
    Ok(match window {
        WindowLength::Five => base_rule(window_flags),
        WindowLength::Ten => extension_rule(window_flags),
    })
}

fn trailing_run(flags: &[ExceedanceFlag]) -> usize {
    flags.iter().rev().take_while(|f| f.is_flagged()).count()
}

fn base_rule(flags: &[ExceedanceFlag]) -> u8 {
    let run = trailing_run(flags);
    if run >= MIN_SPELL_DAYS {
        run.min(WindowLength::Five.days()) as u8
    } else {
        0
    }
}

/// Only a run that is still active on day 10 counts. A run that starts on
/// day 5 and ends before day 10 is not measured and reports 0.
fn extension_rule(flags: &[ExceedanceFlag]) -> u8 {
    if !flags[..TRIGGER_DAYS].iter().all(|f| f.is_flagged()) {
        return 0;
    }
    // sub-window days 5..=10
    trailing_run(&flags[TRIGGER_DAYS - 1..]) as u8
}

/// Incremental per-pixel classifier state.
///
/// Bit `k` of `history` holds the flag of the day `k` days before the most
/// recent one. The low bits give the current trailing run; bits 5-9 give the
/// trigger of the 10-day rule. Days must be pushed in chronological order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellState {
    history: u16,
    days_seen: u8,
}

impl SpellState {
    const HISTORY_DAYS: u8 = 10;
    const HISTORY_MASK: u16 = (1 << Self::HISTORY_DAYS) - 1;
    const FIVE_DAY_MASK: u16 = 0b1_1111;
    const EXTENSION_MASK: u16 = 0b11_1111;

    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one day.
    #[inline]
    pub fn push(&mut self, flag: ExceedanceFlag) {
        self.history = ((self.history << 1) | u16::from(flag.is_flagged())) & Self::HISTORY_MASK;
        self.days_seen = (self.days_seen + 1).min(Self::HISTORY_DAYS);
    }

    /// Days pushed so far, saturating at ten.
    pub fn days_seen(&self) -> usize {
        usize::from(self.days_seen)
    }

    /// Consecutive flagged days ending today, up to ten.
    pub fn trailing_run(&self) -> u8 {
        self.history.trailing_ones() as u8
    }

    /// Whether days 1-5 of the current 10-day window were all flagged.
    pub fn trigger_met(&self) -> bool {
        (self.history >> TRIGGER_DAYS) & Self::FIVE_DAY_MASK == Self::FIVE_DAY_MASK
    }

    /// Duration for the window ending on the most recent day.
    #[inline]
    pub fn duration(&self, window: WindowLength) -> Result<u8> {
        if self.days_seen() < window.days() {
            return Err(SpellError::InsufficientHistory {
                required: window.days(),
                available: self.days_seen(),
            });
        }
        Ok(self.duration_unchecked(window))
    }

    /// Duration assuming a full window has been pushed.
    #[inline]
    pub(crate) fn duration_unchecked(&self, window: WindowLength) -> u8 {
        match window {
            WindowLength::Five => {
                let run = (self.history & Self::FIVE_DAY_MASK).trailing_ones() as usize;
                if run >= MIN_SPELL_DAYS {
                    run as u8
                } else {
                    0
                }
            }
            WindowLength::Ten => {
                if self.trigger_met() {
                    (self.history & Self::EXTENSION_MASK).trailing_ones() as u8
                } else {
                    0
                }
            }
        }
    }
}
