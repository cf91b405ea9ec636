//! Error types for spell detection.

use chrono::NaiveDate;
use spell_common::GridError;
use thiserror::Error;

/// Hard failures of the flagging and duration computations.
///
/// Missing pixels are not errors; they travel through the computation as
/// `NoData` values. Every variant here aborts the whole request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpellError {
    /// Only 5- and 10-day windows have qualification rules.
    #[error("invalid window length {0}: must be 5 or 10")]
    InvalidWindowLength(usize),

    /// The window ending at the reference day reaches before the first flag.
    #[error("insufficient history: window needs {required} days, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    /// No climatology entry for a temperature day's day of year.
    #[error("no climatology entry for day of year {day_of_year} (date {date})")]
    ClimatologyMismatch { date: NaiveDate, day_of_year: u16 },

    /// The flag series has no time steps.
    #[error("empty input: flag series has no time steps")]
    EmptyInput,

    /// Temperature and climatology cover different spatial axes.
    #[error("spatial axes differ: {0}")]
    SpatialMismatch(String),

    /// Windows are calendar windows; consecutive steps must be one day apart.
    #[error("time axis is not daily: {previous} is followed by {next}")]
    NonDailyTimeAxis { previous: NaiveDate, next: NaiveDate },

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Grid construction failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl SpellError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a SpatialMismatch error.
    pub fn spatial_mismatch(msg: impl Into<String>) -> Self {
        Self::SpatialMismatch(msg.into())
    }
}

/// Result type for spell engine operations.
pub type Result<T> = std::result::Result<T, SpellError>;
