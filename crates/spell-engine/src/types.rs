//! Core value types for spell detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spell_common::TimeGrid;

use crate::error::SpellError;

/// Per-pixel daily exceedance flags for one spell type.
pub type FlagGrid = TimeGrid<ExceedanceFlag>;

/// Per-pixel spell durations stamped at each window's reference day.
pub type DurationSeries = TimeGrid<SpellDuration>;

/// Whether a pixel crossed its climatological threshold on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceedanceFlag {
    Flagged,
    NotFlagged,
    /// Temperature or threshold missing.
    #[default]
    NoData,
}

impl ExceedanceFlag {
    /// Build from a threshold comparison, `None` meaning missing inputs.
    pub fn from_exceedance(exceeds: Option<bool>) -> Self {
        match exceeds {
            Some(true) => Self::Flagged,
            Some(false) => Self::NotFlagged,
            None => Self::NoData,
        }
    }

    /// Run-length view of the flag: `NoData` counts as not flagged.
    pub fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Rendered as 1.0 when flagged and NaN otherwise.
    pub fn as_f32(self) -> f32 {
        if self.is_flagged() {
            1.0
        } else {
            f32::NAN
        }
    }
}

/// Qualified spell duration of a pixel on a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellDuration {
    /// No full window exists for the reference day (lead-in).
    #[default]
    NoData,
    /// The qualification rule is not met.
    NotQualified,
    /// Qualified duration in days, always > 0.
    Days(u8),
}

impl SpellDuration {
    /// Wrap a classifier result; zero becomes `NotQualified`.
    pub fn from_days(days: u8) -> Self {
        if days == 0 {
            Self::NotQualified
        } else {
            Self::Days(days)
        }
    }

    /// The duration when qualified.
    pub fn value(self) -> Option<u8> {
        match self {
            Self::Days(days) => Some(days),
            Self::NoData | Self::NotQualified => None,
        }
    }

    /// Duration with both absent classes as zero.
    pub fn days(self) -> u8 {
        self.value().unwrap_or(0)
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Days(_))
    }

    /// Rendered as the day count, NaN when absent.
    pub fn as_f32(self) -> f32 {
        self.value().map_or(f32::NAN, f32::from)
    }
}

/// Supported classification windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLength {
    /// Base rule: trailing run of at least 3 days ending on the reference day.
    Five,
    /// Extension rule: a 5-day spell established at day 5 still running.
    Ten,
}

impl WindowLength {
    /// Window length in days.
    pub fn days(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
        }
    }

    /// Largest duration the rule can report.
    pub fn max_duration(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Ten => 6,
        }
    }
}

impl TryFrom<usize> for WindowLength {
    type Error = SpellError;

    fn try_from(days: usize) -> Result<Self, Self::Error> {
        match days {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(SpellError::InvalidWindowLength(other)),
        }
    }
}

impl fmt::Display for WindowLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

/// Anomaly direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellType {
    /// Marine heatwave: temperature above the high percentile.
    Warm,
    /// Cold spell: temperature below the low percentile.
    Cold,
}

impl SpellType {
    pub const ALL: [SpellType; 2] = [SpellType::Warm, SpellType::Cold];

    /// Output variable name of the duration series.
    pub fn variable_name(self) -> &'static str {
        match self {
            Self::Warm => "warmspelldur",
            Self::Cold => "coldspelldur",
        }
    }

    /// Variable name of the flag grid.
    pub fn flag_variable(self) -> &'static str {
        match self {
            Self::Warm => "warm_flags",
            Self::Cold => "cold_flags",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl FromStr for SpellType {
    type Err = SpellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warm" | "heatwave" | "mhw" => Ok(Self::Warm),
            "cold" | "coldspell" | "cs" => Ok(Self::Cold),
            other => Err(SpellError::config(format!("unknown spell type '{other}'"))),
        }
    }
}

impl fmt::Display for SpellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to emit for the first `window - 1` days, where no full window exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadInPolicy {
    /// Emit `NoData` planes, keeping the input time axis.
    #[default]
    Fill,
    /// Skip those days; the output starts at the first full window.
    Omit,
}

impl LeadInPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Omit => "omit",
        }
    }
}

impl FromStr for LeadInPolicy {
    type Err = SpellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fill" | "true" => Ok(Self::Fill),
            "omit" | "false" => Ok(Self::Omit),
            other => Err(SpellError::config(format!("unknown lead-in policy '{other}'"))),
        }
    }
}

impl fmt::Display for LeadInPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_length_from_days() {
        assert_eq!(WindowLength::try_from(5).unwrap(), WindowLength::Five);
        assert_eq!(WindowLength::try_from(10).unwrap(), WindowLength::Ten);
        assert_eq!(
            WindowLength::try_from(7).unwrap_err(),
            SpellError::InvalidWindowLength(7)
        );
        assert_eq!(WindowLength::Ten.days(), 10);
        assert_eq!(WindowLength::Ten.max_duration(), 6);
    }

    #[test]
    fn test_spell_duration_rendering() {
        assert_eq!(SpellDuration::from_days(0), SpellDuration::NotQualified);
        assert_eq!(SpellDuration::from_days(4), SpellDuration::Days(4));
        assert_eq!(SpellDuration::Days(4).value(), Some(4));
        assert_eq!(SpellDuration::NoData.days(), 0);
        assert!(SpellDuration::NotQualified.as_f32().is_nan());
        assert_eq!(SpellDuration::Days(3).as_f32(), 3.0);
    }

    #[test]
    fn test_exceedance_flag() {
        assert_eq!(ExceedanceFlag::from_exceedance(Some(true)), ExceedanceFlag::Flagged);
        assert_eq!(ExceedanceFlag::from_exceedance(None), ExceedanceFlag::NoData);
        assert!(!ExceedanceFlag::NoData.is_flagged());
        assert!(ExceedanceFlag::NotFlagged.as_f32().is_nan());
        assert_eq!(ExceedanceFlag::Flagged.as_f32(), 1.0);
    }

    #[test]
    fn test_spell_type_from_str() {
        assert_eq!("WARM".parse::<SpellType>().unwrap(), SpellType::Warm);
        assert_eq!("cold".parse::<SpellType>().unwrap(), SpellType::Cold);
        assert!("tepid".parse::<SpellType>().is_err());
        assert_eq!(SpellType::Cold.variable_name(), "coldspelldur");
        assert_eq!(SpellType::Warm.flag_variable(), "warm_flags");
    }

    #[test]
    fn test_lead_in_from_str() {
        assert_eq!("Fill".parse::<LeadInPolicy>().unwrap(), LeadInPolicy::Fill);
        assert_eq!("omit".parse::<LeadInPolicy>().unwrap(), LeadInPolicy::Omit);
        assert!("drop".parse::<LeadInPolicy>().is_err());
        assert_eq!(LeadInPolicy::default().to_string(), "fill");
    }
}
