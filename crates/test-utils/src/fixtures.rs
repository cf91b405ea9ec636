//! Common test fixtures for spell-duration tests.
//!
//! Temperatures are in degrees Celsius and chosen so that the constant
//! thresholds below classify them unambiguously.

/// Low (10th) percentile threshold used by the constant climatologies.
pub const P10_SST: f32 = 12.0;

/// High (90th) percentile threshold used by the constant climatologies.
pub const P90_SST: f32 = 18.0;

/// Temperature between both thresholds.
pub const NORMAL_SST: f32 = 15.0;

/// Temperature above the high threshold.
pub const WARM_SST: f32 = 21.5;

/// Temperature below the low threshold.
pub const COLD_SST: f32 = 8.25;

/// Area of interest bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// North-west European shelf seas.
    pub const NW_SHELF: (f64, f64, f64, f64) = (-10.4, 44.8, 10.4, 65.6);

    /// Southern North Sea.
    pub const SOUTHERN_NORTH_SEA: (f64, f64, f64, f64) = (0.0, 51.0, 9.0, 56.0);
}

/// Daily flag patterns (1 = exceedance) with a known outcome.
pub mod patterns {
    /// 5-day window ending in a 3-day run: duration 3.
    pub const FIVE_DAY_RUN_OF_THREE: [u8; 5] = [0, 0, 1, 1, 1];

    /// 5-day window whose run ended the day before: duration 0.
    pub const FIVE_DAY_ENDED_RUN: [u8; 5] = [1, 1, 1, 1, 0];

    /// Full 5-day window: duration 5.
    pub const FIVE_DAY_FULL: [u8; 5] = [1, 1, 1, 1, 1];

    /// 10-day window, spell established over days 1-5 and still running on
    /// days 9-10 after a break: duration 2.
    pub const TEN_DAY_RESUMED: [u8; 10] = [1, 1, 1, 1, 1, 1, 0, 0, 1, 1];

    /// 10-day window whose first five days are not all flagged: duration 0.
    pub const TEN_DAY_NO_TRIGGER: [u8; 10] = [1, 1, 1, 1, 0, 1, 1, 1, 1, 1];

    /// Twelve-day heatwave: onset on day 3, ends after day 10.
    pub const TWELVE_DAY_EVENT: [u8; 12] = [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0];
}
