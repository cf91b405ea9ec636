//! Marine heatwave and cold spell duration engine.
//!
//! Turns daily sea surface temperature grids into per-pixel exceedance flags
//! against day-of-year percentile climatologies, then into rolling spell
//! durations:
//!
//! - **Flagging**: warm when temperature is above the high percentile, cold
//!   when below the low percentile, `NoData` when either value is missing.
//! - **Classification**: a 5-day window reports the active trailing run once
//!   it reaches 3 days; a 10-day window reports how far a spell established
//!   over the first 5 days has extended and is still running.
//! - **Compositing**: every reference day of the series is classified, with
//!   an explicit policy for the lead-in days that lack a full window.
//!
//! # Architecture
//!
//! ```text
//! temperature + low/high climatology
//!      │
//!      ▼
//! ExceedanceFlagger::flag ──► warm_flags / cold_flags
//!      │
//!      ▼
//! RollingCompositor::run
//!      │
//!      ├─► per day, per spatial tile (rayon)
//!      │       └─► SpellState::push + duration
//!      │
//!      └─► DurationSeries (warmspelldur / coldspelldur)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use spell_engine::{flag, composite, LeadInPolicy};
//!
//! let flags = flag(&sst, &p10, &p90)?;
//! let warm = composite(&flags.warm, 5, LeadInPolicy::Fill)?;
//! ```

pub mod classifier;
pub mod compositor;
pub mod config;
pub mod error;
pub mod flagger;
pub mod pipeline;
pub mod tiles;
pub mod types;

// Re-export commonly used types at crate root
pub use classifier::{classify, classify_window, SpellState, MIN_SPELL_DAYS};
pub use compositor::{
    cold_spell_duration, composite, warm_spell_duration, RollingCompositor,
    DEFAULT_DURATION_VARIABLE,
};
pub use config::{parse_spell_types, SpellConfig};
pub use error::{Result, SpellError};
pub use flagger::{flag, ExceedanceFlagger, ExceedanceFlags};
pub use pipeline::{DurationSummary, SpellPipeline, SpellReport, SpellSeries};
pub use tiles::TilePlan;
pub use types::{
    DurationSeries, ExceedanceFlag, FlagGrid, LeadInPolicy, SpellDuration, SpellType, WindowLength,
};
