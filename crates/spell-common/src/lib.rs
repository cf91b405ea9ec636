//! Common types shared across the spell-duration workspace.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{GridError, GridResult};
pub use grid::{
    AxisKind, AxisLabel, ClimatologyGrid, Grid, SpatialAxes, TemperatureGrid, TimeGrid,
};
pub use time::{daily_range, is_next_day, parse_date, DayOfYear};
