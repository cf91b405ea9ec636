//! Bounding box used to clip grids to an area of interest.

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A lon/lat (or column/row index) bounding box.
///
/// `x` runs along grid columns (longitude), `y` along grid rows (latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a "minx,miny,maxx,maxy" string.
    pub fn from_csv(s: &str) -> Result<Self, GridError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GridError::InvalidBbox(format!(
                "{s}: expected 'minx,miny,maxx,maxy'"
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| GridError::InvalidBbox(format!("invalid number '{part}'")))?;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        if bbox.min_x >= bbox.max_x || bbox.min_y >= bbox.max_y {
            return Err(GridError::InvalidBbox(format!("{s}: min must be below max")));
        }
        Ok(bbox)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Strict containment: points on the edge are outside.
    pub fn contains_x(&self, x: f64) -> bool {
        x > self.min_x && x < self.max_x
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y > self.min_y && y < self.max_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }
}
