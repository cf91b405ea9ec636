//! Gridded (leading axis × row × column) data with coordinate metadata.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{GridError, GridResult};
use crate::time::DayOfYear;

/// A grid over daily calendar dates.
pub type TimeGrid<T> = Grid<T, NaiveDate>;

/// Daily temperature values. `NaN` marks a missing value.
pub type TemperatureGrid = Grid<f32, NaiveDate>;

/// Per day-of-year percentile thresholds. `NaN` marks a missing value.
pub type ClimatologyGrid = Grid<f32, DayOfYear>;

/// Label type of a grid's leading axis.
pub trait AxisLabel: Copy + Ord + Debug + Send + Sync {
    /// Axis name used in error messages.
    const AXIS: &'static str;
}

impl AxisLabel for NaiveDate {
    const AXIS: &'static str = "time";
}

impl AxisLabel for DayOfYear {
    const AXIS: &'static str = "day_of_year";
}

/// How spatial coordinates should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Plain row/column indices.
    #[default]
    Index,
    /// Rows are latitudes, columns are longitudes (degrees).
    LatLon,
}

/// Row and column coordinates shared by every plane of a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialAxes {
    pub kind: AxisKind,
    rows: Vec<f64>,
    cols: Vec<f64>,
}

impl SpatialAxes {
    /// Create validated spatial axes.
    ///
    /// Both axes must be non-empty and strictly monotonic. Descending axes are
    /// allowed (north-to-south latitudes are common).
    pub fn new(kind: AxisKind, rows: Vec<f64>, cols: Vec<f64>) -> GridResult<Self> {
        let (row_name, col_name) = match kind {
            AxisKind::Index => ("row", "column"),
            AxisKind::LatLon => ("lat", "lon"),
        };
        check_strictly_monotonic(row_name, &rows)?;
        check_strictly_monotonic(col_name, &cols)?;
        Ok(Self { kind, rows, cols })
    }

    /// Index axes `0..rows` and `0..cols`.
    pub fn indexed(rows: usize, cols: usize) -> GridResult<Self> {
        Self::new(
            AxisKind::Index,
            (0..rows).map(|r| r as f64).collect(),
            (0..cols).map(|c| c as f64).collect(),
        )
    }

    pub fn lat_lon(lat: Vec<f64>, lon: Vec<f64>) -> GridResult<Self> {
        Self::new(AxisKind::LatLon, lat, lon)
    }

    pub fn rows(&self) -> &[f64] {
        &self.rows
    }

    pub fn cols(&self) -> &[f64] {
        &self.cols
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Number of cells in one 2-D plane.
    pub fn plane_len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }
}

fn check_strictly_monotonic(axis: &str, values: &[f64]) -> GridResult<()> {
    if values.is_empty() {
        return Err(GridError::EmptyAxis(axis.to_string()));
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(GridError::non_monotonic(axis, index));
    }

    let mut ascending = None;
    for (i, pair) in values.windows(2).enumerate() {
        let index = i + 1;
        if pair[0] == pair[1] {
            return Err(GridError::duplicate(axis, index));
        }
        let up = pair[1] > pair[0];
        match ascending {
            None => ascending = Some(up),
            Some(dir) if dir != up => return Err(GridError::non_monotonic(axis, index)),
            Some(_) => {}
        }
    }
    Ok(())
}

fn check_strictly_increasing<L: AxisLabel>(labels: &[L]) -> GridResult<()> {
    for (i, pair) in labels.windows(2).enumerate() {
        if pair[0] == pair[1] {
            return Err(GridError::duplicate(L::AXIS, i + 1));
        }
        if pair[1] < pair[0] {
            return Err(GridError::non_monotonic(L::AXIS, i + 1));
        }
    }
    Ok(())
}

/// Immutable 3-D grid stored flat in `(lead, row, col)` row-major order.
///
/// The leading axis is labelled by `L`: calendar dates for observations and
/// derived products, days of year for climatologies.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T, L> {
    variable: String,
    labels: Vec<L>,
    spatial: SpatialAxes,
    data: Vec<T>,
}

impl<T, L: AxisLabel> Grid<T, L> {
    /// Create a grid, checking the shape against the axes.
    pub fn new(
        variable: impl Into<String>,
        labels: Vec<L>,
        spatial: SpatialAxes,
        data: Vec<T>,
    ) -> GridResult<Self> {
        check_strictly_increasing(&labels)?;

        let expected = labels.len() * spatial.plane_len();
        if data.len() != expected {
            return Err(GridError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            variable: variable.into(),
            labels,
            spatial,
            data,
        })
    }

    /// Assemble a grid from one 2-D plane per label.
    pub fn from_planes(
        variable: impl Into<String>,
        labels: Vec<L>,
        spatial: SpatialAxes,
        planes: Vec<Vec<T>>,
    ) -> GridResult<Self> {
        let plane_len = spatial.plane_len();
        if planes.len() != labels.len() {
            return Err(GridError::axis_mismatch(format!(
                "{} {} labels but {} planes",
                labels.len(),
                L::AXIS,
                planes.len()
            )));
        }

        let mut data = Vec::with_capacity(plane_len * planes.len());
        for plane in planes {
            if plane.len() != plane_len {
                return Err(GridError::ShapeMismatch {
                    expected: plane_len,
                    actual: plane.len(),
                });
            }
            data.extend(plane);
        }

        Self::new(variable, labels, spatial, data)
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Leading-axis labels, strictly increasing.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn spatial(&self) -> &SpatialAxes {
        &self.spatial
    }

    /// Flat `(lead, row, col)` values.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Number of steps along the leading axis.
    pub fn steps(&self) -> usize {
        self.labels.len()
    }

    pub fn nrows(&self) -> usize {
        self.spatial.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.spatial.ncols()
    }

    pub fn plane_len(&self) -> usize {
        self.spatial.plane_len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of a label on the leading axis.
    pub fn position(&self, label: L) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    pub fn get(&self, step: usize, row: usize, col: usize) -> Option<&T> {
        if step >= self.steps() || row >= self.nrows() || col >= self.ncols() {
            return None;
        }
        self.data
            .get(step * self.plane_len() + row * self.ncols() + col)
    }

    /// The 2-D plane (row-major) at a leading-axis step.
    pub fn plane(&self, step: usize) -> Option<&[T]> {
        if step >= self.steps() {
            return None;
        }
        let len = self.plane_len();
        Some(&self.data[step * len..(step + 1) * len])
    }

    /// Iterate planes in leading-axis order.
    pub fn planes(&self) -> impl Iterator<Item = &[T]> {
        // spatial axes are never empty, so plane_len > 0
        self.data.chunks_exact(self.plane_len())
    }

    /// Rename the variable.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Convert every value, keeping the axes.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U, L> {
        Grid {
            variable: self.variable.clone(),
            labels: self.labels.clone(),
            spatial: self.spatial.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Same spatial coordinates as another grid.
    pub fn same_spatial<U, M: AxisLabel>(&self, other: &Grid<U, M>) -> bool {
        self.spatial == other.spatial
    }
}

impl<T: Clone, L: AxisLabel> Grid<T, L> {
    /// Keep the cells whose coordinates lie strictly inside `bbox`.
    ///
    /// Columns are tested against the x range, rows against the y range.
    pub fn subset_bbox(&self, bbox: &BoundingBox) -> GridResult<Self> {
        let keep_rows: Vec<usize> = (0..self.nrows())
            .filter(|&r| bbox.contains_y(self.spatial.rows[r]))
            .collect();
        let keep_cols: Vec<usize> = (0..self.ncols())
            .filter(|&c| bbox.contains_x(self.spatial.cols[c]))
            .collect();

        if keep_rows.is_empty() || keep_cols.is_empty() {
            return Err(GridError::EmptySubset);
        }

        let spatial = SpatialAxes {
            kind: self.spatial.kind,
            rows: keep_rows.iter().map(|&r| self.spatial.rows[r]).collect(),
            cols: keep_cols.iter().map(|&c| self.spatial.cols[c]).collect(),
        };

        let ncols = self.ncols();
        let mut data = Vec::with_capacity(self.steps() * spatial.plane_len());
        for plane in self.planes() {
            for &r in &keep_rows {
                for &c in &keep_cols {
                    data.push(plane[r * ncols + c].clone());
                }
            }
        }

        Ok(Self {
            variable: self.variable.clone(),
            labels: self.labels.clone(),
            spatial,
            data,
        })
    }
}
