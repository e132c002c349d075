//! Regular elevation grid produced by interpolation and consumed by the
//! solid mesher.
//!
//! Elevations are stored row-major: row `i` runs along `axis_x` at
//! `axis_y[i]`, so the node `(i, j)` lives at index `i * width + j`.

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HeightFieldError {
    #[error("height field needs at least one node on each axis")]
    EmptyAxis,
    #[error("elevation buffer has {actual} entries, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("{axis} axis is not finite and strictly increasing")]
    AxisNotIncreasing { axis: char },
    #[error("elevation at row {row}, column {col} is not finite")]
    NonFiniteElevation { row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    axis_x: Vec<f64>,
    axis_y: Vec<f64>,
    elevation: Vec<f64>,
    min: f64,
    max: f64,
}

impl HeightField {
    pub fn new(
        axis_x: Vec<f64>,
        axis_y: Vec<f64>,
        elevation: Vec<f64>,
    ) -> Result<Self, HeightFieldError> {
        if axis_x.is_empty() || axis_y.is_empty() {
            return Err(HeightFieldError::EmptyAxis);
        }
        check_axis(&axis_x, 'x')?;
        check_axis(&axis_y, 'y')?;

        let width = axis_x.len();
        let expected = width * axis_y.len();
        if elevation.len() != expected {
            return Err(HeightFieldError::ShapeMismatch {
                expected,
                actual: elevation.len(),
            });
        }
        if let Some(index) = elevation.iter().position(|z| !z.is_finite()) {
            return Err(HeightFieldError::NonFiniteElevation {
                row: index / width,
                col: index % width,
            });
        }

        let min = elevation.iter().copied().fold(f64::INFINITY, f64::min);
        let max = elevation.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            axis_x,
            axis_y,
            elevation,
            min,
            max,
        })
    }

    /// Build a field from nested rows, `rows[i][j]` being the node at
    /// `(axis_y[i], axis_x[j])`.
    pub fn from_rows(
        axis_x: Vec<f64>,
        axis_y: Vec<f64>,
        rows: &[Vec<f64>],
    ) -> Result<Self, HeightFieldError> {
        let width = axis_x.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(HeightFieldError::ShapeMismatch {
                expected: width,
                actual: bad.len(),
            });
        }
        let elevation = rows.iter().flatten().copied().collect();
        Self::new(axis_x, axis_y, elevation)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.axis_x.len()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.axis_y.len()
    }

    #[must_use]
    pub fn axis_x(&self) -> &[f64] {
        &self.axis_x
    }

    #[must_use]
    pub fn axis_y(&self) -> &[f64] {
        &self.axis_y
    }

    /// Raw elevations, row-major.
    #[must_use]
    pub fn elevations(&self) -> &[f64] {
        &self.elevation
    }

    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        self.elevation.get(row * self.width() + col).copied()
    }

    #[must_use]
    pub fn min_elevation(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max_elevation(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn elevation_range(&self) -> f64 {
        self.max - self.min
    }

    /// Remap raw elevations onto `[0, scale_z]`.
    ///
    /// A flat field maps to zero everywhere. Values are halved before
    /// subtracting so ranges wider than `f64::MAX` stay finite.
    #[must_use]
    pub fn normalized(&self, scale_z: f64) -> Vec<f64> {
        let half_min = self.min / 2.0;
        let half_range = self.max / 2.0 - half_min;
        if half_range <= 0.0 {
            return vec![0.0; self.elevation.len()];
        }
        self.elevation
            .iter()
            .map(|z| (z / 2.0 - half_min) / half_range * scale_z)
            .collect()
    }
}

fn check_axis(axis: &[f64], name: char) -> Result<(), HeightFieldError> {
    let finite = axis.iter().all(|v| v.is_finite());
    let increasing = axis.windows(2).all(|w| w[0] < w[1]);
    if finite && increasing {
        Ok(())
    } else {
        Err(HeightFieldError::AxisNotIncreasing { axis: name })
    }
}
