//! Scattered elevation samples to a regular height grid.
//!
//! The grid covers the XY bounding box of the samples with evenly spaced
//! axes that include both ends. Node values come from a
//! [`ScatteredInterpolant`]; nodes the strategy cannot reach take the lowest
//! sample elevation.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::core::{Bounds2, Tolerance};
use super::heightfield::{HeightField, HeightFieldError};
use super::samples::{Sample, SampleSet};

/// Relative slack on barycentric coordinates so nodes lying on a hull edge
/// count as inside.
const BARYCENTRIC_EPS: f64 = 1e-10;

/// Largest grid whose solid (top and bottom vertex layers) still fits `u32` indices.
const MAX_GRID_NODES: usize = (u32::MAX / 2) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// How the grid dimensions are chosen. A fixed size always wins over a cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSpec {
    CellSize(f64),
    Fixed(GridSize),
}

impl GridSpec {
    #[must_use]
    pub fn from_options(cell_size: f64, grid_size: Option<GridSize>) -> Self {
        match grid_size {
            Some(size) => Self::Fixed(size),
            None => Self::CellSize(cell_size),
        }
    }

    /// Grid dimensions for samples spanning `bounds`.
    pub fn resolve(self, bounds: Bounds2) -> Result<GridSize, InterpolateError> {
        let size = match self {
            Self::CellSize(cell) => {
                if !cell.is_finite() || cell <= 0.0 {
                    return Err(InterpolateError::InvalidCellSize(cell));
                }
                GridSize::new(
                    nodes_along(bounds.width(), cell),
                    nodes_along(bounds.height(), cell),
                )
            }
            Self::Fixed(size) => {
                if size.width == 0 || size.height == 0 {
                    return Err(InterpolateError::InvalidGridDimension(size));
                }
                if size.width > 1 && bounds.width() <= 0.0 {
                    return Err(InterpolateError::ZeroExtent { axis: 'x' });
                }
                if size.height > 1 && bounds.height() <= 0.0 {
                    return Err(InterpolateError::ZeroExtent { axis: 'y' });
                }
                size
            }
        };

        match size.width.checked_mul(size.height) {
            Some(nodes) if nodes <= MAX_GRID_NODES => Ok(size),
            _ => Err(InterpolateError::GridTooLarge(size)),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn nodes_along(extent: f64, cell: f64) -> usize {
    // `as` saturates, the node cap rejects anything absurd afterwards.
    ((extent / cell).floor() as usize).saturating_add(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Barycentric interpolation over the Delaunay triangulation of the samples.
    #[default]
    Linear,
    /// Value of the closest sample in the XY plane.
    Nearest,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InterpolateError {
    #[error("no elevation samples to interpolate")]
    EmptyInput,
    #[error("linear interpolation needs at least 3 non-collinear samples ({samples} given)")]
    Degenerate { samples: usize },
    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),
    #[error("grid dimensions must be non-zero, got {}x{}", .0.width, .0.height)]
    InvalidGridDimension(GridSize),
    #[error("grid of {}x{} nodes is too large", .0.width, .0.height)]
    GridTooLarge(GridSize),
    #[error("samples have no extent along {axis} but more than one node was requested")]
    ZeroExtent { axis: char },
    #[error(transparent)]
    Field(#[from] HeightFieldError),
}

/// A scattered-data interpolation strategy.
pub trait ScatteredInterpolant {
    /// Evaluate every node of the grid spanned by `axis_x` × `axis_y`,
    /// row-major, writing `fill` where the strategy has no value.
    fn fill_grid(&self, axis_x: &[f64], axis_y: &[f64], fill: f64) -> Vec<f64>;
}

/// Builds [`HeightField`]s from [`SampleSet`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInterpolator {
    spec: GridSpec,
    method: InterpolationMethod,
}

impl GridInterpolator {
    #[must_use]
    pub const fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            method: InterpolationMethod::Linear,
        }
    }

    #[must_use]
    pub const fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn interpolate(&self, samples: &SampleSet) -> Result<HeightField, InterpolateError> {
        let (Some(bounds), Some(fill)) = (samples.bounds(), samples.min_elevation()) else {
            return Err(InterpolateError::EmptyInput);
        };
        let size = self.spec.resolve(bounds)?;

        log::debug!(
            "interpolating {} samples over x [{}, {}], y [{}, {}] onto {}x{} grid",
            samples.len(),
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            size.width,
            size.height
        );

        let axis_x = linspace(bounds.min_x, bounds.max_x, size.width);
        let axis_y = linspace(bounds.min_y, bounds.max_y, size.height);

        let elevation = match self.method {
            InterpolationMethod::Linear => match LinearInterpolant::new(samples) {
                Ok(linear) => linear.fill_grid(&axis_x, &axis_y, fill),
                Err(InterpolateError::Degenerate { samples: count }) => {
                    log::warn!(
                        "{count} samples do not span a triangle, falling back to nearest-neighbour fill"
                    );
                    NearestInterpolant::new(samples)?.fill_grid(&axis_x, &axis_y, fill)
                }
                Err(err) => return Err(err),
            },
            InterpolationMethod::Nearest => {
                NearestInterpolant::new(samples)?.fill_grid(&axis_x, &axis_y, fill)
            }
        };

        let field = HeightField::new(axis_x, axis_y, elevation)?;
        log::debug!(
            "height field elevation range [{}, {}]",
            field.min_elevation(),
            field.max_elevation()
        );
        Ok(field)
    }
}

/// Interpolate `samples` with the linear strategy.
///
/// `grid_size` overrides `cell_size` when present.
pub fn interpolate(
    samples: &SampleSet,
    cell_size: f64,
    grid_size: Option<GridSize>,
) -> Result<HeightField, InterpolateError> {
    GridInterpolator::new(GridSpec::from_options(cell_size, grid_size)).interpolate(samples)
}

/// `count` evenly spaced values from `start` to `stop` inclusive.
#[must_use]
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|k| if k == count - 1 { stop } else { start + k as f64 * step })
                .collect()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linear (Delaunay) strategy
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LinearInterpolant<'a> {
    samples: &'a [Sample],
    triangles: Vec<[usize; 3]>,
    tol: f64,
}

impl<'a> LinearInterpolant<'a> {
    pub fn new(samples: &'a SampleSet) -> Result<Self, InterpolateError> {
        let bounds = samples.bounds().ok_or(InterpolateError::EmptyInput)?;

        let points: Vec<delaunator::Point> = samples
            .samples()
            .iter()
            .map(|s| delaunator::Point { x: s.x, y: s.y })
            .collect();
        let triangulation = delaunator::triangulate(&points);
        if triangulation.triangles.is_empty() {
            return Err(InterpolateError::Degenerate {
                samples: samples.len(),
            });
        }

        let triangles = triangulation
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        Ok(Self {
            samples: samples.samples(),
            triangles,
            tol: Tolerance::DEFAULT
                .scaled(bounds.width().max(bounds.height()))
                .eps,
        })
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles whose Y extent touches each grid row.
    fn row_buckets(&self, axis_y: &[f64]) -> Vec<Vec<usize>> {
        let mut buckets = vec![Vec::new(); axis_y.len()];
        for (t, tri) in self.triangles.iter().enumerate() {
            let (lo, hi) = self.extent(tri, |s| s.y);
            let first = axis_y.partition_point(|&y| y < lo - self.tol);
            let last = axis_y.partition_point(|&y| y <= hi + self.tol);
            for bucket in &mut buckets[first..last] {
                bucket.push(t);
            }
        }
        buckets
    }

    fn extent(&self, tri: &[usize; 3], coord: impl Fn(&Sample) -> f64) -> (f64, f64) {
        tri.iter()
            .map(|&i| coord(&self.samples[i]))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn fill_row(&self, axis_x: &[f64], y: f64, triangles: &[usize], values: &mut [f64]) {
        for &t in triangles {
            let tri = &self.triangles[t];
            let (lo, hi) = self.extent(tri, |s| s.x);
            let first = axis_x.partition_point(|&x| x < lo - self.tol);
            let last = axis_x.partition_point(|&x| x <= hi + self.tol);
            let [a, b, c] = (*tri).map(|i| &self.samples[i]);

            for (value, &x) in values[first..last].iter_mut().zip(&axis_x[first..last]) {
                if value.is_nan() {
                    if let Some(z) = barycentric_value(x, y, a, b, c) {
                        *value = z;
                    }
                }
            }
        }
    }
}

impl ScatteredInterpolant for LinearInterpolant<'_> {
    fn fill_grid(&self, axis_x: &[f64], axis_y: &[f64], fill: f64) -> Vec<f64> {
        let buckets = self.row_buckets(axis_y);
        let mut grid = vec![f64::NAN; axis_x.len() * axis_y.len()];
        for_each_row(&mut grid, axis_x.len(), |row, values| {
            self.fill_row(axis_x, axis_y[row], &buckets[row], values);
            for value in values.iter_mut().filter(|v| v.is_nan()) {
                *value = fill;
            }
        });
        grid
    }
}

fn barycentric_value(x: f64, y: f64, a: &Sample, b: &Sample, c: &Sample) -> Option<f64> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if !det.is_normal() {
        return None;
    }
    let l1 = ((b.y - c.y) * (x - c.x) + (c.x - b.x) * (y - c.y)) / det;
    let l2 = ((c.y - a.y) * (x - c.x) + (a.x - c.x) * (y - c.y)) / det;
    let l3 = 1.0 - l1 - l2;
    if l1 < -BARYCENTRIC_EPS || l2 < -BARYCENTRIC_EPS || l3 < -BARYCENTRIC_EPS {
        return None;
    }
    Some(l1 * a.elevation + l2 * b.elevation + l3 * c.elevation)
}

// ─────────────────────────────────────────────────────────────────────────────
// Nearest-neighbour strategy
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct NearestInterpolant<'a> {
    samples: &'a [Sample],
}

impl<'a> NearestInterpolant<'a> {
    pub fn new(samples: &'a SampleSet) -> Result<Self, InterpolateError> {
        if samples.is_empty() {
            return Err(InterpolateError::EmptyInput);
        }
        Ok(Self {
            samples: samples.samples(),
        })
    }

    /// Elevation of the closest sample; ties go to the earliest sample.
    fn nearest(&self, x: f64, y: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for s in self.samples {
            let d2 = (s.x - x).powi(2) + (s.y - y).powi(2);
            if best.is_none_or(|(best_d2, _)| d2 < best_d2) {
                best = Some((d2, s.elevation));
            }
        }
        best.map(|(_, z)| z)
    }
}

impl ScatteredInterpolant for NearestInterpolant<'_> {
    fn fill_grid(&self, axis_x: &[f64], axis_y: &[f64], fill: f64) -> Vec<f64> {
        let mut grid = vec![fill; axis_x.len() * axis_y.len()];
        for_each_row(&mut grid, axis_x.len(), |row, values| {
            let y = axis_y[row];
            for (value, &x) in values.iter_mut().zip(axis_x) {
                if let Some(z) = self.nearest(x, y) {
                    *value = z;
                }
            }
        });
        grid
    }
}

#[cfg(feature = "parallel")]
fn for_each_row<F>(grid: &mut [f64], width: usize, fill_row: F)
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    if width == 0 {
        return;
    }
    grid.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, values)| fill_row(row, values));
}

#[cfg(not(feature = "parallel"))]
fn for_each_row<F>(grid: &mut [f64], width: usize, fill_row: F)
where
    F: Fn(usize, &mut [f64]),
{
    if width == 0 {
        return;
    }
    for (row, values) in grid.chunks_mut(width).enumerate() {
        fill_row(row, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spiral_samples() -> SampleSet {
        SampleSet::from_triples((0..60).map(|k| {
            let t = f64::from(k);
            (
                t.sin() * 20.0 + t * 0.3,
                t.cos() * 15.0 - t * 0.2,
                (t * 0.7).sin() * 40.0 + 100.0,
            )
        }))
        .unwrap()
    }

    fn bits(values: &[f64]) -> Vec<u64> {
        values.iter().map(|v| v.to_bits()).collect()
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_fill_matches_row_by_row_fill() {
        let samples = spiral_samples();
        let bounds = samples.bounds().unwrap();
        let fill = samples.min_elevation().unwrap();
        let axis_x = linspace(bounds.min_x, bounds.max_x, 37);
        let axis_y = linspace(bounds.min_y, bounds.max_y, 23);
        let width = axis_x.len();

        let linear = LinearInterpolant::new(&samples).unwrap();
        let buckets = linear.row_buckets(&axis_y);
        let mut expected = vec![f64::NAN; width * axis_y.len()];
        for (row, values) in expected.chunks_mut(width).enumerate() {
            linear.fill_row(&axis_x, axis_y[row], &buckets[row], values);
            for value in values.iter_mut().filter(|v| v.is_nan()) {
                *value = fill;
            }
        }
        assert_eq!(bits(&linear.fill_grid(&axis_x, &axis_y, fill)), bits(&expected));

        let nearest = NearestInterpolant::new(&samples).unwrap();
        let expected: Vec<f64> = axis_y
            .iter()
            .flat_map(|&y| axis_x.iter().map(move |&x| (x, y)))
            .map(|(x, y)| nearest.nearest(x, y).unwrap_or(fill))
            .collect();
        assert_eq!(bits(&nearest.fill_grid(&axis_x, &axis_y, fill)), bits(&expected));
    }

    #[test]
    fn linear_fill_is_repeatable() {
        let samples = spiral_samples();
        let bounds = samples.bounds().unwrap();
        let axis_x = linspace(bounds.min_x, bounds.max_x, 19);
        let axis_y = linspace(bounds.min_y, bounds.max_y, 11);

        let linear = LinearInterpolant::new(&samples).unwrap();
        assert!(linear.triangle_count() > 0);
        let first = linear.fill_grid(&axis_x, &axis_y, -1.0);
        let second = linear.fill_grid(&axis_x, &axis_y, -1.0);
        assert_eq!(bits(&first), bits(&second));
        assert!(first.iter().all(|z| z.is_finite()));
    }
}
