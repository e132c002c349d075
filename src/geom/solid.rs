//! Closed printable solid from a [`HeightField`].
//!
//! The solid is made of a terrain surface, a flat base at `-base_thickness`
//! and four walls joining them along the grid perimeter. Vertices are the
//! top layer followed by the bottom layer, both row-major.

use serde::{Deserialize, Serialize};

use super::diagnostics::MeshDiagnostics;
use super::heightfield::HeightField;
use super::mesh::TerrainMesh;
use super::triangulation::triangulate_grid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidOptions {
    /// Height of the highest terrain point above the lowest one.
    pub scale_z: f64,
    /// Depth of the base below zero, same units as `scale_z`.
    pub base_thickness: f64,
}

impl Default for SolidOptions {
    fn default() -> Self {
        Self {
            scale_z: 1.0,
            base_thickness: 5.0,
        }
    }
}

impl SolidOptions {
    #[must_use]
    pub const fn new(scale_z: f64, base_thickness: f64) -> Self {
        Self {
            scale_z,
            base_thickness,
        }
    }

    pub fn validate(&self) -> Result<(), SolidError> {
        if !self.scale_z.is_finite() {
            return Err(SolidError::InvalidScale(self.scale_z));
        }
        if !self.base_thickness.is_finite() || self.base_thickness < 0.0 {
            return Err(SolidError::InvalidBaseThickness(self.base_thickness));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SolidError {
    #[error("height field of {width}x{height} nodes cannot form a cell (need at least 2x2)")]
    InvalidGridSize { width: usize, height: usize },
    #[error("base thickness must be finite and non-negative, got {0}")]
    InvalidBaseThickness(f64),
    #[error("vertical scale must be finite, got {0}")]
    InvalidScale(f64),
    #[error("solid would need {0} vertices, more than 32-bit indices can address")]
    TooManyVertices(usize),
    #[error("solid mesh is invalid: {0}")]
    InvalidMesh(String),
}

/// Mesh `field` into a closed solid.
pub fn mesh_heightfield(
    field: &HeightField,
    scale_z: f64,
    base_thickness: f64,
) -> Result<TerrainMesh, SolidError> {
    mesh_solid(field, SolidOptions::new(scale_z, base_thickness)).map(|(mesh, _)| mesh)
}

/// Mesh `field` into a closed solid and report its edge topology.
pub fn mesh_solid(
    field: &HeightField,
    options: SolidOptions,
) -> Result<(TerrainMesh, MeshDiagnostics), SolidError> {
    options.validate()?;

    let width = field.width();
    let height = field.height();
    if width < 2 || height < 2 {
        return Err(SolidError::InvalidGridSize { width, height });
    }

    let layer = width * height;
    let vertex_count = layer * 2;
    let Ok(base) = u32::try_from(layer) else {
        return Err(SolidError::TooManyVertices(vertex_count));
    };
    if u32::try_from(vertex_count).is_err() {
        return Err(SolidError::TooManyVertices(vertex_count));
    }

    let heights = field.normalized(options.scale_z);
    let bottom_z = -options.base_thickness;

    let mut vertices = Vec::with_capacity(vertex_count);
    for (i, &y) in field.axis_y().iter().enumerate() {
        for (j, &x) in field.axis_x().iter().enumerate() {
            vertices.push([x, y, heights[i * width + j]]);
        }
    }
    for &y in field.axis_y() {
        for &x in field.axis_x() {
            vertices.push([x, y, bottom_z]);
        }
    }

    let wall_triangles = 4 * ((width - 1) + (height - 1));
    let mut faces = Vec::with_capacity(4 * (width - 1) * (height - 1) + wall_triangles);
    faces.extend(triangulate_grid(width, height, 0, false));
    faces.extend(triangulate_grid(width, height, base, true));
    extend_walls(&mut faces, width, height, base);

    let mesh = TerrainMesh::new(vertices, faces);
    mesh.validate().map_err(SolidError::InvalidMesh)?;
    let diagnostics = MeshDiagnostics::from_mesh(&mesh);

    log::debug!("solid mesh {}x{}: {}", width, height, diagnostics.summary());
    if !diagnostics.is_watertight() {
        log::warn!("solid mesh is not watertight: {diagnostics}");
    }

    Ok((mesh, diagnostics))
}

/// Append the four perimeter walls: column 0, the last column, row 0,
/// then the last row.
///
/// The top surface's boundary runs counter-clockwise seen from +Z: along
/// row 0 with increasing column, up the last column, back along the last
/// row and down column 0. For each boundary step `p -> q` the wall quad is
/// `[q, p, p']` + `[q, p', q']` (primes on the base layer), which reverses
/// the top edge `p -> q`, the base edge `q' -> p'` and the vertical edge
/// shared with the neighbouring quad, and faces away from the solid.
#[allow(clippy::cast_possible_truncation)]
fn extend_walls(faces: &mut Vec<[u32; 3]>, width: usize, height: usize, base: u32) {
    let node = |i: usize, j: usize| (i * width + j) as u32;
    let mut quad = |p: u32, q: u32| {
        faces.push([q, p, p + base]);
        faces.push([q, p + base, q + base]);
    };

    // Left (column 0): back to front.
    for i in 0..height - 1 {
        quad(node(i + 1, 0), node(i, 0));
    }
    // Right (last column): front to back.
    for i in 0..height - 1 {
        quad(node(i, width - 1), node(i + 1, width - 1));
    }
    // Front (row 0): left to right.
    for j in 0..width - 1 {
        quad(node(0, j), node(0, j + 1));
    }
    // Back (last row): right to left.
    for j in 0..width - 1 {
        quad(node(height - 1, j + 1), node(height - 1, j));
    }
}
