//! Cutting a mesh in two along a plane, so a model larger than the print
//! bed can be printed in parts.
//!
//! Triangles crossing the plane are clipped; the cut is not capped, so each
//! half is open along the plane. Triangles lying in the plane go to the
//! lower half only.

use std::collections::HashMap;

use super::core::{Tolerance, Vec3};
use super::mesh::TerrainMesh;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClipError {
    #[error("cut plane normal must be finite and non-zero")]
    InvalidNormal,
    #[error("cut plane offset must be finite, got {0}")]
    InvalidOffset(f64),
    #[error("split half would need more than {} vertices", u32::MAX)]
    TooManyVertices,
}

/// The plane `normal · p = offset` with a unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPlane {
    normal: Vec3,
    offset: f64,
}

impl CutPlane {
    /// Plane with normal `(nx, ny, nz)` through the point `normal * d`.
    ///
    /// The normal need not be unit length.
    pub fn new(normal: Vec3, d: f64) -> Result<Self, ClipError> {
        if !d.is_finite() {
            return Err(ClipError::InvalidOffset(d));
        }
        let length = normal.length();
        let unit = normal.normalized().ok_or(ClipError::InvalidNormal)?;
        Ok(Self {
            normal: unit,
            offset: d * length,
        })
    }

    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Signed distance of `p` from the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, p: [f64; 3]) -> f64 {
        self.normal.dot(Vec3::new(p[0], p[1], p[2])) - self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Corner {
    Vertex(u32),
    /// Crossing on the edge between two vertices, stored low index first.
    Cut(u32, u32),
}

fn cut(a: u32, b: u32) -> Corner {
    Corner::Cut(a.min(b), a.max(b))
}

/// Accumulates one half, sharing vertices between neighbouring faces.
struct HalfBuilder {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[u32; 3]>,
    index: HashMap<Corner, u32>,
}

impl HalfBuilder {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn corner(
        &mut self,
        corner: Corner,
        source: &[[f64; 3]],
        distance: &[f64],
    ) -> Result<u32, ClipError> {
        if let Some(&index) = self.index.get(&corner) {
            return Ok(index);
        }
        let position = match corner {
            Corner::Vertex(v) => source[v as usize],
            Corner::Cut(a, b) => {
                let (pa, pb) = (source[a as usize], source[b as usize]);
                let (da, db) = (distance[a as usize], distance[b as usize]);
                let t = da / (da - db);
                [0, 1, 2].map(|k| pa[k] + (pb[k] - pa[k]) * t)
            }
        };
        let index = u32::try_from(self.vertices.len()).map_err(|_| ClipError::TooManyVertices)?;
        self.vertices.push(position);
        self.index.insert(corner, index);
        Ok(index)
    }

    /// Fan-triangulate a clipped polygon, keeping the source winding.
    fn polygon(
        &mut self,
        corners: &[Corner],
        source: &[[f64; 3]],
        distance: &[f64],
    ) -> Result<(), ClipError> {
        if corners.len() < 3 {
            return Ok(());
        }
        let ids = corners
            .iter()
            .map(|&c| self.corner(c, source, distance))
            .collect::<Result<Vec<_>, _>>()?;
        for k in 1..ids.len() - 1 {
            self.faces.push([ids[0], ids[k], ids[k + 1]]);
        }
        Ok(())
    }

    fn finish(self) -> TerrainMesh {
        TerrainMesh::new(self.vertices, self.faces)
    }
}

/// Corners of `tri` on the kept side (`sign * distance <= 0`), plus the
/// crossings of edges that change side.
fn clip_triangle(tri: [u32; 3], distance: &[f64], sign: f64) -> Vec<Corner> {
    let mut corners = Vec::with_capacity(4);
    for k in 0..3 {
        let (a, b) = (tri[k], tri[(k + 1) % 3]);
        let da = sign * distance[a as usize];
        let db = sign * distance[b as usize];
        if da <= 0.0 {
            corners.push(Corner::Vertex(a));
        }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            corners.push(cut(a, b));
        }
    }
    corners
}

impl TerrainMesh {
    /// Split the mesh along `plane` into the part on the negative side and
    /// the part on the positive side of its normal.
    ///
    /// Vertices within [`Tolerance::DEFAULT`] of the plane count as on it.
    /// Faces with out-of-range indices are dropped.
    pub fn split_by_plane(
        &self,
        plane: &CutPlane,
    ) -> Result<(TerrainMesh, TerrainMesh), ClipError> {
        let tol = Tolerance::DEFAULT.eps;
        let distance: Vec<f64> = self
            .vertices
            .iter()
            .map(|&p| {
                let d = plane.signed_distance(p);
                if d.abs() <= tol { 0.0 } else { d }
            })
            .collect();

        let mut below = HalfBuilder::new();
        let mut above = HalfBuilder::new();
        let mut crossing = 0usize;

        for &tri in &self.faces {
            if tri.iter().any(|&v| v as usize >= self.vertices.len()) {
                continue;
            }
            let sides = tri.map(|v| distance[v as usize]);
            if sides.iter().all(|&d| d == 0.0) {
                below.polygon(&tri.map(Corner::Vertex), &self.vertices, &distance)?;
                continue;
            }
            if sides.iter().any(|&d| d < 0.0) && sides.iter().any(|&d| d > 0.0) {
                crossing += 1;
            }
            below.polygon(&clip_triangle(tri, &distance, 1.0), &self.vertices, &distance)?;
            above.polygon(&clip_triangle(tri, &distance, -1.0), &self.vertices, &distance)?;
        }

        let (below, above) = (below.finish(), above.finish());
        log::debug!(
            "plane cut: {crossing} triangles crossed, {} below, {} above",
            below.triangle_count(),
            above.triangle_count()
        );
        Ok((below, above))
    }
}
