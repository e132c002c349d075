use std::collections::HashMap;

use super::core::{Point3, Vec3, triangle_normal};

/// Three explicit vertex positions, as handed to exporters.
pub type Triangle = [[f64; 3]; 3];

/// Indexed triangle mesh. Winding is counter-clockwise seen from outside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerrainMesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl TerrainMesh {
    #[must_use]
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.vertices
            .iter()
            .any(|&p| !Point3::from_array(p).is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().flatten().all(|&i| (i as usize) < n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        Ok(())
    }

    /// Resolve a face to its corner positions.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(face)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Every face as explicit positions, in face order. Faces with
    /// out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).filter_map(|face| self.triangle(face))
    }

    /// Unit normal of a face by the right-hand rule.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vec3> {
        let [a, b, c] = self.triangle(face)?;
        triangle_normal(a.into(), b.into(), c.into())
    }

    /// Signed enclosed volume; positive when faces wind outward.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| {
                let a = Point3::from(a).to_vec3();
                let b = Point3::from(b).to_vec3();
                let c = Point3::from(c).to_vec3();
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    #[must_use]
    pub fn degenerate_triangle_count(&self) -> usize {
        (0..self.faces.len())
            .filter(|&face| self.face_normal(face).is_none())
            .count()
    }
}

/// How the faces of a mesh share their edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeTopology {
    /// Undirected edges in the mesh.
    pub edge_count: usize,
    /// Edges with a single adjacent face.
    pub open_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// Two-face edges traversed twice in the same direction.
    pub inconsistent_edge_count: usize,
}

impl EdgeTopology {
    /// Closed, manifold and consistently wound.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.open_edge_count == 0
            && self.non_manifold_edge_count == 0
            && self.inconsistent_edge_count == 0
    }
}

/// Count how each undirected edge is used by `faces`.
///
/// An edge of a closed, consistently wound manifold appears exactly twice,
/// once in each direction.
#[must_use]
pub fn edge_topology(faces: &[[u32; 3]]) -> EdgeTopology {
    // (lo, hi) -> (uses as lo->hi, uses as hi->lo)
    let mut edges: HashMap<(u32, u32), (usize, usize)> = HashMap::new();

    for &[i0, i1, i2] in faces {
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let entry = edges.entry((a.min(b), a.max(b))).or_default();
            if a < b {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    let mut topology = EdgeTopology {
        edge_count: edges.len(),
        ..EdgeTopology::default()
    };
    for (forward, backward) in edges.into_values() {
        match forward + backward {
            1 => topology.open_edge_count += 1,
            2 if forward != 1 => topology.inconsistent_edge_count += 1,
            2 => {}
            _ => topology.non_manifold_edge_count += 1,
        }
    }
    topology
}
