//! Mesh diagnostics for the solid mesher.
//!
//! The mesher builds the solid so that every edge is shared by exactly two
//! faces with opposite winding. These diagnostics re-derive that from the
//! finished index buffer instead of trusting the construction, and are
//! returned alongside every mesh.
//!
//! # Example
//!
//! ```ignore
//! use contour_relief::geom::{HeightField, SolidOptions, mesh_solid};
//!
//! let (mesh, diagnostics) = mesh_solid(&field, SolidOptions::default())?;
//! if !diagnostics.is_watertight() {
//!     eprintln!("{diagnostics}");
//! }
//! ```

use std::fmt;

use super::mesh::{TerrainMesh, edge_topology};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Number of zero-area triangles.
    ///
    /// Walls collapse to zero area where the terrain touches the base plane,
    /// e.g. with a zero base thickness. They are kept so the topology stays
    /// closed.
    pub degenerate_triangle_count: usize,

    /// Edges with only one adjacent triangle (holes in the solid).
    pub open_edge_count: usize,

    /// Edges with more than two adjacent triangles.
    pub non_manifold_edge_count: usize,

    /// Edges whose two triangles traverse them in the same direction,
    /// i.e. one of the pair has reversed winding.
    pub inconsistent_edge_count: usize,

    /// Enclosed volume; positive when the faces wind outward.
    pub signed_volume: f64,

    /// Human-readable warnings about mesh issues.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    #[must_use]
    pub fn from_mesh(mesh: &TerrainMesh) -> Self {
        let topology = edge_topology(&mesh.faces);
        let mut diagnostics = Self {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            degenerate_triangle_count: mesh.degenerate_triangle_count(),
            open_edge_count: topology.open_edge_count,
            non_manifold_edge_count: topology.non_manifold_edge_count,
            inconsistent_edge_count: topology.inconsistent_edge_count,
            signed_volume: mesh.signed_volume(),
            warnings: Vec::new(),
        };

        if diagnostics.open_edge_count > 0 {
            diagnostics.add_warning("mesh has open edges");
        }
        if diagnostics.non_manifold_edge_count > 0 {
            diagnostics.add_warning("mesh has non-manifold edges");
        }
        if diagnostics.inconsistent_edge_count > 0 {
            diagnostics.add_warning("mesh has inconsistent triangle winding");
        }
        if diagnostics.signed_volume < 0.0 {
            diagnostics.add_warning("mesh faces point inward");
        }
        diagnostics
    }

    /// No open, non-manifold or inconsistently wound edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
            && self.non_manifold_edge_count == 0
            && self.inconsistent_edge_count == 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.inconsistent_edge_count > 0 {
            parts.push(format!("inconsistent:{}", self.inconsistent_edge_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for warning in &self.warnings {
            write!(f, "\n  warning: {warning}")?;
        }
        Ok(())
    }
}
