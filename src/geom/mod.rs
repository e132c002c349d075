mod clip;
mod core;
mod diagnostics;
mod heightfield;
mod interpolate;
mod mesh;
mod samples;
mod solid;
mod triangulation;

pub use clip::{ClipError, CutPlane};
pub use self::core::{Bounds2, Point3, Tolerance, Vec3, triangle_normal};
pub use diagnostics::MeshDiagnostics;
pub use heightfield::{HeightField, HeightFieldError};
pub use interpolate::{
    GridInterpolator, GridSize, GridSpec, InterpolateError, InterpolationMethod,
    LinearInterpolant, NearestInterpolant, ScatteredInterpolant, interpolate, linspace,
};
pub use mesh::{EdgeTopology, TerrainMesh, Triangle, edge_topology};
pub use samples::{Sample, SampleError, SampleSet};
pub use solid::{SolidError, SolidOptions, mesh_heightfield, mesh_solid};
pub use triangulation::triangulate_grid;

#[cfg(test)]
mod tests;
