//! Contours in, printable solid out.
//!
//! Each stage takes the previous stage's output and returns a new value;
//! nothing is cached between calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{
    GridInterpolator, GridSize, GridSpec, HeightField, InterpolateError, InterpolationMethod,
    MeshDiagnostics, SampleSet, SolidError, SolidOptions, TerrainMesh, mesh_solid,
};
use crate::parse::geojson::{self, GeoJsonError};

/// Everything that shapes the model, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefOptions {
    /// Grid spacing in input units. Ignored when `grid_size` is set.
    pub cell_size: f64,
    /// Vertical exaggeration: the terrain spans `0..=scale_z`.
    pub scale_z: f64,
    /// Depth of the flat base below the lowest terrain point.
    pub base_thickness: f64,
    /// Explicit grid dimensions, overriding `cell_size`.
    pub grid_size: Option<GridSize>,
    pub method: InterpolationMethod,
    /// GeoJSON feature property holding the contour elevation.
    pub elevation_property: String,
}

impl Default for ReliefOptions {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            scale_z: 1.0,
            base_thickness: 5.0,
            grid_size: None,
            method: InterpolationMethod::Linear,
            elevation_property: "elevation".to_owned(),
        }
    }
}

impl ReliefOptions {
    #[must_use]
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec::from_options(self.cell_size, self.grid_size)
    }

    #[must_use]
    pub fn solid(&self) -> SolidOptions {
        SolidOptions::new(self.scale_z, self.base_thickness)
    }

    /// Check every option before any work is done.
    pub fn validate(&self) -> Result<(), ReliefError> {
        match self.grid_spec() {
            GridSpec::CellSize(cell) if !cell.is_finite() || cell <= 0.0 => {
                return Err(InterpolateError::InvalidCellSize(cell).into());
            }
            GridSpec::Fixed(size) if size.width == 0 || size.height == 0 => {
                return Err(InterpolateError::InvalidGridDimension(size).into());
            }
            GridSpec::Fixed(size) if size.width < 2 || size.height < 2 => {
                return Err(SolidError::InvalidGridSize {
                    width: size.width,
                    height: size.height,
                }
                .into());
            }
            _ => {}
        }
        self.solid().validate()?;
        Ok(())
    }

    /// Parse options from JSON, filling unspecified fields with defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Error)]
pub enum ReliefError {
    #[error("reading contours failed: {0}")]
    Parse(#[from] GeoJsonError),
    #[error("interpolation failed: {0}")]
    Interpolate(#[from] InterpolateError),
    #[error("solid meshing failed: {0}")]
    Solid(#[from] SolidError),
}

/// Result of the full pipeline.
#[derive(Debug, Clone)]
pub struct Relief {
    pub field: HeightField,
    pub mesh: TerrainMesh,
    pub diagnostics: MeshDiagnostics,
}

/// Interpolate `samples` and mesh the resulting height field.
pub fn build_relief(samples: &SampleSet, options: &ReliefOptions) -> Result<Relief, ReliefError> {
    options.validate()?;

    let field = GridInterpolator::new(options.grid_spec())
        .with_method(options.method)
        .interpolate(samples)?;
    let (mesh, diagnostics) = mesh_solid(&field, options.solid())?;

    log::info!(
        "relief {}x{} grid: {} vertices, {} triangles",
        field.width(),
        field.height(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(Relief {
        field,
        mesh,
        diagnostics,
    })
}

/// Parse a GeoJSON contour collection and build its relief.
pub fn contours_to_relief(geojson: &str, options: &ReliefOptions) -> Result<Relief, ReliefError> {
    let samples = geojson::parse_samples(geojson, &options.elevation_property)?;
    log::info!("{} elevation samples", samples.len());
    build_relief(&samples, options)
}

/// Figures reported to callers that do not need the mesh itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliefSummary {
    pub grid_width: usize,
    pub grid_height: usize,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub watertight: bool,
    pub warnings: Vec<String>,
}

impl From<&Relief> for ReliefSummary {
    fn from(relief: &Relief) -> Self {
        Self {
            grid_width: relief.field.width(),
            grid_height: relief.field.height(),
            min_elevation: relief.field.min_elevation(),
            max_elevation: relief.field.max_elevation(),
            vertex_count: relief.mesh.vertex_count(),
            triangle_count: relief.mesh.triangle_count(),
            watertight: relief.diagnostics.is_watertight(),
            warnings: relief.diagnostics.warnings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Sample;

    fn corner_samples() -> SampleSet {
        SampleSet::new(vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(10.0, 0.0, 0.0),
            Sample::new(0.0, 10.0, 10.0),
            Sample::new(10.0, 10.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options = ReliefOptions::from_json(r#"{ "cell_size": 2.0, "method": "nearest" }"#)
            .expect("parse options");
        assert_eq!(options.cell_size, 2.0);
        assert_eq!(options.method, InterpolationMethod::Nearest);
        assert_eq!(options.base_thickness, 5.0);
        assert_eq!(options.elevation_property, "elevation");
        assert_eq!(options.grid_spec(), GridSpec::CellSize(2.0));
    }

    #[test]
    fn grid_size_takes_precedence_over_cell_size() {
        let options = ReliefOptions::from_json(
            r#"{ "cell_size": -1.0, "grid_size": { "width": 4, "height": 3 } }"#,
        )
        .unwrap();
        assert_eq!(options.grid_spec(), GridSpec::Fixed(GridSize::new(4, 3)));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_cell = ReliefOptions {
            cell_size: 0.0,
            ..ReliefOptions::default()
        };
        assert!(matches!(
            bad_cell.validate(),
            Err(ReliefError::Interpolate(InterpolateError::InvalidCellSize(_)))
        ));

        let bad_base = ReliefOptions {
            base_thickness: -1.0,
            ..ReliefOptions::default()
        };
        assert!(matches!(
            bad_base.validate(),
            Err(ReliefError::Solid(SolidError::InvalidBaseThickness(_)))
        ));

        let thin_grid = ReliefOptions {
            grid_size: Some(GridSize::new(1, 5)),
            ..ReliefOptions::default()
        };
        assert!(matches!(
            thin_grid.validate(),
            Err(ReliefError::Solid(SolidError::InvalidGridSize { width: 1, height: 5 }))
        ));
    }

    #[test]
    fn build_relief_produces_closed_solid() {
        let options = ReliefOptions {
            cell_size: 5.0,
            scale_z: 20.0,
            ..ReliefOptions::default()
        };
        let relief = build_relief(&corner_samples(), &options).expect("relief");

        assert_eq!(relief.field.width(), 3);
        assert_eq!(relief.field.height(), 3);
        assert_eq!(relief.mesh.vertex_count(), 18);
        assert_eq!(relief.mesh.triangle_count(), 4 * 2 * 2 + 4 * (2 + 2));
        assert!(relief.diagnostics.is_watertight());

        let summary = ReliefSummary::from(&relief);
        assert_eq!(summary.grid_width, 3);
        assert!(summary.watertight);
        assert!((summary.max_elevation - 10.0).abs() < 1e-9);
    }

    #[test]
    fn errors_name_the_failing_stage() {
        let err = build_relief(&SampleSet::default(), &ReliefOptions::default()).unwrap_err();
        assert!(matches!(err, ReliefError::Interpolate(InterpolateError::EmptyInput)));
        assert!(err.to_string().starts_with("interpolation failed"));
    }
}
