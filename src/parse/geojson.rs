//! Contour lines from GeoJSON feature collections.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::geom::{SampleError, SampleSet};

pub type GeoJsonResult<T> = Result<T, GeoJsonError>;

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feature {feature} has no `{property}` property")]
    MissingElevation { feature: usize, property: String },
    #[error("feature {feature} has a non-numeric `{property}` property")]
    InvalidElevation { feature: usize, property: String },
    #[error("feature {feature} has a position with fewer than two ordinates")]
    ShortPosition { feature: usize },
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// One contour: a run of planar positions sharing an elevation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub coordinates: Vec<[f64; 2]>,
    pub elevation: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// Read every contour of a FeatureCollection in document order.
///
/// Each polygon ring and each line of a multi-geometry becomes its own
/// contour. Features without geometry or with unsupported geometry types
/// are skipped.
pub fn parse_contours(input: &str, elevation_property: &str) -> GeoJsonResult<Vec<ContourLine>> {
    let collection: FeatureCollection = serde_json::from_str(input)?;
    log::debug!("parsing {} GeoJSON features", collection.features.len());

    let mut contours = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            log::warn!("feature {index} has no geometry, skipping");
            continue;
        };
        let lines = match geometry {
            Geometry::Point { coordinates } => vec![vec![coordinates]],
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                vec![coordinates]
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates
            }
            Geometry::MultiPolygon { coordinates } => coordinates.into_iter().flatten().collect(),
            Geometry::Unsupported => {
                log::warn!("feature {index} has an unsupported geometry type, skipping");
                continue;
            }
        };

        let elevation = read_elevation(feature.properties.as_ref(), elevation_property, index)?;
        for line in lines {
            let coordinates = line
                .iter()
                .map(|position| match position.as_slice() {
                    [x, y, ..] => Ok([*x, *y]),
                    _ => Err(GeoJsonError::ShortPosition { feature: index }),
                })
                .collect::<GeoJsonResult<Vec<_>>>()?;
            contours.push(ContourLine {
                coordinates,
                elevation,
            });
        }
    }

    log::info!("read {} contour lines", contours.len());
    Ok(contours)
}

/// Parse `input` and flatten its contours into samples.
pub fn parse_samples(input: &str, elevation_property: &str) -> GeoJsonResult<SampleSet> {
    let contours = parse_contours(input, elevation_property)?;
    Ok(samples_from_contours(&contours)?)
}

/// One sample per contour position.
pub fn samples_from_contours(contours: &[ContourLine]) -> Result<SampleSet, SampleError> {
    SampleSet::from_triples(contours.iter().flat_map(|contour| {
        contour
            .coordinates
            .iter()
            .map(move |&[x, y]| (x, y, contour.elevation))
    }))
}

fn read_elevation(
    properties: Option<&Map<String, JsonValue>>,
    property: &str,
    feature: usize,
) -> GeoJsonResult<f64> {
    let value = properties
        .and_then(|props| props.get(property))
        .filter(|value| !value.is_null())
        .ok_or_else(|| GeoJsonError::MissingElevation {
            feature,
            property: property.to_owned(),
        })?;

    let elevation = match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    elevation
        .filter(|z| z.is_finite())
        .ok_or_else(|| GeoJsonError::InvalidElevation {
            feature,
            property: property.to_owned(),
        })
}
