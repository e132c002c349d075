//! Input formats that reduce to elevation samples.

pub mod geojson;
