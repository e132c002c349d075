use super::core::Bounds2;

/// A single elevation observation taken along a contour line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
}

impl Sample {
    #[must_use]
    pub const fn new(x: f64, y: f64, elevation: f64) -> Self {
        Self { x, y, elevation }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.elevation.is_finite()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SampleError {
    #[error("sample {index} has a non-finite coordinate or elevation")]
    NonFinite { index: usize },
}

/// Ordered collection of scattered samples.
///
/// Duplicates are allowed. Every sample is finite; emptiness is checked by
/// the interpolator rather than here so an empty set can still be built and
/// reported as [`InterpolateError::EmptyInput`](super::InterpolateError::EmptyInput).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(samples: Vec<Sample>) -> Result<Self, SampleError> {
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SampleError::NonFinite { index });
        }
        Ok(Self { samples })
    }

    /// Build a set from `(x, y, elevation)` triples.
    pub fn from_triples<I>(triples: I) -> Result<Self, SampleError>
    where
        I: IntoIterator<Item = (f64, f64, f64)>,
    {
        Self::new(
            triples
                .into_iter()
                .map(|(x, y, elevation)| Sample::new(x, y, elevation))
                .collect(),
        )
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_xy(self.samples.iter().map(|s| (s.x, s.y)))
    }

    #[must_use]
    pub fn min_elevation(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.elevation).reduce(f64::min)
    }

    #[must_use]
    pub fn max_elevation(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.elevation).reduce(f64::max)
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
