//! Persisting terrain solids.

pub mod stl;
