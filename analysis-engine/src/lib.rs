//! Pure transformations over post collections: cleaning, pain-point tagging,
//! keyword aggregation and dataset statistics.
//!
//! Every stage takes an immutable dataset and returns a new one.

pub mod aggregate;
pub mod cleaner;
pub mod stats;
pub mod tagger;

pub use aggregate::*;
pub use cleaner::*;
pub use painpoint_core::text::{is_normalized, NormalizedText};
pub use stats::*;
pub use tagger::*;

#[cfg(test)]
pub(crate) mod fixtures;
