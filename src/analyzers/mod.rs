//! Complaint normalization, filtering and aggregation.
//!
//! The pipeline runs as pure functions over an immutable snapshot:
//! [`normalize()`] derives per-record flags once at load time, then every
//! interaction applies [`Filters`] and recomputes the summaries in
//! [`aggregate`] from scratch.

pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod types;
pub mod utility;

#[cfg(test)]
pub(crate) mod test_support;

pub use filter::{Filters, Selector};
pub use normalize::{DerivedPolicy, NormalizeReport, Normalized, normalize};
