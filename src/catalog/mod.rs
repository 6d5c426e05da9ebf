//! Typed catalog records: binding, indexing and ownership.

/// Grouping, filtering and tag extraction over bound records.
pub mod index;
/// Typed record shapes.
pub mod model;
/// Ownership set and its on-disk persistence.
pub mod ownership;
/// Proto-style schema reader and binder.
pub mod schema;
