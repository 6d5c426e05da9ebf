//! Image acquisition: fetch bytes from a location, decode to premultiplied RGBA8.

/// Raster decoding.
pub mod decode;
/// Pluggable byte fetchers and the concurrent acquisition barrier.
pub mod fetch;
