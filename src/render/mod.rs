//! Drawing a computed layout onto a raster sink and exporting the result.

/// Composition driver: chrome, concurrent cell loads, ownership treatment.
pub mod compositor;
/// PNG / data URL export and file naming.
pub mod export;
/// Raster sink trait and the CPU implementation.
pub mod surface;
/// Parley text shaping and font resolution.
pub mod text;
/// Pixel treatments and badge geometry.
pub mod treatment;
