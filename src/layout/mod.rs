//! Pure collage layout: canvas size, header lines, section bands and cell slots.

/// Grid and section placement.
pub mod grid;
