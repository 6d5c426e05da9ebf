/// Crop box expansion, view boxes and source rectangles.
pub mod crop;
