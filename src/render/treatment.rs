use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    foundation::core::{BezPath, Circle, Point, Rect, Shape},
};

/// Grayscale copy of `image` (Rec. 601 luma); alpha is kept.
///
/// Luma is linear in the channels, so it is applied to premultiplied values directly.
pub fn desaturate(image: &DecodedImage) -> DecodedImage {
    let mut px = image.rgba8_premul.as_ref().clone();
    for p in px.chunks_exact_mut(4) {
        let y = (299 * u32::from(p[0]) + 587 * u32::from(p[1]) + 114 * u32::from(p[2]) + 500)
            / 1000;
        let y = y.min(u32::from(p[3])) as u8;
        p[0] = y;
        p[1] = y;
        p[2] = y;
    }
    DecodedImage {
        width: image.width,
        height: image.height,
        rgba8_premul: Arc::new(px),
    }
}

/// Largest rect with aspect `width:height` centered inside `bounds`.
pub fn fit_contain(width: f64, height: f64, bounds: Rect) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return Rect::from_center_size(bounds.center(), (0.0, 0.0));
    }
    let scale = (bounds.width() / width).min(bounds.height() / height);
    Rect::from_center_size(bounds.center(), (width * scale, height * scale))
}

/// Circle of `radius` tucked into the bottom-right corner of `cell`.
pub fn badge_circle(cell: Rect, radius: f64, margin: f64) -> Circle {
    Circle::new(
        Point::new(cell.x1 - margin - radius, cell.y1 - margin - radius),
        radius,
    )
}

/// Filled checkmark polygon scaled to sit inside `badge`.
pub fn checkmark_path(badge: Circle) -> BezPath {
    const CHECK: [(f64, f64); 6] = [
        (-0.50, 0.02),
        (-0.15, 0.37),
        (0.52, -0.30),
        (0.38, -0.44),
        (-0.15, 0.09),
        (-0.36, -0.12),
    ];
    let r = badge.radius;
    let mut path = BezPath::new();
    for (i, (x, y)) in CHECK.iter().enumerate() {
        let p = Point::new(badge.center.x + x * r, badge.center.y + y * r);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Outline of `circle` as a path.
pub fn circle_path(circle: Circle) -> BezPath {
    circle.to_path(0.1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/treatment.rs"]
mod tests;
