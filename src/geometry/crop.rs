//! Percentage-based crop/zoom geometry shared by display view boxes and pixel sampling.

/// Zoom factor applied to crop boxes unless configured otherwise.
///
/// Values below 1 widen the box, leaving a margin around the cropped subject.
pub const DEFAULT_ZOOM: f64 = 0.85;

/// Crop box in percent of the natural image size, `0..=100` on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Declarative insets (percent) for cropping a displayed image without re-encoding it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Pixel-space region sampled from a decoded image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn full(natural_width: u32, natural_height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(natural_width),
            height: f64::from(natural_height),
        }
    }
}

impl CropBox {
    /// The uncropped box.
    pub const FULL: Self = Self {
        x1: 0.0,
        y1: 0.0,
        x2: 100.0,
        y2: 100.0,
    };

    /// Parse `"x1,y1,x2,y2"`.
    ///
    /// Returns `None` unless there are exactly four finite numbers describing a non-empty box.
    pub fn parse(s: &str) -> Option<Self> {
        let mut values = [0.0f64; 4];
        let mut parts = s.split(',');
        for slot in &mut values {
            let v = parts.next()?.trim().parse::<f64>().ok()?;
            if !v.is_finite() {
                return None;
            }
            *slot = v;
        }
        if parts.next().is_some() {
            return None;
        }
        let [x1, y1, x2, y2] = values;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self { x1, y1, x2, y2 })
    }

    /// Widen the box by `1 / zoom` around its center and clamp it to `0..=100`.
    ///
    /// A zoom that is not finite and positive leaves the size unchanged.
    pub fn zoomed(self, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        let width = self.x2 - self.x1;
        let height = self.y2 - self.y1;
        let pad_x = (width / zoom - width) / 2.0;
        let pad_y = (height / zoom - height) / 2.0;
        Self {
            x1: clamp_pct(self.x1 - pad_x),
            y1: clamp_pct(self.y1 - pad_y),
            x2: clamp_pct(self.x2 + pad_x),
            y2: clamp_pct(self.y2 + pad_y),
        }
    }

    pub fn view_box(self) -> ViewBox {
        ViewBox {
            top: self.y1,
            right: 100.0 - self.x2,
            bottom: 100.0 - self.y2,
            left: self.x1,
        }
    }

    pub fn source_rect(self, natural_width: u32, natural_height: u32) -> SourceRect {
        let w = f64::from(natural_width);
        let h = f64::from(natural_height);
        SourceRect {
            x: self.x1 / 100.0 * w,
            y: self.y1 / 100.0 * h,
            width: (self.x2 - self.x1) / 100.0 * w,
            height: (self.y2 - self.y1) / 100.0 * h,
        }
    }
}

fn clamp_pct(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Resolve an optional crop string into the effective (zoomed) box.
///
/// Absent or malformed input falls back to [`CropBox::FULL`].
pub fn effective_crop(crop_rect: Option<&str>, zoom: f64) -> CropBox {
    match crop_rect.and_then(CropBox::parse) {
        Some(b) => b.zoomed(zoom),
        None => CropBox::FULL,
    }
}

/// Display insets for an optional crop string.
pub fn view_box_for(crop_rect: Option<&str>, zoom: f64) -> ViewBox {
    effective_crop(crop_rect, zoom).view_box()
}

/// Pixel sampling rectangle for an optional crop string and natural image size.
pub fn source_rect_for(
    crop_rect: Option<&str>,
    zoom: f64,
    natural_width: u32,
    natural_height: u32,
) -> SourceRect {
    effective_crop(crop_rect, zoom).source_rect(natural_width, natural_height)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
