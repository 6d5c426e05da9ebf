use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{core::Canvas, error::CollageResult};

/// Decoded raster with premultiplied RGBA8 pixels, row-major, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Natural size of the image in pixels.
    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Build from straight RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> Self {
        premultiply_rgba8_in_place(&mut rgba8);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        }
    }
}

/// Decode any format `image` recognizes (sniffed from the bytes).
pub fn decode_image(bytes: &[u8]) -> CollageResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::from_straight_rgba8(width, height, rgba.into_raw()))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
