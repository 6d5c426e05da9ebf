use std::{io::Cursor, path::Path};

use anyhow::Context;
use base64::Engine;

use crate::{
    foundation::error::{CollageError, CollageResult},
    render::surface::FrameRGBA,
};

/// Default prefix for generated export file names.
pub const DEFAULT_FILENAME_PREFIX: &str = "collection";

/// Straight-alpha copy of `frame`'s pixels.
pub fn straight_rgba8(frame: &FrameRGBA) -> Vec<u8> {
    if !frame.premultiplied {
        return frame.data.clone();
    }
    let mut out = frame.data.clone();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Encode `frame` as PNG.
pub fn encode_png(frame: &FrameRGBA) -> CollageResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight_rgba8(frame))
        .ok_or_else(|| CollageError::render("frame byte length does not match its size"))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| CollageError::render(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// `data:image/png;base64,...` form of encoded PNG bytes.
pub fn to_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// `<prefix>-<pct>pct-<YYYYMMDD-HHMMSS>.png`.
pub fn export_filename(prefix: &str, percent: u32, at: chrono::NaiveDateTime) -> String {
    format!("{prefix}-{percent}pct-{}.png", at.format("%Y%m%d-%H%M%S"))
}

pub fn write_png(path: &Path, png: &[u8]) -> CollageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::write(path, png).with_context(|| format!("write png {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
