use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, BezPath, Point, Rect, Rgba8},
        error::{CollageError, CollageResult},
    },
    geometry::crop::SourceRect,
    render::text::{FontBytes, TextLayoutEngine},
};

/// Final frame in RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Drawing target the compositor writes to, in output pixel space.
///
/// Colors are straight RGBA8.
pub trait RasterSink {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    fn fill_path(&mut self, path: &BezPath, color: Rgba8);

    /// Draw the `src` region of `image` scaled into `dst`.
    fn draw_image(
        &mut self,
        image: &DecodedImage,
        src: SourceRect,
        dst: Rect,
        opacity: f32,
    ) -> CollageResult<()>;

    /// Draw one line (or wrapped block) of text with its top-left at `origin`.
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba8,
        max_width: Option<f32>,
    );

    /// Read out everything drawn so far.
    fn finish(&mut self) -> CollageResult<FrameRGBA>;
}

/// CPU raster sink backed by `vello_cpu`, with Parley text.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    text: Option<TextLayoutEngine>,
    warned_no_font: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Surface without a font; text draws are skipped.
    pub fn new(width: u32, height: u32) -> CollageResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| CollageError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| CollageError::render("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(CollageError::render("surface size must be non-zero"));
        }
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            text: None,
            warned_no_font: false,
        })
    }

    /// Surface with text support when `font` is present.
    pub fn with_font(width: u32, height: u32, font: Option<FontBytes>) -> CollageResult<Self> {
        let mut surface = Self::new(width, height)?;
        surface.text = match font.map(TextLayoutEngine::new).transpose() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "font could not be registered; text disabled");
                None
            }
        };
        Ok(surface)
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    fn reset_transforms(&mut self) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl RasterSink for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.reset_transforms();
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        self.reset_transforms();
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn draw_image(
        &mut self,
        image: &DecodedImage,
        src: SourceRect,
        dst: Rect,
        opacity: f32,
    ) -> CollageResult<()> {
        if src.width <= 0.0 || src.height <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Ok(());
        }
        let pixmap =
            pixmap_from_premul_bytes(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        let transform = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width, dst.height() / src.height)
            * Affine::translate((-src.x, -src.y));

        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint);
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            src.x,
            src.y,
            src.x + src.width,
            src.y + src.height,
        ));
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba8,
        max_width: Option<f32>,
    ) {
        if text.is_empty() {
            return;
        }
        let Some(engine) = self.text.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font available; text is not drawn");
                self.warned_no_font = true;
            }
            return;
        };
        let layout = match engine.layout_plain(text, size_px, color.into(), max_width) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, "text layout failed");
                return;
            }
        };
        let font = engine.font().clone();

        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn finish(&mut self) -> CollageResult<FrameRGBA> {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c[0], c[1], c[2], c[3])
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CollageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CollageError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CollageError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CollageError::render("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
