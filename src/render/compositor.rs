use std::path::PathBuf;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::{
    assets::{
        decode::DecodedImage,
        fetch::{ImageFetcher, load_image},
    },
    catalog::{model::ImageRef, ownership::OwnershipSet},
    foundation::{
        core::{Point, Rect, Rgba8},
        error::{CollageError, CollageResult},
    },
    layout::grid::{CellSlot, CollageLayout, HeaderRole},
    render::{
        surface::RasterSink,
        treatment::{badge_circle, checkmark_path, circle_path, desaturate, fit_contain},
    },
};

/// Colors, text sizes and treatments for a collage.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CollageStyle {
    pub background: Rgba8,
    pub title_color: Rgba8,
    pub subtitle_color: Rgba8,
    pub progress_color: Rgba8,
    pub section_color: Rgba8,
    pub accent: Rgba8,
    pub card_background: Rgba8,
    pub placeholder: Rgba8,
    pub badge_fill: Rgba8,
    pub badge_check: Rgba8,
    pub empty_color: Rgba8,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub progress_size: f32,
    pub section_size: f32,
    pub empty_size: f32,
    /// Opacity of items that are not owned.
    pub unowned_opacity: f32,
    pub desaturate_unowned: bool,
    pub cell_inset: f64,
    pub accent_width: f64,
    pub badge_radius: f64,
    pub badge_margin: f64,
    pub empty_message: String,
    /// Font file; the system sans-serif face is used when unset or unreadable.
    pub font_path: Option<PathBuf>,
}

impl Default for CollageStyle {
    fn default() -> Self {
        Self {
            background: [250, 248, 245, 255],
            title_color: [33, 33, 33, 255],
            subtitle_color: [90, 90, 90, 255],
            progress_color: [90, 90, 90, 255],
            section_color: [33, 33, 33, 255],
            accent: [230, 81, 0, 255],
            card_background: [255, 255, 255, 255],
            placeholder: [224, 224, 224, 255],
            badge_fill: [46, 125, 50, 255],
            badge_check: [255, 255, 255, 255],
            empty_color: [120, 120, 120, 255],
            title_size: 32.0,
            subtitle_size: 18.0,
            progress_size: 18.0,
            section_size: 22.0,
            empty_size: 20.0,
            unowned_opacity: 0.45,
            desaturate_unowned: true,
            cell_inset: 8.0,
            accent_width: 6.0,
            badge_radius: 14.0,
            badge_margin: 6.0,
            empty_message: "No matching products".to_owned(),
            font_path: None,
        }
    }
}

impl CollageStyle {
    pub fn validate(&self) -> CollageResult<()> {
        for (name, v) in [
            ("title_size", self.title_size),
            ("subtitle_size", self.subtitle_size),
            ("progress_size", self.progress_size),
            ("section_size", self.section_size),
            ("empty_size", self.empty_size),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CollageError::validation(format!(
                    "style.{name} must be finite and > 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.unowned_opacity) {
            return Err(CollageError::validation(
                "style.unowned_opacity must be in [0, 1]",
            ));
        }
        for (name, v) in [
            ("cell_inset", self.cell_inset),
            ("accent_width", self.accent_width),
            ("badge_radius", self.badge_radius),
            ("badge_margin", self.badge_margin),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CollageError::validation(format!(
                    "style.{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome counts of one composition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeReport {
    pub drawn: usize,
    pub placeholders: usize,
    pub owned: usize,
}

/// Draw `layout` onto `sink`, loading every cell image concurrently.
///
/// Returns once every cell has settled; the sink is left ready for `finish`.
#[tracing::instrument(skip_all, fields(cells = layout.cell_count(), width = layout.width, height = layout.height))]
pub async fn compose(
    sink: &mut dyn RasterSink,
    fetcher: &dyn ImageFetcher,
    layout: &CollageLayout,
    ownership: &OwnershipSet,
    style: &CollageStyle,
    zoom: f64,
) -> CollageResult<ComposeReport> {
    let (w, h) = sink.size();
    if (w, h) != (layout.width, layout.height) {
        return Err(CollageError::render(format!(
            "sink is {w}x{h} but layout is {}x{}",
            layout.width, layout.height
        )));
    }

    draw_chrome(sink, layout, style);

    let mut report = ComposeReport::default();
    // Cells are drawn as their images resolve rather than after a join barrier like
    // `acquire_images`, so decoded images are dropped once drawn. Slots are fixed by the layout.
    let mut pending = FuturesUnordered::new();
    for cell in layout.cells() {
        match &cell.image {
            Some(image) => pending.push(async move {
                let res = load_image(fetcher, &image.url).await;
                (cell, res)
            }),
            None => {
                let missing = Err(CollageError::image("product has no image"));
                draw_cell(sink, cell, missing, ownership, style, zoom, &mut report);
            }
        }
    }

    while let Some((cell, res)) = pending.next().await {
        if let Err(e) = &res {
            tracing::warn!(product_id = %cell.product_id, error = %e, "image failed; drawing placeholder");
        }
        draw_cell(sink, cell, res, ownership, style, zoom, &mut report);
    }

    tracing::debug!(
        drawn = report.drawn,
        placeholders = report.placeholders,
        owned = report.owned,
        "composition settled"
    );
    Ok(report)
}

fn draw_chrome(sink: &mut dyn RasterSink, layout: &CollageLayout, style: &CollageStyle) {
    sink.fill_rect(
        Rect::new(0.0, 0.0, f64::from(layout.width), f64::from(layout.height)),
        style.background,
    );

    for line in &layout.header {
        let (size, color) = match line.role {
            HeaderRole::Title => (style.title_size, style.title_color),
            HeaderRole::Subtitle => (style.subtitle_size, style.subtitle_color),
            HeaderRole::Progress => (style.progress_size, style.progress_color),
        };
        sink.draw_text(
            &line.text,
            text_origin(line.rect, size),
            size,
            color,
            Some(line.rect.width() as f32),
        );
    }

    for section in &layout.sections {
        if let (Some(title), Some(band)) = (&section.title, section.band) {
            let inset = (band.height() * 0.2).min(8.0);
            let bar = Rect::new(
                band.x0,
                band.y0 + inset,
                band.x0 + style.accent_width,
                band.y1 - inset,
            );
            sink.fill_rect(bar, style.accent);
            let text_band = Rect::new(bar.x1 + 10.0, band.y0, band.x1, band.y1);
            sink.draw_text(
                title,
                text_origin(text_band, style.section_size),
                style.section_size,
                style.section_color,
                Some(text_band.width() as f32),
            );
        }
        for cell in &section.cells {
            sink.fill_rect(cell.rect, style.card_background);
        }
    }

    if let Some(notice) = layout.empty_notice {
        sink.draw_text(
            &style.empty_message,
            text_origin(notice, style.empty_size),
            style.empty_size,
            style.empty_color,
            Some(notice.width() as f32),
        );
    }
}

fn draw_cell(
    sink: &mut dyn RasterSink,
    cell: &CellSlot,
    image: CollageResult<DecodedImage>,
    ownership: &OwnershipSet,
    style: &CollageStyle,
    zoom: f64,
    report: &mut ComposeReport,
) {
    let owned = ownership.contains(&cell.product_id);
    let inner = cell.rect.inset(-style.cell_inset);

    let drawn = match (image, cell.image.as_ref()) {
        (Ok(img), Some(image_ref)) => {
            match draw_cell_image(sink, &img, image_ref, inner, owned, style, zoom) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        product_id = %cell.product_id,
                        error = %e,
                        "image could not be drawn; drawing placeholder"
                    );
                    false
                }
            }
        }
        _ => false,
    };
    if drawn {
        report.drawn += 1;
    } else {
        sink.fill_rect(inner, style.placeholder);
        report.placeholders += 1;
    }

    if owned {
        let badge = badge_circle(cell.rect, style.badge_radius, style.badge_margin);
        sink.fill_path(&circle_path(badge), style.badge_fill);
        sink.fill_path(&checkmark_path(badge), style.badge_check);
        report.owned += 1;
    }
}

fn draw_cell_image(
    sink: &mut dyn RasterSink,
    img: &DecodedImage,
    image_ref: &ImageRef,
    inner: Rect,
    owned: bool,
    style: &CollageStyle,
    zoom: f64,
) -> CollageResult<()> {
    let src = image_ref.source_rect(zoom, img.width, img.height);
    let dst = fit_contain(src.width, src.height, inner);
    if owned {
        sink.draw_image(img, src, dst, 1.0)
    } else if style.desaturate_unowned {
        sink.draw_image(&desaturate(img), src, dst, style.unowned_opacity)
    } else {
        sink.draw_image(img, src, dst, style.unowned_opacity)
    }
}

/// Top-left text origin that roughly centers one line of `size_px` text in `band`.
fn text_origin(band: Rect, size_px: f32) -> Point {
    let line_height = f64::from(size_px) * 1.2;
    Point::new(band.x0, band.y0 + ((band.height() - line_height) / 2.0).max(0.0))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
