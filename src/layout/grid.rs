use crate::{
    catalog::{index::SeriesGroup, model::ImageRef},
    foundation::{
        core::Rect,
        error::{CollageError, CollageResult},
    },
};

/// Static layout constants, in output pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutSpec {
    pub columns: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
    pub padding: f64,
    pub title_height: f64,
    pub subtitle_height: f64,
    pub progress_height: f64,
    pub header_bottom_margin: f64,
    pub section_header_height: f64,
    pub group_bottom_margin: f64,
    pub empty_notice_height: f64,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            columns: 5,
            cell_width: 200.0,
            cell_height: 200.0,
            gap: 12.0,
            padding: 32.0,
            title_height: 48.0,
            subtitle_height: 28.0,
            progress_height: 28.0,
            header_bottom_margin: 16.0,
            section_header_height: 44.0,
            group_bottom_margin: 24.0,
            empty_notice_height: 80.0,
        }
    }
}

impl LayoutSpec {
    pub fn validate(&self) -> CollageResult<()> {
        if self.columns == 0 {
            return Err(CollageError::validation("layout.columns must be >= 1"));
        }
        for (name, v) in [
            ("cell_width", self.cell_width),
            ("cell_height", self.cell_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CollageError::validation(format!(
                    "layout.{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("gap", self.gap),
            ("padding", self.padding),
            ("title_height", self.title_height),
            ("subtitle_height", self.subtitle_height),
            ("progress_height", self.progress_height),
            ("header_bottom_margin", self.header_bottom_margin),
            ("section_header_height", self.section_header_height),
            ("group_bottom_margin", self.group_bottom_margin),
            ("empty_notice_height", self.empty_notice_height),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CollageError::validation(format!(
                    "layout.{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Width of the cell grid without outer padding.
    pub fn content_width(&self) -> f64 {
        let cols = f64::from(self.columns.max(1));
        cols * self.cell_width + (cols - 1.0) * self.gap
    }

    pub fn canvas_width(&self) -> f64 {
        2.0 * self.padding + self.content_width()
    }

    /// Rows needed for `count` cells.
    pub fn rows_for(&self, count: usize) -> usize {
        count.div_ceil(self.columns.max(1) as usize)
    }

    /// `(row, col)` of the cell at `index` within its group.
    pub fn slot(&self, index: usize) -> (usize, usize) {
        let cols = self.columns.max(1) as usize;
        (index / cols, index % cols)
    }
}

/// Completed/total counter shown in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Rounded completion percentage; zero when there is nothing to complete.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn label(&self) -> String {
        format!("{}/{} ({}%)", self.completed, self.total, self.percent())
    }
}

/// Header texts for one composition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderInfo {
    pub title: String,
    pub subtitle: Option<String>,
    pub progress: Option<Progress>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderRole {
    Title,
    Subtitle,
    Progress,
}

/// One header text line and the band it occupies.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderLine {
    pub role: HeaderRole,
    pub text: String,
    pub rect: Rect,
}

/// Fixed slot for one product.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSlot {
    pub product_id: String,
    pub image: Option<ImageRef>,
    pub row: usize,
    pub col: usize,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionLayout {
    /// `None` for the untitled flat group.
    pub title: Option<String>,
    pub band: Option<Rect>,
    pub rows: usize,
    pub cells: Vec<CellSlot>,
}

/// Complete placement of a collage, computed before any image is loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct CollageLayout {
    pub width: u32,
    pub height: u32,
    pub header: Vec<HeaderLine>,
    pub sections: Vec<SectionLayout>,
    pub empty_notice: Option<Rect>,
}

impl CollageLayout {
    pub fn cells(&self) -> impl Iterator<Item = &CellSlot> {
        self.sections.iter().flat_map(|s| s.cells.iter())
    }

    pub fn cell_count(&self) -> usize {
        self.sections.iter().map(|s| s.cells.len()).sum()
    }

    pub fn cell(&self, product_id: &str) -> Option<&CellSlot> {
        self.cells().find(|c| c.product_id == product_id)
    }
}

/// Lay out `groups` (already sorted) under `header`.
pub fn compute_layout(
    header: &HeaderInfo,
    groups: &[SeriesGroup<'_>],
    spec: &LayoutSpec,
) -> CollageLayout {
    let left = spec.padding;
    let right = spec.padding + spec.content_width();
    let mut y = spec.padding;

    let mut lines = Vec::new();
    let mut push_line = |role, text: String, height: f64, y: &mut f64| {
        lines.push(HeaderLine {
            role,
            text,
            rect: Rect::new(left, *y, right, *y + height),
        });
        *y += height;
    };
    push_line(HeaderRole::Title, header.title.clone(), spec.title_height, &mut y);
    if let Some(sub) = header.subtitle.as_ref().filter(|s| !s.is_empty()) {
        push_line(HeaderRole::Subtitle, sub.clone(), spec.subtitle_height, &mut y);
    }
    if let Some(progress) = header.progress {
        push_line(HeaderRole::Progress, progress.label(), spec.progress_height, &mut y);
    }
    y += spec.header_bottom_margin;

    let mut sections = Vec::with_capacity(groups.len());
    for group in groups {
        let title = group.title().map(str::to_owned);
        let band = if title.is_some() {
            let band = Rect::new(left, y, right, y + spec.section_header_height);
            y += spec.section_header_height;
            Some(band)
        } else {
            None
        };

        let rows = spec.rows_for(group.members.len());
        let cells = group
            .members
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (row, col) = spec.slot(i);
                let x0 = left + col as f64 * (spec.cell_width + spec.gap);
                let y0 = y + row as f64 * (spec.cell_height + spec.gap);
                CellSlot {
                    product_id: p.product_id.clone(),
                    image: p.cover_image().cloned(),
                    row,
                    col,
                    rect: Rect::new(x0, y0, x0 + spec.cell_width, y0 + spec.cell_height),
                }
            })
            .collect();
        if rows > 0 {
            y += rows as f64 * spec.cell_height + (rows - 1) as f64 * spec.gap;
        }
        y += spec.group_bottom_margin;

        sections.push(SectionLayout {
            title,
            band,
            rows,
            cells,
        });
    }

    let empty_notice = if sections.is_empty() {
        let r = Rect::new(left, y, right, y + spec.empty_notice_height);
        y += spec.empty_notice_height;
        Some(r)
    } else {
        None
    };
    y += spec.padding;

    CollageLayout {
        width: spec.canvas_width().ceil() as u32,
        height: y.ceil() as u32,
        header: lines,
        sections,
        empty_notice,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
