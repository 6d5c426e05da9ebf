use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context;

use crate::{
    assets::fetch::ImageFetcher,
    catalog::{
        index::{CatalogIndex, FilterState, group_products},
        ownership::OwnershipSet,
        schema::{Schema, SchemaBinder},
    },
    config::CollageConfig,
    foundation::error::{CollageError, CollageResult},
    layout::grid::{CollageLayout, HeaderInfo, Progress, compute_layout},
    render::{
        compositor::{ComposeReport, compose},
        export::{encode_png, export_filename},
        surface::{CpuSurface, FrameRGBA, RasterSink},
        text::resolve_font,
    },
    textproto::{
        normalize::normalize_keys,
        parse::{ParseStats, RecordParser},
    },
};

/// A bound catalog plus what was learned while loading it.
#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    pub index: CatalogIndex,
    pub schema: Schema,
    pub parse_stats: ParseStats,
}

/// Parse, normalize and bind `data_text` against `schema_text`.
///
/// Either the whole catalog loads or an error is returned.
#[tracing::instrument(skip_all, fields(root = %config.root_message))]
pub fn load_catalog(
    schema_text: &str,
    data_text: &str,
    config: &CollageConfig,
) -> CollageResult<LoadedCatalog> {
    let binder = SchemaBinder::new(Schema::parse(schema_text)?, config.root_message.as_str())?;

    let mut repeated = config.repeated_fields.clone();
    if config.repeated_from_schema {
        let declared = binder.schema().repeated_field_names();
        repeated.extend(declared.iter());
    }

    let (tree, parse_stats) = RecordParser::new(repeated).parse_with_stats(data_text);
    let info = binder.bind(normalize_keys(tree))?;
    let index = CatalogIndex::from_info(info)?;
    tracing::info!(products = index.len(), "catalog loaded");

    Ok(LoadedCatalog {
        index,
        schema: binder.schema().clone(),
        parse_stats,
    })
}

pub fn load_catalog_from_paths(
    schema_path: &Path,
    data_path: &Path,
    config: &CollageConfig,
) -> CollageResult<LoadedCatalog> {
    let schema_text = std::fs::read_to_string(schema_path)
        .with_context(|| format!("read schema '{}'", schema_path.display()))?;
    let data_text = std::fs::read_to_string(data_path)
        .with_context(|| format!("read catalog data '{}'", data_path.display()))?;
    load_catalog(&schema_text, &data_text, config)
}

/// Shared "composition in progress" indicator.
#[derive(Clone, Debug, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark busy until the returned guard drops. Fails if already busy.
    pub fn acquire(&self) -> CollageResult<BusyGuard> {
        if self.0.swap(true, Ordering::AcqRel) {
            return Err(CollageError::validation("a composition is already running"));
        }
        Ok(BusyGuard(self.0.clone()))
    }
}

/// Clears its [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Layout and counters for one composition, before anything is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct CollagePlan {
    pub layout: CollageLayout,
    pub progress: Progress,
}

/// Select, group and lay out the products that `filter` admits.
pub fn plan_collage(
    catalog: &CatalogIndex,
    filter: &FilterState,
    ownership: &OwnershipSet,
    config: &CollageConfig,
) -> CollagePlan {
    let selected = catalog.select(filter, config.vendor.as_deref());
    let progress = Progress::new(
        ownership.count_owned(selected.iter().map(|p| p.product_id.as_str())),
        selected.len(),
    );
    let groups = group_products(selected.iter().copied(), &config.series, config.group_by);

    let active = filter.active_tags();
    let header = HeaderInfo {
        title: config.title.clone(),
        subtitle: (!active.is_empty()).then(|| active.join(" / ")),
        progress: Some(progress),
    };
    CollagePlan {
        layout: compute_layout(&header, &groups, &config.layout),
        progress,
    }
}

/// Rendered collage ready to be saved or shared.
#[derive(Clone, Debug)]
pub struct CollageOutput {
    pub frame: FrameRGBA,
    pub png: Vec<u8>,
    pub filename: String,
    pub progress: Progress,
    pub report: ComposeReport,
}

/// Compose `plan` onto `sink`, wait for every cell, then export.
pub async fn render_plan_to_sink(
    plan: &CollagePlan,
    sink: &mut dyn RasterSink,
    fetcher: &dyn ImageFetcher,
    ownership: &OwnershipSet,
    config: &CollageConfig,
) -> CollageResult<CollageOutput> {
    let report = compose(
        sink,
        fetcher,
        &plan.layout,
        ownership,
        &config.style,
        config.zoom,
    )
    .await?;
    let frame = sink.finish()?;
    let png = encode_png(&frame)?;
    let filename = export_filename(
        &config.filename_prefix,
        plan.progress.percent(),
        chrono::Local::now().naive_local(),
    );
    tracing::info!(%filename, bytes = png.len(), "collage exported");
    Ok(CollageOutput {
        frame,
        png,
        filename,
        progress: plan.progress,
        report,
    })
}

/// Plan, draw on a [`CpuSurface`] and export. `busy` is held for the whole call.
#[tracing::instrument(skip_all)]
pub async fn render_collage(
    catalog: &CatalogIndex,
    filter: &FilterState,
    ownership: &OwnershipSet,
    config: &CollageConfig,
    fetcher: &dyn ImageFetcher,
    busy: &BusyFlag,
) -> CollageResult<CollageOutput> {
    let _guard = busy.acquire()?;
    let plan = plan_collage(catalog, filter, ownership, config);
    let mut surface = CpuSurface::with_font(
        plan.layout.width,
        plan.layout.height,
        resolve_font(config.style.font_path.as_deref()),
    )?;
    render_plan_to_sink(&plan, &mut surface, fetcher, ownership, config).await
}

/// [`render_collage`] on the current thread.
pub fn render_collage_blocking(
    catalog: &CatalogIndex,
    filter: &FilterState,
    ownership: &OwnershipSet,
    config: &CollageConfig,
    fetcher: &dyn ImageFetcher,
    busy: &BusyFlag,
) -> CollageResult<CollageOutput> {
    futures::executor::block_on(render_collage(
        catalog, filter, ownership, config, fetcher, busy,
    ))
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
