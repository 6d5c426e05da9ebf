//! catalog-collage turns a textproto product catalog into a collection collage.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: lenient line-oriented textproto -> [`Node`] tree with repeated-field awareness
//! 2. **Normalize**: snake_case keys -> camelCase
//! 3. **Bind**: the tree is bound to typed [`ProductRecord`]s against a proto-style [`Schema`]
//! 4. **Select**: filter by tags, restrict by vendor, group by series ([`CatalogIndex`])
//! 5. **Layout**: a pure grid/section placement ([`CollageLayout`]) computed before any IO
//! 6. **Compose**: every cell image loads concurrently and is drawn into its fixed slot
//! 7. **Export**: premultiplied frame -> PNG bytes, data URL, timestamped file name
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Load order never moves pixels**: cell positions are fixed before the first await.
//! - **Premultiplied RGBA8** from decode through the raster sink; export unpremultiplies.
#![forbid(unsafe_code)]

pub mod assets;
pub mod catalog;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod session;
pub mod textproto;

pub use assets::decode::{DecodedImage, decode_image};
pub use assets::fetch::{FsFetcher, ImageFetcher, acquire_images, decode_data_url, load_image};
pub use catalog::index::{
    CatalogIndex, DEFAULT_FALLBACK_SERIES, FilterMode, FilterState, GroupBy, SeriesCatalog,
    SeriesGroup, assign_series, group_products,
};
pub use catalog::model::{ImageRef, ProductRecord, ProductsInfo, Tag};
pub use catalog::ownership::{DEFAULT_OWNERSHIP_FILE, OwnershipSet, OwnershipStore};
pub use catalog::schema::{FieldDef, MessageDef, Schema, SchemaBinder};
pub use config::{CollageConfig, DEFAULT_ROOT_MESSAGE};
pub use foundation::core::{Canvas, Rgba8, Rgba8Premul};
pub use foundation::error::{CollageError, CollageResult};
pub use geometry::crop::{CropBox, DEFAULT_ZOOM, SourceRect, ViewBox, effective_crop};
pub use layout::grid::{
    CellSlot, CollageLayout, HeaderInfo, LayoutSpec, Progress, SectionLayout, compute_layout,
};
pub use render::compositor::{CollageStyle, ComposeReport, compose};
pub use render::export::{encode_png, export_filename, to_data_url, write_png};
pub use render::surface::{CpuSurface, FrameRGBA, RasterSink};
pub use session::{
    BusyFlag, BusyGuard, CollageOutput, CollagePlan, LoadedCatalog, load_catalog,
    load_catalog_from_paths, plan_collage, render_collage, render_collage_blocking,
    render_plan_to_sink,
};
pub use textproto::node::Node;
pub use textproto::normalize::{camel_case_key, normalize_keys};
pub use textproto::parse::{ParseStats, RecordParser, RepeatedFields, parse_textproto};
