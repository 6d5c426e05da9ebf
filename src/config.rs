use std::path::Path;

use anyhow::Context;

use crate::{
    catalog::index::{FilterMode, GroupBy, SeriesCatalog},
    foundation::error::{CollageError, CollageResult},
    geometry::crop::DEFAULT_ZOOM,
    layout::grid::LayoutSpec,
    render::{compositor::CollageStyle, export::DEFAULT_FILENAME_PREFIX},
    textproto::parse::RepeatedFields,
};

/// Default root message a schema must declare.
pub const DEFAULT_ROOT_MESSAGE: &str = "ProductsInfo";

/// Everything that shapes a load and a composition. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CollageConfig {
    /// Field names that always parse as sequences.
    pub repeated_fields: RepeatedFields,
    /// Also treat every `repeated` field declared in the schema as repeated.
    pub repeated_from_schema: bool,
    pub root_message: String,
    pub series: SeriesCatalog,
    pub group_by: GroupBy,
    pub filter_mode: FilterMode,
    /// Only products from this vendor are shown; `None` shows every vendor.
    pub vendor: Option<String>,
    pub zoom: f64,
    pub title: String,
    pub layout: LayoutSpec,
    pub style: CollageStyle,
    pub filename_prefix: String,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            repeated_fields: RepeatedFields::default(),
            repeated_from_schema: true,
            root_message: DEFAULT_ROOT_MESSAGE.to_owned(),
            series: SeriesCatalog::default(),
            group_by: GroupBy::default(),
            filter_mode: FilterMode::default(),
            vendor: Some("jump".to_owned()),
            zoom: DEFAULT_ZOOM,
            title: "My Collection".to_owned(),
            layout: LayoutSpec::default(),
            style: CollageStyle::default(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_owned(),
        }
    }
}

impl CollageConfig {
    pub fn from_json_str(s: &str) -> CollageResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| CollageError::serde(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> CollageResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> CollageResult<()> {
        if self.root_message.trim().is_empty() {
            return Err(CollageError::validation("root_message must be non-empty"));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 || self.zoom > 1.0 {
            return Err(CollageError::validation("zoom must be in (0, 1]"));
        }
        if self.series.fallback.is_empty() {
            return Err(CollageError::validation(
                "series.fallback must be non-empty",
            ));
        }
        if self.series.names.iter().any(|n| n.is_empty()) {
            return Err(CollageError::validation(
                "series.names must not contain empty names",
            ));
        }
        if self.series.names.contains(&self.series.fallback) {
            return Err(CollageError::validation(format!(
                "series.fallback '{}' is also a catalog name",
                self.series.fallback
            )));
        }
        if self.filename_prefix.is_empty()
            || self
                .filename_prefix
                .contains(|c: char| c == '/' || c == '\\')
        {
            return Err(CollageError::validation(
                "filename_prefix must be a non-empty file name fragment",
            ));
        }
        self.layout.validate()?;
        self.style.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
