use serde::{Deserialize, Deserializer};

use crate::geometry::crop::{self, CropBox, SourceRect, ViewBox};

/// Product tag; the primary text is also the unit of tag filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
}

/// Every accepted language key on its own, so trilingual tags bind.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TagDef {
    text_primary: Option<String>,
    text_zh: Option<String>,
    text_secondary: Option<String>,
    text_jp: Option<String>,
    text_en: Option<String>,
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let def = TagDef::deserialize(deserializer)?;
        Ok(Self {
            text_primary: first_present([def.text_primary, def.text_zh]),
            text_secondary: first_present([def.text_secondary, def.text_jp, def.text_en]),
        })
    }
}

impl Tag {
    pub fn primary(text: impl Into<String>) -> Self {
        Self {
            text_primary: Some(text.into()),
            text_secondary: None,
        }
    }

    /// Non-empty primary and secondary texts, in that order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        [self.text_primary.as_deref(), self.text_secondary.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
    }
}

/// Image location plus an optional `"x1,y1,x2,y2"` percentage crop.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRef {
    pub url: String,
    pub crop_rect: Option<String>,
}

impl ImageRef {
    pub fn uncropped(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            crop_rect: None,
        }
    }

    /// The effective crop after zoom expansion, or the full image.
    pub fn crop_box(&self, zoom: f64) -> CropBox {
        crop::effective_crop(self.crop_rect.as_deref(), zoom)
    }

    pub fn view_box(&self, zoom: f64) -> ViewBox {
        self.crop_box(zoom).view_box()
    }

    pub fn source_rect(&self, zoom: f64, natural_width: u32, natural_height: u32) -> SourceRect {
        self.crop_box(zoom)
            .source_rect(natural_width, natural_height)
    }
}

/// A bound catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_id: String,
    pub title_primary: Option<String>,
    pub title_secondary: Option<String>,
    pub vendor: String,
    pub tags: Vec<Tag>,
    pub images: Vec<ImageRef>,
}

impl ProductRecord {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            title_primary: None,
            title_secondary: None,
            vendor: String::new(),
            tags: Vec::new(),
            images: Vec::new(),
        }
    }

    /// All non-empty tag texts (primary and secondary).
    pub fn tag_texts(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().flat_map(Tag::texts)
    }

    /// Non-empty primary tag texts; what tag filters compare against.
    pub fn primary_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter_map(|t| t.text_primary.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn has_tag(&self, text: &str) -> bool {
        self.primary_tags().any(|t| t == text)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        [self.title_primary.as_deref(), self.title_secondary.as_deref()]
            .into_iter()
            .flatten()
    }

    /// Image used for thumbnails.
    pub fn cover_image(&self) -> Option<&ImageRef> {
        self.images.first()
    }

    /// Human readable label: primary title, then secondary title, then the id.
    pub fn display_title(&self) -> &str {
        self.titles()
            .find(|t| !t.is_empty())
            .unwrap_or(self.product_id.as_str())
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProductRecordDef {
    #[serde(deserialize_with = "string_or_number")]
    product_id: String,
    title_primary: Option<String>,
    title_jp: Option<String>,
    title_secondary: Option<String>,
    title_zh: Option<String>,
    title_en: Option<String>,
    vendor: String,
    tags: Vec<Tag>,
    images: Vec<ImageRef>,
    image_urls: Vec<String>,
}

impl<'de> Deserialize<'de> for ProductRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let def = ProductRecordDef::deserialize(deserializer)?;
        let images = if def.images.is_empty() {
            def.image_urls.into_iter().map(ImageRef::uncropped).collect()
        } else {
            def.images
        };
        Ok(Self {
            product_id: def.product_id,
            title_primary: first_present([def.title_primary, def.title_jp]),
            title_secondary: first_present([def.title_secondary, def.title_zh, def.title_en]),
            vendor: def.vendor,
            tags: def.tags,
            images,
        })
    }
}

/// Root message of a catalog data source.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductsInfo {
    pub products: Vec<ProductRecord>,
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
