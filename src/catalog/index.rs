use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::{
    catalog::model::{ProductRecord, ProductsInfo},
    foundation::error::{CollageError, CollageResult},
};

/// Bucket for products that match no catalog series.
pub const DEFAULT_FALLBACK_SERIES: &str = "Other";

/// Priority-ordered series names plus the reserved fallback bucket.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SeriesCatalog {
    pub names: Vec<String>,
    pub fallback: String,
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            fallback: DEFAULT_FALLBACK_SERIES.to_owned(),
        }
    }
}

impl SeriesCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Sort key: catalog index, with anything not listed after every listed name.
    pub fn priority(&self, name: &str) -> usize {
        self.names
            .iter()
            .position(|n| n == name)
            .unwrap_or(self.names.len())
    }
}

/// First catalog series the product belongs to, or the fallback bucket.
///
/// A series matches when a tag text equals it exactly or a title contains it.
pub fn assign_series<'c>(product: &ProductRecord, catalog: &'c SeriesCatalog) -> &'c str {
    catalog
        .names
        .iter()
        .find(|series| {
            let series = series.as_str();
            product.tag_texts().any(|t| t == series)
                || product.titles().any(|title| title.contains(series))
        })
        .map(String::as_str)
        .unwrap_or(catalog.fallback.as_str())
}

/// Whether products are partitioned by series or laid out as one flat group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Series,
    None,
}

/// Derived group of products. Flat mode produces a single group with an empty name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesGroup<'a> {
    pub name: String,
    pub members: Vec<&'a ProductRecord>,
}

impl SeriesGroup<'_> {
    /// Section title, absent for the implicit flat group.
    pub fn title(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

/// Partition `products` into groups sorted by catalog priority (fallback last).
///
/// Members keep their input order. No input produces no groups.
pub fn group_products<'a, I>(
    products: I,
    catalog: &SeriesCatalog,
    group_by: GroupBy,
) -> Vec<SeriesGroup<'a>>
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    match group_by {
        GroupBy::None => {
            let members: Vec<_> = products.into_iter().collect();
            if members.is_empty() {
                return Vec::new();
            }
            vec![SeriesGroup {
                name: String::new(),
                members,
            }]
        }
        GroupBy::Series => {
            let mut buckets = IndexMap::<&str, Vec<&'a ProductRecord>>::new();
            for p in products {
                buckets.entry(assign_series(p, catalog)).or_default().push(p);
            }
            let mut groups: Vec<_> = buckets
                .into_iter()
                .map(|(name, members)| SeriesGroup {
                    name: name.to_owned(),
                    members,
                })
                .collect();
            groups.sort_by_key(|g| catalog.priority(&g.name));
            groups
        }
    }
}

/// How active tags across dimensions combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Every active tag (over all dimensions) must be present.
    #[default]
    AllTags,
    /// Per non-empty dimension at least one tag must be present; all such dimensions must pass.
    AnyPerDimension,
}

/// Named sets of active tag strings. Empty state matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub mode: FilterMode,
    pub dimensions: IndexMap<String, BTreeSet<String>>,
}

impl FilterState {
    /// Single-dimension AND filter.
    pub fn all_of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_dimension("tags", tags)
    }

    pub fn any_per_dimension() -> Self {
        Self {
            mode: FilterMode::AnyPerDimension,
            dimensions: IndexMap::new(),
        }
    }

    pub fn with_dimension<I, S>(mut self, name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions
            .entry(name.into())
            .or_default()
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Flip one tag in a dimension; returns whether it is now active.
    pub fn toggle(&mut self, dimension: &str, tag: &str) -> bool {
        let set = self.dimensions.entry(dimension.to_owned()).or_default();
        if set.remove(tag) {
            false
        } else {
            set.insert(tag.to_owned());
            true
        }
    }

    /// Drop every active tag ("show all").
    pub fn clear(&mut self) {
        for set in self.dimensions.values_mut() {
            set.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.values().all(BTreeSet::is_empty)
    }

    /// Every active tag string joined for display, in dimension order.
    pub fn active_tags(&self) -> Vec<&str> {
        self.dimensions
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }

    pub fn matches(&self, product: &ProductRecord) -> bool {
        match self.mode {
            FilterMode::AllTags => self
                .dimensions
                .values()
                .all(|active| matches_all_tags(product, active)),
            FilterMode::AnyPerDimension => matches_each_dimension(product, self.dimensions.values()),
        }
    }
}

/// AND filter: every active tag is among the product's primary tags. Empty set matches.
pub fn matches_all_tags(product: &ProductRecord, active: &BTreeSet<String>) -> bool {
    if active.is_empty() {
        return true;
    }
    let tags: BTreeSet<&str> = product.primary_tags().collect();
    active.iter().all(|t| tags.contains(t.as_str()))
}

/// AND-of-ORs filter over dimensions; empty dimensions are ignored.
pub fn matches_each_dimension<'s, I>(product: &ProductRecord, dimensions: I) -> bool
where
    I: IntoIterator<Item = &'s BTreeSet<String>>,
{
    dimensions
        .into_iter()
        .filter(|active| !active.is_empty())
        .all(|active| product.primary_tags().any(|t| active.contains(t)))
}

/// In-memory catalog of bound records with unique product ids.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    products: Vec<ProductRecord>,
    positions: HashMap<String, usize>,
}

impl CatalogIndex {
    pub fn new(products: Vec<ProductRecord>) -> CollageResult<Self> {
        let mut positions = HashMap::with_capacity(products.len());
        for (i, p) in products.iter().enumerate() {
            if positions.insert(p.product_id.clone(), i).is_some() {
                return Err(CollageError::validation(format!(
                    "duplicate productId '{}'",
                    p.product_id
                )));
            }
        }
        Ok(Self {
            products,
            positions,
        })
    }

    pub fn from_info(info: ProductsInfo) -> CollageResult<Self> {
        Self::new(info.products)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn get(&self, product_id: &str) -> Option<&ProductRecord> {
        self.positions
            .get(product_id)
            .and_then(|&i| self.products.get(i))
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.positions.contains_key(product_id)
    }

    /// Sorted, de-duplicated primary tag texts; the filter vocabulary.
    pub fn all_tags(&self) -> Vec<String> {
        self.products
            .iter()
            .flat_map(|p| p.tags.iter())
            .filter_map(|t| t.text_primary.as_deref())
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub fn filter(&self, state: &FilterState) -> Vec<&ProductRecord> {
        self.products.iter().filter(|p| state.matches(p)).collect()
    }

    /// Products eligible for display: filter match, optional vendor match, at least one image.
    pub fn select(&self, state: &FilterState, vendor: Option<&str>) -> Vec<&ProductRecord> {
        let mut out = Vec::new();
        for p in &self.products {
            if !state.matches(p) {
                continue;
            }
            if let Some(v) = vendor
                && p.vendor != v
            {
                continue;
            }
            if p.images.is_empty() {
                tracing::warn!(product_id = %p.product_id, "product has no images; skipped");
                continue;
            }
            out.push(p);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/index.rs"]
mod tests;
