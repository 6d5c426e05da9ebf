use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{CollageError, CollageResult};

/// Default file name for the persisted ownership set.
pub const DEFAULT_OWNERSHIP_FILE: &str = "ownedProductIds.json";

/// Product ids the collector owns.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OwnershipSet(BTreeSet<String>);

impl OwnershipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip ownership of `product_id`; returns whether it is now owned.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.0.remove(product_id) {
            false
        } else {
            self.0.insert(product_id.to_owned());
            true
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.0.contains(product_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of `product_ids` present in the set.
    pub fn count_owned<'a, I>(&self, product_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        product_ids.into_iter().filter(|id| self.contains(id)).count()
    }
}

impl<S: Into<String>> FromIterator<S> for OwnershipSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// JSON-array file holding an [`OwnershipSet`].
#[derive(Clone, Debug)]
pub struct OwnershipStore {
    path: PathBuf,
}

impl OwnershipStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store named [`DEFAULT_OWNERSHIP_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_OWNERSHIP_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file yields an empty set; an unreadable or corrupt one is logged and treated as empty.
    pub fn load(&self) -> OwnershipSet {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return OwnershipSet::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read ownership file");
                return OwnershipSet::new();
            }
        };
        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt ownership file ignored");
                OwnershipSet::new()
            }
        }
    }

    /// Overwrite the file with the current set.
    pub fn save(&self, set: &OwnershipSet) -> CollageResult<()> {
        let ids: Vec<&str> = set.iter().collect();
        let json = serde_json::to_vec(&ids).map_err(|e| CollageError::serde(e.to_string()))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("write ownership file {}", self.path.display()))?;
        tracing::debug!(owned = set.len(), path = %self.path.display(), "saved ownership");
        Ok(())
    }

    /// Toggle one id and persist the result.
    pub fn toggle(&self, set: &mut OwnershipSet, product_id: &str) -> CollageResult<bool> {
        let owned = set.toggle(product_id);
        self.save(set)?;
        Ok(owned)
    }

    /// Remove the persisted file. A missing file is not an error.
    pub fn clear(&self) -> CollageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove ownership file {}", self.path.display()))
                .into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/ownership.rs"]
mod tests;
