use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;
use futures::future::{BoxFuture, FutureExt};

use crate::{
    assets::decode::{DecodedImage, decode_image},
    foundation::error::{CollageError, CollageResult},
};

const DATA_URL_PREFIX: &str = "data:";

/// Source of raw image bytes for a location string.
///
/// Implementations must not share failure between calls: one bad location only fails its own
/// future.
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, CollageResult<Vec<u8>>>;
}

/// Fetcher for `data:` URLs, `file://` URLs and filesystem paths.
///
/// Relative paths resolve against `root`. Any other URL scheme fails.
///
/// Reads are blocking and complete on the first poll, so under `block_on` the loads of one
/// composition run one after another. Slow or remote sources belong in a fetcher whose futures
/// actually yield.
#[derive(Clone, Debug, Default)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `url`, or `None` for `data:` URLs.
    pub fn resolve(&self, url: &str) -> CollageResult<Option<PathBuf>> {
        if url.starts_with(DATA_URL_PREFIX) {
            return Ok(None);
        }
        if url.starts_with("file:") {
            let parsed = url::Url::parse(url).context("parse file url")?;
            let path = parsed
                .to_file_path()
                .map_err(|()| CollageError::image(format!("file url has no local path: {url}")))?;
            return Ok(Some(path));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            return Err(CollageError::image(format!(
                "unsupported url scheme '{scheme}': {url}"
            )));
        }
        let path = Path::new(url);
        Ok(Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }))
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, CollageResult<Vec<u8>>> {
        async move {
            match self.resolve(url)? {
                None => decode_data_url(url),
                Some(path) => Ok(std::fs::read(&path)
                    .with_context(|| format!("read image {}", path.display()))?),
            }
        }
        .boxed()
    }
}

/// Fetch and decode a single image.
pub async fn load_image(fetcher: &dyn ImageFetcher, url: &str) -> CollageResult<DecodedImage> {
    let bytes = fetcher.fetch(url).await?;
    decode_image(&bytes).map_err(|e| CollageError::image(format!("{url}: {e}")))
}

/// Start every fetch+decode at once and wait for all of them.
///
/// Results are in input order. Failures are logged and returned in place; they never cancel
/// the remaining loads. `compose` does not go through here: it draws each cell as soon as its
/// own load resolves instead of holding every decoded image until the last one arrives.
#[tracing::instrument(skip_all, fields(count = urls.len()))]
pub async fn acquire_images(
    fetcher: &dyn ImageFetcher,
    urls: &[&str],
) -> Vec<CollageResult<DecodedImage>> {
    let results = futures::future::join_all(urls.iter().map(|url| load_image(fetcher, url))).await;
    for (url, res) in urls.iter().zip(&results) {
        if let Err(e) = res {
            tracing::warn!(%url, error = %e, "image failed to load");
        }
    }
    results
}

/// Decode the payload of a `data:` URL (base64 or percent-encoded).
pub fn decode_data_url(url: &str) -> CollageResult<Vec<u8>> {
    let rest = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| CollageError::image("url does not start with 'data:'"))?;
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| CollageError::image("missing comma in data url"))?;
    let is_base64 = metadata
        .split(';')
        .skip(1)
        .any(|p| p.trim().eq_ignore_ascii_case("base64"));

    if is_base64 {
        let cleaned: Vec<u8> = data.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| CollageError::image(format!("invalid base64 in data url: {e}")))
    } else {
        percent_decode(data)
    }
}

fn percent_decode(input: &str) -> CollageResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| CollageError::image("invalid percent-escape in data url"))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
