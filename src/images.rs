//! Image resolution: decide which images to download, fetch them, cache them.
//!
//! Each distinct image id is fetched at most once per run. Placeholder
//! images and ids already in the cache are skipped. A failed fetch is
//! logged and counted; the image is then simply absent from every bundle.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::contract::{ImageFetcher, ImageStore};
use crate::error::ConvertError;
use crate::recipe::{CanonicalRecipe, ImageRef};

/// Image cache backed by one file per image id in a directory.
#[derive(Debug, Clone)]
pub struct DirImageStore {
    dir: PathBuf,
}

impl DirImageStore {
    /// Use `dir` as the cache, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConvertError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;
        debug!(path = %dir.display(), "Opened image cache directory");
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }
}

impl ImageStore for DirImageStore {
    fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    fn read(&self, id: &str) -> io::Result<String> {
        fs::read_to_string(self.path_for(id))
    }

    fn write(&self, id: &str, encoded: &str) -> io::Result<()> {
        fs::write(self.path_for(id), encoded)
    }
}

/// What the resolver did, for the operator report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// Distinct images that needed downloading.
    pub planned: usize,
    pub fetched: usize,
    pub failed: usize,
    /// Image references skipped because they point at the placeholder.
    pub skipped_placeholder: usize,
    /// Distinct images already present in the cache.
    pub already_cached: usize,
}

/// Distinct images to download, in first-seen order.
///
/// Returns the plan together with a report pre-filled with the skip counts.
pub fn plan_downloads<'a>(
    recipes: impl IntoIterator<Item = &'a CanonicalRecipe>,
    store: &dyn ImageStore,
    placeholder_marker: &str,
) -> (Vec<ImageRef>, ImageReport) {
    let mut seen = HashSet::new();
    let mut plan = Vec::new();
    let mut report = ImageReport::default();

    for image in recipes.into_iter().flat_map(|recipe| recipe.images.iter()) {
        if !placeholder_marker.is_empty() && image.url.contains(placeholder_marker) {
            report.skipped_placeholder += 1;
            continue;
        }
        if !seen.insert(image.id.as_str()) {
            continue;
        }
        if store.exists(&image.id) {
            report.already_cached += 1;
            continue;
        }
        plan.push(image.clone());
    }

    report.planned = plan.len();
    (plan, report)
}

/// Fetch every planned image with at most `concurrency` requests in flight
/// and write the successful ones to `store` as base64 text.
///
/// Only a failing cache write is an error; fetch failures are counted.
pub async fn download_images<'a, F>(
    recipes: impl IntoIterator<Item = &'a CanonicalRecipe>,
    fetcher: &F,
    store: &dyn ImageStore,
    placeholder_marker: &str,
    concurrency: usize,
) -> Result<ImageReport, ConvertError>
where
    F: ImageFetcher + ?Sized,
{
    let (plan, mut report) = plan_downloads(recipes, store, placeholder_marker);
    info!(
        planned = report.planned,
        cached = report.already_cached,
        placeholders = report.skipped_placeholder,
        "Downloading images"
    );

    let results: Vec<_> = stream::iter(plan)
        .map(|image| async move {
            let result = fetcher.fetch(&image.url).await;
            (image, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (image, result) in results {
        match result {
            Ok(bytes) => {
                store
                    .write(&image.id, &STANDARD.encode(&bytes))
                    .map_err(|source| ConvertError::Store {
                        id: image.id.clone(),
                        source,
                    })?;
                debug!(id = %image.id, size = bytes.len(), "Cached image");
                report.fetched += 1;
            }
            Err(e) => {
                warn!(id = %image.id, url = %image.url, error = %e, "Image download failed, omitting");
                report.failed += 1;
            }
        }
    }

    info!(
        fetched = report.fetched,
        failed = report.failed,
        "Image download finished"
    );
    Ok(report)
}
