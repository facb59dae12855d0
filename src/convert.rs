//! High-level pipeline: orchestrates normalize → fetch images → build bundles.
//!
//! This module provides the top-level orchestration for one conversion run
//! as described by a [`ConvertConfig`]. It:
//!   - Reads `recipes.json` and `cookbooks.json` from the input directory
//!   - Normalizes both exports into canonical recipes with cookbook memberships
//!   - Writes the canonical listing to `<output_dir>/recipes.json`
//!   - Populates the image cache through an [`ImageFetcher`]
//!   - Writes one `.crumb` bundle per recipe
//!   - Returns a [`ConvertReport`] including the unknown unit tokens
//!
//! # Error Handling
//! Decode and missing-field errors abort the run before anything is written.
//! Image fetch failures are counted in the report and never abort.
//!
//! # Navigation
//! - Main entrypoint: [`convert`]
//! - Supporting types: [`ConvertReport`]

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::bundle::BundleBuilder;
use crate::config::ConvertConfig;
use crate::contract::{IdGenerator, ImageFetcher};
use crate::error::ConvertError;
use crate::images::{download_images, DirImageStore, ImageReport};
use crate::normalize::{normalize, ExportRecord};
use crate::slug::slugify;
use crate::units::UnitReconciler;

pub const RECIPES_FILE: &str = "recipes.json";
pub const COOKBOOKS_FILE: &str = "cookbooks.json";
pub const BUNDLE_EXTENSION: &str = "crumb";

/// Outcome of a completed run.
#[derive(Debug)]
pub struct ConvertReport {
    pub recipes: usize,
    pub listing: PathBuf,
    pub bundles: Vec<PathBuf>,
    pub images: ImageReport,
    /// Distinct unit tokens without a mapping, in first-seen order.
    pub unmapped_units: Vec<String>,
}

fn read_export(path: &Path) -> Result<Vec<ExportRecord>, ConvertError> {
    let bytes = fs::read(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read export file");
        ConvertError::io(path, e)
    })?;
    serde_json::from_slice(&bytes).map_err(|source| {
        error!(error = %source, path = %path.display(), "Failed to parse export file");
        ConvertError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// `<n>-<slug>.crumb`, with `n` starting at 1.
pub fn bundle_file_name(position: usize, title: &str) -> String {
    let slug = slugify(title);
    let slug = if slug.is_empty() { "recipe".to_string() } else { slug };
    format!("{position}-{slug}.{BUNDLE_EXTENSION}")
}

pub async fn convert<F>(
    config: &ConvertConfig,
    fetcher: &F,
    ids: &dyn IdGenerator,
) -> Result<ConvertReport, ConvertError>
where
    F: ImageFetcher + ?Sized,
{
    info!("[CONVERT] Starting conversion");

    // Step 1: Load and normalize. Nothing is written before this succeeds.
    let recipe_records = read_export(&config.input_dir.join(RECIPES_FILE))?;
    let cookbook_records = read_export(&config.input_dir.join(COOKBOOKS_FILE))?;
    let recipes = normalize(&recipe_records, &cookbook_records)?;
    info!(recipes = recipes.len(), "[CONVERT] Found recipes");

    // Step 2: Canonical listing.
    fs::create_dir_all(&config.output_dir).map_err(|e| ConvertError::io(&config.output_dir, e))?;
    let listing = config.output_dir.join(RECIPES_FILE);
    let json = serde_json::to_vec_pretty(&recipes).map_err(|source| ConvertError::Json {
        path: listing.clone(),
        source,
    })?;
    fs::write(&listing, json).map_err(|e| ConvertError::io(&listing, e))?;
    info!(path = %listing.display(), "[CONVERT] Wrote recipe listing");

    // Step 3: Images.
    let store = DirImageStore::open(config.images_dir())?;
    let images = download_images(
        recipes.values(),
        fetcher,
        &store,
        &config.fetch.placeholder_marker,
        config.fetch.concurrency,
    )
    .await?;

    // Step 4: Bundles.
    let builder = BundleBuilder::new(ids, &store, &config.bundle);
    let mut units = UnitReconciler::new();
    let mut bundles = Vec::with_capacity(recipes.len());
    for (index, recipe) in recipes.values().enumerate() {
        let bundle = builder.build(recipe, &mut units)?;
        let path = config.output_dir.join(bundle_file_name(index + 1, &recipe.title));
        let json = serde_json::to_vec(&bundle).map_err(|source| ConvertError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| ConvertError::io(&path, e))?;
        bundles.push(path);
    }
    info!(bundles = bundles.len(), "[CONVERT] Wrote bundles");

    let unmapped_units = units.into_unmapped();
    if !unmapped_units.is_empty() {
        warn!(units = ?unmapped_units, "[CONVERT] Unknown units");
    }

    Ok(ConvertReport {
        recipes: recipes.len(),
        listing,
        bundles,
        images,
        unmapped_units,
    })
}
