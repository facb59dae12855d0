use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Marker contained in the URL of Körbchen's stock "no photo" image.
pub const DEFAULT_PLACEHOLDER_MARKER: &str = "placeholder_recipe.jpg";

/// Heading Körbchen gives an untitled first step.
pub const DEFAULT_STEP_TITLE: &str = "Zubereitung";

pub const DEFAULT_SENDER_NAME: &str = "Körbchen";

/// Everything one conversion run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Directory holding `recipes.json` and `cookbooks.json`.
    pub input_dir: PathBuf,
    /// Destination for `recipes.json` and the `.crumb` bundles.
    pub output_dir: PathBuf,
    /// Image cache directory. Defaults to `<output_dir>/images`.
    #[serde(default)]
    pub images_dir: Option<PathBuf>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl ConvertConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            images_dir: None,
            fetch: FetchConfig::default(),
            bundle: BundleConfig::default(),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("images"))
    }

    pub fn trace_loaded(&self) {
        info!(
            input_dir = %self.input_dir.display(),
            output_dir = %self.output_dir.display(),
            images_dir = %self.images_dir().display(),
            concurrency = self.fetch.concurrency,
            "Loaded ConvertConfig"
        );
        debug!(?self, "ConvertConfig loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound on image downloads in flight.
    pub concurrency: usize,
    pub timeout_secs: u64,
    /// URLs containing this string are never fetched.
    pub placeholder_marker: String,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout_secs: 30,
            placeholder_marker: DEFAULT_PLACEHOLDER_MARKER.to_string(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub sender_name: String,
    /// A first step carrying exactly this title gets no section header.
    pub default_step_title: String,
    /// Copy recipe categories into the bundle's `tags`.
    pub export_tags: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            default_step_title: DEFAULT_STEP_TITLE.to_string(),
            export_tags: false,
        }
    }
}
