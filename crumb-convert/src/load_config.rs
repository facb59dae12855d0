/// `load_config` module: reads the YAML run configuration into a [`ConvertConfig`].
///
/// This is the only place where user-supplied YAML is parsed. The file maps
/// one-to-one onto the core config types; everything except `input_dir` and
/// `output_dir` has a default.
///
/// # Environment
/// `CRUMB_CONVERT_USER_AGENT` (also read from `.env`) overrides
/// `fetch.user_agent`.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary. Read
/// failures mention the path, parse failures mention the YAML.
use anyhow::Result;
use crumb_convert_core::config::ConvertConfig;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const USER_AGENT_ENV: &str = "CRUMB_CONVERT_USER_AGENT";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConvertConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: ConvertConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Ok(user_agent) = env::var(USER_AGENT_ENV) {
        if !user_agent.trim().is_empty() {
            info!(env = USER_AGENT_ENV, "Overriding fetch.user_agent from environment");
            config.fetch.user_agent = Some(user_agent);
        }
    }

    Ok(config)
}
