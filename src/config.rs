use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "ESTATE_LENS_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "estate-lens.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every key is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Listings sheet loaded at startup.
    pub data_path: PathBuf,
    /// Step of the price slider.
    pub price_step: f64,
    /// Categories shown in per-area bar charts.
    pub top_groups: usize,
    /// Rows in the "top listings" tables.
    pub top_listings: usize,
    pub price_bins: usize,
    pub yield_bins: usize,
    /// Bins for the bedroom and bathroom histograms.
    pub room_bins: usize,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("DRED.xlsx"),
            price_step: 10_000.0,
            top_groups: 15,
            top_listings: 10,
            price_bins: 40,
            yield_bins: 30,
            room_bins: 12,
            window_size: [1400.0, 900.0],
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the configuration for this process.
    ///
    /// The file named by `ESTATE_LENS_CONFIG` wins, then `estate-lens.json`
    /// in the working directory, then the defaults. A first positional
    /// argument overrides `data_path`.
    pub fn resolve(env_path: Option<PathBuf>, data_arg: Option<PathBuf>) -> Result<Self> {
        let mut config = match env_path {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        if let Some(path) = data_arg {
            config.data_path = path;
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data_arg = std::env::args_os().nth(1).map(PathBuf::from);
        Self::resolve(env_path, data_arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: DashboardConfig = serde_json::from_str(r#"{"top_groups": 5}"#).unwrap();
        assert_eq!(cfg.top_groups, 5);
        assert_eq!(cfg.price_step, 10_000.0);
        assert_eq!(cfg.data_path, PathBuf::from("DRED.xlsx"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<DashboardConfig>(r#"{"colour": "blue"}"#).is_err());
    }

    #[test]
    fn argument_overrides_data_path() {
        let path = std::env::temp_dir().join(format!("estate-lens-{}-cfg.json", std::process::id()));
        std::fs::write(&path, r#"{"data_path": "from-config.csv", "price_bins": 20}"#).unwrap();

        let cfg = DashboardConfig::resolve(Some(path.clone()), Some("cli.parquet".into())).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("cli.parquet"));
        assert_eq!(cfg.price_bins, 20);

        let cfg = DashboardConfig::resolve(Some(path.clone()), None).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("from-config.csv"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let missing = std::env::temp_dir().join("estate-lens-no-such-config.json");
        assert!(DashboardConfig::resolve(Some(missing), None).is_err());
    }
}
