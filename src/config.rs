use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Static configuration
// ---------------------------------------------------------------------------

/// Startup configuration: where the data lives, which filter values the UI
/// opens with, and the per-country colours. Everything has a default
/// matching the stock dashboard, so a config file is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for trade files at startup.
    pub data_dir: PathBuf,
    /// Initially selected reporter; `None` falls back to the first entry
    /// of the dataset's country listing.
    pub default_country: Option<String>,
    /// Initially selected year; `None` falls back to the dataset maximum.
    pub default_year: Option<i32>,
    /// Fixed country → hex colour mapping for the charts.
    pub country_colors: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let country_colors = [
            ("Malaysia", "#77DD77"),
            ("Indonesia", "#FFFF99"),
            ("Singapore", "#B19CD9"),
            ("Thailand", "#FF6961"),
        ]
        .into_iter()
        .map(|(c, hex)| (c.to_string(), hex.to_string()))
        .collect();

        Config {
            data_dir: PathBuf::from("data"),
            default_country: None,
            default_year: None,
            country_colors,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Resolve the effective config: an explicit path must exist and parse;
    /// otherwise `tradescope.json` in the working directory is used when
    /// present, and the built-in defaults when not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => Config::from_file(path),
            None => {
                let default_path = Path::new("tradescope.json");
                if default_path.exists() {
                    Config::from_file(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_dashboard() {
        let cfg = Config::default();
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.country_colors["Malaysia"], "#77DD77");
        assert_eq!(cfg.country_colors["Thailand"], "#FF6961");
        assert!(cfg.default_country.is_none());
    }

    #[test]
    fn partial_config_files_keep_defaults_for_missing_keys() {
        let cfg: Config =
            serde_json::from_str(r#"{ "data_dir": "/srv/trade", "default_year": 2019 }"#).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/trade"));
        assert_eq!(cfg.default_year, Some(2019));
        assert_eq!(cfg.country_colors["Singapore"], "#B19CD9");
    }
}
