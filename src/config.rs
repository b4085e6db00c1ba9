//! Application configuration loaded from TOML.
//!
//! Every section is optional; absent sections take their defaults. The
//! default location is `<config dir>/parkmap/config.toml`, overridable with
//! the `PARKMAP_CONFIG` environment variable.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::layout::SpotGrid;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PARKMAP_CONFIG";

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    pub api: ApiConfig,
    pub spot: SpotConfig,
    pub editor: EditorConfig,
    pub logging: LoggingConfig,
}

/// `[api]`: backend collaborator endpoints.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// `[spot]`: spot footprint in canvas pixels.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SpotConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for SpotConfig {
    fn default() -> Self {
        let grid = SpotGrid::default();
        Self {
            width: grid.width,
            height: grid.height,
            padding: grid.padding,
        }
    }
}

/// `[editor]`: interaction thresholds in canvas pixels.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EditorConfig {
    /// Radius around the pointer within which strokes are erased.
    pub erase_size: f64,
    /// Both sides of a new area must exceed this.
    pub min_area_side: f64,
    /// Both sides of a floor boundary must exceed this.
    pub min_floor_side: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            erase_size: 10.0,
            min_area_side: 30.0,
            min_floor_side: 50.0,
        }
    }
}

/// `[logging]`: where the log file goes.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Directory for `parkmap.log`; the OS data dir when absent.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    pub fn spot_grid(&self) -> SpotGrid {
        SpotGrid {
            width: self.spot.width,
            height: self.spot.height,
            padding: self.spot.padding,
        }
    }
}

/// Parse a TOML string into an [`AppConfig`], running validation.
pub fn parse(toml_str: &str) -> Result<AppConfig, AppError> {
    let cfg: AppConfig = toml::from_str(toml_str).map_err(|e| AppError::Config(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Read and parse the config file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse(&text)
}

/// Resolve the config path from the environment or the OS config dir.
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("parkmap").join("config.toml")))
}

/// Load the default config file, or defaults when no file exists.
pub fn load_default() -> Result<AppConfig, AppError> {
    match default_path() {
        Some(path) if path.exists() => load(&path),
        _ => Ok(AppConfig::default()),
    }
}

fn validate(cfg: &AppConfig) -> Result<(), AppError> {
    let url = cfg.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Config(
            "api.base_url must be an http:// or https:// URL".to_string(),
        ));
    }

    if cfg.api.timeout_secs == 0 {
        return Err(AppError::Config(
            "api.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if cfg.spot.width <= 0.0 || cfg.spot.height <= 0.0 || cfg.spot.padding < 0.0 {
        return Err(AppError::Config(
            "spot.width and spot.height must be positive and spot.padding non-negative"
                .to_string(),
        ));
    }

    let editor = &cfg.editor;
    if editor.erase_size <= 0.0 || editor.min_area_side <= 0.0 || editor.min_floor_side <= 0.0 {
        return Err(AppError::Config(
            "editor thresholds must be positive".to_string(),
        ));
    }

    Ok(())
}
