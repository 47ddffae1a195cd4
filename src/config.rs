use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    density::estimate::Algorithm,
    foundation::error::{GazemapError, GazemapResult},
};

/// Service-wide settings, usually loaded once at startup.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory holding `{surface_id}.png` backgrounds.
    pub images_dir: PathBuf,
    /// When set, every computed artifact is also written here as PNG.
    pub cache_dir: Option<PathBuf>,
    /// Bandwidth used when a request does not name one.
    pub default_bandwidth: f64,
    /// Grid spacing used when a request does not name one.
    pub default_grid_spacing: f64,
    /// Density estimator for all requests.
    pub algorithm: Algorithm,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            cache_dir: None,
            default_bandwidth: 10.0,
            default_grid_spacing: 15.0,
            algorithm: Algorithm::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> GazemapResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| GazemapError::invalid_parameter(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> GazemapResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check that the default estimation parameters are usable.
    pub fn validate(&self) -> GazemapResult<()> {
        if !self.default_bandwidth.is_finite() || self.default_bandwidth <= 0.0 {
            return Err(GazemapError::invalid_parameter(
                "config default_bandwidth must be > 0",
            ));
        }
        if !self.default_grid_spacing.is_finite() || self.default_grid_spacing <= 0.0 {
            return Err(GazemapError::invalid_parameter(
                "config default_grid_spacing must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
