use std::path::Path;

use color_eyre::eyre::{self, ensure, WrapErr};
use orrery::{belt::BeltConfig, catalog::CatalogOptions, scale::SceneScale};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Frame loop settings of the headless driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulated days per real second.
    pub time_scale: f64,
    /// Frames per real second.
    pub fps: f64,
    /// Number of frames to run.
    pub frames: u64,
    /// Body size slider position, `[0, 100]`.
    pub body_size_slider: f64,
    /// Start paused.
    pub paused: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fps: 60.0,
            frames: 600,
            body_size_slider: 0.0,
            paused: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scale: SceneScale,
    pub belt: BeltConfig,
    pub catalog: CatalogOptions,
    pub clock: ClockConfig,
}

impl Config {
    /// Read a TOML file; missing sections and keys keep their defaults.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.clock.fps.is_finite() && self.clock.fps > 0.0,
            "fps must be positive, got {}",
            self.clock.fps
        );
        ensure!(
            self.clock.time_scale.is_finite(),
            "time scale must be finite, got {}",
            self.clock.time_scale
        );
        ensure!(
            self.scale.distance_scale.is_finite() && self.scale.distance_scale > 0.0,
            "distance scale must be positive"
        );
        self.belt.validate()
    }
}
