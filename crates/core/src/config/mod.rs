use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    analysis::{DEFAULT_BRIGHTNESS, MAX_BRIGHTNESS, MIN_BRIGHTNESS},
    render::{FAR_PLANE, MIN_FOV_DEG, NEAR_PLANE},
    ManipulatorKind, Mode, Result, Shape, TrigramVizError,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    pub brightness: BrightnessConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.surface.validate()?;
        self.brightness.validate()
    }
}

/// Settings for the rendering surface and its animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub tick_period_ms: u64,
    pub min_fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub shape: Shape,
    pub mode: Mode,
    pub manipulator: ManipulatorKind,
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 12,
            min_fov_deg: MIN_FOV_DEG,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            shape: Shape::Cube,
            mode: Mode::Trigram,
            manipulator: ManipulatorKind::Spin,
            width: 800,
            height: 600,
        }
    }
}

impl SurfaceConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(TrigramVizError::InvalidConfig(
                "tick_period_ms must be positive".to_string(),
            ));
        }
        if !(self.min_fov_deg > 0.0 && self.min_fov_deg < 180.0) {
            return Err(TrigramVizError::InvalidConfig(format!(
                "min_fov_deg must lie in (0, 180), got {}",
                self.min_fov_deg
            )));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(TrigramVizError::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

/// Initial brightness and whether the histogram heuristic drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
    pub heuristic: bool,
    pub initial: u32,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            heuristic: true,
            initial: DEFAULT_BRIGHTNESS,
        }
    }
}

impl BrightnessConfig {
    fn validate(&self) -> Result<()> {
        if !(MIN_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&self.initial) {
            return Err(TrigramVizError::InvalidConfig(format!(
                "initial brightness {} outside {MIN_BRIGHTNESS}..={MAX_BRIGHTNESS}",
                self.initial
            )));
        }
        Ok(())
    }
}
