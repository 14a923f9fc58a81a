use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Viewer settings read from JSON. Missing fields keep the viewer's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background: Option<[f32; 3]>,
    pub draw_axes: Option<bool>,
    pub wireframe: Option<bool>,
    pub cull_face: Option<bool>,
    pub loop_wait_events: Option<bool>,
    pub lights: LightConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    /// View-space position
    pub position: Option<[f32; 3]>,
    pub ambient: Option<[f32; 3]>,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub center: Option<[f32; 3]>,
    pub distance: Option<f32>,
    /// Vertical field of view in degrees
    pub fovy_degrees: Option<f32>,
    pub ortho: Option<bool>,
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_json(&text).context(format!("Invalid config file: {:?}", path))?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
