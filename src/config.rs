use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::processing::color::BackgroundColor;
use crate::render::export::RenderOptions;
use crate::render::scene::DisplayMode;
use crate::template::Template;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Canvas shape to compose into.
    pub template: Template,
    /// Solid fill behind the photo.
    pub background: BackgroundColor,
    /// Preview mode; exports are always composited.
    pub display_mode: DisplayMode,
    /// Multiplier on the template's nominal size when exporting.
    pub export_scale: f64,
    pub render: RenderOptions,
    /// How many exports may rasterize concurrently.
    pub export_max_in_flight: usize,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.export_scale.is_finite() && self.export_scale > 0.0,
            "export-scale must be positive"
        );
        ensure!(
            self.render.base_width > 0,
            "render.base-width must be greater than zero"
        );
        ensure!(
            self.render.max_canvas_dimension > 0,
            "render.max-canvas-dimension must be greater than zero"
        );
        ensure!(
            self.render.max_canvas_pixels > 0,
            "render.max-canvas-pixels must be greater than zero"
        );
        ensure!(
            self.export_max_in_flight > 0,
            "export-max-in-flight must be greater than zero"
        );
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            template: Template::InstagramPostSquare,
            background: BackgroundColor::default(),
            display_mode: DisplayMode::default(),
            export_scale: 1.0,
            render: RenderOptions::default(),
            export_max_in_flight: 2,
        }
    }
}
