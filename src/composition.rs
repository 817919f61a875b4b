use std::sync::Arc;

use image::RgbaImage;

use crate::error::Result;
use crate::processing::color::BackgroundColor;
use crate::render::export::{RenderOptions, render_export_with};
use crate::render::scene::{DisplayMode, SceneDescription, render_preview};
use crate::template::Template;

/// The inputs of one composition. Every accessor recomputes from scratch, so
/// callers simply re-query after changing a field.
#[derive(Debug, Clone)]
pub struct Composition {
    source: Arc<RgbaImage>,
    pub template: Template,
    pub background: BackgroundColor,
    pub mode: DisplayMode,
}

impl Composition {
    pub fn new(source: Arc<RgbaImage>, template: Template) -> Self {
        Self {
            source,
            template,
            background: BackgroundColor::default(),
            mode: DisplayMode::default(),
        }
    }

    pub fn with_background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn source(&self) -> &Arc<RgbaImage> {
        &self.source
    }

    pub fn preview(&self) -> Result<SceneDescription> {
        render_preview(&self.source, self.template, self.background, self.mode)
    }

    /// Always composited; the display mode only affects the preview.
    pub fn export(&self, scale: f64, options: &RenderOptions) -> Result<RgbaImage> {
        render_export_with(&self.source, self.template, self.background, scale, options)
    }
}
