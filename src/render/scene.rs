//! Resolution-independent preview of a composition.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::processing::color::{BackgroundColor, SCRIM_COLOR};
use crate::processing::layout::{Rect, Size, compute_placement};
use crate::template::{DEFAULT_BASE_WIDTH, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Composited,
    /// Show the untouched source over [`SCRIM_COLOR`]; preview only.
    OriginalPassthrough,
}

/// What a live surface needs to draw one frame of the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDescription {
    pub template: Template,
    pub mode: DisplayMode,
    /// Logical canvas size; its ratio is exactly the template's.
    pub canvas: Size,
    pub fill: BackgroundColor,
    pub placement: Rect,
}

impl SceneDescription {
    /// Placement as fractions of the canvas.
    pub fn normalized_placement(&self) -> Rect {
        self.placement.normalized(self.canvas)
    }

    /// Re-expresses the scene inside a `view_w` x `view_h` surface.
    ///
    /// Returns the canvas rectangle within the view and the image rectangle in
    /// view coordinates. Both come from the same contain-fit as the scene.
    pub fn fit_to_view(&self, view_w: f64, view_h: f64) -> Result<ViewLayout> {
        let canvas = compute_placement(self.canvas, Size::new(view_w, view_h))?;
        let inner = self
            .placement
            .rescaled(self.canvas, Size::new(canvas.width, canvas.height));
        Ok(ViewLayout {
            canvas,
            image: Rect {
                x: canvas.x + inner.x,
                y: canvas.y + inner.y,
                width: inner.width,
                height: inner.height,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewLayout {
    pub canvas: Rect,
    pub image: Rect,
}

/// Describes the preview of `source` on `template`.
///
/// Only the image dimensions are read; no pixels are copied.
///
/// # Errors
/// Propagates [`crate::CompositionError::InvalidImageDimensions`].
pub fn render_preview(
    source: &RgbaImage,
    template: Template,
    background: BackgroundColor,
    mode: DisplayMode,
) -> Result<SceneDescription> {
    let (w, h) = template.logical_size(DEFAULT_BASE_WIDTH);
    let canvas = Size::new(w, h);
    let placement = compute_placement(Size::from_pixels(source.width(), source.height()), canvas)?;
    let fill = match mode {
        DisplayMode::Composited => background,
        DisplayMode::OriginalPassthrough => SCRIM_COLOR,
    };
    Ok(SceneDescription {
        template,
        mode,
        canvas,
        fill,
        placement,
    })
}
