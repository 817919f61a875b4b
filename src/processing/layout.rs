//! Contain-fit placement shared by the preview and export paths.

use serde::Serialize;

use crate::error::{CompositionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }

    fn is_valid_canvas(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Offset plus scaled size of the image inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A placement rounded to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// The rectangle expressed as fractions of `canvas`.
    pub fn normalized(&self, canvas: Size) -> Rect {
        Rect {
            x: self.x / canvas.width,
            y: self.y / canvas.height,
            width: self.width / canvas.width,
            height: self.height / canvas.height,
        }
    }

    /// Maps a rectangle from `from` canvas units into `to` canvas units.
    pub fn rescaled(&self, from: Size, to: Size) -> Rect {
        let sx = to.width / from.width;
        let sy = to.height / from.height;
        Rect {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    /// Rounds to whole pixels inside a `canvas_w` x `canvas_h` raster.
    ///
    /// Edges are rounded independently so adjacent placements share borders;
    /// the result is at least 1x1 and never leaves the canvas.
    pub fn snap_to_pixels(&self, canvas_w: u32, canvas_h: u32) -> PixelRect {
        let cw = f64::from(canvas_w.max(1));
        let ch = f64::from(canvas_h.max(1));
        let left = self.x.round().clamp(0.0, cw - 1.0);
        let top = self.y.round().clamp(0.0, ch - 1.0);
        let right = (self.x + self.width).round().clamp(left + 1.0, cw);
        let bottom = (self.y + self.height).round().clamp(top + 1.0, ch);
        PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        }
    }
}

/// Scales `source` to fit entirely inside `canvas`, centered, never cropping.
///
/// The axis whose ratio dominates is filled exactly; the other axis is
/// letterboxed evenly on both sides.
///
/// # Errors
/// [`CompositionError::InvalidImageDimensions`] if the source is empty and
/// [`CompositionError::InvalidCanvasDimensions`] if the canvas is not a
/// positive finite size.
pub fn compute_placement(source: Size, canvas: Size) -> Result<Rect> {
    if !(source.width > 0.0 && source.height > 0.0)
        || !source.width.is_finite()
        || !source.height.is_finite()
    {
        return Err(CompositionError::InvalidImageDimensions {
            width: source.width.max(0.0) as u32,
            height: source.height.max(0.0) as u32,
        });
    }
    if !canvas.is_valid_canvas() {
        return Err(CompositionError::InvalidCanvasDimensions {
            width: canvas.width,
            height: canvas.height,
        });
    }

    let canvas_ratio = canvas.width / canvas.height;
    let image_ratio = source.width / source.height;
    let (width, height) = if image_ratio >= canvas_ratio {
        (canvas.width, (canvas.width / image_ratio).min(canvas.height))
    } else {
        ((canvas.height * image_ratio).min(canvas.width), canvas.height)
    };

    Ok(Rect {
        x: (canvas.width - width) / 2.0,
        y: (canvas.height - height) / 2.0,
        width,
        height,
    })
}

/// Integer placement for a source of `src_w` x `src_h` pixels on a
/// `canvas_w` x `canvas_h` raster.
pub fn placement_in_pixels(
    src_w: u32,
    src_h: u32,
    canvas_w: u32,
    canvas_h: u32,
) -> Result<PixelRect> {
    if src_w == 0 || src_h == 0 {
        return Err(CompositionError::InvalidImageDimensions {
            width: src_w,
            height: src_h,
        });
    }
    let rect = compute_placement(
        Size::from_pixels(src_w, src_h),
        Size::from_pixels(canvas_w, canvas_h),
    )?;
    Ok(rect.snap_to_pixels(canvas_w, canvas_h))
}
