//! Rasterizes a composition into an owned RGBA8 buffer.

use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CompositionError, Result};
use crate::processing::color::BackgroundColor;
use crate::processing::layout::placement_in_pixels;
use crate::processing::resize::{ResampleFilter, resize_rgba};
use crate::template::{DEFAULT_BASE_WIDTH, Template};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RenderOptions {
    /// Logical canvas width at export scale 1.
    pub base_width: u32,
    pub filter: ResampleFilter,
    /// Largest accepted canvas edge in pixels.
    pub max_canvas_dimension: u32,
    /// Largest accepted canvas area in pixels.
    pub max_canvas_pixels: u64,
}

impl RenderOptions {
    const fn default_max_canvas_dimension() -> u32 {
        16_384
    }

    const fn default_max_canvas_pixels() -> u64 {
        16_384 * 16_384
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_width: DEFAULT_BASE_WIDTH,
            filter: ResampleFilter::default(),
            max_canvas_dimension: Self::default_max_canvas_dimension(),
            max_canvas_pixels: Self::default_max_canvas_pixels(),
        }
    }
}

/// Canvas pixel size for `template` at `scale`.
///
/// The integer nominal size is multiplied before rounding, so integer scales
/// multiply both edges exactly.
pub fn export_canvas_size(template: Template, scale: f64, base_width: u32) -> Result<(u64, u64)> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CompositionError::InvalidExportScale(scale));
    }
    let (w, h) = template.nominal_size(base_width);
    let width = (f64::from(w) * scale).round().max(1.0);
    let height = (f64::from(h) * scale).round().max(1.0);
    Ok((width as u64, height as u64))
}

/// Rasterizes with [`RenderOptions::default`].
pub fn render_export(
    source: &RgbaImage,
    template: Template,
    background: BackgroundColor,
    scale: f64,
) -> Result<RgbaImage> {
    render_export_with(source, template, background, scale, &RenderOptions::default())
}

/// Fills a `template` canvas at `scale` with `background` and draws `source`
/// contain-fit and centered over it.
///
/// # Errors
/// [`CompositionError::InvalidImageDimensions`] for an empty source,
/// [`CompositionError::InvalidExportScale`] for a non-positive scale and
/// [`CompositionError::RenderSurfaceUnavailable`] when the canvas exceeds the
/// configured limits or cannot be allocated.
pub fn render_export_with(
    source: &RgbaImage,
    template: Template,
    background: BackgroundColor,
    scale: f64,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    if source.width() == 0 || source.height() == 0 {
        return Err(CompositionError::InvalidImageDimensions {
            width: source.width(),
            height: source.height(),
        });
    }
    let (canvas_w, canvas_h) = export_canvas_size(template, scale, options.base_width)?;
    let mut canvas = allocate_canvas(canvas_w, canvas_h, background, options)?;
    let (canvas_w, canvas_h) = canvas.dimensions();

    let dest = placement_in_pixels(source.width(), source.height(), canvas_w, canvas_h)?;
    debug!(
        %template,
        scale,
        canvas_w,
        canvas_h,
        x = dest.x,
        y = dest.y,
        w = dest.width,
        h = dest.height,
        "rendering export"
    );

    let scaled = resize_rgba(source, dest.width, dest.height, options.filter).map_err(|err| {
        CompositionError::RenderSurfaceUnavailable {
            width: u64::from(dest.width),
            height: u64::from(dest.height),
            reason: format!("{err:#}"),
        }
    })?;
    if scaled.pixels().all(|p| p[3] == u8::MAX) {
        imageops::replace(&mut canvas, &scaled, i64::from(dest.x), i64::from(dest.y));
    } else {
        imageops::overlay(&mut canvas, &scaled, i64::from(dest.x), i64::from(dest.y));
    }
    Ok(canvas)
}

fn allocate_canvas(
    width: u64,
    height: u64,
    background: BackgroundColor,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    let unavailable = |reason: String| {
        warn!(width, height, %reason, "render surface unavailable");
        CompositionError::RenderSurfaceUnavailable {
            width,
            height,
            reason,
        }
    };

    let max_dim = u64::from(options.max_canvas_dimension);
    if width > max_dim || height > max_dim {
        return Err(unavailable(format!(
            "edge exceeds maximum of {max_dim} pixels"
        )));
    }
    let pixels = width * height;
    if pixels > options.max_canvas_pixels {
        return Err(unavailable(format!(
            "area exceeds maximum of {} pixels",
            options.max_canvas_pixels
        )));
    }
    let bytes = usize::try_from(pixels)
        .ok()
        .and_then(|p| p.checked_mul(4))
        .ok_or_else(|| unavailable("canvas size overflows address space".to_string()))?;

    let mut raw: Vec<u8> = Vec::new();
    raw.try_reserve_exact(bytes)
        .map_err(|err| unavailable(err.to_string()))?;
    let fill = background.to_rgba().0;
    raw.extend(fill.iter().copied().cycle().take(bytes));
    // Both edges were checked against a u32 limit above.
    RgbaImage::from_raw(width as u32, height as u32, raw)
        .ok_or_else(|| unavailable("pixel buffer does not match canvas size".to_string()))
}
