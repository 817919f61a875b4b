//! Closed registry of canvas templates and their aspect ratios.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CompositionError;

/// Logical canvas width at export scale 1, shared by every template.
pub const DEFAULT_BASE_WIDTH: u32 = 1080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Template {
    InstagramPostSquare,
    InstagramPostPortrait,
    InstagramPostLandscape,
    InstagramStory,
}

/// Width:height pair; both components are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`.
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Template {
    pub const ALL: &'static [Self] = &[
        Self::InstagramPostSquare,
        Self::InstagramPostPortrait,
        Self::InstagramPostLandscape,
        Self::InstagramStory,
    ];
    const NAMES: &'static [&'static str] = &[
        "instagram-post-square",
        "instagram-post-portrait",
        "instagram-post-landscape",
        "instagram-story",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstagramPostSquare => "instagram-post-square",
            Self::InstagramPostPortrait => "instagram-post-portrait",
            Self::InstagramPostLandscape => "instagram-post-landscape",
            Self::InstagramStory => "instagram-story",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InstagramPostSquare => "Instagram Post (Square)",
            Self::InstagramPostPortrait => "Instagram Post (Portrait)",
            Self::InstagramPostLandscape => "Instagram Post (Landscape)",
            Self::InstagramStory => "Instagram Story",
        }
    }

    pub const fn aspect_ratio(&self) -> AspectRatio {
        match self {
            Self::InstagramPostSquare => AspectRatio::new(1, 1),
            Self::InstagramPostPortrait => AspectRatio::new(4, 5),
            Self::InstagramPostLandscape => AspectRatio::new(191, 100),
            Self::InstagramStory => AspectRatio::new(9, 16),
        }
    }

    /// Unrounded canvas size at export scale 1; its ratio is exactly the
    /// template's. Used for resolution-independent preview geometry.
    pub fn logical_size(&self, base_width: u32) -> (f64, f64) {
        let ratio = self.aspect_ratio();
        let width = f64::from(base_width.max(1));
        (width, width * f64::from(ratio.height) / f64::from(ratio.width))
    }

    /// Raster canvas size in pixels at export scale 1.
    ///
    /// The width is `base_width`; the height follows from the aspect ratio,
    /// rounded to the nearest pixel and never below one, so the raster ratio
    /// can differ from [`Template::logical_size`] by under half a pixel.
    pub fn nominal_size(&self, base_width: u32) -> (u32, u32) {
        let ratio = self.aspect_ratio();
        let width = base_width.max(1);
        let height = (f64::from(width) * f64::from(ratio.height) / f64::from(ratio.width))
            .round()
            .max(1.0) as u32;
        (width, height)
    }
}

/// Every template in display order.
pub fn list_templates() -> &'static [Template] {
    Template::ALL
}

pub fn aspect_ratio(template: Template) -> AspectRatio {
    template.aspect_ratio()
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = CompositionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|template| template.as_str() == raw)
            .copied()
            .ok_or_else(|| CompositionError::UnknownTemplate(raw.to_string()))
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

impl Serialize for Template {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_match_documented_values() {
        let expected = [
            (Template::InstagramPostSquare, 1.0),
            (Template::InstagramPostPortrait, 0.8),
            (Template::InstagramPostLandscape, 1.91),
            (Template::InstagramStory, 0.5625),
        ];
        for (template, ratio) in expected {
            assert!(
                (aspect_ratio(template).ratio() - ratio).abs() < 1e-9,
                "{template} ratio"
            );
        }
    }

    #[test]
    fn listing_is_stable() {
        assert_eq!(list_templates(), list_templates());
        assert_eq!(list_templates().len(), Template::NAMES.len());
        assert_eq!(list_templates()[0], Template::InstagramPostSquare);
    }

    #[test]
    fn identifiers_round_trip_through_from_str() {
        for template in list_templates() {
            assert_eq!(template.as_str().parse::<Template>().unwrap(), *template);
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let err = "tiktok-video".parse::<Template>().unwrap_err();
        assert!(matches!(err, CompositionError::UnknownTemplate(ref s) if s == "tiktok-video"));
    }

    #[test]
    fn nominal_sizes_follow_base_width() {
        assert_eq!(Template::InstagramStory.nominal_size(1080), (1080, 1920));
        assert_eq!(Template::InstagramPostPortrait.nominal_size(1080), (1080, 1350));
        assert_eq!(Template::InstagramPostSquare.nominal_size(1080), (1080, 1080));
        assert_eq!(Template::InstagramPostLandscape.nominal_size(1080), (1080, 565));
        assert_eq!(Template::InstagramStory.nominal_size(0), (1, 2));
    }

    #[test]
    fn logical_sizes_keep_exact_ratio() {
        for template in list_templates() {
            let (w, h) = template.logical_size(DEFAULT_BASE_WIDTH);
            assert_eq!(w, 1080.0);
            assert!(
                (w / h - template.aspect_ratio().ratio()).abs() < 1e-12,
                "{template}: {w}x{h}"
            );
        }
    }
}
