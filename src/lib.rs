pub mod composition;
pub mod config;
pub mod decode;
pub mod error;
pub mod events;
pub mod template;
pub mod processing {
    pub mod color;
    pub mod layout;
    pub mod resize;
}
pub mod render {
    pub mod export;
    pub mod scene;
}
pub mod tasks {
    pub mod export;
}

pub use composition::Composition;
pub use error::CompositionError;
pub use processing::color::{BackgroundColor, SCRIM_COLOR};
pub use processing::layout::{PixelRect, Rect, Size, compute_placement};
pub use render::export::{RenderOptions, render_export, render_export_with};
pub use render::scene::{DisplayMode, SceneDescription, render_preview};
pub use template::{AspectRatio, Template, aspect_ratio, list_templates};
