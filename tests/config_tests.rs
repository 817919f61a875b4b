use photo_canvas::config::Configuration;
use photo_canvas::processing::resize::ResampleFilter;
use photo_canvas::{BackgroundColor, DisplayMode, Template};
use std::fs;
use tempfile::tempdir;

#[test]
fn parse_kebab_case_config() {
    let yaml = r##"
template: instagram-story
background: "#202020"
display-mode: original-passthrough
export-scale: 2.0
"##;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.template, Template::InstagramStory);
    assert_eq!(cfg.background, BackgroundColor::rgb(0x20, 0x20, 0x20));
    assert_eq!(cfg.display_mode, DisplayMode::OriginalPassthrough);
    assert!((cfg.export_scale - 2.0).abs() < f64::EPSILON);
    assert_eq!(cfg.render.base_width, 1080);
}

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.template, Template::InstagramPostSquare);
    assert_eq!(cfg.background, BackgroundColor::WHITE);
    assert_eq!(cfg.display_mode, DisplayMode::Composited);
    assert_eq!(cfg.render.filter, ResampleFilter::CatmullRom);
    assert!(cfg.validated().is_ok());
}

#[test]
fn background_accepts_rgb_array() {
    let yaml = r#"
background: [12, 34, 56]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.background, BackgroundColor::rgb(12, 34, 56));
}

#[test]
fn background_rejects_short_array() {
    let yaml = r#"
background: [12, 34]
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn render_options_parse() {
    let yaml = r#"
render:
  base-width: 720
  filter: lanczos3
  max-canvas-dimension: 4096
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.render.base_width, 720);
    assert_eq!(cfg.render.filter, ResampleFilter::Lanczos3);
    assert_eq!(cfg.render.max_canvas_dimension, 4096);
    assert_eq!(cfg.render.max_canvas_pixels, 16_384 * 16_384);
}

#[test]
fn unknown_template_is_rejected() {
    let yaml = r#"
template: facebook-cover
"#;
    let err = serde_yaml::from_str::<Configuration>(yaml).unwrap_err();
    assert!(err.to_string().contains("facebook-cover"), "{err}");
}

#[test]
fn validation_rejects_non_positive_scale() {
    let yaml = r#"
export-scale: 0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("export-scale"), "{err}");
}

#[test]
fn loads_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("canvas.yaml");
    fs::write(&path, "template: instagram-post-portrait\nexport-max-in-flight: 3\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap().validated().unwrap();
    assert_eq!(cfg.template, Template::InstagramPostPortrait);
    assert_eq!(cfg.export_max_in_flight, 3);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(Configuration::from_yaml_file(dir.path().join("nope.yaml")).is_err());
}
