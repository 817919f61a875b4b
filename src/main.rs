//! Binary entrypoint for photo-canvas.
//!
//! Decodes a photo, composes it onto a template canvas and writes the export.
//! All composition logic lives in the library crate.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use photo_canvas::config::Configuration;
use photo_canvas::events::ExportRequest;
use photo_canvas::processing::resize::ResampleFilter;
use photo_canvas::{BackgroundColor, Composition, DisplayMode, Template, list_templates};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "photo-canvas", about = "Place a photo on a social-media canvas")]
struct Cli {
    /// Photo to compose
    #[arg(value_name = "INPUT", required_unless_present = "list_templates")]
    input: Option<PathBuf>,

    /// Where to write the export; format follows the extension
    #[arg(short, long, value_name = "FILE", default_value = "canvas.png")]
    output: PathBuf,

    /// Optional YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the template identifier
    #[arg(short, long, value_name = "ID")]
    template: Option<Template>,

    /// Override the background color (#rrggbb)
    #[arg(short, long, value_name = "COLOR")]
    background: Option<BackgroundColor>,

    /// Override the export scale
    #[arg(short, long, value_name = "FACTOR")]
    scale: Option<f64>,

    /// Override the resampling filter
    #[arg(long, value_name = "FILTER", value_parser = parse_filter)]
    filter: Option<ResampleFilter>,

    /// Print the preview scene instead of exporting
    #[arg(long)]
    describe: bool,

    /// Describe the untouched original over the scrim
    #[arg(long, requires = "describe")]
    show_original: bool,

    /// List the available templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn parse_filter(raw: &str) -> Result<ResampleFilter, String> {
    serde_yaml::from_str(raw).map_err(|_| {
        format!("unknown filter '{raw}', expected one of: nearest, bilinear, catmull-rom, lanczos3")
    })
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("photo_canvas={level}")
            .parse()
            .context("invalid log directive")?,
    );
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(template) = cli.template {
        cfg.template = template;
    }
    if let Some(background) = cli.background {
        cfg.background = background;
    }
    if let Some(scale) = cli.scale {
        cfg.export_scale = scale;
    }
    if let Some(filter) = cli.filter {
        cfg.render.filter = filter;
    }
    if cli.show_original {
        cfg.display_mode = DisplayMode::OriginalPassthrough;
    }
    cfg.validated().context("validating configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if cli.list_templates {
        for template in list_templates() {
            let ratio = template.aspect_ratio();
            println!(
                "{:<26} {:>3}:{:<3} {}",
                template.as_str(),
                ratio.width,
                ratio.height,
                template.label()
            );
        }
        return Ok(());
    }

    let cfg = load_config(&cli)?;
    let input = cli
        .input
        .clone()
        .ok_or_else(|| anyhow!("an input photo is required"))?;
    let source = tokio::task::spawn_blocking(move || photo_canvas::decode::decode_rgba8_apply_exif(&input))
        .await
        .context("decode worker failed")??;
    info!(width = source.width(), height = source.height(), "decoded source");

    let composition = Composition::new(Arc::new(source), cfg.template)
        .with_background(cfg.background)
        .with_mode(cfg.display_mode);

    if cli.describe {
        let scene = composition.preview()?;
        print!("{}", serde_yaml::to_string(&scene)?);
        return Ok(());
    }

    let (req_tx, req_rx) = mpsc::channel(1);
    let (done_tx, mut done_rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    let worker = tokio::spawn(photo_canvas::tasks::export::run(
        req_rx,
        done_tx,
        cfg.render,
        cancel.clone(),
        cfg.export_max_in_flight,
    ));

    req_tx
        .send(ExportRequest {
            id: 0,
            composition,
            scale: cfg.export_scale,
        })
        .await
        .map_err(|_| anyhow!("export worker stopped before accepting the request"))?;
    drop(req_tx);

    let done = tokio::select! {
        done = done_rx.recv() => done.ok_or_else(|| anyhow!("export worker exited without a result"))?,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            worker.await??;
            return Err(anyhow!("export interrupted"));
        }
    };
    let canvas = done.result.context("export failed")?;
    worker.await??;

    let output = cli.output.clone();
    let (width, height) = canvas.dimensions();
    tokio::task::spawn_blocking(move || canvas.save(&output))
        .await
        .context("encode worker failed")?
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(width, height, path = %cli.output.display(), "export written");
    Ok(())
}
