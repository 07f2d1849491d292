//! # Mode Design Studio
//!
//! Command-line host for the editor core: opens a saved project (or seeds
//! the starter composition), optionally applies a canvas preset, and
//! exports the flattened composition to PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use design_core::{
    dispatch, Alignment, Command, Document, LayerPatch, ProjectDocument, CANVAS_PRESETS,
    IMAGE_MODELS,
};
use design_renderer::{ComposeConfig, Compositor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "design-studio", about = "Compose and export Mode Design projects")]
struct CliArgs {
    /// Project file to open. Seeds the starter composition when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Canvas preset to apply (see --list-presets).
    #[arg(short, long)]
    preset: Option<String>,

    /// Custom canvas width in pixels. Requires --height.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Custom canvas height in pixels. Requires --width.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Directory the exported PNG is written into.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Output scale factor (2.0 for retina).
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Also save the document as a project file.
    #[arg(long)]
    save: Option<PathBuf>,

    /// List the built-in canvas presets and exit.
    #[arg(long)]
    list_presets: bool,

    /// List the available generation models and exit.
    #[arg(long)]
    list_models: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_studio=info,design_core=info,design_renderer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    if args.list_presets {
        for preset in CANVAS_PRESETS {
            println!("{:<20} {}x{}", preset.name, preset.width, preset.height);
        }
        return Ok(());
    }
    if args.list_models {
        for model in IMAGE_MODELS {
            println!(
                "{:<22} {:<22} {} credits, {}, {}",
                model.id, model.name, model.credits, model.speed, model.quality
            );
        }
        return Ok(());
    }

    let mut doc = match &args.input {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let project = ProjectDocument::from_json(&json)
                .with_context(|| format!("cannot parse {}", path.display()))?;
            tracing::info!(name = %project.name, layers = project.layers.len(), "project opened");
            project.into_document()
        }
        None => {
            tracing::info!("no project given, seeding the starter composition");
            let mut doc = Document::seeded();
            scripted_demo(&mut doc)?;
            doc
        }
    };

    if let Some(ref preset) = args.preset {
        doc.apply_preset(preset)?;
    }
    if let (Some(width), Some(height)) = (args.width, args.height) {
        doc.set_canvas_size(width, height);
    }

    if let Some(ref path) = args.save {
        let project = ProjectDocument::from_document(&doc, "Untitled");
        std::fs::write(path, project.to_json()?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), "project saved");
    }

    let compositor = Compositor::new(ComposeConfig {
        scale: args.scale,
        ..ComposeConfig::default()
    });
    let exported = compositor.compose_and_export(&doc, &args.out)?;
    println!("{}", exported.display());
    Ok(())
}

/// A short editing session over the seed document, driven through the
/// command router the way a front-end would drive it.
fn scripted_demo(doc: &mut Document) -> Result<()> {
    dispatch(
        doc,
        Command::AddText {
            content: "Made with\nMode Design".to_string(),
        },
    )?;
    let caption = doc
        .selection()
        .first()
        .copied()
        .context("new caption is selected")?;
    dispatch(
        doc,
        Command::UpdateLayer {
            id: caption,
            patch: LayerPatch::position(20.0, 240.0),
            record: true,
        },
    )?;
    dispatch(doc, Command::DuplicateSelected)?;
    dispatch(
        doc,
        Command::Select {
            id: caption,
            multi: true,
        },
    )?;
    dispatch(
        doc,
        Command::Align {
            alignment: Alignment::Left,
        },
    )?;
    dispatch(doc, Command::GroupSelected)?;
    Ok(())
}
