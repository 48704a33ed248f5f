use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ember_core::{load_scene, RenderOverrides, RenderSettings, SamplerKind, TracerKind};
use ember_renderer::{render, RenderError, RenderSetup};

/// Render an Ember XML scene to an image.
#[derive(Parser, Debug)]
#[clap(name = "ember-render", author, version, about = "Whitted-style ray tracer")]
struct Args {
    /// Scene file to render
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[clap(short, long, default_value = "render.png")]
    output: PathBuf,

    #[clap(long)]
    width: Option<u32>,

    #[clap(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[clap(long)]
    samples: Option<u32>,

    /// regular, random, jittered, nrooks or multijittered
    #[clap(long, value_parser = parse_sampler)]
    sampler: Option<SamplerKind>,

    #[clap(long)]
    max_depth: Option<u32>,

    /// whitted, raycast or flat
    #[clap(long, value_parser = parse_tracer)]
    tracer: Option<TracerKind>,

    #[clap(long)]
    seed: Option<u64>,

    /// JSON file with render settings, applied over the scene's own
    #[clap(long)]
    settings: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[clap(long)]
    threads: Option<usize>,

    /// Cancel the render after this many seconds
    #[clap(long)]
    time_limit: Option<f64>,
}

fn parse_sampler(token: &str) -> Result<SamplerKind, String> {
    SamplerKind::from_token(token).ok_or_else(|| format!("unknown sampler '{token}'"))
}

fn parse_tracer(token: &str) -> Result<TracerKind, String> {
    TracerKind::from_token(token).ok_or_else(|| format!("unknown tracer '{token}'"))
}

impl Args {
    fn overrides(&self) -> RenderOverrides {
        RenderOverrides {
            width: self.width,
            height: self.height,
            samples: self.samples,
            sampler: self.sampler,
            max_depth: self.max_depth,
            tracer: self.tracer,
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Defaults, then the scene's `<render>`, then the settings file, then flags.
fn resolve_settings(args: &Args, scene_overrides: &RenderOverrides) -> Result<RenderSettings> {
    let mut settings = RenderSettings::default().with(scene_overrides);

    if let Some(path) = &args.settings {
        let file = RenderOverrides::load(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        settings.apply(&file);
    }

    settings.apply(&args.overrides());
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    let scene = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    log::info!(
        "Loaded scene '{}' with {} objects",
        scene.name,
        scene.object_count()
    );

    let settings = resolve_settings(&args, &scene.render)?;
    log::debug!("Render settings: {settings:?}");

    let setup = RenderSetup::build(&scene, &settings).context("Failed to build the scene")?;

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(limit) = args.time_limit {
        let Ok(limit) = Duration::try_from_secs_f64(limit) else {
            bail!("Invalid time limit {limit}");
        };
        let cancel = Arc::clone(&cancel);
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            log::warn!("Time limit of {limit:?} reached, cancelling");
            cancel.store(true, Ordering::Relaxed);
        });
    }

    let image = match render(
        &setup.camera,
        &setup.world,
        setup.tracer.as_ref(),
        &setup.sampler,
        &setup.settings,
        &cancel,
    ) {
        Ok(image) => image,
        Err(RenderError::Cancelled) => bail!("Render cancelled before completion"),
        Err(err) => return Err(err).context("Render failed"),
    };

    image
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
