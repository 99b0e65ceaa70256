// Headless path tracer driver.
// Run with: cargo run --release -- [book|toy|<scene.json>] [options]

mod scenes;

use anyhow::{anyhow, bail, Context, Result};
use lumen_core::{FrameBuffer, RaytracerSettings, Scene};
use lumen_renderer::{Engine, EngineConfig};
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const USAGE: &str = "Usage: lumen [book|toy|<scene.json>] [--settings <file.json>] [--size WxH] \
[--passes N] [--out <image.png>] [--time-budget-ms N] [--threads N]";

/// Parsed command line.
struct Args {
    scene: String,
    settings: Option<PathBuf>,
    width: u32,
    height: u32,
    passes: u32,
    out: PathBuf,
    time_budget: Option<Duration>,
    threads: Option<usize>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            scene: "toy".to_string(),
            settings: None,
            width: 640,
            height: 360,
            passes: 1,
            out: PathBuf::from("render.png"),
            time_budget: None,
            threads: None,
        }
    }
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut scene_set = false;

    while let Some(arg) = raw.next() {
        let mut value = |flag: &str| raw.next().ok_or_else(|| anyhow!("{} needs a value", flag));

        match arg.as_str() {
            "--settings" => args.settings = Some(PathBuf::from(value("--settings")?)),
            "--size" => {
                let size = value("--size")?;
                let (w, h) = size
                    .split_once('x')
                    .ok_or_else(|| anyhow!("--size expects WxH, got {}", size))?;
                args.width = w.parse().with_context(|| format!("invalid width in {}", size))?;
                args.height = h.parse().with_context(|| format!("invalid height in {}", size))?;
            }
            "--passes" => args.passes = value("--passes")?.parse().context("invalid --passes")?,
            "--out" => args.out = PathBuf::from(value("--out")?),
            "--time-budget-ms" => {
                let ms: u64 = value("--time-budget-ms")?
                    .parse()
                    .context("invalid --time-budget-ms")?;
                args.time_budget = Some(Duration::from_millis(ms));
            }
            "--threads" => args.threads = Some(value("--threads")?.parse().context("invalid --threads")?),
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            scene if !scene_set => {
                args.scene = scene.to_string();
                scene_set = true;
            }
            other => bail!("unexpected argument {}\n{}", other, USAGE),
        }
    }

    if args.width == 0 || args.height == 0 {
        bail!("image size must be non-zero, got {}x{}", args.width, args.height);
    }

    Ok(args)
}

fn load_scene(args: &Args) -> Result<Scene> {
    if let Some(scene) = scenes::preset(&args.scene, args.width, args.height) {
        log::info!("Using built-in scene '{}'", args.scene);
        return Ok(scene?);
    }

    Scene::from_json_file(&args.scene).with_context(|| {
        format!(
            "failed to load scene '{}' (built-in scenes: {})",
            args.scene,
            scenes::PRESET_NAMES.join(", ")
        )
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(env::args().skip(1))?;

    let settings = match &args.settings {
        Some(path) => RaytracerSettings::from_json_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => RaytracerSettings::default(),
    };
    log::debug!("Settings: {}", serde_json::to_string(&settings)?);

    let scene = load_scene(&args)?;
    let config = EngineConfig { threads: args.threads };
    let mut engine = Engine::with_config(scene, settings, &config)?;
    engine.resize_camera(args.width, args.height);

    let mut frame = FrameBuffer::new(args.width, args.height);
    let deadline = args.time_budget.map(|budget| Instant::now() + budget);
    let start = Instant::now();
    let mut total_rays = 0u64;

    for pass in 1..=args.passes.max(1) {
        let stats = match deadline {
            Some(deadline) => engine.render_pass_until(&mut frame, deadline),
            None => engine.render_pass(&mut frame),
        };
        total_rays += stats.rays;

        log::info!(
            "Pass {}: {:.2} MRays/s ({} rays, {} pixels, {:.2?})",
            pass,
            stats.rays_per_second() / 1_000_000.0,
            stats.rays,
            stats.pixels_written,
            stats.elapsed
        );

        if !stats.is_complete() {
            log::warn!(
                "Time budget reached during pass {} ({}/{} tiles finished)",
                pass,
                stats.tiles_completed,
                stats.tiles
            );
            break;
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "Rendered {}x{} in {:.2?}, {:.2} MRays/s overall",
        args.width,
        args.height,
        elapsed,
        total_rays as f64 / elapsed.as_secs_f64().max(f64::EPSILON) / 1_000_000.0
    );

    image::save_buffer(
        &args.out,
        &frame.to_rgba8(),
        args.width,
        args.height,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("failed to write {}", args.out.display()))?;
    log::info!("Wrote {}", args.out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.scene, "toy");
        assert_eq!((args.width, args.height), (640, 360));
        assert_eq!(args.passes, 1);
        assert!(args.time_budget.is_none());
    }

    #[test]
    fn test_parse_options() {
        let args = parse(&[
            "book",
            "--size",
            "320x200",
            "--passes",
            "8",
            "--out",
            "book.png",
            "--time-budget-ms",
            "250",
            "--threads",
            "2",
        ])
        .unwrap();

        assert_eq!(args.scene, "book");
        assert_eq!((args.width, args.height), (320, 200));
        assert_eq!(args.passes, 8);
        assert_eq!(args.out, PathBuf::from("book.png"));
        assert_eq!(args.time_budget, Some(Duration::from_millis(250)));
        assert_eq!(args.threads, Some(2));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse(&["--size", "320"]).is_err());
        assert!(parse(&["--size", "0x10"]).is_err());
        assert!(parse(&["--passes"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}
