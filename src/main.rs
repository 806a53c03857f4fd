//! Headless driver: runs one field at its reference cadence and logs stats.
//!
//! Run with: `cargo run --features cli --bin pointcloud-sim -- [scene] [count] [frames]`
//!
//! `scene` is `sphere`, `spring`, `stream` or a path to a JSON scene file.
//! Without it, the file named by `POINTCLOUD_SCENE` is used, falling back to
//! the breathing sphere.

use pointcloud::prelude::*;
use pointcloud::LoadError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_COUNT: usize = 2000;
const DEFAULT_FRAMES: u64 = 1500;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pointcloud=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let mut args = std::env::args().skip(1);
    let scene_arg = args.next();
    let count: Option<usize> = args.next().and_then(|s| s.parse().ok());
    let frames: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut scene = load_scene(scene_arg.as_deref())?;
    if let Some(n) = count {
        match &mut scene {
            SceneConfig::Sphere { count, .. } | SceneConfig::Stream { count, .. } => *count = n,
        }
    }

    let step = scene.frame_delta();
    let mut clock = FrameClock::new().with_fixed_delta(Some(step));

    match scene {
        SceneConfig::Sphere { count, config } => {
            info!(scene = "sphere", count, frames, wiggle = ?config.wiggle, "Starting simulation");
            let mut field = SphereParticleField::with_config(count, config);
            if field.len() < count {
                warn!(requested = count, sampled = field.len(), "Sphere has fewer points than requested");
            }
            run(&mut field, &mut clock, frames, |field| {
                let points = field.snapshot();
                let visible = points.iter().filter(|p| p.alpha > 0.0).count();
                let mean_alpha = if points.is_empty() {
                    0.0
                } else {
                    points.iter().map(|p| p.alpha).sum::<f32>() / points.len() as f32
                };
                info!(
                    time = %format!("{:.3}", field.time()),
                    pulses = field.pulse_count(),
                    live = field.live_count(),
                    frozen = field.frozen_count(),
                    visible,
                    mean_alpha = %format!("{:.3}", mean_alpha),
                    "sphere"
                );
            });
        }
        SceneConfig::Stream { count, config } => {
            info!(scene = "stream", count, frames, "Starting simulation");
            let mut field = StreamParticleField::with_config(count, config);
            run(&mut field, &mut clock, frames, |field| {
                let (low, high) = field
                    .snapshot()
                    .iter()
                    .map(|p| p.position[1])
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
                info!(
                    time = %format!("{:.3}", field.time()),
                    lowest = %format!("{:.3}", low),
                    highest = %format!("{:.3}", high),
                    "stream"
                );
            });
        }
    }

    info!(frames = clock.frame(), fps = %format!("{:.0}", clock.fps()), "Done");
    Ok(())
}

fn load_scene(arg: Option<&str>) -> Result<SceneConfig, LoadError> {
    let scene = match arg {
        Some("sphere") => SceneConfig::Sphere {
            count: DEFAULT_COUNT,
            config: SphereConfig::breathing(),
        },
        Some("spring") => SceneConfig::Sphere {
            count: DEFAULT_COUNT,
            config: SphereConfig::spring(),
        },
        Some("stream") => SceneConfig::Stream {
            count: DEFAULT_COUNT,
            config: StreamConfig::default(),
        },
        Some(path) => SceneConfig::from_path(path)?,
        None => match std::env::var("POINTCLOUD_SCENE") {
            Ok(path) => SceneConfig::from_path(path)?,
            Err(_) => SceneConfig::Sphere {
                count: DEFAULT_COUNT,
                config: SphereConfig::breathing(),
            },
        },
    };
    Ok(scene)
}

/// Advance `field` for `frames` ticks of `clock`, reporting once per
/// simulated second.
fn run<F: ParticleField>(field: &mut F, clock: &mut FrameClock, frames: u64, mut report: impl FnMut(&F)) {
    let step = clock.fixed_delta().unwrap_or(clock.delta());
    let stats_every = if step > 0.0 { (1.0 / step).round().max(1.0) as u64 } else { 1 };

    for _ in 0..frames {
        field.advance(clock.tick());

        if field.as_floats().iter().any(|v| !v.is_finite()) {
            warn!(frame = clock.frame(), "Non-finite value in attribute buffer");
        }
        if clock.frame() % stats_every == 0 {
            report(field);
        }
    }
}
