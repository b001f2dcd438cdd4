#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::doc_markdown
)]
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use config::Config;
use itertools::Itertools;
use nalgebra::Vector3;
use orrery::{
    belt::{self, BeltSummary},
    bodies::{BodyKind, SolarSystem},
    catalog,
    focus::{CameraPose, FocusTransition},
    motion::{BodySnapshot, Orrery},
    scale::AU,
    time::SimClock,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

/// Headless solar-system orrery: runs the motion model for a number of
/// frames and reports where everything ended up.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(short = 'n', long)]
    frames: Option<u64>,
    /// Frames per real second
    #[arg(long)]
    fps: Option<f64>,
    /// Simulated days per real second (negative runs backwards)
    #[arg(short, long, allow_hyphen_values = true)]
    time_scale: Option<f64>,
    /// Seed for the belt and epoch randomization
    #[arg(short, long)]
    seed: Option<u64>,
    /// Randomize the epoch phase of moons without published angles
    #[arg(long)]
    randomize_epoch: bool,
    /// Override the number of belt asteroids
    #[arg(long)]
    asteroids: Option<usize>,
    /// Body size slider, 0 to 100
    #[arg(long)]
    body_size: Option<f64>,
    /// Frame the camera on this body after the run
    #[arg(short, long)]
    focus: Option<String>,
    /// Include orbit paths with this many segments in the dump
    #[arg(long)]
    paths: Option<usize>,
    /// Write a RON snapshot of the final state here
    #[arg(short, long)]
    dump: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(frames) = self.frames {
            config.clock.frames = frames;
        }
        if let Some(fps) = self.fps {
            config.clock.fps = fps;
        }
        if let Some(time_scale) = self.time_scale {
            config.clock.time_scale = time_scale;
        }
        if let Some(count) = self.asteroids {
            config.belt.count = count;
        }
        if let Some(slider) = self.body_size {
            config.clock.body_size_slider = slider;
        }
        if self.randomize_epoch {
            config.catalog.randomize_epoch_phase = true;
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    clock: SimClock,
    belt: BeltSummary,
    camera: Option<CameraPose>,
    bodies: Vec<BodySnapshot>,
    paths: BTreeMap<Arc<str>, Vec<Vector3<f64>>>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut bodies = catalog::solar_system(&config.catalog, &mut rng);
    let asteroids = belt::generate(&config.belt, &mut rng)?;
    let belt_summary = BeltSummary::new(&config.belt, &asteroids);
    bodies.extend(asteroids);
    let system = SolarSystem::build(bodies)?;

    let mut orrery = Orrery::new(system, config.scale);
    if config.clock.body_size_slider != 0.0 {
        orrery.set_body_size_slider(config.clock.body_size_slider);
    }

    let mut clock = SimClock::new(config.clock.time_scale);
    if config.clock.paused {
        clock.pause();
    }
    let frame_dt = Duration::seconds_f64(1.0 / config.clock.fps);
    for _ in 0..config.clock.frames {
        let frame = clock.tick(frame_dt);
        orrery.update_all(frame);
    }
    info!(frames = config.clock.frames, %clock, "simulation finished");

    let camera = match &args.focus {
        Some(name) => {
            let id = orrery.system().require(name)?;
            let start = CameraPose {
                position: Vector3::new(0.0, 30.0, 80.0),
                target: Vector3::zeros(),
            };
            let mut transition = FocusTransition::new(start, start.focus_on(&orrery, id));
            let frame_seconds = 1.0 / config.clock.fps;
            let mut pose = transition.pose();
            while !transition.is_finished() {
                pose = transition.advance(frame_seconds);
            }
            info!(body = %name, position = ?pose.position, "camera framed");
            Some(pose)
        }
        None => None,
    };

    report(&orrery, &belt_summary, &clock);

    if let Some(path) = &args.dump {
        let paths = match args.paths {
            Some(segments) => orrery
                .system()
                .iter()
                .filter(|(_, body)| body.kind != BodyKind::Asteroid)
                .filter_map(|(id, body)| {
                    orrery
                        .orbit_path(id, segments)
                        .map(|path| (body.name.clone(), path))
                })
                .collect(),
            None => BTreeMap::new(),
        };
        let snapshot = Snapshot {
            clock,
            belt: belt_summary,
            camera,
            bodies: orrery.snapshots(),
            paths,
        };
        let text = ron::ser::to_string_pretty(
            &snapshot,
            ron::ser::PrettyConfig::default().struct_names(true),
        )?;
        std::fs::write(path, text)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote snapshot");
    } else if args.paths.is_some() {
        warn!("--paths has no effect without --dump");
    }

    Ok(())
}

fn report(orrery: &Orrery, belt: &BeltSummary, clock: &SimClock) {
    let system = orrery.system();
    println!("{clock}");
    println!(
        "{:<10} {:<8} {:>10} {:>10} {:>10} {:>8}",
        "body", "kind", "x", "y", "z", "r [AU]"
    );
    let sun = system.root();
    let to_au = AU * orrery.scale().distance_scale;
    for (id, body) in system
        .iter()
        .filter(|(_, body)| matches!(body.kind, BodyKind::Star | BodyKind::Planet))
    {
        let pos = orrery.world_position(id) - orrery.world_position(sun);
        println!(
            "{:<10} {:<8} {:>10.3} {:>10.3} {:>10.3} {:>8.3}",
            body.name,
            body.kind,
            pos.x,
            pos.y,
            pos.z,
            pos.norm() / to_au
        );
    }

    let moons = system
        .iter()
        .filter(|(_, body)| body.kind == BodyKind::Moon)
        .filter_map(|(id, _)| system.parent(id))
        .counts();
    println!(
        "moons: {}",
        moons
            .iter()
            .sorted_by_key(|(parent, _)| **parent)
            .map(|(parent, n)| format!("{} {n}", system[*parent].name))
            .join(", ")
    );
    println!(
        "belt: {} of {} asteroids ({}; background {})",
        belt.total,
        belt.requested,
        belt.families
            .iter()
            .map(|(name, n)| format!("{name} {n}"))
            .join(", "),
        belt.background
    );
    if let Some((min, max)) = belt.a_range {
        println!("belt a: {min:.3} .. {max:.3} AU");
    }
}
