use std::f32::consts::TAU;

use anyhow::{bail, Context, Result};
use cgmath::Vector3;
use clap::{Parser, Subcommand};
use log::info;
use sway::prelude::*;
use sway::VERSION;

#[derive(Parser, Debug)]
#[command(name = "sway", version = VERSION, about = "Secondary motion for joint chains")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a chain settings YAML and print the values that will be used
    Inspect { path: String },
    /// Swing a straight demo chain sideways and print the tip position per frame
    Simulate {
        /// Chain settings YAML
        #[arg(long, conflicts_with = "preset")]
        config: Option<String>,
        /// Named preset: hair, tail or cloak-edge
        #[arg(long)]
        preset: Option<String>,
        /// Number of joints hanging below the owner
        #[arg(long, default_value_t = 5)]
        joints: usize,
        /// Distance between neighbouring joints
        #[arg(long, default_value_t = 0.25)]
        segment: f32,
        #[arg(long, default_value_t = 120)]
        frames: u32,
        /// Frame time in seconds
        #[arg(long, default_value_t = 0.02)]
        dt: f32,
        /// Peak sideways offset of the owner
        #[arg(long, default_value_t = 0.5)]
        amplitude: f32,
        /// Swings per second
        #[arg(long, default_value_t = 1.0)]
        frequency: f32,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect { path } => {
            let settings = ChainSettings::load_from_path(&path)
                .with_context(|| format!("failed to load settings from {}", path))?;
            println!("Loaded settings: {}", path);
            println!("  damping: {:.3}", settings.damping);
            println!("  stiffness: {:.3}", settings.stiffness);
            let [x, y, z] = settings.external_force;
            println!("  external force: ({:.3}, {:.3}, {:.3})", x, y, z);
            println!("  update mode: {:?}", settings.update_mode);
        }
        Command::Simulate {
            config,
            preset,
            joints,
            segment,
            frames,
            dt,
            amplitude,
            frequency,
        } => {
            let settings = match (config, preset) {
                (Some(path), _) => ChainSettings::load_from_path(&path)
                    .with_context(|| format!("failed to load settings from {}", path))?,
                (None, Some(name)) => presets::by_name(&name).with_context(|| {
                    format!(
                        "unknown preset '{}', expected one of: {}",
                        name,
                        presets::PRESET_NAMES.join(", ")
                    )
                })?,
                (None, None) => ChainSettings::default(),
            };
            simulate(settings, joints, segment, frames, dt, amplitude, frequency)?;
        }
    }
    Ok(())
}

fn simulate(
    settings: ChainSettings,
    joint_count: usize,
    segment: f32,
    frames: u32,
    dt: f32,
    amplitude: f32,
    frequency: f32,
) -> Result<()> {
    if joint_count == 0 {
        bail!("--joints must be at least 1");
    }
    if !dt.is_finite() || dt <= 0.0 {
        bail!("--dt must be a positive number of seconds, got {}", dt);
    }

    let mut scene = SceneGraph::new();
    let owner = scene.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
    let joints = scene.add_chain(owner, "joint", joint_count, Vector3::new(0.0, -segment, 0.0))?;
    let tip = *joints.last().context("demo chain has no joints")?;

    let motion = SecondaryMotion::builder(owner)
        .with_name("demo chain")
        .with_root_joint(joints[0])
        .with_settings(settings.clone())
        .build(&scene);

    let mut manager = SimulationManager::new();
    let index = manager.attach_simulation(Box::new(motion), &mut scene);
    info!(
        "simulating {} joints for {} frames (damping {:.3}, stiffness {:.3}, {:?})",
        joint_count, frames, settings.damping, settings.stiffness, settings.update_mode
    );

    println!("frame,time,owner_x,tip_x,tip_y,tip_z");
    for frame in 0..frames {
        let time = (frame + 1) as f32 * dt;
        let owner_x = amplitude * (TAU * frequency * time).sin();
        scene.set_local_position(owner, Vector3::new(owner_x, 0.0, 0.0));
        manager.advance(dt, &mut scene);

        let p = scene.world_position(tip);
        println!(
            "{},{:.4},{:.4},{:.4},{:.4},{:.4}",
            frame, time, owner_x, p.x, p.y, p.z
        );
    }

    if let Some(stats) = manager.simulation(index).and_then(|s| s.stats()) {
        info!(
            "{} steps covering {:.3}s ({:.1} Hz)",
            stats.step_count,
            stats.simulated_time,
            stats.frequency()
        );
    }
    manager.detach_all(&mut scene);
    Ok(())
}
