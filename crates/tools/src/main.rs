use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use levelgen::generate;
use log::info;
use tools::{Preset, logger};

#[derive(Parser)]
#[command(author, version, about = "Generate a dungeon level from a seed", long_about = None)]
struct Args {
    /// TOML preset with generation settings, templates and hallway masks
    #[arg(short, long)]
    preset: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    rooms: Option<usize>,
    #[arg(long)]
    critical_path: Option<usize>,
    /// Write the generated level as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the routing grid after generation
    #[arg(long)]
    grid: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose).context("failed to install logger")?;

    let preset = match &args.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::default(),
    };
    let preset = preset.with_overrides(args.seed, args.rooms, args.critical_path);
    let library = preset.library();
    let config = &preset.generation;
    info!("{} templates, {} hallway masks", library.len(), library.masks().count());

    let level = generate(config, &library)
        .with_context(|| format!("generation failed for seed {}", config.seed))?;

    println!("Seed: {}", level.seed);
    println!("Rooms: {}", level.rooms.len());
    println!("Hallways: {} of {}", level.paths.len(), level.connections.len());
    println!("Authored hallway pieces: {}", level.pieces.len());
    println!("Mesh triangles: {}", level.mesh.triangle_count());
    println!("Separation iterations: {}", level.diagnostics.separation_iterations);
    if level.diagnostics.aborted {
        let failures = &level.diagnostics.routing_failures;
        println!("Routing failures: {} (level incomplete)", failures.len());
        for failure in failures {
            println!(
                "  rooms {} -> {} (doors {} -> {}): {:?}",
                failure.from_room,
                failure.to_room,
                failure.from_door,
                failure.to_door,
                failure.reason
            );
        }
    }
    println!("Fingerprint: {:016x}", level.fingerprint());

    if args.grid {
        print!("{}", level.diagnostics.grid.render_ascii());
    }
    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&level).context("failed to serialize level")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Level written to {}", path.display());
    }
    Ok(())
}
