use std::collections::BTreeMap;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use levelgen::{GenerationConfig, GenerationError, generate, starter_library};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tools::{check_level, logger};

#[derive(Parser)]
#[command(author, version, about = "Sweep random configurations and check level invariants")]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    runs: u32,
    #[arg(long, default_value_t = 24)]
    max_rooms: usize,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn pick(rng: &mut ChaCha8Rng, min: usize, max: usize) -> usize {
    min + rng.next_u64() as usize % (max - min + 1)
}

fn random_config(rng: &mut ChaCha8Rng, max_rooms: usize) -> GenerationConfig {
    let room_count = pick(rng, 3, max_rooms.max(3));
    GenerationConfig {
        seed: rng.next_u64(),
        room_count,
        critical_path_length: pick(rng, 2, room_count),
        max_doors: pick(rng, 3, 6),
        distribution: (rng.next_u64() % 101) as f32 / 100.0,
        ..Default::default()
    }
}

fn error_kind(error: &GenerationError) -> &'static str {
    match error {
        GenerationError::Configuration(_) => "configuration",
        GenerationError::TemplateSelection { .. } => "template selection",
        GenerationError::LayoutNonconvergence { .. } => "layout nonconvergence",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose)?;

    println!("Fuzzing {} configurations from seed {}...", args.runs, args.seed);
    let library = starter_library();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut errors: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut violations = Vec::new();
    let mut incomplete = 0;

    for _ in 0..args.runs {
        let config = random_config(&mut rng, args.max_rooms);
        match generate(&config, &library) {
            Ok(level) => {
                if level.diagnostics.aborted {
                    incomplete += 1;
                }
                if let Err(violation) = check_level(&level, &config, &library) {
                    violations.push(violation);
                }
            }
            Err(error) => *errors.entry(error_kind(&error)).or_default() += 1,
        }
    }

    println!("Incomplete levels (routing failures): {incomplete}");
    for (kind, count) in &errors {
        println!("Fatal {kind} errors: {count}");
    }
    for violation in &violations {
        println!("Invariant failed: {violation}");
    }
    if !violations.is_empty() {
        bail!("{} of {} levels broke an invariant", violations.len(), args.runs);
    }
    println!("Fuzzing completed successfully.");
    Ok(())
}
