//! The one-shot pipeline: graph, layout, selection, assembly, grid, routing, hallways.
//!
//! Everything transient (graph, grid, counters, random stream) lives inside one `generate` call;
//! only the finished level leaves it.

use log::{info, warn};

use crate::assembly::assemble;
use crate::config::GenerationConfig;
use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::graph::{GraphParams, generate_graph, layout_tree};
use crate::hallway::build_hallways;
use crate::library::{TemplateId, TemplateLibrary};
use crate::model::{Diagnostics, GeneratedLevel};
use crate::rng::GenRng;
use crate::routing::{RoutingGrid, route_hallways};
use crate::selection::select_template;

/// Builds a level from a configuration and a template library. Identical inputs produce
/// identical levels.
pub fn generate(
    config: &GenerationConfig,
    library: &TemplateLibrary,
) -> Result<GeneratedLevel, GenerationError> {
    config.validate()?;
    library.validate()?;
    let seed = config.seed;
    info!(
        "generating level: seed {seed}, {} rooms, critical path {}, {} constraints",
        config.room_count,
        config.critical_path_length,
        config.constraints.len()
    );

    let mut rng = GenRng::from_seed(seed);
    let mut graph = generate_graph(&GraphParams::from_config(config), &mut rng)?;
    layout_tree(&mut graph, config.ring_distance);

    let mut context = GenerationContext::new(&config.constraints, rng, &graph);
    let mut selections = vec![TemplateId::default(); graph.len()];
    for id in graph.depth_first_order() {
        selections[id.index()] = select_template(library, graph.node(id), &mut context)
            .map_err(|source| GenerationError::TemplateSelection { seed, source })?;
    }

    let mut assembly = assemble(&graph, library, &selections, config).map_err(|unsettled| {
        GenerationError::LayoutNonconvergence {
            seed,
            iterations: unsettled.iterations,
            overlapping_pairs: unsettled.overlapping_pairs,
        }
    })?;

    let mut grid = RoutingGrid::build(&assembly, config);
    let routing = route_hallways(&mut grid, &mut assembly, &config.routing);
    let hallways =
        build_hallways(&grid, &routing.paths, library, &mut context, config.hallway_height);

    let aborted = !routing.failures.is_empty();
    if aborted {
        warn!(
            "seed {seed}: {} of {} hallways could not be routed, level is incomplete",
            routing.failures.len(),
            assembly.connections.len()
        );
    }
    info!(
        "level ready: {} rooms, {} hallways, {} segments ({} authored)",
        assembly.rooms.len(),
        routing.paths.len(),
        hallways.segment_count,
        hallways.pieces.len()
    );

    Ok(GeneratedLevel {
        seed,
        rooms: assembly.rooms,
        doors: assembly.doors,
        connections: assembly.connections,
        paths: routing.paths,
        pieces: hallways.pieces,
        mesh: hallways.mesh,
        diagnostics: Diagnostics {
            grid: grid.snapshot(),
            routing_failures: routing.failures,
            aborted,
            separation_iterations: assembly.separation_iterations,
        },
    })
}
