use levelgen::invariants::check_level;
use levelgen::{
    Cardinality, Constraint, ConstraintTarget, GenerationConfig, GenerationError, Predicate,
    TagMode, generate, starter_library,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

fn lit_or_stone_side_rooms() -> Constraint {
    Constraint {
        name: "lit or stone side rooms".to_string(),
        target: ConstraintTarget::SideRooms,
        predicate: Predicate::Tags {
            mode: TagMode::Or,
            tags: vec!["lit".to_string(), "stone".to_string()],
        },
        cardinality: Cardinality::All,
    }
}

#[test]
fn generated_levels_hold_their_invariants() {
    let library = starter_library();
    let mut runner = TestRunner::new(ProptestConfig::with_cases(24));
    let inputs = (any::<u64>(), 3_usize..=16, 0.0_f32..=1.0, any::<bool>());

    runner
        .run(&inputs, |(seed, room_count, distribution, constrained)| {
            let critical_path_length = 2 + (seed as usize % (room_count - 1));
            let config = GenerationConfig {
                seed,
                room_count,
                critical_path_length,
                distribution,
                constraints: if constrained { vec![lit_or_stone_side_rooms()] } else { Vec::new() },
                ..Default::default()
            };
            match generate(&config, &library) {
                Ok(level) => check_level(&level, &config, &library).map_err(TestCaseError::fail)?,
                Err(GenerationError::LayoutNonconvergence { .. }) => {}
                Err(error) => return Err(TestCaseError::fail(format!("seed {seed}: {error}"))),
            }
            Ok(())
        })
        .expect("generated levels should preserve invariants");
}

#[test]
fn narrowest_padding_keeps_foreign_doors_out_of_rooms() {
    let library = starter_library();
    for seed in 0..40 {
        let config =
            GenerationConfig { seed, room_count: 16, room_padding: 2.0, ..Default::default() };
        match generate(&config, &library) {
            Ok(level) => {
                if let Err(violation) = check_level(&level, &config, &library) {
                    panic!("{violation}");
                }
            }
            Err(GenerationError::LayoutNonconvergence { .. }) => {}
            Err(error) => panic!("seed {seed}: {error}"),
        }
    }
}

#[test]
fn default_levels_route_every_connection() {
    let library = starter_library();
    for seed in 0..48 {
        let config = GenerationConfig { seed, ..Default::default() };
        let level = generate(&config, &library).expect("default config generates");
        assert!(
            level.diagnostics.routing_failures.is_empty(),
            "seed {seed}: {:?}",
            level.diagnostics.routing_failures
        );
        assert_eq!(level.paths.len(), level.connections.len());
        assert!(level.doors.iter().all(|door| door.matched));
    }
}
