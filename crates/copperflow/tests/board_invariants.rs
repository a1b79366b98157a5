//! Property tests for the board-level invariants: clearance, zones, and
//! net/pad consistency over randomized configurations and seeds.

use std::collections::HashSet;

use proptest::prelude::*;

use copperflow::config::EngineConfig;
use copperflow::footprint::Category;
use copperflow::geometry::{Bounds, Point, Size};
use copperflow::{BoardLayout, Engine};

#[derive(Debug, Clone)]
struct Case {
    config: EngineConfig,
    seed: u64,
}

fn case_strategy() -> impl Strategy<Value = Case> {
    let dims = (60.0f32..120.0, 60.0f32..120.0);
    let counts = (
        0usize..2,  // large
        0usize..8,  // medium
        0usize..12, // small_medium
        0usize..24, // small
        0usize..4,  // connectors
        0usize..6,  // testpoints
    );
    (dims, counts, 0u64..1_000_000).prop_map(|((width, height), counts, seed)| {
        let mut config = EngineConfig::default();
        config.board.width = width;
        config.board.height = height;
        config.components.large.count = counts.0;
        config.components.medium.count = counts.1;
        config.components.small_medium.count = counts.2;
        config.components.small.count = counts.3;
        config.components.connectors.count = counts.4;
        config.components.testpoints.count = counts.5;
        Case { config, seed }
    })
}

fn generate(case: &Case) -> BoardLayout {
    Engine::with_default_catalog(case.config.clone())
        .expect("generated configs are valid")
        .generate_with_seed(case.seed)
}

fn check_clearances(layout: &BoardLayout) -> Result<(), TestCaseError> {
    for (later_index, later) in layout.placements.iter().enumerate() {
        let inflated = later.bounds().inflate(later.clearance());
        for earlier in &layout.placements[..later_index] {
            prop_assert!(
                !inflated.intersects(earlier.bounds()),
                "{later:?} violates clearance against {earlier:?}"
            );
        }
    }
    Ok(())
}

fn check_zones(layout: &BoardLayout, config: &EngineConfig) -> Result<(), TestCaseError> {
    let margin_x = config.board.width * config.board.edge_margin_fraction;
    let margin_y = config.board.height * config.board.edge_margin_fraction;
    let board = Bounds::from_top_left(
        Point::new(0.0, 0.0),
        Size::new(config.board.width, config.board.height),
    );
    let interior = Bounds::from_top_left(
        Point::new(margin_x, margin_y),
        Size::new(
            config.board.width - 2.0 * margin_x,
            config.board.height - 2.0 * margin_y,
        ),
    );

    for placement in &layout.placements {
        let bounds = placement.bounds();
        prop_assert!(board.contains(bounds), "{placement:?} left the board");
        if placement.category() == Category::Connector {
            prop_assert!(
                !interior.intersects(bounds),
                "connector {placement:?} entered the interior"
            );
        } else {
            prop_assert!(
                interior.contains(bounds),
                "{placement:?} entered the edge band"
            );
        }
    }
    Ok(())
}

fn check_nets(layout: &BoardLayout) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for net in &layout.nets {
        prop_assert!(net.pads().len() >= 2, "net {} too small", net.name());
        for pad in net.pads() {
            prop_assert!(
                pad.placement < layout.placements.len(),
                "dangling pad {pad:?}"
            );
            prop_assert!(
                seen.insert((pad.placement, pad.pin)),
                "pad {pad:?} claimed twice"
            );
        }
    }

    let names: HashSet<&str> = layout.nets.iter().map(|n| n.name()).collect();
    for track in &layout.tracks {
        prop_assert!(
            names.contains(track.net.as_str()),
            "track references unknown net {}",
            track.net
        );
        prop_assert!(track.length() > 0.0, "zero-length track emitted");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn placements_respect_clearance(case in case_strategy()) {
        let layout = generate(&case);
        check_clearances(&layout)?;
    }

    #[test]
    fn placements_respect_zones(case in case_strategy()) {
        let layout = generate(&case);
        check_zones(&layout, &case.config)?;
    }

    #[test]
    fn nets_and_tracks_are_consistent(case in case_strategy()) {
        let layout = generate(&case);
        check_nets(&layout)?;
    }

    #[test]
    fn generation_is_deterministic(case in case_strategy()) {
        prop_assert_eq!(generate(&case), generate(&case));
    }
}
