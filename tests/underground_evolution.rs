use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use telluria_core::world::underground::caves::{KarstParams, KarstSystem};
use telluria_core::world::underground::column::ColumnGrid;
use telluria_core::world::underground::deposits::evolve_deposits;
use telluria_core::world::underground::magma::{MagmaEvent, MagmaParams, MagmaSystem};
use telluria_core::world::underground::mining::{self, MiningTool};
use telluria_data::{BoundaryKind, Deposit, DepositKind, OrganicOrigin, OrganicStage, VoidKind};

#[test]
fn strata_stay_disjoint_through_a_geological_age() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let mut columns = ColumnGrid::generate(8, 8, &mut rng, 0);
    let mut karst = KarstSystem::new();
    let karst_params = KarstParams::default();
    let magma_params = MagmaParams::default();
    let boundaries = vec![(BoundaryKind::Convergent, 0.8)];

    for step in 0..100 {
        karst.step(&mut columns, &karst_params, 10_000.0, &mut rng);
        MagmaSystem::step(&mut columns, &boundaries, &magma_params, 10_000.0, &mut rng);
        let year = (step + 1) * 10_000;
        for column in columns.columns_mut() {
            evolve_deposits(column, year);
        }
    }

    for column in columns.columns() {
        assert!(column.strata_are_ordered(), "column {},{}", column.x, column.y);
        for void in &column.voids {
            assert!(void.top_m < void.bottom_m);
        }
    }
}

#[test]
fn karst_caves_eventually_riddle_the_limestone() {
    let mut rng = ChaCha8Rng::seed_from_u64(32);
    let mut columns = ColumnGrid::generate(10, 10, &mut rng, 0);
    let mut karst = KarstSystem::new();
    let params = KarstParams::default();
    for _ in 0..300 {
        karst.step(&mut columns, &params, 10_000.0, &mut rng);
    }
    assert!(!karst.caves.is_empty());
    for cave in &karst.caves {
        assert!(cave.chamber_count() >= 1);
        assert!(cave.graph.node_count() >= cave.chamber_count());
    }
    let with_cave_voids = columns
        .columns()
        .filter(|c| c.voids.iter().any(|v| v.kind == VoidKind::Cave))
        .count();
    assert!(with_cave_voids > 0);
}

#[test]
fn magma_lifecycle_produces_events() {
    let mut rng = ChaCha8Rng::seed_from_u64(33);
    let mut columns = ColumnGrid::generate(6, 6, &mut rng, 0);
    let boundaries = vec![(BoundaryKind::Convergent, 1.0), (BoundaryKind::Divergent, 0.7)];
    let params = MagmaParams::default();

    let mut all_events = Vec::new();
    for _ in 0..400 {
        all_events.extend(MagmaSystem::step(
            &mut columns,
            &boundaries,
            &params,
            50_000.0,
            &mut rng,
        ));
    }
    assert!(all_events
        .iter()
        .any(|e| matches!(e, MagmaEvent::Spawned { .. })));
    // Chambers cool at 2 °C/ky, so 400 × 50 ky is ample time for a
    // freeze-out or an eruption somewhere.
    assert!(all_events.iter().any(|e| matches!(
        e,
        MagmaEvent::Erupted { .. } | MagmaEvent::SolidifiedToCave { .. } | MagmaEvent::Collapsed { .. }
    )));
}

#[test]
fn deep_burial_matures_organics_to_oil_and_coal() {
    let mut rng = ChaCha8Rng::seed_from_u64(34);
    let mut columns = ColumnGrid::generate(2, 2, &mut rng, 0);
    let column = columns.column_mut(0, 0).unwrap();
    column.resources.push(Deposit::organic(
        OrganicOrigin::Animal,
        "leviathan",
        true,
        700.0,
        400.0,
        0,
    ));
    column.resources.push(Deposit::organic(
        OrganicOrigin::Plant,
        "fern",
        false,
        200.0,
        250.0,
        0,
    ));

    for year in [10_000, 100_000, 1_000_000, 2_000_000, 5_000_000] {
        evolve_deposits(column, year);
    }

    let stages: Vec<OrganicStage> = column
        .resources
        .iter()
        .filter_map(|d| match &d.kind {
            DepositKind::Organic { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert!(stages.contains(&OrganicStage::Oil));
    assert!(stages.contains(&OrganicStage::Coal));
}

#[test]
fn mining_reveals_seams_and_digs_burrows() {
    let mut rng = ChaCha8Rng::seed_from_u64(35);
    let mut columns = ColumnGrid::generate(4, 4, &mut rng, 0);

    // Find a column with a mineral seam shallow enough for the pick.
    let target = columns
        .columns()
        .find(|c| c.resources.iter().any(|d| d.depth_m <= 200.0))
        .map(|c| (c.x, c.y));
    if let Some((x, y)) = target {
        let depth = {
            let column = columns.column(x, y).unwrap();
            column.resources[0].depth_m
        };
        let column = columns.column_mut(x, y).unwrap();
        let mut tool = MiningTool::iron_pick();
        match mining::mine(&mut tool, column, depth, true) {
            Ok(outcome) => {
                assert!(outcome.time_s > 0.0);
                assert!(outcome.tunnel.is_some());
                assert!(outcome.revealed.is_some());
                assert!(tool.durability < 100.0);
            }
            Err(e) => {
                // Basement seams can out-class an iron pick.
                assert!(matches!(
                    e,
                    mining::MiningError::TooHard { .. } | mining::MiningError::TooDeep { .. }
                ));
            }
        }
    }

    // Burrows always work in the soil cap.
    let column = columns.column_mut(1, 1).unwrap();
    let chambers = mining::create_burrow(column, 0.5, 2, &mut rng).unwrap();
    assert_eq!(chambers.len(), 2);
    assert!(column
        .voids
        .iter()
        .filter(|v| v.kind == VoidKind::Burrow)
        .count() >= 2);
}
