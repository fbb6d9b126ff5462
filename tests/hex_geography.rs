use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use telluria_core::world::hexgrid::HexGrid;
use telluria_core::world::regions::RegionSystem;
use telluria_data::{Axial, TerrainKind};
use uuid::Uuid;

#[test]
fn five_cell_strip_paths_in_five_steps() {
    let mut grid = HexGrid::new(10, 10);
    for q in 0..5 {
        let cell = grid.cell_mut(Axial::new(q, 0)).unwrap();
        cell.is_land = true;
        cell.terrain = TerrainKind::Plains;
    }
    let path = grid.find_land_path(Axial::new(0, 0), Axial::new(4, 0));
    assert_eq!(path.len(), 5);
    let off_map = grid.find_land_path(Axial::new(0, 0), Axial::new(10, 10));
    assert!(off_map.is_empty());
}

#[test]
fn paths_route_around_blocked_ground() {
    let mut grid = HexGrid::new(10, 10);
    // A 3-row block of land with a volcanic wall through the middle
    // column, broken at the bottom row.
    for r in 0..3 {
        for q_off in 0..7 {
            let coord = HexGrid::offset_to_axial(q_off, r);
            let cell = grid.cell_mut(coord).unwrap();
            cell.is_land = true;
            cell.terrain = TerrainKind::Plains;
        }
    }
    for r in 0..2 {
        let coord = HexGrid::offset_to_axial(3, r);
        grid.cell_mut(coord).unwrap().terrain = TerrainKind::Volcanic;
    }
    let start = HexGrid::offset_to_axial(0, 0);
    let goal = HexGrid::offset_to_axial(6, 0);
    let path = grid.find_land_path(start, goal);
    assert!(!path.is_empty());
    // The detour is longer than the straight line.
    assert!(path.len() > 7);
    for coord in &path {
        assert!(grid.cell(*coord).unwrap().terrain.is_passable());
    }
}

#[test]
fn regions_track_isolation_across_long_ticks() {
    let mut grid = HexGrid::new(16, 4);
    for q in 0..5 {
        let cell = grid.cell_mut(Axial::new(q, 0)).unwrap();
        cell.is_land = true;
        cell.terrain = TerrainKind::Plains;
    }
    // An ocean gap, then a second shore.
    for q in 7..12 {
        let cell = grid.cell_mut(Axial::new(q, 0)).unwrap();
        cell.is_land = true;
        cell.terrain = TerrainKind::Plains;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let mut regions = RegionSystem::build(Uuid::new_v4(), &mut grid, &mut rng);
    assert_eq!(regions.regions.len(), 2);

    for _ in 0..10 {
        regions.step(10_000.0);
    }
    for region in &regions.regions {
        assert!(region.is_isolated());
        assert_eq!(region.isolation_years, 100_000.0);
    }
}

proptest! {
    #[test]
    fn cube_invariant_and_distance_symmetry(q in -50i32..50, r in -50i32..50, q2 in -50i32..50, r2 in -50i32..50) {
        let a = Axial::new(q, r);
        let b = Axial::new(q2, r2);
        prop_assert_eq!(a.q + a.r + a.s(), 0);
        prop_assert_eq!(a.distance(&b), b.distance(&a));
        prop_assert!(a.distance(&b) >= 0);
    }

    #[test]
    fn pixel_round_trip_is_exact(q in -40i32..40, r in -40i32..40, size in 0.2f64..25.0) {
        let h = Axial::new(q, r);
        let (x, y) = h.to_pixel(size);
        prop_assert_eq!(Axial::from_pixel(x, y, size), h);
    }

    #[test]
    fn ring_size_is_six_radius(q in -10i32..10, r in -10i32..10, radius in 1i32..6) {
        let center = Axial::new(q, r);
        let ring = center.ring(radius);
        prop_assert_eq!(ring.len(), (6 * radius) as usize);
        for cell in ring {
            prop_assert_eq!(center.distance(&cell), radius);
        }
    }
}
