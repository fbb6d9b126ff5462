//! Region discovery and isolation accounting.
//!
//! Regions are connected components of passable land. They hold
//! coordinates only; the grid stays the single owner of cell state.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use telluria_data::{Axial, ObstacleKind, Region, RegionConnection};
use uuid::Uuid;

use crate::world::hexgrid::HexGrid;

/// Components at or under this cell count can qualify as islands.
const ISLAND_MAX_AREA: usize = 500;

/// Fraction of the boundary that must be water for the island flag.
const ISLAND_WATER_FRACTION: f64 = 0.8;

/// Isolation decays at this fraction of elapsed years when connected.
const ISOLATION_DECAY: f64 = 0.1;

const REGION_PREFIXES: [&str; 10] = [
    "Aster", "Bryn", "Cael", "Dun", "Elm", "Fenn", "Gild", "Hollow", "Iron", "Juni",
];
const REGION_SUFFIXES: [&str; 8] = [
    "mark", "vale", "reach", "moor", "fell", "shore", "wold", "garth",
];

pub struct RegionSystem {
    pub world_id: Uuid,
    pub regions: Vec<Region>,
}

impl RegionSystem {
    /// Flood-fills passable land into regions, stamps `region_id` back
    /// onto the cells, then wires cross-region connections.
    pub fn build(world_id: Uuid, grid: &mut HexGrid, rng: &mut ChaCha8Rng) -> Self {
        let mut coords: Vec<Axial> = grid.coords().collect();
        coords.sort_by_key(|c| (c.r, c.q));

        let mut membership: HashMap<Axial, u32> = HashMap::new();
        let mut regions = Vec::new();
        let mut next_id = 0u32;

        for start in &coords {
            if membership.contains_key(start) {
                continue;
            }
            let passable = grid
                .cell(*start)
                .map(|c| c.is_land && c.terrain.is_passable())
                .unwrap_or(false);
            if !passable {
                continue;
            }

            let id = next_id;
            next_id += 1;
            let mut component = Vec::new();
            let mut queue = VecDeque::from([*start]);
            membership.insert(*start, id);
            while let Some(coord) = queue.pop_front() {
                component.push(coord);
                for n in grid.neighbors(coord) {
                    if membership.contains_key(&n) {
                        continue;
                    }
                    let ok = grid
                        .cell(n)
                        .map(|c| c.is_land && c.terrain.is_passable())
                        .unwrap_or(false);
                    if ok {
                        membership.insert(n, id);
                        queue.push_back(n);
                    }
                }
            }
            component.sort_by_key(|c| (c.r, c.q));

            let name = format!(
                "{}{}",
                REGION_PREFIXES[rng.gen_range(0..REGION_PREFIXES.len())],
                REGION_SUFFIXES[rng.gen_range(0..REGION_SUFFIXES.len())]
            );
            regions.push(Region {
                id,
                name,
                world_id,
                area: component.len(),
                cells: component,
                connections: Vec::new(),
                isolation_years: 0.0,
                is_island: false,
                perimeter: 0,
            });
        }

        for region in &mut regions {
            for coord in &region.cells {
                if let Some(cell) = grid.cell_mut(*coord) {
                    cell.region_id = Some(region.id);
                }
            }
        }

        let mut system = Self { world_id, regions };
        system.measure_boundaries(grid, &membership);
        system.discover_connections(grid, &membership);
        system
    }

    /// Perimeter length and the island flag, from each region's
    /// non-member boundary neighbours.
    fn measure_boundaries(&mut self, grid: &HexGrid, membership: &HashMap<Axial, u32>) {
        for region in &mut self.regions {
            let mut perimeter = 0usize;
            let mut boundary_cells: HashSet<Axial> = HashSet::new();
            let mut water_cells: HashSet<Axial> = HashSet::new();
            for coord in &region.cells {
                let mut exposed = false;
                for n in coord.neighbors() {
                    if membership.get(&n) == Some(&region.id) {
                        continue;
                    }
                    exposed = true;
                    if let Some(cell) = grid.cell(n) {
                        boundary_cells.insert(n);
                        if !cell.is_land {
                            water_cells.insert(n);
                        }
                    }
                }
                if exposed {
                    perimeter += 1;
                }
            }
            region.perimeter = perimeter;
            let water_fraction = if boundary_cells.is_empty() {
                1.0
            } else {
                water_cells.len() as f64 / boundary_cells.len() as f64
            };
            region.is_island =
                region.area <= ISLAND_MAX_AREA && water_fraction >= ISLAND_WATER_FRACTION;
        }
    }

    /// A connection exists where a blocked cell bridges two regions.
    /// The blocking terrain sets the obstacle kind and its maximum
    /// difficulty; the easiest crossing per neighbour pair is kept.
    fn discover_connections(&mut self, grid: &HexGrid, membership: &HashMap<Axial, u32>) {
        let mut best: HashMap<(u32, u32), RegionConnection> = HashMap::new();

        for region in &self.regions {
            for coord in &region.cells {
                for gap in coord.neighbors() {
                    if membership.contains_key(&gap) {
                        continue;
                    }
                    let Some(gap_cell) = grid.cell(gap) else { continue };
                    for far in gap.neighbors() {
                        let Some(&other) = membership.get(&far) else {
                            continue;
                        };
                        if other == region.id {
                            continue;
                        }
                        let obstacle = ObstacleKind::from_terrain(gap_cell.terrain);
                        let difficulty = obstacle.max_difficulty();
                        let key = (region.id, other);
                        let replace = best
                            .get(&key)
                            .map(|c| difficulty < c.difficulty)
                            .unwrap_or(true);
                        if replace {
                            best.insert(
                                key,
                                RegionConnection {
                                    to_region: other,
                                    obstacle,
                                    difficulty,
                                    via: *coord,
                                },
                            );
                        }
                    }
                }
            }
        }

        for ((from, _), connection) in best {
            if let Some(region) = self.regions.iter_mut().find(|r| r.id == from) {
                region.connections.push(connection);
            }
        }
        for region in &mut self.regions {
            region.connections.sort_by_key(|c| c.to_region);
        }
    }

    pub fn region(&self, id: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Long-tick isolation accounting: isolated regions accumulate
    /// years, connected ones decay slowly toward zero.
    pub fn step(&mut self, years: f64) {
        for region in &mut self.regions {
            if region.is_isolated() {
                region.isolation_years += years;
            } else {
                region.isolation_years =
                    (region.isolation_years - years * ISOLATION_DECAY).max(0.0);
            }
        }
    }
}
