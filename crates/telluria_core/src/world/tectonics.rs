//! Tectonic plate set and its long-tick evolution.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use telluria_data::{BoundaryKind, PlateBoundary, PlateKind, TectonicPlate};
use uuid::Uuid;

use crate::rng::domain_rng;
use crate::world::hexgrid::HexGrid;

const PLATE_NAMES: [&str; 14] = [
    "Aureline", "Borvask", "Cindral", "Dorneth", "Ervast", "Fenholt", "Gorvane", "Hesperi",
    "Ilvek", "Jorast", "Kelvorn", "Lumara", "Morvath", "Nerevi",
];

/// Relative speeds below this read as a transform boundary.
const TRANSFORM_SPEED: f64 = 0.2;

/// Per-year probability that the largest continental plate rifts.
const SPLIT_CHANCE_PER_YEAR: f64 = 2.0e-9;

/// Per-year probability that a small oceanic plate subducts away.
const MERGE_CHANCE_PER_YEAR: f64 = 3.0e-9;

pub struct TectonicSystem {
    pub world_id: Uuid,
    pub seed: u64,
    pub plates: Vec<TectonicPlate>,
    pub boundaries: Vec<PlateBoundary>,
    adjacency: Vec<(u32, u32)>,
    next_plate_id: u32,
    rng: ChaCha8Rng,
}

impl TectonicSystem {
    /// Seeds a deterministic plate set for `(world_id, seed)`.
    pub fn new(world_id: Uuid, seed: u64) -> Self {
        let mut rng = domain_rng(world_id, seed, "tectonics");
        let plate_count = rng.gen_range(6..=10);
        let nominal_cells = 10_000usize;
        let mut plates = Vec::with_capacity(plate_count);
        for i in 0..plate_count {
            let kind = match rng.gen_range(0..100) {
                0..=39 => PlateKind::Continental,
                40..=84 => PlateKind::Oceanic,
                _ => PlateKind::Mixed,
            };
            let landmass_pct = match kind {
                PlateKind::Continental => rng.gen_range(0.6..0.9),
                PlateKind::Oceanic => rng.gen_range(0.0..0.1),
                PlateKind::Mixed => rng.gen_range(0.25..0.55),
            };
            plates.push(TectonicPlate {
                id: i as u32,
                name: PLATE_NAMES[i % PLATE_NAMES.len()].to_string(),
                kind,
                velocity: (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
                rotation: rng.gen_range(-0.01..0.01),
                landmass_pct,
                cell_count: nominal_cells / plate_count,
            });
        }
        let mut system = Self {
            world_id,
            seed,
            plates,
            boundaries: Vec::new(),
            adjacency: Vec::new(),
            next_plate_id: plate_count as u32,
            rng,
        };
        // Until a grid is assigned, treat the set as a ring of neighbours.
        system.adjacency = (0..plate_count as u32)
            .map(|i| (i, (i + 1) % plate_count as u32))
            .collect();
        system.classify_boundaries();
        system
    }

    /// Voronoi assignment of grid cells to plates by hex distance to
    /// per-plate seed cells. Rebuilds adjacency and plate statistics.
    pub fn assign_cells(&mut self, grid: &mut HexGrid) {
        let coords: Vec<_> = {
            let mut v: Vec<_> = grid.coords().collect();
            v.sort_by_key(|c| (c.r, c.q));
            v
        };
        if coords.is_empty() {
            return;
        }
        let seeds: Vec<_> = (0..self.plates.len())
            .map(|_| coords[self.rng.gen_range(0..coords.len())])
            .collect();

        for coord in &coords {
            let nearest = seeds
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| coord.distance(s))
                .map(|(i, _)| i)
                .unwrap_or(0);
            if let Some(cell) = grid.cell_mut(*coord) {
                cell.plate_id = self.plates[nearest].id;
            }
        }

        let mut pairs: HashSet<(u32, u32)> = HashSet::new();
        for coord in &coords {
            let here = grid.cell(*coord).map(|c| c.plate_id).unwrap_or(0);
            for n in grid.neighbors(*coord) {
                let there = grid.cell(n).map(|c| c.plate_id).unwrap_or(here);
                if here != there {
                    pairs.insert((here.min(there), here.max(there)));
                }
            }
        }
        self.adjacency = pairs.into_iter().collect();
        self.adjacency.sort_unstable();
        self.refresh_stats(grid);
        self.classify_boundaries();
    }

    /// Recomputes per-plate cell counts and land fractions from the grid.
    pub fn refresh_stats(&mut self, grid: &HexGrid) {
        for plate in &mut self.plates {
            let (mut cells, mut land) = (0usize, 0usize);
            for cell in grid.cells() {
                if cell.plate_id == plate.id {
                    cells += 1;
                    if cell.is_land {
                        land += 1;
                    }
                }
            }
            plate.cell_count = cells;
            plate.landmass_pct = if cells > 0 {
                land as f64 / cells as f64
            } else {
                0.0
            };
        }
    }

    fn plate(&self, id: u32) -> Option<&TectonicPlate> {
        self.plates.iter().find(|p| p.id == id)
    }

    /// Boundary kinds from relative velocities:
    /// low relative speed → Transform; co-moving → Divergent;
    /// continental pair in opposition → Collision; else Convergent.
    pub fn classify_boundaries(&mut self) {
        let mut boundaries = Vec::with_capacity(self.adjacency.len());
        for &(a, b) in &self.adjacency {
            let (Some(pa), Some(pb)) = (self.plate(a), self.plate(b)) else {
                continue;
            };
            let rel = (
                pa.velocity.0 - pb.velocity.0,
                pa.velocity.1 - pb.velocity.1,
            );
            let rel_speed = (rel.0 * rel.0 + rel.1 * rel.1).sqrt();
            let dot = pa.velocity.0 * pb.velocity.0 + pa.velocity.1 * pb.velocity.1;
            let both_continental =
                pa.kind == PlateKind::Continental && pb.kind == PlateKind::Continental;
            let kind = if rel_speed < TRANSFORM_SPEED {
                BoundaryKind::Transform
            } else if dot > 0.0 {
                BoundaryKind::Divergent
            } else if both_continental {
                BoundaryKind::Collision
            } else {
                BoundaryKind::Convergent
            };
            boundaries.push(PlateBoundary {
                plate_a: a,
                plate_b: b,
                kind,
                // Normalised against the fastest possible closing speed.
                activity: (rel_speed / (2.0 * 2.0_f64.sqrt())).clamp(0.0, 1.0),
            });
        }
        self.boundaries = boundaries;
    }

    /// One long tick of at least 10 000 years: velocity drift plus the
    /// rare split and subduction events, then boundary reclassification.
    pub fn step(&mut self, years: f64) {
        for plate in &mut self.plates {
            plate.velocity.0 += self.rng.gen_range(-0.05..0.05);
            plate.velocity.1 += self.rng.gen_range(-0.05..0.05);
            plate.velocity.0 = plate.velocity.0.clamp(-2.0, 2.0);
            plate.velocity.1 = plate.velocity.1.clamp(-2.0, 2.0);
        }

        let split_p = (SPLIT_CHANCE_PER_YEAR * years).min(1.0);
        if self.rng.gen_bool(split_p) {
            self.split_largest_continental();
        }
        let merge_p = (MERGE_CHANCE_PER_YEAR * years).min(1.0);
        if self.rng.gen_bool(merge_p) {
            self.subduct_small_oceanic();
        }
        self.classify_boundaries();
    }

    /// Rifts the largest continental plate in two, opening a divergent
    /// boundary between the halves.
    fn split_largest_continental(&mut self) {
        let Some(idx) = self
            .plates
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == PlateKind::Continental)
            .max_by_key(|(_, p)| p.cell_count)
            .map(|(i, _)| i)
        else {
            return;
        };
        let new_id = self.next_plate_id;
        self.next_plate_id += 1;

        let half = self.plates[idx].cell_count / 2;
        self.plates[idx].cell_count -= half;
        let parent_id = self.plates[idx].id;
        let parent_velocity = self.plates[idx].velocity;
        let landmass = self.plates[idx].landmass_pct;
        let name = format!("{} Rift", self.plates[idx].name);
        tracing::info!(parent = parent_id, new = new_id, "continental plate rifted");

        self.plates.push(TectonicPlate {
            id: new_id,
            name,
            kind: PlateKind::Continental,
            velocity: (-parent_velocity.0, -parent_velocity.1),
            rotation: 0.0,
            landmass_pct: landmass,
            cell_count: half,
        });
        self.adjacency.push((parent_id.min(new_id), parent_id.max(new_id)));
    }

    /// Merges the smallest oceanic plate into the largest continental
    /// partner via subduction.
    fn subduct_small_oceanic(&mut self) {
        let Some(small_idx) = self
            .plates
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == PlateKind::Oceanic)
            .min_by_key(|(_, p)| p.cell_count)
            .map(|(i, _)| i)
        else {
            return;
        };
        let Some(big_idx) = self
            .plates
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == PlateKind::Continental)
            .max_by_key(|(_, p)| p.cell_count)
            .map(|(i, _)| i)
        else {
            return;
        };
        if small_idx == big_idx {
            return;
        }
        let small = self.plates.remove(small_idx);
        let big_idx = if small_idx < big_idx { big_idx - 1 } else { big_idx };
        let big = &mut self.plates[big_idx];
        tracing::info!(subducted = small.id, into = big.id, "oceanic plate subducted");
        big.cell_count += small.cell_count;
        self.adjacency
            .retain(|&(a, b)| a != small.id && b != small.id);
    }

    /// Landmass dispersion scalar in `[0, 1]`:
    /// `0.6 · plateCountFactor + 0.4 · concentrationFactor`.
    pub fn fragmentation(&self) -> f64 {
        let continental: Vec<_> = self
            .plates
            .iter()
            .filter(|p| p.kind != PlateKind::Oceanic)
            .collect();
        if continental.is_empty() {
            return 0.0;
        }
        let plate_count_factor = ((continental.len() as f64 - 1.0) / 10.0).min(0.9);

        let land_cells = |p: &TectonicPlate| p.cell_count as f64 * p.landmass_pct;
        let total_land: f64 = continental.iter().map(|p| land_cells(p)).sum();
        if total_land <= 0.0 {
            return 0.6 * plate_count_factor;
        }
        let largest = continental
            .iter()
            .map(|p| land_cells(p))
            .fold(0.0_f64, f64::max);
        let concentration_factor = 1.0 - largest / total_land;

        0.6 * plate_count_factor + 0.4 * concentration_factor
    }
}
