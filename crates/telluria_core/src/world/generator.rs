//! The world-gen orchestrator.
//!
//! Composes geography, climate, biomes and the subsurface in a fixed
//! order from domain-separated seeds, exactly once per
//! `(world_id, seed)`. Generated worlds are cached and shared.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use telluria_data::{Axial, BoundaryKind, TerrainKind};
use uuid::Uuid;

use crate::rng::{domain_rng, domain_seed};
use crate::world::atmosphere::Atmosphere;
use crate::world::biome;
use crate::world::hexgrid::HexGrid;
use crate::world::orbital::{calculate_orbital_state, OrbitalState};
use crate::world::regions::RegionSystem;
use crate::world::satellites::{SatelliteConfig, SatelliteSystem, EARTH_MASS_KG, EARTH_RADIUS_M};
use crate::world::stellar::solar_luminosity;
use crate::world::tectonics::TectonicSystem;
use crate::world::underground::ColumnGrid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldGenConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    /// Stellar age of the world at generation time, years.
    pub start_year: f64,
    pub sea_level: f64,
    pub satellites: SatelliteConfig,
    pub column_width: u32,
    pub column_height: u32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            seed: 0,
            start_year: 4.5e9,
            sea_level: 0.0,
            satellites: SatelliteConfig::default(),
            column_width: 32,
            column_height: 24,
        }
    }
}

/// Everything world generation produces for one world.
pub struct GeneratedWorld {
    pub world_id: Uuid,
    pub config: WorldGenConfig,
    pub grid: HexGrid,
    pub tectonics: TectonicSystem,
    pub regions: RegionSystem,
    pub satellites: SatelliteSystem,
    pub orbital: OrbitalState,
    pub luminosity: f64,
    pub atmosphere: Atmosphere,
    pub columns: ColumnGrid,
}

/// Deterministic lattice noise in `[0, 1)`.
fn value_noise(q: i32, r: i32, seed: u64) -> f64 {
    let mut h = seed
        ^ (q as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (r as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h >> 11) as f64 / (1u64 << 53) as f64
}

#[derive(Default)]
pub struct WorldGenerator {
    cache: RwLock<HashMap<Uuid, Arc<GeneratedWorld>>>,
}

impl WorldGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates (or returns the cached) world for `world_id`.
    pub fn generate(&self, world_id: Uuid, config: WorldGenConfig) -> Arc<GeneratedWorld> {
        if let Some(world) = self.cached(world_id) {
            return world;
        }
        let world = Arc::new(Self::build(world_id, config));
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(world_id).or_insert(world).clone()
    }

    pub fn cached(&self, world_id: Uuid) -> Option<Arc<GeneratedWorld>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(&world_id).cloned()
    }

    fn build(world_id: Uuid, config: WorldGenConfig) -> GeneratedWorld {
        tracing::info!(%world_id, seed = config.seed, "generating world");

        let mut grid = HexGrid::new(config.width, config.height);
        let mut tectonics = TectonicSystem::new(world_id, config.seed);
        tectonics.assign_cells(&mut grid);

        let mut satellite_rng = domain_rng(world_id, config.seed, "satellites");
        let satellites = SatelliteSystem::generate(
            &mut satellite_rng,
            EARTH_MASS_KG,
            EARTH_RADIUS_M,
            config.satellites,
        );
        let stability = satellites.obliquity_stability();
        let orbital = calculate_orbital_state(0.0, stability);
        let luminosity = solar_luminosity(config.start_year);

        Self::shape_elevation(&mut grid, &tectonics, &config);
        Self::apply_climate(&mut grid, &config, orbital.insolation * luminosity);
        Self::classify_terrain(&mut grid, &tectonics, &config);
        for cell in grid.cells_mut() {
            cell.biome = Some(biome::assign(cell));
        }

        tectonics.refresh_stats(&grid);
        let mut region_rng = domain_rng(world_id, config.seed, "regions");
        let regions = RegionSystem::build(world_id, &mut grid, &mut region_rng);

        let atmosphere = Atmosphere::for_start_year(config.start_year);

        let mut column_rng = domain_rng(world_id, config.seed, "underground");
        let columns = ColumnGrid::generate(
            config.column_width,
            config.column_height,
            &mut column_rng,
            0,
        );

        tracing::info!(
            %world_id,
            cells = grid.len(),
            plates = tectonics.plates.len(),
            regions = regions.regions.len(),
            moons = satellites.moons.len(),
            "world generated"
        );

        GeneratedWorld {
            world_id,
            config,
            grid,
            tectonics,
            regions,
            satellites,
            orbital,
            luminosity,
            atmosphere,
            columns,
        }
    }

    /// Elevation from plate character, lattice noise, and boundary
    /// uplift; the land flag follows the configured sea level.
    fn shape_elevation(grid: &mut HexGrid, tectonics: &TectonicSystem, config: &WorldGenConfig) {
        let noise_seed = domain_seed(Uuid::nil(), config.seed, "elevation");
        let plate_base: HashMap<u32, f64> = tectonics
            .plates
            .iter()
            .map(|p| {
                let base = match p.kind {
                    telluria_data::PlateKind::Continental => 0.35,
                    telluria_data::PlateKind::Mixed => 0.0,
                    telluria_data::PlateKind::Oceanic => -0.45,
                };
                (p.id, base)
            })
            .collect();
        let boundary_kind: HashMap<(u32, u32), BoundaryKind> = tectonics
            .boundaries
            .iter()
            .map(|b| ((b.plate_a, b.plate_b), b.kind))
            .collect();

        let coords: Vec<Axial> = grid.coords().collect();
        for coord in coords {
            let here = grid.cell(coord).map(|c| c.plate_id).unwrap_or(0);
            let mut uplift: f64 = 0.0;
            for n in grid.neighbors(coord) {
                let there = grid.cell(n).map(|c| c.plate_id).unwrap_or(here);
                if there == here {
                    continue;
                }
                let key = (here.min(there), here.max(there));
                let delta: f64 = match boundary_kind.get(&key) {
                    Some(BoundaryKind::Collision) => 0.4,
                    Some(BoundaryKind::Convergent) => 0.25,
                    Some(BoundaryKind::Divergent) => -0.2,
                    Some(BoundaryKind::Transform) | None => 0.0,
                };
                if delta.abs() > uplift.abs() {
                    uplift = delta;
                }
            }
            if let Some(cell) = grid.cell_mut(coord) {
                let base = plate_base.get(&cell.plate_id).copied().unwrap_or(0.0);
                let noise = value_noise(coord.q, coord.r, noise_seed) - 0.5;
                cell.elevation = (base + noise * 0.6 + uplift).clamp(-1.0, 1.0);
                cell.is_land = cell.elevation > config.sea_level;
            }
        }
    }

    /// Latitude-banded temperature scaled by stellar input, plus a
    /// moisture field with a coastal bonus.
    fn apply_climate(grid: &mut HexGrid, config: &WorldGenConfig, climate_scale: f64) {
        let noise_seed = domain_seed(Uuid::nil(), config.seed, "moisture");
        let height = config.height.max(2) as f64;
        let coords: Vec<Axial> = grid.coords().collect();

        for coord in coords {
            let coastal = grid
                .neighbors(coord)
                .iter()
                .any(|n| grid.cell(*n).map(|c| !c.is_land).unwrap_or(false));
            if let Some(cell) = grid.cell_mut(coord) {
                let (_, row) = HexGrid::axial_to_offset(coord);
                let latitude = ((2.0 * row as f64 / (height - 1.0)) - 1.0).abs();
                let base = 32.0 - 52.0 * latitude.powf(1.4);
                let lapse = cell.elevation.max(0.0) * 22.0;
                cell.temperature = base + (climate_scale - 1.0) * 40.0 - lapse;

                let mut moisture = value_noise(coord.q, coord.r, noise_seed);
                if coastal {
                    moisture += 0.25;
                }
                cell.moisture = moisture.clamp(0.0, 1.0);
            }
        }
    }

    fn classify_terrain(grid: &mut HexGrid, tectonics: &TectonicSystem, config: &WorldGenConfig) {
        let volcanic_seed = domain_seed(Uuid::nil(), config.seed, "volcanism");
        let active: HashMap<(u32, u32), f64> = tectonics
            .boundaries
            .iter()
            .filter(|b| matches!(b.kind, BoundaryKind::Convergent | BoundaryKind::Collision))
            .map(|b| ((b.plate_a, b.plate_b), b.activity))
            .collect();

        let coords: Vec<Axial> = grid.coords().collect();
        for coord in coords {
            let here = grid.cell(coord).map(|c| c.plate_id).unwrap_or(0);
            let near_arc = grid.neighbors(coord).iter().any(|n| {
                let there = grid.cell(*n).map(|c| c.plate_id).unwrap_or(here);
                there != here
                    && active
                        .get(&(here.min(there), here.max(there)))
                        .map(|a| *a > 0.3)
                        .unwrap_or(false)
            });
            if let Some(cell) = grid.cell_mut(coord) {
                cell.terrain = if !cell.is_land {
                    if cell.elevation > -0.08 {
                        TerrainKind::Shore
                    } else {
                        TerrainKind::Ocean
                    }
                } else if cell.elevation > 0.8 {
                    TerrainKind::HighMountain
                } else if near_arc
                    && cell.elevation > 0.45
                    && value_noise(coord.q, coord.r, volcanic_seed) > 0.85
                {
                    TerrainKind::Volcanic
                } else if cell.elevation > 0.55 {
                    TerrainKind::Mountain
                } else if cell.temperature < -8.0 {
                    TerrainKind::Ice
                } else if cell.moisture > 0.85 && cell.elevation < 0.3 {
                    TerrainKind::River
                } else if cell.moisture < 0.2 {
                    TerrainKind::Desert
                } else if cell.moisture > 0.55 {
                    TerrainKind::Forest
                } else {
                    TerrainKind::Plains
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let world_id = Uuid::from_u128(77);
        let config = WorldGenConfig::default();
        let a = WorldGenerator::new().generate(world_id, config);
        let b = WorldGenerator::new().generate(world_id, config);
        assert_eq!(a.tectonics.plates.len(), b.tectonics.plates.len());
        assert_eq!(a.tectonics.fragmentation(), b.tectonics.fragmentation());
        assert_eq!(a.regions.regions.len(), b.regions.regions.len());
        assert_eq!(a.satellites.moons.len(), b.satellites.moons.len());
        let land_a = a.grid.cells().filter(|c| c.is_land).count();
        let land_b = b.grid.cells().filter(|c| c.is_land).count();
        assert_eq!(land_a, land_b);
    }

    #[test]
    fn cached_world_is_the_same_instance() {
        let generator = WorldGenerator::new();
        let world_id = Uuid::from_u128(3);
        let first = generator.generate(world_id, WorldGenConfig::default());
        let second = generator.generate(world_id, WorldGenConfig::default());
        assert!(Arc::ptr_eq(&first, &second));
        let cached = generator.cached(world_id).unwrap();
        assert!(Arc::ptr_eq(&first, &cached));
    }

    #[test]
    fn every_cell_has_a_biome_and_valid_elevation() {
        let world = WorldGenerator::new().generate(Uuid::from_u128(5), WorldGenConfig::default());
        for cell in world.grid.cells() {
            assert!(cell.biome.is_some());
            assert!((-1.0..=1.0).contains(&cell.elevation));
            assert_eq!(cell.coord.q + cell.coord.r + cell.coord.s(), 0);
        }
    }

    #[test]
    fn modern_start_year_gets_a_modern_atmosphere() {
        let world = WorldGenerator::new().generate(Uuid::from_u128(8), WorldGenConfig::default());
        let composition = world.atmosphere.composition();
        assert!(composition.o2_atm > 0.0);
        assert!((world.luminosity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn value_noise_is_stable_and_bounded() {
        for q in -20..20 {
            for r in -20..20 {
                let n = value_noise(q, r, 42);
                assert!((0.0..1.0).contains(&n));
                assert_eq!(n, value_noise(q, r, 42));
            }
        }
    }
}
