//! Tile grids for the client map renderer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use telluria_data::{Axial, Biome, Character};
use telluria_core::ecosystem::Ecosystem;
use telluria_core::world::{GeneratedWorld, HexGrid, WorldGenConfig, WorldGenerator};
use uuid::Uuid;

/// Ground-level view radius.
pub const BASE_RADIUS: i32 = 4;

/// Flying widens the view by one tile per five metres of altitude.
pub const ALTITUDE_PER_RADIUS: f64 = 5.0;

pub const MAX_RADIUS: i32 = 25;

/// Perception applied when the skill system has no answer.
pub const DEFAULT_PERCEPTION: u32 = 100;

const HEX_SIZE_M: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderQuality {
    Low,
    Medium,
    High,
}

impl RenderQuality {
    /// ≥71 high, ≥31 medium, otherwise low.
    pub fn from_perception(perception: u32) -> Self {
        if perception >= 71 {
            RenderQuality::High
        } else if perception >= 31 {
            RenderQuality::Medium
        } else {
            RenderQuality::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTile {
    pub coord: Axial,
    pub biome: Option<Biome>,
    pub elevation: f64,
    pub has_entities: bool,
    pub is_player: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub radius: i32,
    pub quality: RenderQuality,
    pub center: Axial,
    pub tiles: Vec<MapTile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMapTile {
    pub biome: Option<Biome>,
    pub elevation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMapData {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<WorldMapTile>,
}

pub struct MapService {
    generator: Arc<WorldGenerator>,
    world_config: WorldGenConfig,
    ecosystem: Arc<RwLock<Ecosystem>>,
    world_map_cache: Mutex<HashMap<(Uuid, u32), Arc<WorldMapData>>>,
}

impl MapService {
    pub fn new(
        generator: Arc<WorldGenerator>,
        world_config: WorldGenConfig,
        ecosystem: Arc<RwLock<Ecosystem>>,
    ) -> Self {
        Self {
            generator,
            world_config,
            ecosystem,
            world_map_cache: Mutex::new(HashMap::new()),
        }
    }

    fn world(&self, world_id: Uuid) -> Arc<GeneratedWorld> {
        self.generator.generate(world_id, self.world_config)
    }

    /// View radius: 4 on the ground, widened with altitude when
    /// flying, capped at 25.
    pub fn view_radius(character: &Character) -> i32 {
        if character.is_flying {
            let bonus = (character.position.z.max(0.0) / ALTITUDE_PER_RADIUS) as i32;
            (BASE_RADIUS + bonus).min(MAX_RADIUS)
        } else {
            BASE_RADIUS
        }
    }

    /// The centred `(2R+1)²` tile grid around the character, with
    /// per-tile biome/elevation, entity flags, and the player marker.
    pub fn get_map_data(&self, character: &Character, perception: Option<u32>) -> MapData {
        let world = self.world(character.world_id);
        let radius = Self::view_radius(character);
        let quality =
            RenderQuality::from_perception(perception.unwrap_or(DEFAULT_PERCEPTION));
        let center = Axial::from_pixel(character.position.x, character.position.y, HEX_SIZE_M);

        let occupied: HashSet<Axial> = {
            let ecosystem = self
                .ecosystem
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            ecosystem
                .entities
                .iter()
                .map(|e| Axial::from_pixel(e.position.x, e.position.y, HEX_SIZE_M))
                .collect()
        };

        let mut tiles = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for dr in -radius..=radius {
            for dq in -radius..=radius {
                let coord = Axial::new(center.q + dq, center.r + dr);
                let cell = world.grid.cell(coord);
                tiles.push(MapTile {
                    coord,
                    biome: cell.and_then(|c| c.biome),
                    elevation: cell.map(|c| c.elevation).unwrap_or(-1.0),
                    has_entities: occupied.contains(&coord),
                    is_player: coord == center,
                });
            }
        }
        MapData {
            radius,
            quality,
            center,
            tiles,
        }
    }

    /// Aggregates the full heightmap onto a `2·size × size` grid (the
    /// spherical 2:1 aspect), picking the dominant biome per region
    /// with water biomes weighted ×1.5 and averaging elevation.
    /// Results are cached per `(world_id, size)`.
    pub fn get_world_map_data(&self, world_id: Uuid, grid_size: u32) -> Arc<WorldMapData> {
        let key = (world_id, grid_size.max(1));
        {
            let cache = self
                .world_map_cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(data) = cache.get(&key) {
                return data.clone();
            }
        }

        let world = self.world(world_id);
        let data = Arc::new(Self::aggregate(&world.grid, key.1));
        let mut cache = self
            .world_map_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache.entry(key).or_insert(data).clone()
    }

    fn aggregate(grid: &HexGrid, size: u32) -> WorldMapData {
        let out_height = size;
        let out_width = size * 2;
        let mut elevation_sums = vec![(0.0f64, 0usize); (out_width * out_height) as usize];
        let mut biome_weights: Vec<HashMap<Biome, f64>> =
            vec![HashMap::new(); (out_width * out_height) as usize];

        for cell in grid.cells() {
            let (col, row) = HexGrid::axial_to_offset(cell.coord);
            let out_col = (col.max(0) as u32 * out_width / grid.width.max(1)).min(out_width - 1);
            let out_row = (row.max(0) as u32 * out_height / grid.height.max(1)).min(out_height - 1);
            let index = (out_row * out_width + out_col) as usize;

            elevation_sums[index].0 += cell.elevation;
            elevation_sums[index].1 += 1;
            if let Some(biome) = cell.biome {
                let weight = if biome.is_water() { 1.5 } else { 1.0 };
                *biome_weights[index].entry(biome).or_insert(0.0) += weight;
            }
        }

        let tiles = elevation_sums
            .iter()
            .zip(&biome_weights)
            .map(|((sum, count), weights)| {
                let biome = weights
                    .iter()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(biome, _)| *biome);
                WorldMapTile {
                    biome,
                    elevation: if *count > 0 { sum / *count as f64 } else { -1.0 },
                }
            })
            .collect();

        WorldMapData {
            width: out_width,
            height: out_height,
            tiles,
        }
    }
}
