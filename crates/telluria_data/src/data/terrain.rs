use serde::{Deserialize, Serialize};

use crate::data::hex::Axial;

/// Surface terrain classes with distinct movement and boundary effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    Ocean,
    Shore,
    #[default]
    Plains,
    Forest,
    Desert,
    River,
    Mountain,
    HighMountain,
    Volcanic,
    Ice,
}

impl TerrainKind {
    /// Land pathfinding excludes ocean, high mountain and active
    /// volcanic terrain.
    pub fn is_passable(&self) -> bool {
        !matches!(
            self,
            TerrainKind::Ocean | TerrainKind::HighMountain | TerrainKind::Volcanic
        )
    }

    pub fn is_water(&self) -> bool {
        matches!(self, TerrainKind::Ocean | TerrainKind::River)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    IceSheet,
    Tundra,
    Taiga,
    TemperateForest,
    TropicalForest,
    Grassland,
    Savanna,
    Desert,
    Alpine,
    Volcanic,
}

impl Biome {
    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean)
    }
}

/// One cell of the world surface. Owned exclusively by the `HexGrid`;
/// regions refer back by coordinate only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    pub coord: Axial,
    pub plate_id: u32,
    pub region_id: Option<u32>,
    pub biome: Option<Biome>,
    pub terrain: TerrainKind,
    /// Normalised elevation in `[-1, 1]`; sea level at 0.
    pub elevation: f64,
    /// Mean surface temperature, °C.
    pub temperature: f64,
    /// Annual moisture index in `[0, 1]`.
    pub moisture: f64,
    pub is_land: bool,
}

impl HexCell {
    pub fn new(coord: Axial) -> Self {
        Self {
            coord,
            plate_id: 0,
            region_id: None,
            biome: None,
            terrain: TerrainKind::Ocean,
            elevation: -0.5,
            temperature: 14.0,
            moisture: 0.5,
            is_land: false,
        }
    }
}
