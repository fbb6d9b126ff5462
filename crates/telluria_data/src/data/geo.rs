use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::hex::Axial;
use crate::data::terrain::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlateKind {
    Continental,
    Oceanic,
    Mixed,
}

/// A tectonic plate. Velocity is cm/year in grid space; rotation is a
/// slow angular drift applied around the plate centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TectonicPlate {
    pub id: u32,
    pub name: String,
    pub kind: PlateKind,
    pub velocity: (f64, f64),
    pub rotation: f64,
    /// Fraction of the plate's cells that are land.
    pub landmass_pct: f64,
    pub cell_count: usize,
}

impl TectonicPlate {
    pub fn speed(&self) -> f64 {
        let (vx, vy) = self.velocity;
        (vx * vx + vy * vy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Transform,
    Divergent,
    Convergent,
    /// Continental-continental head-on convergence; builds mountains.
    Collision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateBoundary {
    pub plate_a: u32,
    pub plate_b: u32,
    pub kind: BoundaryKind,
    /// Normalised relative speed, clamped to `[0, 1]`.
    pub activity: f64,
}

/// What separates two regions at a connection, with the hardest
/// difficulty that crossing can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Ocean,
    Volcanic,
    Mountain,
    Desert,
    River,
    Ice,
    Open,
}

impl ObstacleKind {
    pub fn max_difficulty(&self) -> f64 {
        match self {
            ObstacleKind::Ocean => 1.0,
            ObstacleKind::Volcanic => 0.9,
            ObstacleKind::Mountain => 0.8,
            ObstacleKind::Desert => 0.6,
            ObstacleKind::Ice => 0.5,
            ObstacleKind::River => 0.4,
            ObstacleKind::Open => 0.1,
        }
    }

    pub fn from_terrain(terrain: TerrainKind) -> Self {
        match terrain {
            TerrainKind::Ocean | TerrainKind::Shore => ObstacleKind::Ocean,
            TerrainKind::Volcanic => ObstacleKind::Volcanic,
            TerrainKind::Mountain | TerrainKind::HighMountain => ObstacleKind::Mountain,
            TerrainKind::Desert => ObstacleKind::Desert,
            TerrainKind::River => ObstacleKind::River,
            TerrainKind::Ice => ObstacleKind::Ice,
            _ => ObstacleKind::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConnection {
    pub to_region: u32,
    pub obstacle: ObstacleKind,
    /// Crossing difficulty in `[0, 1]`; 1 is effectively impassable.
    pub difficulty: f64,
    /// Border cell on this region's side.
    pub via: Axial,
}

/// A connected component of land cells. Holds coordinates only; the
/// grid owns the cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u32,
    pub name: String,
    pub world_id: Uuid,
    pub cells: Vec<Axial>,
    pub connections: Vec<RegionConnection>,
    /// Years spent without a connection easier than 0.8 difficulty.
    pub isolation_years: f64,
    pub is_island: bool,
    pub area: usize,
    pub perimeter: usize,
}

impl Region {
    /// Isolated means every way out is at least as hard as the
    /// isolation threshold.
    pub fn is_isolated(&self) -> bool {
        const ISOLATION_DIFFICULTY: f64 = 0.8;
        self.connections
            .iter()
            .all(|c| c.difficulty >= ISOLATION_DIFFICULTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocean_is_hardest_obstacle() {
        assert_eq!(ObstacleKind::Ocean.max_difficulty(), 1.0);
        assert!(ObstacleKind::Mountain.max_difficulty() < ObstacleKind::Volcanic.max_difficulty());
    }

    #[test]
    fn region_with_easy_connection_is_not_isolated() {
        let mut region = Region {
            id: 1,
            name: "Mistral".into(),
            world_id: Uuid::new_v4(),
            cells: vec![],
            connections: vec![RegionConnection {
                to_region: 2,
                obstacle: ObstacleKind::River,
                difficulty: 0.4,
                via: Axial::new(0, 0),
            }],
            isolation_years: 0.0,
            is_island: false,
            area: 0,
            perimeter: 0,
        };
        assert!(!region.is_isolated());
        region.connections[0].difficulty = 0.9;
        assert!(region.is_isolated());
    }
}
