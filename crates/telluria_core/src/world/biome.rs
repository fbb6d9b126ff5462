//! Biome assignment from the climate fields.

use telluria_data::{Biome, HexCell, TerrainKind};

/// Derives a biome from elevation, temperature and moisture bands.
/// Runs after terrain classification, so volcanic cells keep their
/// character regardless of climate.
pub fn assign(cell: &HexCell) -> Biome {
    if !cell.is_land {
        return Biome::Ocean;
    }
    if cell.terrain == TerrainKind::Volcanic {
        return Biome::Volcanic;
    }
    if cell.temperature < -10.0 {
        return Biome::IceSheet;
    }
    if cell.elevation > 0.7 {
        return Biome::Alpine;
    }
    if cell.temperature < 0.0 {
        return Biome::Tundra;
    }
    if cell.temperature < 7.0 {
        return if cell.moisture > 0.3 {
            Biome::Taiga
        } else {
            Biome::Tundra
        };
    }
    if cell.moisture < 0.2 {
        return Biome::Desert;
    }
    if cell.temperature > 22.0 {
        return if cell.moisture > 0.5 {
            Biome::TropicalForest
        } else {
            Biome::Savanna
        };
    }
    if cell.moisture > 0.5 {
        return Biome::TemperateForest;
    }
    Biome::Grassland
}
