//! The column grid: one strata stack per surface tile.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use telluria_data::{Deposit, MineralKind, RockKind, Stratum, UndergroundVoid, WorldColumn};

/// Horizontal spacing between neighbouring columns, metres.
pub const COLUMN_SPACING_M: f64 = 10.0;

/// Depth at which column modelling stops.
pub const COLUMN_FLOOR_M: f64 = 4_000.0;

/// Surface baseline for the geothermal gradient.
pub const SURFACE_TEMP_C: f64 = 15.0;

/// Geothermal gradient, °C per km of depth.
pub const GEOTHERMAL_C_PER_KM: f64 = 25.0;

pub fn geothermal_temp_c(depth_m: f64) -> f64 {
    SURFACE_TEMP_C + GEOTHERMAL_C_PER_KM * (depth_m.max(0.0) / 1_000.0)
}

fn typical_porosity(rock: RockKind) -> f64 {
    match rock {
        RockKind::Topsoil => 0.40,
        RockKind::Clay => 0.45,
        RockKind::Sand => 0.35,
        RockKind::Sandstone => 0.20,
        RockKind::Limestone => 0.15,
        RockKind::Shale => 0.10,
        RockKind::Granite => 0.01,
        RockKind::Basalt => 0.02,
        RockKind::Marble => 0.05,
    }
}

const SEDIMENTARY: [RockKind; 5] = [
    RockKind::Sand,
    RockKind::Clay,
    RockKind::Sandstone,
    RockKind::Limestone,
    RockKind::Shale,
];

const MINERALS: [MineralKind; 5] = [
    MineralKind::Iron,
    MineralKind::Copper,
    MineralKind::Gold,
    MineralKind::Silver,
    MineralKind::Gems,
];

#[derive(Debug, Clone)]
pub struct ColumnGrid {
    pub width: u32,
    pub height: u32,
    columns: Vec<WorldColumn>,
}

impl ColumnGrid {
    /// Builds every column: soil cap, a few sedimentary layers, then
    /// crystalline bedrock to the floor, with scattered mineral seams.
    pub fn generate(width: u32, height: u32, rng: &mut ChaCha8Rng, year: i64) -> Self {
        let mut columns = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                columns.push(Self::build_column(x, y, rng, year));
            }
        }
        Self {
            width,
            height,
            columns,
        }
    }

    fn build_column(x: u32, y: u32, rng: &mut ChaCha8Rng, year: i64) -> WorldColumn {
        let mut strata = Vec::new();
        let mut depth = 0.0;

        let soil_bottom = rng.gen_range(1.0..3.0);
        strata.push(Stratum {
            rock: RockKind::Topsoil,
            top_m: depth,
            bottom_m: soil_bottom,
            porosity: typical_porosity(RockKind::Topsoil),
        });
        depth = soil_bottom;

        for _ in 0..rng.gen_range(2..=4) {
            let rock = SEDIMENTARY[rng.gen_range(0..SEDIMENTARY.len())];
            let bottom = depth + rng.gen_range(15.0..80.0);
            strata.push(Stratum {
                rock,
                top_m: depth,
                bottom_m: bottom,
                porosity: typical_porosity(rock) * rng.gen_range(0.8..1.2),
            });
            depth = bottom;
        }

        let bedrock_m = depth;
        let basement = if rng.gen_bool(0.7) {
            RockKind::Granite
        } else {
            RockKind::Basalt
        };
        strata.push(Stratum {
            rock: basement,
            top_m: depth,
            bottom_m: COLUMN_FLOOR_M,
            porosity: typical_porosity(basement),
        });

        let mut resources = Vec::new();
        if rng.gen_bool(0.3) {
            let kind = MINERALS[rng.gen_range(0..MINERALS.len())];
            let seam_depth = rng.gen_range(bedrock_m..COLUMN_FLOOR_M * 0.5);
            let mut seam = Deposit::mineral(kind, seam_depth, rng.gen_range(10.0..500.0), year);
            // Ids drawn from the stream keep generation reproducible.
            seam.id = uuid::Uuid::from_u128(rng.gen());
            resources.push(seam);
        }

        WorldColumn {
            x,
            y,
            surface_m: rng.gen_range(0.0..400.0),
            bedrock_m,
            strata,
            voids: Vec::new(),
            resources,
            magma: None,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn column(&self, x: u32, y: u32) -> Option<&WorldColumn> {
        self.index(x, y).map(|i| &self.columns[i])
    }

    pub fn column_mut(&mut self, x: u32, y: u32) -> Option<&mut WorldColumn> {
        self.index(x, y).map(move |i| &mut self.columns[i])
    }

    pub fn columns(&self) -> impl Iterator<Item = &WorldColumn> {
        self.columns.iter()
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut WorldColumn> {
        self.columns.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Registers a void, keeping the list sorted by top depth.
pub fn register_void(column: &mut WorldColumn, void: UndergroundVoid) {
    let at = column
        .voids
        .partition_point(|v| v.top_m <= void.top_m);
    column.voids.insert(at, void);
}
