use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RockKind {
    Topsoil,
    Clay,
    Sand,
    Sandstone,
    Limestone,
    Shale,
    Granite,
    Basalt,
    Marble,
}

impl RockKind {
    /// Mohs-flavoured hardness scale used by mining and collapse checks.
    pub fn hardness(&self) -> f64 {
        match self {
            RockKind::Topsoil => 1.0,
            RockKind::Clay => 1.5,
            RockKind::Sand => 1.0,
            RockKind::Sandstone => 4.0,
            RockKind::Limestone => 3.5,
            RockKind::Shale => 3.0,
            RockKind::Granite => 7.0,
            RockKind::Basalt => 6.5,
            RockKind::Marble => 5.0,
        }
    }

    /// Soft rock admits burrows and collapses over cooled magma.
    pub fn is_soft(&self) -> bool {
        self.hardness() <= 3.0
    }

    /// Water-soluble rock hosts karst cave formation.
    pub fn is_karstic(&self) -> bool {
        matches!(self, RockKind::Limestone | RockKind::Marble)
    }
}

/// One layer in a column. `top_m`/`bottom_m` are depths below the
/// surface, so `top_m < bottom_m` and consecutive strata are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub rock: RockKind,
    pub top_m: f64,
    pub bottom_m: f64,
    /// Void fraction in `[0, 1]`; feeds dissolution speed.
    pub porosity: f64,
}

impl Stratum {
    pub fn thickness(&self) -> f64 {
        self.bottom_m - self.top_m
    }

    pub fn contains_depth(&self, depth_m: f64) -> bool {
        depth_m >= self.top_m && depth_m < self.bottom_m
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoidKind {
    Cave,
    Mine,
    Burrow,
    LavaTube,
    MagmaChamber,
}

/// An open space spanning a z-interval within a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndergroundVoid {
    pub id: Uuid,
    pub kind: VoidKind,
    pub top_m: f64,
    pub bottom_m: f64,
}

impl UndergroundVoid {
    pub fn new(kind: VoidKind, top_m: f64, bottom_m: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            top_m,
            bottom_m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganicOrigin {
    Animal,
    Plant,
}

/// Diagenesis ladder for buried organics. Animals mineralize towards
/// fossil and, for organic-rich species, oil; plants towards coal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganicStage {
    Remains,
    Mineralizing,
    Fossil,
    Coal,
    Oil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineralKind {
    Iron,
    Copper,
    Gold,
    Silver,
    Gems,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DepositKind {
    Organic {
        origin: OrganicOrigin,
        stage: OrganicStage,
        /// Set for species whose remains can mature into oil.
        organic_rich: bool,
        species: String,
    },
    Mineral(MineralKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub kind: DepositKind,
    pub depth_m: f64,
    pub amount: f64,
    /// Simulation year the deposit entered the column.
    pub formed_year: i64,
    pub discovered: bool,
}

impl Deposit {
    pub fn organic(
        origin: OrganicOrigin,
        species: impl Into<String>,
        organic_rich: bool,
        depth_m: f64,
        amount: f64,
        year: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: DepositKind::Organic {
                origin,
                stage: OrganicStage::Remains,
                organic_rich,
                species: species.into(),
            },
            depth_m,
            amount,
            formed_year: year,
            discovered: false,
        }
    }

    pub fn mineral(kind: MineralKind, depth_m: f64, amount: f64, year: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: DepositKind::Mineral(kind),
            depth_m,
            amount,
            formed_year: year,
            discovered: false,
        }
    }
}

/// Molten rock pocket under a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagmaChamber {
    pub id: Uuid,
    pub depth_m: f64,
    pub volume_m3: f64,
    pub temperature_c: f64,
    /// Dimensionless overpressure; erupts past the configured threshold.
    pub pressure: f64,
    pub formed_year: i64,
}

/// Vertical sample of the world at one surface tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldColumn {
    pub x: u32,
    pub y: u32,
    /// Surface elevation above sea level, metres.
    pub surface_m: f64,
    /// Depth at which bedrock begins.
    pub bedrock_m: f64,
    pub strata: Vec<Stratum>,
    pub voids: Vec<UndergroundVoid>,
    pub resources: Vec<Deposit>,
    pub magma: Option<MagmaChamber>,
}

impl WorldColumn {
    pub fn stratum_at(&self, depth_m: f64) -> Option<&Stratum> {
        self.strata.iter().find(|s| s.contains_depth(depth_m))
    }

    /// Strata are maintained top-to-bottom with disjoint intervals.
    pub fn strata_are_ordered(&self) -> bool {
        self.strata
            .windows(2)
            .all(|w| w[0].bottom_m <= w[1].top_m && w[0].top_m < w[0].bottom_m)
            && self.strata.last().map_or(true, |s| s.top_m < s.bottom_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_with_strata() -> WorldColumn {
        WorldColumn {
            x: 0,
            y: 0,
            surface_m: 120.0,
            bedrock_m: 40.0,
            strata: vec![
                Stratum {
                    rock: RockKind::Topsoil,
                    top_m: 0.0,
                    bottom_m: 2.0,
                    porosity: 0.4,
                },
                Stratum {
                    rock: RockKind::Limestone,
                    top_m: 2.0,
                    bottom_m: 40.0,
                    porosity: 0.15,
                },
                Stratum {
                    rock: RockKind::Granite,
                    top_m: 40.0,
                    bottom_m: 400.0,
                    porosity: 0.01,
                },
            ],
            voids: vec![],
            resources: vec![],
            magma: None,
        }
    }

    #[test]
    fn strata_lookup_by_depth() {
        let col = column_with_strata();
        assert_eq!(col.stratum_at(1.0).unwrap().rock, RockKind::Topsoil);
        assert_eq!(col.stratum_at(30.0).unwrap().rock, RockKind::Limestone);
        assert!(col.stratum_at(500.0).is_none());
    }

    #[test]
    fn strata_ordering_invariant() {
        let mut col = column_with_strata();
        assert!(col.strata_are_ordered());
        col.strata[1].top_m = 1.0; // overlap with topsoil
        assert!(!col.strata_are_ordered());
    }

    #[test]
    fn soft_rock_classification() {
        assert!(RockKind::Clay.is_soft());
        assert!(!RockKind::Granite.is_soft());
        assert!(RockKind::Limestone.is_karstic());
    }
}
