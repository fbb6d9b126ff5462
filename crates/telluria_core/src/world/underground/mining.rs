//! Tools against rock: mining, tunnelling, and burrow digging.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use telluria_data::{UndergroundVoid, VoidKind, WorldColumn};
use thiserror::Error;
use uuid::Uuid;

use crate::world::underground::column::register_void;

/// Seconds to clear one unit of rock at unit hardness and speed.
const BASE_MINE_TIME_S: f64 = 5.0;

/// Durability lost per unit of hardness mined.
const WEAR_PER_HARDNESS: f64 = 1.0;

/// Deposits within this distance of the cut are revealed.
const REVEAL_RANGE_M: f64 = 1.0;

/// Height of a mined tunnel.
const TUNNEL_HEIGHT_M: f64 = 2.0;

/// Burrows need rock at or under this hardness.
const BURROW_MAX_HARDNESS: f64 = 3.0;

const BURROW_CHAMBER_HEIGHT_M: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningTool {
    pub name: String,
    pub max_hardness: f64,
    /// Cutting speed multiplier; higher is faster.
    pub speed: f64,
    pub depth_limit_m: f64,
    pub durability: f64,
}

impl MiningTool {
    pub fn iron_pick() -> Self {
        Self {
            name: "iron pick".into(),
            max_hardness: 5.0,
            speed: 1.0,
            depth_limit_m: 200.0,
            durability: 100.0,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.durability <= 0.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MiningError {
    #[error("rock hardness {hardness} exceeds tool limit {limit}")]
    TooHard { hardness: f64, limit: f64 },
    #[error("depth {depth_m} m exceeds tool limit {limit_m} m")]
    TooDeep { depth_m: f64, limit_m: f64 },
    #[error("tool is spent")]
    ToolSpent,
    #[error("no stratum at depth {0} m")]
    NoStratum(f64),
    #[error("rock too hard for a burrow at depth {0} m")]
    TooHardForBurrow(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineOutcome {
    pub time_s: f64,
    /// Deposit revealed within a metre of the cut, if any.
    pub revealed: Option<Uuid>,
    /// Tunnel void carved, if requested.
    pub tunnel: Option<Uuid>,
}

/// Whether `tool` can cut `column` at `depth_m`.
pub fn can_mine(tool: &MiningTool, column: &WorldColumn, depth_m: f64) -> Result<(), MiningError> {
    if tool.is_spent() {
        return Err(MiningError::ToolSpent);
    }
    if depth_m > tool.depth_limit_m {
        return Err(MiningError::TooDeep {
            depth_m,
            limit_m: tool.depth_limit_m,
        });
    }
    let stratum = column
        .stratum_at(depth_m)
        .ok_or(MiningError::NoStratum(depth_m))?;
    let hardness = stratum.rock.hardness();
    if hardness > tool.max_hardness {
        return Err(MiningError::TooHard {
            hardness,
            limit: tool.max_hardness,
        });
    }
    Ok(())
}

/// Cuts at `depth_m`: wears the tool, reveals any deposit within a
/// metre, and optionally carves a two-metre tunnel void.
pub fn mine(
    tool: &mut MiningTool,
    column: &mut WorldColumn,
    depth_m: f64,
    carve_tunnel: bool,
) -> Result<MineOutcome, MiningError> {
    can_mine(tool, column, depth_m)?;
    let hardness = column
        .stratum_at(depth_m)
        .map(|s| s.rock.hardness())
        .unwrap_or(1.0);

    tool.durability = (tool.durability - hardness * WEAR_PER_HARDNESS).max(0.0);
    let time_s = BASE_MINE_TIME_S * hardness / tool.speed;

    let revealed = column
        .resources
        .iter_mut()
        .find(|d| !d.discovered && (d.depth_m - depth_m).abs() <= REVEAL_RANGE_M)
        .map(|d| {
            d.discovered = true;
            d.id
        });

    let tunnel = if carve_tunnel {
        let void = UndergroundVoid::new(VoidKind::Mine, depth_m, depth_m + TUNNEL_HEIGHT_M);
        let id = void.id;
        register_void(column, void);
        Some(id)
    } else {
        None
    };

    Ok(MineOutcome {
        time_s,
        revealed,
        tunnel,
    })
}

/// Digs a burrow system at `depth_m`: `chambers` chamber voids joined
/// by short tunnels, all registered in the column. Requires soft rock.
pub fn create_burrow(
    column: &mut WorldColumn,
    depth_m: f64,
    chambers: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Uuid>, MiningError> {
    let stratum = column
        .stratum_at(depth_m)
        .ok_or(MiningError::NoStratum(depth_m))?;
    if stratum.rock.hardness() > BURROW_MAX_HARDNESS {
        return Err(MiningError::TooHardForBurrow(depth_m));
    }

    let mut ids = Vec::with_capacity(chambers);
    let mut depth = depth_m;
    for i in 0..chambers.max(1) {
        let chamber = UndergroundVoid::new(
            VoidKind::Burrow,
            depth,
            depth + BURROW_CHAMBER_HEIGHT_M,
        );
        ids.push(chamber.id);
        register_void(column, chamber);
        if i + 1 < chambers {
            // Connecting tunnel slanting down to the next chamber.
            let drop = rng.gen_range(0.5..2.0);
            let tunnel = UndergroundVoid::new(
                VoidKind::Burrow,
                depth + BURROW_CHAMBER_HEIGHT_M,
                depth + BURROW_CHAMBER_HEIGHT_M + drop,
            );
            register_void(column, tunnel);
            depth += BURROW_CHAMBER_HEIGHT_M + drop;
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use telluria_data::{Deposit, MineralKind, RockKind, Stratum};

    fn test_column() -> WorldColumn {
        WorldColumn {
            x: 0,
            y: 0,
            surface_m: 50.0,
            bedrock_m: 100.0,
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
                    bottom_m: 100.0,
                    porosity: 0.15,
                },
                Stratum {
                    rock: RockKind::Granite,
                    top_m: 100.0,
                    bottom_m: 4_000.0,
                    porosity: 0.01,
                },
            ],
            voids: vec![],
            resources: vec![Deposit::mineral(MineralKind::Iron, 20.0, 100.0, 0)],
            magma: None,
        }
    }

    #[test]
    fn mining_wears_the_tool_and_takes_time() {
        let mut tool = MiningTool::iron_pick();
        let mut column = test_column();
        let outcome = mine(&mut tool, &mut column, 10.0, false).unwrap();
        // Limestone hardness 3.5: 17.5 s at unit speed.
        assert!((outcome.time_s - 17.5).abs() < 1e-9);
        assert!((tool.durability - 96.5).abs() < 1e-9);
        assert!(outcome.revealed.is_none());
    }

    #[test]
    fn deposit_within_a_metre_is_revealed() {
        let mut tool = MiningTool::iron_pick();
        let mut column = test_column();
        let outcome = mine(&mut tool, &mut column, 19.2, false).unwrap();
        assert!(outcome.revealed.is_some());
        assert!(column.resources[0].discovered);
    }

    #[test]
    fn granite_defeats_an_iron_pick() {
        let tool = MiningTool::iron_pick();
        let mut column = test_column();
        column.strata[1].rock = RockKind::Granite;
        assert!(matches!(
            can_mine(&tool, &column, 10.0),
            Err(MiningError::TooHard { .. })
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let tool = MiningTool::iron_pick();
        let column = test_column();
        assert!(matches!(
            can_mine(&tool, &column, 300.0),
            Err(MiningError::TooDeep { .. })
        ));
    }

    #[test]
    fn spent_tool_refuses() {
        let mut tool = MiningTool::iron_pick();
        tool.durability = 0.0;
        let column = test_column();
        assert_eq!(can_mine(&tool, &column, 10.0), Err(MiningError::ToolSpent));
    }

    #[test]
    fn tunnel_carves_a_two_metre_void() {
        let mut tool = MiningTool::iron_pick();
        let mut column = test_column();
        let outcome = mine(&mut tool, &mut column, 30.0, true).unwrap();
        let id = outcome.tunnel.unwrap();
        let void = column.voids.iter().find(|v| v.id == id).unwrap();
        assert_eq!(void.kind, VoidKind::Mine);
        assert!((void.bottom_m - void.top_m - 2.0).abs() < 1e-9);
    }

    #[test]
    fn burrow_needs_soft_rock() {
        let mut column = test_column();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Limestone at 10 m is too hard.
        assert!(matches!(
            create_burrow(&mut column, 10.0, 2, &mut rng),
            Err(MiningError::TooHardForBurrow(_))
        ));
        // Topsoil at 1 m is fine.
        let ids = create_burrow(&mut column, 1.0, 3, &mut rng).unwrap();
        assert_eq!(ids.len(), 3);
        // Chambers plus two connecting tunnels.
        assert_eq!(column.voids.len(), 5);
        assert!(column.voids.iter().all(|v| v.kind == VoidKind::Burrow));
    }
}
