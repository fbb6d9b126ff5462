//! Karst cave formation over soluble strata.
//!
//! Dissolution accumulates per column until it beats the host rock,
//! then a cave is instantiated as a small node graph (chambers joined
//! by passages). Caves that end up within merge range of each other
//! coalesce transitively, wiring a connecting passage.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use telluria_data::{UndergroundVoid, VoidKind};
use uuid::Uuid;

use crate::world::underground::column::{register_void, ColumnGrid, COLUMN_SPACING_M};

/// Caves closer than this merge into one system.
pub const CAVE_MERGE_DISTANCE_M: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CaveNodeKind {
    Chamber,
    PassageBend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveNode {
    pub kind: CaveNodeKind,
    pub depth_m: f64,
    /// Chamber span, metres.
    pub size_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CavePassage {
    pub length_m: f64,
}

/// One cave system. Node relationships live in an arena-backed graph;
/// nothing holds object pointers across caves.
#[derive(Debug, Clone)]
pub struct Cave {
    pub id: Uuid,
    pub column_x: u32,
    pub column_y: u32,
    pub depth_m: f64,
    pub graph: UnGraph<CaveNode, CavePassage>,
}

impl Cave {
    pub fn chamber_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|n| n.kind == CaveNodeKind::Chamber)
            .count()
    }

    fn position_m(&self) -> (f64, f64, f64) {
        (
            self.column_x as f64 * COLUMN_SPACING_M,
            self.column_y as f64 * COLUMN_SPACING_M,
            self.depth_m,
        )
    }

    pub fn distance_m(&self, other: &Cave) -> f64 {
        let (ax, ay, az) = self.position_m();
        let (bx, by, bz) = other.position_m();
        ((ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KarstParams {
    /// Dissolution per year under unit flow and porosity.
    pub base_rate: f64,
    /// Groundwater flow factor.
    pub water_flow: f64,
    /// Dissolved CO₂ aggressiveness factor.
    pub co2_factor: f64,
}

impl Default for KarstParams {
    fn default() -> Self {
        Self {
            base_rate: 1.0e-3,
            water_flow: 1.0,
            co2_factor: 1.0,
        }
    }
}

pub struct KarstSystem {
    pub caves: Vec<Cave>,
    /// Accumulated dissolution per column.
    progress: HashMap<(u32, u32), f64>,
}

impl Default for KarstSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl KarstSystem {
    pub fn new() -> Self {
        Self {
            caves: Vec::new(),
            progress: HashMap::new(),
        }
    }

    /// Advances dissolution by `years` over every column with a
    /// karstic stratum, instantiating and merging caves as thresholds
    /// are crossed.
    pub fn step(
        &mut self,
        columns: &mut ColumnGrid,
        params: &KarstParams,
        years: f64,
        rng: &mut ChaCha8Rng,
    ) {
        let mut born = Vec::new();
        for column in columns.columns_mut() {
            let Some(stratum) = column.strata.iter().find(|s| s.rock.is_karstic()) else {
                continue;
            };
            let key = (column.x, column.y);
            let hardness = stratum.rock.hardness();
            let effective = params.base_rate
                * params.water_flow
                * stratum.porosity
                * params.co2_factor
                * years;
            let total = self.progress.entry(key).or_insert(0.0);
            *total += effective;

            let already_formed = self
                .caves
                .iter()
                .any(|c| c.column_x == column.x && c.column_y == column.y);
            let variation = rng.gen_range(0.8..1.2);
            if !already_formed && *total * variation > hardness * 10.0 {
                let depth = rng.gen_range(stratum.top_m..stratum.bottom_m);
                let cave = Self::instantiate(column.x, column.y, depth, rng);
                let height = cave
                    .graph
                    .node_weights()
                    .map(|n| n.size_m)
                    .fold(0.0_f64, f64::max);
                register_void(
                    column,
                    UndergroundVoid::new(VoidKind::Cave, depth, depth + height.max(2.0)),
                );
                tracing::debug!(x = column.x, y = column.y, depth, "karst cave formed");
                born.push(cave);
            }
        }
        self.caves.append(&mut born);
        self.merge_nearby();
    }

    /// A new cave: one main chamber, sometimes a secondary chamber on
    /// the far end of a passage.
    fn instantiate(x: u32, y: u32, depth_m: f64, rng: &mut ChaCha8Rng) -> Cave {
        let mut graph = UnGraph::new_undirected();
        let main = graph.add_node(CaveNode {
            kind: CaveNodeKind::Chamber,
            depth_m,
            size_m: rng.gen_range(3.0..12.0),
        });
        if rng.gen_bool(0.5) {
            let secondary = graph.add_node(CaveNode {
                kind: CaveNodeKind::Chamber,
                depth_m: depth_m + rng.gen_range(-5.0..5.0),
                size_m: rng.gen_range(2.0..6.0),
            });
            graph.add_edge(
                main,
                secondary,
                CavePassage {
                    length_m: rng.gen_range(5.0..25.0),
                },
            );
        }
        Cave {
            id: Uuid::new_v4(),
            column_x: x,
            column_y: y,
            depth_m,
            graph,
        }
    }

    /// Transitive merge of caves within range. The union keeps every
    /// node and wires one connecting passage between the systems.
    fn merge_nearby(&mut self) {
        loop {
            let mut pair = None;
            'outer: for i in 0..self.caves.len() {
                for j in (i + 1)..self.caves.len() {
                    if self.caves[i].distance_m(&self.caves[j]) <= CAVE_MERGE_DISTANCE_M {
                        pair = Some((i, j));
                        break 'outer;
                    }
                }
            }
            let Some((i, j)) = pair else { break };
            let absorbed = self.caves.remove(j);
            let host = &mut self.caves[i];
            let distance = host.distance_m(&absorbed);

            let host_anchor = Self::first_chamber(&host.graph);
            let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();
            for idx in absorbed.graph.node_indices() {
                let node = absorbed.graph[idx].clone();
                remap.insert(idx, host.graph.add_node(node));
            }
            for edge in absorbed.graph.edge_indices() {
                if let Some((a, b)) = absorbed.graph.edge_endpoints(edge) {
                    host.graph
                        .add_edge(remap[&a], remap[&b], absorbed.graph[edge].clone());
                }
            }
            if let (Some(a), Some(&b)) = (
                host_anchor,
                Self::first_chamber(&absorbed.graph).and_then(|n| remap.get(&n)),
            ) {
                host.graph.add_edge(a, b, CavePassage { length_m: distance });
            }
            tracing::debug!(host = %host.id, absorbed = %absorbed.id, "cave systems merged");
        }
    }

    fn first_chamber(graph: &UnGraph<CaveNode, CavePassage>) -> Option<NodeIndex> {
        graph
            .node_indices()
            .find(|&n| graph[n].kind == CaveNodeKind::Chamber)
    }
}
