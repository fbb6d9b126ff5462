//! Magma chambers: ageing, eruption, solidification, and spawning at
//! active plate boundaries.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use telluria_data::{BoundaryKind, MagmaChamber, UndergroundVoid, VoidKind};
use uuid::Uuid;

use crate::world::underground::column::{register_void, ColumnGrid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagmaParams {
    /// Cooling rate, °C per thousand years.
    pub cooling_c_per_ky: f64,
    /// Pressure gained per thousand years per unit of mantle heat.
    pub pressure_per_ky: f64,
    /// Interior heat relative to the modern Earth.
    pub mantle_heat: f64,
    /// Overpressure at which a chamber erupts.
    pub eruption_pressure: f64,
    /// Below this the melt freezes.
    pub solidify_temp_c: f64,
}

impl Default for MagmaParams {
    fn default() -> Self {
        Self {
            cooling_c_per_ky: 2.0,
            pressure_per_ky: 0.04,
            mantle_heat: 1.0,
            eruption_pressure: 10.0,
            solidify_temp_c: 700.0,
        }
    }
}

/// Chance per year that an active boundary of this kind nucleates a
/// new chamber somewhere in the grid.
fn spawn_chance_per_year(kind: BoundaryKind) -> f64 {
    match kind {
        BoundaryKind::Convergent => 1.0e-6,
        BoundaryKind::Divergent => 8.0e-7,
        BoundaryKind::Collision => 5.0e-7,
        BoundaryKind::Transform => 1.0e-8,
    }
}

/// Outcome of one magma step, for callers that surface events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MagmaEvent {
    Erupted {
        column: (u32, u32),
        lava_tube: bool,
    },
    SolidifiedToCave {
        column: (u32, u32),
    },
    Collapsed {
        column: (u32, u32),
    },
    Spawned {
        column: (u32, u32),
    },
}

#[derive(Debug, Default)]
pub struct MagmaSystem;

impl MagmaSystem {
    /// Ages every chamber by `years`: cooling, pressure build,
    /// eruptions, and freeze-out. Then rolls boundary-driven spawns.
    pub fn step(
        columns: &mut ColumnGrid,
        boundaries: &[(BoundaryKind, f64)],
        params: &MagmaParams,
        years: f64,
        rng: &mut ChaCha8Rng,
    ) -> Vec<MagmaEvent> {
        let mut events = Vec::new();
        let ky = years / 1_000.0;

        for column in columns.columns_mut() {
            let (depth, temperature, volume, erupting) = {
                let Some(chamber) = column.magma.as_mut() else {
                    continue;
                };
                chamber.temperature_c -= params.cooling_c_per_ky * ky;
                chamber.pressure += params.pressure_per_ky * params.mantle_heat * ky;
                let erupting = chamber.pressure > params.eruption_pressure;
                if erupting {
                    chamber.pressure *= 0.3;
                    chamber.volume_m3 *= 0.5;
                }
                (
                    chamber.depth_m,
                    chamber.temperature_c,
                    chamber.volume_m3,
                    erupting,
                )
            };

            if erupting {
                let lava_tube = rng.gen_bool(0.5);
                if lava_tube {
                    // A meandering conduit from the chamber to daylight.
                    let mut top = depth;
                    while top > 0.0 {
                        let span: f64 = rng.gen_range(20.0..80.0_f64).min(top);
                        register_void(
                            column,
                            UndergroundVoid::new(VoidKind::LavaTube, top - span, top),
                        );
                        top -= span;
                    }
                    tracing::info!(x = column.x, y = column.y, depth, "eruption opened a lava tube");
                }
                events.push(MagmaEvent::Erupted {
                    column: (column.x, column.y),
                    lava_tube,
                });
                continue;
            }

            if temperature < params.solidify_temp_c {
                let hard_host = column
                    .stratum_at(depth)
                    .map(|s| !s.rock.is_soft())
                    .unwrap_or(true);
                let height = volume.cbrt().max(3.0);
                column.magma = None;
                if hard_host {
                    register_void(
                        column,
                        UndergroundVoid::new(VoidKind::MagmaChamber, depth, depth + height),
                    );
                    events.push(MagmaEvent::SolidifiedToCave {
                        column: (column.x, column.y),
                    });
                } else {
                    events.push(MagmaEvent::Collapsed {
                        column: (column.x, column.y),
                    });
                }
            }
        }

        // New chambers nucleate under active boundaries.
        for &(kind, activity) in boundaries {
            let p = (spawn_chance_per_year(kind) * activity * years).min(1.0);
            if p > 0.0 && rng.gen_bool(p) {
                let x = rng.gen_range(0..columns.width);
                let y = rng.gen_range(0..columns.height);
                if let Some(column) = columns.column_mut(x, y) {
                    if column.magma.is_none() {
                        column.magma = Some(MagmaChamber {
                            id: Uuid::new_v4(),
                            depth_m: rng.gen_range(1_500.0..3_500.0),
                            volume_m3: rng.gen_range(1.0e5..5.0e6),
                            temperature_c: rng.gen_range(900.0..1_300.0),
                            pressure: rng.gen_range(0.0..2.0),
                            formed_year: 0,
                        });
                        events.push(MagmaEvent::Spawned { column: (x, y) });
                    }
                }
            }
        }
        events
    }
}
