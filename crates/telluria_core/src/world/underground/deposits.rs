//! Organic deposit diagenesis.
//!
//! Buried remains mature along `remains → mineralizing → fossil → oil`
//! for animals (oil only for organic-rich species) and
//! `remains → mineralizing → coal` for plants. Transitions are gated
//! by burial depth, absolute age, and local geothermal temperature.

use telluria_data::{Deposit, DepositKind, OrganicOrigin, OrganicStage, WorldColumn};
use thiserror::Error;

use crate::world::underground::column::geothermal_temp_c;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositError {
    #[error("deposit stage {0:?} is terminal")]
    TerminalStage(OrganicStage),
    #[error("not an organic deposit")]
    NotOrganic,
}

/// Gate for one maturation step.
struct StageGate {
    min_depth_m: f64,
    min_age_y: i64,
    min_temp_c: f64,
}

const MINERALIZING_GATE: StageGate = StageGate {
    min_depth_m: 10.0,
    min_age_y: 10_000,
    min_temp_c: 0.0,
};

const FOSSIL_GATE: StageGate = StageGate {
    min_depth_m: 50.0,
    min_age_y: 100_000,
    min_temp_c: 16.0,
};

const COAL_GATE: StageGate = StageGate {
    min_depth_m: 100.0,
    min_age_y: 1_000_000,
    min_temp_c: 17.0,
};

const OIL_GATE: StageGate = StageGate {
    min_depth_m: 500.0,
    min_age_y: 2_000_000,
    min_temp_c: 27.0,
};

/// The stage that follows, if the chain continues for this deposit.
fn next_stage(origin: OrganicOrigin, stage: OrganicStage, organic_rich: bool) -> Option<OrganicStage> {
    match (origin, stage) {
        (_, OrganicStage::Remains) => Some(OrganicStage::Mineralizing),
        (OrganicOrigin::Animal, OrganicStage::Mineralizing) => Some(OrganicStage::Fossil),
        (OrganicOrigin::Plant, OrganicStage::Mineralizing) => Some(OrganicStage::Coal),
        (OrganicOrigin::Animal, OrganicStage::Fossil) if organic_rich => Some(OrganicStage::Oil),
        _ => None,
    }
}

fn gate_for(stage: OrganicStage) -> &'static StageGate {
    match stage {
        OrganicStage::Mineralizing => &MINERALIZING_GATE,
        OrganicStage::Fossil => &FOSSIL_GATE,
        OrganicStage::Coal => &COAL_GATE,
        OrganicStage::Oil => &OIL_GATE,
        // Remains is the entry stage; it has no gate of its own.
        OrganicStage::Remains => &MINERALIZING_GATE,
    }
}

/// Forces one maturation step regardless of the physical gates.
/// Errors when the chain has nowhere to go.
pub fn promote(deposit: &mut Deposit) -> Result<OrganicStage, DepositError> {
    let DepositKind::Organic {
        origin,
        stage,
        organic_rich,
        ..
    } = &mut deposit.kind
    else {
        return Err(DepositError::NotOrganic);
    };
    match next_stage(*origin, *stage, *organic_rich) {
        Some(next) => {
            *stage = next;
            Ok(next)
        }
        None => Err(DepositError::TerminalStage(*stage)),
    }
}

/// Advances every organic deposit in the column that satisfies its
/// next stage's depth/age/temperature gate at `year`.
pub fn evolve_deposits(column: &mut WorldColumn, year: i64) {
    for deposit in &mut column.resources {
        let DepositKind::Organic {
            origin,
            stage,
            organic_rich,
            ..
        } = &mut deposit.kind
        else {
            continue;
        };
        let Some(next) = next_stage(*origin, *stage, *organic_rich) else {
            continue;
        };
        let gate = gate_for(next);
        let age = year - deposit.formed_year;
        let temp = geothermal_temp_c(deposit.depth_m);
        if deposit.depth_m >= gate.min_depth_m && age >= gate.min_age_y && temp >= gate.min_temp_c {
            tracing::debug!(?next, depth = deposit.depth_m, age, "deposit matured");
            *stage = next;
        }
    }
}
