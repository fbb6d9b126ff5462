//! The island rule: long-isolated regions reshape their species.

use serde::{Deserialize, Serialize};
use telluria_data::{Region, SpeciesTraits};

/// Isolation shorter than this has no evolutionary effect.
pub const ISOLATION_ONSET_Y: f64 = 100_000.0;

/// Isolation at least this long exerts full strength.
pub const ISOLATION_SATURATION_Y: f64 = 10_000_000.0;

/// Small species below this base size tend to grow in isolation.
pub const SMALL_SIZE: f64 = 3.0;

/// Large species above this base size tend to shrink.
pub const LARGE_SIZE: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationModifier {
    /// Effect strength in `[0, 1]`.
    pub strength: f64,
    pub is_island: bool,
}

/// Strength scales linearly from 0 at 100 ky to 1.0 at 10 My, with a
/// ×1.5 bonus for true islands, capped at 1.0. Returns `None` below
/// the onset.
pub fn isolation_modifier(region: &Region) -> Option<IsolationModifier> {
    if region.isolation_years < ISOLATION_ONSET_Y {
        return None;
    }
    let span = ISOLATION_SATURATION_Y - ISOLATION_ONSET_Y;
    let mut strength = ((region.isolation_years - ISOLATION_ONSET_Y) / span).clamp(0.0, 1.0);
    if region.is_island {
        strength = (strength * 1.5).min(1.0);
    }
    Some(IsolationModifier {
        strength,
        is_island: region.is_island,
    })
}

/// Applies the rule to one species' heritable traits: dwarfs grow,
/// giants shrink, and aggression, novelty fear and fertility all ease
/// off with strength.
pub fn apply_island_rule(traits: &mut SpeciesTraits, modifier: &IsolationModifier) {
    let s = modifier.strength;
    if traits.base_size < SMALL_SIZE {
        traits.base_size *= 1.0 + 0.4 * s;
    } else if traits.base_size > LARGE_SIZE {
        traits.base_size *= 1.0 - 0.3 * s;
    }
    traits.aggression = (traits.aggression * (1.0 - 0.5 * s)).max(0.0);
    traits.novelty_fear = (traits.novelty_fear * (1.0 - 0.5 * s)).max(0.0);
    traits.fertility = (traits.fertility * (1.0 - 0.3 * s)).max(0.0);
}
