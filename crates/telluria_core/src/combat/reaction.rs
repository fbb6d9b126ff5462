//! Reaction-time calculus: how long after queueing an action fires.

use telluria_data::{ActionType, AttackVariant};

/// No action resolves faster than this, whatever the modifiers say.
pub const MIN_REACTION_MS: f64 = 200.0;

/// Agility shaves at most this fraction off the base time.
const MAX_AGILITY_REDUCTION: f64 = 0.3;

pub fn base_reaction_ms(action: ActionType, variant: AttackVariant) -> f64 {
    match action {
        ActionType::Attack => match variant {
            AttackVariant::Normal => 1000.0,
            AttackVariant::Quick => 800.0,
            AttackVariant::Heavy => 1500.0,
        },
        ActionType::Defend => 500.0,
        ActionType::Flee => 1200.0,
    }
}

/// `base · (1 − agility/100 · 0.3) · external`, floored at 200 ms.
/// `external` < 1 for haste, > 1 for slow.
pub fn reaction_time_ms(
    action: ActionType,
    variant: AttackVariant,
    agility: f64,
    external_modifier: f64,
) -> u64 {
    let agility_factor = (agility.clamp(0.0, 100.0) / 100.0) * MAX_AGILITY_REDUCTION;
    let ms = base_reaction_ms(action, variant) * (1.0 - agility_factor) * external_modifier;
    ms.max(MIN_REACTION_MS).round() as u64
}
