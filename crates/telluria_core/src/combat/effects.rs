//! Status-effect bookkeeping over a combatant's effect list.

use telluria_data::{EffectKind, StatusEffect};

/// Bleed loses one point of tick damage every this many movements.
const BLEED_DECAY_EVERY: u32 = 3;

/// Applies an effect; an existing instance of the same kind is
/// refreshed (longer expiry, stronger magnitude) instead of stacked.
pub fn apply(effects: &mut Vec<StatusEffect>, effect: StatusEffect) {
    if !effect.kind.stacks() {
        if let Some(existing) = effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.expires_at_ms = existing.expires_at_ms.max(effect.expires_at_ms);
            existing.magnitude = existing.magnitude.max(effect.magnitude);
            existing.damage_per_tick = existing.damage_per_tick.max(effect.damage_per_tick);
            if effect.tick_interval_ms > 0 {
                existing.tick_interval_ms = effect.tick_interval_ms;
            }
            return;
        }
    }
    effects.push(effect);
}

pub fn is_stunned(effects: &[StatusEffect], now_ms: u64) -> bool {
    effects
        .iter()
        .any(|e| e.kind == EffectKind::Stun && e.is_active(now_ms))
}

/// Combined reaction-time multiplier from active Slow/Haste effects.
pub fn reaction_modifier(effects: &[StatusEffect], now_ms: u64) -> f64 {
    effects
        .iter()
        .filter(|e| e.is_active(now_ms))
        .filter(|e| matches!(e.kind, EffectKind::Slow | EffectKind::Haste))
        .map(|e| e.magnitude)
        .product()
}

/// Advances damage-over-time effects, returning the damage owed since
/// the last call. Each effect pays out once per elapsed tick interval.
pub fn tick(effects: &mut [StatusEffect], now_ms: u64) -> f64 {
    let mut total = 0.0;
    for effect in effects.iter_mut() {
        if effect.tick_interval_ms == 0 || !effect.is_active(now_ms) {
            continue;
        }
        let elapsed = now_ms.saturating_sub(effect.last_tick_at_ms);
        let ticks = elapsed / effect.tick_interval_ms;
        if ticks > 0 {
            total += effect.damage_per_tick * ticks as f64;
            effect.last_tick_at_ms += ticks * effect.tick_interval_ms;
        }
    }
    total
}

/// Records a movement event. Bleeds decay by one point of tick damage
/// on every third movement, never below zero.
pub fn record_movement(effects: &mut [StatusEffect]) {
    for effect in effects.iter_mut() {
        if effect.kind != EffectKind::Bleed {
            continue;
        }
        effect.movement_events += 1;
        if effect.movement_events % BLEED_DECAY_EVERY == 0 {
            effect.damage_per_tick = (effect.damage_per_tick - 1.0).max(0.0);
        }
    }
}

fn is_expired(effect: &StatusEffect, now_ms: u64) -> bool {
    if now_ms >= effect.expires_at_ms {
        return true;
    }
    // A drained damage-over-time effect is spent even before expiry.
    effect.tick_interval_ms > 0 && effect.damage_per_tick <= 0.0
}

/// Drops expired effects; returns how many were removed.
pub fn expire(effects: &mut Vec<StatusEffect>, now_ms: u64) -> usize {
    let before = effects.len();
    effects.retain(|e| !is_expired(e, now_ms));
    before - effects.len()
}
