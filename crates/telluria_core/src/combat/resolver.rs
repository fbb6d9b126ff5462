//! The combat tick resolver.
//!
//! Owns combatants by id; queued actions carry ids only, so an action
//! whose actor has been removed resolves to a skip, never a dangling
//! reference. `process_tick` is strictly synchronous and never errors:
//! actions that fail a precondition are dropped.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use telluria_data::{ActionType, AttackVariant, CombatAction, Combatant, StatusEffect};
use uuid::Uuid;

use crate::combat::effects;
use crate::combat::interrupt;
use crate::combat::queue::ActionQueue;
use crate::combat::reaction;
use crate::combat::state::{self, CombatError, CombatEvent};

/// Incoming attack damage is halved inside this window after a defend
/// resolves.
const DEFEND_WINDOW_MS: u64 = 3_000;

/// Base flee success chance before the agility bonus.
const FLEE_BASE_CHANCE: f64 = 0.3;

pub struct CombatResolver {
    combatants: RwLock<HashMap<Uuid, Combatant>>,
    queue: ActionQueue,
    rng: Mutex<ChaCha8Rng>,
}

impl CombatResolver {
    pub fn new(seed: u64) -> Self {
        Self {
            combatants: RwLock::new(HashMap::new()),
            queue: ActionQueue::new(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Registers an entity for the encounter and moves it to `InCombat`.
    pub fn join(
        &self,
        entity_id: Uuid,
        max_hp: f64,
        max_stamina: f64,
        agility: f64,
    ) -> Result<(), CombatError> {
        let mut combatant = Combatant::new(entity_id, max_hp, max_stamina, agility);
        combatant.combat_state = state::transition(combatant.combat_state, CombatEvent::EnterCombat)?;
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.insert(entity_id, combatant);
        Ok(())
    }

    /// Removes the combatant and any actions it still has queued.
    pub fn leave(&self, entity_id: Uuid) -> Option<Combatant> {
        self.queue.remove_actor(entity_id);
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.remove(&entity_id)
    }

    pub fn combatant(&self, entity_id: Uuid) -> Option<Combatant> {
        let map = self
            .combatants
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.get(&entity_id).cloned()
    }

    pub fn combatant_count(&self) -> usize {
        let map = self
            .combatants
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    pub fn queued_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn apply_effect(&self, entity_id: Uuid, effect: StatusEffect) -> Result<(), CombatError> {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let combatant = map
            .get_mut(&entity_id)
            .ok_or(CombatError::UnknownCombatant(entity_id))?;
        effects::apply(&mut combatant.status_effects, effect);
        Ok(())
    }

    /// Movement feeds bleed decay.
    pub fn record_movement(&self, entity_id: Uuid) {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(combatant) = map.get_mut(&entity_id) {
            effects::record_movement(&mut combatant.status_effects);
        }
    }

    /// Computes the reaction time (agility, Slow/Haste effects) and
    /// queues the action for `execute_at = now + reaction`.
    pub fn queue_action(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action_type: ActionType,
        variant: AttackVariant,
        now_ms: u64,
    ) -> Result<CombatAction, CombatError> {
        let (agility, modifier) = {
            let map = self
                .combatants
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let actor = map
                .get(&actor_id)
                .ok_or(CombatError::UnknownCombatant(actor_id))?;
            (
                actor.agility,
                effects::reaction_modifier(&actor.status_effects, now_ms),
            )
        };
        let reaction_ms = reaction::reaction_time_ms(action_type, variant, agility, modifier);
        let action = CombatAction::new(actor_id, target_id, action_type, variant, now_ms, reaction_ms);

        {
            let mut map = self
                .combatants
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(actor) = map.get_mut(&actor_id) {
                actor.current_action = Some(action.id);
            }
        }
        self.queue.enqueue(action.clone());
        Ok(action)
    }

    /// Resolves every action due at `now_ms`, in `execute_at` order.
    /// Actions failing a precondition (actor gone, defeated, stunned,
    /// stamina-starved) are silently dropped.
    pub fn process_tick(&self, now_ms: u64) -> Vec<CombatAction> {
        let mut resolved = Vec::new();
        while let Some(mut action) = self.queue.dequeue_due(now_ms) {
            if !self.debit_actor(&action, now_ms) {
                continue;
            }
            self.apply_action(&action, now_ms);
            action.resolved = true;
            resolved.push(action);
        }
        resolved
    }

    /// Precondition checks and stamina debit against the actor.
    /// Returns false when the action must be dropped.
    fn debit_actor(&self, action: &CombatAction, now_ms: u64) -> bool {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let actor = match map.get_mut(&action.actor_id) {
            Some(a) => a,
            None => {
                tracing::trace!(action = %action.id, "dropping action for missing actor");
                return false;
            }
        };
        if actor.is_defeated() {
            return false;
        }
        if effects::is_stunned(&actor.status_effects, now_ms) {
            tracing::trace!(actor = %action.actor_id, "action lost to stun");
            return false;
        }
        let cost = action.action_type.stamina_cost(action.attack_variant);
        if actor.stamina < cost {
            tracing::trace!(actor = %action.actor_id, cost, "action lost to exhaustion");
            return false;
        }
        actor.spend_stamina(cost);
        actor.last_action_time_ms = now_ms;
        if actor.current_action == Some(action.id) {
            actor.current_action = None;
        }
        true
    }

    fn apply_action(&self, action: &CombatAction, now_ms: u64) {
        match action.action_type {
            ActionType::Attack => self.resolve_attack(action, now_ms),
            ActionType::Defend => {
                let mut map = self
                    .combatants
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                if let Some(actor) = map.get_mut(&action.actor_id) {
                    actor.defending_until_ms = now_ms + DEFEND_WINDOW_MS;
                }
            }
            ActionType::Flee => self.resolve_flee(action),
        }
    }

    fn resolve_attack(&self, action: &CombatAction, now_ms: u64) {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let target = match map.get_mut(&action.target_id) {
            Some(t) if !t.is_defeated() => t,
            _ => return,
        };

        let mut damage = action.action_type.base_damage(action.attack_variant);
        if now_ms < target.defending_until_ms {
            damage *= 0.5;
        }
        target.apply_damage(damage);

        let damage_pct = if target.max_hp > 0.0 {
            damage / target.max_hp * 100.0
        } else {
            0.0
        };
        let interrupted = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            interrupt::roll_interrupt(damage_pct, &mut *rng)
        };

        if target.hp <= 0.0 {
            if let Ok(next) = state::transition(target.combat_state, CombatEvent::HpDepleted) {
                target.combat_state = next;
            }
        }
        let target_id = action.target_id;
        let cancel = interrupted || target.hp <= 0.0;
        if cancel {
            target.current_action = None;
        }
        drop(map);
        if cancel {
            self.queue.remove_actor(target_id);
        }
    }

    fn resolve_flee(&self, action: &CombatAction) {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let actor = match map.get_mut(&action.actor_id) {
            Some(a) => a,
            None => return,
        };
        let fleeing = match state::transition(actor.combat_state, CombatEvent::FleeAttempt) {
            Ok(s) => s,
            Err(_) => return,
        };
        actor.combat_state = fleeing;

        let chance = FLEE_BASE_CHANCE + actor.agility / 200.0;
        let escaped = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.gen::<f64>() < chance
        };
        let event = if escaped {
            CombatEvent::Escaped
        } else {
            CombatEvent::FleeFailed
        };
        if let Ok(next) = state::transition(actor.combat_state, event) {
            actor.combat_state = next;
        }
    }

    /// Damage-over-time sweep: pays out poison/bleed ticks, expires
    /// spent effects, and applies defeat where hp reaches zero.
    /// Returns `(entity, damage)` for each combatant that bled.
    pub fn process_effects(&self, now_ms: u64) -> Vec<(Uuid, f64)> {
        let mut hits = Vec::new();
        let mut killed = Vec::new();
        {
            let mut map = self
                .combatants
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for (id, combatant) in map.iter_mut() {
                let damage = effects::tick(&mut combatant.status_effects, now_ms);
                effects::expire(&mut combatant.status_effects, now_ms);
                if damage > 0.0 {
                    combatant.apply_damage(damage);
                    hits.push((*id, damage));
                    if combatant.hp <= 0.0 {
                        if let Ok(next) =
                            state::transition(combatant.combat_state, CombatEvent::HpDepleted)
                        {
                            combatant.combat_state = next;
                        }
                        combatant.current_action = None;
                        killed.push(*id);
                    }
                }
            }
        }
        for id in killed {
            self.queue.remove_actor(id);
        }
        hits
    }

    /// Ends the encounter for one combatant (`InCombat → Idle`).
    pub fn end_combat(&self, entity_id: Uuid) -> Result<(), CombatError> {
        let mut map = self
            .combatants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let combatant = map
            .get_mut(&entity_id)
            .ok_or(CombatError::UnknownCombatant(entity_id))?;
        combatant.combat_state = state::transition(combatant.combat_state, CombatEvent::CombatEnded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telluria_data::{CombatState, EffectKind};

    fn resolver_with(ids: &[Uuid]) -> CombatResolver {
        let resolver = CombatResolver::new(99);
        for id in ids {
            resolver.join(*id, 100.0, 50.0, 50.0).unwrap();
        }
        resolver
    }

    #[test]
    fn empty_tick_is_a_no_op() {
        let resolver = CombatResolver::new(1);
        assert!(resolver.process_tick(1_000_000).is_empty());
        assert_eq!(resolver.queued_actions(), 0);
    }

    #[test]
    fn tick_resolves_in_execute_at_order() {
        // Scenario: A queues Attack/Normal (agility 60) at T0,
        // B queues Attack/Quick (agility 40) at T0+100,
        // C queues Attack/Heavy (agility 70) at T0+50.
        let t0 = 10_000u64;
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let resolver = CombatResolver::new(5);
        resolver.join(a, 100.0, 50.0, 60.0).unwrap();
        resolver.join(b, 100.0, 50.0, 40.0).unwrap();
        resolver.join(c, 100.0, 50.0, 70.0).unwrap();
        let qa = resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Normal, t0)
            .unwrap();
        let qb = resolver
            .queue_action(b, c, ActionType::Attack, AttackVariant::Quick, t0 + 100)
            .unwrap();
        let qc = resolver
            .queue_action(c, a, ActionType::Attack, AttackVariant::Heavy, t0 + 50)
            .unwrap();
        assert_eq!(qa.execute_at_ms, t0 + 820);
        assert_eq!(qb.execute_at_ms, t0 + 804);
        assert_eq!(qc.execute_at_ms, t0 + 1_235);

        let resolved = resolver.process_tick(t0 + 2_000);
        let order: Vec<Uuid> = resolved.iter().map(|r| r.actor_id).collect();
        assert_eq!(order, vec![b, a, c]);
        assert!(resolved.iter().all(|r| r.resolved));
        let times: Vec<u64> = resolved.iter().map(|r| r.execute_at_ms).collect();
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
    }

    #[test]
    fn stunned_actor_loses_the_action() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Normal, 0)
            .unwrap();
        resolver
            .apply_effect(a, StatusEffect::stun(0, 10_000))
            .unwrap();
        assert!(resolver.process_tick(5_000).is_empty());
        assert_eq!(resolver.combatant(b).unwrap().hp, 100.0);
    }

    #[test]
    fn exhausted_actor_loses_the_action() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        // Drain stamina below any attack cost.
        {
            let mut map = resolver.combatants.write().unwrap();
            map.get_mut(&a).unwrap().stamina = 1.0;
        }
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Heavy, 0)
            .unwrap();
        assert!(resolver.process_tick(10_000).is_empty());
    }

    #[test]
    fn removed_actor_resolves_to_skip() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Normal, 0)
            .unwrap();
        // leave() clears the queue too; re-enqueue via raw queue to
        // simulate an action that survived its actor.
        let action = CombatAction::new(a, b, ActionType::Attack, AttackVariant::Normal, 0, 300);
        resolver.leave(a);
        resolver.queue.enqueue(action);
        assert!(resolver.process_tick(10_000).is_empty());
    }

    #[test]
    fn attack_damages_and_can_defeat() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        {
            let mut map = resolver.combatants.write().unwrap();
            map.get_mut(&b).unwrap().hp = 10.0;
        }
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Normal, 0)
            .unwrap();
        let resolved = resolver.process_tick(5_000);
        assert_eq!(resolved.len(), 1);
        let target = resolver.combatant(b).unwrap();
        assert_eq!(target.hp, 0.0);
        assert_eq!(target.combat_state, CombatState::Defeated);
    }

    #[test]
    fn defend_halves_incoming_damage() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        resolver
            .queue_action(b, b, ActionType::Defend, AttackVariant::Normal, 0)
            .unwrap();
        resolver.process_tick(1_000);
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Normal, 1_000)
            .unwrap();
        resolver.process_tick(3_000);
        // 12 base damage halved by the defend window.
        assert_eq!(resolver.combatant(b).unwrap().hp, 94.0);
    }

    #[test]
    fn stamina_is_debited_per_action() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = resolver_with(&[a, b]);
        resolver
            .queue_action(a, b, ActionType::Attack, AttackVariant::Heavy, 0)
            .unwrap();
        resolver.process_tick(5_000);
        let actor = resolver.combatant(a).unwrap();
        assert_eq!(actor.stamina, 50.0 - 18.0);
        assert_eq!(actor.last_action_time_ms, 5_000);
    }

    #[test]
    fn poison_sweep_defeats_at_zero() {
        let (a,) = (Uuid::new_v4(),);
        let resolver = resolver_with(&[a]);
        {
            let mut map = resolver.combatants.write().unwrap();
            map.get_mut(&a).unwrap().hp = 3.0;
        }
        resolver
            .apply_effect(
                a,
                StatusEffect::damage_over_time(EffectKind::Poison, 0, 2.0, 1_000, 60_000),
            )
            .unwrap();
        let hits = resolver.process_effects(2_000);
        assert_eq!(hits, vec![(a, 4.0)]);
        let c = resolver.combatant(a).unwrap();
        assert_eq!(c.hp, 0.0);
        assert_eq!(c.combat_state, CombatState::Defeated);
    }

    #[test]
    fn hundred_ready_combatants_resolve_quickly() {
        let resolver = CombatResolver::new(123);
        let ids: Vec<Uuid> = (0..100).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            resolver.join(*id, 1_000.0, 1_000.0, 50.0).unwrap();
        }
        for (i, id) in ids.iter().enumerate() {
            let target = ids[(i + 1) % ids.len()];
            resolver
                .queue_action(*id, target, ActionType::Attack, AttackVariant::Normal, 0)
                .unwrap();
        }
        let started = std::time::Instant::now();
        let resolved = resolver.process_tick(10_000);
        assert_eq!(resolved.len(), 100);
        assert!(started.elapsed().as_millis() < 100);
    }
}
