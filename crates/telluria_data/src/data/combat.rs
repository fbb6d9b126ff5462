use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatState {
    #[default]
    Idle,
    InCombat,
    Fleeing,
    /// Terminal; no outgoing transitions.
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Attack,
    Defend,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackVariant {
    #[default]
    Normal,
    Quick,
    Heavy,
}

impl ActionType {
    /// Stamina debited when the action resolves. An actor below the
    /// cost has the action dropped.
    pub fn stamina_cost(&self, variant: AttackVariant) -> f64 {
        match self {
            ActionType::Attack => match variant {
                AttackVariant::Normal => 10.0,
                AttackVariant::Quick => 6.0,
                AttackVariant::Heavy => 18.0,
            },
            ActionType::Defend => 4.0,
            ActionType::Flee => 12.0,
        }
    }

    /// Raw damage dealt before mitigation. Defend and flee deal none.
    pub fn base_damage(&self, variant: AttackVariant) -> f64 {
        match self {
            ActionType::Attack => match variant {
                AttackVariant::Normal => 12.0,
                AttackVariant::Quick => 7.0,
                AttackVariant::Heavy => 22.0,
            },
            ActionType::Defend | ActionType::Flee => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Stun,
    Poison,
    Bleed,
    Slow,
    Haste,
}

impl EffectKind {
    /// Whether two applications of the kind may coexist. Everything
    /// here refreshes the existing instance instead.
    pub fn stacks(&self) -> bool {
        false
    }
}

/// One active status effect. Damage-over-time kinds use
/// `damage_per_tick`/`tick_interval_ms`; Slow and Haste carry their
/// reaction-time multiplier in `magnitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub magnitude: f64,
    pub applied_at_ms: u64,
    pub last_tick_at_ms: u64,
    pub expires_at_ms: u64,
    pub damage_per_tick: f64,
    pub tick_interval_ms: u64,
    /// Movement events observed since application; bleed decays on
    /// every third one.
    pub movement_events: u32,
}

impl StatusEffect {
    pub fn stun(now_ms: u64, duration_ms: u64) -> Self {
        Self {
            kind: EffectKind::Stun,
            magnitude: 1.0,
            applied_at_ms: now_ms,
            last_tick_at_ms: now_ms,
            expires_at_ms: now_ms + duration_ms,
            damage_per_tick: 0.0,
            tick_interval_ms: 0,
            movement_events: 0,
        }
    }

    pub fn damage_over_time(
        kind: EffectKind,
        now_ms: u64,
        damage_per_tick: f64,
        tick_interval_ms: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            kind,
            magnitude: damage_per_tick,
            applied_at_ms: now_ms,
            last_tick_at_ms: now_ms,
            expires_at_ms: now_ms + duration_ms,
            damage_per_tick,
            tick_interval_ms,
            movement_events: 0,
        }
    }

    pub fn reaction_modifier(kind: EffectKind, now_ms: u64, multiplier: f64, duration_ms: u64) -> Self {
        Self {
            kind,
            magnitude: multiplier,
            applied_at_ms: now_ms,
            last_tick_at_ms: now_ms,
            expires_at_ms: now_ms + duration_ms,
            damage_per_tick: 0.0,
            tick_interval_ms: 0,
            movement_events: 0,
        }
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// A queued combat action. Holds actor/target ids only; a destroyed
/// combatant resolves to a skip at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatAction {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub action_type: ActionType,
    pub attack_variant: AttackVariant,
    pub reaction_time_ms: u64,
    pub queued_at_ms: u64,
    pub execute_at_ms: u64,
    pub resolved: bool,
}

impl CombatAction {
    pub fn new(
        actor_id: Uuid,
        target_id: Uuid,
        action_type: ActionType,
        attack_variant: AttackVariant,
        queued_at_ms: u64,
        reaction_time_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            target_id,
            action_type,
            attack_variant,
            reaction_time_ms,
            queued_at_ms,
            execute_at_ms: queued_at_ms + reaction_time_ms,
            resolved: false,
        }
    }
}

/// Per-encounter combat state for one entity. Created when the actor
/// joins combat, removed when the encounter ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub entity_id: Uuid,
    pub hp: f64,
    pub max_hp: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    /// 0..=100; feeds the reaction-time reduction.
    pub agility: f64,
    pub last_action_time_ms: u64,
    pub combat_state: CombatState,
    pub status_effects: Vec<StatusEffect>,
    pub current_action: Option<Uuid>,
    /// Incoming attack damage is halved while `now` is before this.
    pub defending_until_ms: u64,
}

impl Combatant {
    pub fn new(entity_id: Uuid, max_hp: f64, max_stamina: f64, agility: f64) -> Self {
        Self {
            entity_id,
            hp: max_hp,
            max_hp,
            stamina: max_stamina,
            max_stamina,
            agility: agility.clamp(0.0, 100.0),
            last_action_time_ms: 0,
            combat_state: CombatState::Idle,
            status_effects: Vec::new(),
            current_action: None,
            defending_until_ms: 0,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0 || self.combat_state == CombatState::Defeated
    }

    /// Applies damage, clamping hp to `[0, max_hp]`.
    pub fn apply_damage(&mut self, amount: f64) {
        self.hp = (self.hp - amount.max(0.0)).clamp(0.0, self.max_hp);
    }

    pub fn heal(&mut self, amount: f64) {
        self.hp = (self.hp + amount.max(0.0)).clamp(0.0, self.max_hp);
    }

    pub fn spend_stamina(&mut self, amount: f64) {
        self.stamina = (self.stamina - amount).clamp(0.0, self.max_stamina);
    }

    pub fn regain_stamina(&mut self, amount: f64) {
        self.stamina = (self.stamina + amount).clamp(0.0, self.max_stamina);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_heal_stay_in_bounds() {
        let mut c = Combatant::new(Uuid::new_v4(), 100.0, 50.0, 60.0);
        c.apply_damage(250.0);
        assert_eq!(c.hp, 0.0);
        c.heal(500.0);
        assert_eq!(c.hp, 100.0);
        c.spend_stamina(80.0);
        assert_eq!(c.stamina, 0.0);
    }

    #[test]
    fn execute_at_is_queued_plus_reaction() {
        let a = CombatAction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            ActionType::Attack,
            AttackVariant::Quick,
            1_000,
            804,
        );
        assert_eq!(a.execute_at_ms, 1_804);
        assert!(!a.resolved);
    }

    #[test]
    fn heavy_attack_costs_most_stamina() {
        let heavy = ActionType::Attack.stamina_cost(AttackVariant::Heavy);
        let quick = ActionType::Attack.stamina_cost(AttackVariant::Quick);
        assert!(heavy > quick);
    }
}
