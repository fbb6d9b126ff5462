use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capacity of the per-entity event log; older entries are dropped.
pub const ENTITY_LOG_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Drive vector for an autonomous entity. Every component is kept in
/// `[0, 100]` by the setters; hunger/thirst/reproduction grow, energy
/// drains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    hunger: f64,
    thirst: f64,
    energy: f64,
    reproduction_urge: f64,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            thirst: 0.0,
            energy: 100.0,
            reproduction_urge: 0.0,
        }
    }
}

impl Needs {
    pub const HUNGER_CRITICAL: f64 = 80.0;
    pub const THIRST_CRITICAL: f64 = 85.0;
    pub const ENERGY_CRITICAL: f64 = 10.0;

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn thirst(&self) -> f64 {
        self.thirst
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn reproduction_urge(&self) -> f64 {
        self.reproduction_urge
    }

    pub fn set_hunger(&mut self, v: f64) {
        self.hunger = v.clamp(0.0, 100.0);
    }

    pub fn set_thirst(&mut self, v: f64) {
        self.thirst = v.clamp(0.0, 100.0);
    }

    pub fn set_energy(&mut self, v: f64) {
        self.energy = v.clamp(0.0, 100.0);
    }

    pub fn set_reproduction_urge(&mut self, v: f64) {
        self.reproduction_urge = v.clamp(0.0, 100.0);
    }

    pub fn hunger_critical(&self) -> bool {
        self.hunger >= Self::HUNGER_CRITICAL
    }

    pub fn thirst_critical(&self) -> bool {
        self.thirst >= Self::THIRST_CRITICAL
    }

    pub fn energy_critical(&self) -> bool {
        self.energy <= Self::ENERGY_CRITICAL
    }

    /// Healthy means no need is in its critical band.
    pub fn is_healthy(&self) -> bool {
        !self.hunger_critical() && !self.thirst_critical() && !self.energy_critical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diet {
    Herbivore,
    Carnivore,
    Omnivore,
}

/// Heritable traits. The island rule and need dynamics both read and
/// write these, so they sit on the entity rather than a species table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTraits {
    /// Abstract body-size scale; 1 is a hare, 10 is a mammoth.
    pub base_size: f64,
    pub aggression: f64,
    pub novelty_fear: f64,
    pub fertility: f64,
    pub diet: Diet,
    /// Per-need rate multipliers applied on top of the base rates.
    pub hunger_rate: f64,
    pub thirst_rate: f64,
    pub energy_rate: f64,
    pub reproduction_rate: f64,
}

impl Default for SpeciesTraits {
    fn default() -> Self {
        Self {
            base_size: 3.0,
            aggression: 0.5,
            novelty_fear: 0.5,
            fertility: 0.5,
            diet: Diet::Herbivore,
            hunger_rate: 1.0,
            thirst_rate: 1.0,
            energy_rate: 1.0,
            reproduction_rate: 1.0,
        }
    }
}

impl SpeciesTraits {
    pub fn need_multiplier(&self, need: &str) -> f64 {
        match need {
            "hunger" => self.hunger_rate,
            "thirst" => self.thirst_rate,
            "energy" => self.energy_rate,
            "reproduction" => self.reproduction_rate,
            _ => 1.0,
        }
    }
}

/// An autonomous creature in the ecosystem. Spawned by the population
/// spawner, destroyed on death or eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivingEntity {
    pub id: Uuid,
    pub species: String,
    pub world_id: Uuid,
    pub position: Position,
    pub needs: Needs,
    pub dna: SpeciesTraits,
    logs: Vec<String>,
}

impl LivingEntity {
    pub fn new(species: impl Into<String>, world_id: Uuid, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            species: species.into(),
            world_id,
            position,
            needs: Needs::default(),
            dna: SpeciesTraits::default(),
            logs: Vec::new(),
        }
    }

    /// Appends to the entity log, evicting the oldest entry past the cap.
    pub fn log(&mut self, entry: impl Into<String>) {
        if self.logs.len() >= ENTITY_LOG_CAP {
            self.logs.remove(0);
        }
        self.logs.push(entry.into());
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_clamp_to_bounds() {
        let mut needs = Needs::default();
        needs.set_hunger(250.0);
        needs.set_energy(-40.0);
        assert_eq!(needs.hunger(), 100.0);
        assert_eq!(needs.energy(), 0.0);
    }

    #[test]
    fn healthy_requires_all_needs_non_critical() {
        let mut needs = Needs::default();
        assert!(needs.is_healthy());
        needs.set_hunger(80.0);
        assert!(!needs.is_healthy());
        needs.set_hunger(79.9);
        needs.set_energy(10.0);
        assert!(!needs.is_healthy());
    }

    #[test]
    fn entity_log_evicts_past_cap() {
        let mut e = LivingEntity::new("hare", Uuid::new_v4(), Position::default());
        for i in 0..60 {
            e.log(format!("event {i}"));
        }
        assert_eq!(e.logs().len(), ENTITY_LOG_CAP);
        assert_eq!(e.logs()[0], "event 10");
    }
}
