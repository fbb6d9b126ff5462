//! The autonomous-agent ecosystem: needs, behaviour, planning,
//! disease, and the evolutionary pressure of isolation.

pub mod behavior;
pub mod disease;
pub mod goap;
pub mod island;
pub mod needs;
pub mod spawner;

use std::collections::HashMap;

use rand_chacha::ChaCha8Rng;
use telluria_data::{Diet, LivingEntity, Position};
use uuid::Uuid;

use crate::ecosystem::behavior::Node;
use crate::ecosystem::disease::{DiseaseParams, DiseaseSystem, SpeciesPool};
use crate::ecosystem::needs::NeedRates;

/// The live population of one world, with its disease state.
pub struct Ecosystem {
    pub world_id: Uuid,
    pub entities: Vec<LivingEntity>,
    pub disease: DiseaseSystem,
    rates: NeedRates,
    behavior: behavior::Selector,
    /// Simulation year, advanced by the long tick.
    pub year: i64,
}

impl Ecosystem {
    pub fn new(world_id: Uuid) -> Self {
        Self {
            world_id,
            entities: Vec::new(),
            disease: DiseaseSystem::new(DiseaseParams::default()),
            rates: NeedRates::default(),
            behavior: behavior::herbivore_tree(),
            year: 0,
        }
    }

    pub fn population(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, id: Uuid) -> Option<&LivingEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_by_species(&self, species: &str) -> Option<&LivingEntity> {
        self.entities
            .iter()
            .find(|e| e.species.eq_ignore_ascii_case(species))
    }

    /// Entities within `radius` metres of `position`.
    pub fn entities_near(&self, position: &Position, radius: f64) -> Vec<&LivingEntity> {
        self.entities
            .iter()
            .filter(|e| e.position.distance(position) <= radius)
            .collect()
    }

    /// Aggregates the population into per-species pools for the
    /// disease system.
    pub fn species_pools(&self) -> Vec<SpeciesPool> {
        let mut counts: HashMap<String, (u64, Diet)> = HashMap::new();
        for entity in &self.entities {
            let slot = counts
                .entry(entity.species.clone())
                .or_insert((0, entity.dna.diet));
            slot.0 += 1;
        }
        let total = self.entities.len().max(1) as f64;
        let mut pools: Vec<SpeciesPool> = counts
            .into_iter()
            .map(|(species, (population, diet))| SpeciesPool {
                species,
                population,
                density: (population as f64 / total).clamp(0.0, 1.0),
                diet,
                biome: None,
            })
            .collect();
        pools.sort_by(|a, b| a.species.cmp(&b.species));
        pools
    }

    /// One fast tick: needs, then behaviour, then death eviction.
    pub fn tick(&mut self) -> Vec<Uuid> {
        needs::update_population(&mut self.entities, &self.rates);
        for entity in &mut self.entities {
            self.behavior.tick(entity);
        }
        spawner::evict_dead(&mut self.entities)
    }

    /// One slow tick spanning `years`: outbreak progression, new
    /// emergences, cross-species spillover, and endemic promotion.
    pub fn long_tick(&mut self, years: i64, rng: &mut ChaCha8Rng) {
        self.year += years;
        let pools = self.species_pools();
        for pool in &pools {
            self.disease.try_spontaneous_outbreak(pool, self.year, rng);
        }

        let circulating: Vec<uuid::Uuid> = self
            .disease
            .pathogens
            .iter()
            .filter(|p| p.active_outbreaks > 0 && !p.is_eradicated)
            .map(|p| p.id)
            .collect();
        for pathogen_id in circulating {
            for (from, to) in pools.iter().zip(pools.iter().skip(1)) {
                let contact_rate = (from.density * to.density).sqrt();
                let _ = self
                    .disease
                    .try_zoonotic_jump(pathogen_id, from, to, contact_rate, self.year, rng);
            }
        }

        self.disease.tick_outbreaks(self.year, &pools);
        self.disease.evolve_endemic(self.year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use telluria_data::SpeciesTraits;

    fn ecosystem_with(count: usize) -> Ecosystem {
        let mut eco = Ecosystem::new(Uuid::new_v4());
        for i in 0..count {
            let mut e = LivingEntity::new(
                if i % 2 == 0 { "hare" } else { "wolf" },
                eco.world_id,
                Position::new(i as f64, 0.0, 0.0),
            );
            e.dna = SpeciesTraits::default();
            eco.entities.push(e);
        }
        eco
    }

    #[test]
    fn tick_advances_needs_for_everyone() {
        let mut eco = ecosystem_with(10);
        eco.tick();
        assert!(eco.entities.iter().all(|e| e.needs.hunger() > 0.0));
    }

    #[test]
    fn pools_group_by_species() {
        let eco = ecosystem_with(10);
        let pools = eco.species_pools();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].species, "hare");
        assert_eq!(pools[0].population, 5);
    }

    #[test]
    fn proximity_query_filters_by_radius() {
        let eco = ecosystem_with(10);
        let near = eco.entities_near(&Position::new(0.0, 0.0, 0.0), 3.5);
        assert_eq!(near.len(), 4);
    }

    #[test]
    fn long_tick_advances_the_clock() {
        let mut eco = ecosystem_with(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        eco.long_tick(10, &mut rng);
        assert_eq!(eco.year, 10);
    }
}
