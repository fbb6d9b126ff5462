//! Need and drive dynamics.

use rayon::prelude::*;
use telluria_data::LivingEntity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeedRates {
    pub hunger: f64,
    pub thirst: f64,
    pub energy: f64,
    pub reproduction: f64,
}

impl Default for NeedRates {
    fn default() -> Self {
        Self {
            hunger: 0.05,
            thirst: 0.08,
            energy: 0.03,
            reproduction: 0.20,
        }
    }
}

/// One need tick for one entity. Hunger and thirst build, energy
/// drains, and only healthy entities accumulate reproductive urge.
pub fn update_needs(entity: &mut LivingEntity, rates: &NeedRates) {
    let dna = entity.dna.clone();
    let needs = &mut entity.needs;
    needs.set_hunger(needs.hunger() + rates.hunger * dna.need_multiplier("hunger"));
    needs.set_thirst(needs.thirst() + rates.thirst * dna.need_multiplier("thirst"));
    needs.set_energy(needs.energy() - rates.energy * dna.need_multiplier("energy"));
    if needs.is_healthy() {
        needs.set_reproduction_urge(
            needs.reproduction_urge() + rates.reproduction * dna.need_multiplier("reproduction"),
        );
    }
}

/// The per-tick need pass over the whole population.
pub fn update_population(entities: &mut [LivingEntity], rates: &NeedRates) {
    entities
        .par_iter_mut()
        .for_each(|entity| update_needs(entity, rates));
}
