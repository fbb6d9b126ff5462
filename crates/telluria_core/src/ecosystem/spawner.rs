//! Population spawning and eviction.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use telluria_data::{Axial, Diet, LivingEntity, Position, SpeciesTraits};
use uuid::Uuid;

use crate::world::hexgrid::HexGrid;

/// A species the spawner can seed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTemplate {
    pub name: String,
    pub traits: SpeciesTraits,
}

impl SpeciesTemplate {
    pub fn herbivore(name: impl Into<String>, base_size: f64) -> Self {
        Self {
            name: name.into(),
            traits: SpeciesTraits {
                base_size,
                diet: Diet::Herbivore,
                ..SpeciesTraits::default()
            },
        }
    }

    pub fn carnivore(name: impl Into<String>, base_size: f64) -> Self {
        Self {
            name: name.into(),
            traits: SpeciesTraits {
                base_size,
                aggression: 0.8,
                diet: Diet::Carnivore,
                ..SpeciesTraits::default()
            },
        }
    }
}

/// Spawns `count` entities of `template` onto passable land cells.
/// Positions are the hex centres in world metres. Returns fewer than
/// `count` only when the world has no land at all.
pub fn spawn_population(
    grid: &HexGrid,
    world_id: Uuid,
    template: &SpeciesTemplate,
    count: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<LivingEntity> {
    let mut habitable: Vec<Axial> = grid
        .cells()
        .filter(|c| c.is_land && c.terrain.is_passable())
        .map(|c| c.coord)
        .collect();
    habitable.sort_by_key(|c| (c.r, c.q));
    if habitable.is_empty() {
        tracing::warn!(%world_id, species = %template.name, "no habitable land to spawn onto");
        return Vec::new();
    }

    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let coord = habitable[rng.gen_range(0..habitable.len())];
        let (x, y) = coord.to_pixel(1.0);
        let mut entity = LivingEntity::new(
            template.name.clone(),
            world_id,
            Position::new(x, y, 0.0),
        );
        entity.dna = template.traits.clone();
        entity.log("spawned");
        spawned.push(entity);
    }
    tracing::debug!(%world_id, species = %template.name, count = spawned.len(), "population spawned");
    spawned
}

/// An entity dies when it has fully starved with no energy left.
pub fn is_dead(entity: &LivingEntity) -> bool {
    entity.needs.hunger() >= 100.0 && entity.needs.energy() <= 0.0
}

/// Removes dead entities, returning the ids of the fallen.
pub fn evict_dead(entities: &mut Vec<LivingEntity>) -> Vec<Uuid> {
    let mut fallen = Vec::new();
    entities.retain(|e| {
        if is_dead(e) {
            fallen.push(e.id);
            false
        } else {
            true
        }
    });
    fallen
}
