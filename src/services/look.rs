//! Room and entity descriptions composed from world + live state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use telluria_data::{Axial, Character, HexCell, Position};
use telluria_core::ecosystem::Ecosystem;
use telluria_core::world::{GeneratedWorld, WorldGenConfig, WorldGenerator};
use thiserror::Error;
use uuid::Uuid;

use crate::ports::{CharacterDirectory, StoreError, WorldEntityRepository};
use crate::services::weather::WeatherSystem;

/// Entities within this distance of the viewer are part of the scene.
pub const LOOK_RADIUS_M: f64 = 20.0;

/// Hex size used to map world metres onto grid coordinates.
const HEX_SIZE_M: f64 = 1.0;

#[derive(Debug, Error)]
pub enum LookError {
    #[error("position is off the map")]
    OffMap,
    #[error("nothing called \"{0}\" here")]
    UnknownTarget(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Composes descriptions. Owns its own caches; the world cache is the
/// generator's, the weather table initialises alongside the first use
/// of each world.
pub struct LookService {
    generator: Arc<WorldGenerator>,
    world_config: WorldGenConfig,
    ecosystem: Arc<RwLock<Ecosystem>>,
    world_entities: Arc<dyn WorldEntityRepository>,
    characters: Arc<dyn CharacterDirectory>,
    weather: Mutex<HashMap<Uuid, WeatherSystem>>,
}

impl LookService {
    pub fn new(
        generator: Arc<WorldGenerator>,
        world_config: WorldGenConfig,
        ecosystem: Arc<RwLock<Ecosystem>>,
        world_entities: Arc<dyn WorldEntityRepository>,
        characters: Arc<dyn CharacterDirectory>,
    ) -> Self {
        Self {
            generator,
            world_config,
            ecosystem,
            world_entities,
            characters,
            weather: Mutex::new(HashMap::new()),
        }
    }

    /// The cached world, generating on first touch; the weather table
    /// is seeded the first time a world enters the cache.
    fn world(&self, world_id: Uuid) -> Arc<GeneratedWorld> {
        let world = self.generator.generate(world_id, self.world_config);
        let mut weather = self.weather.lock().unwrap_or_else(PoisonError::into_inner);
        weather
            .entry(world_id)
            .or_insert_with(|| WeatherSystem::new(world_id));
        world
    }

    fn cell_at<'w>(world: &'w GeneratedWorld, position: &Position) -> Option<&'w HexCell> {
        let coord = Axial::from_pixel(position.x, position.y, HEX_SIZE_M);
        world.grid.cell(coord)
    }

    fn terrain_band(cell: &HexCell) -> &'static str {
        if !cell.is_land {
            if cell.elevation <= -0.08 {
                return "open water, the land far below the surface";
            }
            return "a shallow shore, waves breaking around you";
        }
        if cell.elevation > 0.55 {
            "high broken ground among the peaks"
        } else if cell.elevation > 0.25 {
            "rolling highlands"
        } else {
            "open rolling country"
        }
    }

    fn orientation(world: &GeneratedWorld, position: &Position) -> String {
        let (center_x, center_y) = {
            let config = &world.config;
            let center = Axial::new(config.width as i32 / 2, config.height as i32 / 2);
            center.to_pixel(HEX_SIZE_M)
        };
        let ns = if position.y < center_y { "north" } else { "south" };
        let ew = if position.x < center_x { "western" } else { "eastern" };
        format!("You are in the {ns}ern {ew} reaches of this land.")
    }

    /// The room description: terrain band, weather, visible creatures,
    /// and orientation.
    pub fn describe(&self, character: &Character) -> Result<String, LookError> {
        let world = self.world(character.world_id);
        let cell = Self::cell_at(&world, &character.position).ok_or(LookError::OffMap)?;

        let mut parts = Vec::new();
        parts.push(format!("You stand on {}.", Self::terrain_band(cell)));

        if let Some(biome) = cell.biome {
            let weather = self.weather.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(system) = weather.get(&character.world_id) {
                parts.push(format!("Overhead, {}.", system.current(biome)));
            }
        }

        let nearby: Vec<String> = {
            let ecosystem = self
                .ecosystem
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            ecosystem
                .entities_near(&character.position, LOOK_RADIUS_M)
                .iter()
                .filter(|e| e.id != character.id)
                .map(|e| e.species.clone())
                .collect()
        };
        if nearby.is_empty() {
            parts.push("Nothing else stirs nearby.".to_string());
        } else {
            parts.push(format!("Nearby you can see: {}.", nearby.join(", ")));
        }

        parts.push(Self::orientation(&world, &character.position));
        Ok(parts.join(" "))
    }

    /// Resolves a look target through the full chain: self-aliases,
    /// live entities in view, persisted world entities, ecosystem
    /// species anywhere, then other characters within view range.
    pub async fn describe_entity(
        &self,
        character: &Character,
        target: &str,
    ) -> Result<String, LookError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(LookError::UnknownTarget(target.to_string()));
        }

        if target.eq_ignore_ascii_case("self")
            || target.eq_ignore_ascii_case("me")
            || target.eq_ignore_ascii_case(&character.name)
        {
            return Ok(character
                .description
                .clone()
                .unwrap_or_else(|| format!("{}, an adventurer.", character.name)));
        }

        // Live creatures in view, then anywhere in the world.
        let (in_view, anywhere) = {
            let ecosystem = self
                .ecosystem
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let in_view = ecosystem
                .entities_near(&character.position, LOOK_RADIUS_M)
                .iter()
                .find(|e| e.species.eq_ignore_ascii_case(target))
                .map(|e| (e.species.clone(), e.needs.is_healthy()));
            let anywhere = ecosystem
                .entity_by_species(target)
                .map(|e| e.species.clone());
            (in_view, anywhere)
        };
        if let Some((species, healthy)) = in_view {
            let condition = if healthy { "healthy" } else { "ragged and worn" };
            return Ok(format!("A {species}, {condition}, watching you warily."));
        }

        if let Some(record) = self
            .world_entities
            .find_by_name(character.world_id, target)
            .await?
        {
            return Ok(record.description);
        }

        if let Some(species) = anywhere {
            return Ok(format!(
                "You know of {species} in these lands, though none are in sight."
            ));
        }

        let others = self.characters.characters_in_world(character.world_id).await?;
        if let Some(other) = others.iter().find(|c| {
            c.id != character.id
                && c.name.eq_ignore_ascii_case(target)
                && c.position.distance(&character.position) <= LOOK_RADIUS_M
        }) {
            return Ok(other
                .description
                .clone()
                .unwrap_or_else(|| format!("{}, another traveller.", other.name)));
        }

        Err(LookError::UnknownTarget(target.to_string()))
    }
}
