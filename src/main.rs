use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use telluria_core::combat::CombatResolver;
use telluria_core::ecosystem::spawner::{self, SpeciesTemplate};
use telluria_core::ecosystem::Ecosystem;
use telluria_core::world::WorldGenerator;
use telluria_lib::auth::rate_limit::RateLimiter;
use telluria_lib::auth::{AuthHandler, SessionManager, TokenManager};
use telluria_lib::config::AppConfig;
use telluria_lib::infra::memory::{
    InMemoryCharacterDirectory, InMemoryStore, InMemoryUserRepository, InMemoryWorldEntities,
};
use telluria_lib::infra::redis_store::RedisStore;
use telluria_lib::ports::KeyValueStore;
use telluria_lib::services::{LookService, MapService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the world seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// World id to generate and serve (random when omitted)
    #[arg(long)]
    world_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "telluria=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(&args.config);
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }

    // Token keys are validated up front; a misconfigured key set must
    // not reach the login path.
    let tokens = Arc::new(TokenManager::new(
        config.auth.jwt_signing_key.as_bytes(),
        config.auth.jwt_encryption_key.as_bytes(),
    )?);

    let store: Arc<dyn KeyValueStore> = match RedisStore::connect(&config.auth.redis_addr).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "key-value store unreachable, using in-memory fallback");
            Arc::new(InMemoryStore::new())
        }
    };
    let sessions = Arc::new(SessionManager::new(store.clone()));
    let users = Arc::new(InMemoryUserRepository::new());

    // Periodic batched flush of session last-access timestamps.
    {
        let sessions = sessions.clone();
        let every = Duration::from_secs(config.auth.session_flush_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if let Err(e) = sessions.flush().await {
                    tracing::error!(error = %e, "session flush failed");
                }
            }
        });
    }

    // The auth plane binds to the bus when one is reachable.
    match async_nats::connect(&config.auth.nats_url).await {
        Ok(client) => {
            let handler = Arc::new(AuthHandler::new(
                users.clone(),
                sessions.clone(),
                tokens.clone(),
                RateLimiter::new(store.clone()),
            ));
            tokio::spawn(async move {
                if let Err(e) = handler.run(client).await {
                    tracing::error!(error = %e, "auth handler stopped");
                }
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, "message bus unreachable, auth plane disabled");
        }
    }

    // World generation, once per (world_id, seed).
    let world_id = args.world_id.unwrap_or_else(Uuid::new_v4);
    let generator = Arc::new(WorldGenerator::new());
    let world_config = config.world_gen();
    let world = generator.generate(world_id, world_config);

    // Seed the ecosystem.
    let ecosystem = Arc::new(RwLock::new(Ecosystem::new(world_id)));
    {
        let mut rng = telluria_core::rng::domain_rng(world_id, config.world.seed, "spawner");
        let mut eco = ecosystem.write().expect("fresh ecosystem lock");
        for template in [
            SpeciesTemplate::herbivore("hare", 1.5),
            SpeciesTemplate::herbivore("elk", 5.0),
            SpeciesTemplate::carnivore("wolf", 4.0),
        ] {
            let count = config.ecosystem.initial_population / 3;
            let spawned = spawner::spawn_population(&world.grid, world_id, &template, count, &mut rng);
            eco.entities.extend(spawned);
        }
        tracing::info!(population = eco.population(), "ecosystem seeded");
    }

    // The player gateway consumes these; it connects over the bus and
    // is not part of this process.
    let _look = LookService::new(
        generator.clone(),
        world_config,
        ecosystem.clone(),
        Arc::new(InMemoryWorldEntities::new()),
        Arc::new(InMemoryCharacterDirectory::new()),
    );
    let _map = MapService::new(generator.clone(), world_config, ecosystem.clone());

    let combat = Arc::new(CombatResolver::new(config.combat.rng_seed));

    // Combat ticks on a fixed cadence, using a monotonic ms clock.
    {
        let combat = combat.clone();
        let every = Duration::from_millis(config.combat.tick_ms.max(10));
        tokio::spawn(async move {
            let started = std::time::Instant::now();
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let now_ms = started.elapsed().as_millis() as u64;
                let resolved = combat.process_tick(now_ms);
                combat.process_effects(now_ms);
                if !resolved.is_empty() {
                    tracing::debug!(count = resolved.len(), "combat actions resolved");
                }
            }
        });
    }

    // Ecosystem fast ticks, with an occasional long tick for disease
    // and the slow geology.
    {
        let ecosystem = ecosystem.clone();
        let every = Duration::from_millis(config.ecosystem.tick_ms.max(50));
        let long_tick_years = config.ecosystem.long_tick_years;
        let seed = config.world.seed;
        tokio::spawn(async move {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut ticker = tokio::time::interval(every);
            let mut ticks: u64 = 0;
            loop {
                ticker.tick().await;
                let mut eco = match ecosystem.write() {
                    Ok(eco) => eco,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let fallen = eco.tick();
                if !fallen.is_empty() {
                    tracing::debug!(count = fallen.len(), "entities died");
                }
                ticks += 1;
                if ticks % 120 == 0 {
                    eco.long_tick(long_tick_years, &mut rng);
                }
            }
        });
    }

    tracing::info!(%world_id, "telluria server running, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    sessions.close().await.ok();
    Ok(())
}
