//! Server configuration: `config.toml` with defaults, plus
//! environment overrides for the operational knobs.

use serde::{Deserialize, Serialize};
use std::fs;
use telluria_core::world::WorldGenConfig;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorldSettings {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    /// Stellar age at generation, years.
    pub start_year: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EcosystemSettings {
    pub initial_population: usize,
    pub tick_ms: u64,
    /// Simulated years per long tick.
    pub long_tick_years: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CombatSettings {
    pub tick_ms: u64,
    pub rng_seed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthSettings {
    pub nats_url: String,
    pub redis_addr: String,
    /// ≥ 32 bytes; production refuses to start otherwise.
    pub jwt_signing_key: String,
    /// Exactly 32 bytes.
    pub jwt_encryption_key: String,
    /// Session-flush cadence, seconds.
    pub session_flush_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub world: WorldSettings,
    pub ecosystem: EcosystemSettings,
    pub combat: CombatSettings,
    pub auth: AuthSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldSettings {
                width: 64,
                height: 48,
                seed: 42,
                start_year: 4.5e9,
            },
            ecosystem: EcosystemSettings {
                initial_population: 120,
                tick_ms: 500,
                long_tick_years: 10_000,
            },
            combat: CombatSettings {
                tick_ms: 100,
                rng_seed: 7,
            },
            auth: AuthSettings {
                nats_url: "nats://127.0.0.1:4222".into(),
                redis_addr: "localhost:6379".into(),
                jwt_signing_key: String::new(),
                jwt_encryption_key: String::new(),
                session_flush_secs: 30,
            },
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults (and writing them out)
    /// when the file is missing or unreadable, then applies the
    /// environment overrides.
    pub fn load(path: &str) -> Self {
        let mut config = if let Ok(content) = fs::read_to_string(path) {
            match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path, error = %e, "config file unreadable, using defaults");
                    Self::default()
                }
            }
        } else {
            let default = Self::default();
            if let Ok(serialized) = toml::to_string(&default) {
                let _ = fs::write(path, serialized);
            }
            default
        };
        config.apply_env();
        config
    }

    /// `NATS_URL`, `REDIS_ADDR`, `JWT_SIGNING_KEY` and
    /// `JWT_ENCRYPTION_KEY` win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("NATS_URL") {
            self.auth.nats_url = url;
        }
        if let Ok(addr) = std::env::var("REDIS_ADDR") {
            self.auth.redis_addr = addr;
        }
        if let Ok(key) = std::env::var("JWT_SIGNING_KEY") {
            self.auth.jwt_signing_key = key;
        }
        if let Ok(key) = std::env::var("JWT_ENCRYPTION_KEY") {
            self.auth.jwt_encryption_key = key;
        }
    }

    pub fn world_gen(&self) -> WorldGenConfig {
        WorldGenConfig {
            width: self.world.width,
            height: self.world.height,
            seed: self.world.seed,
            start_year: self.world.start_year,
            ..WorldGenConfig::default()
        }
    }
}
