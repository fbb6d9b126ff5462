//! Seeded satellite generation and the quantities derived from it.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;
pub const EARTH_MASS_KG: f64 = 5.972e24;
pub const EARTH_RADIUS_M: f64 = 6.371e6;
pub const EARTH_MOON_MASS_KG: f64 = 7.342e22;
pub const EARTH_MOON_RADIUS_M: f64 = 1.7374e6;
pub const EARTH_MOON_DISTANCE_M: f64 = 3.844e8;

/// Outer bound for stable orbits (a conservative Hill-sphere stand-in).
const MAX_ORBIT_M: f64 = 1.5e9;

/// Inner bound as a multiple of the planet radius (Roche limit).
const ROCHE_MULTIPLE: f64 = 2.5;

const MAX_MOONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// When set, exactly this many moons are generated.
    pub override_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    pub name: String,
    pub mass_kg: f64,
    pub radius_m: f64,
    pub distance_m: f64,
    pub period_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSystem {
    pub planet_mass_kg: f64,
    pub planet_radius_m: f64,
    pub moons: Vec<Satellite>,
}

impl SatelliteSystem {
    /// Samples a moon set. Count weights: 10% none, 60% one, 20% two,
    /// 10% three or more (capped). Each moon draws a mass in
    /// 0.1×..2× the Earth-Moon mass; radius scales with mass^(1/3);
    /// distances are stratified across the Roche→Hill band; periods
    /// follow Kepler's third law.
    pub fn generate<R: Rng>(
        rng: &mut R,
        planet_mass_kg: f64,
        planet_radius_m: f64,
        config: SatelliteConfig,
    ) -> Self {
        let count = match config.override_count {
            Some(n) => n.min(MAX_MOONS),
            None => match rng.gen_range(0..100) {
                0..=9 => 0,
                10..=69 => 1,
                70..=89 => 2,
                _ => rng.gen_range(3..=MAX_MOONS),
            },
        };

        let inner = ROCHE_MULTIPLE * planet_radius_m;
        let outer = MAX_ORBIT_M;
        let mut moons = Vec::with_capacity(count);
        for i in 0..count {
            let mass_kg = rng.gen_range(0.1..2.0) * EARTH_MOON_MASS_KG;
            let radius_m = EARTH_MOON_RADIUS_M * (mass_kg / EARTH_MOON_MASS_KG).cbrt();
            // One stratum of the orbit band per moon keeps orbits apart.
            let stratum = (outer - inner) / count as f64;
            let low = inner + stratum * i as f64;
            let distance_m = rng.gen_range(low..low + stratum);
            let period_s =
                std::f64::consts::TAU * (distance_m.powi(3) / (GRAVITATIONAL_CONSTANT * planet_mass_kg)).sqrt();
            moons.push(Satellite {
                name: format!("Moon {}", (b'A' + i as u8) as char),
                mass_kg,
                radius_m,
                distance_m,
                period_s,
            });
        }
        Self {
            planet_mass_kg,
            planet_radius_m,
            moons,
        }
    }

    /// Σ m/d³ normalised so the Earth-Moon pair scores 1.0.
    pub fn tidal_stress(&self) -> f64 {
        let reference = EARTH_MOON_MASS_KG / EARTH_MOON_DISTANCE_M.powi(3);
        self.moons
            .iter()
            .map(|m| m.mass_kg / m.distance_m.powi(3))
            .sum::<f64>()
            / reference
    }

    /// A heavy moon pins the spin axis; light or no moons leave the
    /// obliquity nearly free.
    pub fn obliquity_stability(&self) -> f64 {
        let total_moon_mass: f64 = self.moons.iter().map(|m| m.mass_kg).sum();
        if total_moon_mass / self.planet_mass_kg > 0.01 {
            1.0
        } else {
            0.1
        }
    }

    /// Each moon soaks up some impactors, to a point.
    pub fn impact_shielding(&self) -> f64 {
        (0.05 * self.moons.len() as f64).min(0.2)
    }

    /// Composite index: `0.4·tidal + 0.4·stability + 0.2·shielding`.
    pub fn influence_index(&self) -> f64 {
        0.4 * self.tidal_stress().clamp(0.0, 1.0)
            + 0.4 * self.obliquity_stability()
            + 0.2 * self.impact_shielding()
    }
}
