//! Milankovitch orbital forcing.
//!
//! Three decoupled cycles over the simulation year: eccentricity
//! (100 ky), obliquity (41 ky, amplitude widened on unstable worlds),
//! precession (26 ky). Pure over `(year, stability)`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

pub const ECCENTRICITY_PERIOD_Y: f64 = 100_000.0;
pub const OBLIQUITY_PERIOD_Y: f64 = 41_000.0;
pub const PRECESSION_PERIOD_Y: f64 = 26_000.0;

const BASE_OBLIQUITY_DEG: f64 = 23.44;
const BASE_OBLIQUITY_AMPLITUDE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalState {
    pub year: f64,
    pub eccentricity: f64,
    pub obliquity_deg: f64,
    pub precession: f64,
    /// Normalised solar input; 1.0 is the modern Earth baseline.
    pub insolation: f64,
    pub ice_age_potential: f64,
}

/// Obliquity swing amplitude for a given satellite stabilisation in
/// `[0, 1]` (1 Earth-like, 0 Mars-like chaotic).
pub fn obliquity_amplitude(stability: f64) -> f64 {
    BASE_OBLIQUITY_AMPLITUDE * (1.0 + (1.0 - stability.clamp(0.0, 1.0)) * 10.0)
}

pub fn calculate_orbital_state(year: f64, stability: f64) -> OrbitalState {
    let eccentricity = 0.017 + 0.010 * (TAU * year / ECCENTRICITY_PERIOD_Y).sin();
    let amplitude = obliquity_amplitude(stability);
    let obliquity_deg = BASE_OBLIQUITY_DEG + amplitude * (TAU * year / OBLIQUITY_PERIOD_Y).sin();
    let precession = (TAU * year / PRECESSION_PERIOD_Y).sin();

    // Where the current obliquity sits inside its swing band, 0..1.
    let obliquity_norm = (obliquity_deg - (BASE_OBLIQUITY_DEG - amplitude)) / (2.0 * amplitude);
    let insolation = 1.0 + (obliquity_norm - 0.5) * 0.06 + eccentricity * precession * 0.5;
    let ice_age_potential = ((1.0 - insolation) / 0.07).clamp(0.0, 1.0);

    OrbitalState {
        year,
        eccentricity,
        obliquity_deg,
        precession,
        insolation,
        ice_age_potential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obliquity_is_periodic_over_41ky() {
        let a = calculate_orbital_state(0.0, 1.0);
        let b = calculate_orbital_state(41_000.0, 1.0);
        assert!((a.obliquity_deg - b.obliquity_deg).abs() < 0.001);
    }

    #[test]
    fn obliquity_peak_and_trough() {
        let peak = calculate_orbital_state(10_250.0, 1.0);
        assert!((peak.obliquity_deg - 24.64).abs() < 0.001);
        let trough = calculate_orbital_state(30_750.0, 1.0);
        assert!((trough.obliquity_deg - 22.24).abs() < 0.001);
    }

    #[test]
    fn insolation_stays_in_band() {
        for year in (0..1_000_000).step_by(997) {
            let state = calculate_orbital_state(year as f64, 1.0);
            assert!(
                (0.90..=1.10).contains(&state.insolation),
                "insolation {} at year {year}",
                state.insolation
            );
        }
    }

    #[test]
    fn unstable_worlds_swing_wider() {
        assert!((obliquity_amplitude(1.0) - 1.2).abs() < f64::EPSILON);
        assert!((obliquity_amplitude(0.0) - 13.2).abs() < 1e-9);
    }

    #[test]
    fn pure_in_inputs() {
        let a = calculate_orbital_state(123_456.0, 0.7);
        let b = calculate_orbital_state(123_456.0, 0.7);
        assert_eq!(a, b);
    }
}
