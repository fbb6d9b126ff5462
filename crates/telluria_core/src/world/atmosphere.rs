//! Atmospheric mass balance and the carbon-silicate feedback.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Modern Earth CO₂ partial pressure, atm.
pub const MODERN_CO2_ATM: f64 = 0.0006;

/// CO₂ never weathers below this.
pub const CO2_FLOOR_ATM: f64 = 1.0e-4;

/// Reaction-rate doubling per 10 °C of warming.
const Q10: f64 = 2.0;

/// Baseline surface temperature the greenhouse delta is measured from.
pub const BASELINE_TEMP_C: f64 = 15.0;

/// Worlds younger than this start with a reducing, CO₂-heavy envelope.
const PRIMORDIAL_CUTOFF_Y: f64 = 2.0e9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Partial pressures normalised to 1.0 = Earth sea level.
    pub co2_atm: f64,
    pub n2_atm: f64,
    pub o2_atm: f64,
}

impl Composition {
    pub fn primordial() -> Self {
        Self {
            co2_atm: 50.0,
            n2_atm: 0.5,
            o2_atm: 0.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            co2_atm: MODERN_CO2_ATM,
            n2_atm: 0.78,
            o2_atm: 0.21,
        }
    }

    pub fn total_atm(&self) -> f64 {
        self.co2_atm + self.n2_atm + self.o2_atm
    }
}

/// Inputs to one carbon-cycle step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonCycleParams {
    /// Modern-Earth weathering sink, atm CO₂ per year.
    pub weathering_modern_rate: f64,
    /// Modern-Earth volcanic source, atm CO₂ per year.
    pub volcanic_modern_rate: f64,
    /// Annual precipitation, mm.
    pub precipitation_mm: f64,
    /// Land fraction of the surface, 1.0 = all land.
    pub land_area_fraction: f64,
    /// Interior heat relative to the modern Earth.
    pub planetary_heat: f64,
    /// Mean surface temperature, °C.
    pub surface_temp_c: f64,
}

impl Default for CarbonCycleParams {
    fn default() -> Self {
        Self {
            weathering_modern_rate: 3.0e-10,
            volcanic_modern_rate: 3.0e-10,
            precipitation_mm: 1_000.0,
            land_area_fraction: 0.29,
            planetary_heat: 1.0,
            surface_temp_c: BASELINE_TEMP_C,
        }
    }
}

/// Silicate weathering sink:
/// `modern · Q10^(ΔT/10) · (precip/1000) · landArea · √(CO₂/modern)`.
pub fn weathering_rate(composition: &Composition, params: &CarbonCycleParams) -> f64 {
    if composition.co2_atm <= 0.0 {
        return 0.0;
    }
    let temp_factor = Q10.powf((params.surface_temp_c - BASELINE_TEMP_C) / 10.0);
    params.weathering_modern_rate
        * temp_factor
        * (params.precipitation_mm / 1_000.0)
        * params.land_area_fraction
        * (composition.co2_atm / MODERN_CO2_ATM).sqrt()
}

/// Volcanic outgassing source, scaled by interior heat.
pub fn volcanic_rate(params: &CarbonCycleParams) -> f64 {
    params.volcanic_modern_rate * params.planetary_heat
}

/// Atmospheric state. Composition updates go through the internal
/// lock; snapshots are cheap copies.
#[derive(Debug)]
pub struct Atmosphere {
    inner: Mutex<Composition>,
}

impl Atmosphere {
    pub fn new(composition: Composition) -> Self {
        Self {
            inner: Mutex::new(composition),
        }
    }

    /// Initial composition branches on the world's starting year:
    /// pre-2 Gy worlds begin reducing and CO₂-heavy.
    pub fn for_start_year(year: f64) -> Self {
        if year < PRIMORDIAL_CUTOFF_Y {
            Self::new(Composition::primordial())
        } else {
            Self::new(Composition::modern())
        }
    }

    pub fn composition(&self) -> Composition {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Greenhouse warming over the baseline:
    /// `ΔT = 3 °C · log₂(CO₂ / modern)`; zero without CO₂.
    pub fn greenhouse_delta_c(&self) -> f64 {
        let co2 = self.composition().co2_atm;
        if co2 <= 0.0 {
            return 0.0;
        }
        3.0 * (co2 / MODERN_CO2_ATM).log2()
    }

    /// One carbon-silicate feedback step over `dt_years`:
    /// `CO₂ += (volcanic − weathering) · Δt`, floored at 1e-4 atm.
    pub fn carbon_cycle_tick(&self, dt_years: f64, params: &CarbonCycleParams) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let weathering = weathering_rate(&inner, params);
        let volcanic = volcanic_rate(params);
        inner.co2_atm = (inner.co2_atm + (volcanic - weathering) * dt_years).max(CO2_FLOOR_ATM);
    }
}
