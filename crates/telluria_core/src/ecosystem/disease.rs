//! Pathogen registry and the outbreak life-cycle.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use telluria_data::{Biome, Diet, Outbreak, Pathogen, PathogenKind};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiseaseError {
    #[error("active outbreak cap of {0} reached")]
    TooManyOutbreaks(usize),
    #[error("unknown pathogen {0}")]
    UnknownPathogen(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiseaseParams {
    /// Base chance per (species, year) of a spontaneous outbreak.
    pub spontaneous_base: f64,
    /// Base chance factor for cross-species jumps.
    pub zoonotic_base: f64,
    pub max_active_outbreaks: usize,
    /// Continuous circulation before a strain turns endemic, years.
    pub endemic_after_years: i64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self {
            spontaneous_base: 0.002,
            zoonotic_base: 0.001,
            max_active_outbreaks: 12,
            endemic_after_years: 500,
        }
    }
}

/// One species' exposure surface for the disease system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPool {
    pub species: String,
    pub population: u64,
    /// Local crowding in `[0, 1]`.
    pub density: f64,
    pub diet: Diet,
    pub biome: Option<Biome>,
}

const PATHOGEN_SYLLABLES: [&str; 10] = [
    "vor", "mal", "ket", "zin", "rha", "ulth", "ser", "nox", "pell", "grim",
];

pub struct DiseaseSystem {
    pub params: DiseaseParams,
    pub pathogens: Vec<Pathogen>,
    pub outbreaks: Vec<Outbreak>,
    pub archive: Vec<Outbreak>,
}

impl DiseaseSystem {
    pub fn new(params: DiseaseParams) -> Self {
        Self {
            params,
            pathogens: Vec::new(),
            outbreaks: Vec::new(),
            archive: Vec::new(),
        }
    }

    /// Crowded hosts breed more spillover.
    pub fn population_boost(population: u64) -> f64 {
        if population < 10_000 {
            1.0
        } else if population <= 100_000 {
            1.2
        } else {
            1.56
        }
    }

    fn sample_kind(rng: &mut ChaCha8Rng) -> PathogenKind {
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        for kind in PathogenKind::ALL {
            cumulative += kind.emergence_weight();
            if roll < cumulative {
                return kind;
            }
        }
        PathogenKind::Prion
    }

    fn coin_name(rng: &mut ChaCha8Rng) -> String {
        let a = PATHOGEN_SYLLABLES[rng.gen_range(0..PATHOGEN_SYLLABLES.len())];
        let b = PATHOGEN_SYLLABLES[rng.gen_range(0..PATHOGEN_SYLLABLES.len())];
        let mut name = format!("{a}{b}");
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        name
    }

    pub fn pathogen(&self, id: Uuid) -> Option<&Pathogen> {
        self.pathogens.iter().find(|p| p.id == id)
    }

    fn pathogen_mut(&mut self, id: Uuid) -> Option<&mut Pathogen> {
        self.pathogens.iter_mut().find(|p| p.id == id)
    }

    /// Opens an outbreak, honouring the concurrent-outbreak cap.
    pub fn open_outbreak(
        &mut self,
        pathogen_id: Uuid,
        species: &str,
        biome: Option<Biome>,
        year: i64,
        initial_infected: u64,
        severity: f64,
    ) -> Result<Uuid, DiseaseError> {
        if self.outbreaks.len() >= self.params.max_active_outbreaks {
            return Err(DiseaseError::TooManyOutbreaks(
                self.params.max_active_outbreaks,
            ));
        }
        let pathogen = self
            .pathogen_mut(pathogen_id)
            .ok_or(DiseaseError::UnknownPathogen(pathogen_id))?;
        pathogen.active_outbreaks += 1;
        let outbreak = Outbreak::new(pathogen_id, species, biome, year, initial_infected, severity);
        let id = outbreak.id;
        tracing::info!(pathogen = %pathogen_id, species, year, "outbreak opened");
        self.outbreaks.push(outbreak);
        Ok(id)
    }

    /// Rolls one spontaneous-emergence check for a species-year:
    /// `base · (1 + 2·density) · populationBoost(pop)`.
    pub fn try_spontaneous_outbreak(
        &mut self,
        pool: &SpeciesPool,
        year: i64,
        rng: &mut ChaCha8Rng,
    ) -> Option<Uuid> {
        let p = self.params.spontaneous_base
            * (1.0 + 2.0 * pool.density)
            * Self::population_boost(pool.population);
        if rng.gen::<f64>() >= p.min(1.0) {
            return None;
        }
        let kind = Self::sample_kind(rng);
        let pathogen = Pathogen {
            id: Uuid::new_v4(),
            name: Self::coin_name(rng),
            kind,
            origin_species: pool.species.clone(),
            host_specificity: rng.gen_range(0.3..0.95),
            transmissibility: rng.gen_range(0.1..0.7),
            virulence: rng.gen_range(0.05..0.6),
            mutation_rate: rng.gen_range(0.01..0.3),
            susceptible_diets: vec![pool.diet],
            is_endemic: false,
            is_eradicated: false,
            active_outbreaks: 0,
            emerged_year: year,
        };
        let pathogen_id = pathogen.id;
        let severity = pathogen.virulence;
        self.pathogens.push(pathogen);
        let infected = rng.gen_range(1..=10);
        match self.open_outbreak(pathogen_id, &pool.species, pool.biome, year, infected, severity)
        {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "spontaneous outbreak suppressed");
                None
            }
        }
    }

    /// Rolls a cross-species jump:
    /// `zoonoticBase · contactRate · (1 − hostSpecificity)`. On
    /// success the strain may mutate, the target diet joins the
    /// susceptible set, and a new outbreak opens in the target pool.
    pub fn try_zoonotic_jump(
        &mut self,
        pathogen_id: Uuid,
        from: &SpeciesPool,
        to: &SpeciesPool,
        contact_rate: f64,
        year: i64,
        rng: &mut ChaCha8Rng,
    ) -> Result<Option<Uuid>, DiseaseError> {
        let (chance, mutation_rate, severity) = {
            let pathogen = self
                .pathogen(pathogen_id)
                .ok_or(DiseaseError::UnknownPathogen(pathogen_id))?;
            if pathogen.is_eradicated {
                return Ok(None);
            }
            (
                self.params.zoonotic_base * contact_rate * (1.0 - pathogen.host_specificity),
                pathogen.mutation_rate,
                pathogen.virulence,
            )
        };
        if rng.gen::<f64>() >= chance.clamp(0.0, 1.0) {
            return Ok(None);
        }

        let mutated = rng.gen::<f64>() < mutation_rate;
        if let Some(pathogen) = self.pathogen_mut(pathogen_id) {
            if mutated {
                pathogen.transmissibility =
                    (pathogen.transmissibility + rng.gen_range(-0.1..0.1)).clamp(0.01, 1.0);
                pathogen.virulence =
                    (pathogen.virulence + rng.gen_range(-0.1..0.1)).clamp(0.01, 1.0);
                pathogen.host_specificity =
                    (pathogen.host_specificity - rng.gen_range(0.0..0.1)).max(0.0);
                tracing::debug!(pathogen = %pathogen_id, "strain mutated during jump");
            }
            if !pathogen.susceptible_diets.contains(&to.diet) {
                pathogen.susceptible_diets.push(to.diet);
            }
        }
        tracing::info!(
            pathogen = %pathogen_id,
            from = %from.species,
            to = %to.species,
            "zoonotic jump"
        );
        self.open_outbreak(pathogen_id, &to.species, to.biome, year, 1, severity)
            .map(Some)
    }

    /// Advances every active outbreak one year. Outbreaks whose
    /// infections die out are closed and moved to the archive.
    pub fn tick_outbreaks(&mut self, year: i64, pools: &[SpeciesPool]) {
        let mut closed = Vec::new();
        for (i, outbreak) in self.outbreaks.iter_mut().enumerate() {
            let Some(pathogen) = self
                .pathogens
                .iter()
                .find(|p| p.id == outbreak.pathogen_id)
            else {
                closed.push(i);
                continue;
            };
            let susceptible = pools
                .iter()
                .find(|p| p.species == outbreak.species)
                .map(|p| p.population)
                .unwrap_or(0);

            let infected = outbreak.current_infected as f64;
            // Hosts already infected once are no longer susceptible.
            let saturation = if susceptible > 0 {
                (1.0 - outbreak.total_infected as f64 / susceptible as f64).max(0.0)
            } else {
                0.0
            };
            let new_infections = (infected * pathogen.transmissibility * saturation).round() as u64;
            // Ceilings keep small outbreaks from plateauing forever.
            let deaths = (infected * pathogen.virulence * outbreak.severity * 0.2).ceil() as u64;
            let recoveries = (infected * 0.5).ceil() as u64;

            outbreak.total_infected += new_infections;
            outbreak.total_deaths += deaths;
            outbreak.current_infected = (outbreak.current_infected + new_infections)
                .saturating_sub(deaths + recoveries);

            if outbreak.current_infected == 0 || susceptible == 0 {
                outbreak.is_active = false;
                outbreak.end_year = Some(year);
                closed.push(i);
            }
        }
        for i in closed.into_iter().rev() {
            let outbreak = self.outbreaks.remove(i);
            if let Some(pathogen) = self.pathogen_mut(outbreak.pathogen_id) {
                pathogen.active_outbreaks = pathogen.active_outbreaks.saturating_sub(1);
            }
            tracing::info!(outbreak = %outbreak.id, "outbreak ended");
            self.archive.push(outbreak);
        }
    }

    /// Long-circulating, never-eradicated strains settle in as endemic.
    pub fn evolve_endemic(&mut self, year: i64) {
        for pathogen in &mut self.pathogens {
            if pathogen.is_endemic || pathogen.is_eradicated {
                continue;
            }
            let circulating = pathogen.active_outbreaks > 0;
            if circulating && year - pathogen.emerged_year >= self.params.endemic_after_years {
                pathogen.is_endemic = true;
                tracing::info!(pathogen = %pathogen.id, name = %pathogen.name, "strain became endemic");
            }
        }
    }

    /// Marks the strain non-circulating and closes all its outbreaks.
    pub fn eradicate(&mut self, pathogen_id: Uuid, year: i64) -> Result<(), DiseaseError> {
        let pathogen = self
            .pathogen_mut(pathogen_id)
            .ok_or(DiseaseError::UnknownPathogen(pathogen_id))?;
        pathogen.is_eradicated = true;
        pathogen.is_endemic = false;
        pathogen.active_outbreaks = 0;

        let mut remaining = Vec::new();
        for mut outbreak in self.outbreaks.drain(..) {
            if outbreak.pathogen_id == pathogen_id {
                outbreak.is_active = false;
                outbreak.end_year = Some(year);
                self.archive.push(outbreak);
            } else {
                remaining.push(outbreak);
            }
        }
        self.outbreaks = remaining;
        Ok(())
    }
}
