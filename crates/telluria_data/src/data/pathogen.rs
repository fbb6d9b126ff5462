use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::entity::Diet;
use crate::data::terrain::Biome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathogenKind {
    Virus,
    Bacteria,
    Fungus,
    Parasite,
    Prion,
}

impl PathogenKind {
    /// Sampling weight for spontaneous emergence.
    pub fn emergence_weight(&self) -> f64 {
        match self {
            PathogenKind::Virus => 0.40,
            PathogenKind::Bacteria => 0.30,
            PathogenKind::Fungus => 0.15,
            PathogenKind::Parasite => 0.13,
            PathogenKind::Prion => 0.02,
        }
    }

    pub const ALL: [PathogenKind; 5] = [
        PathogenKind::Virus,
        PathogenKind::Bacteria,
        PathogenKind::Fungus,
        PathogenKind::Parasite,
        PathogenKind::Prion,
    ];
}

/// A strain circulating in the world. Parameters are normalised to
/// `[0, 1]` except where noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathogen {
    pub id: Uuid,
    pub name: String,
    pub kind: PathogenKind,
    pub origin_species: String,
    /// 1.0 binds the pathogen to its origin species; 0.0 jumps freely.
    pub host_specificity: f64,
    pub transmissibility: f64,
    pub virulence: f64,
    pub mutation_rate: f64,
    pub susceptible_diets: Vec<Diet>,
    pub is_endemic: bool,
    pub is_eradicated: bool,
    pub active_outbreaks: u32,
    pub emerged_year: i64,
}

impl Pathogen {
    pub fn affects_diet(&self, diet: Diet) -> bool {
        self.susceptible_diets.contains(&diet)
    }
}

/// One epidemic episode of a pathogen within a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbreak {
    pub id: Uuid,
    pub pathogen_id: Uuid,
    pub species: String,
    pub biome: Option<Biome>,
    pub start_year: i64,
    pub end_year: Option<i64>,
    pub current_infected: u64,
    pub total_infected: u64,
    pub total_deaths: u64,
    /// Case fatality pressure in `[0, 1]` for this episode.
    pub severity: f64,
    pub is_active: bool,
}

impl Outbreak {
    pub fn new(
        pathogen_id: Uuid,
        species: impl Into<String>,
        biome: Option<Biome>,
        start_year: i64,
        initial_infected: u64,
        severity: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pathogen_id,
            species: species.into(),
            biome,
            start_year,
            end_year: None,
            current_infected: initial_infected,
            total_infected: initial_infected,
            total_deaths: 0,
            severity,
            is_active: true,
        }
    }
}
