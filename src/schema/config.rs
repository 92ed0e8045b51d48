//! Configuration types for the evolutionary search.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Action;

/// Top-level configuration for a search run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Initial genome shape.
    #[serde(default)]
    pub genome: GenomeConfig,
    /// Periodic genome growth.
    #[serde(default)]
    pub growth: GrowthConfig,
    /// Tournament selection settings.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Per-gene mutation settings.
    #[serde(default)]
    pub mutation: MutationConfig,
    /// Fitness bonuses and normalization.
    #[serde(default)]
    pub fitness: FitnessConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Population size and generation budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Individuals per generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of generations to run.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            max_generations: default_max_generations(),
        }
    }
}

fn default_population_size() -> usize {
    20
}
fn default_max_generations() -> usize {
    100
}

/// Shape of freshly generated genomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Number of genes in a new genome.
    #[serde(default = "default_initial_length")]
    pub initial_length: usize,
    /// Inclusive action id range. Ids past the defined actions replay as idle.
    #[serde(default = "default_initial_action_bounds")]
    pub action_bounds: (u8, u8),
    /// Inclusive duration range in ticks.
    #[serde(default = "default_initial_duration_bounds")]
    pub duration_bounds: (u32, u32),
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            initial_length: default_initial_length(),
            action_bounds: default_initial_action_bounds(),
            duration_bounds: default_initial_duration_bounds(),
        }
    }
}

fn default_initial_length() -> usize {
    1000
}
fn default_initial_action_bounds() -> (u8, u8) {
    (0, 6)
}
fn default_initial_duration_bounds() -> (u32, u32) {
    (5, 30)
}

/// Periodic genome growth applied before evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Growth fires on generations where `generation % interval == 0`.
    #[serde(default = "default_growth_interval")]
    pub interval: usize,
    /// Genes appended to every genome when growth fires.
    #[serde(default = "default_growth_increment")]
    pub increment: usize,
    /// Inclusive action id range for appended genes.
    #[serde(default = "default_growth_action_bounds")]
    pub action_bounds: (u8, u8),
    /// Inclusive duration range for appended genes.
    #[serde(default = "default_short_duration_bounds")]
    pub duration_bounds: (u32, u32),
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            interval: default_growth_interval(),
            increment: default_growth_increment(),
            action_bounds: default_growth_action_bounds(),
            duration_bounds: default_short_duration_bounds(),
        }
    }
}

fn default_growth_interval() -> usize {
    10
}
fn default_growth_increment() -> usize {
    500
}
fn default_growth_action_bounds() -> (u8, u8) {
    (0, 3)
}
fn default_short_duration_bounds() -> (u32, u32) {
    (1, 5)
}

/// Tournament selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Distinct contestants drawn per tournament.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tournament_size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    5
}

/// Per-gene neighbor mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Probability that a gene is perturbed (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub rate: f64,
    /// Mutated actions wrap modulo this value.
    #[serde(default = "default_action_modulus")]
    pub action_modulus: u8,
    /// Mutated durations are clamped into this inclusive range.
    #[serde(default = "default_short_duration_bounds")]
    pub duration_bounds: (u32, u32),
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: default_mutation_rate(),
            action_modulus: default_action_modulus(),
            duration_bounds: default_short_duration_bounds(),
        }
    }
}

fn default_mutation_rate() -> f64 {
    0.05
}
fn default_action_modulus() -> u8 {
    Action::DEFINED
}

/// Bonuses added to the replayed score and the normalization divisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Added once when any step reported time remaining.
    #[serde(default = "default_time_bonus")]
    pub time_bonus: f64,
    /// Added per rightward step.
    #[serde(default = "default_rightward_bonus")]
    pub rightward_bonus: f64,
    /// Final score is divided by this.
    #[serde(default = "default_normalization")]
    pub normalization: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            time_bonus: default_time_bonus(),
            rightward_bonus: default_rightward_bonus(),
            normalization: default_normalization(),
        }
    }
}

fn default_time_bonus() -> f64 {
    500.0
}
fn default_rightward_bonus() -> f64 {
    10.0
}
fn default_normalization() -> f64 {
    10000.0
}

impl EvolutionConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of tournament winners kept each generation.
    #[inline]
    pub fn survivor_count(&self) -> usize {
        self.population.size / 2
    }

    /// Number of offspring bred each generation.
    #[inline]
    pub fn offspring_count(&self) -> usize {
        self.population.size - self.survivor_count()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.population.size;
        let tournament = self.selection.tournament_size;
        if tournament == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if size < tournament {
            return Err(ConfigError::PopulationSmallerThanTournament {
                population: size,
                tournament,
            });
        }
        if self.survivor_count() < 2 {
            return Err(ConfigError::TooFewSurvivors {
                survivors: self.survivor_count(),
            });
        }
        if self.population.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.genome.initial_length < 2 {
            return Err(ConfigError::GenomeTooShort {
                length: self.genome.initial_length,
            });
        }
        if self.growth.interval == 0 {
            return Err(ConfigError::InvalidGrowthInterval);
        }
        check_bounds("genome.action_bounds", self.genome.action_bounds)?;
        check_durations("genome.duration_bounds", self.genome.duration_bounds)?;
        check_bounds("growth.action_bounds", self.growth.action_bounds)?;
        check_durations("growth.duration_bounds", self.growth.duration_bounds)?;
        check_durations("mutation.duration_bounds", self.mutation.duration_bounds)?;
        if !(0.0..=1.0).contains(&self.mutation.rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation.rate));
        }
        if self.mutation.action_modulus == 0 {
            return Err(ConfigError::InvalidActionModulus);
        }
        let normalization = self.fitness.normalization;
        if !(normalization.is_finite() && normalization > 0.0) {
            return Err(ConfigError::InvalidNormalization(normalization));
        }
        check_finite("fitness.time_bonus", self.fitness.time_bonus)?;
        check_finite("fitness.rightward_bonus", self.fitness.rightward_bonus)?;
        Ok(())
    }
}

fn check_bounds<T: PartialOrd>(field: &'static str, bounds: (T, T)) -> Result<(), ConfigError> {
    if bounds.0 > bounds.1 {
        return Err(ConfigError::InvertedBounds { field });
    }
    Ok(())
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteBonus { field, value });
    }
    Ok(())
}

fn check_durations(field: &'static str, bounds: (u32, u32)) -> Result<(), ConfigError> {
    check_bounds(field, bounds)?;
    if bounds.0 == 0 {
        return Err(ConfigError::ZeroDuration { field });
    }
    Ok(())
}

/// Configuration errors. Fatal: a run never starts or continues with one.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Tournament size must be non-zero")]
    EmptyTournament,
    #[error("Population of {population} is smaller than tournament size {tournament}")]
    PopulationSmallerThanTournament { population: usize, tournament: usize },
    #[error("At least two survivors are needed to breed, got {survivors}")]
    TooFewSurvivors { survivors: usize },
    #[error("Generation budget must be non-zero")]
    NoGenerations,
    #[error("Genome of length {length} is too short for crossover (need at least 2)")]
    GenomeTooShort { length: usize },
    #[error("Population has {actual} individuals, expected {expected}")]
    PopulationSizeMismatch { expected: usize, actual: usize },
    #[error("Cannot sample {requested} distinct items from {available}")]
    SampleTooLarge { requested: usize, available: usize },
    #[error("Growth interval must be non-zero")]
    InvalidGrowthInterval,
    #[error("Bounds for {field} are inverted")]
    InvertedBounds { field: &'static str },
    #[error("Bounds for {field} allow a zero-tick duration")]
    ZeroDuration { field: &'static str },
    #[error("Mutation rate {0} is outside [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Mutation action modulus must be non-zero")]
    InvalidActionModulus,
    #[error("Fitness normalization {0} must be positive and finite")]
    InvalidNormalization(f64),
    #[error("Bonus {field} must be finite, got {value}")]
    NonFiniteBonus { field: &'static str, value: f64 },
    #[error("Crossover cut {cut} is outside 1..={max}")]
    CutOutOfRange { cut: usize, max: usize },
    #[error("Gene {index} of individual {id} has a zero-tick duration")]
    ZeroDurationGene { id: u64, index: usize },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EvolutionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.population.size, 20);
        assert_eq!(config.population.max_generations, 100);
        assert_eq!(config.genome.initial_length, 1000);
        assert_eq!(config.selection.tournament_size, 5);
        assert_eq!(config.growth.interval, 10);
        assert_eq!(config.growth.increment, 500);
        assert_eq!(config.mutation.duration_bounds, (1, 5));
    }

    #[test]
    fn test_population_smaller_than_tournament() {
        let mut config = EvolutionConfig::default();
        config.population.size = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationSmallerThanTournament {
                population: 4,
                tournament: 5
            })
        ));
    }

    #[test]
    fn test_odd_population_counts() {
        let mut config = EvolutionConfig::default();
        config.population.size = 7;
        assert_eq!(config.survivor_count(), 3);
        assert_eq!(config.offspring_count(), 4);
        assert_eq!(config.survivor_count() + config.offspring_count(), 7);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = EvolutionConfig::default();
        config.mutation.rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationRate(_))
        ));

        let mut config = EvolutionConfig::default();
        config.growth.duration_bounds = (0, 5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroDuration { .. })
        ));

        let mut config = EvolutionConfig::default();
        config.genome.action_bounds = (5, 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_fitness_terms() {
        let mut config = EvolutionConfig::default();
        config.fitness.normalization = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNormalization(_))
        ));

        let mut config = EvolutionConfig::default();
        config.fitness.normalization = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNormalization(_))
        ));

        let mut config = EvolutionConfig::default();
        config.fitness.time_bonus = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteBonus {
                field: "fitness.time_bonus",
                ..
            })
        ));

        let mut config = EvolutionConfig::default();
        config.fitness.rightward_bonus = f64::NEG_INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteBonus {
                field: "fitness.rightward_bonus",
                ..
            })
        ));
    }

    #[test]
    fn test_action_modulus_matches_defined_actions() {
        assert_eq!(MutationConfig::default().action_modulus, Action::DEFINED);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"population": {{"size": 8}}, "random_seed": 7}}"#
        )
        .unwrap();

        let config = EvolutionConfig::from_path(file.path()).unwrap();
        assert_eq!(config.population.size, 8);
        assert_eq!(config.population.max_generations, 100);
        assert_eq!(config.random_seed, Some(7));
        assert!((config.mutation.rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_from_path_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"population": {{"size": 3}}}}"#).unwrap();
        assert!(EvolutionConfig::from_path(file.path()).is_err());
    }
}
