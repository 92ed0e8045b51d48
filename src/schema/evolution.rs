//! Reporting types produced by a search run.
//!
//! These are observational: the engine fills them in as it goes, and the
//! CLI prints or exports them. None of them feed back into the search.

use serde::{Deserialize, Serialize};

use super::Genome;

/// Serializable snapshot of one individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualSnapshot {
    /// Unique identifier within the run.
    pub id: u64,
    /// Normalized fitness from its last evaluation.
    pub fitness: f64,
    /// Generation the individual was created in.
    pub generation: usize,
    /// Parent IDs (empty for the initial population).
    pub parents: Vec<u64>,
    /// Number of genes.
    pub length: usize,
    /// The genome.
    pub genome: Genome,
    /// Rendered action list.
    pub actions: Vec<String>,
}

/// Progress update sent after every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generation just completed (0-based).
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best fitness seen so far.
    pub best_fitness: f64,
    /// Best fitness this generation.
    pub generation_best: f64,
    /// Mean fitness of the evaluated generation.
    pub avg_fitness: f64,
    /// Mean genome length of the evaluated generation.
    pub avg_genome_length: f64,
    /// Whether genomes grew before this generation's evaluation.
    pub grew: bool,
}

/// Per-generation statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Mean genome length per generation.
    pub avg_genome_length: Vec<f64>,
    /// Mean pairwise genome distance per generation.
    pub diversity: Vec<f64>,
}

/// Summary statistics for a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Total generations run.
    pub generations: usize,
    /// Total genome replays performed.
    pub total_evaluations: u64,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
}

/// Final result of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best individual across all generations.
    pub best: IndividualSnapshot,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Full history for analysis.
    pub history: EvolutionHistory,
}

impl EvolutionHistory {
    /// Record one generation.
    pub fn push(&mut self, best: f64, avg: f64, avg_length: f64, diversity: f64) {
        self.best_fitness.push(best);
        self.avg_fitness.push(avg);
        self.avg_genome_length.push(avg_length);
        self.diversity.push(diversity);
    }

    pub fn len(&self) -> usize {
        self.best_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_fitness.is_empty()
    }
}
