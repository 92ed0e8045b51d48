//! Evolutionary search for action sequences.
//!
//! # Overview
//!
//! The search system consists of:
//!
//! - **Genome Operations** (`genome`): Random generation, growth, crossover, and mutation
//! - **Fitness Evaluation** (`fitness`): Replaying a genome against an [`Environment`]
//! - **Populations** (`population`): Individuals and tournament selection
//! - **Search Loop** (`search`): The generational engine
//!
//! # Example
//!
//! ```rust,no_run
//! use platformer_ga::compute::CourseEnvironment;
//! use platformer_ga::compute::evolution::EvolutionEngine;
//! use platformer_ga::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let mut env = CourseEnvironment::default();
//! let mut engine = EvolutionEngine::new(config).unwrap();
//! let result = engine
//!     .run_with_callback(&mut env, |progress| {
//!         println!("Generation {}: best fitness = {:.4}",
//!             progress.generation, progress.best_fitness);
//!     })
//!     .unwrap();
//!
//! println!("Best individual: {:.4}", result.best.fitness);
//! ```
//!
//! [`Environment`]: crate::compute::Environment

mod fitness;
mod genome;
mod population;
mod search;

pub use fitness::{FitnessEvaluator, ReplaySummary};
pub use genome::{
    GenomeRng, RandomSource, crossover, crossover_at, genome_distance, grow, mutate, mutate_gene,
    random_genes, random_genome,
};
pub use population::{Individual, Population};
pub use search::{EvolutionEngine, EvolutionError};
