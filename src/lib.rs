//! Platformer GA - Genetic search for platformer action sequences.
//!
//! This crate evolves sequences of (action, duration) pairs that maximize
//! a game-progress fitness in a side-scrolling platformer. The game itself
//! sits behind the [`Environment`](compute::Environment) trait; the search
//! only resets it, steps it and reads scalar readouts back.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, genome and reporting types
//! - `compute`: The environment seam, a demo course, and the evolutionary search
//!
//! # Example
//!
//! ```rust,no_run
//! use platformer_ga::{CourseEnvironment, EvolutionConfig, EvolutionEngine};
//!
//! let mut env = CourseEnvironment::default();
//! let mut engine = EvolutionEngine::new(EvolutionConfig::default()).unwrap();
//! let result = engine.run(&mut env).unwrap();
//!
//! for line in result.best.actions.iter().take(5) {
//!     println!("{line}");
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, EvolutionError, Individual, Population};
pub use compute::{CourseEnvironment, Environment, StepOutcome, StepStatus};
pub use schema::{Action, EvolutionConfig, Gene, Genome};
