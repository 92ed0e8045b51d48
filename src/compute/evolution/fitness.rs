//! Fitness evaluation: replaying a genome against an environment.

use crate::compute::environment::{Environment, EnvironmentError, StepStatus};
use crate::schema::{FitnessConfig, Genome};

/// Raw tallies collected while replaying a genome.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplaySummary {
    /// Sum of per-step fitness readouts.
    pub fitness_total: f64,
    /// Largest time-remaining readout seen.
    pub time_max: u32,
    /// Steps taken with a rightward action.
    pub right_moves: u32,
    /// Steps actually executed before termination or the end of the genome.
    pub steps: usize,
    /// Last level progress reported.
    pub progress: u32,
    /// Whether replay stopped because the environment became terminal.
    pub terminated: bool,
}

/// Evaluates genomes and returns normalized fitness.
#[derive(Debug, Clone, Default)]
pub struct FitnessEvaluator {
    config: FitnessConfig,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(config: FitnessConfig) -> Self {
        Self { config }
    }

    /// Replay `genome` from a fresh reset and tally the readouts.
    pub fn replay<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        genome: &Genome,
    ) -> Result<ReplaySummary, EnvironmentError> {
        env.reset()?;
        let mut summary = ReplaySummary::default();

        for gene in genome.genes() {
            if env.is_terminal() {
                summary.terminated = true;
                break;
            }
            let action = gene.decoded();
            let outcome = env.step(action, gene.duration)?;

            match outcome.status {
                StepStatus::Terminal => {
                    if outcome.fitness != 0.0 || outcome.time_remaining != 0 {
                        return Err(EnvironmentError::NoOpViolated {
                            fitness: outcome.fitness,
                            time_remaining: outcome.time_remaining,
                        });
                    }
                    summary.terminated = true;
                    break;
                }
                StepStatus::Progress(progress) => summary.progress = progress,
            }
            if !outcome.fitness.is_finite() {
                return Err(EnvironmentError::MalformedReadout(outcome.fitness));
            }

            summary.fitness_total += outcome.fitness;
            summary.time_max = summary.time_max.max(outcome.time_remaining);
            if action.is_rightward() {
                summary.right_moves += 1;
            }
            summary.steps += 1;
        }

        Ok(summary)
    }

    /// Unnormalized score of a replay.
    pub fn score(&self, summary: &ReplaySummary) -> f64 {
        let time_bonus = if summary.time_max > 0 {
            self.config.time_bonus
        } else {
            0.0
        };
        summary.fitness_total + time_bonus + summary.right_moves as f64 * self.config.rightward_bonus
    }

    /// Replay `genome` and return its normalized fitness.
    pub fn evaluate<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        genome: &Genome,
    ) -> Result<f64, EnvironmentError> {
        let summary = self.replay(env, genome)?;
        Ok(self.score(&summary) / self.config.normalization)
    }
}
