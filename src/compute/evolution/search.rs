//! The generational search loop.

use std::time::Instant;

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::compute::environment::{Environment, EnvironmentError};
use crate::schema::{
    ConfigError, EvolutionConfig, EvolutionHistory, EvolutionProgress, EvolutionResult,
    EvolutionStats,
};

use super::fitness::FitnessEvaluator;
use super::genome::{GenomeRng, RandomSource, crossover, genome_distance, mutate};
use super::population::{Individual, Population};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine<R: RandomSource = GenomeRng> {
    config: EvolutionConfig,
    rng: R,
    evaluator: FitnessEvaluator,
    population: Population,
    best: Option<Individual>,
    history: EvolutionHistory,
    generation: usize,
    evaluations: u64,
    next_id: u64,
}

impl EvolutionEngine<GenomeRng> {
    /// Create a new evolution engine seeded from `config.random_seed`.
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        let rng = match config.random_seed {
            Some(seed) => GenomeRng::new(seed),
            None => GenomeRng::random(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> EvolutionEngine<R> {
    /// Create an engine drawing from a caller-supplied random source.
    pub fn with_rng(config: EvolutionConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let evaluator = FitnessEvaluator::new(config.fitness.clone());
        Ok(Self {
            config,
            rng,
            evaluator,
            population: Population::default(),
            best: None,
            history: EvolutionHistory::default(),
            generation: 0,
            evaluations: 0,
            next_id: 0,
        })
    }

    /// Replace the population with a caller-supplied one.
    ///
    /// Every gene must hold its action for at least one tick.
    pub fn with_population(mut self, population: Population) -> Result<Self, ConfigError> {
        if population.len() != self.config.population.size {
            return Err(ConfigError::PopulationSizeMismatch {
                expected: self.config.population.size,
                actual: population.len(),
            });
        }
        for individual in population.members() {
            let genes = individual.genome.genes();
            if let Some(index) = genes.iter().position(|g| g.duration == 0) {
                return Err(ConfigError::ZeroDurationGene {
                    id: individual.id,
                    index,
                });
            }
        }
        self.next_id = population
            .members()
            .iter()
            .map(|i| i.id + 1)
            .max()
            .unwrap_or(0);
        self.population = population;
        Ok(self)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best individual across all completed generations.
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    /// Number of generations completed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fill the population with random individuals.
    pub fn initialize(&mut self) {
        self.population = Population::random(
            &mut self.rng,
            self.config.population.size,
            &self.config.genome,
            self.next_id,
        );
        self.next_id += self.config.population.size as u64;
        self.generation = 0;
    }

    fn evaluate_sequential<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
    ) -> Result<(), EnvironmentError> {
        for individual in self.population.members_mut() {
            individual.fitness = self.evaluator.evaluate(env, &individual.genome)?;
            debug!("individual {} fitness {:.6}", individual.id, individual.fitness);
        }
        self.evaluations += self.population.len() as u64;
        Ok(())
    }

    fn evaluate_parallel<E, F>(&mut self, make_env: &F) -> Result<(), EnvironmentError>
    where
        E: Environment,
        F: Fn() -> E + Sync,
    {
        let evaluator = &self.evaluator;
        let scores: Vec<Result<f64, EnvironmentError>> = self
            .population
            .members()
            .par_iter()
            .map_init(make_env, |env, individual| {
                evaluator.evaluate(env, &individual.genome)
            })
            .collect();

        for (individual, score) in self.population.members_mut().iter_mut().zip(scores) {
            individual.fitness = score?;
            debug!("individual {} fitness {:.6}", individual.id, individual.fitness);
        }
        self.evaluations += self.population.len() as u64;
        Ok(())
    }

    /// Breed `count` children from `parents`, cutting the surplus of the
    /// last pair.
    fn recombine(
        &mut self,
        parents: &[Individual],
        count: usize,
    ) -> Result<Vec<Individual>, ConfigError> {
        if parents.len() < 2 {
            return Err(ConfigError::SampleTooLarge {
                requested: 2,
                available: parents.len(),
            });
        }

        let mut children = Vec::with_capacity(count + 1);
        while children.len() < count {
            let pair = self.rng.sample_indices(parents.len(), 2);
            let (mother, father) = (&parents[pair[0]], &parents[pair[1]]);
            let (genome1, genome2) = crossover(&mut self.rng, &mother.genome, &father.genome)?;

            for genome in [genome1, genome2] {
                let mut child = Individual::new(self.next_id, genome, self.generation + 1);
                child.parents = vec![mother.id, father.id];
                self.next_id += 1;
                children.push(child);
            }
        }
        children.truncate(count);
        Ok(children)
    }

    /// Select survivors, breed and mutate children, and replace the
    /// population with both.
    fn breed(&mut self) -> Result<(), ConfigError> {
        let survivors = self
            .population
            .tournament_select(&mut self.rng, self.config.selection.tournament_size)?;
        let mut children = self.recombine(&survivors, self.config.offspring_count())?;
        for child in &mut children {
            mutate(&mut self.rng, &mut child.genome, &self.config.mutation);
        }

        self.population = survivors.into_iter().chain(children).collect();
        Ok(())
    }

    /// Record the evaluated generation and update the best-so-far record.
    ///
    /// The candidate is the maximum over the whole evaluated generation,
    /// taken before breeding, so an individual that loses every tournament
    /// can still become the record.
    fn track(&mut self, grew: bool) -> EvolutionProgress {
        let generation_best = self.population.best().cloned();
        let generation_best_fitness = generation_best
            .as_ref()
            .map_or(f64::NEG_INFINITY, |i| i.fitness);

        if let Some(candidate) = generation_best {
            let improved = self
                .best
                .as_ref()
                .is_none_or(|best| candidate.fitness > best.fitness);
            if improved {
                self.best = Some(candidate);
            }
        }

        let avg_fitness = self.population.mean_fitness();
        let avg_genome_length = self.population.mean_genome_length();
        let diversity = self.compute_diversity();
        self.history
            .push(generation_best_fitness, avg_fitness, avg_genome_length, diversity);

        let best_fitness = self.best.as_ref().map_or(f64::NEG_INFINITY, |i| i.fitness);
        info!(
            "generation {}: best {:.6} (this generation {:.6}), mean {:.6}, mean length {:.1}",
            self.generation, best_fitness, generation_best_fitness, avg_fitness, avg_genome_length
        );
        if let Some(best) = &self.best {
            trace!("best actions: {:?}", best.genome.describe());
        }

        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            best_fitness,
            generation_best: generation_best_fitness,
            avg_fitness,
            avg_genome_length,
            grew,
        }
    }

    /// Mean pairwise genome distance.
    fn compute_diversity(&self) -> f64 {
        let members = self.population.members();
        if members.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0usize;
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                total_distance += genome_distance(&members[i].genome, &members[j].genome);
                count += 1;
            }
        }
        total_distance / count as f64
    }

    fn run_loop<F, C>(
        &mut self,
        mut evaluate: F,
        callback: C,
    ) -> Result<EvolutionResult, EvolutionError>
    where
        F: FnMut(&mut Self) -> Result<(), EnvironmentError>,
        C: Fn(&EvolutionProgress),
    {
        let start_time = Instant::now();
        if self.population.is_empty() {
            self.initialize();
        }

        while self.generation < self.config.population.max_generations {
            let grew = self
                .population
                .grow_if_due(&mut self.rng, self.generation, &self.config.growth);
            evaluate(self)?;
            let progress = self.track(grew);
            callback(&progress);

            self.breed()?;
            self.generation += 1;
        }

        let best = self.best.as_ref().ok_or(ConfigError::NoGenerations)?;
        let elapsed = start_time.elapsed().as_secs_f64();

        Ok(EvolutionResult {
            best: best.to_snapshot(),
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations: self.evaluations,
                best_fitness: best.fitness,
                elapsed_seconds: elapsed,
                evaluations_per_second: self.evaluations as f64 / elapsed.max(f64::EPSILON),
            },
            history: self.history.clone(),
        })
    }

    /// Run evolution with progress callback against one shared environment.
    pub fn run_with_callback<E, C>(
        &mut self,
        env: &mut E,
        callback: C,
    ) -> Result<EvolutionResult, EvolutionError>
    where
        E: Environment + ?Sized,
        C: Fn(&EvolutionProgress),
    {
        self.run_loop(|engine| engine.evaluate_sequential(env), callback)
    }

    /// Run evolution (blocking) against one shared environment.
    pub fn run<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
    ) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(env, |_| {})
    }

    /// Run evolution evaluating individuals in parallel. Each worker thread
    /// builds its own environment with `make_env`; none are shared.
    pub fn run_parallel<E, F, C>(
        &mut self,
        make_env: F,
        callback: C,
    ) -> Result<EvolutionResult, EvolutionError>
    where
        E: Environment,
        F: Fn() -> E + Sync,
        C: Fn(&EvolutionProgress),
    {
        self.run_loop(|engine| engine.evaluate_parallel(&make_env), callback)
    }
}
