//! Individuals, populations and tournament selection.

use std::cmp::Ordering;

use crate::schema::{ConfigError, Genome, GenomeConfig, GrowthConfig, IndividualSnapshot};

use super::genome::{RandomSource, grow, random_genome};

/// A genome plus its most recent fitness.
///
/// Comparison looks at fitness only.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Unique identifier.
    pub id: u64,
    /// The genome.
    pub genome: Genome,
    /// Normalized fitness. Zero until evaluated.
    pub fitness: f64,
    /// Generation created.
    pub generation: usize,
    /// Parent IDs.
    pub parents: Vec<u64>,
}

impl Individual {
    pub fn new(id: u64, genome: Genome, generation: usize) -> Self {
        Self {
            id,
            genome,
            fitness: 0.0,
            generation,
            parents: Vec::new(),
        }
    }

    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self) -> IndividualSnapshot {
        IndividualSnapshot {
            id: self.id,
            fitness: self.fitness,
            generation: self.generation,
            parents: self.parents.clone(),
            length: self.genome.len(),
            genome: self.genome.clone(),
            actions: self.genome.describe(),
        }
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.fitness == other.fitness
    }
}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.fitness.partial_cmp(&other.fitness)
    }
}

/// An ordered collection of individuals.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<Individual>,
}

impl Population {
    pub fn new(members: Vec<Individual>) -> Self {
        Self { members }
    }

    /// `size` individuals with fresh random genomes, ids starting at `first_id`.
    pub fn random<R: RandomSource + ?Sized>(
        rng: &mut R,
        size: usize,
        config: &GenomeConfig,
        first_id: u64,
    ) -> Self {
        let members = (0..size as u64)
            .map(|offset| Individual::new(first_id + offset, random_genome(rng, config), 0))
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Individual] {
        &mut self.members
    }

    /// First individual with maximum fitness.
    pub fn best(&self) -> Option<&Individual> {
        self.members.iter().reduce(|best, candidate| {
            if candidate.fitness > best.fitness {
                candidate
            } else {
                best
            }
        })
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|i| i.fitness).sum::<f64>() / self.members.len() as f64
    }

    pub fn mean_genome_length(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|i| i.genome.len()).sum::<usize>() as f64
            / self.members.len() as f64
    }

    /// Append fresh genes to every member when `generation` is on the growth
    /// cadence. Returns whether growth fired.
    pub fn grow_if_due<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        generation: usize,
        config: &GrowthConfig,
    ) -> bool {
        if config.interval == 0 || generation % config.interval != 0 {
            return false;
        }
        for individual in &mut self.members {
            grow(rng, &mut individual.genome, config);
        }
        true
    }

    /// Tournament selection.
    ///
    /// Runs `len / 2` tournaments. Each draws `tournament_size` distinct
    /// members and keeps the first one with maximum fitness. A member may win
    /// several tournaments; winners are cloned so no two slots share a genome.
    pub fn tournament_select<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        tournament_size: usize,
    ) -> Result<Vec<Individual>, ConfigError> {
        if tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.members.len() < tournament_size {
            return Err(ConfigError::PopulationSmallerThanTournament {
                population: self.members.len(),
                tournament: tournament_size,
            });
        }

        let mut winners = Vec::with_capacity(self.members.len() / 2);
        for _ in 0..self.members.len() / 2 {
            let contestants = rng.sample_indices(self.members.len(), tournament_size);
            let mut best = &self.members[contestants[0]];
            for &idx in &contestants[1..] {
                if self.members[idx].fitness > best.fitness {
                    best = &self.members[idx];
                }
            }
            winners.push(best.clone());
        }
        Ok(winners)
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
