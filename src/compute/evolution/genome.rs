//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, growth, crossover, and mutation operations.
//! All randomness flows through [`RandomSource`] so runs are reproducible
//! from a seed and operators can be driven by scripted draws in tests.

use rand::prelude::*;
use rand::seq::index;

use crate::schema::{ConfigError, Gene, Genome, GenomeConfig, GrowthConfig, MutationConfig};

/// Random draws used by the genetic operators.
pub trait RandomSource {
    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Uniform integer in `low..=high`.
    fn range_inclusive(&mut self, low: usize, high: usize) -> usize;

    /// `amount` distinct indices drawn uniformly from `0..len`.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for GenomeRng {
    fn chance(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount).into_vec()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn chance(&mut self, p: f64) -> bool {
        (**self).chance(p)
    }

    fn coin(&mut self) -> bool {
        (**self).coin()
    }

    fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
        (**self).range_inclusive(low, high)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (**self).sample_indices(len, amount)
    }
}

/// Draw `count` genes with actions and durations uniform in the given bounds.
pub fn random_genes<R: RandomSource + ?Sized>(
    rng: &mut R,
    count: usize,
    action_bounds: (u8, u8),
    duration_bounds: (u32, u32),
) -> Vec<Gene> {
    (0..count)
        .map(|_| {
            let action = rng.range_inclusive(action_bounds.0 as usize, action_bounds.1 as usize);
            let duration =
                rng.range_inclusive(duration_bounds.0 as usize, duration_bounds.1 as usize);
            Gene::new(action as u8, duration as u32)
        })
        .collect()
}

/// Generate a fresh genome.
pub fn random_genome<R: RandomSource + ?Sized>(rng: &mut R, config: &GenomeConfig) -> Genome {
    Genome::new(random_genes(
        rng,
        config.initial_length,
        config.action_bounds,
        config.duration_bounds,
    ))
}

/// Append `config.increment` fresh genes to `genome`.
pub fn grow<R: RandomSource + ?Sized>(rng: &mut R, genome: &mut Genome, config: &GrowthConfig) {
    genome.extend(random_genes(
        rng,
        config.increment,
        config.action_bounds,
        config.duration_bounds,
    ));
}

/// Single-point crossover with a cut drawn from `1..=len(parent1) - 1`.
pub fn crossover<R: RandomSource + ?Sized>(
    rng: &mut R,
    parent1: &Genome,
    parent2: &Genome,
) -> Result<(Genome, Genome), ConfigError> {
    if parent1.len() < 2 {
        return Err(ConfigError::GenomeTooShort {
            length: parent1.len(),
        });
    }
    let cut = rng.range_inclusive(1, parent1.len() - 1);
    crossover_at(parent1, parent2, cut)
}

/// Single-point crossover at a fixed cut.
///
/// The first child takes `parent1[..cut]` then `parent2[cut..]`, the second
/// `parent2[..cut]` then `parent1[cut..]`. When `parent2` is shorter than the
/// cut its prefix is the whole genome and its suffix is empty, so the
/// children's combined length always equals the parents'.
///
/// `cut` must lie in `1..=len(parent1) - 1`; anything else is
/// [`ConfigError::CutOutOfRange`].
pub fn crossover_at(
    parent1: &Genome,
    parent2: &Genome,
    cut: usize,
) -> Result<(Genome, Genome), ConfigError> {
    if parent1.len() < 2 {
        return Err(ConfigError::GenomeTooShort {
            length: parent1.len(),
        });
    }
    let max = parent1.len() - 1;
    if !(1..=max).contains(&cut) {
        return Err(ConfigError::CutOutOfRange { cut, max });
    }
    let (head1, tail1) = parent1.genes().split_at(cut);
    let (head2, tail2) = parent2.genes().split_at(cut.min(parent2.len()));

    let child1 = head1.iter().chain(tail2).copied().collect();
    let child2 = head2.iter().chain(tail1).copied().collect();
    Ok((child1, child2))
}

/// Perturb a gene toward a neighbor: action ±1 wrapped, duration ±1 clamped.
pub fn mutate_gene<R: RandomSource + ?Sized>(
    rng: &mut R,
    gene: Gene,
    config: &MutationConfig,
) -> Gene {
    let action_delta: i32 = if rng.coin() { 1 } else { -1 };
    let duration_delta: i64 = if rng.coin() { 1 } else { -1 };

    let modulus = config.action_modulus.max(1) as i32;
    let action = (gene.action as i32 + action_delta).rem_euclid(modulus) as u8;
    let (low, high) = config.duration_bounds;
    let duration = (gene.duration as i64 + duration_delta).clamp(low as i64, high as i64) as u32;
    Gene::new(action, duration)
}

/// Mutate a genome in place. Each gene is perturbed with probability `config.rate`.
pub fn mutate<R: RandomSource + ?Sized>(
    rng: &mut R,
    genome: &mut Genome,
    config: &MutationConfig,
) {
    for gene in genome.genes_mut() {
        if rng.chance(config.rate) {
            *gene = mutate_gene(rng, *gene, config);
        }
    }
}

/// Fraction of positions at which two genomes differ, counting the length
/// difference as mismatches.
pub fn genome_distance(g1: &Genome, g2: &Genome) -> f64 {
    let longest = g1.len().max(g2.len());
    if longest == 0 {
        return 0.0;
    }
    let mismatched = g1
        .genes()
        .iter()
        .zip(g2.genes())
        .filter(|(a, b)| a != b)
        .count();
    let overhang = longest - g1.len().min(g2.len());
    (mismatched + overhang) as f64 / longest as f64
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Replays scripted draws; panics when a draw was not scripted.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        pub chances: VecDeque<bool>,
        pub coins: VecDeque<bool>,
        pub ranges: VecDeque<usize>,
        pub samples: VecDeque<Vec<usize>>,
    }

    impl RandomSource for ScriptedSource {
        fn chance(&mut self, _p: f64) -> bool {
            self.chances.pop_front().expect("unscripted chance draw")
        }

        fn coin(&mut self) -> bool {
            self.coins.pop_front().expect("unscripted coin draw")
        }

        fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
            let value = self.ranges.pop_front().expect("unscripted range draw");
            assert!((low..=high).contains(&value), "{value} outside {low}..={high}");
            value
        }

        fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
            let sample = self.samples.pop_front().expect("unscripted sample draw");
            assert_eq!(sample.len(), amount);
            assert!(sample.iter().all(|&i| i < len));
            sample
        }
    }

    #[test]
    fn test_random_genome() {
        let mut rng = GenomeRng::new(42);
        let config = GenomeConfig::default();

        let genome = random_genome(&mut rng, &config);
        assert_eq!(genome.len(), 1000);
        assert!(genome.genes().iter().all(|g| g.action <= 6));
        assert!(genome.genes().iter().all(|g| (5..=30).contains(&g.duration)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = GenomeConfig::default();
        let a = random_genome(&mut GenomeRng::new(9), &config);
        let b = random_genome(&mut GenomeRng::new(9), &config);
        let c = random_genome(&mut GenomeRng::new(10), &config);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_grow_appends_short_genes() {
        let mut rng = GenomeRng::new(1);
        let mut genome = Genome::from(vec![(6, 30), (5, 29)]);
        grow(&mut rng, &mut genome, &GrowthConfig::default());

        assert_eq!(genome.len(), 502);
        assert_eq!(genome.genes()[0], Gene::new(6, 30));
        assert!(genome.genes()[2..].iter().all(|g| g.action <= 3));
        assert!(genome.genes()[2..].iter().all(|g| (1..=5).contains(&g.duration)));
    }

    #[test]
    fn test_crossover_at_fixed_cut() {
        let parent1 = Genome::from(vec![(0, 5), (1, 6), (2, 7)]);
        let parent2 = Genome::from(vec![(3, 8), (0, 9), (1, 10)]);

        let (child1, child2) = crossover_at(&parent1, &parent2, 1).unwrap();
        assert_eq!(child1, Genome::from(vec![(0, 5), (0, 9), (1, 10)]));
        assert_eq!(child2, Genome::from(vec![(3, 8), (1, 6), (2, 7)]));
    }

    #[test]
    fn test_crossover_draws_cut_from_parent1() {
        let parent1 = Genome::from(vec![(0, 5), (1, 6), (2, 7)]);
        let parent2 = Genome::from(vec![(3, 8), (0, 9), (1, 10)]);
        let mut rng = ScriptedSource {
            ranges: VecDeque::from([2]),
            ..Default::default()
        };

        let (child1, child2) = crossover(&mut rng, &parent1, &parent2).unwrap();
        assert_eq!(child1, Genome::from(vec![(0, 5), (1, 6), (1, 10)]));
        assert_eq!(child2, Genome::from(vec![(3, 8), (0, 9), (2, 7)]));
    }

    #[test]
    fn test_crossover_short_parent2() {
        let parent1 = Genome::from(vec![(0, 1), (0, 2), (0, 3), (0, 4)]);
        let parent2 = Genome::from(vec![(1, 1)]);

        let (child1, child2) = crossover_at(&parent1, &parent2, 3).unwrap();
        assert_eq!(child1, Genome::from(vec![(0, 1), (0, 2), (0, 3)]));
        assert_eq!(child2, Genome::from(vec![(1, 1), (0, 4)]));
    }

    #[test]
    fn test_crossover_rejects_cut_outside_parent1() {
        let parent1 = Genome::from(vec![(0, 5), (1, 6), (2, 7)]);
        let parent2 = Genome::from(vec![(3, 8), (0, 9), (1, 10)]);

        for cut in [0, 3, 10] {
            assert!(matches!(
                crossover_at(&parent1, &parent2, cut),
                Err(ConfigError::CutOutOfRange { max: 2, .. })
            ));
        }
        assert!(crossover_at(&parent1, &parent2, 2).is_ok());
    }

    #[test]
    fn test_crossover_rejects_short_parent1() {
        let parent1 = Genome::from(vec![(0, 1)]);
        let parent2 = Genome::from(vec![(1, 1), (1, 2)]);
        let mut rng = GenomeRng::new(0);
        assert!(matches!(
            crossover(&mut rng, &parent1, &parent2),
            Err(ConfigError::GenomeTooShort { length: 1 })
        ));
    }

    #[test]
    fn test_mutation_scripted_neighbor() {
        let mut genome = Genome::from(vec![(2, 5)]);
        let mut rng = ScriptedSource {
            chances: VecDeque::from([true]),
            coins: VecDeque::from([true, true]),
            ..Default::default()
        };

        mutate(&mut rng, &mut genome, &MutationConfig::default());
        assert_eq!(genome, Genome::from(vec![(3, 5)]));
    }

    #[test]
    fn test_mutation_wraps_action_down() {
        let mut rng = ScriptedSource {
            coins: VecDeque::from([false, false]),
            ..Default::default()
        };
        let gene = mutate_gene(&mut rng, Gene::new(0, 1), &MutationConfig::default());
        assert_eq!(gene, Gene::new(3, 1));
    }

    #[test]
    fn test_mutation_skips_unselected_genes() {
        let mut genome = Genome::from(vec![(6, 30), (2, 5)]);
        let mut rng = ScriptedSource {
            chances: VecDeque::from([false, false]),
            ..Default::default()
        };
        mutate(&mut rng, &mut genome, &MutationConfig::default());
        assert_eq!(genome, Genome::from(vec![(6, 30), (2, 5)]));
    }

    #[test]
    fn test_mutation_collapses_long_durations() {
        let mut rng = GenomeRng::new(42);
        let mut genome = random_genome(&mut rng, &GenomeConfig::default());
        let config = MutationConfig {
            rate: 1.0,
            ..Default::default()
        };

        mutate(&mut rng, &mut genome, &config);
        assert!(genome.genes().iter().all(|g| g.action < 4));
        assert!(genome.genes().iter().all(|g| (1..=5).contains(&g.duration)));
    }

    #[test]
    fn test_genome_distance() {
        let g1 = Genome::from(vec![(0, 1), (1, 2)]);
        let g2 = g1.clone();
        let g3 = Genome::from(vec![(0, 1), (2, 2), (3, 3), (3, 3)]);

        assert!(genome_distance(&g1, &g2).abs() < 1e-12);
        assert!((genome_distance(&g1, &g3) - 0.75).abs() < 1e-12);
    }

    fn arb_genome(max_len: usize) -> impl Strategy<Value = Genome> {
        prop::collection::vec((0u8..7, 1u32..31), 0..max_len).prop_map(Genome::from)
    }

    proptest! {
        #[test]
        fn prop_crossover_preserves_total_length(
            parent1 in arb_genome(64).prop_filter("crossable", |g| g.len() >= 2),
            parent2 in arb_genome(64),
            seed in any::<u64>(),
        ) {
            let mut rng = GenomeRng::new(seed);
            let (c1, c2) = crossover(&mut rng, &parent1, &parent2).unwrap();
            prop_assert_eq!(c1.len() + c2.len(), parent1.len() + parent2.len());
        }

        #[test]
        fn prop_crossover_cut_in_range(
            parent1 in arb_genome(64).prop_filter("crossable", |g| g.len() >= 2),
            parent2 in arb_genome(64),
            cut in 1usize..64,
        ) {
            prop_assume!(cut < parent1.len());
            let (c1, _) = crossover_at(&parent1, &parent2, cut).unwrap();
            prop_assert_eq!(&c1.genes()[..cut], &parent1.genes()[..cut]);
        }

        #[test]
        fn prop_mutation_duration_bound(
            genome in arb_genome(128),
            seed in any::<u64>(),
            rate in 0.0f64..=1.0,
        ) {
            let mut genome = genome;
            let before = genome.len();
            let mut rng = GenomeRng::new(seed);
            let original = genome.clone();
            let config = MutationConfig { rate, ..Default::default() };
            mutate(&mut rng, &mut genome, &config);

            prop_assert_eq!(genome.len(), before);
            for (old, new) in original.genes().iter().zip(genome.genes()) {
                if old != new {
                    prop_assert!((1..=5).contains(&new.duration));
                    prop_assert!(new.action < 4);
                }
            }
        }
    }
}
