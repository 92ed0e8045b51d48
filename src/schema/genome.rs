//! Genome types: ordered action/duration sequences.

use serde::{Deserialize, Serialize};

use super::Action;

/// One (action, duration) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    /// Raw action id. Ids without a defined command replay as idle.
    pub action: u8,
    /// Ticks the action is held for. Generated and mutated genes hold for at
    /// least 1; caller-supplied populations with a zero are rejected.
    pub duration: u32,
}

impl Gene {
    pub fn new(action: u8, duration: u32) -> Self {
        Self { action, duration }
    }

    /// Decoded action.
    pub fn decoded(&self) -> Action {
        Action::from_id(self.action)
    }

    /// Render as `"<direction-name> for <duration> ticks"`.
    pub fn describe(&self) -> String {
        format!("{} for {} ticks", self.decoded().label(), self.duration)
    }
}

impl From<(u8, u32)> for Gene {
    fn from((action, duration): (u8, u32)) -> Self {
        Self::new(action, duration)
    }
}

/// Ordered sequence of genes replayed against an environment.
///
/// Genomes only grow: crossover recombines whole suffixes and mutation
/// rewrites genes in place, so no operation drops genes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    /// Append genes at the end.
    pub fn extend(&mut self, genes: impl IntoIterator<Item = Gene>) {
        self.genes.extend(genes);
    }

    /// Total ticks the genome would hold inputs for if replayed to the end.
    pub fn total_ticks(&self) -> u64 {
        self.genes.iter().map(|g| g.duration as u64).sum()
    }

    /// Human-readable action list.
    pub fn describe(&self) -> Vec<String> {
        self.genes.iter().map(Gene::describe).collect()
    }
}

impl From<Vec<(u8, u32)>> for Genome {
    fn from(pairs: Vec<(u8, u32)>) -> Self {
        Self::new(pairs.into_iter().map(Gene::from).collect())
    }
}

impl FromIterator<Gene> for Genome {
    fn from_iter<I: IntoIterator<Item = Gene>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
