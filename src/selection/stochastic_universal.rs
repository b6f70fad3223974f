use tracing::warn;

use crate::error::Result;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::rank::{is_degenerate, RankExponentialScaling};
use crate::selection::selection_strategy::SelectionStrategy;

/// Stochastic universal sampling over rank-exponential shares.
///
/// One uniform offset in `[0, step)` with `step = total / N` places `N`
/// evenly spaced pointers on the cumulative scale. Each position is picked
/// within one of its expected count, and a single forward walk over the
/// scale makes the pass `O(N)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankExponentialSUS {
    scaling: RankExponentialScaling,
}

impl RankExponentialSUS {
    /// # Errors
    ///
    /// Returns a `GeneticError::Configuration` error if `c` is not in `(0, 1)`.
    pub fn new(c: f64) -> Result<Self> {
        Ok(Self {
            scaling: RankExponentialScaling::new(c)?,
        })
    }

    pub fn scaling(&self) -> &RankExponentialScaling {
        &self.scaling
    }

    fn exponential_sus(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        let size = population.len();
        let cumulative = self.scaling.cumulative(size);
        let total = cumulative.last().copied().unwrap_or(0.0);

        if is_degenerate(total) {
            warn!(size, c = self.scaling.c(), "degenerate rank distribution, selection skipped");
            return Ok(population);
        }

        let step = total / size as f64;
        let offset = rng.uniform_in(0.0, step);
        let mating_pool = sample_positions(&cumulative, size, offset, step)
            .into_iter()
            .map(|i| population.chromosomes()[i].clone())
            .collect();
        population.update_chromosomes(mating_pool)
    }
}

/// Indices hit by `count` pointers at `offset + k * step` on a cumulative scale.
///
/// The walk only moves forward. Pointers past the last entry, which only
/// floating-point error can produce, take the last entry.
pub fn sample_positions(cumulative: &[f64], count: usize, offset: f64, step: f64) -> Vec<usize> {
    let mut selected = Vec::with_capacity(count);
    if cumulative.is_empty() {
        return selected;
    }
    let last = cumulative.len() - 1;
    let mut position = 0;
    for k in 0..count {
        let pointer = offset + k as f64 * step;
        while position < last && cumulative[position] < pointer {
            position += 1;
        }
        selected.push(position);
    }
    selected
}

impl SelectionStrategy for RankExponentialSUS {
    fn name(&self) -> String {
        format!("RankExponentialSUS(c={})", self.scaling.c())
    }

    fn select(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        let ordered = self.scaling.rank_order(population, rng)?;
        self.exponential_sus(ordered, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{Chromosome, Genotype};

    fn ladder(size: usize) -> Population {
        let chromosomes = (0..size)
            .map(|i| Chromosome::new(Genotype::zeros(4), i as f64, i + 1))
            .collect();
        Population::new(chromosomes).unwrap()
    }

    #[test]
    fn test_sample_positions_uniform_scale() {
        let cumulative = vec![0.25, 0.5, 0.75, 1.0];
        assert_eq!(sample_positions(&cumulative, 4, 0.1, 0.25), vec![0, 1, 2, 3]);
        assert_eq!(sample_positions(&cumulative, 4, 0.0, 0.25), vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_sample_positions_skips_light_entries() {
        let cumulative = vec![0.0, 0.5, 0.5, 1.0];
        assert_eq!(sample_positions(&cumulative, 2, 0.2, 0.5), vec![1, 3]);
    }

    #[test]
    fn test_sample_positions_overshoot_takes_last() {
        let cumulative = vec![0.3, 0.6, 0.9999999];
        assert_eq!(sample_positions(&cumulative, 3, 0.3333334, 1.0 / 3.0), vec![1, 2, 2]);
    }

    #[test]
    fn test_sus_counts_within_one_of_expectation() {
        let scaling = RankExponentialScaling::new(0.9).unwrap();
        let size = 30;
        let cumulative = scaling.cumulative(size);
        let probabilities = scaling.probabilities(size);
        let step = 1.0 / size as f64;
        let mut rng = RandomNumberGenerator::from_seed(99);

        for _ in 0..200 {
            let offset = rng.uniform_in(0.0, step);
            let mut counts = vec![0usize; size];
            for i in sample_positions(&cumulative, size, offset, step) {
                counts[i] += 1;
            }
            for (count, p) in counts.iter().zip(&probabilities) {
                let expected = p * size as f64;
                assert!((*count as f64 - expected).abs() < 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_sus_preserves_size_and_keeps_fittest() {
        let mut rng = RandomNumberGenerator::from_seed(12);
        let selection = RankExponentialSUS::new(0.9801).unwrap();
        for size in [1, 2, 9, 100] {
            let pool = selection.select(ladder(size), &mut rng).unwrap();
            assert_eq!(pool.len(), size);
        }

        // the fittest of 100 expects ~2.3 copies, so it is never lost
        for _ in 0..50 {
            let pool = selection.select(ladder(100), &mut rng).unwrap();
            assert!(pool.keys().contains(&100));
        }
    }

    #[test]
    fn test_name_carries_constant() {
        let selection = RankExponentialSUS::new(0.95).unwrap();
        assert_eq!(selection.name(), "RankExponentialSUS(c=0.95)");
    }
}
