use std::cmp::Ordering;

use crate::error::{ensure_finite, GeneticError, Result};
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// Rank-exponential scaling shared by the RWS and SUS strategies.
///
/// The population is shuffled, then stably sorted by ascending fitness, so
/// fitness ties end up in random order. Position `i` in `1..=N` (1 = least
/// fit, `N` = fittest) receives
///
/// ```text
/// p(i) = ((c - 1) / (c^N - 1)) * c^(N - i)
/// ```
///
/// a normalised geometric distribution in which the fittest individual has
/// the largest share and each step down the ranking multiplies the share by
/// `c`.
///
/// # Examples
///
/// ```
/// use evosel::selection::RankExponentialScaling;
///
/// let scaling = RankExponentialScaling::new(0.9801).unwrap();
/// let probabilities = scaling.probabilities(100);
/// let total: f64 = probabilities.iter().sum();
///
/// assert!((total - 1.0).abs() < 1e-12);
/// assert!(probabilities[99] > probabilities[0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankExponentialScaling {
    /// Smaller values increase selection pressure.
    c: f64,
}

impl RankExponentialScaling {
    /// Creates the scaling law for base `c`.
    ///
    /// # Errors
    ///
    /// Returns a `GeneticError::Configuration` error if `c` is not in `(0, 1)`.
    pub fn new(c: f64) -> Result<Self> {
        ensure_finite(c, "Rank scaling constant")?;
        if c <= 0.0 || c >= 1.0 {
            return Err(GeneticError::Configuration(format!(
                "Rank scaling constant must be in (0, 1), got {}",
                c
            )));
        }
        Ok(Self { c })
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Share of position `position` (1-based, ascending fitness) among `size`.
    pub fn scale(&self, size: usize, position: usize) -> f64 {
        let n = size as i32;
        ((self.c - 1.0) / (self.c.powi(n) - 1.0)) * self.c.powi(n - position as i32)
    }

    /// Shares of positions `1..=size`.
    pub fn probabilities(&self, size: usize) -> Vec<f64> {
        (1..=size).map(|position| self.scale(size, position)).collect()
    }

    /// Running sums of [`probabilities`](Self::probabilities).
    pub fn cumulative(&self, size: usize) -> Vec<f64> {
        let mut total = 0.0;
        self.probabilities(size)
            .into_iter()
            .map(|p| {
                total += p;
                total
            })
            .collect()
    }

    /// Shuffles, then stably sorts by ascending fitness.
    ///
    /// # Errors
    ///
    /// Propagates the errors of `Population::update_chromosomes`.
    pub fn rank_order(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        let mut chromosomes = population.chromosomes().to_vec();
        rng.shuffle(&mut chromosomes);
        chromosomes.sort_by(|a, b| {
            a.fitness()
                .partial_cmp(&b.fitness())
                .unwrap_or(Ordering::Equal)
        });
        population.update_chromosomes(chromosomes)
    }
}

/// True when a probability mass cannot be normalised.
pub(crate) fn is_degenerate(total: f64) -> bool {
    total == 0.0 || !total.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{Chromosome, Genotype};

    #[test]
    fn test_invalid_constant() {
        assert!(RankExponentialScaling::new(0.0).is_err());
        assert!(RankExponentialScaling::new(1.0).is_err());
        assert!(RankExponentialScaling::new(1.5).is_err());
        assert!(RankExponentialScaling::new(f64::NAN).is_err());
        assert!(RankExponentialScaling::new(0.95).is_ok());
    }

    #[test]
    fn test_probabilities_are_geometric() {
        let scaling = RankExponentialScaling::new(0.9).unwrap();
        let probabilities = scaling.probabilities(5);
        for window in probabilities.windows(2) {
            assert!((window[0] / window[1] - 0.9).abs() < 1e-12);
        }
        assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_individual_gets_everything() {
        let scaling = RankExponentialScaling::new(0.5).unwrap();
        assert!((scaling.scale(1, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_ends_at_one() {
        let scaling = RankExponentialScaling::new(0.9801).unwrap();
        let cumulative = scaling.cumulative(100);
        assert_eq!(cumulative.len(), 100);
        assert!((cumulative[99] - 1.0).abs() < 1e-9);
        for window in cumulative.windows(2) {
            assert!(window[1] >= window[0]);
        }
    }

    #[test]
    fn test_rank_order_sorts_ascending() {
        let chromosomes = [3.0, 1.0, 2.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &f)| Chromosome::new(Genotype::zeros(2), f, i + 1))
            .collect();
        let population = Population::new(chromosomes).unwrap();
        let scaling = RankExponentialScaling::new(0.9).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(21);

        let ordered = scaling.rank_order(population, &mut rng).unwrap();
        assert_eq!(ordered.fitness_vector(), &[1.0, 1.0, 2.0, 3.0]);
        assert_eq!(ordered.chromosomes()[3].key(), 1);
    }

    #[test]
    fn test_rank_order_breaks_ties_randomly() {
        let chromosomes: Vec<Chromosome> = (0..10)
            .map(|i| Chromosome::new(Genotype::zeros(2), 1.0, i + 1))
            .collect();
        let population = Population::new(chromosomes).unwrap();
        let scaling = RankExponentialScaling::new(0.9).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(5);

        let mut last_keys = std::collections::HashSet::new();
        let mut current = population;
        for _ in 0..20 {
            current = scaling.rank_order(current, &mut rng).unwrap();
            last_keys.insert(current.chromosomes()[9].key());
        }
        assert!(last_keys.len() > 1);
    }

    #[test]
    fn test_degenerate_totals() {
        assert!(is_degenerate(0.0));
        assert!(is_degenerate(f64::NAN));
        assert!(!is_degenerate(1.0));
    }
}
