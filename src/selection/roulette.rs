use tracing::warn;

use crate::error::Result;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::rank::{is_degenerate, RankExponentialScaling};
use crate::selection::selection_strategy::SelectionStrategy;

/// Roulette-wheel selection over rank-exponential shares.
///
/// Draws `N` independent samples with replacement. An individual may be
/// picked many times or not at all, even when its expected count is high,
/// which makes this the high-variance counterpart of
/// [`RankExponentialSUS`](crate::selection::RankExponentialSUS).
///
/// # Examples
///
/// ```
/// use evosel::fitness::FitnessFunction;
/// use evosel::rng::RandomNumberGenerator;
/// use evosel::selection::{RankExponentialRWS, SelectionStrategy};
///
/// let landscape = FitnessFunction::constant();
/// let mut rng = RandomNumberGenerator::from_seed(1);
/// let population = landscape.generate_population(10, 8, false, &mut rng).unwrap();
///
/// let selection = RankExponentialRWS::new(0.9801).unwrap();
/// let pool = selection.select(population, &mut rng).unwrap();
/// assert_eq!(pool.len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankExponentialRWS {
    scaling: RankExponentialScaling,
}

impl RankExponentialRWS {
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

    /// Resamples an already rank-ordered population.
    fn exponential_rws(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        let size = population.len();
        let scaled = self.scaling.probabilities(size);
        let total: f64 = scaled.iter().sum();

        if is_degenerate(total) {
            warn!(size, c = self.scaling.c(), "degenerate rank distribution, selection skipped");
            return Ok(population);
        }

        population.update_rws(&scaled, rng)
    }
}

impl SelectionStrategy for RankExponentialRWS {
    fn name(&self) -> String {
        format!("RankExponentialRWS(c={})", self.scaling.c())
    }

    fn select(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        let ordered = self.scaling.rank_order(population, rng)?;
        self.exponential_rws(ordered, rng)
    }
}
