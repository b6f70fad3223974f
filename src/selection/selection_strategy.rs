use std::fmt::Debug;

use crate::error::Result;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// Trait for selection strategies.
///
/// A strategy takes ownership of the current generation and returns the
/// mating pool, which always has the same size as its input. Selected
/// chromosomes keep their keys, so the caller can tell which parents were
/// dropped.
///
/// # Examples
///
/// ```
/// use evosel::fitness::FitnessFunction;
/// use evosel::rng::RandomNumberGenerator;
/// use evosel::selection::{RankExponentialSUS, SelectionStrategy};
/// use evosel::error::Result;
///
/// fn main() -> Result<()> {
///     let landscape = FitnessFunction::hamming(100.0)?;
///     let mut rng = RandomNumberGenerator::from_seed(3);
///     let population = landscape.generate_population(20, 100, true, &mut rng)?;
///
///     let selection = RankExponentialSUS::new(0.9801)?;
///     let pool = selection.select(population, &mut rng)?;
///
///     assert_eq!(pool.len(), 20);
///     Ok(())
/// }
/// ```
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Human-readable name including parameters, used to key reports.
    fn name(&self) -> String;

    /// Selects `population.len()` individuals.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sampler cannot be built. A
    /// degenerate rank distribution is not an error: the population is
    /// returned unchanged.
    fn select(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population>;
}
