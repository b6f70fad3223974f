pub mod chromosome;
pub mod codec;
pub mod error;
pub mod evolution;
pub mod experiment;
pub mod fitness;
pub mod population;
#[cfg(feature = "serde")]
pub mod report;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use chromosome::{Chromosome, Genotype};
pub use error::{GeneticError, IoResultExt, OptionExt, Result, ResultExt};
pub use evolution::{EvolutionLauncher, EvolutionOptions, Termination};
pub use fitness::FitnessFunction;
pub use population::Population;
pub use selection::{RankExponentialRWS, RankExponentialSUS, Selection, SelectionStrategy};
