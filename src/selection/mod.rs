pub mod rank;
pub mod roulette;
pub mod selection_strategy;
pub mod stochastic_universal;

pub use rank::RankExponentialScaling;
pub use roulette::RankExponentialRWS;
pub use selection_strategy::SelectionStrategy;
pub use stochastic_universal::{sample_positions, RankExponentialSUS};

use crate::{error::Result, population::Population, rng::RandomNumberGenerator};

/// Closed set of the rank-exponential strategies, for experiment grids.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    Rws(RankExponentialRWS),
    Sus(RankExponentialSUS),
}

impl Selection {
    pub fn rws(c: f64) -> Result<Self> {
        Ok(Selection::Rws(RankExponentialRWS::new(c)?))
    }

    pub fn sus(c: f64) -> Result<Self> {
        Ok(Selection::Sus(RankExponentialSUS::new(c)?))
    }

    pub fn scaling(&self) -> &RankExponentialScaling {
        match self {
            Selection::Rws(rws) => rws.scaling(),
            Selection::Sus(sus) => sus.scaling(),
        }
    }
}

impl SelectionStrategy for Selection {
    fn name(&self) -> String {
        match self {
            Selection::Rws(rws) => rws.name(),
            Selection::Sus(sus) => sus.name(),
        }
    }

    fn select(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<Population> {
        match self {
            Selection::Rws(rws) => rws.select(population, rng),
            Selection::Sus(sus) => sus.select(population, rng),
        }
    }
}

impl From<RankExponentialRWS> for Selection {
    fn from(value: RankExponentialRWS) -> Self {
        Selection::Rws(value)
    }
}

impl From<RankExponentialSUS> for Selection {
    fn from(value: RankExponentialSUS) -> Self {
        Selection::Sus(value)
    }
}
