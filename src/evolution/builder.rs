use crate::{
    error::{GeneticError, Result},
    fitness::FitnessFunction,
    selection::SelectionStrategy,
};

use super::{options::EvolutionOptions, EvolutionLauncher};

/// Fluent construction of an [`EvolutionLauncher`].
///
/// Options default to [`EvolutionOptions::default`]; selection and fitness
/// landscape are required.
///
/// ```rust
/// use evosel::evolution::{EvolutionLauncherBuilder, EvolutionOptions};
/// use evosel::fitness::FitnessFunction;
/// use evosel::selection::RankExponentialSUS;
///
/// let launcher = EvolutionLauncherBuilder::new()
///     .with_selection_strategy(RankExponentialSUS::new(0.9801).unwrap())
///     .with_fitness(FitnessFunction::constant())
///     .with_options(EvolutionOptions::default())
///     .build()
///     .unwrap();
/// assert_eq!(launcher.fitness().name(), "FConst");
/// ```
#[derive(Debug, Clone)]
pub struct EvolutionLauncherBuilder<S>
where
    S: SelectionStrategy,
{
    selection_strategy: Option<S>,
    fitness: Option<FitnessFunction>,
    options: Option<EvolutionOptions>,
}

impl<S> EvolutionLauncherBuilder<S>
where
    S: SelectionStrategy,
{
    pub fn new() -> Self {
        Self {
            selection_strategy: None,
            fitness: None,
            options: None,
        }
    }

    pub fn with_selection_strategy(mut self, selection_strategy: S) -> Self {
        self.selection_strategy = Some(selection_strategy);
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessFunction) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn with_options(mut self, options: EvolutionOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<EvolutionLauncher<S>> {
        let selection_strategy = self.selection_strategy.ok_or_else(|| {
            GeneticError::Configuration("Selection strategy not specified".to_string())
        })?;

        let fitness = self
            .fitness
            .ok_or_else(|| GeneticError::Configuration("Fitness landscape not specified".to_string()))?;

        EvolutionLauncher::new(selection_strategy, fitness, self.options.unwrap_or_default())
    }
}

impl<S> Default for EvolutionLauncherBuilder<S>
where
    S: SelectionStrategy,
{
    fn default() -> Self {
        Self::new()
    }
}
