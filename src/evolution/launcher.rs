use std::collections::HashSet;

use tracing::{debug, info, instrument};

use super::{
    options::{EvolutionOptions, LogLevel},
    statistics::{selection_intensity, NoiseStats, RunSummary, RunTrace},
};
use crate::{
    error::{GeneticError, Result},
    fitness::{FitnessFunction, LandscapeKind},
    population::{DistributionSnapshot, Population},
    rng::RandomNumberGenerator,
    selection::SelectionStrategy,
};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The convergence test held at `generation` (the takeover time `NI`).
    Converged { generation: usize },
    /// The generation cap was reached first.
    CappedOut { generation: usize },
}

impl Termination {
    pub fn generation(&self) -> usize {
        match self {
            Termination::Converged { generation } | Termination::CappedOut { generation } => {
                *generation
            }
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Termination::Converged { .. })
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub termination: Termination,
    pub trace: RunTrace,
    pub summary: RunSummary,
    pub snapshots: Vec<DistributionSnapshot>,
    pub final_population: Population,
}

/// Runs the generation loop of one landscape under one selection strategy.
///
/// Each generation applies selection, crossover and mutation in that order,
/// then tests for convergence. All mutable state is the population value
/// threaded through the loop, so independent runs can share a launcher.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher<S>
where
    S: SelectionStrategy,
{
    selection: S,
    fitness: FitnessFunction,
    options: EvolutionOptions,
}

impl<S> EvolutionLauncher<S>
where
    S: SelectionStrategy,
{
    /// Creates a new `EvolutionLauncher`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if `options` fail validation.
    pub fn new(selection: S, fitness: FitnessFunction, options: EvolutionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            selection,
            fitness,
            options,
        })
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    pub fn fitness(&self) -> &FitnessFunction {
        &self.fitness
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    /// Evolves `population` until convergence or the generation cap.
    ///
    /// Runs with `run_index < runs_to_report` capture distribution snapshots
    /// of their first `iterations_to_report` generations and of the final one.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - the population size differs from the configured size
    /// - selection or crossover fail
    #[instrument(
        level = "debug",
        skip(self, population, rng),
        fields(landscape = self.fitness.name(), selection = %self.selection.name())
    )]
    pub fn run(
        &self,
        population: Population,
        run_index: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<RunOutcome> {
        let size = self.options.get_population_size();
        if population.len() != size {
            return Err(GeneticError::PopulationSizeMismatch {
                expected: size,
                actual: population.len(),
            });
        }

        let mutation_rate = self.options.get_mutation_rate();
        let crossover_rate = self.options.get_crossover_rate();
        let threshold = self.options.get_homogeneity_threshold();
        let cap = self.options.get_num_generations();
        let reported = run_index < self.options.get_runs_to_report();

        let mut population = population;
        let mut trace = RunTrace::new(&population);
        let mut snapshots = Vec::new();
        let mut generation = 0;
        let mut convergent = population.estimate_convergence(mutation_rate, threshold);

        while !convergent && generation < cap {
            if reported && generation < self.options.get_iterations_to_report() {
                snapshots.push(population.snapshot(&self.fitness, generation));
            }

            population = population.rekey();
            let mean_before = population.mean_fitness();
            let std_before = population.fitness_std();
            let parents: HashSet<usize> = population.keys().into_iter().collect();

            population = self.selection.select(population, rng)?;

            let survivors: HashSet<usize> = population.keys().into_iter().collect();
            let discarded = parents.difference(&survivors).count();
            let differential = population.mean_fitness() - mean_before;

            population = population
                .crossover(&self.fitness, crossover_rate, rng)?
                .mutate(&self.fitness, mutation_rate, rng);
            generation += 1;

            trace.record_state(&population);
            trace.record_selection(
                differential,
                selection_intensity(differential, std_before),
                1.0 - discarded as f64 / size as f64,
            );
            let rate = self.options.get_growth_rate().rate(
                trace.best_copies[generation],
                trace.best_fitness[generation],
                trace.best_copies[generation - 1],
                trace.best_fitness[generation - 1],
            );
            trace.record_growth(rate, size);

            if let LogLevel::Verbose = self.options.get_log_level() {
                debug!(
                    generation,
                    mean = trace.mean_fitness[generation],
                    best = trace.best_fitness[generation],
                    copies = trace.best_copies[generation],
                    "generation complete"
                );
            }

            convergent = population.estimate_convergence(mutation_rate, threshold);
        }

        if reported {
            snapshots.push(population.snapshot(&self.fitness, generation));
        }

        let termination = if convergent {
            Termination::Converged { generation }
        } else {
            Termination::CappedOut { generation }
        };
        let success = convergent && self.check_success(&population)?;
        let ni = convergent.then_some(generation);
        let summary = RunSummary::from_trace(&trace, ni, success, size);

        if !matches!(self.options.get_log_level(), LogLevel::None) {
            info!(
                ?termination,
                success,
                best = summary.final_best_fitness,
                "run finished"
            );
        }

        Ok(RunOutcome {
            termination,
            trace,
            summary,
            snapshots,
            final_population: population,
        })
    }

    /// Landscape-specific success test of a final population.
    ///
    /// - drift: always `true`
    /// - Hamming: every individual is optimal without mutation, at least
    ///   `steady_state_share` of them with mutation
    /// - real-valued: some individual lies within tolerance of the optimum
    ///
    /// # Errors
    ///
    /// Returns an error if the optimal genotype cannot be built for the
    /// population's genotype length.
    pub fn check_success(&self, population: &Population) -> Result<bool> {
        match self.fitness.kind() {
            LandscapeKind::Drift => Ok(true),
            LandscapeKind::Binary => {
                let optimal = self.fitness.optimal_genotype(population.genotype_length())?;
                let copies = population.copies_of(&optimal);
                if self.options.get_mutation_rate() == 0.0 {
                    Ok(copies == population.len())
                } else {
                    let share = self.options.get_steady_state_share();
                    Ok(copies as f64 >= share * population.len() as f64)
                }
            }
            LandscapeKind::RealValued => {
                let tolerance = self.options.get_tolerance();
                Ok(population
                    .chromosomes()
                    .iter()
                    .any(|c| self.fitness.is_chromosome_successful(c, tolerance)))
            }
        }
    }

    /// Applies selection alone until every genotype is identical.
    ///
    /// Isolates the drift of the selection operator: with a constant
    /// landscape there is no fitness signal, so the genotype the population
    /// fixes on is decided by sampling noise only.
    ///
    /// # Errors
    ///
    /// Propagates selection errors.
    #[instrument(level = "debug", skip_all, fields(selection = %self.selection.name()))]
    pub fn calculate_noise(&self, population: Population, rng: &mut RandomNumberGenerator) -> Result<NoiseStats> {
        let cap = self.options.get_num_generations();
        let mut population = population;
        let mut generation = 0;

        while !population.is_identical() && generation < cap {
            population = self.selection.select(population, rng)?;
            generation += 1;
        }

        if population.is_identical() {
            debug!(generation, "drift fixed a genotype");
            Ok(NoiseStats {
                ni: Some(generation),
                converged_to: Some(population.chromosomes()[0].code().clone()),
            })
        } else {
            Ok(NoiseStats::default())
        }
    }
}
