//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the configuration of one evolutionary
//! run: population size, generation cap, operator rates, convergence and
//! success thresholds, and how much of the run is logged and snapshotted.
//!
//! ## Example
//!
//! ```rust
//! use evosel::evolution::options::{EvolutionOptions, LogLevel};
//!
//! // Builder with validation
//! let options = EvolutionOptions::builder()
//!     .population_size(100)
//!     .num_generations(5_000)
//!     .mutation_rate(0.0001)
//!     .crossover_rate(1.0)
//!     .log_level(LogLevel::Minimal)
//!     .build()
//!     .unwrap();
//! assert_eq!(options.get_population_size(), 100);
//!
//! // Odd populations cannot be paired for crossover
//! assert!(EvolutionOptions::builder()
//!     .population_size(99)
//!     .crossover_rate(1.0)
//!     .build()
//!     .is_err());
//! ```
//!
//! ## Structs
//!
//! ### `EvolutionOptions`
//!
//! - `population_size`: number of individuals `N`, fixed for the run.
//! - `num_generations`: generation cap `G`.
//! - `mutation_rate`: per-locus flip probability `p_m`.
//! - `crossover_rate`: `0` or `1`, an on/off switch for crossover.
//! - `homogeneity_threshold`: percentage of identical genotypes that counts as
//!   convergence when mutation is on.
//! - `tolerance`: success tolerances of real-valued landscapes.
//! - `steady_state_share`: share of optimal copies that counts as success on
//!   the Hamming landscape when mutation is on.
//! - `growth_rate`: how the per-generation growth rate is derived.
//! - `log_level`: how much the run loop logs.
//! - `runs_to_report` / `iterations_to_report`: which runs and generations
//!   get distribution snapshots.
//!
//! ### `LogLevel`
//!
//! - `Verbose`: one event per generation.
//! - `Minimal`: one event per run.
//! - `None`: silent run loop.

use crate::error::{ensure_finite, ensure_probability, GeneticError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Verbose,
    Minimal,
    None,
}

/// Success tolerances for real-valued landscapes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    /// Allowed distance from the optimal `x`.
    pub sigma: f64,
    /// Allowed distance from the optimal fitness.
    pub delta: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            sigma: 0.01,
            delta: 0.01,
        }
    }
}

/// Derivation of the per-generation growth rate of the best genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrowthRateMetric {
    /// `copies_t / copies_{t-1}`.
    #[default]
    CopyRatio,
    /// `(copies_t * best_t) / (copies_{t-1} * best_{t-1})`.
    FitnessWeighted,
}

impl GrowthRateMetric {
    /// Ratio of consecutive generations; `NaN` when the previous term is zero.
    pub fn rate(&self, copies: usize, best: f64, previous_copies: usize, previous_best: f64) -> f64 {
        let (numerator, denominator) = match self {
            GrowthRateMetric::CopyRatio => (copies as f64, previous_copies as f64),
            GrowthRateMetric::FitnessWeighted => {
                (copies as f64 * best, previous_copies as f64 * previous_best)
            }
        };
        if denominator == 0.0 {
            f64::NAN
        } else {
            numerator / denominator
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionOptions {
    population_size: usize,
    num_generations: usize,
    mutation_rate: f64,
    crossover_rate: f64,
    homogeneity_threshold: f64,
    tolerance: Tolerance,
    steady_state_share: f64,
    growth_rate: GrowthRateMetric,
    log_level: LogLevel,
    runs_to_report: usize,
    iterations_to_report: usize,
}

impl EvolutionOptions {
    /// Creates options with the given core parameters and defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if the combination is invalid,
    /// see [`EvolutionOptions::validate`].
    pub fn new(
        population_size: usize,
        num_generations: usize,
        mutation_rate: f64,
        crossover_rate: f64,
    ) -> Result<Self> {
        Self::builder()
            .population_size(population_size)
            .num_generations(num_generations)
            .mutation_rate(mutation_rate)
            .crossover_rate(crossover_rate)
            .build()
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn get_homogeneity_threshold(&self) -> f64 {
        self.homogeneity_threshold
    }

    pub fn get_tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn get_steady_state_share(&self) -> f64 {
        self.steady_state_share
    }

    pub fn get_growth_rate(&self) -> GrowthRateMetric {
        self.growth_rate
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }

    pub fn get_runs_to_report(&self) -> usize {
        self.runs_to_report
    }

    pub fn get_iterations_to_report(&self) -> usize {
        self.iterations_to_report
    }

    /// Sets the generation cap.
    pub fn set_num_generations(&mut self, num_generations: usize) {
        self.num_generations = num_generations;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Sets the growth-rate metric.
    pub fn set_growth_rate(&mut self, growth_rate: GrowthRateMetric) {
        self.growth_rate = growth_rate;
    }

    /// Sets the snapshot budget.
    pub fn set_report_budget(&mut self, runs: usize, iterations: usize) {
        self.runs_to_report = runs;
        self.iterations_to_report = iterations;
    }

    /// Checks every precondition of a run.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if:
    /// - the population size or the generation cap is zero
    /// - a rate is not a probability, or the crossover rate is not 0 or 1
    /// - crossover is on and the population size is odd
    /// - the homogeneity threshold is not in `(0, 100)`
    /// - the steady-state share is not in `(0, 1]`
    /// - a tolerance is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if self.num_generations == 0 {
            return Err(GeneticError::Configuration(
                "Number of generations cannot be zero".to_string(),
            ));
        }
        ensure_probability(self.mutation_rate, "Mutation rate")?;
        ensure_probability(self.crossover_rate, "Crossover rate")?;
        if self.crossover_rate != 0.0 && self.crossover_rate != 1.0 {
            return Err(GeneticError::Configuration(format!(
                "Crossover rate is an on/off switch and must be 0 or 1, got {}",
                self.crossover_rate
            )));
        }
        if self.crossover_rate == 1.0 && self.population_size % 2 != 0 {
            return Err(GeneticError::Configuration(format!(
                "Crossover pairs individuals, population size {} is odd",
                self.population_size
            )));
        }
        ensure_finite(self.homogeneity_threshold, "Homogeneity threshold")?;
        if self.homogeneity_threshold <= 0.0 || self.homogeneity_threshold >= 100.0 {
            return Err(GeneticError::Configuration(format!(
                "Homogeneity threshold must be in (0, 100), got {}",
                self.homogeneity_threshold
            )));
        }
        ensure_finite(self.steady_state_share, "Steady-state share")?;
        if self.steady_state_share <= 0.0 || self.steady_state_share > 1.0 {
            return Err(GeneticError::Configuration(format!(
                "Steady-state share must be in (0, 1], got {}",
                self.steady_state_share
            )));
        }
        for (value, what) in [
            (self.tolerance.sigma, "Tolerance sigma"),
            (self.tolerance.delta, "Tolerance delta"),
        ] {
            ensure_finite(value, what)?;
            if value < 0.0 {
                return Err(GeneticError::Configuration(format!(
                    "{} cannot be negative, got {}",
                    what, value
                )));
            }
        }
        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use evosel::evolution::options::{EvolutionOptions, GrowthRateMetric, Tolerance};
    ///
    /// let options = EvolutionOptions::builder()
    ///     .population_size(50)
    ///     .tolerance(Tolerance { sigma: 0.05, delta: 0.5 })
    ///     .growth_rate(GrowthRateMetric::FitnessWeighted)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.get_tolerance().sigma, 0.05);
    /// ```
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: 100,
            num_generations: 10_000_000,
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            homogeneity_threshold: 99.0,
            tolerance: Tolerance::default(),
            steady_state_share: 0.9,
            growth_rate: GrowthRateMetric::CopyRatio,
            log_level: LogLevel::None,
            runs_to_report: 5,
            iterations_to_report: 5,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Unset fields fall back to [`EvolutionOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    num_generations: Option<usize>,
    mutation_rate: Option<f64>,
    crossover_rate: Option<f64>,
    homogeneity_threshold: Option<f64>,
    tolerance: Option<Tolerance>,
    steady_state_share: Option<f64>,
    growth_rate: Option<GrowthRateMetric>,
    log_level: Option<LogLevel>,
    runs_to_report: Option<usize>,
    iterations_to_report: Option<usize>,
}

impl EvolutionOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    pub fn crossover_rate(mut self, value: f64) -> Self {
        self.crossover_rate = Some(value);
        self
    }

    /// Percentage in `(0, 100)`.
    pub fn homogeneity_threshold(mut self, value: f64) -> Self {
        self.homogeneity_threshold = Some(value);
        self
    }

    pub fn tolerance(mut self, value: Tolerance) -> Self {
        self.tolerance = Some(value);
        self
    }

    pub fn steady_state_share(mut self, value: f64) -> Self {
        self.steady_state_share = Some(value);
        self
    }

    pub fn growth_rate(mut self, value: GrowthRateMetric) -> Self {
        self.growth_rate = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    pub fn runs_to_report(mut self, value: usize) -> Self {
        self.runs_to_report = Some(value);
        self
    }

    pub fn iterations_to_report(mut self, value: usize) -> Self {
        self.iterations_to_report = Some(value);
        self
    }

    /// Builds and validates the `EvolutionOptions` instance.
    ///
    /// # Errors
    ///
    /// See [`EvolutionOptions::validate`].
    pub fn build(self) -> Result<EvolutionOptions> {
        let defaults = EvolutionOptions::default();
        let options = EvolutionOptions {
            population_size: self.population_size.unwrap_or(defaults.population_size),
            num_generations: self.num_generations.unwrap_or(defaults.num_generations),
            mutation_rate: self.mutation_rate.unwrap_or(defaults.mutation_rate),
            crossover_rate: self.crossover_rate.unwrap_or(defaults.crossover_rate),
            homogeneity_threshold: self
                .homogeneity_threshold
                .unwrap_or(defaults.homogeneity_threshold),
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            steady_state_share: self
                .steady_state_share
                .unwrap_or(defaults.steady_state_share),
            growth_rate: self.growth_rate.unwrap_or(defaults.growth_rate),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            runs_to_report: self.runs_to_report.unwrap_or(defaults.runs_to_report),
            iterations_to_report: self
                .iterations_to_report
                .unwrap_or(defaults.iterations_to_report),
        };
        options.validate()?;
        Ok(options)
    }
}
