//! # Experiment
//!
//! Repeats runs of one landscape over a grid of option variants and
//! selection strategies, then aggregates them per `(config, selection)`.
//!
//! Repetitions run in parallel with `rayon`. Each repetition owns its RNG and
//! draws one initial population that every pairing starts from, so pairings
//! are compared on identical starts. Each pairing then evolves on its own
//! forked generator, which keeps seeded experiments reproducible.
//!
//! ```rust
//! use evosel::evolution::EvolutionOptions;
//! use evosel::experiment::{Experiment, ExperimentConfig};
//! use evosel::fitness::FitnessFunction;
//! use evosel::selection::Selection;
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(20)
//!     .num_generations(2_000)
//!     .build()
//!     .unwrap();
//! let experiment = Experiment::builder(FitnessFunction::constant(), 16)
//!     .config(ExperimentConfig::new("FConst", options))
//!     .selection(Selection::sus(0.9801).unwrap())
//!     .selection(Selection::rws(0.9801).unwrap())
//!     .runs(4)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let report = experiment.run().unwrap();
//! assert_eq!(report.results.len(), 8);
//! assert_eq!(report.stats.len(), 2);
//! ```

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    error::{GeneticError, Result},
    evolution::{
        statistics::{finite_max, finite_mean, finite_min, finite_std},
        EvolutionLauncher, EvolutionOptions, NoiseStats, RunSummary, RunTrace,
    },
    fitness::{FitnessFunction, LandscapeKind},
    population::DistributionSnapshot,
    rng::RandomNumberGenerator,
    selection::{Selection, SelectionStrategy},
};

/// Default number of repetitions per pairing.
pub const MAX_RUNS: usize = 100;

/// A named option variant, e.g. `"FHD_pmpc"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentConfig {
    pub name: String,
    pub options: EvolutionOptions,
}

impl ExperimentConfig {
    pub fn new(name: impl Into<String>, options: EvolutionOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// One run of one pairing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunResult {
    pub config: String,
    pub selection: String,
    pub run: usize,
    pub summary: RunSummary,
    pub trace: RunTrace,
    pub snapshots: Vec<DistributionSnapshot>,
    /// Drift statistics, only for the constant landscape.
    pub noise: Option<NoiseStats>,
}

/// Aggregates over the repetitions of one `(config, selection)` pairing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunsStats {
    pub config: String,
    pub selection: String,
    pub runs: usize,
    pub converged: usize,
    pub successes: usize,
    pub success_rate: f64,
    /// Over convergent runs only.
    pub ni_mean: Option<f64>,
    pub ni_std: Option<f64>,
    pub ni_min: Option<f64>,
    pub ni_max: Option<f64>,
    pub mean_intensity: Option<f64>,
    pub mean_differential: Option<f64>,
    pub mean_reproduction_rate: Option<f64>,
    pub mean_growth_rate_locus: Option<f64>,
    pub noise_ni_mean: Option<f64>,
    /// Share of fixed drift runs that ended on the all-ones genotype.
    pub noise_ones_share: Option<f64>,
}

impl RunsStats {
    /// Aggregates `results`, which must all belong to one pairing.
    pub fn calculate(config: &str, selection: &str, results: &[&RunResult]) -> Self {
        let runs = results.len();
        let ni: Vec<f64> = results
            .iter()
            .filter_map(|r| r.summary.ni)
            .map(|ni| ni as f64)
            .collect();
        let successes = results.iter().filter(|r| r.summary.success).count();
        let collect = |f: fn(&RunSummary) -> Option<f64>| -> Vec<f64> {
            results.iter().filter_map(|r| f(&r.summary)).collect()
        };
        let loci: Vec<f64> = results
            .iter()
            .filter_map(|r| r.summary.growth_rate_locus)
            .map(|g| g as f64)
            .collect();

        let noise: Vec<&NoiseStats> = results.iter().filter_map(|r| r.noise.as_ref()).collect();
        let noise_ni: Vec<f64> = noise.iter().filter_map(|n| n.ni).map(|ni| ni as f64).collect();
        let fixed: Vec<bool> = noise.iter().filter_map(|n| n.converged_to_ones()).collect();
        let noise_ones_share = (!fixed.is_empty())
            .then(|| fixed.iter().filter(|&&ones| ones).count() as f64 / fixed.len() as f64);

        Self {
            config: config.to_string(),
            selection: selection.to_string(),
            runs,
            converged: ni.len(),
            successes,
            success_rate: if runs == 0 {
                0.0
            } else {
                successes as f64 / runs as f64
            },
            ni_mean: finite_mean(&ni),
            ni_std: finite_std(&ni),
            ni_min: finite_min(&ni),
            ni_max: finite_max(&ni),
            mean_intensity: finite_mean(&collect(|s| s.mean_intensity)),
            mean_differential: finite_mean(&collect(|s| s.mean_differential)),
            mean_reproduction_rate: finite_mean(&collect(|s| s.mean_reproduction_rate)),
            mean_growth_rate_locus: finite_mean(&loci),
            noise_ni_mean: finite_mean(&noise_ni),
            noise_ones_share,
        }
    }
}

/// All runs of an experiment and their aggregates.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentReport {
    pub landscape: String,
    pub runs: usize,
    /// Ordered by run, then config, then selection.
    pub results: Vec<RunResult>,
    /// Ordered by config, then selection.
    pub stats: Vec<RunsStats>,
}

impl ExperimentReport {
    pub fn stats_for(&self, config: &str, selection: &str) -> Option<&RunsStats> {
        self.stats
            .iter()
            .find(|s| s.config == config && s.selection == selection)
    }
}

#[derive(Debug, Clone)]
pub struct Experiment {
    fitness: FitnessFunction,
    genotype_length: usize,
    seed_optimal: bool,
    configs: Vec<ExperimentConfig>,
    selections: Vec<Selection>,
    runs: usize,
    seed: Option<u64>,
}

impl Experiment {
    pub fn builder(fitness: FitnessFunction, genotype_length: usize) -> ExperimentBuilder {
        ExperimentBuilder {
            fitness,
            genotype_length,
            seed_optimal: true,
            configs: Vec::new(),
            selections: Vec::new(),
            runs: MAX_RUNS,
            seed: None,
        }
    }

    pub fn fitness(&self) -> &FitnessFunction {
        &self.fitness
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Runs every repetition and aggregates the results.
    ///
    /// # Errors
    ///
    /// Returns the first error of any run; the remaining results are dropped.
    #[instrument(level = "info", skip(self), fields(landscape = self.fitness.name(), runs = self.runs))]
    pub fn run(&self) -> Result<ExperimentReport> {
        let launchers = self.launchers()?;
        let per_run: Vec<Vec<RunResult>> = (0..self.runs)
            .into_par_iter()
            .map(|run| self.repetition(run, &launchers))
            .collect::<Result<_>>()?;
        let results: Vec<RunResult> = per_run.into_iter().flatten().collect();

        let mut stats = Vec::with_capacity(launchers.len());
        for (config, launcher) in &launchers {
            let selection = launcher.selection().name();
            let pairing: Vec<&RunResult> = results
                .iter()
                .filter(|r| r.config == *config && r.selection == selection)
                .collect();
            stats.push(RunsStats::calculate(config, &selection, &pairing));
        }
        info!(results = results.len(), "experiment finished");

        Ok(ExperimentReport {
            landscape: self.fitness.name().to_string(),
            runs: self.runs,
            results,
            stats,
        })
    }

    fn launchers(&self) -> Result<Vec<(String, EvolutionLauncher<Selection>)>> {
        let mut launchers = Vec::with_capacity(self.configs.len() * self.selections.len());
        for config in &self.configs {
            for selection in &self.selections {
                let launcher = EvolutionLauncher::new(
                    selection.clone(),
                    self.fitness.clone(),
                    config.options.clone(),
                )?;
                launchers.push((config.name.clone(), launcher));
            }
        }
        Ok(launchers)
    }

    fn repetition(&self, run: usize, launchers: &[(String, EvolutionLauncher<Selection>)]) -> Result<Vec<RunResult>> {
        let mut rng = match self.seed {
            Some(seed) => RandomNumberGenerator::from_seed(seed.wrapping_add(run as u64)),
            None => RandomNumberGenerator::new(),
        };
        let size = self.configs[0].options.get_population_size();
        let initial = self
            .fitness
            .generate_population(size, self.genotype_length, self.seed_optimal, &mut rng)?;

        let mut results = Vec::with_capacity(launchers.len());
        for (config, launcher) in launchers {
            let mut pairing_rng = rng.fork();
            let outcome = launcher.run(initial.clone(), run, &mut pairing_rng)?;
            let noise = match self.fitness.kind() {
                LandscapeKind::Drift => Some(launcher.calculate_noise(initial.clone(), &mut pairing_rng)?),
                _ => None,
            };
            results.push(RunResult {
                config: config.clone(),
                selection: launcher.selection().name(),
                run,
                summary: outcome.summary,
                trace: outcome.trace,
                snapshots: outcome.snapshots,
                noise,
            });
        }
        Ok(results)
    }
}

/// Builder for [`Experiment`].
#[derive(Debug, Clone)]
pub struct ExperimentBuilder {
    fitness: FitnessFunction,
    genotype_length: usize,
    seed_optimal: bool,
    configs: Vec<ExperimentConfig>,
    selections: Vec<Selection>,
    runs: usize,
    seed: Option<u64>,
}

impl ExperimentBuilder {
    pub fn config(mut self, config: ExperimentConfig) -> Self {
        self.configs.push(config);
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Base seed; repetition `r` uses `seed + r`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether non-drift populations start with one optimal individual.
    pub fn seed_optimal(mut self, value: bool) -> Self {
        self.seed_optimal = value;
        self
    }

    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if there are no configs, no
    /// selections or no runs, if config names repeat, or if the configs
    /// disagree on the population size.
    pub fn build(self) -> Result<Experiment> {
        let first = self.configs.first().ok_or_else(|| {
            GeneticError::Configuration("Experiment needs at least one config".to_string())
        })?;
        if self.selections.is_empty() {
            return Err(GeneticError::Configuration(
                "Experiment needs at least one selection strategy".to_string(),
            ));
        }
        if self.runs == 0 {
            return Err(GeneticError::Configuration(
                "Experiment needs at least one run".to_string(),
            ));
        }
        let size = first.options.get_population_size();
        for (i, config) in self.configs.iter().enumerate() {
            config.options.validate()?;
            if config.options.get_population_size() != size {
                return Err(GeneticError::Configuration(format!(
                    "Config {} uses population size {}, expected {} shared by all configs",
                    config.name,
                    config.options.get_population_size(),
                    size
                )));
            }
            if self.configs[..i].iter().any(|c| c.name == config.name) {
                return Err(GeneticError::Configuration(format!(
                    "Duplicate config name {}",
                    config.name
                )));
            }
        }

        Ok(Experiment {
            fitness: self.fitness,
            genotype_length: self.genotype_length,
            seed_optimal: self.seed_optimal,
            configs: self.configs,
            selections: self.selections,
            runs: self.runs,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(size: usize) -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(size)
            .num_generations(1_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_incomplete_grids() {
        let no_config = Experiment::builder(FitnessFunction::constant(), 8)
            .selection(Selection::sus(0.9).unwrap())
            .build();
        assert!(no_config.is_err());

        let no_selection = Experiment::builder(FitnessFunction::constant(), 8)
            .config(ExperimentConfig::new("a", options(10)))
            .build();
        assert!(no_selection.is_err());

        let mixed_sizes = Experiment::builder(FitnessFunction::constant(), 8)
            .config(ExperimentConfig::new("a", options(10)))
            .config(ExperimentConfig::new("b", options(12)))
            .selection(Selection::sus(0.9).unwrap())
            .build();
        assert!(mixed_sizes.is_err());

        let duplicate = Experiment::builder(FitnessFunction::constant(), 8)
            .config(ExperimentConfig::new("a", options(10)))
            .config(ExperimentConfig::new("a", options(10)))
            .selection(Selection::sus(0.9).unwrap())
            .build();
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_seeded_experiments_are_reproducible() {
        let build = || {
            Experiment::builder(FitnessFunction::hamming(100.0).unwrap(), 12)
                .config(ExperimentConfig::new("FHD", options(10)))
                .selection(Selection::rws(0.95).unwrap())
                .runs(3)
                .seed(99)
                .build()
                .unwrap()
        };
        let first = build().run().unwrap();
        let second = build().run().unwrap();
        assert_eq!(first.stats, second.stats);
        for (a, b) in first.results.iter().zip(&second.results) {
            assert_eq!(a.summary, b.summary);
        }
    }

    #[test]
    fn test_runs_stats_aggregates() {
        let summary = |ni: Option<usize>, success: bool| RunSummary {
            ni,
            takeover_time: ni.unwrap_or(50),
            success,
            final_best_fitness: 1.0,
            final_mean_fitness: 1.0,
            growth_rate_locus: ni,
            growth_rate_at_locus: None,
            early_growth_rate: None,
            mean_growth_rate: None,
            min_intensity: None,
            max_intensity: None,
            mean_intensity: Some(0.5),
            mean_differential: Some(0.1),
            mean_reproduction_rate: Some(0.6),
            mean_theta: Some(0.4),
            final_best_share: 1.0,
        };
        let result = |run: usize, ni: Option<usize>, success: bool| RunResult {
            config: "c".to_string(),
            selection: "s".to_string(),
            run,
            summary: summary(ni, success),
            trace: RunTrace::default(),
            snapshots: Vec::new(),
            noise: None,
        };
        let results = [
            result(0, Some(10), true),
            result(1, Some(30), false),
            result(2, None, false),
        ];
        let refs: Vec<&RunResult> = results.iter().collect();

        let stats = RunsStats::calculate("c", "s", &refs);
        assert_eq!(stats.runs, 3);
        assert_eq!(stats.converged, 2);
        assert_eq!(stats.successes, 1);
        assert!((stats.success_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.ni_mean, Some(20.0));
        assert_eq!(stats.ni_std, Some(10.0));
        assert_eq!(stats.ni_min, Some(10.0));
        assert_eq!(stats.ni_max, Some(30.0));
        assert_eq!(stats.mean_intensity, Some(0.5));
        assert_eq!(stats.noise_ones_share, None);
    }
}
