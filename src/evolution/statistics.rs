//! Per-generation trajectories and run-level summaries of selection dynamics.
//!
//! Generation-indexed vectors (`mean_fitness`, `fitness_std`, `best_fitness`,
//! `best_copies`) start with the initial population at index 0. Iteration-
//! indexed vectors (everything derived from one selection step) start at
//! the first iteration, so they are one shorter.

use crate::{chromosome::Genotype, population::Population};

/// Trajectories of one run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunTrace {
    pub mean_fitness: Vec<f64>,
    pub fitness_std: Vec<f64>,
    pub best_fitness: Vec<f64>,
    /// Copies of each generation's own best genotype.
    pub best_copies: Vec<usize>,
    pub selection_differential: Vec<f64>,
    pub selection_intensity: Vec<f64>,
    /// Share of parents picked at least once.
    pub reproduction_rate: Vec<f64>,
    /// Share of the best genotype after each iteration.
    pub best_reproduction_rate: Vec<f64>,
    /// Loss of diversity, `1 - reproduction_rate`.
    pub theta: Vec<f64>,
    pub growth_rate: Vec<f64>,
    /// First generation in which the best genotype held at least half the population.
    pub growth_rate_locus: Option<usize>,
}

impl RunTrace {
    /// Starts a trace at the initial population.
    pub fn new(initial: &Population) -> Self {
        let mut trace = Self::default();
        trace.record_state(initial);
        trace
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.selection_differential.len()
    }

    pub(crate) fn record_state(&mut self, population: &Population) {
        self.mean_fitness.push(population.mean_fitness());
        self.fitness_std.push(population.fitness_std());
        self.best_fitness.push(population.max_fitness());
        self.best_copies
            .push(population.copies_of(population.best_genotype()));
    }

    pub(crate) fn record_selection(&mut self, differential: f64, intensity: f64, reproduction_rate: f64) {
        self.selection_differential.push(differential);
        self.selection_intensity.push(intensity);
        self.reproduction_rate.push(reproduction_rate);
        self.theta.push(1.0 - reproduction_rate);
    }

    /// Records the growth rate of the latest generation and, once, the locus.
    pub(crate) fn record_growth(&mut self, rate: f64, population_size: usize) {
        let generation = self.best_copies.len() - 1;
        let copies = self.best_copies[generation];
        self.growth_rate.push(rate);
        self.best_reproduction_rate
            .push(copies as f64 / population_size as f64);
        if self.growth_rate_locus.is_none() && copies * 2 >= population_size {
            self.growth_rate_locus = Some(generation);
        }
    }

    /// Growth rate at the locus, if the locus was reached.
    pub fn growth_rate_at_locus(&self) -> Option<f64> {
        self.growth_rate_locus
            .and_then(|generation| self.growth_rate.get(generation.checked_sub(1)?).copied())
    }
}

/// Run-level aggregates of a [`RunTrace`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Generation of convergence; `None` when the run capped out.
    pub ni: Option<usize>,
    /// Generations actually run, converged or not.
    pub takeover_time: usize,
    pub success: bool,
    pub final_best_fitness: f64,
    pub final_mean_fitness: f64,
    pub growth_rate_locus: Option<usize>,
    pub growth_rate_at_locus: Option<f64>,
    pub early_growth_rate: Option<f64>,
    pub mean_growth_rate: Option<f64>,
    pub min_intensity: Option<f64>,
    pub max_intensity: Option<f64>,
    pub mean_intensity: Option<f64>,
    pub mean_differential: Option<f64>,
    pub mean_reproduction_rate: Option<f64>,
    pub mean_theta: Option<f64>,
    pub final_best_share: f64,
}

impl RunSummary {
    pub fn from_trace(trace: &RunTrace, ni: Option<usize>, success: bool, population_size: usize) -> Self {
        let last_copies = trace.best_copies.last().copied().unwrap_or(0);
        Self {
            ni,
            takeover_time: trace.iterations(),
            success,
            final_best_fitness: trace.best_fitness.last().copied().unwrap_or(f64::NAN),
            final_mean_fitness: trace.mean_fitness.last().copied().unwrap_or(f64::NAN),
            growth_rate_locus: trace.growth_rate_locus,
            growth_rate_at_locus: trace.growth_rate_at_locus(),
            early_growth_rate: trace.growth_rate.first().copied().filter(|r| r.is_finite()),
            mean_growth_rate: finite_mean(&trace.growth_rate),
            min_intensity: finite_min(&trace.selection_intensity),
            max_intensity: finite_max(&trace.selection_intensity),
            mean_intensity: finite_mean(&trace.selection_intensity),
            mean_differential: finite_mean(&trace.selection_differential),
            mean_reproduction_rate: finite_mean(&trace.reproduction_rate),
            mean_theta: finite_mean(&trace.theta),
            final_best_share: last_copies as f64 / population_size as f64,
        }
    }

    pub fn converged(&self) -> bool {
        self.ni.is_some()
    }
}

/// Result of a drift-only run on the constant landscape.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseStats {
    pub ni: Option<usize>,
    /// Genotype the population collapsed to.
    pub converged_to: Option<Genotype>,
}

impl NoiseStats {
    /// `Some(true)` when the population fixed on the all-ones genotype.
    pub fn converged_to_ones(&self) -> Option<bool> {
        self.converged_to
            .as_ref()
            .map(|genotype| genotype.ones_count() == genotype.len())
    }
}

/// `s / std_before`, zero when the population had no fitness spread.
pub fn selection_intensity(differential: f64, std_before: f64) -> f64 {
    if std_before == 0.0 {
        0.0
    } else {
        differential / std_before
    }
}

/// Mean of the finite values, `None` if there are none.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation of the finite values.
pub fn finite_std(values: &[f64]) -> Option<f64> {
    let mean = finite_mean(values)?;
    let finite: Vec<f64> = values.iter().cloned().filter(|v| v.is_finite()).collect();
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / finite.len() as f64;
    Some(variance.sqrt())
}

pub fn finite_min(values: &[f64]) -> Option<f64> {
    values.iter().cloned().filter(|v| v.is_finite()).reduce(f64::min)
}

pub fn finite_max(values: &[f64]) -> Option<f64> {
    values.iter().cloned().filter(|v| v.is_finite()).reduce(f64::max)
}
