//! # Population
//!
//! A fixed-size ordered collection of chromosomes together with two derived
//! caches: the fitness vector and the packed genotype keys. The caches are
//! rebuilt by every operation that replaces or modifies chromosomes, so they
//! are never stale.
//!
//! Operators consume the population and return the next generation, which
//! keeps the data flow of the generation loop explicit:
//!
//! ```rust
//! use evosel::fitness::FitnessFunction;
//! use evosel::rng::RandomNumberGenerator;
//!
//! let landscape = FitnessFunction::hamming(100.0).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(11);
//! let population = landscape.generate_population(10, 100, true, &mut rng).unwrap();
//!
//! let population = population
//!     .crossover(&landscape, 1.0, &mut rng)
//!     .unwrap()
//!     .mutate(&landscape, 0.01, &mut rng);
//! assert_eq!(population.len(), 10);
//! ```

use std::collections::{HashMap, HashSet};

use rand::distributions::{Distribution, WeightedIndex};

use crate::{
    chromosome::{Chromosome, Genotype, GenotypeKey},
    error::{GeneticError, OptionExt, Result},
    evolution::Challenge,
    fitness::FitnessFunction,
    rng::RandomNumberGenerator,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
    fitness: Vec<f64>,
    genotypes: Vec<GenotypeKey>,
}

/// Distributions of one generation handed to a histogram renderer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionSnapshot {
    pub generation: usize,
    /// Decoded `x` (real-valued landscapes) or ones count per individual.
    pub genotype_values: Vec<f64>,
    /// Fitness per individual.
    pub phenotypes: Vec<f64>,
    pub ones_counts: Vec<usize>,
}

impl Population {
    /// Creates a population and builds its caches.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::EmptyPopulation` for no chromosomes and
    /// `GeneticError::GenotypeLengthMismatch` when lengths differ.
    pub fn new(chromosomes: Vec<Chromosome>) -> Result<Self> {
        let first = chromosomes
            .first()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        let length = first.code().len();
        if let Some(other) = chromosomes.iter().find(|c| c.code().len() != length) {
            return Err(GeneticError::GenotypeLengthMismatch {
                expected: length,
                actual: other.code().len(),
            });
        }

        let mut population = Self {
            chromosomes,
            fitness: Vec::new(),
            genotypes: Vec::new(),
        };
        population.refresh();
        Ok(population)
    }

    fn refresh(&mut self) {
        self.fitness = self.chromosomes.iter().map(Chromosome::fitness).collect();
        self.genotypes = self.chromosomes.iter().map(|c| c.code().key()).collect();
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    /// Always `false`: construction rejects empty populations.
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn genotype_length(&self) -> usize {
        self.chromosomes[0].code().len()
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn into_chromosomes(self) -> Vec<Chromosome> {
        self.chromosomes
    }

    pub fn fitness_vector(&self) -> &[f64] {
        &self.fitness
    }

    pub fn genotype_keys(&self) -> &[GenotypeKey] {
        &self.genotypes
    }

    pub fn keys(&self) -> Vec<usize> {
        self.chromosomes.iter().map(Chromosome::key).collect()
    }

    /// Assigns keys `1..=N` in order, starting a new generation's identities.
    pub fn rekey(mut self) -> Self {
        for (i, chromosome) in self.chromosomes.iter_mut().enumerate() {
            chromosome.set_key(i + 1);
        }
        self
    }

    fn distinct_genotypes(&self) -> usize {
        self.genotypes.iter().collect::<HashSet<_>>().len()
    }

    /// All genotypes are bit-identical.
    pub fn is_identical(&self) -> bool {
        self.distinct_genotypes() == 1
    }

    /// At least `percentage` percent of the individuals share one genotype.
    ///
    /// `percentage` must be below 100; options validate this before a run.
    pub fn is_homogeneous(&self, percentage: f64) -> bool {
        debug_assert!(percentage < 100.0, "homogeneity threshold must be < 100");
        let (_, count) = self.dominant_genotype();
        count as f64 * 100.0 >= percentage * self.len() as f64
    }

    /// Identity when mutation is off, homogeneity at `percentage` otherwise.
    pub fn estimate_convergence(&self, mutation_rate: f64, percentage: f64) -> bool {
        if mutation_rate == 0.0 {
            self.is_identical()
        } else {
            self.is_homogeneous(percentage)
        }
    }

    /// Single-point crossover over random disjoint pairs.
    ///
    /// A no-op when `crossover_rate` is zero. Otherwise every individual is
    /// paired exactly once; children get fresh keys `1..=N` and recomputed
    /// fitness.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` for an odd population size.
    pub fn crossover<C: Challenge>(
        self,
        challenge: &C,
        crossover_rate: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Self> {
        if crossover_rate == 0.0 {
            return Ok(self);
        }
        if self.len() % 2 != 0 {
            return Err(GeneticError::Configuration(format!(
                "Crossover pairs individuals, population size {} is odd",
                self.len()
            )));
        }

        let length = self.genotype_length();
        let mut pool = self.chromosomes;
        let mut children = Vec::with_capacity(pool.len());

        while !pool.is_empty() {
            let first = pool.swap_remove(rng.index(pool.len()));
            let second = pool.swap_remove(rng.index(pool.len()));
            let point = rng.index(length);
            let (code1, code2) = first.code().splice(second.code(), point);

            let fitness1 = challenge.score(&code1);
            let fitness2 = challenge.score(&code2);
            let key = children.len();
            children.push(Chromosome::new(code1, fitness1, key + 1));
            children.push(Chromosome::new(code2, fitness2, key + 2));
        }

        Population::new(children)
    }

    /// Flips every bit independently with probability `mutation_rate`.
    ///
    /// A no-op when `mutation_rate` is zero. Mutated chromosomes keep their
    /// keys and get their fitness recomputed.
    pub fn mutate<C: Challenge>(
        mut self,
        challenge: &C,
        mutation_rate: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Self {
        if mutation_rate == 0.0 {
            return self;
        }
        for chromosome in &mut self.chromosomes {
            let length = chromosome.code().len();
            let mut flipped = false;
            for locus in 0..length {
                if rng.chance(mutation_rate) {
                    chromosome.code_mut().flip(locus);
                    flipped = true;
                }
            }
            if flipped {
                let fitness = challenge.score(chromosome.code());
                chromosome.set_fitness(fitness);
            }
        }
        self.refresh();
        self
    }

    /// Replaces the chromosomes with `N` independent weighted draws.
    ///
    /// `weights` need not sum to one.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Sampling` if `weights` is not a valid weight
    /// vector and `GeneticError::PopulationSizeMismatch` if its length
    /// differs from the population size.
    pub fn update_rws(mut self, weights: &[f64], rng: &mut RandomNumberGenerator) -> Result<Self> {
        if weights.len() != self.len() {
            return Err(GeneticError::PopulationSizeMismatch {
                expected: self.len(),
                actual: weights.len(),
            });
        }
        let wheel = WeightedIndex::new(weights)
            .map_err(|e| GeneticError::Sampling(format!("Invalid roulette weights: {}", e)))?;
        let selected: Vec<Chromosome> = (0..self.len())
            .map(|_| self.chromosomes[wheel.sample(&mut rng.rng)].clone())
            .collect();
        self.chromosomes = selected;
        self.refresh();
        Ok(self)
    }

    /// Replaces the chromosomes, keeping the population size.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::PopulationSizeMismatch` if the size changes, or
    /// the errors of [`Population::new`].
    pub fn update_chromosomes(self, chromosomes: Vec<Chromosome>) -> Result<Self> {
        if chromosomes.len() != self.len() {
            return Err(GeneticError::PopulationSizeMismatch {
                expected: self.len(),
                actual: chromosomes.len(),
            });
        }
        Population::new(chromosomes)
    }

    pub fn mean_fitness(&self) -> f64 {
        self.fitness.iter().sum::<f64>() / self.len() as f64
    }

    pub fn max_fitness(&self) -> f64 {
        self.fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Population (not sample) standard deviation of fitness.
    pub fn fitness_std(&self) -> f64 {
        let mean = self.mean_fitness();
        let variance = self
            .fitness
            .iter()
            .map(|f| (f - mean).powi(2))
            .sum::<f64>()
            / self.len() as f64;
        variance.sqrt()
    }

    /// First chromosome attaining the maximum fitness.
    pub fn best_chromosome(&self) -> &Chromosome {
        let mut best = 0;
        for (i, &fitness) in self.fitness.iter().enumerate() {
            if fitness > self.fitness[best] {
                best = i;
            }
        }
        &self.chromosomes[best]
    }

    pub fn best_genotype(&self) -> &Genotype {
        self.best_chromosome().code()
    }

    /// Number of individuals bit-identical to `genotype`.
    pub fn copies_of(&self, genotype: &Genotype) -> usize {
        let key = genotype.key();
        self.genotypes.iter().filter(|&k| *k == key).count()
    }

    /// Most frequent genotype and its count; ties go to the earliest individual.
    pub fn dominant_genotype(&self) -> (&Genotype, usize) {
        let mut counts: HashMap<&GenotypeKey, usize> = HashMap::new();
        for key in &self.genotypes {
            *counts.entry(key).or_insert(0) += 1;
        }
        let mut best = 0;
        let mut best_count = 0;
        for (i, key) in self.genotypes.iter().enumerate() {
            let count = counts[key];
            if count > best_count {
                best = i;
                best_count = count;
            }
        }
        (self.chromosomes[best].code(), best_count)
    }

    /// Captures the distributions a histogram renderer needs.
    pub fn snapshot(&self, fitness: &FitnessFunction, generation: usize) -> DistributionSnapshot {
        DistributionSnapshot {
            generation,
            genotype_values: self
                .chromosomes
                .iter()
                .map(|c| fitness.genotype_value(c.code()))
                .collect(),
            phenotypes: self.fitness.clone(),
            ones_counts: self
                .chromosomes
                .iter()
                .map(|c| c.code().ones_count())
                .collect(),
        }
    }
}

/// Bins `values` into `bins` equal-width buckets over `[min, max]`.
///
/// Returns the left bucket edges and the counts. A degenerate range puts
/// everything in the first bucket.
pub fn histogram(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    if bins == 0 || values.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let mut counts = vec![0; bins];
    for &value in values {
        let bin = if width > 0.0 {
            (((value - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }
    let edges = (0..bins).map(|i| min + i as f64 * width).collect();
    (edges, counts)
}
