//! # Fitness landscapes
//!
//! The closed family of synthetic landscapes used to probe selection
//! dynamics. Each variant knows how to score a genotype, which genotype is
//! optimal, how to build an initial population and when a run counts as a
//! success.
//!
//! | Variant            | fitness(code)                       | optimum          |
//! |--------------------|-------------------------------------|------------------|
//! | `Constant`         | `len(code)`                         | all-0 and all-1  |
//! | `Hamming`          | `(L - k) + k * delta`, k = zero bits | all-0            |
//! | `Square`           | `x^2`                               | `x = b`          |
//! | `ShiftedParabola`  | `5.12^2 - x^2`                      | `x = 0`          |
//! | `Exponential`      | `exp(c * x)`                        | `x = b`          |
//!
//! ## Example
//!
//! ```rust
//! use evosel::codec::Encoding;
//! use evosel::fitness::FitnessFunction;
//! use evosel::rng::RandomNumberGenerator;
//!
//! let landscape = FitnessFunction::square(0.0, 10.23, Encoding::Binary).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let population = landscape.generate_population(100, 10, true, &mut rng).unwrap();
//!
//! assert_eq!(population.len(), 100);
//! assert!((population.chromosomes()[0].fitness() - 104.6529).abs() < 1e-9);
//! ```

use crate::{
    chromosome::{Chromosome, Genotype},
    codec::{Codec, Encoding, MAX_CODE_WIDTH},
    error::{ensure_finite, GeneticError, Result},
    evolution::{options::Tolerance, Challenge},
    population::Population,
    rng::RandomNumberGenerator,
};

/// Peak of the shifted parabola `5.12^2 - x^2`.
pub const PARABOLA_PEAK: f64 = 5.12 * 5.12;

/// Capability tag deciding how success and plotting are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LandscapeKind {
    /// Fitness carries no signal; only drift acts.
    Drift,
    /// Fitness is a function of the raw bits.
    Binary,
    /// Fitness is a function of the decoded real value.
    RealValued,
}

/// Location of a landscape's optimum in phenotype and fitness space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    pub x: f64,
    pub fitness: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessFunction {
    Constant,
    Hamming { delta: f64 },
    Square { codec: Codec },
    ShiftedParabola { codec: Codec },
    Exponential { codec: Codec, c: f64 },
}

impl FitnessFunction {
    /// Landscape without a fitness signal, for drift experiments.
    pub fn constant() -> Self {
        FitnessFunction::Constant
    }

    /// Hamming-distance landscape with steepness `delta`.
    pub fn hamming(delta: f64) -> Result<Self> {
        ensure_finite(delta, "Hamming steepness")?;
        Ok(FitnessFunction::Hamming { delta })
    }

    /// `x^2` on `[a, b]`.
    pub fn square(a: f64, b: f64, encoding: Encoding) -> Result<Self> {
        Ok(FitnessFunction::Square {
            codec: Codec::new(a, b, encoding)?,
        })
    }

    /// `5.12^2 - x^2` on `[a, b]`; the interval must contain 0.
    pub fn shifted_parabola(a: f64, b: f64, encoding: Encoding) -> Result<Self> {
        let codec = Codec::new(a, b, encoding)?;
        if a > 0.0 || b < 0.0 {
            return Err(GeneticError::Configuration(format!(
                "Interval [{}, {}] does not contain the optimum x = 0",
                a, b
            )));
        }
        Ok(FitnessFunction::ShiftedParabola { codec })
    }

    /// `exp(c * x)` on `[a, b]`; `c` must be positive so that `x = b` is optimal.
    pub fn exponential(a: f64, b: f64, c: f64, encoding: Encoding) -> Result<Self> {
        let codec = Codec::new(a, b, encoding)?;
        ensure_finite(c, "Exponential rate")?;
        if c <= 0.0 {
            return Err(GeneticError::Configuration(format!(
                "Exponential rate must be positive, got {}",
                c
            )));
        }
        if !(c * b).exp().is_finite() {
            return Err(GeneticError::InvalidNumericValue(format!(
                "exp({} * {}) overflows",
                c, b
            )));
        }
        Ok(FitnessFunction::Exponential { codec, c })
    }

    /// Short display name used to key reports.
    pub fn name(&self) -> &'static str {
        match self {
            FitnessFunction::Constant => "FConst",
            FitnessFunction::Hamming { .. } => "FHD",
            FitnessFunction::Square { .. } => "Fx2",
            FitnessFunction::ShiftedParabola { .. } => "F5122subx2",
            FitnessFunction::Exponential { .. } => "Fecx",
        }
    }

    pub fn kind(&self) -> LandscapeKind {
        match self {
            FitnessFunction::Constant => LandscapeKind::Drift,
            FitnessFunction::Hamming { .. } => LandscapeKind::Binary,
            _ => LandscapeKind::RealValued,
        }
    }

    pub fn codec(&self) -> Option<&Codec> {
        match self {
            FitnessFunction::Square { codec }
            | FitnessFunction::ShiftedParabola { codec }
            | FitnessFunction::Exponential { codec, .. } => Some(codec),
            _ => None,
        }
    }

    /// Fitness of a decoded real value. Only meaningful for real-valued landscapes.
    fn score_x(&self, x: f64) -> f64 {
        match self {
            FitnessFunction::Square { .. } => x * x,
            FitnessFunction::ShiftedParabola { .. } => PARABOLA_PEAK - x * x,
            FitnessFunction::Exponential { c, .. } => (c * x).exp(),
            _ => 0.0,
        }
    }

    pub fn estimate(&self, genotype: &Genotype) -> f64 {
        match self {
            FitnessFunction::Constant => genotype.len() as f64,
            FitnessFunction::Hamming { delta } => {
                let k = genotype.zeros_count() as f64;
                (genotype.len() as f64 - k) + k * delta
            }
            _ => self.score_x(self.genotype_value(genotype)),
        }
    }

    /// Value plotted on a genotype histogram: ones count for bit landscapes,
    /// decoded `x` for real-valued ones.
    pub fn genotype_value(&self, genotype: &Genotype) -> f64 {
        match self.codec() {
            Some(codec) => codec.decode(genotype.bits()),
            None => genotype.ones_count() as f64,
        }
    }

    /// Analytic optimum. `None` for the drift landscape, where every genotype is optimal.
    pub fn optimum(&self, length: usize) -> Option<Optimum> {
        match self {
            FitnessFunction::Constant => None,
            FitnessFunction::Hamming { delta } => Some(Optimum {
                x: 0.0,
                fitness: length as f64 * delta,
            }),
            FitnessFunction::Square { codec } | FitnessFunction::Exponential { codec, .. } => {
                Some(Optimum {
                    x: codec.upper(),
                    fitness: self.score_x(codec.upper()),
                })
            }
            FitnessFunction::ShiftedParabola { .. } => Some(Optimum {
                x: 0.0,
                fitness: PARABOLA_PEAK,
            }),
        }
    }

    /// Optimal chromosomes of the given length: one, or the all-zero/all-one
    /// pair for the drift landscape.
    pub fn generate_optimal(&self, length: usize) -> Result<Vec<Chromosome>> {
        self.check_length(length)?;
        let optimal = match self {
            FitnessFunction::Constant => vec![
                Chromosome::new(Genotype::zeros(length), length as f64, 0),
                Chromosome::new(Genotype::ones(length), length as f64, 0),
            ],
            FitnessFunction::Hamming { delta } => vec![Chromosome::new(
                Genotype::zeros(length),
                length as f64 * delta,
                0,
            )],
            _ => {
                let optimum = self.optimum(length).ok_or_else(|| {
                    GeneticError::Other(format!("{} has no single optimum", self.name()))
                })?;
                let codec = self.codec().ok_or_else(|| {
                    GeneticError::Other(format!("{} has no codec", self.name()))
                })?;
                vec![Chromosome::new(
                    Genotype::new(codec.encode(optimum.x, length)),
                    optimum.fitness,
                    0,
                )]
            }
        };
        Ok(optimal)
    }

    /// Reference genotype used for success checks and takeover counts.
    pub fn optimal_genotype(&self, length: usize) -> Result<Genotype> {
        self.generate_optimal(length)?
            .into_iter()
            .next()
            .map(Chromosome::into_code)
            .ok_or_else(|| GeneticError::Other("No optimal genotype".to_string()))
    }

    /// Builds an initial population of `size` genotypes of `length` bits.
    ///
    /// The drift landscape always yields `size / 2` all-zero and `size / 2`
    /// all-one genotypes. Other landscapes draw fair random bits, with the
    /// optimal genotype placed first when `seed_optimal` is set. Keys are
    /// `1..=size`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` for an empty population, an odd
    /// size on the drift landscape, or a length the codec cannot represent.
    pub fn generate_population(
        &self,
        size: usize,
        length: usize,
        seed_optimal: bool,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Population> {
        if size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        self.check_length(length)?;

        let mut chromosomes = Vec::with_capacity(size);
        if let FitnessFunction::Constant = self {
            if size % 2 != 0 {
                return Err(GeneticError::Configuration(format!(
                    "Drift population splits evenly between two genotypes, size {} is odd",
                    size
                )));
            }
            let pair = self.generate_optimal(length)?;
            for _ in 0..size / 2 {
                for optimal in &pair {
                    let key = chromosomes.len() + 1;
                    chromosomes.push(Chromosome::new(optimal.code().clone(), optimal.fitness(), key));
                }
            }
            return Population::new(chromosomes);
        }

        if seed_optimal {
            let optimal = self.optimal_genotype(length)?;
            let fitness = self.estimate(&optimal);
            chromosomes.push(Chromosome::new(optimal, fitness, 1));
        }
        while chromosomes.len() < size {
            let code = Genotype::random(length, rng);
            let fitness = self.estimate(&code);
            let key = chromosomes.len() + 1;
            chromosomes.push(Chromosome::new(code, fitness, key));
        }
        Population::new(chromosomes)
    }

    /// Real-valued success test: the decoded value and its fitness are both
    /// within tolerance of the optimum. Always `false` for bit landscapes.
    pub fn is_chromosome_successful(&self, chromosome: &Chromosome, tolerance: &Tolerance) -> bool {
        let (Some(codec), Some(optimum)) = (self.codec(), self.optimum(chromosome.code().len()))
        else {
            return false;
        };
        let x = codec.decode(chromosome.code().bits());
        let y = self.score_x(x);
        (optimum.fitness - y).abs() <= tolerance.delta && (optimum.x - x).abs() <= tolerance.sigma
    }

    fn check_length(&self, length: usize) -> Result<()> {
        if length == 0 {
            return Err(GeneticError::Configuration(
                "Genotype length cannot be zero".to_string(),
            ));
        }
        if self.codec().is_some() && length > MAX_CODE_WIDTH {
            return Err(GeneticError::Configuration(format!(
                "{} decodes at most {} bits, got {}",
                self.name(),
                MAX_CODE_WIDTH,
                length
            )));
        }
        Ok(())
    }
}

impl Challenge for FitnessFunction {
    fn score(&self, genotype: &Genotype) -> f64 {
        self.estimate(genotype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolerance() -> Tolerance {
        Tolerance::default()
    }

    #[test]
    fn test_constant_fitness_ignores_content() {
        let f = FitnessFunction::constant();
        assert_eq!(f.estimate(&Genotype::zeros(100)), 100.0);
        assert_eq!(f.estimate(&Genotype::ones(100)), 100.0);
        assert_eq!(f.kind(), LandscapeKind::Drift);
    }

    #[test]
    fn test_hamming_fitness() {
        let f = FitnessFunction::hamming(100.0).unwrap();
        assert_eq!(f.estimate(&Genotype::zeros(10)), 1000.0);
        assert_eq!(f.estimate(&Genotype::ones(10)), 10.0);

        let mut g = Genotype::ones(10);
        g.flip(0);
        g.flip(1);
        assert_eq!(f.estimate(&g), 8.0 + 200.0);
    }

    #[test]
    fn test_square_optimum() {
        let f = FitnessFunction::square(0.0, 10.23, Encoding::Binary).unwrap();
        let optimal = f.generate_optimal(10).unwrap();
        assert_eq!(optimal.len(), 1);
        assert_eq!(optimal[0].code(), &Genotype::ones(10));
        assert!((optimal[0].fitness() - 104.6529).abs() < 1e-9);
        assert!(f.is_chromosome_successful(&optimal[0], &tolerance()));
    }

    #[test]
    fn test_shifted_parabola_optimum() {
        let f = FitnessFunction::shifted_parabola(-5.12, 5.11, Encoding::Gray).unwrap();
        let optimal = f.generate_optimal(10).unwrap().remove(0);
        assert_eq!(f.genotype_value(optimal.code()), 0.0);
        assert!((f.estimate(optimal.code()) - PARABOLA_PEAK).abs() < 1e-9);
        assert!(f.is_chromosome_successful(&optimal, &tolerance()));

        assert!(FitnessFunction::shifted_parabola(1.0, 2.0, Encoding::Binary).is_err());
    }

    #[test]
    fn test_exponential_optimum() {
        let f = FitnessFunction::exponential(0.0, 10.23, 0.5, Encoding::Binary).unwrap();
        let optimal = f.generate_optimal(10).unwrap().remove(0);
        assert!((optimal.fitness() - (0.5f64 * 10.23).exp()).abs() < 1e-9);
        assert!(f.is_chromosome_successful(&optimal, &tolerance()));

        let off = Chromosome::new(Genotype::zeros(10), 1.0, 0);
        assert!(!f.is_chromosome_successful(&off, &tolerance()));

        assert!(FitnessFunction::exponential(0.0, 1.0, -1.0, Encoding::Binary).is_err());
    }

    #[test]
    fn test_near_optimum_within_tolerance_fails_on_fitness() {
        // One grid step below the optimum misses the fitness tolerance by ~0.2.
        let f = FitnessFunction::square(0.0, 10.23, Encoding::Binary).unwrap();
        let mut code = Genotype::ones(10);
        code.flip(9);
        let chromosome = Chromosome::new(code.clone(), f.estimate(&code), 0);
        assert!(!f.is_chromosome_successful(&chromosome, &tolerance()));
    }

    #[test]
    fn test_constant_population_is_split() {
        let f = FitnessFunction::constant();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let population = f.generate_population(10, 8, true, &mut rng).unwrap();
        assert_eq!(population.len(), 10);
        assert_eq!(population.copies_of(&Genotype::zeros(8)), 5);
        assert_eq!(population.copies_of(&Genotype::ones(8)), 5);

        assert!(f.generate_population(9, 8, true, &mut rng).is_err());
    }

    #[test]
    fn test_seeded_population_starts_with_optimum() {
        let f = FitnessFunction::hamming(100.0).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(2);
        let population = f.generate_population(20, 100, true, &mut rng).unwrap();
        assert_eq!(population.chromosomes()[0].code(), &Genotype::zeros(100));
        assert_eq!(population.chromosomes()[0].fitness(), 10_000.0);

        let keys: Vec<usize> = population.keys();
        assert_eq!(keys, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_lengths() {
        let f = FitnessFunction::square(0.0, 1.0, Encoding::Binary).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(3);
        assert!(f.generate_population(10, 0, false, &mut rng).is_err());
        assert!(f.generate_population(10, 129, false, &mut rng).is_err());
        assert!(f.generate_population(0, 10, false, &mut rng).is_err());
    }
}
