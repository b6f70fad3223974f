use crate::chromosome::Genotype;

/// Scores genotypes. Genetic operators recompute fitness through this trait.
pub trait Challenge {
    fn score(&self, genotype: &Genotype) -> f64;
}
