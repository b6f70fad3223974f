//! # Genotype and Chromosome
//!
//! A `Genotype` is a fixed-length bit string. A `Chromosome` pairs a genotype
//! with its cached fitness and a per-generation identity key.
//!
//! The key is not a lineage id: it is reassigned at the start of every
//! generation and is only used to count how many parents survived selection.

use std::fmt;

use crate::rng::RandomNumberGenerator;

/// Fixed-length bit string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genotype {
    bits: Vec<bool>,
}

/// Big-width integer packing of a genotype, one `u64` limb per 64 loci.
///
/// Two genotypes of equal length have equal keys iff they are bit-identical.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenotypeKey {
    length: usize,
    limbs: Vec<u64>,
}

impl Genotype {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All-zero genotype.
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// All-one genotype.
    pub fn ones(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Genotype with independent fair bits.
    pub fn random(length: usize, rng: &mut RandomNumberGenerator) -> Self {
        Self {
            bits: rng.random_bits(length),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn ones_count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    pub fn zeros_count(&self) -> usize {
        self.len() - self.ones_count()
    }

    /// Flips the bit at `locus`.
    pub fn flip(&mut self, locus: usize) {
        if let Some(bit) = self.bits.get_mut(locus) {
            *bit = !*bit;
        }
    }

    /// Single-point recombination: the children swap tails at `point`.
    ///
    /// `point` is clamped to the genotype length.
    pub fn splice(&self, other: &Genotype, point: usize) -> (Genotype, Genotype) {
        let point = point.min(self.len()).min(other.len());
        let mut first = Vec::with_capacity(other.len());
        first.extend_from_slice(&self.bits[..point]);
        first.extend_from_slice(&other.bits[point..]);

        let mut second = Vec::with_capacity(self.len());
        second.extend_from_slice(&other.bits[..point]);
        second.extend_from_slice(&self.bits[point..]);

        (Genotype::new(first), Genotype::new(second))
    }

    /// Packs the bit string into 64-bit limbs, most significant locus first.
    pub fn key(&self) -> GenotypeKey {
        let limbs = self
            .bits
            .chunks(64)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
            })
            .collect();
        GenotypeKey {
            length: self.len(),
            limbs,
        }
    }

    pub fn to_bit_string(&self) -> String {
        self.bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl From<Vec<bool>> for Genotype {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}

impl GenotypeKey {
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }
}

/// A genotype with its cached fitness and per-generation identity key.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    code: Genotype,
    fitness: f64,
    key: usize,
}

impl Chromosome {
    pub fn new(code: Genotype, fitness: f64, key: usize) -> Self {
        Self { code, fitness, key }
    }

    pub fn code(&self) -> &Genotype {
        &self.code
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn key(&self) -> usize {
        self.key
    }

    pub fn into_code(self) -> Genotype {
        self.code
    }

    pub(crate) fn code_mut(&mut self) -> &mut Genotype {
        &mut self.code
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub(crate) fn set_key(&mut self, key: usize) {
        self.key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genotype(s: &str) -> Genotype {
        Genotype::new(s.chars().map(|c| c == '1').collect())
    }

    #[test]
    fn test_counts() {
        let g = genotype("1101000");
        assert_eq!(g.ones_count(), 3);
        assert_eq!(g.zeros_count(), 4);
        assert_eq!(g.to_bit_string(), "1101000");
    }

    #[test]
    fn test_flip() {
        let mut g = Genotype::zeros(4);
        g.flip(2);
        assert_eq!(g, genotype("0010"));
        g.flip(2);
        assert_eq!(g, Genotype::zeros(4));
    }

    #[test]
    fn test_splice_swaps_tails() {
        let a = genotype("000000");
        let b = genotype("111111");
        let (c, d) = a.splice(&b, 2);
        assert_eq!(c, genotype("001111"));
        assert_eq!(d, genotype("110000"));

        let (e, f) = a.splice(&b, 0);
        assert_eq!(e, b);
        assert_eq!(f, a);
    }

    #[test]
    fn test_key_distinguishes_wide_genotypes() {
        let mut a = Genotype::zeros(100);
        let b = Genotype::zeros(100);
        assert_eq!(a.key(), b.key());

        a.flip(99);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key().limbs().len(), 2);
        assert_eq!(a.key().limbs()[1], 1);
    }

    #[test]
    fn test_key_includes_length() {
        assert_ne!(Genotype::zeros(3).key(), Genotype::zeros(4).key());
    }
}
