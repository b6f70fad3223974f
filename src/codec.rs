//! # Codec
//!
//! Converts between fixed-width bit strings, reflected-binary Gray code and
//! unsigned integers, and maps a real value in `[a, b]` onto an `m`-bit code.
//!
//! Bit 0 is the most significant bit. Widths up to 128 bits are supported.
//!
//! ## Example
//!
//! ```rust
//! use evosel::codec::{Codec, Encoding};
//!
//! let codec = Codec::new(0.0, 10.23, Encoding::Binary).unwrap();
//! let code = codec.encode(10.23, 10);
//! assert!(code.iter().all(|&bit| bit));
//! assert_eq!(codec.decode(&code), 10.23);
//! ```

use crate::error::{ensure_finite, GeneticError, Result};

/// Widest code that still fits the integer packing.
pub const MAX_CODE_WIDTH: usize = 128;

/// How an integer is laid out in a genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    #[default]
    Binary,
    Gray,
}

/// Converts a plain binary bit string to Gray code.
pub fn binary_to_gray(binary: &[bool]) -> Vec<bool> {
    binary
        .iter()
        .enumerate()
        .map(|(i, &bit)| if i == 0 { bit } else { binary[i - 1] ^ bit })
        .collect()
}

/// Converts a Gray-coded bit string back to plain binary.
pub fn gray_to_binary(gray: &[bool]) -> Vec<bool> {
    let mut binary = Vec::with_capacity(gray.len());
    for (i, &bit) in gray.iter().enumerate() {
        let decoded = if i == 0 { bit } else { binary[i - 1] ^ bit };
        binary.push(decoded);
    }
    binary
}

/// Interprets a bit string (most significant bit first) as an unsigned integer.
///
/// # Panics
///
/// Panics if the string is wider than [`MAX_CODE_WIDTH`].
pub fn bits_to_uint(bits: &[bool]) -> u128 {
    assert!(
        bits.len() <= MAX_CODE_WIDTH,
        "code width {} exceeds {} bits",
        bits.len(),
        MAX_CODE_WIDTH
    );
    bits.iter()
        .fold(0u128, |acc, &bit| (acc << 1) | u128::from(bit))
}

/// Writes `value` as exactly `width` bits, zero-padded on the left.
///
/// Bits of `value` above `width` are discarded.
pub fn uint_to_bits(value: u128, width: usize) -> Vec<bool> {
    assert!(
        width <= MAX_CODE_WIDTH,
        "code width {} exceeds {} bits",
        width,
        MAX_CODE_WIDTH
    );
    (0..width)
        .map(|i| (value >> (width - 1 - i)) & 1 == 1)
        .collect()
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Linear mapping between `[a, b]` and `m`-bit codes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Codec {
    a: f64,
    b: f64,
    encoding: Encoding,
}

impl Codec {
    /// Creates a codec for the interval `[a, b]`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` unless `a < b`, and
    /// `GeneticError::InvalidNumericValue` for non-finite bounds.
    pub fn new(a: f64, b: f64, encoding: Encoding) -> Result<Self> {
        ensure_finite(a, "Lower bound")?;
        ensure_finite(b, "Upper bound")?;
        if a >= b {
            return Err(GeneticError::Configuration(format!(
                "Codec bounds must satisfy a < b, got [{}, {}]",
                a, b
            )));
        }
        Ok(Self { a, b, encoding })
    }

    pub fn lower(&self) -> f64 {
        self.a
    }

    pub fn upper(&self) -> f64 {
        self.b
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Distance between neighbouring codes for a `width`-bit genotype.
    pub fn quantization_step(&self, width: usize) -> f64 {
        (self.b - self.a) / levels(width)
    }

    /// Encodes `x` as a `width`-bit genotype.
    ///
    /// Values outside `[a, b]` are clamped to the nearest end of the grid.
    pub fn encode(&self, x: f64, width: usize) -> Vec<bool> {
        check_width(width);
        let top = levels(width);
        let step = top / (self.b - self.a);
        let n = ((x - self.a) * step).round().clamp(0.0, top);
        // 2^m - 1 is not representable in f64 for wide codes
        let binary = uint_to_bits((n as u128).min(max_code(width)), width);
        match self.encoding {
            Encoding::Binary => binary,
            Encoding::Gray => binary_to_gray(&binary),
        }
    }

    /// Decodes a genotype to its real value, rounded to two decimals.
    pub fn decode(&self, code: &[bool]) -> f64 {
        round2(self.decode_raw(code))
    }

    /// Decodes a genotype without the final two-decimal rounding.
    pub fn decode_raw(&self, code: &[bool]) -> f64 {
        check_width(code.len());
        let n = match self.encoding {
            Encoding::Binary => bits_to_uint(code),
            Encoding::Gray => bits_to_uint(&gray_to_binary(code)),
        };
        self.a + n as f64 * self.quantization_step(code.len())
    }
}

fn levels(width: usize) -> f64 {
    2f64.powi(width as i32) - 1.0
}

fn max_code(width: usize) -> u128 {
    u128::MAX >> (MAX_CODE_WIDTH - width)
}

fn check_width(width: usize) {
    assert!(
        (1..=MAX_CODE_WIDTH).contains(&width),
        "code width must be in 1..={}, got {}",
        MAX_CODE_WIDTH,
        width
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_binary_to_gray_known_values() {
        assert_eq!(binary_to_gray(&bits("0000")), bits("0000"));
        assert_eq!(binary_to_gray(&bits("0001")), bits("0001"));
        assert_eq!(binary_to_gray(&bits("0010")), bits("0011"));
        assert_eq!(binary_to_gray(&bits("0111")), bits("0100"));
        assert_eq!(binary_to_gray(&bits("1000")), bits("1100"));
    }

    #[test]
    fn test_gray_to_binary_known_values() {
        assert_eq!(gray_to_binary(&bits("0011")), bits("0010"));
        assert_eq!(gray_to_binary(&bits("0100")), bits("0111"));
        assert_eq!(gray_to_binary(&bits("1100")), bits("1000"));
    }

    #[test]
    fn test_uint_bits_zero_padding() {
        assert_eq!(uint_to_bits(5, 6), bits("000101"));
        assert_eq!(bits_to_uint(&bits("000101")), 5);
        assert_eq!(uint_to_bits(0, 3), bits("000"));
    }

    #[test]
    fn test_wide_codes() {
        let value = (1u128 << 99) | 1;
        let code = uint_to_bits(value, 100);
        assert_eq!(code.len(), 100);
        assert!(code[0]);
        assert!(code[99]);
        assert_eq!(bits_to_uint(&code), value);
    }

    #[test]
    fn test_encode_zero_pads_small_values() {
        let codec = Codec::new(0.0, 10.23, Encoding::Binary).unwrap();
        let code = codec.encode(0.01, 10);
        assert_eq!(code, bits("0000000001"));
    }

    #[test]
    fn test_encode_decode_grid() {
        for encoding in [Encoding::Binary, Encoding::Gray] {
            let codec = Codec::new(0.0, 10.23, encoding).unwrap();
            for n in 0..=1023u32 {
                let x = round2(n as f64 * 0.01);
                let code = codec.encode(x, 10);
                assert_eq!(code.len(), 10);
                assert_eq!(codec.decode(&code), x);
            }
        }
    }

    #[test]
    fn test_wide_code_upper_bound() {
        let codec = Codec::new(0.0, 10.23, Encoding::Binary).unwrap();
        assert!(codec.encode(10.23, 100).iter().all(|&bit| bit));
        assert!(codec.encode(10.23, 128).iter().all(|&bit| bit));
        assert_eq!(codec.decode(&codec.encode(10.23, 100)), 10.23);
    }

    #[test]
    fn test_shifted_interval_zero_is_exact() {
        let codec = Codec::new(-5.12, 5.11, Encoding::Gray).unwrap();
        let code = codec.encode(0.0, 10);
        assert_eq!(codec.decode(&code), 0.0);
    }

    #[test]
    fn test_decode_rounds_to_two_decimals() {
        let codec = Codec::new(0.0, 1.0, Encoding::Binary).unwrap();
        // 1/1023 is 0.000977..., rounded to 0.0
        assert_eq!(codec.decode(&bits("0000000001")), 0.0);
        assert!(codec.decode_raw(&bits("0000000001")) > 0.0);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Codec::new(1.0, 1.0, Encoding::Binary).is_err());
        assert!(Codec::new(2.0, 1.0, Encoding::Binary).is_err());
        assert!(Codec::new(f64::NAN, 1.0, Encoding::Binary).is_err());
    }

    #[test]
    #[should_panic]
    fn test_zero_width_panics() {
        let codec = Codec::new(0.0, 1.0, Encoding::Binary).unwrap();
        codec.encode(0.5, 0);
    }
}
