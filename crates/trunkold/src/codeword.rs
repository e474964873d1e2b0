//! Fixed-length codeword bit buffer
//!
//! A [`Codeword`] is a message of up to 255 bits, indexed from zero
//! in transmission order: bit 0 is the first bit on the air. Decoders
//! flip bits in place; framing layers read and write multi-bit fields
//! big-endian, first bit most significant.

use std::fmt;

use thiserror::Error;

/// Longest supported codeword, in bits
///
/// This matches the largest field the correction layer handles,
/// GF(2^8) with 255-bit codewords.
pub const MAX_CODEWORD_BITS: usize = 255;

/// Errors from parsing a hexadecimal codeword dump
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodewordError {
    /// A character was not a hexadecimal digit
    #[error("invalid hex digit {digit:?} at position {position}")]
    BadDigit { digit: char, position: usize },

    /// The string ended before enough bits were read
    #[error("hex string supplies {got} bits but {want} are required")]
    TooShort { got: usize, want: usize },

    /// The string continued past the requested length
    #[error("hex string supplies {got} bits but only {want} were requested")]
    TooLong { got: usize, want: usize },
}

/// Fixed-length bit buffer for codewords in flight
///
/// ```
/// use trunkold::Codeword;
///
/// let mut word = Codeword::new(8);
/// word.set_field(0, 8, 0xA5);
/// assert_eq!(word.to_hex(), "A5");
/// assert!(word.get(0));
/// assert_eq!(word.count_ones(), 4);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Codeword {
    words: [u64; 4],
    len: usize,
}

impl Codeword {
    /// An all-zero codeword of `len` bits
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= len <= 255`.
    pub fn new(len: usize) -> Self {
        assert!(
            (1..=MAX_CODEWORD_BITS).contains(&len),
            "codeword length out of range: {}",
            len
        );
        Codeword { words: [0; 4], len }
    }

    /// Length in bits, which is always at least one
    pub fn len(&self) -> usize {
        self.len
    }

    /// Read one bit
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range, as do [`set`](Self::set)
    /// and [`flip`](Self::flip).
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {} out of range", index);
        self.words[index >> 6] >> (index & 63) & 1 == 1
    }

    /// Write one bit
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit index {} out of range", index);
        let mask = 1u64 << (index & 63);
        if value {
            self.words[index >> 6] |= mask;
        } else {
            self.words[index >> 6] &= !mask;
        }
    }

    /// Invert one bit
    pub fn flip(&mut self, index: usize) {
        assert!(index < self.len, "bit index {} out of range", index);
        self.words[index >> 6] ^= 1u64 << (index & 63);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Index of the first set bit at or after `from`, if any
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        let mut word = from >> 6;
        let mut bits = self.words[word] & (!0u64 << (from & 63));
        loop {
            if bits != 0 {
                return Some((word << 6) + bits.trailing_zeros() as usize);
            }
            word += 1;
            if word == 4 {
                return None;
            }
            bits = self.words[word];
        }
    }

    /// Iterate over the indices of set bits, ascending
    pub fn set_bits(&self) -> SetBits<'_> {
        SetBits {
            codeword: self,
            next: 0,
        }
    }

    /// Read `width` bits starting at `start` as a big-endian integer
    ///
    /// The bit at `start` becomes the most significant.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= width <= 32` and the field lies within the
    /// codeword, as does [`set_field`](Self::set_field).
    pub fn field(&self, start: usize, width: usize) -> u32 {
        assert!((1..=32).contains(&width), "field width out of range");
        assert!(start + width <= self.len, "field exceeds codeword");
        let mut value = 0u32;
        for i in 0..width {
            value = value << 1 | self.get(start + i) as u32;
        }
        value
    }

    /// Overwrite `width` bits starting at `start` with a big-endian
    /// integer; bits of `value` above `width` are ignored
    pub fn set_field(&mut self, start: usize, width: usize, value: u32) {
        assert!((1..=32).contains(&width), "field width out of range");
        assert!(start + width <= self.len, "field exceeds codeword");
        for i in 0..width {
            self.set(start + i, value >> (width - 1 - i) & 1 == 1);
        }
    }

    /// Parse a hexadecimal dump into a `len`-bit codeword
    ///
    /// Digits map to bits big-endian. The string must supply exactly
    /// `ceil(len / 4)` digits; unused low bits of the final digit are
    /// ignored, so a 63-bit codeword parses from a 16-digit dump.
    ///
    /// ```
    /// use trunkold::Codeword;
    ///
    /// let word = Codeword::from_hex("F0", 8).unwrap();
    /// assert_eq!(word.count_ones(), 4);
    /// assert!(word.get(3));
    /// assert!(!word.get(4));
    /// ```
    pub fn from_hex(hex: &str, len: usize) -> Result<Self, CodewordError> {
        let digits_wanted = (len + 3) / 4;
        let mut codeword = Codeword::new(len);

        let mut count = 0usize;
        for (position, digit) in hex.chars().enumerate() {
            if position >= digits_wanted {
                return Err(CodewordError::TooLong {
                    got: (position + 1) * 4,
                    want: len,
                });
            }
            let value = digit
                .to_digit(16)
                .ok_or(CodewordError::BadDigit { digit, position })?;
            for b in 0..4 {
                let index = 4 * position + b;
                if index < len {
                    codeword.set(index, value >> (3 - b) & 1 == 1);
                }
            }
            count = position + 1;
        }

        if count < digits_wanted {
            return Err(CodewordError::TooShort {
                got: count * 4,
                want: len,
            });
        }
        Ok(codeword)
    }

    /// Render as uppercase hexadecimal, `ceil(len / 4)` digits
    pub fn to_hex(&self) -> String {
        let digits = (self.len + 3) / 4;
        let mut out = String::with_capacity(digits);
        for position in 0..digits {
            let mut value = 0u32;
            for b in 0..4 {
                let index = 4 * position + b;
                let bit = index < self.len && self.get(index);
                value = value << 1 | bit as u32;
            }
            // value < 16
            out.push(char::from_digit(value, 16).expect("one digit").to_ascii_uppercase());
        }
        out
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codeword({})", self)
    }
}

/// Iterator over set bit indices, created by [`Codeword::set_bits`]
pub struct SetBits<'a> {
    codeword: &'a Codeword,
    next: usize,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self.codeword.next_set_bit(self.next)?;
        self.next = found + 1;
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_flip_roundtrip() {
        let mut word = Codeword::new(63);
        word.set(0, true);
        word.set(62, true);
        assert!(word.get(0));
        assert!(!word.get(1));
        assert!(word.get(62));

        word.flip(0);
        word.flip(1);
        assert!(!word.get(0));
        assert!(word.get(1));
        assert_eq!(word.count_ones(), 2);
    }

    #[test]
    fn fields_are_big_endian() {
        let mut word = Codeword::new(16);
        word.set_field(0, 12, 0x293);
        word.set_field(12, 4, 0x7);
        assert_eq!(word.field(0, 12), 0x293);
        assert_eq!(word.field(12, 4), 0x7);
        // NAC 0x293 begins 0010...
        assert!(!word.get(0));
        assert!(!word.get(1));
        assert!(word.get(2));
        assert!(!word.get(3));
    }

    #[test]
    fn set_field_masks_excess_value_bits() {
        let mut word = Codeword::new(8);
        word.set_field(0, 4, 0xFF);
        assert_eq!(word.field(0, 4), 0xF);
        assert_eq!(word.field(4, 4), 0x0);
    }

    #[test]
    fn set_bits_walks_word_boundaries() {
        let mut word = Codeword::new(200);
        for &i in &[0usize, 63, 64, 130, 199] {
            word.set(i, true);
        }
        let got: Vec<usize> = word.set_bits().collect();
        assert_eq!(got, vec![0, 63, 64, 130, 199]);

        assert_eq!(word.next_set_bit(1), Some(63));
        assert_eq!(word.next_set_bit(131), Some(199));
        assert_eq!(word.next_set_bit(200), None);
    }

    #[test]
    fn hex_roundtrip_with_ragged_length() {
        // the 64th bit of the dump does not fit in 63 bits and is
        // discarded, so the final digit reads back with a zero low bit
        let word = Codeword::from_hex("ACE8AA5500112937", 63).unwrap();
        assert_eq!(word.len(), 63);
        assert_eq!(word.to_hex(), "ACE8AA5500112936");
        assert_eq!(word.field(0, 12), 0xACE);
    }

    #[test]
    fn hex_roundtrip_exact_length() {
        let word = Codeword::from_hex("deadbeef", 32).unwrap();
        assert_eq!(word.to_hex(), "DEADBEEF");
        assert_eq!(word.field(0, 32), 0xDEADBEEF);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert_eq!(
            Codeword::from_hex("AZ", 8),
            Err(CodewordError::BadDigit {
                digit: 'Z',
                position: 1
            })
        );
        assert_eq!(
            Codeword::from_hex("A", 8),
            Err(CodewordError::TooShort { got: 4, want: 8 })
        );
        assert_eq!(
            Codeword::from_hex("ABC", 8),
            Err(CodewordError::TooLong { got: 12, want: 8 })
        );
    }

    #[test]
    fn display_renders_transmission_order() {
        let mut word = Codeword::new(8);
        word.set_field(0, 8, 0b1010_0001);
        assert_eq!(word.to_string(), "10100001");
        assert_eq!(format!("{:?}", word), "Codeword(10100001)");
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        let word = Codeword::new(8);
        word.get(8);
    }
}
