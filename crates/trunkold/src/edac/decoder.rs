//! Binary BCH encode and decode
//!
//! The decoder follows the classic pipeline: syndromes, the binary
//! Berlekamp-Massey iteration for the error-locator polynomial, then
//! analytic root finding. A final syndrome check guards against
//! miscorrection: a claimed success is only reported after the
//! repaired word re-evaluates to zero everywhere, so callers never
//! see a "corrected" word that is not a codeword.
//!
//! Everything after construction is allocation-free and bounded by
//! small polynomial work in `t`, so a decoder can sit on the hot path
//! of a symbol processor.

use crate::codeword::Codeword;

use super::galois::GaloisField;
use super::gfpoly::MAX_T;
use super::locator::{error_locator, syndromes};
use super::roots::find_roots;

/// Outcome of a decode attempt
///
/// `Corrected(0)` means the word was already a valid codeword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionStatus {
    /// The word is now a valid codeword; the count is the number of
    /// bits that were flipped to get there
    Corrected(usize),
    /// More errors than the code can repair; the word was left
    /// unmodified
    Uncorrected,
}

impl CorrectionStatus {
    /// True if the word ended up a valid codeword
    pub fn is_corrected(&self) -> bool {
        matches!(self, CorrectionStatus::Corrected(_))
    }

    /// Number of repaired bits, if the decode succeeded
    pub fn corrected_bits(&self) -> Option<usize> {
        match self {
            CorrectionStatus::Corrected(count) => Some(*count),
            CorrectionStatus::Uncorrected => None,
        }
    }
}

/// Encoder and decoder for a binary BCH code
///
/// The code is `BCH(n, k, t)` with `n = 2^m - 1`: codewords are `n`
/// bits, the first `k` of which are the message, and up to `t` bit
/// errors can be repaired. All parameters are fixed at construction.
pub struct BchDecoder {
    gf: GaloisField,
    n: usize,
    k: usize,
    t: usize,
    /// generator polynomial over GF(2), bit `i` holding the
    /// coefficient of `X^i`
    generator: [u64; 4],
}

impl BchDecoder {
    /// Build a decoder for `BCH(2^m - 1, k, t)`
    ///
    /// `primitive_poly` defines the field; published codes specify
    /// theirs, and [`default_primitive_poly`] supplies the usual
    /// choice otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `m` is outside `2..=8`, `t` is outside `1..=16`, the
    /// polynomial is not primitive, or `k` does not match the
    /// generator degree implied by `m` and `t`. These are
    /// configuration errors, caught at construction rather than
    /// surfaced per decode.
    ///
    /// [`default_primitive_poly`]: crate::default_primitive_poly
    pub fn new(m: u32, k: usize, t: usize, primitive_poly: u32) -> Self {
        let gf = GaloisField::new(m, primitive_poly);
        let n = gf.n() as usize;
        assert!(
            (1..=MAX_T).contains(&t),
            "correction capacity out of range: {}",
            t
        );
        assert!(2 * t < n, "correction capacity {} too large for n = {}", t, n);

        let (generator, degree) = build_generator(&gf, t);
        assert_eq!(
            degree,
            n - k,
            "k = {} is inconsistent with m = {} and t = {}: the generator has degree {}",
            k,
            m,
            t,
            degree
        );

        BchDecoder {
            gf,
            n,
            k,
            t,
            generator,
        }
    }

    /// Codeword length in bits
    pub fn n(&self) -> usize {
        self.n
    }

    /// Message length in bits
    pub fn k(&self) -> usize {
        self.k
    }

    /// Maximum number of correctable bit errors
    pub fn t(&self) -> usize {
        self.t
    }

    /// Systematically encode `data` into an `n`-bit codeword
    ///
    /// The message occupies bits `0..k` of the result unchanged and
    /// the parity bits follow.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `k` bits long.
    pub fn encode(&self, data: &Codeword) -> Codeword {
        assert_eq!(data.len(), self.k, "encode expects a k-bit message");

        // message bits as a polynomial, bit i of the word mapping to
        // the coefficient of X^(n-1-i)
        let mut work = [0u64; 4];
        for i in data.set_bits() {
            let pos = self.n - 1 - i;
            work[pos >> 6] |= 1u64 << (pos & 63);
        }

        // long division by the generator leaves the parity bits below
        // the generator degree
        let gdeg = self.n - self.k;
        for j in (gdeg..self.n).rev() {
            if work[j >> 6] >> (j & 63) & 1 != 0 {
                xor_shifted(&mut work, &self.generator, j - gdeg);
            }
        }

        let mut codeword = Codeword::new(self.n);
        for i in 0..self.k {
            codeword.set(i, data.get(i));
        }
        for i in self.k..self.n {
            let pos = self.n - 1 - i;
            codeword.set(i, work[pos >> 6] >> (pos & 63) & 1 != 0);
        }
        codeword
    }

    /// Decode `codeword` in place
    ///
    /// On success the buffer holds a valid codeword and the returned
    /// count says how many bits were flipped. On failure the buffer
    /// is returned exactly as it came in.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not exactly `n` bits long.
    pub fn decode(&self, codeword: &mut Codeword) -> CorrectionStatus {
        assert_eq!(codeword.len(), self.n, "decode expects an n-bit codeword");

        let syn = syndromes(&self.gf, self.t, codeword);
        if syn.iter().all(|&s| s == 0) {
            return CorrectionStatus::Corrected(0);
        }

        let elp = error_locator(&self.gf, self.t, &syn);
        if elp.degree > self.t {
            return CorrectionStatus::Uncorrected;
        }

        let roots = find_roots(&self.gf, &elp, 1);
        if roots.len() != elp.degree {
            return CorrectionStatus::Uncorrected;
        }
        let mut seen = [false; 256];
        for &r in &roots {
            if seen[r as usize] {
                return CorrectionStatus::Uncorrected;
            }
            seen[r as usize] = true;
        }

        for &r in &roots {
            codeword.flip(self.n - 1 - r as usize);
        }

        // reject any repair that does not land on a codeword and put
        // the buffer back the way it was
        let check = syndromes(&self.gf, self.t, codeword);
        if check.iter().any(|&s| s != 0) {
            for &r in &roots {
                codeword.flip(self.n - 1 - r as usize);
            }
            return CorrectionStatus::Uncorrected;
        }

        CorrectionStatus::Corrected(roots.len())
    }
}

/// Generator polynomial as the product of the minimal polynomials of
/// `α^1, α^3, ..., α^(2t-1)`, one conjugacy coset at a time
fn build_generator(gf: &GaloisField, t: usize) -> ([u64; 4], usize) {
    let n = gf.n() as usize;
    let mut covered = vec![false; n];
    let mut generator: [u64; 4] = [1, 0, 0, 0];
    let mut degree = 0usize;

    for i in (1..=2 * t - 1).step_by(2) {
        if covered[i] {
            continue;
        }

        // minimal polynomial of α^i: the product of (X + α^j) over
        // the conjugacy coset {i, 2i, 4i, ...} mod n
        let mut minpoly = [0u32; 9];
        minpoly[0] = 1;
        let mut mp_deg = 0usize;
        let mut j = i;
        loop {
            covered[j] = true;
            let root = gf.pow(j as u32);
            for idx in (0..=mp_deg + 1).rev() {
                let below = if idx > 0 { minpoly[idx - 1] } else { 0 };
                let here = if idx <= mp_deg { minpoly[idx] } else { 0 };
                minpoly[idx] = below ^ gf.mul(root, here);
            }
            mp_deg += 1;
            j = (j * 2) % n;
            if j == i {
                break;
            }
        }

        // a full coset product always collapses to GF(2) coefficients
        let mut shifted = [0u64; 4];
        for (idx, &coeff) in minpoly.iter().enumerate().take(mp_deg + 1) {
            assert!(coeff <= 1, "conjugacy coset product is not binary");
            if coeff == 1 {
                xor_shifted(&mut shifted, &generator, idx);
            }
        }
        generator = shifted;
        degree += mp_deg;
    }

    (generator, degree)
}

/// `dst ^= src << shift` across the four-word bit vectors
fn xor_shifted(dst: &mut [u64; 4], src: &[u64; 4], shift: usize) {
    let word = shift >> 6;
    let bit = shift & 63;
    for i in 0..4 {
        if i + word < 4 {
            dst[i + word] ^= src[i] << bit;
            if bit != 0 && i + word + 1 < 4 {
                dst[i + word + 1] ^= src[i] >> (64 - bit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::galois::default_primitive_poly;
    use super::*;

    fn p25_decoder() -> BchDecoder {
        BchDecoder::new(6, 16, 11, default_primitive_poly(6))
    }

    /// Distinct positions spread over the word: stride 5 is coprime
    /// to 63, so the first 12 indices never repeat
    fn spread(count: usize) -> Vec<usize> {
        (0..count).map(|j| (5 * j + 2) % 63).collect()
    }

    fn message(bch: &BchDecoder, value: u32) -> Codeword {
        let mut data = Codeword::new(bch.k());
        data.set_field(0, bch.k(), value);
        data
    }

    #[test]
    fn encode_is_systematic_and_valid() {
        let bch = p25_decoder();
        let data = message(&bch, 0x2937);
        let mut codeword = bch.encode(&data);

        assert_eq!(codeword.len(), 63);
        assert_eq!(codeword.field(0, 16), 0x2937);
        assert_eq!(bch.decode(&mut codeword), CorrectionStatus::Corrected(0));
    }

    #[test]
    fn zero_message_encodes_to_zero_word() {
        let bch = p25_decoder();
        let codeword = bch.encode(&message(&bch, 0));
        assert_eq!(codeword.count_ones(), 0);
    }

    #[test]
    fn corrects_up_to_t_errors() {
        let bch = p25_decoder();
        let pristine = bch.encode(&message(&bch, 0x2937));

        for errors in 1..=bch.t() {
            let mut noisy = pristine.clone();
            for &pos in spread(errors).iter() {
                noisy.flip(pos);
            }
            assert_eq!(
                bch.decode(&mut noisy),
                CorrectionStatus::Corrected(errors),
                "failed at {} errors",
                errors
            );
            assert_eq!(noisy, pristine, "wrong repair at {} errors", errors);
        }
    }

    #[test]
    fn corrects_error_in_final_bit() {
        let bch = p25_decoder();
        let pristine = bch.encode(&message(&bch, 0x2937));
        let mut noisy = pristine.clone();
        noisy.flip(62);
        assert_eq!(bch.decode(&mut noisy), CorrectionStatus::Corrected(1));
        assert_eq!(noisy, pristine);
    }

    #[test]
    fn overload_never_fakes_success() {
        let bch = p25_decoder();
        let pristine = bch.encode(&message(&bch, 0x2937));

        for errors in [12usize, 13, 16, 23] {
            let mut noisy = pristine.clone();
            // stride 11 is coprime to 63, so the positions are distinct
            for j in 0..errors {
                noisy.flip((11 * j + 1) % 63);
            }
            let as_received = noisy.clone();

            match bch.decode(&mut noisy) {
                CorrectionStatus::Uncorrected => {
                    // failure must leave the buffer untouched
                    assert_eq!(noisy, as_received);
                }
                CorrectionStatus::Corrected(count) => {
                    // a miscorrection is possible past t, but the
                    // result must still be a real codeword
                    assert!(count <= bch.t());
                    assert_eq!(bch.decode(&mut noisy), CorrectionStatus::Corrected(0));
                }
            }
        }
    }

    #[test]
    fn corrected_codeword_is_fixed_point() {
        let bch = p25_decoder();
        let pristine = bch.encode(&message(&bch, 0x0123));
        let mut noisy = pristine.clone();
        for &pos in spread(3).iter() {
            noisy.flip(pos);
        }
        assert_eq!(bch.decode(&mut noisy), CorrectionStatus::Corrected(3));
        assert_eq!(bch.decode(&mut noisy), CorrectionStatus::Corrected(0));
        assert_eq!(noisy, pristine);
    }

    #[test]
    fn hamming_code_corrects_every_single_error() {
        let bch = BchDecoder::new(3, 4, 1, default_primitive_poly(3));
        let pristine = bch.encode(&message(&bch, 0b1011));

        for pos in 0..7 {
            let mut noisy = pristine.clone();
            noisy.flip(pos);
            assert_eq!(bch.decode(&mut noisy), CorrectionStatus::Corrected(1));
            assert_eq!(noisy, pristine);
        }
    }

    #[test]
    fn small_code_corrects_every_double_error() {
        let bch = BchDecoder::new(4, 7, 2, default_primitive_poly(4));
        let pristine = bch.encode(&message(&bch, 0b1011001));

        for first in 0..15 {
            for second in 0..15 {
                if first == second {
                    continue;
                }
                let mut noisy = pristine.clone();
                noisy.flip(first);
                noisy.flip(second);
                assert_eq!(
                    bch.decode(&mut noisy),
                    CorrectionStatus::Corrected(2),
                    "failed for errors at {} and {}",
                    first,
                    second
                );
                assert_eq!(noisy, pristine);
            }
        }
    }

    #[test]
    fn medium_code_corrects_triple_errors() {
        let bch = BchDecoder::new(5, 16, 3, default_primitive_poly(5));
        let pristine = bch.encode(&message(&bch, 0xBEEF));

        for start in 0..31 {
            let positions = [start, (start + 7) % 31, (start + 19) % 31];
            let mut noisy = pristine.clone();
            for &pos in positions.iter() {
                noisy.flip(pos);
            }
            assert_eq!(
                bch.decode(&mut noisy),
                CorrectionStatus::Corrected(3),
                "failed for errors at {:?}",
                positions
            );
            assert_eq!(noisy, pristine);
        }
    }

    #[test]
    #[should_panic]
    fn inconsistent_message_length_panics() {
        BchDecoder::new(6, 20, 11, default_primitive_poly(6));
    }

    #[test]
    #[should_panic]
    fn decode_rejects_wrong_length() {
        let bch = p25_decoder();
        let mut short = Codeword::new(32);
        bch.decode(&mut short);
    }
}
