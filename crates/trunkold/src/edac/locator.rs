//! Syndrome computation and the error-locator polynomial
//!
//! The syndromes of a received word are its evaluations at `α^1` to
//! `α^2t`. A valid codeword evaluates to zero at all of them; any
//! nonzero syndrome means bit errors. The simplified binary
//! Berlekamp-Massey iteration then builds the smallest polynomial
//! whose roots locate those errors, processing two syndromes per step
//! because even syndromes of a binary code are squares of earlier
//! ones.

use arrayvec::ArrayVec;

use crate::codeword::Codeword;

use super::galois::GaloisField;
use super::gfpoly::{GfPoly, MAX_T};

pub(crate) type Syndromes = ArrayVec<u32, { 2 * MAX_T }>;

/// Evaluate the received word at `α^1 .. α^2t`
///
/// Bit `i` of the codeword is the coefficient of `X^(n-1-i)`, so only
/// set bits contribute. Odd syndromes are computed directly; even ones
/// follow by squaring, since `c(x)^2 = c(x^2)` over GF(2).
pub(crate) fn syndromes(gf: &GaloisField, t: usize, codeword: &Codeword) -> Syndromes {
    let n = gf.n() as usize;
    let mut syn = Syndromes::new();
    for _ in 0..2 * t {
        syn.push(0);
    }

    for i in codeword.set_bits() {
        let shift = (n - 1 - i) as u32;
        for j in (0..2 * t).step_by(2) {
            syn[j] ^= gf.pow((j as u32 + 1) * shift);
        }
    }
    for j in 0..t {
        syn[2 * j + 1] = gf.sqr(syn[j]);
    }
    syn
}

/// Berlekamp-Massey iteration, binary (syndrome-halved) form
///
/// Returns the error-locator polynomial. A result of degree greater
/// than `t` means the word is uncorrectable; the caller checks.
pub(crate) fn error_locator(gf: &GaloisField, t: usize, syn: &Syndromes) -> GfPoly {
    let mut elp = GfPoly::one();
    let mut pelp = GfPoly::one();
    let mut pd: u32 = 1;
    let mut d: u32 = syn[0];
    // iteration index of the previous discrepancy, times two
    let mut pp: i32 = -1;

    let mut i = 0;
    while i < t && elp.degree <= t {
        if d != 0 {
            let k = (2 * i as i32 - pp) as usize;
            let elp_copy = elp.clone();
            let scale = gf.log(d) + gf.n() - gf.log(pd);
            for j in 0..=pelp.degree {
                if pelp.coeff[j] != 0 {
                    elp.coeff[j + k] ^= gf.pow(scale + gf.log(pelp.coeff[j]));
                }
            }
            let grown = pelp.degree + k;
            if grown > elp.degree {
                elp.degree = grown;
                pelp = elp_copy;
                pd = d;
                pp = 2 * i as i32;
            }
        }
        if i < t - 1 {
            d = syn[2 * i + 2];
            for j in 1..=elp.degree {
                d ^= gf.mul(elp.coeff[j], syn[2 * i + 2 - j]);
            }
        }
        i += 1;
    }
    elp
}
