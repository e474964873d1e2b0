//! Polynomials with coefficients in GF(2^m)
//!
//! Fixed-capacity polynomials sized for error-locator work: the
//! largest polynomial the decoder ever forms is bounded by `2t`, so
//! everything here lives on the stack and the decode path performs no
//! allocation.

use super::galois::GaloisField;

/// Largest number of bit errors any decoder instance may correct
pub(crate) const MAX_T: usize = 16;

/// Coefficient capacity for scratch polynomials
pub(crate) const POLY_COEFFS: usize = 2 * MAX_T + 2;

/// A polynomial over GF(2^m), lowest-order coefficient first
///
/// `degree` is authoritative; slots above it may hold stale values
/// (division deliberately leaves the quotient there).
#[derive(Clone, Debug)]
pub(crate) struct GfPoly {
    pub(crate) coeff: [u32; POLY_COEFFS],
    pub(crate) degree: usize,
}

impl GfPoly {
    /// The zero polynomial
    pub fn zero() -> Self {
        GfPoly {
            coeff: [0; POLY_COEFFS],
            degree: 0,
        }
    }

    /// The constant polynomial 1
    pub fn one() -> Self {
        let mut p = Self::zero();
        p.coeff[0] = 1;
        p
    }

    /// Leading coefficient
    pub fn lead(&self) -> u32 {
        self.coeff[self.degree]
    }

    /// Lower `degree` past any zero leading coefficients
    pub fn trim(&mut self) {
        while self.coeff[self.degree] == 0 && self.degree != 0 {
            self.degree -= 1;
        }
    }
}

/// Log-domain image of a divisor, for repeated reduction
///
/// Entry `i` is `log(b[i]) + n - log(lead(b))` reduced mod n, or
/// `None` for a zero coefficient.
pub(crate) fn poly_logrep(gf: &GaloisField, b: &GfPoly) -> [Option<u32>; POLY_COEFFS] {
    let mut rep = [None; POLY_COEFFS];
    let l = gf.n() - gf.log(b.lead());
    for (i, slot) in rep.iter_mut().enumerate().take(b.degree) {
        if b.coeff[i] != 0 {
            *slot = Some(gf.reduce_once(gf.log(b.coeff[i]) + l));
        }
    }
    rep
}

/// Reduce `a` to `a mod b` in place
///
/// On return `a.degree < b.degree`. The quotient coefficients are left
/// in the slots at `b.degree` and above, where [`poly_div`] reads
/// them.
pub(crate) fn poly_mod(gf: &GaloisField, a: &mut GfPoly, b: &GfPoly) {
    if a.degree < b.degree {
        return;
    }
    debug_assert!(b.degree > 0);

    let d = b.degree;
    let rep = poly_logrep(gf, b);

    for j in (d..=a.degree).rev() {
        if a.coeff[j] != 0 {
            let la = gf.log(a.coeff[j]);
            let mut p = j - d;
            for entry in rep.iter().take(d) {
                if let Some(lb) = entry {
                    a.coeff[p] ^= gf.pow(lb + la);
                }
                p += 1;
            }
        }
    }
    a.degree = d - 1;
    a.trim();
}

/// Quotient of `a / b`; the remainder is discarded
///
/// For a non-monic `b` the result is the quotient scaled by
/// `lead(b)`. Factor splitting only consumes degrees and roots, and
/// neither changes under scaling.
pub(crate) fn poly_div(gf: &GaloisField, mut a: GfPoly, b: &GfPoly) -> GfPoly {
    let mut q = GfPoly::zero();
    if a.degree >= b.degree {
        let qdeg = a.degree - b.degree;
        poly_mod(gf, &mut a, b);
        q.coeff[..=qdeg].copy_from_slice(&a.coeff[b.degree..=b.degree + qdeg]);
        q.degree = qdeg;
        q.trim();
    }
    q
}

/// Greatest common divisor by Euclid's algorithm
///
/// Iteration stops when the remainder drops to degree zero, so for
/// coprime inputs the result is the last positive-degree remainder
/// rather than a constant. Callers detect that case by checking the
/// result degree against the inputs. The result is not normalized to
/// be monic; only its degree and roots are used, which scaling does
/// not change.
pub(crate) fn poly_gcd(gf: &GaloisField, mut a: GfPoly, mut b: GfPoly) -> GfPoly {
    if a.degree < b.degree {
        std::mem::swap(&mut a, &mut b);
    }
    while b.degree > 0 {
        poly_mod(gf, &mut a, &b);
        std::mem::swap(&mut a, &mut b);
    }
    a
}
