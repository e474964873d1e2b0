//! Roots of the error-locator polynomial
//!
//! Rather than a Chien search over the whole field, roots are found
//! analytically. Locators of degree 1 and 2 have closed-form
//! solutions; degrees 3 and 4 reduce to an affine quartic
//! `X^4 + aX^2 + bX + c` solved as a GF(2) linear system; higher
//! degrees are split recursively with the Berlekamp trace algorithm
//! until every factor is degree 4 or less.
//!
//! Returned roots are in log form: a value `j` means the locator
//! vanishes at `α^-j`, which places a bit error at position
//! `n - 1 - j` of the codeword.

use arrayvec::ArrayVec;

use super::galois::GaloisField;
use super::gfpoly::{poly_div, poly_gcd, poly_mod, GfPoly, MAX_T};

pub(super) type RootVec = ArrayVec<u32, { 2 * MAX_T + 2 }>;

/// Find the roots of `poly`, dispatching on its degree
///
/// `k` is the trace-function index for the recursive splitter and
/// starts at 1. Malformed locators (from uncorrectable words) may
/// yield too few, too many, or repeated roots; the decoder validates
/// the result against the locator degree.
pub(super) fn find_roots(gf: &GaloisField, poly: &GfPoly, k: u32) -> RootVec {
    match poly.degree {
        1 => deg1_roots(gf, poly),
        2 => deg2_roots(gf, poly),
        3 => deg3_roots(gf, poly),
        4 => deg4_roots(gf, poly),
        _ => {
            let mut roots = RootVec::new();
            if poly.degree != 0 && k <= gf.m() {
                match factor(gf, k, poly) {
                    Some((g, h)) => {
                        roots.extend(find_roots(gf, &g, k + 1));
                        roots.extend(find_roots(gf, &h, k + 1));
                    }
                    None => roots = find_roots(gf, poly, k + 1),
                }
            }
            roots
        }
    }
}

/// Root of `c0 + c1 X`
fn deg1_roots(gf: &GaloisField, poly: &GfPoly) -> RootVec {
    let mut roots = RootVec::new();
    if poly.coeff[0] != 0 {
        roots.push(gf.reduce_once(
            gf.n() - gf.log(poly.coeff[0]) + gf.log(poly.coeff[1]),
        ));
    }
    roots
}

/// Roots of `c0 + c1 X + c2 X^2` via the half-trace table
///
/// Substituting `X = c1/c2 Y` reduces the quadratic to
/// `Y^2 + Y = u`; a solution is assembled from the precomputed base
/// and verified, which rejects trace-one constants with no roots.
fn deg2_roots(gf: &GaloisField, poly: &GfPoly) -> RootVec {
    let mut roots = RootVec::new();
    if poly.coeff[0] != 0 && poly.coeff[1] != 0 {
        let l0 = gf.log(poly.coeff[0]);
        let l1 = gf.log(poly.coeff[1]);
        let l2 = gf.log(poly.coeff[2]);
        let u = gf.pow(l0 + l2 + 2 * (gf.n() - l1));

        let mut r = 0u32;
        let mut v = u;
        while v != 0 {
            let i = v.ilog2();
            r ^= gf.xi(i);
            v ^= 1 << i;
        }

        if (gf.sqr(r) ^ r) == u {
            roots.push(gf.reduce(2 * gf.n() - l1 - gf.log(r) + l2));
            roots.push(gf.reduce(2 * gf.n() - l1 - gf.log(r ^ 1) + l2));
        }
    }
    roots
}

/// Roots of a cubic, lifted to an affine quartic
///
/// Multiplying the monic cubic by `(X + a2)`, where `a2` is its
/// quadratic coefficient, cancels the cube term and yields an affine
/// quartic whose solutions are the cubic's roots plus `a2` itself.
fn deg3_roots(gf: &GaloisField, poly: &GfPoly) -> RootVec {
    let mut roots = RootVec::new();
    if poly.coeff[0] != 0 {
        let e3 = poly.coeff[3];
        let c2 = gf.div(poly.coeff[0], e3);
        let b2 = gf.div(poly.coeff[1], e3);
        let a2 = gf.div(poly.coeff[2], e3);

        let c = gf.mul(a2, c2);
        let b = gf.mul(a2, b2) ^ c2;
        let a = gf.sqr(a2) ^ b2;

        let mut sol = [0u32; 4];
        if affine4_roots(gf, a, b, c, &mut sol) == 4 {
            for &x in &sol {
                if x != a2 {
                    roots.push(gf.ilog(x));
                }
            }
        }
    }
    roots
}

/// Roots of a quartic
///
/// The monic quartic is first made affine: when the cubic coefficient
/// `a` is nonzero, substituting `X -> 1/X` and shifting by `e`
/// removes the odd terms. Solutions are mapped back through the same
/// substitutions.
fn deg4_roots(gf: &GaloisField, poly: &GfPoly) -> RootVec {
    let mut roots = RootVec::new();
    if poly.coeff[0] == 0 {
        return roots;
    }
    let e4 = poly.coeff[4];
    let mut d = gf.div(poly.coeff[0], e4);
    let mut c = gf.div(poly.coeff[1], e4);
    let mut b = gf.div(poly.coeff[2], e4);
    let a = gf.div(poly.coeff[3], e4);

    let mut e = 0u32;
    let (a2, b2, c2);
    if a != 0 {
        if c != 0 {
            let f = gf.div(c, a);
            let mut l = gf.log(f);
            if l & 1 != 0 {
                l += gf.n();
            }
            e = gf.pow(l / 2);
            d = gf.pow(2 * l) ^ gf.mul(b, f) ^ d;
            b = gf.mul(a, e) ^ b;
        }
        if d == 0 {
            return roots;
        }
        c2 = gf.inv(d);
        b2 = gf.div(a, d);
        a2 = gf.div(b, d);
    } else {
        c2 = d;
        b2 = c;
        a2 = b;
    }

    let mut sol = [0u32; 4];
    if affine4_roots(gf, a2, b2, c2, &mut sol) == 4 {
        for &x in &sol {
            let y = if a != 0 { gf.inv(x) } else { x };
            roots.push(gf.ilog(y ^ e));
        }
    }
    roots
}

/// Solve `X^4 + aX^2 + bX + c = 0` as a linear system over GF(2)
///
/// The map `X -> X^4 + aX^2 + bX` is GF(2)-linear, so its matrix in
/// the polynomial basis is built column by column, transposed into
/// row form, and solved against `c`. Returns the number of solutions
/// written to `sol`, which is 4 exactly when the system has rank
/// `m - 2`.
fn affine4_roots(gf: &GaloisField, a: u32, b: u32, c: u32, sol: &mut [u32; 4]) -> usize {
    let m = gf.m() as usize;
    let mut rows = [0u32; 16];

    let mut j = gf.log(b);
    let mut k = gf.log(a);
    rows[0] = c;
    for i in 0..m {
        rows[i + 1] = gf.pow(4 * i as u32)
            ^ (if a != 0 { gf.pow(k) } else { 0 })
            ^ (if b != 0 { gf.pow(j) } else { 0 });
        j += 1;
        k += 2;
    }

    // 16x16 in-register bit transpose
    let mut mask: u32 = 0xff;
    let mut jj = 8usize;
    while jj != 0 {
        let mut kk = 0usize;
        while kk < 16 {
            let t = ((rows[kk] >> jj) ^ rows[kk + jj]) & mask;
            rows[kk] ^= t << jj;
            rows[kk + jj] ^= t;
            kk = (kk + jj + 1) & !jj;
        }
        jj >>= 1;
        mask ^= mask << jj;
    }

    solve_linear_system(gf, &mut rows, sol, 4)
}

/// Gaussian elimination over GF(2) with free-parameter enumeration
///
/// Rows hold `m + 1` bits: the leading bit is the right-hand side and
/// the rest are the unknown's coordinates. Defective columns become
/// parameters; the system is accepted only if the solution count
/// matches `nsol` exactly.
fn solve_linear_system(
    gf: &GaloisField,
    rows: &mut [u32; 16],
    sol: &mut [u32; 4],
    nsol: usize,
) -> usize {
    let m = gf.m() as usize;
    let mut param = [0usize; 8];
    let mut k = 0usize;
    let mut mask: u32 = 1 << gf.m();

    // forward elimination
    for c in 0..m {
        let mut rem = 0usize;
        let p = c - k;
        for r in p..m {
            if rows[r] & mask != 0 {
                if r != p {
                    rows.swap(r, p);
                }
                rem = r + 1;
                break;
            }
        }
        if rem != 0 {
            let pivot = rows[p];
            for r in rem..m {
                if rows[r] & mask != 0 {
                    rows[r] ^= pivot;
                }
            }
        } else {
            param[k] = c;
            k += 1;
        }
        mask >>= 1;
    }

    // expand the reduced rows back to full height, inserting an
    // identity row for each free parameter
    if k > 0 {
        let mut p = k;
        for r in (0..m).rev() {
            if r > m - 1 - k && rows[r] != 0 {
                // inconsistent system
                return 0;
            }
            if p != 0 && r == param[p - 1] {
                p -= 1;
                rows[r] = 1 << (m - r);
            } else {
                rows[r] = rows[r - p];
            }
        }
    }

    if nsol != 1 << k {
        return 0;
    }

    // enumerate parameter assignments and back-substitute
    for s in 0..nsol {
        for c in 0..k {
            rows[param[c]] = (rows[param[c]] & !1) | ((s >> c) as u32 & 1);
        }
        let mut acc: u32 = 0;
        for r in (0..m).rev() {
            let picked = rows[r] & (acc | 1);
            acc |= (picked.count_ones() & 1) << (m - r);
        }
        sol[s] = acc >> 1;
    }
    nsol
}

/// One Berlekamp trace split
///
/// Computes `Tr(α^k X) mod f` and uses its gcd with `f` to separate
/// the roots by trace value. Returns the two factors, or `None` when
/// this trace function fails to distinguish any roots.
fn factor(gf: &GaloisField, k: u32, f: &GfPoly) -> Option<(GfPoly, GfPoly)> {
    let tk = trace_bk_mod(gf, k, f);
    if tk.degree > 0 {
        let gcd = poly_gcd(gf, f.clone(), tk);
        if gcd.degree < f.degree {
            let q = poly_div(gf, f.clone(), &gcd);
            return Some((gcd, q));
        }
    }
    None
}

/// `Tr(α^k X) mod f`, by repeated squaring
///
/// The trace is the sum of the conjugates `(α^k X)^(2^i)`; each term
/// is the square of the previous one reduced mod `f`, so the working
/// polynomial never grows past twice the degree of `f`.
fn trace_bk_mod(gf: &GaloisField, k: u32, f: &GfPoly) -> GfPoly {
    let mut z = GfPoly::zero();
    z.degree = 1;
    z.coeff[1] = gf.pow(k);
    let mut out = GfPoly::zero();

    for i in 0..gf.m() {
        // accumulate z into the output and square it in place;
        // descending order so each coefficient is read before its
        // doubled slot is written
        for j in (0..=z.degree).rev() {
            out.coeff[j] ^= z.coeff[j];
            z.coeff[2 * j] = gf.sqr(z.coeff[j]);
            z.coeff[2 * j + 1] = 0;
        }
        if z.degree > out.degree {
            out.degree = z.degree;
        }
        if i < gf.m() - 1 {
            z.degree *= 2;
            poly_mod(gf, &mut z, f);
        }
    }
    out.trim();
    out
}
