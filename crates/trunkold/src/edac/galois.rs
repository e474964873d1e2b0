//! Galois field arithmetic for GF(2^m)
//!
//! Field elements are represented as integers whose bits are the
//! coefficients of a polynomial over GF(2), reduced by a primitive
//! polynomial of degree `m`. Construction builds the exponent and
//! discrete-log tables once; every arithmetic operation afterward is a
//! constant-time table lookup, which keeps the decode hot path free of
//! data-dependent work.
//!
//! The field also carries a small table (`xi_tab`) of half-trace
//! solutions to `x^2 + x = a^i`, which the degree-2 root finder uses to
//! solve quadratics without search.

/// Conventional primitive polynomial for GF(2^m), `2 <= m <= 8`
///
/// These are the usual minimum-weight choices. Any primitive
/// polynomial of the right degree will do; decoders for a published
/// code must use the polynomial the code was designed against.
pub const fn default_primitive_poly(m: u32) -> u32 {
    match m {
        2 => 0x7,
        3 => 0xB,
        4 => 0x13,
        5 => 0x25,
        6 => 0x43,
        7 => 0x83,
        8 => 0x11D,
        _ => panic!("no default primitive polynomial for this field exponent"),
    }
}

/// GF(2^m) arithmetic tables
///
/// Immutable once constructed. `pow_tab[i]` holds `α^i` and
/// `log_tab[x]` holds the discrete log of `x`, with the convention
/// `log_tab[0] == 0` (a sentinel, not a meaningful logarithm; callers
/// that might pass zero must guard first).
pub(crate) struct GaloisField {
    m: u32,
    n: u32,
    pow_tab: Vec<u32>,
    log_tab: Vec<u32>,
    xi_tab: Vec<u32>,
}

impl GaloisField {
    /// Build the field tables for GF(2^m)
    ///
    /// # Panics
    ///
    /// Panics if `m` is outside `2..=8`, if `primitive_poly` does not
    /// have degree `m`, or if it is not primitive (the generated
    /// exponent table must visit every nonzero element exactly once).
    pub fn new(m: u32, primitive_poly: u32) -> Self {
        assert!((2..=8).contains(&m), "field exponent out of range: {}", m);
        assert_eq!(
            primitive_poly >> m,
            1,
            "primitive polynomial 0x{:X} does not have degree {}",
            primitive_poly,
            m
        );

        let size = 1usize << m;
        let n = (size - 1) as u32;

        let mut pow_tab = vec![0u32; size];
        let mut log_tab = vec![0u32; size];

        let mut x: u32 = 1;
        for i in 0..size - 1 {
            pow_tab[i] = x;
            log_tab[x as usize] = i as u32;
            x <<= 1;
            if x & size as u32 != 0 {
                x ^= primitive_poly;
            }
        }
        pow_tab[size - 1] = 1;
        log_tab[0] = 0;

        // a reducible or non-primitive polynomial produces a cycle
        // shorter than n, which breaks the bijection checked here
        for v in 1..=n {
            assert_eq!(
                pow_tab[log_tab[v as usize] as usize], v,
                "0x{:X} is not primitive for GF(2^{})",
                primitive_poly, m
            );
        }

        let mut field = GaloisField {
            m,
            n,
            pow_tab,
            log_tab,
            xi_tab: Vec::new(),
        };
        field.build_deg2_base();
        field
    }

    /// Field exponent m
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Multiplicative order, `n = 2^m - 1`
    pub fn n(&self) -> u32 {
        self.n
    }

    /// `α^exp` for any exponent, reduced mod n
    pub fn pow(&self, exp: u32) -> u32 {
        self.pow_tab[self.reduce(exp) as usize]
    }

    /// Discrete log of `x`; `log(0)` returns the sentinel 0
    pub fn log(&self, x: u32) -> u32 {
        self.log_tab[x as usize]
    }

    /// Log of the inverse of nonzero `x`
    pub fn ilog(&self, x: u32) -> u32 {
        self.reduce_once(self.n - self.log_tab[x as usize])
    }

    /// Reduce an exponent known to be below `2n`
    pub fn reduce_once(&self, v: u32) -> u32 {
        debug_assert!(v < 2 * self.n);
        if v < self.n {
            v
        } else {
            v - self.n
        }
    }

    /// Reduce an arbitrary exponent mod `n`
    ///
    /// Folds the value using `2^m ≡ 1 (mod n)` rather than dividing.
    pub fn reduce(&self, mut v: u32) -> u32 {
        while v >= self.n {
            v -= self.n;
            v = (v & self.n) + (v >> self.m);
        }
        v
    }

    /// Field product; zero if either operand is zero
    pub fn mul(&self, a: u32, b: u32) -> u32 {
        if a != 0 && b != 0 {
            self.pow_tab
                [self.reduce_once(self.log_tab[a as usize] + self.log_tab[b as usize]) as usize]
        } else {
            0
        }
    }

    /// Field quotient; zero if either operand is zero
    pub fn div(&self, a: u32, b: u32) -> u32 {
        if a != 0 && b != 0 {
            self.pow_tab[self
                .reduce_once(self.log_tab[a as usize] + self.n - self.log_tab[b as usize])
                as usize]
        } else {
            0
        }
    }

    /// Field square
    pub fn sqr(&self, a: u32) -> u32 {
        if a > 0 {
            self.pow_tab[self.reduce_once(2 * self.log_tab[a as usize]) as usize]
        } else {
            0
        }
    }

    /// Multiplicative inverse of nonzero `a`
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero. Zero has no inverse and a request for
    /// one is a caller bug, not a data condition.
    pub fn inv(&self, a: u32) -> u32 {
        assert!(a != 0, "inverse of zero requested");
        self.pow_tab[(self.n - self.log_tab[a as usize]) as usize]
    }

    /// Half-trace solution entry used by the degree-2 root finder
    pub fn xi(&self, i: u32) -> u32 {
        self.xi_tab[i as usize]
    }

    /// Build `xi_tab` such that `xi^2 + xi = a^i + Tr(a^i)·a^k` with
    /// `Tr(a^k) = 1`, giving closed-form solutions for `z^2 + z = u`.
    fn build_deg2_base(&mut self) {
        let m = self.m as usize;
        let mut xi_tab = vec![0u32; m];
        let mut xi_seen = vec![false; m];

        // find k such that Tr(a^k) = 1 and 0 <= k < m
        let mut ak = 0u32;
        for i in 0..m as u32 {
            let mut sum = 0u32;
            for j in 0..self.m {
                sum ^= self.pow(i * (1 << j));
            }
            if sum != 0 {
                ak = self.pow_tab[i as usize];
                break;
            }
        }

        let mut remaining = m;
        let mut x = 0u32;
        while x <= self.n && remaining != 0 {
            let mut y = self.sqr(x) ^ x;
            for _ in 0..2 {
                let r = self.log(y) as usize;
                if y != 0 && r < m && !xi_seen[r] {
                    xi_tab[r] = x;
                    xi_seen[r] = true;
                    remaining -= 1;
                    break;
                }
                y ^= ak;
            }
            x += 1;
        }
        assert_eq!(remaining, 0, "degree-2 base construction left {} slots unfilled", remaining);

        self.xi_tab = xi_tab;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_bijective() {
        for m in 2..=8 {
            let gf = GaloisField::new(m, default_primitive_poly(m));
            for x in 1..=gf.n() {
                assert_eq!(gf.pow(gf.log(x)), x);
            }
            // α^n wraps to the multiplicative identity
            assert_eq!(gf.pow(gf.n()), 1);
            assert_eq!(gf.pow(0), 1);
        }
    }

    #[test]
    fn products_and_quotients_invert() {
        let gf = GaloisField::new(6, default_primitive_poly(6));
        for x in 1..=gf.n() {
            assert_eq!(gf.mul(x, gf.inv(x)), 1);
            assert_eq!(gf.sqr(x), gf.mul(x, x));
            for y in [1, 2, 17, 40, gf.n()] {
                assert_eq!(gf.div(gf.mul(x, y), y), x);
            }
        }
    }

    #[test]
    fn zero_operands_yield_zero() {
        let gf = GaloisField::new(6, default_primitive_poly(6));
        assert_eq!(gf.mul(0, 17), 0);
        assert_eq!(gf.mul(17, 0), 0);
        assert_eq!(gf.div(0, 17), 0);
        assert_eq!(gf.div(17, 0), 0);
        assert_eq!(gf.sqr(0), 0);
    }

    #[test]
    #[should_panic]
    fn inverse_of_zero_panics() {
        let gf = GaloisField::new(4, default_primitive_poly(4));
        gf.inv(0);
    }

    #[test]
    fn exponent_reduction_wraps() {
        let gf = GaloisField::new(6, default_primitive_poly(6));
        let n = gf.n();
        assert_eq!(gf.reduce(n), 0);
        assert_eq!(gf.reduce(2 * n + 5), 5);
        assert_eq!(gf.reduce_once(n + 7), 7);
        // α^(a+n) == α^a
        for a in [0, 1, 13, 62] {
            assert_eq!(gf.pow(a + n), gf.pow(a));
        }
    }

    #[test]
    fn half_trace_base_solves_trace_zero_quadratics() {
        // summing xi entries over the set bits of u solves z^2 + z = u
        // exactly when u has trace zero, and the trace kernel holds
        // half the field
        for m in 2..=8 {
            let gf = GaloisField::new(m, default_primitive_poly(m));
            let mut solved = 0usize;
            for u in 1..=gf.n() {
                let mut r = 0u32;
                let mut v = u;
                while v != 0 {
                    let i = v.ilog2();
                    r ^= gf.xi(i);
                    v ^= 1 << i;
                }
                if (gf.sqr(r) ^ r) == u {
                    solved += 1;
                }
            }
            assert_eq!(solved, (1usize << (m - 1)) - 1);
        }
    }
}
