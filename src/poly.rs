//! L3 — a fixed-capacity dense polynomial over GF(p) (spec §4.3).
//!
//! Capacity is 32 coefficients, so the highest representable degree is 31.
//! See `SPEC_FULL.md` ("Maximum n") for how this bounds `setSize`.

use crate::error::{FuzzyVaultError, Result};
use crate::field::Field;

/// Maximum number of coefficients a [`Poly`] can hold (spec §3).
pub const CAPACITY: usize = 32;

/// A root of a polynomial along with how many times the exhaustive scan
/// in [`Poly::find_roots`] encountered it. Per spec §4.3, the scan can
/// never actually produce a multiplicity greater than 1 — the field is
/// kept for API parity with a hypothetical factor-based implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Root {
    pub value: u32,
    pub multiplicity: u32,
}

/// A dense polynomial, coefficient `i` being the coefficient of `x^i`.
#[derive(Clone)]
pub struct Poly {
    coeffs: [u32; CAPACITY],
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            coeffs: [0; CAPACITY],
        }
    }

    /// Builds a polynomial from already-reduced field-element coefficients.
    pub fn from_coeffs(field: &Field, values: &[u32]) -> Result<Self> {
        if values.len() > CAPACITY {
            return Err(FuzzyVaultError::capacity(format!(
                "{} coefficients exceeds the capacity of {CAPACITY}",
                values.len()
            )));
        }
        let mut coeffs = [0u32; CAPACITY];
        for (i, &v) in values.iter().enumerate() {
            coeffs[i] = field.elem(v as i64);
        }
        Ok(Poly { coeffs })
    }

    pub fn coeff(&self, i: usize) -> u32 {
        self.coeffs[i]
    }

    pub fn set_coeff(&mut self, i: usize, v: u32) {
        self.coeffs[i] = v;
    }

    /// Highest index with a non-zero coefficient, or -1 for the zero
    /// polynomial.
    pub fn degree(&self) -> isize {
        let mut m = CAPACITY as isize - 1;
        while m >= 0 && self.coeffs[m as usize] == 0 {
            m -= 1;
        }
        m
    }

    pub fn add(&self, field: &Field, other: &Poly) -> Self {
        let mut out = self.clone();
        let n = other.degree();
        for i in 0..=n {
            let idx = i as usize;
            out.coeffs[idx] = field.add(out.coeffs[idx], other.coeffs[idx]);
        }
        out
    }

    pub fn sub(&self, field: &Field, other: &Poly) -> Self {
        let mut out = self.clone();
        let n = other.degree();
        for i in 0..=n {
            let idx = i as usize;
            out.coeffs[idx] = field.sub(out.coeffs[idx], other.coeffs[idx]);
        }
        out
    }

    /// Schoolbook convolution; the result's degree must stay below
    /// [`CAPACITY`].
    pub fn mul(&self, field: &Field, other: &Poly) -> Result<Self> {
        let m = self.degree();
        let n = other.degree();
        if m < 0 || n < 0 {
            return Ok(Poly::zero());
        }
        if (m + n) as usize >= CAPACITY {
            return Err(FuzzyVaultError::capacity(
                "polynomial multiplication result exceeds capacity",
            ));
        }
        let mut out = Poly::zero();
        for k in 0..=(m + n) {
            let k = k as usize;
            for i in 0..=k {
                if i as isize > m || (k - i) as isize > n {
                    continue;
                }
                out.coeffs[k] = field.add(out.coeffs[k], field.mul(self.coeffs[i], other.coeffs[k - i]));
            }
        }
        Ok(out)
    }

    /// Horner evaluation, top coefficient down.
    pub fn eval(&self, field: &Field, x: u32) -> u32 {
        let n = self.degree();
        let mut ans = 0u32;
        let mut i = n;
        while i >= 0 {
            ans = field.add(self.coeffs[i as usize], field.mul(x, ans));
            i -= 1;
        }
        ans
    }

    /// Euclidean division: `(q, r)` with `deg(r) < deg(v)`, such that
    /// `u = q*v + r`. Requires `deg(u) >= deg(v) >= 0`.
    pub fn div_rem(field: &Field, u: &Poly, v: &Poly) -> Result<(Poly, Poly)> {
        let m = u.degree();
        let n = v.degree();
        if m < 0 || n < 0 {
            return Err(FuzzyVaultError::validation(
                "div_rem: both polynomials must be non-zero",
            ));
        }
        if m < n {
            return Err(FuzzyVaultError::validation(
                "div_rem: dividend degree must be >= divisor degree",
            ));
        }
        let mut numerator = u.clone();
        let mut quotient = Poly::zero();
        let v_lead_inv = field.inv(v.coeffs[n as usize])?;
        let mut k = m - n;
        while k >= 0 {
            let ku = k as usize;
            let nu = n as usize;
            let qk = field.mul(numerator.coeffs[nu + ku], v_lead_inv);
            quotient.coeffs[ku] = qk;
            let mut j = n + k - 1;
            while j >= k {
                let ju = j as usize;
                numerator.coeffs[ju] = field.sub(numerator.coeffs[ju], field.mul(qk, v.coeffs[ju - ku]));
                j -= 1;
            }
            k -= 1;
        }
        let mut remainder = Poly::zero();
        for i in 0..(n as usize) {
            remainder.coeffs[i] = numerator.coeffs[i];
        }
        Ok((quotient, remainder))
    }

    /// The monic polynomial with exactly the given roots:
    /// `prod (x - r_i)`.
    pub fn from_roots(field: &Field, roots: &[u32]) -> Result<Self> {
        let mut ans = Poly::zero();
        ans.coeffs[0] = 1;
        for &r in roots {
            let linear = Poly::from_coeffs(field, &[field.neg(r), 1])?;
            ans = ans.mul(field, &linear)?;
        }
        Ok(ans)
    }

    /// Exhaustive root search over `0..prime`. Acceptable because
    /// `prime <= 32768` (spec §4.3).
    pub fn find_roots(&self, field: &Field) -> Vec<Root> {
        let mut roots = Vec::new();
        for k in 0..field.prime() {
            if self.eval(field, k) == 0 {
                roots.push(Root {
                    value: k,
                    multiplicity: 1,
                });
            }
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_roots_evaluates_to_zero_at_each_root() {
        let field = Field::new(7001).unwrap();
        let roots = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let poly = Poly::from_roots(&field, &roots).unwrap();
        for &r in &roots {
            assert_eq!(poly.eval(&field, r), 0);
        }
    }

    #[test]
    fn find_roots_recovers_exact_set() {
        let field = Field::new(7001).unwrap();
        let roots = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let poly = Poly::from_roots(&field, &roots).unwrap();
        let found = poly.find_roots(&field);
        assert_eq!(found.len(), roots.len());
        for r in &found {
            assert_eq!(r.multiplicity, 1);
            assert!(roots.contains(&r.value));
        }
    }

    #[test]
    fn div_rem_identity_holds() {
        let field = Field::new(7001).unwrap();
        let u = Poly::from_coeffs(&field, &[7, 12, 27, 27, 18]).unwrap();
        let v = Poly::from_coeffs(&field, &[1, 2, 3]).unwrap();
        let (q, r) = Poly::div_rem(&field, &u, &v).unwrap();
        assert!(r.degree() < v.degree());
        let reconstructed = q.mul(&field, &v).unwrap().add(&field, &r);
        for i in 0..CAPACITY {
            assert_eq!(reconstructed.coeff(i), u.coeff(i));
        }
    }

    #[test]
    fn capacity_exceeded_is_an_error() {
        let field = Field::new(11).unwrap();
        let values = vec![1u32; CAPACITY + 1];
        assert!(Poly::from_coeffs(&field, &values).is_err());
    }
}
