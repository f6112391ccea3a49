//! L4 — the Berlekamp–Welch decoder (spec §4.4).
//!
//! Reconstructs the unique message polynomial of degree < k from n noisy
//! evaluations, tolerating up to `t` disagreements, given `n >= k + 2t`.

use crate::error::{FuzzyVaultError, Result};
use crate::field::Field;
use crate::matrix::Matrix;
use crate::poly::Poly;

/// Runs Berlekamp–Welch over the evaluation pairs `(as[i], bs[i])`.
///
/// `k` is the message-polynomial degree bound (number of information
/// coefficients); `t` is the one-sided error budget. Fails with
/// `NoSolution` if the inputs are not decodable with this `t`.
pub fn berlekamp_welch(field: &Field, as_: &[u32], bs: &[u32], k: usize, t: usize) -> Result<Poly> {
    if as_.len() != bs.len() || as_.is_empty() {
        return Err(FuzzyVaultError::validation(
            "berlekamp_welch: evaluation point and value counts must match and be non-empty",
        ));
    }
    if k == 0 || t == 0 {
        return Err(FuzzyVaultError::validation(
            "berlekamp_welch: k and t must be positive",
        ));
    }
    let n = as_.len();

    let mut m = Matrix::zeros(n, n)?;
    let mut y = Matrix::zeros(n, 1)?;

    for i in 0..n {
        let b = bs[i];
        let apowers = field.powers(as_[i], k + t);
        for j in 0..(k + t) {
            m.set(i, j, apowers[j])?;
        }
        for j in 0..t {
            m.set(i, j + k + t, field.neg(field.mul(b, apowers[j])))?;
        }
        y.set(i, 0, field.mul(b, apowers[t]))?;
    }

    let x = m.solve(field, &y)?;

    let mut q_coeffs = vec![0u32; k + t];
    for (i, slot) in q_coeffs.iter_mut().enumerate() {
        *slot = x.get(i, 0)?;
    }
    let q = Poly::from_coeffs(field, &q_coeffs)?;

    let e = n - k - t;
    let mut e_coeffs = vec![0u32; e + 1];
    for (i, slot) in e_coeffs.iter_mut().enumerate().take(e) {
        *slot = x.get(k + t + i, 0)?;
    }
    e_coeffs[e] = 1;
    let error_locator = Poly::from_coeffs(field, &e_coeffs)?;

    let (quotient, remainder) = Poly::div_rem(field, &q, &error_locator)?;
    if remainder.degree() >= 0 {
        return Err(FuzzyVaultError::NoSolution);
    }
    Ok(quotient)
}
