//! Uniform distinct sampling, `rand_select` (spec §4.5.4): a Fisher–Yates
//! prefix variant, pulled out into its own function the way the teacher
//! factors a reusable routine (e.g. `pkcs7_pad`) out of the challenge that
//! first needed it.

use crate::error::{FuzzyVaultError, Result};
use crate::services::Rng;

/// Draws `m` distinct integers from `0..n`, uniformly at random, without
/// replacement. Consumes one masked `u32` per draw; `k = draw % (n - i)`
/// carries the documented modulo bias (spec §4.5.4, §9) — acceptable
/// because `n <= 32768`.
pub fn rand_select(rng: &mut dyn Rng, n: u32, m: u32) -> Result<Vec<u32>> {
    if !(0 < m && m <= n) {
        return Err(FuzzyVaultError::validation(
            "rand_select: need 0 < m <= n",
        ));
    }
    let mut xs: Vec<u32> = (0..n).collect();
    let mut out = Vec::with_capacity(m as usize);
    for i in 0..m {
        let draw = rng.next_masked_u32()?;
        let k = draw % (n - i);
        let idx = (k + i) as usize;
        out.push(xs[idx]);
        xs[idx] = xs[i as usize];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FixedBytesRng;

    #[test]
    fn selects_distinct_values_in_range() {
        // 5 draws of 4 bytes each
        let bytes: Vec<u8> = (0..20u8).collect();
        let mut rng = FixedBytesRng::new(&bytes);
        let selection = rand_select(&mut rng, 100, 5).unwrap();
        assert_eq!(selection.len(), 5);
        let mut sorted = selection.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        assert!(selection.iter().all(|&x| x < 100));
    }

    #[test]
    fn rejects_m_greater_than_n() {
        let bytes = [0u8; 32];
        let mut rng = FixedBytesRng::new(&bytes);
        assert!(rand_select(&mut rng, 3, 4).is_err());
    }
}
