//! Injected services (spec §6.4): the CSPRNG and the hash/KDF primitives.
//! These are treated as external collaborators by the spec; this module
//! supplies the production bindings plus the deterministic override used
//! for reproducible tests (spec §4.5.1 step 4, §8 scenario S5).

use hmac::{Hmac, Mac};
use rand::RngCore;
use scrypt::Params as ScryptParams;
use sha2::{Digest, Sha512};
use sha3::Sha3_512;

use crate::error::{FuzzyVaultError, Result};

/// A source of random bytes. Swappable so `gen_params` can be driven by a
/// caller-supplied byte stream for deterministic test reproducibility
/// (spec §6.4) instead of the OS CSPRNG.
pub trait Rng {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// A random non-negative `u32`, masked the way the original
    /// implementation masks its platform `int` (clears the top bit of a
    /// 4-byte draw) — see `SPEC_FULL.md` point 3 on `rand_select`.
    fn next_masked_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf) & 0x7FFF_FFFF)
    }
}

/// The default, OS-backed CSPRNG.
pub struct OsRng;

impl Rng for OsRng {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        rand::rngs::OsRng.fill_bytes(buf);
        Ok(())
    }
}

/// Replays a caller-supplied byte buffer instead of drawing from the OS.
/// Exhausting the buffer is a validation error, not a panic — the
/// original's `rng_t::pop` throws for the same condition (`SPEC_FULL.md`
/// point 4).
pub struct FixedBytesRng<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FixedBytesRng<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        FixedBytesRng { bytes, pos: 0 }
    }
}

impl<'a> Rng for FixedBytesRng<'a> {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.pos + buf.len() > self.bytes.len() {
            return Err(FuzzyVaultError::validation(
                "randomBytes exhausted before parameter generation finished",
            ));
        }
        buf.copy_from_slice(&self.bytes[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }
}

/// SHA-512, named as an injected-service collaborator by spec §6.4. Not
/// load-bearing in the protocol itself (only scrypt and HMAC-SHA3-512 are),
/// kept for interface parity.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// scrypt with the fixed parameters N=1024, r=8, p=16 (spec §4.5.6),
/// 64-byte output.
pub fn scrypt(pass: &[u8], salt: &[u8]) -> Result<[u8; 64]> {
    let params = ScryptParams::new(10, 8, 16, 64)
        .map_err(|e| FuzzyVaultError::field_limit(format!("invalid scrypt parameters: {e}")))?;
    let mut out = [0u8; 64];
    scrypt::scrypt(pass, salt, &params, &mut out)
        .map_err(|e| FuzzyVaultError::field_limit(format!("scrypt failed: {e}")))?;
    Ok(out)
}

/// HMAC-SHA3-512(key, data) -> 64 bytes.
pub fn hmac_sha3_512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac =
        Hmac::<Sha3_512>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    let result = mac.finalize().into_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&result);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bytes_rng_replays_exactly() {
        let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut rng = FixedBytesRng::new(&bytes);
        let mut buf = [0u8; 4];
        rng.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        rng.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [5, 6, 7, 8]);
        assert!(rng.fill_bytes(&mut buf).is_err());
    }

    #[test]
    fn scrypt_is_deterministic() {
        let a = scrypt(b"pass", b"salt-salt-salt-salt-salt-salt-32").unwrap();
        let b = scrypt(b"pass", b"salt-salt-salt-salt-salt-salt-32").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hmac_output_is_64_bytes_and_key_sensitive() {
        let a = hmac_sha3_512(b"key1", b"data");
        let b = hmac_sha3_512(b"key2", b"data");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
