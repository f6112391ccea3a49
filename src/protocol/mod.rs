//! L5 — the vault protocol: parameter generation, sketch generation, fuzzy
//! recovery, and key derivation (spec §4.5). This is the only layer that
//! invokes the decoder (L4); the field (L1) and polynomial (L3) layers are
//! set up once per top-level call using the prime carried in
//! `Params`/`Secret`.

mod sample;

use crate::decoder::berlekamp_welch;
use crate::envelope::{self, Input, Params, Secret};
use crate::error::{FuzzyVaultError, Result};
use crate::field::{next_prime, Field};
use crate::poly::Poly;
use crate::services::{self, FixedBytesRng, OsRng, Rng};

/// Maximum `setSize` the fixed-capacity polynomial layer can represent
/// (see `SPEC_FULL.md`, "Maximum n"): `P_high` places a monic term at
/// coefficient index `n`, which must fit in the 32-slot array.
pub const MAX_SET_SIZE: u32 = (crate::poly::CAPACITY - 1) as u32;

fn push_int(out: &mut Vec<u8>, n: i64) {
    out.extend_from_slice(&(n as i32).to_le_bytes());
}

fn validate_config(set_size: u32, correct_threshold: u32, corpus_size: u32) -> Result<()> {
    if set_size == 0 {
        return Err(FuzzyVaultError::validation("setSize must be positive"));
    }
    if set_size >= corpus_size {
        return Err(FuzzyVaultError::validation(
            "setSize must be less than corpusSize",
        ));
    }
    if correct_threshold > set_size {
        return Err(FuzzyVaultError::validation(
            "correctThreshold must not exceed setSize",
        ));
    }
    if 2 * correct_threshold < set_size {
        return Err(FuzzyVaultError::validation(
            "correctThreshold must be at least half of setSize (2c >= n)",
        ));
    }
    if set_size > MAX_SET_SIZE {
        return Err(FuzzyVaultError::capacity(format!(
            "setSize {set_size} exceeds the maximum of {MAX_SET_SIZE} the polynomial layer can represent"
        )));
    }
    Ok(())
}

/// Checks a word list has exactly `set_size` distinct entries, each in
/// `[0, corpus_size)`, and returns them as field-ready `u32`s, in their
/// original (uncanonicalized) order.
fn check_words(words: &[i64], set_size: u32, corpus_size: u32) -> Result<Vec<u32>> {
    if words.len() as u32 != set_size {
        return Err(FuzzyVaultError::validation(format!(
            "expected {set_size} words, got {}",
            words.len()
        )));
    }
    let mut sorted = words.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != words.len() {
        return Err(FuzzyVaultError::validation("words must be distinct"));
    }
    let mut out = Vec::with_capacity(words.len());
    for &w in words {
        if !(0 <= w && w < corpus_size as i64) {
            return Err(FuzzyVaultError::validation(format!(
                "word {w} out of range [0, {corpus_size})"
            )));
        }
        out.push(w as u32);
    }
    Ok(out)
}

/// The top-t sketch coefficients of the monic polynomial whose roots are
/// `words` (spec §4.5.5): `tail_t(from_roots(words))`, omitting the
/// implicit leading 1.
fn gen_sketch(field: &Field, words: &[u32], t: usize) -> Result<Vec<u32>> {
    if t == 0 || words.len() <= t {
        return Err(FuzzyVaultError::validation(
            "gen_sketch: error budget must be positive and less than setSize",
        ));
    }
    let poly = Poly::from_roots(field, words)?;
    let offset = words.len() - t;
    Ok((0..t).map(|i| poly.coeff(offset + i)).collect())
}

/// `H_hash(W) = scrypt("original_words:" || le32(w_1) || ... || le32(w_n), salt)`
/// (spec §4.5.6).
fn hash_words(sorted_words: &[u32], salt: &[u8]) -> Result<[u8; 64]> {
    let mut pass = b"original_words:".to_vec();
    for &w in sorted_words {
        push_int(&mut pass, w as i64);
    }
    services::scrypt(&pass, salt)
}

/// Reconstructs `P_high`: degree-n, coefficients `[0..n-t)` zero,
/// `[n-t..n)` the sketch, coefficient `n` equal to 1 (spec §4.5.7 step 2).
fn rebuild_p_high(field: &Field, sketch: &[u32], n: usize) -> Result<Poly> {
    let t = sketch.len();
    let offset = n - t;
    let mut coeffs = vec![0u32; n + 1];
    for (i, &c) in sketch.iter().enumerate() {
        coeffs[offset + i] = c;
    }
    coeffs[n] = 1;
    Poly::from_coeffs(field, &coeffs)
}

/// Inverts the sketching identity given a guess: if the guess shares at
/// least `n - t/2` of the originals, the roots of `P_high - P_low` are
/// exactly the original words (spec §4.5.7).
fn recover_words(field: &Field, guess: &[u32], sketch: &[u32], t: usize) -> Result<Vec<u32>> {
    if t % 2 != 0 {
        return Err(FuzzyVaultError::validation("recover_words: t must be even"));
    }
    let n = guess.len();
    let p_high = rebuild_p_high(field, sketch, n)?;
    let bs: Vec<u32> = guess.iter().map(|&a| p_high.eval(field, a)).collect();
    let p_low = berlekamp_welch(field, guess, &bs, n - t, t / 2)?;
    let p_diff = p_high.sub(field, &p_low);
    let roots = p_diff.find_roots(field);
    if roots.len() != n || roots.iter().any(|r| r.multiplicity > 1) {
        return Err(FuzzyVaultError::NoSolution);
    }
    Ok(roots.into_iter().map(|r| r.value).collect())
}

/// `e = prod (W[i] * E[i]) mod p`; `ek = scrypt("key:" || le32(e), salt)`
/// (spec §4.5.8).
fn derive_ek(field: &Field, sorted_words: &[u32], extractor: &[u32], salt: &[u8]) -> Result<[u8; 64]> {
    let mut e = 1u32;
    for (&w, &x) in sorted_words.iter().zip(extractor.iter()) {
        e = field.mul(e, field.mul(w, x));
    }
    let mut pass = b"key:".to_vec();
    push_int(&mut pass, e as i64);
    services::scrypt(&pass, salt)
}

/// `gen_params` (spec §4.5.1): validates the input, picks the prime,
/// acquires randomness, and samples the extractor.
/// Picks the OS CSPRNG unless the caller supplied `randomBytes`, in which
/// case the supplied bytes are replayed instead (spec §4.5.1 step 4).
enum AnyRng<'a> {
    Os(OsRng),
    Fixed(FixedBytesRng<'a>),
}

impl<'a> Rng for AnyRng<'a> {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        match self {
            AnyRng::Os(r) => r.fill_bytes(buf),
            AnyRng::Fixed(r) => r.fill_bytes(buf),
        }
    }
}

pub fn gen_params(input_json: &str) -> Result<String> {
    let input = Input::from_json(input_json)?;
    validate_config(input.set_size, input.correct_threshold, input.corpus_size)?;

    let prime = next_prime(input.corpus_size)?;
    let field = Field::new(prime)?;

    let random_bytes = input.random_bytes()?;
    let mut rng = match &random_bytes {
        Some(bytes) => AnyRng::Fixed(FixedBytesRng::new(bytes)),
        None => AnyRng::Os(OsRng),
    };

    let mut salt = vec![0u8; 32];
    rng.fill_bytes(&mut salt)?;
    let extractor = sample::rand_select(&mut rng, field.prime(), input.set_size)?;

    let params = Params {
        set_size: input.set_size,
        correct_threshold: input.correct_threshold,
        corpus_size: input.corpus_size,
        prime,
        extractor,
        salt,
    };
    params.to_json()
}

/// `gen_secret` (spec §4.5.2): validates the words against `Params`,
/// canonicalizes by sorting, and derives the sketch and hash.
pub fn gen_secret(params_json: &str, words_json: &str) -> Result<String> {
    let params = Params::from_json(params_json)?;
    let field = Field::new(params.prime)?;

    let words = envelope::parse_words(words_json)?;
    let checked = check_words(&words, params.set_size, params.corpus_size)?;
    let mut sorted_words = checked;
    sorted_words.sort_unstable();

    let t = params.set_size - params.correct_threshold;
    let sketch = gen_sketch(&field, &sorted_words, t as usize)?;
    let hash = hash_words(&sorted_words, &params.salt)?.to_vec();

    let secret = Secret {
        set_size: params.set_size,
        correct_threshold: params.correct_threshold,
        corpus_size: params.corpus_size,
        prime: params.prime,
        extractor: params.extractor,
        salt: params.salt,
        sketch,
        hash,
    };
    secret.to_json()
}

/// `gen_keys` (spec §4.5.3): fast-path exact match via the hash gate, or
/// fuzzy recovery through the decoder, followed by key derivation.
pub fn gen_keys(secret_json: &str, guess_json: &str, key_count: usize) -> Result<String> {
    let secret = Secret::from_json(secret_json)?;
    let field = Field::new(secret.prime)?;

    let guess = envelope::parse_words(guess_json)?;
    let guess_words = check_words(&guess, secret.set_size, secret.corpus_size)?;

    let mut sorted_guess = guess_words.clone();
    sorted_guess.sort_unstable();

    let candidate_hash = hash_words(&sorted_guess, &secret.salt)?;
    let recovered = if candidate_hash.as_slice() == secret.hash.as_slice() {
        sorted_guess
    } else {
        let t = secret.set_size - secret.correct_threshold;
        let recovered = recover_words(&field, &guess_words, &secret.sketch, t as usize)?;
        let recovered_hash = hash_words(&recovered, &secret.salt)?;
        if recovered_hash.as_slice() != secret.hash.as_slice() {
            return Err(FuzzyVaultError::NoSolution);
        }
        recovered
    };

    let ek = derive_ek(&field, &recovered, &secret.extractor, &secret.salt)?;
    let mut keys = Vec::with_capacity(key_count);
    for i in 0..key_count {
        let mut i_bytes = Vec::new();
        push_int(&mut i_bytes, i as i64);
        keys.push(services::hmac_sha3_512(&i_bytes, &ek));
    }
    envelope::keys_to_json(&keys)
}
