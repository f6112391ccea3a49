//! Statistical self-test harness for the fuzzy vault scheme (spec §6.5,
//! §8). Repeatedly: draws a random original word set, confirms the exact
//! match recovers keys, then mutates a random number of words (favoring
//! small mutation counts, to simulate a guess with partial knowledge) and
//! checks the recovery outcome against a prediction derived from
//! `correctThreshold`. Any mismatch between prediction and outcome is
//! logged and turns into a non-zero process exit code.
//!
//! Usage: `randomtest <set-size> <correct-threshold> <corpus-size> <test-count>`

use std::collections::HashSet;
use std::io::Write as _;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;

use fuzzy_vault::error::FuzzyVaultError;
use fuzzy_vault::{gen_keys, gen_params, gen_secret};

#[derive(Parser, Debug)]
#[command(about = "Randomized statistical test of the fuzzy vault key recovery scheme")]
struct Args {
    /// Number of words comprising the secret.
    set_size: u32,
    /// Minimum number of original words a guess must match to recover keys.
    correct_threshold: u32,
    /// Size of the universe words are drawn from.
    corpus_size: u32,
    /// Number of randomized trials to run.
    test_count: u32,
}

/// Whether keys are expected to come back, fail to recover, or blow up
/// outright (repeated guess words corrupt the field of candidates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prediction {
    Success,
    NoSolution,
    Failure,
}

/// Predicts the outcome of a recovery attempt from the mismatch count
/// alone. We expect recovery to succeed whenever the number of correct
/// words in the guess is at least `correct_threshold`; a repeated word
/// anywhere in the guess is treated as a guaranteed failure.
fn get_prediction(set_size: u32, correct_threshold: u32, mismatch_count: u32, repeats: bool) -> Prediction {
    if repeats {
        return Prediction::Failure;
    }
    if correct_threshold + mismatch_count <= set_size {
        Prediction::Success
    } else {
        Prediction::NoSolution
    }
}

/// A descending weighting sequence `{0, size-1, size-2, ..., 1}` used to
/// bias randomly generated mutation counts toward small values.
fn lengths(size: u32) -> Vec<u32> {
    let mut out = vec![0];
    for i in 0..size.saturating_sub(1) {
        out.push(size - i - 1);
    }
    out
}

/// Running totals of `lengths`, turning the weighting sequence into bin
/// boundaries for `bin_for`.
fn running_sums(lengths: &[u32]) -> Vec<u32> {
    let mut sum = 0;
    lengths
        .iter()
        .map(|&x| {
            sum += x;
            sum
        })
        .collect()
}

/// Maps a draw in `1..=sums.last()` to the bin (mutation count) it falls
/// in: larger bins, corresponding to smaller mutation counts, are more
/// likely to be hit.
fn bin_for(sums: &[u32], draw: u32) -> u32 {
    let mut left = 0;
    for (i, &right) in sums.iter().enumerate() {
        if left < draw && draw <= right {
            return i as u32;
        }
        left = right;
    }
    unreachable!("draw out of the sums range")
}

/// Draws a random mutation count, weighted toward small values.
fn random_mutation_count(rng: &mut impl Rng, sums: &[u32]) -> u32 {
    let top = *sums.last().expect("sums is non-empty");
    let draw = rng.gen_range(1..=top);
    bin_for(sums, draw)
}

/// Draws `count` distinct words from `0..corpus_size` by shuffling a deck
/// and taking a prefix — used only by this harness, not the library (the
/// library's own sampling is [`fuzzy_vault::protocol`]'s `rand_select`,
/// which must additionally support replaying supplied randomness).
fn random_words(rng: &mut impl Rng, count: u32, corpus_size: u32) -> Vec<i64> {
    let mut deck: Vec<i64> = (0..corpus_size as i64).collect();
    deck.shuffle(rng);
    deck.truncate(count as usize);
    deck
}

fn has_repeats(words: &[i64]) -> bool {
    let set: HashSet<i64> = words.iter().copied().collect();
    set.len() != words.len()
}

fn intersection_count(xs: &[i64], ys: &[i64]) -> u32 {
    let x_set: HashSet<i64> = xs.iter().copied().collect();
    ys.iter().filter(|y| x_set.contains(y)).count() as u32
}

/// Pads a mutated word list back up to `originals.len()` by borrowing a
/// prefix of the originals, so the guess presented to recovery always has
/// the expected size.
fn fill_out_mutated(mutated: &mut Vec<i64>, originals: &[i64]) {
    let set_size = originals.len();
    let mutation_count = mutated.len();
    for &w in &originals[..set_size - mutation_count] {
        mutated.push(w);
    }
}

fn build_secret(set_size: u32, correct_threshold: u32, corpus_size: u32, originals: &[i64]) -> anyhow::Result<String> {
    let input = serde_json::json!({
        "setSize": set_size,
        "correctThreshold": correct_threshold,
        "corpusSize": corpus_size,
    })
    .to_string();
    let params = gen_params(&input)?;
    let words = serde_json::to_string(originals)?;
    Ok(gen_secret(&params, &words)?)
}

fn log_example(secret: &str, originals: &[i64], mutants: &[i64]) {
    tracing::warn!(
        secret,
        original_words = ?originals,
        mutated_words = ?mutants,
        "prediction did not match experiment"
    );
}

/// Runs the original words through recovery unmodified. This is the
/// control case; it must always succeed.
fn exact_match_test(set_size: u32, correct_threshold: u32, corpus_size: u32, originals: &[i64]) -> anyhow::Result<i32> {
    let secret = build_secret(set_size, correct_threshold, corpus_size, originals)?;
    let words = serde_json::to_string(originals)?;
    match gen_keys(&secret, &words, 1) {
        Ok(_) => Ok(0),
        Err(_) => {
            log_example(&secret, originals, originals);
            Ok(6)
        }
    }
}

/// Mutates the originals by a random, small-biased amount, attempts
/// recovery, and checks the outcome against the prediction. Returns a
/// nonzero exit code describing exactly which prediction/outcome
/// combination was violated.
fn mutate_test(
    rng: &mut impl Rng,
    originals: &[i64],
    correct_threshold: u32,
    corpus_size: u32,
    sums: &[u32],
) -> anyhow::Result<i32> {
    let set_size = originals.len() as u32;
    let n_mutations = random_mutation_count(rng, sums);
    let secret = build_secret(set_size, correct_threshold, corpus_size, originals)?;

    let mut mutants = random_words(rng, n_mutations, corpus_size);
    fill_out_mutated(&mut mutants, originals);
    let mismatch_count = set_size - intersection_count(&mutants, originals);
    let repeats = has_repeats(&mutants);

    let words = serde_json::to_string(&mutants)?;
    let prediction = get_prediction(set_size, correct_threshold, mismatch_count, repeats);

    // Mirrors the three-way switch the original test harness runs: each
    // prediction tolerates one "expected" outcome silently, logs and
    // reports a code on the others. Notably, an unpredicted *success*
    // is logged as a curiosity but never treated as a hard failure.
    let outcome = gen_keys(&secret, &words, 1);
    match (prediction, &outcome) {
        (Prediction::Success, Ok(_)) => Ok(0),
        (Prediction::Success, Err(FuzzyVaultError::NoSolution)) => {
            log_example(&secret, originals, &mutants);
            Ok(1)
        }
        (Prediction::Success, Err(_)) => {
            log_example(&secret, originals, &mutants);
            Ok(2)
        }
        (Prediction::NoSolution, Ok(_)) => {
            log_example(&secret, originals, &mutants);
            Ok(0)
        }
        (Prediction::NoSolution, Err(FuzzyVaultError::NoSolution)) => Ok(0),
        (Prediction::NoSolution, Err(_)) => {
            log_example(&secret, originals, &mutants);
            Ok(3)
        }
        (Prediction::Failure, Ok(_)) => {
            log_example(&secret, originals, &mutants);
            Ok(0)
        }
        (Prediction::Failure, Err(FuzzyVaultError::NoSolution)) => {
            log_example(&secret, originals, &mutants);
            Ok(4)
        }
        (Prediction::Failure, Err(_)) => Ok(5),
    }
}

fn single_test(
    rng: &mut impl Rng,
    set_size: u32,
    correct_threshold: u32,
    corpus_size: u32,
    sums: &[u32],
) -> anyhow::Result<i32> {
    let originals = random_words(rng, set_size, corpus_size);
    exact_match_test(set_size, correct_threshold, corpus_size, &originals)?;
    let rc = mutate_test(rng, &originals, correct_threshold, corpus_size, sums)?;
    if rc != 0 {
        return Ok(7);
    }
    Ok(0)
}

const ROW_LENGTH: u32 = 100;

fn work(set_size: u32, correct_threshold: u32, corpus_size: u32, test_count: u32) -> anyhow::Result<i32> {
    let mut rng = rand::thread_rng();
    let sums = running_sums(&lengths(set_size));

    let mut rc = 0;
    let mut j = 0;
    let stdout = std::io::stdout();
    for i in 0..test_count {
        j += 1;
        print!(".");
        stdout.lock().flush().ok();
        if j == ROW_LENGTH {
            println!("{:>12}", i + 1);
            j = 0;
        }
        rc = single_test(&mut rng, set_size, correct_threshold, corpus_size, &sums)?;
    }
    println!();
    Ok(rc)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    tracing::info!(?args, "starting randomtest");

    let rc = work(args.set_size, args.correct_threshold, args.corpus_size, args.test_count)?;
    std::process::exit(rc);
}
