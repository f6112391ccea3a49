//! End-to-end testing of the vault protocol across `gen_params`,
//! `gen_secret`, and `gen_keys`, plus a few scheme-independent algebraic
//! identities (matrix solve, polynomial division, Berlekamp-Welch)
//! exercised at crate-level scale rather than the unit-test scale used
//! inside each module.

use fuzzy_vault::decoder::berlekamp_welch;
use fuzzy_vault::field::Field;
use fuzzy_vault::matrix::Matrix;
use fuzzy_vault::poly::Poly;
use fuzzy_vault::{gen_keys, gen_params, gen_secret, FuzzyVaultError};

const PRIME: u32 = 7789;

fn fixed_params(set_size: u32, correct_threshold: u32, corpus_size: u32) -> String {
    let salt = "AA".repeat(32);
    let input = format!(
        r#"{{"setSize":{set_size},"correctThreshold":{correct_threshold},"corpusSize":{corpus_size},"randomBytes":["{salt}","{extra}"]}}"#,
        extra = "BB".repeat(32),
    );
    gen_params(&input).expect("gen_params should succeed on well-formed input")
}

#[test]
fn exact_guess_recovers_keys() {
    let params = fixed_params(9, 6, 7776);
    let words = "[1,2,3,4,5,6,7,8,9]";
    let secret = gen_secret(&params, words).expect("gen_secret should succeed");
    let keys = gen_keys(&secret, words, 2).expect("exact match should recover keys");
    let parsed: Vec<String> = serde_json::from_str(&keys).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_ne!(parsed[0], parsed[1], "distinct indices must derive distinct keys");
}

#[test]
fn fuzzy_guess_within_threshold_recovers_the_same_keys() {
    // setSize=10, correctThreshold=8 => t = n - c = 2 (even, as recover_words
    // requires), decoder budget t/2 = 1.
    let params = fixed_params(10, 8, 1000);
    let originals = "[1,2,3,4,5,6,7,8,9,10]";
    let secret = gen_secret(&params, originals).expect("gen_secret should succeed");

    let exact_keys = gen_keys(&secret, originals, 1).unwrap();

    let one_wrong = "[1,2,3,4,5,6,7,8,9,500]";
    let fuzzy_keys = gen_keys(&secret, one_wrong, 1).expect("one mismatch is within budget");
    assert_eq!(exact_keys, fuzzy_keys, "recovery must be independent of the guess order/corruption");
}

#[test]
fn guess_order_does_not_affect_recovered_keys() {
    let params = fixed_params(9, 6, 7776);
    let originals = "[1,2,3,4,5,6,7,8,9]";
    let secret = gen_secret(&params, originals).unwrap();

    let in_order = gen_keys(&secret, originals, 1).unwrap();
    let shuffled = gen_keys(&secret, "[9,8,7,6,5,4,3,2,1]", 1).unwrap();
    assert_eq!(in_order, shuffled);
}

#[test]
fn too_many_mismatches_fail_to_recover() {
    // Same even-t configuration as the fuzzy-recovery test above: t = 2,
    // decoder budget t/2 = 1, so two corruptions exceed the budget and the
    // decoder itself must report NoSolution (not reject earlier on the
    // t-must-be-even check).
    let params = fixed_params(10, 8, 1000);
    let originals = "[1,2,3,4,5,6,7,8,9,10]";
    let secret = gen_secret(&params, originals).unwrap();

    let two_wrong = "[1,2,3,4,5,6,7,8,500,600]";
    let result = gen_keys(&secret, two_wrong, 1);
    assert!(matches!(result, Err(FuzzyVaultError::NoSolution)));
}

#[test]
fn repeated_words_in_a_guess_are_rejected() {
    let params = fixed_params(9, 6, 7776);
    let originals = "[1,2,3,4,5,6,7,8,9]";
    let secret = gen_secret(&params, originals).unwrap();

    let repeated = "[1,1,2,3,4,5,6,7,8]";
    let result = gen_keys(&secret, repeated, 1);
    assert!(matches!(result, Err(FuzzyVaultError::Validation(_))));
}

#[test]
fn gen_params_rejects_correct_threshold_below_half_of_set_size() {
    let input = r#"{"setSize":10,"correctThreshold":4,"corpusSize":1000}"#;
    assert!(gen_params(input).is_err());
}

#[test]
fn gen_params_rejects_set_size_at_or_above_corpus_size() {
    let input = r#"{"setSize":10,"correctThreshold":10,"corpusSize":10}"#;
    assert!(gen_params(input).is_err());
}

#[test]
fn gen_params_is_deterministic_given_the_same_random_bytes() {
    let salt = "AA".repeat(32);
    let extractor_bytes = "BB".repeat(32);
    let input = format!(
        r#"{{"setSize":5,"correctThreshold":5,"corpusSize":100,"randomBytes":["{salt}","{extractor_bytes}"]}}"#
    );
    let p1 = gen_params(&input).unwrap();
    let p2 = gen_params(&input).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn zero_key_count_yields_an_empty_key_list() {
    // correctThreshold < setSize so t = n - c > 0 and gen_secret's sketch
    // generation (which requires a non-empty error budget) succeeds.
    let params = fixed_params(5, 4, 100);
    let words = "[1,2,3,4,5]";
    let secret = gen_secret(&params, words).unwrap();
    let keys = gen_keys(&secret, words, 0).unwrap();
    let parsed: Vec<String> = serde_json::from_str(&keys).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn matrix_solve_agrees_with_the_decoder_on_a_shared_evaluation_set() {
    let field = Field::new(PRIME).unwrap();
    let message = Poly::from_coeffs(&field, &[3, 5, 1]).unwrap(); // 1x^2 + 5x + 3, k = 3
    let k = 3;
    let t = 2;
    let n = k + 2 * t; // 7, so the decoder's n x n system is exactly determined
    let points: Vec<u32> = (1..=n as u32).collect();
    let mut evals: Vec<u32> = points.iter().map(|&x| message.eval(&field, x)).collect();
    // corrupt a single evaluation, within the t = 2 error budget
    evals[0] = field.add(evals[0], 1);

    let decoded = berlekamp_welch(&field, &points, &evals, k, t).unwrap();
    for i in 0..k {
        assert_eq!(decoded.coeff(i), message.coeff(i));
    }
}

#[test]
fn rank_deficient_linear_system_recovers_a_particular_solution() {
    let field = Field::new(PRIME).unwrap();
    // x + y = 1, 2x + 2y = 2: infinitely many solutions, particular one is (1, 0).
    let m = Matrix::from_rows(2, 2, &[1, 1, 2, 2]).unwrap();
    let rhs = Matrix::from_rows(2, 1, &[1, 2]).unwrap();
    let solution = m.solve(&field, &rhs).unwrap();
    assert_eq!(solution.get(0, 0).unwrap(), 1);
    assert_eq!(solution.get(1, 0).unwrap(), 0);
}
