//! Shared test harness: random inputs and oracle cross-checks.
use itertools::Itertools;
use rand::{seq::IteratorRandom, thread_rng, Rng};

use pa_generate::ErrorModel;
use pa_types::*;
use reference_algos::{alignment_cost, exact_edit_distance, ungapped};

/// Output of an aligner under test: the reported cost and optionally the two
/// aligned strings.
pub type Output = (Cost, Option<(Sequence, Sequence)>);

pub fn test_sequences() -> Vec<(Seq<'static>, Seq<'static>)> {
    vec![
        (b"AGTC", b"AGC"),
        (b"ACTAGAACTT", b"ACTTAGCACT"),
        (b"TTGGGTCAATCAGCCAGTTTTTA", b"TTTGAGTGGGTCATCACCGATTTTAT"),
        (b"ACTGACCAGT", b"CCGACAGGA"),
        (b"AGTTTTAT", b"ACCGATTTTTA"),
        (b"CTCTCTTCTCTCTCTA", b"CCTCTCTCTCTCCTCTC"),
        (b"AGTGGGTTGCCTTCATTCCG", b"AGTGGTGTCTTCAGGCCTTCATTCCG"),
        (b"GCACGTCGCCCCCCGCCCGCG", b"GCCCGCCCGCCCGCCCCCGCCCCC"),
        (b"TAATGGTCGCCCTGCCCAAACTCCGAATTCATGCGATCCCTTTTCAAGCCTGACTTCATCCTATATATCCCACAAGCCCGGACTGATACGCTCGTGCTGG",
         b"TAATGGTCGCCCTGCCCAAACTCCGAATCTGCGATCCCTTTTCAAGCCTGACTTCATCCTATATATCCCACAAGCCCGGACTGATACGCTCGTGCGTGG"),
    ]
}

const FIXED: bool = false;

/// Random inputs over a grid of lengths, error rates and error models.
///
/// Only a random quarter of the grid is used on each run; CI runs often
/// enough to get good coverage.
pub fn gen_seqs() -> impl Iterator<Item = ((Sequence, Sequence), (usize, f32, ErrorModel, u64))> {
    let rng = &mut thread_rng();
    let mut ns = vec![
        0usize, 1, 2, 3, 4, 5, 7, 10, 16, 20, 31, 32, 33, 50, 63, 64, 65, 100, 127, 128, 129, 200,
        255, 256, 300,
    ];
    let mut es = vec![0.0f32, 0.01, 0.02, 0.05, 0.10, 0.15, 0.20, 0.30];

    if !FIXED {
        let nl = ns.len();
        ns = ns.into_iter().choose_multiple(rng, nl / 4);
        let el = es.len();
        es = es.into_iter().choose_multiple(rng, el / 4);
    }

    let models = [
        ErrorModel::Uniform,
        ErrorModel::NoisyInsert,
        ErrorModel::NoisyDelete,
        ErrorModel::SymmetricRepeat,
    ];
    let seeds = if FIXED {
        [31415]
    } else {
        [rng.gen_range(0..u64::MAX)]
    };
    ns.into_iter()
        .cartesian_product(es)
        .cartesian_product(models)
        .cartesian_product(seeds)
        .map(|(((n, e), error_model), seed)| {
            let (a, b) = pa_generate::generate_model(n, e, error_model, seed);
            ((a, b), (n, e, error_model, seed))
        })
}

/// The number of lanes needed to reach the destination, plus some slack.
pub fn lanes_for(a: Seq, b: Seq, slack: i32) -> i32 {
    (a.len() as i32 - b.len() as i32).abs() + slack
}

/// Checks one output against the oracle.
///
/// - With `exact`, the cost must equal the edit distance. Otherwise it must
///   not be below it.
/// - Returned aligned strings must reproduce the inputs when gaps are removed
///   and must cost exactly the reported cost.
pub fn check_output(a: Seq, b: Seq, exact: bool, (cost, aligned): Output, params: &str) {
    let distance = triple_accel::levenshtein_exp(a, b) as Cost;
    debug_assert_eq!(distance, exact_edit_distance(a, b));
    if exact {
        assert_eq!(
            distance,
            cost,
            "\n{params}\nlet a = \"{}\".as_bytes();\nlet b = \"{}\".as_bytes();",
            seq_to_string(a),
            seq_to_string(b),
        );
    } else {
        assert!(
            cost >= distance,
            "\n{params}\nCost {cost} is below the edit distance {distance}\nlet a = \"{}\".as_bytes();\nlet b = \"{}\".as_bytes();",
            seq_to_string(a),
            seq_to_string(b),
        );
    }
    let Some((aa, bb)) = aligned else {
        // Alignment not returned so not checked.
        return;
    };
    assert_eq!(aa.len(), bb.len(), "{params}");
    assert_eq!(ungapped(&aa), a, "{params}\n{}", seq_to_string(&aa));
    assert_eq!(ungapped(&bb), b, "{params}\n{}", seq_to_string(&bb));
    assert_eq!(
        alignment_cost(&aa, &bb),
        cost,
        "{params}\n{}\n{}",
        seq_to_string(&aa),
        seq_to_string(&bb)
    );
}

/// Runs `align` on the hardcoded and the random inputs and checks each output.
pub fn test_aligner_up_to(
    exact: bool,
    max_n: usize,
    mut align: impl FnMut(Seq, Seq) -> Output,
) {
    for (a, b) in test_sequences() {
        let params = format!(
            "hardcoded test_sequences: a {:?} b {:?}",
            seq_to_string(a),
            seq_to_string(b)
        );
        eprintln!("{params}");
        check_output(a, b, exact, align(a, b), &params);
    }
    for ((a, b), (n, e, error_model, seed)) in gen_seqs() {
        if n > max_n {
            continue;
        }
        let params = format!("seed {seed:>10} n {n:>5} e {e:>.2} error_model {error_model:?}");
        eprintln!("{params}");
        check_output(&a, &b, exact, align(&a, &b), &params);
    }
}

/// Mean absolute error of an approximate aligner over `samples` random pairs
/// of length `n` with error rate `e`.
pub fn mean_excess(n: usize, e: f32, samples: u64, mut cost: impl FnMut(Seq, Seq) -> Cost) -> f64 {
    let mut total = 0;
    for seed in 0..samples {
        let (a, b) = pa_generate::uniform_seeded(n, e, seed);
        let distance = triple_accel::levenshtein_exp(&a, &b) as Cost;
        let c = cost(&a, &b);
        assert!(c >= distance);
        total += (c - distance) as u64;
    }
    total as f64 / samples as f64
}
