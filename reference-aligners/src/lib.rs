//! Quadratic reference aligners, used as a correctness oracle in tests.
//!
//! Everything here is a plain Needleman-Wunsch over unit costs: substitutions,
//! insertions and deletions all cost 1. These are slow on purpose and should
//! never be used outside of tests and benchmarks.
use pa_types::{Cost, Seq, Sequence};
use std::cmp::min;

/// The gap symbol used in aligned strings.
pub const GAP: u8 = b'-';

/// Full `(|a|+1) x (|b|+1)` unit-cost distance table.
fn nw_table(a: Seq, b: Seq) -> Vec<Vec<Cost>> {
    let mut d = vec![vec![0 as Cost; b.len() + 1]; a.len() + 1];
    for j in 0..=b.len() {
        d[0][j] = j as Cost;
    }
    for i in 1..=a.len() {
        d[i][0] = i as Cost;
        for j in 1..=b.len() {
            let sub = d[i - 1][j - 1] + (a[i - 1] != b[j - 1]) as Cost;
            let del = d[i - 1][j] + 1;
            let ins = d[i][j - 1] + 1;
            d[i][j] = min(sub, min(del, ins));
        }
    }
    d
}

/// The global edit distance between `a` and `b`.
pub fn exact_edit_distance(a: Seq, b: Seq) -> Cost {
    // Only keep a single row.
    let mut prev: Vec<Cost> = (0..=b.len() as Cost).collect();
    let mut next = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        next[0] = i as Cost + 1;
        for (j, cb) in b.iter().enumerate() {
            next[j + 1] = min(
                prev[j] + (ca != cb) as Cost,
                min(prev[j + 1] + 1, next[j] + 1),
            );
        }
        std::mem::swap(&mut prev, &mut next);
    }
    prev[b.len()]
}

/// The semi-global edit distance: the alignment may stop as soon as either
/// sequence is exhausted.
pub fn semi_global_edit_distance(a: Seq, b: Seq) -> Cost {
    let d = nw_table(a, b);
    let last_col = d.iter().map(|row| row[b.len()]).min().unwrap_or(0);
    let last_row = d[a.len()].iter().copied().min().unwrap_or(0);
    min(last_col, last_row)
}

/// An optimal global alignment of `a` and `b`, as two equal-length strings
/// where `-` marks a gap.
pub fn exact_alignment(a: Seq, b: Seq) -> (Sequence, Sequence) {
    let d = nw_table(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut aa = Vec::with_capacity(a.len() + b.len());
    let mut bb = Vec::with_capacity(a.len() + b.len());
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && d[i][j] == d[i - 1][j - 1] + (a[i - 1] != b[j - 1]) as Cost {
            aa.push(a[i - 1]);
            bb.push(b[j - 1]);
            i -= 1;
            j -= 1;
        } else if i > 0 && d[i][j] == d[i - 1][j] + 1 {
            aa.push(a[i - 1]);
            bb.push(GAP);
            i -= 1;
        } else {
            aa.push(GAP);
            bb.push(b[j - 1]);
            j -= 1;
        }
    }
    aa.reverse();
    bb.reverse();
    (aa, bb)
}

/// The cost of an alignment given as two aligned strings.
pub fn alignment_cost(aa: Seq, bb: Seq) -> Cost {
    assert_eq!(aa.len(), bb.len(), "Aligned strings differ in length");
    aa.iter().zip(bb).filter(|(x, y)| x != y).count() as Cost
}

/// Removes the gap symbols from an aligned string.
pub fn ungapped(aligned: Seq) -> Sequence {
    aligned.iter().copied().filter(|&c| c != GAP).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_distances() {
        assert_eq!(exact_edit_distance(b"AGTC", b"AGC"), 1);
        assert_eq!(exact_edit_distance(b"", b"ACGT"), 4);
        assert_eq!(exact_edit_distance(b"ACGT", b"ACGT"), 0);
        assert_eq!(exact_edit_distance(b"ACGT", b"TGCA"), 4);
        assert_eq!(exact_edit_distance(b"GATTACA", b"GCATGCT"), 4);
    }

    #[test]
    fn alignment_matches_distance() {
        for (a, b) in [
            (&b"ACTAGAACTT"[..], &b"ACTTAGCACT"[..]),
            (b"AGTC", b"AGC"),
            (b"", b"ACG"),
            (b"TTGGGTCAATCAGCCAGTTTTTA", b"TTTGAGTGGGTCATCACCGATTTTAT"),
        ] {
            let (aa, bb) = exact_alignment(a, b);
            assert_eq!(alignment_cost(&aa, &bb), exact_edit_distance(a, b));
            assert_eq!(ungapped(&aa), a);
            assert_eq!(ungapped(&bb), b);
        }
    }

    #[test]
    fn semi_global_is_at_most_global() {
        let (a, b) = (b"ACGTACGTTT", b"ACGTACG");
        assert_eq!(semi_global_edit_distance(a, b), 0);
        assert!(semi_global_edit_distance(a, b) <= exact_edit_distance(a, b));
    }
}
