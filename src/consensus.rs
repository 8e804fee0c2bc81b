//! Consensus policies.
//!
//! A policy turns the symbols of one alignment column into one consensus
//! letter. Consensus letters are rendered in lower case to mark them as
//! derived; columns without a usable consensus get the alphabet's
//! ambiguity symbol, also in lower case (`x` for proteins, `n` for nucleic
//! acids).
//!
//! Policies are plain values carried by each alignment, so different
//! alignments can use different rules side by side.

use std::ops::Range;

use crate::alphabet::Alphabet;
use crate::model::{QLetter, Row};

/// Highest quality a consensus letter is given (Sanger encoding limit).
pub const MAX_QUALITY: u8 = 93;

/// A column-to-letter consensus rule.
pub trait Consensus: Send + Sync {
    /// Computes the consensus letter for one column, given top to bottom.
    fn consense(&self, column: &[u8], alphabet: &Alphabet) -> QLetter;

    /// Short name used in debug output.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Consensus for F
where
    F: Fn(&[u8], &Alphabet) -> QLetter + Send + Sync,
{
    fn consense(&self, column: &[u8], alphabet: &Alphabet) -> QLetter {
        self(column, alphabet)
    }
}

/// Converts an error probability into a Phred quality, capped at [`MAX_QUALITY`].
pub fn phred(error: f64) -> u8 {
    if error <= 0.0 {
        return MAX_QUALITY;
    }
    let q = -10.0 * error.log10();
    q.round().clamp(0.0, MAX_QUALITY as f64) as u8
}

/// The no-consensus marker for an alphabet.
pub fn marker(alphabet: &Alphabet) -> u8 {
    alphabet.ambiguous().to_ascii_lowercase()
}

/// Quality of a letter supported by `support` of `total` rows.
fn agreement_quality(support: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    phred(1.0 - support as f64 / total as f64)
}

/// The default policy: the most frequent letter wins.
///
/// Letters are counted case-insensitively and gaps are ignored. A tie for
/// the highest count, or a column of gaps only, yields the marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plurality;

impl Consensus for Plurality {
    fn consense(&self, column: &[u8], alphabet: &Alphabet) -> QLetter {
        let mut counts = vec![0usize; alphabet.len()];
        for &l in column {
            if let Some(i) = alphabet.index_of(l) {
                counts[i] += 1;
            }
        }

        let mut max = 0;
        let mut best = None;
        let mut tied = false;
        for (i, &n) in counts.iter().enumerate() {
            if n > max {
                max = n;
                best = Some(i);
                tied = false;
            } else if n == max && n > 0 {
                tied = true;
            }
        }

        let q = agreement_quality(max, column.len());
        match best.and_then(|i| alphabet.letter(i)) {
            Some(l) if !tied => QLetter::new(l.to_ascii_lowercase(), q),
            _ => QLetter::new(marker(alphabet), q),
        }
    }

    fn name(&self) -> &str {
        "plurality"
    }
}

/// Strict policy: every non-gap letter in the column must be the same.
///
/// A single dissenting row yields the marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Consensus for Identity {
    fn consense(&self, column: &[u8], alphabet: &Alphabet) -> QLetter {
        let mut seen = None;
        let mut support = 0;
        for &l in column {
            let Some(i) = alphabet.index_of(l) else {
                continue;
            };
            match seen {
                None => seen = Some(i),
                Some(s) if s != i => return QLetter::new(marker(alphabet), 0),
                Some(_) => {}
            }
            support += 1;
        }

        match seen.and_then(|i| alphabet.letter(i)) {
            Some(l) => {
                let q = agreement_quality(support, column.len());
                QLetter::new(l.to_ascii_lowercase(), q)
            }
            None => QLetter::new(marker(alphabet), 0),
        }
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Computes consensus letters for the columns in `range`.
///
/// Only the requested columns are visited; the caller splices the result
/// into its consensus row.
pub fn consense_range(
    policy: &dyn Consensus,
    alphabet: &Alphabet,
    rows: &[Row],
    range: Range<usize>,
) -> Vec<QLetter> {
    let mut column = Vec::with_capacity(rows.len());
    range
        .map(|col| {
            column.clear();
            column.extend(rows.iter().filter_map(|r| r.letter_at(col)));
            policy.consense(&column, alphabet)
        })
        .collect()
}
