//! Column-range edits between alignments.
//!
//! - `join`: concatenate two alignments row by row
//! - `stitch`: splice together column intervals of a source alignment
//! - `truncate`: extract one column range of a source alignment
//!
//! Each function validates fully before writing to the destination and
//! leaves it untouched on error. The destination's consensus is re-derived
//! over its whole new length.

use std::ops::Range;

use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::model::{Edge, Feature, Row};

fn check_alphabets(dst: &Alignment, src: &Alignment) -> Result<()> {
    if dst.alphabet() != src.alphabet() {
        return Err(Error::AlphabetMismatch {
            expected: dst.alphabet().name().to_string(),
            found: src.alphabet().name().to_string(),
        });
    }
    Ok(())
}

/// Appends the columns of `src` to `dst` at the given edge.
///
/// Rows are paired by index, so both alignments must have the same number
/// of rows. Row identifiers of `dst` are kept.
pub fn join(dst: &mut Alignment, src: &Alignment, edge: Edge) -> Result<()> {
    check_alphabets(dst, src)?;
    if dst.rows() != src.rows() {
        return Err(Error::ShapeMismatch {
            context: "join row count",
            expected: dst.rows(),
            found: src.rows(),
        });
    }

    let rows: Vec<Row> = dst
        .iter()
        .zip(src.iter())
        .map(|(d, s)| match edge {
            Edge::End => d.concat(s),
            Edge::Start => {
                let mut row = s.concat(d);
                row.id.clone_from(&d.id);
                row
            }
        })
        .collect();
    let len = dst.len() + src.len();

    tracing::debug!(
        rows = rows.len(),
        columns = len,
        "Joined '{}' onto '{}' at {:?}",
        src.id,
        dst.id,
        edge
    );
    dst.replace_rows(rows, len);
    Ok(())
}

/// Clips features to `[0, len)` and drops the ones left empty.
///
/// Negative starts are clamped to zero rather than rejected: features
/// from other coordinate systems can underflow.
fn clip_features<F: Feature>(features: &[F], len: usize) -> Vec<Range<usize>> {
    let len = len as isize;
    features
        .iter()
        .filter_map(|f| {
            let start = f.start().max(0);
            let end = f.end().min(len);
            if f.start() < 0 {
                tracing::warn!("Clamped feature start {} to 0", f.start());
            }
            if start >= end {
                tracing::warn!("Dropped empty feature {}..{}", f.start(), f.end());
                return None;
            }
            Some(start as usize..end as usize)
        })
        .collect()
}

fn stitched_rows<F: Feature>(src: &Alignment, features: &[F]) -> (Vec<Row>, usize) {
    let ranges = clip_features(features, src.len());
    let len: usize = ranges.iter().map(|r| r.len()).sum();
    let rows: Vec<Row> = src.iter().map(|r| r.splice(&ranges)).collect();
    (rows, len)
}

/// Replaces the rows of `dst` with the columns of `src` selected by `features`.
///
/// Features are concatenated in the order given. Each is clipped to
/// `[0, src.len())`; features left empty by clipping contribute nothing.
/// The destination takes the source's row identifiers.
pub fn stitch<F: Feature>(dst: &mut Alignment, src: &Alignment, features: &[F]) -> Result<()> {
    check_alphabets(dst, src)?;
    let (rows, len) = stitched_rows(src, features);
    tracing::debug!(
        rows = rows.len(),
        columns = len,
        "Stitched {} features of '{}' into '{}'",
        features.len(),
        src.id,
        dst.id
    );
    dst.replace_rows(rows, len);
    Ok(())
}

fn check_range(src: &Alignment, start: usize, end: usize) -> Result<()> {
    if start >= end || end > src.len() {
        return Err(Error::InvalidRange {
            start,
            end,
            len: src.len(),
        });
    }
    Ok(())
}

fn truncated_rows(src: &Alignment, start: usize, end: usize) -> Vec<Row> {
    src.iter().map(|r| r.extract(start..end)).collect()
}

/// Replaces the rows of `dst` with columns `[start, end)` of `src`.
///
/// Fails unless `start < end <= src.len()`. The destination takes the
/// source's row identifiers.
pub fn truncate(dst: &mut Alignment, src: &Alignment, start: usize, end: usize) -> Result<()> {
    check_alphabets(dst, src)?;
    check_range(src, start, end)?;
    let rows = truncated_rows(src, start, end);
    tracing::debug!(
        rows = rows.len(),
        columns = end - start,
        "Truncated '{}' to {}..{} into '{}'",
        src.id,
        start,
        end,
        dst.id
    );
    dst.replace_rows(rows, end - start);
    Ok(())
}

impl Alignment {
    /// Stitches this alignment's own columns selected by `features`.
    pub fn stitch<F: Feature>(&mut self, features: &[F]) -> Result<()> {
        let (rows, len) = stitched_rows(self, features);
        tracing::debug!(
            rows = rows.len(),
            columns = len,
            "Stitched {} features of '{}' in place",
            features.len(),
            self.id
        );
        self.replace_rows(rows, len);
        Ok(())
    }

    /// Keeps only columns `[start, end)` of this alignment.
    pub fn truncate(&mut self, start: usize, end: usize) -> Result<()> {
        check_range(self, start, end)?;
        let rows = truncated_rows(self, start, end);
        tracing::debug!(
            rows = rows.len(),
            columns = end - start,
            "Truncated '{}' to {}..{} in place",
            self.id,
            start,
            end
        );
        self.replace_rows(rows, end - start);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::model::Interval;

    fn example() -> Alignment {
        Alignment::builder("example alignment")
            .row("seq 1", "ACGCTGACTTGGTGCACGT")
            .row("seq 2", "ACGGTGACCTGGCGCGCAT")
            .row("seq 3", "ACGATGACGTGGCGCTCAT")
            .build()
            .unwrap()
    }

    fn small(rows: &[&str]) -> Alignment {
        let mut builder = Alignment::builder("small");
        for (i, r) in rows.iter().enumerate() {
            builder = builder.row(format!("r{}", i), *r);
        }
        builder.build().unwrap()
    }

    fn row_strings(a: &Alignment) -> Vec<String> {
        a.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_join_at_end() {
        let mut dst = small(&["AC", "GT"]);
        let src = small(&["WW", "YY"]);
        join(&mut dst, &src, Edge::End).unwrap();
        assert_eq!(row_strings(&dst), vec!["ACWW", "GTYY"]);
        assert_eq!(dst.len(), 4);
        assert_eq!(dst.consensus().len(), 4);
    }

    #[test]
    fn test_join_at_start_keeps_ids() {
        let mut dst = small(&["AC", "GT"]);
        let mut src = small(&["WW", "YY"]);
        src.id = "other".to_string();
        join(&mut dst, &src, Edge::Start).unwrap();
        assert_eq!(row_strings(&dst), vec!["WWAC", "YYGT"]);
        assert_eq!(dst.row_ids().collect::<Vec<_>>(), vec!["r0", "r1"]);
    }

    #[test]
    fn test_join_length_law() {
        let mut dst = example();
        let src = example();
        join(&mut dst, &src, Edge::End).unwrap();
        assert_eq!(dst.len(), 38);
        assert_eq!(dst.consensus_string(), "acgxtgacxtggcgcxcatacgxtgacxtggcgcxcat");
    }

    #[test]
    fn test_join_row_count_mismatch() {
        let mut dst = example();
        let src = small(&["AC", "GT"]);
        let err = join(&mut dst, &src, Edge::End).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert_eq!(dst.len(), 19);
        assert_eq!(dst.rows(), 3);
    }

    #[test]
    fn test_join_alphabet_mismatch() {
        let mut dst = small(&["AC"]);
        let src = Alignment::builder("dna")
            .alphabet(Alphabet::dna())
            .row("r", "AC")
            .build()
            .unwrap();
        assert!(matches!(
            join(&mut dst, &src, Edge::End),
            Err(Error::AlphabetMismatch { .. })
        ));
    }

    #[test]
    fn test_stitch_and_truncate_alphabet_mismatch() {
        let src = Alignment::builder("dna")
            .alphabet(Alphabet::dna())
            .row("r0", "ACGT")
            .row("r1", "ACGA")
            .build()
            .unwrap();
        let mut dst = small(&["WY", "YW"]);

        let err = stitch(&mut dst, &src, &[Interval::new(0, 2)]).unwrap_err();
        assert_eq!(
            err,
            Error::AlphabetMismatch {
                expected: "Protein".to_string(),
                found: "DNA".to_string(),
            }
        );
        assert_eq!(row_strings(&dst), vec!["WY", "YW"]);

        let err = truncate(&mut dst, &src, 0, 2).unwrap_err();
        assert!(matches!(err, Error::AlphabetMismatch { .. }));
        assert_eq!(row_strings(&dst), vec!["WY", "YW"]);
        assert_eq!(dst.consensus_string(), "xx");
    }

    #[test]
    fn test_stitch_clamps_negative_start() {
        let mut dst = example();
        join(&mut dst, &example(), Edge::End).unwrap();
        let src = dst.copy();

        let features = [Interval::new(-1, 4), Interval::new(30, 38)];
        stitch(&mut dst, &src, &features).unwrap();
        assert_eq!(dst.len(), 12);
        assert_eq!(dst.get(0).unwrap().to_string(), "ACGCGTGCACGT");
        assert_eq!(dst.consensus().len(), 12);
    }

    #[test]
    fn test_stitch_clips_and_drops() {
        let src = small(&["ACDEFGHIKL", "ACDEFGHIKL"]);
        let mut dst = small(&["A", "C"]);
        let features = [
            Interval::new(5, 20),
            Interval::new(3, 3),
            Interval::new(8, 2),
            Interval::new(-5, -1),
            Interval::new(0, 2),
        ];
        stitch(&mut dst, &src, &features).unwrap();
        assert_eq!(row_strings(&dst), vec!["GHIKLAC", "GHIKLAC"]);
        assert_eq!(dst.len(), 7);
    }

    #[test]
    fn test_stitch_nothing_selected() {
        let mut a = small(&["ACGT", "ACGT"]);
        a.stitch(&[Interval::new(4, 9)]).unwrap();
        assert_eq!(a.len(), 0);
        assert_eq!(a.rows(), 2);
        assert!(a.consensus().is_empty());
    }

    #[test]
    fn test_truncate_range_law() {
        let src = example();
        let mut dst = small(&["A"]);
        truncate(&mut dst, &src, 4, 12).unwrap();
        assert_eq!(dst.len(), 8);
        assert_eq!(dst.rows(), 3);
        assert_eq!(dst.get(0).unwrap().to_string(), "TGACTTGG");
        assert_eq!(dst.consensus_string(), "tgacxtgg");
        assert_eq!(dst.row_ids().next(), Some("seq 1"));
    }

    #[test]
    fn test_truncate_out_of_range() {
        let src = example();
        let mut dst = example();
        assert!(truncate(&mut dst, &src, 5, 5).unwrap_err().is_out_of_range());
        assert!(truncate(&mut dst, &src, 6, 2).unwrap_err().is_out_of_range());
        assert!(truncate(&mut dst, &src, 0, 20).unwrap_err().is_out_of_range());
        assert!(truncate(&mut dst, &src, 0, 19).is_ok());
        assert_eq!(dst.len(), 19);
    }

    #[test]
    fn test_truncate_in_place() {
        let mut a = example();
        a.truncate(17, 19).unwrap();
        assert_eq!(row_strings(&a), vec!["GT", "AT", "AT"]);
        assert_eq!(a.consensus_string(), "at");
        assert!(a.truncate(0, 3).is_err());
        assert_eq!(a.len(), 2);
    }
}
