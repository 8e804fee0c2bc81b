//! The multiple sequence alignment.
//!
//! An [`Alignment`] is a rectangular grid of letters, one [`Row`] per
//! sequence and one column per alignment position, plus a consensus row
//! derived from the data rows by the alignment's [`Consensus`] policy.
//!
//! ## Invariants
//!
//! - Every data row has exactly `len()` symbols.
//! - The consensus row has exactly `len()` entries and is not a data row.
//! - Every symbol is a letter of the alphabet (either case) or the gap.
//!
//! Each mutating method validates its input before changing anything and
//! re-derives the affected consensus columns before returning.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::consensus::{consense_range, Consensus, Plurality};
use crate::error::{Axis, Error, Result};
use crate::model::{Position, QLetter, Row};

/// A multiple sequence alignment with a synchronized consensus row.
pub struct Alignment {
    /// The alignment identifier
    pub id: String,
    /// Optional free-text description
    pub description: Option<String>,
    rows: Vec<Row>,
    /// Column count, kept separately so zero-row alignments have a length
    len: usize,
    alphabet: Alphabet,
    policy: Arc<dyn Consensus>,
    consensus: Vec<QLetter>,
}

impl Alignment {
    /// Creates an alignment from row-major data.
    ///
    /// All rows must have the same length and contain only letters of
    /// `alphabet` or its gap symbol.
    pub fn new(
        id: impl Into<String>,
        rows: Vec<Row>,
        alphabet: Alphabet,
        policy: Arc<dyn Consensus>,
    ) -> Result<Self> {
        let len = rows.first().map_or(0, Row::len);
        if let Some(row) = rows.iter().find(|r| r.len() != len) {
            return Err(Error::ShapeMismatch {
                context: "row length",
                expected: len,
                found: row.len(),
            });
        }
        Self::assemble(id.into(), rows, len, alphabet, policy)
    }

    /// Creates an alignment from column-major data.
    ///
    /// Column `i` supplies one symbol per row: its `j`-th symbol becomes
    /// row `j`, column `i` of the alignment.
    pub fn from_columns<S, C>(
        id: impl Into<String>,
        row_ids: Vec<S>,
        columns: &[C],
        alphabet: Alphabet,
        policy: Arc<dyn Consensus>,
    ) -> Result<Self>
    where
        S: Into<String>,
        C: AsRef<[u8]>,
    {
        let rows = transpose(row_ids.into_iter().map(Into::into).collect(), columns)?;
        Self::assemble(id.into(), rows, columns.len(), alphabet, policy)
    }

    /// Starts building an alignment.
    pub fn builder(id: impl Into<String>) -> AlignmentBuilder {
        AlignmentBuilder::new(id)
    }

    fn assemble(
        id: String,
        rows: Vec<Row>,
        len: usize,
        alphabet: Alphabet,
        policy: Arc<dyn Consensus>,
    ) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            check_letters(&alphabet, i, 0, row.letters())?;
        }
        let mut alignment = Self {
            id,
            description: None,
            rows,
            len,
            alphabet,
            policy,
            consensus: Vec::new(),
        };
        alignment.refresh_consensus();
        Ok(alignment)
    }

    /// Returns an independent copy with its own rows and a freshly derived consensus.
    pub fn copy(&self) -> Self {
        let mut copy = Self {
            id: self.id.clone(),
            description: self.description.clone(),
            rows: self.rows.clone(),
            len: self.len,
            alphabet: self.alphabet.clone(),
            policy: Arc::clone(&self.policy),
            consensus: Vec::new(),
        };
        copy.refresh_consensus();
        copy
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the alignment has no columns.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of data rows (the consensus row is not counted).
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the consensus policy.
    pub fn policy(&self) -> &Arc<dyn Consensus> {
        &self.policy
    }

    /// Iterates over the data rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the row identifiers in row order.
    pub fn row_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    /// Gets a data row by index.
    pub fn get(&self, row: usize) -> Result<&Row> {
        self.rows.get(row).ok_or(Error::OutOfRange {
            axis: Axis::Row,
            index: row,
            bound: self.rows.len(),
        })
    }

    /// Reads a single cell.
    pub fn at(&self, pos: Position) -> Result<QLetter> {
        self.check_position(pos)?;
        Ok(self.rows[pos.row]
            .qletter_at(pos.col)
            .unwrap_or_default())
    }

    /// Overwrites a single cell and recomputes that column's consensus.
    pub fn set(&mut self, pos: Position, letter: impl Into<QLetter>) -> Result<()> {
        let letter = letter.into();
        self.check_position(pos)?;
        check_letters(&self.alphabet, pos.row, pos.col, &[letter.l])?;

        self.rows[pos.row].set(pos.col, letter);
        self.update_consensus(pos.col..pos.col + 1);
        Ok(())
    }

    /// Returns the symbols of one column, top to bottom.
    pub fn column(&self, col: usize) -> Result<Vec<u8>> {
        self.check_column(col)?;
        Ok(self.rows.iter().map(|r| r.letters()[col]).collect())
    }

    /// Appends a data row, right-padding it with gaps to the alignment length.
    ///
    /// The row may not be longer than the alignment, except when the
    /// alignment has neither rows nor columns: the first row then sets the
    /// length.
    pub fn add(&mut self, row: impl Into<Row>) -> Result<()> {
        let mut row = row.into();
        let unshaped = self.len == 0 && self.rows.is_empty();
        if row.len() > self.len && !unshaped {
            return Err(Error::ShapeMismatch {
                context: "added row length",
                expected: self.len,
                found: row.len(),
            });
        }
        check_letters(&self.alphabet, self.rows.len(), 0, row.letters())?;

        self.len = self.len.max(row.len());
        row.pad_to(self.len, self.alphabet.gap());
        tracing::debug!(
            rows = self.rows.len() + 1,
            columns = self.len,
            "Added row '{}' to alignment '{}'",
            row.id,
            self.id
        );
        self.rows.push(row);
        self.refresh_consensus();
        Ok(())
    }

    /// Appends column-major blocks to the right edge of the alignment.
    ///
    /// Every column must supply exactly one symbol per data row.
    pub fn append_columns<C: AsRef<[u8]>>(&mut self, columns: &[C]) -> Result<()> {
        for (i, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            if column.len() != self.rows.len() {
                return Err(Error::ShapeMismatch {
                    context: "column arity",
                    expected: self.rows.len(),
                    found: column.len(),
                });
            }
            for (j, &l) in column.iter().enumerate() {
                check_letters(&self.alphabet, j, self.len + i, &[l])?;
            }
        }

        let start = self.len;
        let mut buf = Vec::with_capacity(columns.len());
        for (j, row) in self.rows.iter_mut().enumerate() {
            buf.clear();
            buf.extend(columns.iter().map(|c| c.as_ref()[j]));
            row.push_letters(&buf);
        }
        self.len += columns.len();
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.len,
            "Appended {} columns to alignment '{}'",
            columns.len(),
            self.id
        );
        self.update_consensus(start..self.len);
        Ok(())
    }

    /// Reverses column order in every row. Letters are not complemented.
    pub fn reverse(&mut self) {
        for row in &mut self.rows {
            row.reverse();
        }
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.len,
            "Reversed alignment '{}'",
            self.id
        );
        self.refresh_consensus();
    }

    /// Returns the consensus row.
    pub fn consensus(&self) -> &[QLetter] {
        &self.consensus
    }

    /// Returns the consensus row as text.
    pub fn consensus_string(&self) -> String {
        self.consensus.iter().map(|ql| ql.l as char).collect()
    }

    /// Replaces every data row, then re-derives the whole consensus.
    ///
    /// Callers guarantee that all rows are `len` long and already validated.
    pub(crate) fn replace_rows(&mut self, rows: Vec<Row>, len: usize) {
        debug_assert!(rows.iter().all(|r| r.len() == len));
        self.rows = rows;
        self.len = len;
        self.refresh_consensus();
    }

    /// Recomputes the consensus of every column.
    fn refresh_consensus(&mut self) {
        self.consensus =
            consense_range(self.policy.as_ref(), &self.alphabet, &self.rows, 0..self.len);
        tracing::trace!("Recomputed consensus of '{}' for columns 0..{}", self.id, self.len);
    }

    /// Recomputes the consensus of the columns in `range` only.
    fn update_consensus(&mut self, range: Range<usize>) {
        self.consensus.resize(self.len, QLetter::default());
        let fresh =
            consense_range(self.policy.as_ref(), &self.alphabet, &self.rows, range.clone());
        tracing::trace!("Recomputed consensus of '{}' for columns {:?}", self.id, range);
        self.consensus[range].copy_from_slice(&fresh);
    }

    fn check_column(&self, col: usize) -> Result<()> {
        if col >= self.len {
            return Err(Error::OutOfRange {
                axis: Axis::Column,
                index: col,
                bound: self.len,
            });
        }
        Ok(())
    }

    fn check_position(&self, pos: Position) -> Result<()> {
        self.check_column(pos.col)?;
        if pos.row >= self.rows.len() {
            return Err(Error::OutOfRange {
                axis: Axis::Row,
                index: pos.row,
                bound: self.rows.len(),
            });
        }
        Ok(())
    }
}

impl Clone for Alignment {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alignment")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("rows", &self.rows)
            .field("len", &self.len)
            .field("alphabet", &self.alphabet)
            .field("policy", &self.policy.name())
            .field("consensus", &self.consensus_string())
            .finish()
    }
}

/// Displays the consensus row.
impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.consensus_string())
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Builder for alignments with optional description and policy.
pub struct AlignmentBuilder {
    id: String,
    description: Option<String>,
    alphabet: Alphabet,
    policy: Arc<dyn Consensus>,
    rows: Vec<Row>,
}

impl AlignmentBuilder {
    /// Creates a builder for a protein alignment with the plurality policy.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            alphabet: Alphabet::protein(),
            policy: Arc::new(Plurality),
            rows: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn policy(mut self, policy: impl Consensus + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Adds one data row.
    pub fn row(mut self, id: impl Into<String>, letters: impl Into<Vec<u8>>) -> Self {
        self.rows.push(Row::new(id, letters));
        self
    }

    /// Builds from the collected rows.
    pub fn build(self) -> Result<Alignment> {
        let mut alignment = Alignment::new(self.id, self.rows, self.alphabet, self.policy)?;
        alignment.description = self.description;
        Ok(alignment)
    }

    /// Builds from column-major data, ignoring any rows added to the builder.
    pub fn build_from_columns<S, C>(self, row_ids: Vec<S>, columns: &[C]) -> Result<Alignment>
    where
        S: Into<String>,
        C: AsRef<[u8]>,
    {
        let mut alignment =
            Alignment::from_columns(self.id, row_ids, columns, self.alphabet, self.policy)?;
        alignment.description = self.description;
        Ok(alignment)
    }
}

/// Transposes column-major blocks into one row per identifier.
fn transpose<C: AsRef<[u8]>>(row_ids: Vec<String>, columns: &[C]) -> Result<Vec<Row>> {
    let n = row_ids.len();
    if let Some(column) = columns.iter().map(|c| c.as_ref()).find(|c| c.len() != n) {
        return Err(Error::ShapeMismatch {
            context: "column arity",
            expected: n,
            found: column.len(),
        });
    }

    let mut buffers: Vec<Vec<u8>> = (0..n).map(|_| Vec::with_capacity(columns.len())).collect();
    for column in columns {
        for (buf, &l) in buffers.iter_mut().zip(column.as_ref()) {
            buf.push(l);
        }
    }

    Ok(row_ids
        .into_iter()
        .zip(buffers)
        .map(|(id, letters)| Row::new(id, letters))
        .collect())
}

/// Checks that every symbol is accepted by the alphabet.
fn check_letters(
    alphabet: &Alphabet,
    row: usize,
    first_col: usize,
    letters: &[u8],
) -> Result<()> {
    match letters.iter().position(|&l| !alphabet.accepts(l)) {
        Some(i) => Err(Error::InvalidLetter {
            letter: letters[i] as char,
            row,
            col: first_col + i,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::Identity;
    use crate::model::QSeq;

    fn example() -> Alignment {
        Alignment::builder("example alignment")
            .row("seq 1", "ACGCTGACTTGGTGCACGT")
            .row("seq 2", "ACGGTGACCTGGCGCGCAT")
            .row("seq 3", "ACGATGACGTGGCGCTCAT")
            .build()
            .unwrap()
    }

    fn row_strings(a: &Alignment) -> Vec<String> {
        a.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_row_major_construction() {
        let a = example();
        assert_eq!(a.rows(), 3);
        assert_eq!(a.len(), 19);
        assert_eq!(a.consensus().len(), 19);
        assert_eq!(a.consensus_string(), "acgxtgacxtggcgcxcat");
        assert_eq!(a.to_string(), "acgxtgacxtggcgcxcat");
        assert_eq!(a.row_ids().collect::<Vec<_>>(), vec!["seq 1", "seq 2", "seq 3"]);
    }

    #[test]
    fn test_row_major_shape_mismatch() {
        let result = Alignment::builder("bad").row("a", "ACGT").row("b", "ACG").build();
        assert!(matches!(result, Err(Error::ShapeMismatch { expected: 4, found: 3, .. })));
    }

    #[test]
    fn test_invalid_letter_rejected() {
        let result = Alignment::builder("bad").row("a", "ACGT").row("b", "AC#T").build();
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidLetter { letter: '#', row: 1, col: 2 }
        );
    }

    #[test]
    fn test_column_major_construction() {
        let columns = ["AAA", "CCC", "GGG", "CGA"];
        let a = Alignment::from_columns(
            "cols",
            vec!["seq 1", "seq 2", "seq 3"],
            &columns,
            Alphabet::protein(),
            Arc::new(Plurality),
        )
        .unwrap();
        assert_eq!(row_strings(&a), vec!["ACGC", "ACGG", "ACGA"]);
        assert_eq!(a.consensus_string(), "acgx");
        assert_eq!(a.column(3).unwrap(), b"CGA");
    }

    #[test]
    fn test_column_major_arity_mismatch() {
        let columns = ["AAA", "CC"];
        let result = Alignment::from_columns(
            "cols",
            vec!["a", "b", "c"],
            &columns,
            Alphabet::protein(),
            Arc::new(Plurality),
        );
        assert!(result.unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_add_pads_and_updates_consensus() {
        let mut a = example();
        a.add(QSeq::new(
            "example Protein",
            vec![
                QLetter::new(b'a', 40),
                QLetter::new(b'c', 39),
                QLetter::new(b'g', 40),
                QLetter::new(b'C', 38),
                QLetter::new(b't', 35),
                QLetter::new(b'g', 20),
            ],
        ))
        .unwrap();

        assert_eq!(a.rows(), 4);
        let added = a.get(3).unwrap();
        assert_eq!(added.to_string(), "acgCtg-------------");
        assert_eq!(added.quals().unwrap().len(), 19);
        assert_eq!(a.consensus_string(), "acgctgacxtggcgcxcat");
    }

    #[test]
    fn test_add_longer_row_fails_unchanged() {
        let mut a = example();
        let err = a.add(Row::new("long", "ACGCTGACTTGGTGCACGTA")).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert_eq!(a.rows(), 3);
        assert_eq!(a.consensus_string(), "acgxtgacxtggcgcxcat");
    }

    #[test]
    fn test_add_to_empty_sets_length() {
        let mut a = Alignment::builder("empty").build().unwrap();
        assert!(a.is_empty());
        a.add(Row::new("first", "ACG")).unwrap();
        a.add(Row::new("second", "A")).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(1).unwrap().to_string(), "A--");
        assert_eq!(a.consensus_string(), "acg");
    }

    #[test]
    fn test_add_longer_row_to_rowless_alignment_fails() {
        let columns = ["", "", ""];
        let mut a = Alignment::from_columns(
            "rowless",
            Vec::<String>::new(),
            &columns,
            Alphabet::protein(),
            Arc::new(Plurality),
        )
        .unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.rows(), 0);

        let err = a.add(Row::new("r", "ACGTA")).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                context: "added row length",
                expected: 3,
                found: 5,
            }
        );
        assert_eq!(a.len(), 3);
        assert_eq!(a.rows(), 0);

        a.add(Row::new("r", "AC")).unwrap();
        assert_eq!(a.get(0).unwrap().to_string(), "AC-");
        assert_eq!(a.consensus_string(), "acx");
    }

    #[test]
    fn test_get_out_of_range() {
        let a = example();
        assert!(a.get(2).is_ok());
        assert_eq!(
            a.get(3).unwrap_err(),
            Error::OutOfRange { axis: Axis::Row, index: 3, bound: 3 }
        );
    }

    #[test]
    fn test_set_recomputes_single_column() {
        let mut a = example();
        a.set(Position::at(3, 2), b'C').unwrap();
        assert_eq!(a.at(Position::at(3, 2)).unwrap().l, b'C');
        assert_eq!(a.consensus_string(), "acgctgacxtggcgcxcat");
    }

    #[test]
    fn test_set_bounds_checked() {
        let mut a = example();
        assert!(a.set(Position::at(19, 0), b'A').unwrap_err().is_out_of_range());
        assert!(a.set(Position::at(0, 3), b'A').unwrap_err().is_out_of_range());
        assert!(a.set(Position::at(0, 0), b'#').is_err());
        assert_eq!(a.get(0).unwrap().to_string(), "ACGCTGACTTGGTGCACGT");
    }

    #[test]
    fn test_copy_is_independent() {
        let a = example();
        let mut b = a.copy();
        b.set(Position::at(3, 2), b't').unwrap();
        assert_eq!(a.get(2).unwrap().to_string(), "ACGATGACGTGGCGCTCAT");
        assert_eq!(b.get(2).unwrap().to_string(), "ACGtTGACGTGGCGCTCAT");
        assert_eq!(a.consensus_string(), "acgxtgacxtggcgcxcat");
        assert_eq!(b.consensus_string(), "acgxtgacxtggcgcxcat");

        let mut c = b.clone();
        c.set(Position::at(0, 0), b'W').unwrap();
        assert_eq!(b.get(0).unwrap().letter_at(0), Some(b'A'));
    }

    #[test]
    fn test_reverse_involution() {
        let mut a = example();
        a.reverse();
        assert_eq!(a.get(0).unwrap().to_string(), "TGCACGTGGTTCAGTCGCA");
        assert_eq!(a.consensus_string(), "tacxcgcggtxcagtxgca");
        a.reverse();
        assert_eq!(row_strings(&a), row_strings(&example()));
        assert_eq!(a.consensus_string(), "acgxtgacxtggcgcxcat");
    }

    #[test]
    fn test_append_columns() {
        let mut a = example();
        a.append_columns(&["AAA", "CGT"]).unwrap();
        assert_eq!(a.len(), 21);
        assert_eq!(a.get(1).unwrap().to_string(), "ACGGTGACCTGGCGCGCATAG");
        assert_eq!(a.consensus_string(), "acgxtgacxtggcgcxcatax");

        let err = a.append_columns(&["AA"]).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert_eq!(a.len(), 21);
    }

    #[test]
    fn test_identity_policy() {
        let a = Alignment::builder("strict")
            .policy(Identity)
            .row("seq 1", "ACGCTGACTTGGTGCACGT")
            .row("seq 2", "ACGGTGACCTGGCGCGCAT")
            .row("seq 3", "ACGATGACGTGGCGCTCAT")
            .build()
            .unwrap();
        // Columns 12 (T/C/C) and 17 (G/A/A) have a plurality but not identity
        assert_eq!(a.consensus_string(), "acgxtgacxtggxgcxcxt");
        assert_eq!(a.policy().name(), "identity");
    }

    #[test]
    fn test_builder_description_and_alphabet() {
        let a = Alignment::builder("dna")
            .description("two reads")
            .alphabet(Alphabet::dna())
            .row("r1", "ACGT")
            .row("r2", "ACCT")
            .build()
            .unwrap();
        assert_eq!(a.description.as_deref(), Some("two reads"));
        assert_eq!(a.alphabet().name(), "DNA");
        assert_eq!(a.consensus_string(), "acnt");
    }
}
