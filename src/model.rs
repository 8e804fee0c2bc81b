//! Value types shared by the alignment and its editors.
//!
//! This module contains the data structures for representing:
//! - Letters with quality scores
//! - Alignment rows and quality-bearing row sources
//! - Cell positions and join edges
//! - Features (intervals) used to select column ranges

use std::fmt;
use std::ops::Range;

use crate::error::{Error, Result};

/// A letter with an associated Phred quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QLetter {
    /// The symbol
    pub l: u8,
    /// Phred quality (0 when unknown)
    pub q: u8,
}

impl QLetter {
    /// Creates a letter with a quality score.
    pub fn new(l: u8, q: u8) -> Self {
        Self { l, q }
    }

    /// Creates a letter without quality information.
    pub fn letter(l: u8) -> Self {
        Self { l, q: 0 }
    }
}

impl From<u8> for QLetter {
    fn from(l: u8) -> Self {
        Self::letter(l)
    }
}

/// A single aligned row: identifier, symbols and optional per-symbol qualities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The row identifier
    pub id: String,
    letters: Vec<u8>,
    quals: Option<Vec<u8>>,
}

impl Row {
    /// Creates a row without quality values.
    pub fn new(id: impl Into<String>, letters: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            letters: letters.into(),
            quals: None,
        }
    }

    /// Creates a row carrying one quality value per letter.
    ///
    /// Fails if the two sequences differ in length.
    pub fn with_quals(
        id: impl Into<String>,
        letters: impl Into<Vec<u8>>,
        quals: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let letters = letters.into();
        let quals = quals.into();
        if letters.len() != quals.len() {
            return Err(Error::ShapeMismatch {
                context: "quality length",
                expected: letters.len(),
                found: quals.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            letters,
            quals: Some(quals),
        })
    }

    /// Returns the number of columns in the row.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Returns true if the row holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Returns the row symbols in column order.
    pub fn letters(&self) -> &[u8] {
        &self.letters
    }

    /// Returns the quality values, if the row carries any.
    pub fn quals(&self) -> Option<&[u8]> {
        self.quals.as_deref()
    }

    /// Gets the symbol at a column.
    pub fn letter_at(&self, col: usize) -> Option<u8> {
        self.letters.get(col).copied()
    }

    /// Gets the symbol and quality at a column.
    pub fn qletter_at(&self, col: usize) -> Option<QLetter> {
        let l = self.letter_at(col)?;
        let q = self.quals.as_ref().map_or(0, |q| q[col]);
        Some(QLetter { l, q })
    }

    /// Overwrites one cell. The quality is stored only if the row carries qualities.
    pub(crate) fn set(&mut self, col: usize, ql: QLetter) {
        self.letters[col] = ql.l;
        if let Some(quals) = self.quals.as_mut() {
            quals[col] = ql.q;
        }
    }

    /// Right-pads the row with `gap` up to `len` columns.
    pub(crate) fn pad_to(&mut self, len: usize, gap: u8) {
        if self.letters.len() < len {
            self.letters.resize(len, gap);
            if let Some(quals) = self.quals.as_mut() {
                quals.resize(len, 0);
            }
        }
    }

    /// Reverses column order in place.
    pub(crate) fn reverse(&mut self) {
        self.letters.reverse();
        if let Some(quals) = self.quals.as_mut() {
            quals.reverse();
        }
    }

    /// Returns a new row holding the columns of `range`.
    pub(crate) fn extract(&self, range: Range<usize>) -> Row {
        Row {
            id: self.id.clone(),
            letters: self.letters[range.clone()].to_vec(),
            quals: self.quals.as_ref().map(|q| q[range].to_vec()),
        }
    }

    /// Returns a new row with the columns of every range, concatenated in order.
    pub(crate) fn splice(&self, ranges: &[Range<usize>]) -> Row {
        let total: usize = ranges.iter().map(|r| r.len()).sum();
        let mut letters = Vec::with_capacity(total);
        let mut quals = self.quals.as_ref().map(|_| Vec::with_capacity(total));
        for range in ranges {
            letters.extend_from_slice(&self.letters[range.clone()]);
            if let (Some(dst), Some(src)) = (quals.as_mut(), self.quals.as_ref()) {
                dst.extend_from_slice(&src[range.clone()]);
            }
        }
        Row {
            id: self.id.clone(),
            letters,
            quals,
        }
    }

    /// Returns the concatenation `self` then `other`, keeping this row's id.
    ///
    /// Qualities survive only if at least one side carries them; the other
    /// side contributes zeros.
    pub(crate) fn concat(&self, other: &Row) -> Row {
        let mut letters = Vec::with_capacity(self.len() + other.len());
        letters.extend_from_slice(&self.letters);
        letters.extend_from_slice(&other.letters);

        let quals = match (&self.quals, &other.quals) {
            (None, None) => None,
            (a, b) => {
                let mut q = Vec::with_capacity(letters.len());
                match a {
                    Some(a) => q.extend_from_slice(a),
                    None => q.resize(self.len(), 0),
                }
                match b {
                    Some(b) => q.extend_from_slice(b),
                    None => q.resize(letters.len(), 0),
                }
                Some(q)
            }
        };

        Row {
            id: self.id.clone(),
            letters,
            quals,
        }
    }

    /// Appends raw symbols to the end of the row.
    pub(crate) fn push_letters(&mut self, letters: &[u8]) {
        self.letters.extend_from_slice(letters);
        if let Some(quals) = self.quals.as_mut() {
            quals.resize(self.letters.len(), 0);
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.letters))
    }
}

/// A quality-bearing sequence used as the source of a new alignment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QSeq {
    /// The sequence identifier
    pub id: String,
    /// Letters with their qualities
    pub letters: Vec<QLetter>,
}

impl QSeq {
    /// Creates a new quality sequence.
    pub fn new(id: impl Into<String>, letters: Vec<QLetter>) -> Self {
        Self {
            id: id.into(),
            letters,
        }
    }

    /// Returns the number of letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl From<QSeq> for Row {
    fn from(seq: QSeq) -> Self {
        let (letters, quals) = seq.letters.iter().map(|ql| (ql.l, ql.q)).unzip();
        Row {
            id: seq.id,
            letters,
            quals: Some(quals),
        }
    }
}

/// Address of a single cell in the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Column index
    pub col: usize,
    /// Data row index (the consensus row is not addressable)
    pub row: usize,
}

impl Position {
    /// Creates a position at a specific column and row.
    pub fn at(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Which edge of an alignment a join attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Source columns are placed before the destination's
    Start,
    /// Source columns are placed after the destination's
    End,
}

/// Strand orientation of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Reverse,
    #[default]
    NotOriented,
    Forward,
}

/// A half-open interval `[start, end)` over alignment columns.
///
/// Coordinates are signed: features derived from other coordinate systems
/// can underflow, and consumers decide how to clamp them.
pub trait Feature {
    fn start(&self) -> isize;
    fn end(&self) -> isize;

    fn len(&self) -> isize {
        self.end() - self.start()
    }

    fn orientation(&self) -> Orientation {
        Orientation::NotOriented
    }
}

impl<F: Feature + ?Sized> Feature for &F {
    fn start(&self) -> isize {
        (**self).start()
    }

    fn end(&self) -> isize {
        (**self).end()
    }

    fn orientation(&self) -> Orientation {
        (**self).orientation()
    }
}

impl Feature for Range<isize> {
    fn start(&self) -> isize {
        self.start
    }

    fn end(&self) -> isize {
        self.end
    }
}

/// A concrete feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: isize,
    pub end: isize,
    pub orientation: Orientation,
}

impl Interval {
    /// Creates an unoriented interval.
    pub fn new(start: isize, end: isize) -> Self {
        Self {
            start,
            end,
            orientation: Orientation::NotOriented,
        }
    }

    /// Sets the orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl Feature for Interval {
    fn start(&self) -> isize {
        self.start
    }

    fn end(&self) -> isize {
        self.end
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}
