//! Alphabet definitions for aligned sequences.
//!
//! An alphabet declares which letters may appear in an alignment, the gap
//! symbol used for padding, and the ambiguity symbol used to mark columns
//! without consensus. Letter validity is case-insensitive: lower case is
//! used to flag derived or low-confidence letters, not different residues.

use std::fmt;

/// A sequence alphabet with a case-insensitive letter lookup table.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    name: String,
    letters: String,
    gap: u8,
    ambiguous: u8,
    /// Letter index by byte value (upper and lower case both mapped)
    index: [Option<u8>; 256],
}

impl Alphabet {
    /// Creates a new alphabet.
    ///
    /// # Arguments
    /// * `name` - Display name of the alphabet
    /// * `letters` - Valid letters, upper case; lower case is accepted implicitly
    /// * `gap` - The gap symbol (never counted as a letter)
    /// * `ambiguous` - The ambiguity symbol, also used as the no-consensus marker
    pub fn new(name: &str, letters: &str, gap: u8, ambiguous: u8) -> Self {
        let mut index = [None; 256];
        for (i, b) in letters.bytes().enumerate() {
            let i = i as u8;
            index[b.to_ascii_uppercase() as usize] = Some(i);
            index[b.to_ascii_lowercase() as usize] = Some(i);
        }

        let mut letters = letters.to_ascii_uppercase();
        if index[ambiguous as usize].is_none() {
            let i = letters.len() as u8;
            index[ambiguous.to_ascii_uppercase() as usize] = Some(i);
            index[ambiguous.to_ascii_lowercase() as usize] = Some(i);
            letters.push(ambiguous.to_ascii_uppercase() as char);
        }
        // The gap is never a letter, even if listed.
        index[gap as usize] = None;

        Self {
            name: name.to_string(),
            letters,
            gap,
            ambiguous,
            index,
        }
    }

    /// DNA with IUPAC ambiguity codes.
    pub fn dna() -> Self {
        Self::new("DNA", "ACGTNRYKMSWBDHV", b'-', b'N')
    }

    /// RNA with IUPAC ambiguity codes.
    pub fn rna() -> Self {
        Self::new("RNA", "ACGUNRYKMSWBDHV", b'-', b'N')
    }

    /// The 20 standard amino acids plus ambiguity, rare residues and stop.
    pub fn protein() -> Self {
        Self::new("Protein", "ACDEFGHIKLMNPQRSTVWYBZJUOX*", b'-', b'X')
    }

    /// Returns the alphabet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the valid letters (upper case).
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Number of distinct letters (gap excluded).
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Returns the gap symbol.
    pub fn gap(&self) -> u8 {
        self.gap
    }

    /// Returns the ambiguity symbol.
    pub fn ambiguous(&self) -> u8 {
        self.ambiguous
    }

    /// Returns true if `letter` is a letter of this alphabet, in either case.
    pub fn is_valid(&self, letter: u8) -> bool {
        self.index[letter as usize].is_some()
    }

    /// Returns true if `letter` is the gap symbol.
    pub fn is_gap(&self, letter: u8) -> bool {
        letter == self.gap
    }

    /// Returns true if `letter` may be stored in an alignment over this alphabet.
    pub fn accepts(&self, letter: u8) -> bool {
        self.is_valid(letter) || self.is_gap(letter)
    }

    /// Case-insensitive index of `letter`, or None for gaps and foreign symbols.
    pub fn index_of(&self, letter: u8) -> Option<usize> {
        self.index[letter as usize].map(usize::from)
    }

    /// Returns the upper case letter at `index`.
    pub fn letter(&self, index: usize) -> Option<u8> {
        self.letters.as_bytes().get(index).copied()
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("name", &self.name)
            .field("letters", &self.letters)
            .field("gap", &(self.gap as char))
            .field("ambiguous", &(self.ambiguous as char))
            .finish()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
