//! # msagrid - Editable Multiple Sequence Alignments
//!
//! A multiple sequence alignment held as a rectangular grid of letters,
//! one row per sequence, with a consensus row kept in step with every edit.
//!
//! ## Architecture
//!
//! - `alphabet`: valid letters, gap and ambiguity symbols
//! - `model`: rows, quality letters, positions and features
//! - `consensus`: pluggable column consensus policies
//! - `alignment`: the letter grid, cell access and row appends
//! - `edit`: column-range edits (join, stitch, truncate)
//! - `error`: error types
//!
//! ## Example
//!
//! ```
//! use msagrid::{Alignment, Edge, Interval, Position};
//!
//! let mut aln = Alignment::builder("example")
//!     .row("seq 1", "ACGCTGACTTGGTGCACGT")
//!     .row("seq 2", "ACGGTGACCTGGCGCGCAT")
//!     .row("seq 3", "ACGATGACGTGGCGCTCAT")
//!     .build()?;
//! assert_eq!(aln.to_string(), "acgxtgacxtggcgcxcat");
//!
//! aln.set(Position::at(3, 2), b'C')?;
//! assert_eq!(aln.consensus_string(), "acgctgacxtggcgcxcat");
//!
//! let copy = aln.copy();
//! msagrid::join(&mut aln, &copy, Edge::End)?;
//! aln.stitch(&[Interval::new(-1, 4), Interval::new(30, 38)])?;
//! assert_eq!(aln.len(), 12);
//! # Ok::<(), msagrid::Error>(())
//! ```

pub mod alignment;
pub mod alphabet;
pub mod consensus;
pub mod edit;
pub mod error;
pub mod model;

pub use alignment::{Alignment, AlignmentBuilder};
pub use alphabet::Alphabet;
pub use consensus::{Consensus, Identity, Plurality};
pub use edit::{join, stitch, truncate};
pub use error::{Axis, Error, Result};
pub use model::{Edge, Feature, Interval, Orientation, Position, QLetter, QSeq, Row};
