//! Liftover chains and alignment blocks.
//!
//! A [`Chain`] aligns an interval of a chromosome in the source assembly to an interval of a contig in the target assembly.
//! The alignment consists of ungapped [`Alignment`] blocks.
//! Block offsets are relative to the start of the chain in the respective assembly.
//!
//! Coordinates follow the UCSC chain format: they are 0-based, and target coordinates on the reverse strand are relative to the reverse complement of the target contig.
//! Translating a position is a two-step lookup (see [`crate::Genobase`]):
//!
//! 1. Find the chain covering the position with [`crate::Genobase::get_chain`].
//! 2. Find the first block ending at or after the chain-relative offset with [`crate::Genobase::get_alignment`].
//!
//! The second step does not guarantee that the offset is inside the block.
//! Use [`Alignment::locate`] or [`Chain::lift`] to distinguish an aligned position from a gap.
//! When a block starts exactly where the previous one ends, the lookup for that offset returns the previous block.
//! [`crate::Genobase::lift_position`] therefore looks up `offset + 1`.

use crate::error::{Error, Result};
use crate::Reference;

use std::fmt;
use std::str::FromStr;

//-----------------------------------------------------------------------------

/// Strand of an interval in a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    /// The forward strand (`+`).
    #[default]
    Forward,
    /// The reverse strand (`-`).
    Reverse,
}

impl Strand {
    /// Returns `+` or `-`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(Error::Validation(format!("Invalid strand: {}", s))),
        }
    }
}

impl_sql_token!(Strand);

//-----------------------------------------------------------------------------

/// A chain of alignment blocks between two assemblies.
///
/// The record corresponds to one row in table `liftover_chain`.
/// Chains are immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    /// Identifier assigned by the database. Ignored when storing a chain.
    pub id: i64,
    /// Alignment score. Higher is better.
    pub score: i64,
    /// The assembly the chain maps from.
    pub source_assembly: Reference,
    /// Contig name in the source assembly.
    pub source_chromosome: String,
    /// Length of the source contig.
    pub source_size: i64,
    /// Strand in the source assembly.
    pub source_strand: Strand,
    /// Start of the chain in the source assembly.
    pub source_start: i64,
    /// End of the chain in the source assembly.
    pub source_end: i64,
    /// Contig name in the target assembly.
    pub target_chromosome: String,
    /// Length of the target contig.
    pub target_size: i64,
    /// Strand in the target assembly.
    pub target_strand: Strand,
    /// Start of the chain in the target assembly.
    pub target_start: i64,
    /// End of the chain in the target assembly.
    pub target_end: i64,
}

impl Chain {
    /// Returns `true` if the position is within `[source_start, source_end]`.
    ///
    /// Both ends are inclusive, as in [`crate::Genobase::get_chain`].
    #[inline]
    pub fn contains(&self, position: i64) -> bool {
        self.source_start <= position && position <= self.source_end
    }

    /// Returns the offset of the source position relative to the start of the chain.
    #[inline]
    pub fn source_offset(&self, position: i64) -> i64 {
        position - self.source_start
    }

    /// Checks that both intervals are well-formed.
    pub fn validate(&self) -> Result<()> {
        if self.source_start > self.source_end {
            return Err(Error::Validation(format!(
                "Chain on {} has source start {} after source end {}",
                self.source_chromosome, self.source_start, self.source_end
            )));
        }
        if self.target_start > self.target_end {
            return Err(Error::Validation(format!(
                "Chain on {} has target start {} after target end {}",
                self.target_chromosome, self.target_start, self.target_end
            )));
        }
        Ok(())
    }

    /// Translates a source position using the block that may contain it.
    ///
    /// The candidate is the first block ending after the chain-relative offset, which is what [`crate::Genobase::get_alignment`] returns for `offset + 1`.
    /// The lookup for `offset` itself may return the preceding block when the next block starts right where it ends.
    /// The returned position is on the forward strand of the target contig.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the position falls in a gap before or after the block.
    /// Returns [`Error::Validation`] if the block belongs to another chain.
    pub fn lift(&self, block: &Alignment, position: i64) -> Result<LiftedPosition> {
        if block.chain_id != self.id {
            return Err(Error::Validation(format!(
                "Alignment block {} belongs to chain {}, not chain {}", block.id, block.chain_id, self.id
            )));
        }

        let offset = self.source_offset(position);
        let target_offset = match block.locate(offset) {
            BlockHit::Inside(target_offset) => target_offset,
            BlockHit::Before | BlockHit::After => {
                return Err(Error::not_found(
                    "aligned block",
                    format!("{}:{} (unaligned gap in chain {})", self.source_chromosome, position, self.id)
                ));
            },
        };

        let strand_position = self.target_start + target_offset;
        let position = match self.target_strand {
            Strand::Forward => strand_position,
            Strand::Reverse => self.target_size - 1 - strand_position,
        };
        Ok(LiftedPosition {
            chain_id: self.id,
            score: self.score,
            chromosome: self.target_chromosome.clone(),
            position,
            strand: self.target_strand,
        })
    }
}

//-----------------------------------------------------------------------------

/// An ungapped alignment block within a chain.
///
/// The record corresponds to one row in table `liftover_alignment`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Alignment {
    /// Identifier assigned by the database. Ignored when storing a block.
    pub id: i64,
    /// The chain this block belongs to.
    pub chain_id: i64,
    /// Offset of the block from the start of the chain in the source assembly.
    pub source_offset: i64,
    /// Offset of the block from the start of the chain in the target assembly.
    pub target_offset: i64,
    /// Length of the block in bases. Always positive.
    pub size: i64,
}

/// Where a chain-relative source offset falls relative to an alignment block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockHit {
    /// In an unaligned gap before the block.
    Before,
    /// Inside the block, with the corresponding chain-relative target offset.
    Inside(i64),
    /// At or past the end of the block.
    After,
}

impl Alignment {
    /// Returns the chain-relative source offset past the end of the block.
    #[inline]
    pub fn source_end(&self) -> i64 {
        self.source_offset + self.size
    }

    /// Classifies the chain-relative source offset against the block.
    ///
    /// # Examples
    ///
    /// ```
    /// use genobase::{Alignment, BlockHit};
    ///
    /// let block = Alignment { source_offset: 217417, target_offset: 247666, size: 40302, ..Default::default() };
    /// assert_eq!(block.locate(217480), BlockHit::Inside(247666 + 63));
    /// assert_eq!(block.locate(1000), BlockHit::Before);
    /// assert_eq!(block.locate(217417 + 40302), BlockHit::After);
    /// ```
    pub fn locate(&self, offset: i64) -> BlockHit {
        if offset < self.source_offset {
            BlockHit::Before
        } else if offset < self.source_end() {
            BlockHit::Inside(self.target_offset + (offset - self.source_offset))
        } else {
            BlockHit::After
        }
    }
}

/// Returns the block [`crate::Genobase::get_alignment`] would return for the offset.
///
/// This is the block with the smallest source offset among the blocks ending at or after `offset`.
/// The blocks must be sorted by source offset and must not overlap.
/// Returns [`None`] if the offset is past the end of the last block.
pub fn find_block(blocks: &[Alignment], offset: i64) -> Option<&Alignment> {
    let index = blocks.partition_point(|block| block.source_end() < offset);
    blocks.get(index)
}

//-----------------------------------------------------------------------------

/// A position translated to the target assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiftedPosition {
    /// The chain used for the translation.
    pub chain_id: i64,
    /// Score of the chain.
    pub score: i64,
    /// Contig name in the target assembly.
    pub chromosome: String,
    /// Position on the forward strand of the target contig.
    pub position: i64,
    /// Strand of the chain in the target assembly.
    pub strand: Strand,
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
