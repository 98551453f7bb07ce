//! # Genobase: human genomic reference data in a SQLite database.
//!
//! This crate stores reference data for human genome analysis in a single SQLite database and answers point lookups against it.
//! The main use case is liftover: translating a position between reference assemblies (e.g. GRCh37 to GRCh38) using UCSC chain files.
//! The database also stores variants by RSID and their population allele frequencies.
//!
//! See [`Genobase`] for the database interface and [`Cancellation`] for aborting operations.
//! See [`Chain`], [`Alignment`], [`Variant`], and [`Allele`] for the records.
//!
//! ### Basic concepts
//!
//! Each chain record corresponds to a row in table `liftover_chain`.
//! A chain aligns an interval of a chromosome in a source assembly to an interval of a contig in the target assembly.
//! The alignment consists of ungapped blocks stored in table `liftover_alignment`, with offsets relative to the start of the chain.
//! Deleting a chain deletes its blocks.
//!
//! Lifting a position is a two-step lookup.
//! The best chain covering the position is the one with the highest score.
//! Within the chain, the block is the first one that ends at or after the chain-relative offset.
//! The block may start after the offset, in which case the position is in an unaligned gap.
//!
//! Variants are stored in table `variant`, with the RSID as the primary key.
//! Allele frequencies are stored in table `allele`, keyed by (RSID, reference allele, alternate allele, ancestry group).
//! Storing an existing key replaces the value.
//!
//! Chain files can be imported with [`formats::ChainReader`] and [`Genobase::import_chains`], or with the `chain2db` tool.

// Implements the SQLite conversions for a type stored as its string token.
// The type must have `as_str()` and implement `FromStr`.
macro_rules! impl_sql_token {
    ($type:ty) => {
        impl rusqlite::types::ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $type {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                value.as_str()?.parse::<$type>().map_err(|err| rusqlite::types::FromSqlError::Other(Box::new(err)))
            }
        }
    };
}

pub mod cancel;
pub mod chromosome;
pub mod db;
pub mod error;
pub mod formats;
pub mod liftover;
pub mod reference;
pub mod utils;
pub mod variant;

#[cfg(test)]
pub(crate) mod internal;

pub use cancel::Cancellation;
pub use chromosome::Chromosome;
pub use db::{Genobase, GenobaseParams, ImportStats, DatabaseFileType, identify_database};
pub use error::{Error, Result};
pub use liftover::{Alignment, BlockHit, Chain, LiftedPosition, Strand, find_block};
pub use reference::Reference;
pub use variant::{Allele, AncestryGroup, Variant, VariantClass};
