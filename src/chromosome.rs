//! Standard human chromosomes and their reference lengths.

use crate::error::{Error, Result};
use crate::Reference;

use std::fmt;
use std::str::FromStr;

//-----------------------------------------------------------------------------

/// A standard human chromosome.
///
/// The set covers the 22 autosomes, the sex chromosomes, mitochondrial DNA (`ChrMT`), and the two pseudoautosomal regions (`ChrPAR` and `ChrPAR2`).
/// Variants in a pseudoautosomal region are represented on both sex chromosomes, so the regions get their own identifiers.
///
/// Chromosomes are totally ordered: autosomes by number, then X, Y, MT, PAR, and PAR2.
/// Contig names in liftover chains are free-form strings rather than chromosomes, as chain files also cover scaffolds.
///
/// # Examples
///
/// ```
/// use genobase::{Chromosome, Reference};
///
/// let chromosome: Chromosome = "chrX".parse().unwrap();
/// assert_eq!(chromosome, Chromosome::ChrX);
/// assert_eq!(chromosome.to_string(), "X");
/// assert!(Chromosome::Chr22 < Chromosome::ChrX);
/// assert_eq!(Chromosome::Chr1.length(Reference::GRCh38).unwrap(), 248_956_422);
/// assert!(Chromosome::Chr1.length(Reference::GRCh37).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chromosome {
    Chr1, Chr2, Chr3, Chr4, Chr5, Chr6, Chr7, Chr8, Chr9, Chr10, Chr11,
    Chr12, Chr13, Chr14, Chr15, Chr16, Chr17, Chr18, Chr19, Chr20, Chr21, Chr22,
    ChrX, ChrY, ChrMT, ChrPAR, ChrPAR2,
}

// Short names in the order of the enum.
const NAMES: [&str; 27] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11",
    "12", "13", "14", "15", "16", "17", "18", "19", "20", "21", "22",
    "X", "Y", "MT", "PAR", "PAR2",
];

// GRCh38 lengths in the order of the enum.
// The pseudoautosomal regions use their extent on chromosome X (PAR1 X:10001-2781479, PAR2 X:155701383-156030895).
const GRCH38_LENGTHS: [u64; 27] = [
    248_956_422, 242_193_529, 198_295_559, 190_214_555, 181_538_259, 170_805_979,
    159_345_973, 145_138_636, 138_394_717, 133_797_422, 135_086_622, 133_275_309,
    114_364_328, 107_043_718, 101_991_189, 90_338_345, 83_257_441, 80_373_285,
    58_617_616, 64_444_167, 46_709_983, 50_818_468,
    156_040_895,
    57_227_415,
    16_569,
    2_771_479,
    329_513,
];

impl Chromosome {
    /// All chromosomes in sorted order.
    pub const ALL: [Chromosome; 27] = [
        Chromosome::Chr1, Chromosome::Chr2, Chromosome::Chr3, Chromosome::Chr4, Chromosome::Chr5,
        Chromosome::Chr6, Chromosome::Chr7, Chromosome::Chr8, Chromosome::Chr9, Chromosome::Chr10,
        Chromosome::Chr11, Chromosome::Chr12, Chromosome::Chr13, Chromosome::Chr14, Chromosome::Chr15,
        Chromosome::Chr16, Chromosome::Chr17, Chromosome::Chr18, Chromosome::Chr19, Chromosome::Chr20,
        Chromosome::Chr21, Chromosome::Chr22,
        Chromosome::ChrX, Chromosome::ChrY, Chromosome::ChrMT, Chromosome::ChrPAR, Chromosome::ChrPAR2,
    ];

    #[inline]
    fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the rank of the chromosome in the total order, starting from 1.
    ///
    /// Autosomes map to their number, followed by X (23), Y (24), MT (25), PAR (26), and PAR2 (27).
    #[inline]
    pub fn rank(&self) -> usize {
        self.index() + 1
    }

    /// Returns the short name of the chromosome (e.g. `1`, `X`, `MT`).
    pub fn as_str(&self) -> &'static str {
        NAMES[self.index()]
    }

    /// Returns `true` if the chromosome is an autosome.
    pub fn is_autosome(&self) -> bool {
        *self <= Chromosome::Chr22
    }

    /// Returns the length of the chromosome in the given assembly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if lengths are not known for the assembly.
    /// Only GRCh38 lengths are currently available.
    pub fn length(&self, reference: Reference) -> Result<u64> {
        match reference {
            Reference::GRCh38 => Ok(GRCH38_LENGTHS[self.index()]),
            _ => Err(Error::Validation(format!("Chromosome lengths are not available for {}", reference))),
        }
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chromosome {
    type Err = Error;

    /// Parses a short name, optionally with a `chr` prefix. `M` is accepted as an alias for `MT`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.strip_prefix("chr").unwrap_or(s);
        let name = if name == "M" { "MT" } else { name };
        NAMES.iter().position(|x| *x == name).map(|index| Chromosome::ALL[index]).ok_or_else(|| {
            Error::Validation(format!("Unknown chromosome: {}", s))
        })
    }
}

impl_sql_token!(Chromosome);

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
