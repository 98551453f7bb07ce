//! Reference genome assemblies.

use crate::error::{Error, Result};

use std::fmt;
use std::str::FromStr;

//-----------------------------------------------------------------------------

/// A human reference genome assembly.
///
/// Assemblies are opaque tokens used as lookup keys and storage discriminators.
/// The token returned by [`Reference::as_str`] is also the stored value.
///
/// # Examples
///
/// ```
/// use genobase::Reference;
///
/// let reference: Reference = "GRCh37".parse().unwrap();
/// assert_eq!(reference, Reference::GRCh37);
/// assert_eq!(Reference::T2TCHM13v2.to_string(), "T2T-CHM13v2.0");
/// assert!("hg19".parse::<Reference>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    /// NCBI Build 36 (hg18).
    NCBI36,
    /// GRCh37 (hg19).
    GRCh37,
    /// GRCh38 (hg38).
    GRCh38,
    /// Telomere-to-telomere CHM13 v2.0 (hs1).
    T2TCHM13v2,
}

impl Reference {
    /// All known assemblies from the oldest to the newest.
    pub const ALL: [Reference; 4] = [
        Reference::NCBI36, Reference::GRCh37, Reference::GRCh38, Reference::T2TCHM13v2,
    ];

    /// Returns the canonical name of the assembly.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reference::NCBI36 => "NCBI36",
            Reference::GRCh37 => "GRCh37",
            Reference::GRCh38 => "GRCh38",
            Reference::T2TCHM13v2 => "T2T-CHM13v2.0",
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Reference::ALL.iter().copied().find(|reference| reference.as_str() == s).ok_or_else(|| {
            Error::Validation(format!("Unknown reference assembly: {}", s))
        })
    }
}

impl_sql_token!(Reference);

//-----------------------------------------------------------------------------
