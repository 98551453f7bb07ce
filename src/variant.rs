//! Variants (based on dbSNP) and population allele frequencies (based on gnomAD).

use crate::error::{Error, Result};
use crate::Chromosome;

use std::fmt;
use std::str::FromStr;

//-----------------------------------------------------------------------------

/// The class of a genomic variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantClass {
    /// Single nucleotide variant: a single base is altered.
    SNV,
    /// A small insertion or deletion.
    INDEL,
    /// Insertion: extra bases are inserted into a new place in the DNA.
    INS,
    /// Deletion: some bases are deleted from the DNA.
    DEL,
    /// Multi-nucleotide variant: two or more adjacent bases are replaced.
    MNV,
}

impl VariantClass {
    /// All variant classes.
    pub const ALL: [VariantClass; 5] = [
        VariantClass::SNV, VariantClass::INDEL, VariantClass::INS, VariantClass::DEL, VariantClass::MNV,
    ];

    /// Returns the stored token for the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantClass::SNV => "SNV",
            VariantClass::INDEL => "INDEL",
            VariantClass::INS => "INS",
            VariantClass::DEL => "DEL",
            VariantClass::MNV => "MNV",
        }
    }
}

impl fmt::Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VariantClass::ALL.iter().copied().find(|class| class.as_str() == s).ok_or_else(|| {
            Error::Validation(format!("Unknown variant class: {}", s))
        })
    }
}

impl_sql_token!(VariantClass);

//-----------------------------------------------------------------------------

/// An ancestry group used for stratifying allele frequencies (as in gnomAD v3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AncestryGroup {
    /// All samples.
    All,
    /// African / African American.
    African,
    /// Amish.
    Amish,
    /// Admixed American (Latino).
    American,
    /// Ashkenazi Jewish.
    Ashkenazi,
    /// East Asian.
    EastAsian,
    /// Finnish.
    Finnish,
    /// Middle Eastern.
    MiddleEastern,
    /// Non-Finnish European.
    European,
    /// South Asian.
    SouthAsian,
    /// All other ancestry groups.
    Other,
}

impl AncestryGroup {
    /// All ancestry groups.
    pub const ALL: [AncestryGroup; 11] = [
        AncestryGroup::All, AncestryGroup::African, AncestryGroup::Amish, AncestryGroup::American,
        AncestryGroup::Ashkenazi, AncestryGroup::EastAsian, AncestryGroup::Finnish, AncestryGroup::MiddleEastern,
        AncestryGroup::European, AncestryGroup::SouthAsian, AncestryGroup::Other,
    ];

    /// Returns the gnomAD code for the group.
    pub fn as_str(&self) -> &'static str {
        match self {
            AncestryGroup::All => "ALL",
            AncestryGroup::African => "AFR",
            AncestryGroup::Amish => "AMI",
            AncestryGroup::American => "AMR",
            AncestryGroup::Ashkenazi => "ASJ",
            AncestryGroup::EastAsian => "EAS",
            AncestryGroup::Finnish => "FIN",
            AncestryGroup::MiddleEastern => "MID",
            AncestryGroup::European => "NFE",
            AncestryGroup::SouthAsian => "SAS",
            AncestryGroup::Other => "OTH",
        }
    }
}

impl fmt::Display for AncestryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AncestryGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AncestryGroup::ALL.iter().copied().find(|group| group.as_str() == s).ok_or_else(|| {
            Error::Validation(format!("Unknown ancestry group: {}", s))
        })
    }
}

impl_sql_token!(AncestryGroup);

//-----------------------------------------------------------------------------

/// A genomic variant.
///
/// The record corresponds to one row in table `variant`, with the RSID as its primary key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    /// Reference SNP identifier (the number in `rs4680`).
    pub id: i64,
    /// Chromosome on which the variant is located.
    pub chromosome: Chromosome,
    /// Position of the variant on the chromosome.
    pub position: i64,
    /// Class of the variant.
    pub class: VariantClass,
}

/// An allele of a genomic variant with its frequency in an ancestry group.
///
/// The record corresponds to one row in table `allele`.
/// Rows are keyed by `(id, reference, alternate, ancestry)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Allele {
    /// RSID of the variant the allele belongs to.
    pub id: i64,
    /// Reference base(s) at the position of the variant.
    pub reference: String,
    /// Alternate base(s) representing the allele.
    pub alternate: String,
    /// Ancestry group the frequency was measured in.
    pub ancestry: AncestryGroup,
    /// Frequency of the allele in the ancestry group, in `[0, 1]`.
    pub frequency: f64,
}

impl Allele {
    /// Checks that the frequency is a probability.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(Error::Validation(format!(
                "Allele frequency {} for rs{} {}>{} ({}) is not in [0, 1]",
                self.frequency, self.id, self.reference, self.alternate, self.ancestry
            )));
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
