//! VCF record representation
//!
//! A [`VcfRecord`] carries the four columns that locate a variant. Records
//! are bi-allelic: multi-allelic rows are split by the reader into one
//! record per alternate allele.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of a REF/ALT pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    /// Equal-length alleles (SNV or MNV)
    Substitution,
    /// REF longer than ALT
    Deletion,
    /// ALT longer than REF
    Insertion,
}

/// A single bi-allelic VCF record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcfRecord {
    /// Chromosome name (e.g., "chr1", "1", "X")
    pub chrom: String,

    /// 1-based position of the first base in the reference allele
    pub pos: u64,

    /// Variant identifier (e.g., rsID), None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Reference allele
    pub reference: String,

    /// Alternate allele
    pub alternate: String,
}

impl VcfRecord {
    /// Create a new VCF record
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            id: None,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// Classify the record by comparing allele lengths
    pub fn kind(&self) -> VariantKind {
        use std::cmp::Ordering;

        match self.reference.len().cmp(&self.alternate.len()) {
            Ordering::Equal => VariantKind::Substitution,
            Ordering::Greater => VariantKind::Deletion,
            Ordering::Less => VariantKind::Insertion,
        }
    }

    /// Whether the ALT allele describes no sequence change
    ///
    /// Covers missing (`.`), overlapping-deletion (`*`), symbolic (`<DEL>`)
    /// and breakend (`N[chr2:100[`) alleles.
    pub fn is_non_sequence_alt(&self) -> bool {
        let alt = self.alternate.as_str();
        alt.is_empty()
            || alt == "."
            || alt == "*"
            || (alt.starts_with('<') && alt.ends_with('>'))
            || alt.contains('[')
            || alt.contains(']')
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chrom, self.pos, self.reference, self.alternate
        )
    }
}
