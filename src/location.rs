//! Genomic locations used as lookup keys against the annotation service
//!
//! A [`GenomicLocation`] is derived from one MAF row and identifies the
//! variant on the service side. Its canonical key (the five fields joined
//! by commas) is the join key used to merge batch responses back onto the
//! input rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NexusError;

/// Sentinel allele for the absent side of an insertion or deletion
pub const EMPTY_ALLELE: &str = "-";

/// Field separator of the canonical key
const KEY_SEPARATOR: char = ',';

/// Unanchored nucleotide search, as the service-side validity check uses
static NUCLEOTIDES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ACGT]+").unwrap());

/// A variant position on the genome, keyed the way the annotation service expects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicLocation {
    /// Chromosome name (e.g., "7", "X")
    pub chromosome: String,
    /// 1-based start; None when the source cell was not an integer
    pub start: Option<u64>,
    /// 1-based end; None when the source cell was not an integer
    pub end: Option<u64>,
    /// Reference allele, `-` for insertions
    pub reference_allele: String,
    /// Variant allele, `-` for deletions
    pub variant_allele: String,
}

impl GenomicLocation {
    /// Create a location from already-parsed parts
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        reference_allele: impl Into<String>,
        variant_allele: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            start: Some(start),
            end: Some(end),
            reference_allele: reference_allele.into(),
            variant_allele: variant_allele.into(),
        }
    }

    /// Build a location from raw MAF cells
    ///
    /// Chromosome aliases are resolved and positions that are not integers
    /// are kept as `None`, which makes the location invalid rather than
    /// failing the row.
    pub fn from_maf_fields(
        chromosome: &str,
        start: &str,
        end: &str,
        reference_allele: &str,
        variant_allele: &str,
    ) -> Self {
        Self {
            chromosome: normalize_chromosome(chromosome),
            start: parse_position(start),
            end: parse_position(end),
            reference_allele: reference_allele.trim().to_string(),
            variant_allele: variant_allele.trim().to_string(),
        }
    }

    /// The canonical comma-joined key of this location
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Whether this location can be submitted to the annotation service
    ///
    /// All five fields must be present (positions non-zero) and the alleles
    /// must describe an insertion, a deletion or a substitution of
    /// nucleotides. `-`/`-` is never valid.
    pub fn is_valid(&self) -> bool {
        if self.chromosome.is_empty()
            || self.reference_allele.is_empty()
            || self.variant_allele.is_empty()
        {
            return false;
        }
        if !matches!(self.start, Some(s) if s != 0) || !matches!(self.end, Some(e) if e != 0) {
            return false;
        }

        let reference = self.reference_allele.as_str();
        let variant = self.variant_allele.as_str();
        (reference == EMPTY_ALLELE && NUCLEOTIDES.is_match(variant))
            || (variant == EMPTY_ALLELE && NUCLEOTIDES.is_match(reference))
            || (NUCLEOTIDES.is_match(reference) && NUCLEOTIDES.is_match(variant))
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.chromosome,
            format_position(self.start),
            format_position(self.end),
            self.reference_allele,
            self.variant_allele,
            sep = KEY_SEPARATOR,
        )
    }
}

impl FromStr for GenomicLocation {
    type Err = NexusError;

    /// Parse a canonical key such as `7,140453136,140453136,A,T`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NexusError::InvalidLocation {
            input: s.to_string(),
        };

        let fields: Vec<&str> = s.split(KEY_SEPARATOR).collect();
        if fields.len() != 5 {
            return Err(invalid());
        }

        let position = |raw: &str| -> Result<Option<u64>, NexusError> {
            if raw.is_empty() {
                Ok(None)
            } else {
                raw.parse::<u64>().map(Some).map_err(|_| invalid())
            }
        };

        Ok(Self {
            chromosome: fields[0].to_string(),
            start: position(fields[1])?,
            end: position(fields[2])?,
            reference_allele: fields[3].to_string(),
            variant_allele: fields[4].to_string(),
        })
    }
}

/// Resolve numeric sex-chromosome aliases (`23` → `X`, `24` → `Y`)
pub fn normalize_chromosome(chromosome: &str) -> String {
    match chromosome.trim() {
        "23" => "X".to_string(),
        "24" => "Y".to_string(),
        other => other.to_string(),
    }
}

fn parse_position(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

fn format_position(position: Option<u64>) -> String {
    position.map(|p| p.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let loc = GenomicLocation::new("7", 140453136, 140453136, "A", "T");
        assert_eq!(loc.key(), "7,140453136,140453136,A,T");
    }

    #[test]
    fn test_key_round_trip() {
        let loc = GenomicLocation::new("X", 100, 101, "-", "GA");
        let parsed: GenomicLocation = loc.key().parse().unwrap();
        assert_eq!(parsed, loc);
    }

    #[test]
    fn test_key_round_trip_missing_positions() {
        let loc = GenomicLocation::from_maf_fields("1", "NA", "", "A", "C");
        assert_eq!(loc.key(), "1,,,A,C");
        let parsed: GenomicLocation = loc.key().parse().unwrap();
        assert_eq!(parsed, loc);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!("1,2,3,A".parse::<GenomicLocation>().is_err());
        assert!("1,2,3,A,C,G".parse::<GenomicLocation>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_integer_position() {
        let err = "1,abc,3,A,C".parse::<GenomicLocation>().unwrap_err();
        assert!(matches!(err, NexusError::InvalidLocation { .. }));
    }

    #[test]
    fn test_chromosome_aliases() {
        assert_eq!(normalize_chromosome("23"), "X");
        assert_eq!(normalize_chromosome("24"), "Y");
        assert_eq!(normalize_chromosome("7"), "7");
        assert_eq!(normalize_chromosome("123"), "123");
        assert_eq!(normalize_chromosome(" 23 "), "X");
    }

    #[test]
    fn test_from_maf_fields_applies_aliases() {
        let loc = GenomicLocation::from_maf_fields("23", "5", "5", "A", "G");
        assert_eq!(loc.chromosome, "X");
        assert_eq!(loc.start, Some(5));
    }

    #[test]
    fn test_both_alleles_empty_is_invalid() {
        let loc = GenomicLocation::new("3", 25, 30, "-", "-");
        assert!(!loc.is_valid());
    }

    #[test]
    fn test_valid_snv() {
        assert!(GenomicLocation::new("17", 7577121, 7577121, "G", "A").is_valid());
    }

    #[test]
    fn test_valid_insertion_and_deletion() {
        assert!(GenomicLocation::new("17", 100, 101, "-", "GA").is_valid());
        assert!(GenomicLocation::new("17", 100, 102, "TTA", "-").is_valid());
    }

    #[test]
    fn test_missing_fields_are_invalid() {
        assert!(!GenomicLocation::new("", 1, 1, "A", "C").is_valid());
        assert!(!GenomicLocation::new("1", 1, 1, "", "C").is_valid());
        assert!(!GenomicLocation::new("1", 0, 1, "A", "C").is_valid());
        assert!(!GenomicLocation::from_maf_fields("1", "x", "1", "A", "C").is_valid());
    }

    #[test]
    fn test_non_nucleotide_alleles_are_invalid() {
        assert!(!GenomicLocation::new("1", 1, 1, "N", "N").is_valid());
        assert!(!GenomicLocation::new("1", 1, 1, "-", "N").is_valid());
    }

    #[test]
    fn test_nucleotide_search_is_unanchored() {
        assert!(GenomicLocation::new("1", 1, 2, "AN", "C").is_valid());
    }

    #[test]
    fn test_serializes_camel_case() {
        let loc = GenomicLocation::new("7", 1, 1, "A", "T");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["referenceAllele"], "A");
        assert_eq!(json["variantAllele"], "T");
        assert_eq!(json["start"], 1);
    }
}
