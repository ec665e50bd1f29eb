//! MAF (Mutation Annotation Format) support
//!
//! MAF files are tab-separated with a header row naming the columns. Only
//! the five columns that locate a variant are interpreted; everything else
//! is carried through untouched.

use std::fmt;

use crate::error::NexusError;
use crate::location::GenomicLocation;

/// Chromosome column name
pub const CHROMOSOME: &str = "Chromosome";
/// Start position column name
pub const START_POSITION: &str = "Start_Position";
/// End position column name
pub const END_POSITION: &str = "End_Position";
/// Reference allele column name
pub const REFERENCE_ALLELE: &str = "Reference_Allele";
/// Variant allele column name
pub const TUMOR_SEQ_ALLELE2: &str = "Tumor_Seq_Allele2";

/// Columns a MAF file must carry to be annotated, in output order
pub const REQUIRED_COLUMNS: [&str; 5] = [
    CHROMOSOME,
    START_POSITION,
    END_POSITION,
    REFERENCE_ALLELE,
    TUMOR_SEQ_ALLELE2,
];

/// One MAF row as produced by the VCF converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MafRecord {
    pub chromosome: String,
    pub start_position: u64,
    pub end_position: u64,
    /// `-` for pure insertions
    pub reference_allele: String,
    /// `-` for pure deletions
    pub tumor_seq_allele: String,
}

impl MafRecord {
    /// The header line matching [`MafRecord`]'s `Display` output
    pub fn header() -> String {
        REQUIRED_COLUMNS.join("\t")
    }

    /// The lookup key this record would be annotated with
    pub fn genomic_location(&self) -> GenomicLocation {
        GenomicLocation::new(
            self.chromosome.clone(),
            self.start_position,
            self.end_position,
            self.reference_allele.clone(),
            self.tumor_seq_allele.clone(),
        )
    }
}

impl fmt::Display for MafRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chromosome,
            self.start_position,
            self.end_position,
            self.reference_allele,
            self.tumor_seq_allele
        )
    }
}

/// Positions of the required columns within a MAF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MafColumns {
    pub chromosome: usize,
    pub start_position: usize,
    pub end_position: usize,
    pub reference_allele: usize,
    pub tumor_seq_allele2: usize,
}

impl MafColumns {
    /// Resolve the required columns by name from a header line
    ///
    /// Column order is free; the first missing column is reported.
    pub fn from_header(header: &str) -> Result<Self, NexusError> {
        let names: Vec<&str> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(str::trim)
            .collect();
        let index_of = |column: &str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| NexusError::missing_column(column))
        };

        Ok(Self {
            chromosome: index_of(CHROMOSOME)?,
            start_position: index_of(START_POSITION)?,
            end_position: index_of(END_POSITION)?,
            reference_allele: index_of(REFERENCE_ALLELE)?,
            tumor_seq_allele2: index_of(TUMOR_SEQ_ALLELE2)?,
        })
    }

    /// Derive the lookup key for a data row
    ///
    /// Cells beyond the end of a short row read as empty, which yields an
    /// invalid location instead of an error.
    pub fn genomic_location(&self, line: &str) -> GenomicLocation {
        let fields: Vec<&str> = line.split('\t').collect();
        let cell = |index: usize| fields.get(index).copied().unwrap_or("");

        GenomicLocation::from_maf_fields(
            cell(self.chromosome),
            cell(self.start_position),
            cell(self.end_position),
            cell(self.reference_allele),
            cell(self.tumor_seq_allele2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Hugo_Symbol\tChromosome\tStart_Position\tEnd_Position\tReference_Allele\tTumor_Seq_Allele1\tTumor_Seq_Allele2";

    #[test]
    fn test_header_line() {
        assert_eq!(
            MafRecord::header(),
            "Chromosome\tStart_Position\tEnd_Position\tReference_Allele\tTumor_Seq_Allele2"
        );
    }

    #[test]
    fn test_record_display() {
        let record = MafRecord {
            chromosome: "7".to_string(),
            start_position: 100,
            end_position: 101,
            reference_allele: "-".to_string(),
            tumor_seq_allele: "GA".to_string(),
        };
        assert_eq!(record.to_string(), "7\t100\t101\t-\tGA");
    }

    #[test]
    fn test_columns_resolved_by_name() {
        let columns = MafColumns::from_header(HEADER).unwrap();
        assert_eq!(columns.chromosome, 1);
        assert_eq!(columns.start_position, 2);
        assert_eq!(columns.end_position, 3);
        assert_eq!(columns.reference_allele, 4);
        assert_eq!(columns.tumor_seq_allele2, 6);
    }

    #[test]
    fn test_columns_tolerate_crlf() {
        let header = format!("{}\r\n", MafRecord::header());
        let columns = MafColumns::from_header(&header).unwrap();
        assert_eq!(columns.tumor_seq_allele2, 4);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = MafColumns::from_header("Chromosome\tStart_Position\tEnd_Position\tReference_Allele")
            .unwrap_err();
        assert_eq!(err, NexusError::missing_column("Tumor_Seq_Allele2"));
    }

    #[test]
    fn test_genomic_location_from_row() {
        let columns = MafColumns::from_header(HEADER).unwrap();
        let location =
            columns.genomic_location("BRAF\t7\t140453136\t140453136\tA\tA\tT");
        assert_eq!(location, GenomicLocation::new("7", 140453136, 140453136, "A", "T"));
    }

    #[test]
    fn test_short_row_gives_invalid_location() {
        let columns = MafColumns::from_header(HEADER).unwrap();
        let location = columns.genomic_location("BRAF\t7\t140453136");
        assert!(!location.is_valid());
        assert_eq!(location.reference_allele, "");
    }

    #[test]
    fn test_record_location() {
        let record = MafRecord {
            chromosome: "1".to_string(),
            start_position: 5,
            end_position: 6,
            reference_allele: "TC".to_string(),
            tumor_seq_allele: "-".to_string(),
        };
        assert!(record.genomic_location().is_valid());
    }
}
