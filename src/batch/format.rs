//! Output row layout for annotated MAF files
//!
//! The set of appended columns is fixed once per run by [`OutputLayout`].
//! Every row, whether annotated or a placeholder, carries exactly that many
//! extra cells so downstream column alignment survives partial failure.

use crate::client::{IndicatorQueryResp, TranscriptConsequenceSummary, VariantAnnotation};

/// Columns appended for every run
pub const ANNOTATION_COLUMNS: [&str; 5] = [
    "hugoGeneSymbol",
    "hgvspShort",
    "hgvsc",
    "exon",
    "variantClassification",
];

/// Columns appended when a knowledge-base token is supplied
pub const KNOWLEDGE_BASE_COLUMNS: [&str; 4] = [
    "oncokbHighestSensitiveLevel",
    "oncokbHighestResistanceLevel",
    "oncokbDrugLevels",
    "oncokbCitations",
];

/// Trailing column of the failure sink
pub const ERROR_CODE_COLUMN: &str = "GENOME_NEXUS_ERROR_CODE";

/// Error code written for rows whose batch lookup failed
pub const API_ERROR: &str = "API_ERROR";

/// The declared set of appended columns for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    knowledge_base: bool,
    placeholder: String,
}

impl OutputLayout {
    /// Layout with or without the knowledge-base columns
    pub fn new(knowledge_base: bool) -> Self {
        let count = ANNOTATION_COLUMNS.len()
            + if knowledge_base {
                KNOWLEDGE_BASE_COLUMNS.len()
            } else {
                0
            };
        Self {
            knowledge_base,
            placeholder: "\t".repeat(count),
        }
    }

    /// Names of the appended columns, in order
    pub fn added_columns(&self) -> Vec<&'static str> {
        let mut columns = ANNOTATION_COLUMNS.to_vec();
        if self.knowledge_base {
            columns.extend_from_slice(&KNOWLEDGE_BASE_COLUMNS);
        }
        columns
    }

    /// The input header extended with the appended columns
    ///
    /// Header and row methods take the raw line bytes so cells that are not
    /// valid UTF-8 are carried through unchanged.
    pub fn header(&self, header: &[u8]) -> Vec<u8> {
        let mut row = header.to_vec();
        for column in self.added_columns() {
            row.push(b'\t');
            row.extend_from_slice(column.as_bytes());
        }
        row
    }

    /// Header of the failure sink
    pub fn failure_header(&self, header: &[u8]) -> Vec<u8> {
        let mut row = self.header(header);
        row.push(b'\t');
        row.extend_from_slice(ERROR_CODE_COLUMN.as_bytes());
        row
    }

    /// A row with every appended cell empty
    pub fn placeholder_row(&self, line: &[u8]) -> Vec<u8> {
        [line, self.placeholder.as_bytes()].concat()
    }

    /// A failure-sink row: empty appended cells plus an error code
    pub fn failed_row(&self, line: &[u8], code: &str) -> Vec<u8> {
        [line, self.placeholder.as_bytes(), code.as_bytes()].concat()
    }

    /// A row with formatted annotation cells
    pub fn annotated_row(
        &self,
        line: &[u8],
        annotation: &VariantAnnotation,
        summary: &TranscriptConsequenceSummary,
    ) -> Vec<u8> {
        let mut cells: Vec<String> = vec![
            cell(&summary.hugo_gene_symbol),
            cell(&summary.hgvsp_short),
            cell(&summary.hgvsc),
            cell(&summary.exon),
            cell(&summary.variant_classification),
        ];
        if self.knowledge_base {
            cells.extend(knowledge_base_cells(annotation.indicator()));
        }

        let mut row = line.to_vec();
        for value in cells {
            row.push(b'\t');
            row.extend_from_slice(value.as_bytes());
        }
        row
    }
}

fn knowledge_base_cells(indicator: Option<&IndicatorQueryResp>) -> [String; 4] {
    let Some(indicator) = indicator else {
        return Default::default();
    };

    let mut drug_levels: Vec<String> = Vec::new();
    let mut citations: Vec<String> = Vec::new();
    for treatment in &indicator.treatments {
        let drugs = treatment
            .drugs
            .iter()
            .map(|drug| drug.drug_name.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let entry = match &treatment.level {
            Some(level) if !drugs.is_empty() => format!("{}:{}", drugs, level),
            Some(level) => level.clone(),
            None => drugs,
        };
        push_unique(&mut drug_levels, entry);

        for pmid in &treatment.pmids {
            push_unique(&mut citations, pmid.trim().to_string());
        }
    }

    [
        cell(&indicator.highest_sensitive_level),
        cell(&indicator.highest_resistance_level),
        sanitize(&drug_levels.join(";")),
        sanitize(&citations.join(",")),
    ]
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

fn cell(value: &Option<String>) -> String {
    value.as_deref().map(sanitize).unwrap_or_default()
}

/// Keep service values from breaking the tab-separated layout
fn sanitize(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Drug, Treatment};
    use crate::location::GenomicLocation;

    fn braf_summary() -> TranscriptConsequenceSummary {
        TranscriptConsequenceSummary {
            hugo_gene_symbol: Some("BRAF".to_string()),
            hgvsp_short: Some("p.V600E".to_string()),
            hgvsc: Some("ENST00000288602.6:c.1799T>A".to_string()),
            exon: Some("15/18".to_string()),
            variant_classification: Some("Missense_Mutation".to_string()),
            transcript_id: None,
        }
    }

    fn braf_annotation() -> VariantAnnotation {
        VariantAnnotation::with_summary(
            GenomicLocation::new("7", 140453136, 140453136, "A", "T"),
            Some(braf_summary()),
        )
    }

    fn text(row: Vec<u8>) -> String {
        String::from_utf8(row).unwrap()
    }

    fn treatment(drugs: &[&str], level: &str, pmids: &[&str]) -> Treatment {
        Treatment {
            drugs: drugs
                .iter()
                .map(|name| Drug {
                    drug_name: name.to_string(),
                })
                .collect(),
            level: Some(level.to_string()),
            pmids: pmids.iter().map(|p| p.to_string()).collect(),
            abstracts: Vec::new(),
        }
    }

    #[test]
    fn test_column_counts() {
        assert_eq!(OutputLayout::new(false).added_columns().len(), 5);
        assert_eq!(OutputLayout::new(true).added_columns().len(), 9);
        assert_eq!(OutputLayout::new(true).placeholder_row(b""), b"\t".repeat(9));
    }

    #[test]
    fn test_header() {
        let layout = OutputLayout::new(false);
        assert_eq!(
            text(layout.header(b"Chromosome\tStart_Position")),
            "Chromosome\tStart_Position\thugoGeneSymbol\thgvspShort\thgvsc\texon\tvariantClassification"
        );
        assert!(text(layout.failure_header(b"Chromosome"))
            .ends_with("\tvariantClassification\tGENOME_NEXUS_ERROR_CODE"));
    }

    #[test]
    fn test_placeholder_matches_header_width() {
        for knowledge_base in [false, true] {
            let layout = OutputLayout::new(knowledge_base);
            let header = text(layout.header(b"A\tB"));
            let row = text(layout.placeholder_row(b"1\t2"));
            assert_eq!(
                header.split('\t').count(),
                row.split('\t').count(),
                "knowledge_base={}",
                knowledge_base
            );
        }
    }

    #[test]
    fn test_failed_row() {
        let layout = OutputLayout::new(false);
        assert_eq!(layout.failed_row(b"x", API_ERROR), b"x\t\t\t\t\tAPI_ERROR");
    }

    #[test]
    fn test_rows_keep_non_utf8_bytes() {
        let layout = OutputLayout::new(false);
        let line = b"caf\xe9\t7";
        assert_eq!(layout.placeholder_row(line), b"caf\xe9\t7\t\t\t\t\t");
        let row = layout.annotated_row(line, &braf_annotation(), &braf_summary());
        assert!(row.starts_with(b"caf\xe9\t7\tBRAF\t"));
    }

    #[test]
    fn test_annotated_row() {
        let layout = OutputLayout::new(false);
        let row = text(layout.annotated_row(b"line", &braf_annotation(), &braf_summary()));
        assert_eq!(
            row,
            "line\tBRAF\tp.V600E\tENST00000288602.6:c.1799T>A\t15/18\tMissense_Mutation"
        );
    }

    #[test]
    fn test_missing_summary_fields_are_empty() {
        let layout = OutputLayout::new(false);
        let summary = TranscriptConsequenceSummary {
            hugo_gene_symbol: Some("TP53".to_string()),
            ..Default::default()
        };
        let row = text(layout.annotated_row(b"line", &braf_annotation(), &summary));
        assert_eq!(row, "line\tTP53\t\t\t\t");
    }

    #[test]
    fn test_values_with_tabs_are_sanitized() {
        let layout = OutputLayout::new(false);
        let summary = TranscriptConsequenceSummary {
            hugo_gene_symbol: Some("A\tB".to_string()),
            ..Default::default()
        };
        let row = text(layout.annotated_row(b"line", &braf_annotation(), &summary));
        assert_eq!(row.split('\t').count(), 6);
    }

    #[test]
    fn test_knowledge_base_cells() {
        let layout = OutputLayout::new(true);
        let annotation = braf_annotation().with_oncokb(IndicatorQueryResp {
            highest_sensitive_level: Some("LEVEL_1".to_string()),
            highest_resistance_level: Some("LEVEL_R2".to_string()),
            treatments: vec![
                treatment(&["Dabrafenib", "Trametinib"], "LEVEL_1", &["25399551", "22663011"]),
                treatment(&["Vemurafenib"], "LEVEL_1", &["22663011"]),
                treatment(&["Vemurafenib"], "LEVEL_1", &[]),
            ],
        });

        let row = text(layout.annotated_row(b"line", &annotation, &braf_summary()));
        let cells: Vec<&str> = row.split('\t').collect();
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[6], "LEVEL_1");
        assert_eq!(cells[7], "LEVEL_R2");
        assert_eq!(cells[8], "Dabrafenib+Trametinib:LEVEL_1;Vemurafenib:LEVEL_1");
        assert_eq!(cells[9], "25399551,22663011");
    }

    #[test]
    fn test_knowledge_base_cells_without_indicator() {
        let layout = OutputLayout::new(true);
        let row = text(layout.annotated_row(b"line", &braf_annotation(), &braf_summary()));
        assert!(row.ends_with("Missense_Mutation\t\t\t\t"));
        assert_eq!(row.split('\t').count(), 10);
    }
}
