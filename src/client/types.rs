//! Annotation service response types
//!
//! Only the fields the pipeline formats are typed; everything else the
//! service returns is kept as raw JSON so single-variant lookups can be
//! printed in full.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::location::GenomicLocation;

/// One variant annotation as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAnnotation {
    /// Normalized variant identifier (HGVS genomic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// The query this annotation answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_variant_query: Option<String>,

    /// Curated summary of the most relevant consequence
    #[serde(
        rename = "annotation_summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotation_summary: Option<AnnotationSummary>,

    /// Knowledge-base annotation, present when requested with a token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oncokb: Option<OncokbAnnotation>,

    /// Fields not interpreted by this crate
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl VariantAnnotation {
    /// Create an annotation carrying a summary for `location`
    pub fn with_summary(
        location: GenomicLocation,
        summary: Option<TranscriptConsequenceSummary>,
    ) -> Self {
        Self {
            variant: None,
            original_variant_query: Some(location.key()),
            annotation_summary: Some(AnnotationSummary {
                genomic_location: Some(location),
                transcript_consequence_summary: summary,
                other: Map::new(),
            }),
            oncokb: None,
            other: Map::new(),
        }
    }

    /// Attach a knowledge-base annotation
    pub fn with_oncokb(mut self, indicator: IndicatorQueryResp) -> Self {
        self.oncokb = Some(OncokbAnnotation {
            annotation: Some(indicator),
        });
        self
    }

    /// The location the service resolved this annotation to
    pub fn genomic_location(&self) -> Option<&GenomicLocation> {
        self.annotation_summary
            .as_ref()
            .and_then(|summary| summary.genomic_location.as_ref())
    }

    /// The consequence summary, if the service produced one
    pub fn transcript_consequence_summary(&self) -> Option<&TranscriptConsequenceSummary> {
        self.annotation_summary
            .as_ref()
            .and_then(|summary| summary.transcript_consequence_summary.as_ref())
    }

    /// The knowledge-base indicator, if present
    pub fn indicator(&self) -> Option<&IndicatorQueryResp> {
        self.oncokb
            .as_ref()
            .and_then(|oncokb| oncokb.annotation.as_ref())
    }
}

/// The `annotation_summary` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genomic_location: Option<GenomicLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_consequence_summary: Option<TranscriptConsequenceSummary>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Consequence on the selected transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptConsequenceSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hugo_gene_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hgvsp_short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hgvsc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
}

/// The `oncokb` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OncokbAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<IndicatorQueryResp>,
}

/// Therapeutic indicator for a variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorQueryResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_sensitive_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_resistance_level: Option<String>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

/// One drug (or drug combination) with its evidence level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    #[serde(default)]
    pub drugs: Vec<Drug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub pmids: Vec<String>,
    #[serde(default)]
    pub abstracts: Vec<Citation>,
}

/// A drug in a treatment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    pub drug_name: String,
}

/// A conference abstract cited as evidence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "abstract", default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "variant": "7:g.140453136A>T",
        "originalVariantQuery": "7,140453136,140453136,A,T",
        "assemblyName": "GRCh37",
        "annotation_summary": {
            "genomicLocation": {
                "chromosome": "7",
                "start": 140453136,
                "end": 140453136,
                "referenceAllele": "A",
                "variantAllele": "T"
            },
            "strandSign": "-",
            "transcriptConsequenceSummary": {
                "hugoGeneSymbol": "BRAF",
                "hgvspShort": "p.V600E",
                "hgvsc": "ENST00000288602.6:c.1799T>A",
                "exon": "15/18",
                "variantClassification": "Missense_Mutation",
                "transcriptId": "ENST00000288602"
            }
        },
        "oncokb": {
            "annotation": {
                "highestSensitiveLevel": "LEVEL_1",
                "highestResistanceLevel": null,
                "treatments": [
                    {
                        "drugs": [{"drugName": "Dabrafenib"}, {"drugName": "Trametinib"}],
                        "level": "LEVEL_1",
                        "pmids": ["25399551"],
                        "abstracts": [{"abstract": "Flaherty et al. ASCO 2012", "link": "http://example.org"}]
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_deserialize_full_response() {
        let annotation: VariantAnnotation = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(
            annotation.genomic_location(),
            Some(&GenomicLocation::new("7", 140453136, 140453136, "A", "T"))
        );
        let summary = annotation.transcript_consequence_summary().unwrap();
        assert_eq!(summary.hugo_gene_symbol.as_deref(), Some("BRAF"));
        assert_eq!(summary.hgvsp_short.as_deref(), Some("p.V600E"));
        assert_eq!(summary.exon.as_deref(), Some("15/18"));

        let indicator = annotation.indicator().unwrap();
        assert_eq!(indicator.highest_sensitive_level.as_deref(), Some("LEVEL_1"));
        assert_eq!(indicator.highest_resistance_level, None);
        assert_eq!(indicator.treatments[0].drugs.len(), 2);
        assert_eq!(indicator.treatments[0].abstracts[0].text, "Flaherty et al. ASCO 2012");
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let annotation: VariantAnnotation = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(annotation.other["assemblyName"], "GRCh37");
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["assemblyName"], "GRCh37");
        assert_eq!(json["annotation_summary"]["strandSign"], "-");
    }

    #[test]
    fn test_missing_summary() {
        let annotation: VariantAnnotation =
            serde_json::from_str(r#"{"variant": "1:g.1A>G"}"#).unwrap();
        assert!(annotation.annotation_summary.is_none());
        assert!(annotation.genomic_location().is_none());
        assert!(annotation.transcript_consequence_summary().is_none());
    }

    #[test]
    fn test_with_summary_builder() {
        let location = GenomicLocation::new("1", 5, 5, "A", "G");
        let annotation = VariantAnnotation::with_summary(location.clone(), None);
        assert_eq!(annotation.genomic_location(), Some(&location));
        assert!(annotation.transcript_consequence_summary().is_none());
    }
}
