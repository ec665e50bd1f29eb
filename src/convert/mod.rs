//! VCF to MAF conversion
//!
//! VCF anchors indels on a shared leading base and uses a single position;
//! MAF drops the anchor, uses an explicit start/end range and marks the
//! absent side of an indel with `-`. [`vcf_to_maf`] performs that mapping
//! for one record and [`convert_vcf`] streams a whole file.
//!
//! | VCF (POS, REF, ALT) | MAF (start, end, ref, alt) |
//! |---------------------|----------------------------|
//! | 100, `A`, `G`       | 100, 100, `A`, `G`         |
//! | 100, `AC`, `GT`     | 100, 101, `AC`, `GT`       |
//! | 100, `ATG`, `A`     | 101, 102, `TG`, `-`        |
//! | 100, `A`, `ATT`     | 100, 101, `-`, `TT`        |

use std::io::{BufRead, Write};

use crate::error::NexusError;
use crate::location::EMPTY_ALLELE;
use crate::maf::MafRecord;
use crate::vcf::{VariantKind, VcfReader, VcfRecord};

/// Convert one VCF record to its MAF representation
///
/// Returns `Ok(None)` for alternate alleles that describe no sequence
/// change (`.`, `*`, symbolic and breakend alleles).
///
/// # Errors
///
/// [`NexusError::MalformedRecord`] when the record has an empty REF, a zero
/// position, or is an insertion whose REF is not a single base matching
/// the first ALT base.
///
/// # Examples
///
/// ```
/// use genome_nexus::convert::vcf_to_maf;
/// use genome_nexus::vcf::VcfRecord;
///
/// let maf = vcf_to_maf(&VcfRecord::new("1", 100, "ATG", "A")).unwrap().unwrap();
/// assert_eq!((maf.start_position, maf.end_position), (101, 102));
/// assert_eq!(maf.reference_allele, "TG");
/// assert_eq!(maf.tumor_seq_allele, "-");
/// ```
pub fn vcf_to_maf(record: &VcfRecord) -> Result<Option<MafRecord>, NexusError> {
    if record.reference.is_empty() {
        return Err(NexusError::malformed(record.to_string(), "empty REF allele"));
    }
    if record.pos == 0 {
        return Err(NexusError::malformed(
            record.to_string(),
            "position must be 1-based",
        ));
    }
    if record.is_non_sequence_alt() {
        return Ok(None);
    }

    let reference = record.reference.as_str();
    let alternate = record.alternate.as_str();

    let maf = match record.kind() {
        VariantKind::Substitution => MafRecord {
            chromosome: record.chrom.clone(),
            start_position: record.pos,
            end_position: offset(record, record.pos, reference.len() - 1)?,
            reference_allele: reference.to_string(),
            tumor_seq_allele: alternate.to_string(),
        },
        VariantKind::Deletion => {
            let prefix = common_prefix_len(alternate, reference);
            let stripped_ref = &reference[prefix..];
            let stripped_alt = &alternate[prefix..];
            // REF is strictly longer than ALT, so stripped_ref is never empty
            let start = offset(record, record.pos, prefix)?;

            MafRecord {
                chromosome: record.chrom.clone(),
                start_position: start,
                end_position: offset(record, start, stripped_ref.len() - 1)?,
                reference_allele: or_sentinel(stripped_ref),
                tumor_seq_allele: or_sentinel(stripped_alt),
            }
        }
        VariantKind::Insertion => {
            if reference.chars().count() != 1 {
                return Err(NexusError::malformed(
                    record.to_string(),
                    "insertion REF must be a single base",
                ));
            }
            if reference.chars().next() != alternate.chars().next() {
                return Err(NexusError::malformed(
                    record.to_string(),
                    "insertion ALT must start with the REF base",
                ));
            }

            MafRecord {
                chromosome: record.chrom.clone(),
                start_position: record.pos,
                end_position: offset(record, record.pos, 1)?,
                reference_allele: EMPTY_ALLELE.to_string(),
                tumor_seq_allele: or_sentinel(&alternate[reference.len()..]),
            }
        }
    };

    Ok(Some(maf))
}

/// `base + delta`, or a malformed-record error past `u64::MAX`
fn offset(record: &VcfRecord, base: u64, delta: usize) -> Result<u64, NexusError> {
    u64::try_from(delta)
        .ok()
        .and_then(|delta| base.checked_add(delta))
        .ok_or_else(|| NexusError::malformed(record.to_string(), "position out of range"))
}

/// Byte length of the longest common prefix, ending on a char boundary
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

fn or_sentinel(allele: &str) -> String {
    if allele.is_empty() {
        EMPTY_ALLELE.to_string()
    } else {
        allele.to_string()
    }
}

/// Options for streaming conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Log and skip malformed records instead of aborting
    pub skip_malformed: bool,
}

impl ConvertOptions {
    /// Create options with defaults (abort on malformed records)
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether malformed records are skipped
    pub fn skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }
}

/// Counters from a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Bi-allelic records read
    pub records: usize,
    /// MAF rows written
    pub written: usize,
    /// Records without a sequence change
    pub skipped: usize,
    /// Malformed records skipped
    pub malformed: usize,
}

/// Stream a VCF file into MAF rows
///
/// Writes the MAF header followed by one row per convertible record.
///
/// # Errors
///
/// Fails on I/O errors, a missing VCF header column, or the first
/// malformed record unless [`ConvertOptions::skip_malformed`] is set.
pub fn convert_vcf<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    options: &ConvertOptions,
) -> Result<ConversionStats, NexusError> {
    let mut stats = ConversionStats::default();
    let mut records = VcfReader::new(reader);

    writeln!(writer, "{}", MafRecord::header())?;

    loop {
        let converted = match records.read_record() {
            Ok(None) => break,
            Ok(Some(record)) => {
                stats.records += 1;
                vcf_to_maf(&record)
            }
            Err(e) => Err(e),
        };

        match converted {
            Ok(Some(maf)) => {
                writeln!(writer, "{}", maf)?;
                stats.written += 1;
            }
            Ok(None) => stats.skipped += 1,
            Err(e @ NexusError::MalformedRecord { .. }) if options.skip_malformed => {
                tracing::warn!(line = records.line_number(), "skipping record: {}", e);
                stats.malformed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    writer.flush()?;
    tracing::info!(
        records = stats.records,
        written = stats.written,
        skipped = stats.skipped,
        malformed = stats.malformed,
        "conversion finished"
    );

    Ok(stats)
}
