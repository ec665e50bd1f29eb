//! Line-oriented VCF reading
//!
//! Columns are resolved by name from the `#CHROM` header line, so files
//! with reordered or extra columns are read correctly. Meta-information
//! lines (`##`) and other comment lines are skipped.

use std::io::BufRead;

use crate::error::NexusError;

use super::record::VcfRecord;

/// Chromosome column name as it appears on the header line
pub const CHROM: &str = "#CHROM";
/// Position column name
pub const POS: &str = "POS";
/// Identifier column name
pub const ID: &str = "ID";
/// Reference allele column name
pub const REF: &str = "REF";
/// Alternate allele column name
pub const ALT: &str = "ALT";

/// Positions of the variant columns within a VCF header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcfColumns {
    pub chrom: usize,
    pub pos: usize,
    pub id: Option<usize>,
    pub reference: usize,
    pub alternate: usize,
}

impl VcfColumns {
    /// Resolve column positions from a `#CHROM` header line
    pub fn from_header(header: &str) -> Result<Self, NexusError> {
        let names: Vec<&str> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(str::trim)
            .collect();
        let find = |column: &str| names.iter().position(|name| *name == column);
        let required = |column: &str| find(column).ok_or_else(|| NexusError::missing_column(column));

        Ok(Self {
            chrom: find(CHROM)
                .or_else(|| find("CHROM"))
                .ok_or_else(|| NexusError::missing_column(CHROM))?,
            pos: required(POS)?,
            id: find(ID),
            reference: required(REF)?,
            alternate: required(ALT)?,
        })
    }

    /// Parse a data line into one record per alternate allele
    pub fn parse_line(&self, line: &str) -> Result<Vec<VcfRecord>, NexusError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split('\t').collect();
        let cell = |index: usize| {
            fields.get(index).copied().ok_or_else(|| {
                NexusError::malformed(
                    line,
                    format!("expected at least {} fields, got {}", index + 1, fields.len()),
                )
            })
        };

        let chrom = cell(self.chrom)?;
        let raw_pos = cell(self.pos)?;
        let pos: u64 = raw_pos.trim().parse().map_err(|_| {
            NexusError::malformed(line, format!("invalid position '{}'", raw_pos))
        })?;
        let id = match self.id {
            Some(index) => fields
                .get(index)
                .filter(|id| !id.is_empty() && **id != ".")
                .map(|id| id.to_string()),
            None => None,
        };
        let reference = cell(self.reference)?;
        let alternates = cell(self.alternate)?;

        Ok(alternates
            .split(',')
            .map(|alternate| VcfRecord {
                chrom: chrom.to_string(),
                pos,
                id: id.clone(),
                reference: reference.to_string(),
                alternate: alternate.to_string(),
            })
            .collect())
    }
}

/// Streaming VCF reader yielding bi-allelic records
///
/// The header is resolved lazily on the first `#CHROM` line; a data line
/// before any header fails with [`NexusError::MissingColumn`].
pub struct VcfReader<R> {
    inner: R,
    columns: Option<VcfColumns>,
    pending: std::vec::IntoIter<VcfRecord>,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a new reader over buffered input
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            columns: None,
            pending: Vec::new().into_iter(),
            line_number: 0,
            buf: String::new(),
        }
    }

    /// The resolved header columns, once the header has been read
    pub fn columns(&self) -> Option<&VcfColumns> {
        self.columns.as_ref()
    }

    /// Number of input lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record
    pub fn read_record(&mut self) -> Result<Option<VcfRecord>, NexusError> {
        loop {
            if let Some(record) = self.pending.next() {
                return Ok(Some(record));
            }

            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with("##") {
                continue;
            }
            if line.starts_with('#') {
                if line.starts_with(CHROM) {
                    self.columns = Some(VcfColumns::from_header(line)?);
                }
                continue;
            }

            let columns = self
                .columns
                .as_ref()
                .ok_or_else(|| NexusError::missing_column(CHROM))?;
            self.pending = columns.parse_line(line)?.into_iter();
        }
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VcfRecord, NexusError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
