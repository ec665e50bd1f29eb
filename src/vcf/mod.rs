//! VCF (Variant Call Format) support
//!
//! This module provides a minimal, header-driven VCF reader producing
//! bi-allelic [`VcfRecord`]s for conversion to MAF.

mod parser;
mod record;

pub use parser::{VcfColumns, VcfReader, ALT, CHROM, ID, POS, REF};
pub use record::{VariantKind, VcfRecord};
