//! CLI utilities for genome-nexus
//!
//! This module provides testable functions used by the CLI binary.
//! Opening inputs and outputs, parsing arguments and printing lookups live
//! here so they can be unit tested without spawning the binary.

pub mod format;
pub mod parse;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::NexusError;

// Re-export commonly used items
pub use format::{output_annotation, output_error, OutputFormat};
pub use parse::{parse_chunk_size, parse_location, parse_tokens};

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Path meaning stdin or stdout
pub const STDIO_PATH: &str = "-";

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// This is common when files are exported from Windows applications or Excel.
///
/// # Examples
///
/// ```
/// use genome_nexus::cli::strip_bom;
///
/// assert_eq!(strip_bom("\u{feff}Hugo_Symbol"), "Hugo_Symbol");
/// assert_eq!(strip_bom("Hugo_Symbol"), "Hugo_Symbol");
/// ```
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Consume a leading UTF-8 BOM from a buffered reader, if present.
pub fn skip_bom<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<()> {
    let bom = UTF8_BOM.as_bytes();
    if reader.fill_buf()?.starts_with(bom) {
        reader.consume(bom.len());
    }
    Ok(())
}

/// Open an input file for line-oriented reading.
///
/// `-` reads stdin; paths ending in `.gz` are decompressed. A leading BOM is
/// skipped either way.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, NexusError> {
    let mut reader: Box<dyn BufRead> = if path == Path::new(STDIO_PATH) {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).map_err(|e| NexusError::Io {
            msg: format!("cannot open {}: {}", path.display(), e),
        })?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    skip_bom(&mut reader)?;
    Ok(reader)
}

/// Open an output sink; `None` or `-` writes to stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, NexusError> {
    match path {
        Some(path) if path != Path::new(STDIO_PATH) => {
            let file = File::create(path).map_err(|e| NexusError::Io {
                msg: format!("cannot create {}: {}", path.display(), e),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Read;

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}test"), "test");
        assert_eq!(strip_bom("test"), "test");
        assert_eq!(strip_bom("\u{feff}"), "");
        assert_eq!(strip_bom(""), "");
    }

    #[test]
    fn test_skip_bom() {
        let mut reader = io::Cursor::new("\u{feff}#CHROM\tPOS".as_bytes());
        skip_bom(&mut reader).unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "#CHROM\tPOS");
    }

    #[test]
    fn test_open_plain_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.maf");
        std::fs::write(&path, "\u{feff}Chromosome\n7\n").unwrap();

        let lines: Vec<String> = open_input(&path)
            .unwrap()
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["Chromosome", "7"]);
    }

    #[test]
    fn test_open_gzip_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.vcf.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"#CHROM\tPOS\n1\t5\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = open_input(&path)
            .unwrap()
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["#CHROM\tPOS", "1\t5"]);
    }

    #[test]
    fn test_open_missing_input() {
        let err = open_input(Path::new("/nonexistent/input.maf")).err().unwrap();
        assert!(matches!(err, NexusError::Io { .. }));
    }

    #[test]
    fn test_open_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.maf");
        {
            let mut out = open_output(Some(&path)).unwrap();
            writeln!(out, "row").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "row\n");
    }
}
