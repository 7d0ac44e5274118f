//! Error taxonomy for every file-processing operation
//!
//! All variants are fatal for the file being processed. The only recoverable
//! condition (a fact suppressed by filtered decompression) is logged, never
//! raised.

use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::types::Triple;

/// Crate-wide result
pub type Result<T> = std::result::Result<T, KscgrError>;

#[derive(Debug, Error)]
pub enum KscgrError {
    /// Malformed line: wrong field count, non-numeric id, reversed interval
    #[error("{source_name}:{line}: {reason} [{content}]")]
    Format {
        source_name: String,
        line: usize,
        content: String,
        reason: String,
    },

    /// Frame numbering is not contiguous or goes backwards
    #[error("{source_name}:{line}: frame {found} breaks the sequence, expected frame {expected}")]
    Sequence {
        source_name: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A referenced id or name is absent from a class/relation dictionary
    #[error("{source_name}{}: {key} not found in {table}", .line.map(|l| format!(":{}", l)).unwrap_or_default())]
    Lookup {
        source_name: String,
        line: Option<usize>,
        key: String,
        table: String,
    },

    /// A triple queried against a vocabulary that does not contain it
    #[error("triple ({triple}) is not in the vocabulary; rebuild it over a larger corpus")]
    VocabularyMismatch { triple: Triple },

    /// Vectors built over different vocabularies
    #[error("vector dimensions differ: {expected} vs {found}")]
    Dimension { expected: usize, found: usize },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KscgrError {
    /// Build a format error
    pub fn format(
        source_name: impl Into<String>,
        line: usize,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Format {
            source_name: source_name.into(),
            line,
            content: content.into(),
            reason: reason.into(),
        }
    }

    /// Build a lookup error; `line` is the referencing line when known
    pub fn lookup(
        source_name: impl Into<String>,
        line: Option<usize>,
        key: impl ToString,
        table: impl Into<String>,
    ) -> Self {
        Self::Lookup {
            source_name: source_name.into(),
            line,
            key: key.to_string(),
            table: table.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Stable reason code (for logs and JSON output)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Format { .. } => "E100_FORMAT",
            Self::Sequence { .. } => "E200_SEQUENCE",
            Self::Lookup { .. } => "E300_LOOKUP",
            Self::VocabularyMismatch { .. } => "E400_VOCABULARY_MISMATCH",
            Self::Dimension { .. } => "E500_DIMENSION",
            Self::Io { .. } => "E600_IO",
        }
    }
}

/// Read a whole file, tagging failures with its path
pub fn read_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| KscgrError::io(path, e))
}

/// Write a whole file, creating parent folders
pub fn write_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| KscgrError::io(parent, e))?;
        }
    }
    std::fs::write(path, content).map_err(|e| KscgrError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_names_line_and_content() {
        let err = KscgrError::format("video.txt", 7, "0\tperson", "expected 4 fields, found 2");
        let msg = err.to_string();
        assert!(msg.contains("video.txt:7"), "{}", msg);
        assert!(msg.contains("0\tperson"), "{}", msg);
        assert_eq!(err.code(), "E100_FORMAT");
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            KscgrError::format("f", 1, "", ""),
            KscgrError::Sequence { source_name: "f".into(), line: 1, expected: 1, found: 3 },
            KscgrError::lookup("f", Some(1), 42, "classes.cfg"),
            KscgrError::VocabularyMismatch { triple: Triple::new("a", "b", "c") },
            KscgrError::Dimension { expected: 1, found: 2 },
            KscgrError::io("f", std::io::Error::new(std::io::ErrorKind::NotFound, "missing")),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_lookup_message_with_and_without_line() {
        let with_line = KscgrError::lookup("video.txt", Some(3), 42, "classes.cfg");
        assert_eq!(with_line.to_string(), "video.txt:3: 42 not found in classes.cfg");
        let without = KscgrError::lookup("video.txt", None, "pan", "classes.cfg");
        assert_eq!(without.to_string(), "video.txt: pan not found in classes.cfg");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_file("/definitely/not/here.txt").unwrap_err();
        assert_eq!(err.code(), "E600_IO");
    }
}
