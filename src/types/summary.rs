//! Run summaries printed by the CLI

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Operations exposed by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Compress,
    Decompress,
    DecompressFolder,
    Vocabulary,
    Generate,
    ListRelations,
    CommonRelations,
    Predicates,
    Sanitize,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Compress => "COMPRESS",
            Operation::Decompress => "DECOMPRESS",
            Operation::DecompressFolder => "DECOMPRESS_FOLDER",
            Operation::Vocabulary => "VOCABULARY",
            Operation::Generate => "GENERATE",
            Operation::ListRelations => "LIST_RELATIONS",
            Operation::CommonRelations => "COMMON_RELATIONS",
            Operation::Predicates => "PREDICATES",
            Operation::Sanitize => "SANITIZE",
        };
        write!(f, "{}", name)
    }
}

/// What a finished operation read, wrote and counted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// Named counters (records, frames, actions, ...)
    pub counts: BTreeMap<String, usize>,
    /// Recoverable problems (suppressed facts, unknown relations)
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl RunSummary {
    pub fn new(operation: Operation) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            inputs: Vec::new(),
            outputs: Vec::new(),
            counts: BTreeMap::new(),
            warnings: 0,
            fingerprint: None,
        }
    }

    pub fn input(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.inputs.push(path.as_ref().display().to_string());
        self
    }

    pub fn output(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.outputs.push(path.as_ref().display().to_string());
        self
    }

    pub fn count(mut self, name: &str, value: usize) -> Self {
        self.counts.insert(name.to_string(), value);
        self
    }

    pub fn warnings(mut self, warnings: usize) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    fn counts_string(&self) -> String {
        self.counts
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let status = if self.warnings == 0 {
            "✓".green().bold()
        } else {
            "⚠".yellow().bold()
        };
        let mut out = format!(
            "{} {} | {}",
            status,
            self.operation.to_string().bold(),
            self.counts_string()
        );
        if self.warnings > 0 {
            out.push_str(&format!(" | {}", format!("warnings={}", self.warnings).yellow()));
        }
        for path in &self.outputs {
            out.push_str(&format!("\n  {} {}", "→".cyan(), path));
        }
        if let Some(fp) = &self.fingerprint {
            out.push_str(&format!("\n  {}", format!("vocabulary {}", &fp[..fp.len().min(16)]).dimmed()));
        }
        out
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let mut out = format!(
            "operation={} | {} | warnings={}",
            self.operation,
            self.counts_string(),
            self.warnings
        );
        for path in &self.outputs {
            out.push_str(&format!(" | output={}", path));
        }
        if let Some(fp) = &self.fingerprint {
            out.push_str(&format!(" | fingerprint={}", fp));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parseable_string() {
        let summary = RunSummary::new(Operation::Compress)
            .input("video.txt")
            .output("video_compressed.txt")
            .count("records", 3)
            .count("lines", 8);
        assert_eq!(
            summary.to_parseable_string(),
            "operation=COMPRESS | lines=8 records=3 | warnings=0 | output=video_compressed.txt"
        );
    }

    #[test]
    fn test_json_round_trip() {
        let summary = RunSummary::new(Operation::Generate)
            .count("actions", 2)
            .fingerprint("abcd");
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"GENERATE\""));
        let restored: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.counts.get("actions"), Some(&2));
        assert_eq!(restored.fingerprint.as_deref(), Some("abcd"));
    }
}
