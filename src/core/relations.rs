//! Relation listing and cross-file relation report

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::info;

use crate::core::config::Dictionaries;
use crate::core::corpus::corpus_files;
use crate::core::decompressor::IntervalFile;
use crate::core::reader::FactFile;
use crate::types::{read_file, write_file, KscgrError, Result, Triple};
use crate::CORPUS_EXTENSION;

/// Layout of a relation file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLayout {
    Dense,
    Intervals,
}

/// A file whose first data line holds a TAB is dense, otherwise intervals
pub fn detect_layout(text: &str) -> RelationLayout {
    text.lines()
        .map(str::trim_start)
        .find(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .filter(|line| !line.contains('\t'))
        .map_or(RelationLayout::Dense, |_| RelationLayout::Intervals)
}

/// Distinct triples of a dense or interval file
pub fn file_relations(path: impl AsRef<Path>, dictionaries: Option<&Dictionaries>) -> Result<BTreeSet<Triple>> {
    let path = path.as_ref();
    let text = read_file(path)?;
    match detect_layout(&text) {
        RelationLayout::Dense => FactFile::open(path)?.allow_gaps().triples(),
        RelationLayout::Intervals => {
            let records = IntervalFile::parse(&text, &path.display().to_string())?.records(dictionaries)?;
            Ok(records.into_iter().map(|r| r.triple).collect())
        }
    }
}

/// Parse `subject relation object` lines (blank and `#` lines skipped)
pub fn parse_triple_list(text: &str, source_name: &str) -> Result<Vec<Triple>> {
    let mut triples = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let triple = Triple::parse_spaced(line).ok_or_else(|| {
            KscgrError::format(source_name, i + 1, raw, "expected `subject relation object`")
        })?;
        triples.push(triple);
    }
    Ok(triples)
}

pub fn load_triple_list(path: impl AsRef<Path>) -> Result<Vec<Triple>> {
    let path = path.as_ref();
    parse_triple_list(&read_file(path)?, &path.display().to_string())
}

/// One `subject relation object` line per triple
pub fn render_relation_list<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    triples.into_iter().map(|t| format!("{}\n", t)).collect()
}

/// Write the sorted distinct triples of `input` to `output`
pub fn list_relations(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    dictionaries: Option<&Dictionaries>,
) -> Result<BTreeSet<Triple>> {
    let triples = file_relations(input, dictionaries)?;
    write_file(output.as_ref(), &render_relation_list(&triples))?;
    info!("File saved at: {}", output.as_ref().display());
    Ok(triples)
}

/// Triples grouped by the number of files they appear in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonRelations {
    pub files: usize,
    groups: BTreeMap<usize, BTreeSet<Triple>>,
}

impl CommonRelations {
    /// Triples found in exactly `count` files
    pub fn in_files(&self, count: usize) -> Option<&BTreeSet<Triple>> {
        self.groups.get(&count)
    }

    /// Triples found in every file
    pub fn common(&self) -> BTreeSet<Triple> {
        self.in_files(self.files).cloned().unwrap_or_default()
    }

    pub fn triple_count(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    /// `# <n> files` sections, most widespread first
    pub fn render(&self) -> String {
        self.groups
            .iter()
            .rev()
            .map(|(count, triples)| format!("# {} files\n{}", count, render_relation_list(triples)))
            .join("")
    }
}

pub fn common_relations(files: &[PathBuf], dictionaries: Option<&Dictionaries>) -> Result<CommonRelations> {
    let mut seen: BTreeMap<Triple, usize> = BTreeMap::new();
    for path in files {
        for triple in file_relations(path, dictionaries)? {
            *seen.entry(triple).or_default() += 1;
        }
    }

    let mut groups: BTreeMap<usize, BTreeSet<Triple>> = BTreeMap::new();
    for (triple, count) in seen {
        groups.entry(count).or_default().insert(triple);
    }
    Ok(CommonRelations {
        files: files.len(),
        groups,
    })
}

/// Report over every corpus file of `folder`
pub fn common_relations_to_file(
    folder: impl AsRef<Path>,
    output: impl AsRef<Path>,
    dictionaries: Option<&Dictionaries>,
) -> Result<CommonRelations> {
    let output = output.as_ref();
    let files: Vec<PathBuf> = corpus_files(folder, CORPUS_EXTENSION)?
        .into_iter()
        .filter(|p| p != output)
        .collect();
    let report = common_relations(&files, dictionaries)?;
    write_file(output, &report.render())?;
    info!("Relations of {} files saved at: {}", report.files, output.display());
    Ok(report)
}
