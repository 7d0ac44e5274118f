//! State vocabulary: the sorted set of distinct triples over a corpus
//!
//! Index `i` of every state vector is the `i`-th triple in lexicographic
//! `(subject, relation, object)` order. Persisted as `dictionary.dat`:
//!
//! ```text
//! 0 person holding shell-egg
//! 1 shell-egg on bowl
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::core::reader::FactFile;
use crate::types::{read_file, write_file, KscgrError, Result, StateVector, Triple};

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    triples: Vec<Triple>,
    index: HashMap<Triple, usize>,
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}

impl Eq for Vocabulary {}

impl Vocabulary {
    /// Build from any collection of triples (duplicates collapse)
    pub fn new(triples: impl IntoIterator<Item = Triple>) -> Self {
        let sorted: BTreeSet<Triple> = triples.into_iter().collect();
        let triples: Vec<Triple> = sorted.into_iter().collect();
        let index = triples.iter().cloned().enumerate().map(|(i, t)| (t, i)).collect();
        Self { triples, index }
    }

    /// Union of the triples of every file
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FactFile>) -> Result<Self> {
        let mut all = BTreeSet::new();
        for file in files {
            all.extend(file.triples()?);
        }
        let vocabulary = Self::new(all);
        info!("Vocabulary holds {} triples", vocabulary.len());
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Triple> {
        self.triples.get(idx)
    }

    pub fn index_of(&self, triple: &Triple) -> Option<usize> {
        self.index.get(triple).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Triple)> {
        self.triples.iter().enumerate()
    }

    /// State vector with a 1 at every active triple
    pub fn vector_for<'a>(&self, active: impl IntoIterator<Item = &'a Triple>) -> Result<StateVector> {
        let mut vector = StateVector::zeros(self.len());
        for triple in active {
            let idx = self
                .index_of(triple)
                .ok_or_else(|| KscgrError::VocabularyMismatch { triple: triple.clone() })?;
            vector.set(idx, true);
        }
        Ok(vector)
    }

    /// Triples active in `vector`
    pub fn triples_of<'a>(&'a self, vector: &'a StateVector) -> impl Iterator<Item = &'a Triple> + 'a {
        vector.active().filter_map(move |idx| self.get(idx))
    }

    /// `dictionary.dat` content
    pub fn render(&self) -> String {
        self.iter()
            .map(|(i, t)| format!("{} {}\n", i, t))
            .collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(path.as_ref(), &self.render())?;
        info!("Saved vocabulary of {} triples at {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::parse(&read_file(path)?, &path.display().to_string())
    }

    /// Parse `idx subject relation object` rows. Indices must run 0, 1, 2...
    /// in lexicographic triple order.
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut triples = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(KscgrError::format(
                    source_name,
                    line_no,
                    raw,
                    format!("expected `idx subject relation object`, found {} fields", fields.len()),
                ));
            }
            let idx = fields[0]
                .parse::<usize>()
                .map_err(|_| KscgrError::format(source_name, line_no, raw, "index is not a number"))?;
            if idx != triples.len() {
                return Err(KscgrError::format(
                    source_name,
                    line_no,
                    raw,
                    format!("expected index {}, found {}", triples.len(), idx),
                ));
            }
            let triple = Triple::new(fields[1], fields[2], fields[3]);
            if triples.last().is_some_and(|prev: &Triple| *prev >= triple) {
                return Err(KscgrError::format(source_name, line_no, raw, "triples are not in sorted order"));
            }
            triples.push(triple);
        }
        Ok(Self::new(triples))
    }

    /// SHA-256 of the rendered vocabulary, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.render().as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
