//! Relational facts: triples, per-frame facts and frames

use serde::{Deserialize, Serialize};

/// A `(subject, relation, object)` relation type, independent of time.
///
/// Ordering is lexicographic by subject, then relation, then object. The
/// vocabulary relies on this to assign stable indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// Parse `subject relation object` (whitespace separated)
    pub fn parse_spaced(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let triple = Self::new(parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(triple)
    }

    /// Tab separated form used by dense fact files
    pub fn to_tabbed(&self) -> String {
        format!("{}\t{}\t{}", self.subject, self.relation, self.object)
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.relation, self.object)
    }
}

/// One triple holding at one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub frame: usize,
    pub triple: Triple,
}

impl Fact {
    pub fn new(frame: usize, triple: Triple) -> Self {
        Self { frame, triple }
    }

    /// Dense file row: `frame<TAB>subject<TAB>relation<TAB>object`
    pub fn to_row(&self) -> String {
        format!("{}\t{}", self.frame, self.triple.to_tabbed())
    }
}

/// All facts of one frame, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    pub facts: Vec<Triple>,
}

impl Frame {
    /// Create an empty frame
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            facts: Vec::new(),
        }
    }

    /// Add a fact, ignoring a repeat of a triple already in this frame.
    /// Returns false for repeats.
    pub fn push(&mut self, triple: Triple) -> bool {
        if self.facts.contains(&triple) {
            return false;
        }
        self.facts.push(triple);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts of this frame, in file order
    pub fn to_facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.facts.iter().map(move |t| Fact::new(self.index, t.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut triples = vec![
            Triple::new("person", "holding", "egg"),
            Triple::new("egg", "on", "bowl"),
            Triple::new("person", "holding", "bowl"),
        ];
        triples.sort();
        assert_eq!(triples[0], Triple::new("egg", "on", "bowl"));
        assert_eq!(triples[1], Triple::new("person", "holding", "bowl"));
        assert_eq!(triples[2], Triple::new("person", "holding", "egg"));
    }

    #[test]
    fn test_parse_spaced() {
        assert_eq!(
            Triple::parse_spaced("  person holding shell-egg "),
            Some(Triple::new("person", "holding", "shell-egg"))
        );
        assert_eq!(Triple::parse_spaced("person holding"), None);
        assert_eq!(Triple::parse_spaced("a b c d"), None);
    }

    #[test]
    fn test_frame_ignores_repeats() {
        let mut frame = Frame::empty(3);
        assert!(frame.push(Triple::new("egg", "on", "bowl")));
        assert!(!frame.push(Triple::new("egg", "on", "bowl")));
        assert_eq!(frame.facts.len(), 1);
    }

    #[test]
    fn test_fact_rows() {
        let mut frame = Frame::empty(7);
        frame.push(Triple::new("person", "holding", "egg"));
        frame.push(Triple::new("egg", "on", "bowl"));
        let rows: Vec<String> = frame.to_facts().map(|f| f.to_row()).collect();
        assert_eq!(rows, vec!["7\tperson\tholding\tegg", "7\tegg\ton\tbowl"]);
    }
}
