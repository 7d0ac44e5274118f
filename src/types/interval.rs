//! Interval records: a triple holding over a contiguous frame range

use serde::{Deserialize, Serialize};
use crate::types::Triple;

/// How interval rows store their triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalFormat {
    /// `start-end-subj_id-rel_id-obj_id`
    Ids,
    /// `start-end subj rel obj`
    Names,
}

impl IntervalFormat {
    /// Header line for this format
    pub fn header(&self) -> &'static str {
        match self {
            IntervalFormat::Ids => crate::INTERVAL_HEADER_IDS,
            IntervalFormat::Names => crate::INTERVAL_HEADER_NAMES,
        }
    }
}

impl std::fmt::Display for IntervalFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IntervalFormat::Ids => "ids",
            IntervalFormat::Names => "names",
        };
        write!(f, "{}", name)
    }
}

/// `triple` holds on every frame of `[start, end]`, and not on the frames
/// right before and after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub triple: Triple,
    pub start: usize,
    pub end: usize,
}

impl IntervalRecord {
    pub fn new(triple: Triple, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "interval [{}, {}] is reversed", start, end);
        Self { triple, start, end }
    }

    /// Number of frames covered
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Records always cover at least one frame
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Frame indices covered, in order
    pub fn frames(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// True when `other` (same triple or not) would touch or overlap this one
    pub fn touches(&self, other: &IntervalRecord) -> bool {
        self.start <= other.end + 1 && other.start <= self.end + 1
    }

    /// Render as a name row: `start-end subj rel obj`
    pub fn to_named_row(&self) -> String {
        format!("{}-{} {}", self.start, self.end, self.triple)
    }
}
