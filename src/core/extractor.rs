//! State/transition extraction (XORe)
//!
//! Walks a fact timeline frame by frame, keeping the current state vector.
//! Every state change records the state before it as a witness of the
//! effect `XORe(prev, curr)`.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::core::reader::FactFile;
use crate::core::vocabulary::Vocabulary;
use crate::types::{EffectVector, Frame, Result, StateVector};

/// Effect → witnesses, in first-seen order. Duplicate witnesses are kept.
#[derive(Debug, Clone, Default)]
pub struct EffectTable {
    entries: Vec<(EffectVector, Vec<StateVector>)>,
    index: HashMap<EffectVector, usize>,
}

impl EffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `witness` to the list of `effect`
    pub fn record(&mut self, effect: EffectVector, witness: StateVector) {
        match self.index.get(&effect) {
            Some(&slot) => self.entries[slot].1.push(witness),
            None => {
                self.index.insert(effect.clone(), self.entries.len());
                self.entries.push((effect, vec![witness]));
            }
        }
    }

    /// Append every entry of `other`, keeping its order after ours
    pub fn merge(&mut self, other: EffectTable) {
        for (effect, witnesses) in other.entries {
            for witness in witnesses {
                self.record(effect.clone(), witness);
            }
        }
    }

    pub fn witnesses(&self, effect: &EffectVector) -> &[StateVector] {
        self.index
            .get(effect)
            .map(|&slot| self.entries[slot].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectVector, &[StateVector])> {
        self.entries.iter().map(|(e, w)| (e, w.as_slice()))
    }

    /// Distinct effects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total witnesses over all effects
    pub fn transition_count(&self) -> usize {
        self.entries.iter().map(|(_, w)| w.len()).sum()
    }
}

/// Counters of one extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub frames: usize,
    pub transitions: usize,
}

pub struct TransitionExtractor<'v> {
    vocabulary: &'v Vocabulary,
    initial: Option<StateVector>,
}

impl<'v> TransitionExtractor<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            initial: None,
        }
    }

    /// Compare the first frame against `initial` instead of taking it as
    /// the starting state
    pub fn with_initial(mut self, initial: StateVector) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Extract the transitions of one timeline into `table`
    pub fn extract_frames(
        &self,
        frames: impl IntoIterator<Item = Result<Frame>>,
        table: &mut EffectTable,
    ) -> Result<ExtractionStats> {
        let mut stats = ExtractionStats::default();
        let mut prev = self.initial.clone();

        for frame in frames {
            let frame = frame?;
            stats.frames += 1;
            let curr = self.vocabulary.vector_for(&frame.facts)?;
            match prev {
                Some(ref before) if *before != curr => {
                    let effect = before.xore(&curr)?;
                    debug_assert!(!effect.is_neutral());
                    debug!("Frame {}: {} -> {} (effect {})", frame.index, before, curr, effect);
                    table.record(effect, before.clone());
                    stats.transitions += 1;
                }
                _ => {}
            }
            prev = Some(curr);
        }
        Ok(stats)
    }

    pub fn extract_file(&self, file: &FactFile, table: &mut EffectTable) -> Result<ExtractionStats> {
        let stats = self.extract_frames(file.frames()?, table)?;
        info!(
            "Extracted {} transitions over {} frames from {}",
            stats.transitions,
            stats.frames,
            file.path().display()
        );
        Ok(stats)
    }
}

/// State vector of every frame
pub fn state_sequence(
    vocabulary: &Vocabulary,
    frames: impl IntoIterator<Item = Result<Frame>>,
) -> Result<Vec<StateVector>> {
    frames
        .into_iter()
        .map(|frame| vocabulary.vector_for(&frame?.facts))
        .collect()
}
