//! Interval compressor: dense per-frame facts → contiguous frame runs
//!
//! Each triple keeps one open run `{first, last}`. A fact at frame F extends
//! the run when `last == F - 1`; otherwise the run is sealed and a new one
//! opens at F. Runs are sealed in increasing frame order, so the completed
//! intervals of a triple line up one-to-one with its start events.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use tracing::{debug, info};

use crate::core::config::{ClassMap, Dictionaries};
use crate::core::reader::FactFile;
use crate::types::{write_file, Frame, IntervalFormat, IntervalRecord, KscgrError, Result, Triple};

#[derive(Debug, Clone, Copy)]
struct Run {
    first: usize,
    last: usize,
}

/// Streaming compressor. Feed frames in increasing order, then [`finish`].
///
/// [`finish`]: Compressor::finish
#[derive(Debug, Default)]
pub struct Compressor {
    open: HashMap<Triple, Run>,
    completed: HashMap<Triple, VecDeque<(usize, usize)>>,
    starts: Vec<(usize, Triple)>,
    last_frame: Option<usize>,
    facts: usize,
    frames: usize,
}

impl Compressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `triple` holds at `frame`. A frame below the last one
    /// pushed is a sequence error and leaves the compressor unchanged.
    pub fn push(&mut self, frame: usize, triple: &Triple) -> Result<()> {
        self.advance_to(frame)?;
        self.facts += 1;
        match self.open.get_mut(triple) {
            None => {
                self.open.insert(triple.clone(), Run { first: frame, last: frame });
                self.starts.push((frame, triple.clone()));
            }
            Some(run) if run.last == frame => {
                debug!("({}) already recorded at frame {}", triple, frame);
            }
            Some(run) if run.last + 1 == frame => {
                run.last = frame;
            }
            Some(run) => {
                self.completed
                    .entry(triple.clone())
                    .or_default()
                    .push_back((run.first, run.last));
                *run = Run { first: frame, last: frame };
                self.starts.push((frame, triple.clone()));
            }
        }
        Ok(())
    }

    fn advance_to(&mut self, frame: usize) -> Result<()> {
        match self.last_frame {
            Some(last) if frame < last => Err(KscgrError::Sequence {
                source_name: "compressor input".to_string(),
                line: self.facts + 1,
                expected: last,
                found: frame,
            }),
            _ => {
                self.last_frame = Some(frame);
                Ok(())
            }
        }
    }

    /// Record every fact of a frame
    pub fn push_frame(&mut self, frame: &Frame) -> Result<()> {
        self.advance_to(frame.index)?;
        self.frames += 1;
        for triple in &frame.facts {
            self.push(frame.index, triple)?;
        }
        Ok(())
    }

    /// Seal every open run
    pub fn finish(mut self) -> Compression {
        for (triple, run) in self.open.drain() {
            self.completed
                .entry(triple)
                .or_default()
                .push_back((run.first, run.last));
        }
        Compression {
            intervals: self
                .completed
                .into_iter()
                .map(|(triple, runs)| (triple, runs.into_iter().collect()))
                .collect(),
            starts: self.starts,
            facts: self.facts,
            frames: self.frames,
        }
    }
}

/// Result of compressing one fact stream
#[derive(Debug, Clone, Default)]
pub struct Compression {
    intervals: HashMap<Triple, Vec<(usize, usize)>>,
    starts: Vec<(usize, Triple)>,
    facts: usize,
    frames: usize,
}

impl Compression {
    /// Runs of `triple`, in frame order
    pub fn intervals(&self, triple: &Triple) -> &[(usize, usize)] {
        self.intervals.get(triple).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct triples seen
    pub fn triple_count(&self) -> usize {
        self.intervals.len()
    }

    /// Facts consumed
    pub fn fact_count(&self) -> usize {
        self.facts
    }

    /// Frames consumed
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Number of interval records
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Interval records sorted by `(start, triple)`.
    ///
    /// Walks the start events in that order and takes each triple's runs
    /// front to back.
    pub fn records(&self) -> Vec<IntervalRecord> {
        let mut starts: Vec<&(usize, Triple)> = self.starts.iter().collect();
        starts.sort();

        let mut queues: HashMap<&Triple, VecDeque<(usize, usize)>> = self
            .intervals
            .iter()
            .map(|(triple, runs)| (triple, runs.iter().copied().collect()))
            .collect();

        let mut records = Vec::with_capacity(starts.len());
        for (start, triple) in starts {
            if let Some((first, last)) = queues.get_mut(triple).and_then(VecDeque::pop_front) {
                debug_assert_eq!(first, *start, "run and start event out of step for ({})", triple);
                records.push(IntervalRecord::new(triple.clone(), first, last));
            }
        }
        records
    }
}

/// Compress a stream of frames
pub fn compress_frames(frames: impl IntoIterator<Item = Result<Frame>>) -> Result<Compression> {
    let mut compressor = Compressor::new();
    for frame in frames {
        compressor.push_frame(&frame?)?;
    }
    Ok(compressor.finish())
}

/// Compress a dense fact file
pub fn compress_file(file: &FactFile) -> Result<Compression> {
    let compression = compress_frames(file.frames()?)?;
    info!(
        "Found {} relations spread over {} facts in {}",
        compression.triple_count(),
        compression.fact_count(),
        file.path().display()
    );
    info!("Compressed to {} records", compression.len());
    Ok(compression)
}

/// Render records as an interval file.
///
/// The id format needs the class and relation dictionaries; a name missing
/// from them is a lookup error.
pub fn render_intervals(
    records: &[IntervalRecord],
    format: IntervalFormat,
    dictionaries: Option<&Dictionaries>,
) -> Result<String> {
    let mut out = String::from(format.header());
    out.push('\n');
    for (i, record) in records.iter().enumerate() {
        match format {
            IntervalFormat::Names => out.push_str(&record.to_named_row()),
            IntervalFormat::Ids => {
                let dicts = dictionaries.ok_or_else(|| {
                    KscgrError::lookup("interval output", Some(i + 2), &record.triple, "a class dictionary (none loaded)")
                })?;
                let t = &record.triple;
                let subject = class_id(&dicts.classes, &t.subject, i)?;
                let relation = class_id(&dicts.relations, &t.relation, i)?;
                let object = class_id(&dicts.classes, &t.object, i)?;
                out.push_str(&format!("{}-{}-{}-{}-{}", record.start, record.end, subject, relation, object));
            }
        }
        out.push('\n');
    }
    Ok(out)
}

fn class_id(map: &ClassMap, name: &str, row: usize) -> Result<u32> {
    map.id(name)
        .ok_or_else(|| KscgrError::lookup("interval output", Some(row + 2), name, map.source_name()))
}

/// Compress `input` and write it to `output`
pub fn compress_to_file(
    file: &FactFile,
    output: impl AsRef<Path>,
    format: IntervalFormat,
    dictionaries: Option<&Dictionaries>,
) -> Result<Compression> {
    let compression = compress_file(file)?;
    let text = render_intervals(&compression.records(), format, dictionaries)?;
    write_file(output.as_ref(), &text)?;
    info!("File saved at: {}", output.as_ref().display());
    Ok(compression)
}
