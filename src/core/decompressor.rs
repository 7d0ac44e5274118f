//! Interval decompressor: interval records → dense per-frame facts
//!
//! Rows are either `start-end-subj_id-rel_id-obj_id` or
//! `start-end subj rel obj`. A row without whitespace whose third
//! hyphen-separated field is all digits is an id row.
//!
//! Within a frame, facts keep the record order of the interval file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::config::{ClassMap, Dictionaries};
use crate::core::corpus::corpus_files;
use crate::core::objects::ObjectPresence;
use crate::core::reader::render_frames;
use crate::types::{
    read_file, write_file, Frame, IntervalFormat, IntervalRecord, KscgrError, Result, Triple,
};
use crate::CORPUS_EXTENSION;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TripleRef {
    Ids { subject: u32, relation: u32, object: u32 },
    Names(Triple),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IntervalRow {
    line: usize,
    start: usize,
    end: usize,
    triple: TripleRef,
}

/// A parsed interval file. Id rows are resolved to names by [`records`].
///
/// [`records`]: IntervalFile::records
#[derive(Debug, Clone)]
pub struct IntervalFile {
    source_name: String,
    format: Option<IntervalFormat>,
    rows: Vec<IntervalRow>,
}

impl IntervalFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::parse(&read_file(path)?, &path.display().to_string())?;
        info!("Found {} lines in compressed input file {}", file.len(), path.display());
        Ok(file)
    }

    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut format = None;
        let mut rows = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let (row_format, row) = parse_row(line, raw, line_no, source_name)?;
            match format {
                None => format = Some(row_format),
                Some(f) if f != row_format => {
                    return Err(KscgrError::format(
                        source_name,
                        line_no,
                        raw,
                        format!("{} row in a file of {} rows", row_format, f),
                    ));
                }
                Some(_) => {}
            }
            rows.push(row);
        }
        Ok(Self {
            source_name: source_name.to_string(),
            format,
            rows,
        })
    }

    /// Row format, `None` for a file without rows
    pub fn format(&self) -> Option<IntervalFormat> {
        self.format
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve rows into records, in file order.
    ///
    /// Id rows need `dictionaries`. Name rows are checked against them when
    /// given.
    pub fn records(&self, dictionaries: Option<&Dictionaries>) -> Result<Vec<IntervalRecord>> {
        self.rows
            .iter()
            .map(|row| {
                let triple = match (&row.triple, dictionaries) {
                    (TripleRef::Ids { subject, relation, object }, Some(d)) => Triple::new(
                        self.name_of(&d.classes, *subject, row.line)?,
                        self.name_of(&d.relations, *relation, row.line)?,
                        self.name_of(&d.classes, *object, row.line)?,
                    ),
                    (TripleRef::Ids { subject, .. }, None) => {
                        return Err(KscgrError::lookup(
                            &self.source_name,
                            Some(row.line),
                            subject,
                            "a class dictionary (none loaded)",
                        ));
                    }
                    (TripleRef::Names(triple), Some(d)) => {
                        self.check_name(&d.classes, &triple.subject, row.line)?;
                        self.check_name(&d.relations, &triple.relation, row.line)?;
                        self.check_name(&d.classes, &triple.object, row.line)?;
                        triple.clone()
                    }
                    (TripleRef::Names(triple), None) => triple.clone(),
                };
                Ok(IntervalRecord::new(triple, row.start, row.end))
            })
            .collect()
    }

    fn name_of(&self, map: &ClassMap, id: u32, line: usize) -> Result<String> {
        map.name(id)
            .map(String::from)
            .ok_or_else(|| KscgrError::lookup(&self.source_name, Some(line), id, map.source_name()))
    }

    fn check_name(&self, map: &ClassMap, name: &str, line: usize) -> Result<()> {
        if map.contains_name(name) {
            Ok(())
        } else {
            Err(KscgrError::lookup(&self.source_name, Some(line), name, map.source_name()))
        }
    }
}

fn parse_row(
    line: &str,
    raw: &str,
    line_no: usize,
    source_name: &str,
) -> Result<(IntervalFormat, IntervalRow)> {
    let malformed = |reason: String| KscgrError::format(source_name, line_no, raw, reason);
    let frame = |text: &str| {
        text.trim()
            .parse::<usize>()
            .map_err(|_| KscgrError::format(source_name, line_no, raw, format!("`{}` is not a frame number", text)))
    };

    let hyphenated: Vec<&str> = line.split('-').collect();
    let is_id_row = !line.contains(char::is_whitespace)
        && hyphenated.len() >= 3
        && !hyphenated[2].is_empty()
        && hyphenated[2].chars().all(|c| c.is_ascii_digit());

    let (format, start, end, triple) = if is_id_row {
        if hyphenated.len() != 5 {
            return Err(malformed(format!("expected 5 hyphen-separated fields, found {}", hyphenated.len())));
        }
        let id = |text: &str| {
            text.parse::<u32>()
                .map_err(|_| KscgrError::format(source_name, line_no, raw, format!("`{}` is not an id", text)))
        };
        let triple = TripleRef::Ids {
            subject: id(hyphenated[2])?,
            relation: id(hyphenated[3])?,
            object: id(hyphenated[4])?,
        };
        (IntervalFormat::Ids, frame(hyphenated[0])?, frame(hyphenated[1])?, triple)
    } else {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(malformed(format!("expected `start-end subject relation object`, found {} fields", tokens.len())));
        }
        let span: Vec<&str> = tokens[0].split('-').collect();
        if span.len() != 2 {
            return Err(malformed("frame span is not `start-end`".to_string()));
        }
        let triple = TripleRef::Names(Triple::new(tokens[1], tokens[2], tokens[3]));
        (IntervalFormat::Names, frame(span[0])?, frame(span[1])?, triple)
    };

    if start > end {
        return Err(malformed(format!("start frame {} is after end frame {}", start, end)));
    }
    Ok((format, IntervalRow { line: line_no, start, end, triple }))
}

// =============================================================================
// EXPANSION
// =============================================================================

/// Triples per frame, each frame in record order
pub fn expand(records: &[IntervalRecord]) -> BTreeMap<usize, Vec<Triple>> {
    let mut frames: BTreeMap<usize, Vec<Triple>> = BTreeMap::new();
    for record in records {
        for frame in record.frames() {
            frames.entry(frame).or_default().push(record.triple.clone());
        }
    }
    frames
}

/// Outcome of a decompression
#[derive(Debug, Clone, Default)]
pub struct Decompression {
    pub frames: Vec<Frame>,
    pub records: usize,
    /// Facts dropped because an object was missing from the frame
    pub suppressed: usize,
}

impl Decompression {
    pub fn fact_count(&self) -> usize {
        self.frames.iter().map(|f| f.facts.len()).sum()
    }

    /// Render as a dense fact file
    pub fn render(&self) -> String {
        render_frames(&self.frames)
    }
}

/// Every frame from 0 to the last covered frame, empty where nothing holds
pub fn dense_frames(records: &[IntervalRecord]) -> Vec<Frame> {
    let mut expanded = expand(records);
    let last = match expanded.keys().next_back() {
        Some(last) => *last,
        None => return Vec::new(),
    };
    (0..=last)
        .map(|index| Frame {
            index,
            facts: expanded.remove(&index).unwrap_or_default(),
        })
        .collect()
}

/// Like [`dense_frames`], dropping facts whose subject or object is not
/// annotated in the frame. Returns the frames and the number of dropped facts.
pub fn filtered_frames(records: &[IntervalRecord], presence: &ObjectPresence) -> (Vec<Frame>, usize) {
    let mut expanded = expand(records);
    let last = expanded.keys().next_back().copied().max(presence.last_frame());
    let last = match last {
        Some(last) => last,
        None => return (Vec::new(), 0),
    };

    let mut suppressed = 0;
    let frames = (0..=last)
        .map(|index| {
            let objects = presence.objects(index);
            let mut frame = Frame::empty(index);
            for triple in expanded.remove(&index).unwrap_or_default() {
                if presence.contains(index, &triple.subject) && presence.contains(index, &triple.object) {
                    frame.facts.push(triple);
                } else {
                    warn!(
                        "Frame {} does not contain some of the elements ({}, {}): {:?}",
                        index, triple.subject, triple.object, objects
                    );
                    suppressed += 1;
                }
            }
            frame
        })
        .collect();
    (frames, suppressed)
}

/// Decompress a parsed interval file
pub fn decompress(
    file: &IntervalFile,
    dictionaries: Option<&Dictionaries>,
    presence: Option<&ObjectPresence>,
) -> Result<Decompression> {
    let records = file.records(dictionaries)?;
    let (frames, suppressed) = match presence {
        Some(presence) => filtered_frames(&records, presence),
        None => (dense_frames(&records), 0),
    };
    Ok(Decompression {
        frames,
        records: records.len(),
        suppressed,
    })
}

/// Decompress `input` into `output`
pub fn decompress_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    dictionaries: Option<&Dictionaries>,
    presence: Option<&ObjectPresence>,
) -> Result<Decompression> {
    let file = IntervalFile::load(input)?;
    info!("Uncompressing and saving output file...");
    let decompression = decompress(&file, dictionaries, presence)?;
    write_file(output.as_ref(), &decompression.render())?;
    info!("File saved at: {}", output.as_ref().display());
    Ok(decompression)
}

/// Decompress every interval file of `folder` into `output_dir`, keeping
/// each file's path relative to `folder`
pub fn decompress_folder(
    folder: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    dictionaries: Option<&Dictionaries>,
) -> Result<Vec<(PathBuf, Decompression)>> {
    let folder = folder.as_ref();
    let output_dir = output_dir.as_ref();
    let mut done = Vec::new();
    for input in corpus_files(folder, CORPUS_EXTENSION)? {
        if input.starts_with(output_dir) {
            continue;
        }
        let relative = input.strip_prefix(folder).unwrap_or(&input);
        let output = output_dir.join(relative);
        let decompression = decompress_to_file(&input, &output, dictionaries, None)?;
        done.push((output, decompression));
    }
    Ok(done)
}
