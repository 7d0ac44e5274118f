//! Triple stream reader for dense fact files
//!
//! ```text
//! Frame	Subject	Relation	Object
//! 0	person	holding	shell-egg
//! 1	None	None	None
//! 2	shell-egg	on	bowl
//! ```
//!
//! Lines not starting with a frame number are header/footer metadata and are
//! skipped; a `Path: <source>` marker in them is kept as the source path.
//! Frames are yielded in order, one per distinct frame number.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::types::{Frame, KscgrError, Result, Triple};
use crate::{DENSE_HEADER, NONE_TOKEN};

lazy_static! {
    static ref RE_PATH_MARKER: Regex = Regex::new(r"Path:\s*(\S.*?)\s*$").unwrap();
}

/// How strictly frame numbers must follow each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contiguity {
    /// Frames start at 0 and increase by exactly one
    Strict,
    /// Frames only need to increase
    Monotonic,
}

/// A dense fact file on disk. Every call to [`FactFile::frames`] re-opens the
/// file, so the stream can be restarted.
#[derive(Debug, Clone)]
pub struct FactFile {
    path: PathBuf,
    contiguity: Contiguity,
}

impl FactFile {
    /// Open a fact file (must exist)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(KscgrError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a valid file"),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            contiguity: Contiguity::Strict,
        })
    }

    /// Accept gaps in frame numbering
    pub fn allow_gaps(mut self) -> Self {
        self.contiguity = Contiguity::Monotonic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream frames from the start of the file
    pub fn frames(&self) -> Result<FrameReader<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| KscgrError::io(&self.path, e))?;
        Ok(FrameReader::new(BufReader::new(file), self.path.display().to_string())
            .with_contiguity(self.contiguity))
    }

    /// Read every frame into memory
    pub fn read_frames(&self) -> Result<Vec<Frame>> {
        self.frames()?.collect()
    }

    /// Distinct triples of the file
    pub fn triples(&self) -> Result<BTreeSet<Triple>> {
        let mut triples = BTreeSet::new();
        for frame in self.frames()? {
            triples.extend(frame?.facts);
        }
        Ok(triples)
    }

    /// Source path carried by a `Path:` marker, if any
    pub fn source_path(&self) -> Result<Option<String>> {
        let mut reader = self.frames()?;
        for frame in reader.by_ref() {
            frame?;
        }
        Ok(reader.source_path().map(String::from))
    }
}

/// A parsed line of a dense file
#[derive(Debug, PartialEq, Eq)]
enum Line {
    /// Header/footer line, with the `Path:` value when present
    Meta(Option<String>),
    /// Data row; `None` for the "no relation" placeholder
    Row { frame: usize, triple: Option<Triple> },
}

fn parse_line(raw: &str, line_no: usize, source_name: &str) -> Result<Line> {
    let line = raw.trim();
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        let marker = RE_PATH_MARKER.captures(line).map(|c| c[1].to_string());
        return Ok(Line::Meta(marker));
    }

    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(KscgrError::format(
            source_name,
            line_no,
            raw,
            format!("expected 4 TAB-separated fields, found {}", fields.len()),
        ));
    }
    let frame = fields[0].parse::<usize>().map_err(|_| {
        KscgrError::format(source_name, line_no, raw, "frame is not a non-negative integer")
    })?;
    if fields[1..].iter().all(|f| *f == NONE_TOKEN) {
        return Ok(Line::Row { frame, triple: None });
    }
    if fields[1..].iter().any(|f| f.is_empty()) {
        return Err(KscgrError::format(source_name, line_no, raw, "empty subject, relation or object"));
    }
    if let Some(name) = fields[1..].iter().find(|f| f.contains(char::is_whitespace)) {
        return Err(KscgrError::format(
            source_name,
            line_no,
            raw,
            format!("name `{}` contains whitespace", name),
        ));
    }
    Ok(Line::Row {
        frame,
        triple: Some(Triple::new(fields[1], fields[2], fields[3])),
    })
}

/// Iterator of frames over any buffered source.
///
/// Stops at the first error; the underlying reader is dropped with the
/// iterator.
pub struct FrameReader<R> {
    lines: std::io::Lines<R>,
    source_name: String,
    contiguity: Contiguity,
    line_no: usize,
    current: Option<Frame>,
    last_index: Option<usize>,
    source_path: Option<String>,
    done: bool,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            contiguity: Contiguity::Strict,
            line_no: 0,
            current: None,
            last_index: None,
            source_path: None,
            done: false,
        }
    }

    pub fn with_contiguity(mut self, contiguity: Contiguity) -> Self {
        self.contiguity = contiguity;
        self
    }

    /// Last `Path:` marker seen so far
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    fn fail(&mut self, err: KscgrError) -> Option<Result<Frame>> {
        self.done = true;
        Some(Err(err))
    }

    /// Start a new frame, returning the finished one
    fn open_frame(&mut self, frame: usize) -> Result<Option<Frame>> {
        let expected = self.last_index.map(|i| i + 1).unwrap_or(0);
        let ordered = match self.contiguity {
            Contiguity::Strict => frame == expected,
            Contiguity::Monotonic => self.last_index.map_or(true, |last| frame > last),
        };
        if !ordered {
            return Err(KscgrError::Sequence {
                source_name: self.source_name.clone(),
                line: self.line_no,
                expected,
                found: frame,
            });
        }
        self.last_index = Some(frame);
        Ok(self.current.replace(Frame::empty(frame)))
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let raw = match self.lines.next() {
                None => {
                    self.done = true;
                    return self.current.take().map(Ok);
                }
                Some(Err(e)) => {
                    let err = KscgrError::io(&self.source_name, e);
                    return self.fail(err);
                }
                Some(Ok(raw)) => raw,
            };
            self.line_no += 1;

            let (frame, triple) = match parse_line(&raw, self.line_no, &self.source_name) {
                Err(e) => return self.fail(e),
                Ok(Line::Meta(marker)) => {
                    if marker.is_some() {
                        self.source_path = marker;
                    }
                    continue;
                }
                Ok(Line::Row { frame, triple }) => (frame, triple),
            };

            let same_frame = self.current.as_ref().map_or(false, |f| f.index == frame);
            let finished = if same_frame {
                None
            } else {
                match self.open_frame(frame) {
                    Ok(finished) => finished,
                    Err(e) => return self.fail(e),
                }
            };

            if let (Some(triple), Some(current)) = (triple, self.current.as_mut()) {
                if !current.push(triple.clone()) {
                    debug!("{}:{}: repeated ({}) in frame {}", self.source_name, self.line_no, triple, frame);
                }
            }

            if let Some(finished) = finished {
                return Some(Ok(finished));
            }
        }
    }
}

/// Parse frames from in-memory text
pub fn parse_frames(text: &str, source_name: &str) -> Result<Vec<Frame>> {
    FrameReader::new(text.as_bytes(), source_name).collect()
}

/// Render frames as a dense fact file, with a placeholder row for empty frames
pub fn render_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> String {
    let mut out = String::from(DENSE_HEADER);
    out.push('\n');
    for frame in frames {
        if frame.is_empty() {
            out.push_str(&format!("{}\t{}\t{}\t{}\n", frame.index, NONE_TOKEN, NONE_TOKEN, NONE_TOKEN));
        }
        for fact in frame.to_facts() {
            out.push_str(&fact.to_row());
            out.push('\n');
        }
    }
    out
}
