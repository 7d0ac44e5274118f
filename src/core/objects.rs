//! Object-presence (LIS) files: which objects are annotated in each frame
//!
//! ```text
//! frame_id	object	(x, y, width, height)	object_id	path_to_img
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::types::{read_file, KscgrError, Result};

lazy_static! {
    static ref RE_BBOX: Regex =
        Regex::new(r"^\(\s*-?\d+\s*,\s*-?\d+\s*,\s*-?\d+\s*,\s*-?\d+\s*\)$").unwrap();
}

/// Objects present per frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPresence {
    frames: BTreeMap<usize, Vec<String>>,
}

impl ObjectPresence {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let presence = Self::parse(&read_file(path)?, &path.display().to_string())?;
        info!(
            "Loaded objects for {} frames from {}",
            presence.frames.len(),
            path.display()
        );
        Ok(presence)
    }

    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut frames: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() != 5 {
                return Err(KscgrError::format(
                    source_name,
                    line_no,
                    raw,
                    format!("expected 5 TAB-separated fields, found {}", fields.len()),
                ));
            }
            let frame = fields[0].parse::<usize>().map_err(|_| {
                KscgrError::format(source_name, line_no, raw, "frame is not a non-negative integer")
            })?;
            if !RE_BBOX.is_match(fields[2]) {
                return Err(KscgrError::format(source_name, line_no, raw, "bounding box is not (x, y, w, h)"));
            }
            let objects = frames.entry(frame).or_default();
            if !objects.iter().any(|o| o == fields[1]) {
                objects.push(fields[1].to_string());
            }
        }
        Ok(Self { frames })
    }

    /// Objects annotated in `frame` (empty when the frame has none)
    pub fn objects(&self, frame: usize) -> &[String] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, frame: usize, object: &str) -> bool {
        self.objects(frame).iter().any(|o| o == object)
    }

    /// Highest annotated frame
    pub fn last_frame(&self) -> Option<usize> {
        self.frames.keys().next_back().copied()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
