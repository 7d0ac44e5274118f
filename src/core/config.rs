//! Class/relation config files (`classes.cfg`, `relations.cfg`)
//!
//! ```text
//! 0 __background__
//! 1 person
//! 2 baked_egg
//! ```
//!
//! With `Background::Drop` the `__background__` row is removed and every
//! other id shifts down by one, so the active id space starts at 0.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::types::{read_file, KscgrError, Result};
use crate::BACKGROUND_CLASS;

/// Whether the background class takes part in the id space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Keep,
    Drop,
}

/// Bidirectional `id <-> name` map
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    source_name: String,
    by_id: HashMap<u32, String>,
    by_name: HashMap<String, u32>,
}

impl ClassMap {
    /// Load from a file
    pub fn load(path: impl AsRef<Path>, background: Background) -> Result<Self> {
        let path = path.as_ref();
        let map = Self::parse(&read_file(path)?, &path.display().to_string(), background)?;
        info!("Loaded {} entries from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse from text
    pub fn parse(text: &str, source_name: &str, background: Background) -> Result<Self> {
        let mut map = ClassMap {
            source_name: source_name.to_string(),
            ..Default::default()
        };

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(KscgrError::format(
                    source_name,
                    line_no,
                    raw,
                    format!("expected `id name`, found {} fields", fields.len()),
                ));
            }
            let id = fields[0]
                .parse::<u32>()
                .map_err(|_| KscgrError::format(source_name, line_no, raw, "id is not a number"))?;
            let name = fields[1];

            let id = match background {
                Background::Keep => id,
                Background::Drop if name == BACKGROUND_CLASS => continue,
                Background::Drop => id.checked_sub(1).ok_or_else(|| {
                    KscgrError::format(
                        source_name,
                        line_no,
                        raw,
                        "id 0 is reserved for the background class",
                    )
                })?,
            };

            if map.by_id.contains_key(&id) {
                return Err(KscgrError::format(source_name, line_no, raw, "duplicate id"));
            }
            if map.by_name.contains_key(name) {
                return Err(KscgrError::format(source_name, line_no, raw, "duplicate name"));
            }
            map.by_id.insert(id, name.to_string());
            map.by_name.insert(name.to_string(), id);
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Name of `id`
    pub fn name(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Id of `name`
    pub fn id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// File this map was loaded from (used in lookup errors)
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// Object classes and relation names used by id-based interval files
#[derive(Debug, Clone)]
pub struct Dictionaries {
    pub classes: ClassMap,
    pub relations: ClassMap,
}

impl Dictionaries {
    pub fn new(classes: ClassMap, relations: ClassMap) -> Self {
        Self { classes, relations }
    }

    /// Load both files with the same background convention
    pub fn load(
        class_file: impl AsRef<Path>,
        relation_file: impl AsRef<Path>,
        background: Background,
    ) -> Result<Self> {
        Ok(Self {
            classes: ClassMap::load(class_file, background)?,
            relations: ClassMap::load(relation_file, background)?,
        })
    }
}
