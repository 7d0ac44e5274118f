//! Annotation sanitation
//!
//! Problems found here are recoverable: they are logged and counted, and
//! the offending facts are left out of the sanitized output. Structural
//! errors (broken frame sequence, malformed rows) stay fatal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::objects::ObjectPresence;
use crate::core::reader::FactFile;
use crate::core::relations::load_triple_list;
use crate::types::{write_file, KscgrError, Result, Triple};
use crate::{DENSE_HEADER, PATH_MARKER};

/// Outcome of a sanitation check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Facts looked at
    pub checked: usize,
    pub problems: usize,
    /// Audit file, kept only when problems were found
    pub output: Option<PathBuf>,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.problems == 0
    }
}

/// Frames of `file` must run 0, 1, 2... Returns the frame count.
pub fn verify_sequence(file: &FactFile) -> Result<usize> {
    info!("Checking sequence for file: {}", file.path().display());
    let mut frames = 0;
    for frame in file.frames()? {
        frame?;
        frames += 1;
    }
    Ok(frames)
}

pub fn load_possible_relations(path: impl AsRef<Path>) -> Result<HashSet<Triple>> {
    Ok(load_triple_list(path)?.into_iter().collect())
}

/// Every triple of `relations` must be in `possible`. Each unknown triple
/// counts once.
pub fn check_possible_relations(relations: &FactFile, possible: &HashSet<Triple>) -> Result<SanitizeReport> {
    info!("Checking file: {}", relations.path().display());
    let mut reported: HashSet<Triple> = HashSet::new();
    let mut report = SanitizeReport::default();
    for frame in relations.frames()? {
        for triple in frame?.facts {
            report.checked += 1;
            if !possible.contains(&triple) && !reported.contains(&triple) {
                warn!("There is no possible relation: [{}]", triple);
                reported.insert(triple);
                report.problems += 1;
            }
        }
    }
    log_outcome(&report);
    Ok(report)
}

/// Keep the facts of `relations` whose subject and object are annotated in
/// the frame. The result goes to `output` when something was dropped;
/// otherwise `output` is removed.
pub fn sanitize_against_objects(
    presence: &ObjectPresence,
    relations: &FactFile,
    output: impl AsRef<Path>,
) -> Result<SanitizeReport> {
    let output = output.as_ref();
    let frames = relations.read_frames()?;

    let mut rows = vec![format!("{}\t{} {}", DENSE_HEADER, PATH_MARKER, relations.path().display())];
    let mut report = SanitizeReport::default();
    for fact in frames.iter().flat_map(|f| f.to_facts()) {
        report.checked += 1;
        let missing: Vec<&str> = [&fact.triple.subject, &fact.triple.object]
            .into_iter()
            .filter(|name| !presence.contains(fact.frame, name))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            rows.push(fact.to_row());
        } else {
            warn!("Could not find {} in frame {} for ({})", missing.join(", "), fact.frame, fact.triple);
            report.problems += 1;
        }
    }

    if report.is_clean() {
        if output.exists() {
            std::fs::remove_file(output).map_err(|e| KscgrError::io(output, e))?;
        }
    } else {
        write_file(output, &(rows.join("\n") + "\n"))?;
        report.output = Some(output.to_path_buf());
    }
    log_outcome(&report);
    Ok(report)
}

fn log_outcome(report: &SanitizeReport) {
    if report.is_clean() {
        info!("Finished without errors!");
    } else {
        info!("Finished WITH {} errors!", report.problems);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RELATIONS: &str = "Frame\tSubject\tRelation\tObject\n\
                             0\tperson\tholding\tegg\n\
                             1\tperson\tholding\tegg\n\
                             1\tegg\ton\tbowl\n";

    fn fact_file(dir: &Path, text: &str) -> FactFile {
        let path = dir.join("video.txt");
        std::fs::write(&path, text).unwrap();
        FactFile::open(path).unwrap()
    }

    #[test]
    fn test_verify_sequence() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(verify_sequence(&fact_file(dir.path(), RELATIONS)).unwrap(), 2);
        let broken = fact_file(dir.path(), "0\ta\tr\tb\n2\ta\tr\tb\n");
        assert_eq!(verify_sequence(&broken).unwrap_err().code(), "E200_SEQUENCE");
    }

    #[test]
    fn test_unknown_relations_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let possible: HashSet<Triple> = [Triple::new("egg", "on", "bowl")].into_iter().collect();
        let report = check_possible_relations(&fact_file(dir.path(), RELATIONS), &possible).unwrap();
        assert_eq!(report.checked, 3);
        assert_eq!(report.problems, 1);
    }

    #[test]
    fn test_clean_run_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("video_sanity.txt");
        std::fs::write(&output, "stale").unwrap();
        let presence = ObjectPresence::parse(
            "0\tperson\t(0, 0, 1, 1)\t1\t0.jpg\n0\tegg\t(0, 0, 1, 1)\t2\t0.jpg\n\
             1\tperson\t(0, 0, 1, 1)\t1\t1.jpg\n1\tegg\t(0, 0, 1, 1)\t2\t1.jpg\n1\tbowl\t(0, 0, 1, 1)\t3\t1.jpg\n",
            "objs",
        )
        .unwrap();
        let report = sanitize_against_objects(&presence, &fact_file(dir.path(), RELATIONS), &output).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.output, None);
        assert!(!output.exists());
    }

    #[test]
    fn test_problems_keep_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("video_sanity.txt");
        let presence = ObjectPresence::parse(
            "0\tperson\t(0, 0, 1, 1)\t1\t0.jpg\n0\tegg\t(0, 0, 1, 1)\t2\t0.jpg\n1\tegg\t(0, 0, 1, 1)\t2\t1.jpg\n",
            "objs",
        )
        .unwrap();
        let relations = fact_file(dir.path(), RELATIONS);
        let report = sanitize_against_objects(&presence, &relations, &output).unwrap();
        assert_eq!(report.problems, 2);
        assert_eq!(report.output.as_deref(), Some(output.as_path()));
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            format!(
                "Frame\tSubject\tRelation\tObject\tPath: {}\n0\tperson\tholding\tegg\n",
                relations.path().display()
            )
        );
    }
}
