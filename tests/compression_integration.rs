//! Integration tests for interval compression and decompression
//!
//! - decompress(compress(facts)) == facts, with placeholders for empty frames
//! - runs of one triple never overlap or touch
//! - output is byte-identical across runs
//! - failed runs leave no output file

use kscgr::core::{
    compress_file, compress_to_file, decompress, decompress_folder, decompress_to_file, parse_frames,
    Background, ClassMap, Dictionaries, FactFile, IntervalFile, ObjectPresence,
};
use kscgr::types::IntervalFormat;
use pretty_assertions::assert_eq;
use std::path::Path;

const EGGS: &str = "Frame\tSubject\tRelation\tObject\n\
                    0\tperson\tholding\tshell-egg\n\
                    1\tperson\tholding\tshell-egg\n\
                    1\tperson\tmoving\tshell-egg\n\
                    2\tperson\tholding\tshell-egg\n\
                    2\tperson\tmoving\tshell-egg\n\
                    3\tperson\tholding\tshell-egg\n\
                    4\tperson\tholding\tshell-egg\n\
                    4\tshell-egg\ton\tbowl\n\
                    5\tNone\tNone\tNone\n\
                    6\tshell-egg\ton\tbowl\n";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn dictionaries() -> Dictionaries {
    Dictionaries::new(
        ClassMap::parse("0 __background__\n1 person\n7 shell-egg\n17 bowl\n", "classes.cfg", Background::Keep).unwrap(),
        ClassMap::parse("1 on\n3 holding\n4 moving\n", "relations.cfg", Background::Keep).unwrap(),
    )
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[test]
fn test_round_trip_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "eggs.txt", EGGS);
    let compressed = dir.path().join("eggs_compressed.txt");
    let decompressed = dir.path().join("eggs_decompressed.txt");

    compress_to_file(&FactFile::open(&input).unwrap(), &compressed, IntervalFormat::Names, None).unwrap();
    decompress_to_file(&compressed, &decompressed, None, None).unwrap();

    assert_eq!(std::fs::read_to_string(&decompressed).unwrap(), EGGS);
}

#[test]
fn test_round_trip_ids() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "eggs.txt", EGGS);
    let compressed = dir.path().join("eggs_compressed.txt");
    let dicts = dictionaries();

    compress_to_file(&FactFile::open(&input).unwrap(), &compressed, IntervalFormat::Ids, Some(&dicts)).unwrap();
    assert_eq!(
        std::fs::read_to_string(&compressed).unwrap(),
        "Initial_frame-Final_frame-Subject-Relation-Object\n0-4-1-3-7\n1-2-1-4-7\n4-4-7-1-17\n6-6-7-1-17\n"
    );

    let file = IntervalFile::load(&compressed).unwrap();
    let decompression = decompress(&file, Some(&dicts), None).unwrap();
    assert_eq!(decompression.frames, parse_frames(EGGS, "eggs").unwrap());
}

#[test]
fn test_compression_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "eggs.txt", EGGS);
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    let file = FactFile::open(&input).unwrap();

    compress_to_file(&file, &first, IntervalFormat::Names, None).unwrap();
    compress_to_file(&file, &second, IntervalFormat::Names, None).unwrap();
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_runs_disjoint_and_not_adjacent() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "eggs.txt", EGGS);
    let compression = compress_file(&FactFile::open(&input).unwrap()).unwrap();
    let records = compression.records();

    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            if a.triple == b.triple {
                assert!(!a.touches(b), "{:?} and {:?} touch", a, b);
            }
        }
    }
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_broken_sequence_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "gap.txt", "0\ta\tr\tb\n2\ta\tr\tb\n");
    let output = dir.path().join("gap_compressed.txt");

    let err = compress_to_file(&FactFile::open(&input).unwrap(), &output, IntervalFormat::Names, None).unwrap_err();
    assert_eq!(err.code(), "E200_SEQUENCE");
    assert!(!output.exists());
}

#[test]
fn test_reversed_interval_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bad.txt", "Initial_frame-Final_frame Subject Relation Object\n4-2 a r b\n");
    let output = dir.path().join("bad_decompressed.txt");

    let err = decompress_to_file(&input, &output, None, None).unwrap_err();
    assert_eq!(err.code(), "E100_FORMAT");
    assert!(!output.exists());
}

#[test]
fn test_unknown_class_on_compress() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "pan.txt", "0\tperson\tholding\tpan\n");
    let output = dir.path().join("pan_compressed.txt");

    let err = compress_to_file(&FactFile::open(&input).unwrap(), &output, IntervalFormat::Ids, Some(&dictionaries()))
        .unwrap_err();
    assert_eq!(err.code(), "E300_LOOKUP");
    assert!(!output.exists());
}

// =============================================================================
// FILTERED AND FOLDER MODES
// =============================================================================

#[test]
fn test_filtered_decompression_counts_suppressed() {
    let dir = tempfile::tempdir().unwrap();
    let intervals = write(
        dir.path(),
        "eggs_compressed.txt",
        "Initial_frame-Final_frame Subject Relation Object\n0-2 person holding shell-egg\n2-2 shell-egg on bowl\n",
    );
    let objects = ObjectPresence::parse(
        "0\tperson\t(0, 0, 5, 5)\t1\t0.jpg\n0\tshell-egg\t(1, 1, 2, 2)\t7\t0.jpg\n\
         1\tperson\t(0, 0, 5, 5)\t1\t1.jpg\n\
         2\tperson\t(0, 0, 5, 5)\t1\t2.jpg\n2\tshell-egg\t(1, 1, 2, 2)\t7\t2.jpg\n\
         3\tbowl\t(3, 3, 2, 2)\t17\t3.jpg\n",
        "objects",
    )
    .unwrap();

    let file = IntervalFile::load(&intervals).unwrap();
    let decompression = decompress(&file, None, Some(&objects)).unwrap();
    assert_eq!(decompression.suppressed, 2);
    assert_eq!(
        decompression.render(),
        "Frame\tSubject\tRelation\tObject\n\
         0\tperson\tholding\tshell-egg\n\
         1\tNone\tNone\tNone\n\
         2\tperson\tholding\tshell-egg\n\
         3\tNone\tNone\tNone\n"
    );
}

#[test]
fn test_decompress_folder_keeps_names() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "Initial_frame-Final_frame Subject Relation Object\n0-1 a r b\n");
    write(dir.path(), "b.txt", "Initial_frame-Final_frame Subject Relation Object\n1-1 c r d\n");
    let output = dir.path().join("decompressed.tmp");

    let done = decompress_folder(dir.path(), &output, None).unwrap();
    assert_eq!(done.len(), 2);
    assert_eq!(
        std::fs::read_to_string(output.join("b.txt")).unwrap(),
        "Frame\tSubject\tRelation\tObject\n0\tNone\tNone\tNone\n1\tc\tr\td\n"
    );

    // a second pass must not pick up its own output
    let again = decompress_folder(dir.path(), &output, None).unwrap();
    assert_eq!(again.len(), 2);
}

#[test]
fn test_decompress_folder_mirrors_subfolders() {
    let dir = tempfile::tempdir().unwrap();
    for (sub, rows) in [("x", "0-0 a r b\n"), ("y", "0-0 c r d\n")] {
        std::fs::create_dir(dir.path().join(sub)).unwrap();
        write(
            &dir.path().join(sub),
            "video.txt",
            &format!("Initial_frame-Final_frame Subject Relation Object\n{}", rows),
        );
    }
    let output = dir.path().join("decompressed.tmp");

    let done = decompress_folder(dir.path(), &output, None).unwrap();
    assert_eq!(done.len(), 2);
    assert_eq!(
        std::fs::read_to_string(output.join("x").join("video.txt")).unwrap(),
        "Frame\tSubject\tRelation\tObject\n0\ta\tr\tb\n"
    );
    assert_eq!(
        std::fs::read_to_string(output.join("y").join("video.txt")).unwrap(),
        "Frame\tSubject\tRelation\tObject\n0\tc\tr\td\n"
    );
}
