//! Integration tests for vocabulary building and domain generation
//!
//! - the vocabulary does not depend on file enumeration order
//! - load(save(v)) == v
//! - the person/egg/bowl timeline yields two single-witness actions
//! - the domain header carries the vocabulary fingerprint

use kscgr::core::{
    generate, generate_folder, FactFile, GenerateOptions, TransitionExtractor, EffectTable, Vocabulary,
    aggregate, state_sequence,
};
use kscgr::types::Triple;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

const TIMELINE: &str = "Frame\tSubject\tRelation\tObject\n\
                        0\tperson\tholding\tegg\n\
                        1\tperson\tholding\tegg\n\
                        2\tperson\tholding\tegg\n\
                        2\tegg\ton\tbowl\n\
                        3\tegg\ton\tbowl\n";

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// =============================================================================
// VOCABULARY
// =============================================================================

#[test]
fn test_vocabulary_ignores_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = FactFile::open(write(dir.path(), "a.txt", "0\tperson\tcutting\tbread\n")).unwrap();
    let b = FactFile::open(write(dir.path(), "b.txt", TIMELINE)).unwrap();

    let forward = Vocabulary::from_files([&a, &b]).unwrap();
    let backward = Vocabulary::from_files([&b, &a]).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward.render(), backward.render());
    assert_eq!(forward.get(0), Some(&Triple::new("egg", "on", "bowl")));
}

#[test]
fn test_vocabulary_save_load() {
    let dir = tempfile::tempdir().unwrap();
    let file = FactFile::open(write(dir.path(), "video.txt", TIMELINE)).unwrap();
    let vocabulary = Vocabulary::from_files([&file]).unwrap();
    let path = dir.path().join("dictionary.dat");

    vocabulary.save(&path).unwrap();
    let loaded = Vocabulary::load(&path).unwrap();
    assert_eq!(loaded, vocabulary);
    assert_eq!(loaded.fingerprint(), vocabulary.fingerprint());
}

// =============================================================================
// END TO END
// =============================================================================

#[test]
fn test_timeline_transitions_and_actions() {
    let dir = tempfile::tempdir().unwrap();
    let file = FactFile::open(write(dir.path(), "video.txt", TIMELINE)).unwrap();
    let vocabulary = Vocabulary::from_files([&file]).unwrap();

    // sorted: 0 = (egg on bowl), 1 = (person holding egg)
    let states: Vec<String> = state_sequence(&vocabulary, file.frames().unwrap())
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(states, vec!["[0,1]", "[0,1]", "[1,1]", "[1,0]"]);

    let mut table = EffectTable::new();
    TransitionExtractor::new(&vocabulary).extract_file(&file, &mut table).unwrap();
    let actions = aggregate(&table, true).unwrap();

    let summary: Vec<(Vec<i8>, Vec<i8>)> = actions
        .iter()
        .map(|a| (a.effect.values(), a.precondition.values()))
        .collect();
    assert_eq!(summary, vec![(vec![1, 0], vec![-1, 1]), (vec![0, -1], vec![1, 1])]);
}

#[test]
fn test_generate_folder_writes_domain() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "video.txt", TIMELINE);
    let output = dir.path().join("auto_pddls.tmp");

    let (generation, written) = generate_folder(dir.path(), &output, &GenerateOptions::default()).unwrap();
    assert_eq!(written, vec![output.join("auto_domain.pddl"), output.join("dictionary.dat")]);
    assert_eq!(generation.actions.len(), 2);

    assert_eq!(
        std::fs::read_to_string(output.join("dictionary.dat")).unwrap(),
        "0 egg on bowl\n1 person holding egg\n"
    );
    let domain = std::fs::read_to_string(output.join("auto_domain.pddl")).unwrap();
    assert_eq!(
        domain,
        format!(
            ";; vocabulary sha256 {}
(define (domain autokitchen)
  (:requirements :strips :negative-preconditions)
  (:predicates
    (p0) ; egg on bowl
    (p1) ; person holding egg
  )

  (:action a0
    :parameters ()
    :precondition (and (not (p0)) (p1))
    :effect (and (p0))
  )

  (:action a1
    :parameters ()
    :precondition (and (p0) (p1))
    :effect (and (not (p1)))
  )
)
",
            generation.vocabulary.fingerprint()
        )
    );
}

#[test]
fn test_generate_with_initial_set_and_existing_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let video = write(dir.path(), "video.txt", TIMELINE);
    let initial = write(dir.path(), "initial.dat", "# kitchen at rest\negg on bowl\n");
    let dictionary = write(dir.path(), "dictionary.dat", "0 egg on bowl\n1 person holding egg\n");
    let output = dir.path().join("out");

    let options = GenerateOptions {
        domain_name: "breakfast".to_string(),
        vocabulary: Some(dictionary),
        initial: Some(initial),
        ..Default::default()
    };
    let (generation, written) = kscgr::core::generate_to_folder(&[video], &output, &options).unwrap();
    assert_eq!(written.len(), 3);
    // [1,0] -> [0,1] at frame 0, then the two timeline transitions
    assert_eq!(generation.transitions, 3);

    assert_eq!(
        std::fs::read_to_string(output.join("auto_problem.pddl")).unwrap(),
        "(define (problem breakfast-problem)
  (:domain breakfast)
  (:init
    (p0) ; egg on bowl
    (not (p1)) ; person holding egg
  )
  (:goal <GOAL>)
)
"
    );
}

#[test]
fn test_keep_single_witness_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let video = write(dir.path(), "video.txt", TIMELINE);
    let options = GenerateOptions {
        convert_null: false,
        ..Default::default()
    };
    let generation = generate(&[video], &options).unwrap();
    assert_eq!(generation.actions[0].precondition.values(), vec![0, 1]);
}

#[test]
fn test_existing_vocabulary_must_cover_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let video = write(dir.path(), "video.txt", TIMELINE);
    let dictionary = write(dir.path(), "dictionary.dat", "0 egg on bowl\n");
    let output = dir.path().join("out");

    let options = GenerateOptions {
        vocabulary: Some(dictionary),
        ..Default::default()
    };
    let err = kscgr::core::generate_to_folder(&[video], &output, &options).unwrap_err();
    assert_eq!(err.code(), "E400_VOCABULARY_MISMATCH");
    assert!(!output.exists());
}
