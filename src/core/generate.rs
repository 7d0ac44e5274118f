//! Domain generation over a corpus of dense fact files
//!
//! vocabulary → per-file transition extraction into one effect table →
//! XNORp aggregation → `dictionary.dat`, `auto_domain.pddl` and, with an
//! initial triple set, `auto_problem.pddl`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::aggregator::aggregate;
use crate::core::corpus::corpus_files;
use crate::core::extractor::{EffectTable, TransitionExtractor};
use crate::core::pddl::{render_domain, render_problem_template};
use crate::core::reader::FactFile;
use crate::core::relations::load_triple_list;
use crate::core::vocabulary::Vocabulary;
use crate::types::{write_file, Action, Result, StateVector, Triple};
use crate::{CORPUS_EXTENSION, DEFAULT_DOMAIN_NAME, DICTIONARY_FILE, DOMAIN_FILE, PROBLEM_FILE};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub domain_name: String,
    /// Single-witness off bits become required-off
    pub convert_null: bool,
    /// Accept gaps in frame numbering
    pub allow_gaps: bool,
    /// Existing `dictionary.dat` to use instead of building one
    pub vocabulary: Option<PathBuf>,
    /// `subject relation object` lines holding before the first frame
    pub initial: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            convert_null: true,
            allow_gaps: false,
            vocabulary: None,
            initial: None,
        }
    }
}

/// Everything one generation run produced
#[derive(Debug, Clone)]
pub struct Generation {
    pub vocabulary: Vocabulary,
    pub table: EffectTable,
    pub actions: Vec<Action>,
    pub initial: Option<StateVector>,
    pub files: usize,
    pub frames: usize,
    pub transitions: usize,
}

impl Generation {
    pub fn render_domain(&self, name: &str) -> Result<String> {
        render_domain(name, &self.vocabulary, &self.actions, Some(&self.vocabulary.fingerprint()))
    }

    /// Problem template, only when an initial set was given
    pub fn render_problem(&self, name: &str) -> Option<Result<String>> {
        self.initial
            .as_ref()
            .map(|initial| render_problem_template(name, &self.vocabulary, initial))
    }
}

/// Run generation over `files`
pub fn generate(files: &[PathBuf], options: &GenerateOptions) -> Result<Generation> {
    let facts: Vec<FactFile> = files
        .iter()
        .map(|path| {
            let file = FactFile::open(path)?;
            Ok(if options.allow_gaps { file.allow_gaps() } else { file })
        })
        .collect::<Result<_>>()?;

    let initial_triples = match &options.initial {
        Some(path) => Some(load_triple_list(path)?),
        None => None,
    };

    let vocabulary = match &options.vocabulary {
        Some(path) => Vocabulary::load(path)?,
        None => {
            // initial triples need an index even when no frame shows them
            let mut triples: Vec<Triple> = initial_triples.iter().flatten().cloned().collect();
            for file in &facts {
                triples.extend(file.triples()?);
            }
            Vocabulary::new(triples)
        }
    };
    info!("Dictionary containing {} relations", vocabulary.len());

    let initial = initial_triples
        .as_ref()
        .map(|triples| vocabulary.vector_for(triples))
        .transpose()?;

    let mut extractor = TransitionExtractor::new(&vocabulary);
    if let Some(initial) = &initial {
        extractor = extractor.with_initial(initial.clone());
    }

    let mut table = EffectTable::new();
    let (mut frames, mut transitions) = (0, 0);
    for file in &facts {
        let stats = extractor.extract_file(file, &mut table)?;
        frames += stats.frames;
        transitions += stats.transitions;
    }

    let actions = aggregate(&table, options.convert_null)?;
    info!("Inferred {} actions from {} transitions", actions.len(), transitions);

    Ok(Generation {
        vocabulary,
        table,
        actions,
        initial,
        files: facts.len(),
        frames,
        transitions,
    })
}

/// Run generation over `files` and write the results into `output_dir`.
///
/// Nothing is written unless every file was processed and every output
/// rendered. The dictionary goes last, so its presence marks a finished run.
pub fn generate_to_folder(
    files: &[PathBuf],
    output_dir: impl AsRef<Path>,
    options: &GenerateOptions,
) -> Result<(Generation, Vec<PathBuf>)> {
    let output_dir = output_dir.as_ref();
    let generation = generate(files, options)?;

    let domain = generation.render_domain(&options.domain_name)?;
    let problem = generation.render_problem(&options.domain_name).transpose()?;

    let mut written = Vec::new();
    let domain_path = output_dir.join(DOMAIN_FILE);
    write_file(&domain_path, &domain)?;
    written.push(domain_path);

    if let Some(problem) = problem {
        let problem_path = output_dir.join(PROBLEM_FILE);
        write_file(&problem_path, &problem)?;
        written.push(problem_path);
    }

    let dictionary_path = output_dir.join(DICTIONARY_FILE);
    generation.vocabulary.save(&dictionary_path)?;
    written.push(dictionary_path);

    for path in &written {
        info!("File saved at: {}", path.display());
    }
    Ok((generation, written))
}

/// Generate over every corpus file of `folder`
pub fn generate_folder(
    folder: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &GenerateOptions,
) -> Result<(Generation, Vec<PathBuf>)> {
    let files = corpus_files(folder, CORPUS_EXTENSION)?;
    generate_to_folder(&files, output_dir, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_two_files_share_one_table() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        std::fs::write(&first, "Frame\tSubject\tRelation\tObject\n0\tNone\tNone\tNone\n1\tegg\ton\tbowl\n").unwrap();
        std::fs::write(&second, "Frame\tSubject\tRelation\tObject\n0\tperson\tholding\tegg\n1\tperson\tholding\tegg\n1\tegg\ton\tbowl\n").unwrap();

        let generation = generate(&[first, second], &GenerateOptions::default()).unwrap();
        assert_eq!(generation.files, 2);
        assert_eq!(generation.frames, 4);
        assert_eq!(generation.transitions, 2);
        // same effect (egg on bowl turns on) from witnesses [0,0] and [0,1]
        assert_eq!(generation.actions.len(), 1);
        assert_eq!(generation.actions[0].precondition.values(), vec![-1, 0]);
        assert_eq!(generation.actions[0].support, 2);
    }

    #[test]
    fn test_failed_domain_write_leaves_no_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.txt");
        std::fs::write(&video, "0\tNone\tNone\tNone\n1\tegg\ton\tbowl\n").unwrap();
        let out = dir.path().join("out");
        // a folder where the domain file should go makes its write fail
        std::fs::create_dir_all(out.join(DOMAIN_FILE)).unwrap();

        let err = generate_to_folder(&[video], &out, &GenerateOptions::default()).unwrap_err();
        assert_eq!(err.code(), "E600_IO");
        assert!(!out.join(DICTIONARY_FILE).exists());
    }

    #[test]
    fn test_initial_triples_join_the_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.txt");
        let initial = dir.path().join("initial.dat");
        std::fs::write(&video, "0\tperson\tholding\tegg\n").unwrap();
        std::fs::write(&initial, "egg in fridge\n").unwrap();

        let options = GenerateOptions {
            initial: Some(initial),
            ..Default::default()
        };
        let generation = generate(&[video], &options).unwrap();
        assert_eq!(generation.vocabulary.len(), 2);
        assert_eq!(generation.transitions, 1);
        assert_eq!(generation.actions[0].effect.values(), vec![-1, 1]);
        assert!(generation.render_problem("k").is_some());
    }
}
