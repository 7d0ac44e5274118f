//! KSCGR relation tooling CLI
//!
//! Usage:
//!   kscgr compress video.txt                 # dense facts → intervals (ids)
//!   kscgr compress video.txt --names         # keep names instead of ids
//!   kscgr decompress video_compressed.txt    # intervals → dense facts
//!   kscgr generate corpus/                   # vocabulary + PDDL domain
//!   kscgr predicates video.txt -t types.pddl   # typed (:predicates ...) block
//!   kscgr sanitize video.txt --objects lis.txt

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use kscgr::core::{
    check_possible_relations, common_relations_to_file, compress_to_file, corpus_files, decompress,
    decompress_folder, generate_folder, generate_to_folder, list_relations, load_possible_relations,
    sanitize_against_objects, typed_predicates_to_file, verify_sequence, Background, Dictionaries, FactFile,
    GenerateOptions, IntervalFile, ObjectPresence, TypeMap, Vocabulary,
};
use kscgr::types::{write_file, IntervalFormat, KscgrError, Operation, Result, RunSummary};
use kscgr::{
    CORPUS_EXTENSION, DEFAULT_CLASS_FILE, DEFAULT_DECOMPRESSION_DIR, DEFAULT_DOMAIN_NAME,
    DEFAULT_GENERATION_DIR, DEFAULT_RELATION_FILE, DEFAULT_TYPES_FILE, DICTIONARY_FILE, VERSION,
};

#[derive(Parser, Debug)]
#[command(
    name = "kscgr",
    version = VERSION,
    about = "KSCGR relation tooling - compress annotations and learn PDDL domains",
    long_about = "Tools for the per-frame (subject, relation, object) annotations of the\n\
                  KSCGR cooking videos.\n\n\
                  Pipeline:\n  \
                  compress     dense facts -> frame intervals\n  \
                  decompress   frame intervals -> dense facts\n  \
                  generate     dense facts -> vocabulary + grounded PDDL domain"
)]
struct Cli {
    /// Logging level: one of "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info", global = true)]
    log_level: tracing::Level,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a dense fact file into frame intervals
    Compress(CompressArgs),
    /// Expand an interval file back into dense facts
    Decompress(DecompressArgs),
    /// Decompress every interval file of a folder
    DecompressFolder(DecompressFolderArgs),
    /// Build and save the triple vocabulary of a corpus
    Vocabulary(VocabularyArgs),
    /// Infer actions from a corpus and write a PDDL domain
    Generate(GenerateArgs),
    /// List the distinct relations of a file
    ListRelations(ListRelationsArgs),
    /// Group relations by the number of files they appear in
    CommonRelations(CommonRelationsArgs),
    /// Write the typed PDDL predicates of a file
    Predicates(PredicatesArgs),
    /// Check a dense file against objects and/or a relation whitelist
    Sanitize(SanitizeArgs),
}

#[derive(Args, Debug)]
struct DictionaryArgs {
    /// File containing ids and their classes
    #[arg(short, long, default_value = DEFAULT_CLASS_FILE)]
    class_file: PathBuf,

    /// File containing ids and their relations
    #[arg(short, long, default_value = DEFAULT_RELATION_FILE)]
    relation_file: PathBuf,

    /// Drop `__background__` and shift the other ids down by one
    #[arg(long)]
    drop_background: bool,
}

impl DictionaryArgs {
    fn load(&self) -> Result<Dictionaries> {
        let background = if self.drop_background { Background::Drop } else { Background::Keep };
        Dictionaries::load(&self.class_file, &self.relation_file, background)
    }

    /// Load only when both files exist
    fn load_if_present(&self) -> Result<Option<Dictionaries>> {
        if self.class_file.is_file() && self.relation_file.is_file() {
            self.load().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Dense fact file
    input: PathBuf,

    /// Output file (default: <input>_compressed.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save names for objects and relations instead of their ids
    #[arg(short = 'n', long)]
    names: bool,

    /// Accept gaps in frame numbering
    #[arg(long)]
    allow_gaps: bool,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Interval file
    input: PathBuf,

    /// Output file (default: <input>_decompressed.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Object annotation (LIS) file; facts whose objects are absent are dropped
    #[arg(long)]
    objects: Option<PathBuf>,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct DecompressFolderArgs {
    /// Folder of interval files
    input: PathBuf,

    /// Output folder (default: <input>/decompressed.tmp)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct VocabularyArgs {
    /// Folder of dense fact files
    input: PathBuf,

    /// Output file (default: <input>/auto_pddls.tmp/dictionary.dat)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Accept gaps in frame numbering
    #[arg(long)]
    allow_gaps: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Folder of dense fact files, or a single file
    input: PathBuf,

    /// Output folder (default: <input>/auto_pddls.tmp)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Domain name
    #[arg(long, default_value = DEFAULT_DOMAIN_NAME)]
    domain_name: String,

    /// `subject relation object` lines holding before the first frame
    #[arg(long)]
    initial: Option<PathBuf>,

    /// Use an existing dictionary instead of building one
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// With a single witness, treat off bits as don't-care
    #[arg(long)]
    keep_single_witness_nulls: bool,

    /// Accept gaps in frame numbering
    #[arg(long)]
    allow_gaps: bool,
}

#[derive(Args, Debug)]
struct ListRelationsArgs {
    /// Dense or interval file
    input: PathBuf,

    /// Output file (default: <input>_list.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct CommonRelationsArgs {
    /// Folder of dense or interval files
    input: PathBuf,

    /// Output file (default: common_relations.txt next to the folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct PredicatesArgs {
    /// Dense or interval file
    input: PathBuf,

    /// Output file (default: <input>_predicates.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File of `name... - type` lines
    #[arg(short, long, default_value = DEFAULT_TYPES_FILE)]
    types_file: PathBuf,

    #[command(flatten)]
    dictionaries: DictionaryArgs,
}

#[derive(Args, Debug)]
struct SanitizeArgs {
    /// Dense fact file
    input: PathBuf,

    /// Object annotation (LIS) file
    #[arg(short, long)]
    objects: Option<PathBuf>,

    /// File of possible `subject relation object` relations
    #[arg(short, long)]
    possible: Option<PathBuf>,

    /// Audit file (default: <input>_sanity.txt)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install logger: {}", e);
    }

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli.command) {
        Ok(summary) => print_summary(&summary, &cli),
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &RunSummary, cli: &Cli) {
    if cli.json {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("could not serialize summary: {}", e),
        }
    } else if cli.no_color {
        println!("{}", summary.to_parseable_string());
    } else {
        println!("{}", summary.to_terminal_string());
    }
}

fn run(command: &Command) -> Result<RunSummary> {
    match command {
        Command::Compress(args) => run_compress(args),
        Command::Decompress(args) => run_decompress(args),
        Command::DecompressFolder(args) => run_decompress_folder(args),
        Command::Vocabulary(args) => run_vocabulary(args),
        Command::Generate(args) => run_generate(args),
        Command::ListRelations(args) => run_list_relations(args),
        Command::CommonRelations(args) => run_common_relations(args),
        Command::Predicates(args) => run_predicates(args),
        Command::Sanitize(args) => run_sanitize(args),
    }
}

/// `<dir>/<stem><suffix>`
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, suffix))
}

fn open_facts(input: &Path, allow_gaps: bool) -> Result<FactFile> {
    let file = FactFile::open(input)?;
    Ok(if allow_gaps { file.allow_gaps() } else { file })
}

// =============================================================================
// COMMANDS
// =============================================================================

fn run_compress(args: &CompressArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "_compressed.txt"));
    let file = open_facts(&args.input, args.allow_gaps)?;
    let (format, dictionaries) = if args.names {
        (IntervalFormat::Names, None)
    } else {
        (IntervalFormat::Ids, Some(args.dictionaries.load()?))
    };

    let compression = compress_to_file(&file, &output, format, dictionaries.as_ref())?;
    Ok(RunSummary::new(Operation::Compress)
        .input(&args.input)
        .output(&output)
        .count("frames", compression.frame_count())
        .count("facts", compression.fact_count())
        .count("triples", compression.triple_count())
        .count("records", compression.len()))
}

fn run_decompress(args: &DecompressArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "_decompressed.txt"));
    let file = IntervalFile::load(&args.input)?;
    let dictionaries = match file.format() {
        Some(IntervalFormat::Ids) => Some(args.dictionaries.load()?),
        _ => args.dictionaries.load_if_present()?,
    };
    let presence = args.objects.as_ref().map(ObjectPresence::load).transpose()?;

    let decompression = decompress(&file, dictionaries.as_ref(), presence.as_ref())?;
    write_file(&output, &decompression.render())?;
    info!("File saved at: {}", output.display());

    let mut summary = RunSummary::new(Operation::Decompress)
        .input(&args.input)
        .output(&output)
        .count("records", decompression.records)
        .count("frames", decompression.frames.len())
        .count("facts", decompression.fact_count())
        .warnings(decompression.suppressed);
    if let Some(objects) = &args.objects {
        summary = summary.input(objects);
    }
    Ok(summary)
}

fn run_decompress_folder(args: &DecompressFolderArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| args.input.join(DEFAULT_DECOMPRESSION_DIR));
    let dictionaries = args.dictionaries.load_if_present()?;
    let done = decompress_folder(&args.input, &output, dictionaries.as_ref())?;

    let mut summary = RunSummary::new(Operation::DecompressFolder)
        .input(&args.input)
        .count("files", done.len())
        .count("records", done.iter().map(|(_, d)| d.records).sum())
        .count("facts", done.iter().map(|(_, d)| d.fact_count()).sum());
    for (path, _) in &done {
        summary = summary.output(path);
    }
    Ok(summary)
}

fn run_vocabulary(args: &VocabularyArgs) -> Result<RunSummary> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.join(DEFAULT_GENERATION_DIR).join(DICTIONARY_FILE));
    let files = corpus_files(&args.input, CORPUS_EXTENSION)?
        .iter()
        .map(|path| open_facts(path, args.allow_gaps))
        .collect::<Result<Vec<_>>>()?;

    let vocabulary = Vocabulary::from_files(&files)?;
    vocabulary.save(&output)?;
    Ok(RunSummary::new(Operation::Vocabulary)
        .input(&args.input)
        .output(&output)
        .count("files", files.len())
        .count("triples", vocabulary.len())
        .fingerprint(vocabulary.fingerprint()))
}

fn run_generate(args: &GenerateArgs) -> Result<RunSummary> {
    let options = GenerateOptions {
        domain_name: args.domain_name.clone(),
        convert_null: !args.keep_single_witness_nulls,
        allow_gaps: args.allow_gaps,
        vocabulary: args.vocabulary.clone(),
        initial: args.initial.clone(),
    };

    let (generation, written) = if args.input.is_dir() {
        let output = args.output.clone().unwrap_or_else(|| args.input.join(DEFAULT_GENERATION_DIR));
        generate_folder(&args.input, &output, &options)?
    } else if args.input.is_file() {
        let output = args.output.clone().unwrap_or_else(|| {
            args.input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_GENERATION_DIR)
        });
        generate_to_folder(&[args.input.clone()], &output, &options)?
    } else {
        return Err(KscgrError::io(
            &args.input,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a valid file or folder"),
        ));
    };

    let mut summary = RunSummary::new(Operation::Generate)
        .input(&args.input)
        .count("files", generation.files)
        .count("frames", generation.frames)
        .count("transitions", generation.transitions)
        .count("predicates", generation.vocabulary.len())
        .count("actions", generation.actions.len())
        .fingerprint(generation.vocabulary.fingerprint());
    for path in &written {
        summary = summary.output(path);
    }
    Ok(summary)
}

fn run_list_relations(args: &ListRelationsArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "_list.txt"));
    let dictionaries = args.dictionaries.load_if_present()?;
    let triples = list_relations(&args.input, &output, dictionaries.as_ref())?;
    Ok(RunSummary::new(Operation::ListRelations)
        .input(&args.input)
        .output(&output)
        .count("triples", triples.len()))
}

fn run_common_relations(args: &CommonRelationsArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("common_relations.txt")
    });
    let dictionaries = args.dictionaries.load_if_present()?;
    let report = common_relations_to_file(&args.input, &output, dictionaries.as_ref())?;
    Ok(RunSummary::new(Operation::CommonRelations)
        .input(&args.input)
        .output(&output)
        .count("files", report.files)
        .count("triples", report.triple_count())
        .count("common", report.common().len()))
}

fn run_predicates(args: &PredicatesArgs) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "_predicates.txt"));
    let types = TypeMap::load(&args.types_file)?;
    let dictionaries = args.dictionaries.load_if_present()?;
    let predicates = typed_predicates_to_file(&args.input, &types, &output, dictionaries.as_ref())?;
    Ok(RunSummary::new(Operation::Predicates)
        .input(&args.input)
        .input(&args.types_file)
        .output(&output)
        .count("types", types.len())
        .count("predicates", predicates))
}

fn run_sanitize(args: &SanitizeArgs) -> Result<RunSummary> {
    let relations = FactFile::open(&args.input)?;
    let frames = verify_sequence(&relations)?;
    let mut summary = RunSummary::new(Operation::Sanitize)
        .input(&args.input)
        .count("frames", frames);
    let mut warnings = 0;

    if let Some(possible) = &args.possible {
        let report = check_possible_relations(&relations, &load_possible_relations(possible)?)?;
        warnings += report.problems;
        summary = summary.input(possible).count("unknown_relations", report.problems);
    }

    if let Some(objects) = &args.objects {
        let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "_sanity.txt"));
        let presence = ObjectPresence::load(objects)?;
        let report = sanitize_against_objects(&presence, &relations, &output)?;
        warnings += report.problems;
        summary = summary.input(objects).count("missing_objects", report.problems);
        if let Some(path) = &report.output {
            summary = summary.output(path);
        }
    }

    Ok(summary.warnings(warnings))
}
