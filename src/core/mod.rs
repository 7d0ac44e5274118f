//! Core modules for the relation tooling

pub mod reader;
pub mod config;
pub mod objects;
pub mod corpus;
pub mod compressor;
pub mod decompressor;
pub mod vocabulary;
pub mod extractor;
pub mod aggregator;
pub mod pddl;
pub mod generate;
pub mod relations;
pub mod sanitize;

pub use reader::{FactFile, FrameReader, Contiguity, parse_frames, render_frames};
pub use config::{Background, ClassMap, Dictionaries};
pub use objects::ObjectPresence;
pub use corpus::corpus_files;
pub use compressor::{Compressor, Compression, compress_file, compress_frames, compress_to_file, render_intervals};
pub use decompressor::{IntervalFile, Decompression, decompress, decompress_to_file, decompress_folder};
pub use vocabulary::Vocabulary;
pub use extractor::{EffectTable, TransitionExtractor, ExtractionStats, state_sequence};
pub use aggregator::{aggregate, aggregate_witnesses};
pub use pddl::{TypeMap, render_domain, render_problem_template, render_typed_predicates, typed_predicates_to_file, typed_signatures};
pub use generate::{GenerateOptions, Generation, generate, generate_folder, generate_to_folder};
pub use relations::{CommonRelations, common_relations, common_relations_to_file, list_relations, load_triple_list};
pub use sanitize::{SanitizeReport, check_possible_relations, load_possible_relations, sanitize_against_objects, verify_sequence};
