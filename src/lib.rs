//! KSCGR relation tooling
//!
//! Dense per-frame relation annotations → interval compression → boolean
//! state vectors → STRIPS actions → PDDL domain.

pub mod core;
pub mod types;

// =============================================================================
// FILE FORMATS
// =============================================================================

/// Header written on top of every dense fact file
pub const DENSE_HEADER: &str = "Frame\tSubject\tRelation\tObject";

/// Header for interval files storing class/relation ids
pub const INTERVAL_HEADER_IDS: &str = "Initial_frame-Final_frame-Subject-Relation-Object";

/// Header for interval files storing names
pub const INTERVAL_HEADER_NAMES: &str = "Initial_frame-Final_frame Subject Relation Object";

/// Placeholder used in dense files for a frame without relations
pub const NONE_TOKEN: &str = "None";

/// Marker carrying the source path in header/footer lines
pub const PATH_MARKER: &str = "Path:";

/// Background class in `classes.cfg`
pub const BACKGROUND_CLASS: &str = "__background__";

// =============================================================================
// DEFAULTS - same as the annotation scripts
// =============================================================================

pub const DEFAULT_CLASS_FILE: &str = "classes.cfg";
pub const DEFAULT_RELATION_FILE: &str = "relations.cfg";

/// Object name → PDDL type map
pub const DEFAULT_TYPES_FILE: &str = "types.pddl";

/// Folder created next to the corpus for generated domains
pub const DEFAULT_GENERATION_DIR: &str = "auto_pddls.tmp";

/// Folder created next to the corpus for decompressed files
pub const DEFAULT_DECOMPRESSION_DIR: &str = "decompressed.tmp";

/// File name of the persisted vocabulary
pub const DICTIONARY_FILE: &str = "dictionary.dat";

/// File name of the generated domain
pub const DOMAIN_FILE: &str = "auto_domain.pddl";

/// File name of the generated problem template
pub const PROBLEM_FILE: &str = "auto_problem.pddl";

/// Corpus file extension
pub const CORPUS_EXTENSION: &str = "txt";

// =============================================================================
// PDDL
// =============================================================================

pub const DEFAULT_DOMAIN_NAME: &str = "autokitchen";

/// Requirements declared by every generated domain
pub const REQUIREMENTS: [&str; 2] = [":strips", ":negative-preconditions"];

/// Predicate symbols are `p<idx>`
pub const PREDICATE_PREFIX: &str = "p";

/// Action symbols are `a<idx>`
pub const ACTION_PREFIX: &str = "a";

/// Token left in the problem template where the goal is filled in by hand
pub const GOAL_PLACEHOLDER: &str = "<GOAL>";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
