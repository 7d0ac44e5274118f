//! PDDL rendering
//!
//! Grounded domains carry one nullary predicate `p<idx>` per vocabulary
//! triple and one zero-parameter action `a<idx>` per aggregated effect.
//! Typed predicate blocks lift the relations of a file to the object types
//! of a `types.pddl` map.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::info;

use crate::core::config::Dictionaries;
use crate::core::relations::file_relations;
use crate::core::vocabulary::Vocabulary;
use crate::types::{read_file, write_file, Action, KscgrError, Result, StateVector, TernaryVector, Triple};
use crate::{ACTION_PREFIX, GOAL_PLACEHOLDER, PREDICATE_PREFIX, REQUIREMENTS};

fn predicate(idx: usize) -> String {
    format!("({}{})", PREDICATE_PREFIX, idx)
}

/// `(and ...)` with `(pN)` for +1 and `(not (pN))` for -1; 0 is omitted
pub fn conjunction(vector: &TernaryVector) -> String {
    let literals: Vec<String> = vector
        .signs()
        .iter()
        .enumerate()
        .filter_map(|(idx, sign)| match sign.value() {
            1 => Some(predicate(idx)),
            -1 => Some(format!("(not {})", predicate(idx))),
            _ => None,
        })
        .collect();
    if literals.is_empty() {
        "(and)".to_string()
    } else {
        format!("(and {})", literals.join(" "))
    }
}

/// Render the domain file. `fingerprint` is written as a leading comment.
pub fn render_domain(
    name: &str,
    vocabulary: &Vocabulary,
    actions: &[Action],
    fingerprint: Option<&str>,
) -> Result<String> {
    let mut lines = Vec::new();
    if let Some(fp) = fingerprint {
        lines.push(format!(";; vocabulary sha256 {}", fp));
    }
    lines.push(format!("(define (domain {})", name));
    lines.push(format!("  (:requirements {})", REQUIREMENTS.join(" ")));
    lines.push("  (:predicates".to_string());
    for (idx, triple) in vocabulary.iter() {
        lines.push(format!("    {} ; {}", predicate(idx), triple));
    }
    lines.push("  )".to_string());

    for (idx, action) in actions.iter().enumerate() {
        for vector in [&action.precondition, &action.effect] {
            if vector.len() != vocabulary.len() {
                return Err(KscgrError::Dimension {
                    expected: vocabulary.len(),
                    found: vector.len(),
                });
            }
        }
        lines.push(String::new());
        lines.push(format!("  (:action {}{}", ACTION_PREFIX, idx));
        lines.push("    :parameters ()".to_string());
        lines.push(format!("    :precondition {}", conjunction(&action.precondition)));
        lines.push(format!("    :effect {}", conjunction(&action.effect)));
        lines.push("  )".to_string());
    }
    lines.push(")".to_string());
    Ok(lines.join("\n") + "\n")
}

/// Render the problem template: every predicate asserted or negated after
/// `initial`, and the goal left as a placeholder
pub fn render_problem_template(name: &str, vocabulary: &Vocabulary, initial: &StateVector) -> Result<String> {
    if initial.len() != vocabulary.len() {
        return Err(KscgrError::Dimension {
            expected: vocabulary.len(),
            found: initial.len(),
        });
    }

    let mut lines = vec![
        format!("(define (problem {}-problem)", name),
        format!("  (:domain {})", name),
        "  (:init".to_string(),
    ];
    for (idx, triple) in vocabulary.iter() {
        let literal = if initial.get(idx) {
            predicate(idx)
        } else {
            format!("(not {})", predicate(idx))
        };
        lines.push(format!("    {} ; {}", literal, triple));
    }
    lines.push("  )".to_string());
    lines.push(format!("  (:goal {})", GOAL_PLACEHOLDER));
    lines.push(")".to_string());
    Ok(lines.join("\n") + "\n")
}

// =============================================================================
// TYPED PREDICATES
// =============================================================================

/// Object name → PDDL type, read from `name... - type` lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap {
    types: BTreeMap<String, String>,
    source_name: String,
}

impl TypeMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let map = Self::parse(&read_file(path)?, &path.display().to_string())?;
        info!("Loaded types for {} objects from {}", map.len(), path.display());
        Ok(map)
    }

    /// Blank lines and `;` comments are skipped. A name typed twice must
    /// keep the same type.
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut types = BTreeMap::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split(';').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let (names, ty) = match tokens.as_slice() {
                [names @ .., "-", ty] if !names.is_empty() && !names.contains(&"-") => (names, *ty),
                _ => return Err(KscgrError::format(source_name, i + 1, raw, "expected `name... - type`")),
            };
            for name in names {
                if let Some(previous) = types.insert(name.to_string(), ty.to_string()) {
                    if previous != ty {
                        return Err(KscgrError::format(
                            source_name,
                            i + 1,
                            raw,
                            format!("`{}` already has type `{}`", name, previous),
                        ));
                    }
                }
            }
        }
        Ok(Self {
            types,
            source_name: source_name.to_string(),
        })
    }

    /// Type of `name`; underscores in `name` also match hyphens
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.types
            .get(name)
            .or_else(|| self.types.get(&name.replace('_', "-")))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Distinct `(relation, subject type, object type)` signatures, sorted.
/// Every subject and object must be typed.
pub fn typed_signatures<'a>(
    triples: impl IntoIterator<Item = &'a Triple>,
    types: &TypeMap,
) -> Result<BTreeSet<(String, String, String)>> {
    let lookup = |name: &str| {
        types
            .type_of(name)
            .map(str::to_string)
            .ok_or_else(|| KscgrError::lookup("typed predicates", None, name, types.source_name.as_str()))
    };
    triples
        .into_iter()
        .map(|t| Ok((t.relation.clone(), lookup(&t.subject)?, lookup(&t.object)?)))
        .collect()
}

/// `(:predicates ...)` block with one `(rel ?s - stype ?o - otype)` line per
/// typed signature
pub fn render_typed_predicates(signatures: &BTreeSet<(String, String, String)>) -> String {
    let mut lines = vec!["(:predicates".to_string()];
    for (relation, subject, object) in signatures {
        lines.push(format!("    ({} ?s - {} ?o - {})", relation, subject, object));
    }
    lines.push(")".to_string());
    lines.join("\n") + "\n"
}

/// Write the typed predicates of a dense or interval file to `output`.
/// Returns the number of predicates.
pub fn typed_predicates_to_file(
    input: impl AsRef<Path>,
    types: &TypeMap,
    output: impl AsRef<Path>,
    dictionaries: Option<&Dictionaries>,
) -> Result<usize> {
    let signatures = typed_signatures(&file_relations(input, dictionaries)?, types)?;
    write_file(output.as_ref(), &render_typed_predicates(&signatures))?;
    info!("File saved at: {}", output.as_ref().display());
    Ok(signatures.len())
}
