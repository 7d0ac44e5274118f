//! Core types for the relation tooling

mod triple;
mod interval;
mod vector;
mod action;
mod error;
mod summary;

pub use triple::{Triple, Fact, Frame};
pub use interval::{IntervalRecord, IntervalFormat};
pub use vector::{Sign, StateVector, TernaryVector, EffectVector, PreconditionVector};
pub use action::Action;
pub use error::{KscgrError, Result, read_file, write_file};
pub use summary::{RunSummary, Operation};
