//! Grounded STRIPS action: a precondition paired with an effect

use crate::types::{EffectVector, PreconditionVector};

/// Zero-parameter action inferred from observed transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub precondition: PreconditionVector,
    pub effect: EffectVector,
    /// Number of witness states the precondition was aggregated from
    pub support: usize,
}

impl Action {
    pub fn new(precondition: PreconditionVector, effect: EffectVector, support: usize) -> Self {
        Self {
            precondition,
            effect,
            support,
        }
    }
}
