//! Precondition aggregation (XNORp)
//!
//! Folds the witness list of every effect into one ternary precondition.
//! With `k` witnesses, a position whose witnesses sum to 0 is required off,
//! one summing to `k` is required on, anything else is don't-care.

use tracing::debug;

use crate::core::extractor::EffectTable;
use crate::types::{Action, KscgrError, PreconditionVector, Result, Sign, StateVector, TernaryVector};

/// Aggregate the witnesses of one effect.
///
/// With a single witness and `convert_null` set, its off bits become
/// required-off; with `convert_null` unset they are don't-care.
pub fn aggregate_witnesses(witnesses: &[StateVector], convert_null: bool) -> Result<PreconditionVector> {
    let first = match witnesses.first() {
        Some(first) => first,
        None => return Ok(TernaryVector::new(Vec::new())),
    };

    if witnesses.len() == 1 {
        let signs = first
            .bits()
            .iter()
            .map(|&on| match (on, convert_null) {
                (true, _) => Sign::Positive,
                (false, true) => Sign::Negative,
                (false, false) => Sign::Neutral,
            })
            .collect();
        return Ok(TernaryVector::new(signs));
    }

    let k = witnesses.len();
    let mut sums = vec![0usize; first.len()];
    for witness in witnesses {
        if witness.len() != sums.len() {
            return Err(KscgrError::Dimension {
                expected: sums.len(),
                found: witness.len(),
            });
        }
        for (sum, &on) in sums.iter_mut().zip(witness.bits()) {
            *sum += usize::from(on);
        }
    }

    let signs = sums
        .into_iter()
        .map(|sum| match sum {
            0 => Sign::Negative,
            s if s == k => Sign::Positive,
            _ => Sign::Neutral,
        })
        .collect();
    Ok(TernaryVector::new(signs))
}

/// One action per effect, in table order
pub fn aggregate(table: &EffectTable, convert_null: bool) -> Result<Vec<Action>> {
    table
        .iter()
        .map(|(effect, witnesses)| {
            let precondition = aggregate_witnesses(witnesses, convert_null)?;
            debug!("Effect {} over {} witnesses: precondition {}", effect, witnesses.len(), precondition);
            Ok(Action::new(precondition, effect.clone(), witnesses.len()))
        })
        .collect()
}
