//! State, effect and precondition vectors
//!
//! - State vector: one bit per vocabulary triple, 1 = triple holds
//! - Effect vector (XORe of two consecutive states): +1 added, -1 deleted,
//!   0 unchanged
//! - Precondition vector (XNORp over witness states): +1 required on,
//!   -1 required off, 0 don't care

use crate::types::{KscgrError, Result};

/// One component of a ternary vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    Negative,
    Neutral,
    Positive,
}

impl Sign {
    /// -1, 0 or +1
    pub fn value(&self) -> i8 {
        match self {
            Sign::Negative => -1,
            Sign::Neutral => 0,
            Sign::Positive => 1,
        }
    }

    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Sign::Negative),
            0 => Some(Sign::Neutral),
            1 => Some(Sign::Positive),
            _ => None,
        }
    }
}

// =============================================================================
// STATE VECTOR
// =============================================================================

/// Boolean vector over a fixed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateVector {
    bits: Vec<bool>,
}

impl StateVector {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All-false vector of length `len`
    pub fn zeros(len: usize) -> Self {
        Self { bits: vec![false; len] }
    }

    /// Build from 0/1 values; anything non-zero counts as 1
    pub fn from_values(values: &[u8]) -> Self {
        Self {
            bits: values.iter().map(|v| *v != 0).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, idx: usize) -> bool {
        self.bits[idx]
    }

    pub fn set(&mut self, idx: usize, value: bool) {
        self.bits[idx] = value;
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Indices of the triples that hold
    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i)
    }

    fn check_dimension(&self, other: &StateVector) -> Result<()> {
        if self.len() != other.len() {
            return Err(KscgrError::Dimension {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(())
    }

    /// Effect XOR from `self` (before) to `next` (after)
    ///
    /// | a | b | XORe |
    /// |---|---|------|
    /// | 0 | 0 |  0   |
    /// | 0 | 1 |  +1  |
    /// | 1 | 0 |  -1  |
    /// | 1 | 1 |  0   |
    pub fn xore(&self, next: &StateVector) -> Result<EffectVector> {
        self.check_dimension(next)?;
        let signs = self
            .bits
            .iter()
            .zip(&next.bits)
            .map(|(a, b)| match (a, b) {
                (false, true) => Sign::Positive,
                (true, false) => Sign::Negative,
                _ => Sign::Neutral,
            })
            .collect();
        Ok(TernaryVector::new(signs))
    }

    /// Predicate XNOR of two witness states
    ///
    /// | a | b | XNORp |
    /// |---|---|-------|
    /// | 0 | 0 |  -1   |
    /// | 0 | 1 |  0    |
    /// | 1 | 0 |  0    |
    /// | 1 | 1 |  +1   |
    pub fn xnorp(&self, other: &StateVector) -> Result<PreconditionVector> {
        self.check_dimension(other)?;
        let signs = self
            .bits
            .iter()
            .zip(&other.bits)
            .map(|(a, b)| match (a, b) {
                (false, false) => Sign::Negative,
                (true, true) => Sign::Positive,
                _ => Sign::Neutral,
            })
            .collect();
        Ok(TernaryVector::new(signs))
    }
}

impl std::fmt::Display for StateVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<&str> = self.bits.iter().map(|b| if *b { "1" } else { "0" }).collect();
        write!(f, "[{}]", values.join(","))
    }
}

// =============================================================================
// TERNARY VECTOR
// =============================================================================

/// Vector of {-1, 0, +1}
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TernaryVector {
    signs: Vec<Sign>,
}

/// XORe of two consecutive states
pub type EffectVector = TernaryVector;

/// XNORp summary of the witness states of one effect
pub type PreconditionVector = TernaryVector;

impl TernaryVector {
    pub fn new(signs: Vec<Sign>) -> Self {
        Self { signs }
    }

    /// Build from -1/0/+1 values, `None` on any other value
    pub fn from_values(values: &[i8]) -> Option<Self> {
        let signs = values.iter().map(|v| Sign::from_value(*v)).collect::<Option<Vec<_>>>()?;
        Some(Self { signs })
    }

    pub fn values(&self) -> Vec<i8> {
        self.signs.iter().map(Sign::value).collect()
    }

    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// True when every component is 0
    pub fn is_neutral(&self) -> bool {
        self.signs.iter().all(|s| *s == Sign::Neutral)
    }
}

impl std::fmt::Display for TernaryVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.signs.iter().map(|s| s.value().to_string()).collect();
        write!(f, "[{}]", values.join(","))
    }
}
