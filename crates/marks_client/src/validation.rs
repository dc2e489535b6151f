use shared::domain::{Mark, MarkScale};

use crate::field::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    Accepted(FieldValue),
    Rejected,
}

impl Validation {
    pub fn accepted(self) -> Option<FieldValue> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected => None,
        }
    }
}

/// Gate applied to every raw keystroke before it may touch the store.
///
/// Out-of-range input is rejected outright rather than clamped.
pub fn validate(raw: &str, scale: MarkScale) -> Validation {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Validation::Accepted(FieldValue::Empty);
    }

    let Ok(parsed) = trimmed.parse::<f64>() else {
        return Validation::Rejected;
    };

    match Mark::new(parsed, scale) {
        Some(mark) => Validation::Accepted(FieldValue::Numeric(mark)),
        None => Validation::Rejected,
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
