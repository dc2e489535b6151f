use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(StudentId);
id_newtype!(CourseId);
id_newtype!(SubjectCode);

/// Marking scale of an evaluation view, fixed once the view has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkScale {
    /// Internal component of a subject that also has an external exam (0-30).
    Internal,
    /// Whole mark of a subject without an external exam (0-100).
    Final,
}

impl MarkScale {
    /// Subjects default to having an external exam when the flag is absent.
    pub fn from_external_exam(has_external_exam: Option<bool>) -> Self {
        if has_external_exam == Some(false) {
            Self::Final
        } else {
            Self::Internal
        }
    }

    pub fn max(self) -> f64 {
        match self {
            Self::Internal => 30.0,
            Self::Final => 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "Internal Marks",
            Self::Final => "Final Marks",
        }
    }
}

/// A mark that is known to lie within `[0, scale.max()]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Mark(f64);

impl Mark {
    pub fn new(value: f64, scale: MarkScale) -> Option<Self> {
        if value.is_finite() && (0.0..=scale.max()).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
