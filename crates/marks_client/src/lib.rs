use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::{CourseId, Mark, MarkScale, StudentId, SubjectCode},
    protocol::{CourseSummary, StudentRecord, StudentsViewResponse, SubjectSummary},
};

pub mod controller;
pub mod error;
pub mod field;
mod http;
mod reconcile;
mod scheduler;
pub mod validation;
pub mod view;

pub use controller::{AutosaveController, AutosaveEvent, EditOutcome};
pub use error::{EditError, LoadFailure, PersistFailure};
pub use field::{FieldIndicator, FieldSnapshot, FieldValue, SaveStatus};
pub use http::HttpMarksClient;
pub use scheduler::DebounceScheduler;
pub use validation::{validate, Validation};
pub use view::{EvaluationView, RosterEntry};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(2000);
pub const DEFAULT_SAVED_DISPLAY_WINDOW: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    /// Quiet period after the last keystroke before a field is written.
    pub debounce_window: Duration,
    /// How long `Saved` stays on display before falling back to idle.
    pub saved_display_window: Duration,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            saved_display_window: DEFAULT_SAVED_DISPLAY_WINDOW,
        }
    }
}

/// Fixed per-view data sent along with every mark write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistContext {
    pub course_id: CourseId,
    pub subject_code: SubjectCode,
    pub subject_name: String,
}

/// Initial data for an evaluation view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub course: CourseSummary,
    pub subject: SubjectSummary,
    pub students: Vec<StudentRecord>,
}

impl ViewSnapshot {
    pub fn scale(&self) -> MarkScale {
        MarkScale::from_external_exam(self.subject.has_external_exam)
    }

    pub fn existing_marks(&self) -> impl Iterator<Item = (&StudentId, f64)> + '_ {
        self.students
            .iter()
            .filter_map(|student| student.existing_mark().map(|mark| (&student.id, mark)))
    }
}

impl From<StudentsViewResponse> for ViewSnapshot {
    fn from(value: StudentsViewResponse) -> Self {
        Self {
            course: value.course,
            subject: value.subject,
            students: value.students,
        }
    }
}

#[async_trait]
pub trait ViewLoader: Send + Sync {
    async fn fetch_view(
        &self,
        course_id: &CourseId,
        subject_code: &SubjectCode,
    ) -> Result<ViewSnapshot, LoadFailure>;
}

/// Remote write for a single student's mark. May fail, and completions may
/// arrive in any order.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn persist(
        &self,
        student_id: &StudentId,
        mark: Mark,
        context: &PersistContext,
    ) -> Result<(), PersistFailure>;
}

pub struct MissingPersistenceClient;

#[async_trait]
impl PersistenceClient for MissingPersistenceClient {
    async fn persist(
        &self,
        student_id: &StudentId,
        _mark: Mark,
        _context: &PersistContext,
    ) -> Result<(), PersistFailure> {
        Err(PersistFailure::Network(format!(
            "marks persistence is unavailable for student {student_id}"
        )))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
