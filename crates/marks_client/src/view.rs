use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{CourseId, Mark, MarkScale, StudentId, SubjectCode},
    protocol::{CourseSummary, SubjectSummary, UNKNOWN_SUBJECT_NAME},
};
use tracing::{info, warn};

use crate::{
    AutosaveController, AutosaveSettings, LoadFailure, PersistContext, PersistenceClient,
    ViewLoader, ViewSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// 1-based row number.
    pub serial: usize,
    pub student_id: StudentId,
    pub enrollment_no: String,
    pub name: String,
}

/// A loaded marks-evaluation view: headers, roster and the autosave controller.
pub struct EvaluationView {
    course: CourseSummary,
    subject: SubjectSummary,
    scale: MarkScale,
    settings: AutosaveSettings,
    roster: Vec<RosterEntry>,
    controller: Arc<AutosaveController>,
}

impl EvaluationView {
    /// Fetches the view once. Any failure blocks the whole grid; retrying is a reload.
    pub async fn load(
        loader: &dyn ViewLoader,
        persistence: Arc<dyn PersistenceClient>,
        course_id: &CourseId,
        subject_code: &SubjectCode,
        settings: AutosaveSettings,
    ) -> Result<Self, LoadFailure> {
        info!(course_id = %course_id, subject_code = %subject_code, "view: loading evaluation data");
        let snapshot = loader
            .fetch_view(course_id, subject_code)
            .await
            .map_err(|err| {
                warn!(course_id = %course_id, subject_code = %subject_code, error = %err, "view: load failed");
                err
            })?;
        Self::from_snapshot(snapshot, persistence, course_id, subject_code, settings)
    }

    pub fn from_snapshot(
        snapshot: ViewSnapshot,
        persistence: Arc<dyn PersistenceClient>,
        course_id: &CourseId,
        subject_code: &SubjectCode,
        settings: AutosaveSettings,
    ) -> Result<Self, LoadFailure> {
        if snapshot.students.is_empty() {
            warn!(course_id = %course_id, subject_code = %subject_code, "view: no students enrolled");
            return Err(LoadFailure::EmptyRoster);
        }

        let scale = snapshot.scale();
        let context = PersistContext {
            course_id: course_id.clone(),
            subject_code: subject_code.clone(),
            subject_name: snapshot
                .subject
                .subject_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_SUBJECT_NAME.to_string()),
        };

        let mut roster = Vec::with_capacity(snapshot.students.len());
        let mut initial = Vec::with_capacity(snapshot.students.len());
        let mut seen = HashSet::new();
        for student in &snapshot.students {
            if !seen.insert(&student.id) {
                warn!(student_id = %student.id, "view: duplicate student in snapshot ignored");
                continue;
            }
            let existing = student.existing_mark().and_then(|raw| {
                let mark = Mark::new(raw, scale);
                if mark.is_none() {
                    warn!(
                        student_id = %student.id,
                        raw,
                        max = scale.max(),
                        "view: existing mark outside scale ignored"
                    );
                }
                mark
            });
            roster.push(RosterEntry {
                serial: roster.len() + 1,
                student_id: student.id.clone(),
                enrollment_no: student.enrollment_no.clone(),
                name: student.name.clone(),
            });
            initial.push((student.id.clone(), existing));
        }

        let controller = AutosaveController::new(persistence, context, scale, settings, initial);

        info!(
            course_id = %course_id,
            subject_code = %subject_code,
            students = roster.len(),
            max = scale.max(),
            "view: evaluation data loaded"
        );
        Ok(Self {
            course: snapshot.course,
            subject: snapshot.subject,
            scale,
            settings,
            roster,
            controller,
        })
    }

    pub fn course(&self) -> &CourseSummary {
        &self.course
    }

    pub fn subject(&self) -> &SubjectSummary {
        &self.subject
    }

    pub fn scale(&self) -> MarkScale {
        self.scale
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn controller(&self) -> &Arc<AutosaveController> {
        &self.controller
    }

    /// Looks a student up by enrollment number or id.
    pub fn find_student(&self, needle: &str) -> Option<&RosterEntry> {
        self.roster
            .iter()
            .find(|entry| entry.enrollment_no == needle)
            .or_else(|| {
                self.roster
                    .iter()
                    .find(|entry| entry.student_id.as_str() == needle)
            })
    }

    pub fn title(&self) -> String {
        format!(
            "{} ({})",
            self.subject.subject_name.as_deref().unwrap_or(UNKNOWN_SUBJECT_NAME),
            self.subject.subject_code
        )
    }

    pub fn instructions(&self) -> String {
        let seconds = self.settings.debounce_window.as_secs_f64();
        match self.scale {
            MarkScale::Internal => format!(
                "Enter internal marks (0-30) for students. External marks (70) + Internal marks (30) = Total (100). Changes are automatically saved after {seconds} seconds."
            ),
            MarkScale::Final => format!(
                "Enter final marks (0-100) for students. This subject has no external exam. Changes are automatically saved after {seconds} seconds."
            ),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
