use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, StudentId, SubjectCode};

pub const UNKNOWN_SUBJECT_NAME: &str = "Unknown Subject";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub course_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    pub subject_code: SubjectCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_external_exam: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalMarkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_marks: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(rename = "_id")]
    pub id: StudentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enrollment_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_mark: Option<InternalMarkRecord>,
}

impl StudentRecord {
    pub fn existing_mark(&self) -> Option<f64> {
        self.internal_mark
            .as_ref()
            .and_then(|record| record.internal_marks)
    }
}

/// Body of `GET /evaluators/students/{courseId}/{subjectCode}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsViewResponse {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    pub course: CourseSummary,
    pub subject: SubjectSummary,
}

/// Body of `POST /evaluators/internal-marks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInternalMarkRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub subject_code: SubjectCode,
    pub subject_name: String,
    pub internal_marks: f64,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
