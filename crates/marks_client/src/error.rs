use shared::domain::StudentId;
use thiserror::Error;

const LOAD_SERVER_FALLBACK: &str = "Failed to load students data";

/// Why the evaluation view could not be loaded. Blocks the whole grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("access to the evaluation view was denied")]
    Forbidden,
    #[error("course or subject not found")]
    NotFound,
    #[error("server rejected the view request (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("could not reach the marks server: {0}")]
    Network(String),
    #[error("no students are enrolled for this subject")]
    EmptyRoster,
}

impl LoadFailure {
    /// Text shown in the blocking banner that replaces the grid.
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden => {
                "Access denied: You do not have permission to evaluate this subject.".to_string()
            }
            Self::NotFound => "Course or subject not found. Please check the URL.".to_string(),
            Self::Server { message, .. } => format!(
                "Server error: {}",
                message.as_deref().unwrap_or(LOAD_SERVER_FALLBACK)
            ),
            Self::Network(_) => "Network error: Could not connect to server.".to_string(),
            Self::EmptyRoster => "No students found for this subject. Please contact admin to check course enrollment.".to_string(),
        }
    }
}

/// Why a single mark write did not persist. Local to one student.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistFailure {
    #[error("save rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("save request failed: {0}")]
    Network(String),
}

impl PersistFailure {
    /// Inline text shown next to the failed field.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => format!("Failed to save marks: {message}"),
            Self::Rejected { status: 500, .. } => {
                "Server error while saving marks. Please try again.".to_string()
            }
            _ => "Failed to save marks for student".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("student {0} is not part of this evaluation view")]
    UnknownStudent(StudentId),
}
