use shared::protocol::{InternalMarkRecord, UNKNOWN_SUBJECT_NAME};

use super::*;

fn student(id: &str, mark: Option<f64>) -> StudentRecord {
    StudentRecord {
        id: StudentId::new(id),
        name: format!("student {id}"),
        enrollment_no: format!("EN-{id}"),
        internal_mark: mark.map(|value| InternalMarkRecord {
            internal_marks: Some(value),
        }),
    }
}

fn snapshot(has_external_exam: Option<bool>) -> ViewSnapshot {
    ViewSnapshot {
        course: CourseSummary {
            course_name: "Bachelor of Science".into(),
            course_code: "BSC".into(),
        },
        subject: SubjectSummary {
            subject_name: None,
            subject_code: SubjectCode::new("PHY101"),
            has_external_exam,
        },
        students: vec![student("a", Some(12.0)), student("b", None)],
    }
}

#[test]
fn default_settings_match_autosave_windows() {
    let settings = AutosaveSettings::default();
    assert_eq!(settings.debounce_window, Duration::from_millis(2000));
    assert_eq!(settings.saved_display_window, Duration::from_millis(3000));
}

#[test]
fn snapshot_scale_follows_external_exam_flag() {
    assert_eq!(snapshot(None).scale(), MarkScale::Internal);
    assert_eq!(snapshot(Some(false)).scale(), MarkScale::Final);
}

#[test]
fn existing_marks_skip_students_without_records() {
    let view = snapshot(None);
    let marks: Vec<_> = view
        .existing_marks()
        .map(|(id, mark)| (id.as_str().to_string(), mark))
        .collect();
    assert_eq!(marks, vec![("a".to_string(), 12.0)]);
}

#[tokio::test]
async fn missing_persistence_client_always_fails() {
    let context = PersistContext {
        course_id: CourseId::new("c"),
        subject_code: SubjectCode::new("s"),
        subject_name: UNKNOWN_SUBJECT_NAME.into(),
    };
    let mark = Mark::new(1.0, MarkScale::Internal).expect("mark");
    let err = MissingPersistenceClient
        .persist(&StudentId::new("a"), mark, &context)
        .await
        .expect_err("unavailable");
    assert!(matches!(err, PersistFailure::Network(_)));
    assert_eq!(err.user_message(), "Failed to save marks for student");
}
