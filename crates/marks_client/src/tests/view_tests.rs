use async_trait::async_trait;
use shared::protocol::{InternalMarkRecord, StudentRecord};
use tokio::sync::Mutex;

use super::*;
use crate::{FieldIndicator, FieldValue, MissingPersistenceClient, PersistFailure, SaveStatus};

struct StaticLoader {
    response: Result<ViewSnapshot, LoadFailure>,
}

#[async_trait]
impl ViewLoader for StaticLoader {
    async fn fetch_view(
        &self,
        _course_id: &CourseId,
        _subject_code: &SubjectCode,
    ) -> Result<ViewSnapshot, LoadFailure> {
        self.response.clone()
    }
}

#[derive(Default)]
struct CapturingPersistence {
    contexts: Mutex<Vec<PersistContext>>,
}

#[async_trait]
impl PersistenceClient for CapturingPersistence {
    async fn persist(
        &self,
        _student_id: &StudentId,
        _mark: Mark,
        context: &PersistContext,
    ) -> Result<(), PersistFailure> {
        self.contexts.lock().await.push(context.clone());
        Ok(())
    }
}

fn student(id: &str, enrollment_no: &str, mark: Option<f64>) -> StudentRecord {
    StudentRecord {
        id: StudentId::new(id),
        name: format!("Student {id}"),
        enrollment_no: enrollment_no.into(),
        internal_mark: mark.map(|value| InternalMarkRecord {
            internal_marks: Some(value),
        }),
    }
}

fn snapshot(students: Vec<StudentRecord>, has_external_exam: Option<bool>) -> ViewSnapshot {
    ViewSnapshot {
        course: CourseSummary {
            course_name: "Bachelor of Science".into(),
            course_code: "BSC".into(),
        },
        subject: SubjectSummary {
            subject_name: Some("Physics".into()),
            subject_code: SubjectCode::new("PHY101"),
            has_external_exam,
        },
        students,
    }
}

async fn load(loader: StaticLoader, persistence: Arc<dyn PersistenceClient>) -> Result<EvaluationView, LoadFailure> {
    EvaluationView::load(
        &loader,
        persistence,
        &CourseId::new("course-1"),
        &SubjectCode::new("PHY101"),
        AutosaveSettings::default(),
    )
    .await
}

#[tokio::test]
async fn load_builds_roster_and_seeds_existing_marks() {
    let loader = StaticLoader {
        response: Ok(snapshot(
            vec![
                student("a", "EN001", Some(24.0)),
                student("b", "EN002", None),
                student("c", "EN003", Some(45.0)),
                student("a", "EN001", None),
            ],
            None,
        )),
    };
    let view = load(loader, Arc::new(MissingPersistenceClient))
        .await
        .expect("view");

    assert_eq!(view.scale(), MarkScale::Internal);
    assert_eq!(view.title(), "Physics (PHY101)");
    assert_eq!(view.course().course_code, "BSC");
    let serials: Vec<_> = view.roster().iter().map(|entry| entry.serial).collect();
    assert_eq!(serials, vec![1, 2, 3]);

    let controller = view.controller();
    let a = StudentId::new("a");
    assert_eq!(
        controller.value(&a).await,
        Some(FieldValue::Numeric(Mark::new(24.0, MarkScale::Internal).expect("mark")))
    );
    let c = controller
        .snapshot(&StudentId::new("c"))
        .await
        .expect("snapshot");
    assert_eq!(c.value, FieldValue::Unset);
    assert_eq!(c.persisted, None);
    assert_eq!(c.indicator, FieldIndicator::Blank);
}

#[tokio::test]
async fn final_scale_accepts_marks_up_to_one_hundred() {
    let loader = StaticLoader {
        response: Ok(snapshot(vec![student("a", "EN001", Some(88.0))], Some(false))),
    };
    let view = load(loader, Arc::new(MissingPersistenceClient))
        .await
        .expect("view");

    assert_eq!(view.scale(), MarkScale::Final);
    assert!(view.instructions().starts_with("Enter final marks (0-100)"));
    assert!(view.instructions().ends_with("saved after 2 seconds."));
    assert_eq!(
        view.controller().persisted(&StudentId::new("a")).await,
        Mark::new(88.0, MarkScale::Final)
    );
}

#[tokio::test]
async fn empty_roster_blocks_the_view() {
    let loader = StaticLoader {
        response: Ok(snapshot(Vec::new(), None)),
    };
    let err = load(loader, Arc::new(MissingPersistenceClient))
        .await
        .err()
        .expect("empty roster");

    assert_eq!(err, LoadFailure::EmptyRoster);
    assert!(err.user_message().starts_with("No students found for this subject."));
}

#[tokio::test]
async fn loader_failure_is_returned_unchanged() {
    let loader = StaticLoader {
        response: Err(LoadFailure::Forbidden),
    };
    let err = load(loader, Arc::new(MissingPersistenceClient))
        .await
        .err()
        .expect("forbidden");

    assert_eq!(err, LoadFailure::Forbidden);
    assert_eq!(
        err.user_message(),
        "Access denied: You do not have permission to evaluate this subject."
    );
}

#[tokio::test]
async fn students_can_be_found_by_enrollment_or_id() {
    let loader = StaticLoader {
        response: Ok(snapshot(
            vec![student("a", "EN001", None), student("b", "EN002", None)],
            None,
        )),
    };
    let view = load(loader, Arc::new(MissingPersistenceClient))
        .await
        .expect("view");

    assert_eq!(
        view.find_student("EN002").map(|entry| entry.student_id.clone()),
        Some(StudentId::new("b"))
    );
    assert_eq!(
        view.find_student("a").map(|entry| entry.enrollment_no.clone()),
        Some("EN001".to_string())
    );
    assert!(view.find_student("nobody").is_none());
}

#[tokio::test(start_paused = true)]
async fn writes_carry_the_view_context() {
    let persistence = Arc::new(CapturingPersistence::default());
    let loader = StaticLoader {
        response: Ok(snapshot(vec![student("a", "EN001", None)], None)),
    };
    let view = load(loader, persistence.clone()).await.expect("view");

    let a = StudentId::new("a");
    view.controller()
        .handle_input(&a, "19")
        .await
        .expect("edit");
    view.controller().wait_settled().await;

    assert_eq!(view.controller().status(&a).await, Some(SaveStatus::Saved));
    let contexts = persistence.contexts.lock().await.clone();
    assert_eq!(
        contexts,
        vec![PersistContext {
            course_id: CourseId::new("course-1"),
            subject_code: SubjectCode::new("PHY101"),
            subject_name: "Physics".into(),
        }]
    );
}
