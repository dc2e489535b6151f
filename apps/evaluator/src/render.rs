use marks_client::{EvaluationView, FieldIndicator, FieldSnapshot, FieldValue, RosterEntry};
use shared::domain::MarkScale;

pub fn header(view: &EvaluationView) -> String {
    let course = view.course();
    let mut out = format!(
        "{}\nCourse: {} ({})\n{}\n",
        view.title(),
        course.course_name,
        course.course_code,
        view.instructions()
    );
    if view.scale() == MarkScale::Final {
        out.push_str("No External Exam\n");
    }
    out.push_str(&format!(
        "{} ({} students)",
        students_heading(view.scale()),
        view.roster().len()
    ));
    out
}

fn students_heading(scale: MarkScale) -> &'static str {
    match scale {
        MarkScale::Internal => "Students Internal Marks",
        MarkScale::Final => "Students Final Marks",
    }
}

fn value_cell(value: FieldValue) -> String {
    match value {
        FieldValue::Numeric(mark) => mark.to_string(),
        FieldValue::Unset | FieldValue::Empty => "-".to_string(),
    }
}

pub fn row(entry: &RosterEntry, snapshot: &FieldSnapshot, scale: MarkScale) -> String {
    let status = match (snapshot.indicator, snapshot.last_error.as_deref()) {
        (FieldIndicator::Error, Some(message)) => format!("Error saving ({message})"),
        (FieldIndicator::Persisted, _) => "Saved earlier".to_string(),
        (indicator, _) => indicator.label().to_string(),
    };
    format!(
        "{:>4}  {:<14}  {:<24}  {:>6} / {:<3}  {}",
        entry.serial,
        entry.enrollment_no,
        entry.name,
        value_cell(snapshot.value),
        scale.max(),
        status
    )
    .trim_end()
    .to_string()
}

pub async fn grid(view: &EvaluationView) -> String {
    let snapshots = view.controller().snapshots().await;
    let mut lines = vec![format!(
        "{:>4}  {:<14}  {:<24}  {:>12}  {}",
        "S.No",
        "Enrollment",
        "Student Name",
        format!("{} (0-{})", view.scale().label(), view.scale().max()),
        "Status"
    )];
    for entry in view.roster() {
        if let Some(snapshot) = snapshots
            .iter()
            .find(|snapshot| snapshot.student_id == entry.student_id)
        {
            lines.push(row(entry, snapshot, view.scale()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use marks_client::SaveStatus;
    use shared::domain::{Mark, StudentId};

    use super::*;

    fn entry() -> RosterEntry {
        RosterEntry {
            serial: 3,
            student_id: StudentId::new("s-3"),
            enrollment_no: "EN003".into(),
            name: "Meera".into(),
        }
    }

    fn snapshot(value: FieldValue, indicator: FieldIndicator, last_error: Option<&str>) -> FieldSnapshot {
        FieldSnapshot {
            student_id: StudentId::new("s-3"),
            value,
            persisted: None,
            status: SaveStatus::Idle,
            indicator,
            last_error: last_error.map(str::to_string),
            last_saved_at: None,
        }
    }

    #[test]
    fn row_shows_mark_and_ready_label() {
        let mark = Mark::new(25.0, MarkScale::Internal).expect("mark");
        let line = row(
            &entry(),
            &snapshot(FieldValue::Numeric(mark), FieldIndicator::Ready, None),
            MarkScale::Internal,
        );
        assert!(line.contains("EN003"));
        assert!(line.contains("25 / 30"));
        assert!(line.ends_with("Ready"));
    }

    #[test]
    fn row_includes_error_message() {
        let line = row(
            &entry(),
            &snapshot(
                FieldValue::Empty,
                FieldIndicator::Error,
                Some("Failed to save marks for student"),
            ),
            MarkScale::Final,
        );
        assert!(line.contains("- / 100"));
        assert!(line.ends_with("Error saving (Failed to save marks for student)"));
    }

    #[test]
    fn blank_row_has_no_trailing_status() {
        let line = row(
            &entry(),
            &snapshot(FieldValue::Unset, FieldIndicator::Blank, None),
            MarkScale::Internal,
        );
        assert!(line.ends_with("/ 30"));
    }
}
