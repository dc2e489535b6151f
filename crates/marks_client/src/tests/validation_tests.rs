use super::*;

fn numeric(value: f64, scale: MarkScale) -> Validation {
    Validation::Accepted(FieldValue::Numeric(Mark::new(value, scale).expect("mark")))
}

#[test]
fn upper_bound_is_inclusive() {
    assert_eq!(validate("31", MarkScale::Internal), Validation::Rejected);
    assert_eq!(validate("30", MarkScale::Internal), numeric(30.0, MarkScale::Internal));
    assert_eq!(validate("100", MarkScale::Final), numeric(100.0, MarkScale::Final));
    assert_eq!(validate("100.5", MarkScale::Final), Validation::Rejected);
}

#[test]
fn empty_input_is_accepted_as_empty() {
    assert_eq!(
        validate("", MarkScale::Internal),
        Validation::Accepted(FieldValue::Empty)
    );
    assert_eq!(
        validate("   ", MarkScale::Final),
        Validation::Accepted(FieldValue::Empty)
    );
}

#[test]
fn negative_and_garbage_input_is_rejected() {
    assert_eq!(validate("-1", MarkScale::Final), Validation::Rejected);
    assert_eq!(validate("abc", MarkScale::Final), Validation::Rejected);
    assert_eq!(validate("12abc", MarkScale::Final), Validation::Rejected);
    assert_eq!(validate("NaN", MarkScale::Final), Validation::Rejected);
    assert_eq!(validate("inf", MarkScale::Final), Validation::Rejected);
}

#[test]
fn fractional_marks_are_allowed() {
    assert_eq!(validate("12.5", MarkScale::Internal), numeric(12.5, MarkScale::Internal));
    assert_eq!(validate(" 0 ", MarkScale::Internal), numeric(0.0, MarkScale::Internal));
}
