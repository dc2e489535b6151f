use super::*;

#[test]
fn missing_external_exam_flag_means_internal_scale() {
    assert_eq!(MarkScale::from_external_exam(None), MarkScale::Internal);
    assert_eq!(MarkScale::from_external_exam(Some(true)), MarkScale::Internal);
    assert_eq!(MarkScale::from_external_exam(Some(false)), MarkScale::Final);
}

#[test]
fn mark_bounds_follow_scale() {
    assert!(Mark::new(30.0, MarkScale::Internal).is_some());
    assert!(Mark::new(30.5, MarkScale::Internal).is_none());
    assert!(Mark::new(100.0, MarkScale::Final).is_some());
    assert!(Mark::new(-0.5, MarkScale::Final).is_none());
    assert!(Mark::new(f64::NAN, MarkScale::Final).is_none());
}

#[test]
fn whole_marks_display_without_fraction() {
    let mark = Mark::new(25.0, MarkScale::Internal).expect("mark");
    assert_eq!(mark.to_string(), "25");
    let mark = Mark::new(12.5, MarkScale::Internal).expect("mark");
    assert_eq!(mark.to_string(), "12.5");
}
