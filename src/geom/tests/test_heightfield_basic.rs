use crate::geom::{HeightField, HeightFieldError};

fn ramp() -> HeightField {
    HeightField::from_rows(
        vec![0.0, 1.0, 2.0],
        vec![0.0, 1.0],
        &[vec![100.0, 110.0, 120.0], vec![130.0, 140.0, 150.0]],
    )
    .unwrap()
}

#[test]
fn rows_are_stored_row_major() {
    let field = ramp();
    assert_eq!(field.width(), 3);
    assert_eq!(field.height(), 2);
    assert_eq!(field.at(0, 2), Some(120.0));
    assert_eq!(field.at(1, 0), Some(130.0));
    assert_eq!(field.at(2, 0), None);
    assert_eq!(field.at(0, 3), None);
    assert_eq!(field.min_elevation(), 100.0);
    assert_eq!(field.max_elevation(), 150.0);
    assert_eq!(field.elevation_range(), 50.0);
}

#[test]
fn normalization_spans_zero_to_scale() {
    let heights = ramp().normalized(20.0);
    assert_eq!(heights.len(), 6);
    assert_eq!(heights[0], 0.0);
    assert_eq!(heights[5], 20.0);
    assert!((heights[2] - 8.0).abs() < 1e-12);
    assert!(heights.iter().all(|z| (0.0..=20.0).contains(z)));
}

#[test]
fn flat_field_normalizes_to_zero() {
    let field =
        HeightField::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![7.5; 4]).expect("flat field");
    assert_eq!(field.elevation_range(), 0.0);
    assert_eq!(field.normalized(20.0), vec![0.0; 4]);
}

#[test]
fn malformed_fields_are_rejected() {
    assert_eq!(
        HeightField::new(Vec::new(), vec![0.0], Vec::new()),
        Err(HeightFieldError::EmptyAxis)
    );
    assert_eq!(
        HeightField::new(vec![0.0, 1.0], vec![0.0], vec![1.0]),
        Err(HeightFieldError::ShapeMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        HeightField::new(vec![1.0, 0.0], vec![0.0], vec![1.0, 2.0]),
        Err(HeightFieldError::AxisNotIncreasing { axis: 'x' })
    );
    assert_eq!(
        HeightField::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0, f64::NAN, 4.0]),
        Err(HeightFieldError::NonFiniteElevation { row: 1, col: 0 })
    );
    assert!(matches!(
        HeightField::from_rows(vec![0.0, 1.0], vec![0.0], &[vec![1.0]]),
        Err(HeightFieldError::ShapeMismatch { .. })
    ));
}

#[test]
fn normalization_handles_spans_wider_than_f64_max() {
    let field = HeightField::new(vec![0.0, 1.0, 2.0], vec![0.0], vec![-f64::MAX, 0.0, f64::MAX])
        .unwrap();
    let heights = field.normalized(4.0);
    assert_eq!(heights, vec![0.0, 2.0, 4.0]);
}
