use super::*;

fn indexed_dataset(n_samples: usize) -> (Array2<f64>, Array1<usize>) {
    // Row i holds (i, 10 * i) so rows can be traced back after shuffling
    let x = Array2::from_shape_fn((n_samples, 2), |(i, j)| (i * (1 + 9 * j)) as f64);
    let y = Array1::from_shape_fn(n_samples, |i| i % 3);
    (x, y)
}

#[test]
fn test_split_xy_partitions_rows() {
    let (x, y) = indexed_dataset(10);
    let mut rng = StdRng::seed_from_u64(42);

    let splits = split_xy(&x, &y, &[0.5, 0.5], &mut rng).unwrap();

    assert_eq!(splits.len(), 2);
    assert_eq!(splits[0].0.nrows(), 5);
    assert_eq!(splits[1].0.nrows(), 5);

    let mut seen: Vec<usize> = splits
        .iter()
        .flat_map(|(part_x, _)| part_x.column(0).iter().map(|&v| v as usize).collect::<Vec<_>>())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());

    // Features and labels stay paired
    for (part_x, part_y) in &splits {
        assert_eq!(part_x.nrows(), part_y.len());
        for (row, &label) in part_x.axis_iter(Axis(0)).zip(part_y.iter()) {
            let original = row[0] as usize;
            assert_eq!(row[1], 10.0 * row[0]);
            assert_eq!(label, original % 3);
        }
    }
}

#[test]
fn test_split_xy_is_reproducible_with_seed() {
    let (x, y) = indexed_dataset(20);

    let first = split_xy(&x, &y, &[0.8, 0.2], &mut StdRng::seed_from_u64(7)).unwrap();
    let second = split_xy(&x, &y, &[0.8, 0.2], &mut StdRng::seed_from_u64(7)).unwrap();

    for ((x1, y1), (x2, y2)) in first.iter().zip(second.iter()) {
        assert_eq!(x1, x2);
        assert_eq!(y1, y2);
    }
}

#[test]
fn test_split_xy_remainder_goes_to_last_part() {
    let (x, y) = indexed_dataset(10);
    let mut rng = StdRng::seed_from_u64(0);

    let splits = split_xy(&x, &y, &[0.33, 0.33, 0.34], &mut rng).unwrap();
    let sizes: Vec<usize> = splits.iter().map(|(part_x, _)| part_x.nrows()).collect();

    assert_eq!(sizes, vec![3, 3, 4]);
}

#[test]
fn test_split_xy_allows_empty_parts() {
    let (x, y) = indexed_dataset(3);
    let mut rng = StdRng::seed_from_u64(1);

    let splits = split_xy(&x, &y, &[1.0, 0.0], &mut rng).unwrap();

    assert_eq!(splits[0].0.nrows(), 3);
    assert_eq!(splits[1].0.dim(), (0, 2));
    assert!(splits[1].1.is_empty());
}

#[test]
fn test_split_xy_errors() {
    let (x, y) = indexed_dataset(10);
    let mut rng = StdRng::seed_from_u64(3);

    let empty_x = Array2::<f64>::zeros((0, 2));
    let empty_y = Array1::<usize>::zeros(0);
    assert!(matches!(
        split_xy(&empty_x, &empty_y, &[0.5, 0.5], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));

    assert!(matches!(
        split_xy(&x, &y.slice(s![..9]).to_owned(), &[0.5, 0.5], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        split_xy(&x, &y, &[], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        split_xy(&x, &y, &[0.5, -0.1], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        split_xy(&x, &y, &[f64::NAN], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        split_xy(&x, &y, &[0.7, 0.7], &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
}
