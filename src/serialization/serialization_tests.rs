use super::*;

fn unit_carriers(classes: usize, dim: usize) -> Matrix<f32> {
    // Standard basis rows: trivially unit norm.
    let mut m = Matrix::zeros(classes, dim);
    for c in 0..classes {
        m.set(c, c % dim, 1.0);
    }
    m
}

#[test]
fn test_carrier_set_accessors() {
    let set = CarrierSet::new(unit_carriers(10, 512)).expect("basis rows are unit vectors");
    assert_eq!(set.num_classes(), 10);
    assert_eq!(set.dim(), 512);
}

#[test]
fn test_carrier_set_rejects_non_unit_rows() {
    let mut m = unit_carriers(3, 8);
    m.set(1, 1, 2.0);
    let err = CarrierSet::new(m).expect_err("norm 2 row must be rejected");
    assert!(matches!(err, TrazadorError::FormatError { .. }));
}

#[test]
fn test_carrier_set_rejects_zero_row() {
    let mut m = unit_carriers(3, 8);
    m.set(2, 2, 0.0);
    let err = CarrierSet::new(m).expect_err("zero row must be rejected");
    assert!(matches!(err, TrazadorError::ZeroNorm { .. }));
}

#[test]
fn test_carrier_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("carriers.st");

    let set = CarrierSet::new(unit_carriers(4, 16)).expect("unit rows");
    set.save(&path).expect("write succeeds");

    let loaded = CarrierSet::load(&path).expect("read succeeds");
    assert_eq!(loaded.carriers(), set.carriers());
}

#[test]
fn test_checkpoint_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("checkpoint.st");

    let checkpoint = Checkpoint {
        fc_weight: Matrix::from_vec(2, 3, vec![0.1_f32, -0.2, 0.3, 0.4, -0.5, 0.6])
            .expect("2*3=6 elements"),
        epoch: 59,
        test_accuracy: 0.9173,
    };
    checkpoint.save(&path).expect("write succeeds");

    let loaded = Checkpoint::load(&path).expect("read succeeds");
    assert_eq!(loaded.fc_weight, checkpoint.fc_weight);
    assert_eq!(loaded.epoch, 59);
    assert!((loaded.test_accuracy - 0.9173).abs() < 1e-6);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = CarrierSet::load(&dir.path().join("nope.st")).expect_err("file does not exist");
    assert!(matches!(err, TrazadorError::Io(_)));
}

#[test]
fn test_missing_tensor_is_format_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("empty.st");
    TensorFile::new().save(&path).expect("write succeeds");

    let err = CarrierSet::load(&path).expect_err("no 'carriers' tensor");
    assert!(matches!(err, TrazadorError::FormatError { .. }));
}

#[test]
fn test_corrupt_file_is_format_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("garbage.st");
    std::fs::write(&path, b"not a tensor file").expect("write succeeds");

    let err = TensorFile::load(&path).expect_err("garbage must be rejected");
    assert!(matches!(err, TrazadorError::FormatError { .. }));
}

#[test]
fn test_truncated_file_is_format_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("short.st");
    std::fs::write(&path, [1u8, 2, 3]).expect("write succeeds");

    assert!(TensorFile::load(&path).is_err());
}

#[test]
fn test_multiple_tensors_with_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("multi.st");

    let mut file = TensorFile::new();
    file.add_matrix("a", &Matrix::zeros(2, 2));
    file.add_matrix("b", &unit_carriers(3, 3));
    file.set_metadata("epoch", "7".to_string());
    file.save(&path).expect("write succeeds");

    let loaded = TensorFile::load(&path).expect("read succeeds");
    assert_eq!(loaded.matrix("a").expect("tensor a present"), Matrix::zeros(2, 2));
    assert_eq!(
        loaded.matrix("b").expect("tensor b present"),
        unit_carriers(3, 3)
    );
    assert_eq!(loaded.metadata("epoch"), Some("7"));
}
