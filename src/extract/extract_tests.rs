use super::*;
use crate::dataset::InMemoryDataset;
use crate::network::LinearNetwork;

/// Batch source with an arbitrary declared count, for exercising the
/// total-count assertion.
struct VecSource {
    declared: usize,
    batches: Vec<Batch>,
}

impl BatchSource for VecSource {
    fn num_samples(&self) -> usize {
        self.declared
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_> {
        Box::new(self.batches.iter().cloned())
    }
}

fn counting_matrix(n: usize, d: usize) -> Matrix<f32> {
    let data: Vec<f32> = (0..n * d).map(|i| i as f32).collect();
    Matrix::from_vec(n, d, data).expect("n*d elements")
}

#[test]
fn test_extracts_all_rows_in_order() {
    let samples = counting_matrix(7, 3);
    let dataset = InMemoryDataset::new(samples.clone()).with_batch_size(2);
    let net = LinearNetwork::new(Matrix::eye(3));

    let extraction = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect("counts match");

    // Identity network: features must equal the inputs row for row.
    assert_eq!(extraction.features, samples);
    assert!(extraction.labels.is_none());
}

#[test]
fn test_feature_dim_discovered_from_first_batch() {
    let dataset = InMemoryDataset::new(counting_matrix(5, 4)).with_batch_size(3);
    let net = LinearNetwork::new(Matrix::zeros(2, 4));

    let extraction = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect("counts match");

    assert_eq!(extraction.features.shape(), (5, 2));
}

#[test]
fn test_labels_collected() {
    let dataset = InMemoryDataset::new(counting_matrix(4, 2))
        .with_labels(vec![3, 1, 4, 1])
        .with_batch_size(3);
    let net = LinearNetwork::new(Matrix::eye(2));

    let extraction = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect("counts match");

    assert_eq!(extraction.labels, Some(vec![3, 1, 4, 1]));
}

#[test]
fn test_undersupply_is_fatal() {
    // Declared 5 samples, supplied 4.
    let source = VecSource {
        declared: 5,
        batches: vec![Batch {
            images: counting_matrix(4, 2),
            labels: None,
        }],
    };
    let net = LinearNetwork::new(Matrix::eye(2));

    let err = FeatureExtractor::new()
        .extract(&source, &net)
        .expect_err("4 != 5 must fail");
    assert!(err.to_string().contains("declared 5"));
}

#[test]
fn test_oversupply_is_fatal() {
    let source = VecSource {
        declared: 3,
        batches: vec![
            Batch {
                images: counting_matrix(2, 2),
                labels: None,
            },
            Batch {
                images: counting_matrix(2, 2),
                labels: None,
            },
        ],
    };
    let net = LinearNetwork::new(Matrix::eye(2));

    assert!(FeatureExtractor::new().extract(&source, &net).is_err());
}

#[test]
fn test_width_drift_is_fatal() {
    // Second batch is wider than the first; dimensional stability is a
    // caller guarantee the extractor enforces.
    struct DriftingNet;
    impl FeatureNetwork for DriftingNet {
        fn forward(&self, images: &Matrix<f32>) -> Result<Matrix<f32>> {
            // Output width tracks input width, which drifts below.
            Ok(Matrix::zeros(images.n_rows(), images.n_cols()))
        }
        fn inference_mode(&self) -> bool {
            true
        }
    }

    let source = VecSource {
        declared: 4,
        batches: vec![
            Batch {
                images: counting_matrix(2, 2),
                labels: None,
            },
            Batch {
                images: counting_matrix(2, 3),
                labels: None,
            },
        ],
    };

    let err = FeatureExtractor::new()
        .extract(&source, &DriftingNet)
        .expect_err("feature width drift must fail");
    assert!(matches!(err, TrazadorError::DimensionMismatch { .. }));
}

#[test]
fn test_training_mode_network_rejected() {
    let dataset = InMemoryDataset::new(counting_matrix(2, 2));
    let net = LinearNetwork::new(Matrix::eye(2)).with_inference_mode(false);

    let err = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect_err("training-mode network must be rejected");
    assert!(matches!(err, TrazadorError::Precondition { .. }));
}

#[test]
fn test_partial_labels_rejected() {
    let source = VecSource {
        declared: 4,
        batches: vec![
            Batch {
                images: counting_matrix(2, 2),
                labels: Some(vec![0, 1]),
            },
            Batch {
                images: counting_matrix(2, 2),
                labels: None,
            },
        ],
    };
    let net = LinearNetwork::new(Matrix::eye(2));

    assert!(FeatureExtractor::new().extract(&source, &net).is_err());
}

#[test]
fn test_short_label_vector_rejected() {
    // A lone batch with 2 rows but 1 label would otherwise slip through
    // the cross-batch check, since no later batch re-tests the running
    // label count.
    let source = VecSource {
        declared: 2,
        batches: vec![Batch {
            images: counting_matrix(2, 2),
            labels: Some(vec![7]),
        }],
    };
    let net = LinearNetwork::new(Matrix::eye(2));

    let err = FeatureExtractor::new()
        .extract(&source, &net)
        .expect_err("1 label for 2 samples must fail");
    assert!(matches!(err, TrazadorError::DimensionMismatch { .. }));
}

#[test]
fn test_long_label_vector_rejected() {
    let source = VecSource {
        declared: 3,
        batches: vec![
            Batch {
                images: counting_matrix(2, 2),
                labels: Some(vec![0, 1]),
            },
            Batch {
                images: counting_matrix(1, 2),
                labels: Some(vec![2, 2]),
            },
        ],
    };
    let net = LinearNetwork::new(Matrix::eye(2));

    assert!(FeatureExtractor::new().extract(&source, &net).is_err());
}

#[test]
fn test_empty_dataset() {
    let dataset = InMemoryDataset::new(Matrix::zeros(0, 3));
    let net = LinearNetwork::new(Matrix::eye(3));

    let extraction = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect("zero declared, zero supplied");
    assert_eq!(extraction.features.n_rows(), 0);
}

#[test]
fn test_report_every_does_not_change_output() {
    let samples = counting_matrix(6, 2);
    let dataset = InMemoryDataset::new(samples).with_batch_size(2);
    let net = LinearNetwork::new(Matrix::eye(2));

    let quiet = FeatureExtractor::new()
        .extract(&dataset, &net)
        .expect("counts match");
    let chatty = FeatureExtractor::new()
        .with_report_every(1)
        .extract(&dataset, &net)
        .expect("counts match");
    assert_eq!(quiet.features, chatty.features);
}
