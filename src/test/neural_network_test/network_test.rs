use super::*;
use crate::utility::one_hot_encode;
use std::sync::atomic::AtomicBool;

fn two_layer_network(seed: u64) -> NeuralNetwork {
    NeuralNetwork::from_specs_with_rng(
        &[
            LayerSpec::new(2, 8, Activation::ReLU),
            LayerSpec::new(8, 2, Activation::Softmax),
        ],
        2,
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

fn mean_loss(network: &NeuralNetwork, x: &Array2<f64>, labels: &Array1<usize>) -> f64 {
    let target = one_hot_encode(labels, network.get_num_classes()).unwrap();
    let output = network.predict(x).unwrap();
    CategoricalCrossEntropy::new().compute_loss(&target, &output)
}

/// Rebuilds `network` with one weight of one layer shifted by `delta`
fn with_shifted_weight(
    network: &NeuralNetwork,
    layer: usize,
    (row, col): (usize, usize),
    delta: f64,
) -> NeuralNetwork {
    let layers = network
        .get_layers()
        .iter()
        .enumerate()
        .map(|(i, dense)| {
            let mut weights = dense.get_weights().clone();
            if i == layer {
                weights[[row, col]] += delta;
            }
            Dense::from_parts(weights, dense.get_bias().clone(), dense.get_activation()).unwrap()
        })
        .collect();

    NeuralNetwork::new(layers, network.get_num_classes()).unwrap()
}

#[test]
fn test_network_new_validation() {
    assert!(matches!(
        NeuralNetwork::new(vec![], 2),
        Err(ModelError::InvalidDimension(_))
    ));

    // 3 -> 4 followed by 5 -> 2 does not chain
    assert!(matches!(
        NeuralNetwork::from_specs(
            &[
                LayerSpec::new(3, 4, Activation::ReLU),
                LayerSpec::new(5, 2, Activation::Softmax),
            ],
            2,
        ),
        Err(ModelError::InvalidDimension(_))
    ));

    // Output width differs from the class count
    assert!(matches!(
        NeuralNetwork::from_specs(&[LayerSpec::new(3, 4, Activation::Softmax)], 3),
        Err(ModelError::InvalidDimension(_))
    ));

    assert!(matches!(
        NeuralNetwork::from_specs(&[LayerSpec::new(3, 0, Activation::Softmax)], 0),
        Err(ModelError::InvalidDimension(_))
    ));
}

#[test]
fn test_network_structure() {
    let network = NeuralNetwork::from_specs(
        &[
            LayerSpec::from((784, 10, Activation::ReLU)),
            LayerSpec::from((10, 10, Activation::Softmax)),
        ],
        10,
    )
    .unwrap();

    assert_eq!(network.num_layers(), 2);
    assert_eq!(network.get_num_classes(), 10);
    assert_eq!(network.param_count(), 784 * 10 + 10 + 10 * 10 + 10);
    assert_eq!(network.get_layers()[0].get_activation(), Activation::ReLU);

    network.summary();
}

#[test]
fn test_forward_cache_contents() {
    let network = two_layer_network(3);
    let x = array![[0.5, -1.0, 2.0], [1.0, 0.0, -0.5]];

    let cache = network.forward(&x).unwrap();

    assert_eq!(cache.layers().len(), 2);
    assert_eq!(cache.input(), x.view());
    assert_eq!(cache.layer_input(0).unwrap(), x.view());

    let hidden = cache.layer(0).unwrap();
    assert_eq!(hidden.z.dim(), (8, 3));
    assert_eq!(hidden.a, hidden.z.mapv(|v| v.max(0.0)));
    assert_eq!(cache.layer_input(1).unwrap(), hidden.a.view());

    let output = cache.layer(1).unwrap();
    assert_eq!(output.a.dim(), (2, 3));
    assert_eq!(cache.output(), output.a.view());
    for column in output.a.axis_iter(Axis(1)) {
        assert_relative_eq!(column.sum(), 1.0, epsilon = 1e-12);
    }

    assert!(cache.layer(2).is_none());
    assert!(cache.layer_input(3).is_none());
}

#[test]
fn test_forward_shape_mismatch() {
    let network = two_layer_network(3);

    assert!(matches!(
        network.forward(&Array2::<f64>::zeros((3, 4))),
        Err(ModelError::ShapeMismatch(_))
    ));
}

#[test]
fn test_predict_is_idempotent() {
    let network = two_layer_network(11);
    let (x, _) = generate_separable_data(5);

    let first = network.predict(&x).unwrap();
    let second = network.predict(&x).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, network.forward(&x).unwrap().into_output());
}

#[test]
fn test_backward_gradient_shapes() {
    let network = NeuralNetwork::from_specs_with_rng(
        &[
            LayerSpec::new(4, 6, Activation::ReLU),
            LayerSpec::new(6, 5, Activation::ReLU),
            LayerSpec::new(5, 3, Activation::Softmax),
        ],
        3,
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();
    let x = Array2::from_shape_fn((4, 7), |(i, j)| (i as f64 - j as f64) * 0.3);
    let labels = array![0, 1, 2, 0, 1, 2, 0];
    let target = one_hot_encode(&labels, 3).unwrap();

    let cache = network.forward(&x).unwrap();
    let gradients = network.backward(&cache, &target).unwrap();

    assert_eq!(gradients.len(), 3);
    for (gradient, layer) in gradients.iter().zip(network.get_layers()) {
        assert_eq!(gradient.weights.dim(), layer.get_weights().dim());
        assert_eq!(gradient.bias.len(), layer.get_bias().len());
    }
}

#[test]
fn test_backward_output_layer_matches_closed_form() {
    let network = NeuralNetwork::new(
        vec![
            Dense::from_parts(
                array![[0.2, -0.1], [0.4, 0.3]],
                array![0.0, 0.1],
                Activation::Softmax,
            )
            .unwrap(),
        ],
        2,
    )
    .unwrap();
    let x = array![[1.0, 0.0], [0.0, 2.0]];
    let target = one_hot_encode(&array![0, 1], 2).unwrap();

    let cache = network.forward(&x).unwrap();
    let gradients = network.backward(&cache, &target).unwrap();

    let delta = &cache.output() - &target;
    let expected_weights = delta.dot(&x.t()) / 2.0;
    let expected_bias = delta.mean_axis(Axis(1)).unwrap();

    for (&g, &e) in gradients[0].weights.iter().zip(expected_weights.iter()) {
        assert_abs_diff_eq!(g, e, epsilon = 1e-12);
    }
    for (&g, &e) in gradients[0].bias.iter().zip(expected_bias.iter()) {
        assert_abs_diff_eq!(g, e, epsilon = 1e-12);
    }
}

#[test]
fn test_backward_matches_finite_differences() {
    let network = NeuralNetwork::from_specs_with_rng(
        &[
            LayerSpec::new(3, 4, Activation::ReLU),
            LayerSpec::new(4, 3, Activation::Softmax),
        ],
        3,
        &mut StdRng::seed_from_u64(21),
    )
    .unwrap();
    let x = array![
        [0.9, -0.4, 0.3, 1.2, -0.8],
        [0.1, 0.7, -1.1, 0.5, 0.6],
        [-0.6, 0.2, 0.8, -0.3, 1.0]
    ];
    let labels = array![0, 2, 1, 1, 0];
    let target = one_hot_encode(&labels, 3).unwrap();

    let cache = network.forward(&x).unwrap();
    let gradients = network.backward(&cache, &target).unwrap();

    let step = 1e-6;
    for (layer, gradient) in gradients.iter().enumerate() {
        for ((row, col), &analytic) in gradient.weights.indexed_iter() {
            let shifted_up = with_shifted_weight(&network, layer, (row, col), step);
            let shifted_down = with_shifted_weight(&network, layer, (row, col), -step);
            let plus = mean_loss(&shifted_up, &x, &labels);
            let minus = mean_loss(&shifted_down, &x, &labels);
            let numeric = (plus - minus) / (2.0 * step);

            assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_backward_errors() {
    let network = two_layer_network(8);
    let x = array![[1.0, -1.0], [0.5, 0.5]];
    let cache = network.forward(&x).unwrap();

    assert!(matches!(
        network.backward(&cache, &Array2::zeros((3, 2))),
        Err(ModelError::ShapeMismatch(_))
    ));

    let other = NeuralNetwork::from_specs(&[LayerSpec::new(2, 2, Activation::Softmax)], 2).unwrap();
    let foreign = other.forward(&x).unwrap();
    assert!(matches!(
        network.backward(&foreign, &Array2::zeros((2, 2))),
        Err(ModelError::ShapeMismatch(_))
    ));

    let empty = Array2::<f64>::zeros((2, 0));
    let empty_cache = network.forward(&empty).unwrap();
    assert!(matches!(
        network.backward(&empty_cache, &Array2::zeros((2, 0))),
        Err(ModelError::EmptyInput(_))
    ));
}

#[test]
fn test_update_weights_errors_leave_network_unchanged() {
    let mut network = two_layer_network(9);
    let before = network.clone();

    let too_few = vec![LayerGradient {
        weights: Array2::zeros((8, 2)),
        bias: Array1::zeros(8),
    }];
    assert!(matches!(
        network.update_weights(&too_few, 0.1),
        Err(ModelError::ShapeMismatch(_))
    ));

    // First gradient is fine, second has the wrong shape
    let mismatched = vec![
        LayerGradient {
            weights: Array2::ones((8, 2)),
            bias: Array1::ones(8),
        },
        LayerGradient {
            weights: Array2::ones((2, 7)),
            bias: Array1::ones(2),
        },
    ];
    assert!(matches!(
        network.update_weights(&mismatched, 0.1),
        Err(ModelError::ShapeMismatch(_))
    ));

    for (after, original) in network.get_layers().iter().zip(before.get_layers()) {
        assert_eq!(after.get_weights(), original.get_weights());
        assert_eq!(after.get_bias(), original.get_bias());
    }
}

#[test]
fn test_update_weights_step() {
    let mut network = two_layer_network(10);
    let before = network.clone();
    let gradients: Vec<LayerGradient> = network
        .get_layers()
        .iter()
        .map(|layer| LayerGradient {
            weights: Array2::ones(layer.get_weights().dim()),
            bias: Array1::ones(layer.get_bias().len()),
        })
        .collect();

    network.update_weights(&gradients, 0.25).unwrap();

    for (after, original) in network.get_layers().iter().zip(before.get_layers()) {
        for (&a, &o) in after.get_weights().iter().zip(original.get_weights().iter()) {
            assert_abs_diff_eq!(a, o - 0.25, epsilon = 1e-12);
        }
        for (&a, &o) in after.get_bias().iter().zip(original.get_bias().iter()) {
            assert_abs_diff_eq!(a, o - 0.25, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_train_input_errors() {
    let mut network = two_layer_network(12);
    let (x, y) = generate_separable_data(4);

    assert!(matches!(
        network.train(&Array2::<f64>::zeros((2, 0)), &Array1::zeros(0), 0.1, 5),
        Err(ModelError::EmptyInput(_))
    ));
    assert!(matches!(
        network.train(&x, &array![0, 1], 0.1, 5),
        Err(ModelError::ShapeMismatch(_))
    ));
    assert!(matches!(
        network.train(&x, &y, 0.0, 5),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        network.train(&x, &y, f64::NAN, 5),
        Err(ModelError::InputValidationError(_))
    ));

    let mut out_of_range = y.clone();
    out_of_range[0] = 2;
    assert!(matches!(
        network.train(&x, &out_of_range, 0.1, 5),
        Err(ModelError::InputValidationError(_))
    ));

    assert!(matches!(
        network.train(&Array2::<f64>::zeros((3, 8)), &y, 0.1, 5),
        Err(ModelError::ShapeMismatch(_))
    ));
}

#[test]
fn test_train_reduces_loss_and_separates_classes() {
    let mut network = two_layer_network(2024);
    let (x, y) = generate_separable_data(20);

    let initial_loss = mean_loss(&network, &x, &y);
    network.train(&x, &y, 0.5, 200).unwrap();
    let final_loss = mean_loss(&network, &x, &y);

    assert!(final_loss < initial_loss);
    assert!(network.accuracy(&x, &y).unwrap() >= 0.9);
}

#[test]
fn test_train_zero_epochs_is_noop() {
    let mut network = two_layer_network(13);
    let before = network.clone();
    let (x, y) = generate_separable_data(4);

    network.train(&x, &y, 0.5, 0).unwrap();

    for (after, original) in network.get_layers().iter().zip(before.get_layers()) {
        assert_eq!(after.get_weights(), original.get_weights());
    }
}

#[test]
fn test_train_cancellable_stops_before_first_epoch() {
    let mut network = two_layer_network(14);
    let before = network.clone();
    let (x, y) = generate_separable_data(4);
    let cancel = AtomicBool::new(true);

    let completed = network.train_cancellable(&x, &y, 0.5, 50, &cancel).unwrap();

    assert_eq!(completed, 0);
    for (after, original) in network.get_layers().iter().zip(before.get_layers()) {
        assert_eq!(after.get_weights(), original.get_weights());
        assert_eq!(after.get_bias(), original.get_bias());
    }

    let running = AtomicBool::new(false);
    assert_eq!(
        network.train_cancellable(&x, &y, 0.5, 3, &running).unwrap(),
        3
    );
}

#[test]
fn test_accuracy() {
    let network = two_layer_network(15);
    let (x, y) = generate_separable_data(6);

    let accuracy = network.accuracy(&x, &y).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    // Reordering samples together with their labels does not change accuracy
    let order: Vec<usize> = (0..y.len()).rev().collect();
    let x_permuted = x.select(Axis(1), &order);
    let y_permuted = y.select(Axis(0), &order);
    assert_relative_eq!(
        network.accuracy(&x_permuted, &y_permuted).unwrap(),
        accuracy,
        epsilon = 1e-12
    );

    assert!(matches!(
        network.accuracy(&Array2::<f64>::zeros((2, 0)), &Array1::zeros(0)),
        Err(ModelError::EmptyInput(_))
    ));
    assert!(matches!(
        network.accuracy(&x, &array![0]),
        Err(ModelError::ShapeMismatch(_))
    ));
}

#[test]
fn test_single_relu_layer_accuracy_improves_across_epochs() {
    let mut network = NeuralNetwork::from_specs_with_rng(
        &[LayerSpec::new(2, 2, Activation::ReLU)],
        2,
        &mut StdRng::seed_from_u64(31),
    )
    .unwrap();
    let (x, y) = generate_separable_data(20);

    let mut history = Vec::with_capacity(10);
    for _ in 0..10 {
        network.train(&x, &y, 0.1, 10).unwrap();
        history.push(network.accuracy(&x, &y).unwrap());
    }

    let (earlier, later) = history.split_at(history.len() / 2);
    let mean = |chunk: &[f64]| chunk.iter().sum::<f64>() / chunk.len() as f64;
    assert!(
        mean(later) >= mean(earlier),
        "accuracy went down on average: {:?}",
        history
    );
}
