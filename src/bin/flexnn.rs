use clap::Parser;
use flexnn::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;

/// Train a two-layer classifier on a labelled CSV file
#[derive(Parser, Debug)]
#[command(name = "flexnn")]
#[command(about = "Full-batch feed-forward neural network trainer")]
#[command(version)]
struct Cli {
    /// CSV file with a header line, the class label in the first column and features after it
    #[arg(long)]
    data: String,
    /// Number of units in the hidden ReLU layer
    #[arg(long, default_value_t = 10)]
    hidden: usize,
    /// Gradient descent step size
    #[arg(long, default_value_t = 0.5)]
    learning_rate: f64,
    /// Number of full passes over the training split
    #[arg(long, default_value_t = 500)]
    epochs: usize,
    /// Every feature is divided by this value before training
    #[arg(long, default_value_t = 255.0)]
    scale: f64,
    /// Share of rows used for training, the rest is held out for testing
    #[arg(long, default_value_t = 0.9)]
    train_fraction: f64,
    /// Seed for the split and for weight initialization
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !(cli.scale.is_finite() && cli.scale != 0.0) {
        return Err(Box::new(ModelError::InputValidationError(format!(
            "scale must be a non-zero finite number, got {}",
            cli.scale
        ))));
    }

    if !(0.0..1.0).contains(&cli.train_fraction) || cli.train_fraction == 0.0 {
        return Err(Box::new(ModelError::InputValidationError(format!(
            "train_fraction must be between 0 and 1 (exclusive), got {}",
            cli.train_fraction
        ))));
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!("Reading {}...", cli.data);
    let (mut x, y) = read_csv_xy(&cli.data)?;
    x.mapv_inplace(|v| v / cli.scale);

    // Decided once for the whole file so both splits agree with the output layer
    let num_classes = infer_num_classes(&y)?;
    let n_features = x.ncols();
    println!(
        "Loaded {} samples, {} features, {} classes",
        x.nrows(),
        n_features,
        num_classes
    );

    let mut splits = split_xy(
        &x,
        &y,
        &[cli.train_fraction, 1.0 - cli.train_fraction],
        &mut rng,
    )?
    .into_iter();
    let (Some((x_train, y_train)), Some((x_test, y_test))) = (splits.next(), splits.next()) else {
        return Err(Box::new(ModelError::InputValidationError(
            "Dataset split did not produce train and test parts".to_string(),
        )));
    };

    // Samples become columns
    let x_train = x_train.reversed_axes();
    let x_test = x_test.reversed_axes();

    let mut network = NeuralNetwork::from_specs_with_rng(
        &[
            LayerSpec::new(n_features, cli.hidden, Activation::ReLU),
            LayerSpec::new(cli.hidden, num_classes, Activation::Softmax),
        ],
        num_classes,
        &mut rng,
    )?;
    network.summary();

    network.train(&x_train, &y_train, cli.learning_rate, cli.epochs)?;

    println!(
        "Train accuracy: {:.2}%",
        network.accuracy(&x_train, &y_train)? * 100.0
    );
    if y_test.is_empty() {
        println!("Test split is empty, skipping test accuracy");
    } else {
        println!(
            "Test accuracy: {:.2}%",
            network.accuracy(&x_test, &y_test)? * 100.0
        );
    }

    Ok(())
}
