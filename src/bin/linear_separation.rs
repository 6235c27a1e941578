use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use linear_separation::experiments::iris::data::FeatureColumn;
use linear_separation::{run_iris_experiment, ExperimentConfig};
use tracing_subscriber::EnvFilter;

/// Train a perceptron on two Iris classes and plot its decision regions.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Headerless iris CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Decision region image (.png, .jpg, .bmp or .svg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Class mapped to -1
    #[arg(long)]
    negative_class: Option<String>,

    /// Class mapped to +1
    #[arg(long)]
    positive_class: Option<String>,

    /// Feature column on the x axis
    #[arg(long)]
    feature_x: Option<FeatureColumn>,

    /// Feature column on the y axis
    #[arg(long)]
    feature_y: Option<FeatureColumn>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Maximum number of training epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Decision grid step in feature units
    #[arg(long)]
    resolution: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Visit samples in a seeded random order each epoch
    #[arg(long)]
    shuffle: bool,

    /// Also plot the number of updates per epoch to this file
    #[arg(long)]
    errors_plot: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> linear_separation::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load_from_file(path)?,
            None => ExperimentConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(negative) = self.negative_class {
            config.classes.negative = negative;
        }
        if let Some(positive) = self.positive_class {
            config.classes.positive = positive;
        }
        if let Some(x) = self.feature_x {
            config.features.x = x;
        }
        if let Some(y) = self.feature_y {
            config.features.y = y;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.training.learning_rate = learning_rate;
        }
        if let Some(epochs) = self.epochs {
            config.training.max_epochs = epochs;
        }
        if let Some(resolution) = self.resolution {
            config.plot.resolution = resolution;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
        }
        if self.shuffle {
            config.training.shuffle = true;
        }
        if let Some(errors_plot) = self.errors_plot {
            config.plot.errors_plot = Some(errors_plot);
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let summary = match Args::parse().into_config().and_then(|c| run_iris_experiment(&c)) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Model trained. Accuracy on training set: {:.2}",
        summary.metrics.accuracy
    );
    summary.metrics.print();
    println!("Result saved to {}", summary.output.display());
    if let Some(path) = &summary.errors_plot {
        println!("Training errors saved to {}", path.display());
    }

    ExitCode::SUCCESS
}
