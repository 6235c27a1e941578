use std::path::PathBuf;

use crate::config::ExperimentConfig;
use crate::data::Label;
use crate::error::Result;
use crate::nn::perceptron::{LinearModel, TrainingHistory};

use super::data::load_binary_dataset;
use super::training::{evaluate_classifier, train_classifier, ClassificationMetrics};
use super::visualization::{plot_decision_regions, plot_training_errors, DecisionGrid};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    pub model: LinearModel,
    pub history: TrainingHistory,
    pub metrics: ClassificationMetrics,
    /// Samples per label after filtering, indexed by `Label::index`
    pub class_counts: [usize; 2],
    /// Path of the decision region image
    pub output: PathBuf,
    pub errors_plot: Option<PathBuf>,
}

/// Runs the Iris linear separation experiment
///
/// This is the main orchestrator function that:
/// 1. Loads the CSV and keeps the two configured classes
/// 2. Trains a perceptron on the two configured features
/// 3. Evaluates training accuracy
/// 4. Renders the decision regions (and optionally the update history)
///
/// Nothing is written to disk unless loading and training succeed.
pub fn run_iris_experiment(config: &ExperimentConfig) -> Result<ExperimentSummary> {
    config.validate()?;

    tracing::info!("Loading Iris dataset from {}", config.input.display());
    let dataset = load_binary_dataset(&config.input, &config.classes, &config.features)?;
    dataset.ensure_two_classes()?;

    tracing::info!(
        "Features: {} (x), {} (y)",
        config.features.x,
        config.features.y
    );
    let (model, history) = train_classifier(&dataset, &config.training)?;

    let metrics = evaluate_classifier(&model, &dataset);
    tracing::info!("Training accuracy: {:.2}%", metrics.accuracy * 100.0);

    tracing::info!(
        "Classifying decision grid (resolution: {})",
        config.plot.resolution
    );
    let grid = DecisionGrid::compute(&dataset, &model, config.plot.resolution)?;
    tracing::debug!(
        columns = grid.xs().len(),
        rows = grid.ys().len(),
        negative_cells = grid.count(Label::Negative),
        positive_cells = grid.count(Label::Positive),
        "decision grid ready"
    );

    let output = plot_decision_regions(
        &dataset,
        &grid,
        &config.plot_labels(),
        &config.output,
        config.image_size(),
    )?;

    let errors_plot = match &config.plot.errors_plot {
        Some(path) => Some(plot_training_errors(
            &history.updates_per_epoch,
            path,
            &config.plot.labels.font_family,
            config.image_size(),
        )?),
        None => None,
    };

    Ok(ExperimentSummary {
        model,
        history,
        metrics,
        class_counts: dataset.class_counts(),
        output,
        errors_plot,
    })
}
