use crate::data::{BinaryDataset, Label};
use crate::error::Result;
use crate::nn::perceptron::{LinearModel, Perceptron, TrainingHistory, TrainingOptions};

/// Trains a perceptron on the provided data
///
/// # Arguments
/// * `dataset` - Two-class training samples
/// * `options` - Learning rate, epoch budget, seed and ordering
///
/// # Returns
/// The trained model and its per-epoch history
pub fn train_classifier(
    dataset: &BinaryDataset,
    options: &TrainingOptions,
) -> Result<(LinearModel, TrainingHistory)> {
    tracing::info!(
        "Starting perceptron training for at most {} epochs (lr: {}, seed: {}, shuffle: {})",
        options.max_epochs,
        options.learning_rate,
        options.seed,
        options.shuffle
    );

    let (model, history) = Perceptron::new(options.clone()).fit(dataset)?;

    if history.converged {
        tracing::info!("Converged after {} epochs", history.epochs_run());
    } else {
        tracing::warn!(
            "No convergence within {} epochs; {} updates in the last epoch",
            history.epochs_run(),
            history.updates_per_epoch.last().copied().unwrap_or_default()
        );
    }
    tracing::info!(
        weights = ?model.weights().to_vec(),
        bias = model.bias(),
        "trained linear model"
    );

    Ok((model, history))
}

/// Evaluation metrics for binary classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationMetrics {
    /// Overall accuracy
    pub accuracy: f64,
    /// Per-class accuracy, indexed by `Label::index`
    pub per_class_accuracy: [f64; 2],
    /// Confusion matrix [true_label x predicted_label]
    pub confusion_matrix: [[usize; 2]; 2],
}

/// Evaluates the classifier on the provided dataset
///
/// Predictions come from `model` itself, so the reported accuracy always
/// matches the model that is returned to the caller.
pub fn evaluate_classifier(model: &LinearModel, dataset: &BinaryDataset) -> ClassificationMetrics {
    let mut confusion_matrix = [[0; 2]; 2];
    let mut total_correct = 0;

    let predictions = model.predict_batch(&dataset.features());
    for (sample, predicted) in dataset.iter().zip(predictions) {
        confusion_matrix[sample.label.index()][predicted.index()] += 1;
        if predicted == sample.label {
            total_correct += 1;
        }
    }

    let accuracy = if dataset.is_empty() {
        0.0
    } else {
        total_correct as f64 / dataset.len() as f64
    };

    let per_class_accuracy = Label::ALL.map(|label| {
        let row = confusion_matrix[label.index()];
        let total: usize = row.iter().sum();
        if total > 0 {
            row[label.index()] as f64 / total as f64
        } else {
            0.0
        }
    });

    ClassificationMetrics {
        accuracy,
        per_class_accuracy,
        confusion_matrix,
    }
}

impl ClassificationMetrics {
    /// Prints the evaluation metrics in a formatted way
    pub fn print(&self) {
        println!("  Overall Accuracy: {:.2}%", self.accuracy * 100.0);
        println!("  Per-class Accuracy:");
        for label in Label::ALL {
            println!(
                "    Class {:>2}: {:.2}%",
                label,
                self.per_class_accuracy[label.index()] * 100.0
            );
        }
        println!("  Confusion Matrix:");
        println!("            Pred -1  Pred  1");
        for label in Label::ALL {
            let row = self.confusion_matrix[label.index()];
            println!("    True {:>2} {:8} {:8}", label, row[0], row[1]);
        }
    }
}
