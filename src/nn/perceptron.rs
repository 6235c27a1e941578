use ndarray::{aview1, Array1, Array2, ArrayView1};
use ndarray_rand::rand_distr::{Distribution, Normal};
use ndarray_rand::RandomExt;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::labeled_dataset::NUM_FEATURES;
use crate::data::{BinaryDataset, EpochOrder, Label};
use crate::error::{Result, SeparationError};

/// Standard deviation of the seeded weight initialization.
const INIT_STD: f64 = 0.01;

/// Weight initialization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightInit {
    #[default]
    Zeros,
    /// Small values drawn from N(0, 0.01) with the training seed.
    Seeded,
}

/// Perceptron hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingOptions {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub seed: u64,
    /// Visit samples in a seeded random order each epoch instead of dataset order.
    pub shuffle: bool,
    pub init: WeightInit,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            learning_rate: 0.1,
            max_epochs: 100,
            seed: 1,
            shuffle: false,
            init: WeightInit::Zeros,
        }
    }
}

impl TrainingOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_epochs == 0 {
            return Err(SeparationError::InvalidConfig(
                "max_epochs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Linear separator `sign(w . x + b)` over two features.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearModel {
    pub fn new(weights: [f64; NUM_FEATURES], bias: f64) -> Self {
        LinearModel {
            weights: Array1::from_vec(weights.to_vec()),
            bias,
        }
    }

    pub fn zeros() -> Self {
        LinearModel {
            weights: Array1::zeros(NUM_FEATURES),
            bias: 0.0,
        }
    }

    fn seeded(rng: &mut StdRng) -> Result<Self> {
        let normal = Normal::new(0.0, INIT_STD)
            .map_err(|err| SeparationError::InvalidConfig(err.to_string()))?;
        let weights = Array1::random_using(NUM_FEATURES, normal, rng);
        let bias = normal.sample(rng);
        Ok(LinearModel { weights, bias })
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Signed margin `w . x + b`.
    pub fn margin(&self, features: &[f64; NUM_FEATURES]) -> f64 {
        self.weights.dot(&aview1(features)) + self.bias
    }

    pub fn predict(&self, features: &[f64; NUM_FEATURES]) -> Label {
        Label::from_margin(self.margin(features))
    }

    /// Predicts every row of an [N x 2] feature matrix.
    pub fn predict_batch(&self, features: &Array2<f64>) -> Vec<Label> {
        (features.dot(&self.weights) + self.bias)
            .iter()
            .map(|&margin| Label::from_margin(margin))
            .collect()
    }

    /// Fraction of samples whose prediction matches their label.
    pub fn accuracy(&self, dataset: &BinaryDataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict_batch(&dataset.features())
            .into_iter()
            .zip(dataset.iter())
            .filter(|(predicted, sample)| *predicted == sample.label)
            .count();
        correct as f64 / dataset.len() as f64
    }

    fn update(&mut self, step: f64, features: &[f64; NUM_FEATURES]) {
        self.weights.scaled_add(step, &aview1(features));
        self.bias += step;
    }
}

/// Per-epoch record of a training run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingHistory {
    /// Number of weight updates (misclassified samples) in each epoch.
    pub updates_per_epoch: Vec<usize>,
    /// True when the final epoch made no updates.
    pub converged: bool,
}

impl TrainingHistory {
    pub fn epochs_run(&self) -> usize {
        self.updates_per_epoch.len()
    }
}

/// Perceptron learning rule.
///
/// Each epoch visits every sample once. A sample whose margin has the wrong
/// sign, or is exactly zero, moves the weights by
/// `learning_rate * label * features` and the bias by `learning_rate * label`.
/// Training stops after the first epoch without updates or after
/// `max_epochs`, whichever comes first.
#[derive(Debug, Clone, Default)]
pub struct Perceptron {
    options: TrainingOptions,
}

impl Perceptron {
    pub fn new(options: TrainingOptions) -> Self {
        Perceptron { options }
    }

    pub fn fit(&self, dataset: &BinaryDataset) -> Result<(LinearModel, TrainingHistory)> {
        self.options.validate()?;
        dataset.ensure_two_classes()?;

        let mut model = match self.options.init {
            WeightInit::Zeros => LinearModel::zeros(),
            WeightInit::Seeded => {
                let mut rng = StdRng::seed_from_u64(self.options.seed);
                LinearModel::seeded(&mut rng)?
            }
        };

        let mut order = if self.options.shuffle {
            EpochOrder::shuffled(dataset.len(), self.options.seed)
        } else {
            EpochOrder::sequential(dataset.len())
        };

        let mut history = TrainingHistory::default();
        for epoch in 0..self.options.max_epochs {
            let mut updates = 0;
            for &idx in order.next_epoch() {
                let sample = dataset.get_sample(idx);
                let label = sample.label.sign();
                if label * model.margin(&sample.features) <= 0.0 {
                    model.update(self.options.learning_rate * label, &sample.features);
                    updates += 1;
                }
            }

            history.updates_per_epoch.push(updates);
            tracing::debug!(epoch = epoch + 1, updates, "perceptron epoch finished");

            if updates == 0 {
                history.converged = true;
                break;
            }
        }

        Ok((model, history))
    }
}
