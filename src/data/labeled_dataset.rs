use std::collections::BTreeSet;
use std::fmt;

use ndarray::Array2;

use crate::error::{Result, SeparationError};

/// Number of feature dimensions a sample carries.
pub const NUM_FEATURES: usize = 2;

/// Binary class label. `Negative` encodes -1 and `Positive` encodes +1.
///
/// The derived ordering puts `Negative` first, which is the order used for
/// confusion matrices and marker assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Negative, Label::Positive];

    /// Maps a margin to a label. A zero margin predicts `Positive`.
    pub fn from_margin(margin: f64) -> Label {
        if margin >= 0.0 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    /// The -1 / +1 encoding of the label.
    pub fn value(self) -> i8 {
        match self {
            Label::Negative => -1,
            Label::Positive => 1,
        }
    }

    pub fn sign(self) -> f64 {
        f64::from(self.value())
    }

    /// Position of the label in `Label::ALL`.
    pub fn index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

/// A single labeled point in the two-dimensional feature space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub features: [f64; NUM_FEATURES],
    pub label: Label,
}

impl Sample {
    pub fn new(features: [f64; NUM_FEATURES], label: Label) -> Self {
        Sample { features, label }
    }
}

/// Ordered collection of samples restricted to two classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryDataset {
    samples: Vec<Sample>,
}

impl BinaryDataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        BinaryDataset { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get_sample(&self, index: usize) -> &Sample {
        &self.samples[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Feature matrix [N x 2], one row per sample in dataset order.
    pub fn features(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.samples.len(), NUM_FEATURES), |(i, j)| {
            self.samples[i].features[j]
        })
    }

    pub fn labels(&self) -> Vec<Label> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Labels present in the dataset, sorted `Negative` first.
    pub fn unique_labels(&self) -> Vec<Label> {
        self.samples
            .iter()
            .map(|s| s.label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sample count per label, indexed by `Label::index`.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for sample in &self.samples {
            counts[sample.label.index()] += 1;
        }
        counts
    }

    /// Per-axis (min, max) of the feature values, or `None` for an empty dataset.
    pub fn bounds(&self) -> Option<[(f64, f64); NUM_FEATURES]> {
        if self.samples.is_empty() {
            return None;
        }

        let mut bounds = [(f64::INFINITY, f64::NEG_INFINITY); NUM_FEATURES];
        for sample in &self.samples {
            for (axis, &value) in sample.features.iter().enumerate() {
                bounds[axis].0 = bounds[axis].0.min(value);
                bounds[axis].1 = bounds[axis].1.max(value);
            }
        }
        Some(bounds)
    }

    /// Fails unless the dataset is non-empty and holds both labels.
    pub fn ensure_two_classes(&self) -> Result<()> {
        match self.unique_labels().as_slice() {
            [] => Err(SeparationError::EmptyDataset),
            [label] => Err(SeparationError::SingleClass { label: *label }),
            _ => Ok(()),
        }
    }
}

impl FromIterator<Sample> for BinaryDataset {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        BinaryDataset::new(iter.into_iter().collect())
    }
}
