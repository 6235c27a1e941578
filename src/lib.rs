pub mod config;
pub mod data;
pub mod error;
pub mod experiments;
pub mod nn;

pub use config::ExperimentConfig;
pub use data::{BinaryDataset, Label, Sample};
pub use error::{Result, SeparationError};
pub use experiments::iris::{run_iris_experiment, ExperimentSummary};
pub use nn::{LinearModel, Perceptron, TrainingHistory, TrainingOptions};
