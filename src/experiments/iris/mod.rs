//! Iris linear separation experiment
//!
//! Trains a perceptron on two features of two Iris classes and plots the
//! resulting decision regions.
pub mod data;
pub mod iris_experiment;
pub mod training;
pub mod visualization;

// Re-export main experiment function for convenience
pub use iris_experiment::{run_iris_experiment, ExperimentSummary};
