pub mod perceptron;

pub use perceptron::{LinearModel, Perceptron, TrainingHistory, TrainingOptions, WeightInit};
