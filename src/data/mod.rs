pub mod labeled_dataset;
pub mod loader;
pub use labeled_dataset::{BinaryDataset, Label, Sample};
pub use loader::EpochOrder;
