use std::path::PathBuf;

use crate::data::Label;

/// Errors returned by the linear separation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SeparationError {
    /// The input file does not exist or could not be opened.
    #[error("input file not found: {}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the input file failed part way through.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No samples survived class filtering.
    #[error("dataset is empty after filtering to the configured classes")]
    EmptyDataset,

    /// Every sample carries the same label, so there is nothing to separate.
    #[error("all samples belong to a single class ({label}); training needs both classes")]
    SingleClass { label: Label },

    /// Writing an output image failed.
    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this experiment.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SeparationError>;
