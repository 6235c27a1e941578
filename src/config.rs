//! Experiment configuration loaded from TOML files.
//!
//! Every field has a default, so a config file only needs to list the values
//! it changes. Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeparationError};
use crate::experiments::iris::data::{ClassPair, FeatureColumn, FeaturePair};
use crate::experiments::iris::visualization::PlotLabels;
use crate::nn::perceptron::TrainingOptions;

/// Full configuration of one run.
///
/// # Examples
///
/// ```
/// use linear_separation::ExperimentConfig;
///
/// let config: ExperimentConfig = "[training]\nmax_epochs = 10".parse().unwrap();
/// assert_eq!(config.training.max_epochs, 10);
/// assert_eq!(config.plot.resolution, 0.02);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Headerless iris CSV
    pub input: PathBuf,
    /// Decision region image
    pub output: PathBuf,
    pub classes: ClassPair,
    pub features: FeaturePair,
    pub training: TrainingOptions,
    pub plot: PlotConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            input: PathBuf::from("iris_data.csv"),
            output: PathBuf::from("linear_separation_result.png"),
            classes: ClassPair::default(),
            features: FeaturePair::default(),
            training: TrainingOptions::default(),
            plot: PlotConfig::default(),
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    /// Grid step in feature units
    pub resolution: f64,
    pub width: u32,
    pub height: u32,
    /// Optional chart of updates per epoch
    pub errors_plot: Option<PathBuf>,
    pub labels: LabelConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            resolution: 0.02,
            width: 800,
            height: 600,
            errors_plot: None,
            labels: LabelConfig::default(),
        }
    }
}

/// Display strings. Unset axis and legend labels are derived from the
/// selected feature columns and class names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub title: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub negative: Option<String>,
    pub positive: Option<String>,
    pub font_family: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            title: "Perceptron - linear separation".to_string(),
            x_axis: None,
            y_axis: None,
            negative: None,
            positive: None,
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Short legend name for a class, e.g. `Iris-setosa` -> `Setosa`.
fn short_class_name(class: &str) -> String {
    let short = class.rsplit('-').next().unwrap_or(class);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => class.to_string(),
    }
}

impl ExperimentConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SeparationError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Checks value ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;

        if !self.plot.resolution.is_finite() || self.plot.resolution <= 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "plot.resolution must be positive, got {}",
                self.plot.resolution
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(SeparationError::InvalidConfig(
                "plot.width and plot.height must be non-zero".into(),
            ));
        }
        if self.classes.negative.is_empty() || self.classes.positive.is_empty() {
            return Err(SeparationError::InvalidConfig(
                "class names must not be empty".into(),
            ));
        }
        if self.classes.negative == self.classes.positive {
            return Err(SeparationError::InvalidConfig(format!(
                "negative and positive class are both `{}`",
                self.classes.negative
            )));
        }
        if self.features.x == self.features.y {
            return Err(SeparationError::InvalidConfig(format!(
                "x and y feature are both `{}`",
                self.features.x
            )));
        }
        Ok(())
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.plot.width, self.plot.height)
    }

    /// Resolves the display strings used for the decision region plot.
    pub fn plot_labels(&self) -> PlotLabels {
        let labels = &self.plot.labels;
        let axis = |custom: &Option<String>, column: FeatureColumn| {
            custom.clone().unwrap_or_else(|| column.display_name())
        };
        let legend = |custom: &Option<String>, class: &str| {
            custom.clone().unwrap_or_else(|| short_class_name(class))
        };

        PlotLabels {
            title: labels.title.clone(),
            x_label: axis(&labels.x_axis, self.features.x),
            y_label: axis(&labels.y_axis, self.features.y),
            negative: legend(&labels.negative, &self.classes.negative),
            positive: legend(&labels.positive, &self.classes.positive),
            font_family: labels.font_family.clone(),
        }
    }
}

impl FromStr for ExperimentConfig {
    type Err = SeparationError;

    fn from_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }
}
