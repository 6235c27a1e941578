use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::data::{BinaryDataset, Label, Sample};
use crate::error::{Result, SeparationError};

/// The number of numeric columns in the Iris dataset
pub const NUM_COLUMNS: usize = 4;

/// Column names of the headerless Iris CSV, in file order
pub const FEATURE_NAMES: [&str; NUM_COLUMNS] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Class names in the Iris dataset
pub const CLASS_NAMES: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// A single record from the Iris dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IrisRecord {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub species: String,
}

/// One of the four numeric Iris columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; NUM_COLUMNS] = [
        FeatureColumn::SepalLength,
        FeatureColumn::SepalWidth,
        FeatureColumn::PetalLength,
        FeatureColumn::PetalWidth,
    ];

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }

    /// Human-readable axis label, e.g. `sepal length [cm]`.
    pub fn display_name(self) -> String {
        format!("{} [cm]", self.name().replace('_', " "))
    }

    pub fn value(self, record: &IrisRecord) -> f64 {
        match self {
            FeatureColumn::SepalLength => record.sepal_length,
            FeatureColumn::SepalWidth => record.sepal_width,
            FeatureColumn::PetalLength => record.petal_length,
            FeatureColumn::PetalWidth => record.petal_width,
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        FeatureColumn::ALL
            .into_iter()
            .find(|column| column.name() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown feature column `{}` (expected one of {})",
                    s,
                    FEATURE_NAMES.join(", ")
                )
            })
    }
}

/// The two feature columns forming the x and y axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturePair {
    pub x: FeatureColumn,
    pub y: FeatureColumn,
}

impl Default for FeaturePair {
    fn default() -> Self {
        FeaturePair {
            x: FeatureColumn::SepalLength,
            y: FeatureColumn::SepalWidth,
        }
    }
}

impl FeaturePair {
    pub fn extract(&self, record: &IrisRecord) -> [f64; 2] {
        [self.x.value(record), self.y.value(record)]
    }
}

/// The two class names kept by the loader; `negative` maps to -1 and
/// `positive` to +1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassPair {
    pub negative: String,
    pub positive: String,
}

impl Default for ClassPair {
    fn default() -> Self {
        ClassPair {
            negative: CLASS_NAMES[0].to_string(),
            positive: CLASS_NAMES[1].to_string(),
        }
    }
}

impl ClassPair {
    /// Label for a class name, or `None` when the class is not selected.
    pub fn label_for(&self, species: &str) -> Option<Label> {
        if species == self.negative {
            Some(Label::Negative)
        } else if species == self.positive {
            Some(Label::Positive)
        } else {
            None
        }
    }

    pub fn name_of(&self, label: Label) -> &str {
        match label {
            Label::Negative => &self.negative,
            Label::Positive => &self.positive,
        }
    }
}

/// Reads the records of the two selected classes from a headerless CSV source.
///
/// The class is taken from the last field of each row. Rows of other classes
/// are dropped, with a warning when they would not parse either. A selected
/// row that does not parse aborts the read, as do I/O errors.
pub fn read_iris_records<R: Read>(
    reader: R,
    classes: &ClassPair,
) -> std::result::Result<Vec<IrisRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map_or(0, |pos| pos.line());
        let species = row
            .len()
            .checked_sub(1)
            .and_then(|last| row.get(last))
            .unwrap_or_default();

        if classes.label_for(species).is_some() {
            records.push(row.deserialize(None)?);
            continue;
        }
        match row.deserialize::<IrisRecord>(None) {
            Ok(_) => tracing::trace!(line, species, "dropping unselected class"),
            Err(err) => tracing::warn!(line, %err, "skipping malformed row"),
        }
    }
    Ok(records)
}

/// Loads the Iris dataset from a CSV file
///
/// # Arguments
/// * `path` - Path to the headerless iris CSV file
/// * `classes` - The two classes to keep
///
/// # Returns
/// The records of the selected classes in file order
pub fn load_iris_records(path: impl AsRef<Path>, classes: &ClassPair) -> Result<Vec<IrisRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SeparationError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    read_iris_records(file, classes).map_err(|source| SeparationError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps the records of the two selected classes and projects them onto
/// the two selected feature columns, preserving record order.
pub fn filter_records(
    records: &[IrisRecord],
    classes: &ClassPair,
    features: &FeaturePair,
) -> BinaryDataset {
    records
        .iter()
        .filter_map(|record| match classes.label_for(&record.species) {
            Some(label) => Some(Sample::new(features.extract(record), label)),
            None => {
                tracing::trace!(species = %record.species, "dropping unselected class");
                None
            }
        })
        .collect()
}

/// Loads the CSV at `path` and returns the two-class, two-feature dataset.
pub fn load_binary_dataset(
    path: impl AsRef<Path>,
    classes: &ClassPair,
    features: &FeaturePair,
) -> Result<BinaryDataset> {
    let path = path.as_ref();
    let records = load_iris_records(path, classes)?;
    let dataset = filter_records(&records, classes, features);

    tracing::info!(
        path = %path.display(),
        samples = dataset.len(),
        "loaded iris dataset"
    );
    let counts = dataset.class_counts();
    for label in Label::ALL {
        tracing::info!(
            "{} ({}): {} samples",
            classes.name_of(label),
            label,
            counts[label.index()]
        );
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "\
5.1,3.5,1.4,0.2,Iris-setosa
7.0,3.2,4.7,1.4,Iris-versicolor
4.9,3.0,1.4,0.2,Iris-setosa
6.4,3.2,4.5,1.5,Iris-versicolor
";

    fn records(csv: &str) -> Vec<IrisRecord> {
        read_iris_records(csv.as_bytes(), &ClassPair::default()).unwrap()
    }

    #[test]
    fn reads_headerless_rows() {
        let rows = records(SCENARIO);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].sepal_length, 7.0);
        assert_eq!(rows[1].petal_width, 1.4);
        assert_eq!(rows[1].species, "Iris-versicolor");
    }

    #[test]
    fn scenario_keeps_all_rows_with_expected_labels() {
        let data = filter_records(
            &records(SCENARIO),
            &ClassPair::default(),
            &FeaturePair::default(),
        );

        assert_eq!(data.len(), 4);
        let labels: Vec<i8> = data.labels().into_iter().map(Label::value).collect();
        assert_eq!(labels, vec![-1, 1, -1, 1]);
        assert_eq!(data.get_sample(2).features, [4.9, 3.0]);
    }

    #[test]
    fn filtering_two_class_data_is_a_no_op() {
        let rows = records(SCENARIO);
        let features = FeaturePair {
            x: FeatureColumn::PetalLength,
            y: FeatureColumn::PetalWidth,
        };
        let data = filter_records(&rows, &ClassPair::default(), &features);

        assert_eq!(data.len(), rows.len());
        for (sample, record) in data.iter().zip(&rows) {
            assert_eq!(sample.features, [record.petal_length, record.petal_width]);
        }
    }

    #[test]
    fn other_classes_are_dropped_and_counts_match() {
        let csv = format!(
            "{}6.3,3.3,6.0,2.5,Iris-virginica\n5.8,2.7,5.1,1.9,Iris-virginica\n5.0,3.6,1.4,0.2,Iris-setosa\n",
            SCENARIO
        );
        let rows = records(&csv);
        assert_eq!(rows.len(), 5);

        let data = filter_records(&rows, &ClassPair::default(), &FeaturePair::default());
        assert_eq!(data.len(), 5);
        assert_eq!(data.class_counts(), [3, 2]);
    }

    #[test]
    fn swapped_classes_swap_labels() {
        let classes = ClassPair {
            negative: "Iris-versicolor".into(),
            positive: "Iris-setosa".into(),
        };
        let data = filter_records(&records(SCENARIO), &classes, &FeaturePair::default());
        assert_eq!(data.get_sample(0).label, Label::Positive);
        assert_eq!(classes.name_of(Label::Negative), "Iris-versicolor");
    }

    #[test]
    fn malformed_rows_of_other_classes_are_skipped() {
        let csv = "\
sepal_length,sepal_width,petal_length,petal_width,class
5.1,3.5,1.4,0.2,Iris-setosa
not,a,number,row,Iris-virginica
7.0,3.2,4.7
 6.4 , 3.2 , 4.5 , 1.5 , Iris-versicolor

";
        let rows = records(csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].species, "Iris-versicolor");
        assert_eq!(rows[1].sepal_length, 6.4);
    }

    #[test]
    fn malformed_rows_of_selected_classes_abort_the_read() {
        for csv in [
            "5.1,3.5,1.4,0.2,Iris-setosa\nnot,a,number,row,Iris-setosa\n",
            "5.1,3.5,1.4,0.2,Iris-setosa\n7.0,3.2,Iris-versicolor\n",
        ] {
            assert!(read_iris_records(csv.as_bytes(), &ClassPair::default()).is_err());
        }
    }

    #[test]
    fn malformed_selected_row_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.csv");
        std::fs::write(&path, "5.1,3.5,1.4,0.2,Iris-setosa\n7.0,x,4.7,1.4,Iris-versicolor\n")
            .unwrap();

        let err = load_binary_dataset(&path, &ClassPair::default(), &FeaturePair::default())
            .unwrap_err();
        match err {
            SeparationError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let err =
            load_iris_records("definitely/not/here/iris.csv", &ClassPair::default()).unwrap_err();
        assert!(matches!(err, SeparationError::InputNotFound { .. }));
        assert!(err.to_string().contains("iris.csv"));
    }

    #[test]
    fn feature_columns_parse_by_name() {
        assert_eq!("sepal_length".parse(), Ok(FeatureColumn::SepalLength));
        assert_eq!("Petal-Width".parse(), Ok(FeatureColumn::PetalWidth));
        assert!("class".parse::<FeatureColumn>().is_err());
        assert_eq!(FeatureColumn::SepalWidth.display_name(), "sepal width [cm]");
    }
}
