use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use linear_separation::experiments::iris::data::{
    load_binary_dataset, ClassPair, FeatureColumn, FeaturePair,
};
use linear_separation::experiments::iris::training::{evaluate_classifier, train_classifier};
use linear_separation::{
    run_iris_experiment, ExperimentConfig, Label, SeparationError, TrainingOptions,
};

const SCENARIO: &str = "\
5.1,3.5,1.4,0.2,Iris-setosa
7.0,3.2,4.7,1.4,Iris-versicolor
4.9,3.0,1.4,0.2,Iris-setosa
6.4,3.2,4.5,1.5,Iris-versicolor
";

fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn write_csv(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("iris_data.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn config_in(dir: &Path, input: PathBuf) -> ExperimentConfig {
    ExperimentConfig {
        input,
        output: dir.join("linear_separation_result.png"),
        ..ExperimentConfig::default()
    }
}

#[test]
fn scenario_rows_are_separated() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), SCENARIO);

    let dataset =
        load_binary_dataset(&input, &ClassPair::default(), &FeaturePair::default()).unwrap();
    assert_eq!(dataset.len(), 4);
    let labels: Vec<i8> = dataset.labels().into_iter().map(Label::value).collect();
    assert_eq!(labels, vec![-1, 1, -1, 1]);

    let (model, history) = train_classifier(&dataset, &TrainingOptions::default()).unwrap();
    assert!(history.converged);
    for sample in dataset.iter() {
        assert_eq!(model.predict(&sample.features), sample.label);
    }
    assert_eq!(evaluate_classifier(&model, &dataset).accuracy, 1.0);
}

#[test]
fn scenario_run_writes_decision_regions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), SCENARIO);
    let config = config_in(dir.path(), input);

    let summary = run_iris_experiment(&config).unwrap();

    assert_eq!(summary.output, config.output);
    let bytes = fs::read(&summary.output).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    assert_eq!(summary.class_counts, [2, 2]);
    assert!(summary.history.converged);
    assert_eq!(summary.metrics.accuracy, 1.0);
    assert!(summary.errors_plot.is_none());
}

#[test]
fn errors_plot_is_written_next_to_the_regions() {
    for name in ["errors.png", "errors.svg"] {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(dir.path(), SCENARIO);
        let mut config = config_in(dir.path(), input);
        config.output = dir.path().join("regions.svg");
        config.plot.errors_plot = Some(dir.path().join(name));

        let summary = run_iris_experiment(&config).unwrap();

        assert!(fs::read_to_string(&summary.output).unwrap().contains("<svg"));
        let errors_plot = summary.errors_plot.unwrap();
        assert_eq!(Some(&errors_plot), config.plot.errors_plot.as_ref());
        assert!(fs::metadata(&errors_plot).unwrap().len() > 0, "{name} is empty");
    }
}

#[test]
fn missing_input_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), dir.path().join("absent.csv"));

    let err = run_iris_experiment(&config).unwrap_err();
    assert!(matches!(err, SeparationError::InputNotFound { .. }));
    assert!(!config.output.exists());
}

#[test]
fn single_class_input_is_rejected_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "5.1,3.5,1.4,0.2,Iris-setosa\n4.9,3.0,1.4,0.2,Iris-setosa\n6.3,3.3,6.0,2.5,Iris-virginica\n",
    );
    let config = config_in(dir.path(), input);

    let err = run_iris_experiment(&config).unwrap_err();
    assert!(matches!(
        err,
        SeparationError::SingleClass {
            label: Label::Negative
        }
    ));
    assert!(!config.output.exists());
}

#[test]
fn no_matching_rows_is_an_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "6.3,3.3,6.0,2.5,Iris-virginica\n");
    let config = config_in(dir.path(), input);

    assert!(matches!(
        run_iris_experiment(&config),
        Err(SeparationError::EmptyDataset)
    ));
    assert!(!config.output.exists());
}

#[test]
fn invalid_resolution_is_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), dir.path().join("absent.csv"));
    config.plot.resolution = -0.02;

    assert!(matches!(
        run_iris_experiment(&config),
        Err(SeparationError::InvalidConfig(_))
    ));
}

#[test]
fn setosa_and_versicolor_separate_on_petal_length() {
    let features = FeaturePair {
        x: FeatureColumn::SepalLength,
        y: FeatureColumn::PetalLength,
    };
    let dataset =
        load_binary_dataset(data_file("iris_data.csv"), &ClassPair::default(), &features)
            .unwrap();
    assert_eq!(dataset.class_counts(), [50, 50]);

    let (model, history) = train_classifier(&dataset, &TrainingOptions::default()).unwrap();
    assert!(history.converged);
    assert_eq!(model.accuracy(&dataset), 1.0);
}

#[test]
fn default_features_need_more_than_the_default_epoch_budget() {
    let dataset = load_binary_dataset(
        data_file("iris_data.csv"),
        &ClassPair::default(),
        &FeaturePair::default(),
    )
    .unwrap();

    let (model, history) = train_classifier(&dataset, &TrainingOptions::default()).unwrap();
    assert!(!history.converged);
    assert_eq!(history.epochs_run(), 100);
    assert_eq!(model.accuracy(&dataset), 0.92);

    let options = TrainingOptions {
        max_epochs: 1000,
        ..TrainingOptions::default()
    };
    let (model, history) = train_classifier(&dataset, &options).unwrap();
    assert!(history.converged);
    assert!(history.epochs_run() > 100);
    assert_eq!(model.accuracy(&dataset), 1.0);
}

#[test]
fn identical_runs_are_bit_identical() {
    let dataset = load_binary_dataset(
        data_file("iris_data.csv"),
        &ClassPair::default(),
        &FeaturePair::default(),
    )
    .unwrap();
    let options = TrainingOptions {
        shuffle: true,
        seed: 1,
        ..TrainingOptions::default()
    };

    let (a, history_a) = train_classifier(&dataset, &options).unwrap();
    let (b, history_b) = train_classifier(&dataset, &options).unwrap();

    let bits = |m: &linear_separation::LinearModel| {
        let mut bits: Vec<u64> = m.weights().iter().map(|w| w.to_bits()).collect();
        bits.push(m.bias().to_bits());
        bits
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(history_a, history_b);
    assert_eq!(
        evaluate_classifier(&a, &dataset),
        evaluate_classifier(&b, &dataset)
    );
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("linear_separation.toml");
    let config = ExperimentConfig::load_from_file(path).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.input, PathBuf::from("data/iris_data.csv"));
    assert_eq!(config.plot_labels().negative, "Setosa");
}

#[test]
fn cli_reports_accuracy_and_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), SCENARIO);
    let output = dir.path().join("out.png");

    let result = Command::new(env!("CARGO_BIN_EXE_linear_separation"))
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();

    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(stdout.contains("Model trained. Accuracy on training set: 1.00"));
    assert!(stdout.contains(&format!("Result saved to {}", output.display())));
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn cli_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");

    let result = Command::new(env!("CARGO_BIN_EXE_linear_separation"))
        .arg("--input")
        .arg(dir.path().join("absent.csv"))
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(stderr.contains("input file not found"));
    assert!(!output.exists());
}

#[test]
fn cli_rejects_unknown_feature_column() {
    let result = Command::new(env!("CARGO_BIN_EXE_linear_separation"))
        .args(["--feature-x", "class"])
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(stderr.contains("unknown feature column"));
}
