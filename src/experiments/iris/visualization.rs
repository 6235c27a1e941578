use std::collections::BTreeSet;
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::{BinaryDataset, Label};
use crate::error::{Result, SeparationError};
use crate::nn::perceptron::LinearModel;

/// Distance the grid extends beyond the observed feature range on each side
pub const GRID_MARGIN: f64 = 1.0;

/// Upper bound on grid cells, so a tiny resolution fails instead of exhausting memory
const MAX_GRID_CELLS: usize = 4_000_000;

/// Opacity of the filled decision regions
const REGION_ALPHA: f64 = 0.3;

/// Opacity of the sample markers
const MARKER_ALPHA: f64 = 0.8;

/// Marker half-size in pixels
const MARKER_SIZE: i32 = 4;

/// Region fill per label (red for -1, blue for +1)
const REGION_COLORS: [RGBColor; 2] = [RGBColor(178, 24, 43), RGBColor(33, 102, 172)];

const MARKERS: [Marker; 4] = [Marker::Square, Marker::Cross, Marker::Circle, Marker::Triangle];

const MARKER_COLORS: [RGBColor; 4] = [
    RED,
    BLUE,
    RGBColor(144, 238, 144),
    RGBColor(128, 128, 128),
];

type RegionChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Renders with the SVG backend for `.svg` paths and the bitmap backend otherwise.
macro_rules! with_backend {
    ($output:expr, $size:expr, |$root:ident| $body:expr) => {
        if is_svg($output) {
            let $root = SVGBackend::new($output, $size).into_drawing_area();
            $body
        } else {
            let $root = BitMapBackend::new($output, $size).into_drawing_area();
            $body
        }
    };
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Number of points `start + i * step` strictly below `stop`, never fewer than one.
fn axis_len(start: f64, stop: f64, step: f64) -> usize {
    ((stop - start) / step).ceil().max(1.0) as usize
}

/// Evenly spaced points in `[start, stop)`.
///
/// A degenerate or reversed range still yields the single point `start`.
/// Fails when `step` is not positive or the axis alone exceeds the grid cell limit.
pub fn axis_points(start: f64, stop: f64, step: f64) -> Result<Array1<f64>> {
    validate_resolution(step)?;
    let len = axis_len(start, stop, step);
    if len > MAX_GRID_CELLS {
        return Err(SeparationError::InvalidConfig(format!(
            "axis [{}, {}) with step {} needs {} points (limit {})",
            start, stop, step, len, MAX_GRID_CELLS
        )));
    }
    Ok(Array1::from_shape_fn(len, |i| start + i as f64 * step))
}

fn validate_resolution(resolution: f64) -> Result<()> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(SeparationError::InvalidConfig(format!(
            "grid resolution must be positive, got {}",
            resolution
        )));
    }
    Ok(())
}

/// Model predictions over an evenly spaced grid.
///
/// `labels[[row, col]]` is the prediction at `(xs[col], ys[row])`. Each grid
/// point owns the cell `[x, x + step) x [y, y + step)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionGrid {
    xs: Array1<f64>,
    ys: Array1<f64>,
    step: f64,
    labels: Array2<Label>,
}

impl DecisionGrid {
    /// Classifies every point of the grid spanning the dataset's bounding box
    /// widened by `GRID_MARGIN` on each side.
    pub fn compute(dataset: &BinaryDataset, model: &LinearModel, resolution: f64) -> Result<Self> {
        validate_resolution(resolution)?;
        let [(x_min, x_max), (y_min, y_max)] =
            dataset.bounds().ok_or(SeparationError::EmptyDataset)?;

        let (x_start, x_stop) = (x_min - GRID_MARGIN, x_max + GRID_MARGIN);
        let (y_start, y_stop) = (y_min - GRID_MARGIN, y_max + GRID_MARGIN);

        let cells = axis_len(x_start, x_stop, resolution)
            .saturating_mul(axis_len(y_start, y_stop, resolution));
        if cells > MAX_GRID_CELLS {
            return Err(SeparationError::InvalidConfig(format!(
                "grid resolution {} needs {} cells (limit {})",
                resolution, cells, MAX_GRID_CELLS
            )));
        }

        let xs = axis_points(x_start, x_stop, resolution)?;
        let ys = axis_points(y_start, y_stop, resolution)?;
        Ok(Self::evaluate(model, xs, ys, resolution))
    }

    /// Classifies every combination of `xs` and `ys`.
    pub fn evaluate(model: &LinearModel, xs: Array1<f64>, ys: Array1<f64>, step: f64) -> Self {
        let labels = Array2::from_shape_fn((ys.len(), xs.len()), |(row, col)| {
            model.predict(&[xs[col], ys[row]])
        });
        DecisionGrid {
            xs,
            ys,
            step,
            labels,
        }
    }

    pub fn xs(&self) -> &Array1<f64> {
        &self.xs
    }

    pub fn ys(&self) -> &Array1<f64> {
        &self.ys
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn labels(&self) -> &Array2<Label> {
        &self.labels
    }

    pub fn x_range(&self) -> Range<f64> {
        span(&self.xs, self.step)
    }

    pub fn y_range(&self) -> Range<f64> {
        span(&self.ys, self.step)
    }

    /// Lower-left corner and prediction of every cell.
    pub fn cells(&self) -> impl Iterator<Item = ([f64; 2], Label)> + '_ {
        self.labels
            .indexed_iter()
            .map(move |((row, col), &label)| ([self.xs[col], self.ys[row]], label))
    }

    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

fn span(points: &Array1<f64>, step: f64) -> Range<f64> {
    let first = points.first().copied().unwrap_or_default();
    let last = points.last().copied().unwrap_or(first);
    first..last + step
}

/// Marker shape used for a class in the scatter overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Square,
    Cross,
    Circle,
    Triangle,
}

/// Marker and color bound to one class label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStyle {
    pub label: Label,
    pub marker: Marker,
    pub color: RGBColor,
}

/// Assigns markers and colors in sorted label order, independent of the
/// order in which labels appear in the data.
pub fn class_styles(labels: &[Label]) -> Vec<ClassStyle> {
    labels
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(idx, label)| ClassStyle {
            label,
            marker: MARKERS[idx % MARKERS.len()],
            color: MARKER_COLORS[idx % MARKER_COLORS.len()],
        })
        .collect()
}

/// Display strings for the decision region plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub negative: String,
    pub positive: String,
    pub font_family: String,
}

impl PlotLabels {
    pub fn legend_for(&self, label: Label) -> &str {
        match label {
            Label::Negative => &self.negative,
            Label::Positive => &self.positive,
        }
    }
}

/// Plots the decision regions of a trained model with the samples on top
///
/// # Arguments
/// * `dataset` - Samples drawn as markers, one marker per class
/// * `grid` - Model predictions drawn as filled regions
/// * `labels` - Title, axis labels, legend entries and font
/// * `output_path` - Image file to write; `.svg` selects the SVG backend
/// * `size` - Image size in pixels
///
/// # Returns
/// The path of the written image
pub fn plot_decision_regions(
    dataset: &BinaryDataset,
    grid: &DecisionGrid,
    labels: &PlotLabels,
    output_path: &Path,
    size: (u32, u32),
) -> Result<PathBuf> {
    let drawn = with_backend!(output_path, size, |root| {
        draw_decision_regions(&root, dataset, grid, labels)
    });
    drawn.map_err(|err| SeparationError::Render {
        path: output_path.to_path_buf(),
        message: err.to_string(),
    })?;

    tracing::info!(path = %output_path.display(), "decision regions written");
    Ok(output_path.to_path_buf())
}

fn draw_decision_regions<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &BinaryDataset,
    grid: &DecisionGrid,
    labels: &PlotLabels,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let font = labels.font_family.as_str();

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (font, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(grid.x_range(), grid.y_range())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .label_style((font, 14))
        .axis_desc_style((font, 16))
        .draw()?;

    paint_regions(&mut chart, grid)?;
    draw_samples(&mut chart, dataset, labels)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((font, 14))
        .draw()?;

    root.present()?;
    Ok(())
}

fn paint_regions<DB: DrawingBackend>(
    chart: &mut RegionChart<'_, DB>,
    grid: &DecisionGrid,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let step = grid.step();
    chart.draw_series(grid.cells().map(|([x, y], label)| {
        Rectangle::new(
            [(x, y), (x + step, y + step)],
            REGION_COLORS[label.index()].mix(REGION_ALPHA).filled(),
        )
    }))?;
    Ok(())
}

fn draw_samples<DB: DrawingBackend>(
    chart: &mut RegionChart<'_, DB>,
    dataset: &BinaryDataset,
    labels: &PlotLabels,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let half = [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)];
    let edge = BLACK.stroke_width(1);

    for style in class_styles(&dataset.labels()) {
        let points: Vec<(f64, f64)> = dataset
            .iter()
            .filter(|s| s.label == style.label)
            .map(|s| (s.features[0], s.features[1]))
            .collect();
        let name = labels.legend_for(style.label).to_string();
        let fill = style.color.mix(MARKER_ALPHA).filled();
        let stroke = style.color.stroke_width(2);

        let anno = match style.marker {
            Marker::Square => chart
                .draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + Rectangle::new(half, fill) + Rectangle::new(half, edge)
                }))?
                .legend(move |(x, y)| {
                    Rectangle::new(
                        [(x - MARKER_SIZE, y - MARKER_SIZE), (x + MARKER_SIZE, y + MARKER_SIZE)],
                        fill,
                    )
                }),
            Marker::Cross => chart
                .draw_series(points.iter().map(|&p| Cross::new(p, MARKER_SIZE, stroke)))?
                .legend(move |(x, y)| Cross::new((x, y), MARKER_SIZE, stroke)),
            Marker::Circle => chart
                .draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p)
                        + Circle::new((0, 0), MARKER_SIZE, fill)
                        + Circle::new((0, 0), MARKER_SIZE, edge)
                }))?
                .legend(move |(x, y)| Circle::new((x, y), MARKER_SIZE, fill)),
            Marker::Triangle => chart
                .draw_series(
                    points
                        .iter()
                        .map(|&p| TriangleMarker::new(p, MARKER_SIZE + 1, fill)),
                )?
                .legend(move |(x, y)| TriangleMarker::new((x, y), MARKER_SIZE + 1, fill)),
        };
        anno.label(name);
    }

    Ok(())
}

/// Plots the number of perceptron updates in each epoch
///
/// # Arguments
/// * `updates_per_epoch` - Misclassified samples per epoch
/// * `output_path` - Image file to write; `.svg` selects the SVG backend
/// * `font_family` - Font used for the caption and axis labels
/// * `size` - Image size in pixels
///
/// # Returns
/// The path of the written image
pub fn plot_training_errors(
    updates_per_epoch: &[usize],
    output_path: &Path,
    font_family: &str,
    size: (u32, u32),
) -> Result<PathBuf> {
    let drawn = with_backend!(output_path, size, |root| {
        draw_training_errors(&root, updates_per_epoch, font_family)
    });
    drawn.map_err(|err| SeparationError::Render {
        path: output_path.to_path_buf(),
        message: err.to_string(),
    })?;

    tracing::info!(path = %output_path.display(), "training errors plot written");
    Ok(output_path.to_path_buf())
}

fn draw_training_errors<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    updates_per_epoch: &[usize],
    font: &str,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let epochs = updates_per_epoch.len().max(1);
    let max_updates = updates_per_epoch.iter().copied().max().unwrap_or(0);

    let mut chart = ChartBuilder::on(root)
        .caption("Updates per epoch", (font, 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(1..epochs + 1, 0..max_updates + 1)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Number of updates")
        .label_style((font, 14))
        .axis_desc_style((font, 16))
        .draw()?;

    let points = || {
        updates_per_epoch
            .iter()
            .enumerate()
            .map(|(i, &updates)| (i + 1, updates))
    };
    chart.draw_series(LineSeries::new(points(), &BLUE))?;
    chart.draw_series(points().map(|p| Circle::new(p, 3, BLUE.filled())))?;

    root.present()?;
    Ok(())
}
