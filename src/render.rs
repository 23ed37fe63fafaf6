//! Renders a run as a line chart of pressure over time on the terminal.

use textplots::{Chart, Plot as _, Shape};

use crate::run::{Run, Sample};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Displayed time span in hours, regardless of how long the run is.
pub const X_DOMAIN: (f32, f32) = (0.0, 12.0);
pub const X_LABEL: &str = "Time (h)";
pub const Y_LABEL: &str = "Pressure (10-bit ADC reading)";

// textplots refuses anything smaller
const MIN_WIDTH: u32 = 32;
const MIN_HEIGHT: u32 = 3;

const GRID_X_STEP: f32 = 2.0; // hours
const GRID_Y_LINES: usize = 5;
const GRID_DOTS: usize = 48; // per gridline

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    LengthMismatch { values: usize, offsets: usize },
    Empty,
    Canvas { width: u32, height: u32 },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { values, offsets } =>
                write!(f, "{} values but {} time offsets", values, offsets),
            Self::Empty =>
                write!(f, "no samples to plot"),
            Self::Canvas { width, height } =>
                write!(f, "canvas {}x{} is smaller than {}x{}",
                    width, height, MIN_WIDTH, MIN_HEIGHT),
        }
    }
}

impl std::error::Error for RenderError {}

/// Convert offsets in seconds to hours for display.
pub fn seconds_to_hours(offsets: &[f64]) -> Vec<f64> {
    offsets.iter().map(|seconds| seconds / SECONDS_PER_HOUR).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStyle {
    /// In braille dots; each terminal cell is 2 dots wide.
    pub width: u32,
    /// In braille dots; each terminal cell is 4 dots tall.
    pub height: u32,
    pub grid: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 160,
            height: 60,
            grid: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    points: Vec<(f32, f32)>, // (hours, reading)
}

impl Plot {
    /// Pair up `values` with their time offsets in hours.
    pub fn new(values: &[Sample], hours: &[f64]) -> Result<Plot, RenderError> {
        if values.len() != hours.len() {
            return Err(RenderError::LengthMismatch { values: values.len(), offsets: hours.len() })
        }
        if values.is_empty() {
            return Err(RenderError::Empty)
        }
        Ok(Plot {
            points: hours.iter().zip(values)
                .map(|(&hour, &value)| (hour as f32, value as f32))
                .collect()
        })
    }

    pub fn from_run(run: &Run) -> Result<Plot, RenderError> {
        Plot::new(run.values(), &seconds_to_hours(run.offsets()))
    }

    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// The part of the trace inside `X_DOMAIN`, with segments leaving or entering the domain
    /// cut at its edges.
    pub fn visible(&self) -> Vec<(f32, f32)> {
        clip(&self.points, X_DOMAIN)
    }

    /// Range of the y-axis: the visible readings with a margin.
    pub fn y_range(&self) -> (f32, f32) {
        let visible = self.visible();
        let points = if visible.is_empty() { &self.points[..] } else { &visible[..] };
        let (min, max) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY),
            |(min, max), &(_, y)| (min.min(y), max.max(y)));
        let margin = ((max - min) * 0.05).max(1.0);
        (min - margin, max + margin)
    }

    /// Draw the chart, with the axis labels above and below it.
    pub fn draw(&self, style: &PlotStyle) -> Result<String, RenderError> {
        if style.width < MIN_WIDTH || style.height < MIN_HEIGHT {
            return Err(RenderError::Canvas { width: style.width, height: style.height })
        }
        let (x_min, x_max) = X_DOMAIN;
        let (y_min, y_max) = self.y_range();
        let trace = self.visible();
        let grid = if style.grid { grid_dots((y_min, y_max)) } else { Vec::new() };
        log::debug!("render: {} of {} points visible, y in {:.1}..{:.1}",
            trace.len(), self.points.len(), y_min, y_max);

        let grid_shape = Shape::Points(&grid);
        let trace_shape = trace_shape(&trace);
        let mut chart = Chart::new_with_y_range(style.width, style.height,
            x_min, x_max, y_min, y_max);
        let chart = chart.lineplot(&grid_shape).lineplot(&trace_shape);
        chart.axis();
        chart.figures();

        // each terminal cell holds 2 dots horizontally
        let x_label_pad = (style.width / 4) as usize + X_LABEL.len() / 2;
        Ok(format!("{}\n{}\n{:>pad$}\n", Y_LABEL, chart, X_LABEL, pad = x_label_pad))
    }
}

// a single point has no segment to draw
fn trace_shape(trace: &[(f32, f32)]) -> Shape<'_> {
    if trace.len() == 1 { Shape::Points(trace) } else { Shape::Lines(trace) }
}

fn clip(points: &[(f32, f32)], (x_min, x_max): (f32, f32)) -> Vec<(f32, f32)> {
    let inside = |x: f32| x >= x_min && x <= x_max;
    let mut clipped = Vec::new();
    if let Some(&(x, y)) = points.first() {
        if inside(x) { clipped.push((x, y)) }
    }
    for pair in points.windows(2) {
        let ((x_a, y_a), (x_b, y_b)) = (pair[0], pair[1]);
        let mut crossings = [x_min, x_max].into_iter()
            .filter(|&edge| (x_a < edge && edge < x_b) || (x_b < edge && edge < x_a))
            .map(|edge| (edge, y_a + (y_b - y_a) * (edge - x_a) / (x_b - x_a)))
            .collect::<Vec<_>>();
        if x_b < x_a {
            crossings.reverse();
        }
        clipped.extend(crossings);
        if inside(x_b) { clipped.push((x_b, y_b)) }
    }
    clipped
}

// Dotted lines at every `GRID_X_STEP` hours and at `GRID_Y_LINES` readings, kept strictly
// inside the chart so that they do not overwrite the axes.
fn grid_dots((y_min, y_max): (f32, f32)) -> Vec<(f32, f32)> {
    let (x_min, x_max) = X_DOMAIN;
    let along = |min: f32, max: f32| (1..GRID_DOTS)
        .map(move |dot| min + (max - min) * dot as f32 / GRID_DOTS as f32);
    let mut dots = Vec::new();
    let mut x = x_min + GRID_X_STEP;
    while x < x_max {
        dots.extend(along(y_min, y_max).map(|y| (x, y)));
        x += GRID_X_STEP;
    }
    for line in 1..GRID_Y_LINES {
        let y = y_min + (y_max - y_min) * line as f32 / GRID_Y_LINES as f32;
        dots.extend(along(x_min, x_max).map(|x| (x, y)));
    }
    dots
}
