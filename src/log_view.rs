//! Log-log comparison view.
//!
//! Turns spectral estimates into logarithmic series and hands them to a
//! [`PlotSink`]. Zero-frequency points are dropped before the transform; a
//! zero power value is kept and maps to `-inf`, which the sink receives as is.

use crate::errors::{SpectralAnalysisError, SpectralResult};
use crate::spectrum::SpectralEstimate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Chart title used by [`build_chart`].
pub const CHART_TITLE: &str = "Power Spectral Density";

/// Logarithm applied to both chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LogBase {
    /// `log2`
    #[default]
    Base2,
    /// `ln`
    Natural,
}

impl LogBase {
    /// Apply the logarithm.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            LogBase::Base2 => x.log2(),
            LogBase::Natural => x.ln(),
        }
    }

    /// Axis titles `(x, y)` for this base.
    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            LogBase::Base2 => ("log_2 f", "log_2 S(f)"),
            LogBase::Natural => ("ln f", "ln S(f)"),
        }
    }
}

/// One labelled series in log-log coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogSeries {
    /// Legend label
    pub label: String,
    /// Logarithm of the frequencies
    pub x: Vec<f64>,
    /// Logarithm of the spectral values
    pub y: Vec<f64>,
}

impl LogSeries {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True when the series has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Log-transform an estimate, dropping points at frequency zero.
pub fn to_log_series(estimate: &SpectralEstimate, label: &str, base: LogBase) -> LogSeries {
    let (x, y) = estimate
        .points()
        .filter(|&(f, _)| f != 0.0)
        .map(|(f, v)| (base.apply(f), base.apply(v)))
        .unzip();
    LogSeries {
        label: label.to_string(),
        x,
        y,
    }
}

/// Everything a sink needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogLogChart {
    /// Overlaid series, legend order
    pub series: Vec<LogSeries>,
    /// Optional fitted reference line
    pub reference_line: Option<LogSeries>,
    /// Horizontal axis title
    pub x_label: String,
    /// Vertical axis title
    pub y_label: String,
    /// Chart title
    pub title: String,
}

impl LogLogChart {
    /// Attach a reference line drawn over the series.
    pub fn with_reference_line(mut self, line: LogSeries) -> Self {
        self.reference_line = Some(line);
        self
    }
}

/// External rendering capability.
pub trait PlotSink {
    /// Draw one chart.
    fn render(&mut self, chart: &LogLogChart) -> SpectralResult<()>;
}

/// Build a chart from estimates and their legend labels.
pub fn build_chart(
    estimates: &[&SpectralEstimate],
    labels: &[&str],
    base: LogBase,
) -> SpectralResult<LogLogChart> {
    if labels.len() != estimates.len() {
        return Err(SpectralAnalysisError::LengthMismatch {
            name: "labels".to_string(),
            expected: estimates.len(),
            actual: labels.len(),
        });
    }
    let series = estimates
        .iter()
        .zip(labels)
        .map(|(estimate, label)| to_log_series(estimate, label, base))
        .collect();
    let (x_label, y_label) = base.axis_labels();
    Ok(LogLogChart {
        series,
        reference_line: None,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        title: CHART_TITLE.to_string(),
    })
}

/// Log-transform `estimates` and render them as one overlaid chart.
pub fn render(
    estimates: &[&SpectralEstimate],
    labels: &[&str],
    base: LogBase,
    sink: &mut dyn PlotSink,
) -> SpectralResult<()> {
    let chart = build_chart(estimates, labels, base)?;
    sink.render(&chart)
}

/// Sink that keeps every chart in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Charts in rendering order
    pub charts: Vec<LogLogChart>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently rendered chart.
    pub fn last(&self) -> Option<&LogLogChart> {
        self.charts.last()
    }
}

impl PlotSink for RecordingSink {
    fn render(&mut self, chart: &LogLogChart) -> SpectralResult<()> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

/// Sink writing `label x y` rows, one per point, for gnuplot or a dataframe.
///
/// A `#` header carries the title and axis labels; the reference line, if
/// any, follows the series. Labels have whitespace replaced by `_` so each
/// row keeps three fields.
#[derive(Debug)]
pub struct DelimitedTextSink<W: Write> {
    writer: W,
    delimiter: char,
}

impl<W: Write> DelimitedTextSink<W> {
    /// Space-delimited sink.
    pub fn new(writer: W) -> Self {
        Self::with_delimiter(writer, ' ')
    }

    /// Sink with a custom field delimiter.
    pub fn with_delimiter(writer: W, delimiter: char) -> Self {
        Self { writer, delimiter }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_series(&mut self, series: &LogSeries) -> std::io::Result<()> {
        let label: String = series
            .label
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        let d = self.delimiter;
        for (x, y) in series.x.iter().zip(&series.y) {
            writeln!(self.writer, "{label}{d}{x}{d}{y}")?;
        }
        Ok(())
    }

    fn write_chart(&mut self, chart: &LogLogChart) -> std::io::Result<()> {
        writeln!(self.writer, "# {}", chart.title)?;
        writeln!(self.writer, "# label{d}{}{d}{}", chart.x_label, chart.y_label, d = self.delimiter)?;
        for series in &chart.series {
            self.write_series(series)?;
        }
        if let Some(line) = &chart.reference_line {
            self.write_series(line)?;
        }
        self.writer.flush()
    }
}

impl<W: Write> PlotSink for DelimitedTextSink<W> {
    fn render(&mut self, chart: &LogLogChart) -> SpectralResult<()> {
        self.write_chart(chart)
            .map_err(|e| SpectralAnalysisError::io("render chart", e))
    }
}
