//! # Diagram Scaling
//!
//! Derives axis bounds and ordered coordinates for the two report diagrams:
//!
//! - **Line** (shear force): symmetric 10% margin above and below the data.
//! - **Filled area** (bending moment): lower bound pinned to zero whenever the
//!   series never goes negative, so the filled region reads against the
//!   baseline.
//!
//! ## Degenerate Ranges
//!
//! A flat series (`max - min < 1e-6`) would produce a zero-height axis. The
//! range is then replaced by `max(|min|, |max|, 1.0)` before the margin is
//! applied, so even an all-zero series gets `[-0.1, 0.1]`.
//!
//! ## Example
//!
//! ```rust
//! use report_core::diagram::compute_line_diagram;
//!
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let v = [10.0, 5.0, 0.0, -5.0, -10.0];
//! let geometry = compute_line_diagram(&x, &v).unwrap();
//!
//! assert!((geometry.y_axis.min - -12.0).abs() < 1e-9);
//! assert!((geometry.y_axis.max - 12.0).abs() < 1e-9);
//! assert_eq!(geometry.x_axis.max, 4.0);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::errors::{ReportError, ReportResult};

/// Ranges narrower than this are treated as flat.
pub const DEGENERATE_RANGE: f64 = 1e-6;

/// Fraction of the value range added as margin.
pub const MARGIN_FRACTION: f64 = 0.1;

/// Bounds of one axis. Invariant: `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
}

impl AxisSpec {
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Map a value to `[0, 1]` along the axis
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / self.extent()
    }
}

/// Which kind of diagram a geometry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagramKind {
    Line,
    FilledArea,
}

/// A single plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// How a renderer should finish the path after the last coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathClosure {
    /// Leave the polyline open
    Open,
    /// Drop to the baseline at the last x, run back along the baseline to
    /// the first x, then close to the first coordinate
    ToBaseline { baseline: f64, first: Point },
}

/// Plot-ready geometry for one diagram. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramGeometry {
    /// Coordinates in input order
    pub coordinates: Vec<Point>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub kind: DiagramKind,
    pub closure: PathClosure,
}

/// Line diagram for a series that may take either sign.
///
/// # Errors
///
/// * `Integrity` - `x` and `y` differ in length, or are empty
/// * `DegenerateAxis` - `max(x) <= 0`
pub fn compute_line_diagram(x: &[f64], y: &[f64]) -> ReportResult<DiagramGeometry> {
    let x_axis = x_axis_for(x, y)?;
    let (vmin, vmax, range) = value_range(y);
    let y_axis = AxisSpec {
        min: vmin - MARGIN_FRACTION * range,
        max: vmax + MARGIN_FRACTION * range,
    };
    debug!(?x_axis, ?y_axis, points = x.len(), "line diagram scaled");

    Ok(DiagramGeometry {
        coordinates: zip_points(x, y),
        x_axis,
        y_axis,
        kind: DiagramKind::Line,
        closure: PathClosure::Open,
    })
}

/// Filled-area diagram anchored at zero for non-negative series.
///
/// # Errors
///
/// Same as [`compute_line_diagram`].
pub fn compute_area_diagram(x: &[f64], y: &[f64]) -> ReportResult<DiagramGeometry> {
    let x_axis = x_axis_for(x, y)?;
    let (vmin, vmax, range) = value_range(y);
    let y_axis = AxisSpec {
        min: if vmin >= 0.0 { 0.0 } else { vmin - MARGIN_FRACTION * range },
        max: vmax + MARGIN_FRACTION * range,
    };
    debug!(?x_axis, ?y_axis, points = x.len(), "area diagram scaled");

    let coordinates = zip_points(x, y);
    let first = coordinates[0];
    Ok(DiagramGeometry {
        coordinates,
        x_axis,
        y_axis,
        kind: DiagramKind::FilledArea,
        closure: PathClosure::ToBaseline {
            baseline: 0.0,
            first,
        },
    })
}

/// The two diagrams of a report, shared with the figures that show them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSet {
    /// Shear force as a line diagram
    pub shear: Arc<DiagramGeometry>,
    /// Bending moment as a filled-area diagram
    pub moment: Arc<DiagramGeometry>,
}

impl DiagramSet {
    /// Scale both diagrams against the dataset positions.
    pub fn for_dataset(dataset: &Dataset) -> ReportResult<Self> {
        Ok(DiagramSet {
            shear: Arc::new(compute_line_diagram(dataset.positions(), dataset.shear_forces())?),
            moment: Arc::new(compute_area_diagram(dataset.positions(), dataset.bending_moments())?),
        })
    }
}

fn x_axis_for(x: &[f64], y: &[f64]) -> ReportResult<AxisSpec> {
    if x.is_empty() {
        return Err(ReportError::integrity("x", 1, 0));
    }
    if y.len() != x.len() {
        return Err(ReportError::integrity("y", x.len(), y.len()));
    }
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if x_max.is_nan() || x_max <= 0.0 {
        return Err(ReportError::degenerate_axis(
            "x",
            format!("largest position is {}, horizontal axis would have no extent", x_max),
        ));
    }
    Ok(AxisSpec { min: 0.0, max: x_max })
}

/// `(min, max, range)` with the flat-series correction applied to `range`.
fn value_range(y: &[f64]) -> (f64, f64, f64) {
    let vmin = y.iter().copied().fold(f64::INFINITY, f64::min);
    let vmax = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut range = vmax - vmin;
    if range < DEGENERATE_RANGE {
        range = vmin.abs().max(vmax.abs()).max(1.0);
    }
    (vmin, vmax, range)
}

fn zip_points(x: &[f64], y: &[f64]) -> Vec<Point> {
    x.iter().zip(y).map(|(&x, &y)| Point { x, y }).collect()
}
