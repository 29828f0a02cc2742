//! # Dataset Validation
//!
//! Turns a raw, column-oriented table (as produced by a
//! [`TableSource`](crate::table_source::TableSource)) into a validated
//! [`Dataset`]: three equal-length, finite, parallel series.
//!
//! ## Column Matching
//!
//! Source labels are normalized before matching: surrounding whitespace and
//! a trailing unit suffix in parentheses are dropped, the rest is lowercased
//! and stripped of whitespace, `_` and `-`. So `"  Shear force (kN) "`,
//! `"shear_force"` and `"ShearForce"` all select the shear series.
//!
//! ## Example
//!
//! ```rust
//! use report_core::dataset::{validate, RawTable, RawValue};
//!
//! let mut table = RawTable::new();
//! table.push_column("x", vec![RawValue::Number(0.0), RawValue::Number(1.0)]);
//! table.push_column("Shear force", vec![RawValue::Number(5.0), RawValue::Number(-5.0)]);
//! table.push_column("Bending Moment", vec![RawValue::Number(0.0), RawValue::Number(0.0)]);
//!
//! let dataset = validate(&table).unwrap();
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.label(report_core::dataset::Field::ShearForce), "Shear force");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ReportError, ReportResult};

// ============================================================================
// Raw Input
// ============================================================================

/// A single cell as delivered by a table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl RawValue {
    /// Interpret the cell as a finite number.
    ///
    /// Text is trimmed and parsed; empty cells, non-numeric text, NaN and
    /// infinities all yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Empty => String::new(),
        }
    }
}

/// One labelled column of raw cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub label: String,
    pub values: Vec<RawValue>,
}

/// Column label → ordered cells, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new() -> Self {
        RawTable::default()
    }

    /// Append a column (builder-style helper for sources and tests)
    pub fn push_column(&mut self, label: impl Into<String>, values: Vec<RawValue>) {
        self.columns.push(RawColumn {
            label: label.into(),
            values,
        });
    }

    /// Column labels exactly as they appear in the source
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// First column whose normalized label matches one of the field's aliases
    pub fn find(&self, field: Field) -> Option<&RawColumn> {
        self.columns
            .iter()
            .find(|c| field.aliases().contains(&normalize_label(&c.label).as_str()))
    }
}

// ============================================================================
// Required Fields
// ============================================================================

/// The three series every report needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Position,
    ShearForce,
    BendingMoment,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Position, Field::ShearForce, Field::BendingMoment];

    /// Canonical field name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Field::Position => "position",
            Field::ShearForce => "shearForce",
            Field::BendingMoment => "bendingMoment",
        }
    }

    /// Normalized labels accepted for this field
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Position => &["x", "position", "distance"],
            Field::ShearForce => &["shearforce", "shear", "v"],
            Field::BendingMoment => &["bendingmoment", "moment", "m"],
        }
    }
}

/// Normalize a column label for matching.
pub fn normalize_label(label: &str) -> String {
    let mut base = label.trim();
    if base.ends_with(')') {
        if let Some(open) = base.rfind('(') {
            base = base[..open].trim_end();
        }
    }
    base.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Validated Dataset
// ============================================================================

/// One row of the validated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub position: f64,
    pub shear_force: f64,
    pub bending_moment: f64,
}

/// Validated, immutable dataset of parallel series.
///
/// Invariant: all series have the same length, at least one, and every value
/// is finite. Positions are expected to be non-decreasing but that is not
/// checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    positions: Vec<f64>,
    shear_forces: Vec<f64>,
    bending_moments: Vec<f64>,
    labels: [String; 3],
}

impl Dataset {
    /// Build a dataset from already-numeric series with canonical labels.
    pub fn new(positions: Vec<f64>, shear_forces: Vec<f64>, bending_moments: Vec<f64>) -> ReportResult<Self> {
        Self::with_labels(
            positions,
            shear_forces,
            bending_moments,
            ["x".to_string(), "Shear force".to_string(), "Bending Moment".to_string()],
        )
    }

    fn with_labels(
        positions: Vec<f64>,
        shear_forces: Vec<f64>,
        bending_moments: Vec<f64>,
        labels: [String; 3],
    ) -> ReportResult<Self> {
        let expected = positions.len();
        if expected == 0 {
            return Err(ReportError::integrity(Field::Position.name(), 1, 0));
        }
        if shear_forces.len() != expected {
            return Err(ReportError::integrity(Field::ShearForce.name(), expected, shear_forces.len()));
        }
        if bending_moments.len() != expected {
            return Err(ReportError::integrity(
                Field::BendingMoment.name(),
                expected,
                bending_moments.len(),
            ));
        }

        for (field, series) in [
            (Field::Position, &positions),
            (Field::ShearForce, &shear_forces),
            (Field::BendingMoment, &bending_moments),
        ] {
            if let Some(row) = series.iter().position(|v| !v.is_finite()) {
                return Err(ReportError::type_error(field.name(), row + 1, series[row].to_string()));
            }
        }

        Ok(Dataset {
            positions,
            shear_forces,
            bending_moments,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for a validated dataset
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn shear_forces(&self) -> &[f64] {
        &self.shear_forces
    }

    pub fn bending_moments(&self) -> &[f64] {
        &self.bending_moments
    }

    /// Series for a field
    pub fn series(&self, field: Field) -> &[f64] {
        match field {
            Field::Position => &self.positions,
            Field::ShearForce => &self.shear_forces,
            Field::BendingMoment => &self.bending_moments,
        }
    }

    /// Source column label that supplied a field
    pub fn label(&self, field: Field) -> &str {
        match field {
            Field::Position => &self.labels[0],
            Field::ShearForce => &self.labels[1],
            Field::BendingMoment => &self.labels[2],
        }
    }

    pub fn record(&self, index: usize) -> Option<Record> {
        Some(Record {
            position: *self.positions.get(index)?,
            shear_force: *self.shear_forces.get(index)?,
            bending_moment: *self.bending_moments.get(index)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.positions
            .iter()
            .zip(&self.shear_forces)
            .zip(&self.bending_moments)
            .map(|((&position, &shear_force), &bending_moment)| Record {
                position,
                shear_force,
                bending_moment,
            })
    }
}

/// Validate a raw table into a [`Dataset`].
///
/// # Errors
///
/// * `Schema` - a required field has no matching column
/// * `Type` - a required cell is empty, non-numeric or non-finite
/// * `Integrity` - the required columns differ in length, or are empty
pub fn validate(table: &RawTable) -> ReportResult<Dataset> {
    let mut columns = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        let column = table
            .find(field)
            .ok_or_else(|| ReportError::schema(field.name(), table.labels()))?;
        debug!(field = field.name(), label = %column.label, "matched column");
        columns.push((field, column));
    }

    // Lengths first, so a short column is reported as such rather than as
    // whatever cell happens to sit at the end of a longer one.
    let expected = columns[0].1.values.len();
    if expected == 0 {
        return Err(ReportError::integrity(Field::Position.name(), 1, 0));
    }
    for (field, column) in &columns[1..] {
        if column.values.len() != expected {
            return Err(ReportError::integrity(field.name(), expected, column.values.len()));
        }
    }

    let mut series: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
    for (field, column) in &columns {
        let values = column
            .values
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_f64()
                    .ok_or_else(|| ReportError::type_error(field.name(), row + 1, cell.describe()))
            })
            .collect::<ReportResult<Vec<f64>>>()?;
        series.push(values);
    }

    let labels = [
        columns[0].1.label.trim().to_string(),
        columns[1].1.label.trim().to_string(),
        columns[2].1.label.trim().to_string(),
    ];
    let bending_moments = series.pop().unwrap_or_default();
    let shear_forces = series.pop().unwrap_or_default();
    let positions = series.pop().unwrap_or_default();

    Dataset::with_labels(positions, shear_forces, bending_moments, labels)
}
