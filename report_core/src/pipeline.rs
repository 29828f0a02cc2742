//! # Pipeline
//!
//! Runs the stages in order: load the raw table, validate it, summarize,
//! scale the diagrams, build the model and hand it to a renderer. Each stage
//! only sees the output of the one before it, and the first error stops the
//! run before anything is written.
//!
//! ```rust
//! use report_core::config::ReportMetadata;
//! use report_core::dataset::{RawTable, RawValue};
//! use report_core::pipeline::prepare_report;
//! use std::path::Path;
//!
//! let mut table = RawTable::new();
//! let column = |v: &[f64]| v.iter().copied().map(RawValue::Number).collect();
//! table.push_column("x", column(&[0.0, 1.0, 2.0]));
//! table.push_column("Shear force", column(&[4.0, 0.0, -4.0]));
//! table.push_column("Bending Moment", column(&[0.0, 2.0, 0.0]));
//!
//! let prepared = prepare_report(&table, &ReportMetadata::default(), &|_: &Path| false).unwrap();
//! assert_eq!(prepared.statistics.zero_shear_index, 1);
//! assert_eq!(prepared.model.sections.len(), 5);
//! ```

use std::path::Path;

use tracing::info;

use crate::builder::build_report;
use crate::config::ReportMetadata;
use crate::dataset::{validate, Dataset, RawTable};
use crate::diagram::DiagramSet;
use crate::errors::ReportResult;
use crate::image::ImageLookup;
use crate::model::ReportModel;
use crate::render::RenderAdapter;
use crate::statistics::{summarize, Statistics};
use crate::table_source::table_source_for;

/// Everything derived from one input table.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub dataset: Dataset,
    pub statistics: Statistics,
    pub diagrams: DiagramSet,
    pub model: ReportModel,
}

/// Load a raw table, choosing the reader by file extension.
pub fn load_table(path: &Path) -> ReportResult<RawTable> {
    let table = table_source_for(path)?.load(path)?;
    info!(path = %path.display(), columns = table.columns.len(), "table loaded");
    Ok(table)
}

/// Validate a raw table and derive everything the renderer needs.
///
/// # Errors
///
/// Any validation error from [`validate`], or `DegenerateAxis` when all
/// positions are zero.
pub fn prepare_report(
    table: &RawTable,
    metadata: &ReportMetadata,
    images: &dyn ImageLookup,
) -> ReportResult<PreparedReport> {
    let dataset = validate(table)?;
    info!(records = dataset.len(), "dataset validated");

    let statistics = summarize(&dataset);
    info!(
        max_shear = statistics.shear.max,
        max_moment = statistics.moment.max,
        zero_shear_index = statistics.zero_shear_index,
        "statistics computed"
    );

    let diagrams = DiagramSet::for_dataset(&dataset)?;
    info!("diagram geometry computed");

    let model = build_report(&dataset, &statistics, &diagrams, metadata, images);
    info!(sections = model.sections.len(), "report model built");

    Ok(PreparedReport {
        dataset,
        statistics,
        diagrams,
        model,
    })
}

/// Full run from an input file to a rendered artifact.
pub fn generate_report(
    input: &Path,
    output: &Path,
    metadata: &ReportMetadata,
    images: &dyn ImageLookup,
    renderer: &dyn RenderAdapter,
) -> ReportResult<PreparedReport> {
    let table = load_table(input)?;
    let prepared = prepare_report(&table, metadata, images)?;
    renderer.render(&prepared.model, output)?;
    info!(output = %output.display(), "report generated");
    Ok(prepared)
}
