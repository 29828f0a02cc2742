//! # report_core - Beam Force Report Engine
//!
//! `report_core` turns a table of beam measurements (position, shear force,
//! bending moment) into a finished technical report: a validated dataset,
//! summary statistics, scaled diagram geometry and an ordered document model
//! that a renderer turns into a PDF.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions from one stage's output to the next
//! - **JSON-First**: The model, statistics and errors all serialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Format-Agnostic Core**: Only [`render`] knows about Typst or PDF
//!
//! ## Quick Start
//!
//! ```rust
//! use report_core::config::ReportMetadata;
//! use report_core::dataset::Dataset;
//! use report_core::diagram::DiagramSet;
//! use report_core::statistics::summarize;
//! use report_core::builder::build_report;
//! use std::path::Path;
//!
//! let dataset = Dataset::new(
//!     vec![0.0, 1.0, 2.0, 3.0, 4.0],
//!     vec![10.0, 5.0, 0.0, -5.0, -10.0],
//!     vec![0.0, 8.0, 12.0, 8.0, 0.0],
//! ).unwrap();
//!
//! let stats = summarize(&dataset);
//! let diagrams = DiagramSet::for_dataset(&dataset).unwrap();
//! let model = build_report(&dataset, &stats, &diagrams, &ReportMetadata::default(), &|_: &Path| false);
//!
//! assert_eq!(stats.max_moment_index, 2);
//! let json = serde_json::to_string_pretty(&model).unwrap();
//! assert!(json.contains("Shear Force Diagram"));
//! ```
//!
//! ## Modules
//!
//! - [`dataset`] - Raw tables, column matching and validation
//! - [`statistics`] - Extremes, zero-shear and critical-section locations
//! - [`diagram`] - Axis bounds and coordinates for the two diagrams
//! - [`model`] / [`builder`] - The report document tree and its assembly
//! - [`render`] - Renderers (Typst PDF, JSON model)
//! - [`table_source`] - CSV and JSON table readers
//! - [`pipeline`] - All stages wired together
//! - [`config`] - Report metadata and render settings
//! - [`units`] - Fixed-precision formatting and unit labels
//! - [`errors`] - Structured error types

pub mod builder;
pub mod config;
pub mod dataset;
pub mod diagram;
pub mod errors;
pub mod image;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod statistics;
pub mod table_source;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::{load_config, RenderSettings, ReportConfig, ReportMetadata};
pub use dataset::{validate, Dataset, RawTable};
pub use errors::{ReportError, ReportResult};
pub use image::{FsImageLookup, ImageLookup};
pub use model::ReportModel;
pub use pipeline::{generate_report, prepare_report, PreparedReport};
pub use render::{JsonModelRenderer, PdfRenderer, RenderAdapter};
