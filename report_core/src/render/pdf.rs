//! # PDF Rendering
//!
//! Compiles the generated Typst markup in-process and writes the PDF.
//!
//! - Fonts come from `typst-assets` and are loaded once per process
//! - External images are read from disk and mounted at virtual paths
//! - Output is raw PDF bytes (`Vec<u8>`) or an atomically written file
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use report_core::config::{RenderSettings, ReportMetadata};
//! use report_core::render::{PdfRenderer, RenderAdapter};
//! # fn model() -> report_core::model::ReportModel { unimplemented!() }
//!
//! let renderer = PdfRenderer::new(RenderSettings::default());
//! renderer.render(&model(), Path::new("output.pdf")).unwrap();
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use tracing::{debug, info};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use super::typst_source::{to_typst_source, TypstDocument};
use super::{write_atomic, RenderAdapter};
use crate::config::RenderSettings;
use crate::errors::{ReportError, ReportResult};
use crate::model::ReportModel;

static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
        .collect()
});

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A Typst world holding one source document and its image files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
    /// Image bytes keyed by rootless virtual path
    files: HashMap<PathBuf, Bytes>,
}

impl PdfWorld {
    fn new(source: String, files: HashMap<PathBuf, Bytes>) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
            files,
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rootless_path();
        if id.package().is_none() {
            if let Some(bytes) = self.files.get(path) {
                return Ok(bytes.clone());
            }
        }
        Err(FileError::NotFound(path.into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), now.month().try_into().ok()?, now.day().try_into().ok()?)
    }
}

// ============================================================================
// PDF Rendering Functions
// ============================================================================

fn load_images(document: &TypstDocument) -> ReportResult<HashMap<PathBuf, Bytes>> {
    let mut files = HashMap::new();
    for (virtual_path, path) in &document.images {
        let bytes = fs::read(path)
            .map_err(|e| ReportError::render(format!("cannot read image '{}': {}", path.display(), e)))?;
        files.insert(
            PathBuf::from(virtual_path.trim_start_matches('/')),
            Bytes::new(bytes),
        );
    }
    Ok(files)
}

fn compile(document: &TypstDocument) -> ReportResult<Vec<u8>> {
    let world = PdfWorld::new(document.source.clone(), load_images(document)?);

    let warned = typst::compile(&world);
    for warning in &warned.warnings {
        debug!(message = %warning.message, "typst warning");
    }

    let compiled = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ReportError::render(format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    typst_pdf::pdf(&compiled, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ReportError::render(format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })
}

/// Render a report model to PDF bytes.
///
/// # Errors
///
/// `Render` if an image cannot be read or Typst rejects the document.
pub fn render_pdf_bytes(model: &ReportModel, settings: &RenderSettings) -> ReportResult<Vec<u8>> {
    compile(&to_typst_source(model, settings))
}

/// Renders to a PDF file through Typst.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    pub settings: RenderSettings,
}

impl PdfRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        PdfRenderer { settings }
    }
}

impl RenderAdapter for PdfRenderer {
    fn render(&self, model: &ReportModel, target: &Path) -> ReportResult<()> {
        let document = to_typst_source(model, &self.settings);
        let pdf = compile(&document)?;
        write_atomic(target, &pdf)?;
        info!(path = %target.display(), bytes = pdf.len(), "pdf written");

        if self.settings.keep_source {
            let source_path = target.with_extension("typ");
            if let Err(err) = write_atomic(&source_path, document.source.as_bytes()) {
                let _ = fs::remove_file(target);
                return Err(err);
            }
            info!(path = %source_path.display(), "typst source kept");
        }
        Ok(())
    }
}
