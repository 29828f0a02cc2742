//! # Rendering
//!
//! A [`RenderAdapter`] turns a finished [`ReportModel`] into an artifact on
//! disk. The core never looks at the output format; it only hands the model
//! over.
//!
//! - [`PdfRenderer`] - Typst markup compiled to PDF with bundled fonts
//! - [`JsonModelRenderer`] - the model itself, as pretty JSON
//!
//! Both write atomically: a failed render leaves no artifact behind.

mod pdf;
mod typst_source;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::{ReportError, ReportResult};
use crate::model::ReportModel;

pub use pdf::{render_pdf_bytes, PdfRenderer};
pub use typst_source::{escape_typst, to_typst_source, TypstDocument};

/// Consumes a report model and produces the final artifact.
pub trait RenderAdapter {
    /// # Errors
    ///
    /// `Render` on any failure; render errors are not retryable.
    fn render(&self, model: &ReportModel, target: &Path) -> ReportResult<()>;
}

/// Writes the model as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelRenderer;

impl RenderAdapter for JsonModelRenderer {
    fn render(&self, model: &ReportModel, target: &Path) -> ReportResult<()> {
        let json = serde_json::to_string_pretty(model).map_err(|e| ReportError::render(e.to_string()))?;
        write_atomic(target, json.as_bytes())?;
        info!(path = %target.display(), "report model written");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes with atomic replace semantics.
///
/// 1. Write to `<target>.tmp`
/// 2. Sync to disk
/// 3. Rename over the target
///
/// The temp file is removed if any step fails.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> ReportResult<()> {
    let tmp_path = temp_path_for(path);
    let fail = |operation: &str, e: std::io::Error| {
        let _ = fs::remove_file(&tmp_path);
        ReportError::render(format!("{} '{}': {}", operation, tmp_path.display(), e))
    };

    let mut tmp_file = File::create(&tmp_path).map_err(|e| fail("create temp file", e))?;
    tmp_file.write_all(bytes).map_err(|e| fail("write temp file", e))?;
    tmp_file.sync_all().map_err(|e| fail("sync temp file", e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ReportError::render(format!("rename to '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_report;
    use crate::config::ReportMetadata;
    use crate::dataset::Dataset;
    use crate::diagram::DiagramSet;
    use crate::statistics::summarize;

    pub(crate) fn sample_model(metadata: &ReportMetadata) -> ReportModel {
        let dataset = Dataset::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![10.0, 5.0, 0.0, -5.0, -10.0],
            vec![0.0, 8.0, 12.0, 8.0, 0.0],
        )
        .unwrap();
        let stats = summarize(&dataset);
        let diagrams = DiagramSet::for_dataset(&dataset).unwrap();
        build_report(&dataset, &stats, &diagrams, metadata, &|_: &Path| false)
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(temp_path_for(Path::new("/out/report.pdf")), Path::new("/out/report.pdf.tmp"));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        write_atomic(&target, b"hello").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"hello");
        assert!(!temp_path_for(&target).exists());
    }

    #[test]
    fn test_write_atomic_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.bin");
        let err = write_atomic(&target, b"hello").unwrap_err();
        assert_eq!(err.error_code(), "RENDER_ERROR");
        assert!(!target.exists());
    }

    #[test]
    fn test_json_model_renderer_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("model.json");
        let model = sample_model(&ReportMetadata::default());

        JsonModelRenderer.render(&model, &target).unwrap();

        let loaded: ReportModel = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(loaded, model);
    }
}
