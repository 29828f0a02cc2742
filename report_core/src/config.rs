//! # Report Configuration
//!
//! Report metadata and render settings. Configuration files are JSON and
//! every field is optional; missing fields fall back to the defaults below.
//!
//! ```text
//! ReportConfig
//! ├── version: config schema version
//! ├── metadata: ReportMetadata (title, author, description, image, units)
//! └── render: RenderSettings (paper, font size, diagram size)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use report_core::config::ReportConfig;
//!
//! let config: ReportConfig = serde_json::from_str(r#"{
//!     "version": "0.1.0",
//!     "metadata": { "title": "Footbridge Girder G2" },
//!     "render": { "paper": "a4" }
//! }"#).unwrap();
//!
//! assert_eq!(config.metadata.title, "Footbridge Girder G2");
//! assert_eq!(config.metadata.units.force, "kN");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ReportError, ReportResult};
use crate::model::short_report_id;
use crate::units::UnitLabels;

/// Current schema version for configuration files
pub const CONFIG_VERSION: &str = "0.1.0";

const DEFAULT_BEAM_DESCRIPTION: &str = "This analysis examines a simply supported beam, which is one of the most \
fundamental structural elements in engineering. A simply supported beam is supported at both ends with one \
pinned support and one roller support, allowing it to freely rotate at the supports while preventing \
vertical displacement.";

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub version: String,
    pub metadata: ReportMetadata,
    pub render: RenderSettings,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            version: CONFIG_VERSION.to_string(),
            metadata: ReportMetadata::default(),
            render: RenderSettings::default(),
        }
    }
}

/// Descriptive information printed on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
    /// Identifier printed in the footer
    pub report_id: Uuid,

    /// Generation timestamp (the report date)
    pub generated: DateTime<Utc>,

    pub title: String,

    pub author: String,

    /// Running header text
    pub header: String,

    /// Running footer text
    pub footer: String,

    /// Narrative for the "Beam Description" subsection
    pub beam_description: String,

    /// Name of the input file as shown in "Data Source"
    pub data_source: String,

    /// Optional illustration of the beam
    pub image_path: Option<PathBuf>,

    pub units: UnitLabels,
}

impl ReportMetadata {
    /// Metadata with default text, a fresh id and the current time.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        ReportMetadata {
            title: title.into(),
            author: author.into(),
            ..ReportMetadata::default()
        }
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }

    pub fn with_image(mut self, image_path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    /// First block of the report id, as printed in the footer
    pub fn short_id(&self) -> String {
        short_report_id(&self.report_id)
    }

    /// Report date as `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.generated.format("%Y-%m-%d").to_string()
    }
}

impl Default for ReportMetadata {
    fn default() -> Self {
        ReportMetadata {
            report_id: Uuid::new_v4(),
            generated: Utc::now(),
            title: "Beam Structural Analysis Report".to_string(),
            author: "Engineering Analysis System".to_string(),
            header: "Beam Analysis Report".to_string(),
            footer: "Simply Supported Beam - Structural Analysis".to_string(),
            beam_description: DEFAULT_BEAM_DESCRIPTION.to_string(),
            data_source: String::new(),
            image_path: None,
            units: UnitLabels::default(),
        }
    }
}

/// Page and diagram layout for the PDF renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Typst paper name (e.g. "us-letter", "a4")
    pub paper: String,

    pub font_size_pt: f64,

    /// Plot area width of each diagram
    pub diagram_width_pt: f64,

    /// Plot area height of each diagram
    pub diagram_height_pt: f64,

    /// Keep the generated `.typ` source next to the PDF
    pub keep_source: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            paper: "us-letter".to_string(),
            font_size_pt: 11.0,
            diagram_width_pt: 380.0,
            diagram_height_pt: 210.0,
            keep_source: false,
        }
    }
}

impl RenderSettings {
    /// Reject sizes the renderer cannot lay out.
    pub fn validate(&self) -> ReportResult<()> {
        for (field, value) in [
            ("render.font_size_pt", self.font_size_pt),
            ("render.diagram_width_pt", self.diagram_width_pt),
            ("render.diagram_height_pt", self.diagram_height_pt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReportError::config(field, format!("must be a positive number, got {}", value)));
            }
        }
        if self.paper.trim().is_empty() {
            return Err(ReportError::config("render.paper", "must not be empty"));
        }
        Ok(())
    }
}

/// Load a configuration file.
///
/// # Errors
///
/// * `Io` - the file cannot be read
/// * `Format` - the file is not valid JSON for [`ReportConfig`]
/// * `Config` - unsupported version or invalid render settings
pub fn load_config(path: &Path) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ReportError::io("read config", path.display().to_string(), e.to_string()))?;

    let config: ReportConfig = serde_json::from_str(&contents)
        .map_err(|e| ReportError::format(path.display().to_string(), e.to_string()))?;

    validate_version(&config.version)?;
    config.render.validate()?;
    Ok(config)
}

/// Validate that a config version is compatible with [`CONFIG_VERSION`].
///
/// Major versions must match; while on 0.x a newer minor is rejected too.
fn validate_version(file_version: &str) -> ReportResult<()> {
    let mismatch = || {
        ReportError::config(
            "version",
            format!("file version {}, expected {}", file_version, CONFIG_VERSION),
        )
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = CONFIG_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.metadata.title, "Beam Structural Analysis Report");
        assert!(config.metadata.image_path.is_none());
        assert!(config.render.validate().is_ok());
    }

    #[test]
    fn test_metadata_builders() {
        let metadata = ReportMetadata::new("G2", "Jane Engineer")
            .with_data_source("force_table.csv")
            .with_image("ssbeam.png");
        assert_eq!(metadata.title, "G2");
        assert_eq!(metadata.data_source, "force_table.csv");
        assert_eq!(metadata.image_path, Some(PathBuf::from("ssbeam.png")));
        assert_eq!(metadata.short_id().len(), 8);
        assert_eq!(metadata.date().len(), 10);
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"metadata": {{"author": "QA", "units": {{"moment": "kip-ft"}}}}, "render": {{"keep_source": true}}}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.metadata.author, "QA");
        assert_eq!(config.metadata.units.moment, "kip-ft");
        assert_eq!(config.metadata.units.force, "kN");
        assert!(config.render.keep_source);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_config_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert_eq!(load_config(file.path()).unwrap_err().error_code(), "FORMAT_ERROR");
    }

    #[test]
    fn test_invalid_render_settings() {
        let settings = RenderSettings {
            diagram_width_pt: 0.0,
            ..RenderSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ReportError::Config { ref field, .. }) if field == "render.diagram_width_pt"
        ));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(CONFIG_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("banana").is_err());
    }
}
