//! # Report Model
//!
//! Backend-independent document tree handed whole to a
//! [`RenderAdapter`](crate::render::RenderAdapter).
//!
//! ```text
//! ReportModel
//! ├── title / author / date / report id / abstract
//! └── sections: Vec<Section>          (fixed order, see SectionKind)
//!     ├── blocks: Vec<ContentBlock>
//!     └── subsections: Vec<Subsection>
//!         └── blocks: Vec<ContentBlock>
//! ```
//!
//! Sections and subsections are assembled with `with_*` builder methods and
//! are not mutated afterwards. Figure blocks hold diagram geometry through an
//! [`Arc`], so a figure and the diagram set it came from share one value.
//!
//! ## Example
//!
//! ```rust
//! use report_core::model::{ContentBlock, ListStyle, Section, SectionKind, Subsection};
//!
//! let section = Section::new(SectionKind::Conclusion)
//!     .with_paragraph("The analysis demonstrates:")
//!     .with_block(ContentBlock::list(ListStyle::Unordered, ["Clear diagrams"]))
//!     .with_subsection(Subsection::new("Notes").with_paragraph("None."));
//!
//! assert_eq!(section.title, "Conclusion");
//! assert_eq!(section.blocks.len(), 2);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagram::DiagramGeometry;

/// First block of a report id, short enough for a footer
pub fn short_report_id(id: &Uuid) -> String {
    let mut simple = id.simple().to_string();
    simple.truncate(8);
    simple
}

/// The top-level sections, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    Introduction,
    InputData,
    StructuralAnalysis,
    EngineeringInterpretation,
    Conclusion,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 5] = [
        SectionKind::Introduction,
        SectionKind::InputData,
        SectionKind::StructuralAnalysis,
        SectionKind::EngineeringInterpretation,
        SectionKind::Conclusion,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Introduction => "Introduction",
            SectionKind::InputData => "Input Data",
            SectionKind::StructuralAnalysis => "Structural Analysis",
            SectionKind::EngineeringInterpretation => "Engineering Interpretation",
            SectionKind::Conclusion => "Conclusion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListStyle {
    Ordered,
    Unordered,
}

/// What a figure shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FigureSource {
    /// A computed diagram, shared with the diagram set
    Diagram {
        geometry: Arc<DiagramGeometry>,
        title: String,
        x_label: String,
        y_label: String,
        series_label: String,
    },
    /// An image file that existed when the model was built
    ExternalImage { path: PathBuf },
}

/// A typed piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String },
    List { style: ListStyle, items: Vec<String> },
    KeyValue { label: String, value: String },
    Table {
        caption: String,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Figure { source: FigureSource, caption: String },
    /// Explanatory placeholder standing in for content that could not be
    /// included (rendered as an italic note)
    Note { text: String },
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    pub fn list<I, S>(style: ListStyle, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentBlock::List {
            style,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        ContentBlock::KeyValue {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        ContentBlock::Note { text: text.into() }
    }

    pub fn figure(source: FigureSource, caption: impl Into<String>) -> Self {
        ContentBlock::Figure {
            source,
            caption: caption.into(),
        }
    }

    /// Block kind name, as used in the serialized model
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::List { .. } => "list",
            ContentBlock::KeyValue { .. } => "key_value",
            ContentBlock::Table { .. } => "table",
            ContentBlock::Figure { .. } => "figure",
            ContentBlock::Note { .. } => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

impl Subsection {
    pub fn new(title: impl Into<String>) -> Self {
        Subsection {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_paragraph(self, text: impl Into<String>) -> Self {
        self.with_block(ContentBlock::paragraph(text))
    }
}

/// A top-level section. Blocks render before subsections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Section {
            kind,
            title: kind.title().to_string(),
            blocks: Vec::new(),
            subsections: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_paragraph(self, text: impl Into<String>) -> Self {
        self.with_block(ContentBlock::paragraph(text))
    }

    pub fn with_subsection(mut self, subsection: Subsection) -> Self {
        self.subsections.push(subsection);
        self
    }

    /// Every block in the section, subsections included, in reading order
    pub fn all_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks
            .iter()
            .chain(self.subsections.iter().flat_map(|s| s.blocks.iter()))
    }
}

/// The complete document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportModel {
    pub report_id: Uuid,
    pub title: String,
    pub author: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub header: String,
    pub footer: String,
    pub abstract_text: String,
    pub sections: Vec<Section>,
}

impl ReportModel {
    pub fn short_id(&self) -> String {
        short_report_id(&self.report_id)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Every block in the document in reading order
    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.sections.iter().flat_map(|s| s.all_blocks())
    }

    /// Figures that show computed diagrams
    pub fn diagram_figures(&self) -> impl Iterator<Item = &Arc<DiagramGeometry>> {
        self.blocks().filter_map(|block| match block {
            ContentBlock::Figure {
                source: FigureSource::Diagram { geometry, .. },
                ..
            } => Some(geometry),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::compute_line_diagram;

    #[test]
    fn test_short_report_id() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(short_report_id(&id), "67e55044");
    }

    #[test]
    fn test_section_order_titles() {
        let titles: Vec<&str> = SectionKind::ORDER.iter().map(|k| k.title()).collect();
        assert_eq!(
            titles,
            vec![
                "Introduction",
                "Input Data",
                "Structural Analysis",
                "Engineering Interpretation",
                "Conclusion"
            ]
        );
    }

    #[test]
    fn test_all_blocks_reading_order() {
        let section = Section::new(SectionKind::Introduction)
            .with_paragraph("lead")
            .with_subsection(Subsection::new("A").with_paragraph("a1"))
            .with_subsection(Subsection::new("B").with_block(ContentBlock::note("b1")));

        let kinds: Vec<&str> = section.all_blocks().map(|b| b.kind()).collect();
        assert_eq!(kinds, vec!["paragraph", "paragraph", "note"]);
    }

    #[test]
    fn test_block_serialization_is_tagged() {
        let block = ContentBlock::key_value("Beam length", "4.00 m");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "key_value");
        assert_eq!(json["label"], "Beam length");
    }

    #[test]
    fn test_figure_shares_geometry() {
        let geometry = Arc::new(compute_line_diagram(&[0.0, 1.0], &[1.0, -1.0]).unwrap());
        let block = ContentBlock::figure(
            FigureSource::Diagram {
                geometry: Arc::clone(&geometry),
                title: "Shear Force Diagram".into(),
                x_label: "x".into(),
                y_label: "V".into(),
                series_label: "Shear Force".into(),
            },
            "Shear Force Diagram",
        );

        match block {
            ContentBlock::Figure {
                source: FigureSource::Diagram { geometry: shared, .. },
                ..
            } => assert!(Arc::ptr_eq(&shared, &geometry)),
            other => panic!("unexpected block {:?}", other),
        }
    }
}
