//! # Report Model Builder
//!
//! Assembles the validated dataset, its statistics and the diagram set into
//! a [`ReportModel`]. Assembly is deterministic: the same inputs always give
//! the same tree, with sections in [`SectionKind::ORDER`].
//!
//! Every physical quantity in the narrative and the data table is printed
//! with exactly two decimals (see [`crate::units::fixed2`]).
//!
//! A configured beam image that does not exist is not an error: the figure is
//! replaced by a note saying where the image was expected.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ReportMetadata;
use crate::dataset::{Dataset, Field};
use crate::diagram::{DiagramGeometry, DiagramSet};
use crate::image::ImageLookup;
use crate::model::{ContentBlock, FigureSource, ListStyle, ReportModel, Section, SectionKind, Subsection};
use crate::statistics::{is_moment_symmetric, Statistics};
use crate::units::{fixed2, Quantity};

const ABSTRACT: &str = "This report presents a comprehensive structural analysis of a simply supported beam \
under various loading conditions. The analysis includes the calculation and visualization of shear force \
and bending moment distributions along the beam length. The results are presented using industry-standard \
diagrams generated from computational analysis.";

const DATA_SOURCE_TEXT: &str = "The force and moment data analyzed in this report are extracted from the \
provided data file. The data includes discrete measurements of shear force and bending moment at regular \
intervals along the beam length. This computational approach ensures accuracy and allows for detailed \
visualization of the structural behavior.";

const INPUT_DATA_TEXT: &str = "The following table presents the complete force and moment data extracted \
from the data file. The data includes position coordinates along the beam, shear force values, and bending \
moment values at each position.";

const ANALYSIS_TEXT: &str = "This section presents the graphical analysis of the beam through Shear Force \
and Bending Moment Diagrams. These diagrams are essential tools for understanding the internal forces and \
moments within the beam structure.";

const SFD_DEFINITION: &str = "A Shear Force Diagram (SFD) is a graphical representation showing the \
variation of shear force along the length of the beam. Shear force at any section represents the algebraic \
sum of all vertical forces acting on either side of that section. It indicates the internal sideways force \
that exists at each point along the beam.";

const BMD_DEFINITION: &str = "A Bending Moment Diagram (BMD) illustrates the variation of bending moment \
along the beam length. Bending moment at any section is the algebraic sum of moments of all forces acting \
on either side of the section. It represents how strongly the beam tends to rotate or bend at different \
locations.";

const INTERPRETATION_TEXT: &str = "The structural analysis reveals the following characteristics of the \
beam behavior:";

const CONCLUSION_TEXT: &str = "This report has presented a structural analysis of a simply supported beam, \
including detailed shear force and bending moment diagrams generated from the supplied data. The analysis \
demonstrates:";

const CONCLUSION_CLOSING: &str = "These results provide essential information for structural design and \
safety assessment of the beam under the specified loading conditions.";

/// Builds a [`ReportModel`] from already-validated inputs.
pub struct ReportModelBuilder<'a> {
    dataset: &'a Dataset,
    statistics: &'a Statistics,
    diagrams: &'a DiagramSet,
    metadata: &'a ReportMetadata,
    images: &'a dyn ImageLookup,
}

impl<'a> ReportModelBuilder<'a> {
    pub fn new(
        dataset: &'a Dataset,
        statistics: &'a Statistics,
        diagrams: &'a DiagramSet,
        metadata: &'a ReportMetadata,
        images: &'a dyn ImageLookup,
    ) -> Self {
        ReportModelBuilder {
            dataset,
            statistics,
            diagrams,
            metadata,
            images,
        }
    }

    pub fn build(&self) -> ReportModel {
        let sections: Vec<Section> = SectionKind::ORDER
            .iter()
            .map(|kind| match kind {
                SectionKind::Introduction => self.introduction(),
                SectionKind::InputData => self.input_data(),
                SectionKind::StructuralAnalysis => self.structural_analysis(),
                SectionKind::EngineeringInterpretation => self.interpretation(),
                SectionKind::Conclusion => self.conclusion(),
            })
            .collect();
        debug!(sections = sections.len(), "report model assembled");

        ReportModel {
            report_id: self.metadata.report_id,
            title: self.metadata.title.clone(),
            author: self.metadata.author.clone(),
            date: self.metadata.date(),
            header: self.metadata.header.clone(),
            footer: self.metadata.footer.clone(),
            abstract_text: ABSTRACT.to_string(),
            sections,
        }
    }

    fn length(&self, value: f64) -> String {
        Quantity::new(value, &self.metadata.units.length).to_string()
    }

    fn force(&self, value: f64) -> String {
        Quantity::new(value, &self.metadata.units.force).to_string()
    }

    fn moment(&self, value: f64) -> String {
        Quantity::new(value, &self.metadata.units.moment).to_string()
    }

    fn introduction(&self) -> Section {
        let mut description = Subsection::new("Beam Description").with_paragraph(&self.metadata.beam_description);

        if let Some(path) = &self.metadata.image_path {
            description = if self.images.exists(path) {
                description.with_block(ContentBlock::figure(
                    FigureSource::ExternalImage { path: path.clone() },
                    "Simply Supported Beam Configuration",
                ))
            } else {
                warn!(path = %path.display(), "beam image not found, substituting a note");
                description.with_block(ContentBlock::note(format!(
                    "Note: Beam image not found at {}",
                    path.display()
                )))
            };
        }

        let data_file = if self.metadata.data_source.is_empty() {
            "not specified".to_string()
        } else {
            self.metadata.data_source.clone()
        };
        let data_source = Subsection::new("Data Source")
            .with_paragraph(DATA_SOURCE_TEXT)
            .with_block(ContentBlock::key_value("Data file", data_file))
            .with_block(ContentBlock::key_value(
                "Number of data points",
                format!("{} positions along the beam", self.dataset.len()),
            ))
            .with_block(ContentBlock::key_value("Beam length", self.length(self.statistics.span_length)));

        Section::new(SectionKind::Introduction)
            .with_subsection(description)
            .with_subsection(data_source)
    }

    fn input_data(&self) -> Section {
        let header = Field::ALL
            .iter()
            .map(|field| self.dataset.label(*field).to_string())
            .collect();
        let rows = (0..self.dataset.len())
            .map(|i| {
                Field::ALL
                    .iter()
                    .map(|field| fixed2(self.dataset.series(*field)[i]))
                    .collect()
            })
            .collect();

        Section::new(SectionKind::InputData)
            .with_paragraph(INPUT_DATA_TEXT)
            .with_block(ContentBlock::Table {
                caption: "Force and Moment Data".to_string(),
                header,
                rows,
            })
    }

    fn diagram_figure(&self, geometry: &Arc<DiagramGeometry>, title: &str, quantity: &str, unit: &str) -> ContentBlock {
        ContentBlock::figure(
            FigureSource::Diagram {
                geometry: Arc::clone(geometry),
                title: title.to_string(),
                x_label: format!("Distance along beam ({})", self.metadata.units.length),
                y_label: format!("{} ({})", quantity, unit),
                series_label: quantity.to_string(),
            },
            title,
        )
    }

    fn structural_analysis(&self) -> Section {
        let stats = self.statistics;
        let units = &self.metadata.units;

        let sfd = Subsection::new("Shear Force Diagram (SFD)")
            .with_block(ContentBlock::key_value("Definition", SFD_DEFINITION))
            .with_block(ContentBlock::key_value("Key Observations", ""))
            .with_block(ContentBlock::list(
                ListStyle::Unordered,
                [
                    format!("Maximum positive shear force: {}", self.force(stats.shear.max)),
                    format!("Maximum negative shear force: {}", self.force(stats.shear.min)),
                    format!(
                        "Zero shear occurs at: {}",
                        self.length(stats.zero_shear_position(self.dataset))
                    ),
                ],
            ))
            .with_block(self.diagram_figure(&self.diagrams.shear, "Shear Force Diagram", "Shear Force", &units.force));

        let bmd = Subsection::new("Bending Moment Diagram (BMD)")
            .with_block(ContentBlock::key_value("Definition", BMD_DEFINITION))
            .with_block(ContentBlock::key_value("Key Observations", ""))
            .with_block(ContentBlock::list(
                ListStyle::Unordered,
                [
                    format!("Maximum bending moment: {}", self.moment(stats.moment.max)),
                    format!(
                        "Location of maximum moment: {}",
                        self.length(stats.max_moment_position(self.dataset))
                    ),
                    format!(
                        "Moment at supports: {} (left), {} (right)",
                        self.moment(stats.left_support_moment),
                        self.moment(stats.right_support_moment)
                    ),
                ],
            ))
            .with_block(self.diagram_figure(
                &self.diagrams.moment,
                "Bending Moment Diagram",
                "Bending Moment",
                &units.moment,
            ));

        Section::new(SectionKind::StructuralAnalysis)
            .with_paragraph(ANALYSIS_TEXT)
            .with_subsection(sfd)
            .with_subsection(bmd)
    }

    fn interpretation(&self) -> Section {
        let stats = self.statistics;
        let dataset = self.dataset;
        let zero_shear_at = self.length(stats.zero_shear_position(dataset));
        let max_moment_at = self.length(stats.max_moment_position(dataset));

        let flexure = format!(
            "The critical section for flexural design is at {}, where the bending moment reaches {}.",
            max_moment_at,
            self.moment(stats.moment.max)
        );
        let zero_shear = if stats.zero_shear_at_max_moment() {
            format!(
                "Shear force is closest to zero at {} ({}), coinciding with the section of maximum bending moment.",
                zero_shear_at,
                self.force(dataset.shear_forces()[stats.zero_shear_index])
            )
        } else {
            format!(
                "Shear force is closest to zero at {} ({}), while the maximum bending moment occurs at {}.",
                zero_shear_at,
                self.force(dataset.shear_forces()[stats.zero_shear_index]),
                max_moment_at
            )
        };
        let shear = format!(
            "The largest shear magnitude, {}, occurs at {}, the critical section for shear design.",
            self.force(stats.max_abs_shear(dataset)),
            self.length(stats.max_abs_shear_position(dataset))
        );
        let symmetry = if is_moment_symmetric(dataset) {
            "The bending moment distribution is symmetric about mid-span, consistent with a symmetric loading condition."
        } else {
            "The bending moment distribution is not symmetric about mid-span, indicating an asymmetric loading condition."
        };

        Section::new(SectionKind::EngineeringInterpretation)
            .with_paragraph(INTERPRETATION_TEXT)
            .with_block(ContentBlock::list(
                ListStyle::Ordered,
                [flexure, zero_shear, shear, symmetry.to_string()],
            ))
    }

    fn conclusion(&self) -> Section {
        Section::new(SectionKind::Conclusion)
            .with_paragraph(CONCLUSION_TEXT)
            .with_block(ContentBlock::list(
                ListStyle::Unordered,
                [
                    "Clear visualization of internal force distributions",
                    "Identification of critical sections for design",
                    "Verification of expected structural behavior",
                    "Professional presentation using industry-standard diagrams",
                ],
            ))
            .with_paragraph(CONCLUSION_CLOSING)
    }
}

/// Build the report model in one call.
pub fn build_report(
    dataset: &Dataset,
    statistics: &Statistics,
    diagrams: &DiagramSet,
    metadata: &ReportMetadata,
    images: &dyn ImageLookup,
) -> ReportModel {
    ReportModelBuilder::new(dataset, statistics, diagrams, metadata, images).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::summarize;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn beam() -> Dataset {
        Dataset::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![10.0, 5.0, 0.0, -5.0, -10.0],
            vec![0.0, 8.0, 12.0, 8.0, 0.0],
        )
        .unwrap()
    }

    fn build_with(metadata: &ReportMetadata, images: &dyn ImageLookup) -> (DiagramSet, ReportModel) {
        let dataset = beam();
        let stats = summarize(&dataset);
        let diagrams = DiagramSet::for_dataset(&dataset).unwrap();
        let model = build_report(&dataset, &stats, &diagrams, metadata, images);
        (diagrams, model)
    }

    fn list_items(section: &Section) -> Vec<String> {
        section
            .all_blocks()
            .filter_map(|b| match b {
                ContentBlock::List { items, .. } => Some(items.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn test_section_order_is_fixed() {
        let (_, model) = build_with(&ReportMetadata::default(), &|_: &Path| false);
        let kinds: Vec<SectionKind> = model.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ORDER.to_vec());
    }

    #[test]
    fn test_key_observations_use_two_decimals() {
        let (_, model) = build_with(&ReportMetadata::default(), &|_: &Path| false);
        let items = list_items(model.section(SectionKind::StructuralAnalysis).unwrap());
        assert_eq!(
            items,
            vec![
                "Maximum positive shear force: 10.00 kN",
                "Maximum negative shear force: -10.00 kN",
                "Zero shear occurs at: 2.00 m",
                "Maximum bending moment: 12.00 kN·m",
                "Location of maximum moment: 2.00 m",
                "Moment at supports: 0.00 kN·m (left), 0.00 kN·m (right)",
            ]
        );
    }

    #[test]
    fn test_input_table_rows() {
        let (_, model) = build_with(&ReportMetadata::default(), &|_: &Path| false);
        let table = model
            .section(SectionKind::InputData)
            .unwrap()
            .blocks
            .iter()
            .find_map(|b| match b {
                ContentBlock::Table { header, rows, .. } => Some((header.clone(), rows.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.0, vec!["x", "Shear force", "Bending Moment"]);
        assert_eq!(table.1.len(), 5);
        assert_eq!(table.1[3], vec!["3.00", "-5.00", "8.00"]);
    }

    #[test]
    fn test_figures_share_diagram_geometry() {
        let (diagrams, model) = build_with(&ReportMetadata::default(), &|_: &Path| false);
        let figures: Vec<_> = model.diagram_figures().collect();
        assert_eq!(figures.len(), 2);
        assert!(Arc::ptr_eq(figures[0], &diagrams.shear));
        assert!(Arc::ptr_eq(figures[1], &diagrams.moment));
    }

    #[test]
    fn test_missing_image_becomes_note() {
        let metadata = ReportMetadata::default().with_image("ssbeam.png");
        let (_, model) = build_with(&metadata, &|_: &Path| false);

        let intro = model.section(SectionKind::Introduction).unwrap();
        let note = intro.all_blocks().find(|b| b.kind() == "note").unwrap();
        assert_eq!(note, &ContentBlock::note("Note: Beam image not found at ssbeam.png"));
        assert!(!intro.all_blocks().any(|b| b.kind() == "figure"));
    }

    #[test]
    fn test_present_image_becomes_figure() {
        let metadata = ReportMetadata::default().with_image("ssbeam.png");
        let (_, model) = build_with(&metadata, &|_: &Path| true);

        let intro = model.section(SectionKind::Introduction).unwrap();
        match intro.all_blocks().find(|b| b.kind() == "figure").unwrap() {
            ContentBlock::Figure {
                source: FigureSource::ExternalImage { path },
                caption,
            } => {
                assert_eq!(path, Path::new("ssbeam.png"));
                assert_eq!(caption, "Simply Supported Beam Configuration");
            }
            other => panic!("unexpected block {:?}", other),
        };
    }

    #[test]
    fn test_no_image_configured_adds_nothing() {
        let (_, model) = build_with(&ReportMetadata::default(), &|_: &Path| true);
        let intro = model.section(SectionKind::Introduction).unwrap();
        assert!(!intro.all_blocks().any(|b| matches!(b.kind(), "figure" | "note")));
    }

    #[test]
    fn test_data_source_key_values() {
        let metadata = ReportMetadata::default().with_data_source("force_table.csv");
        let (_, model) = build_with(&metadata, &|_: &Path| false);
        let intro = model.section(SectionKind::Introduction).unwrap();
        let pairs: Vec<(String, String)> = intro
            .all_blocks()
            .filter_map(|b| match b {
                ContentBlock::KeyValue { label, value } => Some((label.clone(), value.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Data file".to_string(), "force_table.csv".to_string()),
                ("Number of data points".to_string(), "5 positions along the beam".to_string()),
                ("Beam length".to_string(), "4.00 m".to_string()),
            ]
        );
    }

    #[test]
    fn test_interpretation_is_data_driven() {
        let (_, model) = build_with(&ReportMetadata::default(), &|_: &Path| false);
        let items = list_items(model.section(SectionKind::EngineeringInterpretation).unwrap());
        assert_eq!(items.len(), 4);
        assert!(items[0].contains("2.00 m") && items[0].contains("12.00 kN·m"));
        assert!(items[1].contains("coinciding"));
        assert!(items[2].contains("10.00 kN") && items[2].contains("0.00 m"));
        assert!(items[3].contains("is symmetric"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let metadata = ReportMetadata::default();
        let (_, first) = build_with(&metadata, &|_: &Path| false);
        let (_, second) = build_with(&metadata, &|_: &Path| false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_units_flow_into_text() {
        let mut metadata = ReportMetadata::default();
        metadata.units.force = "kip".to_string();
        let (_, model) = build_with(&metadata, &|_: &Path| false);
        let items = list_items(model.section(SectionKind::StructuralAnalysis).unwrap());
        assert_eq!(items[0], "Maximum positive shear force: 10.00 kip");
    }
}
