//! Typst markup generation from a [`ReportModel`].
//!
//! Diagrams are drawn with Typst primitives (`curve`, `line`, `rect`) placed
//! inside a fixed-size box. Model coordinates are mapped to points with the
//! geometry's own axis bounds, so the picture uses exactly the scaling the
//! model carries.

use std::fmt::Write;
use std::path::PathBuf;

use crate::config::RenderSettings;
use crate::diagram::{DiagramGeometry, DiagramKind, PathClosure, Point};
use crate::model::{ContentBlock, FigureSource, ListStyle, ReportModel, Section};
use crate::units::fixed2;

/// Space around the plot area for tick labels, axis labels and the title.
const LEFT_GUTTER: f64 = 56.0;
const BOTTOM_GUTTER: f64 = 40.0;
const TOP_GUTTER: f64 = 22.0;
const RIGHT_GUTTER: f64 = 12.0;

/// Ticks per axis, including both ends.
const TICKS: usize = 5;

/// Generated markup plus the images it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct TypstDocument {
    pub source: String,
    /// `(virtual path used in the markup, file on disk)`
    pub images: Vec<(String, PathBuf)>,
}

/// Escape special Typst characters in user-provided text.
///
/// Hyphens are always escaped (`--`, `---` and `-?` are shorthands, `- ` a
/// list marker). Heading, enum and term markers are escaped at line starts.
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut line_start = true;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '/' | '~' | '-' => {
                out.push('\\');
                out.push(c);
            }
            '=' | '+' if line_start => {
                out.push('\\');
                out.push(c);
            }
            '0'..='9' if line_start => {
                out.push(c);
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    out.push(d);
                }
                // `1.` starts a numbered list
                if chars.peek() == Some(&'.') {
                    out.push('\\');
                }
            }
            _ => out.push(c),
        }
        line_start = c == '\n' || (line_start && c.is_whitespace());
    }
    out
}

/// Quote text as a Typst string literal
fn typst_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn pt(value: f64) -> String {
    format!("{:.2}pt", value)
}

/// Generate the complete Typst document for a model.
pub fn to_typst_source(model: &ReportModel, settings: &RenderSettings) -> TypstDocument {
    let mut out = String::new();
    let mut images = Vec::new();

    write_preamble(&mut out, model, settings);
    write_title_page(&mut out, model);

    for (i, section) in model.sections.iter().enumerate() {
        if i > 0 {
            out.push_str("#pagebreak()\n\n");
        }
        write_section(&mut out, section, settings, &mut images);
    }

    TypstDocument { source: out, images }
}

fn write_preamble(out: &mut String, model: &ReportModel, settings: &RenderSettings) {
    let short_id = model.short_id();
    let _ = write!(
        out,
        r##"#set document(title: {title}, author: {author})

#set page(
  paper: {paper},
  margin: (top: 1in, bottom: 1in, left: 1in, right: 1in),
  header: context [
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt, fill: gray)[{header}]],
      align(right)[#text(size: 9pt, fill: gray)[#counter(page).display()]],
    )
  ],
  footer: [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 2fr, 1fr),
      align(left)[#text(size: 9pt)[Report {short_id}]],
      align(center)[#text(size: 9pt)[{footer}]],
      align(right)[#text(size: 9pt)[{date}]],
    )
  ]
)

#set text(size: {font_size})
#set par(justify: true)
#set heading(numbering: "1.1")
#show figure.where(kind: table): set figure.caption(position: top)

"##,
        title = typst_string(&model.title),
        author = typst_string(&model.author),
        paper = typst_string(&settings.paper),
        header = escape_typst(&model.header),
        footer = escape_typst(&model.footer),
        date = escape_typst(&model.date),
        font_size = pt(settings.font_size_pt),
    );
}

fn write_title_page(out: &mut String, model: &ReportModel) {
    let _ = write!(
        out,
        r##"#align(center)[
  #v(3cm)
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 16pt, radius: 4pt)[
    #text(size: 20pt, weight: "bold")[{title}]
  ]
  #v(12pt)
  #text(size: 13pt)[{author}]
  #v(4pt)
  #text(size: 11pt)[{date}]
]

#v(2cm)

#align(center)[#text(size: 13pt, weight: "bold")[Abstract]]

#v(0.5cm)

{abstract_text}

#pagebreak()

#outline()

#pagebreak()

"##,
        title = escape_typst(&model.title),
        author = escape_typst(&model.author),
        date = escape_typst(&model.date),
        abstract_text = escape_typst(&model.abstract_text),
    );
}

fn write_section(out: &mut String, section: &Section, settings: &RenderSettings, images: &mut Vec<(String, PathBuf)>) {
    let _ = writeln!(out, "= {}\n", escape_typst(&section.title));
    write_blocks(out, &section.blocks, settings, images);

    for subsection in &section.subsections {
        let _ = writeln!(out, "== {}\n", escape_typst(&subsection.title));
        write_blocks(out, &subsection.blocks, settings, images);
    }
}

fn write_blocks(
    out: &mut String,
    blocks: &[ContentBlock],
    settings: &RenderSettings,
    images: &mut Vec<(String, PathBuf)>,
) {
    for (i, block) in blocks.iter().enumerate() {
        match block {
            ContentBlock::Paragraph { text } => {
                let _ = write!(out, "{}\n\n", escape_typst(text));
            }
            ContentBlock::List { style, items } => {
                let marker = match style {
                    ListStyle::Ordered => '+',
                    ListStyle::Unordered => '-',
                };
                for item in items {
                    let _ = writeln!(out, "{} {}", marker, escape_typst(item));
                }
                out.push('\n');
            }
            ContentBlock::KeyValue { label, value } => {
                let _ = write!(out, "*{}:*", escape_typst(label));
                if !value.is_empty() {
                    let _ = write!(out, " {}", escape_typst(value));
                }
                // consecutive pairs share one paragraph, one per line
                let next_is_pair = matches!(blocks.get(i + 1), Some(ContentBlock::KeyValue { .. }));
                out.push_str(if next_is_pair { " \\\n" } else { "\n\n" });
            }
            ContentBlock::Table { caption, header, rows } => write_table(out, caption, header, rows),
            ContentBlock::Figure { source, caption } => match source {
                FigureSource::Diagram {
                    geometry,
                    title,
                    x_label,
                    y_label,
                    series_label,
                } => {
                    let labels = DiagramLabels {
                        title,
                        x_label,
                        y_label,
                        series_label,
                    };
                    let drawing = diagram_markup(geometry, &labels, settings);
                    let _ = write!(out, "#figure(\n{},\n  caption: [{}],\n)\n\n", drawing, escape_typst(caption));
                }
                FigureSource::ExternalImage { path } => {
                    let extension = path
                        .extension()
                        .map(|e| e.to_string_lossy().to_lowercase())
                        .unwrap_or_else(|| "png".to_string());
                    let virtual_path = format!("/images/image-{}.{}", images.len() + 1, extension);
                    let _ = write!(
                        out,
                        "#figure(\n  image({}, width: 80%),\n  caption: [{}],\n)\n\n",
                        typst_string(&virtual_path),
                        escape_typst(caption)
                    );
                    images.push((virtual_path, path.clone()));
                }
            },
            ContentBlock::Note { text } => {
                let _ = write!(out, "#emph[{}]\n\n", escape_typst(text));
            }
        }
    }
}

fn write_table(out: &mut String, caption: &str, header: &[String], rows: &[Vec<String>]) {
    let _ = write!(
        out,
        "#figure(\n  table(\n    columns: {},\n    inset: 6pt,\n    stroke: 0.5pt,\n    align: center,\n    table.header(",
        header.len().max(1)
    );
    let cells: Vec<String> = header.iter().map(|h| format!("[*{}*]", escape_typst(h))).collect();
    out.push_str(&cells.join(", "));
    out.push_str("),\n");
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| format!("[{}]", escape_typst(c))).collect();
        let _ = writeln!(out, "    {},", cells.join(", "));
    }
    let _ = write!(out, "  ),\n  caption: [{}],\n)\n\n", escape_typst(caption));
}

struct DiagramLabels<'a> {
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    series_label: &'a str,
}

/// Maps model coordinates into the plot area of a diagram box.
struct PlotFrame<'a> {
    geometry: &'a DiagramGeometry,
    width: f64,
    height: f64,
}

impl PlotFrame<'_> {
    fn x(&self, value: f64) -> f64 {
        LEFT_GUTTER + self.geometry.x_axis.fraction(value) * self.width
    }

    fn y(&self, value: f64) -> f64 {
        TOP_GUTTER + (1.0 - self.geometry.y_axis.fraction(value)) * self.height
    }

    fn point(&self, p: &Point) -> String {
        format!("({}, {})", pt(self.x(p.x)), pt(self.y(p.y)))
    }
}

fn series_color(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Line => "blue",
        DiagramKind::FilledArea => "purple",
    }
}

fn place(dx: f64, dy: f64, body: &str) -> String {
    format!("    place(top + left, dx: {}, dy: {}, {})\n", pt(dx), pt(dy), body)
}

/// Typst code for one diagram: a box holding grid, axes, series and labels.
fn diagram_markup(geometry: &DiagramGeometry, labels: &DiagramLabels<'_>, settings: &RenderSettings) -> String {
    let frame = PlotFrame {
        geometry,
        width: settings.diagram_width_pt,
        height: settings.diagram_height_pt,
    };
    let color = series_color(geometry.kind);
    let plot_bottom = TOP_GUTTER + frame.height;
    let plot_right = LEFT_GUTTER + frame.width;

    let mut body = String::new();

    // grid and tick labels
    for i in 0..TICKS {
        let t = i as f64 / (TICKS - 1) as f64;
        let x_value = geometry.x_axis.min + t * geometry.x_axis.extent();
        let y_value = geometry.y_axis.min + t * geometry.y_axis.extent();
        let (gx, gy) = (frame.x(x_value), frame.y(y_value));

        body.push_str(&place(
            0.0,
            0.0,
            &format!(
                "line(start: ({}, {}), end: ({}, {}), stroke: (paint: luma(200), thickness: 0.4pt, dash: \"dashed\"))",
                pt(gx),
                pt(TOP_GUTTER),
                pt(gx),
                pt(plot_bottom)
            ),
        ));
        body.push_str(&place(
            0.0,
            0.0,
            &format!(
                "line(start: ({}, {}), end: ({}, {}), stroke: (paint: luma(200), thickness: 0.4pt, dash: \"dashed\"))",
                pt(LEFT_GUTTER),
                pt(gy),
                pt(plot_right),
                pt(gy)
            ),
        ));
        body.push_str(&place(
            gx - 20.0,
            plot_bottom + 3.0,
            &format!("box(width: 40pt, align(center, text(size: 7pt)[{}]))", escape_typst(&fixed2(x_value))),
        ));
        body.push_str(&place(
            LEFT_GUTTER - 44.0,
            gy - 4.0,
            &format!("box(width: 40pt, align(right, text(size: 7pt)[{}]))", escape_typst(&fixed2(y_value))),
        ));
    }

    body.push_str(&place(
        LEFT_GUTTER,
        TOP_GUTTER,
        &format!("rect(width: {}, height: {}, stroke: 0.6pt + black)", pt(frame.width), pt(frame.height)),
    ));

    // zero reference
    if geometry.y_axis.contains(0.0) {
        let zero = frame.y(0.0);
        let stroke = match geometry.kind {
            DiagramKind::Line => "(paint: red, thickness: 0.8pt, dash: \"dashed\")",
            DiagramKind::FilledArea => "0.8pt + black",
        };
        body.push_str(&place(
            0.0,
            0.0,
            &format!(
                "line(start: ({}, {}), end: ({}, {}), stroke: {})",
                pt(LEFT_GUTTER),
                pt(zero),
                pt(plot_right),
                pt(zero),
                stroke
            ),
        ));
    }

    // filled region
    if let PathClosure::ToBaseline { baseline, first } = geometry.closure {
        let base = baseline.clamp(geometry.y_axis.min, geometry.y_axis.max);
        let mut components: Vec<String> = geometry
            .coordinates
            .iter()
            .map(|p| format!("curve.line({})", frame.point(p)))
            .collect();
        if let Some(last) = geometry.coordinates.last() {
            components.push(format!("curve.line({})", frame.point(&Point { x: last.x, y: base })));
        }
        components.push(format!("curve.line({})", frame.point(&Point { x: first.x, y: base })));
        components.push("curve.close()".to_string());
        body.push_str(&place(
            0.0,
            0.0,
            &format!(
                "curve(fill: {}.transparentize(75%), stroke: none, curve.move({}), {})",
                color,
                frame.point(&first),
                components.join(", ")
            ),
        ));
    }

    // series line and markers
    if let Some((head, tail)) = geometry.coordinates.split_first() {
        let mut components = vec![format!("curve.move({})", frame.point(head))];
        components.extend(tail.iter().map(|p| format!("curve.line({})", frame.point(p))));
        body.push_str(&place(
            0.0,
            0.0,
            &format!("curve(stroke: 1.5pt + {}, {})", color, components.join(", ")),
        ));
    }
    for p in &geometry.coordinates {
        body.push_str(&place(
            frame.x(p.x) - 2.0,
            frame.y(p.y) - 2.0,
            &format!("circle(radius: 2pt, fill: {})", color),
        ));
    }

    // title, legend and axis labels
    body.push_str(&place(
        LEFT_GUTTER,
        2.0,
        &format!(
            "box(width: {}, align(center, text(size: 10pt, weight: \"bold\")[{}]))",
            pt(frame.width),
            escape_typst(labels.title)
        ),
    ));
    body.push_str(&place(
        plot_right - 110.0,
        TOP_GUTTER + 4.0,
        &format!(
            "box(width: 104pt, fill: white, inset: 2pt, align(right, text(size: 7pt)[#box(line(length: 12pt, stroke: 1.5pt + {})) {}]))",
            color,
            escape_typst(labels.series_label)
        ),
    ));
    body.push_str(&place(
        LEFT_GUTTER,
        plot_bottom + 18.0,
        &format!(
            "box(width: {}, align(center, text(size: 8pt)[{}]))",
            pt(frame.width),
            escape_typst(labels.x_label)
        ),
    ));
    body.push_str(&place(
        0.0,
        TOP_GUTTER,
        &format!(
            "box(height: {}, align(horizon, rotate(-90deg, reflow: true, text(size: 8pt)[{}])))",
            pt(frame.height),
            escape_typst(labels.y_label)
        ),
    ));

    format!(
        "  box(width: {}, height: {}, {{\n{}  }})",
        pt(LEFT_GUTTER + frame.width + RIGHT_GUTTER),
        pt(TOP_GUTTER + frame.height + BOTTOM_GUTTER),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportMetadata;
    use crate::diagram::{compute_area_diagram, compute_line_diagram};
    use crate::render::tests::sample_model;

    fn labels() -> DiagramLabels<'static> {
        DiagramLabels {
            title: "Shear Force Diagram",
            x_label: "Distance along beam (m)",
            y_label: "Shear Force (kN)",
            series_label: "Shear Force",
        }
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("a*b_c"), "a\\*b\\_c");
        assert_eq!(escape_typst("#[x]"), "\\#\\[x\\]");
        assert_eq!(escape_typst("kN/m"), "kN\\/m");
        assert_eq!(escape_typst("kN·m"), "kN·m");
        assert_eq!(escape_typst("-12.00"), "\\-12.00");
    }

    #[test]
    fn test_escape_typst_line_markers() {
        assert_eq!(escape_typst("- pinned"), "\\- pinned");
        assert_eq!(escape_typst("= Loads\n+ dead"), "\\= Loads\n\\+ dead");
        assert_eq!(escape_typst("  2. second"), "  2\\. second");
        assert_eq!(escape_typst("a -- b --- c"), "a \\-\\- b \\-\\-\\- c");
        assert_eq!(escape_typst("x = 2 + 3. Span 4.5 m"), "x = 2 + 3. Span 4.5 m");
    }

    #[test]
    fn test_description_cannot_become_list() {
        let metadata = ReportMetadata {
            beam_description: "- 6 m span\n= not a heading".to_string(),
            ..ReportMetadata::default()
        };
        let doc = to_typst_source(&sample_model(&metadata), &RenderSettings::default());
        assert!(doc.source.contains("\\- 6 m span\n\\= not a heading\n\n"));
        assert!(!doc.source.contains("\n- 6 m span"));
    }

    #[test]
    fn test_typst_string_quotes() {
        assert_eq!(typst_string(r#"Say "hi" \ bye"#), r#""Say \"hi\" \\ bye""#);
    }

    #[test]
    fn test_document_has_sections_in_order() {
        let model = sample_model(&ReportMetadata::default());
        let doc = to_typst_source(&model, &RenderSettings::default());

        let positions: Vec<usize> = [
            "= Introduction",
            "= Input Data",
            "= Structural Analysis",
            "= Engineering Interpretation",
            "= Conclusion",
        ]
        .iter()
        .map(|h| doc.source.find(h).unwrap_or_else(|| panic!("missing heading {h}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(doc.source.contains("== Shear Force Diagram (SFD)"));
        assert!(doc.source.contains("#outline()"));
        assert!(doc.images.is_empty());
    }

    #[test]
    fn test_key_values_and_lists() {
        let model = sample_model(&ReportMetadata::default().with_data_source("force_table.csv"));
        let doc = to_typst_source(&model, &RenderSettings::default());
        assert!(doc.source.contains("*Data file:* force\\_table.csv \\\n*Number of data points:*"));
        assert!(doc.source.contains("- Maximum positive shear force: 10.00 kN\n"));
        assert!(doc.source.contains("+ The critical section for flexural design"));
        assert!(doc.source.contains("*Key Observations:*\n\n"));
    }

    #[test]
    fn test_table_markup() {
        let model = sample_model(&ReportMetadata::default());
        let doc = to_typst_source(&model, &RenderSettings::default());
        assert!(doc.source.contains("table.header([*x*], [*Shear force*], [*Bending Moment*])"));
        assert!(doc.source.contains("    [2.00], [0.00], [12.00],\n"));
        assert!(doc.source.contains("caption: [Force and Moment Data]"));
    }

    #[test]
    fn test_external_image_is_registered() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("ssbeam.PNG");
        std::fs::write(&image, b"not really a png").unwrap();

        let mut model = sample_model(&ReportMetadata::default());
        model.sections[0].subsections[0].blocks.push(ContentBlock::figure(
            FigureSource::ExternalImage { path: image.clone() },
            "Simply Supported Beam Configuration",
        ));

        let doc = to_typst_source(&model, &RenderSettings::default());
        assert_eq!(doc.images, vec![("/images/image-1.png".to_string(), image)]);
        assert!(doc.source.contains("image(\"/images/image-1.png\", width: 80%)"));
    }

    #[test]
    fn test_line_diagram_plots_in_frame() {
        let geometry = compute_line_diagram(&[0.0, 2.0, 4.0], &[10.0, 0.0, -10.0]).unwrap();
        let settings = RenderSettings::default();
        let markup = diagram_markup(&geometry, &labels(), &settings);

        // first point: x at the left edge, y = 10 of [-12, 12]
        let frame = PlotFrame {
            geometry: &geometry,
            width: settings.diagram_width_pt,
            height: settings.diagram_height_pt,
        };
        assert_eq!(frame.x(0.0), LEFT_GUTTER);
        assert_eq!(frame.x(4.0), LEFT_GUTTER + settings.diagram_width_pt);
        assert!((frame.y(0.0) - (TOP_GUTTER + settings.diagram_height_pt / 2.0)).abs() < 1e-9);

        assert!(markup.contains(&format!("curve.move({})", frame.point(&geometry.coordinates[0]))));
        assert!(markup.contains("paint: red"));
        assert!(!markup.contains("curve.close()"));
        assert_eq!(markup.matches("circle(").count(), 3);
    }

    #[test]
    fn test_area_diagram_closes_against_baseline() {
        let geometry = compute_area_diagram(&[0.0, 2.0, 4.0], &[0.0, 12.0, 0.0]).unwrap();
        let markup = diagram_markup(&geometry, &labels(), &RenderSettings::default());
        assert!(markup.contains("purple.transparentize(75%)"));
        assert!(markup.contains("curve.close()"));
        assert!(!markup.contains("paint: red"));
    }
}
