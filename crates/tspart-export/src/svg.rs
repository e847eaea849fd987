//! SVG export serializer.
//!
//! Builds documents with the [`svg`] crate, which handles XML escaping
//! and path data formatting. The `viewBox` is the source image's pixel
//! grid, so coordinates are written without transformation.
//!
//! - [`to_svg`] draws the tour as one `<path>` of `M`/`L` commands.
//! - [`to_scatter_svg`] draws every sample as a `<circle>`.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.

use svg::Document;
use svg::node::Text;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Path, Title};

use tspart_pipeline::{Dimensions, Point, Polyline};

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the pipeline parameters, so files are distinguishable.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use tspart_pipeline::{Point, Polyline};
/// use tspart_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(&polyline), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    let points = polyline.points();
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    String::from(svg::node::Value::from(data))
}

/// Start a document sized to `dimensions` with optional metadata.
fn document(dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> Document {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h))
        .add(
            svg::node::element::Rectangle::new()
                .set("width", w)
                .set("height", h)
                .set("fill", "white"),
        );

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    doc
}

/// Finish a document as a string with an XML declaration.
fn finish(doc: &Document) -> String {
    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize the tour polyline as an SVG document.
///
/// `stroke_width` is in source image pixels. A polyline with fewer than
/// two points produces a valid document without a `<path>`.
#[must_use]
pub fn to_svg(
    polyline: &Polyline,
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
    stroke_width: f64,
) -> String {
    let mut doc = document(dimensions, metadata);

    let d = build_path_data(polyline);
    if !d.is_empty() {
        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");
        doc = doc.add(path);
    }

    finish(&doc)
}

/// Serialize sampled points as black dots of `radius` pixels.
#[must_use]
pub fn to_scatter_svg(
    points: &[Point],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
    radius: f64,
) -> String {
    let mut doc = document(dimensions, metadata);

    let mut group = Group::new().set("fill", "black");
    for p in points {
        group = group.add(
            Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", radius),
        );
    }
    doc = doc.add(group);

    finish(&doc)
}
