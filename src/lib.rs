// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`flatsvg` flattens an SVG document into three progressively simpler views:

- elements: every leaf with its inherited properties and a single transform;
- paths: every supported shape as absolute path data in document coordinates;
- segments: every path split into line, bezier and arc edges.

Each view is computed once, on first access, and can be filtered
by computed style.

```
let svg = flatsvg::FlatSvg::from_str(
    "<svg viewBox='0 0 10 10'><rect width='10' height='10' fill='red'/></svg>"
).unwrap();

assert_eq!(svg.paths()[0].d(), "M0,0 L10,0 L10,10 L0,10 z");
assert_eq!(svg.segments().len(), 4);
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::cell::{OnceCell, RefCell};

pub use flatpath::{PathData, Transform};

pub use crate::cascade::FlatElement;
pub use crate::color::{Lab, Rgba};
pub use crate::error::Error;
pub use crate::filter::{FilterValue, PropertiesFilter};
pub use crate::options::Options;
pub use crate::segments::{FlatSegment, Point, Segment};
pub use crate::shapes::FlatPath;
pub use crate::transform::{parse_transform, ParsedTransform};
pub use crate::tree::Node;
pub use crate::value::{Properties, Value};

use crate::error::Diagnostics;
use crate::filter::ComputedProperties;
use crate::value::parse_float;

mod cascade;
mod color;
mod css;
mod error;
mod filter;
mod options;
mod segments;
mod shapes;
mod transform;
mod tree;
mod value;
mod writer;

const UNITS: &[&str] = &["em", "ex", "px", "pt", "pc", "cm", "mm", "in"];

/// A flattening session over a single SVG document.
///
/// All views are computed lazily and cached. Non-fatal problems found
/// along the way are collected into [`errors`](FlatSvg::errors) and
/// [`warnings`](FlatSvg::warnings).
pub struct FlatSvg {
    root: Node,
    defs: Vec<Node>,
    css: String,
    opt: Options,

    elements: OnceCell<Vec<FlatElement>>,
    paths: OnceCell<Vec<FlatPath>>,
    segments: OnceCell<Vec<FlatSegment>>,
    path_data: RefCell<Vec<Option<PathData>>>,

    computed_elements: RefCell<Vec<ComputedProperties>>,
    computed_paths: RefCell<Vec<ComputedProperties>>,
    computed_segments: RefCell<Vec<ComputedProperties>>,

    diagnostics: RefCell<Diagnostics>,
}

impl FlatSvg {
    /// Parses a document using default [`Options`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self, Error> {
        Self::from_str_with_options(text, &Options::default())
    }

    /// Parses a document.
    ///
    /// Only an empty string, a malformed XML and a root that is not `svg`
    /// are fatal.
    pub fn from_str_with_options(text: &str, opt: &Options) -> Result<Self, Error> {
        let doc = tree::Document::parse(text)?;

        let svg = FlatSvg {
            root: doc.root,
            defs: doc.defs,
            css: doc.css,
            opt: opt.clone(),
            elements: OnceCell::new(),
            paths: OnceCell::new(),
            segments: OnceCell::new(),
            path_data: RefCell::new(Vec::new()),
            computed_elements: RefCell::new(Vec::new()),
            computed_paths: RefCell::new(Vec::new()),
            computed_segments: RefCell::new(Vec::new()),
            diagnostics: RefCell::new(Diagnostics::default()),
        };
        svg.push(doc.diagnostics);

        Ok(svg)
    }

    /// Returns the root `svg` element.
    ///
    /// Top-level `style` and `defs` elements are already removed.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns removed top-level `defs` elements.
    #[inline]
    pub fn defs(&self) -> &[Node] {
        &self.defs
    }

    /// Returns the document's view box.
    ///
    /// Falls back to `x`, `y`, `width` and `height` when `viewBox` is not set.
    pub fn view_box(&self) -> Vec<f64> {
        match self.root.attribute("viewBox") {
            Some(Value::String(s)) if !s.is_empty() => s.split(' ').map(parse_float).collect(),
            Some(&Value::Number(n)) if n != 0.0 && !n.is_nan() => vec![n],
            _ => ["x", "y", "width", "height"]
                .iter()
                .map(|name| attribute_or_zero(&self.root, name))
                .collect(),
        }
    }

    /// Returns the units of the document size.
    ///
    /// The first of `x`, `y`, `width` and `height` with a known unit suffix
    /// wins. Defaults to `px`.
    pub fn units(&self) -> &'static str {
        for name in &["x", "y", "width", "height"] {
            if let Some(s) = self.root.attribute(name).and_then(Value::as_str) {
                if let Some(unit) = UNITS.iter().copied().find(|unit| s.ends_with(unit)) {
                    return unit;
                }
            }
        }

        "px"
    }

    /// Returns flattened elements.
    pub fn elements(&self) -> &[FlatElement] {
        self.elements.get_or_init(|| {
            let (elements, diagnostics) = cascade::resolve(&self.root, &self.css);
            log::debug!("Resolved {} elements.", elements.len());
            self.push(diagnostics);
            elements
        })
    }

    /// Returns elements converted into paths.
    ///
    /// Elements that cannot be converted are skipped.
    pub fn paths(&self) -> &[FlatPath] {
        self.paths.get_or_init(|| {
            let (paths, path_data, diagnostics) = shapes::convert(self.elements(), &self.opt);
            log::debug!("Converted {} paths.", paths.len());
            *self.path_data.borrow_mut() = path_data;
            self.push(diagnostics);
            paths
        })
    }

    /// Returns paths split into segments.
    pub fn segments(&self) -> &[FlatSegment] {
        self.segments.get_or_init(|| {
            let paths = self.paths();
            let path_data = std::mem::take(&mut *self.path_data.borrow_mut());
            let (segments, diagnostics) = segments::split(paths, path_data);
            self.push(diagnostics);
            segments
        })
    }

    /// Serializes [`elements`](FlatSvg::elements) into an SVG string.
    pub fn elements_as_svg(&self) -> String {
        self.write_elements(self.elements())
    }

    /// Serializes [`paths`](FlatSvg::paths) into an SVG string.
    pub fn paths_as_svg(&self) -> String {
        self.write_paths(self.paths())
    }

    /// Serializes [`segments`](FlatSvg::segments) into an SVG string.
    pub fn segments_as_svg(&self) -> String {
        self.write_segments(self.segments())
    }

    /// Serializes any set of elements, like a filter result,
    /// inside this document's root.
    pub fn write_elements<'a, I>(&self, elements: I) -> String
    where
        I: IntoIterator<Item = &'a FlatElement>,
    {
        writer::write_elements(&self.root, elements)
    }

    /// Serializes any set of paths inside this document's root.
    pub fn write_paths<'a, I>(&self, paths: I) -> String
    where
        I: IntoIterator<Item = &'a FlatPath>,
    {
        writer::write_paths(&self.root, paths)
    }

    /// Serializes any set of segments inside this document's root.
    pub fn write_segments<'a, I>(&self, segments: I) -> String
    where
        I: IntoIterator<Item = &'a FlatSegment>,
    {
        writer::write_segments(&self.root, segments)
    }

    /// Returns all errors collected so far.
    ///
    /// Errors are collected lazily, so call this after accessing a view.
    pub fn errors(&self) -> Vec<String> {
        self.diagnostics.borrow().errors.clone()
    }

    /// Returns all warnings collected so far.
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.borrow().warnings.clone()
    }

    /// Returns elements that match all `filters`.
    ///
    /// Elements marked as `true` in `exclude` are skipped.
    pub fn filter_elements_by_style(
        &self,
        filters: &[PropertiesFilter],
        exclude: Option<&[bool]>,
    ) -> Result<Vec<&FlatElement>, Error> {
        filter::filter_by_style(self.elements(), filters, &self.computed_elements, exclude)
    }

    /// Returns paths that match all `filters`.
    pub fn filter_paths_by_style(
        &self,
        filters: &[PropertiesFilter],
        exclude: Option<&[bool]>,
    ) -> Result<Vec<&FlatPath>, Error> {
        filter::filter_by_style(self.paths(), filters, &self.computed_paths, exclude)
    }

    /// Returns segments that match all `filters`.
    pub fn filter_segments_by_style(
        &self,
        filters: &[PropertiesFilter],
        exclude: Option<&[bool]>,
    ) -> Result<Vec<&FlatSegment>, Error> {
        filter::filter_by_style(self.segments(), filters, &self.computed_segments, exclude)
    }

    fn push(&self, diagnostics: Diagnostics) {
        self.diagnostics.borrow_mut().append(diagnostics);
    }
}

impl std::fmt::Debug for FlatSvg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FlatSvg")
            .field("root", &self.root.tag_name())
            .field("defs", &self.defs.len())
            .finish()
    }
}

fn attribute_or_zero(node: &Node, name: &str) -> f64 {
    match node.attribute(name) {
        Some(&Value::Number(n)) if !n.is_nan() => n,
        Some(Value::String(s)) if !s.is_empty() => parse_float(s),
        _ => 0.0,
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> FlatSvg {
        FlatSvg::from_str(text).unwrap()
    }

    macro_rules! test_units {
        ($name:ident, $attrs:expr, $units:expr) => (
            #[test]
            fn $name() {
                let svg = parse(&format!("<svg {}/>", $attrs));
                assert_eq!(svg.units(), $units);
            }
        )
    }

    test_units!(units_default, "", "px");
    test_units!(units_from_width, "width='10cm' height='5cm'", "cm");
    test_units!(units_first_wins, "x='1in' width='10mm'", "in");
    test_units!(units_unknown, "width='10%'", "px");

    macro_rules! test_view_box {
        ($name:ident, $attrs:expr, $view_box:expr) => (
            #[test]
            fn $name() {
                let svg = parse(&format!("<svg {}/>", $attrs));
                assert_eq!(svg.view_box(), $view_box);
            }
        )
    }

    test_view_box!(view_box_attribute, "viewBox='0 0 20 10'", vec![0.0, 0.0, 20.0, 10.0]);
    test_view_box!(view_box_from_size, "width='20mm' height='10'", vec![0.0, 0.0, 20.0, 10.0]);
    test_view_box!(view_box_missing, "", vec![0.0, 0.0, 0.0, 0.0]);

    #[test]
    fn fatal_errors() {
        assert_eq!(FlatSvg::from_str("").unwrap_err().to_string(), "SVG string is empty.");
        assert!(matches!(FlatSvg::from_str("<g/>"), Err(Error::MalformedSvg)));
        assert!(matches!(FlatSvg::from_str("<svg>"), Err(Error::ParsingFailed(_))));
    }

    #[test]
    fn views_are_cached() {
        let svg = parse("<svg><rect width='1' height='1'/><foo/></svg>");
        assert_eq!(svg.segments().len(), 4);
        assert_eq!(svg.warnings(), ["Unsupported tagname: \"foo\"."]);

        // Accessing again must not repeat diagnostics.
        let _ = svg.elements();
        let _ = svg.paths();
        let _ = svg.segments();
        assert_eq!(svg.warnings().len(), 1);
        assert!(std::ptr::eq(svg.paths(), svg.paths()));
    }

    #[test]
    fn segments_without_paths_access() {
        let svg = parse("<svg><line x1='0' y1='0' x2='5' y2='0'/></svg>");
        assert_eq!(svg.segments()[0].segment, Segment::Line {
            p1: Point::new(0.0, 0.0), p2: Point::new(5.0, 0.0),
        });
    }

    #[test]
    fn diagnostics_accumulate_across_views() {
        let svg = parse("<svg><style>rect { fill: red;</style><circle cy='NaN' r='5'/><bar/></svg>");
        assert_eq!(svg.errors(), ["Malformed CSS: missing '}'."]);
        assert_eq!(svg.warnings(), ["Unsupported tagname: \"bar\"."]);

        assert!(svg.paths().is_empty());
        let errors = svg.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Malformed CSS: missing '}'.");
        assert!(errors[1].starts_with("Invalid <circle> properties"), "{}", errors[1]);
        assert_eq!(svg.warnings().len(), 1);
    }

    #[test]
    fn css_errors_are_logged() {
        let svg = parse("<svg><style>rect { fill: red;</style></svg>");
        assert_eq!(svg.errors(), ["Malformed CSS: missing '}'."]);
    }

    #[test]
    fn defs() {
        let svg = parse("<svg><defs><rect id='a'/></defs><circle r='1'/></svg>");
        assert_eq!(svg.defs().len(), 1);
        assert_eq!(svg.root().children().len(), 1);
        assert_eq!(svg.elements().len(), 1);
    }

    #[test]
    fn filtered_output() {
        let svg = parse("<svg><rect width='1' height='1' fill='red'/><rect width='1' height='1' fill='blue'/></svg>");
        let red = svg.filter_paths_by_style(&[PropertiesFilter::new("fill", "red")], None).unwrap();
        assert_eq!(red.len(), 1);
        assert_eq!(svg.write_paths(red).trim_end(),
"<svg>
<path fill=\"red\" d=\"M0,0 L1,0 L1,1 L0,1 z\"/>
</svg>");
    }

    #[test]
    fn preserve_arcs() {
        let opt = Options { preserve_arcs: true };
        let svg = FlatSvg::from_str_with_options("<svg><circle r='5'/></svg>", &opt).unwrap();
        assert!(svg.paths()[0].d().contains('A'));
        assert!(svg.segments().iter().all(|s| matches!(s.segment, Segment::Arc { .. })));
    }
}
