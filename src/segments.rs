// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use flatpath::{PathData, PathSegment, PathSegmentExt};

use crate::error::Diagnostics;
use crate::shapes::FlatPath;
use crate::value::Properties;

/// A 2D point.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// A single path edge.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Debug)]
pub enum Segment {
    Line {
        p1: Point,
        p2: Point,
    },
    /// A quadratic curve with one control point or a cubic one with two.
    Bezier {
        p1: Point,
        p2: Point,
        control_points: Vec<Point>,
    },
    Arc {
        p1: Point,
        p2: Point,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
    },
}

impl Segment {
    /// Returns the start point.
    #[inline]
    pub fn p1(&self) -> Point {
        match *self {
            Segment::Line { p1, .. } | Segment::Bezier { p1, .. } | Segment::Arc { p1, .. } => p1,
        }
    }

    /// Returns the end point.
    #[inline]
    pub fn p2(&self) -> Point {
        match *self {
            Segment::Line { p2, .. } | Segment::Bezier { p2, .. } | Segment::Arc { p2, .. } => p2,
        }
    }
}

/// A path edge along with the owning path's properties.
#[derive(Clone, PartialEq, Debug)]
pub struct FlatSegment {
    /// The edge geometry.
    pub segment: Segment,
    /// Path's properties without `d`.
    pub properties: Properties,
}

/// Splits paths into edges.
///
/// `path_data` must be parallel to `paths`. Paths without parsed data
/// are parsed from their `d` property.
pub(crate) fn split(
    paths: &[FlatPath],
    path_data: Vec<Option<PathData>>,
) -> (Vec<FlatSegment>, Diagnostics) {
    let mut segments = Vec::new();
    let mut diagnostics = Diagnostics::default();

    let mut path_data = path_data.into_iter();
    for path in paths {
        let data = match path_data.next().flatten() {
            Some(data) => data,
            None => match path.d().parse::<PathData>() {
                Ok(data) => data.abs(),
                Err(e) => {
                    diagnostics.error(format!("Problem parsing path to segments with {}.", e));
                    continue;
                }
            },
        };

        let mut properties = path.properties.clone();
        properties.remove("d");

        split_path(&data, &properties, &mut segments, &mut diagnostics);
    }

    log::debug!("Split {} paths into {} segments.", paths.len(), segments.len());

    (segments, diagnostics)
}

fn split_path(
    data: &PathData,
    properties: &Properties,
    segments: &mut Vec<FlatSegment>,
    diagnostics: &mut Diagnostics,
) {
    let mut start = Point::new(0.0, 0.0);
    for (seg, x, y) in data.iter() {
        let p1 = Point::new(x, y);
        let segment = match seg {
            PathSegment::MoveTo { abs: true, x, y } => {
                start = Point::new(x, y);
                continue;
            }
            PathSegment::LineTo { abs: true, x, y } => Segment::Line {
                p1,
                p2: Point::new(x, y),
            },
            PathSegment::HorizontalLineTo { abs: true, x } => Segment::Line {
                p1,
                p2: Point::new(x, p1.y),
            },
            PathSegment::VerticalLineTo { abs: true, y } => Segment::Line {
                p1,
                p2: Point::new(p1.x, y),
            },
            PathSegment::Quadratic {
                abs: true,
                x1,
                y1,
                x,
                y,
            } => Segment::Bezier {
                p1,
                p2: Point::new(x, y),
                control_points: vec![Point::new(x1, y1)],
            },
            PathSegment::CurveTo {
                abs: true,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => Segment::Bezier {
                p1,
                p2: Point::new(x, y),
                control_points: vec![Point::new(x1, y1), Point::new(x2, y2)],
            },
            PathSegment::EllipticalArc {
                abs: true,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => Segment::Arc {
                p1,
                p2: Point::new(x, y),
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
            },
            PathSegment::ClosePath { .. } => {
                // Skip a zero-length closing edge.
                if p1 == start {
                    continue;
                }

                Segment::Line { p1, p2: start }
            }
            seg => {
                diagnostics.error(format!("Unknown <path> command: {}.", seg.command()));
                continue;
            }
        };

        segments.push(FlatSegment {
            segment,
            properties: properties.clone(),
        });
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn path(d: &str) -> FlatPath {
        let mut properties = Properties::new();
        properties.insert("stroke", Value::from("red"));
        properties.insert("d", Value::from(d));
        FlatPath { properties }
    }

    fn split_str(d: &str) -> (Vec<FlatSegment>, Diagnostics) {
        split(&[path(d)], vec![None])
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn rect() {
        let (segments, diag) = split_str("M0,0 L10,0 L10,10 L0,10 z");
        assert_eq!(diag, Diagnostics::default());
        let lines: Vec<_> = segments.iter().map(|s| (s.segment.p1(), s.segment.p2())).collect();
        assert_eq!(lines, [
            (p(0.0, 0.0), p(10.0, 0.0)),
            (p(10.0, 0.0), p(10.0, 10.0)),
            (p(10.0, 10.0), p(0.0, 10.0)),
            (p(0.0, 10.0), p(0.0, 0.0)),
        ]);
        assert_eq!(segments[0].properties.get("stroke"), Some(&Value::from("red")));
        assert!(!segments[0].properties.contains_key("d"));
    }

    #[test]
    fn closed_at_start() {
        let (segments, _) = split_str("M0,0 L10,0 L10,10 L0,0 Z");
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn horizontal_and_vertical() {
        let (segments, _) = split_str("M1,2 H5 V7");
        assert_eq!(segments[0].segment, Segment::Line { p1: p(1.0, 2.0), p2: p(5.0, 2.0) });
        assert_eq!(segments[1].segment, Segment::Line { p1: p(5.0, 2.0), p2: p(5.0, 7.0) });
    }

    #[test]
    fn relative_data() {
        let (segments, _) = split_str("m1,1 l2,0 z");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].segment, Segment::Line { p1: p(3.0, 1.0), p2: p(1.0, 1.0) });
    }

    #[test]
    fn curves_and_arcs() {
        let (segments, _) = split_str("M0,0 Q1,1 2,0 C3,1 4,1 5,0 A5,5 0 1,0 15,0");
        assert_eq!(segments[0].segment, Segment::Bezier {
            p1: p(0.0, 0.0), p2: p(2.0, 0.0), control_points: vec![p(1.0, 1.0)],
        });
        assert_eq!(segments[1].segment, Segment::Bezier {
            p1: p(2.0, 0.0), p2: p(5.0, 0.0), control_points: vec![p(3.0, 1.0), p(4.0, 1.0)],
        });
        assert_eq!(segments[2].segment, Segment::Arc {
            p1: p(5.0, 0.0), p2: p(15.0, 0.0), rx: 5.0, ry: 5.0,
            x_axis_rotation: 0.0, large_arc: true, sweep: false,
        });
    }

    #[test]
    fn subpaths() {
        let (segments, _) = split_str("M0,0 L1,0 z M5,5 L6,5 z");
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3].segment, Segment::Line { p1: p(6.0, 5.0), p2: p(5.0, 5.0) });
    }

    #[test]
    fn smooth_curve_is_unknown() {
        let (segments, diag) = split_str("M0,0 S1,1 2,0");
        assert!(segments.is_empty());
        assert_eq!(diag.errors, ["Unknown <path> command: S."]);
    }

    #[test]
    fn cached_data() {
        let data: PathData = "M0,0 L1,1".parse().unwrap();
        let (segments, _) = split(&[path("garbage")], vec![Some(data)]);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn invalid_data() {
        let (segments, diag) = split_str("L 1 1");
        assert!(segments.is_empty());
        assert_eq!(diag.errors, ["Problem parsing path to segments with unexpected data at position 1."]);
    }
}
