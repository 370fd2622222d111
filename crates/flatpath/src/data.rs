// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::Write;

use crate::arc::arc_to_cubics;
use crate::{Ellipse, Error, Num, PathParser, PathSegment, PathSegmentExt, Transform};

/// A parsed path data.
///
/// Owns a list of segments and provides the normalization passes.
/// Each pass consumes the path and returns a new one, so they can be chained:
///
/// ```
/// use flatpath::{PathData, Transform};
///
/// let path: PathData = "m10 10 h10 s5 5 10 0".parse().unwrap();
/// let path = path.abs().unshort().matrix(&Transform::new_translate(1.0, 0.0));
/// assert_eq!(path.to_string(), "M11,10 H21 C21,10 26,15 31,10");
/// ```
#[derive(Clone, Default, PartialEq, Debug)]
pub struct PathData {
    segments: Vec<PathSegment>,
}

impl PathData {
    /// Creates a new, empty path.
    #[inline]
    pub fn new() -> Self {
        PathData::default()
    }

    /// Returns the list of segments.
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Appends a segment.
    #[inline]
    pub fn push(&mut self, seg: PathSegment) {
        self.segments.push(seg);
    }

    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Checks that the path has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over segments along with the absolute current point
    /// right before each of them.
    #[inline]
    pub fn iter(&self) -> Iter {
        Iter {
            segments: self.segments.iter(),
            cursor: Cursor::default(),
        }
    }

    /// Converts all segments into absolute ones.
    pub fn abs(self) -> Self {
        self.map_segments(|seg, cur, _| {
            if seg.is_absolute() {
                return vec![seg];
            }

            let (dx, dy) = (cur.x, cur.y);
            let abs = match seg {
                PathSegment::MoveTo { x, y, .. } => PathSegment::MoveTo {
                    abs: true,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::LineTo { x, y, .. } => PathSegment::LineTo {
                    abs: true,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::HorizontalLineTo { x, .. } => PathSegment::HorizontalLineTo {
                    abs: true,
                    x: x + dx,
                },
                PathSegment::VerticalLineTo { y, .. } => PathSegment::VerticalLineTo {
                    abs: true,
                    y: y + dy,
                },
                PathSegment::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                    ..
                } => PathSegment::CurveTo {
                    abs: true,
                    x1: x1 + dx,
                    y1: y1 + dy,
                    x2: x2 + dx,
                    y2: y2 + dy,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::SmoothCurveTo { x2, y2, x, y, .. } => PathSegment::SmoothCurveTo {
                    abs: true,
                    x2: x2 + dx,
                    y2: y2 + dy,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::Quadratic { x1, y1, x, y, .. } => PathSegment::Quadratic {
                    abs: true,
                    x1: x1 + dx,
                    y1: y1 + dy,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::SmoothQuadratic { x, y, .. } => PathSegment::SmoothQuadratic {
                    abs: true,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::EllipticalArc {
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    x,
                    y,
                    ..
                } => PathSegment::EllipticalArc {
                    abs: true,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    x: x + dx,
                    y: y + dy,
                },
                PathSegment::ClosePath { .. } => PathSegment::ClosePath { abs: true },
            };

            vec![abs]
        })
    }

    /// Converts smooth curves into regular ones.
    ///
    /// `S` becomes `C` and `T` becomes `Q`. The implied control point is the reflection
    /// of the previous curve's control point about the current point,
    /// or the current point itself when the previous segment is not a matching curve.
    pub fn unshort(self) -> Self {
        self.map_segments(|seg, cur, prev| {
            // The reflected control point relative to the current point.
            match seg {
                PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                    let (dx, dy) = match prev {
                        Some(PathSegment::CurveTo { x2, y2, x, y, .. }) => (x - x2, y - y2),
                        _ => (0.0, 0.0),
                    };

                    let (x1, y1) = if abs {
                        (cur.x + dx, cur.y + dy)
                    } else {
                        (dx, dy)
                    };

                    vec![PathSegment::CurveTo {
                        abs,
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    }]
                }
                PathSegment::SmoothQuadratic { abs, x, y } => {
                    let (dx, dy) = match prev {
                        Some(PathSegment::Quadratic { x1, y1, x, y, .. }) => (x - x1, y - y1),
                        _ => (0.0, 0.0),
                    };

                    let (x1, y1) = if abs {
                        (cur.x + dx, cur.y + dy)
                    } else {
                        (dx, dy)
                    };

                    vec![PathSegment::Quadratic { abs, x1, y1, x, y }]
                }
                _ => vec![seg],
            }
        })
    }

    /// Converts elliptical arcs into cubic curves.
    ///
    /// Degenerate arcs (a zero radius or coinciding end points) become lines,
    /// so the path stays continuous.
    pub fn unarc(self) -> Self {
        self.map_segments(|seg, cur, _| match seg {
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let to = if abs { (x, y) } else { (cur.x + x, cur.y + y) };

                match arc_to_cubics((cur.x, cur.y), rx, ry, x_axis_rotation, large_arc, sweep, to)
                {
                    Some(curves) => curves
                        .into_iter()
                        .map(|c| PathSegment::CurveTo {
                            abs: true,
                            x1: c[0],
                            y1: c[1],
                            x2: c[2],
                            y2: c[3],
                            x: c[4],
                            y: c[5],
                        })
                        .collect(),
                    None => vec![PathSegment::LineTo { abs, x, y }],
                }
            }
            _ => vec![seg],
        })
    }

    /// Applies a transform to all segments.
    ///
    /// - Relative segments are transformed without the translation part.
    /// - `H` and `V` are kept only when the transform preserves their axis,
    ///   otherwise they become `L`.
    /// - Arc radii and rotation are recalculated, and the sweep flag is flipped
    ///   for mirroring transforms. Arcs that turn into a line become `L`.
    pub fn matrix(self, ts: &Transform) -> Self {
        if ts.is_default() {
            return self;
        }

        let flip = ts.determinant() < 0.0;
        let mut first = true;
        self.map_segments(|seg, cur, _| {
            // The very first `m` is an absolute point.
            let rel = !seg.is_absolute() && !first;
            first = false;

            let pt = |x: f64, y: f64| {
                if rel {
                    ts.apply_vector(x, y)
                } else {
                    ts.apply(x, y)
                }
            };

            let new = match seg {
                PathSegment::MoveTo { abs, x, y } => {
                    let (x, y) = pt(x, y);
                    PathSegment::MoveTo { abs, x, y }
                }
                PathSegment::LineTo { abs, x, y } => {
                    let (x, y) = pt(x, y);
                    PathSegment::LineTo { abs, x, y }
                }
                PathSegment::HorizontalLineTo { abs, x } => {
                    let (px, py) = if rel { pt(x, 0.0) } else { pt(x, cur.y) };
                    let base_y = if rel { 0.0 } else { ts.apply(cur.x, cur.y).1 };
                    if py == base_y {
                        PathSegment::HorizontalLineTo { abs, x: px }
                    } else {
                        PathSegment::LineTo { abs, x: px, y: py }
                    }
                }
                PathSegment::VerticalLineTo { abs, y } => {
                    let (px, py) = if rel { pt(0.0, y) } else { pt(cur.x, y) };
                    let base_x = if rel { 0.0 } else { ts.apply(cur.x, cur.y).0 };
                    if px == base_x {
                        PathSegment::VerticalLineTo { abs, y: py }
                    } else {
                        PathSegment::LineTo { abs, x: px, y: py }
                    }
                }
                PathSegment::CurveTo {
                    abs,
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    let (x1, y1) = pt(x1, y1);
                    let (x2, y2) = pt(x2, y2);
                    let (x, y) = pt(x, y);
                    PathSegment::CurveTo {
                        abs,
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    }
                }
                PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                    let (x2, y2) = pt(x2, y2);
                    let (x, y) = pt(x, y);
                    PathSegment::SmoothCurveTo { abs, x2, y2, x, y }
                }
                PathSegment::Quadratic { abs, x1, y1, x, y } => {
                    let (x1, y1) = pt(x1, y1);
                    let (x, y) = pt(x, y);
                    PathSegment::Quadratic { abs, x1, y1, x, y }
                }
                PathSegment::SmoothQuadratic { abs, x, y } => {
                    let (x, y) = pt(x, y);
                    PathSegment::SmoothQuadratic { abs, x, y }
                }
                PathSegment::EllipticalArc {
                    abs,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    x,
                    y,
                } => {
                    let is_empty = if abs {
                        x == cur.x && y == cur.y
                    } else {
                        x == 0.0 && y == 0.0
                    };

                    let (px, py) = pt(x, y);
                    let e = Ellipse::new(rx, ry, x_axis_rotation).transform(ts);

                    // Empty and flattened arcs are kept as lines and not dropped,
                    // so neighbouring smooth curves still see a segment here.
                    if is_empty || e.is_degenerate() {
                        PathSegment::LineTo { abs, x: px, y: py }
                    } else {
                        PathSegment::EllipticalArc {
                            abs,
                            rx: e.rx,
                            ry: e.ry,
                            x_axis_rotation: e.ax,
                            large_arc,
                            sweep: if flip { !sweep } else { sweep },
                            x: px,
                            y: py,
                        }
                    }
                }
                PathSegment::ClosePath { .. } => seg,
            };

            vec![new]
        })
    }

    /// Rebuilds the path segment by segment.
    ///
    /// The callback receives the source segment, the absolute current point
    /// before it and the last produced segment.
    fn map_segments<F>(self, mut f: F) -> Self
    where
        F: FnMut(PathSegment, Cursor, Option<PathSegment>) -> Vec<PathSegment>,
    {
        let mut segments = Vec::with_capacity(self.segments.len());
        let mut cursor = Cursor::default();
        for seg in self.segments {
            let prev = segments.last().copied();
            segments.extend(f(seg, cursor, prev));
            cursor.advance(&seg);
        }

        PathData { segments }
    }
}

impl std::str::FromStr for PathData {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Error> {
        let segments = PathParser::from(text).collect::<Result<Vec<_>, _>>()?;
        Ok(PathData { segments })
    }
}

impl From<Vec<PathSegment>> for PathData {
    #[inline]
    fn from(segments: Vec<PathSegment>) -> Self {
        PathData { segments }
    }
}

impl std::fmt::Display for PathData {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = String::new();
        for seg in &self.segments {
            if !s.is_empty() {
                s.push(' ');
            }

            write_segment(seg, &mut s)?;
        }

        f.write_str(&s)
    }
}

fn write_segment(seg: &PathSegment, s: &mut String) -> std::fmt::Result {
    let cmd = seg.command();
    match *seg {
        PathSegment::MoveTo { x, y, .. }
        | PathSegment::LineTo { x, y, .. }
        | PathSegment::SmoothQuadratic { x, y, .. } => {
            write!(s, "{}{},{}", cmd, Num(x), Num(y))
        }
        PathSegment::HorizontalLineTo { x, .. } => write!(s, "{}{}", cmd, Num(x)),
        PathSegment::VerticalLineTo { y, .. } => write!(s, "{}{}", cmd, Num(y)),
        PathSegment::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
            ..
        } => write!(
            s,
            "{}{},{} {},{} {},{}",
            cmd,
            Num(x1),
            Num(y1),
            Num(x2),
            Num(y2),
            Num(x),
            Num(y)
        ),
        PathSegment::SmoothCurveTo { x2, y2, x, y, .. } => write!(
            s,
            "{}{},{} {},{}",
            cmd,
            Num(x2),
            Num(y2),
            Num(x),
            Num(y)
        ),
        PathSegment::Quadratic { x1, y1, x, y, .. } => write!(
            s,
            "{}{},{} {},{}",
            cmd,
            Num(x1),
            Num(y1),
            Num(x),
            Num(y)
        ),
        PathSegment::EllipticalArc {
            rx,
            ry,
            x_axis_rotation,
            large_arc,
            sweep,
            x,
            y,
            ..
        } => write!(
            s,
            "{}{},{} {} {},{} {},{}",
            cmd,
            Num(rx),
            Num(ry),
            Num(x_axis_rotation),
            large_arc as u8,
            sweep as u8,
            Num(x),
            Num(y)
        ),
        PathSegment::ClosePath { .. } => write!(s, "z"),
    }
}

/// Tracks the absolute current point and the current subpath start.
#[derive(Clone, Copy, Default, Debug)]
struct Cursor {
    x: f64,
    y: f64,
    start_x: f64,
    start_y: f64,
}

impl Cursor {
    fn advance(&mut self, seg: &PathSegment) {
        let abs = seg.is_absolute();
        let resolve = |x: f64, base: f64| if abs { x } else { base + x };

        match *seg {
            PathSegment::MoveTo { x, y, .. } => {
                self.x = resolve(x, self.x);
                self.y = resolve(y, self.y);
                self.start_x = self.x;
                self.start_y = self.y;
            }
            PathSegment::LineTo { x, y, .. }
            | PathSegment::CurveTo { x, y, .. }
            | PathSegment::SmoothCurveTo { x, y, .. }
            | PathSegment::Quadratic { x, y, .. }
            | PathSegment::SmoothQuadratic { x, y, .. }
            | PathSegment::EllipticalArc { x, y, .. } => {
                self.x = resolve(x, self.x);
                self.y = resolve(y, self.y);
            }
            PathSegment::HorizontalLineTo { x, .. } => {
                self.x = resolve(x, self.x);
            }
            PathSegment::VerticalLineTo { y, .. } => {
                self.y = resolve(y, self.y);
            }
            PathSegment::ClosePath { .. } => {
                // ClosePath moves us to the last MoveTo coordinate, not previous.
                self.x = self.start_x;
                self.y = self.start_y;
            }
        }
    }
}

/// An iterator over path segments and the current point before each of them.
///
/// Created by [`PathData::iter`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    segments: std::slice::Iter<'a, PathSegment>,
    cursor: Cursor,
}

impl Iterator for Iter<'_> {
    type Item = (PathSegment, f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let seg = *self.segments.next()?;
        let item = (seg, self.cursor.x, self.cursor.y);
        self.cursor.advance(&seg);
        Some(item)
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> PathData {
        text.parse().unwrap()
    }

    macro_rules! test {
        ($name:ident, $text:expr, |$p:ident| $pass:expr, $result:expr) => (
            #[test]
            fn $name() {
                let $p = parse($text);
                assert_eq!($pass.to_string(), $result);
            }
        )
    }

    test!(to_string_1, "M 10 20 l 30 -40 H 5 v 6 Z", |p| p,
          "M10,20 l30,-40 H5 v6 z");
    test!(to_string_2, "M0 0 A 5 5 30 1 0 10 10 q 1 2 3 4 T 5 6", |p| p,
          "M0,0 A5,5 30 1,0 10,10 q1,2 3,4 T5,6");

    test!(abs_1, "m 10 20 l 30 40 h 5 v -5", |p| p.abs(),
          "M10,20 L40,60 H45 V55");
    test!(abs_2, "M 10 20 l 10 0 l 0 10 z m 5 5 l 1 1", |p| p.abs(),
          "M10,20 L20,20 L20,30 z M15,25 L16,26");
    test!(abs_3, "M 1 1 c 1 1 2 2 3 3 s 1 1 2 2 a 5 5 0 0 1 10 0", |p| p.abs(),
          "M1,1 C2,2 3,3 4,4 S5,5 6,6 A5,5 0 0,1 16,6");
    test!(abs_4, "m 1 1 2 2", |p| p.abs(),
          "M1,1 L3,3");

    test!(unshort_1, "M 0 0 C 0 10 10 10 10 0 S 20 -10 20 0", |p| p.unshort(),
          "M0,0 C0,10 10,10 10,0 C10,-10 20,-10 20,0");
    test!(unshort_2, "M 0 0 S 10 10 20 0", |p| p.unshort(),
          "M0,0 C0,0 10,10 20,0");
    test!(unshort_3, "M 0 0 Q 5 10 10 0 T 20 0 T 30 0", |p| p.unshort(),
          "M0,0 Q5,10 10,0 Q15,-10 20,0 Q25,10 30,0");
    test!(unshort_4, "M 0 0 L 10 0 T 20 0", |p| p.unshort(),
          "M0,0 L10,0 Q10,0 20,0");
    test!(unshort_5, "M 0 0 c 0 10 10 10 10 0 s 10 -10 10 0", |p| p.unshort(),
          "M0,0 c0,10 10,10 10,0 c0,-10 10,-10 10,0");

    test!(unarc_zero_radius, "M 0 0 A 0 5 0 0 1 10 0", |p| p.unarc(),
          "M0,0 L10,0");
    test!(unarc_same_point, "M 0 0 L 10 0 A 5 5 0 0 1 10 0", |p| p.unarc(),
          "M0,0 L10,0 L10,0");
    test!(unarc_relative_zero_radius, "M 1 1 a 0 0 0 0 1 10 0", |p| p.unarc(),
          "M1,1 l10,0");

    test!(matrix_identity, "M 0 0 H 10", |p| p.matrix(&Transform::default()),
          "M0,0 H10");
    test!(matrix_translate, "M 0 0 L 10 0 H 20 V 5 z", |p| p.matrix(&Transform::new_translate(1.0, 2.0)),
          "M1,2 L11,2 H21 V7 z");
    test!(matrix_relative, "M 0 0 l 10 0 h 5 v 5", |p| p.matrix(&Transform::new_translate(1.0, 2.0)),
          "M1,2 l10,0 h5 v5");
    test!(matrix_first_relative_move, "m 1 1 l 1 0", |p| p.matrix(&Transform::new_translate(1.0, 0.0)),
          "m2,1 l1,0");
    test!(matrix_rotate_h, "M 0 0 H 10 V 10", |p| p.matrix(&Transform::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0)),
          "M0,0 L0,10 L-10,10");
    test!(matrix_arc_mirror, "M 0 0 A 5 5 0 0 1 10 0", |p| p.matrix(&Transform::new_scale(-1.0, 1.0)),
          "M0,0 A5,5 0 0,0 -10,0");
    test!(matrix_arc_scale, "M 0 0 A 5 5 0 1 1 10 0", |p| p.matrix(&Transform::new_scale(2.0, 1.0)),
          "M0,0 A10,5 0 1,1 20,0");
    test!(matrix_arc_flattened, "M 0 0 A 5 5 0 0 1 10 0", |p| p.matrix(&Transform::new_scale(1.0, 0.0)),
          "M0,0 L10,0");
    test!(matrix_arc_empty, "M 1 1 A 5 5 0 0 1 1 1", |p| p.matrix(&Transform::new_scale(2.0, 2.0)),
          "M2,2 L2,2");

    #[test]
    fn unarc_half_circles() {
        let p = parse("M-5,0 A5,5 0 1,0 5,0 A5,5 0 1,0 -5,0").unarc();
        assert_eq!(p.len(), 5);
        assert!(p.segments()[1..].iter().all(|s| matches!(s, PathSegment::CurveTo { .. })));
        match p.segments()[4] {
            PathSegment::CurveTo { x, y, .. } => assert_eq!((x, y), (-5.0, 0.0)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn iter_positions() {
        let p = parse("M 10 10 l 5 0 v 5 z L 0 0");
        let points: Vec<_> = p.iter().map(|(_, x, y)| (x, y)).collect();
        assert_eq!(points, vec![(0.0, 0.0), (10.0, 10.0), (15.0, 10.0), (15.0, 15.0), (10.0, 10.0)]);
    }

    #[test]
    fn parse_error() {
        assert_eq!("L 10 10".parse::<PathData>().unwrap_err(), Error::UnexpectedData(1));
        assert_eq!("M 10".parse::<PathData>().unwrap_err(), Error::UnexpectedEndOfStream);
        assert!("".parse::<PathData>().unwrap().is_empty());
        assert_eq!("M 0 0 A 5 5 0 2 1 10 0".parse::<PathData>().unwrap_err().to_string(),
                   "unexpected data at position 15");
    }

    #[test]
    fn compact_arc_flags() {
        let p = parse("M10-20A5.5.3-4 010-.1");
        assert_eq!(p.to_string(), "M10,-20 A5.5,0.3 -4 0,1 0,-0.1");
    }
}
