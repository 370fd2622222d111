// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::PathSegment;

/// Additional [`PathSegment`] methods.
pub trait PathSegmentExt {
    /// Checks that the segment uses absolute coordinates.
    fn is_absolute(&self) -> bool;

    /// Returns the command letter of the segment.
    ///
    /// Lowercase for relative segments.
    fn command(&self) -> char;
}

impl PathSegmentExt for PathSegment {
    #[inline]
    fn is_absolute(&self) -> bool {
        match *self {
            PathSegment::MoveTo { abs, .. }
            | PathSegment::LineTo { abs, .. }
            | PathSegment::HorizontalLineTo { abs, .. }
            | PathSegment::VerticalLineTo { abs, .. }
            | PathSegment::CurveTo { abs, .. }
            | PathSegment::SmoothCurveTo { abs, .. }
            | PathSegment::Quadratic { abs, .. }
            | PathSegment::SmoothQuadratic { abs, .. }
            | PathSegment::EllipticalArc { abs, .. }
            | PathSegment::ClosePath { abs } => abs,
        }
    }

    fn command(&self) -> char {
        let c = match *self {
            PathSegment::MoveTo { .. } => 'M',
            PathSegment::LineTo { .. } => 'L',
            PathSegment::HorizontalLineTo { .. } => 'H',
            PathSegment::VerticalLineTo { .. } => 'V',
            PathSegment::CurveTo { .. } => 'C',
            PathSegment::SmoothCurveTo { .. } => 'S',
            PathSegment::Quadratic { .. } => 'Q',
            PathSegment::SmoothQuadratic { .. } => 'T',
            PathSegment::EllipticalArc { .. } => 'A',
            PathSegment::ClosePath { .. } => 'Z',
        };

        if self.is_absolute() {
            c
        } else {
            c.to_ascii_lowercase()
        }
    }
}
