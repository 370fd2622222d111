// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
*flatpath* parses and normalizes [SVG path data](https://www.w3.org/TR/SVG2/paths.html#PathData).

## Features

- Path data parsing on top of `svgtypes`,
  so data like `M10-20A5.5.3-4 110-.1` will be parsed correctly.
- Relative to absolute coordinates conversion.
- Smooth curves (`S`, `T`) expansion.
- Elliptical arcs to cubic curves conversion.
- Affine transforms application, including arcs under mirroring transforms.

## Safety

- The library should not panic.
- The library forbids unsafe code.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod arc;
mod data;
mod segment;
mod transform;

pub use svgtypes::{Error, PathParser, PathSegment};

pub use crate::arc::Ellipse;
pub use crate::data::{Iter, PathData};
pub use crate::segment::PathSegmentExt;
pub use crate::transform::Transform;

/// A number formatted the way SVG authoring tools on the web print them.
///
/// Uses the shortest representation that round-trips, switches to
/// the exponent notation below `1e-6` and from `1e21` on,
/// and never prints a negative zero.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Num(pub f64);

impl std::fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let n = self.0;
        if n.is_nan() {
            return write!(f, "NaN");
        }

        if n.is_infinite() {
            return write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" });
        }

        if n == 0.0 {
            return write!(f, "0");
        }

        let abs = n.abs();
        if abs >= 1e21 || abs < 1e-6 {
            let s = format!("{:e}", n);
            match s.split_once('e') {
                Some((mantissa, exp)) if !exp.starts_with('-') => {
                    write!(f, "{}e+{}", mantissa, exp)
                }
                _ => write!(f, "{}", s),
            }
        } else {
            write!(f, "{}", n)
        }
    }
}
