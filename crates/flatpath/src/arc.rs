// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::Transform;

// Tuned for the "circular enough" and the degeneracy checks below.
// Changing it alters which transformed arcs collapse into circles or lines.
const EPSILON: f64 = 1e-10;

/// An origin-centered ellipse.
///
/// Used to recompute the arc parameters after an affine transform.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ellipse {
    /// The x-axis radius.
    pub rx: f64,
    /// The y-axis radius.
    pub ry: f64,
    /// The x-axis rotation in degrees.
    pub ax: f64,
}

impl Ellipse {
    /// Creates a new ellipse.
    #[inline]
    pub fn new(rx: f64, ry: f64, ax: f64) -> Self {
        Ellipse { rx, ry, ax }
    }

    /// Applies the linear part of a transform to the ellipse.
    ///
    /// The image of an ellipse under an affine map is an ellipse as well.
    /// The new radii are the square roots of the eigenvalues of `M·Mᵀ`,
    /// where `M` maps the unit circle onto the transformed ellipse.
    pub fn transform(&self, ts: &Transform) -> Ellipse {
        let (sin, cos) = self.ax.to_radians().sin_cos();

        let ma = [
            self.rx * (ts.a * cos + ts.c * sin),
            self.rx * (ts.b * cos + ts.d * sin),
            self.ry * (-ts.a * sin + ts.c * cos),
            self.ry * (-ts.b * sin + ts.d * cos),
        ];

        let j = ma[0] * ma[0] + ma[2] * ma[2];
        let k = ma[1] * ma[1] + ma[3] * ma[3];

        let d = ((ma[0] - ma[3]) * (ma[0] - ma[3]) + (ma[2] + ma[1]) * (ma[2] + ma[1]))
            * ((ma[0] + ma[3]) * (ma[0] + ma[3]) + (ma[2] - ma[1]) * (ma[2] - ma[1]));

        let jk = (j + k) / 2.0;

        if d < EPSILON * jk {
            // Circular enough to drop the rotation.
            let r = jk.sqrt();
            return Ellipse::new(r, r, 0.0);
        }

        let l = ma[0] * ma[1] + ma[2] * ma[3];
        let d = d.sqrt();

        let l1 = jk + d / 2.0;
        let l2 = jk - d / 2.0;

        let mut ax = if l.abs() < EPSILON && (l1 - k).abs() < EPSILON {
            90.0
        } else {
            let t = if l.abs() > (l1 - k).abs() {
                (l1 - j) / l
            } else {
                l / (l1 - k)
            };

            t.atan().to_degrees()
        };

        let (rx, ry) = if ax >= 0.0 {
            (l1.sqrt(), l2.sqrt())
        } else {
            ax += 90.0;
            (l2.sqrt(), l1.sqrt())
        };

        Ellipse::new(rx, ry, ax)
    }

    /// Checks that the ellipse is flattened into a line segment.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.rx < EPSILON * self.ry || self.ry < EPSILON * self.rx
    }
}

/// Converts an SVG elliptical arc into cubic curves.
///
/// Each curve spans at most a quarter turn.
/// Returns `None` when the arc is a straight line,
/// i.e. when a radius is zero or the end points coincide.
///
/// Every curve is returned as `[x1, y1, x2, y2, x, y]`.
pub(crate) fn arc_to_cubics(
    from: (f64, f64),
    rx: f64,
    ry: f64,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: (f64, f64),
) -> Option<Vec<[f64; 6]>> {
    let svg_arc = kurbo::SvgArc {
        from: kurbo::Point::new(from.0, from.1),
        to: kurbo::Point::new(to.0, to.1),
        radii: kurbo::Vec2::new(rx, ry),
        x_rotation: x_axis_rotation.to_radians(),
        large_arc,
        sweep,
    };

    let arc = kurbo::Arc::from_svg_arc(&svg_arc)?;

    let quarter = std::f64::consts::FRAC_PI_2;
    let count = ((arc.sweep_angle.abs() / quarter).ceil() as usize).max(1);
    let step = arc.sweep_angle / count as f64;

    let (sin_phi, cos_phi) = arc.x_rotation.sin_cos();
    let map = |u: f64, v: f64| {
        let x = u * arc.radii.x;
        let y = v * arc.radii.y;
        (
            arc.center.x + x * cos_phi - y * sin_phi,
            arc.center.y + x * sin_phi + y * cos_phi,
        )
    };

    let alpha = 4.0 / 3.0 * (step / 4.0).tan();

    let mut curves = Vec::with_capacity(count);
    let mut angle = arc.start_angle;
    for i in 0..count {
        let next_angle = angle + step;
        let (y1, x1) = angle.sin_cos();
        let (y2, x2) = next_angle.sin_cos();

        let p1 = map(x1 - y1 * alpha, y1 + x1 * alpha);
        let p2 = map(x2 + y2 * alpha, y2 - x2 * alpha);
        let p = if i + 1 == count { to } else { map(x2, y2) };

        curves.push([p1.0, p1.1, p2.0, p2.1, p.0, p.1]);
        angle = next_angle;
    }

    Some(curves)
}
