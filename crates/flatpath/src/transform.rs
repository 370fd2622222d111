// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::Num;

/// A 2D affine transform.
///
/// Maps a point as `x' = a·x + c·y + e` and `y' = b·x + d·y + f`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    /// Constructs a new transform.
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Transform { a, b, c, d, e, f }
    }

    /// Constructs a new translate transform.
    #[inline]
    pub fn new_translate(x: f64, y: f64) -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Constructs a new scale transform.
    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Checks that transform is the identity.
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Transform::default()
    }

    /// Returns the matrix determinant.
    ///
    /// A negative value means that the transform mirrors the plane.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns `self · other`.
    ///
    /// The result applies `other` first and then `self`,
    /// which is how chained SVG transforms are composed.
    #[inline]
    pub fn pre_concat(&self, other: &Transform) -> Transform {
        multiply(self, other)
    }

    /// Applies the transform to a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Applies only the linear part of the transform to a vector.
    #[inline]
    pub fn apply_vector(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y, self.b * x + self.d * y)
    }

    /// Composes a chain of transforms into a single one.
    ///
    /// The first transform in the list is the outermost one.
    /// An empty list produces the identity.
    pub fn flatten(list: &[Transform]) -> Transform {
        list.iter()
            .fold(Transform::default(), |ts, other| ts.pre_concat(other))
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "matrix({} {} {} {} {} {})",
            Num(self.a),
            Num(self.b),
            Num(self.c),
            Num(self.d),
            Num(self.e),
            Num(self.f)
        )
    }
}

#[inline(never)]
fn multiply(ts1: &Transform, ts2: &Transform) -> Transform {
    Transform {
        a: ts1.a * ts2.a + ts1.c * ts2.b,
        b: ts1.b * ts2.a + ts1.d * ts2.b,
        c: ts1.a * ts2.c + ts1.c * ts2.d,
        d: ts1.b * ts2.c + ts1.d * ts2.d,
        e: ts1.a * ts2.e + ts1.c * ts2.f + ts1.e,
        f: ts1.b * ts2.e + ts1.d * ts2.f + ts1.f,
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test {
        ($name:ident, $list:expr, $result:expr) => (
            #[test]
            fn $name() {
                let ts = Transform::flatten(&$list);
                assert_eq!(ts.to_string(), $result);
            }
        )
    }

    test!(flatten_empty, [], "matrix(1 0 0 1 0 0)");

    test!(flatten_1,
        [Transform::new_translate(10.0, 15.0), Transform::new_translate(0.0, 5.0)],
        "matrix(1 0 0 1 10 20)"
    );

    test!(flatten_2,
        [Transform::new_translate(10.0, 0.0), Transform::new_scale(2.0, 2.0)],
        "matrix(2 0 0 2 10 0)"
    );

    test!(flatten_3,
        [Transform::new_scale(2.0, 2.0), Transform::new_translate(10.0, 0.0)],
        "matrix(2 0 0 2 20 0)"
    );

    #[test]
    fn apply_order() {
        let ts = Transform::flatten(&[Transform::new_translate(10.0, 0.0), Transform::new_scale(2.0, 2.0)]);
        assert_eq!(ts.apply(0.0, 0.0), (10.0, 0.0));

        let ts = Transform::flatten(&[Transform::new_scale(2.0, 2.0), Transform::new_translate(10.0, 0.0)]);
        assert_eq!(ts.apply(0.0, 0.0), (20.0, 0.0));
    }

    #[test]
    fn associativity() {
        let t1 = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let t2 = Transform::new(-1.0, 0.5, 2.0, 1.0, 0.0, 3.0);
        let t3 = Transform::new(2.0, 0.0, 0.0, 2.0, -4.0, 1.0);
        assert_eq!(t1.pre_concat(&t2).pre_concat(&t3), t1.pre_concat(&t2.pre_concat(&t3)));
    }

    #[test]
    fn identity_is_unit() {
        let ts = Transform::new(1.5, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(Transform::default().pre_concat(&ts), ts);
        assert_eq!(ts.pre_concat(&Transform::default()), ts);
        assert!(Transform::default().is_default());
    }

    #[test]
    fn mirror_determinant() {
        assert!(Transform::new_scale(-1.0, 1.0).determinant() < 0.0);
        assert!(Transform::new_scale(2.0, 3.0).determinant() > 0.0);
    }
}
