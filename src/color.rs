// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::value::Value;

// D50 reference white.
const WHITE_X: f64 = 96.422;
const WHITE_Y: f64 = 100.0;
const WHITE_Z: f64 = 82.521;

// CIE constants.
const EPSILON: f64 = 216.0 / 24389.0;
const KAPPA: f64 = 24389.0 / 27.0;

/// An sRGB color.
///
/// Channels are in the 0..255 range and alpha is in the 0..1 range.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Rgba = Rgba {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };

    /// Parses a CSS color.
    ///
    /// The alpha of `rgba()` and `hsla()` colors is kept as is,
    /// not quantized to 8 bits.
    pub fn parse(text: &str) -> Option<Self> {
        let c = svgtypes::Color::from_str(text).ok()?;
        let alpha = functional_alpha(text).unwrap_or(c.alpha as f64 / 255.0);
        Some(Rgba {
            red: c.red as f64,
            green: c.green as f64,
            blue: c.blue as f64,
            alpha: clamp(alpha, 0.0, 1.0),
        })
    }

    /// Creates a color from a property value.
    ///
    /// Missing, numeric and unparsable values are black.
    pub(crate) fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .and_then(Rgba::parse)
            .unwrap_or(Rgba::BLACK)
    }

    /// Returns a copy with a new alpha, clamped to the 0..1 range.
    pub fn with_alpha(&self, alpha: f64) -> Self {
        // NaN becomes 0.
        let alpha = if alpha > 1.0 {
            1.0
        } else if alpha > 0.0 {
            alpha
        } else {
            0.0
        };

        Rgba { alpha, ..*self }
    }

    /// Converts the color into CIELAB, rounded to 2 decimal places.
    ///
    /// Alpha is ignored.
    pub fn to_lab(&self) -> Lab {
        let r = linearize(self.red);
        let g = linearize(self.green);
        let b = linearize(self.blue);

        // sRGB to XYZ (D65).
        let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) * 100.0;
        let y = (r * 0.2126729 + g * 0.7151522 + b * 0.072175) * 100.0;
        let z = (r * 0.0193339 + g * 0.119192 + b * 0.9503041) * 100.0;

        // Bradford adaptation to D50.
        let x50 = x * 1.0478112 + y * 0.0228866 + z * -0.050127;
        let y50 = x * 0.0295424 + y * 0.9904844 + z * -0.0170491;
        let z50 = x * -0.0092345 + y * 0.0150436 + z * 0.7521316;

        let fx = lab_f(clamp(x50, 0.0, WHITE_X) / WHITE_X);
        let fy = lab_f(clamp(y50, 0.0, WHITE_Y) / WHITE_Y);
        let fz = lab_f(clamp(z50, 0.0, WHITE_Z) / WHITE_Z);

        Lab {
            l: round(116.0 * fy - 16.0, 2),
            a: round(500.0 * (fx - fy), 2),
            b: round(200.0 * (fy - fz), 2),
        }
    }

    /// Returns a perceived difference between two colors.
    ///
    /// This is the CIEDE2000 color difference scaled to the 0..1 range
    /// and rounded to 3 decimal places.
    pub fn delta(&self, other: &Rgba) -> f64 {
        let d = delta_e00(&self.to_lab(), &other.to_lab()) / 100.0;
        round(clamp(d, 0.0, 1.0), 3)
    }
}

/// A CIELAB color.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Returns the fourth component of an already validated functional color.
fn functional_alpha(text: &str) -> Option<f64> {
    let start = text.find('(')?;
    let end = text.rfind(')')?;
    let mut components = text
        .get(start + 1..end)?
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty());

    let alpha = components.nth(3)?;
    svgtypes::Number::from_str(alpha).ok().map(|n| n.0)
}

fn linearize(channel: f64) -> f64 {
    let ratio = channel / 255.0;
    if ratio < 0.04045 {
        ratio / 12.92
    } else {
        ((ratio + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn clamp(n: f64, min: f64, max: f64) -> f64 {
    if n > max {
        max
    } else if n > min {
        n
    } else {
        min
    }
}

// Rounds half up, like browsers do.
fn round(n: f64, digits: i32) -> f64 {
    let base = 10f64.powi(digits);
    (n * base + 0.5).floor() / base
}

// https://en.wikipedia.org/wiki/Color_difference#CIEDE2000
fn delta_e00(lab1: &Lab, lab2: &Lab) -> f64 {
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let mean_c = (c1 + c2) / 2.0;
    let mean_l = (lab1.l + lab2.l) / 2.0;

    let c7 = mean_c.powi(7);
    let c7_ratio = (c7 / (c7 + 25f64.powi(7))).sqrt();
    let g = 0.5 * (1.0 - c7_ratio);

    let a1 = lab1.a * (1.0 + g);
    let a2 = lab2.a * (1.0 + g);

    let c1 = a1.hypot(lab1.b);
    let c2 = a2.hypot(lab2.b);
    let mean_c_prime = (c1 + c2) / 2.0;

    let hue = |a: f64, b: f64| {
        if a == 0.0 && b == 0.0 {
            return 0.0;
        }

        let h = b.atan2(a).to_degrees();
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    };

    let h1 = hue(a1, lab1.b);
    let h2 = hue(a2, lab2.b);

    let diff = h2 - h1;
    let dh = if diff.abs() <= 180.0 {
        diff
    } else if h2 <= h1 {
        diff + 360.0
    } else {
        diff - 360.0
    };

    let mean_h = if diff.abs() <= 180.0 {
        (h1 + h2) / 2.0
    } else if h1 + h2 < 360.0 {
        (h1 + h2 + 360.0) / 2.0
    } else {
        (h1 + h2 - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (mean_h - 30.0).to_radians().cos()
        + 0.24 * (2.0 * mean_h).to_radians().cos()
        + 0.32 * (3.0 * mean_h + 6.0).to_radians().cos()
        - 0.2 * (4.0 * mean_h - 63.0).to_radians().cos();

    let delta_l = lab2.l - lab1.l;
    let delta_c = c2 - c1;
    let delta_h = 2.0 * (dh.to_radians() / 2.0).sin() * (c1 * c2).sqrt();

    let sl = 1.0 + (0.015 * (mean_l - 50.0).powi(2)) / (20.0 + (mean_l - 50.0).powi(2)).sqrt();
    let sc = 1.0 + 0.045 * mean_c_prime;
    let sh = 1.0 + 0.015 * mean_c_prime * t;

    let d_theta = 30.0 * (-((mean_h - 275.0) / 25.0).powi(2)).exp();
    let rc = 2.0 * c7_ratio;
    let rt = -rc * (2.0 * d_theta).to_radians().sin();

    ((delta_l / sl).powi(2)
        + (delta_c / sc).powi(2)
        + (delta_h / sh).powi(2)
        + rt * delta_c * delta_h / (sc * sh))
        .sqrt()
}
