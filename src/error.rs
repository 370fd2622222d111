// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all fatal errors.
#[derive(Debug)]
pub enum Error {
    /// An input string is empty.
    EmptyString,

    /// The document root must be a single `svg` element.
    MalformedSvg,

    /// Failed to parse an SVG data.
    ParsingFailed(roxmltree::Error),

    /// A filter cannot be applied.
    ///
    /// Contains a message describing the filter.
    InvalidFilter(String),

    /// A `stroke-dasharray` value is not a list of positive numbers.
    InvalidDashArray(String),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::EmptyString => {
                write!(f, "SVG string is empty.")
            }
            Error::MalformedSvg => {
                write!(
                    f,
                    "Malformed SVG: expected only 1 child <svg> element on root node."
                )
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::InvalidFilter(ref msg) | Error::InvalidDashArray(ref msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Non-fatal messages collected during flattening.
#[derive(Clone, Default, PartialEq, Debug)]
pub(crate) struct Diagnostics {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn error(&mut self, msg: String) {
        log::warn!("{}", msg);
        self.errors.push(msg);
    }

    pub fn warn(&mut self, msg: String) {
        log::warn!("{}", msg);
        self.warnings.push(msg);
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
