// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Flattening options.
#[derive(Clone, Debug)]
pub struct Options {
    /// Keep elliptical arcs in paths and segments.
    ///
    /// When disabled, arcs, circles and ellipses are approximated
    /// with cubic curves.
    ///
    /// Default: false
    pub preserve_arcs: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            preserve_arcs: false,
        }
    }
}
