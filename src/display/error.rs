/*
 *  display/error.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the layout and presentation engine
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

/// Errors raised while composing or laying out a widget tree
///
/// All of these are deterministic authoring mistakes, never transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Non-positive size, inverted rectangle or coordinate outside the bounds
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Bad ratio list, too many children or an unknown anchor literal
    #[error("layout configuration error: {0}")]
    LayoutConfig(String),

    /// Two siblings overlap on both axes (advisory only)
    #[error("structural overlap between '{first}' and '{second}'")]
    StructuralOverlap { first: String, second: String },
}

impl LayoutError {
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        LayoutError::InvalidGeometry(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        LayoutError::LayoutConfig(msg.into())
    }
}

/// Errors raised while drawing or presenting a frame
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Invalid rotation angle
    #[error("Invalid rotation angle: {0} (must be 0, 90, 180, or 270)")]
    InvalidRotation(u16),

    /// Framebuffer size mismatch
    #[error("Buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Drawing operation failed
    #[error("Drawing error: {0}")]
    DrawingError(String),

    /// Layout failed underneath a draw or present
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

// Drawing into the in-memory canvas cannot fail
impl From<core::convert::Infallible> for DisplayError {
    fn from(err: core::convert::Infallible) -> Self {
        match err {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = LayoutError::geometry("width 0");
        assert_eq!(e.to_string(), "invalid geometry: width 0");

        let e = LayoutError::StructuralOverlap { first: "a".into(), second: "b".into() };
        assert!(e.to_string().contains("'a'"));

        let e = DisplayError::InvalidRotation(45);
        assert!(e.to_string().contains("45"));
    }

    #[test]
    fn test_layout_into_display() {
        let e: DisplayError = LayoutError::config("bad ratios").into();
        assert!(matches!(e, DisplayError::Layout(LayoutError::LayoutConfig(_))));
        assert_eq!(e.to_string(), "layout configuration error: bad ratios");
    }
}
