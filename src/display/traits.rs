/*
 *  display/traits.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capability traits - collaborators consumed by the engine and the
 *  widget capabilities a node can declare
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use crate::vframebuf::Canvas;
use super::color::{Theme, DEFAULT_THEME};
use super::dirty::DirtyRegionTracker;
use super::error::{DisplayError, LayoutError};
use super::frame::CoordinateFrame;

/// Audio channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
    /// Mix of both channels
    Mono,
}

/// Per-frame audio snapshot provider
///
/// Values are already smoothed by the collaborator; the engine only reads.
pub trait AudioSource {
    /// Level in 0..1
    fn level(&self, channel: Channel) -> f32;

    /// Band levels in 0..1, lowest band first
    fn spectrum(&self, channel: Channel) -> &[f32];

    /// Counter bumped on every published snapshot
    fn sequence(&self) -> u64;
}

/// Now-playing text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    Artist,
    Title,
    Album,
    Format,
}

/// Now-playing metadata provider
pub trait MetadataSource {
    fn text(&self, field: MetaField) -> Option<&str>;

    /// Playback progress in 0..1
    fn position(&self) -> f32;
}

/// Theme lookup by name
pub trait Palette {
    fn theme(&self, name: &str) -> Option<&Theme>;
}

/// The physical display
pub trait DisplaySurface {
    /// Physical size in pixels
    fn size(&self) -> Size;

    /// Push `frame` to the panel, invalidating only `dirty`
    ///
    /// `frame` is already in physical orientation.
    fn present(&mut self, frame: &Canvas, dirty: &[Rectangle]) -> Result<(), DisplayError>;
}

/// Collaborators every node can reach during a pass
///
/// Borrowed for the duration of one pass; never owns anything.
#[derive(Clone, Copy)]
pub struct PlatformContext<'a> {
    pub audio: &'a dyn AudioSource,
    pub metadata: &'a dyn MetadataSource,
    pub palette: &'a dyn Palette,
}

impl<'a> PlatformContext<'a> {
    pub fn new(
        audio: &'a dyn AudioSource,
        metadata: &'a dyn MetadataSource,
        palette: &'a dyn Palette,
    ) -> Self {
        Self { audio, metadata, palette }
    }

    /// Theme by name, falling back to the default theme
    pub fn theme(&self, name: &str) -> Result<&'a Theme, LayoutError> {
        self.palette
            .theme(name)
            .or_else(|| self.palette.theme(DEFAULT_THEME))
            .ok_or_else(|| LayoutError::config(format!("no theme '{}' and no default theme", name)))
    }
}

/// Everything one draw pass mutates, threaded down the tree
pub struct DrawContext<'a> {
    pub platform: PlatformContext<'a>,
    pub canvas: &'a mut Canvas,
    pub dirty: &'a mut DirtyRegionTracker,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        platform: PlatformContext<'a>,
        canvas: &'a mut Canvas,
        dirty: &'a mut DirtyRegionTracker,
    ) -> Self {
        Self { platform, canvas, dirty }
    }
}

/// A widget that paints itself
pub trait Drawable {
    /// Pull the latest snapshot; true when the widget must repaint
    fn refresh(&mut self, platform: &PlatformContext<'_>) -> bool;

    /// Paint inside `frame`; the background is already erased
    fn draw(&mut self, frame: &CoordinateFrame, theme: &Theme, canvas: &mut Canvas) -> Result<(), DisplayError>;
}

/// A widget that derives state from its geometry after every layout pass
pub trait Configurable {
    fn configure(&mut self, frame: &mut CoordinateFrame) -> Result<(), LayoutError>;
}

/// Content attached to a layout node
///
/// Capabilities are declared here rather than probed: a widget that can
/// draw returns itself from `as_drawable`.
pub trait Widget {
    /// Short type name for logs
    fn kind(&self) -> &'static str;

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        None
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}
