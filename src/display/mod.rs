/*
 *  display/mod.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - layout tree, incremental redraw and rotated
 *  presentation
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod color;

// Geometry and layout
pub mod frame;
pub mod node;
pub mod distributor;

// Redraw tracking and presentation
pub mod dirty;
pub mod rotator;
pub mod surface;

// UI components
pub mod components;

// Named screens
pub mod screens;

// Re-exports for convenience
pub use traits::{
    AudioSource, Channel, Configurable, DisplaySurface, DrawContext, Drawable, MetaField,
    MetadataSource, Palette, PlatformContext, Widget,
};
pub use error::{DisplayError, LayoutError};
pub use color::{ColorRole, Theme, ThemeBook, DEFAULT_THEME};
pub use frame::{Align, AngleCalibration, Axis, CoordinateFrame, HAlign, Rect, ScalePair, VAlign};
pub use node::{Arrangement, LayoutNode, NodeOptions, Outline};
pub use distributor::AxisDistributor;
pub use dirty::{DirtyRegionTracker, IntoDirtyRect};
pub use rotator::{PresentationRotator, Rotation};
pub use surface::RecordingSurface;
pub use screens::{Screen, SCREEN_NAMES};
