/*
 *  display/rotator.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Presentation rotator - maps the logical canvas and its dirty rects
 *  onto a panel mounted at a quarter turn
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::trace;

use crate::vframebuf::Canvas;
use super::dirty::DirtyRegionTracker;
use super::error::DisplayError;
use super::traits::DisplaySurface;

/// Panel mounting relative to the logical canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    pub fn from_degrees(deg: u16) -> Result<Self, DisplayError> {
        match deg {
            0 => Ok(Rotation::Rotate0),
            90 => Ok(Rotation::Rotate90),
            180 => Ok(Rotation::Rotate180),
            270 => Ok(Rotation::Rotate270),
            other => Err(DisplayError::InvalidRotation(other)),
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Rotate0 => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }

    /// Width and height trade places
    pub fn is_quarter(&self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

/// Rotates finished frames into panel orientation and presents them
#[derive(Debug)]
pub struct PresentationRotator {
    logical: Size,
    rotation: Rotation,
    physical: Canvas,
}

impl PresentationRotator {
    pub fn new(logical: Size, rotation: Rotation) -> Self {
        let physical = if rotation.is_quarter() {
            Size::new(logical.height, logical.width)
        } else {
            logical
        };
        Self {
            logical,
            rotation,
            physical: Canvas::new(physical.width, physical.height, Rgb888::BLACK),
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn logical_size(&self) -> Size {
        self.logical
    }

    pub fn physical_size(&self) -> Size {
        self.physical.size()
    }

    /// The last rotated frame
    pub fn physical(&self) -> &Canvas {
        &self.physical
    }

    /// Logical rect to panel rect
    pub fn transform_rect(&self, r: &Rectangle) -> Rectangle {
        let (lw, lh) = (self.logical.width as i32, self.logical.height as i32);
        let (x, y) = (r.top_left.x, r.top_left.y);
        let (w, h) = (r.size.width as i32, r.size.height as i32);
        let (px, py, pw, ph) = match self.rotation {
            Rotation::Rotate0 => (x, y, w, h),
            Rotation::Rotate90 => (y, lw - x - w, h, w),
            Rotation::Rotate180 => (lw - x - w, lh - y - h, w, h),
            Rotation::Rotate270 => (lh - y - h, x, h, w),
        };
        Rectangle::new(Point::new(px, py), Size::new(pw as u32, ph as u32))
    }

    /// Panel rect back to logical rect
    pub fn inverse_rect(&self, r: &Rectangle) -> Rectangle {
        let (lw, lh) = (self.logical.width as i32, self.logical.height as i32);
        let (px, py) = (r.top_left.x, r.top_left.y);
        let (pw, ph) = (r.size.width as i32, r.size.height as i32);
        let (x, y, w, h) = match self.rotation {
            Rotation::Rotate0 => (px, py, pw, ph),
            Rotation::Rotate90 => (lw - py - ph, px, ph, pw),
            Rotation::Rotate180 => (lw - px - pw, lh - py - ph, pw, ph),
            Rotation::Rotate270 => (py, lh - px - pw, ph, pw),
        };
        Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32))
    }

    /// Copy the whole logical canvas into the panel buffer
    pub fn rotate_into(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        if canvas.size() != self.logical {
            return Err(DisplayError::BufferSizeMismatch {
                expected: (self.logical.width * self.logical.height) as usize,
                actual: canvas.as_slice().len(),
            });
        }
        if self.rotation == Rotation::Rotate0 {
            self.physical.as_mut_slice().copy_from_slice(canvas.as_slice());
            return Ok(());
        }

        let (lw, lh) = (canvas.width(), canvas.height());
        let pw = self.physical.width();
        let src = canvas.as_slice();
        let dst = self.physical.as_mut_slice();
        for y in 0..lh {
            let row = &src[y * lw..(y + 1) * lw];
            for (x, &c) in row.iter().enumerate() {
                let (px, py) = match self.rotation {
                    Rotation::Rotate90 => (y, lw - 1 - x),
                    Rotation::Rotate180 => (lw - 1 - x, lh - 1 - y),
                    Rotation::Rotate270 => (lh - 1 - y, x),
                    Rotation::Rotate0 => (x, y),
                };
                dst[py * pw + px] = c;
            }
        }
        Ok(())
    }

    /// Rotate and push one frame, invalidating only `dirty`
    ///
    /// Nothing reaches the surface when `dirty` is empty. The redraw
    /// metric is folded from the logical rects either way; returns this
    /// frame's percentage.
    pub fn present(
        &mut self,
        canvas: &Canvas,
        dirty: &[Rectangle],
        surface: &mut dyn DisplaySurface,
        tracker: &mut DirtyRegionTracker,
    ) -> Result<f32, DisplayError> {
        if dirty.is_empty() {
            return Ok(tracker.record_present(&[]));
        }
        self.rotate_into(canvas)?;

        let logical = Rectangle::new(Point::zero(), self.logical);
        let clipped: Vec<Rectangle> = dirty
            .iter()
            .map(|r| r.intersection(&logical))
            .filter(|r| r.size.width > 0 && r.size.height > 0)
            .collect();
        let physical: Vec<Rectangle> = clipped.iter().map(|r| self.transform_rect(r)).collect();
        trace!("present {} rects at {} deg", physical.len(), self.rotation.degrees());

        surface.present(&self.physical, &physical)?;
        Ok(tracker.record_present(&clipped))
    }
}
