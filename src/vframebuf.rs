/*
 *  vframebuf.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized framebuffer - the logical canvas and the physical
 *  presentation buffer
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{PixelColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// The canvas every widget draws into
pub type Canvas = VarFrameBuf<Rgb888>;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Whole buffer as a rectangle at the origin
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(self.w as u32, self.h as u32))
    }

    /// Mutable raw access (useful for pushing regions to the panel)
    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.buf }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    pub fn set_pixel(&mut self, p: Point, color: C) {
        if let Some(i) = self.idx(p) {
            self.buf[i] = color;
        }
    }

    /// Solid fill, clipped to the buffer
    pub fn fill(&mut self, area: &Rectangle, color: C) {
        let clipped = area.intersection(&self.bounds());
        let Size { width, height } = clipped.size;
        if width == 0 || height == 0 { return; }
        let (x0, y0) = (clipped.top_left.x as usize, clipped.top_left.y as usize);
        for row in y0..y0 + height as usize {
            let base = row * self.w + x0;
            self.buf[base..base + width as usize].fill(color);
        }
    }

    /// Copy a row-major block of pixels into `area`, clipped to the buffer
    ///
    /// `pixels` must hold `area.width * area.height` values.
    pub fn blit(&mut self, area: &Rectangle, pixels: &[C]) -> Result<(), crate::display::DisplayError> {
        let expected = area.size.width as usize * area.size.height as usize;
        if pixels.len() != expected {
            return Err(crate::display::DisplayError::BufferSizeMismatch { expected, actual: pixels.len() });
        }
        let stride = area.size.width as usize;
        for (row, line) in pixels.chunks(stride.max(1)).enumerate() {
            for (col, &c) in line.iter().enumerate() {
                self.set_pixel(area.top_left + Point::new(col as i32, row as i32), c);
            }
        }
        Ok(())
    }

    /// Row-major copy of a region, clipped to the buffer
    pub fn region(&self, area: &Rectangle) -> Vec<C> {
        let clipped = area.intersection(&self.bounds());
        let Size { width, height } = clipped.size;
        let mut out = Vec::with_capacity((width * height) as usize);
        let (x0, y0) = (clipped.top_left.x as usize, clipped.top_left.y as usize);
        for row in y0..y0 + height as usize {
            let base = row * self.w + x0;
            out.extend_from_slice(&self.buf[base..base + width as usize]);
        }
        out
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(area, color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_clips() {
        let mut fb = Canvas::new(8, 4, Rgb888::BLACK);
        fb.fill(&Rectangle::new(Point::new(6, 2), Size::new(5, 5)), Rgb888::RED);
        assert_eq!(fb.pixel(Point::new(7, 3)), Some(Rgb888::RED));
        assert_eq!(fb.pixel(Point::new(5, 3)), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(Point::new(8, 3)), None);
    }

    #[test]
    fn test_blit_and_region() {
        let mut fb = Canvas::new(4, 4, Rgb888::BLACK);
        let area = Rectangle::new(Point::new(1, 1), Size::new(2, 2));
        let block = [Rgb888::RED, Rgb888::GREEN, Rgb888::BLUE, Rgb888::WHITE];
        fb.blit(&area, &block).unwrap();
        assert_eq!(fb.region(&area), block.to_vec());
        assert_eq!(fb.pixel(Point::new(2, 1)), Some(Rgb888::GREEN));
        assert!(fb.blit(&area, &block[..3]).is_err());
    }
}
