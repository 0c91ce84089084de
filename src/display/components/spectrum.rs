/*
 *  display/components/spectrum.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spectrum bars - one vertical bar per band
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
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::Drawable as _;

use crate::display::color::{ColorRole, Theme};
use crate::display::error::DisplayError;
use crate::display::frame::CoordinateFrame;
use crate::display::traits::{Channel, Drawable, PlatformContext, Widget};
use crate::vframebuf::Canvas;

/// Smallest band change worth a repaint
const BAND_EPSILON: f32 = 1.0 / 256.0;

/// Level above which the top of a bar turns to the peak colour
const PEAK_LEVEL: f32 = 0.9;

const CAP_THICKNESS_PX: u32 = 2;

/// Bars for one channel's bands, lowest band on the left
#[derive(Debug, Clone)]
pub struct SpectrumBars {
    channel: Channel,
    bands: Vec<f32>,
}

impl SpectrumBars {
    pub fn new(channel: Channel) -> Self {
        Self { channel, bands: Vec::new() }
    }

    pub fn bands(&self) -> &[f32] {
        &self.bands
    }
}

impl Widget for SpectrumBars {
    fn kind(&self) -> &'static str {
        "spectrum"
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }
}

impl Drawable for SpectrumBars {
    fn refresh(&mut self, platform: &PlatformContext<'_>) -> bool {
        let fresh = platform.audio.spectrum(self.channel);
        let changed = fresh.len() != self.bands.len()
            || fresh.iter().zip(&self.bands).any(|(a, b)| (a - b).abs() > BAND_EPSILON);
        if changed {
            self.bands.clear();
            self.bands.extend_from_slice(fresh);
        }
        changed
    }

    fn draw(&mut self, frame: &CoordinateFrame, theme: &Theme, canvas: &mut Canvas) -> Result<(), DisplayError> {
        let area = frame.canvas_rect();
        let n = self.bands.len() as i32;
        let (w, h) = (area.size.width as i32, area.size.height as i32);
        if n == 0 || w < n || h < 2 {
            return Ok(());
        }

        let stride = w / n;
        let bar_w = if stride > 3 { stride - stride / 4 } else { stride.max(1) };
        let margin = (w - stride * n) / 2;
        let bar_style = PrimitiveStyle::with_fill(theme.color(ColorRole::Foreground));
        let cap_style = PrimitiveStyle::with_fill(theme.color(ColorRole::Peak));

        for (i, &level) in self.bands.iter().enumerate() {
            let bar_h = (level * h as f32).round() as i32;
            if bar_h <= 0 {
                continue;
            }
            let x = area.top_left.x + margin + i as i32 * stride;
            let y = area.top_left.y + h - bar_h;
            Rectangle::new(Point::new(x, y), Size::new(bar_w as u32, bar_h as u32))
                .into_styled(bar_style)
                .draw(canvas)?;
            if level >= PEAK_LEVEL {
                Rectangle::new(Point::new(x, y), Size::new(bar_w as u32, CAP_THICKNESS_PX.min(bar_h as u32)))
                    .into_styled(cap_style)
                    .draw(canvas)?;
            }
        }
        Ok(())
    }
}
