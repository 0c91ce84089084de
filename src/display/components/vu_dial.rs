/*
 *  display/components/vu_dial.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  VU dial - needle meter on a calibrated arc
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
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::Drawable as _;
use log::debug;

use crate::display::color::{ColorRole, Theme};
use crate::display::error::{DisplayError, LayoutError};
use crate::display::frame::CoordinateFrame;
use crate::display::traits::{Channel, Configurable, Drawable, PlatformContext, Widget};
use crate::vframebuf::Canvas;

/// Smallest level change worth a repaint
const LEVEL_EPSILON: f32 = 0.002;

/// Level at which the needle turns to the peak colour
const PEAK_LEVEL: f32 = 0.9;

/// Scale marks at these levels
const TICKS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Single-channel needle meter
#[derive(Debug, Clone)]
pub struct VuDial {
    channel: Channel,
    level: f32,
    endstops: [f32; 2],
    needle_width: u32,
}

impl VuDial {
    pub fn new(channel: Channel) -> Self {
        Self { channel, level: 0.0, endstops: [-60.0, 60.0], needle_width: 2 }
    }

    /// Sweep in degrees either side of vertical
    pub fn endstops(mut self, from: f32, to: f32) -> Self {
        self.endstops = [from, to];
        self
    }

    pub fn needle_width(mut self, px: u32) -> Self {
        self.needle_width = px.max(1);
        self
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Widget for VuDial {
    fn kind(&self) -> &'static str {
        "vu-dial"
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for VuDial {
    /// Pivot a tenth of the height up, needle reaching most of the rest
    fn configure(&mut self, frame: &mut CoordinateFrame) -> Result<(), LayoutError> {
        let h = frame.height() as f32;
        let cal = frame.anglescale(h * 0.8, self.endstops, h * 0.1)?;
        debug!("vu dial calibrated: {:?}", cal);
        Ok(())
    }
}

impl Drawable for VuDial {
    fn refresh(&mut self, platform: &PlatformContext<'_>) -> bool {
        let level = platform.audio.level(self.channel);
        if (level - self.level).abs() > LEVEL_EPSILON {
            self.level = level;
            true
        } else {
            false
        }
    }

    fn draw(&mut self, frame: &CoordinateFrame, theme: &Theme, canvas: &mut Canvas) -> Result<(), DisplayError> {
        let tick_style = PrimitiveStyle::with_fill(theme.color(ColorRole::Foreground));
        for tick in TICKS {
            Circle::with_center(frame.anglexy(tick)?, 3)
                .into_styled(tick_style)
                .draw(canvas)?;
        }

        let colour = if self.level >= PEAK_LEVEL {
            theme.color(ColorRole::Peak)
        } else {
            theme.color(ColorRole::Accent)
        };
        let pivot = frame.angle_pivot()?;
        Line::new(pivot, frame.anglexy(self.level)?)
            .into_styled(PrimitiveStyle::with_stroke(colour, self.needle_width))
            .draw(canvas)?;
        Circle::with_center(pivot, self.needle_width * 3)
            .into_styled(PrimitiveStyle::with_fill(colour))
            .draw(canvas)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSnapshot;
    use crate::display::color::{ThemeBook, DEFAULT_THEME};
    use crate::display::traits::Palette;
    use crate::metadata::StaticMetadata;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::primitives::Rectangle;

    fn frame() -> CoordinateFrame {
        CoordinateFrame::new(Rectangle::new(Point::zero(), Size::new(200, 100)))
    }

    #[test]
    fn test_configure_calibrates() {
        let mut f = frame();
        let mut dial = VuDial::new(Channel::Mono);
        dial.configure(&mut f).unwrap();
        let cal = f.calibration().unwrap();
        assert_eq!(cal.endstops, [-60.0, 60.0]);
        assert_eq!(f.angle_pivot().unwrap(), Point::new(100, 89));
    }

    #[test]
    fn test_refresh_threshold() {
        let themes = ThemeBook::builtin();
        let meta = StaticMetadata::default();
        let mut dial = VuDial::new(Channel::Left);

        let quiet = AudioSnapshot::new(1, 0.001, 0.0, vec![], vec![]);
        assert!(!dial.refresh(&PlatformContext::new(&quiet, &meta, &themes)));

        let loud = AudioSnapshot::new(2, 0.5, 0.0, vec![], vec![]);
        assert!(dial.refresh(&PlatformContext::new(&loud, &meta, &themes)));
        assert_eq!(dial.level(), 0.5);
    }

    #[test]
    fn test_needle_points_up_at_half() {
        let themes = ThemeBook::builtin();
        let theme = themes.theme(DEFAULT_THEME).unwrap();
        let meta = StaticMetadata::default();
        let audio = AudioSnapshot::new(1, 0.5, 0.5, vec![], vec![]);

        let mut f = frame();
        let mut dial = VuDial::new(Channel::Mono);
        dial.configure(&mut f).unwrap();
        dial.refresh(&PlatformContext::new(&audio, &meta, &themes));

        let mut canvas = Canvas::new(200, 100, Rgb888::BLACK);
        dial.draw(&f, theme, &mut canvas).unwrap();

        assert_eq!(f.anglexy(0.5).unwrap(), Point::new(100, 9));
        let hit = (99..=101).any(|x| canvas.pixel(Point::new(x, 50)) == Some(theme.accent));
        assert!(hit);
        // nothing left of the needle half way up
        assert_eq!(canvas.pixel(Point::new(60, 50)), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_draw_needs_calibration() {
        let themes = ThemeBook::builtin();
        let theme = themes.theme(DEFAULT_THEME).unwrap();
        let mut canvas = Canvas::new(200, 100, Rgb888::BLACK);
        let mut dial = VuDial::new(Channel::Mono);
        assert!(matches!(
            dial.draw(&frame(), theme, &mut canvas),
            Err(DisplayError::Layout(LayoutError::InvalidGeometry(_)))
        ));
    }
}
