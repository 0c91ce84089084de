/*
 *  display/screens.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screens - named widget trees, built once per selection
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
use log::{debug, info};

use super::components::{SpectrumBars, TextLabel, VuDial};
use super::distributor::AxisDistributor;
use super::error::{DisplayError, LayoutError};
use super::frame::Axis;
use super::node::{LayoutNode, NodeOptions, Outline};
use super::traits::{Channel, DrawContext, MetaField};

/// Screens `build` knows about
pub const SCREEN_NAMES: [&str; 3] = ["spectrum", "vu", "nowplaying"];

fn panel() -> NodeOptions {
    NodeOptions::new().outline(Outline::new(2).radius(6)).padding(4)
}

fn spectrum_pair() -> Result<LayoutNode, LayoutError> {
    LayoutNode::distributor("spectrum", NodeOptions::new().transparent(), AxisDistributor::with_ratios(Axis::X, &[1.0, 1.0], 0.98)?)
        .with_child(LayoutNode::with_widget("spectrum-left", panel(), SpectrumBars::new(Channel::Left)))?
        .with_child(LayoutNode::with_widget("spectrum-right", panel(), SpectrumBars::new(Channel::Right)))
}

fn vu_pair() -> Result<LayoutNode, LayoutError> {
    LayoutNode::distributor("vu", NodeOptions::new().transparent(), AxisDistributor::with_ratios(Axis::X, &[1.0, 1.0], 0.98)?)
        .with_child(LayoutNode::with_widget("vu-left", panel(), VuDial::new(Channel::Left)))?
        .with_child(LayoutNode::with_widget("vu-right", panel().outline(Outline::new(2).radius(6).colour(1)), VuDial::new(Channel::Right)))
}

/// VU either side of a mono spectrum, track details below
fn now_playing() -> Result<LayoutNode, LayoutError> {
    let meters = LayoutNode::distributor("meters", NodeOptions::new().transparent(), AxisDistributor::columns(&[0.25, 0.5, 0.25])?)
        .with_child(LayoutNode::with_widget("vu-left", panel(), VuDial::new(Channel::Left)))?
        .with_child(LayoutNode::with_widget("spectrum-mono", panel(), SpectrumBars::new(Channel::Mono)))?
        .with_child(LayoutNode::with_widget("vu-right", panel(), VuDial::new(Channel::Right)))?;

    let details = NodeOptions::new().padding(2);
    LayoutNode::distributor("nowplaying", NodeOptions::new().transparent(), AxisDistributor::with_ratios(Axis::Y, &[0.55, 0.15, 0.15, 0.15], 0.98)?)
        .with_child(meters)?
        .with_child(LayoutNode::with_widget("artist", details.clone(), TextLabel::new(MetaField::Artist)))?
        .with_child(LayoutNode::with_widget("title", details.clone(), TextLabel::new(MetaField::Title)))?
        .with_child(LayoutNode::with_widget("album", details, TextLabel::new(MetaField::Album)))
}

/// One full-screen widget tree
#[derive(Debug)]
pub struct Screen {
    name: String,
    root: LayoutNode,
}

impl Screen {
    /// Build the named screen laid out for `size`
    pub fn build(name: &str, size: Size) -> Result<Self, LayoutError> {
        let body = match name {
            "spectrum" => spectrum_pair()?,
            "vu" => vu_pair()?,
            "nowplaying" | "mixed" => now_playing()?,
            other => {
                return Err(LayoutError::config(format!(
                    "unknown screen '{}', expected one of {:?}", other, SCREEN_NAMES
                )))
            }
        };
        Self::with_body(name, size, body)
    }

    /// Shown when the requested screen cannot be built
    pub fn placeholder(size: Size) -> Result<Self, LayoutError> {
        let body = LayoutNode::with_widget(
            "placeholder",
            NodeOptions::new().scalers(0.8, 0.3).outline(Outline::new(1)),
            TextLabel::new(MetaField::Title),
        );
        Self::with_body("placeholder", size, body)
    }

    fn with_body(name: &str, size: Size, body: LayoutNode) -> Result<Self, LayoutError> {
        let mut root = LayoutNode::root("root", size, NodeOptions::new().padding(4))?;
        root.add_child(body)?;
        info!("screen '{}' built for {}x{}", name, size.width, size.height);
        debug!("{:#?}", root);
        Ok(Self { name: name.to_string(), root })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    /// Lay the whole tree out again for a new screen size
    pub fn layout(&mut self, size: Size) -> Result<(), LayoutError> {
        self.root.relayout(Rectangle::new(Point::zero(), size))
    }

    /// One draw pass; dirty rects accumulate in `ctx.dirty`
    pub fn render(&mut self, ctx: &mut DrawContext<'_>, full: bool) -> Result<(), DisplayError> {
        if full {
            self.root.paint_frame(ctx)?;
        }
        if self.root.update_screen(ctx, full)? {
            ctx.dirty.add(self.root.frame().perimeter_rect());
        }
        Ok(())
    }

    /// Advisory overlap check over the whole tree
    pub fn check(&self) -> bool {
        self.root.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{synthesize, AudioSnapshot};
    use crate::display::color::ThemeBook;
    use crate::display::dirty::DirtyRegionTracker;
    use crate::display::traits::PlatformContext;
    use crate::metadata::StaticMetadata;
    use crate::vframebuf::Canvas;
    use embedded_graphics::pixelcolor::Rgb888;

    fn size() -> Size {
        Size::new(1280, 400)
    }

    #[test]
    fn test_every_screen_builds_clean() {
        for name in SCREEN_NAMES {
            let screen = Screen::build(name, size()).unwrap();
            assert_eq!(screen.name(), name);
            assert!(screen.check(), "{}", name);
        }
        assert!(Screen::build("mixed", size()).unwrap().check());
        assert!(Screen::placeholder(size()).unwrap().check());
    }

    #[test]
    fn test_unknown_screen() {
        assert!(matches!(Screen::build("clock", size()), Err(LayoutError::LayoutConfig(_))));
    }

    #[test]
    fn test_now_playing_rows() {
        let screen = Screen::build("nowplaying", size()).unwrap();
        let meters = screen.root().find("meters").unwrap().frame().perimeter_rect();
        let artist = screen.root().find("artist").unwrap().frame().perimeter_rect();
        let title = screen.root().find("title").unwrap().frame().perimeter_rect();
        assert!(meters.top_left.y < artist.top_left.y);
        assert!(artist.top_left.y < title.top_left.y);
        assert!(meters.size.height > 3 * artist.size.height);
    }

    #[test]
    fn test_full_then_incremental() {
        let mut screen = Screen::build("spectrum", size()).unwrap();
        let themes = ThemeBook::builtin();
        let meta = StaticMetadata::default();
        let mut canvas = Canvas::new(1280, 400, Rgb888::BLACK);
        let mut dirty = DirtyRegionTracker::new(size());

        let audio = AudioSnapshot::silent(1, 16);
        {
            let mut ctx = DrawContext::new(PlatformContext::new(&audio, &meta, &themes), &mut canvas, &mut dirty);
            screen.render(&mut ctx, true).unwrap();
        }
        let full = dirty.get_and_clear();
        assert!(full.contains(&Rectangle::new(Point::zero(), size())));

        // same audio, nothing moves
        {
            let mut ctx = DrawContext::new(PlatformContext::new(&audio, &meta, &themes), &mut canvas, &mut dirty);
            screen.render(&mut ctx, false).unwrap();
        }
        assert!(dirty.is_empty());

        // only the left channel moves
        let left_only = AudioSnapshot::new(2, 0.5, 0.0, vec![0.5; 16], vec![0.0; 16]);
        {
            let mut ctx = DrawContext::new(PlatformContext::new(&left_only, &meta, &themes), &mut canvas, &mut dirty);
            screen.render(&mut ctx, false).unwrap();
        }
        let left = screen.root().find("spectrum-left").unwrap().frame().perimeter_rect();
        assert_eq!(dirty.get_and_clear(), vec![left]);
    }

    #[test]
    fn test_relayout_on_resize() {
        let mut screen = Screen::build("vu", size()).unwrap();
        screen.layout(Size::new(640, 200)).unwrap();
        let right = screen.root().find("vu-right").unwrap().frame().perimeter_rect();
        assert!(right.top_left.x + right.size.width as i32 <= 640);
        assert!(screen.check());

        let mut canvas = Canvas::new(640, 200, Rgb888::BLACK);
        let mut dirty = DirtyRegionTracker::new(Size::new(640, 200));
        let themes = ThemeBook::builtin();
        let meta = StaticMetadata::default();
        let audio = synthesize(5, 8);
        let mut ctx = DrawContext::new(PlatformContext::new(&audio, &meta, &themes), &mut canvas, &mut dirty);
        screen.render(&mut ctx, true).unwrap();
    }
}
