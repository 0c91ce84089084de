/*
 *  display/components/text.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text label - one metadata field fitted to its box
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

use arrayvec::ArrayString;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_5X8, FONT_6X10, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::Drawable as _;
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::{style::TextBoxStyleBuilder, TextBox};

use crate::display::color::{ColorRole, Theme};
use crate::display::error::DisplayError;
use crate::display::frame::CoordinateFrame;
use crate::display::traits::{Drawable, MetaField, PlatformContext, Widget};
use crate::vframebuf::Canvas;

/// Longest visible text, in bytes
pub const MAX_VISIBLE: usize = 128;

const ELLIPSIS: &str = "...";

/// Candidate fonts, largest first
const FONTS: [&MonoFont<'static>; 5] = [&FONT_10X20, &FONT_9X15, &FONT_7X13, &FONT_6X10, &FONT_5X8];

fn advance(font: &MonoFont<'_>) -> u32 {
    font.character_size.width + font.character_spacing
}

/// Largest font that shows all of `text` in `area`
///
/// When nothing fits the smallest font that fits the height is used and
/// the text is cut with an ellipsis.
pub fn fit_text(text: &str, area: Size) -> (&'static MonoFont<'static>, ArrayString<MAX_VISIBLE>) {
    let chars = text.chars().count() as u32;
    let tall_enough = || FONTS.into_iter().filter(|f| f.character_size.height <= area.height);

    if text.len() <= MAX_VISIBLE {
        if let Some(font) = tall_enough().find(|f| chars * advance(f) <= area.width) {
            let mut visible = ArrayString::new();
            visible.push_str(text);
            return (font, visible);
        }
    }

    let font = tall_enough().last().unwrap_or(FONTS[FONTS.len() - 1]);
    let room = (area.width / advance(font).max(1)) as usize;
    (font, truncate(text, room))
}

fn truncate(text: &str, room: usize) -> ArrayString<MAX_VISIBLE> {
    let mut visible = ArrayString::<MAX_VISIBLE>::new();
    if room == 0 {
        return visible;
    }
    let keep = room.saturating_sub(ELLIPSIS.len());
    for c in text.chars().take(keep) {
        if visible.len() + c.len_utf8() + ELLIPSIS.len() > MAX_VISIBLE {
            break;
        }
        visible.push(c);
    }
    let tail = ELLIPSIS.len().min(room);
    visible.push_str(&ELLIPSIS[..tail]);
    visible
}

/// Centred single field of now-playing metadata
#[derive(Debug, Clone)]
pub struct TextLabel {
    field: MetaField,
    text: String,
}

impl TextLabel {
    pub fn new(field: MetaField) -> Self {
        Self { field, text: String::new() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Widget for TextLabel {
    fn kind(&self) -> &'static str {
        "text"
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }
}

impl Drawable for TextLabel {
    fn refresh(&mut self, platform: &PlatformContext<'_>) -> bool {
        let fresh = platform.metadata.text(self.field).unwrap_or("");
        if fresh == self.text {
            return false;
        }
        self.text.clear();
        self.text.push_str(fresh);
        true
    }

    fn draw(&mut self, frame: &CoordinateFrame, theme: &Theme, canvas: &mut Canvas) -> Result<(), DisplayError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let area = frame.canvas_rect();
        let (font, visible) = fit_text(&self.text, area.size);
        let character_style = MonoTextStyle::new(font, theme.color(ColorRole::Foreground));
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Middle)
            .build();
        TextBox::with_textbox_style(visible.as_str(), area, character_style, textbox_style).draw(canvas)?;
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
    use embedded_graphics::primitives::{PointsIter, Rectangle};

    #[test]
    fn test_largest_font_that_fits() {
        let (font, visible) = fit_text("Hello", Size::new(200, 30));
        assert_eq!(font.character_size, FONT_10X20.character_size);
        assert_eq!(visible.as_str(), "Hello");

        let (font, _) = fit_text("Hello", Size::new(200, 12));
        assert_eq!(font.character_size, FONT_6X10.character_size);
    }

    #[test]
    fn test_long_text_truncated() {
        let (font, visible) = fit_text("A Love Supreme Part I Acknowledgement", Size::new(50, 10));
        assert_eq!(font.character_size, FONT_5X8.character_size);
        assert_eq!(visible.chars().count(), 10);
        assert!(visible.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_refresh_tracks_field() {
        let themes = ThemeBook::builtin();
        let audio = AudioSnapshot::silent(0, 0);
        let mut label = TextLabel::new(MetaField::Title);

        let empty = StaticMetadata::new();
        assert!(!label.refresh(&PlatformContext::new(&audio, &empty, &themes)));

        let meta = StaticMetadata::new().with(MetaField::Title, "Blue in Green");
        assert!(label.refresh(&PlatformContext::new(&audio, &meta, &themes)));
        assert!(!label.refresh(&PlatformContext::new(&audio, &meta, &themes)));
        assert_eq!(label.text(), "Blue in Green");
    }

    #[test]
    fn test_draw_stays_in_box() {
        let themes = ThemeBook::builtin();
        let theme = themes.theme(DEFAULT_THEME).unwrap();
        let audio = AudioSnapshot::silent(0, 0);
        let meta = StaticMetadata::new().with(MetaField::Artist, "Miles Davis");
        let mut label = TextLabel::new(MetaField::Artist);
        label.refresh(&PlatformContext::new(&audio, &meta, &themes));

        let bounds = Rectangle::new(Point::new(20, 10), Size::new(160, 24));
        let frame = CoordinateFrame::new(bounds);
        let mut canvas = Canvas::new(200, 50, Rgb888::BLACK);
        label.draw(&frame, theme, &mut canvas).unwrap();

        let lit: Vec<Point> = canvas
            .bounds()
            .points()
            .filter(|p| canvas.pixel(*p) == Some(theme.foreground))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|p| bounds.contains(*p)));
    }
}
