/*
 *  display/color.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Theme palettes - immutable colour sets looked up by name
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
use super::traits::Palette;

/// Name of the theme used when a node names none
pub const DEFAULT_THEME: &str = "default";

/// Colour roles a theme provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Background,
    Foreground,
    Accent,
    /// Peak/overload colour for meters
    Peak,
    /// Outline colour by index
    Outline(usize),
}

/// One named palette
///
/// Built once and shared read-only; nothing mutates a theme after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub background: Rgb888,
    pub foreground: Rgb888,
    pub accent: Rgb888,
    pub peak: Rgb888,
    pub outlines: Vec<Rgb888>,
}

impl Theme {
    pub fn color(&self, role: ColorRole) -> Rgb888 {
        match role {
            ColorRole::Background => self.background,
            ColorRole::Foreground => self.foreground,
            ColorRole::Accent => self.accent,
            ColorRole::Peak => self.peak,
            ColorRole::Outline(i) => {
                if self.outlines.is_empty() {
                    self.foreground
                } else {
                    self.outlines[i % self.outlines.len()]
                }
            }
        }
    }
}

/// Mix `fg` over `bg`; `opacity` 1.0 is solid `fg`
pub fn blend(fg: Rgb888, bg: Rgb888, opacity: f32) -> Rgb888 {
    let a = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    let mix = |f: u8, b: u8| (f as f32 * a + b as f32 * (1.0 - a)).round() as u8;
    Rgb888::new(mix(fg.r(), bg.r()), mix(fg.g(), bg.g()), mix(fg.b(), bg.b()))
}

/// The built-in theme table
#[derive(Debug, Clone)]
pub struct ThemeBook {
    themes: Vec<Theme>,
}

impl ThemeBook {
    pub fn new(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Theme {
                name: DEFAULT_THEME.to_string(),
                background: Rgb888::new(8, 8, 12),
                foreground: Rgb888::new(230, 230, 230),
                accent: Rgb888::new(40, 200, 120),
                peak: Rgb888::new(230, 40, 40),
                outlines: vec![Rgb888::new(90, 90, 110), Rgb888::new(40, 200, 120)],
            },
            Theme {
                name: "amber".to_string(),
                background: Rgb888::new(12, 6, 0),
                foreground: Rgb888::new(255, 176, 0),
                accent: Rgb888::new(255, 120, 0),
                peak: Rgb888::new(255, 40, 0),
                outlines: vec![Rgb888::new(120, 70, 0)],
            },
            Theme {
                name: "mono".to_string(),
                background: Rgb888::BLACK,
                foreground: Rgb888::WHITE,
                accent: Rgb888::WHITE,
                peak: Rgb888::WHITE,
                outlines: vec![Rgb888::new(128, 128, 128)],
            },
        ])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name.as_str())
    }
}

impl Palette for ThemeBook {
    fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let book = ThemeBook::builtin();
        assert!(book.theme(DEFAULT_THEME).is_some());
        assert!(book.theme("amber").is_some());
        assert!(book.theme("neon").is_none());
        assert_eq!(book.names().count(), 3);
    }

    #[test]
    fn test_outline_index_wraps() {
        let book = ThemeBook::builtin();
        let t = book.theme(DEFAULT_THEME).unwrap();
        assert_eq!(t.color(ColorRole::Outline(0)), t.color(ColorRole::Outline(2)));
        assert_ne!(t.color(ColorRole::Outline(0)), t.color(ColorRole::Outline(1)));
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(Rgb888::WHITE, Rgb888::BLACK, 1.0), Rgb888::WHITE);
        assert_eq!(blend(Rgb888::WHITE, Rgb888::BLACK, 0.0), Rgb888::BLACK);
        assert_eq!(blend(Rgb888::WHITE, Rgb888::BLACK, 0.5), Rgb888::new(128, 128, 128));
    }
}
