/*
 *  display/dirty.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dirty region tracker - per-frame invalidated rectangles and the
 *  smoothed redraw percentage
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
use crate::metrics::{Ewma, DEFAULT_ALPHA};

/// Anything that can be queued as a dirty rect
///
/// Tuples are `(x, y, width, height)` in canvas coordinates.
pub trait IntoDirtyRect {
    fn into_dirty_rect(self) -> Rectangle;
}

impl IntoDirtyRect for Rectangle {
    fn into_dirty_rect(self) -> Rectangle {
        self
    }
}

impl IntoDirtyRect for &Rectangle {
    fn into_dirty_rect(self) -> Rectangle {
        *self
    }
}

impl IntoDirtyRect for (i32, i32, u32, u32) {
    fn into_dirty_rect(self) -> Rectangle {
        Rectangle::new(Point::new(self.0, self.1), Size::new(self.2, self.3))
    }
}

/// Collects the regions that changed during one draw pass
#[derive(Debug, Clone)]
pub struct DirtyRegionTracker {
    screen: Rectangle,
    rects: Vec<Rectangle>,
    redraw: Ewma,
}

impl DirtyRegionTracker {
    pub fn new(screen: Size) -> Self {
        Self::with_alpha(screen, DEFAULT_ALPHA)
    }

    pub fn with_alpha(screen: Size, alpha: f32) -> Self {
        Self {
            screen: Rectangle::new(Point::zero(), screen),
            rects: Vec::with_capacity(32),
            redraw: Ewma::new(alpha),
        }
    }

    pub fn screen(&self) -> Rectangle {
        self.screen
    }

    /// Queue a rect, clipped to the screen; empty rects are dropped
    pub fn add(&mut self, rect: impl IntoDirtyRect) {
        let clipped = rect.into_dirty_rect().intersection(&self.screen);
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return;
        }
        self.rects.push(clipped);
    }

    pub fn add_list<I, R>(&mut self, rects: I)
    where
        I: IntoIterator<Item = R>,
        R: IntoDirtyRect,
    {
        for r in rects {
            self.add(r);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Hand over everything queued this frame
    pub fn get_and_clear(&mut self) -> Vec<Rectangle> {
        std::mem::take(&mut self.rects)
    }

    /// Hand over one bounding rect covering everything queued this frame
    pub fn get_union_and_clear(&mut self) -> Vec<Rectangle> {
        let rects = self.get_and_clear();
        bounding_union(&rects).into_iter().collect()
    }

    /// Fold the rects actually presented into the redraw average
    ///
    /// Returns this frame's percentage; overlapping rects count once.
    pub fn record_present(&mut self, presented: &[Rectangle]) -> f32 {
        let screen_area = self.screen.size.width as u64 * self.screen.size.height as u64;
        let pct = if screen_area == 0 {
            0.0
        } else {
            (union_area(presented) as f64 / screen_area as f64 * 100.0) as f32
        };
        self.redraw.update(pct);
        pct
    }

    /// Smoothed percentage of the screen redrawn per frame
    pub fn redraw_percent(&self) -> f32 {
        self.redraw.value()
    }
}

/// Smallest rect covering all of `rects`
pub fn bounding_union(rects: &[Rectangle]) -> Option<Rectangle> {
    let mut it = rects.iter().filter(|r| r.size.width > 0 && r.size.height > 0);
    let first = it.next()?;
    let (mut x0, mut y0) = (first.top_left.x, first.top_left.y);
    let mut x1 = x0 + first.size.width as i32;
    let mut y1 = y0 + first.size.height as i32;
    for r in it {
        x0 = x0.min(r.top_left.x);
        y0 = y0.min(r.top_left.y);
        x1 = x1.max(r.top_left.x + r.size.width as i32);
        y1 = y1.max(r.top_left.y + r.size.height as i32);
    }
    Some(Rectangle::with_corners(Point::new(x0, y0), Point::new(x1 - 1, y1 - 1)))
}

/// Exact area covered by `rects`, overlaps counted once
pub fn union_area(rects: &[Rectangle]) -> u64 {
    let spans: Vec<(i64, i64, i64, i64)> = rects
        .iter()
        .filter(|r| r.size.width > 0 && r.size.height > 0)
        .map(|r| {
            let (x, y) = (r.top_left.x as i64, r.top_left.y as i64);
            (x, y, x + r.size.width as i64, y + r.size.height as i64)
        })
        .collect();

    let mut xs: Vec<i64> = spans.iter().flat_map(|s| [s.0, s.2]).collect();
    xs.sort_unstable();
    xs.dedup();

    let mut area = 0u64;
    let mut cover: Vec<(i64, i64)> = Vec::with_capacity(spans.len());
    for slab in xs.windows(2) {
        let (sx0, sx1) = (slab[0], slab[1]);
        cover.clear();
        cover.extend(spans.iter().filter(|s| s.0 <= sx0 && s.2 >= sx1).map(|s| (s.1, s.3)));
        if cover.is_empty() {
            continue;
        }
        cover.sort_unstable();

        // merge y intervals across this slab
        let mut covered = 0i64;
        let (mut lo, mut hi) = cover[0];
        for &(y0, y1) in &cover[1..] {
            if y0 > hi {
                covered += hi - lo;
                lo = y0;
                hi = y1;
            } else {
                hi = hi.max(y1);
            }
        }
        covered += hi - lo;
        area += (covered * (sx1 - sx0)) as u64;
    }
    area
}
