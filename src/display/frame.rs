/*
 *  display/frame.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Coordinate frame - per-node rectangle state, scale/align/inset math
 *  and radial angle calibration
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

use core::str::FromStr;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use super::error::LayoutError;

/// Number of values sampled across the endstop range by `anglescale`
pub const ANGLE_SAMPLES: usize = 100;

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal, a "column" distributor
    X,
    /// Vertical, a "row" distributor
    Y,
}

/// A node's own rectangle relative to its bounds
///
/// Corners are inclusive. The origin is the bottom-left pixel of the bounds
/// and `y` grows upward, so `d` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub d: i32,
}

impl Rect {
    pub const fn new(a: i32, b: i32, c: i32, d: i32) -> Self {
        Self { a, b, c, d }
    }

    pub fn width(&self) -> i32 {
        self.c - self.a + 1
    }

    pub fn height(&self) -> i32 {
        self.d - self.b + 1
    }

    /// Both axes overlap (touching inclusive edges counts)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.c >= other.a && other.c >= self.a && self.d >= other.b && other.d >= self.b
    }
}

/// Fraction of the bounds a node occupies on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePair {
    pub sx: f64,
    pub sy: f64,
}

impl ScalePair {
    pub const FULL: ScalePair = ScalePair { sx: 1.0, sy: 1.0 };

    pub const fn new(sx: f64, sy: f64) -> Self {
        Self { sx, sy }
    }

    /// Scale factor on one axis
    pub fn on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.sx,
            Axis::Y => self.sy,
        }
    }

    /// Copy with one axis replaced
    pub fn with(&self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => Self { sx: value, sy: self.sy },
            Axis::Y => Self { sx: self.sx, sy: value },
        }
    }
}

impl Default for ScalePair {
    fn default() -> Self {
        Self::FULL
    }
}

/// Horizontal anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Centre,
    Right,
    /// Sequential packing at an offset fraction from the left
    Col,
}

/// Vertical anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
    /// Sequential packing at an offset fraction from the top
    Row,
}

impl FromStr for HAlign {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HAlign::Left),
            "centre" | "center" => Ok(HAlign::Centre),
            "right" => Ok(HAlign::Right),
            "col" => Ok(HAlign::Col),
            other => Err(LayoutError::config(format!("unknown horizontal anchor '{}'", other))),
        }
    }
}

impl FromStr for VAlign {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VAlign::Top),
            "middle" => Ok(VAlign::Middle),
            "bottom" => Ok(VAlign::Bottom),
            "row" => Ok(VAlign::Row),
            other => Err(LayoutError::config(format!("unknown vertical anchor '{}'", other))),
        }
    }
}

/// Anchor pair used by `align`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Align {
    pub h: HAlign,
    pub v: VAlign,
}

impl Align {
    pub const CENTRED: Align = Align { h: HAlign::Centre, v: VAlign::Middle };
    pub const TOP_LEFT: Align = Align { h: HAlign::Left, v: VAlign::Top };

    pub const fn new(h: HAlign, v: VAlign) -> Self {
        Self { h, v }
    }

    /// Parse from anchor literals, e.g. `("centre", "middle")`
    pub fn parse(h: &str, v: &str) -> Result<Self, LayoutError> {
        Ok(Self { h: h.parse()?, v: v.parse()? })
    }

    /// Replace the anchor on `axis` with its packing variant (col/row)
    pub fn packed(&self, axis: Axis) -> Self {
        match axis {
            Axis::X => Self { h: HAlign::Col, v: self.v },
            Axis::Y => Self { h: self.h, v: VAlign::Row },
        }
    }
}

impl Default for Align {
    fn default() -> Self {
        Self::CENTRED
    }
}

/// Value-to-angle calibration for radial widgets
///
/// Angles are degrees, 0 is straight up and positive is clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleCalibration {
    pub endstops: [f32; 2],
    pub centre_offset: f32,
    pub radius: f32,
    /// Fraction of the requested range trimmed from the start
    pub min_offset: f32,
    /// Fraction of the requested range that stays inside the frame
    pub circle_scale: f32,
}

impl AngleCalibration {
    /// Angle for `value` in 0..1, restricted to the calibrated range
    pub fn angle_for(&self, value: f32) -> f32 {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        let span = self.endstops[1] - self.endstops[0];
        self.endstops[0] + span * (self.min_offset + value * self.circle_scale)
    }
}

/// Per-node rectangle state
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateFrame {
    bounds: Rectangle,
    rect: Rect,
    square: bool,
    outline_width: u32,
    padding: u32,
    realized: ScalePair,
    calibration: Option<AngleCalibration>,
}

impl CoordinateFrame {
    /// A frame filling `bounds`
    pub fn new(bounds: Rectangle) -> Self {
        let w = (bounds.size.width as i32).max(1);
        let h = (bounds.size.height as i32).max(1);
        Self {
            bounds,
            rect: Rect::new(0, 0, w - 1, h - 1),
            square: false,
            outline_width: 0,
            padding: 0,
            realized: ScalePair::FULL,
            calibration: None,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Replace the bounds; the rect is left for the next scale/align
    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Store a rect directly, rejecting anything `validate` would
    pub fn set_rect(&mut self, rect: Rect) -> Result<(), LayoutError> {
        Self::check_rect(&rect, self.bounds_width(), self.bounds_height())?;
        self.rect = rect;
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    /// Realized size along `axis`
    pub fn size_on(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.width(),
            Axis::Y => self.height(),
        }
    }

    pub fn bounds_width(&self) -> i32 {
        self.bounds.size.width as i32
    }

    pub fn bounds_height(&self) -> i32 {
        self.bounds.size.height as i32
    }

    pub fn set_square(&mut self, square: bool) {
        self.square = square;
    }

    pub fn is_square(&self) -> bool {
        self.square
    }

    /// Outline width and padding, applied symmetrically to get the canvas
    pub fn set_inset(&mut self, outline_width: u32, padding: u32) {
        self.outline_width = outline_width;
        self.padding = padding;
    }

    pub fn inset(&self) -> u32 {
        self.outline_width + self.padding
    }

    /// Scale factors actually realized, after square compensation
    pub fn realized_scale(&self) -> ScalePair {
        self.realized
    }

    pub fn calibration(&self) -> Option<&AngleCalibration> {
        self.calibration.as_ref()
    }

    /// Size the rect to `w` x `h` at the bounds origin
    pub fn resize(&mut self, w: i32, h: i32) -> Result<(), LayoutError> {
        if w <= 0 || h <= 0 {
            return Err(LayoutError::geometry(format!("resize to {}x{}", w, h)));
        }
        let (bw, bh) = (self.bounds_width(), self.bounds_height());
        if w > bw || h > bh {
            return Err(LayoutError::geometry(format!(
                "resize to {}x{} exceeds bounds {}x{}", w, h, bw, bh
            )));
        }
        let (w, h) = if self.square {
            let side = w.min(h);
            (side, side)
        } else {
            (w, h)
        };
        self.rect = Rect::new(0, 0, w - 1, h - 1);
        self.realized = ScalePair::new(w as f64 / bw as f64, h as f64 / bh as f64);
        Ok(())
    }

    /// Size the rect to a fraction of the bounds
    pub fn scale(&mut self, scalers: ScalePair) -> Result<(), LayoutError> {
        for s in [scalers.sx, scalers.sy] {
            if !s.is_finite() || s <= 0.0 || s > 1.0 {
                return Err(LayoutError::geometry(format!("scale factor {} outside (0,1]", s)));
            }
        }
        let w = (self.bounds_width() as f64 * scalers.sx).round() as i32;
        let h = (self.bounds_height() as f64 * scalers.sy).round() as i32;
        self.resize(w, h)
    }

    /// Keep the size of `previous`, clamped into the current bounds
    pub fn fall_back_to(&mut self, previous: Rect) {
        let w = previous.width().min(self.bounds_width()).max(1);
        let h = previous.height().min(self.bounds_height()).max(1);
        self.rect = Rect::new(0, 0, w - 1, h - 1);
        self.realized = ScalePair::new(
            w as f64 / self.bounds_width().max(1) as f64,
            h as f64 / self.bounds_height().max(1) as f64,
        );
    }

    /// Move the rect against the bounds
    ///
    /// `offset` is only read by the col/row anchors: the fraction of the
    /// bounds axis from the left (col) or from the top (row).
    pub fn align(&mut self, align: Align, offset: f64) -> Result<(), LayoutError> {
        let (w, h) = (self.width(), self.height());
        let (bw, bh) = (self.bounds_width(), self.bounds_height());
        if matches!(align.h, HAlign::Col) || matches!(align.v, VAlign::Row) {
            if !offset.is_finite() || !(0.0..=1.0).contains(&offset) {
                return Err(LayoutError::geometry(format!("packing offset {} outside [0,1]", offset)));
            }
        }

        let a = match align.h {
            HAlign::Left => 0,
            HAlign::Right => bw - w,
            HAlign::Centre => (bw - w) / 2,
            HAlign::Col => ((offset * bw as f64).round() as i32).min(bw - w),
        };
        let b = match align.v {
            VAlign::Bottom => 0,
            VAlign::Top => bh - h,
            VAlign::Middle => (bh - h) / 2,
            VAlign::Row => {
                let from_top = (offset * bh as f64).round() as i32;
                (bh - from_top - h).max(0)
            }
        };

        let rect = Rect::new(a, b, a + w - 1, b + h - 1);
        Self::check_rect(&rect, bw, bh)?;
        self.rect = rect;
        Ok(())
    }

    /// Structural check of the current rect
    pub fn validate(&self) -> Result<(), LayoutError> {
        Self::check_rect(&self.rect, self.bounds_width(), self.bounds_height())
    }

    fn check_rect(rect: &Rect, bw: i32, bh: i32) -> Result<(), LayoutError> {
        if rect.c < rect.a || rect.d < rect.b {
            return Err(LayoutError::geometry(format!("inverted rect {:?}", rect)));
        }
        if rect.a < 0 || rect.b < 0 || rect.c >= bw || rect.d >= bh {
            return Err(LayoutError::geometry(format!(
                "rect {:?} outside bounds {}x{}", rect, bw, bh
            )));
        }
        Ok(())
    }

    /// Siblings share bounds, so rects compare directly
    pub fn intersects(&self, other: &CoordinateFrame) -> bool {
        self.rect.intersects(&other.rect)
    }

    /// The node's own rect in absolute canvas coordinates
    pub fn perimeter_rect(&self) -> Rectangle {
        let bh = self.bounds_height();
        let top = self.bounds.top_left.y + (bh - 1 - self.rect.d);
        Rectangle::new(
            Point::new(self.bounds.top_left.x + self.rect.a, top),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }

    /// Centre line of the outline stroke
    pub fn outline_rect(&self) -> Rectangle {
        self.inset_rect(self.outline_width / 2)
    }

    /// Area inside the outline
    pub fn background_rect(&self) -> Rectangle {
        self.inset_rect(self.outline_width)
    }

    /// Area available to children, their bounds
    pub fn canvas_rect(&self) -> Rectangle {
        self.inset_rect(self.inset())
    }

    fn inset_rect(&self, by: u32) -> Rectangle {
        let outer = self.perimeter_rect();
        let by = by as i32;
        let w = outer.size.width as i32 - 2 * by;
        let h = outer.size.height as i32 - 2 * by;
        if w <= 0 || h <= 0 {
            return Rectangle::new(outer.center(), Size::new(1, 1));
        }
        Rectangle::new(outer.top_left + Point::new(by, by), Size::new(w as u32, h as u32))
    }

    /// Map a rect-local point (bottom-left origin, y up) to the canvas
    pub fn absolute(&self, local: Point) -> Point {
        let bh = self.bounds_height();
        Point::new(
            self.bounds.top_left.x + self.rect.a + local.x,
            self.bounds.top_left.y + (bh - 1) - (self.rect.b + local.y),
        )
    }

    /// Calibrate the value-to-angle mapping so every projected point stays
    /// between the left and right edges of the rect.
    ///
    /// The pivot sits on the horizontal centre, `centre_offset` above the
    /// bottom edge. Samples outside the rect pull in the endstop on their
    /// side of the range.
    pub fn anglescale(
        &mut self,
        radius: f32,
        endstops: [f32; 2],
        centre_offset: f32,
    ) -> Result<AngleCalibration, LayoutError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(LayoutError::geometry(format!("radius {}", radius)));
        }
        let span = endstops[1] - endstops[0];
        if !span.is_finite() || span == 0.0 {
            return Err(LayoutError::geometry(format!("empty endstop range {:?}", endstops)));
        }

        let x1 = (self.width() - 1) as f32;
        let cx = x1 / 2.0;
        let last = ANGLE_SAMPLES - 1;
        let t = |i: usize| i as f32 / last as f32;

        let mut lo = 0usize;
        let mut hi = last as isize;
        for i in 0..ANGLE_SAMPLES {
            let theta = (endstops[0] + span * t(i)).to_radians();
            let x = cx + radius * theta.sin();
            if x < 0.0 || x > x1 {
                if i < ANGLE_SAMPLES / 2 {
                    lo = lo.max(i + 1);
                } else {
                    hi = hi.min(i as isize - 1);
                }
            }
        }
        if hi < lo as isize {
            return Err(LayoutError::geometry(format!(
                "no part of {:?} at radius {} fits a {} wide frame", endstops, radius, self.width()
            )));
        }

        let calibration = AngleCalibration {
            endstops,
            centre_offset,
            radius,
            min_offset: t(lo),
            circle_scale: t(hi as usize) - t(lo),
        };
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Absolute position of the angle pivot
    pub fn angle_pivot(&self) -> Result<Point, LayoutError> {
        let cal = self.require_calibration()?;
        let cx = (self.width() - 1) as f32 / 2.0;
        Ok(self.absolute(Point::new(cx.round() as i32, cal.centre_offset.round() as i32)))
    }

    /// Absolute point on the calibrated arc for `value` in 0..1
    pub fn anglexy(&self, value: f32) -> Result<Point, LayoutError> {
        let cal = self.require_calibration()?;
        let x1 = (self.width() - 1) as f32;
        let theta = cal.angle_for(value).to_radians();
        let x = (x1 / 2.0 + cal.radius * theta.sin()).round().clamp(0.0, x1);
        let y = cal.centre_offset + cal.radius * theta.cos();
        Ok(self.absolute(Point::new(x as i32, y.round() as i32)))
    }

    fn require_calibration(&self) -> Result<&AngleCalibration, LayoutError> {
        self.calibration
            .as_ref()
            .ok_or_else(|| LayoutError::geometry("frame has no angle calibration"))
    }
}
