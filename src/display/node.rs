/*
 *  display/node.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layout node - ownership tree of coordinate frames, geometry
 *  propagation and the incremental draw traversal
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

use core::fmt;
use embedded_graphics::prelude::{Point, Primitive, Size};
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle, RoundedRectangle, StrokeAlignment};
use embedded_graphics::Drawable as _;
use log::{debug, warn};

use super::color::{blend, ColorRole, DEFAULT_THEME};
use super::distributor::AxisDistributor;
use super::error::{DisplayError, LayoutError};
use super::frame::{Align, CoordinateFrame, Rect, ScalePair};
use super::traits::{DrawContext, PlatformContext, Widget};

/// Outline drawn around a node, inside its perimeter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub width: u32,
    /// Index into the theme's outline colours
    pub colour_index: usize,
    /// Corner radius, 0 for square corners
    pub radius: u32,
    /// 0..1 over the theme background
    pub opacity: f32,
}

impl Outline {
    pub fn new(width: u32) -> Self {
        Self { width, colour_index: 0, radius: 0, opacity: 1.0 }
    }

    pub fn colour(mut self, index: usize) -> Self {
        self.colour_index = index;
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Construction-time options of a node
///
/// A fresh value per call site; nothing here is shared between nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOptions {
    pub scalers: ScalePair,
    pub align: Align,
    pub square: bool,
    pub outline: Option<Outline>,
    pub padding: u32,
    /// Theme name, inherited from the parent when `None`
    pub theme: Option<String>,
    /// Erase to the theme background before repainting
    pub background: bool,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            scalers: ScalePair::FULL,
            align: Align::CENTRED,
            square: false,
            outline: None,
            padding: 0,
            theme: None,
            background: true,
        }
    }
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalers(mut self, sx: f64, sy: f64) -> Self {
        self.scalers = ScalePair::new(sx, sy);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn square(mut self, square: bool) -> Self {
        self.square = square;
        self
    }

    pub fn outline(mut self, outline: Outline) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn padding(mut self, px: u32) -> Self {
        self.padding = px;
        self
    }

    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.theme = Some(name.into());
        self
    }

    /// Containers that never erase their own area
    pub fn transparent(mut self) -> Self {
        self.background = false;
        self
    }

    fn outline_width(&self) -> u32 {
        self.outline.map(|o| o.width).unwrap_or(0)
    }
}

/// How a node places its children
pub enum Arrangement {
    /// Each child scales and aligns itself against the canvas
    Free,
    /// Children share one axis proportionally
    Axis(AxisDistributor),
}

/// One node of the widget tree
pub struct LayoutNode {
    name: String,
    options: NodeOptions,
    theme: String,
    frame: CoordinateFrame,
    arrangement: Arrangement,
    widget: Option<Box<dyn Widget>>,
    children: Vec<LayoutNode>,
}

impl fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutNode")
            .field("name", &self.name)
            .field("rect", &self.frame.perimeter_rect())
            .field("widget", &self.widget.as_ref().map(|w| w.kind()))
            .field("children", &self.children)
            .finish()
    }
}

impl LayoutNode {
    /// A detached container; it is placed when added to a parent
    pub fn new(name: impl Into<String>, options: NodeOptions) -> Self {
        let mut frame = CoordinateFrame::new(Rectangle::zero());
        frame.set_square(options.square);
        frame.set_inset(options.outline_width(), options.padding);
        let theme = options.theme.clone().unwrap_or_else(|| DEFAULT_THEME.to_string());
        Self {
            name: name.into(),
            options,
            theme,
            frame,
            arrangement: Arrangement::Free,
            widget: None,
            children: Vec::new(),
        }
    }

    /// A detached node carrying a widget
    pub fn with_widget(name: impl Into<String>, options: NodeOptions, widget: impl Widget + 'static) -> Self {
        let mut node = Self::new(name, options);
        node.widget = Some(Box::new(widget));
        node
    }

    /// A detached container sharing one axis among its children
    pub fn distributor(name: impl Into<String>, options: NodeOptions, distributor: AxisDistributor) -> Self {
        let mut node = Self::new(name, options);
        node.arrangement = Arrangement::Axis(distributor);
        node
    }

    /// The root, laid out against the whole logical screen
    pub fn root(name: impl Into<String>, screen: Size, options: NodeOptions) -> Result<Self, LayoutError> {
        let mut node = Self::new(name, options);
        node.relayout(Rectangle::new(Point::zero(), screen))?;
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    /// Resolved theme name
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn children(&self) -> &[LayoutNode] {
        &self.children
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn widget_kind(&self) -> Option<&'static str> {
        self.widget.as_ref().map(|w| w.kind())
    }

    /// Depth-first search by name, self included
    pub fn find(&self, name: &str) -> Option<&LayoutNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn is_placed(&self) -> bool {
        let size = self.frame.bounds().size;
        size.width > 0 && size.height > 0
    }

    /// Append a child; order is draw order
    ///
    /// A placed node lays its children out again at once, so a distributor
    /// re-shares its axis with the newcomer. A child that fails that layout
    /// is not kept.
    pub fn add_child(&mut self, mut child: LayoutNode) -> Result<(), LayoutError> {
        if child.options.theme.is_none() {
            child.inherit_theme(&self.theme);
        }
        if let Arrangement::Axis(distributor) = &mut self.arrangement {
            distributor.admit(child.options.scalers)?;
        }
        debug!("{}: adding child '{}'", self.name, child.name);
        self.children.push(child);
        if self.is_placed() {
            if let Err(e) = self.layout_children() {
                warn!("{}: dropping child that failed layout: {}", self.name, e);
                self.children.pop();
                if let Arrangement::Axis(distributor) = &mut self.arrangement {
                    distributor.retract();
                }
                self.layout_children()?;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Builder form of `add_child`
    pub fn with_child(mut self, child: LayoutNode) -> Result<Self, LayoutError> {
        self.add_child(child)?;
        Ok(self)
    }

    fn inherit_theme(&mut self, theme: &str) {
        self.theme = theme.to_string();
        for child in self.children.iter_mut().filter(|c| c.options.theme.is_none()) {
            child.inherit_theme(theme);
        }
    }

    /// Re-anchor against new bounds, then lay out the subtree
    ///
    /// Everything is derived from the arguments and the bounds, so calling
    /// this twice with the same inputs leaves the same geometry.
    pub fn update_geometry(
        &mut self,
        bounds: Rectangle,
        scalers: ScalePair,
        align: Align,
        offset: f64,
    ) -> Result<(), LayoutError> {
        let previous = self.is_placed().then(|| self.frame.rect());
        self.frame.set_bounds(bounds);
        if let Err(e) = self.frame.scale(scalers) {
            warn!("{}: {}, keeping previous size", self.name, e);
            let size = bounds.size;
            let whole = Rect::new(0, 0, size.width as i32 - 1, size.height as i32 - 1);
            self.frame.fall_back_to(previous.unwrap_or(whole));
        }
        self.frame.align(align, offset)?;
        self.layout_children()?;
        if let Some(configurable) = self.widget.as_mut().and_then(|w| w.as_configurable()) {
            configurable.configure(&mut self.frame)?;
        }
        Ok(())
    }

    /// `update_geometry` with the node's own scalers and anchors
    pub fn relayout(&mut self, bounds: Rectangle) -> Result<(), LayoutError> {
        let (scalers, align) = (self.options.scalers, self.options.align);
        self.update_geometry(bounds, scalers, align, 0.0)
    }

    fn layout_children(&mut self) -> Result<(), LayoutError> {
        let canvas = self.frame.canvas_rect();
        match &self.arrangement {
            Arrangement::Free => {
                for child in self.children.iter_mut() {
                    child.relayout(canvas)?;
                }
                Ok(())
            }
            Arrangement::Axis(distributor) => distributor.arrange(canvas, &mut self.children),
        }
    }

    /// Ask the widget for fresh data; containers never have any
    fn poll(&mut self, platform: &PlatformContext<'_>) -> bool {
        self.widget
            .as_mut()
            .and_then(|w| w.as_drawable())
            .map(|d| d.refresh(platform))
            .unwrap_or(false)
    }

    /// Draw pass over the children
    ///
    /// `full` repaints this node and everything below it. Children with
    /// fresh data are erased, redrawn and outlined, and their perimeter is
    /// queued as dirty. Returns whether this node itself repainted.
    pub fn update_screen(&mut self, ctx: &mut DrawContext<'_>, full: bool) -> Result<bool, DisplayError> {
        if full {
            self.draw_widget(ctx)?;
        }
        for child in self.children.iter_mut() {
            let fresh = child.poll(&ctx.platform);
            let repaint = full || fresh;
            if repaint {
                child.draw_background(ctx)?;
            }
            if child.update_screen(ctx, repaint)? {
                ctx.dirty.add(child.frame.perimeter_rect());
            }
            if repaint {
                child.draw_outline(ctx)?;
            }
        }
        Ok(full)
    }

    /// Background and outline of this node, used for the root
    pub fn paint_frame(&self, ctx: &mut DrawContext<'_>) -> Result<(), DisplayError> {
        self.draw_background(ctx)?;
        self.draw_outline(ctx)
    }

    fn draw_widget(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), DisplayError> {
        let theme = ctx.platform.theme(&self.theme)?;
        if let Some(drawable) = self.widget.as_mut().and_then(|w| w.as_drawable()) {
            drawable.draw(&self.frame, theme, &mut *ctx.canvas)?;
        }
        Ok(())
    }

    fn draw_background(&self, ctx: &mut DrawContext<'_>) -> Result<(), DisplayError> {
        if !self.options.background {
            return Ok(());
        }
        let theme = ctx.platform.theme(&self.theme)?;
        ctx.canvas.fill(&self.frame.perimeter_rect(), theme.background);
        Ok(())
    }

    fn draw_outline(&self, ctx: &mut DrawContext<'_>) -> Result<(), DisplayError> {
        let Some(outline) = self.options.outline.filter(|o| o.width > 0) else {
            return Ok(());
        };
        let theme = ctx.platform.theme(&self.theme)?;
        let colour = blend(theme.color(ColorRole::Outline(outline.colour_index)), theme.background, outline.opacity);
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(colour)
            .stroke_width(outline.width)
            .stroke_alignment(StrokeAlignment::Center)
            .build();
        let path = self.frame.outline_rect();
        if outline.radius > 0 {
            RoundedRectangle::with_equal_corners(path, Size::new(outline.radius, outline.radius))
                .into_styled(style)
                .draw(&mut *ctx.canvas)?;
        } else {
            path.into_styled(style).draw(&mut *ctx.canvas)?;
        }
        Ok(())
    }

    /// Sibling overlaps anywhere in the subtree
    pub fn overlaps(&self) -> Vec<LayoutError> {
        let mut found = Vec::new();
        for (i, first) in self.children.iter().enumerate() {
            for second in &self.children[i + 1..] {
                if first.frame.intersects(&second.frame) {
                    found.push(LayoutError::StructuralOverlap {
                        first: first.name.clone(),
                        second: second.name.clone(),
                    });
                }
            }
        }
        for child in &self.children {
            found.extend(child.overlaps());
        }
        found
    }

    /// Advisory structural check; overlaps are logged, never fatal
    pub fn check(&self) -> bool {
        let overlaps = self.overlaps();
        for overlap in &overlaps {
            warn!("{}: {}", self.name, overlap);
        }
        overlaps.is_empty()
    }
}
