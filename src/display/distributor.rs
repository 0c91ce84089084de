/*
 *  display/distributor.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Axis distributor - shares one axis of a node among its children
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

use embedded_graphics::primitives::Rectangle;
use log::trace;
use super::error::LayoutError;
use super::frame::{Axis, ScalePair};
use super::node::LayoutNode;

/// Proportional split of one axis
///
/// Ratios are either fixed up front or grow with each child from the
/// child's own scale on the controlled axis. Either way they are kept
/// normalized to sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDistributor {
    axis: Axis,
    pack: f64,
    weights: Vec<f64>,
    ratios: Vec<f64>,
    explicit: bool,
    admitted: usize,
}

impl AxisDistributor {
    /// Fixed ratios; `pack` is the share of the axis given to content
    pub fn with_ratios(axis: Axis, ratios: &[f64], pack: f64) -> Result<Self, LayoutError> {
        Self::check_pack(pack)?;
        let mut d = Self {
            axis,
            pack,
            weights: ratios.to_vec(),
            ratios: Vec::new(),
            explicit: true,
            admitted: 0,
        };
        d.normalize()?;
        Ok(d)
    }

    /// Ratios inferred from the children as they are added
    pub fn inferred(axis: Axis, pack: f64) -> Result<Self, LayoutError> {
        Self::check_pack(pack)?;
        Ok(Self {
            axis,
            pack,
            weights: Vec::new(),
            ratios: Vec::new(),
            explicit: false,
            admitted: 0,
        })
    }

    /// Children laid side by side along x
    pub fn columns(ratios: &[f64]) -> Result<Self, LayoutError> {
        Self::with_ratios(Axis::X, ratios, 1.0)
    }

    /// Children stacked along y
    pub fn rows(ratios: &[f64]) -> Result<Self, LayoutError> {
        Self::with_ratios(Axis::Y, ratios, 1.0)
    }

    fn check_pack(pack: f64) -> Result<(), LayoutError> {
        if !pack.is_finite() || pack <= 0.0 || pack > 1.0 {
            return Err(LayoutError::config(format!("pack {} outside (0,1]", pack)));
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<(), LayoutError> {
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(LayoutError::config(format!("bad ratio in {:?}", self.weights)));
        }
        let sum: f64 = self.weights.iter().sum();
        if sum <= 0.0 {
            return Err(LayoutError::config(format!("ratio sum {} must be positive", sum)));
        }
        self.ratios = self.weights.iter().map(|w| w / sum).collect();
        Ok(())
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn pack(&self) -> f64 {
        self.pack
    }

    /// Normalized ratios, one per slot
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Account for one more child with the given preferred scale
    pub fn admit(&mut self, preferred: ScalePair) -> Result<(), LayoutError> {
        if self.explicit {
            if self.admitted >= self.ratios.len() {
                return Err(LayoutError::config(format!(
                    "child {} added to a distributor with {} ratios", self.admitted + 1, self.ratios.len()
                )));
            }
        } else {
            self.weights.push(preferred.on(self.axis));
            if let Err(e) = self.normalize() {
                self.weights.pop();
                return Err(e);
            }
        }
        self.admitted += 1;
        Ok(())
    }

    /// Undo the last `admit`
    pub(crate) fn retract(&mut self) {
        self.admitted = self.admitted.saturating_sub(1);
        if !self.explicit {
            self.weights.pop();
            if self.normalize().is_err() {
                self.ratios.clear();
            }
        }
    }

    /// Place `children` one after another along the axis of `bounds`
    ///
    /// Gaps sit before, between and after the slots. A child that comes out
    /// smaller than its slot (square, fixed aspect) still consumes the whole
    /// slot, so later siblings keep their positions.
    pub fn arrange(&self, bounds: Rectangle, children: &mut [LayoutNode]) -> Result<(), LayoutError> {
        let len = match self.axis {
            Axis::X => bounds.size.width,
            Axis::Y => bounds.size.height,
        } as f64;
        if len <= 0.0 {
            return Err(LayoutError::geometry("distributor has an empty axis"));
        }

        let slots = self.ratios.len();
        let gap = len * (1.0 - self.pack) / (slots + 1) as f64;
        let mut offset = gap;
        for (child, ratio) in children.iter_mut().zip(&self.ratios) {
            let share = self.pack * ratio;
            let scalers = child.options().scalers.with(self.axis, share);
            let align = child.options().align.packed(self.axis);
            child.update_geometry(bounds, scalers, align, (offset / len).clamp(0.0, 1.0))?;

            let allocated = share * len;
            let realized = child.frame().size_on(self.axis) as f64;
            trace!("{}: offset {:.1} allocated {:.1} realized {}", child.name(), offset, allocated, realized);
            offset += gap + realized + (allocated - realized).max(0.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::node::NodeOptions;
    use embedded_graphics::prelude::*;

    fn placed(screen: Size, d: AxisDistributor, children: Vec<LayoutNode>) -> LayoutNode {
        let mut root = LayoutNode::root("root", screen, NodeOptions::new()).unwrap();
        let mut row = LayoutNode::distributor("row", NodeOptions::new(), d);
        for c in children {
            row.add_child(c).unwrap();
        }
        root.add_child(row).unwrap();
        root
    }

    fn spans(root: &LayoutNode, names: &[&str]) -> Vec<(i32, u32)> {
        names
            .iter()
            .map(|n| {
                let r = root.find(n).unwrap().frame().perimeter_rect();
                (r.top_left.x, r.size.width)
            })
            .collect()
    }

    fn plain(name: &str) -> LayoutNode {
        LayoutNode::new(name, NodeOptions::new())
    }

    #[test]
    fn test_equal_thirds() {
        let d = AxisDistributor::columns(&[1.0, 1.0, 1.0]).unwrap();
        let root = placed(Size::new(1200, 300), d, vec![plain("a"), plain("b"), plain("c")]);
        assert_eq!(spans(&root, &["a", "b", "c"]), vec![(0, 400), (400, 400), (800, 400)]);
        assert!(root.check());
    }

    #[test]
    fn test_quarter_quarter_half() {
        let d = AxisDistributor::columns(&[0.25, 0.25, 0.5]).unwrap();
        let root = placed(Size::new(1280, 400), d, vec![plain("a"), plain("b"), plain("c")]);
        assert_eq!(spans(&root, &["a", "b", "c"]), vec![(0, 320), (320, 320), (640, 640)]);
    }

    #[test]
    fn test_pack_leaves_even_gaps() {
        let d = AxisDistributor::with_ratios(Axis::X, &[1.0, 1.0], 0.8).unwrap();
        let root = placed(Size::new(1000, 100), d, vec![plain("a"), plain("b")]);
        // 200 of gap split three ways
        let s = spans(&root, &["a", "b"]);
        assert_eq!(s[0].1, 400);
        assert_eq!(s[1].1, 400);
        assert_eq!(s[0].0, 67);
        assert_eq!(s[1].0, 533);
    }

    #[test]
    fn test_rows_stack_from_top() {
        let d = AxisDistributor::rows(&[1.0, 3.0]).unwrap();
        let root = placed(Size::new(200, 400), d, vec![plain("top"), plain("bottom")]);
        let top = root.find("top").unwrap().frame().perimeter_rect();
        let bottom = root.find("bottom").unwrap().frame().perimeter_rect();
        assert_eq!(top, Rectangle::new(Point::zero(), Size::new(200, 100)));
        assert_eq!(bottom, Rectangle::new(Point::new(0, 100), Size::new(200, 300)));
    }

    #[test]
    fn test_square_child_does_not_pull_siblings() {
        let d = AxisDistributor::columns(&[1.0, 1.0, 1.0]).unwrap();
        let square = LayoutNode::new("sq", NodeOptions::new().square(true));
        let root = placed(Size::new(1200, 100), d, vec![plain("a"), square, plain("c")]);
        let s = spans(&root, &["a", "sq", "c"]);
        assert_eq!(s[1], (400, 100));
        assert_eq!(s[2], (800, 400));
    }

    #[test]
    fn test_inferred_ratios_follow_children() {
        let d = AxisDistributor::inferred(Axis::X, 1.0).unwrap();
        let root = placed(
            Size::new(900, 100),
            d,
            vec![
                LayoutNode::new("a", NodeOptions::new().scalers(0.2, 1.0)),
                LayoutNode::new("b", NodeOptions::new().scalers(0.4, 1.0)),
            ],
        );
        assert_eq!(spans(&root, &["a", "b"]), vec![(0, 300), (300, 600)]);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(AxisDistributor::columns(&[0.0, 0.0]), Err(LayoutError::LayoutConfig(_))));
        assert!(matches!(AxisDistributor::columns(&[1.0, -1.0]), Err(LayoutError::LayoutConfig(_))));
        assert!(matches!(AxisDistributor::with_ratios(Axis::X, &[1.0], 0.0), Err(LayoutError::LayoutConfig(_))));

        let d = AxisDistributor::columns(&[1.0]).unwrap();
        let mut row = LayoutNode::distributor("row", NodeOptions::new(), d);
        row.add_child(plain("a")).unwrap();
        assert!(matches!(row.add_child(plain("b")), Err(LayoutError::LayoutConfig(_))));
    }

    #[test]
    fn test_relayout_is_stable() {
        let d = AxisDistributor::with_ratios(Axis::X, &[0.3, 0.3, 0.4], 0.9).unwrap();
        let mut root = placed(Size::new(1280, 400), d, vec![plain("a"), plain("b"), plain("c")]);
        let before = spans(&root, &["a", "b", "c"]);
        let bounds = root.frame().bounds();
        root.relayout(bounds).unwrap();
        assert_eq!(spans(&root, &["a", "b", "c"]), before);
    }
}
