/*
 *  tests/display_integration.rs
 *
 *  Integration tests for the layout and presentation engine
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 */

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use vuscape::audio::AudioSnapshot;
use vuscape::display::{
    Align, AxisDistributor, Channel, CoordinateFrame, DirtyRegionTracker, DisplayError, DrawContext, HAlign,
    LayoutError, LayoutNode, MetaField, NodeOptions, Outline, PlatformContext, PresentationRotator,
    RecordingSurface, Rotation, ScalePair, Screen, ThemeBook, VAlign,
};
use vuscape::display::components::{SpectrumBars, TextLabel};
use vuscape::metadata::StaticMetadata;
use vuscape::vframebuf::Canvas;

fn logical() -> Size {
    Size::new(1280, 400)
}

#[test]
fn test_scale_then_align_stays_in_bounds() {
    let bounds = Rectangle::new(Point::new(17, 3), Size::new(333, 101));
    let anchors = [
        Align::new(HAlign::Left, VAlign::Top),
        Align::new(HAlign::Centre, VAlign::Middle),
        Align::new(HAlign::Right, VAlign::Bottom),
    ];
    for sx in [0.01, 0.33, 0.5, 0.999, 1.0] {
        for sy in [0.02, 0.25, 0.7, 1.0] {
            for align in anchors {
                let mut f = CoordinateFrame::new(bounds);
                f.scale(ScalePair::new(sx, sy)).unwrap();
                f.align(align, 0.0).unwrap();
                f.validate().unwrap();
                let r = f.perimeter_rect();
                assert_eq!(r.intersection(&bounds), r, "{} {} {:?}", sx, sy, align);
            }
        }
    }
}

#[test]
fn test_centred_child_scenario() {
    let mut root = LayoutNode::root("root", Size::new(1000, 500), NodeOptions::new()).unwrap();
    root.add_child(LayoutNode::new("child", NodeOptions::new().scalers(0.5, 0.5).align(Align::CENTRED)))
        .unwrap();
    let child = root.find("child").unwrap().frame().perimeter_rect();
    assert_eq!(child, Rectangle::new(Point::new(250, 125), Size::new(500, 250)));
}

#[test]
fn test_distributor_shares_axis() {
    let row = LayoutNode::distributor("row", NodeOptions::new(), AxisDistributor::columns(&[0.25, 0.25, 0.5]).unwrap())
        .with_child(LayoutNode::new("a", NodeOptions::new())).unwrap()
        .with_child(LayoutNode::new("b", NodeOptions::new())).unwrap()
        .with_child(LayoutNode::new("c", NodeOptions::new())).unwrap();
    let mut root = LayoutNode::root("root", logical(), NodeOptions::new()).unwrap();
    root.add_child(row).unwrap();

    let spans: Vec<(i32, u32)> = ["a", "b", "c"]
        .iter()
        .map(|n| {
            let r = root.find(n).unwrap().frame().perimeter_rect();
            (r.top_left.x, r.size.width)
        })
        .collect();
    assert_eq!(spans, vec![(0, 320), (320, 320), (640, 640)]);
    assert!(root.check());
}

#[test]
fn test_too_many_children() {
    let mut row = LayoutNode::distributor("row", NodeOptions::new(), AxisDistributor::columns(&[1.0, 1.0]).unwrap());
    row.add_child(LayoutNode::new("a", NodeOptions::new())).unwrap();
    row.add_child(LayoutNode::new("b", NodeOptions::new())).unwrap();
    let err = row.add_child(LayoutNode::new("c", NodeOptions::new())).unwrap_err();
    assert!(matches!(err, LayoutError::LayoutConfig(_)));
}

#[test]
fn test_full_canvas_rotates_to_full_panel() {
    let rot = PresentationRotator::new(logical(), Rotation::Rotate90);
    let full = Rectangle::new(Point::zero(), logical());
    assert_eq!(rot.transform_rect(&full), Rectangle::new(Point::zero(), Size::new(400, 1280)));
    assert!(matches!(Rotation::from_degrees(30), Err(DisplayError::InvalidRotation(30))));
}

/// Two spectrum panels side by side, title underneath
fn dashboard() -> LayoutNode {
    let panel = || NodeOptions::new().outline(Outline::new(2)).padding(2);
    let bars = LayoutNode::distributor("bars", NodeOptions::new().transparent(), AxisDistributor::columns(&[1.0, 1.0]).unwrap())
        .with_child(LayoutNode::with_widget("left", panel(), SpectrumBars::new(Channel::Left))).unwrap()
        .with_child(LayoutNode::with_widget("right", panel(), SpectrumBars::new(Channel::Right))).unwrap();
    let body = LayoutNode::distributor("body", NodeOptions::new().transparent(), AxisDistributor::rows(&[0.8, 0.2]).unwrap())
        .with_child(bars).unwrap()
        .with_child(LayoutNode::with_widget("title", NodeOptions::new(), TextLabel::new(MetaField::Title))).unwrap();
    let mut root = LayoutNode::root("root", logical(), NodeOptions::new()).unwrap();
    root.add_child(body).unwrap();
    root
}

#[test]
fn test_frame_pipeline_presents_only_changes() {
    let mut root = dashboard();
    assert!(root.check());

    let themes = ThemeBook::builtin();
    let meta = StaticMetadata::new().with(MetaField::Title, "So What");
    let mut canvas = Canvas::new(1280, 400, Rgb888::BLACK);
    let mut tracker = DirtyRegionTracker::new(logical());
    let mut rotator = PresentationRotator::new(logical(), Rotation::Rotate90);
    let mut surface = RecordingSurface::new(rotator.physical_size());

    // frame 1: everything is new
    let quiet = AudioSnapshot::new(1, 0.0, 0.0, vec![0.2; 8], vec![0.2; 8]);
    {
        let mut ctx = DrawContext::new(PlatformContext::new(&quiet, &meta, &themes), &mut canvas, &mut tracker);
        root.paint_frame(&mut ctx).unwrap();
        if root.update_screen(&mut ctx, true).unwrap() {
            ctx.dirty.add(root.frame().perimeter_rect());
        }
    }
    let dirty = tracker.get_and_clear();
    assert!(tracker.get_and_clear().is_empty());
    let pct = rotator.present(&canvas, &dirty, &mut surface, &mut tracker).unwrap();
    assert!((pct - 100.0).abs() < 1e-3);
    assert!((tracker.redraw_percent() - 10.0).abs() < 1e-3);

    // frame 2: only the right channel moves
    let moving = AudioSnapshot::new(2, 0.0, 0.0, vec![0.2; 8], vec![0.9; 8]);
    {
        let mut ctx = DrawContext::new(PlatformContext::new(&moving, &meta, &themes), &mut canvas, &mut tracker);
        assert!(!root.update_screen(&mut ctx, false).unwrap());
    }
    let dirty = tracker.get_and_clear();
    let right = root.find("right").unwrap().frame().perimeter_rect();
    assert_eq!(dirty, vec![right]);

    let pct = rotator.present(&canvas, &dirty, &mut surface, &mut tracker).unwrap();
    let expected = (right.size.width * right.size.height) as f32 / (1280.0 * 400.0) * 100.0;
    assert!((pct - expected).abs() < 1e-3);
    let state = surface.snapshot();
    assert_eq!(state.present_count, 2);
    assert_eq!(state.last_dirty, vec![rotator.transform_rect(&right)]);

    // the panel shows the logical canvas turned a quarter
    for p in [right.top_left, right.center(), Point::new(5, 5), Point::new(1279, 399)] {
        let px = rotator.transform_rect(&Rectangle::new(p, Size::new(1, 1))).top_left;
        assert_eq!(surface.panel().pixel(px), canvas.pixel(p), "{:?}", p);
    }

    // frame 3: nothing moves, nothing is sent
    {
        let mut ctx = DrawContext::new(PlatformContext::new(&moving, &meta, &themes), &mut canvas, &mut tracker);
        root.update_screen(&mut ctx, false).unwrap();
    }
    let dirty = tracker.get_and_clear();
    assert!(dirty.is_empty());
    assert_eq!(rotator.present(&canvas, &dirty, &mut surface, &mut tracker).unwrap(), 0.0);
    assert_eq!(surface.snapshot().present_count, 2);
}

#[test]
fn test_screens_fall_back() {
    assert!(matches!(Screen::build("weather", logical()), Err(LayoutError::LayoutConfig(_))));
    let placeholder = Screen::placeholder(logical()).unwrap();
    assert!(placeholder.check());
}
