/*
 *  display/surface.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording surface - in-memory panel for running without hardware
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
use embedded_graphics::primitives::Rectangle;
use std::sync::{Arc, Mutex};

use crate::display::error::DisplayError;
use crate::display::traits::DisplaySurface;
use crate::vframebuf::Canvas;

/// Display surface that keeps what it was sent
///
/// Only the dirty regions of each presented frame are copied into the
/// panel image, so the image shows exactly what a partial-update panel
/// would show. Useful for:
/// - Unit and integration tests
/// - Running the frame loop without hardware
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    /// What the panel currently shows
    panel: Canvas,

    /// Shared state for inspection
    state: Arc<Mutex<SurfaceState>>,
}

/// Counters kept by the recording surface
#[derive(Debug, Default, Clone)]
pub struct SurfaceState {
    /// Number of present() calls
    pub present_count: usize,

    /// Physical rects of the last present
    pub last_dirty: Vec<Rectangle>,

    /// Total pixels pushed across all presents
    pub pixels_pushed: u64,

    /// Simulate a failing panel (for error testing)
    pub simulate_failure: bool,
}

impl RecordingSurface {
    /// New surface of the given physical size, showing black
    pub fn new(size: Size) -> Self {
        Self {
            panel: Canvas::new(size.width, size.height, Rgb888::BLACK),
            state: Arc::new(Mutex::new(SurfaceState::default())),
        }
    }

    /// Handle on the counters, shared with any clone
    pub fn state(&self) -> Arc<Mutex<SurfaceState>> {
        Arc::clone(&self.state)
    }

    /// Copy of the counters
    pub fn snapshot(&self) -> SurfaceState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn panel(&self) -> &Canvas {
        &self.panel
    }

    pub fn set_simulate_failure(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.simulate_failure = fail;
        }
    }
}

impl DisplaySurface for RecordingSurface {
    fn size(&self) -> Size {
        self.panel.size()
    }

    fn present(&mut self, frame: &Canvas, dirty: &[Rectangle]) -> Result<(), DisplayError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DisplayError::Other("surface state poisoned".to_string()))?;
        if state.simulate_failure {
            return Err(DisplayError::DrawingError("simulated present failure".to_string()));
        }
        if frame.size() != self.panel.size() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.panel.as_slice().len(),
                actual: frame.as_slice().len(),
            });
        }

        for rect in dirty {
            let clipped = rect.intersection(&self.panel.bounds());
            if clipped.size.width == 0 || clipped.size.height == 0 {
                continue;
            }
            let pixels = frame.region(&clipped);
            state.pixels_pushed += pixels.len() as u64;
            self.panel.blit(&clipped, &pixels)?;
        }
        state.present_count += 1;
        state.last_dirty = dirty.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dirty_pixels_reach_panel() {
        let mut surface = RecordingSurface::new(Size::new(10, 10));
        let frame = Canvas::new(10, 10, Rgb888::WHITE);
        let dirty = [Rectangle::new(Point::new(2, 2), Size::new(3, 3))];
        surface.present(&frame, &dirty).unwrap();

        assert_eq!(surface.panel().pixel(Point::new(3, 3)), Some(Rgb888::WHITE));
        assert_eq!(surface.panel().pixel(Point::new(0, 0)), Some(Rgb888::BLACK));
        let state = surface.snapshot();
        assert_eq!(state.present_count, 1);
        assert_eq!(state.pixels_pushed, 9);
        assert_eq!(state.last_dirty, dirty.to_vec());
    }

    #[test]
    fn test_wrong_frame_size() {
        let mut surface = RecordingSurface::new(Size::new(10, 10));
        let frame = Canvas::new(20, 10, Rgb888::WHITE);
        assert!(matches!(
            surface.present(&frame, &[]),
            Err(DisplayError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_simulated_failure() {
        let mut surface = RecordingSurface::new(Size::new(4, 4));
        surface.set_simulate_failure(true);
        let frame = Canvas::new(4, 4, Rgb888::WHITE);
        assert!(surface.present(&frame, &[]).is_err());
        assert_eq!(surface.snapshot().present_count, 0);
    }
}
