/*
 *  metrics.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Smoothed operational signals for the frame loop
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

/// Default smoothing for the redraw percentage
pub const DEFAULT_ALPHA: f32 = 0.1;

/// Exponentially weighted moving average, `S_t = a*Y_t + (1-a)*S_t-1`
///
/// Starts at zero rather than seeding from the first sample, so a quiet
/// screen ramps up instead of jumping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma {
    value: f32,
    alpha: f32,
}

impl Ewma {
    pub fn new(alpha: f32) -> Self {
        Self { value: 0.0, alpha: alpha.clamp(0.0, 1.0) }
    }

    /// Fold in one observation and return the new average
    #[inline]
    pub fn update(&mut self, sample: f32) -> f32 {
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        self.value
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

impl Default for Ewma {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

/// Per-run frame counters, logged on exit
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub presented: u64,
    pub skipped: u64,
    pub last_redraw_pct: f32,
}

impl FrameStats {
    /// Record one frame; `redraw_pct` is `None` when nothing was presented
    pub fn record(&mut self, redraw_pct: Option<f32>) {
        self.frames += 1;
        match redraw_pct {
            Some(pct) => {
                self.presented += 1;
                self.last_redraw_pct = pct;
            }
            None => self.skipped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample() {
        let mut avg = Ewma::new(0.1);
        assert_eq!(avg.value(), 0.0);
        assert!((avg.update(50.0) - 5.0).abs() < 1e-6);
        assert!((avg.update(50.0) - 9.5).abs() < 1e-5);
    }

    #[test]
    fn test_converges() {
        let mut avg = Ewma::new(0.5);
        for _ in 0..40 {
            avg.update(20.0);
        }
        assert!((avg.value() - 20.0).abs() < 1e-3);
        avg.reset();
        assert_eq!(avg.value(), 0.0);
    }

    #[test]
    fn test_frame_stats() {
        let mut stats = FrameStats::default();
        stats.record(Some(12.5));
        stats.record(None);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.presented, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.last_redraw_pct, 12.5);
    }
}
