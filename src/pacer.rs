/*
 *  pacer.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame pacer - holds the frame loop to a target rate
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
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

fn frame_time(fps: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / fps.max(1)) as u64)
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: frame_time(target_fps) }
    }

    #[inline]
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Sleep until the next deadline, then schedule the one after
    ///
    /// A loop that overran its deadline is not made to catch up.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.frame;
        } else {
            self.next_deadline = now + self.frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time() {
        assert_eq!(Pacer::new(50).frame(), Duration::from_millis(20));
        assert_eq!(Pacer::new(0).frame(), Duration::from_secs(1));
    }

    #[test]
    fn test_tick_holds_rate() {
        let mut p = Pacer::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            p.tick();
        }
        // the first tick returns at once
        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
