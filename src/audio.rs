/*
 *  audio.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Audio snapshots - the double-buffered levels and bands the widgets
 *  read, and a synthetic generator to drive them without capture
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

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::display::traits::{AudioSource, Channel};

fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Left => 0,
        Channel::Right => 1,
        Channel::Mono => 2,
    }
}

/// One published set of levels and bands
///
/// Values are already smoothed; everything is in 0..1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSnapshot {
    sequence: u64,
    levels: [f32; 3],
    bands: [Vec<f32>; 3],
}

impl AudioSnapshot {
    /// Stereo snapshot; the mono channel is the mean of left and right
    pub fn new(sequence: u64, left: f32, right: f32, bands_l: Vec<f32>, bands_r: Vec<f32>) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let bands_l: Vec<f32> = bands_l.into_iter().map(clamp).collect();
        let bands_r: Vec<f32> = bands_r.into_iter().map(clamp).collect();
        let mono: Vec<f32> = bands_l
            .iter()
            .zip(&bands_r)
            .map(|(l, r)| (l + r) * 0.5)
            .collect();
        let (left, right) = (clamp(left), clamp(right));
        Self {
            sequence,
            levels: [left, right, (left + right) * 0.5],
            bands: [bands_l, bands_r, mono],
        }
    }

    /// All zero, `bands` bands per channel
    pub fn silent(sequence: u64, bands: usize) -> Self {
        Self::new(sequence, 0.0, 0.0, vec![0.0; bands], vec![0.0; bands])
    }

    pub fn band_count(&self) -> usize {
        self.bands[0].len()
    }
}

impl AudioSource for AudioSnapshot {
    fn level(&self, channel: Channel) -> f32 {
        self.levels[slot(channel)]
    }

    fn spectrum(&self, channel: Channel) -> &[f32] {
        &self.bands[slot(channel)]
    }

    fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Latest snapshot, shared between a producer and the frame loop
///
/// The producer replaces the whole snapshot; the frame loop copies it out
/// once per frame so nothing is locked while drawing.
#[derive(Debug, Clone, Default)]
pub struct SharedAudio {
    inner: Arc<Mutex<AudioSnapshot>>,
}

impl SharedAudio {
    pub fn new(initial: AudioSnapshot) -> Self {
        Self { inner: Arc::new(Mutex::new(initial)) }
    }

    pub fn publish(&self, snapshot: AudioSnapshot) {
        if let Ok(mut latest) = self.inner.lock() {
            *latest = snapshot;
        }
    }

    /// Copy the latest snapshot into `front`, reusing its buffers
    ///
    /// Returns false when nothing new was published since `front`.
    pub fn copy_into(&self, front: &mut AudioSnapshot) -> bool {
        match self.inner.lock() {
            Ok(latest) if latest.sequence != front.sequence => {
                front.clone_from(&latest);
                true
            }
            _ => false,
        }
    }

    pub fn latest(&self) -> AudioSnapshot {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Background producer of plausible-looking levels
///
/// Stands in for capture and analysis: slow sine envelopes per channel with
/// a falling spectrum tilt.
pub struct SyntheticAudio {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SyntheticAudio {
    /// Spawn the generator, publishing `rate_hz` snapshots per second
    pub fn spawn(shared: SharedAudio, bands: usize, rate_hz: u32) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let period = Duration::from_micros(1_000_000 / rate_hz.max(1) as u64);
        let join = thread::Builder::new()
            .name("synthetic-audio".to_string())
            .spawn(move || generator(shared, bands, period, flag))?;
        info!("synthetic audio started, {} bands at {} Hz", bands, rate_hz);
        Ok(Self { stop, join: Some(join) })
    }

    /// Ask the generator to stop and wait for it
    pub fn shutdown(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SyntheticAudio {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Snapshot `step` of the synthetic signal
pub fn synthesize(step: u64, bands: usize) -> AudioSnapshot {
    let t = step as f32 * 0.05;
    let envelope = |phase: f32, speed: f32| 0.5 + 0.45 * (t * speed + phase).sin();
    let left = envelope(0.0, 1.3);
    let right = envelope(1.1, 1.7);
    let band = |level: f32, i: usize, phase: f32| {
        let tilt = 1.0 - i as f32 / bands.max(1) as f32 * 0.6;
        let wobble = 0.5 + 0.5 * (t * (2.0 + i as f32 * 0.37) + phase).sin();
        level * tilt * wobble
    };
    let bands_l = (0..bands).map(|i| band(left, i, 0.0)).collect();
    let bands_r = (0..bands).map(|i| band(right, i, 0.7)).collect();
    AudioSnapshot::new(step, left, right, bands_l, bands_r)
}

fn generator(shared: SharedAudio, bands: usize, period: Duration, stop: Arc<AtomicBool>) {
    let mut step: u64 = 0;
    while !stop.load(Ordering::Relaxed) {
        step += 1;
        shared.publish(synthesize(step, bands));
        thread::sleep(period);
    }
    debug!("synthetic audio stopped after {} snapshots", step);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_is_mean() {
        let s = AudioSnapshot::new(1, 0.2, 0.6, vec![0.0, 1.0], vec![1.0, 1.0]);
        assert!((s.level(Channel::Mono) - 0.4).abs() < 1e-6);
        assert_eq!(s.spectrum(Channel::Mono), &[0.5, 1.0]);
        assert_eq!(s.band_count(), 2);
    }

    #[test]
    fn test_values_clamped() {
        let s = AudioSnapshot::new(1, 1.5, f32::NAN, vec![-1.0], vec![2.0]);
        assert_eq!(s.level(Channel::Left), 1.0);
        assert_eq!(s.level(Channel::Right), 0.0);
        assert_eq!(s.spectrum(Channel::Left), &[0.0]);
        assert_eq!(s.spectrum(Channel::Right), &[1.0]);
    }

    #[test]
    fn test_copy_into_only_when_new() {
        let shared = SharedAudio::new(AudioSnapshot::silent(0, 4));
        let mut front = AudioSnapshot::silent(0, 4);
        assert!(!shared.copy_into(&mut front));

        shared.publish(synthesize(3, 4));
        assert!(shared.copy_into(&mut front));
        assert_eq!(front.sequence(), 3);
        assert!(!shared.copy_into(&mut front));
    }

    #[test]
    fn test_synthetic_in_range() {
        for step in 0..200 {
            let s = synthesize(step, 12);
            for ch in [Channel::Left, Channel::Right, Channel::Mono] {
                assert!((0.0..=1.0).contains(&s.level(ch)));
                assert_eq!(s.spectrum(ch).len(), 12);
                assert!(s.spectrum(ch).iter().all(|b| (0.0..=1.0).contains(b)));
            }
        }
    }

    #[test]
    fn test_generator_publishes_and_stops() {
        let shared = SharedAudio::default();
        let generator = SyntheticAudio::spawn(shared.clone(), 8, 200).unwrap();
        thread::sleep(Duration::from_millis(50));
        generator.shutdown();
        let latest = shared.latest();
        assert!(latest.sequence() > 0);
        assert_eq!(latest.band_count(), 8);
    }
}
