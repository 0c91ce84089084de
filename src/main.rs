/*
 *  main.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame loop - build the screen, draw what changed, present it rotated
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

use anyhow::Context;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use env_logger::Env;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use vuscape::audio::{AudioSnapshot, SharedAudio, SyntheticAudio};
use vuscape::config::{self, Settings};
use vuscape::display::{
    DirtyRegionTracker, DrawContext, LayoutError, MetaField, PlatformContext, PresentationRotator,
    RecordingSurface, Rotation, Screen, ThemeBook,
};
use vuscape::metadata::StaticMetadata;
use vuscape::metrics::FrameStats;
use vuscape::pacer::Pacer;
use vuscape::vframebuf::Canvas;

/// Bands per channel from the synthetic source
const SPECTRUM_BANDS: usize = 24;

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// The requested screen, or the placeholder when it cannot be composed
fn select_screen(name: &str, size: Size) -> Result<Screen, LayoutError> {
    match Screen::build(name, size) {
        Ok(screen) => Ok(screen),
        Err(e @ LayoutError::LayoutConfig(_)) => {
            warn!("{}; showing placeholder", e);
            Screen::placeholder(size)
        }
        Err(e) => Err(e),
    }
}

fn run(settings: &Settings, stop: &AtomicBool) -> anyhow::Result<FrameStats> {
    let size = Size::new(settings.width, settings.height);
    let rotation = Rotation::from_degrees(settings.rotate_deg)?;

    let mut screen = select_screen(&settings.screen, size).context("building screen")?;
    if settings.check_layout && screen.check() {
        info!("layout check passed for '{}'", screen.name());
    }

    let themes = ThemeBook::builtin();
    let metadata = StaticMetadata::new()
        .with(MetaField::Artist, "vuscape")
        .with(MetaField::Title, format!("{} screen", screen.name()))
        .with(MetaField::Album, "synthetic signal")
        .with(MetaField::Format, format!("{}x{} @ {} deg", size.width, size.height, rotation.degrees()));

    let shared = SharedAudio::new(AudioSnapshot::silent(0, SPECTRUM_BANDS));
    let generator = SyntheticAudio::spawn(shared.clone(), SPECTRUM_BANDS, settings.fps)?;
    let mut front = AudioSnapshot::silent(0, SPECTRUM_BANDS);

    let mut canvas = Canvas::new(size.width, size.height, Rgb888::BLACK);
    let mut tracker = DirtyRegionTracker::with_alpha(size, settings.redraw_alpha);
    let mut rotator = PresentationRotator::new(size, rotation);
    let mut surface = RecordingSurface::new(rotator.physical_size());
    let mut pacer = Pacer::new(settings.fps);
    let mut stats = FrameStats::default();
    let report_every = settings.fps.max(1) as u64 * 5;

    info!(
        "running '{}' at {} fps ({:?} per frame), logical {}x{}, panel {}x{}",
        screen.name(), settings.fps, pacer.frame(), size.width, size.height,
        rotator.physical_size().width, rotator.physical_size().height
    );

    let mut full = true;
    while !stop.load(Ordering::Relaxed) {
        shared.copy_into(&mut front);
        {
            let platform = PlatformContext::new(&front, &metadata, &themes);
            let mut ctx = DrawContext::new(platform, &mut canvas, &mut tracker);
            screen.render(&mut ctx, full)?;
        }
        full = false;

        let dirty = tracker.get_and_clear();
        let pct = rotator.present(&canvas, &dirty, &mut surface, &mut tracker)?;
        stats.record((!dirty.is_empty()).then_some(pct));

        if stats.frames % report_every == 0 {
            debug!(
                "frame {}: {} rects, {:.1}% now, {:.1}% smoothed",
                stats.frames, dirty.len(), pct, tracker.redraw_percent()
            );
        }
        if settings.frames.is_some_and(|limit| stats.frames >= limit) {
            info!("frame limit reached");
            break;
        }
        pacer.tick();
    }

    generator.shutdown();
    let pushed = surface.snapshot();
    info!(
        "{} presents, {} pixels pushed, redraw {:.1}% smoothed",
        pushed.present_count, pushed.pixels_pushed, tracker.redraw_percent()
    );
    Ok(stats)
}

#[tokio::main] // Requires the `tokio` runtime with `macros` and `rt-multi-thread` features
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;
    let settings = cfg.settings();

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{}", env!("CARGO_PKG_VERSION"));

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    tokio::spawn(async move {
        match signal_handler().await {
            Ok(()) => flag.store(true, Ordering::Relaxed),
            Err(e) => error!("signal handler failed: {}", e),
        }
    });

    let stats = tokio::task::spawn_blocking(move || run(&settings, &stop)).await??;
    info!(
        "{} frames, {} presented, {} skipped, last redraw {:.1}%",
        stats.frames, stats.presented, stats.skipped, stats.last_redraw_pct
    );
    Ok(())
}
