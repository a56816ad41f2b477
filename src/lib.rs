//! Analog clock animations for a 4×4×4 RGB LED cube.
//!
//! The crate is split in two layers:
//! - The rendering core: the packed framebuffer codec ([`frame`]), the
//!   clock-to-coordinate tables ([`hands`]) and the per-mode compositor
//!   ([`clock`]). Everything here is pure and never touches I/O.
//! - The shell that drives it: the device interface ([`gadget`]), the
//!   render thread ([`render`]) and the HTTP control API ([`server`]).
//!
//! This module holds the small shared types both layers use: colors,
//! timing configuration and Ctrl+C handling.

pub mod clock;
pub mod frame;
pub mod gadget;
pub mod hands;
pub mod render;
pub mod server;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// LEDs along each edge of the cube.
pub const CUBE_SIZE: i32 = 4;

/// Total number of LEDs in the cube.
pub const LED_COUNT: usize = 64;

// ── Timing configuration ───────────────────────────────────────────

/// How fast the render thread ticks and submits frames.
///
/// The render loop ticks `tick_hz` times per second, but frames are
/// submitted at most `max_fps` times per second; the device may lock up
/// if it is fed much faster than ~30 frames per second. The sub-tick counter
/// advances once per submitted frame and restarts every wall-clock second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_hz: u32,
    pub max_fps: u32,
    /// Polls allowed for the login handshake before giving up.
    pub login_attempts: u32,
}

impl TimingConfig {
    pub fn new(tick_hz: u32, max_fps: u32) -> Self {
        Self {
            tick_hz,
            max_fps,
            ..Self::default()
        }
    }

    /// Time between two ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.tick_hz.max(1) as u64)
    }

    /// Time between two frame submissions: one per tick, but never faster
    /// than `max_fps`.
    pub fn frame_period(&self) -> Duration {
        let min_frame = Duration::from_millis(1000 / self.max_fps.max(1) as u64);
        self.tick_interval().max(min_frame)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_hz: 12,
            max_fps: 30,
            login_attempts: 100,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// An 8-bit-per-channel color.
///
/// The cube only keeps the high nibble of each channel, so `0x10` steps are
/// the smallest visible difference. See [`Color::quantize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply brightness scaling (0-100) to this color.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }

    /// The color as the cube will actually show it (low nibbles dropped).
    pub const fn quantize(self) -> Self {
        Self::new(self.r & 0xF0, self.g & 0xF0, self.b & 0xF0)
    }

    pub fn is_black(self) -> bool {
        self.quantize() == Self::BLACK
    }
}

// ── Signal handling ────────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets the returned flag to false.
///
/// # Rust concept: Arc and AtomicBool
/// The flag is shared between the main thread and the signal handler.
/// `AtomicBool` needs no mutex for a single bool.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
