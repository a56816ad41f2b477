//! Render thread: owns the cube and paces the clock animation.
//!
//! The device link is polled and not thread-safe, so every gadget call
//! happens on one dedicated thread. The async HTTP server talks to it by
//! sending `RenderCommand` values through an `mpsc` channel, and reads
//! back a shared `ClockStatus`.
//!
//! ## Rust concepts
//! - `std::sync::mpsc` channels for thread communication
//! - `try_recv()` so the loop never stops polling the device
//! - `Arc<Mutex<T>>` for shared mutable state
//! - Generic functions over a trait (`G: Gadget`)

use crate::clock::{ClockMode, ClockRenderer, ClockTime, SubTicker};
use crate::frame::Frame;
use crate::gadget::{self, Gadget, LinkState};
use crate::TimingConfig;
use serde::Serialize;
use std::error::Error;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How often the device is polled between frames.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Outcome of the render thread; an error means the cube never logged in.
pub type RenderResult = Result<(), Box<dyn Error + Send + Sync>>;

// ── Commands ─────────────────────────────────────────────────────────

/// Commands sent from the HTTP server (or `main`) to the render thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderCommand {
    /// Start animating (or switch to) a mode
    SetMode(ClockMode),
    /// Blank the cube and go idle
    Stop,
    /// Set display brightness (0-100)
    SetBrightness(u8),
}

// ── Status ───────────────────────────────────────────────────────────

/// What the render thread is currently doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    /// Not yet logged in
    Starting,
    /// Logged in, nothing animating
    Idle,
    Running,
    /// Login failed or the render thread has exited
    Offline,
}

/// Shared status the HTTP server reads to report current state.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ClockStatus {
    pub state: ClockState,
    /// Mode being animated, if any
    pub mode: Option<ClockMode>,
    pub link: LinkState,
    /// Frames submitted since startup
    pub frames_sent: u64,
    /// Current brightness (0-100)
    pub brightness: u8,
    /// Server version
    pub version: String,
    #[serde(skip)]
    pub last_frame: Option<Frame>,
}

impl ClockStatus {
    pub fn new(brightness: u8) -> Self {
        Self {
            state: ClockState::Starting,
            mode: None,
            link: LinkState::Disconnected,
            frames_sent: 0,
            brightness: brightness.min(100),
            version: env!("CARGO_PKG_VERSION").to_string(),
            last_frame: None,
        }
    }

    pub fn set_idle(&mut self) {
        self.state = ClockState::Idle;
        self.mode = None;
    }
}

impl Default for ClockStatus {
    fn default() -> Self {
        Self::new(75)
    }
}

// ── Render loop ──────────────────────────────────────────────────────

/// Submit a frame and flip it onto the display.
fn present<G: Gadget + ?Sized>(gadget: &mut G, status: &Mutex<ClockStatus>, frame: Frame) {
    gadget.set_frame(&frame);
    gadget.flip_frame();

    let mut s = status.lock().unwrap();
    s.frames_sent += 1;
    s.last_frame = Some(frame);
}

/// Keep the link serviced until `period` has passed since `start`.
fn pump<G: Gadget + ?Sized>(gadget: &mut G, start: Instant, period: Duration) {
    loop {
        gadget.update();
        if start.elapsed() >= period {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Main render loop. Runs on a dedicated thread and drives `gadget`.
///
/// Logs in first; if the device never answers, the status goes `Offline`
/// and the login error is returned. Each tick then drains pending commands,
/// renders and submits one frame if a mode is active, and polls the device
/// until the next tick is due. Once every sender has been dropped the loop
/// finishes the current tick, logs out and returns.
pub fn render_loop<G: Gadget + ?Sized>(
    rx: Receiver<RenderCommand>,
    status: Arc<Mutex<ClockStatus>>,
    gadget: &mut G,
    timing: TimingConfig,
) -> RenderResult {
    run_clock(rx, status, gadget, timing, ClockTime::now)
}

/// [`render_loop`] with the wall clock supplied by `now`.
fn run_clock<G, F>(
    rx: Receiver<RenderCommand>,
    status: Arc<Mutex<ClockStatus>>,
    gadget: &mut G,
    timing: TimingConfig,
    mut now: F,
) -> RenderResult
where
    G: Gadget + ?Sized,
    F: FnMut() -> ClockTime,
{
    if let Err(e) = gadget::login(gadget, timing.login_attempts) {
        tracing::error!("Could not log in to the cube: {}", e);
        let mut s = status.lock().unwrap();
        s.state = ClockState::Offline;
        s.link = gadget.state();
        return Err(e);
    }

    // `main` may have preset a mode before the thread started
    let (mut mode, mut brightness) = {
        let mut s = status.lock().unwrap();
        s.link = gadget.state();
        s.state = if s.mode.is_some() {
            ClockState::Running
        } else {
            ClockState::Idle
        };
        (s.mode, s.brightness)
    };

    let mut renderer = ClockRenderer::new();
    let mut ticker = SubTicker::new();
    let period = timing.frame_period();

    tracing::info!(
        "Render thread started ({} Hz ticks, {}ms frame period)",
        timing.tick_hz,
        period.as_millis()
    );

    loop {
        let tick_start = Instant::now();
        let mut shutdown = false;

        // Drain everything that arrived since the last tick
        loop {
            match rx.try_recv() {
                Ok(RenderCommand::SetMode(new_mode)) => {
                    tracing::info!("Clock mode: {:?}", new_mode);
                    mode = Some(new_mode);
                    let mut s = status.lock().unwrap();
                    s.state = ClockState::Running;
                    s.mode = Some(new_mode);
                }
                Ok(RenderCommand::Stop) => {
                    if mode.take().is_some() {
                        tracing::info!("Clock stopped");
                        present(gadget, &status, Frame::new());
                    }
                    status.lock().unwrap().set_idle();
                }
                Ok(RenderCommand::SetBrightness(value)) => {
                    brightness = value.min(100);
                    status.lock().unwrap().brightness = brightness;
                    tracing::info!("Brightness set to {}", brightness);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    shutdown = true;
                    break;
                }
            }
        }

        if let Some(mode) = mode {
            let time = ticker.advance(now());
            let frame = renderer.render(mode, time).dimmed(brightness);
            present(gadget, &status, frame);
        }

        pump(gadget, tick_start, period);

        let link = gadget.state();
        {
            let mut s = status.lock().unwrap();
            if s.link != link {
                tracing::warn!("Cube link changed: {:?} -> {:?}", s.link, link);
                s.link = link;
            }
        }

        if shutdown {
            break;
        }
    }

    tracing::info!("Render thread: channel closed, logging out.");
    gadget::logout(gadget);

    let mut s = status.lock().unwrap();
    s.state = ClockState::Offline;
    s.mode = None;
    s.link = gadget.state();
    Ok(())
}
