//! Device interface: how the render thread talks to the cube.
//!
//! The cube sits behind a serial link with its own login handshake and a
//! double-buffered frame store. None of that is modelled here beyond the
//! calls the render thread needs, so any transport can plug in by
//! implementing [`Gadget`].
//!
//! The link is single-threaded and polled: nothing happens unless
//! [`Gadget::update`] is called, and it must be called every few
//! milliseconds while connected.

use crate::frame::Frame;
use serde::Serialize;
use std::thread;
use std::time::Duration;

/// Delay between polls while waiting for the login handshake.
const LOGIN_POLL: Duration = Duration::from_millis(5);

/// Polls (and the delay between them) after requesting logout.
const LOGOUT_POLLS: u32 = 10;
const LOGOUT_POLL: Duration = Duration::from_millis(10);

/// Link state reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Disconnected,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

/// A connected LED cube.
pub trait Gadget {
    /// Start the login handshake. Completes over later [`Gadget::update`] calls.
    fn login(&mut self);

    /// Start logging out.
    fn logout(&mut self);

    /// Process pending link I/O.
    fn update(&mut self);

    fn state(&self) -> LinkState;

    /// Upload a frame to the back buffer.
    fn set_frame(&mut self, frame: &Frame);

    /// Show the last uploaded frame.
    fn flip_frame(&mut self);
}

/// Log in and poll until the device confirms or `attempts` polls pass.
pub fn login<G: Gadget + ?Sized>(
    gadget: &mut G,
    attempts: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    gadget.login();
    for _ in 0..attempts {
        gadget.update();
        if gadget.state() == LinkState::LoggedIn {
            return Ok(());
        }
        thread::sleep(LOGIN_POLL);
    }

    Err(format!(
        "device did not confirm login after {attempts} polls (state: {:?})",
        gadget.state()
    )
    .into())
}

/// Log out, then keep polling briefly so the request actually goes out.
pub fn logout<G: Gadget + ?Sized>(gadget: &mut G) {
    gadget.logout();
    for _ in 0..LOGOUT_POLLS {
        gadget.update();
        thread::sleep(LOGOUT_POLL);
    }
}

// ── Virtual cube ─────────────────────────────────────────────────────

/// An in-process cube that accepts frames without any hardware.
///
/// It goes through the same login/logout states as a real device, taking
/// a few polls to answer, and keeps the displayed frame so it can be
/// inspected.
#[derive(Debug)]
pub struct VirtualCube {
    state: LinkState,
    /// Polls the handshake takes; `None` never answers.
    handshake_polls: Option<u32>,
    pending_polls: u32,
    back_buffer: Option<Frame>,
    shown: Option<Frame>,
    frames_received: u64,
    flips: u64,
}

impl Default for VirtualCube {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCube {
    pub fn new() -> Self {
        Self::with_handshake(Some(3))
    }

    /// A cube whose handshakes take `polls` updates to answer, or that never
    /// answers when `None`.
    pub fn with_handshake(polls: Option<u32>) -> Self {
        Self {
            state: LinkState::Disconnected,
            handshake_polls: polls,
            pending_polls: 0,
            back_buffer: None,
            shown: None,
            frames_received: 0,
            flips: 0,
        }
    }

    /// The frame currently on display.
    pub fn shown(&self) -> Option<&Frame> {
        self.shown.as_ref()
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }
}

impl Gadget for VirtualCube {
    fn login(&mut self) {
        self.state = LinkState::LoggingIn;
        self.pending_polls = self.handshake_polls.unwrap_or(u32::MAX);
    }

    fn logout(&mut self) {
        self.state = LinkState::LoggingOut;
        self.pending_polls = self.handshake_polls.unwrap_or(u32::MAX);
    }

    fn update(&mut self) {
        if !matches!(self.state, LinkState::LoggingIn | LinkState::LoggingOut) {
            return;
        }
        if self.handshake_polls.is_none() {
            return;
        }

        self.pending_polls = self.pending_polls.saturating_sub(1);
        if self.pending_polls == 0 {
            self.state = match self.state {
                LinkState::LoggingIn => LinkState::LoggedIn,
                _ => LinkState::Disconnected,
            };
            tracing::debug!("Virtual cube link: {:?}", self.state);
        }
    }

    fn state(&self) -> LinkState {
        self.state
    }

    fn set_frame(&mut self, frame: &Frame) {
        if self.state != LinkState::LoggedIn {
            tracing::warn!("Virtual cube dropped a frame while {:?}", self.state);
            return;
        }
        self.back_buffer = Some(*frame);
        self.frames_received += 1;
    }

    fn flip_frame(&mut self) {
        if let Some(frame) = self.back_buffer {
            tracing::trace!("Virtual cube shows {}", frame.to_hex());
            self.shown = Some(frame);
            self.flips += 1;
        }
    }
}
