//! Packed framebuffer for the 4×4×4 cube.
//!
//! Each LED takes 12 bits (4 per channel), so two LEDs share three bytes
//! laid out as `R1G1 B1R2 G2B2`. A layer of 16 LEDs is 24 bytes, a column
//! of 4 LEDs within a layer is 6 bytes, giving 96 bytes for the cube.
//!
//! The row coordinate is reversed before encoding (`j' = 3 - j`) so that
//! callers author frames in a right-handed system while the device keeps
//! its native ordering.

use crate::{CUBE_SIZE, Color};
use std::fmt::Write;

/// Size of one packed frame in bytes.
pub const FRAME_BYTES: usize = 96;

/// One complete cube image, ready to hand to the device.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_BYTES]);

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({})", self.to_hex())
    }
}

fn in_range(i: i32, j: i32, k: i32) -> bool {
    let valid = 0..CUBE_SIZE;
    valid.contains(&i) && valid.contains(&j) && valid.contains(&k)
}

/// Offset of the 3-byte group holding (i, j, k), and whether the LED is the
/// odd (second) member of that group.
fn locate(i: i32, j: i32, k: i32) -> (usize, bool) {
    let j = 3 - j;
    let offset = 24 * k + 6 * i + 3 * (j >> 1);
    (offset as usize, j & 1 == 1)
}

impl Frame {
    /// An all-dark frame.
    pub const fn new() -> Self {
        Self([0; FRAME_BYTES])
    }

    pub fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.0
    }

    /// Set one LED. Coordinates outside `[0, 3]` are ignored.
    ///
    /// Only the LED's own nibbles change; the LED sharing its byte group
    /// keeps its value.
    pub fn set_pixel(&mut self, i: i32, j: i32, k: i32, color: Color) {
        if !in_range(i, j, k) {
            return;
        }

        let (offset, odd) = locate(i, j, k);
        let buf = &mut self.0[offset..offset + 3];
        let (r, g, b) = (color.r >> 4, color.g >> 4, color.b >> 4);

        if odd {
            // ..R2 G2B2
            buf[1] = (buf[1] & 0xF0) | r;
            buf[2] = (g << 4) | b;
        } else {
            // R1G1 B1..
            buf[0] = (r << 4) | g;
            buf[1] = (buf[1] & 0x0F) | (b << 4);
        }
    }

    /// Read one LED back. Channels come back as `nibble << 4`.
    pub fn pixel(&self, i: i32, j: i32, k: i32) -> Option<Color> {
        if !in_range(i, j, k) {
            return None;
        }

        let (offset, odd) = locate(i, j, k);
        let buf = &self.0[offset..offset + 3];

        let (r, g, b) = if odd {
            (buf[1] & 0x0F, buf[2] >> 4, buf[2] & 0x0F)
        } else {
            (buf[0] >> 4, buf[0] & 0x0F, buf[1] >> 4)
        };
        Some(Color::new(r << 4, g << 4, b << 4))
    }

    /// Iterate over every LED as `(i, j, k, color)`, layer by layer.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32, i32, Color)> + '_ {
        (0..CUBE_SIZE).flat_map(move |k| {
            (0..CUBE_SIZE).flat_map(move |j| {
                (0..CUBE_SIZE).map(move |i| {
                    let color = self.pixel(i, j, k).unwrap_or_default();
                    (i, j, k, color)
                })
            })
        })
    }

    /// Number of LEDs that are not fully dark.
    pub fn lit_count(&self) -> usize {
        self.pixels().filter(|(_, _, _, c)| !c.is_black()).count()
    }

    /// Scale every channel by `brightness` percent (0-100).
    ///
    /// Each nibble is an independent channel level, so the packed bytes can
    /// be scaled in place without decoding.
    pub fn dimmed(&self, brightness: u8) -> Self {
        if brightness >= 100 {
            return *self;
        }
        let scale = |nibble: u8| ((nibble as u16 * brightness as u16) / 100) as u8;
        let mut out = *self;
        for byte in out.0.iter_mut() {
            *byte = (scale(*byte >> 4) << 4) | scale(*byte & 0x0F);
        }
        out
    }

    /// Lowercase hex dump of the packed bytes.
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(FRAME_BYTES * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
    }
}
