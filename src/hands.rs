//! Clock value → LED coordinate tables.
//!
//! Two layouts are supported:
//! - The *diagonal ring*: the 12 perimeter columns of the cube, viewed from
//!   above with the square turned 45° so a corner sits at 12 o'clock. Each
//!   position also names the inner column closest to it, for drawing a
//!   thicker hand.
//! - The *row plane*: four LEDs inside one vertical 4×4 face that
//!   approximate a hand pointing at one of the 12 numerals.
//!
//! Both are literal tables. The perimeter walk and the zigzag hands are
//! hand-tuned and don't follow from a formula on a square grid.

/// Positions on an analog dial.
pub const DIAL_POSITIONS: usize = 12;

/// Minutes or seconds between two numerals on the dial.
pub const UNITS_PER_POSITION: u32 = 5;

// ── Hand selection ───────────────────────────────────────────────────

/// The clock value being mapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockHand {
    /// 24-hour value, folded onto the 12-hour dial.
    Hour(u32),
    Minute(u32),
    Second(u32),
}

impl ClockHand {
    /// Pick the active value: hour wins over minute, minute over second.
    pub fn select(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> Option<Self> {
        hour.map(Self::Hour)
            .or(minute.map(Self::Minute))
            .or(second.map(Self::Second))
    }

    /// Dial position 0-11. Minutes and seconds past 59 land outside the
    /// tables and map to the origin.
    pub fn index(self) -> usize {
        match self {
            Self::Hour(h) => (h % DIAL_POSITIONS as u32) as usize,
            Self::Minute(v) | Self::Second(v) => (v / UNITS_PER_POSITION) as usize,
        }
    }

    /// Progress within the current 5-unit interval. Hours have none.
    pub fn remainder(self) -> usize {
        match self {
            Self::Hour(_) => 0,
            Self::Minute(v) | Self::Second(v) => (v % UNITS_PER_POSITION) as usize,
        }
    }

    pub fn diagonal(self) -> RingPosition {
        diagonal_position(self.index())
    }

    pub fn row_plane(self) -> [PlaneLed; 4] {
        row_plane_hand(self.index())
    }
}

fn selected_index(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> usize {
    ClockHand::select(hour, minute, second).map_or(0, ClockHand::index)
}

// ── Diagonal ring ────────────────────────────────────────────────────

/// A perimeter column of the top face plus the inner column nearest to it.
///
/// Draw with `i = col`, `j = row`. Row 0 is the back, column 0 the left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RingPosition {
    pub row: i32,
    pub col: i32,
    pub mid_row: i32,
    pub mid_col: i32,
}

const fn ring(row: i32, col: i32, mid_row: i32, mid_col: i32) -> RingPosition {
    RingPosition {
        row,
        col,
        mid_row,
        mid_col,
    }
}

/// 12 o'clock is the back-left corner; positions walk the perimeter
/// starting down the left edge.
const DIAGONAL_RING: [RingPosition; DIAL_POSITIONS] = [
    ring(0, 0, 1, 1),
    ring(1, 0, 1, 1),
    ring(2, 0, 2, 1),
    ring(3, 0, 2, 1),
    ring(3, 1, 2, 1),
    ring(3, 2, 2, 2),
    ring(3, 3, 2, 2),
    ring(2, 3, 2, 2),
    ring(1, 3, 1, 2),
    ring(0, 3, 1, 2),
    ring(0, 2, 1, 2),
    ring(0, 1, 1, 1),
];

/// Ring position for a dial index; anything outside 0-11 is the origin.
pub fn diagonal_position(index: usize) -> RingPosition {
    DIAGONAL_RING.get(index).copied().unwrap_or_default()
}

/// Map whichever of hour, minute or second is given onto the ring.
pub fn map_diagonal(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> RingPosition {
    diagonal_position(selected_index(hour, minute, second))
}

// ── Row plane ────────────────────────────────────────────────────────

/// One LED inside a vertical row plane. The caller picks the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneLed {
    pub col_plane: i32,
    pub z_plane: i32,
}

const fn led(col_plane: i32, z_plane: i32) -> PlaneLed {
    PlaneLed { col_plane, z_plane }
}

/// LED 1 sits nearest the previous numeral and LED 4 nearest the next one,
/// so lighting LEDs 1..=n reads as a hand sweeping forward. 12, 3, 6 and 9
/// are 2×2 squares.
const ROW_PLANE_HANDS: [[PlaneLed; 4]; DIAL_POSITIONS] = [
    [led(2, 3), led(1, 3), led(1, 2), led(2, 2)],
    [led(0, 3), led(1, 3), led(1, 2), led(2, 2)],
    [led(0, 3), led(0, 2), led(1, 2), led(1, 1)],
    [led(0, 2), led(0, 1), led(1, 1), led(1, 2)],
    [led(0, 0), led(0, 1), led(1, 1), led(1, 2)],
    [led(0, 0), led(1, 0), led(1, 1), led(2, 1)],
    [led(1, 0), led(2, 0), led(2, 1), led(1, 1)],
    [led(3, 0), led(2, 0), led(2, 1), led(1, 1)],
    [led(3, 0), led(3, 1), led(2, 1), led(2, 2)],
    [led(3, 1), led(3, 2), led(2, 2), led(2, 1)],
    [led(3, 3), led(3, 2), led(2, 2), led(2, 1)],
    [led(3, 3), led(2, 3), led(2, 2), led(1, 2)],
];

/// The four hand LEDs for a dial index; anything outside 0-11 is all origin.
pub fn row_plane_hand(index: usize) -> [PlaneLed; 4] {
    ROW_PLANE_HANDS.get(index).copied().unwrap_or_default()
}

/// Map whichever of hour, minute or second is given onto a row plane.
pub fn map_row_plane(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> [PlaneLed; 4] {
    row_plane_hand(selected_index(hour, minute, second))
}
