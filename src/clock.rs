//! Frame compositor: turns a clock reading into one cube frame per mode.
//!
//! Every mode is a pure function of the time (plus the fill-test position).
//! A frame starts dark, then hands are written hour → minute → second so
//! that later hands win where they overlap; the second hand must stay
//! visible. Ring-based modes draw their sub-tick indicator first, beneath
//! everything else.
//!
//! Progress inside a 5-minute (or 5-second) interval is shown by painting
//! the first `value % 5` LEDs of a hand in an accent color. Accent count N
//! always includes the LEDs of every count below N, so the hand fills in
//! steadily instead of flickering.

use crate::frame::Frame;
use crate::hands::{ClockHand, RingPosition};
use crate::{CUBE_SIZE, Color};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Sub-ticks per wall-clock second.
pub const SUB_TICKS_PER_SECOND: u32 = 12;

/// LEDs on the plane clock's walk (the cube minus the reserved column).
pub const WALK_LENGTH: usize = 60;

/// `(i, j, k)` of one LED.
type Led = (i32, i32, i32);

// ── Modes ────────────────────────────────────────────────────────────

/// Animation style, chosen from outside and kept until changed.
///
/// What each mode shows is described once, in [`ClockMode::description`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    utoipa::ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ClockMode {
    FillTest,
    EarlyClock,
    PaddleClock,
    FrontClock,
    HandsColorful,
    HandsMono,
    HandsBlinky,
    PlaneClock,
}

impl ClockMode {
    pub const ALL: [ClockMode; 8] = [
        ClockMode::FillTest,
        ClockMode::EarlyClock,
        ClockMode::PaddleClock,
        ClockMode::FrontClock,
        ClockMode::HandsColorful,
        ClockMode::HandsMono,
        ClockMode::HandsBlinky,
        ClockMode::PlaneClock,
    ];

    pub fn description(self) -> &'static str {
        match self {
            ClockMode::FillTest => "Lights the cube one LED per frame in a coordinate gradient",
            ClockMode::EarlyClock => "Full-height ring columns for every hand",
            ClockMode::PaddleClock => "Hour on the lower layers, minute paddle on the upper layers",
            ClockMode::FrontClock => "Each hand drawn inside its own vertical row plane",
            ClockMode::HandsColorful => "Paddle layout in bright colors with a sub-second sweep",
            ClockMode::HandsMono => "Paddle layout in shades of white with a sub-second sweep",
            ClockMode::HandsBlinky => "Colorful hands pulsing between two intensities",
            ClockMode::PlaneClock => "Minutes and seconds filling a 60-LED walk through the volume",
        }
    }
}

// ── Time ─────────────────────────────────────────────────────────────

/// One clock reading: wall-clock time plus the 12 Hz sub-tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTime {
    /// 0-23
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0-11, resets every second
    pub sub_tick: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32, sub_tick: u32) -> Self {
        Self {
            hour,
            minute,
            second,
            sub_tick,
        }
    }

    /// Read the clock fields (and derive the sub-tick) from a chrono time.
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        let nanos = time.nanosecond() as u64;
        let sub_tick = (nanos * SUB_TICKS_PER_SECOND as u64 / 1_000_000_000) as u32;
        Self::new(
            time.hour(),
            time.minute(),
            time.second(),
            // chrono reports leap seconds as nanosecond >= 1e9
            sub_tick.min(SUB_TICKS_PER_SECOND - 1),
        )
    }

    /// Current local time.
    pub fn now() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60 && self.sub_tick < SUB_TICKS_PER_SECOND
    }
}

/// Sub-tick counter driven by the render loop.
///
/// Advances once per rendered frame and restarts at 0 whenever the
/// wall-clock second changes, so the sub-tick follows the frame cadence
/// instead of being sampled from the clock. Saturates at 11 when frames come
/// faster than 12 per second.
#[derive(Debug, Default)]
pub struct SubTicker {
    second: Option<u32>,
    count: u32,
}

impl SubTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `time.sub_tick` with the next counter value.
    pub fn advance(&mut self, time: ClockTime) -> ClockTime {
        if self.second == Some(time.second) {
            self.count = (self.count + 1).min(SUB_TICKS_PER_SECOND - 1);
        } else {
            self.second = Some(time.second);
            self.count = 0;
        }

        ClockTime {
            sub_tick: self.count,
            ..time
        }
    }
}

// ── Palettes ─────────────────────────────────────────────────────────

/// Colors for one clock face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandPalette {
    pub hour: Color,
    pub minute: Color,
    pub minute_accent: Color,
    pub second: Color,
    pub second_accent: Color,
    pub sub_tick: Color,
}

impl HandPalette {
    pub fn apply_brightness(self, brightness: u8) -> Self {
        Self {
            hour: self.hour.apply_brightness(brightness),
            minute: self.minute.apply_brightness(brightness),
            minute_accent: self.minute_accent.apply_brightness(brightness),
            second: self.second.apply_brightness(brightness),
            second_accent: self.second_accent.apply_brightness(brightness),
            sub_tick: self.sub_tick.apply_brightness(brightness),
        }
    }
}

pub const CLASSIC: HandPalette = HandPalette {
    hour: Color::new(0, 255, 0),
    minute: Color::WHITE,
    minute_accent: Color::new(255, 0, 0),
    second: Color::new(255, 255, 0),
    second_accent: Color::new(0, 0, 255),
    sub_tick: Color::BLACK,
};

pub const FRONT: HandPalette = HandPalette {
    hour: Color::new(255, 0, 255),
    minute: Color::new(255, 0, 0),
    minute_accent: Color::new(0xF0, 0xF0, 0),
    second: Color::new(0, 0, 255),
    second_accent: Color::new(0, 0xF0, 0xF0),
    sub_tick: Color::BLACK,
};

pub const COLORFUL: HandPalette = HandPalette {
    hour: Color::new(0xF0, 0x60, 0x00),
    minute: Color::new(0x00, 0xC0, 0xF0),
    minute_accent: Color::new(0xF0, 0x00, 0xC0),
    second: Color::new(0xF0, 0xF0, 0x00),
    second_accent: Color::new(0x00, 0xF0, 0x40),
    sub_tick: Color::new(0x30, 0x00, 0x50),
};

pub const MONO: HandPalette = HandPalette {
    hour: Color::new(0x40, 0x40, 0x40),
    minute: Color::new(0x90, 0x90, 0x90),
    minute_accent: Color::new(0xF0, 0xF0, 0xF0),
    second: Color::new(0xC0, 0xC0, 0xC0),
    second_accent: Color::new(0x20, 0x20, 0x20),
    sub_tick: Color::new(0x10, 0x10, 0x10),
};

/// Intensity of the blinky palette on odd sub-ticks.
pub const BLINK_DIM: u8 = 35;

const PLANE_MINUTE: Color = Color::new(0xF0, 0, 0);
const PLANE_SECOND: Color = Color::new(0, 0, 0xF0);
const PLANE_REMAINING: Color = Color::new(0, 0x20, 0);
const PLANE_SUB_TICK: Color = Color::WHITE;

/// Column holding the plane clock's sub-tick dot.
const RESERVED_COLUMN: (i32, i32) = (0, 0);

// ── Drawing primitives ───────────────────────────────────────────────

fn draw_column(frame: &mut Frame, i: i32, j: i32, layers: Range<i32>, color: Color) {
    for k in layers {
        frame.set_pixel(i, j, k, color);
    }
}

/// Paint `leds` in `base`, then the first `accents` of them in `accent`.
fn draw_accented(frame: &mut Frame, leds: &[Led], accents: usize, base: Color, accent: Color) {
    for &(i, j, k) in leds {
        frame.set_pixel(i, j, k, base);
    }
    for &(i, j, k) in leds.iter().take(accents) {
        frame.set_pixel(i, j, k, accent);
    }
}

/// Full-height perimeter column; the accent fills in from the top.
fn draw_column_hand(frame: &mut Frame, hand: ClockHand, base: Color, accent: Color) {
    let pos = hand.diagonal();
    let column: Vec<Led> = (0..CUBE_SIZE)
        .rev()
        .map(|k| (pos.col, pos.row, k))
        .collect();
    draw_accented(frame, &column, hand.remainder(), base, accent);
}

/// Perimeter and inner cells on both of the given layers.
fn draw_thick_hand(frame: &mut Frame, pos: RingPosition, layers: Range<i32>, color: Color) {
    draw_column(frame, pos.col, pos.row, layers.clone(), color);
    draw_column(frame, pos.mid_col, pos.mid_row, layers, color);
}

/// Four-LED paddle on the top two layers, in accent order.
fn paddle(pos: RingPosition) -> [Led; 4] {
    [
        (pos.col, pos.row, 3),
        (pos.mid_col, pos.mid_row, 3),
        (pos.mid_col, pos.mid_row, 2),
        (pos.col, pos.row, 2),
    ]
}

fn draw_sub_tick(frame: &mut Frame, sub_tick: u32, color: Color) {
    let pos = ClockHand::Hour(sub_tick).diagonal();
    frame.set_pixel(pos.col, pos.row, 0, color);
}

// ── Modes ────────────────────────────────────────────────────────────

fn draw_fill(frame: &mut Frame, pos: u8) {
    for n in 0..=i32::from(pos) {
        let (x, y, z) = (n / 16, (n / 4) & 3, n & 3);
        let color = Color::new((x * x * 28) as u8, (y * y * 28) as u8, (z * z * 28) as u8);
        frame.set_pixel(x, y, z, color);
    }
}

fn draw_early(frame: &mut Frame, time: ClockTime) {
    let palette = CLASSIC;
    let hour = ClockHand::Hour(time.hour).diagonal();
    draw_thick_hand(frame, hour, 0..CUBE_SIZE, palette.hour);
    draw_column_hand(frame, ClockHand::Minute(time.minute), palette.minute, palette.minute_accent);
    draw_column_hand(frame, ClockHand::Second(time.second), palette.second, palette.second_accent);
}

fn draw_paddle(frame: &mut Frame, time: ClockTime, palette: &HandPalette) {
    let hour = ClockHand::Hour(time.hour).diagonal();
    draw_thick_hand(frame, hour, 0..2, palette.hour);

    let minute = ClockHand::Minute(time.minute);
    draw_accented(
        frame,
        &paddle(minute.diagonal()),
        minute.remainder(),
        palette.minute,
        palette.minute_accent,
    );

    draw_column_hand(frame, ClockHand::Second(time.second), palette.second, palette.second_accent);
}

fn draw_hands(frame: &mut Frame, time: ClockTime, palette: &HandPalette) {
    draw_sub_tick(frame, time.sub_tick, palette.sub_tick);
    draw_paddle(frame, time, palette);
}

/// Row planes: hour at j = 1, minute at j = 2, second at j = 3.
fn draw_front(frame: &mut Frame, time: ClockTime) {
    let palette = FRONT;
    let hands = [
        (ClockHand::Hour(time.hour), 1, palette.hour, palette.hour),
        (ClockHand::Minute(time.minute), 2, palette.minute, palette.minute_accent),
        (ClockHand::Second(time.second), 3, palette.second, palette.second_accent),
    ];

    for (hand, row, base, accent) in hands {
        let leds = hand.row_plane().map(|l| (l.col_plane, row, l.z_plane));
        draw_accented(frame, &leds, hand.remainder(), base, accent);
    }
}

/// Walk order for the plane clock: bottom layer up, rows back to front,
/// alternating column direction, skipping the reserved column.
pub fn plane_walk() -> impl Iterator<Item = Led> {
    (0..CUBE_SIZE).flat_map(|k| {
        (0..CUBE_SIZE).flat_map(move |j| {
            (0..CUBE_SIZE)
                .map(move |n| if j % 2 == 0 { n } else { CUBE_SIZE - 1 - n })
                .map(move |i| (i, j, k))
        })
    })
    .filter(|&(i, j, _)| (i, j) != RESERVED_COLUMN)
}

/// Minutes or seconds elapsed on the walk; zero is a full lap.
fn walk_units(value: u32) -> usize {
    if value == 0 { WALK_LENGTH } else { value as usize }
}

fn draw_plane(frame: &mut Frame, time: ClockTime) {
    let minutes = walk_units(time.minute);
    let seconds = walk_units(time.second);

    for (n, (i, j, k)) in plane_walk().enumerate() {
        let step = n + 1;
        let color = match (step <= minutes, step <= seconds) {
            (false, false) => PLANE_REMAINING,
            (minute_done, second_done) => {
                let m = if minute_done { PLANE_MINUTE } else { Color::BLACK };
                let s = if second_done { PLANE_SECOND } else { Color::BLACK };
                Color::new(m.r | s.r, m.g | s.g, m.b | s.b)
            }
        };
        frame.set_pixel(i, j, k, color);
    }

    let ticks_per_layer = SUB_TICKS_PER_SECOND / CUBE_SIZE as u32;
    let (i, j) = RESERVED_COLUMN;
    frame.set_pixel(i, j, (time.sub_tick / ticks_per_layer) as i32, PLANE_SUB_TICK);
}

// ── Rendering ────────────────────────────────────────────────────────

/// Render one frame. `fill_pos` is only used by [`ClockMode::FillTest`].
pub fn render_frame(mode: ClockMode, time: ClockTime, fill_pos: u8) -> Frame {
    let mut frame = Frame::new();

    match mode {
        ClockMode::FillTest => draw_fill(&mut frame, fill_pos),
        ClockMode::EarlyClock => draw_early(&mut frame, time),
        ClockMode::PaddleClock => draw_paddle(&mut frame, time, &CLASSIC),
        ClockMode::FrontClock => draw_front(&mut frame, time),
        ClockMode::HandsColorful => draw_hands(&mut frame, time, &COLORFUL),
        ClockMode::HandsMono => draw_hands(&mut frame, time, &MONO),
        ClockMode::HandsBlinky => {
            let palette = if time.sub_tick % 2 == 0 {
                COLORFUL
            } else {
                COLORFUL.apply_brightness(BLINK_DIM)
            };
            draw_hands(&mut frame, time, &palette);
        }
        ClockMode::PlaneClock => draw_plane(&mut frame, time),
    }

    frame
}

/// Holds the animation counters that live for the whole process.
///
/// `pos` drives the fill test and advances on every render, whatever the
/// mode. `last_second` is used to log the clock once per second.
#[derive(Debug, Default)]
pub struct ClockRenderer {
    pos: u8,
    last_second: Option<u32>,
}

impl ClockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_position(&self) -> u8 {
        self.pos
    }

    pub fn render(&mut self, mode: ClockMode, time: ClockTime) -> Frame {
        let frame = render_frame(mode, time, self.pos);

        if self.last_second != Some(time.second) {
            tracing::debug!(
                ?mode,
                "{:02}:{:02}:{:02}",
                time.hour,
                time.minute,
                time.second
            );
            self.last_second = Some(time.second);
        }

        self.pos = (self.pos + 1) & 63;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;

    fn at(hour: u32, minute: u32, second: u32, sub_tick: u32) -> ClockTime {
        ClockTime::new(hour, minute, second, sub_tick)
    }

    fn leds_with(frame: &Frame, color: Color) -> HashSet<Led> {
        let color = color.quantize();
        frame
            .pixels()
            .filter(|(_, _, _, c)| *c == color)
            .map(|(i, j, k, _)| (i, j, k))
            .collect()
    }

    fn assert_pixel(frame: &Frame, led: Led, color: Color) {
        let (i, j, k) = led;
        assert_eq!(frame.pixel(i, j, k), Some(color.quantize()), "LED {led:?}");
    }

    // ── Modes and time ─────────────────────────────────────────────

    #[test]
    fn all_modes_are_distinct() {
        let modes: HashSet<_> = ClockMode::ALL.iter().collect();
        assert_eq!(modes.len(), ClockMode::ALL.len());
    }

    #[rstest]
    #[case(ClockMode::FillTest, "\"fill-test\"")]
    #[case(ClockMode::PaddleClock, "\"paddle-clock\"")]
    #[case(ClockMode::HandsBlinky, "\"hands-blinky\"")]
    fn test_mode_wire_names(#[case] mode: ClockMode, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&mode).unwrap(), json);
        assert_eq!(serde_json::from_str::<ClockMode>(json).unwrap(), mode);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(83_333_334, 1)]
    #[case(500_000_000, 6)]
    #[case(999_999_999, 11)]
    #[case(1_500_000_000, 11)] // leap second
    fn test_sub_tick_from_nanos(#[case] nanos: u32, #[case] sub_tick: u32) {
        let time = NaiveTime::from_hms_nano_opt(13, 37, 59, nanos).unwrap();
        assert_eq!(ClockTime::from_time(&time), at(13, 37, 59, sub_tick));
    }

    #[rstest]
    #[case(at(23, 59, 59, 11), true)]
    #[case(at(24, 0, 0, 0), false)]
    #[case(at(0, 60, 0, 0), false)]
    #[case(at(0, 0, 60, 0), false)]
    #[case(at(0, 0, 0, 12), false)]
    fn test_time_validity(#[case] time: ClockTime, #[case] valid: bool) {
        assert_eq!(time.is_valid(), valid);
    }

    #[test]
    fn every_mode_has_its_own_description() {
        let descriptions: HashSet<_> = ClockMode::ALL.iter().map(|m| m.description()).collect();
        assert_eq!(descriptions.len(), ClockMode::ALL.len());
        assert!(descriptions.iter().all(|d| !d.is_empty()));
    }

    #[test]
    fn sub_ticker_counts_frames_within_a_second() {
        let mut ticker = SubTicker::new();
        let ticks: Vec<_> = [0, 0, 0, 1, 1, 2]
            .into_iter()
            .map(|second| ticker.advance(at(7, 30, second, 9)).sub_tick)
            .collect();
        assert_eq!(ticks, vec![0, 1, 2, 0, 1, 0]);
    }

    #[test]
    fn sub_ticker_alternates_parity_at_six_frames_per_second() {
        let mut ticker = SubTicker::new();
        let ticks: Vec<_> = (0..6).map(|_| ticker.advance(at(7, 30, 0, 0)).sub_tick).collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4, 5]);
        assert!(ticks.iter().any(|t| t % 2 == 1));
    }

    #[test]
    fn sub_ticker_saturates_at_eleven() {
        let mut ticker = SubTicker::new();
        let last = (0..30)
            .map(|_| ticker.advance(at(7, 30, 0, 0)))
            .last()
            .unwrap();
        assert_eq!(last, at(7, 30, 0, 11));
    }

    #[test]
    fn every_mode_is_total_over_odd_inputs() {
        for mode in ClockMode::ALL {
            for time in [at(23, 59, 59, 11), at(99, 75, 120, 40), at(12, 0, 0, 0)] {
                let _ = render_frame(mode, time, 200);
            }
        }
    }

    // ── Hands ──────────────────────────────────────────────────────

    #[test]
    fn midnight_puts_every_hand_at_twelve() {
        let frame = render_frame(ClockMode::HandsColorful, at(0, 0, 0, 0), 0);

        for k in 0..4 {
            assert_pixel(&frame, (0, 0, k), COLORFUL.second);
        }
        assert_pixel(&frame, (1, 1, 0), COLORFUL.hour);
        assert_pixel(&frame, (1, 1, 1), COLORFUL.hour);
        assert_pixel(&frame, (1, 1, 2), COLORFUL.minute);
        assert_pixel(&frame, (1, 1, 3), COLORFUL.minute);
        assert_eq!(frame.lit_count(), 8);
        assert!(leds_with(&frame, COLORFUL.minute_accent).is_empty());
        assert!(leds_with(&frame, COLORFUL.second_accent).is_empty());
    }

    #[test]
    fn minute_37_shows_two_accents() {
        let frame = render_frame(ClockMode::HandsColorful, at(3, 37, 0, 0), 0);

        // index 7: perimeter (row 2, col 3), inner (row 2, col 2)
        let accents = leds_with(&frame, COLORFUL.minute_accent);
        assert_eq!(accents, HashSet::from([(3, 2, 3), (2, 2, 3)]));
        assert_pixel(&frame, (2, 2, 2), COLORFUL.minute);
        assert_pixel(&frame, (3, 2, 2), COLORFUL.minute);
    }

    #[test]
    fn paddle_accents_reveal_monotonically() {
        let mut previous = HashSet::new();
        for n in 0..5 {
            let frame = render_frame(ClockMode::PaddleClock, at(0, 35 + n, 0, 0), 0);
            let accents = leds_with(&frame, CLASSIC.minute_accent);
            assert_eq!(accents.len(), n as usize);
            assert!(accents.is_superset(&previous), "minute {}", 35 + n);
            previous = accents;
        }
    }

    #[test]
    fn second_column_fills_from_the_top() {
        let mut previous = HashSet::new();
        for n in 0..5 {
            // index 4: perimeter (row 3, col 1)
            let frame = render_frame(ClockMode::EarlyClock, at(0, 0, 20 + n, 0), 0);
            let accents = leds_with(&frame, CLASSIC.second_accent);
            let expected: HashSet<_> = (4 - n as i32..4).map(|k| (1, 3, k)).collect();
            assert_eq!(accents, expected);
            assert!(accents.is_superset(&previous));
            previous = accents;
        }
    }

    #[test]
    fn early_clock_hour_spans_all_layers() {
        // 15:00 -> index 3: perimeter (row 3, col 0), inner (row 2, col 1)
        let frame = render_frame(ClockMode::EarlyClock, at(15, 30, 45, 0), 0);
        for k in 0..4 {
            assert_pixel(&frame, (0, 3, k), CLASSIC.hour);
            assert_pixel(&frame, (1, 2, k), CLASSIC.hour);
        }
    }

    #[test]
    fn paddle_hour_uses_lower_layers_only() {
        let frame = render_frame(ClockMode::PaddleClock, at(15, 30, 45, 0), 0);
        assert_eq!(
            leds_with(&frame, CLASSIC.hour),
            HashSet::from([(0, 3, 0), (0, 3, 1), (1, 2, 0), (1, 2, 1)])
        );
    }

    #[test]
    fn second_hand_wins_over_minute() {
        // minute and second both at index 6
        let frame = render_frame(ClockMode::PaddleClock, at(0, 30, 30, 0), 0);
        assert_pixel(&frame, (3, 3, 3), CLASSIC.second);
        assert_pixel(&frame, (3, 3, 2), CLASSIC.second);
        assert_pixel(&frame, (2, 2, 3), CLASSIC.minute);
    }

    #[test]
    fn front_clock_draws_each_hand_in_its_plane() {
        let frame = render_frame(ClockMode::FrontClock, at(4, 37, 15, 0), 0);

        // minute index 7, two accents: LED1 and LED2
        assert_eq!(
            leds_with(&frame, FRONT.minute_accent),
            HashSet::from([(3, 2, 0), (2, 2, 0)])
        );
        assert_eq!(
            leds_with(&frame, FRONT.minute),
            HashSet::from([(2, 2, 1), (1, 2, 1)])
        );
        // hour index 4 in row plane 1
        assert_eq!(
            leds_with(&frame, FRONT.hour),
            HashSet::from([(0, 1, 0), (0, 1, 1), (1, 1, 1), (1, 1, 2)])
        );
        // second index 3, no accent, row plane 3
        assert_eq!(
            leds_with(&frame, FRONT.second),
            HashSet::from([(0, 3, 2), (0, 3, 1), (1, 3, 1), (1, 3, 2)])
        );
        assert_eq!(frame.lit_count(), 12);
    }

    #[test]
    fn front_clock_accents_reveal_in_table_order() {
        let mut previous = HashSet::new();
        for n in 0..5 {
            let frame = render_frame(ClockMode::FrontClock, at(0, 0, 50 + n, 0), 0);
            let accents = leds_with(&frame, FRONT.second_accent);
            assert_eq!(accents.len(), n as usize);
            assert!(accents.is_superset(&previous));
            previous = accents;
        }
    }

    #[rstest]
    #[case(0, (0, 0))]
    #[case(3, (0, 3))]
    #[case(8, (3, 1))]
    fn sub_tick_sweeps_the_bottom_ring(#[case] sub_tick: u32, #[case] cell: (i32, i32)) {
        // hands parked at 6:30:30 so the ring's left side is free
        let frame = render_frame(ClockMode::HandsColorful, at(6, 30, 30, sub_tick), 0);
        let (i, j) = cell;
        assert_eq!(leds_with(&frame, COLORFUL.sub_tick), HashSet::from([(i, j, 0)]));
    }

    #[test]
    fn mono_palette_is_grey() {
        let frame = render_frame(ClockMode::HandsMono, at(10, 43, 17, 5), 0);
        assert!(frame.lit_count() > 0);
        for (_, _, _, c) in frame.pixels() {
            assert!(c.r == c.g && c.g == c.b, "{c:?}");
        }
    }

    #[test]
    fn blinky_dims_on_odd_sub_ticks() {
        let bright = render_frame(ClockMode::HandsBlinky, at(0, 0, 0, 2), 0);
        let dim = render_frame(ClockMode::HandsBlinky, at(0, 0, 0, 3), 0);

        assert_pixel(&bright, (0, 0, 3), COLORFUL.second);
        assert_pixel(&dim, (0, 0, 3), COLORFUL.second.apply_brightness(BLINK_DIM));
        assert_ne!(bright.pixel(0, 0, 3), dim.pixel(0, 0, 3));
    }

    // ── Plane clock ────────────────────────────────────────────────

    #[test]
    fn walk_covers_every_led_but_the_reserved_column() {
        let walk: Vec<_> = plane_walk().collect();
        let unique: HashSet<_> = walk.iter().copied().collect();
        assert_eq!(walk.len(), WALK_LENGTH);
        assert_eq!(unique.len(), WALK_LENGTH);
        assert!(walk.iter().all(|&(i, j, _)| (i, j) != (0, 0)));
    }

    #[test]
    fn walk_is_serpentine() {
        let first_layer: Vec<_> = plane_walk().take(7).collect();
        assert_eq!(
            first_layer,
            vec![(1, 0, 0), (2, 0, 0), (3, 0, 0), (3, 1, 0), (2, 1, 0), (1, 1, 0), (0, 1, 0)]
        );
    }

    #[test]
    fn plane_clock_on_the_hour_is_a_full_lap() {
        let frame = render_frame(ClockMode::PlaneClock, at(9, 0, 0, 0), 0);
        let both = Color::new(0xF0, 0, 0xF0);

        assert_eq!(leds_with(&frame, both).len(), WALK_LENGTH);
        assert!(leds_with(&frame, PLANE_REMAINING).is_empty());
    }

    #[test]
    fn plane_clock_splits_completed_and_remaining() {
        let frame = render_frame(ClockMode::PlaneClock, at(9, 37, 10, 0), 0);

        assert_eq!(leds_with(&frame, Color::new(0xF0, 0, 0xF0)).len(), 10);
        assert_eq!(leds_with(&frame, PLANE_MINUTE).len(), 27);
        assert_eq!(leds_with(&frame, PLANE_REMAINING).len(), 23);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 0)]
    #[case(4, 1)]
    #[case(11, 3)]
    fn plane_clock_sub_tick_climbs_reserved_column(#[case] sub_tick: u32, #[case] layer: i32) {
        let frame = render_frame(ClockMode::PlaneClock, at(9, 37, 10, sub_tick), 0);
        for k in 0..4 {
            let expected = if k == layer { PLANE_SUB_TICK.quantize() } else { Color::BLACK };
            assert_eq!(frame.pixel(0, 0, k), Some(expected));
        }
    }

    // ── Fill test ──────────────────────────────────────────────────

    #[test]
    fn fill_test_lights_leds_up_to_pos() {
        // LED 0 is the origin with a black gradient color
        assert_eq!(render_frame(ClockMode::FillTest, at(0, 0, 0, 0), 0).lit_count(), 0);
        assert_eq!(render_frame(ClockMode::FillTest, at(0, 0, 0, 0), 5).lit_count(), 5);
        assert_eq!(render_frame(ClockMode::FillTest, at(0, 0, 0, 0), 63).lit_count(), 63);
    }

    #[test]
    fn fill_test_uses_coordinate_gradient() {
        let frame = render_frame(ClockMode::FillTest, at(0, 0, 0, 0), 63);
        // LED 63 is (3, 3, 3): 9 * 28 = 252 on every channel
        assert_eq!(frame.pixel(3, 3, 3), Some(Color::new(0xF0, 0xF0, 0xF0)));
        // LED 5 is (0, 1, 1)
        assert_eq!(frame.pixel(0, 1, 1), Some(Color::new(0, 0x10, 0x10)));
    }

    #[test]
    fn renderer_advances_fill_position_every_frame() {
        let mut renderer = ClockRenderer::new();
        let time = at(8, 15, 0, 0);

        assert_eq!(renderer.render(ClockMode::FillTest, time).lit_count(), 0);
        assert_eq!(renderer.render(ClockMode::FillTest, time).lit_count(), 1);
        renderer.render(ClockMode::PaddleClock, time);
        assert_eq!(renderer.fill_position(), 3);
    }

    #[test]
    fn renderer_fill_position_wraps_at_64() {
        let mut renderer = ClockRenderer::new();
        for _ in 0..64 {
            renderer.render(ClockMode::EarlyClock, at(1, 2, 3, 4));
        }
        assert_eq!(renderer.fill_position(), 0);
    }

    #[test]
    fn renderer_matches_pure_render_for_clock_modes() {
        let mut renderer = ClockRenderer::new();
        let time = at(17, 42, 8, 7);
        for mode in ClockMode::ALL.into_iter().filter(|m| *m != ClockMode::FillTest) {
            assert_eq!(renderer.render(mode, time), render_frame(mode, time, 0));
        }
    }
}
