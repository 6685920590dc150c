/// Frame metadata handed to every frame-loop callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index since the loop started.
    pub index: u64,
    /// Seconds since the previous frame (clamped, see [`FrameClock`]).
    pub dt_s: f64,
    /// Platform timestamp of this frame (seconds).
    pub time_s: f64,
}

/// Upper bound on a single frame delta. A backgrounded tab can deliver a
/// frame after many seconds; controls must not jump by that much.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Nominal display rate used for the first frame, which has no predecessor.
pub const NOMINAL_DT_S: f64 = 1.0 / 60.0;

/// Turns platform timestamps (milliseconds, as delivered by
/// `requestAnimationFrame`) into [`Frame`]s.
#[derive(Debug, Default, Copy, Clone)]
pub struct FrameClock {
    next_index: u64,
    last_time_s: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, timestamp_ms: f64) -> Frame {
        let time_s = timestamp_ms / 1000.0;
        let dt_s = match self.last_time_s {
            Some(prev) => (time_s - prev).clamp(0.0, MAX_FRAME_DT_S),
            None => NOMINAL_DT_S,
        };
        self.last_time_s = Some(time_s);

        let frame = Frame {
            index: self.next_index,
            dt_s,
            time_s,
        };
        self.next_index += 1;
        frame
    }
}
