//! Frame delta clamping and cancelable wake deadlines.
//!
//! Both loops (render and music) are driven by polling from one thread, so
//! "scheduling a callback" is just arming a deadline that a later poll
//! compares against the clock.

/// Largest delta a single frame may simulate.  Keeps a backgrounded window
/// from teleporting everything on its first frame back.
pub const MAX_FRAME_DT: f32 = 0.033;

#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call, clamped to `[0, MAX_FRAME_DT]`.
    /// The first call returns 0.
    pub fn advance(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => ((now - last) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last = Some(now);
        dt
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// A single pending wake-up.  Arming replaces any earlier deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wake {
    deadline: Option<f64>,
}

impl Wake {
    pub fn arm(&mut self, at: f64) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn take_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
