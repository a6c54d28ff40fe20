/// Outcome of a single [`Countdown::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// The countdown moved one step and is still running.
    Ticked {
        /// Steps left after this tick.
        remaining: u32,
    },
    /// This tick reached zero. Returned exactly once per countdown.
    Expired,
    /// The countdown had already expired; nothing changed.
    AlreadyExpired,
}

/// Fixed-length, decrement-to-zero counter.
///
/// Drives both the pre-roll countdown and the recording window. The caller
/// supplies the timing (one [`tick`](Self::tick) per timer period) and reacts
/// to the returned [`CountdownStep`]: `Ticked` is the per-tick hook and
/// `Expired` the on-zero hook.
///
/// The tick that brings the counter to zero reports `Expired` in the same
/// call, so a countdown of `n` expires on its `n`th tick. A zero-length
/// countdown expires on its first tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    expired: bool,
}

impl Countdown {
    /// Creates a countdown of `duration` steps.
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            expired: false,
        }
    }

    /// Advances one step.
    pub fn tick(&mut self) -> CountdownStep {
        if self.expired {
            return CountdownStep::AlreadyExpired;
        }

        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.expired = true;
            CountdownStep::Expired
        } else {
            CountdownStep::Ticked {
                remaining: self.remaining,
            }
        }
    }

    /// Steps left before expiry.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Steps taken so far.
    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining
    }

    /// Total length this countdown was created with.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether the zero step has already fired.
    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
