/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; seconds left.
    Running(u32),
    /// This tick reached zero. Returned once per countdown.
    Completed,
    /// Paused or already finished; nothing changed.
    Idle,
}

/// Second-resolution focus countdown.
///
/// The remaining count is clamped at zero and completion is reported only on
/// the tick that crosses into zero, never on later ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u32,
    remaining_secs: u32,
    paused: bool,
}

impl Countdown {
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        let total_secs = minutes.saturating_mul(60);
        Self {
            total_secs,
            remaining_secs: total_secs,
            paused: false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.paused || self.remaining_secs == 0 {
            return TickOutcome::Idle;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TickOutcome::Completed
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    /// Returns false if the countdown was already paused or finished.
    pub fn pause(&mut self) -> bool {
        if self.paused || self.is_finished() {
            return false;
        }
        self.paused = true;
        true
    }

    /// Returns false if the countdown was not paused.
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    /// Elapsed share of the countdown, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.total_secs == 0 {
            return 100;
        }
        let percent = u64::from(self.elapsed_secs()) * 100 / u64::from(self.total_secs);
        u8::try_from(percent).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_exactly_once() {
        let mut countdown = Countdown::from_minutes(1);
        let mut completions = 0;
        for _ in 0..120 {
            if countdown.tick() == TickOutcome::Completed {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(countdown.remaining_secs(), 0);
        assert_eq!(countdown.progress_percent(), 100);
    }

    #[test]
    fn paused_countdown_does_not_move() {
        let mut countdown = Countdown::from_minutes(1);
        countdown.tick();
        assert!(countdown.pause());
        assert_eq!(countdown.tick(), TickOutcome::Idle);
        assert_eq!(countdown.remaining_secs(), 59);
        assert!(countdown.resume());
        assert_eq!(countdown.tick(), TickOutcome::Running(58));
    }

    #[test]
    fn progress_tracks_elapsed_share() {
        let mut countdown = Countdown::from_minutes(1);
        for _ in 0..30 {
            countdown.tick();
        }
        assert_eq!(countdown.progress_percent(), 50);
        assert_eq!(countdown.elapsed_secs(), 30);
    }

    #[test]
    fn finished_countdown_cannot_pause() {
        let mut countdown = Countdown::from_minutes(0);
        assert!(countdown.is_finished());
        assert!(!countdown.pause());
        assert_eq!(countdown.tick(), TickOutcome::Idle);
    }
}
