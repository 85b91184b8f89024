use std::time::{Duration, Instant};

/// Default animation period, roughly 83 ticks per second.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(12);

/// Fixed-period tick source plus a wall-clock stopwatch for redraws.
///
/// The tick period drives the morph animation; the stopwatch measures the
/// real time between redraws for manipulators that integrate velocities.
/// Missed ticks are coalesced rather than replayed, the same way a UI timer
/// behaves when the event loop stalls.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    period: Duration,
    next_tick: Option<Instant>,
    last_frame: Instant,
}

impl AnimationClock {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_tick: None,
            last_frame: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arms the tick source; the first tick is due one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.period);
        self.last_frame = now;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Returns `true` once per elapsed period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(due) if now >= due => {
                let mut next = due + self.period;
                if next <= now {
                    next = now + self.period;
                }
                self.next_tick = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Time the host loop may sleep before the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }

    /// Seconds since the previous call (or since construction), restarting
    /// the stopwatch.
    pub fn frame_delta(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        dt.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_once_per_period() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::new(DEFAULT_TICK_PERIOD, t0);
        assert!(!clock.poll(t0 + Duration::from_millis(50)));

        clock.start(t0);
        assert!(!clock.poll(t0 + Duration::from_millis(5)));
        assert!(clock.poll(t0 + Duration::from_millis(12)));
        assert!(!clock.poll(t0 + Duration::from_millis(13)));
        assert!(clock.poll(t0 + Duration::from_millis(24)));
    }

    #[test]
    fn coalesces_missed_ticks() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::new(DEFAULT_TICK_PERIOD, t0);
        clock.start(t0);

        let late = t0 + Duration::from_millis(500);
        assert!(clock.poll(late));
        assert!(!clock.poll(late + Duration::from_millis(1)));
        assert_eq!(clock.time_until_next(late), Some(DEFAULT_TICK_PERIOD));
    }

    #[test]
    fn frame_delta_measures_wall_clock() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::new(DEFAULT_TICK_PERIOD, t0);

        let dt = clock.frame_delta(t0 + Duration::from_millis(250));
        assert!((dt - 0.25).abs() < 1e-6);
        let dt = clock.frame_delta(t0 + Duration::from_millis(260));
        assert!((dt - 0.01).abs() < 1e-6);
    }
}
