use core::time::Duration;

/// Monotonic time since boot plus the ability to block for a while.
///
/// Every wait in the crate goes through this trait, so a simulated clock can
/// drive the state machine without real delays.
pub trait Clock {
    /// Time since boot. Never decreases.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// A point in monotonic time after which a wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Duration);

impl Deadline {
    pub fn after(clock: &impl Clock, timeout: Duration) -> Self {
        Self(clock.now().saturating_add(timeout))
    }

    pub fn at(instant: Duration) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> Duration {
        self.0
    }

    pub fn has_passed(&self, now: Duration) -> bool {
        now >= self.0
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.0.saturating_sub(now)
    }
}

/// Result of [`wait_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut,
}

/// Poll `predicate` every `poll` until it holds or `deadline` passes.
///
/// The predicate is checked before the first sleep, so an already-true
/// condition returns without blocking. Sleeps are clipped to the deadline.
/// Without a deadline the wait only ends when the predicate holds.
pub fn wait_until<C, F>(
    clock: &mut C,
    deadline: Option<Deadline>,
    poll: Duration,
    mut predicate: F,
) -> WaitOutcome
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    loop {
        if predicate() {
            return WaitOutcome::Satisfied;
        }
        let nap = match deadline {
            Some(deadline) => {
                let now = clock.now();
                if deadline.has_passed(now) {
                    return WaitOutcome::TimedOut;
                }
                poll.min(deadline.remaining(now))
            }
            None => poll,
        };
        clock.sleep(nap);
    }
}

/// The fixed-length span during which frames are recorded.
///
/// Open from `start` until at least `duration` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingWindow {
    start: Duration,
    duration: Duration,
}

impl RecordingWindow {
    /// Open a window starting now.
    pub fn open(clock: &impl Clock, duration: Duration) -> Self {
        Self {
            start: clock.now(),
            duration,
        }
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }

    pub fn is_open(&self, now: Duration) -> bool {
        self.elapsed(now) < self.duration
    }

    pub fn deadline(&self) -> Deadline {
        Deadline(self.start.saturating_add(self.duration))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FakeClock {
        now: Duration,
        sleeps: usize,
    }

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            self.now
        }

        fn sleep(&mut self, duration: Duration) {
            self.now += duration;
            self.sleeps += 1;
        }
    }

    fn clock() -> FakeClock {
        FakeClock {
            now: Duration::from_secs(5),
            sleeps: 0,
        }
    }

    #[test]
    fn satisfied_predicate_does_not_sleep() {
        let mut clock = clock();
        let outcome = wait_until(&mut clock, None, Duration::from_millis(10), || true);
        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(clock.sleeps, 0);
    }

    #[test]
    fn wait_times_out_exactly_at_deadline() {
        let mut clock = clock();
        let deadline = Deadline::after(&clock, Duration::from_millis(25));
        let outcome = wait_until(&mut clock, Some(deadline), Duration::from_millis(10), || false);
        assert_eq!(outcome, WaitOutcome::TimedOut);
        // 10 + 10 + 5, the last nap clipped to the deadline
        assert_eq!(clock.now, Duration::from_millis(5025));
        assert_eq!(clock.sleeps, 3);
    }

    #[test]
    fn wait_without_deadline_polls_until_true() {
        let mut clock = clock();
        let mut polls = 0;
        let outcome = wait_until(&mut clock, None, Duration::from_millis(10), || {
            polls += 1;
            polls == 4
        });
        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(clock.sleeps, 3);
    }

    #[test]
    fn window_closes_once_duration_elapsed() {
        let clock = clock();
        let window = RecordingWindow::open(&clock, Duration::from_secs(10));
        assert!(window.is_open(Duration::from_secs(5)));
        assert!(window.is_open(Duration::from_millis(14_999)));
        assert!(!window.is_open(Duration::from_secs(15)));
        assert_eq!(window.deadline().instant(), Duration::from_secs(15));
        assert_eq!(window.elapsed(Duration::from_secs(1)), Duration::ZERO);
    }
}
