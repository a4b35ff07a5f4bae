use std::time::Duration;

use crate::clock::Clock;
use crate::platform::host::clock::SimClock;
use crate::trigger::{TriggerLevel, TriggerSensor};

/// Breakwire that breaks at a fixed point on a [`SimClock`] timeline.
#[derive(Debug, Clone)]
pub struct SimTrigger {
    clock: SimClock,
    release_at: Option<Duration>,
    reads: u64,
}

impl SimTrigger {
    /// Reads released from `release_at` onwards.
    pub fn releasing_at(clock: SimClock, release_at: Duration) -> Self {
        Self {
            clock,
            release_at: Some(release_at),
            reads: 0,
        }
    }

    /// Already broken at power-on.
    pub fn released(clock: SimClock) -> Self {
        Self::releasing_at(clock, Duration::ZERO)
    }

    /// Never breaks.
    pub fn armed(clock: SimClock) -> Self {
        Self {
            clock,
            release_at: None,
            reads: 0,
        }
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl TriggerSensor for SimTrigger {
    fn level(&mut self) -> TriggerLevel {
        self.reads += 1;
        match self.release_at {
            Some(at) if self.clock.now() >= at => TriggerLevel::Released,
            _ => TriggerLevel::Armed,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn releases_on_schedule() {
        let clock = SimClock::new();
        let mut trigger = SimTrigger::releasing_at(clock.clone(), Duration::from_secs(3));
        assert_eq!(trigger.level(), TriggerLevel::Armed);
        clock.advance(Duration::from_secs(3));
        assert_eq!(trigger.level(), TriggerLevel::Released);
        assert_eq!(trigger.reads(), 2);
    }

    #[test]
    fn polling_wait_advances_simulated_time() {
        let mut clock = SimClock::new();
        let mut trigger = SimTrigger::releasing_at(clock.clone(), Duration::from_millis(95));
        trigger.wait_for_release(&mut clock, Duration::from_millis(10), None);
        assert_eq!(clock.now(), Duration::from_millis(100));
    }
}
