use core::time::Duration;

use crate::clock::{Clock, Deadline, WaitOutcome, wait_until};

/// Level of the breakwire input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerLevel {
    /// Wire intact; the input sits at its pulled default.
    Armed,
    /// Wire broken; the launch has happened.
    Released,
}

/// Read access to the launch trigger.
///
/// A single read is authoritative. The trigger is a mechanical disconnect,
/// so no majority vote or debounce window is applied.
pub trait TriggerSensor {
    fn level(&mut self) -> TriggerLevel;

    fn is_released(&mut self) -> bool {
        self.level() == TriggerLevel::Released
    }

    /// Poll the trigger every `poll` until it reads released.
    ///
    /// Returns [`WaitOutcome::TimedOut`] only when a `deadline` is given and
    /// passes first.
    fn wait_for_release<C>(
        &mut self,
        clock: &mut C,
        poll: Duration,
        deadline: Option<Deadline>,
    ) -> WaitOutcome
    where
        C: Clock + ?Sized,
        Self: Sized,
    {
        wait_until(clock, deadline, poll, || self.is_released())
    }
}

impl<T: TriggerSensor + ?Sized> TriggerSensor for &mut T {
    fn level(&mut self) -> TriggerLevel {
        (**self).level()
    }
}
