use tracing::info;

use crate::power::{PowerController, WakeCause};

/// A call made on [`SimPower`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerEvent {
    BrownoutDisabled,
    TriggerWakeArmed,
    Suspended,
}

/// Power controller that records calls instead of touching hardware.
///
/// [`suspend`](PowerController::suspend) returns immediately.
#[derive(Debug, Clone)]
pub struct SimPower {
    wake_cause: WakeCause,
    events: Vec<PowerEvent>,
}

impl SimPower {
    pub fn new(wake_cause: WakeCause) -> Self {
        Self {
            wake_cause,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[PowerEvent] {
        &self.events
    }

    pub fn suspended(&self) -> bool {
        self.events.contains(&PowerEvent::Suspended)
    }
}

impl Default for SimPower {
    fn default() -> Self {
        Self::new(WakeCause::PowerOn)
    }
}

impl PowerController for SimPower {
    fn disable_brownout(&mut self) {
        self.events.push(PowerEvent::BrownoutDisabled);
    }

    fn wake_cause(&self) -> WakeCause {
        self.wake_cause
    }

    fn arm_trigger_wake(&mut self) {
        self.events.push(PowerEvent::TriggerWakeArmed);
    }

    fn suspend(&mut self) {
        info!("suspending (simulated)");
        self.events.push(PowerEvent::Suspended);
    }
}
