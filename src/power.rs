/// Why the device is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeCause {
    /// Cold boot, reset, or any wake source other than the trigger.
    PowerOn,
    /// Woken from suspension by the trigger line.
    Trigger,
}

/// Device-wide power controls.
///
/// Every call happens at a defined state-machine transition; nothing else in
/// the crate touches power hardware.
pub trait PowerController {
    /// Turn off brown-out reset so storage write bursts cannot reset the
    /// device.
    fn disable_brownout(&mut self);

    fn wake_cause(&self) -> WakeCause;

    /// Configure the trigger line as the wake source for [`suspend`].
    ///
    /// [`suspend`]: PowerController::suspend
    fn arm_trigger_wake(&mut self);

    /// Enter device-wide suspension.
    ///
    /// On hardware this does not return: waking restarts the firmware from
    /// the top with no retained state.
    fn suspend(&mut self);
}

impl<P: PowerController + ?Sized> PowerController for &mut P {
    fn disable_brownout(&mut self) {
        (**self).disable_brownout()
    }

    fn wake_cause(&self) -> WakeCause {
        (**self).wake_cause()
    }

    fn arm_trigger_wake(&mut self) {
        (**self).arm_trigger_wake()
    }

    fn suspend(&mut self) {
        (**self).suspend()
    }
}
