use core::time::Duration;

use arrayvec::ArrayVec;
use tracing::{debug, error, info, trace, warn};

use crate::clock::{Clock, RecordingWindow};
use crate::config::{LaunchMode, RecorderConfig, RestMode};
use crate::device::CameraDevice;
use crate::error::{Error, PlatformError, Severity};
use crate::frame::Frame;
use crate::indicator::{Pattern, StatusIndicator};
use crate::power::{PowerController, WakeCause};
use crate::session::{ContainerSink, SessionId, SessionStore};
use crate::stream::FrameSource;
use crate::trigger::{TriggerLevel, TriggerSensor};
use crate::types::CaptureProfile;

/// Most states a single run can pass through.
const MAX_HISTORY: usize = 8;

/// Phases of one launch-to-rest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    PowerOn,
    ArmedWait,
    AlreadyReleased,
    SessionSetup,
    Recording,
    Finalizing,
    PowerDown,
    FatalError,
}

impl State {
    pub fn can_transition_to(self, next: State) -> bool {
        use State::*;
        matches!(
            (self, next),
            (PowerOn, ArmedWait | AlreadyReleased | SessionSetup)
                | (ArmedWait | AlreadyReleased, SessionSetup)
                | (SessionSetup, Recording | FatalError)
                | (Recording, Finalizing | FatalError)
                | (Finalizing, PowerDown)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, State::PowerDown | State::FatalError)
    }
}

/// Counters for one recording window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingReport {
    pub session: SessionId,
    pub frames_appended: u32,
    pub bytes_appended: u64,
    /// Loop iterations where the source had no frame.
    pub frames_unavailable: u32,
    /// Frames lost to failed appends.
    pub write_failures: u32,
    /// Time from the first frame pull until the window closed.
    pub elapsed: Duration,
}

impl RecordingReport {
    fn new(session: SessionId) -> Self {
        Self {
            session,
            frames_appended: 0,
            bytes_appended: 0,
            frames_unavailable: 0,
            write_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    // A dead sensor can spin the loop for the whole window without a frame.
    fn count_unavailable(&mut self) {
        self.frames_unavailable = self.frames_unavailable.saturating_add(1);
    }

    fn count_write_failure(&mut self) {
        self.write_failures = self.write_failures.saturating_add(1);
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The trigger was still armed and the device suspended to wait for it.
    /// Only reachable when suspension returns, i.e. off hardware.
    Suspended,
    /// The recording window completed and the container was closed.
    Completed(RecordingReport),
    /// A fatal error stopped the run in [`State::FatalError`].
    Halted(Error),
}

/// The launch-triggered capture sequence.
///
/// Owns every collaborator for one boot. [`run`](Self::run) walks the states
/// once; a new boot builds a new machine.
#[derive(Debug)]
pub struct CaptureStateMachine<P, T, I, S, K, C> {
    config: RecorderConfig,
    profile: CaptureProfile,
    power: P,
    trigger: T,
    indicator: I,
    store: S,
    camera: Option<K>,
    clock: C,
    state: State,
    history: ArrayVec<State, MAX_HISTORY>,
}

impl<P, T, I, S, K, C> CaptureStateMachine<P, T, I, S, K, C>
where
    P: PowerController,
    T: TriggerSensor,
    I: StatusIndicator,
    S: SessionStore,
    K: CameraDevice,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RecorderConfig,
        profile: CaptureProfile,
        power: P,
        trigger: T,
        indicator: I,
        store: S,
        camera: K,
        clock: C,
    ) -> Self {
        let mut history = ArrayVec::new();
        history.push(State::PowerOn);
        Self {
            config,
            profile,
            power,
            trigger,
            indicator,
            store,
            camera: Some(camera),
            clock,
            state: State::PowerOn,
            history,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Every state entered so far, starting with [`State::PowerOn`].
    pub fn history(&self) -> &[State] {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `true` until the camera has been opened.
    pub fn camera_untouched(&self) -> bool {
        self.camera.is_some()
    }

    fn enter(&mut self, next: State) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        debug!("state {:?} -> {next:?}", self.state);
        self.state = next;
        // History is sized for the longest legal path.
        let _ = self.history.try_push(next);
    }

    /// Run the capture sequence from power-on to rest.
    pub fn run(&mut self) -> Outcome {
        self.power_on();

        if !self.await_launch() {
            return Outcome::Suspended;
        }

        match self.record_session() {
            Ok(report) => {
                self.power_down();
                Outcome::Completed(report)
            }
            Err(e) => self.halt(e),
        }
    }

    fn power_on(&mut self) {
        self.power.disable_brownout();
        info!("starting up");
        self.indicator.signal(Pattern::PowerOn);
    }

    /// Returns `false` when the device suspended instead of launching.
    fn await_launch(&mut self) -> bool {
        match self.config.launch_mode {
            LaunchMode::Immediate => {
                info!("immediate mode, recording without waiting for launch");
                self.enter(State::SessionSetup);
                return true;
            }
            LaunchMode::AwaitRelease | LaunchMode::DeepSleep => {}
        }

        let woken_by_trigger = self.power.wake_cause() == WakeCause::Trigger;
        if woken_by_trigger || self.trigger.level() == TriggerLevel::Released {
            info!(woken_by_trigger, "launch detected");
            self.enter(State::AlreadyReleased);
        } else {
            self.enter(State::ArmedWait);
            if self.config.launch_mode == LaunchMode::DeepSleep {
                info!("waiting for launch (suspending)");
                self.power.arm_trigger_wake();
                self.power.suspend();
                return false;
            }
            info!("waiting for launch (polling)");
            let poll = self.config.trigger_poll_interval;
            self.trigger.wait_for_release(&mut self.clock, poll, None);
            info!("launch detected");
        }
        self.indicator.signal(Pattern::TriggerConfirmed);
        self.enter(State::SessionSetup);
        true
    }

    fn record_session(&mut self) -> Result<RecordingReport, Error> {
        let session = self.store.create_session()?;
        let mut sink = self.store.open_container(&session)?;
        let path = session.id().container_path();
        info!("session {} ready, recording to {path}", session.id());
        self.indicator.signal(Pattern::Ready);
        self.enter(State::Recording);

        let source = match self.open_camera() {
            Ok(source) => source,
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    warn!("closing {path} after camera failure: {close_err}");
                }
                return Err(e);
            }
        };

        let report = self.record(session.id(), source, &mut sink);

        self.enter(State::Finalizing);
        match sink.close() {
            Ok(()) => info!("recording complete: {path}"),
            // The bytes already written are still on the medium.
            Err(e) => warn!("closing {path}: {e}"),
        }
        info!(
            frames = report.frames_appended,
            bytes = report.bytes_appended,
            unavailable = report.frames_unavailable,
            write_failures = report.write_failures,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "session {} finalized",
            report.session
        );
        self.indicator.signal(Pattern::RecordingDone);
        Ok(report)
    }

    fn open_camera(&mut self) -> Result<K::Source, Error> {
        let camera = self
            .camera
            .take()
            .ok_or(Error::CameraInitFailed(PlatformError::Message(
                "camera already opened",
            )))?;
        debug!("opening camera {}", camera.name());
        camera.open(&self.profile)
    }

    fn record<F: FrameSource>(
        &mut self,
        session: SessionId,
        mut source: F,
        sink: &mut S::Sink,
    ) -> RecordingReport {
        let mut report = RecordingReport::new(session);
        let window = RecordingWindow::open(&self.clock, self.config.record_duration);

        while window.is_open(self.clock.now()) {
            let Some(frame) = source.try_get_frame() else {
                report.count_unavailable();
                trace!("{}", Error::FrameUnavailable);
                continue;
            };

            let len = frame.len();
            match sink.append(frame.data()) {
                Ok(()) => {
                    debug!(
                        "appended frame {:06} ({len} bytes)",
                        report.frames_appended
                    );
                    report.frames_appended += 1;
                    report.bytes_appended += len as u64;
                }
                Err(e) => {
                    match e.severity() {
                        Severity::Transient => warn!("dropping frame: {e}"),
                        Severity::Fatal => error!("dropping frame, sink reported: {e}"),
                    }
                    report.count_write_failure();
                }
            }
            source.release(frame);
        }

        report.elapsed = window.elapsed(self.clock.now());
        report
    }

    fn power_down(&mut self) {
        self.enter(State::PowerDown);
        match self.config.rest_mode {
            RestMode::Suspend => {
                info!("end of recording, suspending until next trigger");
                self.power.arm_trigger_wake();
                self.power.suspend();
            }
            RestMode::Idle => info!("end of recording, idling"),
        }
    }

    fn halt(&mut self, e: Error) -> Outcome {
        error!("fatal: {e}");
        self.enter(State::FatalError);
        self.indicator.signal(Pattern::FatalError);
        Outcome::Halted(e)
    }
}
