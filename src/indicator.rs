use core::time::Duration;

use crate::clock::Clock;

/// Device states the status indicator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    PowerOn,
    Ready,
    TriggerConfirmed,
    RecordingDone,
    FatalError,
}

/// How many times a [`Blink`] is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repeat {
    Times(u8),
    Forever,
}

/// On/off pulse train for one [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blink {
    pub repeat: Repeat,
    pub on: Duration,
    pub off: Duration,
}

impl Blink {
    const fn times(count: u8, on_ms: u64, off_ms: u64) -> Self {
        Self {
            repeat: Repeat::Times(count),
            on: Duration::from_millis(on_ms),
            off: Duration::from_millis(off_ms),
        }
    }

    /// Total time the pulse train takes, or `None` for a continuous pattern.
    pub fn duration(&self) -> Option<Duration> {
        match self.repeat {
            Repeat::Times(n) => Some((self.on + self.off) * u32::from(n)),
            Repeat::Forever => None,
        }
    }
}

impl Pattern {
    pub const fn blink(self) -> Blink {
        match self {
            Self::PowerOn => Blink::times(2, 200, 200),
            Self::Ready => Blink::times(1, 500, 100),
            Self::TriggerConfirmed => Blink::times(3, 100, 100),
            Self::RecordingDone => Blink::times(2, 100, 100),
            Self::FatalError => Blink {
                repeat: Repeat::Forever,
                on: Duration::from_millis(50),
                off: Duration::from_millis(50),
            },
        }
    }
}

/// Output-only sink for device status.
///
/// Signalling cannot fail. [`Pattern::FatalError`] is continuous: hardware
/// implementations never return from it.
pub trait StatusIndicator {
    fn signal(&mut self, pattern: Pattern);
}

impl<I: StatusIndicator + ?Sized> StatusIndicator for &mut I {
    fn signal(&mut self, pattern: Pattern) {
        (**self).signal(pattern)
    }
}

/// A single binary output line, e.g. the flash LED GPIO.
pub trait StatusLine {
    fn set(&mut self, on: bool);
}

/// Drives a [`StatusLine`] through the pulse train of each pattern.
#[derive(Debug)]
pub struct BlinkIndicator<L, C> {
    line: L,
    clock: C,
}

impl<L: StatusLine, C: Clock> BlinkIndicator<L, C> {
    pub fn new(mut line: L, clock: C) -> Self {
        line.set(false);
        Self { line, clock }
    }

    pub fn into_parts(self) -> (L, C) {
        (self.line, self.clock)
    }

    fn pulse(&mut self, blink: &Blink) {
        self.line.set(true);
        self.clock.sleep(blink.on);
        self.line.set(false);
        self.clock.sleep(blink.off);
    }
}

impl<L: StatusLine, C: Clock> StatusIndicator for BlinkIndicator<L, C> {
    fn signal(&mut self, pattern: Pattern) {
        let blink = pattern.blink();
        match blink.repeat {
            Repeat::Times(n) => {
                for _ in 0..n {
                    self.pulse(&blink);
                }
            }
            Repeat::Forever => loop {
                self.pulse(&blink);
            },
        }
    }
}
