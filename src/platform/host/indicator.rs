use tracing::{error, info};

use crate::indicator::{Pattern, Repeat, StatusIndicator};

/// Shows blink patterns as log lines and remembers them.
#[derive(Debug, Clone, Default)]
pub struct LogIndicator {
    shown: Vec<Pattern>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns signalled so far, oldest first.
    pub fn shown(&self) -> &[Pattern] {
        &self.shown
    }
}

impl StatusIndicator for LogIndicator {
    fn signal(&mut self, pattern: Pattern) {
        let blink = pattern.blink();
        match blink.repeat {
            Repeat::Times(n) => info!(
                "indicator {pattern:?}: {n} x {}ms on / {}ms off",
                blink.on.as_millis(),
                blink.off.as_millis()
            ),
            Repeat::Forever => error!(
                "indicator {pattern:?}: continuous {}ms on / {}ms off",
                blink.on.as_millis(),
                blink.off.as_millis()
            ),
        }
        self.shown.push(pattern);
    }
}
