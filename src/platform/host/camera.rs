use std::num::NonZeroU64;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::device::CameraDevice;
use crate::error::{Error, PlatformError};
use crate::frame::Frame;
use crate::mjpeg::{EOI, SOI};
use crate::platform::host::clock::SimClock;
use crate::stream::FrameSource;
use crate::types::{CaptureProfile, PixelFormat};

/// Bytes after SOI that carry the frame sequence number.
const SEQUENCE_BYTES: usize = 4;

/// Which capture attempts come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropSchedule {
    #[default]
    Never,
    /// Every n-th attempt (1-based) fails.
    Every(NonZeroU64),
    /// These attempt numbers (0-based) fail.
    At(Vec<u64>),
}

impl DropSchedule {
    fn drops(&self, attempt: u64) -> bool {
        match self {
            Self::Never => false,
            Self::Every(n) => (attempt + 1) % n.get() == 0,
            Self::At(attempts) => attempts.contains(&attempt),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimCameraConfig {
    /// Encoded size of every frame, markers included. At least 8 bytes.
    pub frame_len: usize,
    /// Sensor frame period.
    pub frame_interval: Duration,
    pub drops: DropSchedule,
    /// Make [`CameraDevice::open`] fail.
    pub fail_init: bool,
}

impl Default for SimCameraConfig {
    fn default() -> Self {
        Self {
            frame_len: 20_000,
            frame_interval: Duration::from_millis(67),
            drops: DropSchedule::Never,
            fail_init: false,
        }
    }
}

/// A camera producing synthetic JPEG-shaped frames on a [`SimClock`].
#[derive(Debug)]
pub struct SimCamera {
    config: SimCameraConfig,
    clock: SimClock,
}

impl SimCamera {
    pub fn new(config: SimCameraConfig, clock: SimClock) -> Self {
        Self { config, clock }
    }
}

impl CameraDevice for SimCamera {
    type Source = SimFrameSource;

    fn name(&self) -> &str {
        "simulated sensor"
    }

    fn open(self, profile: &CaptureProfile) -> Result<SimFrameSource, Error> {
        if self.config.fail_init {
            return Err(Error::CameraInitFailed(PlatformError::Message(
                "sensor not detected",
            )));
        }
        if profile.pixel_format != PixelFormat::Jpeg {
            return Err(Error::CameraInitFailed(PlatformError::Message(
                "only JPEG output can be recorded",
            )));
        }
        if profile.frame_buffers == 0 {
            return Err(Error::CameraInitFailed(PlatformError::Message(
                "at least one frame buffer is required",
            )));
        }
        let frame_len = self.config.frame_len.max(SOI.len() + SEQUENCE_BYTES + EOI.len());
        let pool = (0..profile.frame_buffers)
            .map(|_| Vec::with_capacity(frame_len))
            .collect();
        debug!(
            "sim camera open: {:?}, {} buffer(s) of {frame_len} bytes",
            profile.frame_size, profile.frame_buffers
        );
        let next_frame_at = self.clock.now() + self.config.frame_interval;
        Ok(SimFrameSource {
            frame_len,
            config: self.config,
            clock: self.clock,
            pool,
            buffer_count: profile.frame_buffers,
            next_frame_at,
            attempts: 0,
            sequence: 0,
        })
    }
}

/// Frame source with a fixed pool of reusable buffers.
#[derive(Debug)]
pub struct SimFrameSource {
    config: SimCameraConfig,
    clock: SimClock,
    frame_len: usize,
    pool: Vec<Vec<u8>>,
    buffer_count: usize,
    next_frame_at: Duration,
    attempts: u64,
    sequence: u32,
}

impl SimFrameSource {
    /// Capture attempts so far, successful or not.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Block until the sensor's next frame boundary.
    fn wait_for_exposure(&mut self) {
        let now = self.clock.now();
        if now < self.next_frame_at {
            self.clock.sleep(self.next_frame_at - now);
        }
        self.next_frame_at = self.clock.now() + self.config.frame_interval;
    }

    fn expose(&mut self, mut buf: Vec<u8>) -> PooledFrame {
        let sequence = self.sequence;
        self.sequence += 1;
        buf.clear();
        buf.extend_from_slice(&SOI);
        buf.extend_from_slice(&encode_sequence(sequence));
        let payload = self.frame_len - buf.len() - EOI.len();
        // Never 0xFF, so the body cannot contain a marker.
        buf.extend((0..payload).map(|i| ((sequence as usize + i) % 0xFF) as u8));
        buf.extend_from_slice(&EOI);
        PooledFrame {
            buf,
            sequence,
            timestamp: self.clock.now(),
        }
    }
}

impl FrameSource for SimFrameSource {
    type Frame = PooledFrame;

    fn try_get_frame(&mut self) -> Option<PooledFrame> {
        self.wait_for_exposure();
        let attempt = self.attempts;
        self.attempts += 1;
        if self.config.drops.drops(attempt) {
            return None;
        }
        let buf = self.pool.pop()?;
        Some(self.expose(buf))
    }

    fn release(&mut self, frame: PooledFrame) {
        debug_assert!(self.pool.len() < self.buffer_count);
        self.pool.push(frame.buf);
    }

    fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    fn outstanding(&self) -> usize {
        self.buffer_count - self.pool.len()
    }
}

/// A frame occupying one buffer of a [`SimFrameSource`] pool.
///
/// Dropping it instead of releasing it shrinks the pool for good.
#[derive(Debug)]
pub struct PooledFrame {
    buf: Vec<u8>,
    sequence: u32,
    timestamp: Duration,
}

impl PooledFrame {
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl Frame for PooledFrame {
    fn data(&self) -> &[u8] {
        &self.buf
    }

    fn timestamp(&self) -> Duration {
        self.timestamp
    }
}

/// Seven bits per byte keeps every byte below 0x80.
fn encode_sequence(sequence: u32) -> [u8; SEQUENCE_BYTES] {
    let mut out = [0; SEQUENCE_BYTES];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = ((sequence >> (7 * (SEQUENCE_BYTES - 1 - i))) & 0x7F) as u8;
    }
    out
}

/// Sequence number of a frame produced by [`SimFrameSource`].
pub fn frame_sequence(frame: &[u8]) -> Option<u32> {
    let bytes = frame.get(SOI.len()..SOI.len() + SEQUENCE_BYTES)?;
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F)),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mjpeg::is_complete_jpeg;
    use crate::types::MemoryClass;

    fn open(config: SimCameraConfig, memory: MemoryClass) -> (SimClock, SimFrameSource) {
        let clock = SimClock::new();
        let source = SimCamera::new(config, clock.clone())
            .open(&CaptureProfile::for_memory(memory))
            .unwrap();
        (clock, source)
    }

    #[test]
    fn frames_are_paced_by_sensor_interval() {
        let (clock, mut source) = open(SimCameraConfig::default(), MemoryClass::Extended);
        let frame = source.try_get_frame().unwrap();
        assert_eq!(frame.timestamp(), Duration::from_millis(67));
        assert_eq!(frame.len(), 20_000);
        assert!(is_complete_jpeg(frame.data()));
        assert_eq!(frame_sequence(frame.data()), Some(0));
        source.release(frame);

        let frame = source.try_get_frame().unwrap();
        assert_eq!(clock.now(), Duration::from_millis(134));
        assert_eq!(frame_sequence(frame.data()), Some(1));
        source.release(frame);
    }

    #[test]
    fn exhausted_pool_yields_none_until_release() {
        let (_clock, mut source) = open(SimCameraConfig::default(), MemoryClass::Extended);
        assert_eq!(source.buffer_count(), 2);
        let a = source.try_get_frame().unwrap();
        let b = source.try_get_frame().unwrap();
        assert_eq!(source.outstanding(), 2);
        assert!(source.try_get_frame().is_none());

        source.release(a);
        let c = source.try_get_frame().unwrap();
        assert_eq!(frame_sequence(c.data()), Some(2));
        source.release(b);
        source.release(c);
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn scheduled_drops_return_none() {
        let config = SimCameraConfig {
            drops: DropSchedule::Every(NonZeroU64::new(3).unwrap()),
            ..Default::default()
        };
        let (_clock, mut source) = open(config, MemoryClass::Internal);
        let mut got = Vec::new();
        for _ in 0..6 {
            match source.try_get_frame() {
                Some(frame) => {
                    got.push(frame.sequence());
                    source.release(frame);
                }
                None => got.push(u32::MAX),
            }
        }
        assert_eq!(got, [0, 1, u32::MAX, 2, 3, u32::MAX]);
        assert_eq!(source.attempts(), 6);
    }

    #[test]
    fn init_failure_is_reported() {
        let config = SimCameraConfig {
            fail_init: true,
            ..Default::default()
        };
        let err = SimCamera::new(config, SimClock::new())
            .open(&CaptureProfile::for_memory(MemoryClass::Internal))
            .unwrap_err();
        assert!(matches!(err, Error::CameraInitFailed(_)));
    }

    #[test]
    fn sequence_survives_large_values() {
        for seq in [0, 1, 127, 128, 255, 256, 0x0FFF_FFFF] {
            let mut frame = SOI.to_vec();
            frame.extend_from_slice(&encode_sequence(seq));
            assert!(frame[2..].iter().all(|&b| b != 0xFF));
            assert_eq!(frame_sequence(&frame), Some(seq));
        }
    }
}
