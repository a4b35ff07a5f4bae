/// Pixel formats a capture profile can request from the sensor.
///
/// Only [`PixelFormat::Jpeg`] produces frames that can be appended to a
/// motion-JPEG container as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    Jpeg,
    Rgb565,
    Yuv422,
    Grayscale,
}

/// Sensor output resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FrameSize {
    /// 640x480
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    /// 1280x1024
    Sxga,
    /// 1600x1200
    Uxga,
}

impl FrameSize {
    pub const fn size(&self) -> Size {
        let (width, height) = match self {
            Self::Vga => (640, 480),
            Self::Svga => (800, 600),
            Self::Xga => (1024, 768),
            Self::Sxga => (1280, 1024),
            Self::Uxga => (1600, 1200),
        };
        Size { width, height }
    }
}

/// Pixel dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// A rational number (numerator / denominator).
///
/// Used to represent frame rates (e.g. 15/1 = 15 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub numerator: u32,
    pub denominator: u32,
}

impl Ratio {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Where the camera driver allocates its frame buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBufferLocation {
    /// External pseudo-static RAM.
    Psram,
    /// Internal RAM.
    Dram,
}

/// How the driver hands out frames when more than one buffer is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabMode {
    /// Fill buffers only when one is free.
    WhenEmpty,
    /// Always hand out the most recent frame, overwriting stale ones.
    Latest,
}

/// Memory available to the frame buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryClass {
    /// External RAM is present.
    Extended,
    /// Internal RAM only.
    Internal,
}

/// Image-quality knobs applied once after the sensor is initialised.
///
/// Opaque to the capture state machine; only the camera backend reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTuning {
    /// -2 (dark) to +2 (bright).
    pub brightness: i8,
    /// -2 to +2.
    pub contrast: i8,
    /// -2 to +2.
    pub saturation: i8,
    pub auto_white_balance: bool,
    pub auto_white_balance_gain: bool,
    pub auto_exposure: bool,
    /// -2 to +2.
    pub exposure_level: i8,
    /// 0 to 1200, higher is brighter.
    pub exposure_target: u16,
    pub auto_gain: bool,
    pub black_pixel_correction: bool,
    pub white_pixel_correction: bool,
    pub gamma_correction: bool,
    pub lens_correction: bool,
    pub horizontal_mirror: bool,
    pub vertical_flip: bool,
    pub downsize: bool,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0,
            saturation: 0,
            auto_white_balance: true,
            auto_white_balance_gain: true,
            auto_exposure: true,
            exposure_level: 0,
            exposure_target: 300,
            auto_gain: true,
            black_pixel_correction: false,
            white_pixel_correction: true,
            gamma_correction: true,
            lens_correction: true,
            horizontal_mirror: false,
            vertical_flip: false,
            downsize: true,
        }
    }
}

/// Everything the camera backend needs to start producing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProfile {
    pub pixel_format: PixelFormat,
    pub frame_size: FrameSize,
    /// Lower is better quality (and larger frames).
    pub jpeg_quality: u8,
    /// Number of frame buffers in the pool.
    pub frame_buffers: usize,
    pub buffer_location: FrameBufferLocation,
    pub grab_mode: GrabMode,
    pub xclk_hz: u32,
    pub tuning: SensorTuning,
}

impl CaptureProfile {
    /// Pick the highest profile the available memory can hold.
    pub fn for_memory(memory: MemoryClass) -> Self {
        let (frame_size, jpeg_quality, frame_buffers, buffer_location) = match memory {
            MemoryClass::Extended => (FrameSize::Uxga, 15, 2, FrameBufferLocation::Psram),
            MemoryClass::Internal => (FrameSize::Svga, 12, 1, FrameBufferLocation::Dram),
        };
        Self {
            pixel_format: PixelFormat::Jpeg,
            frame_size,
            jpeg_quality,
            frame_buffers,
            buffer_location,
            grab_mode: GrabMode::Latest,
            xclk_hz: 20_000_000,
            tuning: SensorTuning::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn profile_follows_memory_class() {
        let high = CaptureProfile::for_memory(MemoryClass::Extended);
        assert_eq!(high.frame_size, FrameSize::Uxga);
        assert_eq!(high.frame_buffers, 2);
        assert_eq!(high.buffer_location, FrameBufferLocation::Psram);

        let low = CaptureProfile::for_memory(MemoryClass::Internal);
        assert_eq!(low.frame_size, FrameSize::Svga);
        assert_eq!(low.jpeg_quality, 12);
        assert_eq!(low.frame_buffers, 1);
        assert_eq!(low.frame_size.size(), Size { width: 800, height: 600 });
    }
}
