/*!
    Sink configuration types.
*/

use framepipe_types::{PixelFormat, Rational};

/// Encoder selected by name; never left to container defaults.
pub const ENCODER_NAME: &str = "libx264";

/// Output container, regardless of the input's container.
pub const CONTAINER_NAME: &str = "matroska";

/// Every frame is an I- or P-frame keyframe candidate; no reordering.
pub const GOP_SIZE: u32 = 100;
pub const MAX_B_FRAMES: usize = 0;
pub const REFERENCE_FRAMES: i32 = 1;

/// Constant-quantizer settings tuned for fast deterministic output.
pub const QMIN: i32 = 0;
pub const QMAX: i32 = 20;
pub const QP: &str = "20";
pub const PRESET: &str = "fast";
pub const PROFILE: &str = "baseline";

/**
    Configuration for a [`VideoSink`](crate::VideoSink).

    The sink encodes at exactly these dimensions; it converts pixel
    formats but never scales or pads.
*/
#[derive(Clone, Copy, Debug)]
pub struct SinkConfig {
    /// Pixel format of the frames the caller will submit.
    pub input_format: PixelFormat,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Time base the submitted frames' pts are expressed in.
    pub time_base: Rational,
}

impl SinkConfig {
    /**
        Create a new sink config.
    */
    pub fn new(input_format: PixelFormat, width: u32, height: u32, time_base: Rational) -> Self {
        Self {
            input_format,
            width,
            height,
            time_base,
        }
    }
}
