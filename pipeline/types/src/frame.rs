/*!
    Decoded frame type.
*/

use crate::{PixelFormat, Pts, Rational};

/**
    A decoded video frame.

    Contains raw pixel data in the format specified by `format`, tightly
    packed: every plane's rows are contiguous with no stride padding, and
    planes follow each other in plane order. The frame is uniquely owned by
    whoever holds it; releasing it is just dropping it.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Raw pixel data, planes concatenated, rows tightly packed.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            time_base,
        }
    }

    /**
        Create a black (zeroed) frame of the given geometry.

        Note that zeroed YUV data is green, not black, but callers producing
        synthetic frames generally overwrite the data anyway.
    */
    pub fn blank(width: u32, height: u32, format: PixelFormat, time_base: Rational) -> Self {
        Self::new(
            vec![0u8; format.frame_size(width, height)],
            width,
            height,
            format,
            None,
            time_base,
        )
    }

    /**
        Returns the expected data length in bytes for this frame's geometry.
    */
    pub fn expected_data_len(&self) -> usize {
        self.format.frame_size(self.width, self.height)
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

// Ensure frames are Send + Sync
static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
