/*!
    Pixel format types and plane layout.
*/

/**
    Video pixel formats.

    This is a subset of formats commonly encountered when feeding decoded
    frames to numeric models or a software encoder. Not all FFmpeg pixel
    formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Packed RGB, 24bpp (3-channel model input)
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Single-channel 8-bit luma (1-channel model input)
    Gray8,
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv420p | Self::Nv12 => 12,
            Self::Yuv422p => 16,
            Self::Yuv444p | Self::Rgb24 | Self::Bgr24 => 24,
            Self::Rgba | Self::Bgra => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Bgra | Self::Gray8 => false,
        }
    }

    /**
        Returns the number of data planes for this format.
    */
    pub const fn plane_count(self) -> usize {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 3,
            Self::Nv12 => 2,
            Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Bgra | Self::Gray8 => 1,
        }
    }

    /**
        Returns the layout of one plane as `(bytes_per_row, rows)` for a frame
        of the given dimensions.

        Chroma-subsampled dimensions round up, matching FFmpeg's layout for
        odd-sized frames.

        # Panics

        Panics if `plane` is out of range for this format.
    */
    pub const fn plane_layout(self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);
        match (self, plane) {
            (Self::Yuv420p, 0) => (w, h),
            (Self::Yuv420p, 1 | 2) => (half_w, half_h),
            (Self::Yuv422p, 0) => (w, h),
            (Self::Yuv422p, 1 | 2) => (half_w, h),
            (Self::Yuv444p, 0 | 1 | 2) => (w, h),
            (Self::Nv12, 0) => (w, h),
            (Self::Nv12, 1) => (half_w * 2, half_h),
            (Self::Gray8, 0) => (w, h),
            (Self::Rgb24 | Self::Bgr24, 0) => (w * 3, h),
            (Self::Rgba | Self::Bgra, 0) => (w * 4, h),
            _ => panic!("plane index out of range"),
        }
    }

    /**
        Returns the total byte size of a tightly-packed frame of the given
        dimensions in this format.
    */
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        (0..self.plane_count())
            .map(|p| {
                let (bytes_per_row, rows) = self.plane_layout(p, width, height);
                bytes_per_row * rows
            })
            .sum()
    }

    /**
        Returns the FFmpeg pixel format name.
    */
    pub const fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Nv12 => "nv12",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
            Self::Gray8 => "gray",
        }
    }
}
