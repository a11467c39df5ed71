/*!
    Pixel format mapping between framepipe and FFmpeg.
*/

use ffmpeg_next::format::Pixel;

use framepipe_types::PixelFormat;

/**
    Convert a framepipe pixel format to the FFmpeg equivalent.
*/
pub fn to_pixel(format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Gray8 => Pixel::GRAY8,
    }
}

/**
    Convert an FFmpeg pixel format to the framepipe equivalent.

    Returns `None` for formats outside the supported subset; callers
    typically surface that as an unsupported-format error.
*/
pub fn from_pixel(pixel: Pixel) -> Option<PixelFormat> {
    match pixel {
        Pixel::YUV420P | Pixel::YUVJ420P => Some(PixelFormat::Yuv420p),
        Pixel::YUV422P | Pixel::YUVJ422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P | Pixel::YUVJ444P => Some(PixelFormat::Yuv444p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::GRAY8 => Some(PixelFormat::Gray8),
        _ => None,
    }
}
