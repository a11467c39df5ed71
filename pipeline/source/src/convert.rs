/*!
    Conversion from decoded FFmpeg frames to owned frame buffers.
*/

use ffmpeg_next::frame;

use framepipe_filter::from_pixel;
use framepipe_types::{Error, Pts, Rational, Result, VideoFrame};

/**
    Copy a decoded frame into an owned, tightly packed [`VideoFrame`].

    FFmpeg frames carry per-plane line padding (stride > bytes per row);
    the copy drops that padding so consumers can index the buffer with
    plain `width * bytes_per_pixel` arithmetic.
*/
pub fn frame_to_owned(frame: &frame::Video, time_base: Rational) -> Result<VideoFrame> {
    let format = from_pixel(frame.format()).ok_or_else(|| {
        Error::unsupported_format(format!("pixel format {:?}", frame.format()))
    })?;

    let width = frame.width();
    let height = frame.height();

    let mut data = Vec::with_capacity(format.frame_size(width, height));
    for plane in 0..format.plane_count() {
        let (bytes_per_row, rows) = format.plane_layout(plane, width, height);
        let stride = frame.stride(plane);
        let src = frame.data(plane);
        for row in 0..rows {
            let start = row * stride;
            data.extend_from_slice(&src[start..start + bytes_per_row]);
        }
    }

    Ok(VideoFrame::new(
        data,
        width,
        height,
        format,
        frame.pts().map(Pts),
        time_base,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framepipe_filter::to_pixel;
    use framepipe_types::PixelFormat;

    const TB: Rational = Rational { num: 1, den: 1000 };

    #[test]
    fn packed_rgb_drops_stride_padding() {
        // 3x2 RGB with whatever stride FFmpeg picks (usually padded past 9).
        let mut src = frame::Video::new(to_pixel(PixelFormat::Rgb24), 3, 2);
        let stride = src.stride(0);
        let data = src.data_mut(0);
        for row in 0..2 {
            for col in 0..9 {
                data[row * stride + col] = (row * 9 + col) as u8;
            }
        }
        src.set_pts(Some(7));

        let owned = frame_to_owned(&src, TB).unwrap();
        assert_eq!(owned.width, 3);
        assert_eq!(owned.height, 2);
        assert_eq!(owned.format, PixelFormat::Rgb24);
        assert_eq!(owned.pts, Some(Pts(7)));
        assert_eq!(owned.data, (0u8..18).collect::<Vec<_>>());
    }

    #[test]
    fn planar_yuv_copies_all_planes() {
        let mut src = frame::Video::new(to_pixel(PixelFormat::Yuv420p), 4, 4);
        for plane in 0..3 {
            let fill = (plane as u8 + 1) * 10;
            for byte in src.data_mut(plane) {
                *byte = fill;
            }
        }

        let owned = frame_to_owned(&src, TB).unwrap();
        assert_eq!(owned.data.len(), owned.expected_data_len());
        assert_eq!(&owned.data[..16], &[10u8; 16]);
        assert_eq!(&owned.data[16..20], &[20u8; 4]);
        assert_eq!(&owned.data[20..24], &[30u8; 4]);
    }

    #[test]
    fn missing_pts_is_preserved_as_none() {
        let src = frame::Video::new(to_pixel(PixelFormat::Gray8), 2, 2);
        let owned = frame_to_owned(&src, TB).unwrap();
        assert_eq!(owned.pts, None);
    }
}
