/*!
    Video frame sources for the framepipe crate ecosystem.

    A [`FrameSource`] opens a container (or an image sequence via a demuxer
    hint), binds the first video stream, and yields decoded frames already
    scaled, letterboxed, and pixel-format-converted to a caller-chosen
    target geometry:

    ```ignore
    use framepipe_source::{FrameSource, SourceConfig};
    use framepipe_types::{PixelFormat, TargetGeometry};

    let geometry = TargetGeometry::new(224, 224, PixelFormat::Rgb24)
        .with_keep_aspect_ratio();
    let mut source = FrameSource::open("input.mkv", SourceConfig::new(geometry))?;

    while let Some(frame) = source.next_frame()? {
        // frame is an owned, tightly packed 224x224 RGB buffer
    }
    ```

    Decoding is strict about corrupt input (a damaged unit aborts its own
    decode instead of concealing the damage) but lenient about continuing:
    per-frame failures are logged to stderr and the stream moves on. End of
    stream drains the decoder and filter graph, then reports `Ok(None)`.
*/

pub use framepipe_types::{Error, PixelFormat, Rational, Result, VideoFrame};

mod config;
mod convert;
mod source;

pub use config::SourceConfig;
pub use convert::frame_to_owned;
pub use source::FrameSource;
