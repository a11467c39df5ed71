/*!
    Video sinks for the framepipe crate ecosystem.

    A [`VideoSink`] takes owned frames and writes an H.264 stream in a
    Matroska container, converting pixel format on the way in when the
    frames are not already YUV 4:2:0:

    ```ignore
    use framepipe_sink::{SinkConfig, VideoSink};
    use framepipe_types::PixelFormat;

    let config = SinkConfig::new(PixelFormat::Rgb24, 224, 224, time_base);
    let mut sink = VideoSink::open("annotated.mkv", config)?;

    for frame in frames {
        sink.encode(Some(&frame))?;
    }
    sink.encode(None)?; // drain delayed packets
    sink.close()?;
    ```

    The encoder settings are deterministic (named codec, fixed quantizer
    range, no B-frames) so the same input always produces a comparable
    output. `close` is idempotent and also runs on drop, so the container
    trailer is written on every exit path.
*/

pub use framepipe_types::{Error, PixelFormat, Rational, Result, VideoFrame};

mod config;
mod sink;

pub use config::SinkConfig;
pub use sink::VideoSink;
