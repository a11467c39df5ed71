/*!
    Frame filter graphs for the framepipe crate ecosystem.

    This crate turns a small declarative plan (scale, letterbox pad, pixel
    format convert) into a configured FFmpeg filter graph with one source
    pad and one sink pad. Both the decode side and the encode side of a
    pipeline build their graphs here; they differ only in which stages the
    plan contains.

    # Planning

    Stage planning is pure and FFmpeg-free:

    ```ignore
    use framepipe_filter::{plan_stages, FrameFormat};
    use framepipe_types::{PixelFormat, TargetGeometry};

    let src = FrameFormat::new(1920, 1080, PixelFormat::Yuv420p);
    let target = TargetGeometry::new(224, 224, PixelFormat::Rgb24)
        .with_keep_aspect_ratio()
        .resolve(src.width, src.height);

    // scale → pad → format, in that fixed order
    let stages = plan_stages(src, &target, true);
    ```

    # Building and running

    ```ignore
    use framepipe_filter::FilterGraph;

    let mut graph = FilterGraph::build(src, time_base, &stages, target.format)?;

    graph.push(&decoded_frame)?;
    let mut filtered = ffmpeg_next::frame::Video::empty();
    while let PullStatus::Frame = graph.pull(&mut filtered)? {
        // use filtered
    }
    ```

    A graph with an empty plan passes frames through unchanged. Graphs are
    immutable once built; construction either fully succeeds or returns a
    [`Error::Filter`](framepipe_types::Error), never a partially-linked
    graph.
*/

pub use framepipe_types::{Error, PixelFormat, Rational, Result};

mod graph;
mod pixfmt;
mod stage;

pub use graph::{FilterGraph, PullStatus};
pub use pixfmt::{from_pixel, to_pixel};
pub use stage::{plan_stages, render_spec, FilterStage, FrameFormat};

use std::sync::OnceLock;

static FFMPEG_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/**
    Initialize the underlying media library.

    Process-wide and idempotent: the first call performs registration, every
    later call returns the stored outcome. Called by every pipeline
    constructor, so consumers rarely need to call it directly.
*/
pub fn init() -> Result<()> {
    FFMPEG_INIT
        .get_or_init(|| ffmpeg_next::init().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| Error::codec(e.clone()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }
}
