/*!
    Filter graph construction and execution.
*/

use ffmpeg_next::{ffi, filter, frame};

use framepipe_types::{Error, PixelFormat, Rational, Result};

use crate::pixfmt::to_pixel;
use crate::stage::{render_spec, FilterStage, FrameFormat};

/**
    Outcome of pulling from a filter graph's sink pad.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullStatus {
    /// A filtered frame was produced.
    Frame,
    /// The graph needs more input before it can produce a frame.
    NeedMore,
    /// The graph has been flushed and fully drained.
    Eof,
}

/**
    A configured FFmpeg filter graph with a single source pad (`in`) and a
    single sink pad (`out`).

    Built once from a stage plan and immutable afterwards. Construction
    either fully succeeds or fails with [`Error::Filter`]; a graph that
    failed to link or configure is never returned.
*/
pub struct FilterGraph {
    graph: filter::Graph,
}

impl FilterGraph {
    /**
        Build and validate a filter graph.

        `src` describes the frames that will be pushed in, `stages` is the
        plan from [`plan_stages`](crate::plan_stages), and `sink_format`
        constrains the sink pad's accepted pixel format (belt to the plan's
        trailing format stage).
    */
    pub fn build(
        src: FrameFormat,
        time_base: Rational,
        stages: &[FilterStage],
        sink_format: PixelFormat,
    ) -> Result<Self> {
        crate::init()?;

        let mut graph = filter::Graph::new();

        // Filtering runs inline on the pipeline thread.
        unsafe {
            ffi::av_opt_set_int(
                graph.as_mut_ptr().cast(),
                b"threads\0".as_ptr().cast(),
                1,
                0,
            );
        }

        let buffer = filter::find("buffer")
            .ok_or_else(|| Error::filter("missing filter primitive: buffer"))?;
        let buffersink = filter::find("buffersink")
            .ok_or_else(|| Error::filter("missing filter primitive: buffersink"))?;

        let args = format!(
            "video_size={}x{}:pix_fmt={}:time_base={}:pixel_aspect=1/1",
            src.width,
            src.height,
            src.format.ffmpeg_name(),
            time_base,
        );
        graph
            .add(&buffer, "in", &args)
            .map_err(|e| Error::filter(format!("create buffer source ({args}): {e}")))?;
        graph
            .add(&buffersink, "out", "")
            .map_err(|e| Error::filter(format!("create buffer sink: {e}")))?;

        graph
            .get("out")
            .ok_or_else(|| Error::filter("buffer sink missing after add"))?
            .set_pixel_format(to_pixel(sink_format));

        let spec = render_spec(stages);
        graph
            .output("in", 0)
            .and_then(|parser| parser.input("out", 0))
            .and_then(|parser| parser.parse(&spec))
            .map_err(|e| Error::filter(format!("parse filter chain '{spec}': {e}")))?;
        graph
            .validate()
            .map_err(|e| Error::filter(format!("configure filter chain '{spec}': {e}")))?;

        Ok(Self { graph })
    }

    /**
        Push a frame into the graph's source pad.

        The graph takes over the frame's buffer reference; the frame object
        itself stays valid and reusable (e.g. as a decoder receive buffer),
        but its contents must not be relied on after a successful push.
    */
    pub fn push(&mut self, frame: &frame::Video) -> Result<()> {
        self.graph
            .get("in")
            .ok_or_else(|| Error::filter("buffer source missing from graph"))?
            .source()
            .add(frame)
            .map_err(|e| Error::filter(format!("push frame into filter graph: {e}")))
    }

    /**
        Signal end-of-stream on the source pad so buffered frames drain.
    */
    pub fn flush(&mut self) -> Result<()> {
        self.graph
            .get("in")
            .ok_or_else(|| Error::filter("buffer source missing from graph"))?
            .source()
            .flush()
            .map_err(|e| Error::filter(format!("flush filter graph: {e}")))
    }

    /**
        Pull one filtered frame from the graph's sink pad into `out`.
    */
    pub fn pull(&mut self, out: &mut frame::Video) -> Result<PullStatus> {
        let mut sink = self
            .graph
            .get("out")
            .ok_or_else(|| Error::filter("buffer sink missing from graph"))?;
        match sink.sink().frame(out) {
            Ok(()) => Ok(PullStatus::Frame),
            // ffmpeg-next stores the un-negated errno in Error::Other.
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(PullStatus::NeedMore)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(PullStatus::Eof),
            Err(e) => Err(Error::filter(format!("pull frame from filter graph: {e}"))),
        }
    }
}

impl std::fmt::Debug for FilterGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterGraph").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::plan_stages;
    use framepipe_types::TargetGeometry;

    const TB: Rational = Rational { num: 1, den: 90000 };

    fn rgb_frame(width: u32, height: u32, pts: i64) -> frame::Video {
        let mut frame = frame::Video::new(to_pixel(PixelFormat::Rgb24), width, height);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for row in 0..height as usize {
            for col in 0..(width as usize * 3) {
                data[row * stride + col] = (row * 7 + col) as u8;
            }
        }
        frame.set_pts(Some(pts));
        frame
    }

    #[test]
    fn passthrough_graph_preserves_frames() {
        let src = FrameFormat::new(4, 4, PixelFormat::Rgb24);
        let mut graph = FilterGraph::build(src, TB, &[], PixelFormat::Rgb24).unwrap();

        graph.push(&rgb_frame(4, 4, 42)).unwrap();

        let mut out = frame::Video::empty();
        assert_eq!(graph.pull(&mut out).unwrap(), PullStatus::Frame);
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 4);
        assert_eq!(out.pts(), Some(42));
        assert_eq!(graph.pull(&mut out).unwrap(), PullStatus::NeedMore);
    }

    #[test]
    fn scale_and_convert_graph_produces_target_geometry() {
        let src = FrameFormat::new(4, 4, PixelFormat::Rgb24);
        let target = TargetGeometry::new(2, 2, PixelFormat::Gray8).resolve(4, 4);
        let stages = plan_stages(src, &target, false);
        let mut graph = FilterGraph::build(src, TB, &stages, PixelFormat::Gray8).unwrap();

        graph.push(&rgb_frame(4, 4, 0)).unwrap();

        let mut out = frame::Video::empty();
        assert_eq!(graph.pull(&mut out).unwrap(), PullStatus::Frame);
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
        assert_eq!(out.format(), to_pixel(PixelFormat::Gray8));
    }

    #[test]
    fn flush_then_pull_reports_eof() {
        let src = FrameFormat::new(4, 4, PixelFormat::Rgb24);
        let mut graph = FilterGraph::build(src, TB, &[], PixelFormat::Rgb24).unwrap();

        graph.flush().unwrap();

        let mut out = frame::Video::empty();
        assert_eq!(graph.pull(&mut out).unwrap(), PullStatus::Eof);
    }

    #[test]
    fn letterbox_graph_pads_with_black() {
        // 4x2 white source into 4x4: rows of padding above and below.
        let src = FrameFormat::new(4, 2, PixelFormat::Rgb24);
        let target = TargetGeometry::new(4, 4, PixelFormat::Rgb24).resolve(4, 2);
        let stages = plan_stages(src, &target, true);
        let mut graph = FilterGraph::build(src, TB, &stages, PixelFormat::Rgb24).unwrap();

        let mut white = frame::Video::new(to_pixel(PixelFormat::Rgb24), 4, 2);
        let stride = white.stride(0);
        let data = white.data_mut(0);
        for row in 0..2 {
            for col in 0..12 {
                data[row * stride + col] = 255;
            }
        }
        white.set_pts(Some(0));
        graph.push(&white).unwrap();

        let mut out = frame::Video::empty();
        assert_eq!(graph.pull(&mut out).unwrap(), PullStatus::Frame);
        assert_eq!((out.width(), out.height()), (4, 4));

        let stride = out.stride(0);
        let top_row = &out.data(0)[..12];
        let bottom_row = &out.data(0)[3 * stride..3 * stride + 12];
        assert!(top_row.iter().all(|&b| b < 20), "top row should be padding");
        assert!(
            bottom_row.iter().all(|&b| b < 20),
            "bottom row should be padding"
        );
        let middle_row = &out.data(0)[stride..stride + 12];
        assert!(
            middle_row.iter().all(|&b| b > 200),
            "content rows should stay white"
        );
    }
}
