/*!
    The benchmark loop.
*/

use std::time::{Duration, Instant};

use framepipe_sink::VideoSink;
use framepipe_source::FrameSource;
use framepipe_types::{Error, Result, VideoFrame};

use crate::model::Model;
use crate::tensor::{frame_to_tensor, Tensor};

/**
    Totals accumulated over one run.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Successfully decoded (and inferred) frames.
    pub frames: u64,
    /// Wall time spent inside `Model::infer`, summed over all frames.
    pub inference_time: Duration,
}

impl RunStats {
    /// Mean wall time per inference, `None` before the first frame.
    pub fn mean_inference_time(&self) -> Option<Duration> {
        (self.frames > 0).then(|| self.inference_time / self.frames as u32)
    }
}

type AnnotateFn = Box<dyn FnMut(u64, &mut VideoFrame, &[Tensor])>;

/**
    Single-threaded pull-based benchmark loop.

    Decode, infer, optionally annotate, optionally re-encode, one frame
    at a time. Only inference is timed; decode and encode cost is the
    pipeline's own business.
*/
pub struct Runner<M: Model> {
    source: FrameSource,
    model: M,
    sink: Option<VideoSink>,
    annotate: Option<AnnotateFn>,
}

impl<M: Model> Runner<M> {
    /**
        Create a runner over an opened source.

        The source must already be configured to the model's input
        geometry (see [`TensorSpec::target_geometry`](crate::TensorSpec));
        `run` verifies the match before pulling any frame.
    */
    pub fn new(source: FrameSource, model: M) -> Self {
        Self {
            source,
            model,
            sink: None,
            annotate: None,
        }
    }

    /**
        Re-encode every (possibly annotated) frame into `sink`.
    */
    pub fn with_sink(mut self, sink: VideoSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /**
        Draw model outputs back into each frame before it reaches the sink.

        Called with the frame index (counting successfully decoded frames
        from zero), the frame, and the model's output tensors.
    */
    pub fn with_annotator(
        mut self,
        annotate: impl FnMut(u64, &mut VideoFrame, &[Tensor]) + 'static,
    ) -> Self {
        self.annotate = Some(Box::new(annotate));
        self
    }

    /**
        Run to end of stream.

        A model inference failure aborts the run; per-frame decode
        problems were already skipped inside the source. On completion the
        sink (when present) is flushed and closed.
    */
    pub fn run(mut self) -> Result<RunStats> {
        let spec = self.model.input_spec();
        if (self.source.width() as usize, self.source.height() as usize)
            != (spec.width, spec.height)
            || self.source.format() != spec.pixel_format()
        {
            return Err(Error::invalid_data(format!(
                "source produces {}x{} {:?}, model expects {}x{} {:?}",
                self.source.width(),
                self.source.height(),
                self.source.format(),
                spec.width,
                spec.height,
                spec.pixel_format(),
            )));
        }

        let mut stats = RunStats::default();
        while let Some(mut frame) = self.source.next_frame()? {
            let input = frame_to_tensor(&frame, &spec);

            let started = Instant::now();
            let outputs = self.model.infer(&input)?;
            stats.inference_time += started.elapsed();

            if let Some(annotate) = &mut self.annotate {
                annotate(stats.frames, &mut frame, &outputs);
            }
            if let Some(sink) = &mut self.sink {
                sink.encode(Some(&frame))?;
            }
            stats.frames += 1;
        }

        if let Some(sink) = &mut self.sink {
            sink.encode(None)?;
            sink.close()?;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_inference_time_is_none_before_first_frame() {
        assert_eq!(RunStats::default().mean_inference_time(), None);
    }

    #[test]
    fn mean_inference_time_divides_by_frames() {
        let stats = RunStats {
            frames: 4,
            inference_time: Duration::from_millis(100),
        };
        assert_eq!(stats.mean_inference_time(), Some(Duration::from_millis(25)));
    }
}
