/*!
    Benchmark inference models against decoded video.

    Frames come out of a [`FrameSource`] already scaled to the model's
    input geometry, get converted to an NHWC tensor, run through the
    model, and optionally flow on through an annotation callback into a
    [`VideoSink`]:

    ```ignore
    use framebench::{Runner, SourceConfig};

    let spec = model.input_spec();
    let geometry = spec.target_geometry().with_keep_aspect_ratio();
    let source = FrameSource::open("input.mkv", SourceConfig::new(geometry))?;

    let stats = Runner::new(source, model)
        .with_annotator(|index, frame, outputs| {
            // draw boxes / labels into frame
        })
        .with_sink(VideoSink::open("annotated.mkv", sink_config)?)
        .run()?;

    println!("[runner] {} frames, {:?} inferring", stats.frames, stats.inference_time);
    ```

    The model itself is a black box behind the [`Model`] trait; this crate
    owns only the plumbing and the timing.
*/

pub use framepipe_sink::{SinkConfig, VideoSink};
pub use framepipe_source::{FrameSource, SourceConfig};
pub use framepipe_types::{
    Error, PixelFormat, Pts, Rational, Result, TargetGeometry, VideoFrame,
};

mod model;
mod runner;
mod tensor;

pub use model::Model;
pub use runner::{RunStats, Runner};
pub use tensor::{frame_to_tensor, DType, Tensor, TensorData, TensorSpec};
