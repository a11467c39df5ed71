/*!
    H.264 encoding and Matroska muxing.
*/

use std::path::Path;

use ffmpeg_next::{codec, encoder, ffi, format, frame, Dictionary, Packet};

use framepipe_filter::{to_pixel, FilterGraph, FilterStage, FrameFormat, PullStatus};
use framepipe_types::{Error, PixelFormat, Rational, Result, VideoFrame};

use crate::config::{
    SinkConfig, CONTAINER_NAME, ENCODER_NAME, GOP_SIZE, MAX_B_FRAMES, PRESET, PROFILE, QMAX,
    QMIN, QP, REFERENCE_FRAMES,
};

/// libx264 encodes 4:2:0 regardless of what comes in.
const ENCODE_FORMAT: PixelFormat = PixelFormat::Yuv420p;

/**
    An encoder + muxer writing owned frames to a Matroska file.

    The container header is committed during [`open`](VideoSink::open);
    [`close`](VideoSink::close) writes the trailer exactly once and also
    runs on drop, so every exit path leaves a finalized file.
*/
pub struct VideoSink {
    output: format::context::Output,
    encoder: encoder::video::Encoder,
    /// Present when submitted frames need pixel-format conversion.
    graph: Option<FilterGraph>,
    config: SinkConfig,
    stream_time_base: Rational,
    flushed: bool,
    trailer_written: bool,
    packet: Packet,
    filtered: frame::Video,
}

impl VideoSink {
    /**
        Create the output file, open the encoder, and commit the container
        header.

        The encoder is always [`ENCODER_NAME`] found by name and the
        container is always [`CONTAINER_NAME`]; a missing encoder fails the
        open. When `config.input_format` is not 4:2:0 a one-stage
        format-convert graph is built. Any failure here leaves no usable
        partial object (the incomplete file may remain on disk).
    */
    pub fn open(path: impl AsRef<Path>, config: SinkConfig) -> Result<Self> {
        framepipe_filter::init()?;

        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data("sink dimensions must be nonzero"));
        }

        let path = path.as_ref();
        let mut output = format::output_as(&path, CONTAINER_NAME)
            .map_err(|e| Error::codec(format!("create {}: {e}", path.display())))?;

        let codec = encoder::find_by_name(ENCODER_NAME)
            .ok_or_else(|| Error::codec(format!("encoder '{ENCODER_NAME}' not available")))?;

        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let mut stream = output
            .add_stream(codec)
            .map_err(|e| Error::codec(format!("add output stream: {e}")))?;
        let stream_index = stream.index();
        stream.set_time_base(ffmpeg_rational(config.time_base));

        let mut settings = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| Error::codec(format!("configure encoder: {e}")))?;
        settings.set_width(config.width);
        settings.set_height(config.height);
        settings.set_format(to_pixel(ENCODE_FORMAT));
        settings.set_time_base(ffmpeg_rational(config.time_base));
        settings.set_gop(GOP_SIZE);
        settings.set_max_b_frames(MAX_B_FRAMES);
        settings.set_qmin(QMIN);
        settings.set_qmax(QMAX);
        settings.set_threading(codec::threading::Config {
            kind: codec::threading::Type::Frame,
            count: 1,
            ..Default::default()
        });
        unsafe {
            (*settings.as_mut_ptr()).refs = REFERENCE_FRAMES;
        }
        if global_header {
            settings.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut options = Dictionary::new();
        options.set("preset", PRESET);
        options.set("profile", PROFILE);
        options.set("qp", QP);
        let opened = settings
            .open_as_with(codec, options)
            .map_err(|e| Error::codec(format!("open encoder '{ENCODER_NAME}': {e}")))?;

        stream.set_parameters(&opened);
        drop(stream);

        output
            .write_header()
            .map_err(|e| Error::codec(format!("write container header: {e}")))?;

        let tb = output
            .stream(stream_index)
            .ok_or_else(|| Error::codec("output stream disappeared"))?
            .time_base();
        let stream_time_base = Rational::new(tb.numerator(), tb.denominator());

        let graph = if config.input_format == ENCODE_FORMAT {
            None
        } else {
            let src = FrameFormat::new(config.width, config.height, config.input_format);
            // Convert only; the sink never scales or pads.
            let stages = [FilterStage::Format(ENCODE_FORMAT)];
            Some(FilterGraph::build(
                src,
                config.time_base,
                &stages,
                ENCODE_FORMAT,
            )?)
        };

        Ok(Self {
            output,
            encoder: opened,
            graph,
            config,
            stream_time_base,
            flushed: false,
            trailer_written: false,
            packet: Packet::empty(),
            filtered: frame::Video::empty(),
        })
    }

    /**
        Encode one frame, or flush with `None`.

        `Some(frame)` converts through the graph when one is present (the
        caller keeps ownership of its frame) and writes every packet the
        encoder emits; zero packets out for one frame in is normal. Each
        packet's pts and dts are forced to the source frame's pts before
        being rescaled to the muxer's time base, since x264 rewrites very
        large timestamps.

        `None` drains delayed packets via encoder end-of-stream. Only
        meaningful for configurations that buffer frames; idempotent.
    */
    pub fn encode(&mut self, frame: Option<&VideoFrame>) -> Result<()> {
        match frame {
            Some(frame) => self.encode_one(frame),
            None => self.flush(),
        }
    }

    /**
        Finalize the output: flush the encoder and write the container
        trailer exactly once.

        Safe to call on already-flushed or already-closed sinks; also
        invoked from `Drop`.
    */
    pub fn close(&mut self) -> Result<()> {
        if self.trailer_written {
            return Ok(());
        }
        self.flush()?;
        self.output
            .write_trailer()
            .map_err(|e| Error::codec(format!("write container trailer: {e}")))?;
        self.trailer_written = true;
        Ok(())
    }

    fn encode_one(&mut self, frame: &VideoFrame) -> Result<()> {
        if self.flushed {
            return Err(Error::invalid_data("sink already flushed"));
        }
        if frame.width != self.config.width
            || frame.height != self.config.height
            || frame.format != self.config.input_format
        {
            return Err(Error::invalid_data(format!(
                "frame {}x{} {:?} does not match sink {}x{} {:?}",
                frame.width,
                frame.height,
                frame.format,
                self.config.width,
                self.config.height,
                self.config.input_format,
            )));
        }
        if frame.data.len() != frame.expected_data_len() {
            return Err(Error::invalid_data(format!(
                "frame buffer is {} bytes, expected {}",
                frame.data.len(),
                frame.expected_data_len(),
            )));
        }

        let forced_pts = frame.pts.map(i64::from);
        let staged = stage_frame(frame);

        match &mut self.graph {
            Some(graph) => {
                graph.push(&staged)?;
                loop {
                    match graph.pull(&mut self.filtered)? {
                        PullStatus::Frame => {
                            send_frame(&mut self.encoder, &self.filtered)?;
                            write_packets(
                                &mut self.encoder,
                                &mut self.packet,
                                &mut self.output,
                                forced_pts,
                                self.config.time_base,
                                self.stream_time_base,
                            )?;
                        }
                        PullStatus::NeedMore | PullStatus::Eof => break,
                    }
                }
            }
            None => {
                send_frame(&mut self.encoder, &staged)?;
                write_packets(
                    &mut self.encoder,
                    &mut self.packet,
                    &mut self.output,
                    forced_pts,
                    self.config.time_base,
                    self.stream_time_base,
                )?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;
        self.encoder
            .send_eof()
            .map_err(|e| Error::codec(format!("flush encoder: {e}")))?;
        // Delayed packets already carry their own timestamps.
        write_packets(
            &mut self.encoder,
            &mut self.packet,
            &mut self.output,
            None,
            self.config.time_base,
            self.stream_time_base,
        )
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        if !self.trailer_written {
            if let Err(e) = self.close() {
                eprintln!("[sink] close on drop failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for VideoSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSink")
            .field("config", &self.config)
            .field("converting", &self.graph.is_some())
            .field("flushed", &self.flushed)
            .field("trailer_written", &self.trailer_written)
            .finish_non_exhaustive()
    }
}

/// Copy a tightly packed frame into a freshly allocated FFmpeg frame,
/// re-introducing whatever per-plane stride the allocator picked.
fn stage_frame(frame: &VideoFrame) -> frame::Video {
    let mut staged = frame::Video::new(to_pixel(frame.format), frame.width, frame.height);
    let mut offset = 0;
    for plane in 0..frame.format.plane_count() {
        let (bytes_per_row, rows) = frame.format.plane_layout(plane, frame.width, frame.height);
        let stride = staged.stride(plane);
        let dst = staged.data_mut(plane);
        for row in 0..rows {
            let src = &frame.data[offset..offset + bytes_per_row];
            dst[row * stride..row * stride + bytes_per_row].copy_from_slice(src);
            offset += bytes_per_row;
        }
    }
    staged.set_pts(frame.pts.map(i64::from));
    staged
}

fn send_frame(encoder: &mut encoder::video::Encoder, frame: &frame::Video) -> Result<()> {
    encoder
        .send_frame(frame)
        .map_err(|e| Error::codec(format!("encode frame: {e}")))
}

/// Drain every packet the encoder currently has and write it out.
fn write_packets(
    encoder: &mut encoder::video::Encoder,
    packet: &mut Packet,
    output: &mut format::context::Output,
    forced_pts: Option<i64>,
    encoder_time_base: Rational,
    stream_time_base: Rational,
) -> Result<()> {
    loop {
        match encoder.receive_packet(packet) {
            Ok(()) => {
                packet.set_stream(0);
                if let Some(pts) = forced_pts {
                    packet.set_pts(Some(pts));
                    packet.set_dts(Some(pts));
                }
                packet.rescale_ts(
                    ffmpeg_rational(encoder_time_base),
                    ffmpeg_rational(stream_time_base),
                );
                packet
                    .write_interleaved(output)
                    .map_err(|e| Error::codec(format!("write packet: {e}")))?;
            }
            // ffmpeg-next stores the un-negated errno in Error::Other.
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => return Ok(()),
            Err(ffmpeg_next::Error::Eof) => return Ok(()),
            Err(e) => return Err(Error::codec(format!("receive packet: {e}"))),
        }
    }
}

fn ffmpeg_rational(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}
