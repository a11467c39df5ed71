/*!
    Container demuxing and video decoding.
*/

use std::ffi::CString;
use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{codec, ffi, format, frame, media, Packet};

use framepipe_filter::{from_pixel, plan_stages, FilterGraph, FrameFormat, PullStatus};
use framepipe_types::{Error, PixelFormat, Rational, ResolvedGeometry, Result, VideoFrame};

use crate::config::SourceConfig;
use crate::convert::frame_to_owned;

/// Wait between retries when the demuxer reports it has no packet yet.
const READ_RETRY_DELAY: Duration = Duration::from_micros(100);

/// Fallback when the bound stream carries no usable time base.
const DEFAULT_TIME_BASE: Rational = Rational { num: 1, den: 90000 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    /// Reading packets and feeding the decoder.
    Reading,
    /// Demuxer hit end of stream; draining buffered decoder frames.
    Draining,
    /// Decoder fully drained; draining buffered filter-graph frames.
    Flushed,
    /// Everything drained.
    Done,
}

/**
    A demuxer + decoder + filter pipeline that yields owned video frames
    at a fixed target geometry.

    Opened via [`FrameSource::open`]; frames are pulled one at a time with
    [`FrameSource::next_frame`] until it returns `Ok(None)`. All native
    resources are released on drop.
*/
pub struct FrameSource {
    input: format::context::Input,
    decoder: codec::decoder::Video,
    graph: FilterGraph,
    stream_index: usize,
    geometry: ResolvedGeometry,
    time_base: Rational,
    stage: Stage,
    // Reused across calls so the hot loop allocates nothing.
    packet: Packet,
    decoded: frame::Video,
    filtered: frame::Video,
}

impl FrameSource {
    /**
        Open a container and bind its first decodable video stream.

        Streams whose codec probing failed to identify are logged and
        skipped in favor of the next video stream.

        The target geometry in `config` is resolved against the stream's
        native dimensions exactly once, before any frame is produced. Any
        failure here (unknown demuxer hint, I/O, no video stream,
        unsupported decoder pixel format, codec open, filter graph
        construction) fails the open; no partially-usable source survives.
    */
    pub fn open(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        framepipe_filter::init()?;

        let input = open_input(path.as_ref(), config.format_hint.as_deref())?;

        let mut stream_index = None;
        for stream in input.streams() {
            let medium = stream.parameters().medium();
            let codec_id = stream.parameters().id();
            if stream_index.is_none() && bindable_video_stream(medium, codec_id) {
                stream_index = Some(stream.index());
            } else {
                eprintln!("[source] ignoring {:?} stream #{}", medium, stream.index());
            }
        }
        let stream_index =
            stream_index.ok_or_else(|| Error::invalid_data("no video stream in input"))?;
        let stream = input
            .stream(stream_index)
            .ok_or_else(|| Error::invalid_data("bound stream disappeared"))?;

        let tb = stream.time_base();
        let time_base = if tb.denominator() > 0 {
            Rational::new(tb.numerator(), tb.denominator())
        } else {
            DEFAULT_TIME_BASE
        };

        let mut decoder_ctx = codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| Error::codec(format!("read stream parameters: {e}")))?;
        decoder_ctx.set_threading(codec::threading::Config {
            kind: codec::threading::Type::Frame,
            count: 1,
            ..Default::default()
        });
        // Fail loudly on damaged input instead of concealing it: a corrupt
        // unit aborts its own decode and the stream continues at the next
        // packet.
        unsafe {
            let raw = decoder_ctx.as_mut_ptr();
            (*raw).err_recognition = ffi::AV_EF_EXPLODE as i32;
            (*raw).error_concealment = 0;
        }
        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("open video decoder: {e}")))?;

        let src_format = from_pixel(decoder.format()).ok_or_else(|| {
            Error::unsupported_format(format!("decoder pixel format {:?}", decoder.format()))
        })?;
        let src = FrameFormat::new(decoder.width(), decoder.height(), src_format);
        if src.width == 0 || src.height == 0 {
            return Err(Error::invalid_data("stream reports zero dimensions"));
        }

        let geometry = config.geometry.resolve(src.width, src.height);
        let stages = plan_stages(src, &geometry, config.geometry.keep_aspect_ratio);
        let graph = FilterGraph::build(src, time_base, &stages, geometry.format)?;

        Ok(Self {
            input,
            decoder,
            graph,
            stream_index,
            geometry,
            time_base,
            stage: Stage::Reading,
            packet: Packet::empty(),
            decoded: frame::Video::empty(),
            filtered: frame::Video::empty(),
        })
    }

    /**
        Pull the next frame, in presentation order, at the resolved target
        geometry.

        Returns `Ok(None)` once the demuxer, decoder, and filter graph are
        all drained. Per-frame decode and filter failures are logged to
        stderr and skipped; only structural failures return an error.
    */
    pub fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        loop {
            match self.stage {
                Stage::Done => return Ok(None),
                Stage::Reading | Stage::Draining | Stage::Flushed => {}
            }

            match self.graph.pull(&mut self.filtered) {
                Ok(PullStatus::Frame) => {
                    return Ok(Some(frame_to_owned(&self.filtered, self.time_base)?));
                }
                Ok(PullStatus::Eof) => {
                    self.stage = Stage::Done;
                    return Ok(None);
                }
                Ok(PullStatus::NeedMore) => {}
                Err(e) => {
                    eprintln!("[source] dropping filtered frame: {e}");
                    if self.stage == Stage::Flushed {
                        self.stage = Stage::Done;
                        return Ok(None);
                    }
                }
            }

            match self.stage {
                Stage::Reading => self.pump_decoder(false)?,
                Stage::Draining => self.pump_decoder(true)?,
                Stage::Flushed => {
                    // A drained graph answers Eof above; NeedMore here means
                    // the graph produced nothing for the flush.
                    self.stage = Stage::Done;
                    return Ok(None);
                }
                Stage::Done => unreachable!(),
            }
        }
    }

    /// Receive one decoded frame into the graph, or feed the decoder when
    /// it is out of input. Advances `self.stage` at stream boundaries.
    fn pump_decoder(&mut self, draining: bool) -> Result<()> {
        match self.decoder.receive_frame(&mut self.decoded) {
            Ok(()) => {
                if let Err(e) = self.graph.push(&self.decoded) {
                    eprintln!("[source] dropping decoded frame: {e}");
                }
            }
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                if draining {
                    // Decoder wants input we no longer have.
                    self.graph.flush()?;
                    self.stage = Stage::Flushed;
                } else {
                    self.feed_decoder()?;
                }
            }
            Err(ffmpeg_next::Error::Eof) => {
                self.graph.flush()?;
                self.stage = Stage::Flushed;
            }
            Err(e) => {
                // Corrupt unit rejected by strict decoding; skip it and
                // move straight to the next packet.
                eprintln!("[source] decode error, skipping frame: {e}");
                if !draining {
                    self.feed_decoder()?;
                }
            }
        }
        Ok(())
    }

    /// Read packets until one for the bound stream has been sent to the
    /// decoder, or the demuxer reports end of stream.
    fn feed_decoder(&mut self) -> Result<()> {
        loop {
            match self.packet.read(&mut self.input) {
                Ok(()) => {
                    if self.packet.stream() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&self.packet) {
                        eprintln!("[source] corrupt packet, skipping: {e}");
                        continue;
                    }
                    return Ok(());
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                    std::thread::sleep(READ_RETRY_DELAY);
                }
                Err(ffmpeg_next::Error::Eof) => {
                    if let Err(e) = self.decoder.send_eof() {
                        eprintln!("[source] decoder rejected end of stream: {e}");
                    }
                    self.stage = Stage::Draining;
                    return Ok(());
                }
                Err(e) => {
                    // Demuxer-level failure; no more packets are coming.
                    eprintln!("[source] read error, treating as end of stream: {e}");
                    if let Err(e) = self.decoder.send_eof() {
                        eprintln!("[source] decoder rejected end of stream: {e}");
                    }
                    self.stage = Stage::Draining;
                    return Ok(());
                }
            }
        }
    }

    /// Width every produced frame has.
    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    /// Height every produced frame has.
    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// Pixel format every produced frame has.
    pub fn format(&self) -> PixelFormat {
        self.geometry.format
    }

    /// Time base of the bound stream (frame pts are expressed in it).
    pub fn time_base(&self) -> Rational {
        self.time_base
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("stream_index", &self.stream_index)
            .field("geometry", &self.geometry)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Whether a stream can be bound for decoding: video, with a codec the
/// demuxer actually identified. Probing leaves unidentified streams at
/// the probe placeholder id; those are skipped in favor of the next
/// candidate.
fn bindable_video_stream(medium: media::Type, codec_id: codec::Id) -> bool {
    medium == media::Type::Video && !matches!(codec_id, codec::Id::None | codec::Id::PROBE)
}

/// Open an input context, optionally forcing a demuxer by name.
fn open_input(path: &Path, format_hint: Option<&str>) -> Result<format::context::Input> {
    let Some(hint) = format_hint else {
        return format::input(&path)
            .map_err(|e| Error::codec(format!("open {}: {e}", path.display())));
    };

    let hint_c = CString::new(hint)
        .map_err(|_| Error::invalid_data(format!("format hint '{hint}' contains NUL")))?;
    let demuxer = unsafe { ffi::av_find_input_format(hint_c.as_ptr()) };
    if demuxer.is_null() {
        return Err(Error::unsupported_format(format!(
            "unknown input format '{hint}'"
        )));
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| Error::invalid_data("input path is not valid UTF-8"))?;
    let path_c = CString::new(path_str)
        .map_err(|_| Error::invalid_data("input path contains NUL"))?;

    // ffmpeg-next has no safe entry point that forces a demuxer, so this
    // mirrors what format::input does with the format slot filled in.
    unsafe {
        let mut ctx = std::ptr::null_mut();
        let status =
            ffi::avformat_open_input(&mut ctx, path_c.as_ptr(), demuxer, std::ptr::null_mut());
        if status < 0 {
            return Err(Error::codec(format!(
                "open {} as '{hint}': {}",
                path.display(),
                ffmpeg_next::Error::from(status)
            )));
        }
        let status = ffi::avformat_find_stream_info(ctx, std::ptr::null_mut());
        if status < 0 {
            ffi::avformat_close_input(&mut ctx);
            return Err(Error::codec(format!(
                "probe {}: {}",
                path.display(),
                ffmpeg_next::Error::from(status)
            )));
        }
        Ok(format::context::Input::wrap(ctx))
    }
}
