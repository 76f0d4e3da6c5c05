//! Frame acquisition.
//!
//! Drives the read → submit → drain loop against an opened demuxer/decoder
//! pair and retains up to [`MAX_FRAMES`] decoded frames from one stream in a
//! [`FrameArena`]. Frames are owned by the arena and freed when it drops, so
//! every exit path (success, error, cancellation) releases each frame once.

use std::time::Instant;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    frame::Video as VideoFrame,
    util::error::{EAGAIN, EPERM},
};

use crate::configuration::ExtractOptions;
use crate::error::ThumbnailError;
use crate::progress::{OperationType, ProgressReporter};
use crate::source::{FrameDecoder, PacketReader};

/// Maximum number of decoded frames retained for selection.
pub const MAX_FRAMES: usize = 100;

/// Whether a [`FrameArena`] can take more frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// There is room for at least one more frame.
    Available,
    /// The arena holds [`MAX_FRAMES`] frames.
    Reached,
}

/// Bounded, ordered storage for decoded frames.
pub struct FrameArena {
    frames: Vec<VideoFrame>,
}

impl FrameArena {
    /// Create an empty arena sized for [`MAX_FRAMES`].
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(MAX_FRAMES),
        }
    }

    /// Retain `frame`, reporting whether the arena is now full.
    ///
    /// A frame offered to a full arena is released immediately.
    pub fn push(&mut self, frame: VideoFrame) -> Capacity {
        if self.frames.len() < MAX_FRAMES {
            self.frames.push(frame);
        }
        self.capacity()
    }

    /// Current capacity state.
    pub fn capacity(&self) -> Capacity {
        if self.frames.len() >= MAX_FRAMES {
            Capacity::Reached
        } else {
            Capacity::Available
        }
    }

    /// Number of retained frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when no frame has been retained.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Retained frames in decode order.
    pub fn frames(&self) -> &[VideoFrame] {
        &self.frames
    }

    /// Frame at `index`, if retained.
    pub fn get(&self, index: usize) -> Option<&VideoFrame> {
        self.frames.get(index)
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameArena {
    fn drop(&mut self) {
        if !self.frames.is_empty() {
            log::trace!("Releasing {} retained frames", self.frames.len());
        }
    }
}

/// How a single demuxer read ended.
enum ReadOutcome {
    Packet,
    EndOfStream,
    /// Generic read error after at least one frame was retained.
    TransientDemuxError,
}

/// How draining the decoder ended.
enum DrainOutcome {
    NeedsInput,
    Full,
}

/// Decode up to [`MAX_FRAMES`] frames of `stream_index`.
///
/// See [`acquire_frames_with_options`].
pub fn acquire_frames<R, D>(
    reader: &mut R,
    decoder: &mut D,
    stream_index: usize,
) -> Result<FrameArena, ThumbnailError>
where
    R: PacketReader + ?Sized,
    D: FrameDecoder + ?Sized,
{
    acquire_frames_with_options(reader, decoder, stream_index, &ExtractOptions::default())
}

/// Decode up to [`MAX_FRAMES`] frames of `stream_index`, honouring
/// cancellation, timeout, and progress settings.
///
/// Packets of other streams are dropped without decoding. Acquisition stops
/// as soon as the arena is full, without reading another packet. At end of
/// input the decoder is flushed and drained.
///
/// # Errors
///
/// - [`ThumbnailError::NoUsableFrames`] if no frame was decoded, including
///   when the demuxer fails generically before the first frame.
/// - [`ThumbnailError::DecodeError`] for any decoder failure other than
///   "need more input", or a non-generic demuxer failure.
/// - [`ThumbnailError::Cancelled`] / [`ThumbnailError::TimedOut`] when
///   interrupted.
pub fn acquire_frames_with_options<R, D>(
    reader: &mut R,
    decoder: &mut D,
    stream_index: usize,
    options: &ExtractOptions,
) -> Result<FrameArena, ThumbnailError>
where
    R: PacketReader + ?Sized,
    D: FrameDecoder + ?Sized,
{
    log::debug!("Acquiring up to {MAX_FRAMES} frames from stream {stream_index}");

    let started = Instant::now();
    let mut arena = FrameArena::new();
    let mut progress = ProgressReporter::new(
        options.progress.clone(),
        OperationType::FrameAcquisition,
        Some(MAX_FRAMES as u64),
        options.batch_size,
    );

    loop {
        options.check_interrupted(started)?;

        let mut packet = Packet::empty();
        match read_next(reader, &mut packet, &arena)? {
            ReadOutcome::Packet => {}
            ReadOutcome::EndOfStream => break,
            ReadOutcome::TransientDemuxError => {
                log::debug!(
                    "Demuxer read failed after {} frames; treating as end of stream",
                    arena.len()
                );
                break;
            }
        }

        if packet.stream() != stream_index {
            continue;
        }

        decoder
            .submit(&packet)
            .map_err(|error| ThumbnailError::DecodeError(error.to_string()))?;

        if let DrainOutcome::Full = drain(decoder, &mut arena, &mut progress, false)? {
            log::debug!("Frame cap reached; stopping acquisition");
            progress.finish();
            return Ok(arena);
        }
    }

    decoder
        .flush()
        .map_err(|error| ThumbnailError::DecodeError(error.to_string()))?;
    drain(decoder, &mut arena, &mut progress, true)?;
    progress.finish();

    if arena.is_empty() {
        return Err(ThumbnailError::NoUsableFrames);
    }

    log::debug!("Acquired {} frames", arena.len());
    Ok(arena)
}

fn read_next<R: PacketReader + ?Sized>(
    reader: &mut R,
    packet: &mut Packet,
    arena: &FrameArena,
) -> Result<ReadOutcome, ThumbnailError> {
    match reader.read_packet(packet) {
        Ok(()) => Ok(ReadOutcome::Packet),
        Err(FfmpegError::Eof) => Ok(ReadOutcome::EndOfStream),
        Err(FfmpegError::Other { errno: EPERM }) if arena.is_empty() => {
            log::debug!("Demuxer read failed before any frame was decoded");
            Err(ThumbnailError::NoUsableFrames)
        }
        Err(FfmpegError::Other { errno: EPERM }) => Ok(ReadOutcome::TransientDemuxError),
        Err(error) => Err(ThumbnailError::DecodeError(format!(
            "demuxer read failed: {error}"
        ))),
    }
}

/// Move every frame the decoder is ready to emit into the arena.
///
/// While flushing, FFmpeg reports a drained decoder with `Eof`.
fn drain<D: FrameDecoder + ?Sized>(
    decoder: &mut D,
    arena: &mut FrameArena,
    progress: &mut ProgressReporter,
    flushing: bool,
) -> Result<DrainOutcome, ThumbnailError> {
    loop {
        let mut frame = VideoFrame::empty();
        match decoder.receive(&mut frame) {
            Ok(()) => {
                log::trace!(
                    "Retained frame {} ({}x{} {:?})",
                    arena.len(),
                    frame.width(),
                    frame.height(),
                    frame.format()
                );
                let capacity = arena.push(frame);
                progress.advance();
                if capacity == Capacity::Reached {
                    return Ok(DrainOutcome::Full);
                }
            }
            Err(FfmpegError::Other { errno: EAGAIN }) => return Ok(DrainOutcome::NeedsInput),
            Err(FfmpegError::Eof) if flushing => return Ok(DrainOutcome::NeedsInput),
            Err(error) => return Err(ThumbnailError::DecodeError(error.to_string())),
        }
    }
}
