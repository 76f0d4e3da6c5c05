//! The extraction pipeline.
//!
//! Acquisition → histograms → selection → RGBA encoding. The retained frames
//! live in a [`FrameArena`](crate::acquisition::FrameArena) owned by this
//! function, so they are released on every return path.

use crate::acquisition::acquire_frames_with_options;
use crate::configuration::ExtractOptions;
use crate::encoder::{OutputBuffer, encode_rgba};
use crate::error::ThumbnailError;
use crate::histogram::{Histogram, HistogramExtractor};
use crate::selector::select_representative;
use crate::source::{FrameDecoder, PacketReader};

/// Extract the representative frame of `stream_index` as packed RGBA.
///
/// `reader` must be an opened demuxer and `decoder` a decoder bound to
/// `stream_index`. Both are advanced; neither may be used concurrently.
///
/// # Errors
///
/// Returns [`ThumbnailError::NoUsableFrames`], [`ThumbnailError::DecodeError`]
/// or [`ThumbnailError::ConversionError`]. No partial buffer is returned.
///
/// # Example
///
/// ```no_run
/// use ffmpeg_next::{codec::context::Context, media::Type};
/// use repframe::ThumbnailError;
///
/// ffmpeg_next::init()?;
/// let mut input = ffmpeg_next::format::input("input.mp4")?;
/// let stream = input.streams().best(Type::Video).ok_or(ThumbnailError::NoVideoStream)?;
/// let index = stream.index();
/// let mut decoder = Context::from_parameters(stream.parameters())?.decoder().video()?;
///
/// let buffer = repframe::extract(&mut input, &mut decoder, index)?;
/// assert_eq!(buffer.size, buffer.width as usize * buffer.height as usize * 4);
/// # Ok::<(), ThumbnailError>(())
/// ```
pub fn extract<R, D>(
    reader: &mut R,
    decoder: &mut D,
    stream_index: usize,
) -> Result<OutputBuffer, ThumbnailError>
where
    R: PacketReader + ?Sized,
    D: FrameDecoder + ?Sized,
{
    extract_with_options(reader, decoder, stream_index, &ExtractOptions::default())
}

/// Like [`extract`], with cancellation, timeout, and progress settings.
///
/// # Errors
///
/// As [`extract`], plus [`ThumbnailError::Cancelled`] and
/// [`ThumbnailError::TimedOut`].
pub fn extract_with_options<R, D>(
    reader: &mut R,
    decoder: &mut D,
    stream_index: usize,
    options: &ExtractOptions,
) -> Result<OutputBuffer, ThumbnailError>
where
    R: PacketReader + ?Sized,
    D: FrameDecoder + ?Sized,
{
    let arena = acquire_frames_with_options(reader, decoder, stream_index, options)?;

    let mut extractor = HistogramExtractor::new();
    let histograms = arena
        .frames()
        .iter()
        .map(|frame| extractor.extract(frame))
        .collect::<Result<Vec<Histogram>, _>>()?;

    let best = select_representative(&histograms);
    let frame = arena.get(best).ok_or(ThumbnailError::NoUsableFrames)?;
    encode_rgba(frame)
}
