//! [`MediaFile`]: open a file and take its representative frame.
//!
//! This is the thin glue around the core pipeline. It opens the container,
//! picks FFmpeg's best video stream, caches metadata, and hands a fresh
//! decoder to [`extract_with_options`](crate::extract_with_options) on every
//! call.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};
use image::DynamicImage;

use crate::{
    configuration::ExtractOptions,
    encoder::OutputBuffer,
    error::ThumbnailError,
    metadata::{MediaMetadata, VideoMetadata},
    pipeline::extract_with_options,
    thumbnail::ThumbnailOptions,
};

/// An opened media file.
///
/// # Example
///
/// ```no_run
/// use repframe::{MediaFile, ThumbnailError};
///
/// let mut media = MediaFile::open("input.mp4")?;
/// let buffer = media.representative_frame()?;
/// println!("{}x{}, {} bytes", buffer.width, buffer.height, buffer.size);
/// # Ok::<(), ThumbnailError>(())
/// ```
pub struct MediaFile {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: MediaMetadata,
    /// Index of the best video stream, if one exists.
    pub(crate) video_stream_index: Option<usize>,
    /// Whether packets have been read since open (or the last rewind).
    consumed: bool,
    /// Path to the opened media file.
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media file.
    ///
    /// Initialises FFmpeg (idempotent), opens the file, locates the best
    /// video stream and caches metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::FileOpen`] if the file cannot be opened or
    /// its video codec parameters cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ThumbnailError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| ThumbnailError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ThumbnailError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index());

        let has_audio = input_context
            .streams()
            .any(|stream| stream.parameters().medium() == Type::Audio);

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let format = input_context.format().name().to_string();

        let tags = {
            let map: HashMap<String, String> = input_context
                .metadata()
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            if map.is_empty() { None } else { Some(map) }
        };

        let video = match video_stream_index {
            Some(index) => Some(read_video_metadata(&input_context, index, &file_path)?),
            None => None,
        };

        Ok(Self {
            input_context,
            metadata: MediaMetadata {
                video,
                has_audio,
                duration,
                format,
                tags,
            },
            video_stream_index,
            consumed: false,
            file_path,
        })
    }

    /// Cached metadata.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Extract the representative frame of the best video stream.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::NoVideoStream`], or any pipeline error.
    pub fn representative_frame(&mut self) -> Result<OutputBuffer, ThumbnailError> {
        self.representative_frame_with_options(&ExtractOptions::default())
    }

    /// Like [`representative_frame`](Self::representative_frame), with
    /// cancellation, timeout and progress settings.
    ///
    /// Repeated calls start from the beginning of the file each time and
    /// return identical buffers.
    pub fn representative_frame_with_options(
        &mut self,
        options: &ExtractOptions,
    ) -> Result<OutputBuffer, ThumbnailError> {
        let video_stream_index = self.video_stream_index.ok_or(ThumbnailError::NoVideoStream)?;

        if self.consumed {
            log::debug!("Rewinding {} to the start", self.file_path.display());
            self.input_context.seek(0, ..)?;
        }

        let stream = self
            .input_context
            .stream(video_stream_index)
            .ok_or(ThumbnailError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        self.consumed = true;
        extract_with_options(
            &mut self.input_context,
            &mut decoder,
            video_stream_index,
            options,
        )
    }

    /// Representative frame as an image, after source checks and scaling.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::NoVideoStream`], [`ThumbnailError::SourceTooWide`],
    /// [`ThumbnailError::SourceTooTall`], or any pipeline error.
    pub fn thumbnail(&mut self, options: &ThumbnailOptions) -> Result<DynamicImage, ThumbnailError> {
        self.thumbnail_with_options(options, &ExtractOptions::default())
    }

    /// Like [`thumbnail`](Self::thumbnail), with extraction settings.
    pub fn thumbnail_with_options(
        &mut self,
        options: &ThumbnailOptions,
        extract_options: &ExtractOptions,
    ) -> Result<DynamicImage, ThumbnailError> {
        let video = self
            .metadata
            .video
            .as_ref()
            .ok_or(ThumbnailError::NoVideoStream)?;
        options.check_source(video)?;

        let buffer = self.representative_frame_with_options(extract_options)?;
        Ok(options.apply(buffer.into_image()?))
    }
}

fn read_video_metadata(
    input_context: &Input,
    index: usize,
    file_path: &Path,
) -> Result<VideoMetadata, ThumbnailError> {
    let open_error = |reason: String| ThumbnailError::FileOpen {
        path: file_path.to_path_buf(),
        reason,
    };

    let stream = input_context
        .stream(index)
        .ok_or_else(|| open_error(format!("video stream {index} disappeared")))?;
    let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(|error| {
        open_error(format!(
            "Failed to read video codec parameters for stream {index}: {error}"
        ))
    })?;
    let video_decoder = decoder_context.decoder().video().map_err(|error| {
        open_error(format!(
            "Failed to create video decoder for stream {index}: {error}"
        ))
    })?;

    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        0.0
    };

    let codec = video_decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let pixel_format = {
        let name = format!("{:?}", video_decoder.format());
        if name == "None" { None } else { Some(name) }
    };

    Ok(VideoMetadata {
        width: video_decoder.width(),
        height: video_decoder.height(),
        frames_per_second,
        codec,
        pixel_format,
        stream_index: index,
    })
}
