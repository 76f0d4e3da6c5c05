//! Error types for the `repframe` crate.
//!
//! This module defines [`ThumbnailError`], the unified error type returned by
//! every fallible operation in the crate. Recoverable demuxer hiccups are
//! handled inside frame acquisition and never appear here.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `repframe` operations.
///
/// Extraction is all-or-nothing: whenever one of these is returned, every
/// frame acquired up to that point has already been released and no partial
/// [`OutputBuffer`](crate::OutputBuffer) exists.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThumbnailError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The stream ended, or failed, before a single frame was decoded.
    #[error("No usable frames could be decoded from the stream")]
    NoUsableFrames,

    /// The decoder (or a non-recoverable demuxer read) failed.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// Pixel-format conversion or output allocation failed.
    #[error("Failed to convert frame pixels: {0}")]
    ConversionError(String),

    /// The source video is wider than the configured limit.
    #[error("Source width {width} exceeds the limit of {limit} pixels")]
    SourceTooWide {
        /// Width of the video stream.
        width: u32,
        /// Configured maximum.
        limit: u32,
    },

    /// The source video is taller than the configured limit.
    #[error("Source height {height} exceeds the limit of {limit} pixels")]
    SourceTooTall {
        /// Height of the video stream.
        height: u32,
        /// Configured maximum.
        limit: u32,
    },

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// The configured timeout elapsed before acquisition finished.
    #[error("Operation timed out after {0:?}")]
    TimedOut(Duration),

    /// An error originating from the FFmpeg libraries outside the decode loop.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while building or saving a thumbnail.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ThumbnailError {
    fn from(error: FfmpegError) -> Self {
        ThumbnailError::FfmpegError(error.to_string())
    }
}
