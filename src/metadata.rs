//! Media metadata types.
//!
//! Returned by [`MediaFile::metadata`](crate::MediaFile::metadata). Metadata
//! is read once when the file is opened and cached for the lifetime of the
//! [`MediaFile`](crate::MediaFile).

use std::collections::HashMap;
use std::time::Duration;

/// Container-level metadata plus the selected video stream.
///
/// # Example
///
/// ```no_run
/// use repframe::MediaFile;
///
/// let media = MediaFile::open("input.mp4").unwrap();
/// let metadata = media.metadata();
/// println!("Duration: {:?}", metadata.duration);
/// println!("Format: {}", metadata.format);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Metadata of the best video stream, if the file has one.
    pub video: Option<VideoMetadata>,
    /// Whether the file carries at least one audio stream.
    pub has_audio: bool,
    /// Total duration of the media file.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
    /// Container tags such as `title` or `artist`. `None` when there are none.
    pub tags: Option<HashMap<String, String>>,
}

/// Metadata for the video stream thumbnails are taken from.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second; `0.0` when the container does not say.
    pub frames_per_second: f64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Decoder output pixel format (e.g. `"YUV420P"`), if known.
    pub pixel_format: Option<String>,
    /// Container stream index.
    pub stream_index: usize,
}
