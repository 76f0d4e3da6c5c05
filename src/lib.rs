//! # repframe
//!
//! Pick a representative thumbnail frame from a video stream.
//!
//! Seeking to a fixed timestamp for a thumbnail often lands on a black frame,
//! a title card, or the middle of a transition. `repframe` instead decodes up
//! to [`MAX_FRAMES`] frames from the start of the stream, builds an RGB
//! histogram for each, and keeps the frame whose histogram is closest to the
//! average of all of them. The winner is converted to packed RGBA, powered by
//! FFmpeg via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repframe::MediaFile;
//!
//! let mut media = MediaFile::open("input.mp4").unwrap();
//! let buffer = media.representative_frame().unwrap();
//! assert_eq!(buffer.data.len(), buffer.width as usize * buffer.height as usize * 4);
//! buffer.into_image().unwrap().save("thumb.png").unwrap();
//! ```
//!
//! ### Bring your own demuxer and decoder
//!
//! [`extract`] works on anything implementing [`PacketReader`] and
//! [`FrameDecoder`], including an already opened
//! `ffmpeg_next::format::context::Input` and `ffmpeg_next::decoder::Video`.
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Decode up to 100 frames of one stream | [`acquisition`] |
//! | 768-bin RGB histogram per frame | [`histogram`] |
//! | Frame closest to the mean histogram | [`selector`] |
//! | Convert to packed RGBA | [`encoder`] |
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | [`batch::thumbnail_first`] processes candidates on the rayon pool |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod acquisition;
pub mod batch;
pub mod configuration;
mod conversion;
pub mod encoder;
pub mod error;
pub mod ffmpeg;
pub mod histogram;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod selector;
pub mod source;
pub mod thumbnail;

pub use acquisition::{Capacity, FrameArena, MAX_FRAMES, acquire_frames, acquire_frames_with_options};
pub use configuration::ExtractOptions;
pub use encoder::{OutputBuffer, encode_rgba};
pub use error::ThumbnailError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use histogram::{HISTOGRAM_BINS, Histogram, HistogramExtractor};
pub use media::MediaFile;
pub use metadata::{MediaMetadata, VideoMetadata};
pub use pipeline::{extract, extract_with_options};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use selector::{AverageHistogram, select_representative};
pub use source::{FrameDecoder, PacketReader};
pub use thumbnail::ThumbnailOptions;
