//! Thumbnail sizing.
//!
//! [`ThumbnailOptions`] limits which sources are accepted and how large the
//! resulting image may be. The representative frame itself is always chosen
//! at full resolution; only the final image is scaled.

use std::{
    fs::OpenOptions,
    io::BufWriter,
    path::Path,
};

use image::{DynamicImage, ImageFormat, imageops::FilterType};

use crate::error::ThumbnailError;
use crate::metadata::VideoMetadata;

/// Limits applied by [`MediaFile::thumbnail`](crate::MediaFile::thumbnail).
///
/// # Example
///
/// ```no_run
/// use repframe::{MediaFile, ThumbnailError, ThumbnailOptions};
///
/// let mut media = MediaFile::open("input.mp4")?;
/// let options = ThumbnailOptions::new()
///     .with_max_dimension(320)
///     .with_max_source_size(7680, 4320);
/// let thumb = media.thumbnail(&options)?;
/// thumb.save("thumb.png")?;
/// # Ok::<(), ThumbnailError>(())
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ThumbnailOptions {
    /// Reject sources wider than this. `None` accepts any width.
    pub max_source_width: Option<u32>,
    /// Reject sources taller than this. `None` accepts any height.
    pub max_source_height: Option<u32>,
    /// Longest edge of the output. `None` keeps the source size.
    pub max_dimension: Option<u32>,
}

impl ThumbnailOptions {
    /// No limits: full-size output from any source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale the output so its longest edge is at most `max_dimension`.
    ///
    /// Smaller frames are never enlarged.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    /// Reject sources larger than `width` × `height` before decoding.
    pub fn with_max_source_size(mut self, width: u32, height: u32) -> Self {
        self.max_source_width = Some(width);
        self.max_source_height = Some(height);
        self
    }

    /// Check a video stream against the source limits.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::SourceTooWide`] or [`ThumbnailError::SourceTooTall`].
    pub fn check_source(&self, video: &VideoMetadata) -> Result<(), ThumbnailError> {
        if let Some(limit) = self.max_source_width.filter(|&limit| limit > 0)
            && video.width > limit
        {
            return Err(ThumbnailError::SourceTooWide {
                width: video.width,
                limit,
            });
        }
        if let Some(limit) = self.max_source_height.filter(|&limit| limit > 0)
            && video.height > limit
        {
            return Err(ThumbnailError::SourceTooTall {
                height: video.height,
                limit,
            });
        }
        Ok(())
    }

    /// Downscale `image` to the configured maximum edge, if any.
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        let Some(max_dimension) = self.max_dimension.filter(|&max| max > 0) else {
            return image;
        };
        let (width, height) = (image.width(), image.height());
        if width.max(height) <= max_dimension {
            return image;
        }
        let (thumb_width, thumb_height) = fit_dimensions(width, height, max_dimension);
        log::debug!("Scaling {width}x{height} thumbnail to {thumb_width}x{thumb_height}");
        image.resize_exact(thumb_width, thumb_height, FilterType::CatmullRom)
    }
}

/// Compute dimensions that fit within `max_dimension` preserving aspect ratio.
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_dimension, max_dimension);
    }
    let scale = max_dimension as f64 / width.max(height) as f64;
    let new_width = ((width as f64) * scale).round() as u32;
    let new_height = ((height as f64) * scale).round() as u32;
    (new_width.max(1), new_height.max(1))
}

/// Write `image` to `path`, picking the encoder from the file extension.
///
/// Without `overwrite` an existing file is left untouched and reported as
/// [`std::io::ErrorKind::AlreadyExists`].
///
/// # Errors
///
/// [`ThumbnailError::ImageError`] for an unknown extension or a failed
/// encode, [`ThumbnailError::IoError`] if the file cannot be created.
pub fn save_image<P: AsRef<Path>>(
    image: &DynamicImage,
    path: P,
    overwrite: bool,
) -> Result<(), ThumbnailError> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;

    let mut open = OpenOptions::new();
    open.write(true);
    if overwrite {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    let file = open.open(path)?;

    log::debug!("Writing {format:?} thumbnail to {}", path.display());
    image.write_to(&mut BufWriter::new(file), format)?;
    Ok(())
}
