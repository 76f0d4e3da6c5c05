//! Conversion of the selected frame to packed RGBA.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::Flags as ScalingFlags,
};
use ffmpeg_sys_next::{AVPixelFormat, av_image_get_buffer_size};
use image::{DynamicImage, RgbaImage};

use crate::conversion::{Converter, pack_plane};
use crate::error::ThumbnailError;

/// Bytes per output pixel (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// A packed RGBA image.
///
/// Rows are exactly `width * 4` bytes with no padding, pixels are stored
/// R, G, B, A in that byte order, and `size == data.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct OutputBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Length of `data` in bytes.
    pub size: usize,
    /// Packed RGBA pixels, row-major.
    pub data: Vec<u8>,
}

impl OutputBuffer {
    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// The RGBA value at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        self.data
            .get(offset..offset + BYTES_PER_PIXEL)
            .map(|bytes| [bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Convert into an [`image::RgbaImage`] without copying.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::ConversionError`] if `data` does not hold
    /// `width * height` pixels.
    pub fn into_image(self) -> Result<DynamicImage, ThumbnailError> {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.data)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| {
                ThumbnailError::ConversionError(format!(
                    "buffer does not hold a {width}x{height} RGBA image"
                ))
            })
    }
}

/// Convert `frame` to a tightly packed RGBA [`OutputBuffer`] of the same size.
///
/// Uses a bicubic filter with accurate rounding.
///
/// # Errors
///
/// Returns [`ThumbnailError::ConversionError`] if the frame has no pixels,
/// the scaling context cannot be built, the conversion fails, or the output
/// buffer cannot be allocated.
pub fn encode_rgba(frame: &VideoFrame) -> Result<OutputBuffer, ThumbnailError> {
    let (width, height) = (frame.width(), frame.height());
    log::debug!("Encoding {width}x{height} {:?} frame as RGBA", frame.format());

    let size = canonical_rgba_size(width, height)?;
    let mut converter = Converter::new(
        Pixel::RGBA,
        ScalingFlags::BICUBIC | ScalingFlags::ACCURATE_RND,
    );
    let rgba = converter.convert(frame)?;
    let data = pack_plane(&rgba, BYTES_PER_PIXEL)?;

    if data.len() != size {
        return Err(ThumbnailError::ConversionError(format!(
            "packed {} bytes, expected {size}",
            data.len()
        )));
    }

    Ok(OutputBuffer {
        width,
        height,
        size,
        data,
    })
}

/// Byte size of an unaligned RGBA image, as FFmpeg computes it.
fn canonical_rgba_size(width: u32, height: u32) -> Result<usize, ThumbnailError> {
    let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
        return Err(ThumbnailError::ConversionError(format!(
            "frame dimensions {width}x{height} are too large"
        )));
    };
    if w == 0 || h == 0 {
        return Err(ThumbnailError::ConversionError(format!(
            "frame has no pixels ({width}x{height})"
        )));
    }

    // SAFETY: pure size computation on plain integers; no pointers involved.
    let size = unsafe { av_image_get_buffer_size(AVPixelFormat::AV_PIX_FMT_RGBA, w, h, 1) };
    usize::try_from(size).map_err(|_| {
        ThumbnailError::ConversionError(format!(
            "FFmpeg rejected a {width}x{height} RGBA buffer (code {size})"
        ))
    })
}
