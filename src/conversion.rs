//! Pixel-format conversion helpers.
//!
//! [`Converter`] wraps an FFmpeg scaling context that keeps the source size
//! and only changes pixel format. The context is rebuilt whenever the source
//! format or size changes, since a stream may switch resolution mid-way.
//! [`pack_plane`] strips per-row padding from a packed plane.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::ThumbnailError;

/// Same-size pixel-format converter with a cached scaling context.
pub(crate) struct Converter {
    target: Pixel,
    flags: ScalingFlags,
    cached: Option<(Pixel, u32, u32, ScalingContext)>,
}

impl Converter {
    pub(crate) fn new(target: Pixel, flags: ScalingFlags) -> Self {
        Self {
            target,
            flags,
            cached: None,
        }
    }

    /// Convert `frame` to the target format at its own dimensions.
    pub(crate) fn convert(&mut self, frame: &VideoFrame) -> Result<VideoFrame, ThumbnailError> {
        let (format, width, height) = (frame.format(), frame.width(), frame.height());
        if width == 0 || height == 0 {
            return Err(ThumbnailError::ConversionError(format!(
                "frame has no pixels ({width}x{height})"
            )));
        }

        let reusable = matches!(
            &self.cached,
            Some((cached_format, cached_width, cached_height, _))
                if *cached_format == format && *cached_width == width && *cached_height == height
        );
        if !reusable {
            let context = ScalingContext::get(
                format,
                width,
                height,
                self.target,
                width,
                height,
                self.flags,
            )
            .map_err(|error| {
                ThumbnailError::ConversionError(format!(
                    "cannot convert {format:?} {width}x{height} to {:?}: {error}",
                    self.target
                ))
            })?;
            self.cached = Some((format, width, height, context));
        }

        let mut output = VideoFrame::empty();
        if let Some((_, _, _, context)) = self.cached.as_mut() {
            context
                .run(frame, &mut output)
                .map_err(|error| ThumbnailError::ConversionError(error.to_string()))?;
        }
        Ok(output)
    }
}

/// Copy plane 0 of a packed frame into a tightly-packed buffer.
///
/// `bytes_per_pixel` is 3 for RGB24 and 4 for RGBA. Reserving the buffer is
/// fallible so an oversized frame surfaces as a conversion error instead of
/// aborting the process.
pub(crate) fn pack_plane(
    frame: &VideoFrame,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, ThumbnailError> {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let stride = frame.stride(0);
    let row_length = width * bytes_per_pixel;
    let data = frame.data(0);

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(row_length * height)
        .map_err(|error| ThumbnailError::ConversionError(error.to_string()))?;

    if stride == row_length {
        buffer.extend_from_slice(&data[..row_length * height]);
    } else {
        for row in data.chunks(stride).take(height) {
            buffer.extend_from_slice(&row[..row_length]);
        }
    }
    Ok(buffer)
}
