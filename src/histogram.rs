//! Per-frame RGB colour histograms.
//!
//! A [`Histogram`] counts, for each of the three colour channels, how many
//! pixels take each of the 256 intensity levels. Bin `c * 256 + v` holds the
//! count for channel `c` at value `v`.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::Flags as ScalingFlags,
};

use crate::conversion::Converter;
use crate::error::ThumbnailError;

/// Number of colour channels counted.
pub const CHANNELS: usize = 3;

/// Intensity levels per channel.
pub const LEVELS: usize = 256;

/// Total number of bins in a [`Histogram`].
pub const HISTOGRAM_BINS: usize = CHANNELS * LEVELS;

/// A 768-bin RGB histogram.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u32; HISTOGRAM_BINS],
}

impl Debug for Histogram {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let occupied = self.bins.iter().filter(|&&count| count > 0).count();
        f.debug_struct("Histogram")
            .field("occupied_bins", &occupied)
            .field("samples", &self.total())
            .finish()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    /// An all-zero histogram.
    pub fn new() -> Self {
        Self {
            bins: [0; HISTOGRAM_BINS],
        }
    }

    /// Build a histogram from raw bin counts.
    pub fn from_bins(bins: [u32; HISTOGRAM_BINS]) -> Self {
        Self { bins }
    }

    /// Count a packed 3-byte-per-pixel plane.
    ///
    /// Rows start every `stride` bytes; only the first `width * 3` bytes of
    /// each row are pixel data. Counting stops at the first row that does
    /// not hold `width * 3` bytes, so a `stride` narrower than a row or a
    /// truncated `data` yields a partial (possibly empty) histogram.
    pub fn from_packed_rgb(data: &[u8], width: usize, height: usize, stride: usize) -> Self {
        let mut histogram = Self::new();
        let row_length = width * CHANNELS;
        if row_length == 0 || stride < row_length {
            return histogram;
        }

        for row in data.chunks(stride).take(height) {
            let Some(pixels) = row.get(..row_length) else {
                break;
            };
            for pixel in pixels.chunks_exact(CHANNELS) {
                for (channel, &value) in pixel.iter().enumerate() {
                    histogram.bins[channel * LEVELS + value as usize] += 1;
                }
            }
        }
        histogram
    }

    /// Count an RGB24 frame in place.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::ConversionError`] if the frame is not RGB24.
    /// Use [`HistogramExtractor`] for arbitrary decoder output.
    pub fn from_rgb24_frame(frame: &VideoFrame) -> Result<Self, ThumbnailError> {
        if frame.format() != Pixel::RGB24 {
            return Err(ThumbnailError::ConversionError(format!(
                "expected an RGB24 frame, got {:?}",
                frame.format()
            )));
        }
        Ok(Self::from_packed_rgb(
            frame.data(0),
            frame.width() as usize,
            frame.height() as usize,
            frame.stride(0),
        ))
    }

    /// All bins, indexed `channel * 256 + value`.
    pub fn bins(&self) -> &[u32; HISTOGRAM_BINS] {
        &self.bins
    }

    /// Count for one channel (0 = red, 1 = green, 2 = blue) at one level.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= 3`.
    pub fn bin(&self, channel: usize, value: u8) -> u32 {
        assert!(channel < CHANNELS, "channel index {channel} out of range");
        self.bins[channel * LEVELS + value as usize]
    }

    /// Sum of all bins (pixels × channels).
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&count| count as u64).sum()
    }
}

/// Computes histograms for decoder output of any pixel format.
///
/// RGB24 frames are counted directly. Other formats are converted to RGB24 at
/// their own size first; the scaling context is reused across frames of the
/// same format and size.
pub struct HistogramExtractor {
    converter: Converter,
}

impl HistogramExtractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self {
            converter: Converter::new(Pixel::RGB24, ScalingFlags::BICUBIC | ScalingFlags::ACCURATE_RND),
        }
    }

    /// Histogram of one decoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::ConversionError`] if the frame cannot be
    /// converted to RGB24.
    pub fn extract(&mut self, frame: &VideoFrame) -> Result<Histogram, ThumbnailError> {
        if frame.format() == Pixel::RGB24 {
            return Histogram::from_rgb24_frame(frame);
        }
        let rgb = self.converter.convert(frame)?;
        Histogram::from_rgb24_frame(&rgb)
    }
}

impl Default for HistogramExtractor {
    fn default() -> Self {
        Self::new()
    }
}
