//! Thumbnailing a list of candidate files.
//!
//! Each candidate is processed as an independent unit that produces an
//! immutable [`CandidateOutcome`]. Outcomes meet at a single aggregation
//! point, [`first_successful`], which returns the lowest-index success no
//! matter in which order the units finished. With the `rayon` feature the
//! units run on the rayon pool; without it they run in order and stop at the
//! first success.
//!
//! # Example
//!
//! ```no_run
//! use repframe::{ExtractOptions, ThumbnailError, ThumbnailOptions, batch};
//!
//! let candidates = ["page01.mkv", "page02.mp4", "page03.webm"];
//! let (index, thumb) = batch::thumbnail_first(
//!     &candidates,
//!     &ThumbnailOptions::new().with_max_dimension(256),
//!     &ExtractOptions::new(),
//! )?;
//! println!("used candidate {index}");
//! thumb.save("cover.png")?;
//! # Ok::<(), ThumbnailError>(())
//! ```

use std::path::Path;

use image::DynamicImage;

use crate::configuration::ExtractOptions;
use crate::error::ThumbnailError;
use crate::media::MediaFile;
use crate::progress::{OperationType, ProgressReporter};
use crate::thumbnail::ThumbnailOptions;

/// The result of processing one candidate.
#[derive(Debug)]
pub struct CandidateOutcome<T> {
    /// Position of the candidate in the input list.
    pub index: usize,
    /// What processing it produced.
    pub result: Result<T, ThumbnailError>,
}

/// Pick the lowest-index successful outcome.
///
/// Order of arrival does not matter. When nothing succeeded, the error of the
/// lowest-index candidate is returned; an empty input yields
/// [`ThumbnailError::NoUsableFrames`].
pub fn first_successful<T, I>(outcomes: I) -> Result<(usize, T), ThumbnailError>
where
    I: IntoIterator<Item = CandidateOutcome<T>>,
{
    let mut best_success: Option<(usize, T)> = None;
    let mut first_failure: Option<(usize, ThumbnailError)> = None;

    for outcome in outcomes {
        match outcome.result {
            Ok(value) => {
                if best_success.as_ref().is_none_or(|(index, _)| outcome.index < *index) {
                    best_success = Some((outcome.index, value));
                }
            }
            Err(error) => {
                log::debug!("Candidate {} failed: {error}", outcome.index);
                if first_failure.as_ref().is_none_or(|(index, _)| outcome.index < *index) {
                    first_failure = Some((outcome.index, error));
                }
            }
        }
    }

    match (best_success, first_failure) {
        (Some(success), _) => Ok(success),
        (None, Some((_, error))) => Err(error),
        (None, None) => Err(ThumbnailError::NoUsableFrames),
    }
}

/// Thumbnail the first candidate (by list position) that yields one.
///
/// Returns the winning index and its thumbnail.
///
/// # Errors
///
/// The lowest-index candidate's error when none succeeds, or
/// [`ThumbnailError::Cancelled`] / [`ThumbnailError::TimedOut`] as reported by
/// the candidates.
pub fn thumbnail_first<P>(
    candidates: &[P],
    options: &ThumbnailOptions,
    extract_options: &ExtractOptions,
) -> Result<(usize, DynamicImage), ThumbnailError>
where
    P: AsRef<Path> + Sync,
{
    log::debug!("Thumbnailing up to {} candidates", candidates.len());
    first_successful(run_candidates(candidates, options, extract_options))
}

fn process_candidate(
    path: &Path,
    options: &ThumbnailOptions,
    extract_options: &ExtractOptions,
) -> Result<DynamicImage, ThumbnailError> {
    let mut media = MediaFile::open(path)?;
    media.thumbnail_with_options(options, extract_options)
}

#[cfg(feature = "rayon")]
fn run_candidates<P>(
    candidates: &[P],
    options: &ThumbnailOptions,
    extract_options: &ExtractOptions,
) -> Vec<CandidateOutcome<DynamicImage>>
where
    P: AsRef<Path> + Sync,
{
    use std::sync::Mutex;

    use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

    let progress = Mutex::new(ProgressReporter::new(
        extract_options.progress.clone(),
        OperationType::CandidateBatch,
        Some(candidates.len() as u64),
        extract_options.batch_size,
    ));

    let outcomes = candidates
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            let result = if extract_options.is_cancelled() {
                Err(ThumbnailError::Cancelled)
            } else {
                process_candidate(path.as_ref(), options, extract_options)
            };
            if let Ok(mut progress) = progress.lock() {
                progress.advance();
            }
            CandidateOutcome { index, result }
        })
        .collect();

    if let Ok(progress) = progress.into_inner() {
        progress.finish();
    }
    outcomes
}

#[cfg(not(feature = "rayon"))]
fn run_candidates<P>(
    candidates: &[P],
    options: &ThumbnailOptions,
    extract_options: &ExtractOptions,
) -> Vec<CandidateOutcome<DynamicImage>>
where
    P: AsRef<Path> + Sync,
{
    let mut progress = ProgressReporter::new(
        extract_options.progress.clone(),
        OperationType::CandidateBatch,
        Some(candidates.len() as u64),
        extract_options.batch_size,
    );

    let mut outcomes = Vec::new();
    for (index, path) in candidates.iter().enumerate() {
        let result = if extract_options.is_cancelled() {
            Err(ThumbnailError::Cancelled)
        } else {
            process_candidate(path.as_ref(), options, extract_options)
        };
        progress.advance();
        let succeeded = result.is_ok();
        outcomes.push(CandidateOutcome { index, result });
        if succeeded {
            break;
        }
    }

    progress.finish();
    outcomes
}
