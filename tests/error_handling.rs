//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::Path;

use image::DynamicImage;
use repframe::{MediaFile, ThumbnailError, ThumbnailOptions, thumbnail::save_image};

#[test]
fn open_nonexistent_file() {
    let result = MediaFile::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_error_carries_the_path() {
    match MediaFile::open("missing/clip.webm") {
        Err(ThumbnailError::FileOpen { path, reason }) => {
            assert_eq!(path, Path::new("missing/clip.webm"));
            assert!(!reason.is_empty());
        }
        Err(other) => panic!("Expected FileOpen, got: {other}"),
        Ok(_) => panic!("Expected FileOpen, got an opened file"),
    }
}

#[test]
fn open_invalid_file() {
    // Create a temporary file with garbage content.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = MediaFile::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open audio-only file");
    assert!(media.metadata().video.is_none());
    assert!(media.metadata().has_audio);

    let result = media.representative_frame();
    assert!(matches!(result, Err(ThumbnailError::NoVideoStream)));

    let result = media.thumbnail(&ThumbnailOptions::new());
    assert!(matches!(result, Err(ThumbnailError::NoVideoStream)));
}

#[test]
fn error_messages_name_the_limit() {
    let error = ThumbnailError::SourceTooWide {
        width: 8192,
        limit: 4096,
    };
    let message = error.to_string();
    assert!(message.contains("8192"), "{message}");
    assert!(message.contains("4096"), "{message}");
}

#[test]
fn ffmpeg_errors_convert() {
    let error: ThumbnailError = ffmpeg_next::Error::InvalidData.into();
    assert!(matches!(error, ThumbnailError::FfmpegError(_)));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: ThumbnailError = io.into();
    assert!(error.to_string().contains("read-only"));
}

// ── Writing thumbnails ───────────────────────────────────────────

#[test]
fn save_refuses_to_replace_an_existing_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = temporary_directory.path().join("thumb.png");
    let image = DynamicImage::new_rgba8(4, 4);

    save_image(&image, &output_path, false).expect("first save");
    let result = save_image(&image, &output_path, false);

    match result {
        Err(ThumbnailError::IoError(error)) => {
            assert_eq!(error.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("Expected IoError, got: {other:?}"),
    }
    save_image(&image, &output_path, true).expect("overwrite");
}

#[test]
fn save_into_a_missing_directory_is_an_io_error() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = temporary_directory.path().join("missing").join("thumb.png");

    let result = save_image(&DynamicImage::new_rgba8(2, 2), &output_path, true);

    assert!(matches!(result, Err(ThumbnailError::IoError(_))));
}

#[test]
fn save_with_unknown_extension_is_an_image_error() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = temporary_directory.path().join("thumb.notanimage");

    let result = save_image(&DynamicImage::new_rgba8(2, 2), &output_path, true);

    assert!(matches!(result, Err(ThumbnailError::ImageError(_))));
    assert!(!output_path.exists(), "no file is created for an unknown format");
}
