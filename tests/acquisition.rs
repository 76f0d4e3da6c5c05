mod common;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use common::{Read, ScriptedDecoder, ScriptedReader};
use ffmpeg_next::{
    Error as FfmpegError,
    util::error::{EIO, EPERM},
};
use repframe::{
    CancellationToken, Capacity, ExtractOptions, FrameArena, MAX_FRAMES, OperationType,
    ProgressCallback, ProgressInfo, ThumbnailError, acquire_frames, acquire_frames_with_options,
};

const GREY: [u8; 3] = [128, 128, 128];

struct RecordingProgress {
    calls: AtomicU64,
    last: Mutex<Option<ProgressInfo>>,
}

impl RecordingProgress {
    fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last.lock().unwrap() = Some(info.clone());
    }
}

#[test]
fn stops_reading_once_the_frame_cap_is_reached() {
    let mut reader = ScriptedReader::packets(0, 150);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(arena.len(), MAX_FRAMES);
    assert_eq!(arena.capacity(), Capacity::Reached);
    assert_eq!(reader.reads, MAX_FRAMES);
    assert_eq!(reader.remaining(), 50);
    assert_eq!(decoder.flush_calls, 0, "a full arena needs no flush");
}

#[test]
fn cap_reached_mid_packet_drops_the_rest_of_the_packet() {
    let mut reader = ScriptedReader::packets(0, 40);
    let mut decoder = ScriptedDecoder::new(vec![GREY]).with_frames_per_packet(3);

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(arena.len(), MAX_FRAMES);
    assert_eq!(reader.reads, MAX_FRAMES.div_ceil(3));
}

#[test]
fn short_stream_keeps_every_frame_in_decode_order() {
    let colours = vec![[10, 0, 0], [20, 0, 0], [30, 0, 0]];
    let mut reader = ScriptedReader::packets(0, 3);
    let mut decoder = ScriptedDecoder::new(colours.clone());

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(arena.len(), 3);
    assert_eq!(arena.capacity(), Capacity::Available);
    for (frame, colour) in arena.frames().iter().zip(&colours) {
        assert_eq!(&frame.data(0)[..3], colour);
    }
    assert_eq!(decoder.flush_calls, 1);
}

#[test]
fn packets_of_other_streams_are_never_decoded() {
    let mut reader = ScriptedReader::new(vec![
        Read::Packet { stream: 1 },
        Read::Packet { stream: 0 },
        Read::Packet { stream: 2 },
        Read::Packet { stream: 1 },
        Read::Packet { stream: 0 },
    ]);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(decoder.submitted, 2);
    assert_eq!(arena.len(), 2);
}

#[test]
fn frames_buffered_in_the_decoder_are_drained_at_end_of_stream() {
    let mut reader = ScriptedReader::packets(0, 4);
    let mut decoder = ScriptedDecoder::new(vec![GREY])
        .with_frames_per_packet(0)
        .with_held_frames(2);

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(arena.len(), 2);
    assert_eq!(decoder.submitted, 4);
}

#[test]
fn generic_demux_failure_before_any_frame_means_no_usable_frames() {
    let mut reader = ScriptedReader::new(vec![
        Read::Packet { stream: 1 },
        Read::Fail(FfmpegError::Other { errno: EPERM }),
        Read::Packet { stream: 0 },
    ]);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::NoUsableFrames)));
    assert_eq!(decoder.submitted, 0);
}

#[test]
fn generic_demux_failure_after_frames_ends_the_stream() {
    let mut reader = ScriptedReader::new(vec![
        Read::Packet { stream: 0 },
        Read::Packet { stream: 0 },
        Read::Fail(FfmpegError::Other { errno: EPERM }),
        Read::Packet { stream: 0 },
    ]);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let arena = acquire_frames(&mut reader, &mut decoder, 0).unwrap();

    assert_eq!(arena.len(), 2);
    assert_eq!(reader.remaining(), 1, "nothing is read after the failure");
    assert_eq!(decoder.flush_calls, 1);
}

#[test]
fn other_demux_failures_are_decode_errors() {
    let mut reader = ScriptedReader::new(vec![
        Read::Packet { stream: 0 },
        Read::Fail(FfmpegError::Other { errno: EIO }),
    ]);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::DecodeError(_))));
}

#[test]
fn decoder_rejecting_a_packet_is_a_decode_error() {
    let mut reader = ScriptedReader::packets(0, 5);
    let mut decoder = ScriptedDecoder::new(vec![GREY]).failing_on_submit(FfmpegError::InvalidData);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::DecodeError(ref message)) if !message.is_empty()));
    assert_eq!(reader.reads, 1);
}

#[test]
fn decoder_failing_while_draining_aborts_with_retained_frames() {
    let mut reader = ScriptedReader::packets(0, 10);
    let mut decoder =
        ScriptedDecoder::new(vec![GREY]).failing_on_receive_after(3, FfmpegError::InvalidData);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::DecodeError(_))));
    // Three packets yielded frames; the fourth failed while draining.
    assert_eq!(reader.reads, 4);
    assert_eq!(reader.remaining(), 6);
    assert_eq!(decoder.flush_calls, 0);
}

#[test]
fn empty_input_has_no_usable_frames() {
    let mut reader = ScriptedReader::new(Vec::new());
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::NoUsableFrames)));
}

#[test]
fn stream_without_target_packets_has_no_usable_frames() {
    let mut reader = ScriptedReader::packets(1, 10);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames(&mut reader, &mut decoder, 0);

    assert!(matches!(result, Err(ThumbnailError::NoUsableFrames)));
    assert_eq!(decoder.submitted, 0);
}

#[test]
fn cancelled_token_stops_before_the_first_read() {
    let token = CancellationToken::new();
    token.cancel();
    let options = ExtractOptions::new().with_cancellation(token);
    let mut reader = ScriptedReader::packets(0, 10);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames_with_options(&mut reader, &mut decoder, 0, &options);

    assert!(matches!(result, Err(ThumbnailError::Cancelled)));
    assert_eq!(reader.reads, 0);
}

#[test]
fn cancellation_mid_stream_stops_at_the_next_read() {
    let token = CancellationToken::new();
    let options = ExtractOptions::new().with_cancellation(token.clone());
    let mut reader = ScriptedReader::packets(0, 10).cancelling_after(4, token);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames_with_options(&mut reader, &mut decoder, 0, &options);

    assert!(matches!(result, Err(ThumbnailError::Cancelled)));
    assert_eq!(reader.reads, 4);
    assert_eq!(decoder.submitted, 4, "frames were retained before cancelling");
    assert_eq!(decoder.flush_calls, 0);
}

#[test]
fn elapsed_timeout_is_reported() {
    let options = ExtractOptions::new().with_timeout(Duration::ZERO);
    let mut reader = ScriptedReader::packets(0, 10);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let result = acquire_frames_with_options(&mut reader, &mut decoder, 0, &options);

    assert!(matches!(result, Err(ThumbnailError::TimedOut(timeout)) if timeout == Duration::ZERO));
}

#[test]
fn generous_timeout_does_not_interfere() {
    let options = ExtractOptions::new().with_timeout(Duration::from_secs(60));
    let mut reader = ScriptedReader::packets(0, 5);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    let arena = acquire_frames_with_options(&mut reader, &mut decoder, 0, &options).unwrap();

    assert_eq!(arena.len(), 5);
}

#[test]
fn progress_reports_frame_acquisition() {
    let progress = Arc::new(RecordingProgress::new());
    let options = ExtractOptions::new()
        .with_progress(progress.clone())
        .with_batch_size(2);
    let mut reader = ScriptedReader::packets(0, 6);
    let mut decoder = ScriptedDecoder::new(vec![GREY]);

    acquire_frames_with_options(&mut reader, &mut decoder, 0, &options).unwrap();

    // Three batch reports plus the final one.
    assert_eq!(progress.calls.load(Ordering::Relaxed), 4);
    let last = progress.last.lock().unwrap().clone().unwrap();
    assert_eq!(last.operation, OperationType::FrameAcquisition);
    assert_eq!(last.current, 6);
    assert_eq!(last.total, Some(MAX_FRAMES as u64));
    assert!((last.percentage.unwrap() - 6.0).abs() < 0.001);
}

#[test]
fn arena_rejects_frames_beyond_the_cap() {
    let mut arena = FrameArena::new();
    assert!(arena.is_empty());

    for index in 0..MAX_FRAMES {
        let expected = if index + 1 == MAX_FRAMES {
            Capacity::Reached
        } else {
            Capacity::Available
        };
        assert_eq!(arena.push(common::solid_frame(2, 2, GREY)), expected);
    }

    assert_eq!(arena.push(common::solid_frame(2, 2, GREY)), Capacity::Reached);
    assert_eq!(arena.len(), MAX_FRAMES);
    assert!(arena.get(MAX_FRAMES).is_none());
    assert!(arena.get(0).is_some());
}
