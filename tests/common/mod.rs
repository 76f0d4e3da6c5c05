//! In-memory demuxer and decoder doubles shared by the integration tests.
//!
//! Both produce real `ffmpeg_next` packets and frames so the code under test
//! runs exactly as it does against FFmpeg contexts.

#![allow(dead_code)]

use std::collections::VecDeque;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    format::Pixel,
    frame::Video as VideoFrame,
    util::error::EAGAIN,
};
use repframe::{CancellationToken, FrameDecoder, PacketReader};

pub const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// A solid RGB24 frame whose row padding (if any) is filled with `0xAB`.
pub fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let row_length = width as usize * 3;
    let data = frame.data_mut(0);
    data.fill(0xAB);
    for row in data.chunks_mut(stride).take(height as usize) {
        for pixel in row[..row_length].chunks_exact_mut(3) {
            pixel.copy_from_slice(&rgb);
        }
    }
    frame
}

/// One scripted demuxer read.
pub enum Read {
    Packet { stream: usize },
    Fail(FfmpegError),
}

/// Demuxer that replays a script, then reports end of file.
pub struct ScriptedReader {
    script: VecDeque<Read>,
    cancel_after: Option<(usize, CancellationToken)>,
    pub reads: usize,
}

impl ScriptedReader {
    pub fn new(script: Vec<Read>) -> Self {
        Self {
            script: script.into(),
            cancel_after: None,
            reads: 0,
        }
    }

    /// Cancel `token` as part of the `reads`-th read, as another thread would.
    pub fn cancelling_after(mut self, reads: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((reads, token));
        self
    }

    /// `count` packets, all on `stream`.
    pub fn packets(stream: usize, count: usize) -> Self {
        Self::new((0..count).map(|_| Read::Packet { stream }).collect())
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl PacketReader for ScriptedReader {
    fn read_packet(&mut self, packet: &mut Packet) -> Result<(), FfmpegError> {
        self.reads += 1;
        if let Some((after, token)) = &self.cancel_after
            && self.reads == *after
        {
            token.cancel();
        }
        match self.script.pop_front() {
            Some(Read::Packet { stream }) => {
                packet.set_stream(stream);
                Ok(())
            }
            Some(Read::Fail(error)) => Err(error),
            None => Err(FfmpegError::Eof),
        }
    }
}

/// Decoder that emits solid frames in a fixed colour sequence.
pub struct ScriptedDecoder {
    colours: Vec<[u8; 3]>,
    width: u32,
    height: u32,
    frames_per_packet: usize,
    held_until_flush: usize,
    submit_error: Option<FfmpegError>,
    receive_error: Option<(usize, FfmpegError)>,
    pending: VecDeque<VideoFrame>,
    emitted: usize,
    received: usize,
    flushed: bool,
    pub submitted: usize,
    pub flush_calls: usize,
}

impl ScriptedDecoder {
    /// One frame per packet, cycling through `colours`.
    pub fn new(colours: Vec<[u8; 3]>) -> Self {
        Self {
            colours,
            width: 4,
            height: 3,
            frames_per_packet: 1,
            held_until_flush: 0,
            submit_error: None,
            receive_error: None,
            pending: VecDeque::new(),
            emitted: 0,
            received: 0,
            flushed: false,
            submitted: 0,
            flush_calls: 0,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frames_per_packet(mut self, count: usize) -> Self {
        self.frames_per_packet = count;
        self
    }

    /// Frames that only come out once the decoder is flushed.
    pub fn with_held_frames(mut self, count: usize) -> Self {
        self.held_until_flush = count;
        self
    }

    pub fn failing_on_submit(mut self, error: FfmpegError) -> Self {
        self.submit_error = Some(error);
        self
    }

    /// Hand out `frames` frames, then fail whenever another one is ready.
    pub fn failing_on_receive_after(mut self, frames: usize, error: FfmpegError) -> Self {
        self.receive_error = Some((frames, error));
        self
    }

    fn next_frame(&mut self) -> VideoFrame {
        let colour = self.colours[self.emitted % self.colours.len()];
        self.emitted += 1;
        solid_frame(self.width, self.height, colour)
    }
}

impl FrameDecoder for ScriptedDecoder {
    fn submit(&mut self, _packet: &Packet) -> Result<(), FfmpegError> {
        if let Some(error) = self.submit_error {
            return Err(error);
        }
        self.submitted += 1;
        for _ in 0..self.frames_per_packet {
            let frame = self.next_frame();
            self.pending.push_back(frame);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), FfmpegError> {
        self.flush_calls += 1;
        self.flushed = true;
        for _ in 0..self.held_until_flush {
            let frame = self.next_frame();
            self.pending.push_back(frame);
        }
        Ok(())
    }

    fn receive(&mut self, frame: &mut VideoFrame) -> Result<(), FfmpegError> {
        if let Some((frames, error)) = self.receive_error
            && self.received >= frames
            && !self.pending.is_empty()
        {
            return Err(error);
        }
        match self.pending.pop_front() {
            Some(next) => {
                self.received += 1;
                *frame = next;
                Ok(())
            }
            None if self.flushed => Err(FfmpegError::Eof),
            None => Err(FfmpegError::Other { errno: EAGAIN }),
        }
    }
}
