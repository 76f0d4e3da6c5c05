//! Demuxer and decoder seams.
//!
//! The decode loop never talks to FFmpeg contexts directly. It reads packets
//! through [`PacketReader`] and turns them into frames through
//! [`FrameDecoder`]. Both traits are implemented for the `ffmpeg-next`
//! types that [`MediaFile`](crate::MediaFile) opens, and any caller that
//! already owns an opened demuxer/decoder pair can pass those in directly.

use ffmpeg_next::{
    Error as FfmpegError, Packet, decoder::Video as VideoDecoder, format::context::Input,
    frame::Video as VideoFrame,
};

/// A source of demultiplexed packets.
pub trait PacketReader {
    /// Read the next packet into `packet`.
    ///
    /// Returns [`FfmpegError::Eof`] at the end of the input. The packet's
    /// [`stream`](Packet::stream) must identify the stream it belongs to.
    fn read_packet(&mut self, packet: &mut Packet) -> Result<(), FfmpegError>;
}

/// A video decoder bound to a single stream.
///
/// Follows FFmpeg's send/receive model: after each [`submit`](Self::submit)
/// the caller drains [`receive`](Self::receive) until it reports
/// `Error::Other { errno: EAGAIN }`.
pub trait FrameDecoder {
    /// Feed one compressed packet to the decoder.
    fn submit(&mut self, packet: &Packet) -> Result<(), FfmpegError>;

    /// Signal end of input so buffered frames can be drained.
    fn flush(&mut self) -> Result<(), FfmpegError>;

    /// Take the next decoded frame, if the decoder has one ready.
    fn receive(&mut self, frame: &mut VideoFrame) -> Result<(), FfmpegError>;
}

impl PacketReader for Input {
    fn read_packet(&mut self, packet: &mut Packet) -> Result<(), FfmpegError> {
        packet.read(self)
    }
}

impl FrameDecoder for VideoDecoder {
    fn submit(&mut self, packet: &Packet) -> Result<(), FfmpegError> {
        self.send_packet(packet)
    }

    fn flush(&mut self) -> Result<(), FfmpegError> {
        self.send_eof()
    }

    fn receive(&mut self, frame: &mut VideoFrame) -> Result<(), FfmpegError> {
        self.receive_frame(frame)
    }
}

impl<R: PacketReader + ?Sized> PacketReader for &mut R {
    fn read_packet(&mut self, packet: &mut Packet) -> Result<(), FfmpegError> {
        (**self).read_packet(packet)
    }
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for &mut D {
    fn submit(&mut self, packet: &Packet) -> Result<(), FfmpegError> {
        (**self).submit(packet)
    }

    fn flush(&mut self) -> Result<(), FfmpegError> {
        (**self).flush()
    }

    fn receive(&mut self, frame: &mut VideoFrame) -> Result<(), FfmpegError> {
        (**self).receive(frame)
    }
}
