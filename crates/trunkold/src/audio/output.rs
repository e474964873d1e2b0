//! The audio output device interface

use super::packet::AudioPacket;

/// One playback channel, such as a sound card or a recorder sink
///
/// The routing layer owns its outputs and drives them from the
/// playback thread, so implementations must be [`Send`] but never
/// need to be [`Sync`]. An implementation that buffers internally
/// should drain that buffer when it sees an
/// [`End`](super::packet::PacketKind::End) packet; device handles are
/// released by dropping the output.
pub trait AudioOutput: Send {
    /// Name for logs, like "`left`" or "`speaker 2`"
    fn channel_name(&self) -> &str;

    /// Accept one packet for playback
    ///
    /// Called on the playback thread. Implementations should avoid
    /// blocking for longer than a drain interval; a device that
    /// cannot keep up is expected to drop samples itself rather than
    /// stall every other output.
    fn receive(&mut self, packet: AudioPacket);
}
