//! Audio packets and source identity

/// Identifies one audio-producing call or channel
pub type SourceId = u32;

/// Allocator for [`SourceId`]s
///
/// Each decoding channel takes a fresh id at setup; the routing layer
/// uses the id, not the channel, as the key for output assignments.
#[derive(Clone, Debug, Default)]
pub struct SourceIds {
    next: SourceId,
}

impl SourceIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused id
    pub fn next_id(&mut self) -> SourceId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// What a packet carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketKind {
    /// PCM samples for playback
    Audio,
    /// The source's call has ended; no further audio will follow
    End,
}

/// One segment of decoded call audio
///
/// Packets flow from decoder channels to the routing layer. The
/// priority is smaller-is-better, mirroring how channels are ranked
/// in the rest of the stack; a selected packet preempts regardless of
/// priority.
#[derive(Clone, Debug)]
pub struct AudioPacket {
    source: SourceId,
    priority: u8,
    selected: bool,
    kind: PacketKind,
    payload: Vec<f32>,
}

impl AudioPacket {
    /// An audio segment from `source`
    pub fn audio(source: SourceId, priority: u8, payload: Vec<f32>) -> Self {
        AudioPacket {
            source,
            priority,
            selected: false,
            kind: PacketKind::Audio,
            payload,
        }
    }

    /// An end-of-call marker from `source`
    pub fn end(source: SourceId) -> Self {
        AudioPacket {
            source,
            priority: u8::MAX,
            selected: false,
            kind: PacketKind::End,
            payload: Vec::new(),
        }
    }

    /// Mark this packet as operator-selected
    pub fn with_selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// True if an operator has selected this source for monitoring
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    /// Samples to play, normalized to `-1.0..=1.0`
    pub fn payload(&self) -> &[f32] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_sequential() {
        let mut ids = SourceIds::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_ne!(first, second);
        assert_eq!(second, first.wrapping_add(1));
    }

    #[test]
    fn packet_constructors() {
        let audio = AudioPacket::audio(7, 3, vec![0.0, 0.5]);
        assert_eq!(audio.source(), 7);
        assert_eq!(audio.priority(), 3);
        assert_eq!(audio.kind(), PacketKind::Audio);
        assert_eq!(audio.payload().len(), 2);
        assert!(!audio.is_selected());

        let selected = AudioPacket::audio(7, 3, vec![]).with_selected();
        assert!(selected.is_selected());

        let end = AudioPacket::end(7);
        assert_eq!(end.kind(), PacketKind::End);
        assert!(end.payload().is_empty());
    }
}
