//! # trunkold: trunked-radio codeword correction and audio routing
//!
//! This crate provides two building blocks for a trunked-radio
//! receiver. The first is a binary
//! [BCH](https://en.wikipedia.org/wiki/BCH_code) decoder, configured
//! out of the box for the P25 Network Identifier, which repairs bit
//! errors in received codewords and recovers the Network Access Code
//! and Data Unit ID that gate everything else a receiver does. The
//! second is an audio routing engine that arbitrates a bounded set of
//! playback outputs between any number of decoded calls, by priority,
//! with preemption and inactivity reclaim.
//!
//! The two halves share nothing but the crate; use either without the
//! other.
//!
//! ## Correcting codewords
//!
//! [`NidDecoder`] decodes the 63-bit NID codeword in place and
//! reports how many bits it repaired:
//!
//! ```
//! use trunkold::{Codeword, CorrectionStatus, Nid, NidDecoder};
//!
//! let decoder = NidDecoder::new();
//!
//! // a received NID, here built by encoding and then damaging it
//! let mut data = Codeword::new(16);
//! data.set_field(0, 12, 0x293);
//! data.set_field(12, 4, 0x7);
//! let mut received = decoder.bch().encode(&data);
//! received.flip(7);
//! received.flip(40);
//! received.flip(61);
//!
//! assert_eq!(CorrectionStatus::Corrected(3), decoder.decode(&mut received));
//!
//! let nid = Nid::from_codeword(&received);
//! assert_eq!(0x293, nid.nac());
//! assert_eq!("TSBK", nid.duid().as_str());
//! ```
//!
//! Other codes are available through [`BchDecoder`], which accepts
//! any `BCH(2^m - 1, k, t)` with `m` up to 8 and `t` up to 16. When a
//! channel's NAC is already known, [`NidDecoder::decode_with_hint`]
//! retries hopeless codewords with the NAC field rewritten, and
//! [`NacTracker`] confirms a NAC from successive decodes before it is
//! used that way.
//!
//! ## Routing audio
//!
//! [`PlaybackManager`] runs an [`OutputPool`] on its own thread.
//! Decoder channels queue [`AudioPacket`]s through a cloneable
//! sender; every drain interval the pool routes them onto
//! [`AudioOutput`]s, preempting lower-priority calls when outputs run
//! short and releasing outputs that go quiet. The pool can also be
//! driven directly, with an explicit clock, by applications that
//! already have a processing loop.

mod audio;
mod codeword;
mod edac;
mod nid;

pub use audio::{
    AudioOutput, AudioPacket, OutputPool, PacketKind, PlaybackBuilder, PlaybackError,
    PlaybackManager, SourceId, SourceIds, DRAIN_INTERVAL, STALL_TIMEOUT, STOP_GRACE_PERIOD,
};
pub use codeword::{Codeword, CodewordError, SetBits, MAX_CODEWORD_BITS};
pub use edac::{default_primitive_poly, BchDecoder, CorrectionStatus};
pub use nid::{DataUnitId, NacTracker, Nid, NidDecoder, NID_BITS};
