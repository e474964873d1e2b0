//! P25 Network Identifier decoding
//!
//! Every P25 Phase 1 data unit leads with a Network Identifier: a
//! 12-bit Network Access Code and a 4-bit Data Unit ID, protected by
//! a shortened BCH(63, 16) code that repairs up to eleven bit errors.
//! The NID is the doorman for everything that follows; a receiver
//! that cannot recover it has to throw the whole data unit away, so
//! the decoder also supports a second, hinted attempt that rewrites
//! the NAC field with a previously confirmed value before retrying.

use std::fmt;
use std::str::FromStr;

use arraydeque::ArrayDeque;
use strum::EnumMessage;

#[cfg(not(test))]
use log::debug;
#[cfg(test)]
use std::println as debug;

use crate::codeword::Codeword;
use crate::edac::{default_primitive_poly, BchDecoder, CorrectionStatus};

/// Length of the NID codeword, in bits
pub const NID_BITS: usize = 63;

const NAC_START: usize = 0;
const NAC_WIDTH: usize = 12;
const DUID_START: usize = 12;
const DUID_WIDTH: usize = 4;

/// Observations required before a NAC is considered confirmed
const NAC_CONFIRM_COUNT: usize = 3;

/// P25 Data Unit ID
///
/// Identifies what kind of payload follows the NID. Codes without an
/// assignment decode as [`Reserved`](DataUnitId::Reserved) rather
/// than failing; later protocol layers decide what to do with them.
///
/// ```
/// use trunkold::DataUnitId;
///
/// let duid = DataUnitId::from(7);
/// assert_eq!(DataUnitId::TrunkingSignalingBlock, duid);
/// assert_eq!("TSBK", duid.as_ref());
/// assert_eq!("Trunking Signaling Block", &format!("{}", duid));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumString,
)]
pub enum DataUnitId {
    /// Call setup, carrying the encryption sync word
    #[strum(serialize = "HDU", detailed_message = "Header Data Unit")]
    HeaderDataUnit,

    /// Simple end of transmission
    #[strum(serialize = "TDU", detailed_message = "Terminator Data Unit")]
    TerminatorDataUnit,

    /// Voice frames 1-9 with embedded link control
    #[strum(serialize = "LDU1", detailed_message = "Logical Link Data Unit 1")]
    LogicalLinkDataUnit1,

    /// Trunking control signaling
    #[strum(serialize = "TSBK", detailed_message = "Trunking Signaling Block")]
    TrunkingSignalingBlock,

    /// Voice frames 10-18 with encryption sync
    #[strum(serialize = "LDU2", detailed_message = "Logical Link Data Unit 2")]
    LogicalLinkDataUnit2,

    /// Packet data
    #[strum(serialize = "PDU", detailed_message = "Packet Data Unit")]
    PacketDataUnit,

    /// End of transmission with link control
    #[strum(
        serialize = "TDULC",
        detailed_message = "Terminator Data Unit with Link Control"
    )]
    TerminatorDataUnitLinkControl,

    /// A code with no assigned data unit
    #[strum(serialize = "RES", detailed_message = "Reserved Data Unit")]
    Reserved,
}

impl DataUnitId {
    /// Human-readable name, like "`Trunking Signaling Block`"
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Short mnemonic, like "`TSBK`"
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl From<u8> for DataUnitId {
    fn from(code: u8) -> DataUnitId {
        match code & 0xF {
            0 => DataUnitId::HeaderDataUnit,
            3 => DataUnitId::TerminatorDataUnit,
            5 => DataUnitId::LogicalLinkDataUnit1,
            7 => DataUnitId::TrunkingSignalingBlock,
            10 => DataUnitId::LogicalLinkDataUnit2,
            12 => DataUnitId::PacketDataUnit,
            15 => DataUnitId::TerminatorDataUnitLinkControl,
            _ => DataUnitId::Reserved,
        }
    }
}

impl From<&str> for DataUnitId {
    fn from(s: &str) -> DataUnitId {
        match DataUnitId::from_str(s) {
            Ok(duid) => duid,
            Err(_e) => DataUnitId::Reserved,
        }
    }
}

impl AsRef<str> for DataUnitId {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for DataUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

/// A decoded Network Identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nid {
    nac: u16,
    duid: DataUnitId,
}

impl Nid {
    /// Read the NID fields from a corrected codeword
    ///
    /// # Panics
    ///
    /// Panics if the codeword is shorter than the 16 NID bits.
    pub fn from_codeword(codeword: &Codeword) -> Self {
        Nid {
            nac: codeword.field(NAC_START, NAC_WIDTH) as u16,
            duid: DataUnitId::from(codeword.field(DUID_START, DUID_WIDTH) as u8),
        }
    }

    /// Network Access Code, 12 bits
    pub fn nac(&self) -> u16 {
        self.nac
    }

    /// Data Unit ID
    pub fn duid(&self) -> DataUnitId {
        self.duid
    }
}

impl fmt::Display for Nid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NAC 0x{:03X} {}", self.nac, self.duid.as_str())
    }
}

/// Decoder for the NID codeword
///
/// Wraps a `BCH(63, 16, 11)` decoder configured for the P25 field.
/// The same instance serves any number of codewords.
///
/// ```
/// use trunkold::{Codeword, CorrectionStatus, Nid, NidDecoder};
///
/// let decoder = NidDecoder::new();
/// let mut data = Codeword::new(16);
/// data.set_field(0, 12, 0x293);
/// data.set_field(12, 4, 0x7);
///
/// let mut nid = decoder.bch().encode(&data);
/// nid.flip(40);
/// assert_eq!(CorrectionStatus::Corrected(1), decoder.decode(&mut nid));
/// assert_eq!(0x293, Nid::from_codeword(&nid).nac());
/// ```
pub struct NidDecoder {
    bch: BchDecoder,
}

impl NidDecoder {
    /// Create the NID decoder
    pub fn new() -> Self {
        NidDecoder {
            bch: BchDecoder::new(6, 16, 11, default_primitive_poly(6)),
        }
    }

    /// Correct `codeword` in place
    ///
    /// The buffer must hold all [`NID_BITS`] bits. On failure it is
    /// left as received.
    pub fn decode(&self, codeword: &mut Codeword) -> CorrectionStatus {
        self.bch.decode(codeword)
    }

    /// Correct `codeword`, retrying once with a known NAC
    ///
    /// When the plain decode fails and `nac` is nonzero, the NAC
    /// field is overwritten with `nac` and decoded again. Sites keep
    /// their NAC constant, so on a channel with a confirmed NAC this
    /// recovers codewords whose errors cluster in the NAC field. If
    /// the retry also fails, the buffer keeps the overwritten field.
    pub fn decode_with_hint(&self, codeword: &mut Codeword, nac: u16) -> CorrectionStatus {
        match self.bch.decode(codeword) {
            CorrectionStatus::Uncorrected if nac != 0 => {
                codeword.set_field(NAC_START, NAC_WIDTH, nac as u32);
                let retry = self.bch.decode(codeword);
                if let CorrectionStatus::Corrected(count) = retry {
                    debug!("NAC 0x{:03X} hint rescued a codeword with {} errors", nac, count);
                }
                retry
            }
            status => status,
        }
    }

    /// The underlying code, for encoding test vectors
    pub fn bch(&self) -> &BchDecoder {
        &self.bch
    }
}

impl Default for NidDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the channel's NAC across successive decodes
///
/// A NAC only counts as confirmed after three identical observations
/// in a row. Until then [`tracked`](Self::tracked) returns `None` and
/// callers should decode without a hint, so a run of miscorrections
/// cannot install a bogus NAC and then "rescue" every later codeword
/// toward it.
#[derive(Clone, Debug, Default)]
pub struct NacTracker {
    window: ArrayDeque<u16, 8, arraydeque::Wrapping>,
}

impl NacTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully decoded NAC
    pub fn track(&mut self, nac: u16) {
        self.window.push_back(nac);
    }

    /// The confirmed NAC, if the last three observations agree
    pub fn tracked(&self) -> Option<u16> {
        if self.window.len() < NAC_CONFIRM_COUNT {
            return None;
        }
        let mut recent = self.window.iter().rev();
        let candidate = *recent.next()?;
        for _ in 1..NAC_CONFIRM_COUNT {
            if *recent.next()? != candidate {
                return None;
            }
        }
        Some(candidate)
    }

    /// Forget all observations, for retunes
    pub fn reset(&mut self) {
        self.window.clear();
    }
}
