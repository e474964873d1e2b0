//! Audio routing and playback
//!
//! Decoded call audio moves through three pieces. [`AudioPacket`]s
//! carry samples from decoder channels. The [`OutputPool`] arbitrates
//! a bounded set of [`AudioOutput`]s between sources, by priority,
//! with preemption and inactivity reclaim. [`PlaybackManager`] puts
//! the pool on its own thread behind a channel so producers never
//! touch a device directly.
//!
//! The pool can also be driven directly, without the thread, by
//! anything that already has a processing loop and a clock.

mod output;
mod packet;
mod playback;
mod pool;

pub use output::AudioOutput;
pub use packet::{AudioPacket, PacketKind, SourceId, SourceIds};
pub use playback::{PlaybackBuilder, PlaybackError, PlaybackManager, DRAIN_INTERVAL};
pub use pool::{OutputPool, STALL_TIMEOUT, STOP_GRACE_PERIOD};
