//! The playback thread
//!
//! [`PlaybackManager`] owns a worker thread that drains queued
//! packets into an [`OutputPool`] on a fixed cadence. Producers keep
//! a cheap cloneable sender and never block on audio devices; the
//! worker wakes every drain interval, routes whatever has queued, and
//! lets the pool's own clocks handle reclaim.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, unbounded, Sender};
use thiserror::Error;

#[cfg(not(test))]
use log::info;
#[cfg(test)]
use std::println as info;

use super::output::AudioOutput;
use super::packet::AudioPacket;
use super::pool::OutputPool;

/// Cadence of the drain loop
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(15);

/// Errors from starting playback
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The builder was given no outputs to play to
    #[error("no audio outputs were provided")]
    NoOutputs,

    /// The worker thread could not be spawned
    #[error("unable to start the playback thread")]
    Spawn(#[from] std::io::Error),
}

/// Configures and starts a [`PlaybackManager`]
///
/// ```no_run
/// use trunkold::{AudioOutput, AudioPacket, PlaybackManager};
///
/// # fn outputs() -> Vec<Box<dyn AudioOutput>> { vec![] }
/// let manager = PlaybackManager::builder()
///     .outputs(outputs())
///     .start()
///     .expect("playback start");
///
/// let sender = manager.sender();
/// sender.send(AudioPacket::audio(1, 4, vec![0.0f32; 480])).ok();
/// manager.shutdown();
/// ```
pub struct PlaybackBuilder {
    outputs: Vec<Box<dyn AudioOutput>>,
    interval: Duration,
}

impl PlaybackBuilder {
    pub fn new() -> Self {
        PlaybackBuilder {
            outputs: Vec::new(),
            interval: DRAIN_INTERVAL,
        }
    }

    /// Add one playback output
    pub fn output(mut self, output: Box<dyn AudioOutput>) -> Self {
        self.outputs.push(output);
        self
    }

    /// Replace the output set
    pub fn outputs(mut self, outputs: Vec<Box<dyn AudioOutput>>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Override the drain cadence, mostly for tests
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the playback thread
    pub fn start(self) -> Result<PlaybackManager, PlaybackError> {
        if self.outputs.is_empty() {
            return Err(PlaybackError::NoOutputs);
        }

        let (packet_tx, packet_rx) = unbounded::<AudioPacket>();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let interval = self.interval;
        let mut pool = OutputPool::new(self.outputs);
        info!(
            "audio playback starting with {} outputs, draining every {:?}",
            pool.output_count(),
            interval
        );

        let worker = thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            pool.process(packet_rx.try_iter(), Instant::now());
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                // route anything still queued, then let the outputs go
                pool.process(packet_rx.try_iter(), Instant::now());
                pool.release_all();
            })?;

        Ok(PlaybackManager {
            sender: packet_tx,
            shutdown: shutdown_tx,
            worker: Some(worker),
        })
    }
}

impl Default for PlaybackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the running playback thread
///
/// Dropping the manager stops the thread; [`shutdown`](Self::shutdown)
/// does the same but reads better at call sites. Either way the
/// worker drains the queue once more and releases every output before
/// exiting, so device handles are returned promptly.
#[derive(Debug)]
pub struct PlaybackManager {
    sender: Sender<AudioPacket>,
    shutdown: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackManager {
    pub fn builder() -> PlaybackBuilder {
        PlaybackBuilder::new()
    }

    /// A sender for queueing packets to the playback thread
    ///
    /// Senders are cheap to clone and safe to hold across a shutdown;
    /// sends after shutdown return an error that producers may
    /// ignore.
    pub fn sender(&self) -> Sender<AudioPacket> {
        self.sender.clone()
    }

    /// Stop the worker and wait for it to finish
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for PlaybackManager {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
