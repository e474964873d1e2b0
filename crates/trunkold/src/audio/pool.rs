//! Output assignment and arbitration
//!
//! A fixed set of playback outputs is shared by any number of audio
//! sources. Assignments are made on demand, preempted by priority
//! when the pool is full, and reclaimed on inactivity. All decisions
//! are driven by the caller's clock: [`OutputPool::process`] takes an
//! explicit `now`, so arbitration is deterministic and testable
//! without waiting out real timeouts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[cfg(not(test))]
use log::debug;
#[cfg(test)]
use std::println as debug;

use super::output::AudioOutput;
use super::packet::{AudioPacket, PacketKind, SourceId};

/// How long a finished call keeps its output
///
/// Trunked calls often resume within a couple of seconds; holding the
/// output over that window avoids churning assignments between the
/// hangtime and the next transmission.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(2000);

/// How long a silent call keeps its output
///
/// A source that stops sending audio without an end marker, because
/// its channel died mid-call, is reclaimed after this much inactivity.
pub const STALL_TIMEOUT: Duration = Duration::from_millis(5000);

/// One output and its current assignment
struct OutputConnection {
    output: Box<dyn AudioOutput>,
    source: Option<SourceId>,
    priority: u8,
    last_activity: Instant,
    last_stopped: Option<Instant>,
}

impl OutputConnection {
    fn new(output: Box<dyn AudioOutput>, now: Instant) -> Self {
        OutputConnection {
            output,
            source: None,
            priority: 0,
            last_activity: now,
            last_stopped: None,
        }
    }

    fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    fn connect(&mut self, source: SourceId, priority: u8, now: Instant) {
        self.source = Some(source);
        self.priority = priority;
        self.last_activity = now;
        self.last_stopped = None;
    }

    fn disconnect(&mut self) {
        self.source = None;
        self.priority = 0;
        self.last_stopped = None;
    }

    /// True once the assignment should be released
    ///
    /// A source that announced its end holds the output for the grace
    /// period; one that just went silent holds it for the longer
    /// stall timeout.
    fn is_expired(&self, now: Instant) -> bool {
        match self.last_stopped {
            Some(stopped) => now.duration_since(stopped) >= STOP_GRACE_PERIOD,
            None => now.duration_since(self.last_activity) >= STALL_TIMEOUT,
        }
    }
}

/// Routes audio packets onto a bounded set of outputs
///
/// Sources with an assignment keep it while active. When every output
/// is taken, a new source wins one only by outranking the worst
/// current assignment: strictly higher priority (numerically lower),
/// or an operator-selected packet, which always wins. Everything else
/// is counted as dropped.
pub struct OutputPool {
    connections: Vec<OutputConnection>,
    assignments: HashMap<SourceId, usize>,
    /// connection index holding the worst-ranked assignment, ties
    /// going to the later index
    lowest: Option<usize>,
    available: usize,
    dropped: u64,
}

impl OutputPool {
    pub fn new(outputs: Vec<Box<dyn AudioOutput>>) -> Self {
        let now = Instant::now();
        let available = outputs.len();
        OutputPool {
            connections: outputs
                .into_iter()
                .map(|output| OutputConnection::new(output, now))
                .collect(),
            assignments: HashMap::new(),
            lowest: None,
            available,
            dropped: 0,
        }
    }

    /// Total number of outputs
    pub fn output_count(&self) -> usize {
        self.connections.len()
    }

    /// Outputs with no current assignment
    pub fn available_count(&self) -> usize {
        self.available
    }

    /// Sources currently holding an output
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// True if `source` currently holds an output
    pub fn is_assigned(&self, source: SourceId) -> bool {
        self.assignments.contains_key(&source)
    }

    /// Packets dropped because no output could be won
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Release expired assignments, then route a batch of packets
    ///
    /// `now` stamps all activity and expiry decisions for this batch.
    pub fn process<I>(&mut self, packets: I, now: Instant)
    where
        I: IntoIterator<Item = AudioPacket>,
    {
        self.reclaim(now);
        for packet in packets {
            self.route(packet, now);
        }
    }

    /// Drop every assignment, regardless of age
    pub fn release_all(&mut self) {
        self.assignments.clear();
        for connection in &mut self.connections {
            connection.disconnect();
        }
        self.available = self.connections.len();
        self.lowest = None;
    }

    fn reclaim(&mut self, now: Instant) {
        let mut changed = false;
        for connection in &mut self.connections {
            if let Some(source) = connection.source {
                if connection.is_expired(now) {
                    debug!(
                        "released output \"{}\" from source {}",
                        connection.output.channel_name(),
                        source
                    );
                    self.assignments.remove(&source);
                    connection.disconnect();
                    self.available += 1;
                    changed = true;
                }
            }
        }
        if changed {
            self.update_lowest();
        }
    }

    fn route(&mut self, packet: AudioPacket, now: Instant) {
        match packet.kind() {
            PacketKind::End => {
                if let Some(&index) = self.assignments.get(&packet.source()) {
                    let connection = &mut self.connections[index];
                    connection.last_stopped = Some(now);
                    connection.output.receive(packet);
                }
                // an end marker from an unassigned source needs nothing
            }
            PacketKind::Audio => {
                if let Some(&index) = self.assignments.get(&packet.source()) {
                    self.forward(index, packet, now);
                } else if self.available > 0 {
                    self.assign_free(packet, now);
                } else {
                    self.preempt_or_drop(packet, now);
                }
            }
        }
    }

    fn assign_free(&mut self, packet: AudioPacket, now: Instant) {
        // available > 0 guarantees a disconnected connection exists
        if let Some(index) = self.connections.iter().position(|c| !c.is_connected()) {
            debug!(
                "assigned output \"{}\" to source {} at priority {}",
                self.connections[index].output.channel_name(),
                packet.source(),
                packet.priority()
            );
            self.connections[index].connect(packet.source(), packet.priority(), now);
            self.assignments.insert(packet.source(), index);
            self.available -= 1;
            self.update_lowest();
            self.forward(index, packet, now);
        }
    }

    fn preempt_or_drop(&mut self, packet: AudioPacket, now: Instant) {
        let target = match self.lowest {
            Some(index)
                if packet.is_selected() || packet.priority() < self.connections[index].priority =>
            {
                index
            }
            _ => {
                self.dropped += 1;
                debug!(
                    "dropped audio from source {} at priority {}: every output is busy",
                    packet.source(),
                    packet.priority()
                );
                return;
            }
        };

        if let Some(evicted) = self.connections[target].source {
            self.assignments.remove(&evicted);
            debug!(
                "source {} at priority {} preempted source {} on output \"{}\"",
                packet.source(),
                packet.priority(),
                evicted,
                self.connections[target].output.channel_name()
            );
        }
        self.connections[target].connect(packet.source(), packet.priority(), now);
        self.assignments.insert(packet.source(), target);
        self.update_lowest();
        self.forward(target, packet, now);
    }

    /// Deliver to an assigned connection, refreshing its bookkeeping
    fn forward(&mut self, index: usize, packet: AudioPacket, now: Instant) {
        let priority_changed = {
            let connection = &mut self.connections[index];
            let changed = connection.priority != packet.priority();
            connection.priority = packet.priority();
            connection.last_activity = now;
            connection.last_stopped = None;
            changed
        };
        if priority_changed {
            self.update_lowest();
        }
        self.connections[index].output.receive(packet);
    }

    /// Recompute which assignment is the preemption candidate
    ///
    /// Larger priority values rank worse. On a tie the later
    /// connection wins, so repeated preemptions rotate rather than
    /// hammering the first output.
    fn update_lowest(&mut self) {
        let mut lowest: Option<usize> = None;
        for (index, connection) in self.connections.iter().enumerate() {
            if !connection.is_connected() {
                continue;
            }
            let replaces = match lowest {
                Some(current) => connection.priority >= self.connections[current].priority,
                None => true,
            };
            if replaces {
                lowest = Some(index);
            }
        }
        self.lowest = lowest;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Test output that records which sources reached it
    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<(SourceId, PacketKind)>>>,
    }

    impl Recorder {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<(SourceId, PacketKind)>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            (
                Recorder {
                    name: name.into(),
                    log: Arc::clone(&log),
                },
                log,
            )
        }
    }

    impl AudioOutput for Recorder {
        fn channel_name(&self) -> &str {
            &self.name
        }

        fn receive(&mut self, packet: AudioPacket) {
            self.log.lock().unwrap().push((packet.source(), packet.kind()));
        }
    }

    fn pool_with(count: usize) -> (OutputPool, Vec<Arc<Mutex<Vec<(SourceId, PacketKind)>>>>) {
        let mut outputs: Vec<Box<dyn AudioOutput>> = Vec::new();
        let mut logs = Vec::new();
        for i in 0..count {
            let (recorder, log) = Recorder::new(&format!("output-{}", i));
            outputs.push(Box::new(recorder));
            logs.push(log);
        }
        (OutputPool::new(outputs), logs)
    }

    fn audio(source: SourceId, priority: u8) -> AudioPacket {
        AudioPacket::audio(source, priority, vec![0.0; 4])
    }

    #[test]
    fn sources_keep_their_assignment() {
        let (mut pool, logs) = pool_with(2);
        let t0 = Instant::now();

        pool.process([audio(1, 5), audio(2, 5), audio(1, 5)], t0);
        assert_eq!(pool.assigned_count(), 2);
        assert_eq!(pool.available_count(), 0);

        // source 1's packets both landed on the same output
        assert_eq!(
            logs[0].lock().unwrap().as_slice(),
            &[(1, PacketKind::Audio), (1, PacketKind::Audio)]
        );
        assert_eq!(logs[1].lock().unwrap().as_slice(), &[(2, PacketKind::Audio)]);
    }

    #[test]
    fn one_source_starves_when_pool_short() {
        let (mut pool, logs) = pool_with(2);
        let t0 = Instant::now();

        for round in 0..3 {
            let now = t0 + Duration::from_millis(15 * round);
            pool.process([audio(1, 5), audio(2, 5), audio(3, 5)], now);
        }

        assert!(pool.is_assigned(1));
        assert!(pool.is_assigned(2));
        assert!(!pool.is_assigned(3));
        assert_eq!(pool.dropped_count(), 3);
        for log in &logs {
            assert!(log.lock().unwrap().iter().all(|&(source, _)| source != 3));
        }
    }

    #[test]
    fn higher_priority_preempts_when_full() {
        let (mut pool, _logs) = pool_with(2);
        let t0 = Instant::now();

        pool.process([audio(1, 5), audio(2, 5)], t0);
        assert_eq!(pool.available_count(), 0);

        // priority 1 outranks priority 5
        pool.process([audio(3, 1)], t0 + Duration::from_millis(15));
        assert!(pool.is_assigned(3));
        assert_eq!(pool.assigned_count(), 2);
        let survivors = [1u32, 2]
            .iter()
            .filter(|&&s| pool.is_assigned(s))
            .count();
        assert_eq!(survivors, 1);
        assert_eq!(pool.dropped_count(), 0);
    }

    #[test]
    fn equal_priority_does_not_preempt() {
        let (mut pool, _logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 5)], t0);
        pool.process([audio(2, 5)], t0 + Duration::from_millis(15));

        assert!(pool.is_assigned(1));
        assert!(!pool.is_assigned(2));
        assert_eq!(pool.dropped_count(), 1);
    }

    #[test]
    fn selected_packet_preempts_regardless_of_priority() {
        let (mut pool, _logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 1)], t0);
        let selected = AudioPacket::audio(2, 9, vec![0.0; 4]).with_selected();
        pool.process([selected], t0 + Duration::from_millis(15));

        assert!(pool.is_assigned(2));
        assert!(!pool.is_assigned(1));
    }

    #[test]
    fn priority_updates_move_the_preemption_target() {
        let (mut pool, _logs) = pool_with(2);
        let t0 = Instant::now();

        pool.process([audio(1, 5), audio(2, 6)], t0);
        // source 2 improves to priority 1; source 1 is now the worst
        pool.process([audio(2, 1)], t0 + Duration::from_millis(15));
        pool.process([audio(3, 3)], t0 + Duration::from_millis(30));

        assert!(pool.is_assigned(2));
        assert!(pool.is_assigned(3));
        assert!(!pool.is_assigned(1));
    }

    #[test]
    fn grace_period_holds_then_releases() {
        let (mut pool, _logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 5)], t0);
        pool.process([AudioPacket::end(1)], t0 + Duration::from_millis(10));

        // inside the grace window the assignment holds and blocks
        // other sources
        pool.process([audio(2, 5)], t0 + Duration::from_millis(1500));
        assert!(pool.is_assigned(1));
        assert!(!pool.is_assigned(2));

        // past the window the output is released and reusable
        pool.process([audio(2, 5)], t0 + Duration::from_millis(2011));
        assert!(!pool.is_assigned(1));
        assert!(pool.is_assigned(2));
    }

    #[test]
    fn resumed_audio_cancels_the_grace_clock() {
        let (mut pool, _logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 5)], t0);
        pool.process([AudioPacket::end(1)], t0 + Duration::from_millis(10));
        pool.process([audio(1, 5)], t0 + Duration::from_millis(500));

        // well past the original grace deadline, but the call resumed
        pool.process([], t0 + Duration::from_millis(3000));
        assert!(pool.is_assigned(1));
    }

    #[test]
    fn silent_sources_are_reclaimed_after_stall_timeout() {
        let (mut pool, _logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 5)], t0);
        pool.process([], t0 + Duration::from_millis(4999));
        assert!(pool.is_assigned(1));

        pool.process([], t0 + Duration::from_millis(5001));
        assert!(!pool.is_assigned(1));
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn end_markers_reach_the_output() {
        let (mut pool, logs) = pool_with(1);
        let t0 = Instant::now();

        pool.process([audio(1, 5)], t0);
        pool.process([AudioPacket::end(1)], t0 + Duration::from_millis(10));

        assert_eq!(
            logs[0].lock().unwrap().as_slice(),
            &[(1, PacketKind::Audio), (1, PacketKind::End)]
        );

        // an end marker for a source that holds nothing is ignored
        pool.process([AudioPacket::end(9)], t0 + Duration::from_millis(20));
        assert_eq!(pool.dropped_count(), 0);
    }

    #[test]
    fn empty_pool_drops_everything() {
        let (mut pool, _logs) = pool_with(0);
        let t0 = Instant::now();

        pool.process([audio(1, 0), audio(2, 0)], t0);
        assert_eq!(pool.dropped_count(), 2);
        assert_eq!(pool.assigned_count(), 0);
    }

    #[test]
    fn release_all_frees_every_output() {
        let (mut pool, _logs) = pool_with(2);
        let t0 = Instant::now();

        pool.process([audio(1, 5), audio(2, 5)], t0);
        pool.release_all();

        assert_eq!(pool.assigned_count(), 0);
        assert_eq!(pool.available_count(), 2);

        // outputs are immediately reusable
        pool.process([audio(3, 5)], t0 + Duration::from_millis(1));
        assert!(pool.is_assigned(3));
    }
}
