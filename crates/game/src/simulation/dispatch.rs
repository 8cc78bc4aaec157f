use super::config::DispatchConfig;
use super::queue::SpawnQueue;
use crate::net::{DispatchStats, MAX_RECORDS_PER_PAYLOAD, SpawnRecord, encode_spawn_packet};

/// Drains the spawn queue into packets at a fixed send interval.
#[derive(Debug)]
pub struct Dispatcher {
    config: DispatchConfig,
    accumulator: f32,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            stats: DispatchStats::default(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut DispatchStats {
        &mut self.stats
    }

    /// Returns the packets to send this tick, usually none.
    pub fn update(&mut self, dt: f32, queue: &mut SpawnQueue) -> Vec<Vec<u8>> {
        self.accumulator += dt;
        if self.accumulator < self.config.send_interval {
            return Vec::new();
        }
        // reset, not decrement: a late tick must not cause a double send
        self.accumulator = 0.0;
        self.flush(queue)
    }

    /// Sends one batch now, regardless of the interval.
    pub fn flush(&mut self, queue: &mut SpawnQueue) -> Vec<Vec<u8>> {
        let batch = queue.drain_up_to(self.config.max_batch);
        let mut packets = Vec::new();

        for chunk in split_batch(&batch, self.config.max_records_per_packet) {
            match encode_spawn_packet(chunk) {
                Ok(packet) => {
                    self.stats.record_packet(chunk.len(), packet.len());
                    packets.push(packet);
                }
                Err(err) => log::error!("dropping {} spawn records: {err}", chunk.len()),
            }
        }
        packets
    }
}

/// Splits in order; every chunk holds at most `max_records` records.
pub fn split_batch(records: &[SpawnRecord], max_records: usize) -> impl Iterator<Item = &[SpawnRecord]> {
    records.chunks(max_records.clamp(1, MAX_RECORDS_PER_PAYLOAD))
}
