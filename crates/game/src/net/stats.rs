#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    pub packets_sent: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub releases_sent: u64,
    pub level_updates_sent: u64,
    pub largest_packet: usize,
}

impl DispatchStats {
    pub fn record_packet(&mut self, records: usize, bytes: usize) {
        self.packets_sent += 1;
        self.records_sent += records as u64;
        self.bytes_sent += bytes as u64;
        self.largest_packet = self.largest_packet.max(bytes);
    }

    pub fn average_records_per_packet(&self) -> f32 {
        if self.packets_sent == 0 {
            return 0.0;
        }
        self.records_sent as f32 / self.packets_sent as f32
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplicaStats {
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub bytes_received: u64,
    pub bullets_spawned: u64,
    pub bullets_released: u64,
    pub releases_not_found: u64,
    pub sweeps_started: u64,
    pub sweeps_rejected: u64,
}
