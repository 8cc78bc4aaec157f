use barrage::{DispatchStats, ReplicaStats};

#[derive(Debug, Clone)]
pub enum ServerEvent {
    Started {
        replicas: usize,
        tick_rate: u32,
    },
    TargetJoined,
    LevelChanged {
        level: f32,
    },
    PlayerHit {
        id: u16,
    },
    PacketRejected {
        replica: usize,
        message: String,
    },
    Stats(StatsReport),
    Finished {
        ticks: u64,
        elapsed: f64,
    },
}

#[derive(Debug, Clone)]
pub struct StatsReport {
    pub elapsed: f64,
    pub level: f32,
    pub queued: usize,
    pub dispatch: DispatchStats,
    pub host: ReplicaStats,
    pub host_active: usize,
    pub sweep_runs: usize,
    /// Active bullet count of each loopback replica.
    pub replica_active: Vec<usize>,
    /// Packets the loopback discarded before delivery.
    pub packets_lost: u64,
}
