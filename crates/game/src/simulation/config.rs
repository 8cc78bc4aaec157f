use serde::{Deserialize, Serialize};

use crate::bullet::{BulletConfig, SweepConfig};

/// Records per packet that keep a spawn packet under 500 bytes.
pub const DEFAULT_MAX_RECORDS_PER_PACKET: usize = 41;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub send_interval: f32,
    pub max_batch: usize,
    pub max_records_per_packet: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_interval: 0.15,
            max_batch: 30,
            max_records_per_packet: DEFAULT_MAX_RECORDS_PER_PACKET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaConfig {
    pub bullet: BulletConfig,
    pub sweep: SweepConfig,
    pub prewarm: usize,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            bullet: BulletConfig::default(),
            sweep: SweepConfig::default(),
            prewarm: 128,
        }
    }
}
