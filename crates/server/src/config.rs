use barrage::{DifficultyConfig, DispatchConfig, OrthoViewport, PatternConfig, PatternKind, ReplicaConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub tick_rate: u32,
    /// Loopback peers besides the authority's own replica.
    pub replicas: usize,
    pub duration: Option<f32>,
    pub stats_interval: f32,
    pub patterns: Vec<PatternKind>,
    pub target: TargetConfig,
    pub loss_percent: f32,
    pub viewport: OrthoViewport,
    pub pattern: PatternConfig,
    pub dispatch: DispatchConfig,
    pub replica: ReplicaConfig,
    pub difficulty: DifficultyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: barrage::simulation::DEFAULT_TICK_RATE,
            replicas: 2,
            duration: None,
            stats_interval: 5.0,
            patterns: PatternKind::ALL.to_vec(),
            target: TargetConfig::default(),
            loss_percent: 0.0,
            viewport: OrthoViewport::default(),
            pattern: PatternConfig::default(),
            dispatch: DispatchConfig::default(),
            replica: ReplicaConfig::default(),
            difficulty: DifficultyConfig::default(),
        }
    }
}

/// The simulated player the patterns chase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub join_delay: f32,
    pub speed: f32,
    pub hit_radius: f32,
    /// Per-tick chance that a bullet inside `hit_radius` lands.
    pub hit_chance: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            join_delay: 1.0,
            speed: 3.0,
            hit_radius: 0.3,
            hit_chance: 0.25,
        }
    }
}
