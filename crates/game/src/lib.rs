pub mod bullet;
pub mod host;
pub mod net;
pub mod pattern;
pub mod pool;
pub mod simulation;

pub use bullet::{
    Bullet, BulletConfig, BulletEvent, BulletState, Motion, ReleaseReason, SweepConfig, SweepKind,
    SweepPlan, SweepRun,
};
pub use host::{FixedTarget, KinematicActuator, OrthoViewport, PointBody, TargetProvider, Viewport};
pub use net::{
    CodecError, Corner, DispatchStats, MalformedPacket, Packet, PacketError, PacketKind,
    PatternKind, QuantizedVec2, ReplicaStats, ShotDirection, SpawnOrder, SpawnRecord,
};
pub use pattern::{Cadence, Difficulty, DifficultyConfig, PatternConfig, PatternScheduler};
pub use pool::{Handle, ObjectPool, PoolError, PoolStats, Poolable};
pub use simulation::{
    DispatchConfig, Dispatcher, FixedTimestep, Replica, ReplicaConfig, SpawnAuthority, SpawnQueue,
};
