mod authority;
mod config;
mod dispatch;
mod queue;
mod replica;
mod tick;

pub use authority::SpawnAuthority;
pub use config::{DEFAULT_MAX_RECORDS_PER_PACKET, DispatchConfig, ReplicaConfig};
pub use dispatch::{Dispatcher, split_batch};
pub use queue::SpawnQueue;
pub use replica::{BULLET_KIND, Replica};
pub use tick::{DEFAULT_TICK_RATE, FixedTimestep};
