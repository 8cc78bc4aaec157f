mod bitfield;
mod order;
mod protocol;
mod quantize;
mod stats;

pub use bitfield::{
    CodecError, Corner, ShotDirection, WINDER_MAX_BRANCHES, WINDER_MAX_RATIO,
    WINDER_MIN_BRANCHES, WINDER_MIN_RATIO, decode_shot_dirs, encode_shot_dirs,
    pack_spread_interval, pack_winder, unpack_spread_interval, unpack_winder,
};
pub use order::{SpawnDirection, SpawnOrder};
pub use protocol::{
    HEADER_SIZE, MAX_PAYLOAD_SIZE, MAX_RECORDS_PER_PAYLOAD, MalformedPacket, Packet, PacketError,
    PacketKind, PatternKind, RECORD_SIZE, SpawnRecord, decode_spawn_packet, encode_level,
    encode_release, encode_spawn_packet,
};
pub use quantize::{QUANTIZE_MAX, QUANTIZE_MIN, QuantizedVec2};
pub use stats::{DispatchStats, ReplicaStats};
