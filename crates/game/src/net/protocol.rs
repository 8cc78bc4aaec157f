use serde::{Deserialize, Serialize};

use super::quantize::QuantizedVec2;

pub const RECORD_SIZE: usize = 12;
pub const HEADER_SIZE: usize = 3;
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;
pub const MAX_RECORDS_PER_PAYLOAD: usize = MAX_PAYLOAD_SIZE / RECORD_SIZE;

const RELEASE_PACKET_SIZE: usize = 3;
const LEVEL_PACKET_SIZE: usize = 2;
const LEVEL_SCALE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    BulletSpawn = 1,
    BulletRelease = 2,
    LevelUpdate = 3,
}

impl TryFrom<u8> for PacketKind {
    type Error = MalformedPacket;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::BulletSpawn),
            2 => Ok(Self::BulletRelease),
            3 => Ok(Self::LevelUpdate),
            tag => Err(MalformedPacket::UnknownPacketKind { tag }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PatternKind {
    Normal = 1,
    Spread = 2,
    Fan = 3,
    Winder = 4,
    Cage = 5,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Normal,
        PatternKind::Spread,
        PatternKind::Fan,
        PatternKind::Winder,
        PatternKind::Cage,
    ];

    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Normal => "normal",
            PatternKind::Spread => "spread",
            PatternKind::Fan => "fan",
            PatternKind::Winder => "winder",
            PatternKind::Cage => "cage",
        }
    }
}

impl TryFrom<u8> for PatternKind {
    type Error = MalformedPacket;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Normal),
            2 => Ok(Self::Spread),
            3 => Ok(Self::Fan),
            4 => Ok(Self::Winder),
            5 => Ok(Self::Cage),
            tag => Err(MalformedPacket::UnknownPattern { tag }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub id: u16,
    pub position: QuantizedVec2,
    pub direction: QuantizedVec2,
    pub pattern: PatternKind,
    pub offset: u8,
}

impl SpawnRecord {
    pub fn new(
        id: u16,
        position: QuantizedVec2,
        direction: QuantizedVec2,
        pattern: PatternKind,
        offset: u8,
    ) -> Self {
        Self {
            id,
            position,
            direction,
            pattern,
            offset,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&self.position.x.to_le_bytes());
        out.extend_from_slice(&self.position.y.to_le_bytes());
        out.extend_from_slice(&self.direction.x.to_le_bytes());
        out.extend_from_slice(&self.direction.y.to_le_bytes());
        out.push(self.pattern as u8);
        out.push(self.offset);
    }

    fn read_from(chunk: &[u8; RECORD_SIZE], index: usize) -> Result<Self, MalformedPacket> {
        let word = |at: usize| u16::from_le_bytes([chunk[at], chunk[at + 1]]);

        let id = word(0);
        if id == 0 {
            return Err(MalformedPacket::ZeroId { index });
        }

        Ok(Self {
            id,
            position: QuantizedVec2::new(word(2), word(4)),
            direction: QuantizedVec2::new(word(6), word(8)),
            pattern: PatternKind::try_from(chunk[10])?,
            offset: chunk[11],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPacket {
    #[error("packet of {len} bytes is shorter than its header")]
    Truncated { len: usize },
    #[error("unknown packet kind {tag}")]
    UnknownPacketKind { tag: u8 },
    #[error("expected packet kind {expected:?}, found {found:?}")]
    UnexpectedKind {
        expected: PacketKind,
        found: PacketKind,
    },
    #[error("declared payload of {declared} bytes but {actual} bytes follow")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("payload of {declared} bytes is not a multiple of 12")]
    Misaligned { declared: usize },
    #[error("unknown pattern tag {tag}")]
    UnknownPattern { tag: u8 },
    #[error("record {index} carries the reserved id 0")]
    ZeroId { index: usize },
    #[error("{pattern:?} record {id} carries an invalid corner selector")]
    InvalidCornerSelector { id: u16, pattern: PatternKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("{records} records need {bytes} payload bytes, limit is 65535")]
    PayloadTooLarge { records: usize, bytes: usize },
    #[error("malformed packet: {0}")]
    Malformed(#[from] MalformedPacket),
}

pub fn encode_spawn_packet(records: &[SpawnRecord]) -> Result<Vec<u8>, PacketError> {
    let payload_size = records.len() * RECORD_SIZE;
    if payload_size > MAX_PAYLOAD_SIZE {
        return Err(PacketError::PayloadTooLarge {
            records: records.len(),
            bytes: payload_size,
        });
    }

    let mut buffer = Vec::with_capacity(HEADER_SIZE + payload_size);
    buffer.push(PacketKind::BulletSpawn as u8);
    buffer.extend_from_slice(&(payload_size as u16).to_le_bytes());
    for record in records {
        record.write_to(&mut buffer);
    }

    Ok(buffer)
}

pub fn decode_spawn_packet(data: &[u8]) -> Result<Vec<SpawnRecord>, PacketError> {
    match Packet::decode(data)? {
        Packet::Spawn(records) => Ok(records),
        other => Err(MalformedPacket::UnexpectedKind {
            expected: PacketKind::BulletSpawn,
            found: other.kind(),
        }
        .into()),
    }
}

pub fn encode_release(id: u16) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(RELEASE_PACKET_SIZE);
    buffer.push(PacketKind::BulletRelease as u8);
    buffer.extend_from_slice(&id.to_le_bytes());
    buffer
}

pub fn encode_level(level: f32) -> Vec<u8> {
    let tenths = (level * LEVEL_SCALE).round().clamp(0.0, u8::MAX as f32) as u8;
    vec![PacketKind::LevelUpdate as u8, tenths]
}

/// Any message the spawn channel carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Spawn(Vec<SpawnRecord>),
    Release(u16),
    Level(f32),
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Spawn(_) => PacketKind::BulletSpawn,
            Packet::Release(_) => PacketKind::BulletRelease,
            Packet::Level(_) => PacketKind::LevelUpdate,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        match self {
            Packet::Spawn(records) => encode_spawn_packet(records),
            Packet::Release(id) => Ok(encode_release(*id)),
            Packet::Level(level) => Ok(encode_level(*level)),
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, MalformedPacket> {
        let Some((&tag, body)) = data.split_first() else {
            return Err(MalformedPacket::Truncated { len: 0 });
        };

        match PacketKind::try_from(tag)? {
            PacketKind::BulletSpawn => decode_spawn_body(data.len(), body).map(Packet::Spawn),
            PacketKind::BulletRelease => {
                if data.len() != RELEASE_PACKET_SIZE {
                    return Err(MalformedPacket::Truncated { len: data.len() });
                }
                Ok(Packet::Release(u16::from_le_bytes([body[0], body[1]])))
            }
            PacketKind::LevelUpdate => {
                if data.len() != LEVEL_PACKET_SIZE {
                    return Err(MalformedPacket::Truncated { len: data.len() });
                }
                Ok(Packet::Level(body[0] as f32 / LEVEL_SCALE))
            }
        }
    }
}

fn decode_spawn_body(total_len: usize, body: &[u8]) -> Result<Vec<SpawnRecord>, MalformedPacket> {
    let Some((length, payload)) = body.split_first_chunk::<2>() else {
        return Err(MalformedPacket::Truncated { len: total_len });
    };

    let declared = u16::from_le_bytes(*length) as usize;
    if declared != payload.len() {
        return Err(MalformedPacket::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    if declared % RECORD_SIZE != 0 {
        return Err(MalformedPacket::Misaligned { declared });
    }

    payload
        .chunks_exact(RECORD_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            let chunk: &[u8; RECORD_SIZE] = chunk
                .try_into()
                .map_err(|_| MalformedPacket::Misaligned { declared })?;
            SpawnRecord::read_from(chunk, index)
        })
        .collect()
}
