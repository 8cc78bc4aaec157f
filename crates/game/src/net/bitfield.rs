//! Single-byte packings carried in `SpawnRecord::offset`.
//!
//! The byte is interpreted by the record's pattern only; the layouts below are
//! never mixed for the same record.
//!
//! ```text
//! Fan:          | LD:2 | RD:2 | RU:2 | LU:2 |     (bit 7 .. bit 0)
//! Winder/Cage:  |    ratio step:6    | n-4:2 |
//! Spread:       |   interval in tenths:8    |
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const WINDER_MIN_BRANCHES: i32 = 4;
pub const WINDER_MAX_BRANCHES: i32 = 7;
pub const WINDER_MIN_RATIO: f32 = 0.10;
pub const WINDER_MAX_RATIO: f32 = 1.00;
const WINDER_RATIO_STEPS: f32 = 63.0;

const SPREAD_INTERVAL_SCALE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("winder branch count {branches} outside [4, 7]")]
    InvalidWinderArguments { branches: i32 },
}

/// Screen corners in packing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Corner {
    LeftUpper = 0,
    RightUpper = 1,
    RightLower = 2,
    LeftLower = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LeftUpper,
        Corner::RightUpper,
        Corner::RightLower,
        Corner::LeftLower,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Steps clockwise around the screen, wrapping.
    pub fn offset(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps)
    }

    pub fn is_upper(self) -> bool {
        matches!(self, Corner::LeftUpper | Corner::RightUpper)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Corner::RightUpper | Corner::RightLower)
    }

    /// Normalized screen position, `(0,0)` bottom-left.
    pub fn viewport_point(self) -> Vec2 {
        Vec2::new(
            if self.is_right() { 1.0 } else { 0.0 },
            if self.is_upper() { 1.0 } else { 0.0 },
        )
    }

    /// Inverse of [`Corner::viewport_point`]. Only exact 0/1 pairs are accepted.
    pub fn from_viewport_point(p: Vec2) -> Option<Self> {
        let right = unit_flag(p.x)?;
        let upper = unit_flag(p.y)?;
        Some(match (right, upper) {
            (false, true) => Corner::LeftUpper,
            (true, true) => Corner::RightUpper,
            (true, false) => Corner::RightLower,
            (false, false) => Corner::LeftLower,
        })
    }
}

fn unit_flag(value: f32) -> Option<bool> {
    const EPSILON: f32 = 0.01;
    if value.abs() <= EPSILON {
        Some(false)
    } else if (value - 1.0).abs() <= EPSILON {
        Some(true)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShotDirection {
    #[default]
    None = 0,
    Clockwise = 1,
    CounterClockwise = 2,
    Reserved = 3,
}

impl ShotDirection {
    pub const ALL: [ShotDirection; 4] = [
        ShotDirection::None,
        ShotDirection::Clockwise,
        ShotDirection::CounterClockwise,
        ShotDirection::Reserved,
    ];

    fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    /// Rotation sign (+1 counter-clockwise), if this carries one.
    pub fn sign(self) -> Option<f32> {
        match self {
            ShotDirection::Clockwise => Some(-1.0),
            ShotDirection::CounterClockwise => Some(1.0),
            ShotDirection::None | ShotDirection::Reserved => None,
        }
    }

    pub fn from_sign(sign: f32) -> Self {
        if sign < 0.0 {
            ShotDirection::Clockwise
        } else {
            ShotDirection::CounterClockwise
        }
    }
}

pub fn encode_shot_dirs(
    lu: ShotDirection,
    ru: ShotDirection,
    rd: ShotDirection,
    ld: ShotDirection,
) -> u8 {
    (lu as u8) | (ru as u8) << 2 | (rd as u8) << 4 | (ld as u8) << 6
}

pub fn decode_shot_dirs(packed: u8) -> [ShotDirection; 4] {
    [
        ShotDirection::from_bits(packed),
        ShotDirection::from_bits(packed >> 2),
        ShotDirection::from_bits(packed >> 4),
        ShotDirection::from_bits(packed >> 6),
    ]
}

pub fn pack_winder(branches: i32, ratio: f32) -> Result<u8, CodecError> {
    if !(WINDER_MIN_BRANCHES..=WINDER_MAX_BRANCHES).contains(&branches) {
        return Err(CodecError::InvalidWinderArguments { branches });
    }

    let ratio = ratio.clamp(WINDER_MIN_RATIO, WINDER_MAX_RATIO);
    let normalized = (ratio - WINDER_MIN_RATIO) / (WINDER_MAX_RATIO - WINDER_MIN_RATIO);
    let step = (normalized * WINDER_RATIO_STEPS).round() as u8;

    Ok((branches - WINDER_MIN_BRANCHES) as u8 | step << 2)
}

pub fn unpack_winder(packed: u8) -> (i32, f32) {
    let branches = WINDER_MIN_BRANCHES + (packed & 0b11) as i32;
    let step = (packed >> 2) as f32;
    let ratio =
        WINDER_MIN_RATIO + step / WINDER_RATIO_STEPS * (WINDER_MAX_RATIO - WINDER_MIN_RATIO);
    (branches, ratio)
}

pub fn pack_spread_interval(seconds: f32) -> u8 {
    (seconds * SPREAD_INTERVAL_SCALE)
        .round()
        .clamp(1.0, u8::MAX as f32) as u8
}

/// `None` means the sender left the interval to the receiver's default.
pub fn unpack_spread_interval(packed: u8) -> Option<f32> {
    (packed > 0).then(|| packed as f32 / SPREAD_INTERVAL_SCALE)
}
