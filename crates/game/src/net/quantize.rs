use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const QUANTIZE_SCALE: f32 = 100.0;
pub const QUANTIZE_BIAS: f32 = 32768.0;
pub const QUANTIZE_MIN: f32 = -327.68;
pub const QUANTIZE_MAX: f32 = 327.67;

/// Fixed-point 2D vector, 0.01 units per step, saturating outside
/// `[QUANTIZE_MIN, QUANTIZE_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QuantizedVec2 {
    pub x: u16,
    pub y: u16,
}

impl QuantizedVec2 {
    pub const ZERO: Self = Self {
        x: 32768,
        y: 32768,
    };

    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn encode(v: Vec2) -> Self {
        Self {
            x: quantize(v.x),
            y: quantize(v.y),
        }
    }

    pub fn decode(self) -> Vec2 {
        Vec2::new(dequantize(self.x), dequantize(self.y))
    }
}

impl From<Vec2> for QuantizedVec2 {
    fn from(v: Vec2) -> Self {
        Self::encode(v)
    }
}

impl From<QuantizedVec2> for Vec2 {
    fn from(q: QuantizedVec2) -> Self {
        q.decode()
    }
}

#[inline]
fn quantize(value: f32) -> u16 {
    // Clamp in float space so huge inputs cannot overflow the bias add.
    let encoded = (value * QUANTIZE_SCALE).round() + QUANTIZE_BIAS;
    encoded.clamp(0.0, u16::MAX as f32) as u16
}

#[inline]
fn dequantize(value: u16) -> f32 {
    (value as f32 - QUANTIZE_BIAS) / QUANTIZE_SCALE
}
