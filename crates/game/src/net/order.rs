use glam::Vec2;

use crate::bullet::SweepKind;

use super::bitfield::{
    CodecError, Corner, ShotDirection, decode_shot_dirs, encode_shot_dirs, pack_spread_interval,
    pack_winder, unpack_spread_interval, unpack_winder,
};
use super::protocol::{MalformedPacket, PatternKind, SpawnRecord};
use super::quantize::QuantizedVec2;

/// What the four direction bytes of a record mean once the pattern is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnDirection {
    Velocity(Vec2),
    CornerSelector(Corner),
}

impl SpawnRecord {
    pub fn direction_payload(&self) -> Result<SpawnDirection, MalformedPacket> {
        match self.pattern {
            PatternKind::Normal | PatternKind::Spread => {
                Ok(SpawnDirection::Velocity(self.direction.decode()))
            }
            PatternKind::Fan | PatternKind::Winder | PatternKind::Cage => {
                self.corner_field(self.direction).map(SpawnDirection::CornerSelector)
            }
        }
    }

    fn corner_field(&self, field: QuantizedVec2) -> Result<Corner, MalformedPacket> {
        Corner::from_viewport_point(field.decode()).ok_or(MalformedPacket::InvalidCornerSelector {
            id: self.id,
            pattern: self.pattern,
        })
    }
}

/// A spawn record decoded into the parameters its pattern needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOrder {
    Normal {
        id: u16,
        position: Vec2,
        direction: Vec2,
    },
    Spread {
        id: u16,
        position: Vec2,
        direction: Vec2,
        interval: Option<f32>,
    },
    Fan {
        id: u16,
        position: Vec2,
        pivot: Corner,
        shots: [ShotDirection; 4],
    },
    Sweep {
        id: u16,
        kind: SweepKind,
        corners: [Corner; 2],
        branches: i32,
        ratio: f32,
    },
}

impl SpawnOrder {
    pub fn id(&self) -> u16 {
        match *self {
            SpawnOrder::Normal { id, .. }
            | SpawnOrder::Spread { id, .. }
            | SpawnOrder::Fan { id, .. }
            | SpawnOrder::Sweep { id, .. } => id,
        }
    }

    pub fn pattern(&self) -> PatternKind {
        match self {
            SpawnOrder::Normal { .. } => PatternKind::Normal,
            SpawnOrder::Spread { .. } => PatternKind::Spread,
            SpawnOrder::Fan { .. } => PatternKind::Fan,
            SpawnOrder::Sweep { kind, .. } => kind.pattern(),
        }
    }

    pub fn to_record(&self) -> Result<SpawnRecord, CodecError> {
        let record = match *self {
            SpawnOrder::Normal {
                id,
                position,
                direction,
            } => SpawnRecord::new(
                id,
                position.into(),
                direction.into(),
                PatternKind::Normal,
                0,
            ),
            SpawnOrder::Spread {
                id,
                position,
                direction,
                interval,
            } => SpawnRecord::new(
                id,
                position.into(),
                direction.into(),
                PatternKind::Spread,
                interval.map_or(0, pack_spread_interval),
            ),
            SpawnOrder::Fan {
                id,
                position,
                pivot,
                shots,
            } => SpawnRecord::new(
                id,
                position.into(),
                pivot.viewport_point().into(),
                PatternKind::Fan,
                encode_shot_dirs(shots[0], shots[1], shots[2], shots[3]),
            ),
            SpawnOrder::Sweep {
                id,
                kind,
                corners,
                branches,
                ratio,
            } => SpawnRecord::new(
                id,
                corners[0].viewport_point().into(),
                corners[1].viewport_point().into(),
                kind.pattern(),
                pack_winder(branches, ratio)?,
            ),
        };
        Ok(record)
    }
}

impl TryFrom<&SpawnRecord> for SpawnOrder {
    type Error = MalformedPacket;

    fn try_from(record: &SpawnRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let order = match (record.pattern, record.direction_payload()?) {
            (PatternKind::Normal, SpawnDirection::Velocity(direction)) => SpawnOrder::Normal {
                id,
                position: record.position.decode(),
                direction,
            },
            (PatternKind::Spread, SpawnDirection::Velocity(direction)) => SpawnOrder::Spread {
                id,
                position: record.position.decode(),
                direction,
                interval: unpack_spread_interval(record.offset),
            },
            (PatternKind::Fan, SpawnDirection::CornerSelector(pivot)) => SpawnOrder::Fan {
                id,
                position: record.position.decode(),
                pivot,
                shots: decode_shot_dirs(record.offset),
            },
            (pattern @ (PatternKind::Winder | PatternKind::Cage), SpawnDirection::CornerSelector(second)) => {
                let first = record.corner_field(record.position)?;
                if first == second {
                    return Err(MalformedPacket::InvalidCornerSelector { id, pattern });
                }
                let (branches, ratio) = unpack_winder(record.offset);
                let Some(kind) = SweepKind::from_pattern(pattern) else {
                    return Err(MalformedPacket::InvalidCornerSelector { id, pattern });
                };
                SpawnOrder::Sweep {
                    id,
                    kind,
                    corners: [first, second],
                    branches,
                    ratio,
                }
            }
            (pattern, _) => return Err(MalformedPacket::InvalidCornerSelector { id, pattern }),
        };
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_direction_is_a_selector() {
        let order = SpawnOrder::Fan {
            id: 9,
            position: Vec2::new(-12.5, 4.0),
            pivot: Corner::RightLower,
            shots: [
                ShotDirection::None,
                ShotDirection::Clockwise,
                ShotDirection::CounterClockwise,
                ShotDirection::None,
            ],
        };
        let record = order.to_record().unwrap();

        assert_eq!(
            record.direction_payload(),
            Ok(SpawnDirection::CornerSelector(Corner::RightLower))
        );
        assert_eq!(SpawnOrder::try_from(&record), Ok(order));
    }

    #[test]
    fn normal_direction_is_a_velocity() {
        let record = SpawnOrder::Normal {
            id: 1,
            position: Vec2::new(3.0, 4.0),
            direction: Vec2::new(0.6, -0.8),
        }
        .to_record()
        .unwrap();

        let Ok(SpawnDirection::Velocity(direction)) = record.direction_payload() else {
            panic!("expected velocity payload");
        };
        assert!((direction - Vec2::new(0.6, -0.8)).length() < 0.01);
    }

    #[test]
    fn sweep_corners_survive_the_wire() {
        let record = SpawnOrder::Sweep {
            id: 77,
            kind: SweepKind::Winder,
            corners: [Corner::LeftUpper, Corner::RightLower],
            branches: 6,
            ratio: 0.4,
        }
        .to_record()
        .unwrap();

        let SpawnOrder::Sweep {
            kind,
            corners,
            branches,
            ratio,
            ..
        } = SpawnOrder::try_from(&record).unwrap()
        else {
            panic!("expected sweep order");
        };
        assert_eq!(kind, SweepKind::Winder);
        assert_eq!(corners, [Corner::LeftUpper, Corner::RightLower]);
        assert_eq!(branches, 6);
        assert!((ratio - 0.4).abs() < 0.008);
    }

    #[test]
    fn cage_keeps_its_kind_on_the_wire() {
        let order = SpawnOrder::Sweep {
            id: 12,
            kind: SweepKind::Cage,
            corners: [Corner::RightUpper, Corner::LeftLower],
            branches: 5,
            ratio: 1.0,
        };
        let record = order.to_record().unwrap();
        assert_eq!(record.pattern, PatternKind::Cage);

        let decoded = SpawnOrder::try_from(&record).unwrap();
        assert!(matches!(
            decoded,
            SpawnOrder::Sweep {
                kind: SweepKind::Cage,
                ..
            }
        ));
    }

    #[test]
    fn sweep_rejects_invalid_branches_before_transmission() {
        let order = SpawnOrder::Sweep {
            id: 1,
            kind: SweepKind::Cage,
            corners: [Corner::LeftUpper, Corner::RightUpper],
            branches: 9,
            ratio: 0.5,
        };
        assert_eq!(
            order.to_record(),
            Err(CodecError::InvalidWinderArguments { branches: 9 })
        );
    }

    #[test]
    fn bad_selectors_are_malformed() {
        let mut record = SpawnRecord::new(
            5,
            QuantizedVec2::ZERO,
            QuantizedVec2::encode(Vec2::new(0.5, 0.5)),
            PatternKind::Fan,
            0,
        );
        assert_eq!(
            SpawnOrder::try_from(&record),
            Err(MalformedPacket::InvalidCornerSelector {
                id: 5,
                pattern: PatternKind::Fan,
            })
        );

        record.pattern = PatternKind::Cage;
        record.direction = QuantizedVec2::encode(Vec2::ZERO);
        record.position = QuantizedVec2::encode(Vec2::ZERO);
        assert!(SpawnOrder::try_from(&record).is_err());
    }
}
