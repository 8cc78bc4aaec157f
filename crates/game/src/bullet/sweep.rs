//! Replay side of the corner patterns.
//!
//! A sweep run lives for several seconds after its record arrives and fires
//! local-only bullets from up to two screen corners:
//!
//! ```text
//! cycle = hold (n volleys, speed ramps up) + sweep (Winder only, +-15 deg sine)
//! run   = cycles * cycle
//! ```

use std::f32::consts::TAU;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::host::Viewport;
use crate::net::{Corner, PatternKind};

pub const SHOT_PER_CORNER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepKind {
    Winder,
    Cage,
}

impl SweepKind {
    pub fn pattern(self) -> PatternKind {
        match self {
            SweepKind::Winder => PatternKind::Winder,
            SweepKind::Cage => PatternKind::Cage,
        }
    }

    pub fn from_pattern(pattern: PatternKind) -> Option<Self> {
        match pattern {
            PatternKind::Winder => Some(SweepKind::Winder),
            PatternKind::Cage => Some(SweepKind::Cage),
            _ => None,
        }
    }

    pub fn has_sweep_phase(self) -> bool {
        self == SweepKind::Winder
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CornerMask: u8 {
        const LEFT_UPPER = 1 << 0;
        const RIGHT_UPPER = 1 << 1;
        const RIGHT_LOWER = 1 << 2;
        const LEFT_LOWER = 1 << 3;
    }
}

impl CornerMask {
    pub fn from_corner(corner: Corner) -> Self {
        Self::from_bits_truncate(1 << corner.index())
    }

    pub fn corners(self) -> impl Iterator<Item = Corner> {
        Corner::ALL
            .into_iter()
            .filter(move |&corner| self.contains(Self::from_corner(corner)))
    }
}

impl From<Corner> for CornerMask {
    fn from(corner: Corner) -> Self {
        Self::from_corner(corner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub hold_seconds: f32,
    pub cycles: u32,
    pub shots_per_corner: usize,
    pub arc_degrees: f32,
    pub sweep_degrees: f32,
    /// Extra speed multiplier reached by the last volley of a hold phase.
    pub speed_ramp: f32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            hold_seconds: 2.0,
            cycles: 2,
            shots_per_corner: SHOT_PER_CORNER,
            arc_degrees: 60.0,
            sweep_degrees: 15.0,
            speed_ramp: 0.5,
        }
    }
}

/// Sweep sense per corner. Corners in the same vertical half turn together.
pub fn sweep_senses(first: Corner, second: Corner) -> [f32; 2] {
    if first.is_upper() == second.is_upper() {
        [1.0, 1.0]
    } else {
        [1.0, -1.0]
    }
}

/// Timing of one run, shared by the authority (for its lock) and replicas.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub kind: SweepKind,
    pub corners: [Corner; 2],
    pub branches: u32,
    pub ratio: f32,
    pub hold: f32,
    pub cycles: u32,
    pub shots_per_corner: usize,
    pub arc: f32,
    pub sweep_amplitude: f32,
    pub speed_ramp: f32,
}

impl SweepPlan {
    pub fn new(
        kind: SweepKind,
        corners: [Corner; 2],
        branches: i32,
        ratio: f32,
        config: &SweepConfig,
    ) -> Self {
        Self {
            kind,
            corners,
            branches: branches.max(1) as u32,
            ratio: ratio.max(f32::EPSILON),
            hold: config.hold_seconds,
            cycles: config.cycles.max(1),
            shots_per_corner: config.shots_per_corner.max(1),
            arc: config.arc_degrees.to_radians(),
            sweep_amplitude: config.sweep_degrees.to_radians(),
            speed_ramp: config.speed_ramp,
        }
    }

    pub fn mask(&self) -> CornerMask {
        CornerMask::from(self.corners[0]) | CornerMask::from(self.corners[1])
    }

    pub fn volley_interval(&self) -> f32 {
        self.hold / self.branches as f32
    }

    pub fn sweep_duration(&self) -> f32 {
        if self.kind.has_sweep_phase() {
            self.hold / self.ratio
        } else {
            0.0
        }
    }

    pub fn cycle_duration(&self) -> f32 {
        self.hold + self.sweep_duration()
    }

    pub fn duration(&self) -> f32 {
        self.cycle_duration() * self.cycles as f32
    }

    /// Offsets of the shots inside the arc, symmetric around the aim.
    pub fn shot_angles(&self) -> Vec<f32> {
        let n = self.shots_per_corner;
        if n == 1 {
            return vec![0.0];
        }
        let step = self.arc / (n - 1) as f32;
        (0..n).map(|i| -self.arc * 0.5 + step * i as f32).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Hold,
    Sweep,
    Finished,
}

/// One local-only bullet requested by a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepShot {
    pub pattern: PatternKind,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed_scale: f32,
}

#[derive(Debug, Clone)]
pub struct SweepRun {
    id: u16,
    plan: SweepPlan,
    senses: [f32; 2],
    cycle: u32,
    phase: SweepPhase,
    phase_time: f32,
    volleys: u32,
}

impl SweepRun {
    pub fn new(id: u16, plan: SweepPlan) -> Self {
        let senses = sweep_senses(plan.corners[0], plan.corners[1]);
        Self {
            id,
            plan,
            senses,
            cycle: 0,
            phase: SweepPhase::Hold,
            phase_time: 0.0,
            volleys: 0,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn kind(&self) -> SweepKind {
        self.plan.kind
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    pub fn senses(&self) -> [f32; 2] {
        self.senses
    }

    pub fn phase(&self) -> SweepPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SweepPhase::Finished
    }

    /// Current sweep rotation per corner, radians.
    pub fn sweep_offsets(&self) -> [f32; 2] {
        if self.phase != SweepPhase::Sweep {
            return [0.0; 2];
        }
        let phase = TAU * self.phase_time / self.plan.sweep_duration();
        let offset = self.plan.sweep_amplitude * phase.sin();
        [offset * self.senses[0], offset * self.senses[1]]
    }

    /// Advances the run by `dt` and pushes every volley that became due.
    pub fn advance(&mut self, dt: f32, viewport: &dyn Viewport, shots: &mut Vec<SweepShot>) {
        if self.is_finished() {
            return;
        }

        self.phase_time += dt;
        loop {
            match self.phase {
                SweepPhase::Hold => {
                    while self.volleys < self.plan.branches
                        && self.volleys as f32 * self.plan.volley_interval() <= self.phase_time
                    {
                        self.fire(viewport, shots);
                        self.volleys += 1;
                    }
                    if self.phase_time < self.plan.hold {
                        break;
                    }
                    self.phase_time -= self.plan.hold;
                    self.volleys = 0;
                    if self.plan.kind.has_sweep_phase() {
                        self.phase = SweepPhase::Sweep;
                    } else {
                        self.next_cycle();
                    }
                }
                SweepPhase::Sweep => {
                    let duration = self.plan.sweep_duration();
                    while self.volleys as f32 * self.plan.volley_interval() <= self.phase_time
                        && (self.volleys as f32) * self.plan.volley_interval() < duration
                    {
                        self.fire(viewport, shots);
                        self.volleys += 1;
                    }
                    if self.phase_time < duration {
                        break;
                    }
                    self.phase_time -= duration;
                    self.volleys = 0;
                    self.next_cycle();
                }
                SweepPhase::Finished => break,
            }
        }
    }

    fn next_cycle(&mut self) {
        self.cycle += 1;
        self.phase = if self.cycle >= self.plan.cycles {
            SweepPhase::Finished
        } else {
            SweepPhase::Hold
        };
    }

    fn speed_scale(&self) -> f32 {
        match self.phase {
            SweepPhase::Hold => {
                let last = self.plan.branches.saturating_sub(1).max(1) as f32;
                1.0 + self.plan.speed_ramp * (self.volleys as f32 / last).min(1.0)
            }
            _ => 1.0 + self.plan.speed_ramp,
        }
    }

    fn fire(&self, viewport: &dyn Viewport, shots: &mut Vec<SweepShot>) {
        let center = viewport.center();
        let offsets = self.sweep_offsets();
        let speed_scale = self.speed_scale();

        for corner in self.plan.mask().corners() {
            let Some(slot) = self.plan.corners.iter().position(|&c| c == corner) else {
                continue;
            };
            let origin = viewport.corner(corner);
            let aim = (center - origin).normalize_or(Vec2::X);

            for angle in self.plan.shot_angles() {
                shots.push(SweepShot {
                    pattern: self.plan.kind.pattern(),
                    origin,
                    direction: Vec2::from_angle(angle + offsets[slot]).rotate(aim),
                    speed_scale,
                });
            }
        }
    }
}
