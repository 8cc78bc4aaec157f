use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::config::PatternConfig;
use crate::bullet::{SweepKind, local_fan_sense};
use crate::host::Viewport;
use crate::net::{
    Corner, ShotDirection, SpawnOrder, WINDER_MAX_BRANCHES, WINDER_MIN_BRANCHES,
};

/// A point on the circle just outside the visible area.
pub fn spawn_point<R: Rng>(rng: &mut R, viewport: &dyn Viewport, margin: f32) -> Vec2 {
    let radius = viewport.half_diagonal() + margin;
    let angle = rng.random_range(0.0..TAU);
    viewport.center() + Vec2::from_angle(angle) * radius
}

/// Direction from `from` to the target, or to a point near it.
pub fn aim<R: Rng>(rng: &mut R, from: Vec2, target: Vec2, config: &PatternConfig) -> Vec2 {
    let aim_point = if rng.random_bool(config.exact_aim_chance.clamp(0.0, 1.0)) {
        target
    } else {
        target + random_in_disk(rng, config.aim_jitter_radius)
    };
    (aim_point - from).normalize_or(Vec2::X)
}

fn random_in_disk<R: Rng>(rng: &mut R, radius: f32) -> Vec2 {
    let r = radius * rng.random::<f32>().sqrt();
    Vec2::from_angle(rng.random_range(0.0..TAU)) * r
}

/// Two distinct corners: the first uniform, the second 1 to 3 steps after it.
pub fn pick_corners<R: Rng>(rng: &mut R) -> [Corner; 2] {
    let first = Corner::from_index(rng.random_range(0..4));
    let second = first.offset(rng.random_range(1..=3));
    [first, second]
}

/// Rotation sense per corner for a fan starting at `position`, `None` for
/// corners that were not selected, plus the chosen pivot.
pub fn fan_shots<R: Rng>(
    rng: &mut R,
    position: Vec2,
    viewport: &dyn Viewport,
) -> ([ShotDirection; 4], Corner) {
    let center = viewport.center();
    let mut selected: Vec<Corner> = Corner::ALL
        .into_iter()
        .filter(|_| rng.random_bool(0.5))
        .collect();
    if selected.is_empty() {
        selected.push(Corner::from_index(rng.random_range(0..4)));
    }

    let mut shots = [ShotDirection::None; 4];
    for &corner in &selected {
        let sense = local_fan_sense(position, viewport.corner(corner), center);
        shots[corner.index()] = ShotDirection::from_sign(sense);
    }

    let pivot = selected[rng.random_range(0..selected.len())];
    (shots, pivot)
}

pub fn sweep_order<R: Rng>(
    rng: &mut R,
    id: u16,
    kind: SweepKind,
    config: &PatternConfig,
) -> SpawnOrder {
    let ratio = if config.winder_max_ratio > config.winder_min_ratio {
        rng.random_range(config.winder_min_ratio..=config.winder_max_ratio)
    } else {
        config.winder_min_ratio
    };

    SpawnOrder::Sweep {
        id,
        kind,
        corners: pick_corners(rng),
        branches: rng.random_range(WINDER_MIN_BRANCHES..=WINDER_MAX_BRANCHES),
        ratio,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::bullet::signed_angle;
    use crate::host::OrthoViewport;

    #[test]
    fn spawn_points_are_off_screen() {
        let viewport = OrthoViewport::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = spawn_point(&mut rng, &viewport, 3.0);
            let vp = viewport.world_to_viewport(p);
            assert!(!(-0.08..=1.08).contains(&vp.x) || !(-0.08..=1.08).contains(&vp.y));
            assert!((p.length() - (viewport.half_diagonal() + 3.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn aim_stays_near_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = PatternConfig::default();
        let from = Vec2::new(-20.0, 0.0);
        let target = Vec2::new(0.0, 0.0);

        let mut exact = 0;
        for _ in 0..400 {
            let dir = aim(&mut rng, from, target, &config);
            assert!((dir.length() - 1.0).abs() < 1e-5);
            // within 5 units of the target at distance 20
            assert!(signed_angle(Vec2::X, dir).abs() <= (5.0f32 / 20.0).asin() + 1e-4);
            if dir == Vec2::X {
                exact += 1;
            }
        }
        assert!((120..=280).contains(&exact), "{exact}");
    }

    #[test]
    fn corners_always_differ() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let [a, b] = pick_corners(&mut rng);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn fan_pivot_is_selected_and_senses_match_geometry() {
        let viewport = OrthoViewport::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let position = spawn_point(&mut rng, &viewport, 3.0);
            let (shots, pivot) = fan_shots(&mut rng, position, &viewport);

            assert_ne!(shots[pivot.index()], ShotDirection::None);
            for corner in Corner::ALL {
                let shot = shots[corner.index()];
                if shot == ShotDirection::None {
                    continue;
                }
                let sense = local_fan_sense(position, viewport.corner(corner), viewport.center());
                assert_eq!(shot.sign(), Some(sense));
            }
        }
    }

    #[test]
    fn sweep_orders_encode() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = PatternConfig::default();
        for id in 1..50 {
            let order = sweep_order(&mut rng, id, SweepKind::Winder, &config);
            assert!(order.to_record().is_ok());
        }
    }
}
