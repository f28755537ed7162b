//! Per-particle force laws. All forces are per 60 Hz frame.
//!
//! Every function returns `DVec2::ZERO` for degenerate geometry (coincident
//! points, empty neighborhoods) instead of dividing by zero.

use glam::DVec2;

/// Distances below this count as coincident.
const SINGULARITY_EPS: f64 = 1e-9;
/// Radial forces never use a distance smaller than this.
const MIN_FORCE_DISTANCE: f64 = 10.0;

const ORBIT_PULL: f64 = 0.02;
const ORBIT_SPIN: f64 = 0.03;
const WAVE_AMPLITUDE: f64 = 0.08;
const WAVE_FREQUENCY: f64 = 0.05;
const WAVE_SPATIAL_FREQUENCY: f64 = 0.01;
const CENTER_FORCE: f64 = 1.0;
const SEPARATION_WEIGHT: f64 = 1.5;
const ALIGNMENT_WEIGHT: f64 = 0.05;
const COHESION_WEIGHT: f64 = 0.002;
const MAX_FLOCK_FORCE: f64 = 0.3;
const POINTER_FORCE: f64 = 0.5;
pub const ENVIRONMENT_SCALE: f64 = 0.1;

/// Unit vector from `from` toward `to` and the distance between them.
fn direction(from: DVec2, to: DVec2) -> Option<(DVec2, f64)> {
    let delta = to - from;
    let dist = delta.length();
    if dist < SINGULARITY_EPS || !dist.is_finite() {
        None
    } else {
        Some((delta / dist, dist))
    }
}

/// Centripetal pull plus a tangential push around `center`.
pub fn orbit(position: DVec2, center: DVec2, speed: f64) -> DVec2 {
    match direction(position, center) {
        Some((dir, _)) => dir * ORBIT_PULL * speed + dir.perp() * ORBIT_SPIN * speed,
        None => DVec2::ZERO,
    }
}

/// Time-varying sinusoidal lateral force.
pub fn wave(position: DVec2, time: f64, speed: f64) -> DVec2 {
    let phase = time * WAVE_FREQUENCY + position.x * WAVE_SPATIAL_FREQUENCY;
    DVec2::new(0.0, phase.sin() * WAVE_AMPLITUDE * speed)
}

/// Inverse-distance radial force toward `center` (negative `sign` repels).
pub fn radial(position: DVec2, center: DVec2, speed: f64, sign: f64) -> DVec2 {
    match direction(position, center) {
        Some((dir, dist)) => dir * sign * CENTER_FORCE * speed / dist.max(MIN_FORCE_DISTANCE),
        None => DVec2::ZERO,
    }
}

/// Steering from one particle's visible neighbors, as `(position, velocity)`.
///
/// Separation pushes away from close neighbors (weighted by 1/distance),
/// alignment steers toward the average heading, cohesion toward the local
/// center of mass.
pub fn flock(
    position: DVec2,
    velocity: DVec2,
    neighbors: impl Iterator<Item = (DVec2, DVec2)>,
    radius: f64,
) -> DVec2 {
    let mut separation = DVec2::ZERO;
    let mut heading = DVec2::ZERO;
    let mut center = DVec2::ZERO;
    let mut count = 0usize;
    for (p, v) in neighbors {
        let delta = position - p;
        let dist = delta.length();
        if dist < SINGULARITY_EPS || dist > radius {
            continue;
        }
        if dist < radius * 0.5 {
            separation += delta / (dist * dist);
        }
        heading += v;
        center += p;
        count += 1;
    }
    if count == 0 {
        return DVec2::ZERO;
    }
    let n = count as f64;
    let alignment = heading / n - velocity;
    let cohesion = center / n - position;
    (separation * SEPARATION_WEIGHT + alignment * ALIGNMENT_WEIGHT + cohesion * COHESION_WEIGHT)
        .clamp_length_max(MAX_FLOCK_FORCE)
}

/// Pointer force with linear falloff; `falloff` is in [0, 1].
pub fn pointer(position: DVec2, pointer: DVec2, strength: f64, falloff: f64, sign: f64) -> DVec2 {
    if falloff <= 0.0 {
        return DVec2::ZERO;
    }
    match direction(position, pointer) {
        Some((dir, _)) => dir * sign * strength * falloff * POINTER_FORCE,
        None => DVec2::ZERO,
    }
}

/// Push that separates two overlapping discs, applied half to each.
/// Returns the displacement for the first disc.
pub fn separation_push(a: DVec2, ra: f64, b: DVec2, rb: f64) -> Option<DVec2> {
    let (dir, dist) = direction(b, a)?;
    let overlap = ra + rb - dist;
    if overlap <= 0.0 {
        return None;
    }
    Some(dir * overlap * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_give_no_force() {
        let p = DVec2::new(5.0, 5.0);
        assert_eq!(orbit(p, p, 2.0), DVec2::ZERO);
        assert_eq!(radial(p, p, 2.0, 1.0), DVec2::ZERO);
        assert_eq!(pointer(p, p, 1.0, 1.0, 1.0), DVec2::ZERO);
        assert_eq!(separation_push(p, 1.0, p, 1.0), None);
    }

    #[test]
    fn radial_points_toward_center_and_repel_flips() {
        let f = radial(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), 2.0, 1.0);
        assert!(f.x > 0.0 && f.y.abs() < 1e-12);
        let g = radial(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), 2.0, -1.0);
        assert_eq!(g, -f);
    }

    #[test]
    fn radial_is_capped_near_center() {
        let near = radial(DVec2::ZERO, DVec2::new(0.5, 0.0), 1.0, 1.0);
        let at_min = radial(DVec2::ZERO, DVec2::new(10.0, 0.0), 1.0, 1.0);
        assert!((near.length() - at_min.length()).abs() < 1e-12);
    }

    #[test]
    fn orbit_has_tangential_component() {
        let f = orbit(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), 1.0);
        assert!(f.y.abs() > 0.0);
    }

    #[test]
    fn flock_without_neighbors_is_zero() {
        let f = flock(DVec2::ZERO, DVec2::X, std::iter::empty(), 50.0);
        assert_eq!(f, DVec2::ZERO);
    }

    #[test]
    fn flock_separates_close_neighbors() {
        let f = flock(
            DVec2::ZERO,
            DVec2::ZERO,
            std::iter::once((DVec2::new(2.0, 0.0), DVec2::ZERO)),
            50.0,
        );
        assert!(f.x < 0.0);
        assert!(f.length() <= MAX_FLOCK_FORCE + 1e-12);
    }

    #[test]
    fn separation_push_only_when_overlapping() {
        assert!(separation_push(DVec2::ZERO, 1.0, DVec2::new(5.0, 0.0), 1.0).is_none());
        let push = separation_push(DVec2::ZERO, 2.0, DVec2::new(3.0, 0.0), 2.0).unwrap();
        assert!((push.x + 0.5).abs() < 1e-12);
    }

    #[test]
    fn pointer_outside_radius_is_zero() {
        assert_eq!(pointer(DVec2::ZERO, DVec2::X, 1.0, 0.0, 1.0), DVec2::ZERO);
    }
}
