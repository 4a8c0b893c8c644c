//! Point masses moved by position Verlet
//!
//! A mass stores its current and previous position; velocity is implicit as
//! their difference (the "velocity proxy", one displacement per step).
//! Forces accumulate into `force` over a step and are cleared by the
//! orchestrator after the acceleration half-step.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MASS_MU_K, MASS_MU_S, MASS_RESTITUTION};
use crate::math::{project, within};

/// A point body with radius, friction and restitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mass {
    /// Current position, meters
    pub position: DVec2,
    /// Position one step ago; `position - previous` is the velocity proxy
    pub previous: DVec2,
    /// Mass, kg (> 0)
    pub mass: f64,
    /// Collision radius, meters
    pub radius: f64,
    /// Bounce coefficient in [0, 1]
    pub restitution: f64,
    /// Static friction coefficient
    pub mu_s: f64,
    /// Kinetic friction coefficient
    pub mu_k: f64,
    /// -1 collides with all, 0 only with -1, >0 with the same group and -1
    pub collision_group: i32,
    /// Per-step force accumulator, cleared after integration
    pub force: DVec2,
    /// Lateral friction force carried into the next step
    pub friction_carry: DVec2,
    /// Permanently excluded from integration
    pub fixed: bool,
    /// Excluded from integration while held by the user; still collides
    #[serde(skip)]
    pub excluded: bool,
}

impl Mass {
    /// New free mass at rest.
    pub fn new(position: DVec2, radius: f64, mass: f64) -> Self {
        Self {
            position,
            previous: position,
            mass,
            radius,
            restitution: MASS_RESTITUTION,
            mu_s: MASS_MU_S,
            mu_k: MASS_MU_K,
            collision_group: 0,
            force: DVec2::ZERO,
            friction_carry: DVec2::ZERO,
            fixed: false,
            excluded: false,
        }
    }

    /// Displacement over the last step (velocity times delta).
    #[inline]
    pub fn velocity_proxy(&self) -> DVec2 {
        self.position - self.previous
    }

    /// Rewrite the previous position so the proxy equals `d`.
    #[inline]
    pub fn set_velocity_proxy(&mut self, d: DVec2) {
        self.previous = self.position - d;
    }

    /// Velocity in m/s.
    pub fn velocity(&self, delta: f64) -> DVec2 {
        self.velocity_proxy() / delta
    }

    /// Set velocity in m/s.
    pub fn set_velocity(&mut self, v: DVec2, delta: f64) {
        self.set_velocity_proxy(v * delta);
    }

    /// Move the mass by `d`.
    ///
    /// With `preserve_velocity` the proxy is untouched; without it the proxy
    /// is zeroed, so a paused drag injects no velocity on release.
    pub fn translate(&mut self, d: DVec2, preserve_velocity: bool) {
        self.position += d;
        if preserve_velocity {
            self.previous += d;
        } else {
            self.previous = self.position;
        }
    }

    /// Verlet acceleration half-step.
    ///
    /// Fixed or held masses instead freeze their proxy, so releasing them
    /// does not replay motion accumulated while they were immobile.
    pub fn integrate_acceleration(&mut self, delta: f64) {
        if !self.fixed && !self.excluded {
            self.position += self.force / self.mass * (delta * delta);
        } else {
            self.previous = self.position;
        }
    }

    /// Verlet inertia half-step: carry last step's displacement forward.
    pub fn integrate_inertia(&mut self) {
        let next = self.position * 2.0 - self.previous;
        self.previous = self.position;
        self.position = next;
    }

    /// Bounce the proxy off a surface running along `tangent`.
    ///
    /// The parallel component survives; the perpendicular one is inverted
    /// and scaled by restitution.
    pub fn reflect(&mut self, tangent: DVec2) {
        let d = self.velocity_proxy();
        let kept = project(d, tangent);
        let inverted = -project(d, tangent.perp()) * self.restitution;
        self.set_velocity_proxy(kept + inverted);
    }

    /// Elastic exchange with `other`, from proxies captured before either
    /// side of the pair was deflected.
    fn deflect_from(&mut self, other: &Mass, v_self: DVec2, v_other: DVec2) {
        let restitution = (self.restitution + other.restitution) / 2.0;
        let axis = self.position - other.position;
        let transfer = project(v_self - v_other, axis)
            * (restitution * 2.0 * other.mass / (self.mass + other.mass));
        self.set_velocity_proxy(v_self - transfer);
    }
}

/// Collision-group eligibility shared by mass-mass and mass-spring checks.
#[inline]
pub(crate) fn groups_collide(a: i32, b: i32) -> bool {
    (a == b && a != 0 && b != 0) || a == -1 || b == -1
}

/// Mutable access to two distinct arena slots.
pub(crate) fn pair_mut(masses: &mut [Mass], i: usize, j: usize) -> (&mut Mass, &mut Mass) {
    debug_assert!(i != j);
    if i < j {
        let (head, tail) = masses.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = masses.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Resolve overlaps between mass `i` and every eligible other mass.
///
/// The minimal separating vector along the center line goes entirely to the
/// movable side when exactly one side is fixed, half to each otherwise.
/// With `deflect`, each movable side additionally receives an elastic
/// velocity exchange computed from proxies captured before any correction
/// (a simultaneous update, not a sequential one).
pub fn collide_masses(masses: &mut [Mass], i: usize, deflect: bool) {
    for j in 0..masses.len() {
        if j == i || !groups_collide(masses[i].collision_group, masses[j].collision_group) {
            continue;
        }
        let (m, other) = pair_mut(masses, i, j);
        if !within(m.position, other.position, m.radius + other.radius) {
            continue;
        }

        let seg = m.position - other.position;
        let correction = seg.normalize_or_zero() * (m.radius + other.radius) - seg;
        let v_m = m.velocity_proxy();
        let v_other = other.velocity_proxy();

        match (m.fixed, other.fixed) {
            (false, false) => {
                m.position += correction * 0.5;
                other.position -= correction * 0.5;
            }
            (true, false) => other.position -= correction,
            (false, true) => m.position += correction,
            (true, true) => {}
        }

        if deflect {
            if !m.fixed {
                m.deflect_from(other, v_m, v_other);
            }
            if !other.fixed {
                other.deflect_from(m, v_other, v_m);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_preserves_proxy() {
        let mut m = Mass::new(DVec2::new(1.0, 1.0), 0.1, 1.0);
        m.set_velocity_proxy(DVec2::new(0.5, 0.0));
        m.translate(DVec2::new(2.0, -1.0), true);
        assert_eq!(m.velocity_proxy(), DVec2::new(0.5, 0.0));
        assert_eq!(m.position, DVec2::new(3.0, 0.0));
    }

    #[test]
    fn translate_without_preserve_zeroes_proxy() {
        let mut m = Mass::new(DVec2::ZERO, 0.1, 1.0);
        m.set_velocity_proxy(DVec2::new(0.5, 0.5));
        m.translate(DVec2::new(2.0, 2.0), false);
        assert_eq!(m.velocity_proxy(), DVec2::ZERO);
    }

    #[test]
    fn fixed_mass_ignores_forces() {
        let mut m = Mass::new(DVec2::new(5.0, 5.0), 0.1, 1.0);
        m.fixed = true;
        m.force = DVec2::new(1000.0, 1000.0);
        m.integrate_acceleration(1.0 / 60.0);
        m.integrate_inertia();
        assert_eq!(m.position, DVec2::new(5.0, 5.0));
    }

    #[test]
    fn reflect_inverts_perpendicular_component() {
        let mut m = Mass::new(DVec2::ZERO, 0.1, 1.0);
        m.restitution = 0.5;
        m.set_velocity_proxy(DVec2::new(1.0, -2.0));
        // Bounce off a horizontal surface.
        m.reflect(DVec2::new(1.0, 0.0));
        let d = m.velocity_proxy();
        assert!((d.x - 1.0).abs() < 1e-12);
        assert!((d.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_splits_correction_between_movable_masses() {
        let mut masses = vec![
            Mass::new(DVec2::new(0.0, 0.0), 0.5, 1.0),
            Mass::new(DVec2::new(0.8, 0.0), 0.5, 1.0),
        ];
        collide_masses(&mut masses, 0, false);
        let gap = masses[1].position.x - masses[0].position.x;
        assert!((gap - 1.0).abs() < 1e-9, "gap = {gap}");
        // Symmetric split.
        assert!((masses[0].position.x + 0.1).abs() < 1e-9);
        assert!((masses[1].position.x - 0.9).abs() < 1e-9);
    }

    #[test]
    fn overlap_with_fixed_side_moves_only_free_mass() {
        let mut masses = vec![
            Mass::new(DVec2::new(0.0, 0.0), 0.5, 1.0),
            Mass::new(DVec2::new(0.8, 0.0), 0.5, 1.0),
        ];
        masses[0].fixed = true;
        collide_masses(&mut masses, 0, false);
        assert_eq!(masses[0].position.x, 0.0);
        assert!((masses[1].position.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn head_on_deflection_swaps_equal_masses() {
        let mut masses = vec![
            Mass::new(DVec2::new(-0.4, 0.0), 0.5, 1.0),
            Mass::new(DVec2::new(0.4, 0.0), 0.5, 1.0),
        ];
        masses[0].restitution = 1.0;
        masses[1].restitution = 1.0;
        masses[0].set_velocity_proxy(DVec2::new(0.1, 0.0));
        masses[1].set_velocity_proxy(DVec2::new(-0.1, 0.0));
        collide_masses(&mut masses, 0, true);
        // Perfectly elastic equal-mass head-on hit exchanges velocities.
        assert!((masses[0].velocity_proxy().x + 0.1).abs() < 1e-9);
        assert!((masses[1].velocity_proxy().x - 0.1).abs() < 1e-9);
    }
}
