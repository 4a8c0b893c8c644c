//! Springs coupling two masses
//!
//! A spring holds arena indices of its endpoints; the model owns the masses
//! and guarantees a spring never outlives them. Forces are accumulated into
//! the endpoint masses, never returned.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::mass::Mass;
use crate::math::project;

/// A damped spring between the masses at arena indices `a` and `b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spring {
    /// Endpoint mass indices
    pub a: usize,
    pub b: usize,
    /// Length at which the spring exerts zero force (> 0)
    pub rest_length: f64,
    /// Spring constant (>= 0)
    pub stiffness: f64,
    /// Axial damping coefficient (>= 0)
    pub damping: f64,
    /// Same semantics as `Mass::collision_group`
    pub collision_group: i32,
}

impl Spring {
    pub fn new(a: usize, b: usize, rest_length: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            a,
            b,
            rest_length,
            stiffness,
            damping,
            collision_group: 0,
        }
    }

    /// Whether `index` is one of the endpoints.
    #[inline]
    pub fn touches(&self, index: usize) -> bool {
        self.a == index || self.b == index
    }

    /// Geometric midpoint of the two endpoints.
    pub fn centroid(&self, masses: &[Mass]) -> DVec2 {
        (masses[self.a].position + masses[self.b].position) / 2.0
    }

    /// Move both endpoints, e.g. when the user drags the spring itself.
    pub fn translate(&self, masses: &mut [Mass], d: DVec2, preserve_velocity: bool) {
        masses[self.a].translate(d, preserve_velocity);
        masses[self.b].translate(d, preserve_velocity);
    }

    /// Perpendicular offset from `point` to the segment, if `point` projects
    /// strictly between the endpoints and lies within `radius` of the
    /// segment. Used for mass-vs-spring overlap and pointer hit-testing.
    pub fn segment_query(&self, masses: &[Mass], point: DVec2, radius: f64) -> Option<DVec2> {
        let pa = masses[self.a].position;
        let pb = masses[self.b].position;
        let ab = pb - pa;
        let len_sq = ab.length_squared();
        let ap = point - pa;
        let bp = point - pb;
        if ap.length_squared() >= len_sq || bp.length_squared() >= len_sq {
            return None;
        }
        let offset = project(ap, ab) - ap;
        (offset.length_squared() < radius * radius).then_some(offset)
    }

    /// Axial spring force on endpoint `a`; `b` receives the negation.
    ///
    /// Magnitude `(length - rest_length) * stiffness`, directed to pull the
    /// spring toward rest length.
    pub fn axial_force(&self, masses: &[Mass]) -> DVec2 {
        let ab = masses[self.b].position - masses[self.a].position;
        let length = ab.length();
        ab.normalize_or_zero() * ((length - self.rest_length) * self.stiffness)
    }

    /// Damping force on endpoint `a`; `b` receives the negation.
    ///
    /// The endpoints' relative velocity, projected onto the spring axis and
    /// scaled by the damping coefficient.
    pub fn damping_force(&self, masses: &[Mass], delta: f64) -> DVec2 {
        let ab = masses[self.b].position - masses[self.a].position;
        let relative =
            (masses[self.b].velocity_proxy() - masses[self.a].velocity_proxy()) / delta;
        project(relative, ab) * self.damping
    }

    /// Accumulate the spring and damping forces into both endpoints.
    pub fn apply_forces(&self, masses: &mut [Mass], delta: f64) {
        let total = self.axial_force(masses) + self.damping_force(masses, delta);
        masses[self.a].force += total;
        masses[self.b].force -= total;
    }
}
