//! Global environment: gravity, drag, boundaries, surface friction
//!
//! Boundaries come in two kinds: free-standing polyline segments, and an
//! axis-aligned screen rectangle whose four edges are each independently
//! optional. Both are resolved positionally first and with reflection in
//! the second collision phase (see the model pipeline).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::mass::Mass;
use crate::consts::STATIC_FRICTION_TOLERANCE;
use crate::math::{project, within};

/// A solid line segment masses collide against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Boundary {
    pub a: DVec2,
    pub b: DVec2,
}

/// Axis-aligned screen rectangle; `None` edges are unbounded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
}

/// Which vertical screen edge a mass hit, for wave auto-reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    Left,
    Right,
}

/// Global forces and collision geometry acting on every mass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Acceleration applied to every mass, scaled by its mass
    pub gravity: DVec2,
    /// Linear drag coefficient opposing velocity (not mass-scaled)
    pub drag: f64,
    /// Free-standing solid segments
    pub boundaries: Vec<Boundary>,
    /// Optional rectangular screen edges
    pub screen: ScreenBounds,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DVec2::ZERO, 0.0)
    }
}

impl Environment {
    pub fn new(gravity: DVec2, drag: f64) -> Self {
        Self {
            gravity,
            drag,
            boundaries: Vec::new(),
            screen: ScreenBounds::default(),
        }
    }

    pub fn add_boundary(&mut self, a: DVec2, b: DVec2) {
        self.boundaries.push(Boundary { a, b });
    }

    /// Push `m` out of every overlapped boundary segment along the segment
    /// normal; with `deflect`, also bounce the proxy about the segment
    /// direction.
    pub fn boundary_collide(&self, m: &mut Mass, deflect: bool) {
        for bound in &self.boundaries {
            let ab = bound.b - bound.a;
            let ap = m.position - bound.a;
            let bp = m.position - bound.b;
            let along = project(ap, ab);

            let over_segment = within(along, ap, m.radius)
                && ab.length_squared() > ap.length_squared()
                && ab.length_squared() > bp.length_squared();
            let over_endpoint = within(bound.a, m.position, m.radius)
                || within(bound.b, m.position, m.radius);
            if !(over_segment || over_endpoint) {
                continue;
            }

            let toward = along - ap;
            let correction = toward.normalize_or_zero() * m.radius - toward;
            m.position -= correction;
            m.previous -= correction;
            if deflect {
                m.reflect(ab);
            }
        }
    }

    /// Clamp `m` onto any violated screen edge, preserving the velocity
    /// proxy under the correction; with `deflect`, reflect off the edge.
    ///
    /// Reports a left/right hit so the model can auto-reverse its wave.
    pub fn screen_boundary_hit(&self, m: &mut Mass, deflect: bool) -> Option<WallHit> {
        let mut hit = None;

        if let Some(bottom) = self.screen.bottom
            && m.position.y + m.radius > bottom
        {
            let old = m.position.y;
            m.position.y = bottom - m.radius;
            m.previous.y += m.position.y - old;
            if deflect {
                m.reflect(DVec2::X);
            }
        } else if let Some(top) = self.screen.top
            && m.position.y - m.radius < top
        {
            let old = m.position.y;
            m.position.y = top + m.radius;
            m.previous.y += m.position.y - old;
            if deflect {
                m.reflect(DVec2::X);
            }
        }

        if let Some(right) = self.screen.right
            && m.position.x + m.radius > right
        {
            let old = m.position.x;
            hit = Some(WallHit::Right);
            m.position.x = right - m.radius;
            m.previous.x += m.position.x - old;
            if deflect {
                m.reflect(DVec2::Y);
            }
        } else if let Some(left) = self.screen.left
            && m.position.x - m.radius < left
        {
            let old = m.position.x;
            hit = Some(WallHit::Left);
            m.position.x = left + m.radius;
            m.previous.x += m.position.x - old;
            if deflect {
                m.reflect(DVec2::Y);
            }
        }

        hit
    }

    /// Surface friction for masses resting on the bottom edge.
    ///
    /// Below the displacement tolerance and the static threshold the
    /// lateral force is zeroed and the proxy's x pinned (static lock);
    /// otherwise a kinetic force opposes the lateral displacement.
    pub fn screen_friction(&self, m: &mut Mass) {
        let Some(bottom) = self.screen.bottom else {
            return;
        };
        if m.position.y + m.radius < bottom {
            return;
        }

        let lateral = m.velocity_proxy().x;
        let magnitude = lateral.abs();
        let kinetic = if magnitude > 0.0 {
            m.force.y.abs() * m.mu_k * -(lateral / magnitude)
        } else {
            0.0
        };

        if magnitude < STATIC_FRICTION_TOLERANCE && m.force.x.abs() < m.force.y * m.mu_s {
            m.force.x = 0.0;
            m.previous.x = m.position.x;
        } else {
            m.force.x += kinetic;
        }
    }
}
