//! Model orchestrator
//!
//! Owns the mass/spring/actuator arenas and the environment, and advances
//! one fixed step per [`Model::update`] call. The update order is
//! load-bearing: penetration is corrected positionally *before* the inertia
//! half-step (so the carry-over cannot tunnel or inject energy), and the
//! deflecting pass runs *after* it on already-corrected positions.
//!
//! `update` is synchronous and non-reentrant; the driving loop is an
//! external collaborator. A dragged element is `excluded` from force
//! integration but keeps participating in collision geometry, so user
//! drags never fight the integrator. The input layer must clear drag state
//! on every release path; a stuck `excluded` flag freezes a mass.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::actuator::{Actuator, ActuatorKind};
use super::environment::{Environment, WallHit};
use super::mass::{self, Mass};
use super::spring::Spring;
use crate::consts::{
    DEFAULT_FRAME_TIME, DEFAULT_SCALE, HIGHLIGHT_RADIUS_BOOST, HIGHLIGHT_STROKE_WIDTH,
    SELECT_RADIUS_BOOST, WAVE_AMPLITUDE, WAVE_SPEED,
};
use crate::math::within;
use crate::render::{Surface, Theme};

/// Opaque reference to a model element, handed to the input layer.
///
/// Handles stay valid across removals (the model remaps surviving indices)
/// until the referenced element itself is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Mass(usize),
    Spring(usize),
}

/// Shared sinusoid state driving every actuator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waveform {
    pub amplitude: f64,
    pub wave_speed: f64,
    pub time: f64,
    /// +1 or -1; flipped manually or by wall-hit auto-reverse
    #[serde(skip_serializing, default = "default_direction")]
    pub direction: f64,
}

fn default_direction() -> f64 {
    1.0
}

impl Default for Waveform {
    fn default() -> Self {
        Self {
            amplitude: WAVE_AMPLITUDE,
            wave_speed: WAVE_SPEED,
            time: 0.0,
            direction: 1.0,
        }
    }
}

/// One independent sandbox simulation.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) masses: Vec<Mass>,
    pub(crate) springs: Vec<Spring>,
    pub(crate) actuators: Vec<Actuator>,
    pub(crate) environment: Environment,
    pub(crate) scale: f64,
    pub(crate) frame_time: f64,
    pub(crate) steps_per_frame: u32,
    pub(crate) delta: f64,
    pub(crate) collisions_enabled: bool,
    pub(crate) wave: Waveform,
    paused: bool,
    auto_reverse: bool,
    last_wall_hit: Option<WallHit>,
    highlighted: Option<Handle>,
    selected: Option<Handle>,
    dragged: Option<Handle>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            masses: Vec::new(),
            springs: Vec::new(),
            actuators: Vec::new(),
            environment: Environment::default(),
            scale: DEFAULT_SCALE,
            frame_time: DEFAULT_FRAME_TIME,
            steps_per_frame: 1,
            delta: DEFAULT_FRAME_TIME,
            collisions_enabled: false,
            wave: Waveform::default(),
            paused: false,
            auto_reverse: true,
            last_wall_hit: None,
            highlighted: None,
            selected: None,
            dragged: None,
        }
    }

    // --- accessors -------------------------------------------------------

    pub fn masses(&self) -> &[Mass] {
        &self.masses
    }

    pub fn mass_mut(&mut self, index: usize) -> Option<&mut Mass> {
        self.masses.get_mut(index)
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn spring_mut(&mut self, index: usize) -> Option<&mut Spring> {
        self.springs.get_mut(index)
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn wave(&self) -> &Waveform {
        &self.wave
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.scale = scale;
        }
    }

    /// Step size: `frame_time / steps_per_frame`.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn set_frame_time(&mut self, frame_time: f64) {
        if frame_time > 0.0 {
            self.frame_time = frame_time;
            self.delta = self.frame_time / f64::from(self.steps_per_frame);
        }
    }

    pub fn steps_per_frame(&self) -> u32 {
        self.steps_per_frame
    }

    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.steps_per_frame = steps.max(1);
        self.delta = self.frame_time / f64::from(self.steps_per_frame);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn collisions_enabled(&self) -> bool {
        self.collisions_enabled
    }

    pub fn toggle_collisions(&mut self) -> bool {
        self.collisions_enabled = !self.collisions_enabled;
        self.collisions_enabled
    }

    pub fn set_auto_reverse(&mut self, enabled: bool) {
        self.auto_reverse = enabled;
    }

    pub fn set_wave_amplitude(&mut self, amplitude: f64) {
        self.wave.amplitude = amplitude;
    }

    pub fn set_wave_speed(&mut self, speed: f64) {
        self.wave.wave_speed = speed;
    }

    /// Manually flip the wave direction and forget the auto-reverse
    /// hysteresis, so the next wall hit can flip again.
    pub fn toggle_wave(&mut self) {
        self.last_wall_hit = None;
        self.wave.direction = -self.wave.direction;
    }

    // --- entity management -----------------------------------------------

    pub fn add_mass(&mut self, mass: Mass) -> usize {
        self.masses.push(mass);
        self.masses.len() - 1
    }

    /// Add a spring between two existing masses.
    ///
    /// A spring duplicating an existing unordered endpoint pair, a
    /// self-spring, or one referencing a missing mass is silently refused.
    pub fn add_spring(&mut self, spring: Spring) -> Option<usize> {
        if spring.a == spring.b
            || spring.a >= self.masses.len()
            || spring.b >= self.masses.len()
        {
            return None;
        }
        let duplicate = self.springs.iter().any(|s| {
            (s.a == spring.a && s.b == spring.b) || (s.a == spring.b && s.b == spring.a)
        });
        if duplicate {
            return None;
        }
        self.springs.push(spring);
        Some(self.springs.len() - 1)
    }

    /// Remove a mass, cascading to every spring referencing it and every
    /// actuator referencing the mass or a removed spring. Surviving indices
    /// and transient handles are remapped before returning.
    pub fn remove_mass(&mut self, index: usize) {
        if index >= self.masses.len() {
            return;
        }

        let dead_springs: Vec<usize> = self
            .springs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.touches(index))
            .map(|(i, _)| i)
            .collect();
        for &spring_index in dead_springs.iter().rev() {
            self.remove_spring_unchecked(spring_index);
        }

        self.actuators
            .retain(|a| a.kind.targets_spring() || a.acted != index);

        self.masses.remove(index);
        for spring in &mut self.springs {
            if spring.a > index {
                spring.a -= 1;
            }
            if spring.b > index {
                spring.b -= 1;
            }
        }
        for actuator in &mut self.actuators {
            if !actuator.kind.targets_spring() && actuator.acted > index {
                actuator.acted -= 1;
            }
        }

        self.highlighted = remap_mass_handle(self.highlighted, index);
        self.selected = remap_mass_handle(self.selected, index);
        self.dragged = remap_mass_handle(self.dragged, index);

        log::debug!(
            "removed mass {index}, cascaded {} springs",
            dead_springs.len()
        );
    }

    /// Remove a spring and every actuator attached to it.
    pub fn remove_spring(&mut self, index: usize) {
        if index < self.springs.len() {
            self.remove_spring_unchecked(index);
        }
    }

    fn remove_spring_unchecked(&mut self, index: usize) {
        self.actuators
            .retain(|a| !a.kind.targets_spring() || a.acted != index);
        self.springs.remove(index);
        for actuator in &mut self.actuators {
            if actuator.kind.targets_spring() && actuator.acted > index {
                actuator.acted -= 1;
            }
        }
        self.highlighted = remap_spring_handle(self.highlighted, index);
        self.selected = remap_spring_handle(self.selected, index);
        self.dragged = remap_spring_handle(self.dragged, index);
    }

    /// Remove whatever a handle points at; invalid handles are a no-op.
    pub fn remove(&mut self, handle: Handle) {
        match handle {
            Handle::Mass(i) => self.remove_mass(i),
            Handle::Spring(i) => self.remove_spring(i),
        }
    }

    /// Drop all entities, actuators and transient handles. The environment
    /// and timing settings survive.
    pub fn clear(&mut self) {
        self.masses.clear();
        self.springs.clear();
        self.actuators.clear();
        self.highlighted = None;
        self.selected = None;
        self.dragged = None;
    }

    // --- actuators -------------------------------------------------------

    /// Attach an actuator to a target, capturing the acted property's
    /// current value as the restore point. Kind/target mismatches and
    /// missing targets are silently refused.
    pub fn attach_actuator(
        &mut self,
        kind: ActuatorKind,
        target: Handle,
        phase: f64,
        sensitivity: f64,
        multiplier: f64,
    ) -> Option<usize> {
        let acted = match (kind.targets_spring(), target) {
            (true, Handle::Spring(i)) => i,
            (false, Handle::Mass(i)) => i,
            _ => return None,
        };
        let actuator = Actuator::new(
            kind,
            acted,
            phase,
            sensitivity,
            multiplier,
            &self.masses,
            &self.springs,
        )?;
        self.actuators.push(actuator);
        Some(self.actuators.len() - 1)
    }

    /// Detach an actuator, restoring the acted property to its captured
    /// default first.
    pub fn detach_actuator(&mut self, index: usize) {
        if index >= self.actuators.len() {
            return;
        }
        let actuator = self.actuators.remove(index);
        actuator.restore(&mut self.masses, &mut self.springs);
    }

    /// The actuator acting on the given element, if any.
    pub fn actuator_for(&self, target: Handle) -> Option<usize> {
        self.actuators.iter().position(|a| match target {
            Handle::Mass(i) => !a.kind.targets_spring() && a.acted == i,
            Handle::Spring(i) => a.kind.targets_spring() && a.acted == i,
        })
    }

    // --- update pipeline -------------------------------------------------

    /// Advance one fixed step of size [`Model::delta`]. No-op while paused.
    pub fn update(&mut self) {
        if self.paused {
            return;
        }
        let delta = self.delta;

        // Actuators ride the shared wave, then the wave time advances.
        for actuator in &self.actuators {
            actuator.act(
                &mut self.masses,
                &mut self.springs,
                self.wave.amplitude,
                1.0,
                self.wave.time,
            );
        }
        self.wave.time += self.wave.direction * self.wave.wave_speed * delta;

        // Spring forces accumulate into the endpoint masses.
        for spring in &self.springs {
            spring.apply_forces(&mut self.masses, delta);
        }

        // Gravity, drag, carried friction; then the acceleration half-step.
        for m in &mut self.masses {
            m.force += self.environment.gravity * m.mass
                + m.velocity(delta) * -self.environment.drag
                + m.friction_carry;
            self.environment.screen_friction(m);
            m.integrate_acceleration(delta);
            m.force = DVec2::ZERO;
        }

        // Positional collision pass: correct penetration before inertia.
        if self.collisions_enabled {
            for i in 0..self.masses.len() {
                self.collide_mass_with_springs(i);
                mass::collide_masses(&mut self.masses, i, false);
            }
        }

        // Positional boundary pass; wall hits feed the wave auto-reverse.
        for i in 0..self.masses.len() {
            self.environment.boundary_collide(&mut self.masses[i], false);
            let hit = self.environment.screen_boundary_hit(&mut self.masses[i], false);
            self.auto_reverse_check(hit);
        }

        // Inertia half-step.
        for m in &mut self.masses {
            m.integrate_inertia();
        }

        // Deflecting passes on the corrected positions.
        if self.collisions_enabled {
            for i in 0..self.masses.len() {
                mass::collide_masses(&mut self.masses, i, true);
            }
        }
        for m in &mut self.masses {
            self.environment.screen_boundary_hit(m, true);
            self.environment.boundary_collide(m, true);
        }
    }

    /// Flip the wave direction on a changed wall-hit side. The hysteresis
    /// memory keeps a mass resting against a wall from flipping every step.
    fn auto_reverse_check(&mut self, hit: Option<WallHit>) {
        if !self.auto_reverse {
            return;
        }
        if let Some(side) = hit
            && self.last_wall_hit != Some(side)
        {
            self.last_wall_hit = Some(side);
            self.wave.direction = -self.wave.direction;
        }
    }

    /// Positional mass-vs-spring resolution, analogous to the mass-mass
    /// rule set: the correction splits between the mass and the spring's
    /// endpoints, shifting entirely to the movable side when the other is
    /// fixed.
    fn collide_mass_with_springs(&mut self, i: usize) {
        for spring_index in 0..self.springs.len() {
            let (end_a, end_b, group) = {
                let s = &self.springs[spring_index];
                (s.a, s.b, s.collision_group)
            };
            if end_a == i || end_b == i {
                continue;
            }
            if !mass::groups_collide(self.masses[i].collision_group, group) {
                continue;
            }

            let point = self.masses[i].position;
            let radius = self.masses[i].radius;
            let Some(offset) =
                self.springs[spring_index].segment_query(&self.masses, point, radius)
            else {
                continue;
            };
            let correction = offset.normalize_or_zero() * radius - offset;

            let mass_fixed = self.masses[i].fixed;
            let ends_fixed = self.masses[end_a].fixed || self.masses[end_b].fixed;
            if !mass_fixed && !ends_fixed {
                let half = correction / 2.0;
                self.masses[i].position -= half;
                self.masses[i].previous += half;
                self.masses[end_a].position += half;
                self.masses[end_b].position += half;
                self.masses[end_a].previous -= half;
                self.masses[end_b].previous -= half;
            } else if mass_fixed {
                self.masses[end_a].position += correction;
                self.masses[end_b].position += correction;
                self.masses[end_a].previous -= correction;
                self.masses[end_b].previous -= correction;
            } else {
                let half = correction / 2.0;
                self.masses[i].position -= half;
                self.masses[i].previous += half;
            }
        }
    }

    // --- input-layer surface ---------------------------------------------

    /// First mass whose circle (grown by `radius`) contains `point`.
    pub fn nearest_mass(&self, point: DVec2, radius: f64) -> Option<usize> {
        self.masses
            .iter()
            .position(|m| within(m.position, point, m.radius + radius))
    }

    /// First spring passing the segment-proximity test around `point`.
    pub fn nearest_spring(&self, point: DVec2, radius: f64) -> Option<usize> {
        self.springs
            .iter()
            .position(|s| s.segment_query(&self.masses, point, radius).is_some())
    }

    /// Mean mass position, for camera centering.
    pub fn center(&self) -> DVec2 {
        if self.masses.is_empty() {
            return DVec2::ZERO;
        }
        self.masses.iter().map(|m| m.position).sum::<DVec2>() / self.masses.len() as f64
    }

    pub fn set_highlight(&mut self, handle: Option<Handle>) {
        self.highlighted = handle;
    }

    pub fn highlighted(&self) -> Option<Handle> {
        self.highlighted
    }

    pub fn selected(&self) -> Option<Handle> {
        self.selected
    }

    pub fn dragged(&self) -> Option<Handle> {
        self.dragged
    }

    /// Promote the highlighted element to selected and start dragging it.
    ///
    /// Dragged masses are `excluded` from integration with frozen proxies,
    /// so holding an element neither fights the integrator nor flings it.
    pub fn select(&mut self) -> Option<Handle> {
        self.selected = self.highlighted;
        match self.selected {
            Some(Handle::Mass(i)) => {
                if let Some(m) = self.masses.get_mut(i) {
                    m.excluded = true;
                    m.previous = m.position;
                }
            }
            Some(Handle::Spring(i)) => {
                if let Some(s) = self.springs.get(i) {
                    for end in [s.a, s.b] {
                        let m = &mut self.masses[end];
                        m.excluded = true;
                        m.previous = m.position;
                    }
                }
            }
            None => {}
        }
        self.dragged = self.selected;
        self.selected
    }

    /// Select without touching drag/exclusion state.
    pub fn force_select(&mut self, handle: Option<Handle>) {
        self.selected = handle;
    }

    /// Apply a pointer movement, in pixels, to the dragged element.
    ///
    /// While paused the velocity proxy is not preserved, so a paused drag
    /// injects no velocity on resume.
    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        let d = DVec2::new(dx, dy) / self.scale;
        let preserve = !self.paused;
        match self.dragged {
            Some(Handle::Mass(i)) => {
                if let Some(m) = self.masses.get_mut(i) {
                    m.translate(d, preserve);
                }
            }
            Some(Handle::Spring(i)) => {
                if let Some(s) = self.springs.get(i) {
                    let (a, b) = (s.a, s.b);
                    self.masses[a].translate(d, preserve);
                    self.masses[b].translate(d, preserve);
                }
            }
            None => {}
        }
    }

    /// Release the dragged element and clear its exclusion flags.
    ///
    /// Callers must reach this from every pointer release path; an element
    /// left `excluded` never integrates again.
    pub fn clear_drag(&mut self) {
        match self.dragged.take() {
            Some(Handle::Mass(i)) => {
                if let Some(m) = self.masses.get_mut(i) {
                    m.excluded = false;
                }
            }
            Some(Handle::Spring(i)) => {
                if let Some(s) = self.springs.get(i) {
                    for end in [s.a, s.b] {
                        self.masses[end].excluded = false;
                    }
                }
            }
            None => {}
        }
    }

    // --- rendering surface -----------------------------------------------

    /// Emit the scene as abstract circle/segment calls, in pixels.
    ///
    /// Springs draw before masses; highlighted and selected elements get a
    /// wider stroke (springs) or a grown radius (masses); fixed masses draw
    /// a half-radius center dot.
    pub fn draw(&self, surface: &mut dyn Surface, theme: &Theme) {
        for (i, spring) in self.springs.iter().enumerate() {
            let handle = Handle::Spring(i);
            let mut color = theme.spring.as_str();
            let mut width = 1.0f32;
            if self.highlighted == Some(handle) {
                color = &theme.s_highlighted;
                width = HIGHLIGHT_STROKE_WIDTH;
            }
            if self.selected == Some(handle) {
                color = &theme.s_selected;
                width = HIGHLIGHT_STROKE_WIDTH;
            }
            surface.segment(
                self.masses[spring.a].position * self.scale,
                self.masses[spring.b].position * self.scale,
                width,
                color,
            );
        }

        for (i, m) in self.masses.iter().enumerate() {
            let handle = Handle::Mass(i);
            let mut color = theme.mass.as_str();
            let mut boost = 0.0;
            if self.highlighted == Some(handle) {
                color = &theme.m_highlighted;
                boost = HIGHLIGHT_RADIUS_BOOST;
            }
            if self.selected == Some(handle) {
                color = &theme.m_selected;
                boost = SELECT_RADIUS_BOOST;
            }
            surface.circle(m.position * self.scale, (m.radius + boost) * self.scale, color);
            if m.fixed {
                surface.circle(
                    m.position * self.scale,
                    m.radius / 2.0 * self.scale,
                    &theme.fixed_center,
                );
            }
        }
    }
}

fn remap_mass_handle(handle: Option<Handle>, removed: usize) -> Option<Handle> {
    match handle {
        Some(Handle::Mass(i)) if i == removed => None,
        Some(Handle::Mass(i)) if i > removed => Some(Handle::Mass(i - 1)),
        other => other,
    }
}

fn remap_spring_handle(handle: Option<Handle>, removed: usize) -> Option<Handle> {
    match handle {
        Some(Handle::Spring(i)) if i == removed => None,
        Some(Handle::Spring(i)) if i > removed => Some(Handle::Spring(i - 1)),
        other => other,
    }
}
