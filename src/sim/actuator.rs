//! Waveform-driven property mutators
//!
//! Each actuator rides the model's shared wave time and mutates exactly one
//! property of its target, scaled from a `default_value` snapshot captured
//! when it was attached. `restore` puts that property back exactly.

use serde::{Deserialize, Serialize};

use super::mass::Mass;
use super::spring::Spring;

/// Discriminates the four actuator variants; doubles as the persisted
/// `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorKind {
    /// Scales a spring's rest length around its default
    SpringMuscle,
    /// Slides a spring's stiffness from its default toward zero
    SpringRelax,
    /// Inflates a mass's radius above its default
    MassBalloon,
    /// Scales a mass's mass above its default
    MassVary,
}

impl ActuatorKind {
    /// Whether `acted` indexes the spring arena (else the mass arena).
    #[inline]
    pub fn targets_spring(self) -> bool {
        matches!(self, ActuatorKind::SpringMuscle | ActuatorKind::SpringRelax)
    }
}

/// An actuator bound to one mass or spring by arena index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actuator {
    #[serde(rename = "type")]
    pub kind: ActuatorKind,
    /// Index into the spring arena for spring kinds, the mass arena otherwise
    pub acted: usize,
    /// Phase offset applied as `phase / |wave_speed|`
    pub phase: f64,
    /// Waveform-to-property gain
    pub sensitivity: f64,
    /// Extra gain for the mass variants
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Property value at attach time; `restore` returns to this exactly
    pub default_value: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Actuator {
    /// Bind to a target, capturing the acted property's current value.
    ///
    /// Returns `None` when `acted` is out of range for the kind's arena.
    pub fn new(
        kind: ActuatorKind,
        acted: usize,
        phase: f64,
        sensitivity: f64,
        multiplier: f64,
        masses: &[Mass],
        springs: &[Spring],
    ) -> Option<Self> {
        let default_value = match kind {
            ActuatorKind::SpringMuscle => springs.get(acted)?.rest_length,
            ActuatorKind::SpringRelax => springs.get(acted)?.stiffness,
            ActuatorKind::MassBalloon => masses.get(acted)?.radius,
            ActuatorKind::MassVary => masses.get(acted)?.mass,
        };
        Some(Self {
            kind,
            acted,
            phase,
            sensitivity,
            multiplier,
            default_value,
        })
    }

    /// Drive the acted property from the phase-shifted sinusoid.
    ///
    /// The update pipeline always passes `wave_speed = 1`; the model's wave
    /// speed scales the advance of `time` instead.
    pub fn act(
        &self,
        masses: &mut [Mass],
        springs: &mut [Spring],
        amplitude: f64,
        wave_speed: f64,
        time: f64,
    ) {
        let wave = (wave_speed * time + self.phase / wave_speed.abs()).sin();
        match self.kind {
            ActuatorKind::SpringMuscle => {
                springs[self.acted].rest_length =
                    self.default_value * (1.0 + amplitude * self.sensitivity * wave);
            }
            ActuatorKind::SpringRelax => {
                let factor = (1.0 + wave) / 2.0;
                springs[self.acted].stiffness = self.default_value * amplitude * (1.0 - factor);
            }
            ActuatorKind::MassBalloon => {
                let factor = (1.0 + wave) / 2.0;
                masses[self.acted].radius = self.default_value
                    * (1.0 + self.multiplier * amplitude * self.sensitivity * factor);
            }
            ActuatorKind::MassVary => {
                let factor = (1.0 + wave) / 2.0;
                masses[self.acted].mass = self.default_value
                    * (1.0 + self.multiplier * amplitude * self.sensitivity * factor);
            }
        }
    }

    /// Return the acted property to its captured default.
    pub fn restore(&self, masses: &mut [Mass], springs: &mut [Spring]) {
        match self.kind {
            ActuatorKind::SpringMuscle => springs[self.acted].rest_length = self.default_value,
            ActuatorKind::SpringRelax => springs[self.acted].stiffness = self.default_value,
            ActuatorKind::MassBalloon => masses[self.acted].radius = self.default_value,
            ActuatorKind::MassVary => masses[self.acted].mass = self.default_value,
        }
    }
}
