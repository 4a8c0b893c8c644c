//! Model export/import
//!
//! The persisted document is JSON: an `init` block (environment, waveform,
//! timing) plus the three entity collections. Spring endpoints and actuator
//! targets are stored as indices relative to the start of the document's
//! own collections, so import is *additive*: entities append to whatever
//! the model already holds, with the pre-import collection lengths added to
//! every stored index.
//!
//! Import is atomic: the document is fully validated before any mutation,
//! and a failed import leaves the model untouched. The `init` block is
//! emitted so documents are self-describing, but importing loads the bare
//! entities only - the receiving model keeps its own environment and
//! timing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{Actuator, Environment, Mass, Model, Spring, Waveform};

/// Why a document was rejected. No partial mutation accompanies any of
/// these.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spring {spring} references mass {index} out of range (document has {count})")]
    SpringEndpoint {
        spring: usize,
        index: usize,
        count: usize,
    },

    #[error("actuator {actuator} references target {index} out of range (document has {count})")]
    ActuatorTarget {
        actuator: usize,
        index: usize,
        count: usize,
    },

    #[error("mass {mass} has non-positive or non-finite mass {value}")]
    InvalidMass { mass: usize, value: f64 },

    #[error("mass {mass} has a non-finite position or radius")]
    NonFiniteMass { mass: usize },

    #[error("spring {spring} has non-positive or non-finite rest length {value}")]
    InvalidRestLength { spring: usize, value: f64 },
}

/// Simulation settings snapshot stored alongside the entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Init {
    pub environment: Environment,
    pub waveform: Waveform,
    pub scale: f64,
    pub frame_time: f64,
    pub steps_per_frame: u32,
    pub delta: f64,
    pub collisions_enabled: bool,
}

/// The persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub init: Init,
    pub masses: Vec<Mass>,
    pub springs: Vec<Spring>,
    pub actuators: Vec<Actuator>,
}

impl Document {
    /// Bounds- and sanity-check every cross reference and physical
    /// parameter, without touching any model.
    fn validate(&self) -> Result<(), ImportError> {
        for (i, m) in self.masses.iter().enumerate() {
            if !m.mass.is_finite() || m.mass <= 0.0 {
                return Err(ImportError::InvalidMass {
                    mass: i,
                    value: m.mass,
                });
            }
            if !m.position.is_finite() || !m.previous.is_finite() || !m.radius.is_finite() {
                return Err(ImportError::NonFiniteMass { mass: i });
            }
        }

        for (i, s) in self.springs.iter().enumerate() {
            for index in [s.a, s.b] {
                if index >= self.masses.len() {
                    return Err(ImportError::SpringEndpoint {
                        spring: i,
                        index,
                        count: self.masses.len(),
                    });
                }
            }
            if !s.rest_length.is_finite() || s.rest_length <= 0.0 {
                return Err(ImportError::InvalidRestLength {
                    spring: i,
                    value: s.rest_length,
                });
            }
        }

        for (i, a) in self.actuators.iter().enumerate() {
            let count = if a.kind.targets_spring() {
                self.springs.len()
            } else {
                self.masses.len()
            };
            if a.acted >= count {
                return Err(ImportError::ActuatorTarget {
                    actuator: i,
                    index: a.acted,
                    count,
                });
            }
        }

        Ok(())
    }
}

impl Model {
    /// Serialize the whole model as a pretty-printed JSON document.
    pub fn export(&self) -> Result<String, serde_json::Error> {
        let doc = Document {
            init: Init {
                environment: self.environment.clone(),
                waveform: self.wave.clone(),
                scale: self.scale,
                frame_time: self.frame_time,
                steps_per_frame: self.steps_per_frame,
                delta: self.delta,
                collisions_enabled: self.collisions_enabled,
            },
            masses: self.masses.clone(),
            springs: self.springs.clone(),
            actuators: self.actuators.clone(),
        };
        serde_json::to_string_pretty(&doc)
    }

    /// Append a document's entities to this model.
    ///
    /// Stored indices are offsets into the document's own collections; the
    /// pre-import arena lengths are added before any dereference. The
    /// model's environment and timing settings are not overwritten. On any
    /// validation failure nothing is mutated.
    pub fn import(&mut self, json: &str) -> Result<(), ImportError> {
        let doc: Document = serde_json::from_str(json)?;
        doc.validate()?;

        let mass_offset = self.masses.len();
        let spring_offset = self.springs.len();

        let mass_count = doc.masses.len();
        let spring_count = doc.springs.len();
        let actuator_count = doc.actuators.len();

        self.masses.extend(doc.masses);
        for mut spring in doc.springs {
            spring.a += mass_offset;
            spring.b += mass_offset;
            self.springs.push(spring);
        }
        for mut actuator in doc.actuators {
            actuator.acted += if actuator.kind.targets_spring() {
                spring_offset
            } else {
                mass_offset
            };
            self.actuators.push(actuator);
        }

        log::info!(
            "imported {mass_count} masses, {spring_count} springs, {actuator_count} actuators"
        );
        Ok(())
    }
}
