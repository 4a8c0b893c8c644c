//! Deterministic simulation module
//!
//! All sandbox physics lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - Stable iteration order (arena order)
//! - No rendering or platform dependencies
//!
//! Cross-entity references (spring endpoints, actuator targets) are indices
//! into the [`Model`]-owned arenas, which is also the persisted wire format.

pub mod actuator;
pub mod builder;
pub mod environment;
pub mod mass;
pub mod model;
pub mod spring;

pub use actuator::{Actuator, ActuatorKind};
pub use builder::generate_box;
pub use environment::{Boundary, Environment, ScreenBounds, WallHit};
pub use mass::Mass;
pub use model::{Handle, Model, Waveform};
pub use spring::Spring;
