//! Springbox - an interactive 2D mass-spring physics sandbox core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (masses, springs, actuators, collisions)
//! - `render`: Surface trait and color theme consumed by an external renderer
//! - `persistence`: Additive JSON export/import of model state
//!
//! The crate owns no render loop and reads no input devices. An external
//! shell drives [`Model::update`](sim::Model::update) at a fixed timestep,
//! feeds drag deltas and hit queries from its pointer layer, and hands
//! [`Model::draw`](sim::Model::draw) a [`Surface`] implementation.

pub mod math;
pub mod persistence;
pub mod render;
pub mod sim;

pub use persistence::{Document, ImportError};
pub use render::{Surface, Theme};
pub use sim::{
    Actuator, ActuatorKind, Boundary, Environment, Handle, Mass, Model, ScreenBounds, Spring,
    WallHit, Waveform,
};

/// Simulation defaults and tolerances
pub mod consts {
    /// Default frame time (60 Hz)
    pub const DEFAULT_FRAME_TIME: f64 = 1.0 / 60.0;
    /// Default rendering scale in pixels per meter
    pub const DEFAULT_SCALE: f64 = 100.0;

    /// Mass defaults
    pub const MASS_RADIUS: f64 = 0.08;
    pub const MASS_WEIGHT: f64 = 0.16;
    pub const MASS_RESTITUTION: f64 = 0.75;
    pub const MASS_MU_S: f64 = 0.8;
    pub const MASS_MU_K: f64 = 0.6;

    /// Spring defaults
    pub const SPRING_STIFFNESS: f64 = 50.0;
    pub const SPRING_DAMPING: f64 = 5.0;

    /// Wave defaults
    pub const WAVE_AMPLITUDE: f64 = 0.5;
    pub const WAVE_SPEED: f64 = 0.5;

    /// Lateral displacement below this counts as resting for static friction
    pub const STATIC_FRICTION_TOLERANCE: f64 = 1e-4;
    /// Squared length below this is treated as a degenerate axis
    pub const DEGENERATE_AXIS_SQ: f64 = 1e-12;

    /// Stroke width for highlighted/selected springs, in pixels
    pub const HIGHLIGHT_STROKE_WIDTH: f32 = 5.0;
    /// Radius boost for highlighted masses, in meters
    pub const HIGHLIGHT_RADIUS_BOOST: f64 = 0.01;
    /// Radius boost for selected masses, in meters
    pub const SELECT_RADIUS_BOOST: f64 = 0.015;
}
