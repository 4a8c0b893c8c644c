//! Rendering seam
//!
//! The simulation never touches a canvas. [`crate::sim::Model::draw`] emits
//! abstract circle and segment calls through the [`Surface`] trait, in
//! pixel coordinates, colored by a [`Theme`]. The renderer behind the trait
//! owns all drawing state.

use glam::DVec2;

/// Receiver for the model's draw calls. Coordinates are pixels.
pub trait Surface {
    /// Fill a circle at `center` with `radius`, in the given color token.
    fn circle(&mut self, center: DVec2, radius: f64, color: &str);

    /// Stroke a segment from `a` to `b` with the given width and color token.
    fn segment(&mut self, a: DVec2, b: DVec2, width: f32, color: &str);
}

/// Color tokens for every element state the model distinguishes.
#[derive(Debug, Clone)]
pub struct Theme {
    pub spring: String,
    pub mass: String,
    pub s_highlighted: String,
    pub s_selected: String,
    pub m_highlighted: String,
    pub m_selected: String,
    pub fixed_center: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            spring: "#000000".into(),
            mass: "#1db322".into(),
            s_highlighted: "#62b564".into(),
            s_selected: "#2a70c9".into(),
            m_highlighted: "#62b564".into(),
            m_selected: "#2a70c9".into(),
            fixed_center: "#646464".into(),
        }
    }
}
