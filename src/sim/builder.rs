//! Scenario builders
//!
//! Seeds common structures into a model the way the sandbox's construct
//! tool would, one add call at a time, so all the usual dedup and cascade
//! rules apply.

use glam::DVec2;

use super::mass::Mass;
use super::model::Model;
use super::spring::Spring;

/// Generate a `cols` x `rows` lattice of masses with `spacing`, anchored at
/// `origin`, joined by structural springs along rows and columns plus both
/// diagonals per cell. Every spring starts at rest.
///
/// Returns the indices of the created masses in row-major order.
pub fn generate_box(
    model: &mut Model,
    cols: usize,
    rows: usize,
    origin: DVec2,
    spacing: f64,
    radius: f64,
    mass: f64,
    stiffness: f64,
    damping: f64,
) -> Vec<usize> {
    let mut created = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let position = origin + DVec2::new(col as f64, row as f64) * spacing;
            created.push(model.add_mass(Mass::new(position, radius, mass)));
        }
    }

    let at = |col: usize, row: usize| created[row * cols + col];
    let diagonal = spacing * std::f64::consts::SQRT_2;
    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                model.add_spring(Spring::new(
                    at(col, row),
                    at(col + 1, row),
                    spacing,
                    stiffness,
                    damping,
                ));
            }
            if row + 1 < rows {
                model.add_spring(Spring::new(
                    at(col, row),
                    at(col, row + 1),
                    spacing,
                    stiffness,
                    damping,
                ));
            }
            if col + 1 < cols && row + 1 < rows {
                model.add_spring(Spring::new(
                    at(col, row),
                    at(col + 1, row + 1),
                    diagonal,
                    stiffness,
                    damping,
                ));
                model.add_spring(Spring::new(
                    at(col + 1, row),
                    at(col, row + 1),
                    diagonal,
                    stiffness,
                    damping,
                ));
            }
        }
    }

    created
}
