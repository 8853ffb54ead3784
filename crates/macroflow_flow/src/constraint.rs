//! Physical and timing constraints attached to a project.

use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A die rectangle anchored at the origin, in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DieArea {
    pub width: f64,
    pub height: f64,
}

impl DieArea {
    /// Corner coordinates `[[0, 0], [width, height]]`, as the flow expects them.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[0.0, 0.0], [self.width, self.height]]
    }
}

/// Area constraints. When no die area is set the flow sizes the die from the
/// preset's core density.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaConstraint {
    pub diearea: Option<DieArea>,
}

impl AreaConstraint {
    /// Fixes the die to a `width` x `height` rectangle.
    pub fn set_diearea_rectangle(&mut self, width: f64, height: f64) -> Result<(), FlowError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlowError::InvalidDieArea { width, height });
        }
        self.diearea = Some(DieArea { width, height });
        Ok(())
    }
}

/// Everything a project constrains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub area: AreaConstraint,
    /// SDC files, in the order they were added.
    pub timing: Vec<PathBuf>,
}
