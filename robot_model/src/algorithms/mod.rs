pub mod articulated_body_algorithm;
pub mod mass_matrix;
pub mod recursive_newton_euler;

use nalgebra::RealField;
use serde::{Deserialize, Serialize};
use spatial_algebra::MotionVector;

use crate::model::RobotModel;

/// Guards divisions by joint space inertia so massless links stay finite.
pub(crate) fn epsilon<T: RealField + Copy>() -> T {
    nalgebra::convert(1e-37)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicsOptions {
    #[serde(default = "default_true")]
    pub include_gravity: bool,
    #[serde(default)]
    pub use_damping: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DynamicsOptions {
    fn default() -> Self {
        Self {
            include_gravity: true,
            use_damping: false,
        }
    }
}

impl DynamicsOptions {
    pub fn new(include_gravity: bool, use_damping: bool) -> Self {
        Self {
            include_gravity,
            use_damping,
        }
    }
}

/// The two ways of computing joint accelerations from applied forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardDynamicsAlgorithm {
    ArticulatedBody,
    MassMatrix,
}

impl ForwardDynamicsAlgorithm {
    /// The articulated body algorithm leaves damping off unless asked,
    /// the mass matrix solve subtracts it by default.
    pub fn default_options(&self) -> DynamicsOptions {
        match self {
            ForwardDynamicsAlgorithm::ArticulatedBody => DynamicsOptions::new(true, false),
            ForwardDynamicsAlgorithm::MassMatrix => DynamicsOptions::new(true, true),
        }
    }
}

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Gravity enters as an upward acceleration of the fixed base.
    pub(crate) fn base_acceleration(&self, include_gravity: bool) -> MotionVector<T> {
        if include_gravity {
            MotionVector::new(nalgebra::Vector3::zeros(), -self.gravity)
        } else {
            MotionVector::zeros()
        }
    }
}
