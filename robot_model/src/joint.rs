use nalgebra::{RealField, Unit, Vector3};
use spatial_algebra::{MotionVector, Transform};

use crate::description::{JointDescription, JointKind};

/// Kinematics of the single axis joint that drives a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointModel<T: RealField + Copy> {
    Fixed,
    Revolute { axis: Unit<Vector3<T>> },
    Prismatic { axis: Unit<Vector3<T>> },
}

impl<T> JointModel<T>
where
    T: RealField + Copy,
{
    /// Returns None when the axis of a moving joint has zero length.
    pub fn from_description(joint: &JointDescription) -> Option<Self> {
        let axis = Vector3::from(joint.axis).map(|x| nalgebra::convert::<f64, T>(x));
        let unit = || Unit::try_new(axis, nalgebra::convert(1e-12));
        match joint.kind {
            JointKind::Fixed => Some(JointModel::Fixed),
            JointKind::Revolute => unit().map(|axis| JointModel::Revolute { axis }),
            JointKind::Prismatic => unit().map(|axis| JointModel::Prismatic { axis }),
        }
    }

    pub fn is_controlled(&self) -> bool {
        !matches!(self, JointModel::Fixed)
    }

    /// Motion subspace S, expressed in the link frame.
    pub fn motion_subspace(&self) -> MotionVector<T> {
        match self {
            JointModel::Fixed => MotionVector::zeros(),
            JointModel::Revolute { axis } => MotionVector::new(axis.into_inner(), Vector3::zeros()),
            JointModel::Prismatic { axis } => MotionVector::new(Vector3::zeros(), axis.into_inner()),
        }
    }

    /// Motion of the joint at position q, child frame to joint frame.
    pub fn transform(&self, q: T) -> Transform<T> {
        match self {
            JointModel::Fixed => Transform::identity(),
            JointModel::Revolute { axis } => Transform::from_axis_angle(axis, q),
            JointModel::Prismatic { axis } => Transform::from_translation(axis.into_inner() * q),
        }
    }

    pub fn velocity(&self, qd: T) -> MotionVector<T> {
        self.motion_subspace() * qd
    }
}
