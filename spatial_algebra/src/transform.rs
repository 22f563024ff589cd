use nalgebra::{Matrix3, Matrix6, RealField, Rotation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid transform holding the pose of a frame B expressed in a frame A.
///
/// We use the terminology a_from_b so that notation matches matrix multiplication,
/// i.e. p_a = a_from_b * p_b and a_from_c = a_from_b * b_from_c.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform<T: RealField + Copy> {
    pub rotation: Matrix3<T>,
    pub translation: Vector3<T>,
}

impl<T> Default for Transform<T>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self::identity()
    }
}

impl<T> Transform<T>
where
    T: RealField + Copy,
{
    pub fn new(rotation: Matrix3<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn from_translation(translation: Vector3<T>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Fixed axis roll, pitch, yaw: R = Rz(yaw) * Ry(pitch) * Rx(roll)
    pub fn from_xyz_rpy(xyz: Vector3<T>, rpy: Vector3<T>) -> Self {
        let rotation = Rotation3::from_euler_angles(rpy[0], rpy[1], rpy[2]).into_inner();
        Self::new(rotation, xyz)
    }

    /// Rotation by `angle` about a unit `axis`, no translation.
    pub fn from_axis_angle(axis: &Unit<Vector3<T>>, angle: T) -> Self {
        Self::new(
            Rotation3::from_axis_angle(axis, angle).into_inner(),
            Vector3::zeros(),
        )
    }

    #[inline]
    pub fn inv(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self::new(rotation, -(rotation * self.translation))
    }

    #[inline]
    pub fn transform_point(&self, p: &Vector3<T>) -> Vector3<T> {
        self.rotation * p + self.translation
    }

    pub fn quaternion(&self) -> UnitQuaternion<T> {
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(self.rotation))
    }

    /// 6x6 matrix acting on [angular; linear] motion vectors.
    pub fn motion_matrix(&self) -> Matrix6<T> {
        let r = self.rotation;
        let tr = self.translation.cross_matrix() * r;
        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(3, 0).copy_from(&tr);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// 6x6 matrix acting on [angular; linear] force vectors.
    /// Equal to the transpose of the motion matrix of the inverse transform.
    pub fn force_matrix(&self) -> Matrix6<T> {
        let r = self.rotation;
        let tr = self.translation.cross_matrix() * r;
        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(0, 3).copy_from(&tr);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// Re-expresses a 6x6 spatial inertia given in frame B into frame A.
    pub fn transform_inertia(&self, inertia: &Matrix6<T>) -> Matrix6<T> {
        let xf = self.force_matrix();
        xf * inertia * xf.transpose()
    }
}

impl<T> Mul<Transform<T>> for Transform<T>
where
    T: RealField + Copy,
{
    type Output = Transform<T>;
    #[inline]
    fn mul(self, rhs: Transform<T>) -> Transform<T> {
        Transform::new(
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation + self.translation,
        )
    }
}
