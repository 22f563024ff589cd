use mass_properties::MassProperties;
use nalgebra::{Matrix3, Matrix6, RealField, Vector3, Vector6};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

pub mod transform;
pub use transform::Transform;

/// Six dimensional vector stored as an angular and a linear part, in that order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialVector<T: RealField + Copy> {
    pub rotation: Vector3<T>,
    pub translation: Vector3<T>,
}

impl<T> Default for SpatialVector<T>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T> SpatialVector<T>
where
    T: RealField + Copy,
{
    pub fn new(rotation: Vector3<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn zeros() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    pub fn vector(&self) -> Vector6<T> {
        Vector6::new(
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.translation[0],
            self.translation[1],
            self.translation[2],
        )
    }

    ///Featherstone 2.34
    pub fn cross_force(&self, rhs: &SpatialVector<T>) -> SpatialVector<T> {
        let new_rotation =
            self.rotation.cross(&rhs.rotation) + self.translation.cross(&rhs.translation);
        let new_translation = self.rotation.cross(&rhs.translation);
        SpatialVector::new(new_rotation, new_translation)
    }

    /// Featherstone 2.33
    pub fn cross_motion(&self, rhs: &SpatialVector<T>) -> SpatialVector<T> {
        let new_rotation = self.rotation.cross(&rhs.rotation);
        let new_translation =
            self.rotation.cross(&rhs.translation) + self.translation.cross(&rhs.rotation);
        SpatialVector::new(new_rotation, new_translation)
    }

    pub fn dot(&self, rhs: &SpatialVector<T>) -> T {
        self.rotation.dot(&rhs.rotation) + self.translation.dot(&rhs.translation)
    }
}

impl<T> From<Vector6<T>> for SpatialVector<T>
where
    T: RealField + Copy,
{
    fn from(v: Vector6<T>) -> SpatialVector<T> {
        SpatialVector::new(Vector3::new(v[0], v[1], v[2]), Vector3::new(v[3], v[4], v[5]))
    }
}

impl<T> Add<SpatialVector<T>> for SpatialVector<T>
where
    T: RealField + Copy,
{
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rotation + rhs.rotation,
            self.translation + rhs.translation,
        )
    }
}

impl<T> Sub<SpatialVector<T>> for SpatialVector<T>
where
    T: RealField + Copy,
{
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.rotation - rhs.rotation,
            self.translation - rhs.translation,
        )
    }
}

impl<T> Neg for SpatialVector<T>
where
    T: RealField + Copy,
{
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.rotation, -self.translation)
    }
}

impl<T> Mul<T> for SpatialVector<T>
where
    T: RealField + Copy,
{
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.rotation * rhs, self.translation * rhs)
    }
}

/// Velocities and accelerations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector<T: RealField + Copy>(pub SpatialVector<T>);

impl<T> MotionVector<T>
where
    T: RealField + Copy,
{
    pub fn new(rotation: Vector3<T>, translation: Vector3<T>) -> Self {
        Self(SpatialVector::new(rotation, translation))
    }

    pub fn zeros() -> Self {
        Self(SpatialVector::zeros())
    }

    #[inline]
    pub fn rotation(&self) -> &Vector3<T> {
        &self.0.rotation
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<T> {
        &self.0.translation
    }

    pub fn vector(&self) -> Vector6<T> {
        self.0.vector()
    }

    pub fn cross_motion(&self, rhs: &MotionVector<T>) -> MotionVector<T> {
        MotionVector(self.0.cross_motion(&rhs.0))
    }

    pub fn cross_force(&self, rhs: &ForceVector<T>) -> ForceVector<T> {
        ForceVector(self.0.cross_force(&rhs.0))
    }

    /// Power of a force acting along this motion.
    pub fn dot(&self, force: &ForceVector<T>) -> T {
        self.0.dot(&force.0)
    }
}

impl<T> From<Vector6<T>> for MotionVector<T>
where
    T: RealField + Copy,
{
    fn from(v: Vector6<T>) -> Self {
        Self(SpatialVector::from(v))
    }
}

impl<T> Add<MotionVector<T>> for MotionVector<T>
where
    T: RealField + Copy,
{
    type Output = MotionVector<T>;
    #[inline]
    fn add(self, rhs: MotionVector<T>) -> MotionVector<T> {
        MotionVector(self.0 + rhs.0)
    }
}

impl<T> AddAssign<MotionVector<T>> for MotionVector<T>
where
    T: RealField + Copy,
{
    #[inline]
    fn add_assign(&mut self, rhs: MotionVector<T>) {
        self.0 = self.0 + rhs.0;
    }
}

impl<T> Sub<MotionVector<T>> for MotionVector<T>
where
    T: RealField + Copy,
{
    type Output = MotionVector<T>;
    #[inline]
    fn sub(self, rhs: MotionVector<T>) -> MotionVector<T> {
        MotionVector(self.0 - rhs.0)
    }
}

impl<T> Neg for MotionVector<T>
where
    T: RealField + Copy,
{
    type Output = MotionVector<T>;
    #[inline]
    fn neg(self) -> MotionVector<T> {
        MotionVector(-self.0)
    }
}

impl<T> Mul<T> for MotionVector<T>
where
    T: RealField + Copy,
{
    type Output = MotionVector<T>;
    #[inline]
    fn mul(self, rhs: T) -> MotionVector<T> {
        MotionVector(self.0 * rhs)
    }
}

/// Forces, torques and momenta.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceVector<T: RealField + Copy>(pub SpatialVector<T>);

impl<T> ForceVector<T>
where
    T: RealField + Copy,
{
    pub fn new(rotation: Vector3<T>, translation: Vector3<T>) -> Self {
        Self(SpatialVector::new(rotation, translation))
    }

    pub fn zeros() -> Self {
        Self(SpatialVector::zeros())
    }

    #[inline]
    pub fn rotation(&self) -> &Vector3<T> {
        &self.0.rotation
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<T> {
        &self.0.translation
    }

    pub fn vector(&self) -> Vector6<T> {
        self.0.vector()
    }
}

impl<T> From<Vector6<T>> for ForceVector<T>
where
    T: RealField + Copy,
{
    fn from(v: Vector6<T>) -> Self {
        Self(SpatialVector::from(v))
    }
}

impl<T> Add<ForceVector<T>> for ForceVector<T>
where
    T: RealField + Copy,
{
    type Output = ForceVector<T>;
    #[inline]
    fn add(self, rhs: ForceVector<T>) -> ForceVector<T> {
        ForceVector(self.0 + rhs.0)
    }
}

impl<T> AddAssign<ForceVector<T>> for ForceVector<T>
where
    T: RealField + Copy,
{
    #[inline]
    fn add_assign(&mut self, rhs: ForceVector<T>) {
        self.0 = self.0 + rhs.0;
    }
}

impl<T> Sub<ForceVector<T>> for ForceVector<T>
where
    T: RealField + Copy,
{
    type Output = ForceVector<T>;
    #[inline]
    fn sub(self, rhs: ForceVector<T>) -> ForceVector<T> {
        ForceVector(self.0 - rhs.0)
    }
}

impl<T> Mul<T> for ForceVector<T>
where
    T: RealField + Copy,
{
    type Output = ForceVector<T>;
    #[inline]
    fn mul(self, rhs: T) -> ForceVector<T> {
        ForceVector(self.0 * rhs)
    }
}

impl<T> Mul<MotionVector<T>> for Transform<T>
where
    T: RealField + Copy,
{
    type Output = MotionVector<T>;
    fn mul(self, motion: MotionVector<T>) -> MotionVector<T> {
        let rotation = self.rotation * motion.0.rotation;
        let translation =
            self.rotation * motion.0.translation + self.translation.cross(&rotation);
        MotionVector::new(rotation, translation)
    }
}

impl<T> Mul<ForceVector<T>> for Transform<T>
where
    T: RealField + Copy,
{
    type Output = ForceVector<T>;
    fn mul(self, force: ForceVector<T>) -> ForceVector<T> {
        let translation = self.rotation * force.0.translation;
        let rotation = self.rotation * force.0.rotation + self.translation.cross(&translation);
        ForceVector::new(rotation, translation)
    }
}

/// Rigid body inertia expressed about the body frame origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialInertia<T: RealField + Copy>(pub MassProperties<T>);

impl<T> SpatialInertia<T>
where
    T: RealField + Copy,
{
    pub fn matrix(&self) -> Matrix6<T> {
        let mp = self.0;
        let mass = mp.mass;
        let cx = mp.center_of_mass.vector().cross_matrix();
        let cxt = cx.transpose();

        let quad11 = mp.inertia.matrix() + cx * cxt * mass;
        let quad12 = cx * mass;
        let quad21 = cxt * mass;
        let quad22 = Matrix3::identity() * mass;

        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&quad11);
        m.fixed_view_mut::<3, 3>(0, 3).copy_from(&quad12);
        m.fixed_view_mut::<3, 3>(3, 0).copy_from(&quad21);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&quad22);
        m
    }
}

impl<T> From<MassProperties<T>> for SpatialInertia<T>
where
    T: RealField + Copy,
{
    fn from(value: MassProperties<T>) -> SpatialInertia<T> {
        SpatialInertia(value)
    }
}

impl<T> Mul<MotionVector<T>> for SpatialInertia<T>
where
    T: RealField + Copy,
{
    type Output = ForceVector<T>;
    fn mul(self, motion: MotionVector<T>) -> ForceVector<T> {
        let mp = self.0;
        let h = mp.center_of_mass.vector() * mp.mass;
        let w = motion.0.rotation;
        let v = motion.0.translation;
        let rotation = mp.inertia_about_origin() * w + h.cross(&v);
        let translation = v * mp.mass - h.cross(&w);
        ForceVector::new(rotation, translation)
    }
}
