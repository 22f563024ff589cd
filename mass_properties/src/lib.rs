use nalgebra::{Matrix3, RealField, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MassPropertiesErrors {
    #[error("Ixx cant be less than zero")]
    IxxLessThanZero,
    #[error("Iyy cant be less than zero")]
    IyyLessThanZero,
    #[error("Izz cant be less than zero")]
    IzzLessThanZero,
    #[error("mass cannot be less than zero")]
    MassLessThanZero,
    #[error("mass properties must be finite")]
    NotFinite,
    #[error("principal moments violate the triangle inequality")]
    TriangleInequality,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMass<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> CenterOfMass<T>
where
    T: RealField + Copy,
{
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    pub fn vector(&self) -> Vector3<T> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl<T> From<Vector3<T>> for CenterOfMass<T>
where
    T: RealField + Copy,
{
    fn from(v: Vector3<T>) -> CenterOfMass<T> {
        CenterOfMass::new(v[0], v[1], v[2])
    }
}

/// Rotational inertia about the center of mass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Inertia<T> {
    pub ixx: T,
    pub iyy: T,
    pub izz: T,
    #[serde(default)]
    pub ixy: T,
    #[serde(default)]
    pub ixz: T,
    #[serde(default)]
    pub iyz: T,
}

impl<T> Inertia<T>
where
    T: RealField + Copy,
{
    /// Zero moments are accepted so that massless virtual links can be described.
    pub fn new(ixx: T, iyy: T, izz: T, ixy: T, ixz: T, iyz: T) -> Result<Self, MassPropertiesErrors> {
        let inertia = Self {
            ixx,
            iyy,
            izz,
            ixy,
            ixz,
            iyz,
        };
        inertia.validate()?;
        Ok(inertia)
    }

    pub fn zeros() -> Self {
        Self {
            ixx: T::zero(),
            iyy: T::zero(),
            izz: T::zero(),
            ixy: T::zero(),
            ixz: T::zero(),
            iyz: T::zero(),
        }
    }

    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        let values = [self.ixx, self.iyy, self.izz, self.ixy, self.ixz, self.iyz];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MassPropertiesErrors::NotFinite);
        }
        if self.ixx < T::zero() {
            return Err(MassPropertiesErrors::IxxLessThanZero);
        }
        if self.iyy < T::zero() {
            return Err(MassPropertiesErrors::IyyLessThanZero);
        }
        if self.izz < T::zero() {
            return Err(MassPropertiesErrors::IzzLessThanZero);
        }
        // only checked for diagonal tensors, products of inertia rotate the principal axes
        if self.ixy == T::zero() && self.ixz == T::zero() && self.iyz == T::zero() {
            let tol = nalgebra::convert::<f64, T>(1e-9);
            if self.ixx + self.iyy + tol < self.izz
                || self.iyy + self.izz + tol < self.ixx
                || self.izz + self.ixx + tol < self.iyy
            {
                return Err(MassPropertiesErrors::TriangleInequality);
            }
        }
        Ok(())
    }

    pub fn matrix(&self) -> Matrix3<T> {
        Matrix3::new(
            self.ixx, self.ixy, self.ixz, //
            self.ixy, self.iyy, self.iyz, //
            self.ixz, self.iyz, self.izz,
        )
    }
}

impl<T> From<Matrix3<T>> for Inertia<T>
where
    T: RealField + Copy,
{
    /// Takes the upper triangle, the tensor is assumed symmetric.
    fn from(m: Matrix3<T>) -> Inertia<T> {
        Inertia {
            ixx: m[(0, 0)],
            iyy: m[(1, 1)],
            izz: m[(2, 2)],
            ixy: m[(0, 1)],
            ixz: m[(0, 2)],
            iyz: m[(1, 2)],
        }
    }
}

/// Represents the mass properties of an object
/// Mass, Center of Mass, Inertia
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties<T> {
    pub mass: T,
    #[serde(default)]
    pub center_of_mass: CenterOfMass<T>,
    #[serde(default)]
    pub inertia: Inertia<T>,
}

impl<T> Default for MassProperties<T>
where
    T: RealField + Copy,
{
    /// A massless body, used for virtual links and the fixed base.
    fn default() -> Self {
        Self {
            mass: T::zero(),
            center_of_mass: CenterOfMass::new(T::zero(), T::zero(), T::zero()),
            inertia: Inertia::zeros(),
        }
    }
}

impl<T> MassProperties<T>
where
    T: RealField + Copy,
{
    pub fn new(
        mass: T,
        center_of_mass: CenterOfMass<T>,
        inertia: Inertia<T>,
    ) -> Result<Self, MassPropertiesErrors> {
        let mp = MassProperties {
            mass,
            center_of_mass,
            inertia,
        };
        mp.validate()?;
        Ok(mp)
    }

    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        if !self.mass.is_finite() || !self.center_of_mass.vector().iter().all(|c| c.is_finite()) {
            return Err(MassPropertiesErrors::NotFinite);
        }
        if self.mass < T::zero() {
            return Err(MassPropertiesErrors::MassLessThanZero);
        }
        self.inertia.validate()
    }

    /// Casts to another scalar type, e.g. from the f64 description to an autodiff scalar.
    pub fn cast<U>(&self) -> MassProperties<U>
    where
        U: RealField + Copy,
        T: Into<f64>,
    {
        let c = |v: T| nalgebra::convert::<f64, U>(v.into());
        MassProperties {
            mass: c(self.mass),
            center_of_mass: CenterOfMass::new(
                c(self.center_of_mass.x),
                c(self.center_of_mass.y),
                c(self.center_of_mass.z),
            ),
            inertia: Inertia {
                ixx: c(self.inertia.ixx),
                iyy: c(self.inertia.iyy),
                izz: c(self.inertia.izz),
                ixy: c(self.inertia.ixy),
                ixz: c(self.inertia.ixz),
                iyz: c(self.inertia.iyz),
            },
        }
    }

    /// Inertia tensor about the body frame origin (parallel axis theorem).
    pub fn inertia_about_origin(&self) -> Matrix3<T> {
        let cx = self.center_of_mass.vector().cross_matrix();
        self.inertia.matrix() + cx * cx.transpose() * self.mass
    }
}
