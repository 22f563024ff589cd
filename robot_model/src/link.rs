use mass_properties::{CenterOfMass, Inertia, MassProperties};
use nalgebra::{Matrix3, Matrix6, RealField, Vector3, Vector6};
use spatial_algebra::{ForceVector, MotionVector, SpatialInertia, Transform};

use crate::{
    description::{JointLimits, LinkDescription},
    joint::JointModel,
    parameter::{LearnableParameter, LinkParameter, Parameter},
};

fn cast3<T: RealField + Copy>(v: [f64; 3]) -> Vector3<T> {
    Vector3::from(v).map(|x| nalgebra::convert::<f64, T>(x))
}

/// Physical parameters of a link and of the joint that drives it.
#[derive(Debug, Clone)]
pub struct LinkParameters<T: RealField + Copy> {
    pub mass: Parameter<T>,
    pub center_of_mass: Parameter<Vector3<T>>,
    pub inertia: Parameter<Matrix3<T>>,
    pub damping: Parameter<T>,
    pub translation: Parameter<Vector3<T>>,
    pub rotation: Parameter<Vector3<T>>,
}

impl<T> LinkParameters<T>
where
    T: RealField + Copy,
{
    pub fn from_description(link: &LinkDescription) -> Self {
        let inertial = link.inertial.cast::<T>();
        Self {
            mass: Parameter::constant(inertial.mass),
            center_of_mass: Parameter::constant(inertial.center_of_mass.vector()),
            inertia: Parameter::constant(inertial.inertia.matrix()),
            damping: Parameter::constant(nalgebra::convert(link.joint.damping)),
            translation: Parameter::constant(cast3(link.joint.origin.xyz)),
            rotation: Parameter::constant(cast3(link.joint.origin.rpy)),
        }
    }

    pub fn replace(&mut self, learnable: LearnableParameter<T>) {
        match learnable {
            LearnableParameter::Mass(p) => self.mass = Parameter::learned(p),
            LearnableParameter::CenterOfMass(p) => self.center_of_mass = Parameter::learned(p),
            LearnableParameter::Inertia(p) => self.inertia = Parameter::learned(p),
            LearnableParameter::Damping(p) => self.damping = Parameter::learned(p),
            LearnableParameter::Translation(p) => self.translation = Parameter::learned(p),
            LearnableParameter::Rotation(p) => self.rotation = Parameter::learned(p),
        }
    }

    /// Returns false when the parameter is a constant.
    pub fn freeze(&mut self, parameter: LinkParameter) -> bool {
        match parameter {
            LinkParameter::Mass => self.mass.freeze(),
            LinkParameter::CenterOfMass => self.center_of_mass.freeze(),
            LinkParameter::Inertia => self.inertia.freeze(),
            LinkParameter::Damping => self.damping.freeze(),
            LinkParameter::Translation => self.translation.freeze(),
            LinkParameter::Rotation => self.rotation.freeze(),
        }
    }

    pub fn unfreeze(&mut self, parameter: LinkParameter) -> bool {
        match parameter {
            LinkParameter::Mass => self.mass.unfreeze(),
            LinkParameter::CenterOfMass => self.center_of_mass.unfreeze(),
            LinkParameter::Inertia => self.inertia.unfreeze(),
            LinkParameter::Damping => self.damping.unfreeze(),
            LinkParameter::Translation => self.translation.unfreeze(),
            LinkParameter::Rotation => self.rotation.unfreeze(),
        }
    }

    pub fn is_learnable(&self, parameter: LinkParameter) -> bool {
        self.state(parameter).0
    }

    /// (learnable, frozen)
    pub fn state(&self, parameter: LinkParameter) -> (bool, bool) {
        fn s<V: Clone>(p: &Parameter<V>) -> (bool, bool) {
            (p.is_learnable(), p.is_frozen())
        }
        match parameter {
            LinkParameter::Mass => s(&self.mass),
            LinkParameter::CenterOfMass => s(&self.center_of_mass),
            LinkParameter::Inertia => s(&self.inertia),
            LinkParameter::Damping => s(&self.damping),
            LinkParameter::Translation => s(&self.translation),
            LinkParameter::Rotation => s(&self.rotation),
        }
    }

    pub fn resolve(&self) -> ResolvedParameters<T> {
        let mass_properties = MassProperties {
            mass: self.mass.value(),
            center_of_mass: CenterOfMass::from(self.center_of_mass.value()),
            inertia: Inertia::from(self.inertia.value()),
        };
        ResolvedParameters {
            inertia: SpatialInertia(mass_properties),
            damping: self.damping.value(),
            origin: Transform::from_xyz_rpy(self.translation.value(), self.rotation.value()),
        }
    }
}

/// Parameter values for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedParameters<T: RealField + Copy> {
    pub inertia: SpatialInertia<T>,
    pub damping: T,
    /// Joint frame in the parent link frame
    pub origin: Transform<T>,
}

impl<T> Default for ResolvedParameters<T>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self {
            inertia: SpatialInertia(MassProperties::default()),
            damping: T::zero(),
            origin: Transform::identity(),
        }
    }
}

/// Per batch row scratch space of the articulated body algorithm.
#[derive(Debug, Clone)]
pub struct AbaCache<T: RealField + Copy> {
    pub c: Vec<MotionVector<T>>,
    /// pA, the articulated bias force
    pub p_big_a: Vec<ForceVector<T>>,
    pub inertia_articulated: Vec<Matrix6<T>>,
    pub big_u: Vec<Vector6<T>>,
    pub big_d: Vec<T>,
    pub lil_u: Vec<T>,
}

impl<T> Default for AbaCache<T>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self {
            c: Vec::new(),
            p_big_a: Vec::new(),
            inertia_articulated: Vec::new(),
            big_u: Vec::new(),
            big_d: Vec::new(),
            lil_u: Vec::new(),
        }
    }
}

/// Per call state of a link, one entry per batch row.
/// Every public entry point overwrites what it reads before reading it.
#[derive(Debug, Clone)]
pub struct LinkCache<T: RealField + Copy> {
    pub parameters: ResolvedParameters<T>,
    pub q: Vec<T>,
    pub qd: Vec<T>,
    pub qdd: Vec<T>,
    /// Link frame in the parent link frame
    pub joint_pose: Vec<Transform<T>>,
    /// Link frame in the base frame
    pub pose: Vec<Transform<T>>,
    pub vj: Vec<MotionVector<T>>,
    pub v: Vec<MotionVector<T>>,
    pub a: Vec<MotionVector<T>>,
    pub f: Vec<ForceVector<T>>,
    pub aba: AbaCache<T>,
}

impl<T> Default for LinkCache<T>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self {
            parameters: ResolvedParameters::default(),
            q: Vec::new(),
            qd: Vec::new(),
            qdd: Vec::new(),
            joint_pose: Vec::new(),
            pose: Vec::new(),
            vj: Vec::new(),
            v: Vec::new(),
            a: Vec::new(),
            f: Vec::new(),
            aba: AbaCache::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Link<T: RealField + Copy> {
    pub name: String,
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub joint: JointModel<T>,
    /// Column of this joint in joint space arguments
    pub dof: Option<usize>,
    pub limits: Option<JointLimits>,
    pub parameters: LinkParameters<T>,
    pub cache: LinkCache<T>,
}

impl<T> Link<T>
where
    T: RealField + Copy,
{
    pub fn new(
        description: &LinkDescription,
        index: usize,
        parent: Option<usize>,
        joint: JointModel<T>,
        dof: Option<usize>,
    ) -> Self {
        Self {
            name: description.name.clone(),
            index,
            parent,
            children: Vec::new(),
            joint,
            dof,
            limits: description.joint.limits,
            parameters: LinkParameters::from_description(description),
            cache: LinkCache::default(),
        }
    }

    pub fn replace_parameter(&mut self, learnable: LearnableParameter<T>) {
        self.parameters.replace(learnable);
    }

    pub fn resolve_parameters(&mut self) {
        self.cache.parameters = self.parameters.resolve();
    }

    /// Link frame in the parent link frame at joint position `q`.
    #[inline]
    pub fn joint_pose(&self, q: T) -> Transform<T> {
        self.cache.parameters.origin * self.joint.transform(q)
    }

    /// Joint position of this link in a configuration row, zero for fixed joints.
    #[inline]
    pub fn joint_value(&self, row: &[T]) -> T {
        self.dof.map_or(T::zero(), |dof| row[dof])
    }

    #[inline]
    pub fn inertia(&self) -> SpatialInertia<T> {
        self.cache.parameters.inertia
    }

    #[inline]
    pub fn damping(&self) -> T {
        self.cache.parameters.damping
    }
}
