use nalgebra::{Matrix3, RealField, Vector3};
use std::{fmt, sync::Arc};

/// A closure returning the current value of an externally trained parameter.
pub type Provider<V> = Arc<dyn Fn() -> V + Send + Sync>;

#[derive(Clone)]
pub enum ParameterSource<V> {
    Constant(V),
    Learned(Provider<V>),
}

/// A physical parameter of a link, either constant or supplied by a trained model.
/// A frozen learned parameter keeps the value it had when it was frozen.
#[derive(Clone)]
pub struct Parameter<V> {
    source: ParameterSource<V>,
    frozen: Option<V>,
}

impl<V> fmt::Debug for Parameter<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, &self.frozen) {
            (ParameterSource::Constant(v), _) => write!(f, "Constant({v:?})"),
            (ParameterSource::Learned(_), Some(v)) => write!(f, "Learned(frozen: {v:?})"),
            (ParameterSource::Learned(_), None) => write!(f, "Learned"),
        }
    }
}

impl<V> Parameter<V>
where
    V: Clone,
{
    pub fn constant(value: V) -> Self {
        Self {
            source: ParameterSource::Constant(value),
            frozen: None,
        }
    }

    pub fn learned(provider: Provider<V>) -> Self {
        Self {
            source: ParameterSource::Learned(provider),
            frozen: None,
        }
    }

    pub fn value(&self) -> V {
        if let Some(frozen) = &self.frozen {
            return frozen.clone();
        }
        match &self.source {
            ParameterSource::Constant(v) => v.clone(),
            ParameterSource::Learned(provider) => provider(),
        }
    }

    pub fn is_learnable(&self) -> bool {
        matches!(self.source, ParameterSource::Learned(_))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Returns false for constants, which cannot be frozen.
    pub fn freeze(&mut self) -> bool {
        match &self.source {
            ParameterSource::Constant(_) => false,
            ParameterSource::Learned(provider) => {
                self.frozen = Some(provider());
                true
            }
        }
    }

    pub fn unfreeze(&mut self) -> bool {
        if !self.is_learnable() {
            return false;
        }
        self.frozen = None;
        true
    }
}

/// Names the physical parameters of a link that can be learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkParameter {
    Mass,
    CenterOfMass,
    Inertia,
    Damping,
    /// Translation of the joint origin
    Translation,
    /// Roll, pitch, yaw of the joint origin
    Rotation,
}

/// A learned replacement for one link parameter.
#[derive(Clone)]
pub enum LearnableParameter<T: RealField + Copy> {
    Mass(Provider<T>),
    CenterOfMass(Provider<Vector3<T>>),
    /// Rotational inertia about the center of mass
    Inertia(Provider<Matrix3<T>>),
    Damping(Provider<T>),
    Translation(Provider<Vector3<T>>),
    Rotation(Provider<Vector3<T>>),
}

impl<T> LearnableParameter<T>
where
    T: RealField + Copy,
{
    pub fn kind(&self) -> LinkParameter {
        match self {
            LearnableParameter::Mass(_) => LinkParameter::Mass,
            LearnableParameter::CenterOfMass(_) => LinkParameter::CenterOfMass,
            LearnableParameter::Inertia(_) => LinkParameter::Inertia,
            LearnableParameter::Damping(_) => LinkParameter::Damping,
            LearnableParameter::Translation(_) => LinkParameter::Translation,
            LearnableParameter::Rotation(_) => LinkParameter::Rotation,
        }
    }
}
