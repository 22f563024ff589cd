pub mod algorithms;
pub mod batch;
pub mod description;
pub mod inverse_kinematics;
pub mod jacobian;
pub mod joint;
pub mod kinematics;
pub mod link;
pub mod model;
pub mod parameter;

#[cfg(test)]
pub(crate) mod fixtures;

pub use algorithms::{DynamicsOptions, ForwardDynamicsAlgorithm};
pub use batch::JointBatch;
pub use description::{
    DescriptionErrors, JointDescription, JointKind, JointLimits, LinkDescription, Origin,
    RobotDescription,
};
pub use inverse_kinematics::{
    DlsConfig, GradientIkConfig, IkReport, IkSolution, IkStatus, PoseOptimizer,
};
pub use jacobian::Jacobian;
pub use joint::JointModel;
pub use kinematics::{Pose, Traversal};
pub use model::RobotModel;
pub use parameter::{LearnableParameter, LinkParameter, Parameter};

use mass_properties::MassPropertiesErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RobotModelErrors {
    #[error("link '{0}' appears more than once in the description")]
    DuplicateLink(String),
    #[error("robot description has no links")]
    EmptyDescription,
    #[error("{0}")]
    MassProperties(#[from] MassPropertiesErrors),
    #[error("link '{0}' has no parent but is not the first link")]
    MultipleRoots(String),
    #[error("parent '{parent}' of link '{link}' must be listed before it")]
    ParentAfterChild { link: String, parent: String },
    #[error("parent '{parent}' of link '{link}' not found")]
    ParentNotFound { link: String, parent: String },
    #[error("{parameter:?} of link '{link}' is not learnable")]
    ParameterNotLearnable { link: String, parameter: LinkParameter },
    #[error("link '{0}' not found")]
    LinkNotFound(String),
    #[error("the first link '{0}' must not have a parent")]
    RootNotFirst(String),
    #[error("the root link '{0}' must have a fixed joint")]
    RootJointNotFixed(String),
    #[error("{argument}: expected {expected}, found {found}")]
    ShapeMismatch {
        argument: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("mass matrix could not be solved")]
    SingularMassMatrix,
    #[error("joint axis of link '{0}' has zero length")]
    ZeroJointAxis(String),
}
