use nalgebra::{DMatrix, RealField, Vector3};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    RobotModelErrors,
    batch::{JointBatch, check_batch, check_dofs},
    description::{JointLimits, RobotDescription},
    joint::JointModel,
    link::Link,
    parameter::{LearnableParameter, LinkParameter},
};

/// A kinematic tree of links stored in topological order: link 0 is the fixed base and
/// every parent has a smaller index than its children.
#[derive(Debug, Clone)]
pub struct RobotModel<T: RealField + Copy> {
    pub name: String,
    pub(crate) links: Vec<Link<T>>,
    /// Link index of each degree of freedom
    pub(crate) controlled: Vec<usize>,
    /// Every link index at or below each link
    pub(crate) subtrees: Vec<Vec<usize>>,
    pub(crate) gravity: Vector3<T>,
    pub(crate) names: HashMap<String, usize>,
}

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    pub fn from_description(description: &RobotDescription) -> Result<Self, RobotModelErrors> {
        let first = description
            .links
            .first()
            .ok_or(RobotModelErrors::EmptyDescription)?;
        if first.parent.is_some() {
            return Err(RobotModelErrors::RootNotFirst(first.name.clone()));
        }

        let mut names: HashMap<String, usize> = HashMap::new();
        let mut links: Vec<Link<T>> = Vec::with_capacity(description.links.len());
        let mut controlled = Vec::new();

        for (index, link) in description.links.iter().enumerate() {
            if names.contains_key(&link.name) {
                return Err(RobotModelErrors::DuplicateLink(link.name.clone()));
            }
            link.inertial.validate()?;

            let parent = match &link.parent {
                None if index == 0 => None,
                None => return Err(RobotModelErrors::MultipleRoots(link.name.clone())),
                Some(parent) => match names.get(parent) {
                    Some(&parent_index) => Some(parent_index),
                    None if description.links.iter().any(|l| &l.name == parent) => {
                        return Err(RobotModelErrors::ParentAfterChild {
                            link: link.name.clone(),
                            parent: parent.clone(),
                        });
                    }
                    None => {
                        return Err(RobotModelErrors::ParentNotFound {
                            link: link.name.clone(),
                            parent: parent.clone(),
                        });
                    }
                },
            };

            let joint = JointModel::from_description(&link.joint)
                .ok_or_else(|| RobotModelErrors::ZeroJointAxis(link.name.clone()))?;
            if parent.is_none() && joint.is_controlled() {
                return Err(RobotModelErrors::RootJointNotFixed(link.name.clone()));
            }

            let dof = if joint.is_controlled() {
                controlled.push(index);
                Some(controlled.len() - 1)
            } else {
                None
            };

            if let Some(parent) = parent {
                links[parent].children.push(index);
            }
            links.push(Link::new(link, index, parent, joint, dof));
            names.insert(link.name.clone(), index);
        }

        let mut subtrees: Vec<Vec<usize>> = (0..links.len()).map(|i| vec![i]).collect();
        for i in (1..links.len()).rev() {
            if let Some(parent) = links[i].parent {
                let subtree = subtrees[i].clone();
                subtrees[parent].extend(subtree);
            }
        }

        let gravity = Vector3::from(description.gravity).map(|x| nalgebra::convert::<f64, T>(x));

        debug!(
            robot = description.name.as_str(),
            links = links.len(),
            dofs = controlled.len(),
            "built robot model"
        );

        Ok(Self {
            name: description.name.clone(),
            links,
            controlled,
            subtrees,
            gravity,
            names,
        })
    }

    pub fn n_dofs(&self) -> usize {
        self.controlled.len()
    }

    pub fn n_links(&self) -> usize {
        self.links.len()
    }

    pub fn gravity(&self) -> Vector3<T> {
        self.gravity
    }

    pub fn link_names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.name.as_str()).collect()
    }

    /// Names of the links driven by a controlled joint, in joint space column order.
    pub fn controlled_link_names(&self) -> Vec<&str> {
        self.controlled
            .iter()
            .map(|&i| self.links[i].name.as_str())
            .collect()
    }

    pub fn link_index(&self, name: &str) -> Result<usize, RobotModelErrors> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RobotModelErrors::LinkNotFound(name.to_string()))
    }

    pub fn link(&self, name: &str) -> Result<&Link<T>, RobotModelErrors> {
        Ok(&self.links[self.link_index(name)?])
    }

    /// Limits of each controlled joint, in joint space column order.
    pub fn joint_limits(&self) -> Vec<Option<JointLimits>> {
        self.controlled.iter().map(|&i| self.links[i].limits).collect()
    }

    pub fn make_link_param_learnable(
        &mut self,
        link: &str,
        parameter: LearnableParameter<T>,
    ) -> Result<(), RobotModelErrors> {
        let index = self.link_index(link)?;
        debug!(link, parameter = ?parameter.kind(), "link parameter made learnable");
        self.links[index].replace_parameter(parameter);
        Ok(())
    }

    pub fn freeze_learnable_link_param(
        &mut self,
        link: &str,
        parameter: LinkParameter,
    ) -> Result<(), RobotModelErrors> {
        let index = self.link_index(link)?;
        if !self.links[index].parameters.freeze(parameter) {
            return Err(RobotModelErrors::ParameterNotLearnable {
                link: link.to_string(),
                parameter,
            });
        }
        debug!(link, ?parameter, "link parameter frozen");
        Ok(())
    }

    pub fn unfreeze_learnable_link_param(
        &mut self,
        link: &str,
        parameter: LinkParameter,
    ) -> Result<(), RobotModelErrors> {
        let index = self.link_index(link)?;
        if !self.links[index].parameters.unfreeze(parameter) {
            return Err(RobotModelErrors::ParameterNotLearnable {
                link: link.to_string(),
                parameter,
            });
        }
        debug!(link, ?parameter, "link parameter unfrozen");
        Ok(())
    }

    /// Every learnable parameter as (link, parameter, frozen).
    pub fn learnable_parameters(&self) -> Vec<(&str, LinkParameter, bool)> {
        const ALL: [LinkParameter; 6] = [
            LinkParameter::Mass,
            LinkParameter::CenterOfMass,
            LinkParameter::Inertia,
            LinkParameter::Damping,
            LinkParameter::Translation,
            LinkParameter::Rotation,
        ];
        let mut learnable = Vec::new();
        for link in &self.links {
            for parameter in ALL {
                let (is_learnable, frozen) = link.parameters.state(parameter);
                if is_learnable {
                    learnable.push((link.name.as_str(), parameter, frozen));
                }
            }
        }
        learnable
    }

    pub fn log_learnable_parameters(&self) {
        for (link, parameter, frozen) in self.learnable_parameters() {
            debug!(link, ?parameter, frozen, "learnable parameter");
        }
    }

    /// Evaluates every parameter provider once for the coming call.
    pub(crate) fn resolve_parameters(&mut self) {
        self.links
            .iter_mut()
            .for_each(|link| link.resolve_parameters());
    }

    /// Validates a joint space argument and returns it as rows.
    pub(crate) fn rows<'a, Q: JointBatch<T>>(
        &self,
        argument: &'static str,
        value: &'a Q,
    ) -> Result<std::borrow::Cow<'a, DMatrix<T>>, RobotModelErrors> {
        let rows = value.as_rows();
        check_dofs(argument, &rows, self.n_dofs())?;
        Ok(rows)
    }

    /// Validates an argument supplied together with `q`.
    pub(crate) fn rows_like<'a, Q: JointBatch<T>>(
        &self,
        argument: &'static str,
        value: &'a Q,
        q: &DMatrix<T>,
    ) -> Result<std::borrow::Cow<'a, DMatrix<T>>, RobotModelErrors> {
        let rows = self.rows(argument, value)?;
        check_batch(argument, &rows, q.nrows())?;
        Ok(rows)
    }

    /// Returns true when `ancestor` lies on the path from the base to `link`.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: usize, link: usize) -> bool {
        let mut current = Some(link);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.links[i].parent;
        }
        false
    }
}
