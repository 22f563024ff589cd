use nalgebra::{DMatrix, RealField, UnitQuaternion, Vector3, Vector4};
use spatial_algebra::{MotionVector, Transform};
use std::collections::HashMap;

use crate::{RobotModelErrors, batch::JointBatch, model::RobotModel};

/// Position and orientation of a link frame in the base frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<T: RealField + Copy> {
    pub translation: Vector3<T>,
    pub rotation: UnitQuaternion<T>,
}

impl<T> Pose<T>
where
    T: RealField + Copy,
{
    pub fn new(translation: Vector3<T>, rotation: UnitQuaternion<T>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_transform(transform: &Transform<T>) -> Self {
        Self::new(transform.translation, transform.quaternion())
    }

    pub fn transform(&self) -> Transform<T> {
        Transform::new(
            self.rotation.to_rotation_matrix().into_inner(),
            self.translation,
        )
    }

    /// Quaternion coordinates ordered x, y, z, w.
    pub fn quaternion_xyzw(&self) -> Vector4<T> {
        self.rotation.quaternion().coords
    }
}

/// How forward kinematics walks the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    /// One pass over the links in index order, uniform over the batch.
    #[default]
    Sweep,
    /// Recursion from the base through child names, pruned to the queried link.
    Recursive,
}

fn joint_column<T: RealField + Copy>(rows: &DMatrix<T>, dof: Option<usize>) -> Vec<T> {
    match dof {
        Some(dof) => rows.column(dof).iter().copied().collect(),
        None => vec![T::zero(); rows.nrows()],
    }
}

fn row_of<T: RealField + Copy>(rows: &DMatrix<T>, row: usize) -> Vec<T> {
    rows.row(row).iter().copied().collect()
}

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Overwrites the joint state, pose and velocity of every link.
    pub fn update_state<Q: JointBatch<T>>(&mut self, q: &Q, qd: &Q) -> Result<(), RobotModelErrors> {
        let q = self.rows("q", q)?;
        let qd = self.rows_like("qd", qd, &q)?;
        self.resolve_parameters();
        self.propagate_state(&q, &qd);
        Ok(())
    }

    /// Poses of a link from the last state update, one per batch row.
    pub fn link_poses(&self, link: &str) -> Result<&[Transform<T>], RobotModelErrors> {
        Ok(&self.links[self.link_index(link)?].cache.pose)
    }

    /// Spatial velocities of a link in its own frame from the last state update.
    pub fn link_velocities(&self, link: &str) -> Result<&[MotionVector<T>], RobotModelErrors> {
        Ok(&self.links[self.link_index(link)?].cache.v)
    }

    /// Ordered sweep over the tree. Expects resolved parameters.
    pub(crate) fn propagate_state(&mut self, q: &DMatrix<T>, qd: &DMatrix<T>) {
        let batch = q.nrows();

        let root = &mut self.links[0].cache;
        root.q = vec![T::zero(); batch];
        root.qd = vec![T::zero(); batch];
        root.joint_pose = vec![Transform::identity(); batch];
        root.pose = vec![Transform::identity(); batch];
        root.vj = vec![MotionVector::zeros(); batch];
        root.v = vec![MotionVector::zeros(); batch];

        for i in 1..self.links.len() {
            let (before, after) = self.links.split_at_mut(i);
            let link = &mut after[0];
            let Some(parent) = link.parent.map(|p| &before[p]) else {
                continue;
            };

            let q = joint_column(q, link.dof);
            let qd = joint_column(qd, link.dof);

            let joint_pose: Vec<_> = q.iter().map(|&q| link.joint_pose(q)).collect();
            let pose = parent
                .cache
                .pose
                .iter()
                .zip(&joint_pose)
                .map(|(parent_pose, joint_pose)| *parent_pose * *joint_pose)
                .collect();
            let vj: Vec<_> = qd.iter().map(|&qd| link.joint.velocity(qd)).collect();
            let v = parent
                .cache
                .v
                .iter()
                .zip(&joint_pose)
                .zip(&vj)
                .map(|((v_parent, joint_pose), vj)| joint_pose.inv() * *v_parent + *vj)
                .collect();

            let cache = &mut link.cache;
            cache.q = q;
            cache.qd = qd;
            cache.joint_pose = joint_pose;
            cache.pose = pose;
            cache.vj = vj;
            cache.v = v;
        }
    }

    /// Pose of `target` for one configuration row, composed along its parent chain.
    /// Reads only resolved parameters, never the per call state.
    pub(crate) fn chain_pose(&self, row: &[T], target: usize) -> Transform<T> {
        let mut pose = Transform::identity();
        let mut current = target;
        while let Some(parent) = self.links[current].parent {
            let link = &self.links[current];
            pose = link.joint_pose(link.joint_value(row)) * pose;
            current = parent;
        }
        pose
    }

    fn recurse(
        &self,
        name: &str,
        parent_pose: &Transform<T>,
        row: &[T],
        target: Option<usize>,
        poses: &mut HashMap<String, Transform<T>>,
    ) {
        let Some(&index) = self.names.get(name) else {
            return;
        };
        let link = &self.links[index];
        let pose = match link.parent {
            Some(_) => *parent_pose * link.joint_pose(link.joint_value(row)),
            None => Transform::identity(),
        };
        poses.insert(link.name.clone(), pose);

        for &child in &link.children {
            if target.is_none_or(|target| self.is_ancestor_or_self(child, target)) {
                self.recurse(&self.links[child].name, &pose, row, target, poses);
            }
        }
    }

    fn recursive_poses(
        &self,
        row: &[T],
        target: Option<usize>,
    ) -> HashMap<String, Transform<T>> {
        let mut poses = HashMap::new();
        self.recurse(&self.links[0].name, &Transform::identity(), row, target, &mut poses);
        poses
    }

    pub fn forward_kinematics<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        link: &str,
    ) -> Result<Q::Each<Pose<T>>, RobotModelErrors> {
        self.forward_kinematics_with(q, link, Traversal::Sweep)
    }

    pub fn forward_kinematics_with<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        link: &str,
        traversal: Traversal,
    ) -> Result<Q::Each<Pose<T>>, RobotModelErrors> {
        let target = self.link_index(link)?;
        let q = self.rows("q", q)?;
        self.resolve_parameters();

        let poses: Vec<Pose<T>> = match traversal {
            Traversal::Sweep => {
                let qd = DMatrix::zeros(q.nrows(), q.ncols());
                self.propagate_state(&q, &qd);
                self.links[target]
                    .cache
                    .pose
                    .iter()
                    .map(Pose::from_transform)
                    .collect()
            }
            Traversal::Recursive => (0..q.nrows())
                .map(|b| {
                    let poses = self.recursive_poses(&row_of(&q, b), Some(target));
                    poses
                        .get(link)
                        .map(Pose::from_transform)
                        .ok_or_else(|| RobotModelErrors::LinkNotFound(link.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(Q::from_each(poses))
    }

    /// Poses of every link keyed by link name.
    pub fn forward_kinematics_all_links<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        traversal: Traversal,
    ) -> Result<HashMap<String, Q::Each<Pose<T>>>, RobotModelErrors> {
        let q = self.rows("q", q)?;
        self.resolve_parameters();

        let mut per_link: HashMap<String, Vec<Pose<T>>> = HashMap::new();
        match traversal {
            Traversal::Sweep => {
                let qd = DMatrix::zeros(q.nrows(), q.ncols());
                self.propagate_state(&q, &qd);
                for link in &self.links {
                    let poses = link.cache.pose.iter().map(Pose::from_transform).collect();
                    per_link.insert(link.name.clone(), poses);
                }
            }
            Traversal::Recursive => {
                for b in 0..q.nrows() {
                    for (name, pose) in self.recursive_poses(&row_of(&q, b), None) {
                        per_link
                            .entry(name)
                            .or_default()
                            .push(Pose::from_transform(&pose));
                    }
                }
            }
        }
        Ok(per_link
            .into_iter()
            .map(|(name, poses)| (name, Q::from_each(poses)))
            .collect())
    }
}
