use nalgebra::{DMatrix, Matrix3xX, RealField, Vector3};

use crate::{RobotModelErrors, batch::JointBatch, joint::JointModel, model::RobotModel};

/// Maps joint velocities to the base frame velocity of a link origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian<T: RealField + Copy> {
    pub linear: Matrix3xX<T>,
    pub angular: Matrix3xX<T>,
}

impl<T> Jacobian<T>
where
    T: RealField + Copy,
{
    pub fn zeros(n_dofs: usize) -> Self {
        Self {
            linear: Matrix3xX::zeros(n_dofs),
            angular: Matrix3xX::zeros(n_dofs),
        }
    }

    /// 6 x n_dofs with the linear rows on top.
    pub fn stacked(&self) -> DMatrix<T> {
        let mut stacked = DMatrix::zeros(6, self.linear.ncols());
        stacked.rows_mut(0, 3).copy_from(&self.linear);
        stacked.rows_mut(3, 3).copy_from(&self.angular);
        stacked
    }
}

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Column of joint `joint` for a point given in the base frame. Reads poses from the last sweep.
    fn jacobian_column(&self, joint: usize, row: usize, point: &Vector3<T>) -> (Vector3<T>, Vector3<T>) {
        let link = &self.links[joint];
        let pose = &link.cache.pose[row];
        match link.joint {
            JointModel::Fixed => (Vector3::zeros(), Vector3::zeros()),
            JointModel::Revolute { axis } => {
                let z = pose.rotation * axis.into_inner();
                (z.cross(&(point - pose.translation)), z)
            }
            JointModel::Prismatic { axis } => (pose.rotation * axis.into_inner(), Vector3::zeros()),
        }
    }

    /// Walks from `target` to the base filling the column of each controlled joint on the way.
    pub(crate) fn link_jacobian(&self, target: usize, row: usize) -> Jacobian<T> {
        let mut jacobian = Jacobian::zeros(self.n_dofs());
        let point = self.links[target].cache.pose[row].translation;
        let mut current = Some(target);
        while let Some(i) = current {
            if let Some(dof) = self.links[i].dof {
                let (linear, angular) = self.jacobian_column(i, row, &point);
                jacobian.linear.set_column(dof, &linear);
                jacobian.angular.set_column(dof, &angular);
            }
            current = self.links[i].parent;
        }
        jacobian
    }

    pub fn jacobian<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        link: &str,
    ) -> Result<Q::Each<Jacobian<T>>, RobotModelErrors> {
        let target = self.link_index(link)?;
        let q = self.rows("q", q)?;
        self.resolve_parameters();
        let qd = DMatrix::zeros(q.nrows(), q.ncols());
        self.propagate_state(&q, &qd);

        let jacobians: Vec<_> = (0..q.nrows())
            .map(|b| self.link_jacobian(target, b))
            .collect();
        Ok(Q::from_each(jacobians))
    }

    /// Jacobian of every link, indexed by link index. Each controlled joint only fills
    /// columns for the links in its subtree.
    pub fn jacobian_all_links<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
    ) -> Result<Q::Each<Vec<Jacobian<T>>>, RobotModelErrors> {
        let q = self.rows("q", q)?;
        self.resolve_parameters();
        let qd = DMatrix::zeros(q.nrows(), q.ncols());
        self.propagate_state(&q, &qd);

        let n_links = self.links.len();
        let mut all = vec![vec![Jacobian::zeros(self.n_dofs()); n_links]; q.nrows()];
        for (dof, &joint) in self.controlled.iter().enumerate() {
            for &link in &self.subtrees[joint] {
                for (b, jacobians) in all.iter_mut().enumerate() {
                    let point = self.links[link].cache.pose[b].translation;
                    let (linear, angular) = self.jacobian_column(joint, b, &point);
                    jacobians[link].linear.set_column(dof, &linear);
                    jacobians[link].angular.set_column(dof, &angular);
                }
            }
        }
        Ok(Q::from_each(all))
    }
}
