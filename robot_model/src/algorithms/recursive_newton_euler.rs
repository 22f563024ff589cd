use nalgebra::{DMatrix, RealField};
use spatial_algebra::ForceVector;

use crate::{RobotModelErrors, algorithms::DynamicsOptions, batch::JointBatch, model::RobotModel};

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Joint forces that realize the desired accelerations `qdd`.
    pub fn inverse_dynamics<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        qd: &Q,
        qdd: &Q,
        options: DynamicsOptions,
    ) -> Result<Q, RobotModelErrors> {
        let q = self.rows("q", q)?;
        let qd = self.rows_like("qd", qd, &q)?;
        let qdd = self.rows_like("qdd", qdd, &q)?;
        self.resolve_parameters();
        self.propagate_state(&q, &qd);
        Ok(Q::from_rows(self.recursive_newton_euler(&qdd, options)))
    }

    /// Coriolis, centrifugal, gravity and damping forces: inverse dynamics at zero acceleration.
    pub fn non_linear_effects<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        qd: &Q,
        options: DynamicsOptions,
    ) -> Result<Q, RobotModelErrors> {
        let q = self.rows("q", q)?;
        let qd = self.rows_like("qd", qd, &q)?;
        self.resolve_parameters();
        self.propagate_state(&q, &qd);
        let qdd = DMatrix::zeros(q.nrows(), q.ncols());
        Ok(Q::from_rows(self.recursive_newton_euler(&qdd, options)))
    }

    /// Two pass Newton-Euler recursion over the current state, one row of forces per batch row.
    pub(crate) fn recursive_newton_euler(
        &mut self,
        qdd: &DMatrix<T>,
        options: DynamicsOptions,
    ) -> DMatrix<T> {
        let batch = qdd.nrows();
        let n = self.links.len();

        // forward pass
        let a0 = self.base_acceleration(options.include_gravity);
        self.links[0].cache.a = vec![a0; batch];
        self.links[0].cache.qdd = vec![T::zero(); batch];
        for i in 1..n {
            let (before, after) = self.links.split_at_mut(i);
            let link = &mut after[0];
            let Some(parent) = link.parent.map(|p| &before[p]) else {
                continue;
            };
            let s = link.joint.motion_subspace();
            let cache = &mut link.cache;
            cache.qdd = match link.dof {
                Some(dof) => qdd.column(dof).iter().copied().collect(),
                None => vec![T::zero(); batch],
            };
            cache.a = (0..batch)
                .map(|b| {
                    cache.joint_pose[b].inv() * parent.cache.a[b]
                        + s * cache.qdd[b]
                        + cache.v[b].cross_motion(&cache.vj[b])
                })
                .collect();
        }

        for link in self.links.iter_mut() {
            link.cache.f = vec![ForceVector::zeros(); batch];
        }

        // backward pass
        for i in (1..n).rev() {
            let (before, after) = self.links.split_at_mut(i);
            let link = &mut after[0];
            let inertia = link.inertia();
            let cache = &mut link.cache;
            for b in 0..batch {
                let v = cache.v[b];
                cache.f[b] += inertia * cache.a[b] + v.cross_force(&(inertia * v));
            }
            if let Some(parent) = link.parent {
                let parent = &mut before[parent].cache;
                for b in 0..batch {
                    parent.f[b] += cache.joint_pose[b] * cache.f[b];
                }
            }
        }

        let mut tau = DMatrix::zeros(batch, self.n_dofs());
        for (dof, &i) in self.controlled.iter().enumerate() {
            let link = &self.links[i];
            let s = link.joint.motion_subspace();
            for b in 0..batch {
                tau[(b, dof)] = s.dot(&link.cache.f[b]);
                if options.use_damping {
                    tau[(b, dof)] += link.damping() * link.cache.qd[b];
                }
            }
        }
        tau
    }
}
