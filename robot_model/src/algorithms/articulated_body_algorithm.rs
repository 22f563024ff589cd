use nalgebra::{DMatrix, RealField};
use spatial_algebra::{ForceVector, MotionVector};

use crate::{
    RobotModelErrors,
    algorithms::{DynamicsOptions, epsilon},
    batch::JointBatch,
    model::RobotModel,
};

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Joint accelerations produced by the applied joint forces, using the articulated body algorithm.
    pub fn forward_dynamics<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        qd: &Q,
        force: &Q,
        options: DynamicsOptions,
    ) -> Result<Q, RobotModelErrors> {
        let q = self.rows("q", q)?;
        let qd = self.rows_like("qd", qd, &q)?;
        let force = self.rows_like("force", force, &q)?;
        self.resolve_parameters();
        self.propagate_state(&q, &qd);

        let mut tau = force.into_owned();
        if options.use_damping {
            for (dof, &i) in self.controlled.iter().enumerate() {
                let damping = self.links[i].damping();
                for b in 0..tau.nrows() {
                    tau[(b, dof)] -= damping * qd[(b, dof)];
                }
            }
        }

        self.aba_first_pass();
        self.aba_second_pass(&tau);
        Ok(Q::from_rows(self.aba_third_pass(options.include_gravity, tau.nrows())))
    }

    fn aba_first_pass(&mut self) {
        for link in self.links.iter_mut().skip(1) {
            let inertia = link.inertia();
            let inertia_matrix = inertia.matrix();
            let cache = &mut link.cache;
            let aba = &mut cache.aba;
            aba.c = cache
                .v
                .iter()
                .zip(&cache.vj)
                .map(|(v, vj)| v.cross_motion(vj))
                .collect();
            aba.p_big_a = cache
                .v
                .iter()
                .map(|v| v.cross_force(&(inertia * *v)))
                .collect();
            aba.inertia_articulated = vec![inertia_matrix; cache.v.len()];
        }
    }

    fn aba_second_pass(&mut self, tau: &DMatrix<T>) {
        let batch = tau.nrows();
        let eps = epsilon::<T>();
        for i in (1..self.links.len()).rev() {
            let (before, after) = self.links.split_at_mut(i);
            let link = &mut after[0];
            let s = link.joint.motion_subspace().vector();
            let dof = link.dof;
            let parent = link.parent;
            let cache = &mut link.cache;
            let aba = &mut cache.aba;

            aba.big_u = aba.inertia_articulated.iter().map(|ia| ia * s).collect();
            aba.big_d = aba.big_u.iter().map(|u| s.dot(u)).collect();
            aba.lil_u = (0..batch)
                .map(|b| {
                    let tau = dof.map_or(T::zero(), |dof| tau[(b, dof)]);
                    tau - s.dot(&aba.p_big_a[b].vector())
                })
                .collect();

            // the fixed base absorbs whatever is projected onto it
            let Some(parent) = parent.filter(|&p| p != 0) else {
                continue;
            };
            let parent = &mut before[parent].cache.aba;
            for b in 0..batch {
                let big_u = aba.big_u[b];
                let d_inv = T::one() / (aba.big_d[b] + eps);
                let i_lil_a = aba.inertia_articulated[b] - big_u * big_u.transpose() * d_inv;
                let p_lil_a = aba.p_big_a[b]
                    + ForceVector::from(i_lil_a * aba.c[b].vector())
                    + ForceVector::from(big_u * (aba.lil_u[b] * d_inv));

                let joint_pose = cache.joint_pose[b];
                parent.inertia_articulated[b] += joint_pose.transform_inertia(&i_lil_a);
                parent.p_big_a[b] += joint_pose * p_lil_a;
            }
        }
    }

    fn aba_third_pass(&mut self, include_gravity: bool, batch: usize) -> DMatrix<T> {
        let eps = epsilon::<T>();
        let a0 = self.base_acceleration(include_gravity);
        self.links[0].cache.a = vec![a0; batch];

        let mut qdd = DMatrix::zeros(batch, self.n_dofs());
        for i in 1..self.links.len() {
            let (before, after) = self.links.split_at_mut(i);
            let link = &mut after[0];
            let Some(parent) = link.parent.map(|p| &before[p]) else {
                continue;
            };
            let s = link.joint.motion_subspace();
            let dof = link.dof;
            let cache = &mut link.cache;
            let aba = &cache.aba;

            let mut a = Vec::with_capacity(batch);
            let mut link_qdd = Vec::with_capacity(batch);
            for b in 0..batch {
                let a_prime: MotionVector<T> =
                    cache.joint_pose[b].inv() * parent.cache.a[b] + aba.c[b];
                match dof {
                    Some(dof) => {
                        let qdd_b = (aba.lil_u[b] - aba.big_u[b].dot(&a_prime.vector()))
                            / (aba.big_d[b] + eps);
                        qdd[(b, dof)] = qdd_b;
                        link_qdd.push(qdd_b);
                        a.push(a_prime + s * qdd_b);
                    }
                    None => {
                        link_qdd.push(T::zero());
                        a.push(a_prime);
                    }
                }
            }
            cache.a = a;
            cache.qdd = link_qdd;
        }
        qdd
    }
}
