use nalgebra::{DMatrix, DVector, RealField};

use crate::{RobotModelErrors, algorithms::DynamicsOptions, batch::JointBatch, model::RobotModel};

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Joint space inertia matrix, one per configuration.
    pub fn mass_matrix<Q: JointBatch<T>>(
        &mut self,
        q: &Q,
        options: DynamicsOptions,
    ) -> Result<Q::Each<DMatrix<T>>, RobotModelErrors> {
        let q = self.rows("q", q)?;
        self.resolve_parameters();
        Ok(Q::from_each(self.mass_matrices(&q, options)))
    }

    /// Stacks inverse dynamics for each unit acceleration, minus the zero acceleration baseline.
    fn mass_matrices(&mut self, q: &DMatrix<T>, options: DynamicsOptions) -> Vec<DMatrix<T>> {
        let (batch, n) = q.shape();
        let zeros = DMatrix::zeros(batch, n);
        self.propagate_state(q, &zeros);
        let baseline = self.recursive_newton_euler(&zeros, options);

        let mut h = vec![DMatrix::zeros(n, n); batch];
        for j in 0..n {
            let mut unit = DMatrix::zeros(batch, n);
            unit.column_mut(j).fill(T::one());
            let column = self.recursive_newton_euler(&unit, options) - &baseline;
            for (b, h) in h.iter_mut().enumerate() {
                h.column_mut(j).copy_from(&column.row(b).transpose());
            }
        }
        h
    }

    /// Joint accelerations from solving H(q) qdd = force - nle(q, qd).
    pub fn forward_dynamics_mass_matrix<Q: JointBatch<T>>(
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

        let h = self.mass_matrices(&q, options);
        self.propagate_state(&q, &qd);
        let zeros = DMatrix::zeros(q.nrows(), q.ncols());
        let nle = self.recursive_newton_euler(&zeros, options);
        let rhs = force.into_owned() - nle;

        let mut qdd = DMatrix::zeros(q.nrows(), q.ncols());
        for (b, h) in h.into_iter().enumerate() {
            let solution = solve(h, rhs.row(b).transpose())?;
            qdd.row_mut(b).copy_from(&solution.transpose());
        }
        Ok(Q::from_rows(qdd))
    }
}

/// Cholesky for the symmetric positive definite case, LU then SVD otherwise.
fn solve<T: RealField + Copy>(h: DMatrix<T>, b: DVector<T>) -> Result<DVector<T>, RobotModelErrors> {
    if let Some(cholesky) = h.clone().cholesky() {
        return Ok(cholesky.solve(&b));
    }
    if let Some(x) = h.clone().lu().solve(&b) {
        return Ok(x);
    }
    h.svd(true, true)
        .solve(&b, nalgebra::convert(1e-12))
        .map_err(|_| RobotModelErrors::SingularMassMatrix)
}
