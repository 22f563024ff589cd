use nalgebra::{DMatrix, DVector, RealField, Vector6};
use tracing::{debug, warn};

use crate::{
    RobotModelErrors,
    inverse_kinematics::{Best, DlsConfig, IkReport, IkSolution, IkStatus, check_configuration},
    jacobian::Jacobian,
    kinematics::Pose,
    model::RobotModel,
};

/// Translation error on top, rotation error as a scaled axis below, matching the
/// row order of [`Jacobian::stacked`].
pub(crate) fn pose_error<T: RealField + Copy>(current: &Pose<T>, goal: &Pose<T>) -> Vector6<T> {
    let translation = goal.translation - current.translation;
    let rotation = (goal.rotation * current.rotation.inverse()).scaled_axis();
    Vector6::new(
        translation.x,
        translation.y,
        translation.z,
        rotation.x,
        rotation.y,
        rotation.z,
    )
}

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Damped least squares inverse kinematics of `link` for each goal pose.
    ///
    /// Every target returns the lowest error configuration seen, converged or not.
    pub fn inverse_kinematics_dls(
        &mut self,
        goals: &[Pose<T>],
        link: &str,
        init_q: &DVector<T>,
        config: &DlsConfig,
    ) -> Result<IkSolution<T>, RobotModelErrors> {
        let target = self.link_index(link)?;
        check_configuration("init_q", init_q, self.n_dofs())?;
        self.resolve_parameters();

        let mut solution = DMatrix::zeros(goals.len(), self.n_dofs());
        let mut reports = Vec::with_capacity(goals.len());
        let mut q = init_q.clone();
        for (row, goal) in goals.iter().enumerate() {
            let (best, report) = self.dls_target(goal, target, q, config);
            debug!(
                link,
                row,
                iterations = report.iterations,
                error = ?report.error,
                status = ?report.status,
                "dls inverse kinematics"
            );
            if !report.converged() {
                warn!(link, row, status = ?report.status, error = ?report.error, "dls inverse kinematics did not converge");
            }
            solution.set_row(row, &best.transpose());
            reports.push(report);
            q = best;
        }

        Ok(IkSolution {
            q: solution,
            reports,
        })
    }

    /// Pose and Jacobian of `target` at a single configuration.
    fn pose_and_jacobian(&mut self, q: &DVector<T>, target: usize) -> (Pose<T>, Jacobian<T>) {
        let rows = DMatrix::from_row_slice(1, q.len(), q.as_slice());
        let zeros = DMatrix::zeros(1, q.len());
        self.propagate_state(&rows, &zeros);
        let pose = Pose::from_transform(&self.links[target].cache.pose[0]);
        (pose, self.link_jacobian(target, 0))
    }

    fn dls_target(
        &mut self,
        goal: &Pose<T>,
        target: usize,
        mut q: DVector<T>,
        config: &DlsConfig,
    ) -> (DVector<T>, IkReport<T>) {
        let precision: T = nalgebra::convert(config.precision);
        let min_update: T = nalgebra::convert(config.min_update);
        let step_size: T = nalgebra::convert(config.step_size);
        let damping: T = nalgebra::convert(config.damping);
        let regularization = DMatrix::<T>::identity(6, 6) * (damping * damping);

        let mut best = Best::new(&q);
        let mut status = IkStatus::IterationLimit;
        let mut iterations = 0;
        loop {
            let (pose, jacobian) = self.pose_and_jacobian(&q, target);
            let error = DVector::from_column_slice(pose_error(&pose, goal).as_slice());
            let norm = error.norm();
            best.offer(&q, norm);
            if norm < precision {
                status = IkStatus::Converged;
                break;
            }
            if iterations == config.max_iterations {
                break;
            }

            let j = jacobian.stacked();
            let lhs = &j * j.transpose() + &regularization;
            let f = match lhs.clone().cholesky() {
                Some(cholesky) => cholesky.solve(&error),
                None => match lhs.lu().solve(&error) {
                    Some(f) => f,
                    None => {
                        status = IkStatus::SingularSystem;
                        break;
                    }
                },
            };
            let dq = j.transpose() * f;
            if dq.norm() < min_update {
                status = IkStatus::UpdateTooSmall;
                break;
            }
            q += dq * step_size;
            iterations += 1;
        }

        let report = IkReport {
            status,
            iterations,
            error: best.error(),
        };
        (best.q, report)
    }
}
