use nalgebra::{DMatrix, DVector, RealField};
use tracing::{debug, warn};

use crate::{
    RobotModelErrors,
    inverse_kinematics::{
        Best, GradientIkConfig, IkReport, IkSolution, IkStatus, PoseOptimizer, check_configuration,
    },
    kinematics::Pose,
    model::RobotModel,
};

impl<T> RobotModel<T>
where
    T: RealField + Copy,
{
    /// Norm of the position and quaternion difference between `link` at `q` and the goal,
    /// with every parameter provider evaluated for this call.
    pub fn pose_loss(
        &mut self,
        q: &DVector<T>,
        link: &str,
        goal: &Pose<T>,
    ) -> Result<T, RobotModelErrors> {
        let target = self.link_index(link)?;
        check_configuration("q", q, self.n_dofs())?;
        self.resolve_parameters();
        Ok(self.chain_loss(q, target, goal))
    }

    /// Pure in `q` over the already resolved parameters, so an optimizer may evaluate it
    /// as often as it likes. `q` must hold one value per degree of freedom.
    pub(crate) fn chain_loss(&self, q: &DVector<T>, target: usize, goal: &Pose<T>) -> T {
        let pose = Pose::from_transform(&self.chain_pose(q.as_slice(), target));
        let goal_quaternion = goal.quaternion_xyzw();
        let mut quaternion = pose.quaternion_xyzw();
        // q and -q are the same rotation
        if quaternion.dot(&goal_quaternion) < T::zero() {
            quaternion = -quaternion;
        }
        let translation = pose.translation - goal.translation;
        let rotation = quaternion - goal_quaternion;
        (translation.norm_squared() + rotation.norm_squared()).sqrt()
    }

    /// Inverse kinematics of `link` for each goal pose, descending [`pose_loss`](Self::pose_loss)
    /// with the supplied optimizer. Parameters are resolved once for the whole call. Starts from zeros when `init_q` is None.
    pub fn inverse_kinematics_gradient<O: PoseOptimizer<T>>(
        &mut self,
        goals: &[Pose<T>],
        link: &str,
        init_q: Option<&DVector<T>>,
        optimizer: &mut O,
        config: &GradientIkConfig,
    ) -> Result<IkSolution<T>, RobotModelErrors> {
        let target = self.link_index(link)?;
        let mut q = match init_q {
            Some(init_q) => {
                check_configuration("init_q", init_q, self.n_dofs())?;
                init_q.clone()
            }
            None => DVector::zeros(self.n_dofs()),
        };
        self.resolve_parameters();

        let precision: T = nalgebra::convert(config.precision);
        let learning_rate: T = nalgebra::convert(config.learning_rate);
        let model = &*self;

        let mut solution = DMatrix::zeros(goals.len(), model.n_dofs());
        let mut reports = Vec::with_capacity(goals.len());
        for (row, goal) in goals.iter().enumerate() {
            let mut loss = |q: &DVector<T>| model.chain_loss(q, target, goal);
            optimizer.reset(&q, learning_rate);

            let mut best = Best::new(&q);
            let mut status = IkStatus::IterationLimit;
            let mut iterations = 0;
            while iterations < config.max_iterations {
                let before = q.clone();
                let value = optimizer.step(&mut q, &mut loss);
                best.offer(&before, value);
                if value < precision {
                    status = IkStatus::Converged;
                    break;
                }
                iterations += 1;
            }
            if status != IkStatus::Converged {
                let value = loss(&q);
                best.offer(&q, value);
                if value < precision {
                    status = IkStatus::Converged;
                }
            }

            let report = IkReport {
                status,
                iterations,
                error: best.error(),
            };
            debug!(link, row, iterations, error = ?report.error, status = ?status, "gradient inverse kinematics");
            if !report.converged() {
                warn!(link, row, error = ?report.error, "gradient inverse kinematics did not converge");
            }
            solution.set_row(row, &best.q.transpose());
            reports.push(report);
            q = best.q;
        }

        Ok(IkSolution {
            q: solution,
            reports,
        })
    }
}
