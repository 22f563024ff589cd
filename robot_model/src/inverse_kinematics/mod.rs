//! Iterative inverse kinematics, solved one target pose at a time.
//!
//! Both solvers seed each target after the first with the solution of the one before it,
//! so a slice of targets along a trajectory converges quickly.

pub mod dls;
pub mod gradient;

use nalgebra::{DMatrix, DVector, RealField};
use serde::{Deserialize, Serialize};

use crate::RobotModelErrors;

/// Why the solver stopped on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkStatus {
    Converged,
    IterationLimit,
    UpdateTooSmall,
    SingularSystem,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkReport<T: RealField + Copy> {
    pub status: IkStatus,
    /// Number of updates applied to the joint configuration
    pub iterations: usize,
    /// Pose error of the returned configuration
    pub error: T,
}

impl<T> IkReport<T>
where
    T: RealField + Copy,
{
    pub fn converged(&self) -> bool {
        self.status == IkStatus::Converged
    }
}

/// One row of `q` and one report per target, in target order.
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution<T: RealField + Copy> {
    pub q: DMatrix<T>,
    pub reports: Vec<IkReport<T>>,
}

impl<T> IkSolution<T>
where
    T: RealField + Copy,
{
    pub fn all_converged(&self) -> bool {
        self.reports.iter().all(IkReport::converged)
    }

    /// Configuration solved for target `k`.
    pub fn configuration(&self, k: usize) -> Option<DVector<T>> {
        (k < self.q.nrows()).then(|| self.q.row(k).transpose())
    }

    /// The configuration when exactly one target was solved.
    pub fn single(&self) -> Option<DVector<T>> {
        match self.q.nrows() {
            1 => self.configuration(0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DlsConfig {
    pub max_iterations: usize,
    /// Stop once the pose error norm drops below this
    pub precision: f64,
    /// Stop once the joint update norm drops below this
    pub min_update: f64,
    pub step_size: f64,
    pub damping: f64,
}

impl Default for DlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            precision: 0.1,
            min_update: 1e-3,
            step_size: 0.1,
            damping: 0.04,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientIkConfig {
    pub max_iterations: usize,
    pub precision: f64,
    pub learning_rate: f64,
}

impl Default for GradientIkConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            precision: 0.1,
            learning_rate: 0.1,
        }
    }
}

/// The gradient based optimizer driven by [`RobotModel::inverse_kinematics_gradient`](crate::RobotModel::inverse_kinematics_gradient).
///
/// Implementations own the differentiation: the model only hands over a loss built on
/// forward kinematics.
pub trait PoseOptimizer<T: RealField + Copy> {
    /// Called before each target with the starting configuration.
    fn reset(&mut self, q: &DVector<T>, learning_rate: T);

    /// Takes one descent step on `q` in place and returns the loss before the step.
    fn step(&mut self, q: &mut DVector<T>, loss: &mut dyn FnMut(&DVector<T>) -> T) -> T;
}

/// Checks a single joint configuration.
pub(crate) fn check_configuration<T: RealField + Copy>(
    argument: &'static str,
    q: &DVector<T>,
    n_dofs: usize,
) -> Result<(), RobotModelErrors> {
    if q.len() != n_dofs {
        return Err(RobotModelErrors::ShapeMismatch {
            argument,
            expected: n_dofs,
            found: q.len(),
        });
    }
    Ok(())
}

/// Keeps the lowest error configuration seen while iterating.
pub(crate) struct Best<T: RealField + Copy> {
    pub q: DVector<T>,
    pub error: Option<T>,
}

impl<T> Best<T>
where
    T: RealField + Copy,
{
    pub fn new(q: &DVector<T>) -> Self {
        Self {
            q: q.clone(),
            error: None,
        }
    }

    pub fn offer(&mut self, q: &DVector<T>, error: T) {
        if self.error.is_none_or(|best| error < best) {
            self.q = q.clone();
            self.error = Some(error);
        }
    }

    pub fn error(&self) -> T {
        self.error.unwrap_or_else(T::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: IkStatus) -> IkReport<f64> {
        IkReport {
            status,
            iterations: 0,
            error: 0.0,
        }
    }

    #[test]
    fn test_solution_configurations() {
        let solution = IkSolution {
            q: DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            reports: vec![report(IkStatus::Converged), report(IkStatus::IterationLimit)],
        };
        assert_eq!(solution.configuration(1), Some(DVector::from_vec(vec![4.0, 5.0, 6.0])));
        assert_eq!(solution.configuration(2), None);
        assert_eq!(solution.single(), None);
        assert!(!solution.all_converged());

        let solution = IkSolution {
            q: DMatrix::from_row_slice(1, 2, &[0.5, -0.5]),
            reports: vec![report(IkStatus::Converged)],
        };
        assert_eq!(solution.single(), Some(DVector::from_vec(vec![0.5, -0.5])));
        assert!(solution.all_converged());
    }

    #[test]
    fn test_best_keeps_lowest() {
        let mut best = Best::new(&DVector::from_vec(vec![0.0]));
        assert_eq!(best.error(), 0.0);
        best.offer(&DVector::from_vec(vec![1.0]), 0.5);
        best.offer(&DVector::from_vec(vec![2.0]), 0.7);
        assert_eq!(best.q, DVector::from_vec(vec![1.0]));
        assert_eq!(best.error(), 0.5);
    }
}

