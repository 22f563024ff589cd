mod common;

use approx::assert_abs_diff_eq;
use nalgebra::{DMatrix, DVector};
use robot_model::{DlsConfig, GradientIkConfig, IkStatus, Pose, PoseOptimizer};

fn reached(model: &mut robot_model::RobotModel<f64>, q: &DMatrix<f64>, row: usize) -> Pose<f64> {
    model.forward_kinematics(&q.row(row).transpose(), "ee").unwrap()
}

#[test]
fn test_dls_seeded_at_solution() {
    let mut model = common::load("arm.ron");
    let q = DVector::from_vec(vec![0.1, 0.4, -0.8, 0.3, 0.6, -0.2]);
    let goal: Pose<f64> = model.forward_kinematics(&q, "ee").unwrap();
    let solution = model
        .inverse_kinematics_dls(&[goal], "ee", &q, &DlsConfig::default())
        .unwrap();
    assert_eq!(solution.reports[0].status, IkStatus::Converged);
    assert_eq!(solution.reports[0].iterations, 0);
    assert_eq!(solution.q.row(0).transpose(), q);
}

#[test]
fn test_dls_converges_from_nearby_seed() {
    let mut model = common::load("arm.ron");
    let truth = DVector::from_vec(vec![0.3, 0.5, -0.9, 0.4, 0.7, -0.1]);
    let goal: Pose<f64> = model.forward_kinematics(&truth, "ee").unwrap();
    let seed = &truth + DVector::from_vec(vec![0.1, -0.1, 0.1, -0.1, 0.1, -0.1]);
    let config = DlsConfig {
        precision: 1e-3,
        min_update: 1e-6,
        step_size: 0.5,
        ..Default::default()
    };
    let solution = model
        .inverse_kinematics_dls(&[goal], "ee", &seed, &config)
        .unwrap();
    let report = solution.reports[0];
    assert_eq!(report.status, IkStatus::Converged, "{report:?}");
    assert!(report.error < 1e-3);
    let pose = reached(&mut model, &solution.q, 0);
    assert_abs_diff_eq!(pose.translation, goal.translation, epsilon = 1e-3);
    assert!(pose.rotation.angle_to(&goal.rotation) < 1e-3);
}

#[test]
fn test_dls_trajectory_seeds_from_previous_row() {
    let mut model = common::load("arm.ron");
    let start = DVector::from_vec(vec![0.0, 0.3, -0.6, 0.0, 0.4, 0.0]);
    let goals: Vec<Pose<f64>> = (0..5)
        .map(|k| {
            let mut q = start.clone();
            q[0] += 0.02 * k as f64;
            q[2] -= 0.02 * k as f64;
            model.forward_kinematics(&q, "ee").unwrap()
        })
        .collect();
    let config = DlsConfig {
        precision: 1e-3,
        min_update: 1e-7,
        step_size: 0.5,
        ..Default::default()
    };
    let solution = model
        .inverse_kinematics_dls(&goals, "ee", &start, &config)
        .unwrap();
    assert_eq!(solution.q.nrows(), 5);
    assert!(solution.all_converged(), "{:?}", solution.reports);
    assert_eq!(solution.reports[0].iterations, 0);
    for (row, goal) in goals.iter().enumerate() {
        let pose = reached(&mut model, &solution.q, row);
        assert_abs_diff_eq!(pose.translation, goal.translation, epsilon = 1e-3);
    }
}

/// Adam on a central difference gradient.
struct Adam {
    rate: f64,
    m: DVector<f64>,
    v: DVector<f64>,
    t: i32,
}

impl Adam {
    fn new() -> Self {
        Self {
            rate: 0.0,
            m: DVector::zeros(0),
            v: DVector::zeros(0),
            t: 0,
        }
    }
}

impl PoseOptimizer<f64> for Adam {
    fn reset(&mut self, q: &DVector<f64>, learning_rate: f64) {
        self.rate = learning_rate;
        self.m = DVector::zeros(q.len());
        self.v = DVector::zeros(q.len());
        self.t = 0;
    }

    fn step(&mut self, q: &mut DVector<f64>, loss: &mut dyn FnMut(&DVector<f64>) -> f64) -> f64 {
        let (beta1, beta2, eps, h) = (0.9, 0.999, 1e-8, 1e-7);
        let value = loss(q);
        let gradient = DVector::from_fn(q.len(), |i, _| {
            let mut plus = q.clone();
            plus[i] += h;
            let mut minus = q.clone();
            minus[i] -= h;
            (loss(&plus) - loss(&minus)) / (2.0 * h)
        });
        self.t += 1;
        self.m = &self.m * beta1 + &gradient * (1.0 - beta1);
        self.v = &self.v * beta2 + gradient.component_mul(&gradient) * (1.0 - beta2);
        let m_hat = &self.m / (1.0 - beta1.powi(self.t));
        let v_hat = &self.v / (1.0 - beta2.powi(self.t));
        let step = m_hat.zip_map(&v_hat, |m, v| m / (v.sqrt() + eps));
        *q -= step * self.rate;
        value
    }
}

#[test]
fn test_gradient_with_adam() {
    let mut model = common::load("arm.ron");
    let truth = DVector::from_vec(vec![0.2, 0.4, -0.5, 0.1, 0.3, 0.0]);
    let goal: Pose<f64> = model.forward_kinematics(&truth, "ee").unwrap();
    let seed = &truth + DVector::from_element(6, 0.15);
    let config = GradientIkConfig {
        max_iterations: 3000,
        precision: 0.05,
        learning_rate: 0.01,
    };
    let mut adam = Adam::new();
    let solution = model
        .inverse_kinematics_gradient(&[goal], "ee", Some(&seed), &mut adam, &config)
        .unwrap();
    assert!(solution.all_converged(), "{:?}", solution.reports);
    let q = solution.single().unwrap();
    assert!(model.pose_loss(&q, "ee", &goal).unwrap() < 0.05);
}

#[test]
fn test_configs_from_ron() {
    let dls: DlsConfig = ron::from_str("(precision: 0.001, step_size: 0.5)").unwrap();
    assert_eq!(dls.max_iterations, 1000);
    assert_eq!(dls.precision, 0.001);
    assert_eq!(dls.damping, 0.04);
    let gradient: GradientIkConfig = ron::from_str("(learning_rate: 0.01)").unwrap();
    assert_eq!(gradient.precision, 0.1);
}
