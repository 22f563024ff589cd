mod common;

use approx::assert_abs_diff_eq;
use nalgebra::{DMatrix, DVector, Vector3};
use robot_model::{
    DynamicsOptions, ForwardDynamicsAlgorithm, JointDescription, LearnableParameter,
    LinkDescription, LinkParameter, Origin, RobotDescription, RobotModel, RobotModelErrors,
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

const TOL: f64 = 1e-8;

#[test]
fn test_mass_matrix_symmetric_positive_definite() {
    let mut model = common::load("arm.ron");
    let q = common::random_rows(10, 8, model.n_dofs(), 3.0);
    let matrices = model.mass_matrix(&q, DynamicsOptions::default()).unwrap();
    assert_eq!(matrices.len(), 8);
    for h in matrices {
        assert_abs_diff_eq!(h.clone(), h.transpose(), epsilon = TOL);
        let eigenvalues = h.symmetric_eigen().eigenvalues;
        assert!(eigenvalues.iter().all(|&e| e > 0.0), "{eigenvalues}");
    }
}

#[test]
fn test_forward_dynamics_inverts_inverse_dynamics() {
    let mut model = common::load("arm.ron");
    let n = model.n_dofs();
    let q = common::random_rows(11, 6, n, 3.0);
    let qd = common::random_rows(12, 6, n, 2.0);
    let qdd = common::random_rows(13, 6, n, 5.0);
    for options in [
        DynamicsOptions::new(true, false),
        DynamicsOptions::new(true, true),
        DynamicsOptions::new(false, true),
    ] {
        let tau = model.inverse_dynamics(&q, &qd, &qdd, options).unwrap();
        let aba = model.forward_dynamics(&q, &qd, &tau, options).unwrap();
        assert_abs_diff_eq!(aba, qdd, epsilon = 1e-7);
        let solved = model
            .forward_dynamics_mass_matrix(&q, &qd, &tau, options)
            .unwrap();
        assert_abs_diff_eq!(solved, qdd, epsilon = 1e-7);
    }
}

#[test]
fn test_inverse_dynamics_decomposes() {
    // tau = H qdd + nle
    let mut model = common::load("arm.ron");
    let q = DVector::from_vec(vec![0.3, -0.6, 1.1, 0.2, -0.4, 0.9]);
    let qd = DVector::from_vec(vec![0.5, 0.1, -0.8, 1.2, 0.0, -0.3]);
    let qdd = DVector::from_vec(vec![1.0, -1.0, 0.5, 0.0, 2.0, -0.5]);
    let options = ForwardDynamicsAlgorithm::MassMatrix.default_options();
    let tau = model.inverse_dynamics(&q, &qd, &qdd, options).unwrap();
    let h: DMatrix<f64> = model.mass_matrix(&q, options).unwrap();
    let nle = model.non_linear_effects(&q, &qd, options).unwrap();
    assert_abs_diff_eq!(tau, &h * &qdd + nle, epsilon = TOL);
}

#[test]
fn test_pendulum_from_file() {
    let mut model = common::load("pendulum.ron");
    let h: DMatrix<f64> = model
        .mass_matrix(&DVector::from_vec(vec![0.8]), DynamicsOptions::default())
        .unwrap();
    assert_abs_diff_eq!(h[(0, 0)], 0.04 + 2.0 * 0.5 * 0.5, epsilon = TOL);
}

#[test]
fn test_virtual_links_stay_finite() {
    let mut model = common::load("virtual_links.ron");
    let n = model.n_dofs();
    let q = common::random_rows(20, 32, n, 10.0);
    let qd = common::random_rows(21, 32, n, 10.0);
    let force = common::random_rows(22, 32, n, 10.0);
    let options = DynamicsOptions::new(true, true);

    let qdd = model.forward_dynamics(&q, &qd, &force, options).unwrap();
    assert!(qdd.iter().all(|x| x.is_finite()));
    let tau = model.inverse_dynamics(&q, &qd, &qdd, options).unwrap();
    assert!(tau.iter().all(|x| x.is_finite()));
    let nle = model.non_linear_effects(&q, &qd, options).unwrap();
    assert!(nle.iter().all(|x| x.is_finite()));
}

#[test]
fn test_massless_leaf_stays_finite() {
    let mut description = RobotDescription::load(
        &std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/virtual_links.ron"),
    )
    .unwrap();
    description.links.push(LinkDescription::new(
        "antenna",
        "payload",
        JointDescription::revolute([0.0, 1.0, 0.0], Origin::new([0.2, 0.0, 0.0], [0.0; 3])),
    ));
    let mut model = RobotModel::<f64>::from_description(&description).unwrap();
    let n = model.n_dofs();
    let q = common::random_rows(23, 8, n, 3.0);
    let qd = common::random_rows(24, 8, n, 3.0);
    let mut force = common::random_rows(25, 8, n, 3.0);
    force.column_mut(n - 1).fill(0.0);

    let qdd = model
        .forward_dynamics(&q, &qd, &force, DynamicsOptions::default())
        .unwrap();
    assert!(qdd.iter().all(|x| x.is_finite()));
    let tau = model
        .inverse_dynamics(&q, &qd, &qdd, DynamicsOptions::default())
        .unwrap();
    assert!(tau.iter().all(|x| x.is_finite()));
    // nothing to push against, so the leaf joint needs no torque
    assert_abs_diff_eq!(tau.column(n - 1).norm(), 0.0, epsilon = TOL);
}

#[test]
fn test_learned_mass_follows_provider() {
    let mut model = common::load("pendulum.ron");
    let mass = Arc::new(AtomicU64::new(2.0f64.to_bits()));
    let provider = {
        let mass = mass.clone();
        Arc::new(move || f64::from_bits(mass.load(Ordering::SeqCst)))
    };
    model
        .make_link_param_learnable("rod", LearnableParameter::Mass(provider))
        .unwrap();

    let q = DVector::from_vec(vec![0.0]);
    let zero = DVector::zeros(1);
    let options = DynamicsOptions::new(true, false);
    let gravity_torque = |model: &mut RobotModel<f64>| {
        model.inverse_dynamics(&q, &zero, &zero, options).unwrap()[0]
    };
    assert_abs_diff_eq!(gravity_torque(&mut model), -2.0 * 9.81 * 0.5, epsilon = TOL);

    mass.store(3.0f64.to_bits(), Ordering::SeqCst);
    assert_abs_diff_eq!(gravity_torque(&mut model), -3.0 * 9.81 * 0.5, epsilon = TOL);

    // frozen keeps the value seen at freeze time
    model
        .freeze_learnable_link_param("rod", LinkParameter::Mass)
        .unwrap();
    mass.store(4.0f64.to_bits(), Ordering::SeqCst);
    assert_abs_diff_eq!(gravity_torque(&mut model), -3.0 * 9.81 * 0.5, epsilon = TOL);

    model
        .unfreeze_learnable_link_param("rod", LinkParameter::Mass)
        .unwrap();
    assert_abs_diff_eq!(gravity_torque(&mut model), -4.0 * 9.81 * 0.5, epsilon = TOL);
}

#[test]
fn test_learned_joint_origin_moves_link() {
    let mut model = common::load("arm.ron");
    let q = DVector::zeros(model.n_dofs());
    let before = model.forward_kinematics(&q, "ee").unwrap();
    model
        .make_link_param_learnable(
            "link3",
            LearnableParameter::Translation(Arc::new(|| Vector3::new(0.5, 0.0, 0.0))),
        )
        .unwrap();
    let after = model.forward_kinematics(&q, "ee").unwrap();
    assert_abs_diff_eq!(
        after.translation - before.translation,
        Vector3::new(0.1, 0.0, 0.0),
        epsilon = TOL
    );
}

#[test]
fn test_shape_errors() {
    let mut model = common::load("arm.ron");
    let q = DMatrix::zeros(3, 6);
    let qd = DMatrix::zeros(2, 6);
    assert!(matches!(
        model.forward_dynamics(&q, &qd, &q, DynamicsOptions::default()),
        Err(RobotModelErrors::ShapeMismatch { argument: "qd", expected: 3, found: 2 })
    ));
    let narrow = DMatrix::zeros(3, 5);
    assert!(matches!(
        model.mass_matrix(&narrow, DynamicsOptions::default()),
        Err(RobotModelErrors::ShapeMismatch { argument: "q", expected: 6, found: 5 })
    ));
}
