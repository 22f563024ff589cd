mod common;

use approx::assert_abs_diff_eq;
use nalgebra::DVector;
use robot_model::{Jacobian, Pose, RobotModelErrors, Traversal};

const TOL: f64 = 1e-10;

#[test]
fn test_traversals_agree_on_random_batch() {
    let mut model = common::load("arm.ron");
    let q = common::random_rows(1, 16, model.n_dofs(), 3.0);
    let sweep = model.forward_kinematics_all_links(&q, Traversal::Sweep).unwrap();
    let recursive = model
        .forward_kinematics_all_links(&q, Traversal::Recursive)
        .unwrap();
    for name in model.link_names() {
        for (a, b) in sweep[name].iter().zip(&recursive[name]) {
            assert_abs_diff_eq!(a.translation, b.translation, epsilon = TOL);
            assert_abs_diff_eq!(a.rotation.angle_to(&b.rotation), 0.0, epsilon = 1e-7);
        }
    }
}

#[test]
fn test_batched_rows_match_unbatched() {
    let mut model = common::load("arm.ron");
    let q = common::random_rows(2, 4, model.n_dofs(), 2.0);
    let batched = model.forward_kinematics(&q, "ee").unwrap();
    assert_eq!(batched.len(), 4);
    for (b, pose) in batched.iter().enumerate() {
        let single: Pose<f64> = model
            .forward_kinematics_with(&q.row(b).transpose(), "ee", Traversal::Recursive)
            .unwrap();
        assert_abs_diff_eq!(pose.translation, single.translation, epsilon = TOL);
    }
}

#[test]
fn test_home_pose_from_file() {
    // at zero every frame is aligned with the base, so the end effector offset stays along x
    let mut model = common::load("arm.ron");
    let zero = DVector::zeros(model.n_dofs());
    let poses = model.forward_kinematics_all_links(&zero, Traversal::Sweep).unwrap();
    let link6 = poses["link6"].translation;
    let ee = poses["ee"].translation;
    assert_abs_diff_eq!(ee - link6, nalgebra::Vector3::new(0.1, 0.0, 0.0), epsilon = TOL);
    assert_abs_diff_eq!(poses["base"].translation.norm(), 0.0);
}

#[test]
fn test_all_links_jacobian_matches_single() {
    let mut model = common::load("arm.ron");
    let q = common::random_rows(3, 5, model.n_dofs(), 2.5);
    let all = model.jacobian_all_links(&q).unwrap();
    let names: Vec<String> = model.link_names().iter().map(|s| s.to_string()).collect();
    for (index, name) in names.iter().enumerate() {
        let single = model.jacobian(&q, name).unwrap();
        for (b, jacobian) in single.iter().enumerate() {
            assert_abs_diff_eq!(all[b][index].stacked(), jacobian.stacked(), epsilon = TOL);
        }
    }
}

#[test]
fn test_jacobian_predicts_small_motion() {
    let mut model = common::load("arm.ron");
    let q = DVector::from_vec(vec![0.2, 0.5, -0.7, 1.0, 0.4, -0.3]);
    let dq = DVector::from_vec(vec![1.0, -2.0, 0.5, 0.3, -1.0, 2.0]) * 1e-6;
    let j: Jacobian<f64> = model.jacobian(&q, "ee").unwrap();
    let before: Pose<f64> = model.forward_kinematics(&q, "ee").unwrap();
    let after: Pose<f64> = model.forward_kinematics(&(&q + &dq), "ee").unwrap();
    assert_abs_diff_eq!(after.translation - before.translation, &j.linear * &dq, epsilon = 1e-10);
}

#[test]
fn test_unknown_link() {
    let mut model = common::load("arm.ron");
    let q = DVector::zeros(model.n_dofs());
    assert!(matches!(
        model.jacobian(&q, "gripper"),
        Err(RobotModelErrors::LinkNotFound(name)) if name == "gripper"
    ));
}
