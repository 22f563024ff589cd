#![allow(dead_code)]

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use robot_model::{RobotDescription, RobotModel};
use std::path::PathBuf;

pub fn load(name: &str) -> RobotModel<f64> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let description = RobotDescription::load(&path).unwrap();
    RobotModel::from_description(&description).unwrap()
}

/// Uniform samples in (-range, range), reproducible across runs.
pub fn random_rows(seed: u64, batch: usize, n_dofs: usize, range: f64) -> DMatrix<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    DMatrix::from_fn(batch, n_dofs, |_, _| rng.random_range(-range..range))
}
