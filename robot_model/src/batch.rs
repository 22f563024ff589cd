use nalgebra::{DMatrix, DVector, RealField};
use std::borrow::Cow;

use crate::RobotModelErrors;

/// Joint space arguments, either a batch (one configuration per row) or a single unbatched row.
/// Results are returned in the same form as the arguments.
pub trait JointBatch<T: RealField + Copy>: Sized {
    /// One result per configuration: `Vec<U>` for batches, `U` for a single row.
    type Each<U>;

    fn as_rows(&self) -> Cow<'_, DMatrix<T>>;
    fn from_rows(rows: DMatrix<T>) -> Self;
    /// `each` holds exactly one entry per row.
    fn from_each<U>(each: Vec<U>) -> Self::Each<U>;
}

impl<T> JointBatch<T> for DMatrix<T>
where
    T: RealField + Copy,
{
    type Each<U> = Vec<U>;

    fn as_rows(&self) -> Cow<'_, DMatrix<T>> {
        Cow::Borrowed(self)
    }

    fn from_rows(rows: DMatrix<T>) -> Self {
        rows
    }

    fn from_each<U>(each: Vec<U>) -> Vec<U> {
        each
    }
}

impl<T> JointBatch<T> for DVector<T>
where
    T: RealField + Copy,
{
    type Each<U> = U;

    fn as_rows(&self) -> Cow<'_, DMatrix<T>> {
        Cow::Owned(DMatrix::from_row_slice(1, self.len(), self.as_slice()))
    }

    fn from_rows(rows: DMatrix<T>) -> Self {
        rows.row(0).transpose()
    }

    fn from_each<U>(mut each: Vec<U>) -> U {
        each.swap_remove(0)
    }
}

/// Checks the per row width of a joint space argument.
pub fn check_dofs<T: RealField + Copy>(
    argument: &'static str,
    rows: &DMatrix<T>,
    n_dofs: usize,
) -> Result<(), RobotModelErrors> {
    if rows.ncols() != n_dofs {
        return Err(RobotModelErrors::ShapeMismatch {
            argument,
            expected: n_dofs,
            found: rows.ncols(),
        });
    }
    Ok(())
}

/// Checks that a jointly supplied argument has the same batch size as `q`.
pub fn check_batch<T: RealField + Copy>(
    argument: &'static str,
    rows: &DMatrix<T>,
    batch: usize,
) -> Result<(), RobotModelErrors> {
    if rows.nrows() != batch {
        return Err(RobotModelErrors::ShapeMismatch {
            argument,
            expected: batch,
            found: rows.nrows(),
        });
    }
    Ok(())
}
