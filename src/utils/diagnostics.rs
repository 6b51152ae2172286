//! Numerical quality metrics for a Krylov workspace.

use crate::{
    algorithms::{Coefficient, sub_scaled},
    matrix::LinearOperator,
    subspace::KrylovSubspace,
};
use faer::{
    Col, Mat, MatRef,
    traits::{ComplexField, RealField, math_utils::add},
};

/// Loss of orthogonality of the columns of `basis`, measured as `||I - V^H V||_F`.
///
/// Full orthogonalization keeps this near unit round-off; a narrow IOP window lets it
/// grow with the number of steps.
pub fn orthogonality_loss<T: ComplexField>(basis: MatRef<'_, T>) -> T::Real {
    let k = basis.ncols();
    let identity = Mat::<T>::identity(k, k);
    (&identity - basis.adjoint() * basis).norm_l2()
}

/// Frobenius norm of `A V_m - V_{m+1} H_m` over the active dimension of `ks`.
///
/// This is zero up to rounding for any window width, since the projected matrix records
/// exactly the coefficients that were subtracted.
pub fn recurrence_residual<T, H, O>(operator: &O, ks: &KrylovSubspace<T, H>) -> T::Real
where
    T: ComplexField,
    T::Real: RealField,
    H: Coefficient<T>,
    O: LinearOperator<T> + ?Sized,
{
    let basis = ks.basis();
    let projected = ks.projected();
    let mut work = Col::<T>::zeros(ks.nrows());
    let mut total = T::Real::zero_impl();

    for j in 0..projected.ncols() {
        operator.apply(work.as_mut(), basis.col(j));
        for i in 0..projected.nrows() {
            sub_scaled(work.as_mut(), &H::lift(&projected[(i, j)]), basis.col(i));
        }
        total = add(&total, &T::Real::abs2_impl(&work.norm_l2()));
    }

    T::Real::sqrt_impl(&total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::KrylovOptions, solvers::arnoldi};
    use faer::mat;

    #[test]
    fn test_orthonormal_columns_have_no_loss() {
        let basis = Mat::<f64>::identity(4, 3);
        assert_eq!(orthogonality_loss(basis.as_ref()), 0.0);
    }

    #[test]
    fn test_repeated_column_loss() {
        let basis: Mat<f64> = mat![[1.0, 1.0], [0.0, 0.0]];
        let loss = orthogonality_loss(basis.as_ref());
        assert!((loss - 2.0f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_recurrence_residual_after_arnoldi() {
        let a = Mat::from_fn(8, 8, |i, j| 1.0 / (1.0 + i as f64 + 2.0 * j as f64));
        let b = Col::from_fn(8, |i| (i as f64).cos());
        let mut ks = KrylovSubspace::<f64>::new(8, 5);

        arnoldi(&mut ks, &a, b.as_ref(), KrylovOptions::default().with_m(5)).unwrap();
        assert!(recurrence_residual(&a, &ks) < 1e-12);
    }
}
