//! This module provides the high-level entry points for building a Krylov basis.
//!
//! [`arnoldi`] is the function most callers want: it inspects the operator once and
//! runs either the Lanczos three-term recurrence (Hermitian operators) or the Arnoldi
//! process with incomplete orthogonalization (everything else) on a reusable workspace.
//! [`krylov_subspace`] does the same on a freshly allocated workspace.

use crate::{
    algorithms::{
        Coefficient, DEFAULT_SUBSPACE_DIM, KrylovOptions, arnoldi::arnoldi_process,
        lanczos::lanczos_process,
    },
    error::KrylovError,
    matrix::LinearOperator,
    subspace::KrylovSubspace,
};
use faer::{
    ColRef,
    traits::{ComplexField, RealField},
};

/// Builds an orthonormal basis of the Krylov subspace `K_m(A, b)` in `ks`.
///
/// The Hermitian predicate is evaluated once per call, unless
/// [`KrylovOptions::hermitian`] overrides it:
/// - Hermitian operators go to [`lanczos_process`]; the projected matrix is tridiagonal
///   and `options.iop` is ignored.
/// - All other operators go to [`arnoldi_process`]; the projected matrix is upper
///   Hessenberg.
///
/// Reuse one `ks` (and one [`KrylovOptions::cache`] vector) across calls on problems of
/// the same size: the workspace is only reallocated when `m` exceeds its capacity.
///
/// # Returns
/// The active dimension of the subspace. It is smaller than `m` when a happy breakdown
/// occurred, in which case `ks` already spans an invariant subspace of the operator.
///
/// # Errors
/// Returns a [`KrylovError`] when the operator is not square, when `b`, the workspace or
/// the scratch vector do not match its dimension, when `m` is zero, or when `b` is zero.
pub fn arnoldi<T, H, O>(
    ks: &mut KrylovSubspace<T, H>,
    operator: &O,
    b: ColRef<'_, T>,
    options: KrylovOptions<'_, T, O>,
) -> Result<usize, KrylovError>
where
    T: ComplexField,
    T::Real: RealField,
    H: Coefficient<T>,
    O: LinearOperator<T> + ?Sized,
{
    let hermitian = options
        .hermitian
        .unwrap_or_else(|| operator.is_hermitian());

    if hermitian {
        log::trace!("Hermitian operator: using the Lanczos recurrence.");
        lanczos_process(ks, operator, b, options)
    } else {
        arnoldi_process(ks, operator, b, options)
    }
}

/// Allocates a workspace sized for `options.m` (default `min(30, n)`) and runs
/// [`arnoldi`] on it.
///
/// Convenient for one-off calls; loops should keep a [`KrylovSubspace`] around and call
/// [`arnoldi`] instead.
pub fn krylov_subspace<T, O>(
    operator: &O,
    b: ColRef<'_, T>,
    options: KrylovOptions<'_, T, O>,
) -> Result<KrylovSubspace<T, T>, KrylovError>
where
    T: ComplexField + Coefficient<T>,
    T::Real: RealField,
    O: LinearOperator<T> + ?Sized,
{
    let n = operator.nrows();
    let capacity = options.m.unwrap_or_else(|| n.min(DEFAULT_SUBSPACE_DIM));
    let mut ks = KrylovSubspace::new(n, capacity);
    arnoldi(&mut ks, operator, b, options)?;
    Ok(ks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KrylovErrorKind;
    use faer::{Col, Mat, mat};

    #[test]
    fn test_dispatch_matches_lanczos() {
        let a: Mat<f64> = mat![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = Col::from_fn(3, |i| 1.0 + i as f64);

        let mut dispatched = KrylovSubspace::<f64>::new(3, 2);
        let mut direct = KrylovSubspace::<f64>::new(3, 2);
        let options = || KrylovOptions::default().with_m(2).with_iop(1);
        arnoldi(&mut dispatched, &a, b.as_ref(), options()).unwrap();
        lanczos_process(&mut direct, &a, b.as_ref(), options()).unwrap();

        assert_eq!(dispatched.projected(), direct.projected());
        assert_eq!(dispatched.basis(), direct.basis());
    }

    #[test]
    fn test_hermitian_override_forces_general_recurrence() {
        let a: Mat<f64> = mat![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = Col::from_fn(3, |i| 1.0 + i as f64);

        let mut forced = KrylovSubspace::<f64>::new(3, 3);
        let mut general = KrylovSubspace::<f64>::new(3, 3);
        let options = || KrylovOptions::default().with_m(3).with_hermitian(false);
        arnoldi(&mut forced, &a, b.as_ref(), options()).unwrap();
        arnoldi_process(&mut general, &a, b.as_ref(), options()).unwrap();

        assert_eq!(forced.projected(), general.projected());
    }

    #[test]
    fn test_krylov_subspace_allocates_default_size() {
        let a = Mat::from_fn(40, 40, |i, j| if i == j { (i + 1) as f64 } else { 0.0 });
        let b = Col::from_fn(40, |_| 1.0);

        let ks = krylov_subspace(&a, b.as_ref(), KrylovOptions::default()).unwrap();
        assert_eq!(ks.capacity(), 30);
        assert!(ks.dim() <= 30);
    }

    #[test]
    fn test_non_square_operator_is_rejected() {
        let a = Mat::<f64>::zeros(3, 2);
        let b = Col::from_fn(3, |_| 1.0);
        let mut ks = KrylovSubspace::<f64>::new(3, 2);

        let err = arnoldi(&mut ks, &a, b.as_ref(), KrylovOptions::default()).unwrap_err();
        assert_eq!(
            err.kind(),
            &KrylovErrorKind::NonSquareOperator { nrows: 3, ncols: 2 }
        );
    }
}
