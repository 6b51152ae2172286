//! Symmetric (Hermitian) Lanczos process.
//!
//! ** NOTE: [`crate::solvers::arnoldi`] dispatches here automatically when the operator
//! is Hermitian. This module is public for callers that already know the operator is
//! Hermitian and want to skip the check, and for testing the recurrence on its own.
//!
//! For a Hermitian operator the Arnoldi projection `V^H A V` is Hermitian and upper
//! Hessenberg, hence tridiagonal. Orthogonalizing each new vector against the two
//! previous ones is then enough: orthogonality against older vectors follows from
//! symmetry, up to rounding. This reduces the cost of a step from O(j · n) to O(n).
//!
//! The diagonal entries α_j = v_j^H A v_j and the off-diagonal entries β_j = ||w_j|| are
//! real, which is what lets a complex basis be paired with real coefficient storage
//! (see [`crate::Coefficient`]).

use super::{Coefficient, KrylovOptions, finish_step, prepare, sub_scaled};
use crate::{error::KrylovError, matrix::LinearOperator, subspace::KrylovSubspace};
use faer::{
    Col, ColMut,
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Runs up to `m` steps of the Lanczos three-term recurrence, filling `ks` in place.
///
/// The caller is responsible for `operator` being Hermitian; no check is made here.
/// `options.iop` and `options.hermitian` are ignored.
///
/// # Arguments
/// * `ks`: The workspace. It is resized (destructively) if `m` exceeds its capacity.
/// * `operator`: A Hermitian operator of dimension `n`.
/// * `b`: The starting vector. Must have length `n` and must not be zero.
/// * `options`: See [`KrylovOptions`].
///
/// # Returns
/// The active dimension of the subspace. The projected matrix holds α_j on the diagonal
/// and β_j on both off-diagonals, plus β_m in the last row.
pub fn lanczos_process<T, H, O>(
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
    let setup = prepare(ks, operator, b, options)?;
    let m = setup.m;

    let mut owned;
    let mut scratch: ColMut<'_, T> = match setup.cache {
        Some(cache) => cache,
        None => {
            owned = Col::<T>::zeros(ks.nrows());
            owned.as_mut()
        }
    };

    for j in 0..m {
        operator.apply(scratch.rb_mut(), ks.basis.col(j));

        let v_j = ks.basis.col(j);
        let alpha = H::project(&(v_j.adjoint() * scratch.rb()));
        sub_scaled(scratch.rb_mut(), &H::lift(&alpha), v_j);
        ks.projected[(j, j)] = alpha;

        if j > 0 {
            // β_{j-1} was mirrored above the diagonal by the previous step.
            let beta_prev = H::lift(&ks.projected[(j - 1, j)]);
            sub_scaled(scratch.rb_mut(), &beta_prev, ks.basis.col(j - 1));
        }

        let beta = scratch.norm_l2();
        log::trace!("Lanczos step {}: residual norm {:?}.", j + 1, beta);
        if j + 1 < m {
            ks.projected[(j, j + 1)] = H::project(&T::from_real_impl(&beta));
        }
        if finish_step(ks, j, scratch.rb(), beta, &setup.vtol) {
            break;
        }
    }

    Ok(ks.dim)
}
