//! Arnoldi process with incomplete orthogonalization (IOP).
//!
//! ** NOTE: We recommend using [`crate::solvers::arnoldi`], which routes Hermitian
//! operators to the three-term Lanczos recurrence. Call [`arnoldi_process`] directly
//! only to force the general recurrence.
//!
//! Step `j` applies the operator to the newest basis vector and removes its components
//! along a window of the `iop` most recent vectors with modified Gram-Schmidt. With
//! `iop = 0` the window covers every previous vector (full Arnoldi) and the basis is
//! orthonormal to working precision. A narrower window costs O(iop · n) per step instead
//! of O(j · n), at the price of orthogonality against vectors outside the window. The
//! recurrence `A V_m = V_{m+1} H_m` holds in both cases.

use super::{Coefficient, KrylovOptions, finish_step, prepare, sub_scaled};
use crate::{error::KrylovError, matrix::LinearOperator, subspace::KrylovSubspace};
use faer::{
    Col, ColMut,
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Runs up to `m` steps of the Arnoldi process, filling `ks` in place.
///
/// The projected matrix is upper Hessenberg; with a finite `iop`, entries above the
/// orthogonalization window are zero. `options.hermitian` is ignored here.
///
/// Real coefficient storage for a complex basis (for example `KrylovSubspace<c64, f64>`)
/// is only valid for Hermitian operators: the imaginary parts of the Hessenberg entries
/// are dropped, and for a non-Hermitian operator `A V_m = V_{m+1} H_m` no longer holds.
/// Debug builds check this.
///
/// # Arguments
/// * `ks`: The workspace. It is resized (destructively) if `m` exceeds its capacity.
/// * `operator`: A square operator of dimension `n`.
/// * `b`: The starting vector. Must have length `n` and must not be zero.
/// * `options`: See [`KrylovOptions`].
///
/// # Returns
/// The active dimension of the subspace: `m`, or the step at which a happy breakdown
/// occurred.
pub fn arnoldi_process<T, H, O>(
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
    debug_assert!(
        !(H::IS_REAL && !T::IS_REAL) || operator.is_hermitian(),
        "Real coefficient storage requires a Hermitian operator."
    );

    let setup = prepare(ks, operator, b, options)?;
    let m = setup.m;
    let iop = if setup.iop == 0 { m } else { setup.iop };

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

        // Window [max(0, j - iop + 1), j]. The subtractions run in order, each one on
        // the already updated residual.
        for i in j.saturating_sub(iop - 1)..=j {
            let v_i = ks.basis.col(i);
            let alpha = H::project(&(v_i.adjoint() * scratch.rb()));
            sub_scaled(scratch.rb_mut(), &H::lift(&alpha), v_i);
            ks.projected[(i, j)] = alpha;
        }

        let beta = scratch.norm_l2();
        log::trace!("Arnoldi step {}: residual norm {:?}.", j + 1, beta);
        if finish_step(ks, j, scratch.rb(), beta, &setup.vtol) {
            break;
        }
    }

    Ok(ks.dim)
}
