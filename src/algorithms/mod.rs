//! Building blocks shared by the Arnoldi and Lanczos processes.
//!
//! ** NOTE: We recommend using the high-level entry point [`crate::solvers::arnoldi`],
//! which detects Hermitian operators and dispatches to the cheaper recurrence. The
//! submodules are public so that each recurrence can be driven and tested on its own.
//!
//! This module holds:
//! - [`Coefficient`] and [`project_coefficient`]: the statically chosen element type of
//!   the projected matrix, and the real-part projection used for Hermitian operators.
//! - [`breakdown_tolerance`]: the absolute threshold for a happy breakdown.
//! - [`KrylovOptions`]: the keyword-style configuration of an iteration call.
//! - The validation and initialization common to both recurrences.

pub mod arnoldi;
pub mod lanczos;

use crate::{
    error::{KrylovError, KrylovErrorKind},
    matrix::{LinearOperator, NormKind},
    subspace::KrylovSubspace,
};
use faer::{
    ColMut, ColRef, c32, c64,
    traits::{
        ComplexField, RealField,
        math_utils::{mul, sub},
    },
};

/// Subspace dimension used when [`KrylovOptions::m`] is not set, capped by the
/// operator dimension.
pub const DEFAULT_SUBSPACE_DIM: usize = 30;

/// Default breakdown tolerance factor, relative to the operator's infinity norm.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Element type of the projected matrix for a basis of element type `T`.
///
/// Every scalar is its own coefficient domain. In addition, the real types serve as the
/// coefficient domain of their complex counterparts: for a Hermitian operator the
/// Lanczos coefficients are real even though the basis vectors are complex, and storing
/// them as reals halves the storage and the cost of downstream small-matrix work.
pub trait Coefficient<T: ComplexField>: ComplexField {
    /// Maps an inner product computed in `T` into this domain.
    fn project(value: &T) -> Self;

    /// Maps a stored coefficient back into `T` for the recurrence arithmetic.
    fn lift(value: &Self) -> T;
}

macro_rules! impl_same_domain {
    ($($ty:ty),* $(,)?) => {$(
        impl Coefficient<$ty> for $ty {
            #[inline]
            fn project(value: &$ty) -> Self {
                *value
            }

            #[inline]
            fn lift(value: &Self) -> $ty {
                *value
            }
        }
    )*};
}

macro_rules! impl_real_part {
    ($($cplx:ty => $real:ty),* $(,)?) => {$(
        impl Coefficient<$cplx> for $real {
            #[inline]
            fn project(value: &$cplx) -> Self {
                value.re
            }

            #[inline]
            fn lift(value: &Self) -> $cplx {
                <$cplx>::new(*value, 0.0)
            }
        }
    )*};
}

impl_same_domain!(f32, f64, c32, c64);
impl_real_part!(c32 => f32, c64 => f64);

/// Projects `value` into the coefficient domain `H`.
///
/// Returns the real part when `H` is real and `T` is complex, and `value` unchanged
/// otherwise.
///
/// ```
/// use faer::c64;
/// use krylov_basis::project_coefficient;
///
/// let z = c64::new(2.5, 1e-17);
/// let real: f64 = project_coefficient(&z);
/// let same: c64 = project_coefficient(&z);
/// assert_eq!(real, 2.5);
/// assert_eq!(same, z);
/// ```
#[inline]
pub fn project_coefficient<H, T>(value: &T) -> H
where
    T: ComplexField,
    H: Coefficient<T>,
{
    H::project(value)
}

/// Computes the absolute breakdown threshold `tol * ||A||_inf`.
///
/// When `opnorm` is `None` the operator's own [`LinearOperator::opnorm`] is used. A
/// residual whose norm falls below this value means the basis already spans an
/// invariant subspace of the operator.
pub fn breakdown_tolerance<T, O>(
    operator: &O,
    tol: &T::Real,
    opnorm: Option<&dyn Fn(&O, NormKind) -> T::Real>,
) -> T::Real
where
    T: ComplexField,
    O: LinearOperator<T> + ?Sized,
{
    let norm = match opnorm {
        Some(opnorm) => opnorm(operator, NormKind::Infinity),
        None => operator.opnorm(NormKind::Infinity),
    };
    mul(tol, &norm)
}

/// Configuration of an Arnoldi or Lanczos call.
///
/// Build it with [`Default`] and the `with_*` methods:
///
/// ```
/// use faer::{Col, Mat};
/// use krylov_basis::KrylovOptions;
///
/// let mut scratch = Col::<f64>::zeros(100);
/// let options = KrylovOptions::<f64, Mat<f64>>::default()
///     .with_m(20)
///     .with_tol(1e-10)
///     .with_iop(4)
///     .with_cache(scratch.as_mut());
/// assert_eq!(options.m, Some(20));
/// assert_eq!(options.iop, 4);
/// ```
pub struct KrylovOptions<'a, T: ComplexField, O: ?Sized> {
    /// Target subspace dimension. Defaults to `min(30, n)`.
    pub m: Option<usize>,
    /// Breakdown tolerance factor, scaled by the operator norm.
    pub tol: T::Real,
    /// Orthogonalization window of the Arnoldi process; `0` orthogonalizes against every
    /// previous vector. Ignored for Hermitian operators.
    pub iop: usize,
    /// Overrides the Hermitian check performed by [`crate::solvers::arnoldi`].
    pub hermitian: Option<bool>,
    /// Custom operator-norm function used to scale `tol`.
    pub opnorm: Option<&'a dyn Fn(&O, NormKind) -> T::Real>,
    /// Scratch vector of length `n`, reused instead of allocating one per call.
    ///
    /// The running call has exclusive access to it for its whole duration.
    pub cache: Option<ColMut<'a, T>>,
}

impl<'a, T: ComplexField, O: ?Sized> Default for KrylovOptions<'a, T, O> {
    fn default() -> Self {
        Self {
            m: None,
            tol: T::Real::from_f64_impl(DEFAULT_TOLERANCE),
            iop: 0,
            hermitian: None,
            opnorm: None,
            cache: None,
        }
    }
}

impl<'a, T: ComplexField, O: ?Sized> KrylovOptions<'a, T, O> {
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = Some(m);
        self
    }

    pub fn with_tol(mut self, tol: T::Real) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_iop(mut self, iop: usize) -> Self {
        self.iop = iop;
        self
    }

    pub fn with_hermitian(mut self, hermitian: bool) -> Self {
        self.hermitian = Some(hermitian);
        self
    }

    pub fn with_opnorm(mut self, opnorm: &'a dyn Fn(&O, NormKind) -> T::Real) -> Self {
        self.opnorm = Some(opnorm);
        self
    }

    pub fn with_cache(mut self, cache: ColMut<'a, T>) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// What a recurrence needs once the inputs have been validated and the workspace primed.
pub(crate) struct IterationSetup<'a, T: ComplexField> {
    pub(crate) m: usize,
    pub(crate) iop: usize,
    pub(crate) vtol: T::Real,
    pub(crate) cache: Option<ColMut<'a, T>>,
}

/// Validates the inputs, sizes the workspace for `m` steps, stores `beta = ||b||` and
/// writes the first basis vector `b / beta`.
///
/// Every check runs before the workspace is touched, so a failing call leaves it intact.
pub(crate) fn prepare<'a, T, H, O>(
    ks: &mut KrylovSubspace<T, H>,
    operator: &O,
    b: ColRef<'_, T>,
    options: KrylovOptions<'a, T, O>,
) -> Result<IterationSetup<'a, T>, KrylovError>
where
    T: ComplexField,
    T::Real: RealField,
    H: Coefficient<T>,
    O: LinearOperator<T> + ?Sized,
{
    let KrylovOptions {
        m,
        tol,
        iop,
        opnorm,
        cache,
        ..
    } = options;

    let n = operator.nrows();
    if n != operator.ncols() {
        return Err(KrylovErrorKind::NonSquareOperator {
            nrows: n,
            ncols: operator.ncols(),
        }
        .into());
    }
    if b.nrows() != n {
        return Err(KrylovErrorKind::DimensionMismatch {
            operator_dim: n,
            vector_len: b.nrows(),
        }
        .into());
    }
    if ks.nrows() != n {
        return Err(KrylovErrorKind::WorkspaceMismatch {
            workspace_rows: ks.nrows(),
            operator_dim: n,
        }
        .into());
    }
    if let Some(cache) = &cache {
        if cache.nrows() != n {
            return Err(KrylovErrorKind::CacheMismatch {
                expected: n,
                actual: cache.nrows(),
            }
            .into());
        }
    }

    let m = m.unwrap_or_else(|| n.min(DEFAULT_SUBSPACE_DIM));
    if m == 0 {
        return Err(KrylovErrorKind::InputError(
            "The subspace dimension `m` must be at least 1.".to_string(),
        )
        .into());
    }

    let beta = b.norm_l2();
    if beta == T::Real::zero_impl() {
        return Err(KrylovErrorKind::InputError(
            "The starting vector `b` must not be a zero vector.".to_string(),
        )
        .into());
    }

    let vtol = breakdown_tolerance::<T, O>(operator, &tol, opnorm);

    if m > ks.capacity {
        ks.resize(m);
    } else {
        ks.dim = m;
    }
    ks.beta = beta;

    // Coefficients left over from a previous call would break the Hessenberg and
    // tridiagonal structure of the active block.
    let mut projected = ks.projected_mut();
    for j in 0..projected.ncols() {
        for i in 0..projected.nrows() {
            projected[(i, j)] = H::zero_impl();
        }
    }

    let inv_beta = T::Real::recip_impl(&ks.beta);
    for r in 0..n {
        ks.basis[(r, 0)] = T::mul_real_impl(&b[r], &inv_beta);
    }

    Ok(IterationSetup {
        m,
        iop,
        vtol,
        cache,
    })
}

/// `w -= coeff * v`.
#[inline]
pub(crate) fn sub_scaled<T: ComplexField>(mut w: ColMut<'_, T>, coeff: &T, v: ColRef<'_, T>) {
    for r in 0..w.nrows() {
        let product = mul(coeff, &v[r]);
        let updated = sub(&w[r], &product);
        w[r] = updated;
    }
}

/// Stores `beta` below the diagonal of column `j` and either truncates the subspace
/// (happy breakdown) or writes the next basis vector `scratch / beta`.
///
/// Returns `true` on breakdown, that is when `beta` is below `vtol` or exactly zero.
pub(crate) fn finish_step<T, H>(
    ks: &mut KrylovSubspace<T, H>,
    j: usize,
    scratch: ColRef<'_, T>,
    beta: T::Real,
    vtol: &T::Real,
) -> bool
where
    T: ComplexField,
    H: Coefficient<T>,
{
    ks.projected[(j + 1, j)] = H::project(&T::from_real_impl(&beta));

    // An exactly zero residual is a breakdown even when the threshold itself is zero
    // (zero operator, or `tol = 0`).
    if beta < *vtol || beta == T::Real::zero_impl() {
        log::debug!(
            "Happy breakdown at step {}: residual norm {:?} is below the tolerance {:?}.",
            j + 1,
            beta,
            vtol
        );
        ks.dim = j + 1;
        // The next column is not computed; do not leave a stale vector in the view.
        for r in 0..ks.nrows() {
            ks.basis[(r, j + 1)] = T::zero_impl();
        }
        return true;
    }

    let inv_beta = T::Real::recip_impl(&beta);
    for r in 0..ks.nrows() {
        ks.basis[(r, j + 1)] = T::mul_real_impl(&scratch[r], &inv_beta);
    }
    false
}
