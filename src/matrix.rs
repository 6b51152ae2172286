//! This module defines the core abstraction for linear operators.
//!
//! The Arnoldi and Lanczos processes never look at individual matrix entries during the
//! recurrence. They need four capabilities from the operator:
//!
//! 1.  its dimension,
//! 2.  the matrix-vector product, written into a caller-owned buffer,
//! 3.  a Hermitian predicate, used to dispatch to the cheaper three-term recurrence,
//! 4.  an operator norm, used to scale the breakdown tolerance.
//!
//! [`LinearOperator`] formalizes this contract. It is implemented for `faer`'s dense
//! matrices and views, for `faer`'s compressed sparse column matrices, and for
//! [`FnOperator`], which wraps a closure for fully matrix-free operators.

use faer::{
    Accum, ColMut, ColRef, Mat, MatMut, MatRef, Par,
    linalg::matmul::matmul,
    prelude::Reborrow,
    sparse::SparseColMat,
    traits::{
        ComplexField, RealField,
        math_utils::{add, mul},
    },
};
use std::collections::HashMap;

/// The operator norms understood by [`LinearOperator::opnorm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormKind {
    /// Maximum absolute column sum.
    One,
    /// Maximum absolute row sum. Used to scale the breakdown tolerance.
    #[default]
    Infinity,
    /// Square root of the sum of squared magnitudes of all entries.
    Frobenius,
}

/// Represents a square linear operator that a Krylov process can be run on.
///
/// # Type Parameters
///
/// *   `T`: The scalar type, which must implement `ComplexField`. This trait from `faer`
///     provides the necessary arithmetic operations for `f32`, `f64`, and their complex
///     counterparts.
///
/// # Example
///
/// ```
/// use faer::{Col, mat};
/// use krylov_basis::{LinearOperator, NormKind};
///
/// let a = mat![[2.0, 1.0], [1.0, 3.0]];
/// let x = Col::from_fn(2, |i| (i + 1) as f64);
/// let mut y = Col::<f64>::zeros(2);
///
/// a.apply(y.as_mut(), x.as_ref());
/// assert_eq!(y[0], 4.0);
/// assert_eq!(y[1], 7.0);
/// assert!(a.is_hermitian());
/// assert_eq!(a.opnorm(NormKind::Infinity), 4.0);
/// ```
pub trait LinearOperator<T: ComplexField> {
    /// Returns the number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Returns the number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Writes `A * rhs` into `out`.
    ///
    /// The Krylov processes call this once per step with the same scratch buffer, so
    /// implementations should not allocate.
    ///
    /// # Panics
    ///
    /// Implementations are expected to panic if `rhs` or `out` do not match the
    /// operator dimensions.
    fn apply(&self, out: ColMut<'_, T>, rhs: ColRef<'_, T>);

    /// Returns `true` if the operator is square and equal to its conjugate transpose.
    fn is_hermitian(&self) -> bool;

    /// Returns the requested operator norm.
    fn opnorm(&self, kind: NormKind) -> T::Real;
}

#[inline]
fn max_real<R: RealField>(lhs: R, rhs: R) -> R {
    if rhs > lhs { rhs } else { lhs }
}

fn dense_is_hermitian<T: ComplexField>(a: MatRef<'_, T>) -> bool {
    if a.nrows() != a.ncols() {
        return false;
    }
    // The diagonal is included: a Hermitian matrix has a real diagonal.
    for j in 0..a.ncols() {
        for i in 0..=j {
            if a[(i, j)] != T::conj_impl(&a[(j, i)]) {
                return false;
            }
        }
    }
    true
}

fn dense_opnorm<T: ComplexField>(a: MatRef<'_, T>, kind: NormKind) -> T::Real {
    match kind {
        NormKind::Frobenius => a.norm_l2(),
        NormKind::One => (0..a.ncols())
            .map(|j| {
                (0..a.nrows()).fold(T::Real::zero_impl(), |acc, i| {
                    add(&acc, &T::abs_impl(&a[(i, j)]))
                })
            })
            .fold(T::Real::zero_impl(), max_real),
        NormKind::Infinity => (0..a.nrows())
            .map(|i| {
                (0..a.ncols()).fold(T::Real::zero_impl(), |acc, j| {
                    add(&acc, &T::abs_impl(&a[(i, j)]))
                })
            })
            .fold(T::Real::zero_impl(), max_real),
    }
}

/// Implementation of `LinearOperator` for `faer`'s immutable dense matrix view (`MatRef`).
/// This is the primary concrete implementation that the generic algorithms are tested against.
impl<'a, T: ComplexField> LinearOperator<T> for MatRef<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        MatRef::nrows(self)
    }

    #[inline]
    fn ncols(&self) -> usize {
        MatRef::ncols(self)
    }

    #[inline]
    fn apply(&self, out: ColMut<'_, T>, rhs: ColRef<'_, T>) {
        assert_eq!(
            self.ncols(),
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.ncols(),
            rhs.nrows(),
        );
        assert_eq!(
            self.nrows(),
            out.nrows(),
            "Dimension mismatch: operator rows ({}) do not match output rows ({}).",
            self.nrows(),
            out.nrows(),
        );

        // Write straight into the caller's buffer: out = 1.0 * A * rhs.
        matmul(
            out.as_mat_mut(),
            Accum::Replace,
            *self,
            rhs.as_mat(),
            T::one_impl(),
            Par::Seq,
        );
    }

    fn is_hermitian(&self) -> bool {
        dense_is_hermitian(*self)
    }

    fn opnorm(&self, kind: NormKind) -> T::Real {
        dense_opnorm(*self, kind)
    }
}

/// Implementation of `LinearOperator` for `faer`'s mutable dense matrix view (`MatMut`).
/// This implementation delegates to the `MatRef` implementation via a reborrow.
impl<'a, T: ComplexField> LinearOperator<T> for MatMut<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rb().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.rb().ncols()
    }

    #[inline]
    fn apply(&self, out: ColMut<'_, T>, rhs: ColRef<'_, T>) {
        LinearOperator::apply(&self.rb(), out, rhs)
    }

    fn is_hermitian(&self) -> bool {
        dense_is_hermitian(self.rb())
    }

    fn opnorm(&self, kind: NormKind) -> T::Real {
        dense_opnorm(self.rb(), kind)
    }
}

/// Implementation of `LinearOperator` for `faer`'s owned dense matrix (`Mat`).
/// This implementation delegates to the `MatRef` implementation via a reference.
impl<T: ComplexField> LinearOperator<T> for Mat<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.as_ref().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.as_ref().ncols()
    }

    #[inline]
    fn apply(&self, out: ColMut<'_, T>, rhs: ColRef<'_, T>) {
        LinearOperator::apply(&self.as_ref(), out, rhs)
    }

    fn is_hermitian(&self) -> bool {
        dense_is_hermitian(self.as_ref())
    }

    fn opnorm(&self, kind: NormKind) -> T::Real {
        dense_opnorm(self.as_ref(), kind)
    }
}

/// Implementation of `LinearOperator` for `faer`'s compressed sparse column matrix.
///
/// The product and the norms only touch the stored entries, so their cost is
/// proportional to the number of non-zeros.
impl<T: ComplexField> LinearOperator<T> for SparseColMat<usize, T> {
    // `self.nrows()` would resolve to this trait method; ask the symbolic structure.
    #[inline]
    fn nrows(&self) -> usize {
        self.symbolic().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.symbolic().ncols()
    }

    fn apply(&self, mut out: ColMut<'_, T>, rhs: ColRef<'_, T>) {
        assert_eq!(
            self.ncols(),
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.ncols(),
            rhs.nrows(),
        );
        assert_eq!(
            self.nrows(),
            out.nrows(),
            "Dimension mismatch: operator rows ({}) do not match output rows ({}).",
            self.nrows(),
            out.nrows(),
        );

        for i in 0..out.nrows() {
            out[i] = T::zero_impl();
        }
        for triplet in self.triplet_iter() {
            let product = mul(triplet.val, &rhs[triplet.col]);
            let updated = add(&out[triplet.row], &product);
            out[triplet.row] = updated;
        }
    }

    fn is_hermitian(&self) -> bool {
        if self.nrows() != self.ncols() {
            return false;
        }
        let entries: HashMap<(usize, usize), &T> = self
            .triplet_iter()
            .map(|triplet| ((triplet.row, triplet.col), triplet.val))
            .collect();

        // Missing mirror entries are structural zeros.
        entries.iter().all(|(&(row, col), &val)| {
            let mirrored = entries
                .get(&(col, row))
                .map(|&v| T::conj_impl(v))
                .unwrap_or_else(T::zero_impl);
            *val == mirrored
        })
    }

    fn opnorm(&self, kind: NormKind) -> T::Real {
        match kind {
            NormKind::Frobenius => {
                let sum = self.triplet_iter().fold(T::Real::zero_impl(), |acc, triplet| {
                    add(&acc, &T::abs2_impl(triplet.val))
                });
                T::Real::sqrt_impl(&sum)
            }
            NormKind::One | NormKind::Infinity => {
                let len = if kind == NormKind::One {
                    self.ncols()
                } else {
                    self.nrows()
                };
                let mut sums = vec![T::Real::zero_impl(); len];
                for triplet in self.triplet_iter() {
                    let idx = if kind == NormKind::One {
                        triplet.col
                    } else {
                        triplet.row
                    };
                    sums[idx] = add(&sums[idx], &T::abs_impl(triplet.val));
                }
                sums.into_iter().fold(T::Real::zero_impl(), max_real)
            }
        }
    }
}

/// A matrix-free operator defined by a closure computing `out = A * rhs`.
///
/// Since the entries are not available, the Hermitian flag and the operator norm are
/// declared by the caller. The norm defaults to one, which turns the breakdown factor
/// `tol` into an absolute threshold.
///
/// ```
/// use faer::{Col, ColMut, ColRef};
/// use krylov_basis::{FnOperator, LinearOperator, NormKind};
///
/// // The 1D Laplacian stencil [-1, 2, -1] applied without storing a matrix.
/// let n = 5;
/// let laplacian = FnOperator::new(n, |mut out: ColMut<'_, f64>, x: ColRef<'_, f64>| {
///     for i in 0..x.nrows() {
///         let left = if i > 0 { x[i - 1] } else { 0.0 };
///         let right = if i + 1 < x.nrows() { x[i + 1] } else { 0.0 };
///         out[i] = 2.0 * x[i] - left - right;
///     }
/// })
/// .hermitian(true)
/// .with_opnorm(4.0);
///
/// let x = Col::from_fn(n, |_| 1.0);
/// let mut y = Col::<f64>::zeros(n);
/// laplacian.apply(y.as_mut(), x.as_ref());
/// assert_eq!(y[0], 1.0);
/// assert_eq!(y[2], 0.0);
/// assert_eq!(laplacian.opnorm(NormKind::Infinity), 4.0);
/// ```
pub struct FnOperator<T: ComplexField, F> {
    dim: usize,
    apply: F,
    hermitian: bool,
    norm: T::Real,
}

impl<T: ComplexField, F> FnOperator<T, F>
where
    F: Fn(ColMut<'_, T>, ColRef<'_, T>),
{
    /// Wraps `apply` as a square operator of dimension `dim`.
    pub fn new(dim: usize, apply: F) -> Self {
        Self {
            dim,
            apply,
            hermitian: false,
            norm: T::Real::one_impl(),
        }
    }

    /// Declares whether the operator is Hermitian.
    pub fn hermitian(mut self, hermitian: bool) -> Self {
        self.hermitian = hermitian;
        self
    }

    /// Sets the norm estimate returned for every [`NormKind`].
    pub fn with_opnorm(mut self, norm: T::Real) -> Self {
        self.norm = norm;
        self
    }
}

impl<T: ComplexField, F> LinearOperator<T> for FnOperator<T, F>
where
    F: Fn(ColMut<'_, T>, ColRef<'_, T>),
{
    #[inline]
    fn nrows(&self) -> usize {
        self.dim
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.dim
    }

    #[inline]
    fn apply(&self, out: ColMut<'_, T>, rhs: ColRef<'_, T>) {
        (self.apply)(out, rhs)
    }

    fn is_hermitian(&self) -> bool {
        self.hermitian
    }

    fn opnorm(&self, _kind: NormKind) -> T::Real {
        T::Real::copy_impl(&self.norm)
    }
}
