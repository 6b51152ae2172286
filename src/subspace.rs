//! The reusable Krylov workspace.
//!
//! A [`KrylovSubspace`] owns the basis matrix `V` (n × (capacity + 1)) and the projected
//! matrix `H` ((capacity + 1) × capacity). The Arnoldi and Lanczos processes fill it in
//! place. Higher-level algorithms (exponential integrators, restarted eigensolvers) call
//! these processes thousands of times on problems of the same size, so one workspace is
//! meant to be allocated once and refilled on every call.
//!
//! All views handed out are bounded by the *active* dimension, never by the allocated
//! capacity. After a happy breakdown the active dimension is smaller than the requested
//! one and the views shrink accordingly.

use crate::algorithms::Coefficient;
use faer::{
    Mat, MatMut, MatRef,
    traits::{ComplexField, RealField},
};

/// Storage for an orthonormal Krylov basis and its projected matrix.
///
/// # Type Parameters
///
/// * `T`: element type of the basis vectors.
/// * `H`: element type of the projected matrix. It defaults to `T`. For a Hermitian
///   operator with complex vectors, `H` may be the real type (for example
///   `KrylovSubspace<c64, f64>`), since the Lanczos coefficients are real.
///
/// # Example
///
/// ```
/// use faer::{Col, mat};
/// use krylov_basis::{KrylovOptions, KrylovSubspace, arnoldi};
///
/// let a = mat![[2.0, 0.0], [0.0, 3.0]];
/// let b = Col::from_fn(2, |_| 1.0);
///
/// let mut ks = KrylovSubspace::<f64>::new(2, 2);
/// let dim = arnoldi(&mut ks, &a, b.as_ref(), KrylovOptions::default().with_m(2))?;
///
/// assert_eq!(dim, 2);
/// assert!((ks.beta() - 2.0f64.sqrt()).abs() < 1e-14);
/// assert_eq!(ks.basis().ncols(), 3);
/// assert!((ks.projected()[(0, 0)] - 2.5).abs() < 1e-14);
/// # Ok::<(), krylov_basis::KrylovError>(())
/// ```
#[derive(Debug, Clone)]
pub struct KrylovSubspace<T: ComplexField, H: Coefficient<T> = T> {
    /// Active dimension `m`: the number of completed Arnoldi/Lanczos steps.
    pub(crate) dim: usize,
    /// Largest `m` the current storage supports.
    pub(crate) capacity: usize,
    /// Norm of the most recent starting vector.
    pub(crate) beta: T::Real,
    pub(crate) basis: Mat<T>,
    pub(crate) projected: Mat<H>,
}

impl<T: ComplexField, H: Coefficient<T>> KrylovSubspace<T, H>
where
    T::Real: RealField,
{
    /// Allocates a workspace for vectors of length `n` and subspaces of up to
    /// `capacity` dimensions.
    ///
    /// Both stores are zero-filled; nothing in them is meaningful until an iteration
    /// routine has run.
    pub fn new(n: usize, capacity: usize) -> Self {
        Self {
            dim: capacity,
            capacity,
            beta: T::Real::zero_impl(),
            basis: Mat::zeros(n, capacity + 1),
            projected: Mat::zeros(capacity + 1, capacity),
        }
    }

    /// Length of the basis vectors.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.basis.nrows()
    }

    /// Active dimension of the subspace.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Maximum dimension the current storage supports without a resize.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Euclidean norm of the last starting vector.
    #[inline]
    pub fn beta(&self) -> T::Real {
        T::Real::copy_impl(&self.beta)
    }

    /// Returns `true` if the last iteration stopped before reaching `requested` steps.
    #[inline]
    pub fn is_truncated(&self, requested: usize) -> bool {
        self.dim < requested
    }

    /// The first `dim + 1` basis vectors, as columns of an n × (dim + 1) view.
    pub fn basis(&self) -> MatRef<'_, T> {
        self.basis.as_ref().get(.., ..self.dim + 1)
    }

    /// The (dim + 1) × dim projected matrix: upper Hessenberg for the Arnoldi process,
    /// tridiagonal for the Lanczos process.
    pub fn projected(&self) -> MatRef<'_, H> {
        self.projected.as_ref().get(..self.dim + 1, ..self.dim)
    }

    pub(crate) fn projected_mut(&mut self) -> MatMut<'_, H> {
        self.projected.as_mut().get_mut(..self.dim + 1, ..self.dim)
    }

    /// Reallocates both stores for subspaces of up to `capacity` dimensions.
    ///
    /// This is destructive and expensive: every basis vector and coefficient is
    /// discarded, `beta` is reset to zero and the active dimension becomes `capacity`.
    /// Call an iteration routine before reading the workspace again. Use sparingly;
    /// allocate with enough capacity up front when the largest `m` is known.
    pub fn resize(&mut self, capacity: usize) {
        log::debug!(
            "Resizing Krylov workspace from capacity {} to {} (n = {}).",
            self.capacity,
            capacity,
            self.nrows()
        );
        let n = self.nrows();
        self.basis = Mat::zeros(n, capacity + 1);
        self.projected = Mat::zeros(capacity + 1, capacity);
        self.beta = T::Real::zero_impl();
        self.dim = capacity;
        self.capacity = capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::c64;

    #[test]
    fn test_new_workspace_shapes() {
        let ks = KrylovSubspace::<f64>::new(10, 4);
        assert_eq!(ks.nrows(), 10);
        assert_eq!(ks.dim(), 4);
        assert_eq!(ks.capacity(), 4);
        assert_eq!(ks.beta(), 0.0);
        assert_eq!(ks.basis().nrows(), 10);
        assert_eq!(ks.basis().ncols(), 5);
        assert_eq!(ks.projected().nrows(), 5);
        assert_eq!(ks.projected().ncols(), 4);
        assert_eq!(ks.projected().norm_l2(), 0.0);
    }

    #[test]
    fn test_views_follow_active_dimension() {
        let mut ks = KrylovSubspace::<f64>::new(6, 5);
        ks.dim = 2;
        assert_eq!(ks.basis().ncols(), 3);
        assert_eq!(ks.projected().nrows(), 3);
        assert_eq!(ks.projected().ncols(), 2);
        assert!(ks.is_truncated(5));
        assert!(!ks.is_truncated(2));

        ks.projected_mut()[(2, 1)] = 7.0;
        assert_eq!(ks.projected()[(2, 1)], 7.0);
    }

    #[test]
    fn test_resize_discards_content() {
        let mut ks = KrylovSubspace::<f64>::new(3, 2);
        ks.basis[(0, 0)] = 1.0;
        ks.projected[(0, 0)] = 5.0;
        ks.beta = 2.0;
        ks.dim = 1;

        ks.resize(4);

        assert_eq!(ks.dim(), 4);
        assert_eq!(ks.capacity(), 4);
        assert_eq!(ks.nrows(), 3);
        assert_eq!(ks.beta(), 0.0);
        assert_eq!(ks.basis().ncols(), 5);
        assert_eq!(ks.projected().nrows(), 5);
        assert_eq!(ks.basis().norm_l2(), 0.0);
        assert_eq!(ks.projected().norm_l2(), 0.0);
    }

    #[test]
    fn test_complex_basis_with_real_coefficients() {
        let ks = KrylovSubspace::<c64, f64>::new(4, 3);
        let projected: MatRef<'_, f64> = ks.projected();
        assert_eq!(projected.ncols(), 3);
        assert_eq!(ks.basis()[(0, 0)], c64::new(0.0, 0.0));
    }
}
