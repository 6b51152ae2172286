//! Reusable Krylov subspace workspaces with Arnoldi and Lanczos iterations.
//!
//! This crate builds an orthonormal basis `V_m = [v_1, ..., v_m]` of the Krylov subspace
//! `K_m(A, b) = span{b, Ab, ..., A^{m-1} b}` together with the projected matrix
//! `H_m = V_m^H A V_m` and the relation `A V_m = V_{m+1} H_m`. It is the inner kernel of
//! Krylov methods for matrix functions (`exp(tA) b`, `phi_k(tA) b`) and of restarted
//! eigensolvers, which call it many times on problems of the same size.
//!
//! Built on the [`faer`] linear algebra framework. Operators are anything implementing
//! [`LinearOperator`]: dense [`faer::Mat`] views, [`faer::sparse::SparseColMat`], or a
//! closure wrapped in [`FnOperator`].
//!
//! ## Algorithms
//!
//! **Arnoldi with incomplete orthogonalization** ([`arnoldi_process`]): Each new vector is
//! orthogonalized against a window of the `iop` most recent basis vectors (all of them
//! when `iop = 0`). Produces an upper Hessenberg `H_m`. A narrow window trades global
//! orthogonality for O(iop · n) work per step.
//!
//! **Lanczos** ([`lanczos_process`]): For Hermitian operators, a three-term recurrence
//! produces a tridiagonal `H_m` in O(n) work per step. The coefficients are real, so a
//! complex basis may store them in real precision (`KrylovSubspace<c64, f64>`).
//!
//! [`arnoldi`] picks between the two by testing the operator once per call.
//!
//! ## Reuse
//!
//! A [`KrylovSubspace`] is allocated once and refilled by every call. It only grows,
//! destructively, when a call asks for more steps than its capacity. The scratch vector
//! used for matrix-vector products can be supplied through [`KrylovOptions::cache`] so
//! that steady-state calls allocate nothing.
//!
//! ## Happy breakdown
//!
//! When the residual norm at step `j` drops below `tol * ||A||_inf`, the basis spans an
//! invariant subspace. Iteration stops, the active dimension becomes `j` and every view
//! of the workspace shrinks to it. The caller reads the actual dimension from the
//! returned value or from [`KrylovSubspace::dim`].
//!
//! ## Example Usage
//!
//! ```rust
//! use faer::{Col, Mat};
//! use krylov_basis::{KrylovOptions, KrylovSubspace, arnoldi};
//!
//! // A nonsymmetric tridiagonal matrix.
//! let n = 50;
//! let a = Mat::from_fn(n, n, |i, j| {
//!     if i == j { 4.0 }
//!     else if j == i + 1 { -1.0 }
//!     else if i == j + 1 { -2.0 }
//!     else { 0.0 }
//! });
//! let b = Col::from_fn(n, |i| 1.0 / (i + 1) as f64);
//!
//! let mut ks = KrylovSubspace::<f64>::new(n, 10);
//! let mut scratch = Col::<f64>::zeros(n);
//!
//! for iop in [0, 2] {
//!     let options = KrylovOptions::default()
//!         .with_m(10)
//!         .with_iop(iop)
//!         .with_cache(scratch.as_mut());
//!     let dim = arnoldi(&mut ks, &a, b.as_ref(), options)?;
//!     assert_eq!(dim, 10);
//!
//!     // A V_m = V_{m+1} H_m, whatever the window width.
//!     let lhs = a.as_ref() * ks.basis().get(.., ..dim);
//!     let rhs = ks.basis() * ks.projected();
//!     assert!((lhs - rhs).norm_l2() < 1e-12);
//! }
//! # Ok::<(), krylov_basis::KrylovError>(())
//! ```

pub mod algorithms;
pub mod error;
pub mod matrix;
pub mod solvers;
pub mod subspace;
pub mod utils;

pub use algorithms::{
    Coefficient, DEFAULT_SUBSPACE_DIM, DEFAULT_TOLERANCE, KrylovOptions, arnoldi::arnoldi_process,
    breakdown_tolerance, lanczos::lanczos_process, project_coefficient,
};
pub use error::{KrylovError, KrylovErrorKind};
pub use matrix::{FnOperator, LinearOperator, NormKind};
pub use solvers::{arnoldi, krylov_subspace};
pub use subspace::KrylovSubspace;
