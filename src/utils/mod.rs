//! Utilities for checking the numerical quality of a computed basis.
//!
//! - **`diagnostics`**: measures the loss of orthogonality of a basis and the residual of
//!   the Arnoldi relation `A V_m = V_{m+1} H_m`. The experiment runner and the test
//!   suite both use these to quantify the effect of incomplete orthogonalization.

pub mod diagnostics;
