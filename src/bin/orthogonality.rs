//! Experiment Runner for Orthogonality Analysis.
//!
//! This executable measures how the width of the incomplete orthogonalization window
//! (`iop`) affects the Arnoldi basis. For every window in the sweep it records the loss
//! of orthogonality `||I - V^H V||_F`, the residual of the Arnoldi relation and the wall
//! time of the call. A single workspace and scratch vector are reused for the whole
//! sweep, the way an exponential integrator would drive the kernel.
//!
//! The general recurrence is forced for every run, so `iop` is honoured even if the
//! generated operator happens to be symmetric.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use faer::{
    Col, Mat,
    sparse::{SparseColMat, Triplet},
};
use krylov_basis::{
    KrylovOptions, KrylovSubspace, LinearOperator, arnoldi,
    utils::diagnostics::{orthogonality_loss, recurrence_residual},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};

/// Defines the nonsymmetric test operator.
#[derive(ValueEnum, Clone, Debug, Copy)]
enum ProblemScenario {
    /// A dense matrix `2I + R / sqrt(n)` with uniform random `R`. The shift clusters the
    /// spectrum, so the Krylov vectors become nearly dependent and even full
    /// orthogonalization loses accuracy quickly.
    RandomDense,
    /// A sparse 1D convection-diffusion stencil; nonsymmetric through the convection term.
    ConvectionDiffusion,
}

/// Command-line arguments for the orthogonality analysis runner.
#[derive(Parser, Debug)]
#[clap(
    name = "orthogonality-runner",
    about = "Measures Arnoldi basis orthogonality as a function of the IOP window width."
)]
struct OrthoArgs {
    /// The test operator.
    #[clap(long, value_enum, default_value_t = ProblemScenario::RandomDense)]
    scenario: ProblemScenario,
    /// Dimension of the test matrix.
    #[clap(long, default_value_t = 500)]
    n: usize,
    /// Krylov subspace dimension.
    #[clap(long, default_value_t = 60)]
    m: usize,
    /// Comma-separated list of orthogonalization windows; 0 means full orthogonalization.
    #[clap(long, value_delimiter = ',', default_values_t = vec![0, 1, 2, 5, 10, 20])]
    iops: Vec<usize>,
    /// Seed for the random operator and starting vector.
    #[clap(long, default_value_t = 42)]
    seed: u64,
    /// Path to the output CSV file where results will be written.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// One row of the output CSV file.
#[derive(Debug, Serialize)]
struct OrthogonalityResult {
    /// Orthogonalization window; 0 is full orthogonalization.
    iop: usize,
    /// Dimension actually reached (smaller than `m` after a happy breakdown).
    dim: usize,
    /// ||I - V_m^H V_m||_F over the `dim` active basis vectors.
    ortho_loss: f64,
    /// ||A V_m - V_{m+1} H_m||_F.
    recurrence_residual: f64,
    /// Wall time of the `arnoldi` call, in microseconds.
    time_us: u128,
}

fn create_random_dense(n: usize, rng: &mut StdRng) -> Mat<f64> {
    let scale = 1.0 / (n as f64).sqrt();
    Mat::from_fn(n, n, |i, j| {
        let shift = if i == j { 2.0 } else { 0.0 };
        shift + scale * (rng.random::<f64>() - 0.5)
    })
}

fn create_convection_diffusion(n: usize) -> Result<SparseColMat<usize, f64>> {
    let h = 1.0 / (n + 1) as f64;
    let convection = 0.5 * 20.0 * h;
    let mut triplets = Vec::with_capacity(3 * n);
    for i in 0..n {
        triplets.push(Triplet { row: i, col: i, val: 2.0 });
        if i > 0 {
            triplets.push(Triplet { row: i, col: i - 1, val: -1.0 - convection });
        }
        if i + 1 < n {
            triplets.push(Triplet { row: i, col: i + 1, val: -1.0 + convection });
        }
    }
    SparseColMat::try_new_from_triplets(n, n, &triplets)
        .map_err(|e| anyhow!("Failed to construct convection-diffusion matrix: {e:?}"))
}

fn run_sweep<O: LinearOperator<f64>>(
    operator: &O,
    b: &Col<f64>,
    args: &OrthoArgs,
    writer: &mut csv::Writer<std::fs::File>,
) -> Result<()> {
    let mut ks = KrylovSubspace::<f64>::new(args.n, args.m);
    let mut scratch = Col::<f64>::zeros(args.n);

    for &iop in &args.iops {
        log::info!("Running for iop = {}...", iop);
        let options = KrylovOptions::default()
            .with_m(args.m)
            .with_iop(iop)
            .with_hermitian(false)
            .with_cache(scratch.as_mut());

        let start = Instant::now();
        let dim = arnoldi(&mut ks, operator, b.as_ref(), options)
            .with_context(|| format!("Arnoldi process failed for iop = {iop}"))?;
        let time_us = start.elapsed().as_micros();

        if ks.is_truncated(args.m) {
            log::info!("Happy breakdown: subspace dimension {} < {}.", dim, args.m);
        }

        writer.serialize(OrthogonalityResult {
            iop,
            dim,
            ortho_loss: orthogonality_loss(ks.basis().get(.., ..dim)),
            recurrence_residual: recurrence_residual(operator, &ks),
            time_us,
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;
    let args = OrthoArgs::parse();
    log::info!(
        "Starting orthogonality analysis for scenario: {:?}, n = {}, m = {}",
        args.scenario,
        args.n,
        args.m
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let b = Col::from_fn(args.n, |_| rng.random::<f64>());
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Cannot create output file {:?}", args.output))?;

    match args.scenario {
        ProblemScenario::RandomDense => {
            let a = create_random_dense(args.n, &mut rng);
            run_sweep(&a, &b, &args, &mut writer)?;
        }
        ProblemScenario::ConvectionDiffusion => {
            let a = create_convection_diffusion(args.n)?;
            run_sweep(&a, &b, &args, &mut writer)?;
        }
    }

    writer.flush()?;
    log::info!(
        "Orthogonality analysis complete. Results saved to {:?}.",
        &args.output
    );
    Ok(())
}
