use crate::counter;
use crate::histogram::{DistributionFile, Histogram, HistogramSource};
use crate::intersect;
use crate::rate::mutation_rate;
use crate::sketch::{Sketch, SketchParams, SKETCH_SEED};
use crate::solve::solve_histogram_equation;
use anyhow::{ensure, Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Args, Debug)]
pub struct EstimateOpts {
    /// K-mer length
    #[arg(short, long, default_value_t = 31)]
    pub kmerlen: u32,

    /// Sketch subsampling threshold; the sketch scale is its reciprocal
    #[arg(short, long, default_value_t = 1.0)]
    pub theta: f64,

    /// Keep intermediate artifacts in this directory instead of a
    /// temporary one
    #[arg(short, long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Remove the working directory when the run completes
    #[arg(long)]
    pub cleanup: bool,

    /// Build the histogram from the raw per k-mer dump even when the
    /// compact summary is available
    #[arg(long)]
    pub force_dump: bool,
}

/// `sequence` and `mixture` modes: histogram counted from the first input.
#[derive(Args, Debug)]
pub struct PairCmd {
    /// First input FASTA, optionally gzipped
    #[arg(value_name = "FASTA")]
    pub input1: PathBuf,

    /// Second input FASTA, optionally gzipped
    #[arg(value_name = "FASTA")]
    pub input2: PathBuf,

    #[command(flatten)]
    pub opts: EstimateOpts,
}

/// `kmer` mode: histogram supplied as a precomputed distribution file.
#[derive(Args, Debug)]
pub struct KmerCmd {
    /// First input FASTA, optionally gzipped
    #[arg(value_name = "FASTA")]
    pub input1: PathBuf,

    /// Second input FASTA, optionally gzipped
    #[arg(value_name = "FASTA")]
    pub input2: PathBuf,

    /// Precomputed (multiplicity, frequency) CSV distribution
    #[arg(short, long, value_name = "CSV", required = true)]
    pub dist: PathBuf,

    #[command(flatten)]
    pub opts: EstimateOpts,
}

enum HistogramOrigin<'a> {
    Counted,
    Precomputed(&'a Path),
}

pub fn from_sequences(cmd: PairCmd) -> Result<f64> {
    run(&cmd.input1, &cmd.input2, HistogramOrigin::Counted, &cmd.opts)
}

pub fn from_distribution(cmd: KmerCmd) -> Result<f64> {
    run(
        &cmd.input1,
        &cmd.input2,
        HistogramOrigin::Precomputed(&cmd.dist),
        &cmd.opts,
    )
}

/// The full pipeline for one invocation: histogram, two sketches, the
/// intersection estimate, then the boundary policy and the solver.
fn run(
    input1: &Path,
    input2: &Path,
    origin: HistogramOrigin,
    opts: &EstimateOpts,
) -> Result<f64> {
    ensure!(
        opts.kmerlen >= 1 && opts.kmerlen <= 32,
        "k-mer length must be in 1..=32, got {}",
        opts.kmerlen
    );
    ensure!(
        opts.theta > 0.0 && opts.theta <= 1.0,
        "theta must be in (0, 1], got {}",
        opts.theta
    );
    let scratch = Scratch::create(opts.workdir.as_deref())?;
    eprintln!("Intermediate artifacts in {}", scratch.path().display());

    let hist = match origin {
        HistogramOrigin::Counted => {
            counter::count_histogram(input1, scratch.path(), opts.kmerlen, opts.force_dump)?
        }
        HistogramOrigin::Precomputed(dist) => DistributionFile::new(dist).histogram()?,
    };
    if hist.is_empty() {
        eprintln!("Warning: histogram is empty, L0 = 0");
    }

    let scaled = (1.0 / opts.theta).round() as u64;
    let params = SketchParams::new(opts.kmerlen, scaled, SKETCH_SEED);
    let sig1 = scratch.path().join("sig1.sig");
    let sig2 = scratch.path().join("sig2.sig");
    Sketch::build(input1, params)?.write(&sig1)?;
    Sketch::build(input2, params)?.write(&sig2)?;

    let intersection = intersect::estimate_intersection(&sig1, &sig2, opts.theta)?;
    let rate = boundary_checked_rate(&hist, intersection, opts.kmerlen)?;

    scratch.finish(opts.cleanup)?;
    Ok(rate)
}

/// Apply the `I >= L0` saturation policy, otherwise solve for q and
/// convert it. Kept separate from `run` so it can be exercised without
/// external collaborators.
pub fn boundary_checked_rate(hist: &Histogram, intersection: f64, kmerlen: u32) -> Result<f64> {
    let total = hist.distinct_kmers();
    eprintln!("Total distinct k-mers L0: {total}");
    eprintln!("Estimated intersection I: {intersection}");
    if intersection >= total as f64 {
        // intersection at or above L0: no detectable divergence
        return Ok(0.0);
    }
    let q = solve_histogram_equation(hist, intersection)?;
    Ok(mutation_rate(q, kmerlen))
}

/// Scoped scratch space, owned by one invocation. A temporary directory
/// is released when the run ends; a user-supplied directory persists
/// unless cleanup was requested.
enum Scratch {
    Temp(TempDir),
    Dir(PathBuf),
}

impl Scratch {
    fn create(workdir: Option<&Path>) -> Result<Scratch> {
        match workdir {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("could not create {}", dir.display()))?;
                Ok(Scratch::Dir(dir.to_path_buf()))
            }
            None => Ok(Scratch::Temp(
                TempDir::new().context("could not create a scratch directory")?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Scratch::Temp(dir) => dir.path(),
            Scratch::Dir(dir) => dir,
        }
    }

    fn finish(self, cleanup: bool) -> Result<()> {
        match self {
            Scratch::Temp(dir) => dir.close().context("could not release scratch directory"),
            Scratch::Dir(dir) if cleanup => fs::remove_dir_all(&dir)
                .with_context(|| format!("could not remove {}", dir.display())),
            Scratch::Dir(_) => Ok(()),
        }
    }
}
