use crate::histogram::{CompactSummary, Histogram, HistogramSource, RawDump};
use anyhow::{ensure, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Count k-mers of one input with KMC and turn the result into a
/// multiplicity histogram.
///
/// The compact summary (`kmc_tools transform .. histogram`) is preferred;
/// when it is unavailable, fails, or comes back empty, the raw `kmc_dump`
/// output is parsed instead. `force_dump` skips the summary attempt.
pub fn count_histogram(
    input: &Path,
    workdir: &Path,
    kmerlen: u32,
    force_dump: bool,
) -> Result<Histogram> {
    let db = run_kmc(input, workdir, kmerlen)?;
    if !force_dump {
        match summarize_counts(&db, workdir)
            .and_then(|summary| CompactSummary::new(summary).histogram())
        {
            Ok(hist) if !hist.is_empty() => return Ok(hist),
            Ok(_) => eprintln!("Compact summary was empty, falling back to the raw dump"),
            Err(e) => eprintln!("Compact summary unavailable ({e:#}), falling back to the raw dump"),
        }
    }
    let dump = dump_counts(&db, workdir)?;
    RawDump::new(dump).histogram()
}

fn run_kmc(input: &Path, workdir: &Path, kmerlen: u32) -> Result<PathBuf> {
    let db = workdir.join("kmc_db");
    let tmp = workdir.join("tmp_kmc");
    fs::create_dir_all(&tmp)
        .with_context(|| format!("could not create {}", tmp.display()))?;
    eprintln!("Counting {kmerlen}-mers in {}", input.display());
    let status = Command::new("kmc")
        .arg(format!("-k{kmerlen}"))
        .arg("-ci1")
        .arg("-t8")
        .arg("-fm")
        .arg(input)
        .arg(&db)
        .arg(&tmp)
        .status()
        .context("could not run kmc, is it on PATH?")?;
    ensure!(status.success(), "kmc exited with {status}");
    Ok(db)
}

fn summarize_counts(db: &Path, workdir: &Path) -> Result<PathBuf> {
    let out = workdir.join("kmc_histogram.txt");
    let status = Command::new("kmc_tools")
        .arg("transform")
        .arg(db)
        .arg("histogram")
        .arg(&out)
        .status()
        .context("could not run kmc_tools, is it on PATH?")?;
    ensure!(status.success(), "kmc_tools exited with {status}");
    Ok(out)
}

fn dump_counts(db: &Path, workdir: &Path) -> Result<PathBuf> {
    let out = workdir.join("kmc_dump.txt");
    let status = Command::new("kmc_dump")
        .arg(db)
        .arg(&out)
        .status()
        .context("could not run kmc_dump, is it on PATH?")?;
    ensure!(status.success(), "kmc_dump exited with {status}");
    Ok(out)
}
