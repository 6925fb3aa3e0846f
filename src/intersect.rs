use crate::sketch::Sketch;
use anyhow::{ensure, Result};
use std::path::Path;

/// Estimate the intersection size of the two unsampled k-mer sets behind
/// two sketch artifacts: the shared-hash count rescaled by 1/theta.
///
/// Empty or unreadable sketches are an error, not a silent zero; a rate
/// estimate without an intersection is meaningless.
pub fn estimate_intersection(sig1: &Path, sig2: &Path, theta: f64) -> Result<f64> {
    ensure!(
        theta > 0.0 && theta <= 1.0,
        "theta must be in (0, 1], got {}",
        theta
    );
    let s1 = Sketch::load(sig1)?;
    let s2 = Sketch::load(sig2)?;
    ensure!(!s1.is_empty(), "{} contains no hashes", sig1.display());
    ensure!(!s2.is_empty(), "{} contains no hashes", sig2.display());
    let shared = s1.count_common(&s2)?;
    eprintln!("Sketch intersection: {shared}");
    Ok(shared as f64 / theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::{SketchParams, SKETCH_SEED};

    fn write_sketch(dir: &Path, name: &str, seq: &[u8]) -> std::path::PathBuf {
        let mut sketch = Sketch::new(SketchParams::new(3, 1, SKETCH_SEED));
        sketch.add_sequence(seq);
        let path = dir.join(name);
        sketch.write(&path).unwrap();
        path
    }

    #[test]
    fn rescales_by_reciprocal_theta() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_sketch(dir.path(), "a.sig", b"ACGTACGT");
        let b = write_sketch(dir.path(), "b.sig", b"ACGTACGT");
        // both windows classes shared, theta 0.1 scales the count tenfold
        let i = estimate_intersection(&a, &b, 0.1).unwrap();
        assert!((i - 20.0).abs() < 1e-12);
        let i = estimate_intersection(&a, &b, 1.0).unwrap();
        assert!((i - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sketch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_sketch(dir.path(), "a.sig", b"ACGTACGT");
        let b = write_sketch(dir.path(), "b.sig", b"NNNNN");
        assert!(estimate_intersection(&a, &b, 1.0).is_err());
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_sketch(dir.path(), "a.sig", b"ACGTACGT");
        assert!(estimate_intersection(&a, &dir.path().join("nope.sig"), 1.0).is_err());
    }
}
