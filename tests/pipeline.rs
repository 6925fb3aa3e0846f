#[cfg(test)]
mod tests {
    use mutrate::estimate::{self, EstimateOpts, KmerCmd};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn fasta_with(seq: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, ">seq\n{seq}").unwrap();
        f
    }

    fn dist_with(rows: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{rows}").unwrap();
        f
    }

    fn kmer_cmd(input1: &Path, input2: &Path, dist: &Path, kmerlen: u32) -> KmerCmd {
        KmerCmd {
            input1: PathBuf::from(input1),
            input2: PathBuf::from(input2),
            dist: PathBuf::from(dist),
            opts: EstimateOpts {
                kmerlen,
                theta: 1.0,
                workdir: None,
                cleanup: false,
                force_dump: false,
            },
        }
    }

    /// Exercise the solver path end to end. Input1 holds one canonical
    /// 2-mer class (AA), input2 three (AA, AC, CA), so I = 1. With the
    /// distribution {1: 4}, f(x) = 3 - 4x, q = 0.75 and
    /// r = 1 - 0.25^(1/2) = 0.5.
    #[test]
    fn kmer_mode_reaches_the_solver() {
        let input1 = fasta_with("AAAAAA");
        let input2 = fasta_with("AACAAC");
        let dist = dist_with("1,4");
        let cmd = kmer_cmd(input1.path(), input2.path(), dist.path(), 2);
        let r = estimate::from_distribution(cmd).unwrap();
        assert!((r - 0.5).abs() < 1e-12, "r = {r}");
    }

    /// Identical inputs share every hash; with L0 = 1 the intersection
    /// saturates and the rate is zero without a solve.
    #[test]
    fn saturated_intersection_yields_zero_rate() {
        let input1 = fasta_with("ACGTACGTAGCTAGCTAG");
        let dist = dist_with("1,1");
        let cmd = kmer_cmd(input1.path(), input1.path(), dist.path(), 3);
        let r = estimate::from_distribution(cmd).unwrap();
        assert_eq!(r, 0.0);
    }

    /// Inputs with no shared k-mers give I = 0, q = 1 and r = 1.
    #[test]
    fn disjoint_inputs_yield_full_divergence() {
        let input1 = fasta_with("AAAAAAAAAAAAAAAAAAAA");
        let input2 = fasta_with("CCCCCCCCCCCCCCCCCCCC");
        let dist = dist_with("1,100");
        let cmd = kmer_cmd(input1.path(), input2.path(), dist.path(), 5);
        let r = estimate::from_distribution(cmd).unwrap();
        assert_eq!(r, 1.0);
    }

    /// A user-supplied workdir keeps the sketch artifacts around unless
    /// cleanup was requested.
    #[test]
    fn workdir_persists_without_cleanup() {
        let input1 = fasta_with("AAAAAAAAAA");
        let input2 = fasta_with("AAAAAAAAAA");
        let dist = dist_with("1,1");
        let scratch = tempfile::tempdir().unwrap();
        let workdir = scratch.path().join("run1");

        let mut cmd = kmer_cmd(input1.path(), input2.path(), dist.path(), 4);
        cmd.opts.workdir = Some(workdir.clone());
        estimate::from_distribution(cmd).unwrap();
        assert!(workdir.join("sig1.sig").exists());
        assert!(workdir.join("sig2.sig").exists());

        let mut cmd = kmer_cmd(input1.path(), input2.path(), dist.path(), 4);
        cmd.opts.workdir = Some(workdir.clone());
        cmd.opts.cleanup = true;
        estimate::from_distribution(cmd).unwrap();
        assert!(!workdir.exists());
    }
}
