use crate::kmer::{twobit, Kmer};
use anyhow::{anyhow, ensure, Context, Result};
use bincode::{deserialize_from, serialize_into};
use derive_new::new;
use flate2::read::MultiGzDecoder;
use noodles_fasta as fasta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::hash::BuildHasher;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

/// The seed is fixed so sketches from separate invocations stay comparable.
pub const SKETCH_SEED: u64 = 42;

/// Sketching parameters. Two sketches are comparable only when all three
/// fields match.
#[derive(new, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchParams {
    pub kmerlen: u32,
    /// Reciprocal of the subsampling threshold theta; a hash is kept when
    /// it falls below u64::MAX / scaled.
    pub scaled: u64,
    pub seed: u64,
}

/// A scaled subsample of the canonical k-mer hashes of one input sequence.
/// Written to the scratch directory as a bincode artifact and consumed once
/// by the intersection estimator.
#[derive(Debug, Serialize, Deserialize)]
pub struct Sketch {
    params: SketchParams,
    max_hash: u64,
    hashes: BTreeSet<u64>,
}

impl Sketch {
    pub fn new(params: SketchParams) -> Self {
        dbg_assert!(params.scaled >= 1);
        Sketch {
            params,
            max_hash: u64::MAX / params.scaled,
            hashes: BTreeSet::new(),
        }
    }

    /// Sketch every record of a FASTA file, optionally gzipped.
    pub fn build(path: &Path, params: SketchParams) -> Result<Sketch> {
        let mut reader = open_fasta(path)?;
        let mut sketch = Sketch::new(params);
        for record in reader.records() {
            let record =
                record.with_context(|| format!("error reading {}", path.display()))?;
            sketch.add_sequence(record.sequence().as_ref());
        }
        dbg_print!("{}: {} hashes", path.display(), sketch.len());
        Ok(sketch)
    }

    /// Roll over one sequence; ambiguous bases reset the k-mer window.
    pub fn add_sequence(&mut self, seq: &[u8]) {
        let state = hash_state(self.params.seed);
        let mut kmer = Kmer::new(self.params.kmerlen);
        let mut run = 0;
        for &base in seq {
            match twobit(base) {
                Some(b2) => {
                    kmer.add(b2);
                    run += 1;
                }
                None => {
                    kmer = Kmer::new(self.params.kmerlen);
                    run = 0;
                    continue;
                }
            }
            if run >= self.params.kmerlen {
                let hash = state.hash_one(kmer.canonical());
                if hash <= self.max_hash {
                    self.hashes.insert(hash);
                }
            }
        }
    }

    /// Number of hashes shared with another sketch built at the same
    /// (k, scaled, seed).
    pub fn count_common(&self, other: &Sketch) -> Result<u64> {
        ensure!(
            self.params == other.params,
            "sketches are not comparable: {:?} vs {:?}",
            self.params,
            other.params
        );
        Ok(self.hashes.intersection(&other.hashes).count() as u64)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let out = BufWriter::new(
            File::create(path).with_context(|| format!("could not create {}", path.display()))?,
        );
        serialize_into(out, self).map_err(|e| anyhow!("writing {}: {}", path.display(), e))
    }

    pub fn load(path: &Path) -> Result<Sketch> {
        let file = File::open(path)
            .map(BufReader::new)
            .with_context(|| format!("could not open sketch {}", path.display()))?;
        deserialize_from(file).map_err(|e| anyhow!("reading {}: {}", path.display(), e))
    }
}

fn hash_state(seed: u64) -> ahash::RandomState {
    ahash::RandomState::with_seeds(
        seed ^ 0x243f_6a88_85a3_08d3,
        seed ^ 0x1319_8a2e_0370_7344,
        seed ^ 0xa409_3822_299f_31d0,
        seed ^ 0x082e_fa98_ec4e_6c89,
    )
}

pub fn open_fasta(path: &Path) -> Result<fasta::Reader<Box<dyn BufRead>>> {
    let file =
        File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let inner: Box<dyn BufRead> = if path.extension().map_or(false, |ext| ext == "gz") {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(fasta::Reader::new(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn params(k: u32) -> SketchParams {
        SketchParams::new(k, 1, SKETCH_SEED)
    }

    fn sketch_of(seq: &[u8], k: u32) -> Sketch {
        let mut sketch = Sketch::new(params(k));
        sketch.add_sequence(seq);
        sketch
    }

    #[test]
    fn canonical_windows_collapse() {
        // ACG/CGT and GTA/TAC are reverse complement pairs.
        let sketch = sketch_of(b"ACGTACGT", 3);
        assert_eq!(sketch.len(), 2);
    }

    #[test]
    fn ambiguous_bases_break_the_window() {
        let sketch = sketch_of(b"ACGNACG", 3);
        assert_eq!(sketch.len(), 1);
    }

    #[test]
    fn identical_input_shares_all_hashes() {
        let a = sketch_of(b"ACGTACGTAGGC", 4);
        let b = sketch_of(b"ACGTACGTAGGC", 4);
        assert_eq!(a.count_common(&b).unwrap(), a.len() as u64);
    }

    #[test]
    fn disjoint_input_shares_nothing() {
        let a = sketch_of(b"AAAAAAAA", 4);
        let b = sketch_of(b"CCCCCCCC", 4);
        assert_eq!(a.count_common(&b).unwrap(), 0);
    }

    #[test]
    fn mismatched_params_are_rejected() {
        let a = sketch_of(b"ACGTACGT", 3);
        let mut b = Sketch::new(SketchParams::new(3, 1, 7));
        b.add_sequence(b"ACGTACGT");
        assert!(a.count_common(&b).is_err());
    }

    #[test]
    fn artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig1.sig");
        let sketch = sketch_of(b"ACGTACGTAGGC", 4);
        sketch.write(&path).unwrap();
        let loaded = Sketch::load(&path).unwrap();
        assert_eq!(loaded.len(), sketch.len());
        assert_eq!(loaded.count_common(&sketch).unwrap(), sketch.len() as u64);
    }

    #[test]
    fn build_reads_fasta_records() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(temp_file, ">seq1\nACGTACGT\n>seq2\nAAAATTTT").unwrap();
        let file_path = PathBuf::from(temp_file.path());

        let sketch = Sketch::build(&file_path, params(3)).unwrap();
        let mut expected = Sketch::new(params(3));
        expected.add_sequence(b"ACGTACGT");
        expected.add_sequence(b"AAAATTTT");
        assert_eq!(sketch.len(), expected.len());
    }
}
