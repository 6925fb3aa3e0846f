use ahash::AHashMap;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// K-mer multiplicity histogram: multiplicity -> number of distinct k-mers
/// occurring exactly that often. The sum of all frequencies is the distinct
/// k-mer count L0. Built once per run, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    freq: AHashMap<u64, u64>,
    distinct: u64,
}

impl Histogram {
    /// Add a whole `(multiplicity, frequency)` bucket, as read from a
    /// summary row or a distribution file.
    pub fn observe_bucket(&mut self, multiplicity: u64, frequency: u64) {
        dbg_assert!(multiplicity > 0);
        *self.freq.entry(multiplicity).or_insert(0) += frequency;
        self.distinct += frequency;
    }

    /// Add a single k-mer with the given multiplicity (raw-dump path).
    pub fn observe_kmer(&mut self, multiplicity: u64) {
        self.observe_bucket(multiplicity, 1);
    }

    /// Distinct k-mer count L0.
    pub fn distinct_kmers(&self) -> u64 {
        self.distinct
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.freq.iter().map(|(&m, &n)| (m, n))
    }
}

/// Anything that can produce a multiplicity histogram. The counter module
/// picks between the two KMC-backed sources; `kmer` mode supplies a
/// distribution file directly.
pub trait HistogramSource {
    fn histogram(&self) -> Result<Histogram>;
}

/// Compact `(multiplicity, frequency)` summary as written by
/// `kmc_tools transform <db> histogram`. Preferred source: its size is
/// bounded by the highest multiplicity, not by the number of k-mers.
pub struct CompactSummary {
    path: PathBuf,
}

impl CompactSummary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CompactSummary { path: path.into() }
    }
}

impl HistogramSource for CompactSummary {
    fn histogram(&self) -> Result<Histogram> {
        let reader = open_text(&self.path)?;
        let mut hist = Histogram::default();
        for line in reader.lines() {
            // best effort: the header row and anything malformed is skipped
            if let Some((multiplicity, frequency)) = parse_pair(&line?) {
                hist.observe_bucket(multiplicity, frequency);
            }
        }
        Ok(hist)
    }
}

/// Raw per k-mer dump as written by `kmc_dump`: one line per distinct
/// k-mer, multiplicity in the second column. Fallback source, O(distinct
/// k-mers) in time and memory.
pub struct RawDump {
    path: PathBuf,
}

impl RawDump {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RawDump { path: path.into() }
    }
}

impl HistogramSource for RawDump {
    fn histogram(&self) -> Result<Histogram> {
        let reader = open_text(&self.path)?;
        let mut hist = Histogram::default();
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            if let (Some(_kmer), Some(count), None) = (tokens.next(), tokens.next(), tokens.next())
            {
                match count.parse::<u64>() {
                    Ok(multiplicity) if multiplicity > 0 => hist.observe_kmer(multiplicity),
                    _ => continue,
                }
            }
        }
        Ok(hist)
    }
}

/// Precomputed `(multiplicity, frequency)` CSV distribution, required in
/// `kmer` mode. Same accumulation rule as the compact summary.
pub struct DistributionFile {
    path: PathBuf,
}

impl DistributionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DistributionFile { path: path.into() }
    }
}

impl HistogramSource for DistributionFile {
    fn histogram(&self) -> Result<Histogram> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("could not open {}", self.path.display()))?;
        let mut hist = Histogram::default();
        for record in rdr.records() {
            let record = record?;
            if record.len() != 2 {
                continue;
            }
            match (
                record[0].trim().parse::<u64>(),
                record[1].trim().parse::<u64>(),
            ) {
                (Ok(multiplicity), Ok(frequency)) if multiplicity > 0 => {
                    hist.observe_bucket(multiplicity, frequency)
                }
                _ => continue,
            }
        }
        Ok(hist)
    }
}

fn open_text(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("could not open {}", path.display()))
}

fn parse_pair(line: &str) -> Option<(u64, u64)> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(m), Some(n), None) => match (m.parse(), n.parse()) {
            (Ok(multiplicity), Ok(frequency)) if multiplicity > 0 => {
                Some((multiplicity, frequency))
            }
            _ => None,
        },
        _ => None,
    }
}
