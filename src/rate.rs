/// Convert the per-window survival probability q into a per-base mutation
/// rate: r = 1 - (1 - q)^(1/k). Inverse of "no mutation anywhere in a
/// k-length window".
pub fn mutation_rate(q: f64, kmerlen: u32) -> f64 {
    dbg_assert!(kmerlen >= 1);
    1.0 - (1.0 - q).powf(1.0 / f64::from(kmerlen))
}
