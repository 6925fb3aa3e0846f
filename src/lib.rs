//! Estimate a pairwise per-base mutation rate from k-mer statistics:
//! a multiplicity histogram, a scaled-sketch intersection, and the root
//! of the histogram polynomial.

#[macro_use]
pub mod rdbg;
pub mod counter;
pub mod estimate;
pub mod histogram;
pub mod intersect;
pub mod kmer;
pub mod rate;
pub mod sketch;
pub mod solve;
