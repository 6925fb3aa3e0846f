use anyhow::Result;
use clap::{Parser, Subcommand};
use mutrate::estimate::{self, KmerCmd, PairCmd};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate from two raw sequence files; the histogram is counted
    /// from the first input
    Sequence(PairCmd),

    /// Estimate from a sequence mixture; composed the same way as
    /// `sequence`
    Mixture(PairCmd),

    /// Estimate with a precomputed k-mer multiplicity distribution
    Kmer(KmerCmd),
}

/// Estimate the pairwise per-base mutation rate between two sequences
/// from k-mer statistics
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Mutrate {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let mutrate = Mutrate::parse();

    let rate = match mutrate.command {
        Commands::Sequence(cmd) => estimate::from_sequences(cmd)?,
        Commands::Mixture(cmd) => estimate::from_sequences(cmd)?,
        Commands::Kmer(cmd) => estimate::from_distribution(cmd)?,
    };
    println!("{rate}");
    Ok(())
}
