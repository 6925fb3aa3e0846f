use std::cmp;

/// A rolling two-bit k-mer that tracks both strands, so the canonical
/// form is strand neutral. k is limited to 32 (two bits per base in a u64).
#[derive(Copy, Clone, Debug)]
pub struct Kmer {
    dna: u64,
    rc: u64,
    topb2: u32,
}

impl Kmer {
    pub fn new(kmerlen: u32) -> Self {
        dbg_assert!(kmerlen >= 1 && kmerlen <= 32);
        Kmer {
            dna: 0,
            rc: 0,
            topb2: kmerlen * 2 - 2,
        }
    }

    /// adds twobit to kmer sequences, to dna in the top two bits.
    pub fn add(&mut self, b2: u8) {
        dbg_assert!(b2 <= 3);
        let topless = (1u64 << self.topb2) - 1;
        self.dna = (self.dna >> 2) | (u64::from(b2) << self.topb2);
        self.rc = ((self.rc & topless) << 2) ^ 2 ^ u64::from(b2);
    }

    /// the same index for either strand orientation.
    pub fn canonical(&self) -> u64 {
        cmp::min(self.dna, self.rc)
    }
}

/// Two-bit encoding with A/T and C/G as complement pairs (xor 2).
/// Returns None for ambiguous bases, which break the current window.
pub fn twobit(base: u8) -> Option<u8> {
    match base | 0x20 {
        b'a' => Some(0),
        b'c' => Some(1),
        b't' => Some(2),
        b'g' => Some(3),
        _ => None,
    }
}
