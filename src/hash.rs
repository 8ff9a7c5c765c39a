//! LXRHash: the lookup-table hash used for the proof-of-work difficulty.
//!
//! The hash context is built once, is immutable afterwards, and is shared by
//! reference count between every grader that needs it. Building the 30-bit
//! table takes a while, so it can be cached on disk (`HashConfig::table_path`)
//! in the same raw layout the network's miners write.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::HashConfig;
use crate::error::{GraderError, Result};

/// A keyed hash over arbitrary bytes.
pub trait PowHasher: Send + Sync + fmt::Debug {
    fn hash(&self, input: &[u8]) -> Vec<u8>;
}

pub type SharedHasher = Arc<dyn PowHasher>;

const FIRST_RAND: u64 = 2458719153079158768;
const FIRST_B: u64 = 4631534797403582785;
const FIRST_V: u64 = 3523455478921636871;

/// Seeded byte-map hash. A table of `2^map_size_bits` shuffled bytes drives
/// a serial state walk over the input.
pub struct LxrHasher {
    seed: u64,
    map_mask: u64,
    hash_size: usize,
    passes: u32,
    byte_map: Vec<u8>,
}

/// Rolling state of one hash computation.
struct Walk {
    acc: u64,
    s1: u64,
    s2: u64,
    s3: u64,
    hs: Vec<u64>,
}

impl LxrHasher {
    pub fn new(config: &HashConfig) -> Result<Self> {
        config.validate()?;
        let byte_map = match &config.table_path {
            Some(path) => load_or_generate(path, config)?,
            None => {
                log::debug!(
                    "Building hash table: 2^{} bytes, {} passes",
                    config.map_size_bits,
                    config.passes
                );
                generate_table(config.seed, config.map_size_bits, config.passes)
            }
        };
        Ok(Self {
            seed: config.seed,
            map_mask: (byte_map.len() - 1) as u64,
            hash_size: config.hash_size,
            passes: config.passes,
            byte_map,
        })
    }

    pub fn shared(config: &HashConfig) -> Result<SharedHasher> {
        Ok(Arc::new(Self::new(config)?))
    }

    pub fn table_len(&self) -> usize {
        self.byte_map.len()
    }

    fn lookup(&self, v: u64) -> u64 {
        u64::from(self.byte_map[(v & self.map_mask) as usize])
    }

    fn fast_step(&self, w: &mut Walk, v2: u64, idx: usize) {
        let b = self.lookup(w.acc ^ v2);
        w.acc = (w.acc << 7) ^ (w.acc >> 5) ^ (v2 << 20) ^ (v2 << 16) ^ v2 ^ (b << 20) ^ (b << 12) ^ (b << 4);
        w.s1 = (w.s1 << 9) ^ (w.s1 >> 3) ^ w.hs[idx];
        w.hs[idx] = w.s1 ^ w.acc;
        (w.s1, w.s2, w.s3) = (w.s3, w.s1, w.s2);
    }

    fn step(&self, w: &mut Walk, v2: u64, idx: usize) {
        let mut s1 = w.s1;
        let mut acc = w.acc;
        s1 = (s1 << 9) ^ (s1 >> 1) ^ acc ^ (self.lookup((acc >> 5) ^ v2) << 3);
        s1 = (s1 << 5) ^ (s1 >> 3) ^ (self.lookup(s1 ^ v2) << 7);
        s1 = (s1 << 7) ^ (s1 >> 7) ^ (self.lookup(acc ^ (s1 >> 7)) << 5);
        s1 = (s1 << 11) ^ (s1 >> 11) ^ (self.lookup(v2 ^ (acc >> 11) ^ s1) << 27);

        w.hs[idx] = s1 ^ acc ^ (w.hs[idx] << 7) ^ (w.hs[idx] >> 13);

        acc = (acc << 17) ^ (acc >> 5) ^ s1 ^ (self.lookup(acc ^ (s1 >> 27) ^ v2) << 3);
        acc = (acc << 13) ^ (acc >> 3) ^ w.hs[idx];
        acc = (acc << 15) ^ (acc >> 7) ^ (self.lookup((acc >> 7) ^ s1) << 11);
        acc = (acc << 9) ^ (acc >> 11) ^ (self.lookup(v2 ^ acc ^ s1) << 3);

        s1 = (s1 << 7) ^ (s1 >> 27) ^ acc ^ (self.lookup(acc >> 3) << 13);
        let s3 = (w.s3 << 3) ^ (w.s3 >> 5) ^ w.s2 ^ (self.lookup(s1 ^ v2) << 19);

        w.acc = acc;
        (w.s1, w.s2, w.s3) = (s3, s1, w.s2);
    }
}

impl fmt::Debug for LxrHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LxrHasher")
            .field("seed", &format_args!("{:#018x}", self.seed))
            .field("table_len", &self.byte_map.len())
            .field("hash_size", &self.hash_size)
            .field("passes", &self.passes)
            .finish()
    }
}

impl PowHasher for LxrHasher {
    fn hash(&self, input: &[u8]) -> Vec<u8> {
        let mut w = Walk {
            acc: self.seed,
            s1: 0,
            s2: 0,
            s3: 0,
            hs: vec![0; self.hash_size],
        };

        // A fast spin first, then the full walk.
        for (i, &byte) in input.iter().enumerate() {
            self.fast_step(&mut w, u64::from(byte), i % self.hash_size);
        }
        for (i, &byte) in input.iter().enumerate() {
            self.step(&mut w, u64::from(byte), i % self.hash_size);
        }

        // Reduce each lane to one byte, last lane first.
        let mut out = vec![0u8; self.hash_size];
        for i in (0..self.hash_size).rev() {
            let lane = w.hs[i];
            self.fast_step(&mut w, lane, i);
            out[i] = (self.lookup(w.acc) ^ self.lookup(w.hs[i])) as u8;
        }
        out
    }
}

/// Fill the table with 0..=255 repeated, then swap every slot with a
/// pseudo-random one, `passes` times over.
fn generate_table(seed: u64, map_size_bits: u32, passes: u32) -> Vec<u8> {
    let size = 1usize << map_size_bits;
    let mask = (size - 1) as u64;
    let mut map: Vec<u8> = (0..size).map(|i| i as u8).collect();

    let mut offset = seed ^ FIRST_RAND;
    let mut b = seed ^ FIRST_B;
    let mut v = FIRST_V;
    for pass in 0..passes {
        log::debug!("Hash table pass {}", pass);
        for i in 0..size {
            offset = (offset << 9) ^ (offset >> 1) ^ (offset >> 7) ^ b;
            v = u64::from(map[((offset ^ b) & mask) as usize]) ^ (v << 8) ^ (v >> 1);
            b = (v << 7) ^ (v << 13) ^ (v << 33) ^ (v << 52) ^ (b << 9) ^ (b >> 1);
            map.swap(i, (offset & mask) as usize);
        }
    }
    map
}

/// Read a cached table, or generate it and write the cache.
fn load_or_generate(path: &Path, config: &HashConfig) -> Result<Vec<u8>> {
    let expected = 1usize << config.map_size_bits;
    if path.exists() {
        log::info!("Loading hash table from {}", path.display());
        let table = std::fs::read(path)?;
        if table.len() != expected {
            return Err(GraderError::InvalidConfig(format!(
                "hash table {} holds {} bytes, expected {}",
                path.display(),
                table.len(),
                expected
            )));
        }
        return Ok(table);
    }

    log::info!(
        "Generating hash table (2^{} bytes) into {}",
        config.map_size_bits,
        path.display()
    );
    let table = generate_table(config.seed, config.map_size_bits, config.passes);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, &table)?;
    Ok(table)
}
