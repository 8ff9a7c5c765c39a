//! Grading core for a decentralized price-oracle network.
//!
//! Miners submit price records for a block height. Every node feeds the same
//! records into a [`BlockGrader`] and must arrive at the same ranked set of
//! winners, so everything below is deterministic and free of shared state.

pub mod address;
pub mod assets;
pub mod config;
pub mod content;
pub mod dedup;
pub mod difficulty;
pub mod error;
pub mod grader;
pub mod hash;
pub mod outcome;
pub mod parser;
pub mod shuffle;
pub mod signature;
pub mod stats;
pub mod submission;
pub mod tournament;
pub mod validation;
pub mod version;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{GraderConfig, HashConfig};
pub use error::{GraderError, Result};
pub use grader::BlockGrader;
pub use hash::{LxrHasher, PowHasher, SharedHasher};
pub use outcome::GradedBlock;
pub use submission::Submission;
pub use validation::empty_context;
pub use version::{Version, VersionPolicy};
