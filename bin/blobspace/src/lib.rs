//! Blob wasted space checker.
//!
//! Measures how much of an eip4844 blob is zero filled. Blob data can be passed in directly, or
//! fetched by blob versioned hash or by the hash of the transaction that carries it.

pub mod analysis;
pub mod cli;
pub mod render;

/// Explanation of the measurement, printed by `blobspace about`.
pub const ABOUT: &str = "\
Blob Wasted Space Checker

Counts the zeros present in blob data and compares them to the total number of hex digits. The
share of zeros is the wasted space: capacity of the 128KB blob that carries no meaningful data.

Blob data can be given in three ways:
  data       hex blob data, e.g. copied from the blobs section of a transaction page
  blob-hash  a blob versioned hash, the data is fetched from a blob explorer
  tx-hash    the hash of the transaction carrying the blobs; its blob versioned hashes are
             looked up and each blob (or the one picked with --index) is analyzed

Metrics:
  Blob Length(bytes)  number of hex digits / 2
  Zero Bytes          number of zero digits / 2
  Used Percentage     non-zero digits / all digits * 100
  Wasted Percentage   zero digits / all digits * 100

By default digits are counted over the whole string with 2 subtracted for the 0x prefix, which
also takes the prefix zero out of the non-zero count. Pass --corrected to strip the prefix before
counting.";
