//! Resolve a user request into raw blob payloads.
//!
//! A request is either pasted blob data, a blob versioned hash, or a transaction hash together
//! with the blobs to pick from it. Everything needed to serve the request travels in
//! [`BlobRequest`]; nothing is cached between requests.

use alloy_primitives::B256;
use serde::Serialize;
use std::{fmt, future::Future};
use tracing::{info, instrument};

pub mod explorer;

pub use explorer::{ExplorerClient, ExplorerConfig};

/// Errors from resolving blob data.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// http transport error
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// explorer answered with a non success status
    #[error("explorer returned status {status} for {url}")]
    Status {
        /// http status code
        status: u16,
        /// requested url, api key stripped
        url: String,
    },
    /// explorer answered with an error message
    #[error("explorer api error: {0}")]
    Api(String),
    /// response body did not have the expected shape
    #[error("invalid explorer response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    /// explorer url could not be built
    #[error("invalid explorer url: {0}")]
    Url(#[from] url::ParseError),
    /// transaction is unknown to the explorer
    #[error("transaction {0} not found")]
    TransactionNotFound(B256),
    /// transaction carries no blobs
    #[error("no blob hashes found in transaction {0}")]
    NoBlobHashes(B256),
    /// selected blob does not exist in the transaction
    #[error("blob index {index} out of range, transaction {tx_hash} has {count} blobs")]
    BlobIndexOutOfRange {
        /// transaction hash
        tx_hash: B256,
        /// requested index
        index: usize,
        /// number of blobs in the transaction
        count: usize,
    },
    /// explorer has no data for the blob
    #[error("blob data not found for {0}")]
    BlobDataNotFound(B256),
}

/// Which blobs of a transaction to analyze.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BlobSelection {
    /// Every blob of the transaction.
    #[default]
    All,
    /// The blob at the given position in `blobVersionedHashes`.
    Index(usize),
}

impl BlobSelection {
    /// Pick the selected hashes out of `hashes`, keeping their position.
    pub fn select(self, tx_hash: B256, hashes: &[B256]) -> Result<Vec<(usize, B256)>, Error> {
        match self {
            Self::All => Ok(hashes.iter().copied().enumerate().collect()),
            Self::Index(index) => hashes
                .get(index)
                .map(|hash| vec![(index, *hash)])
                .ok_or(Error::BlobIndexOutOfRange { tx_hash, index, count: hashes.len() }),
        }
    }
}

/// A request for blob data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRequest {
    /// Blob data supplied directly.
    Data(String),
    /// Blob versioned hash to fetch the data for.
    BlobHash(B256),
    /// Transaction carrying the blobs.
    Transaction {
        /// transaction hash
        tx_hash: B256,
        /// blobs to fetch
        selection: BlobSelection,
    },
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BlobOrigin {
    /// Supplied directly by the user.
    Pasted,
    /// Fetched by versioned hash.
    BlobHash {
        /// blob versioned hash
        versioned_hash: B256,
    },
    /// Fetched through a transaction.
    Transaction {
        /// transaction hash
        tx_hash: B256,
        /// position of the blob in the transaction
        index: usize,
        /// blob versioned hash
        versioned_hash: B256,
    },
}

impl fmt::Display for BlobOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pasted => write!(f, "pasted blob data"),
            Self::BlobHash { versioned_hash } => write!(f, "blob {versioned_hash}"),
            Self::Transaction { tx_hash, index, versioned_hash } => {
                write!(f, "blob #{index} {versioned_hash} of transaction {tx_hash}")
            }
        }
    }
}

/// Blob payload as a hex string, with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlob {
    /// Where the data came from.
    pub origin: BlobOrigin,
    /// Hex encoded payload, `0x` prefixed.
    pub data: String,
}

/// Payloads of a request, with the transaction's hash list when the request named a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// `blobVersionedHashes` of the transaction, in order, whatever the selection.
    pub blob_versioned_hashes: Option<Vec<B256>>,
    /// Selected payloads.
    pub blobs: Vec<ResolvedBlob>,
}

/// Lookups a block explorer has to serve.
pub trait BlobExplorer {
    /// The `blobVersionedHashes` of a transaction, in order.
    fn blob_versioned_hashes(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Vec<B256>, Error>> + Send;

    /// The hex encoded payload of a blob.
    fn blob_data(&self, versioned_hash: B256) -> impl Future<Output = Result<String, Error>> + Send;
}

/// Resolve `request` into blob payloads, fetching through `explorer` as needed.
///
/// Blobs of a transaction are fetched one after the other, in transaction order. The first
/// failure aborts the whole request.
#[instrument(skip_all)]
pub async fn resolve<E: BlobExplorer>(
    explorer: &E,
    request: BlobRequest,
) -> Result<Resolution, Error> {
    match request {
        BlobRequest::Data(data) => Ok(Resolution {
            blob_versioned_hashes: None,
            blobs: vec![ResolvedBlob { origin: BlobOrigin::Pasted, data }],
        }),
        BlobRequest::BlobHash(versioned_hash) => {
            let data = explorer.blob_data(versioned_hash).await?;
            Ok(Resolution {
                blob_versioned_hashes: None,
                blobs: vec![ResolvedBlob { origin: BlobOrigin::BlobHash { versioned_hash }, data }],
            })
        }
        BlobRequest::Transaction { tx_hash, selection } => {
            let hashes = explorer.blob_versioned_hashes(tx_hash).await?;
            if hashes.is_empty() {
                return Err(Error::NoBlobHashes(tx_hash));
            }
            info!(%tx_hash, count = hashes.len(), ?hashes, "blob versioned hashes found");

            let mut blobs = Vec::new();
            for (index, versioned_hash) in selection.select(tx_hash, &hashes)? {
                let data = explorer.blob_data(versioned_hash).await?;
                blobs.push(ResolvedBlob {
                    origin: BlobOrigin::Transaction { tx_hash, index, versioned_hash },
                    data,
                });
            }

            Ok(Resolution { blob_versioned_hashes: Some(hashes), blobs })
        }
    }
}
