//! Resolve a request and run the calculator over every payload.

use alloy_primitives::B256;
use blobspace_calc::{CalcOptions, WastedSpaceReport};
use blobspace_source::{BlobExplorer, BlobOrigin, BlobRequest};
use eyre::WrapErr;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Report of one blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Where the payload came from.
    pub origin: BlobOrigin,
    /// Wasted space metrics.
    #[serde(flatten)]
    pub report: WastedSpaceReport,
}

/// Reports of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analyses {
    /// `blobVersionedHashes` of the transaction, for transaction requests.
    pub blob_versioned_hashes: Option<Vec<B256>>,
    /// One report per selected blob, in transaction order.
    pub reports: Vec<Analysis>,
}

/// Fetch the payloads of `request` and compute a report for each.
#[instrument(skip_all)]
pub async fn analyze<E: BlobExplorer>(
    explorer: &E,
    request: BlobRequest,
    options: CalcOptions,
) -> eyre::Result<Analyses> {
    let resolution = blobspace_source::resolve(explorer, request).await?;

    let reports = resolution
        .blobs
        .into_iter()
        .map(|blob| -> eyre::Result<Analysis> {
            let report = blobspace_calc::compute_with(&blob.data, options)
                .wrap_err_with(|| format!("analyzing {}", blob.origin))?;

            if report.exceeds_blob_capacity() {
                warn!(
                    origin = %blob.origin,
                    blob_length_bytes = report.blob_length_bytes,
                    "payload is larger than a single blob"
                );
            }
            info!(
                origin = %blob.origin,
                blob_length_bytes = report.blob_length_bytes,
                zero_bytes = report.zero_bytes,
                wasted_percentage = report.wasted_percentage,
                "blob analyzed"
            );

            Ok(Analysis { origin: blob.origin, report })
        })
        .collect::<eyre::Result<_>>()?;

    Ok(Analyses { blob_versioned_hashes: resolution.blob_versioned_hashes, reports })
}
