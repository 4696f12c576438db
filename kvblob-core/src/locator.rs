//! Linear-scan lookup of blobs by value
//!
//! There is no value-to-key index: a lookup scans one window of keys under
//! the blob prefix and fetches each value in turn. The cost is O(n) storage
//! calls bounded by the scan limit, and a blob outside the window can never
//! be matched.

use crate::error::{KvBlobError, Result};
use crate::keyspace::BlobKeyspace;
use crate::kv::RawKvClient;
use bytes::Bytes;

/// Keys of the current scan window, in scan order
pub async fn scan_keys(client: &dyn RawKvClient, keyspace: &BlobKeyspace) -> Result<Vec<Bytes>> {
    let pairs = client
        .scan(
            keyspace.start_key(),
            keyspace.end_key(),
            keyspace.scan_limit(),
        )
        .await
        .map_err(|error| KvBlobError::upstream("Failed to retrieve blobs", error))?;

    Ok(pairs.into_iter().map(|pair| pair.key).collect())
}

/// Fetch the value behind a scanned key.
///
/// A key that disappears between the scan and the fetch (a concurrent
/// delete) is reported as a storage error.
pub async fn fetch_value(client: &dyn RawKvClient, key: &[u8]) -> Result<Bytes> {
    let value = client
        .get(key)
        .await
        .map_err(|error| KvBlobError::upstream("Failed to retrieve blob", error))?;

    value.ok_or_else(|| {
        KvBlobError::upstream(
            "Failed to retrieve blob",
            KvBlobError::NotFound(format!(
                "key {} vanished after scan",
                String::from_utf8_lossy(key)
            )),
        )
    })
}

/// Fetch every value in the scan window, in scan order
pub async fn fetch_all(client: &dyn RawKvClient, keyspace: &BlobKeyspace) -> Result<Vec<Bytes>> {
    let keys = scan_keys(client, keyspace).await?;

    let mut values = Vec::with_capacity(keys.len());
    for key in &keys {
        values.push(fetch_value(client, key).await?);
    }

    Ok(values)
}

/// Find the first key in scan order whose value equals `target` byte for byte
pub async fn find_key_by_value(
    client: &dyn RawKvClient,
    keyspace: &BlobKeyspace,
    target: &[u8],
) -> Result<Option<Bytes>> {
    let keys = scan_keys(client, keyspace).await?;

    for key in keys {
        let value = fetch_value(client, &key).await?;
        if value.as_ref() == target {
            return Ok(Some(key));
        }
    }

    Ok(None)
}
