//! The placement-service capability consumed by the scanners.

use crate::error::BoxError;
use crate::region::RegionInfo;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Region lookup against the placement service.
///
/// This is the only network-facing dependency of the scanners. Implementations
/// are shared read-only between concurrent scans, so they take `&self`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SplitClient: Send + Sync {
    /// Return up to `limit` regions overlapping `[start_key, end_key)` in
    /// ascending start-key order, beginning with the region that contains
    /// `start_key`. An empty `end_key` means unbounded.
    ///
    /// Returning fewer than `limit` regions signals that no further regions
    /// exist in the range. Implementations should abort early when `cancel`
    /// fires.
    async fn scan_regions(
        &self,
        cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError>;
}

#[async_trait]
impl<T: SplitClient + ?Sized> SplitClient for Arc<T> {
    async fn scan_regions(
        &self,
        cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError> {
        (**self).scan_regions(cancel, start_key, end_key, limit).await
    }
}

#[async_trait]
impl<T: SplitClient + ?Sized> SplitClient for &T {
    async fn scan_regions(
        &self,
        cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError> {
        (**self).scan_regions(cancel, start_key, end_key, limit).await
    }
}
