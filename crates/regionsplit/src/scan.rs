//! Region scanners that retry until the placement service reports a
//! consistent view of the requested range.
//!
//! Two variants are provided:
//!
//! - [`paginate_scan_region`] walks the whole range page by page and requires
//!   the result to cover it completely.
//! - [`scan_regions_with_retry`] issues one bounded query per attempt and only
//!   requires a well-formed prefix.
//!
//! Both validate the range before any I/O, restart every attempt from the
//! requested start key, and back off through a [`WaitRegionOnlineBackoffer`].
//! The paginated variant additionally refunds one retry whenever the number
//! of regions changes between attempts, since that means the cluster is still
//! splitting and will likely converge.

use crate::backoff::WaitRegionOnlineBackoffer;
use crate::check::{check_part_region_consistency, check_region_consistency};
use crate::client::SplitClient;
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::region::{KeyRange, RegionInfo};
use regionsplit_core::retry::{with_retry, with_retry_inspect};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Scan every region in `[start_key, end_key)`, `limit` regions per query,
/// retrying until the result is a gapless cover of the range.
///
/// Returns [`Error::InvalidRange`] without querying when `start_key > end_key`
/// with a non-empty `end_key`, and [`Error::Config`] when `limit` is zero. On
/// exhaustion or cancellation the last scan error is returned.
pub async fn paginate_scan_region<C>(
    cancel: &CancellationToken,
    client: &C,
    start_key: &[u8],
    end_key: &[u8],
    limit: usize,
    backoffer: &mut WaitRegionOnlineBackoffer,
) -> Result<Vec<RegionInfo>>
where
    C: SplitClient + ?Sized,
{
    let range = KeyRange::new(start_key, end_key);
    range.validate()?;
    check_limit(limit)?;

    // Region count of the last attempt that finished scanning, plus one.
    // Zero means the last attempt failed before counting anything.
    let completed = AtomicUsize::new(0);
    let (range, completed) = (&range, &completed);

    backoffer.forget_region_count();
    with_retry_inspect(
        cancel,
        backoffer,
        move || paginate_attempt(cancel, client, range, limit, completed),
        |bo: &mut WaitRegionOnlineBackoffer, _err: &Error| {
            let counted = completed.swap(0, Ordering::Relaxed);
            if counted > 0 {
                // A changed region count means splits are still landing.
                bo.observe_region_count(counted - 1);
            }
        },
    )
    .await
}

/// Scan up to `limit` regions starting at `start_key` with a single query per
/// attempt, retrying until the result is a gapless prefix of the range.
///
/// The result may stop short of `end_key`; callers consume it batch by batch.
/// Preconditions and error reporting match [`paginate_scan_region`], but no
/// budget is refunded between attempts.
pub async fn scan_regions_with_retry<C>(
    cancel: &CancellationToken,
    client: &C,
    start_key: &[u8],
    end_key: &[u8],
    limit: usize,
    backoffer: &mut WaitRegionOnlineBackoffer,
) -> Result<Vec<RegionInfo>>
where
    C: SplitClient + ?Sized,
{
    let range = KeyRange::new(start_key, end_key);
    range.validate()?;
    check_limit(limit)?;

    let range = &range;
    with_retry(cancel, backoffer, move || batch_attempt(cancel, client, range, limit)).await
}

fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::Config(
            "scan limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

async fn paginate_attempt<C>(
    cancel: &CancellationToken,
    client: &C,
    range: &KeyRange,
    limit: usize,
    completed: &AtomicUsize,
) -> Result<Vec<RegionInfo>>
where
    C: SplitClient + ?Sized,
{
    let regions = scan_all_pages(cancel, client, range, limit).await?;
    completed.store(regions.len() + 1, Ordering::Relaxed);

    if let Err(err) = check_region_consistency(range, &regions) {
        warn!(
            error = %err,
            region_length = regions.len(),
            "failed to scan region, retrying"
        );
        return Err(err);
    }
    Ok(regions)
}

async fn batch_attempt<C>(
    cancel: &CancellationToken,
    client: &C,
    range: &KeyRange,
    limit: usize,
) -> Result<Vec<RegionInfo>>
where
    C: SplitClient + ?Sized,
{
    let regions = client
        .scan_regions(cancel, &range.start, &range.end, limit)
        .await
        .map_err(|source| Error::RegionScanFailure {
            range: range.clone(),
            cursor: range.start.clone(),
            source,
        })?;

    if let Err(err) = check_part_region_consistency(range, &regions) {
        warn!(
            error = %err,
            region_length = regions.len(),
            "failed to scan region, retrying"
        );
        return Err(err);
    }
    Ok(regions)
}

async fn scan_all_pages<C>(
    cancel: &CancellationToken,
    client: &C,
    range: &KeyRange,
    limit: usize,
) -> Result<Vec<RegionInfo>>
where
    C: SplitClient + ?Sized,
{
    let mut regions = Vec::new();
    let mut cursor = range.start.clone();

    loop {
        let result = client.scan_regions(cancel, &cursor, &range.end, limit).await;
        let page = match result {
            Ok(page) => page,
            Err(source) => {
                return Err(Error::RegionScanFailure {
                    range: range.clone(),
                    cursor,
                    source,
                });
            }
        };
        let page_len = page.len();
        regions.extend(page);

        if page_len < limit {
            break;
        }
        let next = match regions.last() {
            Some(last) => last.end_key.clone(),
            None => break,
        };
        if next.is_empty() || range.is_past_end(&next) {
            break;
        }
        // A full page that does not move the cursor forward is stale; stop
        // paging and let the consistency check reject it.
        if next <= cursor {
            break;
        }
        cursor = next;
    }

    debug!(region_length = regions.len(), range = %range, "scanned region pages");
    Ok(regions)
}

/// Scanner bound to a client and a [`ScanConfig`].
///
/// Each call builds a fresh [`WaitRegionOnlineBackoffer`] from the configured
/// tuning, so concurrent calls never share retry state.
///
/// # Examples
///
/// ```rust,no_run
/// use regionsplit::{RegionScanner, ScanConfig, SplitClient};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(client: impl SplitClient) -> regionsplit::Result<()> {
/// let scanner = RegionScanner::with_config(client, ScanConfig::default().with_pagination_limit(64))?;
/// let cancel = CancellationToken::new();
///
/// let regions = scanner.paginate_scan_region(&cancel, b"t", b"u").await?;
/// println!("{} regions", regions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegionScanner<C> {
    client: C,
    config: ScanConfig,
}

impl<C: SplitClient> RegionScanner<C> {
    /// Create a scanner with the default configuration.
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: ScanConfig::default(),
        }
    }

    /// Create a scanner with a validated configuration.
    pub fn with_config(client: C, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Paginated scan of `[start_key, end_key)` using the configured page
    /// size and budget.
    pub async fn paginate_scan_region(
        &self,
        cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
    ) -> Result<Vec<RegionInfo>> {
        let mut backoffer = WaitRegionOnlineBackoffer::new(self.config.paginate_backoff);
        paginate_scan_region(
            cancel,
            &self.client,
            start_key,
            end_key,
            self.config.pagination_limit,
            &mut backoffer,
        )
        .await
    }

    /// Single-batch scan of up to `limit` regions using the configured
    /// budget.
    pub async fn scan_regions_with_retry(
        &self,
        cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>> {
        let mut backoffer = WaitRegionOnlineBackoffer::new(self.config.batch_backoff);
        scan_regions_with_retry(cancel, &self.client, start_key, end_key, limit, &mut backoffer)
            .await
    }
}
