//! Paginated region scan against a simulated placement service
//!
//! The simulated service reports a hole for the first few queries, as if a
//! split were still being applied, then converges.
//!
//! Run with: RUST_LOG=regionsplit=debug cargo run -p regionsplit --example paginate_scan

use async_trait::async_trait;
use regionsplit::{
    BoxError, RegionEpoch, RegionInfo, RegionScanner, ScanConfig, SplitClient, redact,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Regions split at `t0`, `t1`, ... `t9`; the `t4..t5` region is missing
/// until `settle_after` queries have been served.
struct SettlingCluster {
    regions: Vec<RegionInfo>,
    queries: AtomicUsize,
    settle_after: usize,
}

impl SettlingCluster {
    fn new(settle_after: usize) -> Self {
        let mut bounds: Vec<Vec<u8>> = vec![Vec::new()];
        bounds.extend((0..10u8).map(|i| vec![b't', b'0' + i]));
        bounds.push(Vec::new());

        let regions = bounds
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                RegionInfo::new(i as u64 + 1, pair[0].clone(), pair[1].clone())
                    .with_epoch(RegionEpoch::new(1, 5))
            })
            .collect();

        Self {
            regions,
            queries: AtomicUsize::new(0),
            settle_after,
        }
    }
}

#[async_trait]
impl SplitClient for SettlingCluster {
    async fn scan_regions(
        &self,
        _cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError> {
        let served = self.queries.fetch_add(1, Ordering::SeqCst);
        let settled = served >= self.settle_after;

        Ok(self
            .regions
            .iter()
            .filter(|region| settled || region.start_key != b"t4")
            .filter(|region| region.end_key.is_empty() || region.end_key.as_slice() > start_key)
            .take_while(|region| end_key.is_empty() || region.start_key.as_slice() < end_key)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regionsplit=info".into()),
        )
        .init();

    let config = ScanConfig::from_env()?.with_pagination_limit(4);
    let scanner = RegionScanner::with_config(SettlingCluster::new(6), config)?;
    let cancel = CancellationToken::new();

    println!("=== Paginated scan of [t1, t8) ===\n");
    let regions = scanner.paginate_scan_region(&cancel, b"t1", b"t8").await?;
    for region in &regions {
        println!(
            "  region {:>2}  [{}, {})  {}",
            region.id,
            redact::key(&region.start_key),
            redact::key(&region.end_key),
            region.epoch
        );
    }

    println!("\n=== Single batch from t6 ===\n");
    let batch = scanner
        .scan_regions_with_retry(&cancel, b"t6", b"", 3)
        .await?;
    println!("  {} regions, first id {}", batch.len(), batch[0].id);

    println!("\nqueries served: {}", scanner.client().queries.load(Ordering::SeqCst));
    Ok(())
}
