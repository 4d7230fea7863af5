//! Fake placement-service clients for integration tests.
//!
//! `FakeClient` serves scans from a fixed region table the way the placement
//! service does; `ScriptedClient` replays a queue of canned answers so tests
//! can stage splits in flight.

#![allow(dead_code)]

use async_trait::async_trait;
use regionsplit::{BoxError, RegionEpoch, RegionInfo, SplitClient};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Install a test subscriber once; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Regions tiling the whole key space, split at `splits`.
///
/// Ids start at 1 and the epoch version equals the id.
pub fn tile(splits: &[&[u8]]) -> Vec<RegionInfo> {
    let mut bounds: Vec<Vec<u8>> = Vec::with_capacity(splits.len() + 2);
    bounds.push(Vec::new());
    bounds.extend(splits.iter().map(|key| key.to_vec()));
    bounds.push(Vec::new());

    bounds
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let id = i as u64 + 1;
            RegionInfo::new(id, pair[0].clone(), pair[1].clone()).with_epoch(RegionEpoch::new(1, id))
        })
        .collect()
}

/// Single-byte split keys `a`, `b`, ... for `n` split points.
pub fn letter_splits(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| vec![b'a' + i as u8]).collect()
}

/// Ids of a region list, for compact assertions.
pub fn ids(regions: &[RegionInfo]) -> Vec<u64> {
    regions.iter().map(|region| region.id).collect()
}

/// One recorded `scan_regions` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCall {
    pub start_key: Vec<u8>,
    pub end_key: Vec<u8>,
    pub limit: usize,
}

/// Serves scans from a fixed, consistent region table.
pub struct FakeClient {
    regions: Vec<RegionInfo>,
    calls: Mutex<Vec<ScanCall>>,
}

impl FakeClient {
    pub fn new(regions: Vec<RegionInfo>) -> Self {
        Self {
            regions,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ScanCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SplitClient for FakeClient {
    async fn scan_regions(
        &self,
        _cancel: &CancellationToken,
        start_key: &[u8],
        end_key: &[u8],
        limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError> {
        self.calls.lock().unwrap().push(ScanCall {
            start_key: start_key.to_vec(),
            end_key: end_key.to_vec(),
            limit,
        });

        Ok(self
            .regions
            .iter()
            .filter(|region| region.end_key.is_empty() || region.end_key.as_slice() > start_key)
            .take_while(|region| end_key.is_empty() || region.start_key.as_slice() < end_key)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Replays canned answers, one per call.
///
/// Once the script runs dry the last answer is repeated.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<Vec<RegionInfo>, String>>>,
    last: Mutex<Option<Result<Vec<RegionInfo>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: impl IntoIterator<Item = Result<Vec<RegionInfo>, String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SplitClient for ScriptedClient {
    async fn scan_regions(
        &self,
        _cancel: &CancellationToken,
        _start_key: &[u8],
        _end_key: &[u8],
        _limit: usize,
    ) -> Result<Vec<RegionInfo>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = Some(answer.clone());
                answer
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("script is empty".to_string())),
        };

        answer.map_err(|message| anyhow::anyhow!(message).into())
    }
}
