//! Error types for region scanning
//!
//! Every failure carries structured context (the requested range, the cursor,
//! the offending region ids and epochs) rather than a pre-rendered message, so
//! the backoff policy can classify errors by [`ErrorKind`] and callers can
//! inspect the exact violation.

use crate::redact;
use crate::region::{KeyRange, RegionEpoch};
use std::fmt;
use thiserror::Error;

/// Boxed error returned by a [`SplitClient`](crate::SplitClient).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for region scanning.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for region scanning.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested range has `start > end` with a bounded end.
    ///
    /// Detected before any query and never retried.
    #[error(
        "invalid range: startKey > endKey, startKey: {}, endKey: {}",
        .range.start_hex(),
        .range.end_hex()
    )]
    InvalidRange {
        /// The rejected range.
        range: KeyRange,
    },

    /// The placement service query itself failed.
    #[error("scan regions from start-key: {}, range: {range}, err: {source}", redact::key(.cursor))]
    RegionScanFailure {
        /// The range the scan was asked to cover.
        range: KeyRange,
        /// The start key of the failed page.
        cursor: Vec<u8>,
        /// Error returned by the client.
        #[source]
        source: BoxError,
    },

    /// The scanned regions do not form a consistent view of the range.
    #[error("region scan inconsistent over {range}: {violation}")]
    RegionScanInconsistency {
        /// The range the scan was asked to cover.
        range: KeyRange,
        /// The first violated invariant.
        violation: Inconsistency,
    },

    /// Invalid scan configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`], used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input range.
    InvalidRange,
    /// A region scan failed or returned an inconsistent view; the placement
    /// service is expected to converge.
    ScanRegion,
    /// Invalid configuration.
    Config,
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::RegionScanFailure { .. } | Error::RegionScanInconsistency { .. } => {
                ErrorKind::ScanRegion
            }
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the wait-region-online policy retries this error.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ScanRegion
    }

    /// The violated invariant, for inconsistency errors.
    pub fn inconsistency(&self) -> Option<&Inconsistency> {
        match self {
            Error::RegionScanInconsistency { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// The requested range this error refers to, if any.
    pub fn range(&self) -> Option<&KeyRange> {
        match self {
            Error::InvalidRange { range }
            | Error::RegionScanFailure { range, .. }
            | Error::RegionScanInconsistency { range, .. } => Some(range),
            Error::Config(_) => None,
        }
    }
}

/// The specific invariant a scanned region list violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// No region was returned.
    EmptyResult,

    /// The first region starts after the requested start key.
    StartKeyOverrun {
        /// First region id.
        region_id: u64,
        /// First region start key.
        region_start: Vec<u8>,
        /// First region epoch.
        epoch: RegionEpoch,
    },

    /// The last region ends before the requested end key.
    EndKeyUnderrun {
        /// Last region id.
        region_id: u64,
        /// Last region end key.
        region_end: Vec<u8>,
        /// Last region epoch.
        epoch: RegionEpoch,
    },

    /// Two adjacent regions do not share a boundary.
    Gap {
        /// Id of the earlier region.
        left_id: u64,
        /// Id of the later region.
        right_id: u64,
        /// End key of the earlier region.
        left_end: Vec<u8>,
        /// Start key of the later region.
        right_start: Vec<u8>,
        /// Epoch of the earlier region.
        left_epoch: RegionEpoch,
        /// Epoch of the later region.
        right_epoch: RegionEpoch,
    },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::EmptyResult => write!(f, "scan region return empty result"),
            Inconsistency::StartKeyOverrun {
                region_id,
                region_start,
                epoch,
            } => write!(
                f,
                "first region {}'s startKey({}) > startKey, region epoch: {}",
                region_id,
                redact::key(region_start),
                epoch
            ),
            Inconsistency::EndKeyUnderrun {
                region_id,
                region_end,
                epoch,
            } => write!(
                f,
                "last region {}'s endKey({}) < endKey, region epoch: {}",
                region_id,
                redact::key(region_end),
                epoch
            ),
            Inconsistency::Gap {
                left_id,
                right_id,
                left_end,
                right_start,
                left_epoch,
                right_epoch,
            } => write!(
                f,
                "region {}'s endKey not equal to next region {}'s startKey, endKey: {}, startKey: {}, region epoch: {} {}",
                left_id,
                right_id,
                redact::key(left_end),
                redact::key(right_start),
                left_epoch,
                right_epoch
            ),
        }
    }
}
