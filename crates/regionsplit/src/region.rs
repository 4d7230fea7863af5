//! Region descriptors and requested key ranges.

use crate::error::{Error, Result};
use crate::redact;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version information of a region, used only in diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionEpoch {
    /// Bumped on membership changes.
    pub conf_ver: u64,
    /// Bumped on splits and merges.
    pub version: u64,
}

impl RegionEpoch {
    /// Create an epoch.
    pub fn new(conf_ver: u64, version: u64) -> Self {
        Self { conf_ver, version }
    }
}

impl fmt::Display for RegionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conf_ver:{} version:{}", self.conf_ver, self.version)
    }
}

/// A region as reported by the placement service.
///
/// `start_key` is inclusive, `end_key` exclusive; an empty `end_key` means the
/// region extends to the end of the key space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Region identifier.
    pub id: u64,

    /// Inclusive lower bound.
    #[serde(with = "hex_bytes")]
    pub start_key: Vec<u8>,

    /// Exclusive upper bound, empty for unbounded.
    #[serde(with = "hex_bytes")]
    pub end_key: Vec<u8>,

    /// Region epoch at the time of the scan.
    #[serde(default)]
    pub epoch: RegionEpoch,
}

impl RegionInfo {
    /// Create a region descriptor with a default epoch.
    pub fn new(id: u64, start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            start_key: start_key.into(),
            end_key: end_key.into(),
            epoch: RegionEpoch::default(),
        }
    }

    /// Set the epoch.
    pub fn with_epoch(mut self, epoch: RegionEpoch) -> Self {
        self.epoch = epoch;
        self
    }
}

/// A requested half-open key range `[start, end)`. An empty `end` is
/// unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub start: Vec<u8>,
    /// Exclusive upper bound, empty for unbounded.
    pub end: Vec<u8>,
}

impl KeyRange {
    /// Create a range without validating it.
    pub fn new(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether the upper bound is open.
    pub fn is_unbounded(&self) -> bool {
        self.end.is_empty()
    }

    /// Whether `key` has reached or passed the upper bound.
    pub fn is_past_end(&self, key: &[u8]) -> bool {
        !self.is_unbounded() && key >= self.end.as_slice()
    }

    /// The start key as plain lower-case hex, ignoring log redaction.
    pub fn start_hex(&self) -> String {
        hex::encode(&self.start)
    }

    /// The end key as plain lower-case hex, ignoring log redaction.
    pub fn end_hex(&self) -> String {
        hex::encode(&self.end)
    }

    /// Reject ranges whose start is after a bounded end.
    pub fn validate(&self) -> Result<()> {
        if !self.is_unbounded() && self.start > self.end {
            return Err(Error::InvalidRange {
                range: self.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            redact::key(&self.start),
            redact::key(&self.end)
        )
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
