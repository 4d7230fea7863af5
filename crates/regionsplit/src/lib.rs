#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Consistent region scanning for restore into a range-partitioned key-value
//! store.
//!
//! Before ingesting data, a restore tool needs an exact picture of the region
//! boundaries over each key range it writes to. The placement service answers
//! region scans from whatever it knows at that instant, and while splits are
//! in flight that answer can be empty, truncated or full of holes. This crate
//! scans until the answer is consistent:
//!
//! - **[`paginate_scan_region`]** pages through the whole range and requires a
//!   gapless cover of it
//! - **[`scan_regions_with_retry`]** takes one bounded batch per attempt and
//!   requires a gapless prefix
//! - **[`WaitRegionOnlineBackoffer`]** backs off on scan errors and refunds
//!   budget while the region count keeps changing
//! - **[`RegionScanner`]** bundles a client with a [`ScanConfig`]
//!
//! The placement service is abstracted behind [`SplitClient`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use regionsplit::{SplitClient, WaitRegionOnlineBackoffer, paginate_scan_region};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(client: impl SplitClient) -> regionsplit::Result<()> {
//! let cancel = CancellationToken::new();
//! let mut backoffer = WaitRegionOnlineBackoffer::default();
//!
//! let regions = paginate_scan_region(&cancel, &client, b"t\x80", b"t\x81", 128, &mut backoffer).await?;
//! for region in &regions {
//!     println!("region {} [{}, {})", region.id,
//!         regionsplit::redact::key(&region.start_key),
//!         regionsplit::redact::key(&region.end_key));
//! }
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod check;
pub mod client;
pub mod config;
pub mod error;
pub mod redact;
pub mod region;
pub mod scan;

mod property_tests;

pub use backoff::WaitRegionOnlineBackoffer;
pub use check::{check_part_region_consistency, check_region_consistency};
pub use client::SplitClient;
pub use config::ScanConfig;
pub use error::{BoxError, Error, ErrorKind, Inconsistency, Result};
pub use region::{KeyRange, RegionEpoch, RegionInfo};
pub use scan::{RegionScanner, paginate_scan_region, scan_regions_with_retry};

pub use regionsplit_core::retry::{Backoffer, RetryState, RetryTuning};
