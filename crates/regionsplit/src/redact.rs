//! Key formatting for logs and error messages.
//!
//! Keys are user data. By default they are printed as upper-case hex; once
//! redaction is switched on with [`set_redact_log`], every key prints as `?`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static REDACT_LOG: AtomicBool = AtomicBool::new(false);

/// Switch key redaction on or off for the whole process.
pub fn set_redact_log(enabled: bool) {
    REDACT_LOG.store(enabled, Ordering::Relaxed);
}

/// Whether keys are currently redacted.
pub fn is_redact_log_enabled() -> bool {
    REDACT_LOG.load(Ordering::Relaxed)
}

/// Wrap a key for display.
///
/// ```rust
/// use regionsplit::redact;
///
/// assert_eq!(redact::key(b"t\x80").to_string(), "7480");
/// ```
pub fn key(key: &[u8]) -> Key<'_> {
    Key(key)
}

/// Display adapter returned by [`key`].
#[derive(Clone, Copy)]
pub struct Key<'a>(&'a [u8]);

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_redact_log_enabled() {
            f.write_str("?")
        } else {
            f.write_str(&hex::encode_upper(self.0))
        }
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
