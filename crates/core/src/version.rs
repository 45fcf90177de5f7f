//! Snapshot version expectations.

use crate::error::{DomainError, DomainResult};

/// The snapshot version a caller based its changes on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(pub u64);

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "snapshot version check failed (expected: {}, actual: {actual})",
                self.0
            )))
        }
    }
}
