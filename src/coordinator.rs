// src/coordinator.rs
//! Dual-point acquisition

use std::sync::Arc;

use crate::error::{KmlGenError, Result};
use crate::gps::{AcquireSpec, Fix, NmeaReceiver, ReadScheduler};

/// Runs two single-shot receivers and joins their outcomes.
///
/// Both legs share one `ReadScheduler`; under the default `Serialized`
/// policy the two read loops run back to back even though the acquisitions
/// are started concurrently. Throughput is therefore effectively sequential
/// — a known constraint of the scheduling policy, not a bug.
pub struct FixCoordinator {
    scheduler: Arc<ReadScheduler>,
}

impl FixCoordinator {
    pub fn new(scheduler: Arc<ReadScheduler>) -> Self {
        Self { scheduler }
    }

    /// Acquire one fix per device, concurrently, succeeding only if both
    /// legs succeed.
    ///
    /// No retry and no partial result: when one leg fails, the other leg's
    /// fix is discarded and the error names the failed device so the host
    /// can offer manual entry for that point.
    pub async fn acquire_pair(&self, spec1: &AcquireSpec, spec2: &AcquireSpec) -> Result<(Fix, Fix)> {
        let mut receiver1 = NmeaReceiver::new(Arc::clone(&self.scheduler));
        let mut receiver2 = NmeaReceiver::new(Arc::clone(&self.scheduler));

        let (outcome1, outcome2) =
            tokio::join!(receiver1.acquire(spec1), receiver2.acquire(spec2));

        join_outcomes(outcome1, outcome2)
    }
}

impl Default for FixCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(ReadScheduler::default()))
    }
}

/// Combine two acquisition outcomes; any failure fails the pair.
fn join_outcomes(first: Result<Fix>, second: Result<Fix>) -> Result<(Fix, Fix)> {
    match (first, second) {
        (Ok(fix1), Ok(fix2)) => Ok((fix1, fix2)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(e1), Err(e2)) => Err(KmlGenError::Other(format!(
            "both acquisitions failed: {}; {}",
            e1, e2
        ))),
    }
}
