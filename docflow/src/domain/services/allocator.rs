//! Tracking-code allocation on top of the record store's transactional
//! counter.

use crate::domain::models::AllocatorError;
use crate::domain::ports::{CounterError, DocumentRecords, TimeGetter};
use crate::outbound::time::WallClock;
use chrono::Datelike;
use model_document::{Department, TrackingCode, TrackingPrefix};


/// How many counter transactions one allocation may attempt before giving up.
const MAX_COUNTER_ATTEMPTS: usize = 32;

/// Hands out tracking codes backed by the record store's singleton counter.
///
/// The counter step itself is the store's transactional primitive; this
/// service owns the conflict retry and stamps the prefix and year around
/// the issued sequence value.
pub struct TrackingIdAllocator<R, T> {
    records: R,
    time: T,
}

impl<R> TrackingIdAllocator<R, WallClock> {
    /// an allocator reading the system clock
    pub fn new_with_default_time(records: R) -> Self {
        TrackingIdAllocator::new(records, WallClock)
    }
}

impl<R, T> TrackingIdAllocator<R, T> {
    /// an allocator over the given record store and clock
    pub fn new(records: R, time: T) -> Self {
        TrackingIdAllocator { records, time }
    }
}

impl<R, T> TrackingIdAllocator<R, T>
where
    R: DocumentRecords,
    anyhow::Error: From<R::Err>,
    T: TimeGetter,
{
    /// Allocate the next tracking code under the given prefix.
    ///
    /// Sequence values come from the store's counter transaction, so two
    /// concurrent allocations can never share one and no value is ever
    /// reissued, even across process restarts. Conflicted transactions are
    /// retried up to a fixed budget, after which the allocation fails.
    #[tracing::instrument(err, skip(self))]
    pub async fn allocate(&self, prefix: TrackingPrefix) -> Result<TrackingCode, AllocatorError> {
        for attempt in 1..=MAX_COUNTER_ATTEMPTS {
            match self.records.counter_increment().await {
                Ok(sequence) => {
                    let year = self.time.now().year();
                    return Ok(TrackingCode::new(prefix, year, sequence));
                }
                Err(CounterError::Conflict) => {
                    tracing::trace!(attempt, "tracking counter conflicted, retrying");
                }
                Err(CounterError::Store(err)) => {
                    return Err(AllocatorError::Store(anyhow::Error::from(err)));
                }
            }
        }
        Err(AllocatorError::Exhausted {
            attempts: MAX_COUNTER_ATTEMPTS,
        })
    }

    /// Allocate under the department's prefix, falling back to the generic
    /// prefix for departments without a dedicated one.
    pub async fn allocate_for_department(
        &self,
        department: &Department,
    ) -> Result<TrackingCode, AllocatorError> {
        self.allocate(department.tracking_prefix()).await
    }
}
