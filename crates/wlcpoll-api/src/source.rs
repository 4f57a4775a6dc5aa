use crate::error::Error;
use crate::reading::MetricReading;

/// Anything that can produce the readings of one metric group.
///
/// Called once per configured group per cycle, from a blocking thread.
/// A failed group is simply absent from the cycle's batch, so
/// implementations should not retry beyond their own transport policy.
pub trait MetricSource: Send + Sync {
    fn fetch_group(&self, group: &str) -> Result<Vec<MetricReading>, Error>;
}

impl<T: MetricSource + ?Sized> MetricSource for std::sync::Arc<T> {
    fn fetch_group(&self, group: &str) -> Result<Vec<MetricReading>, Error> {
        (**self).fetch_group(group)
    }
}

impl<T: MetricSource + ?Sized> MetricSource for Box<T> {
    fn fetch_group(&self, group: &str) -> Result<Vec<MetricReading>, Error> {
        (**self).fetch_group(group)
    }
}
