//! Uniform picks for canned replies, quotes and simulated latency.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::RngExt;

pub fn choose<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// Duration drawn uniformly from `[min, max]`; `min` when the range is empty.
pub fn duration_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    rand::rng().random_range(min..=max)
}
