use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

/// Accumulates time spent producing items of wrapped iterators, per label.
///
/// Clones share the same totals.
#[derive(Clone, Debug, Default)]
pub struct ExecutionTimeTracker {
    totals: Rc<RefCell<HashMap<String, Duration>>>,
}

impl ExecutionTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `iter`, timing every `next()` call under `label`.
    ///
    /// Items pass through unchanged and in order. The measured time is added
    /// to the label's total once the iterator is exhausted or dropped.
    pub fn track<I: Iterator>(&self, label: &str, iter: I) -> Timed<I> {
        Timed {
            inner: iter,
            label: label.to_owned(),
            elapsed: Duration::ZERO,
            tracker: self.clone(),
            recorded: false,
        }
    }

    /// Total time recorded under `label`
    pub fn total(&self, label: &str) -> Duration {
        self.totals.borrow().get(label).copied().unwrap_or_default()
    }

    fn record(&self, label: &str, elapsed: Duration) {
        let mut totals = self.totals.borrow_mut();
        let total = totals.entry(label.to_owned()).or_default();
        *total += elapsed;
        tracing::debug!(label, elapsed_ms = elapsed.as_millis() as u64, total_ms = total.as_millis() as u64, "execution time");
    }
}

/// Iterator returned by [`ExecutionTimeTracker::track`]
pub struct Timed<I> {
    inner: I,
    label: String,
    elapsed: Duration,
    tracker: ExecutionTimeTracker,
    recorded: bool,
}

impl<I> Timed<I> {
    fn finish(&mut self) {
        if !self.recorded {
            self.recorded = true;
            self.tracker.record(&self.label, self.elapsed);
        }
    }
}

impl<I: Iterator> Iterator for Timed<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let start = Instant::now();
        let item = self.inner.next();
        self.elapsed += start.elapsed();
        if item.is_none() {
            self.finish();
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> Drop for Timed<I> {
    fn drop(&mut self) {
        self.finish();
    }
}
