//! Progress notifications for long running analyses.

use std::sync::Mutex;

/// Observer of progress percentages, between 0 and 100.
pub type ProgressCallback<'a> = Box<dyn Fn(u8) + Send + Sync + 'a>;

/// Forwards "percentage reached" notifications to an optional observer.
///
/// A percentage not above the highest one seen so far is dropped, so workers
/// finishing concurrently can report in any order. Notifications are
/// serialized: the callback never runs twice at once.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
    reached: Mutex<u8>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that only records the percentage reached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter that forwards every new percentage to `callback`.
    ///
    /// The callback runs while the reporter is locked: it must not call
    /// [`report`](Self::report) or [`reached`](Self::reached) on the same
    /// reporter, or it will deadlock.
    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
            reached: Mutex::new(0),
        }
    }

    /// Record that `percent` is reached, clamped to 100, and notify the
    /// callback if it is above every earlier report.
    #[inline]
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let mut reached = self.reached.lock().unwrap_or_else(|e| e.into_inner());
        if percent <= *reached && *reached != 0 {
            return;
        }
        *reached = percent;
        if let Some(cb) = &self.callback {
            cb(percent);
        }
    }

    /// Highest percentage reported so far.
    pub fn reached(&self) -> u8 {
        *self.reached.lock().unwrap_or_else(|e| e.into_inner())
    }
}
