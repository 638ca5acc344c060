//! Change notifications for completed analyses
//!
//! Subscribers are called synchronously, in subscription order, once per
//! published result. Callbacks run outside the subscriber lock, so a
//! callback may subscribe or unsubscribe without deadlocking.

use crate::domain::AnalysisResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback = Arc<dyn Fn(&AnalysisResult) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

/// Multicast stream of analysis results
#[derive(Default)]
pub struct AnalysisEvents {
    subscribers: Mutex<Subscribers>,
}

impl AnalysisEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for every future result
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&AnalysisResult) + Send + Sync + 'static,
    {
        let mut subscribers = self.lock();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.callbacks.len();
        subscribers.callbacks.retain(|(sid, _)| *sid != id);
        subscribers.callbacks.len() != before
    }

    /// Delivers `result` to every current subscriber
    pub fn publish(&self, result: &AnalysisResult) {
        let callbacks: Vec<Callback> = self
            .lock()
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(result);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().callbacks.len()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManifestKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn result() -> AnalysisResult {
        AnalysisResult::empty("/w/package.json", ManifestKind::PackageJson)
    }

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let events = AnalysisEvents::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&count);
            events.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        events.publish(&result());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let events = AnalysisEvents::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = events.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));
        events.publish(&result());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_sees_published_result() {
        let events = AnalysisEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        events.subscribe(move |r| sink.lock().unwrap().push(r.file.clone()));

        events.publish(&result());
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap()[0], std::path::PathBuf::from("/w/package.json"));
    }
}
