//! Process-wide cache of slide plans with single-flight computation
//!
//! Each key is either absent, pending (one computation in flight that any
//! number of callers may await) or ready (a plan shared by every later
//! caller). Only successful plans are kept: a failed computation removes
//! its entry so the next caller starts afresh.
//!
//! The computation runs in its own task and moves the entry from pending to
//! ready (or removes it) itself, so a caller that stops waiting neither
//! cancels the work nor leaves the entry stuck.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::domain::{CacheKey, DomainError, SlidePlan};
use crate::infrastructure::observability::{record_cache_lookup, CacheOutcome};

type PlanResult = Result<Arc<SlidePlan>, DomainError>;
type Flight = Shared<BoxFuture<'static, PlanResult>>;

enum Slot {
    Pending(Flight),
    Ready(Arc<SlidePlan>),
}

/// Observable state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Ready,
}

/// Single-flight, success-only cache keyed by request parameters
#[derive(Clone, Default)]
pub struct GenerationCache {
    slots: Arc<Mutex<HashMap<CacheKey, Slot>>>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the plan for `key`, computing it at most once at a time
    ///
    /// `compute` is invoked only when no entry exists. Callers arriving
    /// while it runs await the same result; on failure all of them receive
    /// the same error and nothing is cached.
    pub async fn resolve<F, Fut>(&self, key: &CacheKey, compute: F) -> PlanResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SlidePlan, DomainError>> + Send + 'static,
    {
        let flight = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

            match slots.get(key) {
                Some(Slot::Ready(plan)) => {
                    tracing::debug!(key = %key, "Slide plan cache hit");
                    record_cache_lookup(CacheOutcome::Hit);
                    return Ok(Arc::clone(plan));
                }
                Some(Slot::Pending(flight)) => {
                    tracing::debug!(key = %key, "Joining in-flight slide plan generation");
                    record_cache_lookup(CacheOutcome::Joined);
                    flight.clone()
                }
                None => {
                    tracing::debug!(key = %key, "Slide plan cache miss");
                    record_cache_lookup(CacheOutcome::Miss);
                    // spawned while the lock is held so the task cannot
                    // settle the entry before it is inserted
                    let flight = self.spawn_flight(key.clone(), compute());
                    slots.insert(key.clone(), Slot::Pending(flight.clone()));
                    flight
                }
            }
        };

        flight.await
    }

    fn spawn_flight<Fut>(&self, key: CacheKey, compute: Fut) -> Flight
    where
        Fut: Future<Output = Result<SlidePlan, DomainError>> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);

        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(compute).catch_unwind().await {
                Ok(result) => result.map(Arc::new),
                Err(_) => Err(DomainError::internal("Slide plan generation panicked")),
            };

            let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
            match &result {
                Ok(plan) => {
                    slots.insert(key, Slot::Ready(Arc::clone(plan)));
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Discarding failed slide plan");
                    slots.remove(&key);
                }
            }

            result
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(DomainError::internal(format!(
                    "Slide plan generation task failed: {}",
                    e
                )))
            })
        }
        .boxed()
        .shared()
    }

    /// State of the entry for `key`, `None` when absent
    pub fn state(&self, key: &CacheKey) -> Option<EntryState> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).map(|slot| match slot {
            Slot::Pending(_) => EntryState::Pending,
            Slot::Ready(_) => EntryState::Ready,
        })
    }

    /// Number of ready plans
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of computations currently in flight
    pub fn in_flight(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending(_)))
            .count()
    }
}

impl std::fmt::Debug for GenerationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationCache")
            .field("ready", &self.len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::oneshot;

    use crate::domain::{AspectRatio, LayoutKind, SlideSpec};

    fn key(topic: &str) -> CacheKey {
        CacheKey::new(topic, 1, AspectRatio::Widescreen)
    }

    fn plan(title: &str) -> SlidePlan {
        SlidePlan::new(vec![SlideSpec::new(LayoutKind::Title, title)])
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = GenerationCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let result = cache
                .resolve(&key("mars"), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(plan("Mars"))
                })
                .await
                .unwrap();
            assert_eq!(result.slides()[0].title, "Mars");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&key("mars")), Some(EntryState::Ready));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_hit_returns_same_plan() {
        let cache = GenerationCache::new();

        let first = cache
            .resolve(&key("mars"), || async { Ok(plan("Mars")) })
            .await
            .unwrap();
        let second = cache
            .resolve(&key("mars"), || async { Ok(plan("Other")) })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_computation() {
        let cache = GenerationCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .resolve(&key("saturn"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(plan("Saturn"))
                    })
                    .await
            }));
        }

        let mut plans = Vec::new();
        for handle in handles {
            plans.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(plans.windows(2).all(|p| Arc::ptr_eq(&p[0], &p[1])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failure_is_shared_and_not_cached() {
        let cache = GenerationCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .resolve(&key("saturn"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(DomainError::upstream("mock", "quota"))
                    })
                    .await
            }));
        }

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err, DomainError::upstream("mock", "quota"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&key("saturn")), None);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = GenerationCache::new();

        let err = cache
            .resolve(&key("mars"), || async {
                Err(DomainError::generation("bad json"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::GenerationValidation { .. }));
        assert!(cache.is_empty());

        let ok = cache
            .resolve(&key("mars"), || async { Ok(plan("Mars")) })
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_computation_is_not_cached() {
        let cache = GenerationCache::new();

        let err = cache
            .resolve(&key("mars"), || async {
                if true {
                    panic!("boom");
                }
                Ok(plan("never"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal { .. }));
        assert_eq!(cache.state(&key("mars")), None);
    }

    #[tokio::test]
    async fn test_poisoned_lock_keeps_serving() {
        let cache = GenerationCache::new();
        cache
            .resolve(&key("mars"), || async { Ok(plan("Mars")) })
            .await
            .unwrap();

        let slots = Arc::clone(&cache.slots);
        let poisoner: std::thread::Result<()> = std::thread::spawn(move || {
            let _guard = slots.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();
        assert!(poisoner.is_err());
        assert!(cache.slots.is_poisoned());

        let hit = cache
            .resolve(&key("mars"), || async { Ok(plan("recomputed")) })
            .await
            .unwrap();
        assert_eq!(hit.slides()[0].title, "Mars");

        let miss = cache
            .resolve(&key("venus"), || async { Ok(plan("Venus")) })
            .await
            .unwrap();
        assert_eq!(miss.slides()[0].title, "Venus");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let cache = GenerationCache::new();

        cache
            .resolve(&key("mars"), || async { Ok(plan("Mars")) })
            .await
            .unwrap();
        let venus = CacheKey::new("mars", 2, AspectRatio::Widescreen);
        let result = cache
            .resolve(&venus, || async { Ok(plan("Two")) })
            .await
            .unwrap();

        assert_eq!(result.slides()[0].title, "Two");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_cancel_computation() {
        let cache = GenerationCache::new();
        let (release, released) = oneshot::channel::<()>();

        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .resolve(&key("jupiter"), || async move {
                        let _ = released.await;
                        Ok(plan("Jupiter"))
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.state(&key("jupiter")), Some(EntryState::Pending));
        assert_eq!(cache.in_flight(), 1);

        waiter.abort();
        let _ = waiter.await;
        release.send(()).unwrap();

        // the computation settles the entry on its own
        for _ in 0..50 {
            if cache.state(&key("jupiter")) == Some(EntryState::Ready) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(cache.state(&key("jupiter")), Some(EntryState::Ready));

        let calls = AtomicUsize::new(0);
        cache
            .resolve(&key("jupiter"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(plan("again")) }
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
