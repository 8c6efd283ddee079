//! Request cache with in-flight deduplication
//!
//! One [`QueryCache`] per kind of request. Concurrent callers asking for the
//! same key share a single underlying fetch. Successful results are retained
//! under a [`CachePolicy`]; failures are never retained, so the next request
//! for that key goes back to the source.

use futures::future::{BoxFuture, FutureExt, Shared};
use pokecat_core::CatalogError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

type SharedFetch<V> = Shared<BoxFuture<'static, Result<Arc<V>, CatalogError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a result is served without refetching. `None` never goes stale.
    pub fresh_for: Option<Duration>,
    /// Unused entries are dropped after this long.
    pub evict_after: Duration,
}

impl CachePolicy {
    pub const LIST_PAGE: CachePolicy = CachePolicy {
        fresh_for: Some(HOUR),
        evict_after: DAY,
    };

    pub const ENTITY: CachePolicy = CachePolicy {
        fresh_for: Some(HOUR),
        evict_after: Duration::from_secs(7 * 24 * 60 * 60),
    };

    /// Search index, category membership and category names never change
    /// during a session.
    pub const STATIC: CachePolicy = CachePolicy {
        fresh_for: None,
        evict_after: Duration::from_secs(30 * 24 * 60 * 60),
    };

    fn is_fresh(&self, fetched_at: Instant, now: Instant) -> bool {
        match self.fresh_for {
            None => true,
            Some(fresh_for) => now.duration_since(fetched_at) < fresh_for,
        }
    }
}

enum Slot<V> {
    InFlight(SharedFetch<V>),
    Ready {
        value: Arc<V>,
        fetched_at: Instant,
        last_used: Instant,
    },
}

pub struct QueryCache<K, V> {
    name: &'static str,
    policy: CachePolicy,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            name,
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value for `key`, join an in-flight fetch for it, or
    /// start one with `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<Arc<V>, CatalogError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CatalogError>> + Send + 'static,
    {
        let in_flight = {
            let mut slots = self.lock();
            let now = Instant::now();
            self.evict_unused(&mut slots, now);

            if let Some(Slot::Ready {
                value,
                fetched_at,
                last_used,
            }) = slots.get_mut(&key)
            {
                if self.policy.is_fresh(*fetched_at, now) {
                    *last_used = now;
                    log::trace!("{} cache hit: {:?}", self.name, key);
                    return Ok(Arc::clone(value));
                }
            }

            if let Some(Slot::InFlight(shared)) = slots.get(&key) {
                log::trace!("{} joining in-flight request: {:?}", self.name, key);
                shared.clone()
            } else {
                log::debug!("{} cache miss: {:?}", self.name, key);
                let shared = fetch().map(|r| r.map(Arc::new)).boxed().shared();
                slots.insert(key.clone(), Slot::InFlight(shared.clone()));
                shared
            }
        };

        let result = in_flight.clone().await;

        let mut slots = self.lock();
        let owns_slot = matches!(
            slots.get(&key),
            Some(Slot::InFlight(current)) if current.ptr_eq(&in_flight)
        );
        if owns_slot {
            match &result {
                Ok(value) => {
                    let now = Instant::now();
                    slots.insert(
                        key,
                        Slot::Ready {
                            value: Arc::clone(value),
                            fetched_at: now,
                            last_used: now,
                        },
                    );
                }
                Err(err) => {
                    log::debug!("{} request failed, not cached: {:?}: {}", self.name, key, err);
                    slots.remove(&key);
                }
            }
        }

        result
    }

    fn evict_unused(&self, slots: &mut HashMap<K, Slot<V>>, now: Instant) {
        let evict_after = self.policy.evict_after;
        slots.retain(|_, slot| match slot {
            Slot::InFlight(_) => true,
            Slot::Ready { last_used, .. } => now.duration_since(*last_used) < evict_after,
        });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
