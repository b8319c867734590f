//! Cache-aside store with single-flight population.
//!
//! Entries live for a fixed TTL counted from successful population. On a miss,
//! the first caller for a key spawns the fetch; concurrent callers for the same
//! key attach to it and receive the same value or the same error. Failures are
//! never cached.
//!
//! Each fetch runs on its own task with its own cancellation token. A caller
//! that cancels only detaches; the fetch is cancelled once every attached
//! caller has left.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use rates_types::{CancellationToken, RateError};

type Outcome<V> = Option<Result<V, RateError>>;

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + MAX_TTL)
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Flight<V> {
    id: u64,
    outcome: watch::Receiver<Outcome<V>>,
    waiters: usize,
    cancel: CancellationToken,
}

struct Slots<V> {
    entries: HashMap<String, Entry<V>>,
    flights: HashMap<String, Flight<V>>,
    next_id: u64,
}

impl<V: Clone> Slots<V> {
    fn fresh(&self, key: &str) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    fn clear_flight(&mut self, key: &str, id: u64) -> Option<Flight<V>> {
        match self.flights.get(key) {
            Some(flight) if flight.id == id => self.flights.remove(key),
            _ => None,
        }
    }
}

fn lock<V>(slots: &Mutex<Slots<V>>) -> MutexGuard<'_, Slots<V>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keyed TTL cache with at most one in-flight fetch per key.
pub struct SingleFlightCache<V> {
    slots: Arc<Mutex<Slots<V>>>,
}

impl<V> Default for SingleFlightCache<V> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                entries: HashMap::new(),
                flights: HashMap::new(),
                next_id: 0,
            })),
        }
    }
}

impl<V> SingleFlightCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if present and unexpired.
    pub fn get(&self, key: &str) -> Option<V> {
        lock(&self.slots).fresh(key)
    }

    /// Whether a fetch for `key` is currently running.
    pub fn is_fetching(&self, key: &str) -> bool {
        lock(&self.slots).flights.contains_key(key)
    }

    /// Returns the cached value for `key`, or runs `fetch` to populate it.
    ///
    /// `fetch` is invoked at most once per miss across all concurrent callers
    /// and receives the token that cancels the fetch itself.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<V, RateError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<V, RateError>> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(RateError::Cancelled);
        }

        let (outcome, waiter) = {
            let mut slots = lock(&self.slots);
            if let Some(value) = slots.fresh(key) {
                debug!(key, "Cache hit");
                return Ok(value);
            }

            let (outcome, id) = match slots.flights.get_mut(key) {
                Some(flight) => {
                    flight.waiters += 1;
                    debug!(key, waiters = flight.waiters, "Joining in-flight fetch");
                    (flight.outcome.clone(), flight.id)
                }
                None => {
                    let id = slots.next_id;
                    slots.next_id += 1;
                    let (tx, rx) = watch::channel(None);
                    let token = CancellationToken::new();
                    slots.flights.insert(
                        key.to_string(),
                        Flight {
                            id,
                            outcome: rx.clone(),
                            waiters: 1,
                            cancel: token.clone(),
                        },
                    );
                    debug!(key, "Cache miss, starting fetch");
                    tokio::spawn(run_flight(
                        Arc::clone(&self.slots),
                        key.to_string(),
                        id,
                        ttl,
                        fetch(token),
                        tx,
                    ));
                    (rx, id)
                }
            };

            let waiter = Waiter {
                slots: Arc::clone(&self.slots),
                key: key.to_string(),
                id,
            };
            (outcome, waiter)
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RateError::Cancelled),
            result = wait_outcome(outcome) => result,
        };
        drop(waiter);
        result
    }
}

async fn wait_outcome<V: Clone>(mut outcome: watch::Receiver<Outcome<V>>) -> Result<V, RateError> {
    let ready = outcome
        .wait_for(Option::is_some)
        .await
        .map(|outcome| (*outcome).clone())
        .map_err(|_| RateError::transport("Rate fetch ended without a result"))?;
    ready.unwrap_or_else(|| Err(RateError::transport("Rate fetch ended without a result")))
}

async fn run_flight<V, Fut>(
    slots: Arc<Mutex<Slots<V>>>,
    key: String,
    id: u64,
    ttl: Duration,
    fetch: Fut,
    tx: watch::Sender<Outcome<V>>,
) where
    V: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<V, RateError>> + Send + 'static,
{
    let _guard = FlightGuard {
        slots: Arc::clone(&slots),
        key: key.clone(),
        id,
    };
    let result = fetch.await;

    {
        let mut slots = lock(&slots);
        slots.clear_flight(&key, id);
        if let Ok(value) = &result {
            slots.entries.insert(
                key.clone(),
                Entry {
                    value: value.clone(),
                    expires_at: expiry(Instant::now(), ttl),
                },
            );
        }
    }

    // No receivers left means every caller detached.
    let _ = tx.send(Some(result));
}

/// Clears the flight if its task is dropped before completing.
struct FlightGuard<V> {
    slots: Arc<Mutex<Slots<V>>>,
    key: String,
    id: u64,
}

impl<V> Drop for FlightGuard<V> {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        if let Some(flight) = slots.flights.get(&self.key) {
            if flight.id == self.id {
                slots.flights.remove(&self.key);
            }
        }
    }
}

/// One caller attached to a flight. The last one to leave early cancels it.
struct Waiter<V> {
    slots: Arc<Mutex<Slots<V>>>,
    key: String,
    id: u64,
}

impl<V> Drop for Waiter<V> {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        let abandoned = match slots.flights.get_mut(&self.key) {
            Some(flight) if flight.id == self.id => {
                flight.waiters -= 1;
                flight.waiters == 0
            }
            _ => false,
        };
        if abandoned {
            if let Some(flight) = slots.flights.remove(&self.key) {
                debug!(key = %self.key, "All callers left, cancelling fetch");
                flight.cancel.cancel();
            }
        }
    }
}
