//! Publish/subscribe registry for stream events.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// A subscriber callback. Identity is the `Arc` pointer, so keep the value
/// returned by [`EventBus::on`] to unsubscribe later.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Event name to ordered subscriber list.
///
/// Listeners run synchronously on the emitting task, in registration order.
/// The same listener may be registered more than once and then runs once per
/// registration.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`. Returns the handle to pass to [`EventBus::off`].
    pub fn on<F>(&self, event: &str, listener: F) -> Listener
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.add(event, listener.clone());
        listener
    }

    /// Subscribe an existing handle, e.g. one shared across several events.
    pub fn add(&self, event: &str, listener: Listener) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.entry(event.to_string()).or_default().push(listener);
    }

    /// Remove the first registration of `listener` for `event`.
    ///
    /// Returns whether anything was removed.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };

        match list.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        listeners.get(event).map_or(0, Vec::len)
    }

    /// Invoke every listener of `event` with `payload`.
    ///
    /// Works on a snapshot taken before the first call, so listeners may
    /// subscribe or unsubscribe from inside a callback. A panicking listener
    /// is logged and skipped; the rest still run. Returns how many listeners
    /// completed normally.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            match listeners.get(event) {
                Some(list) => list.clone(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!("Listener for '{}' panicked: {}", event, reason);
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let counts: HashMap<&str, usize> =
            listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
