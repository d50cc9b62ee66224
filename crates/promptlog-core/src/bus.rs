use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub struct BusEventDef {
    pub event_type: &'static str,
}

impl BusEventDef {
    pub const fn new(event_type: &'static str) -> Self {
        Self { event_type }
    }
}

pub const THEME_CHANGED: BusEventDef = BusEventDef::new("theme.changed");

type BoxedCallback = Arc<dyn Fn(&str, &serde_json::Value) + Send + Sync>;

struct Listener {
    id: u64,
    callback: BoxedCallback,
}

struct Inner {
    next_id: AtomicU64,
    by_type: RwLock<HashMap<String, Vec<Listener>>>,
}

/// In-process publish/subscribe hub.
///
/// Publishing is synchronous: every callback registered for the event type
/// runs before `publish` returns.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

/// Handle returned by [`Bus::subscribe`]. The callback stays registered until
/// [`Subscription::unsubscribe`] is called; dropping the handle keeps it alive.
pub struct Subscription {
    id: u64,
    event_type: String,
    bus: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        if let Some(listeners) = inner.by_type.write().get_mut(&self.event_type) {
            listeners.retain(|l| l.id != self.id);
        };
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                by_type: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn publish(&self, def: &BusEventDef, properties: serde_json::Value) {
        tracing::debug!(event_type = def.event_type, "publishing event");

        // Snapshot the callbacks so a handler may subscribe or unsubscribe
        // without deadlocking on the registry lock.
        let callbacks: Vec<BoxedCallback> = self
            .inner
            .by_type
            .read()
            .get(def.event_type)
            .into_iter()
            .flatten()
            .map(|l| Arc::clone(&l.callback))
            .collect();
        for callback in callbacks {
            callback(def.event_type, &properties);
        }
    }

    pub fn subscribe<F>(&self, def: &BusEventDef, callback: F) -> Subscription
    where
        F: Fn(&str, &serde_json::Value) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .by_type
            .write()
            .entry(def.event_type.to_string())
            .or_default()
            .push(Listener {
                id,
                callback: Arc::new(callback),
            });
        Subscription {
            id,
            event_type: def.event_type.to_string(),
            bus: Arc::downgrade(&self.inner),
        }
    }

    #[cfg(test)]
    fn listener_count(&self, def: &BusEventDef) -> usize {
        self.inner
            .by_type
            .read()
            .get(def.event_type)
            .map_or(0, Vec::len)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const PING: BusEventDef = BusEventDef::new("test.ping");
    const PONG: BusEventDef = BusEventDef::new("test.pong");

    #[test]
    fn test_delivery_is_per_event_type() {
        let bus = Bus::new();
        let pings = Arc::new(Mutex::new(Vec::new()));
        let pongs = Arc::new(Mutex::new(0));

        let p = Arc::clone(&pings);
        let _ping = bus.subscribe(&PING, move |ty, props| p.lock().push((ty.to_string(), props.clone())));
        let q = Arc::clone(&pongs);
        let _pong = bus.subscribe(&PONG, move |_, _| *q.lock() += 1);

        bus.publish(&PING, serde_json::json!({ "n": 1 }));
        bus.publish(&PONG, serde_json::json!({ "n": 2 }));
        bus.publish(&THEME_CHANGED, serde_json::json!({ "mode": "light" }));

        assert_eq!(*pings.lock(), vec![("test.ping".to_string(), serde_json::json!({ "n": 1 }))]);
        assert_eq!(*pongs.lock(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = Bus::new();
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        let sub = bus.subscribe(&PING, move |_, _| *h.lock() += 1);

        bus.publish(&PING, serde_json::Value::Null);
        sub.unsubscribe();
        bus.publish(&PING, serde_json::Value::Null);

        assert_eq!(*hits.lock(), 1);
        assert_eq!(bus.listener_count(&PING), 0);
    }

    #[test]
    fn test_handler_can_subscribe_while_publishing() {
        let bus = Bus::new();
        let inner_bus = bus.clone();
        let _sub = bus.subscribe(&PING, move |_, _| {
            let _ = inner_bus.subscribe(&PONG, |_, _| {});
        });
        bus.publish(&PING, serde_json::Value::Null);
        assert_eq!(bus.listener_count(&PONG), 1);
    }
}
