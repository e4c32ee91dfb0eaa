// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide publish/subscribe.
//!
//! `publish` invokes every handler registered for the event name,
//! synchronously and in registration order. A handler that returns an error
//! or panics is logged and skipped; the remaining handlers still run.
//!
//! The subscription registry is the only structure the bus mutates
//! concurrently. It sits behind one mutex that is held while the registry is
//! read or modified and released before any handler runs, so unrelated
//! dispatches never serialize on each other. There is no back-pressure, and
//! no ordering guarantee between publishes made from different threads.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::HandlerError;
use crate::events::Event;
use crate::observability::messages::events::{
    HandlerFailed, HandlerPanicked, NoSubscribers, SubscriptionRegistered,
};
use crate::observability::messages::StructuredLog;

/// Receives events from the bus.
pub trait EventHandler: Send + Sync {
    /// Identity used in logs when the handler fails
    fn label(&self) -> &str;

    fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct FnHandler<F> {
    label: String,
    f: F,
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}

struct Subscription {
    id: SubscriptionId,
    handler: Arc<dyn EventHandler>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_event: HashMap<String, Vec<Subscription>>,
}

/// Cheap-to-clone handle to a shared subscription registry.
///
/// Passed explicitly to every component that publishes or subscribes; there
/// is no global bus.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, event: impl Into<String>, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let event = event.into();
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);

        SubscriptionRegistered {
            event: &event,
            handler: handler.label(),
            subscription_id: id.0,
        }
        .log();

        registry
            .by_event
            .entry(event)
            .or_default()
            .push(Subscription { id, handler });
        id
    }

    /// Subscribe a closure under `label`.
    pub fn subscribe_fn<F>(&self, event: impl Into<String>, label: impl Into<String>, f: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(
            event,
            Arc::new(FnHandler {
                label: label.into(),
                f,
            }),
        )
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let mut removed = false;
        registry.by_event.retain(|_, subscriptions| {
            let before = subscriptions.len();
            subscriptions.retain(|s| s.id != id);
            removed |= subscriptions.len() != before;
            !subscriptions.is_empty()
        });
        removed
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.registry().by_event.get(event).map_or(0, Vec::len)
    }

    /// Deliver `event` to every current subscriber. Returns how many
    /// handlers completed without error.
    pub fn publish(&self, event: &Event) -> usize {
        let handlers: Vec<Arc<dyn EventHandler>> = {
            let registry = self.registry();
            registry
                .by_event
                .get(&event.name)
                .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            NoSubscribers { event: &event.name }.log();
            return 0;
        }

        let mut delivered = 0;
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(error)) => HandlerFailed {
                    event: &event.name,
                    handler: handler.label(),
                    error: &error,
                }
                .log(),
                Err(panic) => HandlerPanicked {
                    event: &event.name,
                    handler: handler.label(),
                    message: panic_message(panic.as_ref()),
                }
                .log(),
            }
        }
        delivered
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(bus: &EventBus, event: &str, label: &str, log: Arc<Mutex<Vec<String>>>) -> SubscriptionId {
        let tag = label.to_string();
        bus.subscribe_fn(event, label, move |e| {
            log.lock().unwrap().push(format!("{}:{}", tag, e.payload));
            Ok(())
        })
    }

    #[test]
    fn delivers_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "tick", "first", log.clone());
        recorder(&bus, "tick", "second", log.clone());
        recorder(&bus, "tock", "other", log.clone());

        let delivered = bus.publish(&Event::new("tick", json!(1)));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:1", "second:1"]);
    }

    #[test]
    fn no_subscribers_is_not_an_error() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(&Event::new("nobody_listens", json!(null))), 0);
    }

    #[test]
    fn failing_handler_does_not_stop_others() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "tick", "before", log.clone());
        bus.subscribe_fn("tick", "broken", |_| Err(HandlerError::Failed("boom".into())));
        recorder(&bus, "tick", "after", log.clone());

        let delivered = bus.publish(&Event::new("tick", json!(7)));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["before:7", "after:7"]);
    }

    #[test]
    fn panicking_handler_does_not_stop_others() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe_fn("tick", "panics", |_| panic!("handler exploded"));
        recorder(&bus, "tick", "survivor", log.clone());

        let delivered = bus.publish(&Event::new("tick", json!("x")));

        assert_eq!(delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["survivor:\"x\""]);
    }

    #[test]
    fn unsubscribe_removes_only_that_handler() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&bus, "tick", "first", log.clone());
        recorder(&bus, "tick", "second", log.clone());

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        assert_eq!(bus.subscriber_count("tick"), 1);

        bus.publish(&Event::new("tick", json!(2)));
        assert_eq!(*log.lock().unwrap(), vec!["second:2"]);
    }

    #[test]
    fn handler_may_publish_reentrantly() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "echo", "sink", log.clone());

        let inner = bus.clone();
        bus.subscribe_fn("shout", "relay", move |e| {
            inner.publish(&Event::derived("echo", e.payload.clone(), e));
            Ok(())
        });

        bus.publish(&Event::new("shout", json!("hey")));
        assert_eq!(*log.lock().unwrap(), vec!["sink:\"hey\""]);
    }

    #[test]
    fn clones_share_one_registry() {
        let bus = EventBus::new();
        let clone = bus.clone();
        clone.subscribe_fn("tick", "via_clone", |_| Ok(()));
        assert_eq!(bus.subscriber_count("tick"), 1);
    }
}
