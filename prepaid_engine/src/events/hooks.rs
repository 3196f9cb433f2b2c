use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

use log::*;

use crate::events::{EventProducer, Handler, StatusChangeEvent};

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_status_change: Option<Handler<StatusChangeEvent>>,
}

impl EventHooks {
    pub fn on_status_change<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(StatusChangeEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_status_change = Some(Arc::new(f));
        self
    }

    /// Hands every status change to `producer`, so that a spawned [`EventHandler`](crate::events::EventHandler) can
    /// deal with it off the request path.
    pub fn publish_status_changes(&mut self, producer: EventProducer<StatusChangeEvent>) -> &mut Self {
        self.on_status_change(move |ev| {
            let producer = producer.clone();
            Box::pin(async move { producer.publish_event(ev).await }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
    }
}

/// Holds the single active status change subscriber.
///
/// Registering a new hook replaces the old one. [`ChangeNotifier::notify`] awaits the hook, so by the time an engine
/// call returns, the host has already seen the corresponding status change.
#[derive(Default, Clone)]
pub struct ChangeNotifier {
    hook: Arc<RwLock<Option<Handler<StatusChangeEvent>>>>,
}

impl From<EventHooks> for ChangeNotifier {
    fn from(hooks: EventHooks) -> Self {
        Self { hook: Arc::new(RwLock::new(hooks.on_status_change)) }
    }
}

impl ChangeNotifier {
    pub fn register(&self, hook: Handler<StatusChangeEvent>) {
        let mut lock = self.hook.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if lock.replace(hook).is_some() {
            debug!("📬️ Replaced the existing status change subscriber");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.hook.read().map(|h| h.is_some()).unwrap_or_else(|poisoned| poisoned.into_inner().is_some())
    }

    pub async fn notify(&self, event: StatusChangeEvent) {
        let hook = self.hook.read().map(|h| h.clone()).unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        match hook {
            Some(hook) => {
                trace!("📬️ Notifying subscriber that [{}] is now {}", event.reference, event.result.status);
                (hook)(event).await;
            },
            None => trace!("📬️ No status change subscriber. [{}] is now {}", event.reference, event.result.status),
        }
    }
}
