use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use log::*;
use prepaid_engine::events::{EventHandler, EventHooks, StatusChangeEvent};
use reqwest::Client;

pub const STATUS_RELAY_BUFFER_SIZE: usize = 25;

/// Builds an event handler that POSTs every status change, as JSON, to `url`.
///
/// Delivery is best-effort. Failures are logged and the event is dropped; the merchant can always recover the current
/// state from `GET /api/payment/{reference}`.
pub fn create_status_relay(url: String, timeout: Duration) -> Result<EventHandler<StatusChangeEvent>, reqwest::Error> {
    let client = Client::builder().timeout(timeout).build()?;
    let url = Arc::new(url);
    let handler = Arc::new(move |ev: StatusChangeEvent| {
        let client = client.clone();
        let url = Arc::clone(&url);
        Box::pin(async move {
            let reference = ev.reference.clone();
            match client.post(url.as_str()).json(&ev).send().await {
                Ok(res) if res.status().is_success() => {
                    debug!("📬️ Relayed {} status for [{reference}] to {url}", ev.result.status)
                },
                Ok(res) => warn!("📬️ {url} rejected the status change for [{reference}]. Status {}", res.status()),
                Err(e) => error!("📬️ Could not relay the status change for [{reference}] to {url}. {e}"),
            }
        }) as BoxFuture<'static, ()>
    });
    Ok(EventHandler::new(STATUS_RELAY_BUFFER_SIZE, handler))
}

/// Hooks for a server without a relay target. Status changes are only logged.
pub fn log_status_changes() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_status_change(|ev| {
        info!("📬️ [{}] is now {}. {}", ev.reference, ev.result.status, ev.result.message);
        Box::pin(async {}) as BoxFuture<'static, ()>
    });
    hooks
}
