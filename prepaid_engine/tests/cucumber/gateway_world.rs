use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use cucumber::World;
use prepaid_engine::{
    events::{EventHooks, StatusChangeEvent},
    test_utils::gateway::TestGateway,
};

#[derive(Default, Debug, World)]
pub struct GatewayWorld {
    pub system: Option<TestGateway>,
    pub notifications: Arc<Mutex<Vec<StatusChangeEvent>>>,
    /// `Ok(())` or the error code of the most recent engine call made by a `When` step
    pub last_outcome: Option<Result<(), String>>,
}

impl GatewayWorld {
    pub fn gateway(&self) -> &TestGateway {
        self.system.as_ref().expect("Gateway not initialised")
    }

    pub fn hooks(&self) -> EventHooks {
        let notifications = self.notifications.clone();
        let mut hooks = EventHooks::default();
        hooks.on_status_change(move |ev| {
            notifications.lock().unwrap().push(ev);
            Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        hooks
    }

    pub fn record<T, E>(&mut self, result: Result<T, E>, code: impl Fn(&E) -> &'static str) {
        self.last_outcome = Some(result.map(|_| ()).map_err(|e| code(&e).to_string()));
    }
}
