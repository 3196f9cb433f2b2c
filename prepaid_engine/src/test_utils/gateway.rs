use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    events::EventHooks,
    test_utils::{
        prepare_env::{drop_database, fresh_database},
        scripted_processor::ScriptedProcessor,
    },
    ApprovalApi,
    CheckoutApi,
    EngineOptions,
    LedgerApi,
    SqliteDatabase,
};

/// The full set of engine APIs over a fresh SQLite database and a [`ScriptedProcessor`].
pub struct TestGateway {
    pub db: SqliteDatabase,
    pub processor: ScriptedProcessor,
    pub checkout: CheckoutApi<SqliteDatabase>,
    pub approvals: ApprovalApi<SqliteDatabase, ScriptedProcessor>,
    pub ledger: LedgerApi<SqliteDatabase, ScriptedProcessor>,
}

impl Debug for TestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TestGateway ({})", self.db.url())
    }
}

impl TestGateway {
    pub async fn new() -> Self {
        Self::with_hooks(EventHooks::default()).await
    }

    pub async fn with_hooks(hooks: EventHooks) -> Self {
        let db = fresh_database(5).await;
        debug!("🚀️ Created test database {}", db.url());
        let processor = ScriptedProcessor::new();
        let options = EngineOptions::default().with_remote_timeout(Duration::from_secs(2));
        let checkout = CheckoutApi::new(db.clone(), options.clone());
        let approvals = ApprovalApi::new(db.clone(), processor.clone(), options.clone(), hooks);
        let ledger = LedgerApi::new(db.clone(), processor.clone(), options);
        Self { db, processor, checkout, approvals, ledger }
    }

    pub fn db_path(&self) -> &str {
        self.db.url()
    }

    pub async fn tear_down(mut self) {
        let url = self.db.url().to_string();
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        drop_database(&url).await;
    }
}
