//! # Prepaid order engine public API
//!
//! The `gateway_api` module exposes the programmatic API for the engine. It is split by responsibility, so a host can
//! wire up only what it needs:
//!
//! * [`checkout_api`] opens pending order records and produces the parameters for a processor-hosted checkout.
//! * [`approval_api`] reconciles buyer-side approve/cancel/error notifications against the processor and commits
//!   verified approvals exactly once.
//! * [`ledger_api`] answers payment status and refundability queries, and executes refunds with running-total
//!   accounting.
//!
//! # API usage
//!
//! Every API is created by supplying backends that implement the traits it needs:
//!
//! ```rust,ignore
//! use prepaid_engine::{ApprovalApi, EngineOptions, EventHooks, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = ApprovalApi::new(db, my_processor, EngineOptions::default(), EventHooks::default());
//! let result = api.approve("PP-100", &"ref-1".into(), "CAP-1").await?;
//! ```
use std::{future::Future, time::Duration};

use crate::traits::ProcessorError;

pub mod approval_api;
pub mod checkout_api;
pub mod errors;
pub mod ledger_api;
pub mod payment_objects;

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CALLBACK_BASE: &str = "http://127.0.0.1:8470";
const DEFAULT_INSTANCE_ID: &str = "default";

/// Settings shared by the engine APIs.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on every call to the remote processor. A call that runs over is treated as a transport failure.
    pub remote_timeout: Duration,
    /// Public base URL of the host, used to build the per-instance notification address.
    pub callback_base: String,
    /// Distinguishes gateway instances that share one host.
    pub instance_id: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            callback_base: DEFAULT_CALLBACK_BASE.to_string(),
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
        }
    }
}

impl EngineOptions {
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// The address the buyer-side checkout reports approve/cancel/error events to.
    pub fn notify_url(&self) -> String {
        format!("{}/paypal/{}/onClose", self.callback_base.trim_end_matches('/'), self.instance_id)
    }
}

/// Runs a processor call, giving up after `deadline`.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, ProcessorError>
where F: Future<Output = Result<T, ProcessorError>> {
    tokio::time::timeout(deadline, call).await.unwrap_or(Err(ProcessorError::Timeout(deadline)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notify_url_has_no_double_slash() {
        let options = EngineOptions {
            callback_base: "https://shop.example.com/api/payment/callback/".into(),
            instance_id: "main".into(),
            ..Default::default()
        };
        assert_eq!(options.notify_url(), "https://shop.example.com/api/payment/callback/paypal/main/onClose");
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let deadline = Duration::from_millis(10);
        let result: Result<(), _> = with_deadline(deadline, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ProcessorError::Timeout(deadline)));
        let result = with_deadline(deadline, async { Ok::<_, ProcessorError>(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
