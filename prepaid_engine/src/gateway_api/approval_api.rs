use std::{fmt::Debug, future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::{ApprovalCommit, Cents, ReferenceId},
    events::{ChangeNotifier, EventHooks, StatusChangeEvent},
    gateway_api::{
        errors::ApprovalRejection,
        payment_objects::{PaymentResult, PaymentStatus, PaymentUnit},
        with_deadline,
        EngineOptions,
    },
    traits::{CommitOutcome, OrderStore, PaymentProcessor},
};

/// `ApprovalApi` handles the three notifications the buyer-side checkout can send: approve, cancel and error.
///
/// Negative outcomes (cancel, error) are reported to the change notifier at face value. An approval is only ever
/// committed after the processor's own copy of the order has been fetched and checked against the local record.
pub struct ApprovalApi<B, P> {
    db: B,
    processor: P,
    options: EngineOptions,
    notifier: ChangeNotifier,
}

impl<B, P> Debug for ApprovalApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApprovalApi")
    }
}

impl<B, P> ApprovalApi<B, P> {
    pub fn new(db: B, processor: P, options: EngineOptions, hooks: EventHooks) -> Self {
        Self { db, processor, options, notifier: ChangeNotifier::from(hooks) }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Installs `f` as the status change subscriber, replacing any previous one.
    pub fn register_change_notifier<F>(&self, f: F)
    where F: (Fn(StatusChangeEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.notifier.register(Arc::new(f));
    }

    async fn notify(&self, reference: &ReferenceId, result: PaymentResult) {
        self.notifier.notify(StatusChangeEvent::new(reference.clone(), result)).await;
    }

    /// The buyer closed the checkout without paying. The order record is not touched, so a later genuine approval can
    /// still land.
    pub async fn cancel(&self, reference: &ReferenceId) -> Result<PaymentResult, ApprovalRejection> {
        if reference.is_empty() {
            return Err(ApprovalRejection::MissingReference);
        }
        info!("🔄️ Buyer cancelled the checkout for [{reference}]");
        let message = format!("[{reference}] Buyer cancelled the checkout");
        let result = PaymentResult::unverified(PaymentStatus::Closed, message);
        self.notify(reference, result.clone()).await;
        Ok(result)
    }

    /// The buyer-side checkout reported an error. Like [`Self::cancel`], this does not touch the order record.
    pub async fn error_reported(&self, reference: &ReferenceId) -> Result<PaymentResult, ApprovalRejection> {
        if reference.is_empty() {
            return Err(ApprovalRejection::MissingReference);
        }
        warn!("🔄️ Buyer-side checkout reported an error for [{reference}]");
        let message = format!("[{reference}] Checkout reported an error");
        let result = PaymentResult::unverified(PaymentStatus::Unpaid, message);
        self.notify(reference, result.clone()).await;
        Ok(result)
    }
}

impl<B, P> ApprovalApi<B, P>
where
    B: OrderStore,
    P: PaymentProcessor,
{
    /// Verifies a buyer-reported approval against the processor and, if everything checks out, closes the order.
    ///
    /// The checks run in a fixed order and stop at the first failure:
    /// 1. refresh the processor credential,
    /// 2. fetch the processor order `order_id`,
    /// 3. it must have exactly one purchase unit,
    /// 4. whose reference must be `reference`,
    /// 5. the local record for `reference` must load,
    /// 6. the charged amount must parse,
    /// 7. and match the recorded currency and total exactly,
    /// 8. and the processor must report the order as APPROVED or COMPLETED.
    ///
    /// Then the record is closed with a conditional write that only succeeds while it is still pending. Of any number
    /// of concurrent approvals for one reference, exactly one commits and notifies `PAID`; the others get
    /// [`ApprovalRejection::ConcurrentCommitLost`] and notify nothing.
    ///
    /// Missing ids are caller errors and are rejected before any remote call, without notification. Every other
    /// rejection is reported to the change notifier.
    pub async fn approve(
        &self,
        order_id: &str,
        reference: &ReferenceId,
        capture_id: &str,
    ) -> Result<PaymentResult, ApprovalRejection> {
        if reference.is_empty() {
            return Err(ApprovalRejection::MissingReference);
        }
        if order_id.trim().is_empty() {
            return Err(ApprovalRejection::MissingOrderId);
        }
        if capture_id.trim().is_empty() {
            return Err(ApprovalRejection::MissingCaptureId);
        }
        debug!("🔄️ Verifying approval of [{reference}] with processor order {order_id}");
        match self.verify_and_commit(order_id, reference, capture_id).await {
            Ok(result) => {
                info!("🔄️ Payment for [{reference}] confirmed and recorded");
                self.notify(reference, result.clone()).await;
                Ok(result)
            },
            Err(rejection) => {
                match rejection_report(reference, &rejection) {
                    Some(report) => {
                        warn!("🔄️ Approval of [{reference}] rejected ({}). {rejection}", rejection.code());
                        self.notify(reference, report).await;
                    },
                    None => info!("🔄️ Approval of [{reference}] not committed. {rejection}"),
                }
                Err(rejection)
            },
        }
    }

    async fn verify_and_commit(
        &self,
        order_id: &str,
        reference: &ReferenceId,
        capture_id: &str,
    ) -> Result<PaymentResult, ApprovalRejection> {
        let deadline = self.options.remote_timeout;
        with_deadline(deadline, self.processor.refresh_credential()).await.map_err(ApprovalRejection::AuthFailure)?;
        let order = with_deadline(deadline, self.processor.fetch_order(order_id))
            .await
            .map_err(ApprovalRejection::RemoteFetchFailure)?;
        let unit = order.single_unit().ok_or(ApprovalRejection::BundlingUnsupported(order.purchase_units.len()))?;
        if unit.reference_id != reference.as_str() {
            return Err(ApprovalRejection::ReferenceMismatch {
                expected: reference.clone(),
                reported: unit.reference_id.clone(),
            });
        }
        let record = self
            .db
            .fetch_order(reference)
            .await
            .map_err(|e| ApprovalRejection::LocalRecordUnavailable(e.to_string()))?
            .ok_or_else(|| ApprovalRejection::LocalRecordUnavailable(format!("No order exists for {reference}")))?;
        let charged = unit.value.parse::<Cents>().map_err(|_| ApprovalRejection::AmountUnparsable(unit.value.clone()))?;
        if unit.currency != record.currency || charged != record.total {
            return Err(ApprovalRejection::AmountMismatch {
                expected: format!("{} {}", record.total, record.currency),
                charged: format!("{charged} {}", unit.currency),
            });
        }
        if !order.status.is_paid() {
            return Err(ApprovalRejection::NotYetPaid(order.status.clone()));
        }
        let commit = ApprovalCommit::new(order_id, capture_id, order.raw.clone());
        match self.db.commit_approval(reference, commit).await {
            Ok(CommitOutcome::Committed(record)) => {
                let unit = PaymentUnit::new(record.reference_id, &record.currency, record.total);
                let result = PaymentResult::verified(PaymentStatus::Paid, format!("[{reference}] Payment confirmed"));
                Ok(result.with_unit(unit))
            },
            Ok(CommitOutcome::AlreadyClosed) => Err(ApprovalRejection::ConcurrentCommitLost),
            Err(e) => {
                error!("🔄️ Payment for [{reference}] is confirmed by the processor, but could not be recorded. {e}");
                Err(ApprovalRejection::CommitFailed(e))
            },
        }
    }
}

/// What the change notifier is told about a rejected approval, if anything.
///
/// Rejections decided before the local record is consulted are unverified. A lost commit race reports nothing, since
/// the winning approval has already notified.
fn rejection_report(reference: &ReferenceId, rejection: &ApprovalRejection) -> Option<PaymentResult> {
    use ApprovalRejection::*;
    let message = format!("[{reference}] {rejection}");
    match rejection {
        MissingReference | MissingOrderId | MissingCaptureId | ConcurrentCommitLost => None,
        AuthFailure(_) | RemoteFetchFailure(_) | BundlingUnsupported(_) | ReferenceMismatch { .. } => {
            Some(PaymentResult::unverified(PaymentStatus::Unknown, message))
        },
        LocalRecordUnavailable(_) | AmountUnparsable(_) | AmountMismatch { .. } | CommitFailed(_) => {
            Some(PaymentResult::verified(PaymentStatus::Unknown, message))
        },
        NotYetPaid(_) => Some(PaymentResult::verified(PaymentStatus::Unpaid, message)),
    }
}
