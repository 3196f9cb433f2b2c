use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Cents, OrderRecord, ReferenceId},
    gateway_api::{
        errors::LedgerError,
        payment_objects::{PaymentResult, PaymentStatus, PaymentUnit, RefundOutcome},
        with_deadline,
        EngineOptions,
    },
    processor_types::ProcessorOrder,
    traits::{OrderStore, PaymentProcessor, RefundReservation},
};

/// `LedgerApi` is the read path for payment status, and the write path for refunds.
///
/// Status always comes from a fresh processor lookup. Refund accounting is local, and uses a reserve/settle pair of
/// conditional writes so that concurrent refunds for one order can never jointly exceed what was captured.
pub struct LedgerApi<B, P> {
    db: B,
    processor: P,
    options: EngineOptions,
}

impl<B, P> Debug for LedgerApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi")
    }
}

impl<B, P> LedgerApi<B, P> {
    pub fn new(db: B, processor: P, options: EngineOptions) -> Self {
        Self { db, processor, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// A closed order, together with the processor's current view of it.
struct PaidOrder {
    record: OrderRecord,
    currency: String,
    paid: Cents,
}

impl<B, P> LedgerApi<B, P>
where
    B: OrderStore,
    P: PaymentProcessor,
{
    /// The full local record for `reference`, including the stored processor snapshot.
    pub async fn order_record(&self, reference: &ReferenceId) -> Result<Option<OrderRecord>, LedgerError> {
        if reference.is_empty() {
            return Err(LedgerError::MissingReference);
        }
        Ok(self.db.fetch_order(reference).await?)
    }

    /// Reports the payment status of `reference`.
    ///
    /// An order that was never approved (or never opened) is simply `UNPAID`. Otherwise the processor is asked for
    /// the current status: CREATED and SAVED map to `UNPAID`, APPROVED and COMPLETED to `PAID`, and anything else to
    /// `UNKNOWN`.
    pub async fn payment_result(&self, reference: &ReferenceId) -> Result<PaymentResult, LedgerError> {
        if reference.is_empty() {
            return Err(LedgerError::MissingReference);
        }
        let record = match self.db.fetch_order(reference).await? {
            Some(record) if record.has_order_id() => record,
            Some(record) => {
                let unit = PaymentUnit::new(record.reference_id, &record.currency, record.total);
                let message = format!("[{reference}] No processor order is associated with this reference yet");
                return Ok(PaymentResult::unverified(PaymentStatus::Unpaid, message).with_unit(unit));
            },
            None => {
                let message = format!("[{reference}] No order exists for this reference");
                return Ok(PaymentResult::unverified(PaymentStatus::Unpaid, message));
            },
        };
        let remote = self.fetch_remote(&record.order_id).await?;
        let unit = remote
            .purchase_units
            .first()
            .ok_or_else(|| LedgerError::InvalidProcessorOrder(format!("Order {} has no purchase units", remote.id)))?;
        let amount = unit.value.parse::<Cents>().map_err(|_| LedgerError::AmountUnparsable(unit.value.clone()))?;
        let status = remote.status.payment_status();
        trace!("💸️ Processor reports [{reference}] as {}, i.e. {status}", remote.status);
        let unit = PaymentUnit::new(ReferenceId::from(unit.reference_id.as_str()), &unit.currency, amount);
        let message = format!("[{reference}] Processor reports the order as {}", remote.status);
        Ok(PaymentResult::verified(status, message).with_unit(unit))
    }

    /// True if at least part of the payment for `reference` is neither refunded nor reserved by an in-flight refund.
    /// Any failure along the way means `false`.
    pub async fn is_refundable(&self, reference: &ReferenceId) -> bool {
        match self.paid_order(reference).await {
            Ok(order) => {
                let committed = order.record.refunded + order.record.refund_pending;
                let refundable = committed < order.paid && order.record.currency == order.currency;
                trace!(
                    "💸️ [{reference}] has {} of {} {} refunded and {} pending. Refundable: {refundable}",
                    order.record.refunded,
                    order.paid,
                    order.currency,
                    order.record.refund_pending
                );
                refundable
            },
            Err(e) => {
                debug!("💸️ [{reference}] is not refundable. {e}");
                false
            },
        }
    }

    /// Refunds `amount` of the payment for `reference`.
    ///
    /// A zero or negative amount is a no-op. If `currency` is not given, the recorded currency is used; either way it
    /// must match both the recorded and the processor's currency.
    ///
    /// The amount is reserved against the capture before the processor is called, and only moved into the `refunded`
    /// total once the processor reports the refund as COMPLETED. Any other outcome returns the reservation.
    pub async fn refund(
        &self,
        reference: &ReferenceId,
        currency: Option<&str>,
        amount: Cents,
    ) -> Result<RefundOutcome, LedgerError> {
        if !amount.is_positive() {
            debug!("💸️ Refund of {amount} for [{reference}] requested. Nothing to do.");
            return Ok(RefundOutcome::NothingToDo);
        }
        let order = self.paid_order(reference).await?;
        let requested_currency = currency.filter(|c| !c.trim().is_empty()).unwrap_or(order.record.currency.as_str());
        if order.record.currency != order.currency || !requested_currency.eq_ignore_ascii_case(&order.currency) {
            return Err(LedgerError::RefundExceedsCaptured(format!(
                "Currency mismatch. Requested {requested_currency}, recorded {}, paid in {}",
                order.record.currency, order.currency
            )));
        }
        let committed = order.record.refunded + order.record.refund_pending;
        match committed.checked_add(amount) {
            Some(total) if total <= order.paid => {},
            _ => return Err(LedgerError::exceeds(committed, amount, order.paid)),
        }
        match self.db.reserve_refund(reference, amount, order.paid).await? {
            RefundReservation::Reserved(record) => {
                trace!("💸️ {amount} reserved for [{reference}]. {} pending", record.refund_pending)
            },
            RefundReservation::Exceeded => {
                return Err(LedgerError::RefundExceedsCaptured(format!(
                    "Another refund for {reference} got there first. {amount} would exceed the {} paid",
                    order.paid
                )));
            },
        }
        let capture_id = order.record.capture_id.as_str();
        let currency = order.currency.as_str();
        let call = self.processor.refund_capture(capture_id, currency, amount);
        let receipt = match with_deadline(self.options.remote_timeout, call).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("💸️ Refund of {amount} {currency} for [{reference}] failed. {e}");
                self.release(reference, amount).await;
                return Err(LedgerError::RemoteRefundFailure(e));
            },
        };
        if !receipt.is_completed() {
            warn!("💸️ Refund {} for [{reference}] is {}, not COMPLETED. Not recording it.", receipt.id, receipt.status);
            self.release(reference, amount).await;
            return Err(LedgerError::RefundNotCompleted(receipt.status));
        }
        let record = self.db.settle_refund(reference, amount).await.map_err(|e| {
            error!(
                "💸️ Refund {} of {amount} {currency} for [{reference}] COMPLETED at the processor, but could not be \
                 recorded. The local refund total is now understated. {e}",
                receipt.id
            );
            LedgerError::StorageError(e)
        })?;
        info!("💸️ Refunded {amount} {currency} for [{reference}]. {} refunded in total", record.refunded);
        Ok(RefundOutcome::Refunded { refund_id: receipt.id, total_refunded: record.refunded })
    }

    async fn release(&self, reference: &ReferenceId, amount: Cents) {
        if let Err(e) = self.db.release_refund(reference, amount).await {
            error!("💸️ Could not release the {amount} refund reservation for [{reference}]. {e}");
        }
    }

    async fn fetch_remote(&self, order_id: &str) -> Result<ProcessorOrder, LedgerError> {
        with_deadline(self.options.remote_timeout, self.processor.fetch_order(order_id))
            .await
            .map_err(LedgerError::RemoteFetchFailure)
    }

    /// Loads the record for a captured order and confirms with the processor that it is paid.
    async fn paid_order(&self, reference: &ReferenceId) -> Result<PaidOrder, LedgerError> {
        if reference.is_empty() {
            return Err(LedgerError::MissingReference);
        }
        let record = self
            .db
            .fetch_order(reference)
            .await?
            .filter(|r| r.has_capture_id() && r.has_order_id())
            .ok_or_else(|| LedgerError::NoCaptureID(reference.clone()))?;
        let remote = self.fetch_remote(&record.order_id).await?;
        if !remote.status.is_paid() {
            return Err(LedgerError::OrderNotPaid(remote.status));
        }
        let unit = remote
            .purchase_units
            .first()
            .ok_or_else(|| LedgerError::InvalidProcessorOrder(format!("Order {} has no purchase units", remote.id)))?;
        let paid = unit.value.parse::<Cents>().map_err(|_| LedgerError::AmountUnparsable(unit.value.clone()))?;
        let currency = unit.currency.clone();
        Ok(PaidOrder { record, currency, paid })
    }
}
