use std::fmt::Debug;

use log::*;
use prepaid_common::helpers::normalize_currency_code;

use crate::{
    db_types::{Cents, NewOrderRecord, ReferenceId, MAX_REFERENCE_LEN},
    gateway_api::{errors::CheckoutError, payment_objects::CheckoutParameters, EngineOptions},
    traits::OrderStore,
};

/// `CheckoutApi` opens pending orders ahead of a processor-hosted checkout.
pub struct CheckoutApi<B> {
    db: B,
    options: EngineOptions,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, options: EngineOptions) -> Self {
        Self { db, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CheckoutApi<B>
where B: OrderStore
{
    /// Stores a new pending order for `reference` and returns the parameters needed to drive the checkout.
    ///
    /// The amount is rounded to whole cents before it is stored, so that the later comparison against the amount the
    /// processor reports is exact. A reference can only be opened once.
    pub async fn open_order(
        &self,
        reference: &str,
        currency: &str,
        amount: f64,
    ) -> Result<CheckoutParameters, CheckoutError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CheckoutError::EmptyReference);
        }
        if reference.chars().count() > MAX_REFERENCE_LEN {
            return Err(CheckoutError::InvalidReference(format!(
                "Reference ids may be at most {MAX_REFERENCE_LEN} characters long"
            )));
        }
        let currency =
            normalize_currency_code(currency).ok_or_else(|| CheckoutError::InvalidCurrency(currency.into()))?;
        let total = Cents::from_decimal_rounded(amount).map_err(|e| CheckoutError::InvalidAmount(e.to_string()))?;
        if !total.is_positive() {
            return Err(CheckoutError::InvalidAmount(format!(
                "{amount} rounds to {total}, which is not a chargeable amount"
            )));
        }
        let order = NewOrderRecord::new(ReferenceId::from(reference), &currency, total);
        let record = self.db.insert_order(order).await?;
        info!("🛒️ Opened order [{}] for {} {}", record.reference_id, record.total, record.currency);
        Ok(CheckoutParameters::new(record.reference_id, &record.currency, record.total, self.options.notify_url()))
    }
}
