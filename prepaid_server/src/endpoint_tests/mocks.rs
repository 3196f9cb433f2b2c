use mockall::mock;
use prepaid_engine::{
    db_types::{ApprovalCommit, Cents, NewOrderRecord, OrderRecord, ReferenceId},
    processor_types::{ProcessorOrder, RefundReceipt},
    traits::{CommitOutcome, OrderStore, OrderStoreError, PaymentProcessor, ProcessorError, RefundReservation},
};

mock! {
    pub OrderStore {}
    impl OrderStore for OrderStore {
        async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord, OrderStoreError>;
        async fn fetch_order(&self, reference: &ReferenceId) -> Result<Option<OrderRecord>, OrderStoreError>;
        async fn commit_approval(
            &self,
            reference: &ReferenceId,
            commit: ApprovalCommit,
        ) -> Result<CommitOutcome, OrderStoreError>;
        async fn reserve_refund(
            &self,
            reference: &ReferenceId,
            amount: Cents,
            ceiling: Cents,
        ) -> Result<RefundReservation, OrderStoreError>;
        async fn settle_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError>;
        async fn release_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError>;
    }
}

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        async fn refresh_credential(&self) -> Result<(), ProcessorError>;
        async fn fetch_order(&self, order_id: &str) -> Result<ProcessorOrder, ProcessorError>;
        async fn refund_capture(
            &self,
            capture_id: &str,
            currency: &str,
            amount: Cents,
        ) -> Result<RefundReceipt, ProcessorError>;
    }
}
