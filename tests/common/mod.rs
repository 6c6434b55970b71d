// tests/common/mod.rs
//! Shared test harness: fake providers and a fully wired engine over the
//! in-memory store.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ephone_billing_engine::error::BillingError;
use ephone_billing_engine::providers::{
    PaymentIntent, PaymentIntentStatus, PaymentProvider, TelephonyProvider,
};
use ephone_billing_engine::services::{
    AccountLedger, CallLifecycleEngine, PaymentService, RatePlan, RefundReconciler,
};
use ephone_billing_engine::store::{CallStore, MemoryStore};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const FROM_NUMBER: &str = "+15550001111";

/// Telephony fake recording every originate/terminate, with a switchable
/// terminate outage.
pub struct FakeTelephony {
    pub originated: Mutex<Vec<(String, String)>>,
    pub terminated: Mutex<Vec<String>>,
    pub fail_terminate: AtomicBool,
    counter: AtomicU64,
}

impl FakeTelephony {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            originated: Mutex::new(Vec::new()),
            terminated: Mutex::new(Vec::new()),
            fail_terminate: AtomicBool::new(false),
            counter: AtomicU64::new(1),
        })
    }

    pub fn originate_count(&self) -> usize {
        self.originated.lock().unwrap().len()
    }
}

#[async_trait]
impl TelephonyProvider for FakeTelephony {
    async fn originate(
        &self,
        from: &str,
        to: &str,
        _webhook_url: &str,
    ) -> Result<String, BillingError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.originated
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string()));
        Ok(format!("v3:test-{}", n))
    }

    async fn terminate(&self, call_control_id: &str) -> Result<(), BillingError> {
        if self.fail_terminate.load(Ordering::SeqCst) {
            return Err(BillingError::Telephony("simulated outage".to_string()));
        }
        self.terminated
            .lock()
            .unwrap()
            .push(call_control_id.to_string());
        Ok(())
    }
}

/// Payment fake with registered intents and a switchable refund outage.
pub struct FakePayments {
    pub refunds: Mutex<Vec<(String, i64)>>,
    pub fail_refunds: AtomicBool,
    intents: Mutex<HashMap<String, (String, i64)>>,
    counter: AtomicU64,
}

impl FakePayments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            refunds: Mutex::new(Vec::new()),
            fail_refunds: AtomicBool::new(false),
            intents: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(1),
        })
    }

    /// Register an intent as succeeded for `amount_cents`.
    pub fn succeed_intent(&self, payment_intent_id: &str, amount_cents: i64) {
        self.intents.lock().unwrap().insert(
            payment_intent_id.to_string(),
            ("succeeded".to_string(), amount_cents),
        );
    }

    pub fn pending_intent(&self, payment_intent_id: &str, amount_cents: i64) {
        self.intents.lock().unwrap().insert(
            payment_intent_id.to_string(),
            ("requires_payment_method".to_string(), amount_cents),
        );
    }

    pub fn refund_count(&self) -> usize {
        self.refunds.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_customer(&self, _email: &str) -> Result<String, BillingError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("cus_test_{}", n))
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        _customer_id: &str,
    ) -> Result<PaymentIntent, BillingError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("pi_test_{}", n);
        self.pending_intent(&id, amount_cents);
        Ok(PaymentIntent {
            client_secret: format!("{}_secret", id),
            id,
        })
    }

    async fn payment_status(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntentStatus, BillingError> {
        let intents = self.intents.lock().unwrap();
        let (status, amount_cents) = intents
            .get(payment_intent_id)
            .cloned()
            .ok_or_else(|| BillingError::Payment("no such payment intent".to_string()))?;
        Ok(PaymentIntentStatus {
            status,
            amount_cents,
        })
    }

    async fn refund(
        &self,
        payment_intent_id: &str,
        amount_cents: i64,
    ) -> Result<String, BillingError> {
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(BillingError::Payment("simulated refund outage".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.refunds
            .lock()
            .unwrap()
            .push((payment_intent_id.to_string(), amount_cents));
        Ok(format!("re_test_{}", n))
    }
}

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub telephony: Arc<FakeTelephony>,
    pub payments: Arc<FakePayments>,
    pub ledger: Arc<AccountLedger>,
    pub reconciler: Arc<RefundReconciler>,
    pub engine: Arc<CallLifecycleEngine>,
    pub payment_service: Arc<PaymentService>,
}

/// Engine wired over fakes: $0.01/s, $100.00 starting balance.
pub fn harness() -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let telephony = FakeTelephony::new();
    let payments = FakePayments::new();

    let ledger = Arc::new(AccountLedger::new(store.clone(), dec!(100.00)));
    let reconciler = Arc::new(RefundReconciler::new(
        store.clone(),
        ledger.clone(),
        payments.clone(),
    ));
    let engine = Arc::new(CallLifecycleEngine::new(
        store.clone(),
        ledger.clone(),
        telephony.clone(),
        reconciler.clone(),
        RatePlan::new(dec!(0.01)),
        FROM_NUMBER.to_string(),
        "http://localhost:9000/api/v1/calls/webhook".to_string(),
    ));
    let payment_service = Arc::new(PaymentService::new(ledger.clone(), payments.clone()));

    TestHarness {
        store,
        telephony,
        payments,
        ledger,
        reconciler,
        engine,
        payment_service,
    }
}

/// Pretend the call started `secs` seconds ago so settlement observes a
/// known elapsed duration.
pub async fn rewind_start(store: &Arc<MemoryStore>, call_control_id: &str, secs: i64) {
    let mut call = CallStore::get(store.as_ref(), call_control_id)
        .await
        .unwrap()
        .unwrap();
    call.start_time = Utc::now() - Duration::seconds(secs);
    CallStore::upsert(store.as_ref(), call).await.unwrap();
}

/// Telnyx-style webhook payload.
pub fn event_payload(event_type: &str, call_control_id: &str, duration: Option<i64>) -> serde_json::Value {
    let mut payload = serde_json::json!({ "call_control_id": call_control_id });
    if let Some(secs) = duration {
        payload["duration_seconds"] = serde_json::json!(secs);
    }
    serde_json::json!({
        "data": {
            "event_type": event_type,
            "payload": payload,
        }
    })
}
