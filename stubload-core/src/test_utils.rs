//! In-memory collaborators for tests, with error injection.
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::Result;
use crate::error::Error;
use crate::materializer::{columns, stub_id};
use crate::publisher::{ConfirmationId, Publisher};
use crate::reporter::{ErrorRecorder, FailureReport};
use crate::row::{CandidateRow, StubId};
use crate::store::{Acknowledger, ErrorStore, RowSource};

/// A row that materializes cleanly.
pub(crate) fn valid_row(stub_id: i32, reference: &str) -> CandidateRow {
    let decimal = |v: &str| Decimal::from_str(v).unwrap();
    CandidateRow::new()
        .with(columns::STUB_ID, stub_id)
        .with(columns::REFERENCE, reference)
        .with(columns::WEB_REFERENCE, format!("WEB-{reference}"))
        .with(columns::EMAIL, "jo.bloggs@example.com")
        .with(columns::TITLE, "Mr")
        .with(columns::FIRST_NAME, "Jo")
        .with(columns::SURNAME, "Bloggs")
        .with(columns::HOUSE_NUMBER, "12")
        .with(columns::ADDRESS_LINE_1, "High Street")
        .with(columns::ADDRESS_LINE_2, "Westbury")
        .with(columns::ADDRESS_LINE_3, "Bristol")
        .with_null(columns::ADDRESS_LINE_4)
        .with(columns::POSTCODE, "AB1 2CD")
        .with(columns::PHONE, "07700900123")
        .with(columns::BRAND, "core")
        .with(columns::ACTIVE, true)
        .with(columns::PAYMENT_TYPE, "Monthly")
        .with(columns::TOTAL_SELLING_PRICE, decimal("680.00"))
        .with(columns::NETT_PREMIUM, decimal("550.25"))
        .with(columns::GROSS_PREMIUM, decimal("612.34"))
        .with(columns::OUTSTANDING_BALANCE, decimal("0.00"))
        .with(columns::CARD_NUMBER, "************1234")
        .with(columns::DEPOSIT, decimal("68.00"))
        .with(columns::INTEREST, decimal("67.66"))
        .with(columns::APR, decimal("19.90"))
        .with(columns::TOTAL_NUMBER_OF_INSTALLMENTS, 10)
        .with(columns::MONTHLY_INSTALLMENT_AMOUNT, decimal("67.97"))
        .with(columns::TOTAL_INSTALLMENT_AMOUNT, decimal("679.66"))
        .with(columns::FINANCE_PROVIDER, "Premium Credit")
        .with(columns::BANK_SORT_CODE, "12-34-56")
        .with(columns::BANK_ACCOUNT_NUMBER, "12345678")
        .with(columns::VEHICLE_REGISTRATION, "AB12 CDE")
        .with(columns::MAKE, "Ford")
        .with(columns::MODEL, "Focus")
}

/// Fail-next-N counters shared by the in-memory collaborators.
#[derive(Debug, Default)]
pub(crate) struct ErrorInjector {
    fail_next_fetches: AtomicUsize,
    fail_next_acks: AtomicUsize,
    fail_next_publishes: AtomicUsize,
    fail_next_error_inserts: AtomicUsize,
}

impl ErrorInjector {
    pub(crate) fn fail_fetches(&self, count: usize) {
        self.fail_next_fetches.store(count, Ordering::Relaxed);
    }

    pub(crate) fn fail_acks(&self, count: usize) {
        self.fail_next_acks.store(count, Ordering::Relaxed);
    }

    pub(crate) fn fail_publishes(&self, count: usize) {
        self.fail_next_publishes.store(count, Ordering::Relaxed);
    }

    pub(crate) fn fail_error_inserts(&self, count: usize) {
        self.fail_next_error_inserts.store(count, Ordering::Relaxed);
    }

    fn should_fail_fetch(&self) -> bool {
        Self::decrement_counter(&self.fail_next_fetches)
    }

    fn should_fail_ack(&self) -> bool {
        Self::decrement_counter(&self.fail_next_acks)
    }

    fn should_fail_publish(&self) -> bool {
        Self::decrement_counter(&self.fail_next_publishes)
    }

    fn should_fail_error_insert(&self) -> bool {
        Self::decrement_counter(&self.fail_next_error_inserts)
    }

    /// Decrements the counter, true if it was above zero.
    fn decrement_counter(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| c.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    rows: Vec<CandidateRow>,
    acknowledged: BTreeMap<StubId, ConfirmationId>,
    errors: Vec<FailureReport>,
    fetches: usize,
}

/// Row store that hides acknowledged rows from later fetches, like the real store procedure.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryRowStore {
    state: Arc<Mutex<StoreState>>,
    error_injector: Arc<ErrorInjector>,
}

impl InMemoryRowStore {
    pub(crate) fn new(rows: Vec<CandidateRow>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                rows,
                ..Default::default()
            })),
            error_injector: Arc::new(ErrorInjector::default()),
        }
    }

    pub(crate) fn error_injector(&self) -> &ErrorInjector {
        &self.error_injector
    }

    pub(crate) fn acknowledged(&self) -> Vec<(StubId, ConfirmationId)> {
        let state = self.state.lock().unwrap();
        state
            .acknowledged
            .iter()
            .map(|(id, confirmation_id)| (*id, confirmation_id.clone()))
            .collect()
    }

    pub(crate) fn recorded_errors(&self) -> Vec<FailureReport> {
        self.state.lock().unwrap().errors.clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }
}

impl RowSource for InMemoryRowStore {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRow>> {
        if self.error_injector.should_fail_fetch() {
            return Err(Error::Source("injected fetch failure".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        let rows = state
            .rows
            .iter()
            .filter(|row| match stub_id(row) {
                Ok(id) => !state.acknowledged.contains_key(&id),
                Err(_) => true,
            })
            .cloned()
            .collect();
        Ok(rows)
    }
}

impl Acknowledger for InMemoryRowStore {
    async fn acknowledge(&self, stub_id: StubId, confirmation_id: &ConfirmationId) -> Result<()> {
        if self.error_injector.should_fail_ack() {
            return Err(Error::Source("injected acknowledge failure".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .acknowledged
            .insert(stub_id, confirmation_id.clone());
        Ok(())
    }
}

impl ErrorStore for InMemoryRowStore {
    async fn insert_error(&self, report: &FailureReport) -> Result<()> {
        if self.error_injector.should_fail_error_insert() {
            return Err(Error::Source("injected error insert failure".to_string()));
        }
        self.state.lock().unwrap().errors.push(report.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PublishedMessage {
    pub(crate) confirmation_id: ConfirmationId,
    pub(crate) topic_arn: String,
    pub(crate) message_key: String,
    pub(crate) payload: String,
}

/// Publisher that keeps every accepted message and hands out sequential confirmation ids.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingPublisher {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    next_id: Arc<AtomicUsize>,
    error_injector: Arc<ErrorInjector>,
}

impl RecordingPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn error_injector(&self) -> &ErrorInjector {
        &self.error_injector
    }

    pub(crate) fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        message_key: &str,
        payload: &str,
        topic_arn: &str,
    ) -> Result<ConfirmationId> {
        if self.error_injector.should_fail_publish() {
            return Err(Error::Publish("injected publish failure".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let confirmation_id = ConfirmationId::new(format!("msg-{id}"))?;
        self.published.lock().unwrap().push(PublishedMessage {
            confirmation_id: confirmation_id.clone(),
            topic_arn: topic_arn.to_string(),
            message_key: message_key.to_string(),
            payload: payload.to_string(),
        });
        Ok(confirmation_id)
    }
}

/// Error recorder that only keeps the reports.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingErrorRecorder {
    reports: Arc<Mutex<Vec<FailureReport>>>,
}

impl RecordingErrorRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reports(&self) -> Vec<FailureReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorRecorder for RecordingErrorRecorder {
    async fn notify_and_record(&self, report: &FailureReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
