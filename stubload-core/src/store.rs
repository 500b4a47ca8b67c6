//! Ports onto the relational store holding the stub records.
//!
//! The store is driven entirely through named stored operations: one returns the candidate
//! rows, one marks a row as dispatched, one records a failure. [postgres::PgStore] implements
//! all three.
use crate::Result;
use crate::publisher::ConfirmationId;
use crate::reporter::FailureReport;
use crate::row::{CandidateRow, StubId};

pub mod postgres;

/// Supplies the rows that still have to be dispatched. A row acknowledged through
/// [Acknowledger] must not be returned by later fetches.
#[trait_variant::make(RowSource: Send)]
#[allow(dead_code)]
pub trait LocalRowSource {
    /// Fetch the full, already materialized candidate set.
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRow>>;
}

/// The acknowledgement writer: marks a row as dispatched, recording the confirmation id as
/// evidence. Only called after the row was published.
#[trait_variant::make(Acknowledger: Send)]
#[allow(dead_code)]
pub trait LocalAcknowledger {
    async fn acknowledge(&self, stub_id: StubId, confirmation_id: &ConfirmationId) -> Result<()>;
}

/// Persists failure reports.
#[trait_variant::make(ErrorStore: Send)]
#[allow(dead_code)]
pub trait LocalErrorStore {
    async fn insert_error(&self, report: &FailureReport) -> Result<()>;
}
