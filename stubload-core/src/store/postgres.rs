//! PostgreSQL implementation of the store ports.
//!
//! Each stored operation is addressed by its fixed name; the store never issues ad-hoc SQL
//! against the underlying tables.
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::config::procedures;
use crate::error::Error;
use crate::publisher::ConfirmationId;
use crate::reporter::FailureReport;
use crate::row::{CandidateRow, ColumnValue, StubId};
use crate::store::{Acknowledger, ErrorStore, RowSource};

const TEXT_TYPES: [Type; 4] = [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME];

/// Store backed by a single PostgreSQL connection. Cloning shares the connection, which is
/// closed once the last clone is dropped.
#[derive(Clone)]
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| Error::Source(format!("Failed to connect to the database: {e}")))?;

        // the connection object drives the socket; it resolves once the client is dropped
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(?e, "Database connection terminated with error");
            }
        });

        info!("Connected to the database");
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

impl RowSource for PgStore {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRow>> {
        let query = format!("SELECT * FROM \"{}\"()", procedures::GET_RECORDS);
        let rows = self
            .client
            .query(query.as_str(), &[])
            .await
            .map_err(|e| Error::Source(format!("{} failed: {e}", procedures::GET_RECORDS)))?;

        debug!(count = rows.len(), "Fetched rows from the store");
        if let Some(first) = rows.first() {
            let skipped = unsupported_columns(first);
            if !skipped.is_empty() {
                warn!(?skipped, "Leaving out columns of unsupported type");
            }
        }
        rows.iter().map(candidate_row_from).collect()
    }
}

impl Acknowledger for PgStore {
    async fn acknowledge(&self, stub_id: StubId, confirmation_id: &ConfirmationId) -> Result<()> {
        let statement = format!("CALL \"{}\"($1, $2)", procedures::UPDATE_RECORD);
        self.client
            .execute(
                statement.as_str(),
                &[&stub_id.as_i32(), &confirmation_id.as_str()],
            )
            .await
            .map_err(|e| Error::Source(format!("{} failed: {e}", procedures::UPDATE_RECORD)))?;
        Ok(())
    }
}

impl ErrorStore for PgStore {
    async fn insert_error(&self, report: &FailureReport) -> Result<()> {
        let statement = format!(
            "CALL \"{}\"($1, $2, $3, $4, $5, $6, $7)",
            procedures::INSERT_ERROR
        );
        let stage = report.stage.to_string();
        let kind = report.kind.to_string();
        self.client
            .execute(
                statement.as_str(),
                &[
                    &report.environment,
                    &report.component,
                    &stage,
                    &kind,
                    &report.error_message,
                    &report.context,
                    &report.cause,
                ],
            )
            .await
            .map_err(|e| Error::Source(format!("{} failed: {e}", procedures::INSERT_ERROR)))?;
        Ok(())
    }
}

/// How a column is read into a [ColumnValue].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Int2,
    Int4,
    Int8,
    Numeric,
    Bool,
}

/// `None` for column types the rows never carry record data in.
fn column_kind(ty: &Type) -> Option<ColumnKind> {
    if TEXT_TYPES.contains(ty) {
        Some(ColumnKind::Text)
    } else if *ty == Type::INT2 {
        Some(ColumnKind::Int2)
    } else if *ty == Type::INT4 {
        Some(ColumnKind::Int4)
    } else if *ty == Type::INT8 {
        Some(ColumnKind::Int8)
    } else if *ty == Type::NUMERIC {
        Some(ColumnKind::Numeric)
    } else if *ty == Type::BOOL {
        Some(ColumnKind::Bool)
    } else {
        None
    }
}

/// Names and types of the columns that [candidate_row_from] leaves out.
fn unsupported_columns(row: &Row) -> Vec<String> {
    row.columns()
        .iter()
        .filter(|column| column_kind(column.type_()).is_none())
        .map(|column| format!("{} ({})", column.name(), column.type_()))
        .collect()
}

/// Converts one result row, keeping the column order. NULLs become absent values. Columns of
/// an unsupported type are left out, so a record column of such a type fails the row as
/// missing data rather than failing the whole fetch.
fn candidate_row_from(row: &Row) -> Result<CandidateRow> {
    let mut candidate = CandidateRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let Some(kind) = column_kind(column.type_()) else {
            continue;
        };
        let value = match kind {
            ColumnKind::Text => row.try_get::<_, Option<String>>(idx)?.map(ColumnValue::Text),
            ColumnKind::Int2 => row
                .try_get::<_, Option<i16>>(idx)?
                .map(|v| ColumnValue::Integer(v.into())),
            ColumnKind::Int4 => row
                .try_get::<_, Option<i32>>(idx)?
                .map(|v| ColumnValue::Integer(v.into())),
            ColumnKind::Int8 => row.try_get::<_, Option<i64>>(idx)?.map(ColumnValue::Integer),
            ColumnKind::Numeric => row
                .try_get::<_, Option<Decimal>>(idx)?
                .map(ColumnValue::Decimal),
            ColumnKind::Bool => row.try_get::<_, Option<bool>>(idx)?.map(ColumnValue::Boolean),
        };
        candidate.push(column.name(), value);
    }
    Ok(candidate)
}
