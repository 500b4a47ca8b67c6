use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::Result;
use crate::error::Error;
use crate::record::MotorCustomer;

/// [SNS] publisher, the production [Publisher].
///
/// [SNS]: https://docs.aws.amazon.com/sns/latest/api/API_Publish.html
mod sns;

/// Opaque id the sink hands back for an accepted message. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfirmationId(String);

impl ConfirmationId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::Publish(
                "sink returned an empty confirmation id".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivers one text payload to a topic.
#[trait_variant::make(Publisher: Send)]
#[allow(dead_code)]
pub trait LocalPublisher {
    /// Publishes `payload` under `message_key`; exactly one message per successful call and
    /// no retries.
    async fn publish(
        &self,
        message_key: &str,
        payload: &str,
        topic_arn: &str,
    ) -> Result<ConfirmationId>;
}

/// Serializes [MotorCustomer] records and publishes them through a [Publisher].
pub struct RecordPublisher<P> {
    publisher: P,
}

impl<P> RecordPublisher<P>
where
    P: Publisher + Sync,
{
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    pub async fn publish(&self, record: &MotorCustomer, topic_arn: &str) -> Result<ConfirmationId> {
        self.publish_at(record, topic_arn, Utc::now()).await
    }

    /// Same as [RecordPublisher::publish] with the key timestamp supplied by the caller.
    pub async fn publish_at(
        &self,
        record: &MotorCustomer,
        topic_arn: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<ConfirmationId> {
        let payload = serde_json::to_string(record)?;
        let key = message_key(&record.reference, sent_at);

        debug!(message_key = %key, "Sending record to submission topic");
        let confirmation_id = self.publisher.publish(&key, &payload, topic_arn).await?;
        info!(message_key = %key, %confirmation_id, "Sending record to submission topic complete");

        Ok(confirmation_id)
    }
}

/// Message key for tracing: the record reference plus the send time as ISO-8601. Not meant
/// for deduplication.
pub fn message_key(reference: &str, sent_at: DateTime<Utc>) -> String {
    format!(
        "customer_ref_{reference}_{}",
        sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
