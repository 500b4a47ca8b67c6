//! Publishing single messages to an SNS topic.
use aws_sdk_sns::Client;
use aws_sdk_sns::types::MessageAttributeValue;

use crate::{Error, Result, SnsConfig, create_sns_client, extract_aws_error};

/// Name of the string message attribute carrying the message key.
pub const MESSAGE_KEY_ATTRIBUTE: &str = "messageKey";

/// Publishes messages to SNS topics. The topic is chosen per call, so one publisher can
/// serve both the submission and the failure topic.
#[derive(Clone, Debug)]
pub struct SnsPublisher {
    client: Client,
}

/// Builder for creating and configuring an [SnsPublisher].
#[derive(Clone, Default)]
pub struct SnsPublisherBuilder {
    config: SnsConfig,
    client: Option<Client>,
}

impl SnsPublisherBuilder {
    pub fn new(config: SnsConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn config(mut self, config: SnsConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an already configured client instead of creating one from the config.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub async fn build(self) -> Result<SnsPublisher> {
        let client = match self.client {
            Some(client) => client,
            None => create_sns_client(self.config).await?,
        };
        Ok(SnsPublisher { client })
    }
}

impl SnsPublisher {
    /// Publishes `payload` to `topic_arn` and returns the message id assigned by SNS.
    ///
    /// There is no retry here; a failed publish is returned to the caller as is.
    pub async fn publish(&self, message_key: &str, payload: &str, topic_arn: &str) -> Result<String> {
        tracing::debug!(topic_arn, message_key, "Publishing message to SNS topic");

        let key_attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(message_key)
            .build()
            .map_err(|e| Error::Other(format!("Failed to build message attribute: {e}")))?;

        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(payload)
            .message_attributes(MESSAGE_KEY_ATTRIBUTE, key_attribute)
            .send()
            .await
            .map_err(|e| Error::Sns(extract_aws_error(&e)))?;

        output
            .message_id
            .ok_or_else(|| Error::Other("SNS accepted the message without a message id".to_string()))
    }
}
