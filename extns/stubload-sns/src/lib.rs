//! Thin client for publishing messages to Amazon SNS topics.
//!
//! Callers hand over a message key, a text payload and a topic ARN, and get back the
//! message id SNS assigned on acceptance. The key travels as a string message attribute so
//! subscribers can trace individual publishes.
use aws_config::{BehaviorVersion, Region, meta::region::RegionProviderChain};
use aws_sdk_sns::Client;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

pub mod publisher;

pub const SNS_DEFAULT_REGION: &str = "eu-west-2";

/// Errors from the SNS client library.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Failed with SNS error - {0}")]
    Sns(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

/// Where and how to reach SNS.
#[derive(Debug, Clone, PartialEq)]
pub struct SnsConfig {
    /// AWS region hosting the topics
    pub region: String,
    /// Endpoint override, used against localstack and similar emulators
    pub endpoint_url: Option<String>,
}

impl Default for SnsConfig {
    fn default() -> Self {
        Self {
            region: SNS_DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }
}

impl SnsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::InvalidConfig("region is required".to_string()));
        }
        if let Some(endpoint_url) = &self.endpoint_url
            && endpoint_url.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "endpoint url must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn aws_behavior_version() -> BehaviorVersion {
    BehaviorVersion::latest()
}

/// Creates and configures an SNS client based on the provided configuration.
pub async fn create_sns_client(config: SnsConfig) -> Result<Client> {
    config.validate()?;

    tracing::info!(region = config.region.clone(), "Creating SNS client in region");

    let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()))
        .or_default_provider()
        .or_else(Region::new(SNS_DEFAULT_REGION));

    let mut config_builder = aws_config::defaults(aws_behavior_version()).region(region_provider);

    if let Some(endpoint_url) = config.endpoint_url {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    let shared_config = config_builder.load().await;

    Ok(Client::new(&shared_config))
}

/// Flattens an SDK error into "code: message", falling back to the full error chain when
/// the service did not send any metadata (timeouts, dispatch failures, ...).
pub(crate) fn extract_aws_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => DisplayErrorContext(err).to_string(),
    }
}
