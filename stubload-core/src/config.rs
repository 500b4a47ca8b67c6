use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::OnceLock;

use stubload_sns::{SNS_DEFAULT_REGION, SnsConfig};

use crate::Result;
use crate::error::Error;
use crate::pipeline::PipelineConfig;

const ENV_RUNTIME_ENVIRONMENT: &str = "RUNTIME_ENVIRONMENT";
const ENV_SUBMISSION_TOPIC_ARN: &str = "SUBMISSION_TOPIC_ARN";
const ENV_FAILURE_TOPIC_ARN: &str = "FAILURE_TOPIC_ARN";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_AWS_REGION: &str = "AWS_REGION";
const ENV_SNS_ENDPOINT_URL: &str = "SNS_ENDPOINT_URL";

/// Name stamped on every failure report.
pub const COMPONENT_NAME: &str = "data-load-to-sns-from-rds";

/// Stored operations exposed by the source database.
pub mod procedures {
    /// Returns the rows that have not been dispatched yet.
    pub const GET_RECORDS: &str = "sp-stub-get-records";
    /// Marks a row as dispatched, taking the stub id and the confirmation id.
    pub const UPDATE_RECORD: &str = "sp-stub-update-record";
    pub const INSERT_ERROR: &str = "sp-insert-error-into-table";
}

/// Loads the settings from the environment on first use. A failure is not cached, the next
/// call tries again.
pub fn config() -> Result<&'static Settings> {
    static CONF: OnceLock<Settings> = OnceLock::new();
    if let Some(settings) = CONF.get() {
        return Ok(settings);
    }
    let settings = Settings::load()?;
    Ok(CONF.get_or_init(|| settings))
}

#[derive(Clone, PartialEq)]
pub struct Settings {
    pub environment: String,
    pub submission_topic_arn: String,
    pub failure_topic_arn: String,
    pub database_url: String,
    pub sns: SnsConfig,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment)
            .field("submission_topic_arn", &self.submission_topic_arn)
            .field("failure_topic_arn", &self.failure_topic_arn)
            .field("database_url", &"<redacted>")
            .field("sns", &self.sns)
            .finish()
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Settings::try_from(env::vars().collect::<HashMap<String, String>>())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            environment: self.environment.clone(),
            submission_topic_arn: self.submission_topic_arn.clone(),
        }
    }
}

impl TryFrom<HashMap<String, String>> for Settings {
    type Error = Error;

    fn try_from(env_vars: HashMap<String, String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            match env_vars.get(name).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(Error::Config(format!("{name} is not set"))),
            }
        };
        let optional = |name: &str| {
            env_vars
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sns = SnsConfig {
            region: optional(ENV_AWS_REGION).unwrap_or_else(|| SNS_DEFAULT_REGION.to_string()),
            endpoint_url: optional(ENV_SNS_ENDPOINT_URL),
        };
        sns.validate()
            .map_err(|e| Error::Config(format!("Invalid SNS config - {e}")))?;

        Ok(Settings {
            environment: required(ENV_RUNTIME_ENVIRONMENT)?,
            submission_topic_arn: required(ENV_SUBMISSION_TOPIC_ARN)?,
            failure_topic_arn: required(ENV_FAILURE_TOPIC_ARN)?,
            database_url: required(ENV_DATABASE_URL)?,
            sns,
        })
    }
}
