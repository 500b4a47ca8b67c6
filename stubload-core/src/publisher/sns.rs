use stubload_sns::publisher::SnsPublisher;

use crate::error::{self, Error};
use crate::publisher::{ConfirmationId, Publisher};

impl From<stubload_sns::Error> for Error {
    fn from(value: stubload_sns::Error) -> Self {
        match value {
            stubload_sns::Error::Sns(e) => Error::Publish(e),
            stubload_sns::Error::InvalidConfig(e) => Error::Config(e),
            stubload_sns::Error::Other(e) => Error::Publish(e),
        }
    }
}

impl Publisher for SnsPublisher {
    async fn publish(
        &self,
        message_key: &str,
        payload: &str,
        topic_arn: &str,
    ) -> error::Result<ConfirmationId> {
        let message_id = SnsPublisher::publish(self, message_key, payload, topic_arn).await?;
        ConfirmationId::new(message_id)
    }
}
