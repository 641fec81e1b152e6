//! S3 object state backend.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::state::{PersistedState, StateStore};
use crate::{PublisherError, Result};

/// State stored as a single S3 object.
#[derive(Debug, Clone)]
pub struct S3StateStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3StateStore {
    /// Create a store for `s3://bucket/key`.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl StateStore for S3StateStore {
    async fn load(&self) -> Result<PersistedState> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    debug!("State object {} not found, starting empty", self.describe());
                    return Ok(PersistedState::new());
                }
                return Err(PublisherError::StateUnavailable(format!(
                    "failed to get {}: {}",
                    self.describe(),
                    DisplayErrorContext(&err)
                )));
            }
        };

        let bytes = output.body.collect().await.map_err(|e| {
            PublisherError::StateUnavailable(format!("failed to read {}: {e}", self.describe()))
        })?;
        PersistedState::from_json(&bytes.into_bytes())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let body = state.to_json()?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                PublisherError::StateUnavailable(format!(
                    "failed to put {}: {}",
                    self.describe(),
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
