//! AWS Secrets Manager lookup.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;

use crate::publish::target::SecretStore;
use crate::{PublisherError, Result};

/// Secret lookup backed by AWS Secrets Manager.
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    /// Create a store from shared SDK configuration.
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, reference: &str) -> Result<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(reference)
            .send()
            .await
            .map_err(|err| {
                PublisherError::Resolution(format!(
                    "failed to fetch secret: {}",
                    DisplayErrorContext(&err)
                ))
            })?;

        output
            .secret_string()
            .map(str::to_owned)
            .ok_or_else(|| PublisherError::Resolution("secret has no string value".to_string()))
    }
}
