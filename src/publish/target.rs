//! Webhook target references.
//!
//! The configured target is either a direct http(s) URL or an ARN naming a
//! secret that holds the URL. The reference is parsed once into a
//! [`WebhookTarget`] and resolved only when there is something to publish.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{PublisherError, Result};

/// ARN service whose references can be resolved.
const SECRETS_MANAGER_SERVICE: &str = "secretsmanager";

/// Lookup of secret values by reference.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Return the string value of the referenced secret.
    async fn secret_string(&self, reference: &str) -> Result<String>;
}

/// A parsed webhook target reference.
#[derive(Clone, PartialEq, Eq)]
pub enum WebhookTarget {
    /// A URL used as-is.
    DirectUrl(String),
    /// An ARN pointing at a secret holding the URL.
    SecretReference {
        /// ARN service component, e.g. `secretsmanager`.
        service: String,
        /// The full ARN.
        id: String,
    },
}

impl WebhookTarget {
    /// Classify a target reference.
    ///
    /// `arn:` references become [`WebhookTarget::SecretReference`], http(s)
    /// URLs become [`WebhookTarget::DirectUrl`]; anything else is a
    /// configuration error.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();

        if reference.starts_with("arn:") {
            // arn:partition:service:region:account:resource
            let parts: Vec<&str> = reference.splitn(6, ':').collect();
            let service = parts.get(2).copied().unwrap_or_default();
            if service.is_empty() {
                return Err(PublisherError::Config(
                    "webhook ARN has no service component".to_string(),
                ));
            }
            debug!("Found ARN for webhook target, service {}", service);
            return Ok(WebhookTarget::SecretReference {
                service: service.to_string(),
                id: reference.to_string(),
            });
        }

        match url::Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                debug!("Found HTTP/S webhook URL");
                Ok(WebhookTarget::DirectUrl(reference.to_string()))
            }
            Ok(url) => Err(PublisherError::Config(format!(
                "unsupported webhook target scheme: {}",
                url.scheme()
            ))),
            Err(e) => Err(PublisherError::Config(format!(
                "invalid webhook target reference: {e}"
            ))),
        }
    }

    /// Whether resolving this target needs a secret lookup.
    pub fn needs_secret(&self) -> bool {
        matches!(self, WebhookTarget::SecretReference { .. })
    }

    /// Produce the concrete delivery URL.
    ///
    /// Secret references need a [`SecretStore`]; only Secrets Manager ARNs
    /// are supported.
    pub async fn resolve(&self, secrets: Option<&dyn SecretStore>) -> Result<String> {
        match self {
            WebhookTarget::DirectUrl(url) => Ok(url.clone()),
            WebhookTarget::SecretReference { service, id } => {
                if service != SECRETS_MANAGER_SERVICE {
                    return Err(PublisherError::Resolution(format!(
                        "unsupported ARN service: {service}"
                    )));
                }
                let secrets = secrets.ok_or_else(|| {
                    PublisherError::Resolution("no secret store configured".to_string())
                })?;
                info!("Fetching webhook URL from Secrets Manager.");
                let value = secrets.secret_string(id).await?;
                Ok(value.trim().to_string())
            }
        }
    }
}

// Direct URLs carry a credential in the path; keep them out of logs.
impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookTarget::DirectUrl(_) => f.write_str("DirectUrl(<redacted>)"),
            WebhookTarget::SecretReference { service, id } => f
                .debug_struct("SecretReference")
                .field("service", service)
                .field("id", id)
                .finish(),
        }
    }
}
