//! Seen-set persistence.
//!
//! The seen-set is read once at the start of an invocation and written once
//! at the end, through one of two interchangeable backends chosen at
//! construction time.

pub mod local;
pub mod s3;
pub mod types;

use async_trait::async_trait;
use aws_config::SdkConfig;

use crate::config::StateConfig;
use crate::{PublisherError, Result};

pub use local::LocalStateStore;
pub use s3::S3StateStore;
pub use types::{PersistedState, DEFAULT_MAX_SEEN};

/// Durable storage for [`PersistedState`].
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored state.
    ///
    /// A missing state object is an empty state, not an error.
    async fn load(&self) -> Result<PersistedState>;

    /// Replace the stored state.
    async fn save(&self, state: &PersistedState) -> Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Build the configured state backend.
///
/// The S3 backend needs an SDK configuration; the local backend ignores it.
pub fn from_config(config: &StateConfig, sdk: Option<&SdkConfig>) -> Result<Box<dyn StateStore>> {
    if config.local {
        return Ok(Box::new(LocalStateStore::new(&config.path)));
    }

    let (Some(bucket), Some(key)) = (&config.bucket, &config.key) else {
        return Err(PublisherError::Config(
            "S3_BUCKET_NAME and S3_KEY_NAME are required unless LOCAL_STATE is set".to_string(),
        ));
    };
    let sdk = sdk.ok_or_else(|| {
        PublisherError::Config("S3 state requires an AWS configuration".to_string())
    })?;
    let client = aws_sdk_s3::Client::new(sdk);
    Ok(Box::new(S3StateStore::new(client, bucket, key)))
}
