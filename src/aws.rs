//! AWS SDK configuration.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

use crate::config::AwsConfig;

/// Load the shared SDK configuration, honoring a configured region.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        debug!("Using AWS region {}", region);
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}
