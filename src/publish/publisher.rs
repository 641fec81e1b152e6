//! The publish loop.
//!
//! Candidates are delivered one at a time, in order, chunk by chunk, with a
//! fixed delay between consecutive webhook calls. A candidate is recorded in
//! the seen-set only after every one of its chunks was delivered.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info};

use crate::publish::builder::PublishCandidate;
use crate::publish::paginate::paginate;
use crate::publish::webhook::WebhookSink;
use crate::state::PersistedState;
use crate::PublisherError;

/// How the loop reacts to a failed delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPolicy {
    /// Stop at the first failed candidate.
    #[default]
    Abort,
    /// Skip the failed candidate and carry on with the rest.
    Continue,
}

/// A candidate whose delivery did not complete.
#[derive(Debug)]
pub struct FailedDelivery {
    /// Identifier of the candidate.
    pub guid: String,
    /// Chunks delivered before the failure.
    pub delivered_chunks: usize,
    /// The delivery error.
    pub error: PublisherError,
}

/// Outcome of one publish batch.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Candidates fully delivered and recorded.
    pub published: usize,
    /// Candidates whose delivery failed.
    pub failures: Vec<FailedDelivery>,
    /// Candidates not attempted because the batch was aborted.
    pub skipped: usize,
}

impl PublishReport {
    /// Whether every candidate was delivered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }

    /// Take the first failure, if any.
    pub fn into_first_failure(self) -> Option<FailedDelivery> {
        self.failures.into_iter().next()
    }
}

/// Drives ordered delivery of publish candidates.
pub struct Publisher<'a> {
    sink: &'a dyn WebhookSink,
    chunk_delay: Duration,
    policy: DeliveryPolicy,
}

impl<'a> Publisher<'a> {
    /// Create a publisher delivering through `sink`.
    pub fn new(sink: &'a dyn WebhookSink, chunk_delay: Duration, policy: DeliveryPolicy) -> Self {
        Self {
            sink,
            chunk_delay,
            policy,
        }
    }

    /// Deliver every candidate to `url`, recording each completed one in `state`.
    pub async fn publish(
        &self,
        url: &str,
        candidates: Vec<PublishCandidate>,
        state: &mut PersistedState,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        let mut first_call = true;
        let total = candidates.len();

        for (index, candidate) in candidates.into_iter().enumerate() {
            debug!(
                "Article {} length - {}",
                candidate.guid,
                candidate.content.chars().count()
            );
            let chunks = paginate(&candidate.content);
            let mut delivered = 0;
            let mut failure = None;

            for chunk in &chunks {
                if !first_call && !self.chunk_delay.is_zero() {
                    tokio::time::sleep(self.chunk_delay).await;
                }
                first_call = false;

                match self.sink.deliver(url, chunk).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            match failure {
                None => {
                    state.record(candidate.guid.clone());
                    report.published += 1;
                    info!("Successfully published {}.", candidate.guid);
                }
                Some(error) => {
                    error!(
                        "Failed to publish {} after {}/{} chunk(s): {}",
                        candidate.guid,
                        delivered,
                        chunks.len(),
                        error
                    );
                    report.failures.push(FailedDelivery {
                        guid: candidate.guid,
                        delivered_chunks: delivered,
                        error,
                    });
                    if self.policy == DeliveryPolicy::Abort {
                        report.skipped = total - index - 1;
                        break;
                    }
                }
            }
        }

        report
    }
}
