//! Publishing pipeline: filtering, rendering, pagination and delivery.

pub mod builder;
pub mod paginate;
pub mod publisher;
pub mod secrets;
pub mod target;
pub mod webhook;

pub use builder::{ContentBuilder, ItemFilter, PublishCandidate, TitleFilter};
pub use paginate::{paginate, FENCE, MAX_MESSAGE_LEN};
pub use publisher::{DeliveryPolicy, FailedDelivery, PublishReport, Publisher};
pub use secrets::SecretsManagerStore;
pub use target::{SecretStore, WebhookTarget};
pub use webhook::{WebhookClient, WebhookMessage, WebhookSink};
