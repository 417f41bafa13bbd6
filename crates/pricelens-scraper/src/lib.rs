pub mod client;
pub mod deliver;
pub mod error;
pub mod identity;
pub mod marketplaces;
pub mod normalize;
pub mod orchestrator;
pub mod render;
pub mod types;

pub use client::{FetchClient, FetchStrategy, RetryPolicy};
pub use deliver::{DeliveryReport, RecordDeliveryError, SinkClient};
pub use error::{DeliveryError, FetchError, PlatformError, PlatformFailure};
pub use identity::{Identity, IdentityRotator};
pub use marketplaces::{Amazon, Flipkart, Marketplace};
pub use normalize::{build_record, normalize_name, normalize_price, normalize_rating};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use render::{RenderError, Renderer};
pub use types::RawProduct;
